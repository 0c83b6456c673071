//! Minimal abstraction for a PECI bus driver. Lets upper layers and the
//! shared-access wrapper stay independent of the controller implementation.
use crate::core::{Request, Response};
use futures_util::Future;

/// Contract of a PECI bus driver.
pub trait PeciBus {
    type Error: core::fmt::Debug;
    /// Program the bit timing for `bitrate` (kbps).
    fn configure(&mut self, bitrate: u32) -> Result<(), Self::Error>;
    /// Power the interface up.
    fn enable(&mut self) -> Result<(), Self::Error>;
    /// Wait for the bus to go idle, then power the interface down.
    fn disable(&mut self) -> Result<(), Self::Error>;
    /// Run one write/read transaction. Asynchronous to accommodate
    /// interrupt-driven completion.
    fn transfer<'a>(
        &'a mut self,
        request: Request<'a>,
    ) -> impl Future<Output = Result<Response, Self::Error>> + 'a;
}
