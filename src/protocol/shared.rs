//! Serialized access to one PECI bus from several tasks.
//!
//! The controller is a single set of hardware registers and the engine is
//! not reentrant. [`SharedPeci`] holds an [`embassy_sync::mutex::Mutex`] for
//! the whole duration of each operation, so transactions never interleave.
//! Firmware places it in a `static` and hands `&'static` references to every
//! task that talks to the bus.
use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    mutex::{Mutex, MutexGuard},
};

use crate::core::{Request, Response};
use crate::protocol::transport::traits::peci_bus::PeciBus;

/// Mutex-guarded PECI bus.
pub struct SharedPeci<M: RawMutex, B: PeciBus> {
    bus: Mutex<M, B>,
}

impl<M: RawMutex, B: PeciBus> SharedPeci<M, B> {
    pub const fn new(bus: B) -> Self {
        Self {
            bus: Mutex::new(bus),
        }
    }

    /// Exclusive access for a sequence of operations.
    pub async fn lock(&self) -> MutexGuard<'_, M, B> {
        self.bus.lock().await
    }

    pub async fn configure(&self, bitrate: u32) -> Result<(), B::Error> {
        self.bus.lock().await.configure(bitrate)
    }

    pub async fn enable(&self) -> Result<(), B::Error> {
        self.bus.lock().await.enable()
    }

    pub async fn disable(&self) -> Result<(), B::Error> {
        self.bus.lock().await.disable()
    }

    /// Run one transaction, holding the bus until it completes.
    pub async fn transfer(&self, request: Request<'_>) -> Result<Response, B::Error> {
        let mut bus = self.bus.lock().await;
        bus.transfer(request).await
    }

    /// Give the bus back, e.g. to tear the driver down.
    pub fn into_inner(self) -> B {
        self.bus.into_inner()
    }
}
