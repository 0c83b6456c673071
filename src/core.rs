//! Data contract between callers and the PECI engine: the request a caller
//! submits and the response the engine hands back.
//!
//! On the wire a PECI write block is `address, write length, read length`
//! followed by the command code and its operands. The write length counts the
//! command byte, so a command without operands has a write length of 1 and a
//! ping, which sends no command at all, has a write length of 0.
use crate::error::PeciError;

/// Largest operand block accepted after the command byte.
pub const MAX_PAYLOAD_LEN: usize = 32;
/// Largest response a request may expect.
pub const MAX_RESPONSE_LEN: usize = 32;
/// Header bytes pushed before the command: address, write length, read length.
pub const HEADER_LEN: usize = 3;
/// Frame check bytes trailing a transaction: write FCS and read FCS.
pub const FCS_LEN: usize = 2;

/// Command codes known to the engine.
///
/// Only [`PING`](command::PING) changes how a frame is handled; every other
/// code is forwarded as-is.
pub mod command {
    /// Zero-length diagnostic transaction, answered by the write FCS only.
    pub const PING: u8 = 0x00;
    pub const GET_TEMP: u8 = 0x01;
    pub const RD_PCI_CFG: u8 = 0x61;
    pub const RD_PKG_CFG: u8 = 0xA1;
    pub const WR_PKG_CFG: u8 = 0xA5;
    pub const RD_IA_MSR: u8 = 0xB1;
    pub const RD_END_PT_CFG: u8 = 0xC1;
    pub const RD_PCI_CFG_LOCAL: u8 = 0xE1;
    pub const WR_PCI_CFG_LOCAL: u8 = 0xE5;
    pub const GET_DIB: u8 = 0xF7;
}

//==================================================================================REQUEST
/// A single PECI transaction: one write block, optionally followed by a read.
///
/// Built through [`Request::builder`], which validates the bounds once so the
/// engine never has to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    address: u8,
    command: u8,
    payload: &'a [u8],
    write_length: u8,
    read_length: u8,
}

impl<'a> Request<'a> {
    /// Start building a request for `command` addressed to `address`.
    pub fn builder(address: u8, command: u8) -> RequestBuilder<'a> {
        RequestBuilder::new(address, command)
    }

    /// Shorthand for a ping to `address`.
    pub fn ping(address: u8) -> Self {
        Self {
            address,
            command: command::PING,
            payload: &[],
            write_length: 0,
            read_length: 0,
        }
    }

    /// Target client address.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Command code sent as the first byte of the write block.
    pub fn command(&self) -> u8 {
        self.command
    }

    /// Operands following the command byte.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Write length as it appears in the header (command byte included).
    pub fn write_length(&self) -> u8 {
        self.write_length
    }

    /// Number of response bytes expected from the client.
    pub fn read_length(&self) -> u8 {
        self.read_length
    }

    /// Whether this is a ping.
    pub fn is_ping(&self) -> bool {
        self.command == command::PING
    }

    /// The read phase runs when a response is expected or when pinging.
    pub fn expects_read(&self) -> bool {
        self.read_length != 0 || self.is_ping()
    }
}

//==================================================================================REQUEST_BUILDER
#[derive(Debug)]
/// Fluent builder enforcing the frame bounds.
pub struct RequestBuilder<'a> {
    pub address: u8,
    pub command: u8,
    pub payload: &'a [u8],
    pub read_length: u16,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(address: u8, command: u8) -> Self {
        Self {
            address,
            command,
            payload: &[],
            read_length: 0,
        }
    }

    /// Operands written after the command byte.
    pub fn payload(mut self, payload: &'a [u8]) -> Self {
        self.payload = payload;
        self
    }

    /// Expected response length, excluding the frame check bytes.
    pub fn read_length(mut self, read_length: u16) -> Self {
        self.read_length = read_length;
        self
    }

    /// Build the request:
    /// - payload no longer than [`MAX_PAYLOAD_LEN`]
    /// - read length no longer than [`MAX_RESPONSE_LEN`]
    /// - a ping carries no payload and its write length is 0
    pub fn build(self) -> Result<Request<'a>, PeciError> {
        if self.payload.len() > MAX_PAYLOAD_LEN
            || usize::from(self.read_length) > MAX_RESPONSE_LEN
        {
            return Err(PeciError::InvalidRequest);
        }

        let write_length = if self.command == command::PING {
            if !self.payload.is_empty() {
                return Err(PeciError::InvalidRequest);
            }
            0
        } else {
            // Command byte + operands; bounded by MAX_PAYLOAD_LEN above.
            (self.payload.len() + 1) as u8
        };

        Ok(Request {
            address: self.address,
            command: self.command,
            payload: self.payload,
            write_length,
            read_length: self.read_length as u8,
        })
    }
}

//==================================================================================RESPONSE
/// Bytes drained from the read FIFO for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    data: [u8; MAX_RESPONSE_LEN],
    len: usize,
    received: usize,
    write_fcs: u8,
    read_fcs: u8,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    /// Empty response.
    pub const fn new() -> Self {
        Self {
            data: [0; MAX_RESPONSE_LEN],
            len: 0,
            received: 0,
            write_fcs: 0,
            read_fcs: 0,
        }
    }

    /// Response bytes. For a ping this is the write FCS alone.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Payload bytes drained into the response.
    ///
    /// Equals [`len`](Self::len) for every successful read except a ping,
    /// whose answer is the write FCS and counts no payload byte.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Write-side frame check byte, reported by the controller.
    pub fn write_fcs(&self) -> u8 {
        self.write_fcs
    }

    /// Read-side frame check byte. Not validated against the payload.
    pub fn read_fcs(&self) -> u8 {
        self.read_fcs
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        self.len = len.min(MAX_RESPONSE_LEN);
    }

    pub(crate) fn set_write_fcs(&mut self, fcs: u8) {
        self.write_fcs = fcs;
    }

    pub(crate) fn set_read_fcs(&mut self, fcs: u8) {
        self.read_fcs = fcs;
    }

    /// Store payload byte `index` and count it as received.
    pub(crate) fn push_payload(&mut self, index: usize, byte: u8) {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = byte;
            self.received += 1;
        }
    }

    /// Replace the content with the single write FCS byte (ping answer).
    pub(crate) fn set_ping_answer(&mut self, fcs: u8) {
        self.data[0] = fcs;
        self.len = 1;
    }
}
