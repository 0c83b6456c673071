//! `peci-bus` library: a `no_std` transaction engine for FIFO-based PECI
//! controllers. The crate exposes the register model (infra), the engine and
//! its completion strategies (protocol), and the request/response contract
//! shared with callers.
#![no_std]
//==================================================================================
/// Runtime timing configuration of a controller instance.
pub mod config;
/// Request and response types exchanged with the engine.
pub mod core;
/// Errors reported by PECI operations.
pub mod error;
/// Register model of the PECI controller.
pub mod infra;
/// PECI engine: controller, completion strategies, transport traits.
pub mod protocol;
//==================================================================================
