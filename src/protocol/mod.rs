//! PECI protocol engine: the controller driver, its completion strategies,
//! the transport traits and shared access.
pub mod completion;
pub mod controller;
pub mod shared;
pub mod transport;
