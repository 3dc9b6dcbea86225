//! Interactive wizard for flashing ESP8266 firmware images with the external
//! `esptool` program.
//!
//! The crate does not talk to the serial port itself; all device
//! communication is delegated to `esptool` subprocesses. What lives here is
//! the interactive workflow: checking that the tool is installed, letting the
//! user pick a serial port and a firmware image, resolving flash-size
//! variants, and translating `esptool` exit codes into actionable guidance.

pub mod cli;
pub mod config;
pub mod error;
pub mod esptool;
pub mod firmware;
pub mod logging;
pub mod serial;

pub use crate::{config::Config, error::Error};
