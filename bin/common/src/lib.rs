#![deny(missing_docs)]

//! Configuration and logging shared by the RingCT binaries

mod config;
/// Functions for setting up the logging system
pub mod logger;

pub use config::Config;
