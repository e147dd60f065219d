//! lenny-core: Lenny Gateway Core Library
//!
//! Configuration loading and the shared error type for the Lenny
//! Discord gateway.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
