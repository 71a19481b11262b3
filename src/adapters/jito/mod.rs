//! Jito Bundle Relay
//!
//! Atomic bundle delivery through the Jito block engine: a tip-payment
//! transaction plus the trade transaction, submitted to every regional
//! endpoint in parallel.

pub mod config;
pub mod error;
pub mod client;

pub use client::JitoBundleClient;
pub use config::JitoConfig;
pub use error::JitoError;
