//! Orchestration layer: trade intent building, channel submission, the
//! executor boundary, and the two event-driven loops (sniper, monitor).

pub mod builder;
pub mod router;
pub mod executor;
pub mod monitor;
pub mod sniper;

pub use builder::{BuildError, BuiltTrade, TradeIntentBuilder, TradeSettings};
pub use executor::TradeExecutor;
pub use monitor::{MonitorSettings, PositionMonitor};
pub use router::{ConfirmPolicy, SubmissionChannel, SubmissionRouter, SubmitError};
pub use sniper::{MintSniper, SniperSettings};
