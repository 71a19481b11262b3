pub mod rpc;
pub mod wallet;
pub mod logs;

pub use logs::{LogEvent, LogSubscriber};
pub use rpc::{SolanaRpc, SolanaRpcError};
pub use wallet::WalletManager;
