pub mod abi;
pub mod reader;
pub mod rpc;

pub use reader::{MarketReader, RpcMarketReader};
pub use rpc::RpcClient;
