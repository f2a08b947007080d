pub mod abi;
pub mod accumulator;
pub mod adapter;
pub mod addresses;
pub mod auto_compounder;
pub mod balances;
pub mod chain;
pub mod config;
pub mod error;
pub mod oracle;
pub mod rpc;
pub mod staking;
pub mod unwrap;

#[cfg(test)]
mod testing;

pub use adapter::{InfiniteTrading, TvlReport, METHODOLOGY};
