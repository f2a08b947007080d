use alloy::primitives::Address;
use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced by the adapter. Routines never recover from these; a failed read fails the
/// whole valuation cycle for this protocol.
#[derive(Debug, Error, Diagnostic)]
pub enum AdapterError {
    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("Call to {target} failed")]
    CallFailed { target: Address },

    #[error("Failed to decode `{signature}` returned by {target}: {reason}")]
    Decode { target: Address, signature: &'static str, reason: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Arithmetic overflow while {0}")]
    Overflow(&'static str),

    #[error("Invalid address for {name}: '{value}'")]
    InvalidAddress { name: String, value: String },

    #[error("No address registered for {symbol} on {chain}")]
    MissingAddress { chain: String, symbol: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
