use std::{fmt, str::FromStr};

use alloy::{
    primitives::{Address, Bytes},
    sol_types::SolCall,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AdapterError;

/// Networks the aggregator may hand us. Only one of them is ever valued by this adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum,
    Optimism,
    Base,
    Arbitrum,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Optimism => "optimism",
            Chain::Base => "base",
            Chain::Arbitrum => "arbitrum",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ethereum" => Ok(Chain::Ethereum),
            "optimism" => Ok(Chain::Optimism),
            "base" => Ok(Chain::Base),
            "arbitrum" => Ok(Chain::Arbitrum),
            other => Err(AdapterError::Config(format!("Unknown chain '{other}'"))),
        }
    }
}

/// A single read-only contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadCall {
    pub target: Address,
    pub calldata: Bytes,
}

impl ReadCall {
    pub fn new<C: SolCall>(target: Address, call: &C) -> Self {
        Self { target, calldata: call.abi_encode().into() }
    }
}

/// Executes read-only calls against a node.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn call(&self, call: ReadCall) -> Result<Bytes, AdapterError>;

    /// Executes all calls in one round trip. A failure of any call fails the whole batch.
    async fn multi_call(&self, calls: Vec<ReadCall>) -> Result<Vec<Bytes>, AdapterError>;

    /// Executes all calls in one round trip, reporting failed calls as `None`.
    async fn try_multi_call(&self, calls: Vec<ReadCall>)
        -> Result<Vec<Option<Bytes>>, AdapterError>;
}

/// Chain-scoped query context supplied by the orchestrator for one valuation cycle.
#[derive(Clone, Copy)]
pub struct QueryContext<'a> {
    chain: Chain,
    reader: &'a dyn ChainReader,
}

impl<'a> QueryContext<'a> {
    pub fn new(chain: Chain, reader: &'a dyn ChainReader) -> Self {
        Self { chain, reader }
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn reader(&self) -> &'a dyn ChainReader {
        self.reader
    }

    pub async fn call<C: SolCall>(
        &self,
        target: Address,
        call: &C,
    ) -> Result<C::Return, AdapterError> {
        let data = self
            .reader
            .call(ReadCall::new(target, call))
            .await?;
        decode_returns::<C>(target, &data)
    }

    pub async fn multi_call<C: SolCall>(
        &self,
        calls: &[(Address, C)],
    ) -> Result<Vec<C::Return>, AdapterError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }
        let requests: Vec<ReadCall> = calls
            .iter()
            .map(|(target, call)| ReadCall::new(*target, call))
            .collect();
        debug!("Batching {} `{}` calls", requests.len(), C::SIGNATURE);

        let results = self.reader.multi_call(requests).await?;
        check_batch_len(calls.len(), results.len())?;

        calls
            .iter()
            .zip(results)
            .map(|((target, _), data)| decode_returns::<C>(*target, &data))
            .collect()
    }

    /// Like [`QueryContext::multi_call`], but calls that fail or return undecodable data come
    /// back as `None`.
    pub async fn try_multi_call<C: SolCall>(
        &self,
        calls: &[(Address, C)],
    ) -> Result<Vec<Option<C::Return>>, AdapterError> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }
        let requests: Vec<ReadCall> = calls
            .iter()
            .map(|(target, call)| ReadCall::new(*target, call))
            .collect();

        let results = self
            .reader
            .try_multi_call(requests)
            .await?;
        check_batch_len(calls.len(), results.len())?;

        Ok(calls
            .iter()
            .zip(results)
            .map(|((target, _), data)| {
                data.and_then(|data| decode_returns::<C>(*target, &data).ok())
            })
            .collect())
    }
}

fn decode_returns<C: SolCall>(target: Address, data: &[u8]) -> Result<C::Return, AdapterError> {
    C::abi_decode_returns(data, true).map_err(|e| AdapterError::Decode {
        target,
        signature: C::SIGNATURE,
        reason: e.to_string(),
    })
}

fn check_batch_len(expected: usize, actual: usize) -> Result<(), AdapterError> {
    if expected != actual {
        return Err(AdapterError::MalformedResponse(format!(
            "batch of {expected} calls returned {actual} results"
        )));
    }
    Ok(())
}
