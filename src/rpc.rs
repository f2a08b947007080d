use alloy::{
    eips::eip1898::BlockId,
    primitives::{address, Address, Bytes},
    providers::{Provider, RootProvider},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use tracing::debug;

use crate::{
    abi::IMulticall3,
    chain::{ChainReader, ReadCall},
    error::AdapterError,
};

/// Multicall3, deployed at the same address on every supported network.
pub const MULTICALL3: Address = address!("0xcA11bde05977b3631167028862bE2a173976CA11");

/// [`ChainReader`] backed by a JSON-RPC node. Batches are executed through Multicall3.
pub struct RpcChainReader {
    provider: RootProvider,
    block: Option<u64>,
}

impl RpcChainReader {
    pub fn new(url: &str, block: Option<u64>) -> Result<Self, AdapterError> {
        let url: Url = url
            .parse()
            .map_err(|e| AdapterError::Config(format!("Invalid RPC URL '{url}': {e}")))?;
        Ok(Self::with_provider(RootProvider::new_http(url), block))
    }

    pub fn with_provider(provider: RootProvider, block: Option<u64>) -> Self {
        Self { provider, block }
    }

    async fn eth_call(&self, target: Address, calldata: Bytes) -> Result<Bytes, AdapterError> {
        let tx = TransactionRequest::default()
            .to(target)
            .input(calldata.into());

        let mut call = self.provider.call(tx);
        if let Some(block) = self.block {
            call = call.block(BlockId::from(block));
        }
        call.await
            .map_err(|e| AdapterError::Transport(e.to_string()))
    }

    async fn aggregate(
        &self,
        calls: Vec<ReadCall>,
        allow_failure: bool,
    ) -> Result<Vec<IMulticall3::Call3Result>, AdapterError> {
        let expected = calls.len();
        let calls = calls
            .into_iter()
            .map(|call| IMulticall3::Call3 {
                target: call.target,
                allow_failure,
                call_data: call.calldata,
            })
            .collect();
        let payload = IMulticall3::aggregate3Call { calls }.abi_encode();

        debug!("Executing multicall with {} calls", expected);
        let data = self
            .eth_call(MULTICALL3, payload.into())
            .await?;
        let results = IMulticall3::aggregate3Call::abi_decode_returns(&data, true)
            .map_err(|e| AdapterError::Decode {
                target: MULTICALL3,
                signature: IMulticall3::aggregate3Call::SIGNATURE,
                reason: e.to_string(),
            })?
            .return_data;

        if results.len() != expected {
            return Err(AdapterError::MalformedResponse(format!(
                "multicall returned {} results for {} calls",
                results.len(),
                expected
            )));
        }
        Ok(results)
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn call(&self, call: ReadCall) -> Result<Bytes, AdapterError> {
        self.eth_call(call.target, call.calldata)
            .await
    }

    async fn multi_call(&self, calls: Vec<ReadCall>) -> Result<Vec<Bytes>, AdapterError> {
        let targets: Vec<Address> = calls
            .iter()
            .map(|call| call.target)
            .collect();
        let results = self.aggregate(calls, false).await?;

        targets
            .into_iter()
            .zip(results)
            .map(|(target, result)| match result.success {
                true => Ok(result.return_data),
                false => Err(AdapterError::CallFailed { target }),
            })
            .collect()
    }

    async fn try_multi_call(
        &self,
        calls: Vec<ReadCall>,
    ) -> Result<Vec<Option<Bytes>>, AdapterError> {
        let results = self.aggregate(calls, true).await?;

        // Calls to accounts without code succeed with empty data.
        Ok(results
            .into_iter()
            .map(|result| {
                (result.success && !result.return_data.is_empty()).then_some(result.return_data)
            })
            .collect())
    }
}
