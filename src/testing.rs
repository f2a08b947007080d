//! Scripted chain reader and recording collaborators for unit tests.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::{SolCall, SolValue},
};
use async_trait::async_trait;

use crate::{
    accumulator::UsdAccumulator,
    balances::Balances,
    chain::{ChainReader, QueryContext, ReadCall},
    error::AdapterError,
    unwrap::LpUnwrapper,
};

pub fn encode_uint(value: U256) -> Vec<u8> {
    value.abi_encode()
}

pub fn encode_address(value: Address) -> Vec<u8> {
    value.abi_encode()
}

pub fn encode_rates(rates: &[U256]) -> Vec<u8> {
    (rates.to_vec(),).abi_encode_params()
}

/// `getVaultInfo` return data with `staked` as the first field.
pub fn encode_vault_info(staked: U256) -> Vec<u8> {
    let one = U256::from(1u64);
    (staked, one, one, one, one, vec![one, one], one).abi_encode_params()
}

pub fn encode_reserves(reserve0: U256, reserve1: U256) -> Vec<u8> {
    (reserve0, reserve1, U256::from(1_700_000_000u64)).abi_encode_params()
}

/// Answers calls from canned responses, matched first by exact calldata and then by selector.
/// Calls without a response fail, as do all calls to a target marked with `fail_target`.
#[derive(Default)]
pub struct MockChainReader {
    by_calldata: HashMap<(Address, Bytes), Bytes>,
    by_selector: HashMap<(Address, [u8; 4]), Bytes>,
    failing: HashSet<Address>,
    calls: Mutex<Vec<ReadCall>>,
    batches: Mutex<usize>,
}

impl MockChainReader {
    pub fn respond<C: SolCall>(mut self, target: Address, data: impl Into<Bytes>) -> Self {
        self.by_selector
            .insert((target, C::SELECTOR), data.into());
        self
    }

    pub fn respond_to_calldata(
        mut self,
        target: Address,
        calldata: impl Into<Bytes>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.by_calldata
            .insert((target, calldata.into()), data.into());
        self
    }

    pub fn fail_target(mut self, target: Address) -> Self {
        self.failing.insert(target);
        self
    }

    pub fn recorded_calls(&self) -> Vec<ReadCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn batch_count(&self) -> usize {
        *self.batches.lock().unwrap()
    }

    fn answer(&self, call: &ReadCall) -> Result<Bytes, AdapterError> {
        self.calls.lock().unwrap().push(call.clone());

        if self.failing.contains(&call.target) {
            return Err(AdapterError::Transport(format!("{} is unreachable", call.target)));
        }
        if let Some(data) = self
            .by_calldata
            .get(&(call.target, call.calldata.clone()))
        {
            return Ok(data.clone());
        }
        let selector: [u8; 4] = call
            .calldata
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .unwrap_or_default();
        self.by_selector
            .get(&(call.target, selector))
            .cloned()
            .ok_or(AdapterError::CallFailed { target: call.target })
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn call(&self, call: ReadCall) -> Result<Bytes, AdapterError> {
        self.answer(&call)
    }

    async fn multi_call(&self, calls: Vec<ReadCall>) -> Result<Vec<Bytes>, AdapterError> {
        *self.batches.lock().unwrap() += 1;
        calls
            .iter()
            .map(|call| self.answer(call))
            .collect()
    }

    async fn try_multi_call(
        &self,
        calls: Vec<ReadCall>,
    ) -> Result<Vec<Option<Bytes>>, AdapterError> {
        *self.batches.lock().unwrap() += 1;
        Ok(calls
            .iter()
            .map(|call| self.answer(call).ok())
            .collect())
    }
}

/// Keeps every value written, in order.
#[derive(Debug, Default)]
pub struct RecordingAccumulator {
    pub writes: Vec<f64>,
}

impl RecordingAccumulator {
    pub fn total(&self) -> f64 {
        self.writes.iter().sum()
    }
}

impl UsdAccumulator for RecordingAccumulator {
    fn add_usd_value(&mut self, value: f64) {
        self.writes.push(value);
    }
}

/// Captures the balances it is handed instead of unwrapping them.
#[derive(Default)]
pub struct RecordingUnwrapper {
    seen: Mutex<Vec<Vec<(Address, U256)>>>,
    fail: bool,
}

impl RecordingUnwrapper {
    pub fn failing() -> Self {
        Self { seen: Mutex::default(), fail: true }
    }

    pub fn seen(&self) -> Vec<Vec<(Address, U256)>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LpUnwrapper for RecordingUnwrapper {
    async fn unwrap_lp_balances(
        &self,
        balances: &Balances,
        _ctx: &QueryContext<'_>,
        _accumulator: &mut dyn UsdAccumulator,
    ) -> Result<(), AdapterError> {
        self.seen
            .lock()
            .unwrap()
            .push(balances.iter().copied().collect());
        if self.fail {
            return Err(AdapterError::MalformedResponse("unwrap failed".to_string()));
        }
        Ok(())
    }
}
