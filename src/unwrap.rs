//! Turns registered LP balances into USD contributions of their underlying assets.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use itertools::izip;
use tracing::{debug, info, warn};

use crate::{
    abi::{IERC20Metadata, IVelodromePool},
    accumulator::UsdAccumulator,
    balances::Balances,
    chain::QueryContext,
    error::AdapterError,
    oracle::{scale_down, PriceOracle},
};

/// Resolves a balance collection into USD contributions written to the accumulator.
#[async_trait]
pub trait LpUnwrapper: Send + Sync {
    async fn unwrap_lp_balances(
        &self,
        balances: &Balances,
        ctx: &QueryContext<'_>,
        accumulator: &mut dyn UsdAccumulator,
    ) -> Result<(), AdapterError>;
}

/// Reserve layout of a Velodrome (Uniswap V2 style) pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolReserves {
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
    pub total_supply: U256,
}

impl PoolReserves {
    /// Amounts of `token0` and `token1` owned by `held` LP tokens.
    pub fn share_of(&self, held: U256) -> Result<Option<(U256, U256)>, AdapterError> {
        if self.total_supply.is_zero() {
            return Ok(None);
        }
        let share = |reserve: U256| {
            held.checked_mul(reserve)
                .map(|scaled| scaled / self.total_supply)
                .ok_or(AdapterError::Overflow("computing LP reserve share"))
        };
        Ok(Some((share(self.reserve0)?, share(self.reserve1)?)))
    }
}

/// Unwraps Velodrome pool tokens and prices the resulting assets with the Velodrome oracle.
///
/// Registered tokens that do not answer `token0()` are treated as plain assets and priced
/// directly.
#[derive(Debug, Clone)]
pub struct VelodromeLpUnwrapper {
    oracle: PriceOracle,
}

impl VelodromeLpUnwrapper {
    pub fn new(oracle: PriceOracle) -> Self {
        Self { oracle }
    }

    /// Reads reserves for every registered token that looks like a pool. Entries are `None` for
    /// plain tokens.
    async fn pool_reserves(
        &self,
        ctx: &QueryContext<'_>,
        tokens: &[Address],
    ) -> Result<Vec<Option<PoolReserves>>, AdapterError> {
        let probes: Vec<(Address, IVelodromePool::token0Call)> = tokens
            .iter()
            .map(|token| (*token, IVelodromePool::token0Call {}))
            .collect();
        let token0s = ctx.try_multi_call(&probes).await?;

        let pools: Vec<(usize, Address)> = token0s
            .iter()
            .enumerate()
            .filter_map(|(idx, token0)| token0.as_ref().map(|token0| (idx, token0._0)))
            .collect();

        let token1_calls: Vec<_> = pools
            .iter()
            .map(|(idx, _)| (tokens[*idx], IVelodromePool::token1Call {}))
            .collect();
        let reserve_calls: Vec<_> = pools
            .iter()
            .map(|(idx, _)| (tokens[*idx], IVelodromePool::getReservesCall {}))
            .collect();
        let supply_calls: Vec<_> = pools
            .iter()
            .map(|(idx, _)| (tokens[*idx], IVelodromePool::totalSupplyCall {}))
            .collect();

        let token1s = ctx.multi_call(&token1_calls).await?;
        let reserves = ctx.multi_call(&reserve_calls).await?;
        let supplies = ctx.multi_call(&supply_calls).await?;

        let mut result = vec![None; tokens.len()];
        for ((idx, token0), token1, reserves, supply) in izip!(pools, token1s, reserves, supplies)
        {
            result[idx] = Some(PoolReserves {
                token0,
                token1: token1._0,
                reserve0: reserves.reserve0,
                reserve1: reserves.reserve1,
                total_supply: supply._0,
            });
        }
        Ok(result)
    }
}

#[async_trait]
impl LpUnwrapper for VelodromeLpUnwrapper {
    async fn unwrap_lp_balances(
        &self,
        balances: &Balances,
        ctx: &QueryContext<'_>,
        accumulator: &mut dyn UsdAccumulator,
    ) -> Result<(), AdapterError> {
        let tokens: Vec<Address> = balances.tokens().collect();
        let pools = self.pool_reserves(ctx, &tokens).await?;

        let mut underlying = Balances::new();
        for ((token, held), pool) in balances.iter().zip(pools) {
            match pool {
                Some(pool) => match pool.share_of(*held)? {
                    Some((amount0, amount1)) => {
                        debug!(
                            "LP {} unwraps to {} of {} and {} of {}",
                            token, amount0, pool.token0, amount1, pool.token1
                        );
                        underlying.add(pool.token0, amount0)?;
                        underlying.add(pool.token1, amount1)?;
                    }
                    None => warn!("Pool {} has no supply, skipping", token),
                },
                None => underlying.add(*token, *held)?,
            }
        }

        let assets: Vec<Address> = underlying.tokens().collect();
        let decimal_calls: Vec<_> = assets
            .iter()
            .map(|asset| (*asset, IERC20Metadata::decimalsCall {}))
            .collect();
        let decimals = ctx.multi_call(&decimal_calls).await?;
        let prices = self
            .oracle
            .usd_prices(ctx, &assets)
            .await?;

        let mut total = 0.0;
        for ((asset, amount), decimals, price) in izip!(underlying.iter(), decimals, prices) {
            let value = scale_down(*amount, decimals._0)? * price;
            debug!("{} of {} worth ${:.2}", amount, asset, value);
            accumulator.add_usd_value(value);
            total += value;
        }
        info!(
            "Unwrapped {} LP balances into {} assets worth ${:.2}",
            tokens.len(),
            assets.len(),
            total
        );

        Ok(())
    }
}
