use serde::Serialize;
use tracing::info;

use crate::{
    accumulator::{UsdAccumulator, UsdTotal},
    addresses::AddressBook,
    auto_compounder::auto_compounder_tvl,
    balances::Balances,
    chain::{Chain, QueryContext},
    error::AdapterError,
    oracle::PriceOracle,
    staking::staked_tvl,
    unwrap::{LpUnwrapper, VelodromeLpUnwrapper},
};

pub const METHODOLOGY: &str = "Tracks ITP token staking vault TVL using VELO price oracle, and \
                               auto-compounder vault TVL by unwrapping LP tokens held by vault \
                               contracts";

/// USD totals produced by one valuation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TvlReport {
    pub chain: Chain,
    pub tvl: f64,
    pub staking: f64,
}

/// Infinite Trading adapter: the staking vault and the auto-compounders on one network.
#[derive(Debug, Clone)]
pub struct InfiniteTrading {
    addresses: AddressBook,
    oracle: PriceOracle,
}

impl InfiniteTrading {
    pub fn new(addresses: AddressBook) -> Self {
        let oracle = PriceOracle::from_address_book(&addresses);
        Self { addresses, oracle }
    }

    pub fn optimism() -> Result<Self, AdapterError> {
        Ok(Self::new(AddressBook::optimism()?))
    }

    pub fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    pub fn chain(&self) -> Chain {
        self.addresses.chain
    }

    pub fn unwrapper(&self) -> VelodromeLpUnwrapper {
        VelodromeLpUnwrapper::new(self.oracle.clone())
    }

    pub async fn staking(
        &self,
        ctx: &QueryContext<'_>,
        accumulator: &mut dyn UsdAccumulator,
    ) -> Result<(), AdapterError> {
        staked_tvl(&self.addresses, &self.oracle, ctx, accumulator).await
    }

    pub async fn tvl(
        &self,
        ctx: &QueryContext<'_>,
        balances: &mut Balances,
        unwrapper: &dyn LpUnwrapper,
        accumulator: &mut dyn UsdAccumulator,
    ) -> Result<(), AdapterError> {
        auto_compounder_tvl(&self.addresses, ctx, balances, unwrapper, accumulator).await
    }

    /// Runs both valuations against fresh accumulators, unwrapping with the Velodrome pools.
    pub async fn run_cycle(&self, ctx: &QueryContext<'_>) -> Result<TvlReport, AdapterError> {
        let unwrapper = self.unwrapper();

        let mut tvl = UsdTotal::new();
        let mut balances = Balances::new();
        self.tvl(ctx, &mut balances, &unwrapper, &mut tvl)
            .await?;

        let mut staking = UsdTotal::new();
        self.staking(ctx, &mut staking)
            .await?;

        let report = TvlReport { chain: ctx.chain(), tvl: tvl.value(), staking: staking.value() };
        info!("{} TVL ${:.2}, staking ${:.2}", report.chain, report.tvl, report.staking);
        Ok(report)
    }
}
