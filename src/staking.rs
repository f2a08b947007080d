//! Value of ITP staked in the Infinite Trading vault.

use tracing::{debug, info};

use crate::{
    abi::IInfiniteVault,
    accumulator::UsdAccumulator,
    addresses::AddressBook,
    chain::QueryContext,
    error::AdapterError,
    oracle::{scale_down, PriceOracle, RATE_DECIMALS},
};

/// Decimals of the ITP token, and therefore of the vault's staked total.
pub const ITP_DECIMALS: u8 = 18;

/// Prices ITP with the oracle, reads the vault's total stake and adds `price * staked` to the
/// accumulator.
///
/// On any network other than the address book's, a single zero is added instead. Downstream
/// consumers have always received that write, so it is kept.
pub async fn staked_tvl(
    addresses: &AddressBook,
    oracle: &PriceOracle,
    ctx: &QueryContext<'_>,
    accumulator: &mut dyn UsdAccumulator,
) -> Result<(), AdapterError> {
    if ctx.chain() != addresses.chain {
        debug!("Staking vault is not deployed on {}, reporting 0", ctx.chain());
        accumulator.add_usd_value(0.0);
        return Ok(());
    }

    let rates = oracle
        .rates(ctx, addresses.oracle_tokens())
        .await?;
    let itp_rate = rates.first().copied().ok_or_else(|| {
        AdapterError::MalformedResponse("price oracle returned no rates".to_string())
    })?;
    let price = scale_down(itp_rate, RATE_DECIMALS)?;

    let vault_info = ctx
        .call(addresses.staking_vault, &IInfiniteVault::getVaultInfoCall {})
        .await?;
    let staked = scale_down(vault_info._0, ITP_DECIMALS)?;

    let staked_tvl = staked * price;
    info!("Staked ITP: {:.4} at ${:.6} = ${:.2}", staked, price, staked_tvl);

    accumulator.add_usd_value(staked_tvl);
    Ok(())
}
