//! Value of the LP tokens held by the auto-compounding vaults.

use alloy::primitives::{Address, U256};
use tracing::{debug, info};

use crate::{
    abi::IAutoCompounder, accumulator::UsdAccumulator, addresses::AddressBook,
    balances::Balances, chain::QueryContext, error::AdapterError, unwrap::LpUnwrapper,
};

/// Registers every compounder vault's LP balance with `balances`, in registry order, then hands
/// the whole collection to `unwrapper` once to turn it into USD contributions.
///
/// Does nothing on networks other than the address book's.
pub async fn auto_compounder_tvl(
    addresses: &AddressBook,
    ctx: &QueryContext<'_>,
    balances: &mut Balances,
    unwrapper: &dyn LpUnwrapper,
    accumulator: &mut dyn UsdAccumulator,
) -> Result<(), AdapterError> {
    if ctx.chain() != addresses.chain {
        debug!("Auto-compounders are not deployed on {}, skipping", ctx.chain());
        return Ok(());
    }

    let calls: Vec<(Address, IAutoCompounder::balanceCall)> = addresses
        .auto_compounders
        .iter()
        .map(|compounder| (compounder.vault, IAutoCompounder::balanceCall {}))
        .collect();
    let held = ctx.multi_call(&calls).await?;

    let lp_balances: Vec<(Address, U256)> = addresses
        .auto_compounders
        .iter()
        .zip(held)
        .map(|(compounder, result)| {
            debug!("{} holds {} of LP {}", compounder.name, result._0, compounder.lp_token);
            (compounder.lp_token, result._0)
        })
        .collect();

    for (token, amount) in lp_balances {
        balances.add(token, amount)?;
    }
    info!("Registered LP balances of {} auto-compounders", addresses.auto_compounders.len());

    unwrapper
        .unwrap_lp_balances(balances, ctx, accumulator)
        .await
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;
    use crate::{
        addresses::AutoCompounder,
        chain::Chain,
        testing::{encode_uint, MockChainReader, RecordingAccumulator, RecordingUnwrapper},
    };

    fn reader_with_balances(addresses: &AddressBook, amounts: &[u64]) -> MockChainReader {
        addresses
            .auto_compounders
            .iter()
            .zip(amounts)
            .fold(MockChainReader::default(), |reader, (compounder, amount)| {
                reader.respond::<IAutoCompounder::balanceCall>(
                    compounder.vault,
                    encode_uint(U256::from(*amount)),
                )
            })
    }

    #[tokio::test]
    async fn test_registers_balances_in_registry_order() {
        let addresses = AddressBook::optimism().unwrap();
        let amounts = [11u64, 22, 33, 44, 55, 66];
        let reader = reader_with_balances(&addresses, &amounts);
        let ctx = QueryContext::new(Chain::Optimism, &reader);
        let unwrapper = RecordingUnwrapper::default();
        let mut balances = Balances::new();
        let mut accumulator = RecordingAccumulator::default();

        auto_compounder_tvl(&addresses, &ctx, &mut balances, &unwrapper, &mut accumulator)
            .await
            .unwrap();

        let expected: Vec<(Address, U256)> = addresses
            .auto_compounders
            .iter()
            .zip(amounts)
            .map(|(compounder, amount)| (compounder.lp_token, U256::from(amount)))
            .collect();
        assert_eq!(balances.iter().copied().collect::<Vec<_>>(), expected);

        let seen = unwrapper.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], expected);
        assert_eq!(reader.batch_count(), 1);
        assert_eq!(reader.recorded_calls().len(), 6);
    }

    #[tokio::test]
    async fn test_duplicate_lp_tokens_accumulate() {
        let mut addresses = AddressBook::optimism().unwrap();
        let shared_lp = addresses.auto_compounders[0].lp_token;
        addresses.auto_compounders.push(AutoCompounder {
            name: "ITP/VELO legacy",
            vault: address!("0x00000000000000000000000000000000000000aa"),
            lp_token: shared_lp,
        });
        let reader = reader_with_balances(&addresses, &[100, 1, 1, 1, 1, 1, 250]);
        let ctx = QueryContext::new(Chain::Optimism, &reader);
        let unwrapper = RecordingUnwrapper::default();
        let mut balances = Balances::new();
        let mut accumulator = RecordingAccumulator::default();

        auto_compounder_tvl(&addresses, &ctx, &mut balances, &unwrapper, &mut accumulator)
            .await
            .unwrap();

        assert_eq!(balances.len(), 6);
        assert_eq!(balances.get(&shared_lp), Some(U256::from(350u64)));
    }

    #[tokio::test]
    async fn test_other_networks_do_nothing() {
        let addresses = AddressBook::optimism().unwrap();
        let reader = MockChainReader::default();
        let unwrapper = RecordingUnwrapper::default();

        for chain in [Chain::Ethereum, Chain::Base, Chain::Arbitrum] {
            let ctx = QueryContext::new(chain, &reader);
            let mut balances = Balances::new();
            let mut accumulator = RecordingAccumulator::default();

            auto_compounder_tvl(&addresses, &ctx, &mut balances, &unwrapper, &mut accumulator)
                .await
                .unwrap();

            assert!(balances.is_empty());
            assert!(accumulator.writes.is_empty());
        }
        assert!(unwrapper.seen().is_empty());
        assert!(reader.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_vault_failure_fails_the_batch() {
        let addresses = AddressBook::optimism().unwrap();
        let reader = reader_with_balances(&addresses, &[1, 2, 3, 4, 5, 6])
            .fail_target(addresses.auto_compounders[3].vault);
        let ctx = QueryContext::new(Chain::Optimism, &reader);
        let unwrapper = RecordingUnwrapper::default();
        let mut balances = Balances::new();
        let mut accumulator = RecordingAccumulator::default();

        let result =
            auto_compounder_tvl(&addresses, &ctx, &mut balances, &unwrapper, &mut accumulator)
                .await;

        assert!(result.is_err());
        assert!(balances.is_empty());
        assert!(unwrapper.seen().is_empty());
    }

    #[tokio::test]
    async fn test_unwrapper_errors_propagate() {
        let addresses = AddressBook::optimism().unwrap();
        let reader = reader_with_balances(&addresses, &[1, 2, 3, 4, 5, 6]);
        let ctx = QueryContext::new(Chain::Optimism, &reader);
        let unwrapper = RecordingUnwrapper::failing();
        let mut balances = Balances::new();
        let mut accumulator = RecordingAccumulator::default();

        let result =
            auto_compounder_tvl(&addresses, &ctx, &mut balances, &unwrapper, &mut accumulator)
                .await;

        assert!(result.is_err());
        assert_eq!(unwrapper.seen().len(), 1);
    }
}
