use alloy::primitives::{Address, U256};
use tracing::{debug, warn};

use crate::{abi::IVeloOracle, addresses::AddressBook, chain::QueryContext, error::AdapterError};

/// Number of source tokens at the head of the oracle's token list. Everything after it is a
/// connector, the last entry being the quote token.
pub const QUOTE_INDEX: u8 = 1;

/// Oracle rates are fixed point with this many decimals, independent of the token's own.
pub const RATE_DECIMALS: u8 = 18;

/// Converts a raw on-chain integer into a float by parsing its decimal representation and
/// dividing by `10^decimals`.
pub fn scale_down(raw: U256, decimals: u8) -> Result<f64, AdapterError> {
    let value: f64 = raw
        .to_string()
        .parse()
        .map_err(|e| AdapterError::MalformedResponse(format!("cannot represent {raw}: {e}")))?;
    Ok(value / 10f64.powi(i32::from(decimals)))
}

/// Velodrome spot price oracle, quoting every token against a stablecoin through a fixed set of
/// connector tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceOracle {
    address: Address,
    connectors: Vec<Address>,
    quote: Address,
}

impl PriceOracle {
    pub fn new(address: Address, connectors: Vec<Address>, quote: Address) -> Self {
        Self { address, connectors, quote }
    }

    /// Oracle routed through VELO, WETH and OP, quoted in USDC.
    pub fn from_address_book(addresses: &AddressBook) -> Self {
        Self::new(
            addresses.price_oracle,
            vec![addresses.velo, addresses.weth, addresses.op, addresses.usdc],
            addresses.usdc,
        )
    }

    /// Raw `getManyRatesWithConnectors` read for an explicit token list.
    pub async fn rates(
        &self,
        ctx: &QueryContext<'_>,
        tokens: Vec<Address>,
    ) -> Result<Vec<U256>, AdapterError> {
        let call = IVeloOracle::getManyRatesWithConnectorsCall {
            src_len: QUOTE_INDEX,
            connectors: tokens,
        };
        let result = ctx.call(self.address, &call).await?;
        Ok(result.rates)
    }

    /// USD price of each token, in input order, using one batched read. The quote token is
    /// priced at 1.0 without touching the oracle; tokens without a route come back as 0.0.
    pub async fn usd_prices(
        &self,
        ctx: &QueryContext<'_>,
        tokens: &[Address],
    ) -> Result<Vec<f64>, AdapterError> {
        let calls: Vec<(Address, IVeloOracle::getManyRatesWithConnectorsCall)> = tokens
            .iter()
            .filter(|token| **token != self.quote)
            .map(|token| (self.address, self.price_call(*token)))
            .collect();
        let mut results = ctx.multi_call(&calls).await?.into_iter();

        let mut prices = Vec::with_capacity(tokens.len());
        for token in tokens {
            if *token == self.quote {
                prices.push(1.0);
                continue;
            }
            let rates = results
                .next()
                .ok_or_else(|| {
                    AdapterError::MalformedResponse("oracle batch ended early".to_string())
                })?
                .rates;
            let rate = rates.first().copied().ok_or_else(|| {
                AdapterError::MalformedResponse(format!("oracle returned no rate for {token}"))
            })?;
            if rate.is_zero() {
                warn!("No oracle route for {}, pricing at 0", token);
            }
            let price = scale_down(rate, RATE_DECIMALS)?;
            debug!("Oracle price for {}: {}", token, price);
            prices.push(price);
        }
        Ok(prices)
    }

    fn price_call(&self, token: Address) -> IVeloOracle::getManyRatesWithConnectorsCall {
        let mut connectors = Vec::with_capacity(self.connectors.len() + 1);
        connectors.push(token);
        connectors.extend_from_slice(&self.connectors);
        IVeloOracle::getManyRatesWithConnectorsCall { src_len: QUOTE_INDEX, connectors }
    }
}
