use std::{
    collections::{HashMap, HashSet},
    str::FromStr,
};

use alloy::primitives::Address;

use crate::{chain::Chain, error::AdapterError};

/// Shared cross-protocol asset registry, keyed by chain name then symbol.
const CORE_ASSETS_JSON: &str = include_str!("assets/core_assets.json");

pub const ITP_STAKING_VAULT: &str = "0x23371aEEaF8718955C93aEC726b3CAFC772B9E37";
pub const ITP_TOKEN: &str = "0x0a7B751FcDBBAA8BB988B9217ad5Fb5cfe7bf7A0";
pub const VELO_PRICE_ORACLE: &str = "0x395942C2049604a314d39F370Dfb8D87AAC89e16";
pub const VELO_TOKEN: &str = "0x3c8b650257cfb5f272f799f5e2b4e65093a11a05";

/// (name, vault, LP token) for every auto-compounding strategy.
pub const AUTO_COMPOUNDERS: [(&str, &str, &str); 6] = [
    (
        "ITP/VELO",
        "0x569D92f0c94C04C74c2f3237983281875D9e2247",
        "0xC04754F8027aBBFe9EeA492C9cC78b66946a07D1",
    ),
    (
        "ITP/DHT",
        "0xFCEa66a3333a4A3d911ce86cEf8Bdbb8bC16aCA6",
        "0x3d5cbc66c366a51975918a132b1809c34d5c6fa2",
    ),
    (
        "ITP/wstETH",
        "0x2811a577cf57A2Aa34e94B0Eb56157066717563f",
        "0xdAD7B4C48b5B0BE1159c674226BE19038814eBf6",
    ),
    (
        "ITP/OP",
        "0x8A2e22BdA1fF16bdEf27b6072e087452fa874b69",
        "0x79F1af622FE2C636a2d946F03A62D1DfC8cA6de4",
    ),
    (
        "ITP/WBTC",
        "0x3092F8dE262F363398F15DDE5E609a752938Cc11",
        "0x93e40C357C4Dc57b5d2B9198a94Da2bD1C2e89cA",
    ),
    (
        "ITP/USDC",
        "0xC4628802a42F83E5bce3caB05A4ac2F6E485F276",
        "0xB84C932059A49e82C2c1bb96E29D59Ec921998Be",
    ),
];

/// Parses a hex address, rejecting empty strings and the zero address.
pub fn parse_address(name: &str, value: &str) -> Result<Address, AdapterError> {
    let invalid =
        || AdapterError::InvalidAddress { name: name.to_string(), value: value.to_string() };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }
    let address = Address::from_str(trimmed).map_err(|_| invalid())?;
    if address.is_zero() {
        return Err(invalid());
    }
    Ok(address)
}

#[derive(Debug, Clone, Default)]
pub struct CoreAssets {
    chains: HashMap<String, HashMap<String, Address>>,
}

impl CoreAssets {
    pub fn bundled() -> Result<Self, AdapterError> {
        Self::from_json(CORE_ASSETS_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, AdapterError> {
        let raw: HashMap<String, HashMap<String, String>> = serde_json::from_str(json)
            .map_err(|e| AdapterError::Config(format!("Failed to parse core assets: {e}")))?;

        let mut chains = HashMap::with_capacity(raw.len());
        for (chain, symbols) in raw {
            let mut assets = HashMap::with_capacity(symbols.len());
            for (symbol, value) in symbols {
                let address = parse_address(&format!("{chain}.{symbol}"), &value)?;
                assets.insert(symbol, address);
            }
            chains.insert(chain, assets);
        }
        Ok(Self { chains })
    }

    pub fn get(&self, chain: Chain, symbol: &str) -> Result<Address, AdapterError> {
        self.chains
            .get(chain.as_str())
            .and_then(|assets| assets.get(symbol))
            .copied()
            .ok_or_else(|| AdapterError::MissingAddress {
                chain: chain.to_string(),
                symbol: symbol.to_string(),
            })
    }
}

/// A compounding vault and the LP token it accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoCompounder {
    pub name: &'static str,
    pub vault: Address,
    pub lp_token: Address,
}

/// Every address the adapter reads, validated once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressBook {
    pub chain: Chain,
    pub staking_vault: Address,
    pub itp: Address,
    pub price_oracle: Address,
    pub velo: Address,
    pub weth: Address,
    pub op: Address,
    pub usdc: Address,
    pub auto_compounders: Vec<AutoCompounder>,
}

impl AddressBook {
    pub fn optimism() -> Result<Self, AdapterError> {
        Self::optimism_with(&CoreAssets::bundled()?)
    }

    pub fn optimism_with(core: &CoreAssets) -> Result<Self, AdapterError> {
        let chain = Chain::Optimism;
        let auto_compounders = AUTO_COMPOUNDERS
            .iter()
            .map(|&(name, vault, lp)| {
                Ok(AutoCompounder {
                    name,
                    vault: parse_address(&format!("{name} vault"), vault)?,
                    lp_token: parse_address(&format!("{name} LP"), lp)?,
                })
            })
            .collect::<Result<Vec<_>, AdapterError>>()?;

        let book = Self {
            chain,
            staking_vault: parse_address("ITP staking vault", ITP_STAKING_VAULT)?,
            itp: parse_address("ITP", ITP_TOKEN)?,
            price_oracle: parse_address("VELO price oracle", VELO_PRICE_ORACLE)?,
            velo: parse_address("VELO", VELO_TOKEN)?,
            weth: core.get(chain, "WETH_1")?,
            op: core.get(chain, "OP")?,
            usdc: core.get(chain, "USDC_CIRCLE")?,
            auto_compounders,
        };
        book.validate()?;
        Ok(book)
    }

    /// Checks invariants that individual address parsing cannot: at least one compounder and
    /// no vault listed twice. LP tokens may repeat.
    pub fn validate(&self) -> Result<(), AdapterError> {
        if self.auto_compounders.is_empty() {
            return Err(AdapterError::Config("No auto-compounders configured".to_string()));
        }
        let mut seen = HashSet::new();
        for compounder in &self.auto_compounders {
            if !seen.insert(compounder.vault) {
                return Err(AdapterError::Config(format!(
                    "Auto-compounder vault {} listed twice",
                    compounder.vault
                )));
            }
        }
        Ok(())
    }

    /// Tokens passed to the oracle for the staking price: ITP first, then the connectors, with
    /// the quote stablecoin last.
    pub fn oracle_tokens(&self) -> Vec<Address> {
        vec![self.itp, self.velo, self.weth, self.op, self.usdc]
    }
}
