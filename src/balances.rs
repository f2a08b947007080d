use alloy::primitives::{Address, U256};

use crate::error::AdapterError;

/// Raw token balances collected during one valuation cycle.
///
/// Registration is additive: adding a token that is already present sums the amounts. Tokens
/// iterate in the order they were first registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    entries: Vec<(Address, U256)>,
}

impl Balances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: Address, amount: U256) -> Result<(), AdapterError> {
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| *existing == token)
        {
            Some((_, balance)) => {
                *balance = balance
                    .checked_add(amount)
                    .ok_or(AdapterError::Overflow("accumulating token balances"))?;
            }
            None => self.entries.push((token, amount)),
        }
        Ok(())
    }

    pub fn get(&self, token: &Address) -> Option<U256> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == token)
            .map(|(_, amount)| *amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Address, U256)> {
        self.entries.iter()
    }

    pub fn tokens(&self) -> impl Iterator<Item = Address> + '_ {
        self.entries
            .iter()
            .map(|(token, _)| *token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;

    use super::*;

    const TOKEN_A: Address = address!("0x00000000000000000000000000000000000000a1");
    const TOKEN_B: Address = address!("0x00000000000000000000000000000000000000b2");

    #[test]
    fn test_add_accumulates_repeated_tokens() {
        let mut balances = Balances::new();
        balances.add(TOKEN_A, U256::from(5u64)).unwrap();
        balances.add(TOKEN_B, U256::from(1u64)).unwrap();
        balances.add(TOKEN_A, U256::from(7u64)).unwrap();

        assert_eq!(balances.len(), 2);
        assert_eq!(balances.get(&TOKEN_A), Some(U256::from(12u64)));
        assert_eq!(balances.get(&TOKEN_B), Some(U256::from(1u64)));
    }

    #[test]
    fn test_tokens_keep_first_registration_order() {
        let mut balances = Balances::new();
        balances.add(TOKEN_B, U256::ZERO).unwrap();
        balances.add(TOKEN_A, U256::from(3u64)).unwrap();
        balances.add(TOKEN_B, U256::from(2u64)).unwrap();

        assert_eq!(balances.tokens().collect::<Vec<_>>(), vec![TOKEN_B, TOKEN_A]);
    }

    #[test]
    fn test_add_reports_overflow() {
        let mut balances = Balances::new();
        balances.add(TOKEN_A, U256::MAX).unwrap();

        let err = balances.add(TOKEN_A, U256::from(1u64)).unwrap_err();
        assert!(matches!(err, AdapterError::Overflow(_)));
        assert_eq!(balances.get(&TOKEN_A), Some(U256::MAX));
    }

    #[test]
    fn test_missing_token() {
        let balances = Balances::new();
        assert!(balances.is_empty());
        assert_eq!(balances.get(&TOKEN_A), None);
    }
}
