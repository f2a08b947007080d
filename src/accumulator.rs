/// Sink for USD-denominated contributions. Writes are additive and never read back by the
/// routines that produce them.
pub trait UsdAccumulator: Send {
    fn add_usd_value(&mut self, value: f64);
}

/// Running USD total for one category of a valuation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsdTotal {
    total: f64,
    writes: usize,
}

impl UsdTotal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f64 {
        self.total
    }

    /// Number of `add_usd_value` calls received, including zero-valued ones.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl UsdAccumulator for UsdTotal {
    fn add_usd_value(&mut self, value: f64) {
        self.total += value;
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_total_sums_every_write() {
        let mut total = UsdTotal::new();
        total.add_usd_value(100.0);
        total.add_usd_value(0.0);
        total.add_usd_value(25.5);

        assert_eq!(total.value(), 125.5);
        assert_eq!(total.writes(), 3);
    }
}
