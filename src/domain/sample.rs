//! Raw price samples as produced by a data source.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: i64,
    pub price: f64,
}

impl Sample {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Sample { timestamp, price }
    }
}

/// Samples whose timestamp lies in `[start, end]`, in input order.
pub fn within_range(samples: &[Sample], start: i64, end: i64) -> Vec<Sample> {
    samples
        .iter()
        .filter(|s| s.timestamp >= start && s.timestamp <= end)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(prices: &[f64]) -> Vec<Sample> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| Sample::new(i as i64 * 60, p))
            .collect()
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let samples = minutes(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let kept = within_range(&samples, 60, 180);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].timestamp, 60);
        assert_eq!(kept[2].timestamp, 180);
    }

    #[test]
    fn range_outside_data_is_empty() {
        let samples = minutes(&[1.0, 2.0]);
        assert!(within_range(&samples, 1_000, 2_000).is_empty());
    }
}
