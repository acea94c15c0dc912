//! Sample source port trait.

use crate::domain::error::ReplayError;
use crate::domain::sample::Sample;

pub trait DataPort {
    /// Samples with `start <= timestamp <= end`, in chronological order.
    fn fetch_samples(&self, start: i64, end: i64) -> Result<Vec<Sample>, ReplayError>;

    /// `(first timestamp, last timestamp, sample count)`, or `None` when the
    /// source holds no samples.
    fn get_data_range(&self) -> Result<Option<(i64, i64, usize)>, ReplayError>;
}
