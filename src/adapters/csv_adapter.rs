//! Line-oriented `timestamp,price` file adapter.
//!
//! Each non-blank line holds an integer unix timestamp and a price, with no
//! header row. Samples are sorted by timestamp after loading; equal
//! timestamps keep their file order. The file is read once per adapter and
//! the parsed samples are reused by later calls.

use crate::domain::error::ReplayError;
use crate::domain::sample::{within_range, Sample};
use crate::ports::data_port::DataPort;
use std::cell::OnceCell;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
    samples: OnceCell<Vec<Sample>>,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            samples: OnceCell::new(),
        }
    }

    fn samples(&self) -> Result<&[Sample], ReplayError> {
        if let Some(samples) = self.samples.get() {
            return Ok(samples.as_slice());
        }
        let loaded = self.load()?;
        Ok(self.samples.get_or_init(|| loaded).as_slice())
    }

    fn load(&self) -> Result<Vec<Sample>, ReplayError> {
        let content = fs::read_to_string(&self.path).map_err(|e| ReplayError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut samples = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| ReplayError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let timestamp: i64 = record
                .get(0)
                .ok_or_else(|| ReplayError::Data {
                    reason: format!("line {line}: missing timestamp column"),
                })?
                .parse()
                .map_err(|e| ReplayError::Data {
                    reason: format!("line {line}: invalid timestamp: {e}"),
                })?;

            let price: f64 = record
                .get(1)
                .ok_or_else(|| ReplayError::Data {
                    reason: format!("line {line}: missing price column"),
                })?
                .parse()
                .map_err(|e| ReplayError::Data {
                    reason: format!("line {line}: invalid price: {e}"),
                })?;

            samples.push(Sample::new(timestamp, price));
        }

        samples.sort_by_key(|s| s.timestamp);
        tracing::info!(
            samples = samples.len(),
            path = %self.path.display(),
            "historical data loaded"
        );
        Ok(samples)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_samples(&self, start: i64, end: i64) -> Result<Vec<Sample>, ReplayError> {
        Ok(within_range(self.samples()?, start, end))
    }

    fn get_data_range(&self) -> Result<Option<(i64, i64, usize)>, ReplayError> {
        let samples = self.samples()?;
        Ok(match (samples.first(), samples.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp, samples.len())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("HistoricalBTCdata.txt");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn fetch_samples_returns_correct_data() {
        let (_dir, path) = setup("0,100.5\n60,101.0\n120,99.25\n");
        let adapter = CsvAdapter::new(path);

        let samples = adapter.fetch_samples(0, 120).unwrap();
        assert_eq!(
            samples,
            vec![
                Sample::new(0, 100.5),
                Sample::new(60, 101.0),
                Sample::new(120, 99.25)
            ]
        );
    }

    #[test]
    fn fetch_samples_filters_by_range() {
        let (_dir, path) = setup("0,1\n60,2\n120,3\n180,4\n");
        let adapter = CsvAdapter::new(path);

        let samples = adapter.fetch_samples(60, 120).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, 60);
        assert_eq!(samples[1].timestamp, 120);
    }

    #[test]
    fn blank_lines_and_whitespace_are_ignored() {
        let (_dir, path) = setup("0, 1.5\n\n60 ,2.5\n\n");
        let adapter = CsvAdapter::new(path);

        let samples = adapter.fetch_samples(i64::MIN, i64::MAX).unwrap();
        assert_eq!(samples, vec![Sample::new(0, 1.5), Sample::new(60, 2.5)]);
    }

    #[test]
    fn unsorted_file_is_sorted() {
        let (_dir, path) = setup("120,3\n0,1\n60,2\n");
        let adapter = CsvAdapter::new(path);

        let stamps: Vec<i64> = adapter
            .fetch_samples(0, 200)
            .unwrap()
            .iter()
            .map(|s| s.timestamp)
            .collect();
        assert_eq!(stamps, vec![0, 60, 120]);
    }

    #[test]
    fn nan_price_is_loaded_for_downstream_rejection() {
        let (_dir, path) = setup("0,NaN\n");
        let adapter = CsvAdapter::new(path);
        let samples = adapter.fetch_samples(0, 0).unwrap();
        assert!(samples[0].price.is_nan());
    }

    #[test]
    fn invalid_timestamp_is_an_error() {
        let (_dir, path) = setup("0,1\nnoon,2\n");
        let adapter = CsvAdapter::new(path);
        let err = adapter.fetch_samples(0, 100).unwrap_err();
        assert!(matches!(err, ReplayError::Data { reason } if reason.contains("invalid timestamp")));
    }

    #[test]
    fn missing_price_is_an_error() {
        let (_dir, path) = setup("0\n");
        let adapter = CsvAdapter::new(path);
        let err = adapter.fetch_samples(0, 100).unwrap_err();
        assert!(matches!(err, ReplayError::Data { reason } if reason.contains("missing price")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/HistoricalBTCdata.txt"));
        assert!(adapter.fetch_samples(0, 1).is_err());
    }

    #[test]
    fn data_range_reports_bounds_and_count() {
        let (_dir, path) = setup("60,2\n0,1\n180,4\n");
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.get_data_range().unwrap(), Some((0, 180, 3)));
    }

    #[test]
    fn file_is_read_once() {
        let (_dir, path) = setup("0,1\n60,2\n");
        let adapter = CsvAdapter::new(path.clone());
        assert_eq!(adapter.get_data_range().unwrap(), Some((0, 60, 2)));

        fs::remove_file(&path).unwrap();
        let samples = adapter.fetch_samples(0, 60).unwrap();
        assert_eq!(samples, vec![Sample::new(0, 1.0), Sample::new(60, 2.0)]);
    }

    #[test]
    fn failed_load_is_retried() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("late.txt");
        let adapter = CsvAdapter::new(path.clone());
        assert!(adapter.get_data_range().is_err());

        fs::write(&path, "0,5\n").unwrap();
        assert_eq!(adapter.get_data_range().unwrap(), Some((0, 0, 1)));
    }

    #[test]
    fn data_range_of_empty_file_is_none() {
        let (_dir, path) = setup("");
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.get_data_range().unwrap(), None);
    }
}
