//! CSV file market data adapter.
//!
//! One file per market and interval under the base directory:
//! `{MARKET}_day.csv` for daily candles and `{MARKET}_m{unit}.csv` for
//! minute candles, each with the header
//! `timestamp,open,high,low,close,volume`. Timestamps are
//! `%Y-%m-%d %H:%M:%S`, `%Y-%m-%dT%H:%M:%S` or a bare `%Y-%m-%d`.

use crate::domain::candle::{sort_candles, Candle};
use crate::domain::error::CoinbotError;
use crate::ports::market_data_port::MarketDataSource;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn day_path(&self, market: &str) -> PathBuf {
        self.base_path.join(format!("{}_day.csv", market))
    }

    pub fn minute_path(&self, market: &str, unit_minutes: u32) -> PathBuf {
        self.base_path
            .join(format!("{}_m{}.csv", market, unit_minutes))
    }

    /// Every candle in `path`, oldest first.
    pub fn read_candles(&self, path: &Path, market: &str) -> Result<Vec<Candle>, CoinbotError> {
        let fetch_error = |reason: String| CoinbotError::DataFetch {
            market: market.to_string(),
            reason,
        };

        let content = fs::read_to_string(path)
            .map_err(|e| fetch_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| fetch_error(format!("CSV parse error: {}", e)))?;

            let field = |index: usize, name: &str| -> Result<&str, CoinbotError> {
                record
                    .get(index)
                    .map(str::trim)
                    .ok_or_else(|| fetch_error(format!("missing {} column", name)))
            };
            let number = |index: usize, name: &str| -> Result<f64, CoinbotError> {
                field(index, name)?
                    .parse()
                    .map_err(|e| fetch_error(format!("invalid {} value: {}", name, e)))
            };

            let ts_str = field(0, "timestamp")?;
            let timestamp = parse_timestamp(ts_str)
                .ok_or_else(|| fetch_error(format!("invalid timestamp: {}", ts_str)))?;

            candles.push(Candle {
                timestamp,
                open: number(1, "open")?,
                high: number(2, "high")?,
                low: number(3, "low")?,
                close: number(4, "close")?,
                volume: number(5, "volume")?,
            });
        }

        sort_candles(&mut candles);
        Ok(candles)
    }

    fn latest(&self, path: &Path, market: &str, count: usize) -> Result<Vec<Candle>, CoinbotError> {
        let mut candles = self.read_candles(path, market)?;
        let skip = candles.len().saturating_sub(count);
        candles.drain(..skip);
        Ok(candles)
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl MarketDataSource for CsvAdapter {
    fn get_minute_candles(
        &self,
        market: &str,
        unit_minutes: u32,
        count: usize,
    ) -> Result<Vec<Candle>, CoinbotError> {
        self.latest(&self.minute_path(market, unit_minutes), market, count)
    }

    fn get_day_candles(&self, market: &str, count: usize) -> Result<Vec<Candle>, CoinbotError> {
        self.latest(&self.day_path(market), market, count)
    }
}
