use std::fs::File;
use std::io::Read;
use std::path::Path;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::config::dataset::DatasetConfig;
use crate::error::{Error, Result};
use crate::market_data::ema::ema_series;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    /// `(length, value)` pairs in the order the lengths were requested.
    pub emas: Vec<(usize, f64)>,
}

impl Row {
    pub fn ema(&self, length: usize) -> Option<f64> {
        self.emas
            .iter()
            .find(|(l, _)| *l == length)
            .map(|(_, value)| *value)
    }
}

/// Close prices with EMA columns behind a forward-only cursor.
#[derive(Debug)]
pub struct Dataset {
    rows: Vec<Row>,
    ema_lengths: Vec<usize>,
    next: usize,
}

impl Dataset {
    pub fn from_config(config: &DatasetConfig) -> Result<Self> {
        Self::from_path(&config.csv_file, &config.ema_lengths)
    }

    pub fn from_path(path: impl AsRef<Path>, ema_lengths: &[usize]) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        tracing::info!("Loading price series from {}", path.display());
        Self::from_reader(file, ema_lengths)
    }

    /// Read a CSV with `timestamp` and `close` columns. Other columns are ignored.
    pub fn from_reader<R: Read>(reader: R, ema_lengths: &[usize]) -> Result<Self> {
        if ema_lengths.contains(&0) {
            return Err(Error::DatasetError("EMA length must be >= 1".to_string()));
        }

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::DatasetError(format!("missing column: {}", name)))
        };
        let timestamp_col = column("timestamp")?;
        let close_col = column("close")?;

        let mut timestamps = Vec::new();
        let mut closes = Vec::new();
        for (line, record) in rdr.records().enumerate() {
            let record = record?;
            let raw_ts = record.get(timestamp_col).unwrap_or_default();
            let raw_close = record.get(close_col).unwrap_or_default();

            let close: f64 = raw_close.parse().map_err(|_| {
                Error::DatasetError(format!("row {}: unparseable close '{}'", line + 1, raw_close))
            })?;
            if !(close.is_finite() && close > 0.0) {
                return Err(Error::DatasetError(format!(
                    "row {}: close must be positive, got {}",
                    line + 1,
                    close
                )));
            }

            timestamps.push(parse_timestamp(raw_ts)?);
            closes.push(close);
        }

        let columns: Vec<Vec<f64>> = ema_lengths
            .iter()
            .map(|length| ema_series(&closes, *length))
            .collect();

        let warmup = ema_lengths.iter().max().copied().unwrap_or(0) * crate::EMA_WARMUP_MULTIPLIER;
        let rows: Vec<Row> = timestamps
            .into_iter()
            .zip(closes)
            .enumerate()
            .skip(warmup)
            .map(|(i, (timestamp, close))| Row {
                timestamp,
                close,
                emas: ema_lengths
                    .iter()
                    .zip(&columns)
                    .map(|(length, column)| (*length, column[i]))
                    .collect(),
            })
            .collect();

        if rows.is_empty() {
            return Err(Error::DatasetError(format!(
                "no rows left after dropping {} warm-up rows",
                warmup
            )));
        }

        tracing::info!("Loaded {} rows, dropped {} warm-up rows", rows.len(), warmup);

        Ok(Dataset {
            rows,
            ema_lengths: ema_lengths.to_vec(),
            next: 0,
        })
    }

    pub fn ema_lengths(&self) -> &[usize] {
        &self.ema_lengths
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows already handed out since the last reset.
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Advance and return the next row, `None` once exhausted.
    pub fn step(&mut self) -> Option<&Row> {
        let row = self.rows.get(self.next)?;
        self.next += 1;
        Some(row)
    }

    /// Most recently returned row.
    pub fn current(&self) -> Option<&Row> {
        self.next.checked_sub(1).and_then(|i| self.rows.get(i))
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Some(ts) = raw.parse::<i64>().ok().and_then(DateTime::<Utc>::from_timestamp_millis) {
        return Ok(ts);
    }
    Err(Error::DatasetError(format!("unparseable timestamp '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_with_closes(closes: &[f64]) -> String {
        let mut out = String::from("timestamp,open,high,low,close,volume\n");
        for (i, close) in closes.iter().enumerate() {
            out.push_str(&format!(
                "2023-05-01 00:{:02}:00,{c},{c},{c},{c},1.0\n",
                i % 60,
                c = close
            ));
        }
        out
    }

    #[test]
    fn test_no_ema_keeps_every_row() {
        let mut dataset = Dataset::from_reader(csv_with_closes(&[1.0, 2.0, 3.0]).as_bytes(), &[]).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.step().unwrap().close, 1.0);
        assert!(dataset.step().unwrap().emas.is_empty());
    }

    #[test]
    fn test_warmup_rows_are_dropped() {
        let closes: Vec<f64> = (1..=20).map(|v| v as f64).collect();
        let mut dataset = Dataset::from_reader(csv_with_closes(&closes).as_bytes(), &[1, 3]).unwrap();

        // max(1, 3) * 5 = 15 warm-up rows
        assert_eq!(dataset.len(), 5);
        let row = dataset.step().unwrap();
        assert_eq!(row.close, 16.0);
        assert_eq!(row.ema(1), Some(16.0));
        assert!(row.ema(3).unwrap() < 16.0);
        assert_eq!(row.ema(7), None);
    }

    #[test]
    fn test_warmup_scales_with_longest_length() {
        let closes: Vec<f64> = (1..=6).map(|v| v as f64).collect();
        let mut dataset = Dataset::from_reader(csv_with_closes(&closes).as_bytes(), &[1]).unwrap();
        // warm-up of 5 drops the first five rows
        let row = dataset.step().unwrap();
        assert_eq!(row.close, 6.0);
        assert_eq!(dataset.ema_lengths(), &[1]);
    }

    #[test]
    fn test_cursor_is_forward_only_and_rewinds() {
        let mut dataset = Dataset::from_reader(csv_with_closes(&[10.0, 11.0]).as_bytes(), &[]).unwrap();
        assert!(dataset.current().is_none());
        assert_eq!(dataset.step().unwrap().close, 10.0);
        assert_eq!(dataset.current().unwrap().close, 10.0);
        assert_eq!(dataset.step().unwrap().close, 11.0);
        assert!(dataset.step().is_none());
        assert!(dataset.step().is_none());
        assert_eq!(dataset.position(), 2);

        dataset.reset();
        assert_eq!(dataset.position(), 0);
        assert_eq!(dataset.step().unwrap().close, 10.0);
    }

    #[test]
    fn test_timestamp_formats() {
        let csv = "timestamp,close\n2023-05-01T00:00:00Z,1.0\n2023-05-01 00:01:00,2.0\n1682899320000,3.0\n";
        let mut dataset = Dataset::from_reader(csv.as_bytes(), &[]).unwrap();
        let first = dataset.step().unwrap().timestamp;
        let second = dataset.step().unwrap().timestamp;
        let third = dataset.step().unwrap().timestamp;
        assert_eq!((second - first).num_seconds(), 60);
        assert_eq!((third - second).num_seconds(), 60);
    }

    #[test]
    fn test_rejects_bad_input() {
        let missing = "time,close\n2023-05-01 00:00:00,1.0\n";
        assert!(matches!(Dataset::from_reader(missing.as_bytes(), &[]), Err(Error::DatasetError(_))));

        let negative = "timestamp,close\n2023-05-01 00:00:00,-1.0\n";
        assert!(matches!(Dataset::from_reader(negative.as_bytes(), &[]), Err(Error::DatasetError(_))));

        let too_short = csv_with_closes(&[1.0, 2.0]);
        assert!(matches!(Dataset::from_reader(too_short.as_bytes(), &[5]), Err(Error::DatasetError(_))));

        assert!(matches!(Dataset::from_reader(too_short.as_bytes(), &[0]), Err(Error::DatasetError(_))));
    }
}
