//! Append-only CSV log of successful evaluations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// The log store could not be used.
///
/// Callers in the evaluation flow treat every variant as "logging
/// unavailable" and carry on without history.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("log store {} is unavailable: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("log store {} could not be encoded or decoded: {source}", .path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One row of the log store. Field order defines the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub expression: String,
    pub result: String,
}

/// Appends evaluation records to a CSV file.
///
/// The file is created on first write, with a `timestamp,expression,result`
/// header. Appends from several threads are serialised, so rows never
/// interleave.
#[derive(Debug)]
pub struct EvaluationLogger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl EvaluationLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a record stamped with the current UTC time.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] if the store cannot be created, opened for
    /// appending, or written.
    pub fn record(&self, expression: &str, result: impl fmt::Display) -> Result<(), LogError> {
        self.append(&LogRecord {
            timestamp: Utc::now(),
            expression: expression.to_string(),
            result: result.to_string(),
        })
    }

    /// Appends an already built record.
    pub fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        // The mutex guards the file, not data of its own, so a poisoned lock is still usable.
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.unavailable(source))?;
        let needs_header = file
            .metadata()
            .map_err(|source| self.unavailable(source))?
            .len()
            == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer
            .serialize(record)
            .map_err(|source| self.encoding(source))?;
        writer.flush().map_err(|source| self.unavailable(source))?;

        tracing::debug!(
            path = %self.path.display(),
            expression = %record.expression,
            result = %record.result,
            "appended evaluation record"
        );
        Ok(())
    }

    /// Reads every record in the store, oldest first. A missing store is an
    /// empty history.
    pub fn read_records(&self) -> Result<Vec<LogRecord>, LogError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.unavailable(err)),
        };

        csv::Reader::from_reader(file)
            .deserialize()
            .collect::<Result<Vec<LogRecord>, _>>()
            .map_err(|source| self.encoding(source))
    }

    fn unavailable(&self, source: io::Error) -> LogError {
        LogError::Unavailable {
            path: self.path.clone(),
            source,
        }
    }

    fn encoding(&self, source: csv::Error) -> LogError {
        LogError::Encoding {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluate;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn logger_in(dir: &TempDir) -> EvaluationLogger {
        EvaluationLogger::new(dir.path().join("calculator_log.csv"))
    }

    #[test]
    fn test_first_record_creates_store_with_header() {
        let dir = TempDir::new().unwrap();
        let logger = logger_in(&dir);
        assert!(!logger.path().exists());

        logger.record("1+1", evaluate("1+1").unwrap()).unwrap();

        let content = fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "timestamp,expression,result");
        assert!(lines[1].ends_with(",1+1,2"));
    }

    #[test]
    fn test_records_append_in_call_order() {
        let dir = TempDir::new().unwrap();
        let logger = logger_in(&dir);

        logger.record("1+1", evaluate("1+1").unwrap()).unwrap();
        logger.record("10/4", evaluate("10/4").unwrap()).unwrap();

        let content = fs::read_to_string(logger.path()).unwrap();
        assert_eq!(content.lines().filter(|l| *l == "timestamp,expression,result").count(), 1);

        let records = logger.read_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].expression, "1+1");
        assert_eq!(records[0].result, "2");
        assert_eq!(records[1].expression, "10/4");
        assert_eq!(records[1].result, "2.5");
        assert!(records[0].timestamp <= records[1].timestamp);

        for line in content.lines().skip(1) {
            let timestamp = line.split(',').next().unwrap();
            assert!(DateTime::parse_from_rfc3339(timestamp).is_ok(), "{timestamp}");
        }
    }

    #[test]
    fn test_existing_store_is_not_given_a_second_header() {
        let dir = TempDir::new().unwrap();
        let logger = logger_in(&dir);
        logger.record("2**3", "8").unwrap();

        let reopened = logger_in(&dir);
        reopened.record("2*3+4", "10").unwrap();

        let content = fs::read_to_string(reopened.path()).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert_eq!(content.lines().next(), Some("timestamp,expression,result"));
    }

    #[test]
    fn test_empty_existing_store_gets_header() {
        let dir = TempDir::new().unwrap();
        let logger = logger_in(&dir);
        fs::write(logger.path(), "").unwrap();

        logger.record("1", "1").unwrap();

        let content = fs::read_to_string(logger.path()).unwrap();
        assert_eq!(content.lines().next(), Some("timestamp,expression,result"));
    }

    #[test]
    fn test_fields_are_quoted() {
        let dir = TempDir::new().unwrap();
        let logger = logger_in(&dir);

        logger.record("a, \"b\"", "c\nd").unwrap();

        let records = logger.read_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].expression, "a, \"b\"");
        assert_eq!(records[0].result, "c\nd");
    }

    #[test]
    fn test_missing_parent_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let logger = EvaluationLogger::new(dir.path().join("missing").join("log.csv"));

        let err = logger.record("1+1", "2").unwrap_err();
        assert!(matches!(err, LogError::Unavailable { .. }));
        assert!(err.to_string().contains("is unavailable"));
    }

    #[test]
    fn test_directory_as_store_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let logger = EvaluationLogger::new(dir.path());

        assert!(matches!(logger.record("1+1", "2"), Err(LogError::Unavailable { .. })));
    }

    #[test]
    fn test_reading_missing_store_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(logger_in(&dir).read_records().unwrap().is_empty());
    }

    #[test]
    fn test_reading_corrupt_store_is_an_encoding_error() {
        let dir = TempDir::new().unwrap();
        let logger = logger_in(&dir);
        fs::write(logger.path(), "timestamp,expression,result\nnot-a-time,1,1\n").unwrap();

        assert!(matches!(logger.read_records(), Err(LogError::Encoding { .. })));
    }

    #[test]
    fn test_concurrent_records_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let logger = Arc::new(logger_in(&dir));

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let logger = Arc::clone(&logger);
                thread::spawn(move || {
                    for i in 0..25 {
                        let expression = format!("{worker}+{i}");
                        logger.record(&expression, worker + i).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(logger.path()).unwrap();
        assert_eq!(content.lines().count(), 201);
        assert_eq!(content.lines().filter(|l| l.starts_with("timestamp")).count(), 1);

        let records = logger.read_records().unwrap();
        assert_eq!(records.len(), 200);
        for record in &records {
            let (a, b) = record.expression.split_once('+').unwrap();
            let sum: i32 = a.parse::<i32>().unwrap() + b.parse::<i32>().unwrap();
            assert_eq!(record.result, sum.to_string());
        }
    }
}
