use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, WriterBuilder};

use super::{PhaseResults, RawResultRow, ResultBatch, ResultRecord};
use crate::{BenchError, Phase, QuerySummary, Result, ResultsParseError};

/// Column names of a result file, in write order
pub const RESULTS_HEADER: [&str; 5] = [
    "query",
    "min_time_ms",
    "max_time_ms",
    "avg_time_ms",
    "runs",
];

/// Slack allowed when checking `min <= avg <= max` on rows written by
/// other tools, which store unrounded floats.
const TIMING_TOLERANCE_MS: f64 = 1e-6;

/// Reads and appends `results_<phase>.csv` files in one directory.
///
/// Assumes a single writer per phase file.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, phase: &Phase) -> PathBuf {
        self.dir.join(format!("results_{}.csv", phase))
    }

    pub fn exists(&self, phase: &Phase) -> bool {
        self.path_for(phase).is_file()
    }

    /// Append `batch` to the phase's file and return the file path.
    ///
    /// The header row is written only when the file is new or empty. An
    /// empty batch still creates the file.
    #[tracing::instrument(skip_all, fields(phase = %phase, rows = batch.len()))]
    pub fn persist(&self, phase: &Phase, batch: &ResultBatch) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(phase);

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        let len = file.metadata()?.len();
        if len > 0 && !ends_with_newline(&mut file)? {
            file.write_all(b"\n")?;
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if len == 0 {
            writer.write_record(RESULTS_HEADER)?;
        }
        for summary in batch {
            writer.write_record([
                summary.label.clone(),
                format!("{:.2}", summary.min_ms),
                format!("{:.2}", summary.max_ms),
                format!("{:.2}", summary.avg_ms),
                summary.run_count.to_string(),
            ])?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), "results appended");
        Ok(path)
    }

    /// Read every row of the phase's file.
    ///
    /// Rows that do not parse are kept as [`ResultRecord::Degraded`] with a
    /// matching [`ResultsParseError`]; only a missing file or an unreadable
    /// one fails the call.
    pub fn load(&self, phase: &Phase) -> Result<PhaseResults> {
        let path = self.path_for(phase);
        if !path.is_file() {
            return Err(BenchError::ResultsNotFound {
                phase: phase.clone(),
                path,
            });
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;

        let mut columns: Option<ColumnMap> = None;
        let mut records = Vec::new();
        let mut errors = Vec::new();

        for (index, result) in reader.byte_records().enumerate() {
            let record = result?;
            let row = record
                .position()
                .map_or(index + 1, |position| position.line() as usize);

            if is_blank(&record) {
                continue;
            }

            let map = match columns {
                Some(map) => {
                    if map.is_header(&record) {
                        tracing::debug!(row, "skipping repeated header row");
                        continue;
                    }
                    map
                }
                None => match ColumnMap::from_header(&record) {
                    Some(map) => {
                        columns = Some(map);
                        continue;
                    }
                    None => {
                        // Headerless file: assume the standard column order.
                        let map = ColumnMap::positional();
                        columns = Some(map);
                        map
                    }
                },
            };

            match map.parse(&record) {
                Ok(summary) => records.push(ResultRecord::Summary(summary)),
                Err(cause) => {
                    tracing::warn!(row, %cause, "degraded result row");
                    records.push(ResultRecord::Degraded(map.raw(&record)));
                    errors.push(ResultsParseError { row, cause });
                }
            }
        }

        Ok(PhaseResults {
            phase: phase.clone(),
            path,
            records,
            errors,
        })
    }

    /// Delete the phase's file. Returns whether there was one.
    pub fn reset(&self, phase: &Phase) -> Result<bool> {
        let path = self.path_for(phase);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "results reset");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Move the phase's file aside as `results_<phase>.<UTC timestamp>.csv`
    /// and return the new path.
    pub fn archive(&self, phase: &Phase) -> Result<PathBuf> {
        let path = self.path_for(phase);
        if !path.is_file() {
            return Err(BenchError::ResultsNotFound {
                phase: phase.clone(),
                path,
            });
        }

        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
        let mut target = self.dir.join(format!("results_{}.{}.csv", phase, stamp));
        let mut attempt = 1;
        while target.exists() {
            target = self
                .dir
                .join(format!("results_{}.{}-{}.csv", phase, stamp, attempt));
            attempt += 1;
        }

        std::fs::rename(&path, &target)?;
        tracing::info!(from = %path.display(), to = %target.display(), "results archived");
        Ok(target)
    }
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// A line with no separators. Rows of empty fields are kept and reported.
fn is_blank(record: &ByteRecord) -> bool {
    match record.len() {
        0 => true,
        1 => record[0].iter().all(u8::is_ascii_whitespace),
        _ => false,
    }
}

fn field_text(record: &ByteRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| record.get(i))
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

/// Column positions of the result fields within a file
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    query: Option<usize>,
    min: Option<usize>,
    max: Option<usize>,
    avg: Option<usize>,
    runs: Option<usize>,
}

impl ColumnMap {
    fn positional() -> Self {
        Self {
            query: Some(0),
            min: Some(1),
            max: Some(2),
            avg: Some(3),
            runs: Some(4),
        }
    }

    /// Column map from a header row; `None` if the row is not a header
    fn from_header(record: &ByteRecord) -> Option<Self> {
        let names: Vec<String> = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).trim().to_ascii_lowercase())
            .collect();
        let position = |name: &str| names.iter().position(|n| n == name);

        let map = Self {
            query: position(RESULTS_HEADER[0]),
            min: position(RESULTS_HEADER[1]),
            max: position(RESULTS_HEADER[2]),
            avg: position(RESULTS_HEADER[3]),
            runs: position(RESULTS_HEADER[4]),
        };
        map.query.is_some().then_some(map)
    }

    fn is_header(&self, record: &ByteRecord) -> bool {
        field_text(record, self.query).is_some_and(|text| text.trim() == RESULTS_HEADER[0])
            && field_text(record, self.min).is_none_or(|text| text.trim() == RESULTS_HEADER[1])
    }

    fn raw(&self, record: &ByteRecord) -> RawResultRow {
        RawResultRow {
            query: field_text(record, self.query).unwrap_or_default(),
            min_time_ms: field_text(record, self.min).unwrap_or_default(),
            max_time_ms: field_text(record, self.max).unwrap_or_default(),
            avg_time_ms: field_text(record, self.avg).unwrap_or_default(),
            runs: field_text(record, self.runs).unwrap_or_default(),
        }
    }

    fn parse(&self, record: &ByteRecord) -> std::result::Result<QuerySummary, String> {
        let label = required(record, self.query, RESULTS_HEADER[0])?;
        let min_ms = timing(record, self.min, RESULTS_HEADER[1])?;
        let max_ms = timing(record, self.max, RESULTS_HEADER[2])?;
        let avg_ms = timing(record, self.avg, RESULTS_HEADER[3])?;

        let runs_text = required(record, self.runs, RESULTS_HEADER[4])?;
        let run_count: usize = runs_text
            .trim()
            .parse()
            .map_err(|_| format!("runs is not a whole number: '{}'", runs_text))?;
        if run_count == 0 {
            return Err("runs must be at least 1".to_string());
        }

        if min_ms > max_ms {
            return Err(format!("min_time_ms {} exceeds max_time_ms {}", min_ms, max_ms));
        }
        if avg_ms < min_ms - TIMING_TOLERANCE_MS || avg_ms > max_ms + TIMING_TOLERANCE_MS {
            return Err(format!(
                "avg_time_ms {} is outside [{}, {}]",
                avg_ms, min_ms, max_ms
            ));
        }

        Ok(QuerySummary {
            label,
            min_ms,
            max_ms,
            avg_ms: avg_ms.clamp(min_ms, max_ms),
            run_count,
        })
    }
}

fn required(
    record: &ByteRecord,
    index: Option<usize>,
    name: &str,
) -> std::result::Result<String, String> {
    field_text(record, index).ok_or_else(|| format!("missing {}", name))
}

fn timing(
    record: &ByteRecord,
    index: Option<usize>,
    name: &str,
) -> std::result::Result<f64, String> {
    let text = required(record, index, name)?;
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| format!("{} is not a number: '{}'", name, text))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} must be a non-negative number: '{}'", name, text));
    }
    Ok(value)
}
