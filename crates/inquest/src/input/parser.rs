//! CSV/TSV loader with delimiter detection and a bounded sample window.

use std::borrow::Cow;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use encoding_rs::{UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::source::{DataTable, SourceMetadata};
use crate::error::{InquestError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Extensions the loader accepts. Anything else is rejected up front.
const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt", "psv", "tab"];

const MIB: u64 = 1024 * 1024;

/// Parser configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to load (None = all). This is the sample window the
    /// column analyzer sees.
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Files larger than this are rejected (None = no limit).
    pub max_file_bytes: Option<u64>,
    /// Files larger than this load with a warning.
    pub large_file_bytes: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: Some(1_000_000),
            quote: b'"',
            max_file_bytes: Some(500 * MIB),
            large_file_bytes: 50 * MIB,
        }
    }
}

/// Loads delimited text files into a [`DataTable`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the data table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !extension.is_empty() && !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(InquestError::UnsupportedFormat(format!(
                ".{} (supported: {})",
                extension,
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }

        let io_err = |e: std::io::Error| InquestError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        let size = fs::metadata(path).map_err(io_err)?.len();
        if let Some(limit) = self.config.max_file_bytes
            && size > limit
        {
            return Err(InquestError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit,
            });
        }
        if size > self.config.large_file_bytes {
            warn!(
                path = %path.display(),
                size_mb = size / MIB,
                "large file, loading may take a while"
            );
        }

        let contents = fs::read(path).map_err(io_err)?;
        let hash = format!("sha256:{:x}", Sha256::digest(&contents));

        let (text, fallback) = decode(&contents);
        if fallback {
            warn!(path = %path.display(), "file is not UTF-8, decoded as windows-1252");
        }
        let bytes = text.as_bytes();

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };

        let table = self.parse_bytes(bytes, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        };

        debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            format,
            "loaded dataset"
        );

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            contents.len() as u64,
            format.to_string(),
            table.row_count(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    /// Parse in-memory text, auto-detecting the delimiter unless configured.
    pub fn parse_str(&self, text: &str) -> Result<DataTable> {
        let bytes = text.as_bytes();
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        self.parse_bytes(bytes, delimiter)
    }

    /// Parse bytes with a known delimiter.
    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut records = reader.records();

        let headers: Vec<String> = match records.next() {
            Some(first) => {
                let first = first?;
                if self.config.has_header {
                    first.iter().map(|s| s.trim().to_string()).collect()
                } else {
                    (0..first.len()).map(|i| format!("column_{}", i + 1)).collect()
                }
            }
            None => return Err(InquestError::EmptyData("No columns found".to_string())),
        };

        if headers.iter().all(|h| h.is_empty()) {
            return Err(InquestError::EmptyData("No columns found".to_string()));
        }

        let width = headers.len();
        let limit = self.config.max_rows.unwrap_or(usize::MAX);
        let mut rows = Vec::new();
        let truncated;

        // Without a header row the first record is data, so rewind.
        if !self.config.has_header {
            let mut rewind = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .has_headers(false)
                .quote(self.config.quote)
                .flexible(true)
                .from_reader(bytes);
            let mut records = rewind.records();
            for record in records.by_ref().take(limit) {
                rows.push(normalize_row(record?.iter(), width));
            }
            truncated = records.next().is_some();
        } else {
            for record in records.by_ref().take(limit) {
                rows.push(normalize_row(record?.iter(), width));
            }
            truncated = records.next().is_some();
        }

        if truncated {
            warn!(rows = rows.len(), "row limit reached, remaining rows were not loaded");
        }

        if rows.is_empty() {
            return Err(InquestError::EmptyData("No data rows found".to_string()));
        }

        Ok(DataTable::new(headers, rows, delimiter))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// UTF-8 (minus any byte-order mark), else windows-1252, which maps
/// every byte. The flag is set when the fallback was used.
fn decode(bytes: &[u8]) -> (Cow<'_, str>, bool) {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => (text, false),
        None => (WINDOWS_1252.decode_without_bom_handling(bytes).0, true),
    }
}

/// Pad or truncate a record to the header width.
fn normalize_row<'a>(fields: impl Iterator<Item = &'a str>, width: usize) -> Vec<String> {
    let mut row: Vec<String> = fields.map(|s| s.to_string()).collect();
    row.resize(width, String::new());
    row
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(InquestError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines beat raw frequency; tab gets a
        // small bonus since it rarely appears inside values.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut in_quotes = false;
    line.chars()
        .filter(|&ch| {
            if ch == '"' {
                in_quotes = !in_quotes;
            }
            ch == delim_char && !in_quotes
        })
        .count()
}
