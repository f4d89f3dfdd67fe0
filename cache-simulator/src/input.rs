//! Input data handling for cache simulation
//!
//! Parses memory traces in the Valgrind "lackey" format:
//!
//! ```text
//! I 0400d7d4,8
//!  M 0421c7f0,4
//!  L 04f6b868,8
//!  S 7ff0005c8,8
//! ```
//!
//! Each data record is an operation letter (`L`, `S`, `M`), a hexadecimal
//! address and an optional `,size`. Instruction fetches (`I`), blank lines and
//! `#` comments are skipped. Files are streamed one line at a time.

use crate::models::TraceRecord;
use csim::{OpKind, Operation};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Error types for trace parsing
#[derive(Debug)]
pub enum TraceParseError {
    IoError(io::Error),
    ParseError(String),
}

impl From<io::Error> for TraceParseError {
    fn from(err: io::Error) -> Self {
        TraceParseError::IoError(err)
    }
}

impl fmt::Display for TraceParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceParseError::IoError(err) => write!(f, "I/O error: {err}"),
            TraceParseError::ParseError(msg) => write!(f, "malformed trace: {msg}"),
        }
    }
}

impl std::error::Error for TraceParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TraceParseError::IoError(err) => Some(err),
            TraceParseError::ParseError(_) => None,
        }
    }
}

/// Reader for memory traces
pub struct TraceReader {
    pattern: String,
}

impl TraceReader {
    /// Create a reader for a trace path or a glob pattern such as `traces/*.trace`
    pub fn new<S: Into<String>>(pattern: S) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Resolve the pattern to trace files, sorted by name.
    ///
    /// A path naming an existing file is used as is, even if it contains glob
    /// metacharacters.
    pub fn trace_files(&self) -> Result<Vec<PathBuf>, TraceParseError> {
        let literal = Path::new(&self.pattern);
        if literal.is_file() {
            return Ok(vec![literal.to_path_buf()]);
        }

        let entries = glob::glob(&self.pattern).map_err(|e| {
            TraceParseError::ParseError(format!("invalid trace pattern '{}': {e}", self.pattern))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| TraceParseError::IoError(e.into_error()))?;
            if path.is_file() {
                files.push(path);
            } else {
                eprintln!("Warning: skipping non-file path {}", path.display());
            }
        }

        if files.is_empty() {
            return Err(TraceParseError::IoError(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no trace file matches '{}'", self.pattern),
            )));
        }

        files.sort();
        Ok(files)
    }

    /// Parse a single line into a TraceRecord
    ///
    /// Returns `Ok(None)` for lines the simulator ignores.
    pub fn parse_line(line: &str, line_num: usize) -> Result<Option<TraceRecord>, TraceParseError> {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut chars = line.chars();
        let code = chars.next().unwrap_or(' ');
        let rest = chars.as_str();

        // Operation letter must be followed by whitespace
        if !rest.starts_with(char::is_whitespace) {
            return Err(TraceParseError::ParseError(format!(
                "line {}: expected '<op> <address>,<size>', got '{}'",
                line_num + 1,
                line
            )));
        }

        let kind = match (code, OpKind::from_char(code)) {
            (_, Some(kind)) => kind,
            // Instruction fetches do not touch the data cache
            ('I', None) => return Ok(None),
            (other, None) => {
                return Err(TraceParseError::ParseError(format!(
                    "line {}: unknown operation '{}'",
                    line_num + 1,
                    other
                )))
            }
        };

        let mut fields = rest.trim().splitn(2, ',');

        let addr_str = fields.next().unwrap_or("").trim();
        let digits = addr_str
            .strip_prefix("0x")
            .or_else(|| addr_str.strip_prefix("0X"))
            .unwrap_or(addr_str);
        let address = u64::from_str_radix(digits, 16).map_err(|_| {
            TraceParseError::ParseError(format!(
                "line {}: invalid address '{}'",
                line_num + 1,
                addr_str
            ))
        })?;

        // Size is informational only; default to 0 when absent or garbled
        let size = fields
            .next()
            .map(|s| s.trim().parse::<u64>().unwrap_or(0))
            .unwrap_or(0);

        Ok(Some(TraceRecord::new(
            Operation::new(kind, address),
            size,
            line.to_string(),
        )))
    }

    /// Parse a whole trace file into memory (batch mode)
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<TraceRecord>, TraceParseError> {
        Self::stream_operations(path)?.collect()
    }

    /// Create a streaming iterator over the records of one trace file.
    /// This processes one line at a time without loading the file into memory.
    pub fn stream_operations<P: AsRef<Path>>(path: P) -> Result<OperationIterator, TraceParseError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(OperationIterator::new(path, BufReader::new(file)))
    }
}

/// Iterator that streams trace records from one file
pub struct OperationIterator {
    path: PathBuf,
    reader: BufReader<File>,
    line_num: usize,
    line_buffer: Vec<u8>,
    done: bool,
}

impl OperationIterator {
    fn new(path: PathBuf, reader: BufReader<File>) -> Self {
        Self {
            path,
            reader,
            line_num: 0,
            line_buffer: Vec::with_capacity(64),
            done: false,
        }
    }

    /// Path of the trace being read
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for OperationIterator {
    type Item = Result<TraceRecord, TraceParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.line_buffer.clear();
            match self.reader.read_until(b'\n', &mut self.line_buffer) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    let line_num = self.line_num;
                    self.line_num += 1;

                    // Decode here so bad bytes are reported with their line
                    let parsed = match std::str::from_utf8(&self.line_buffer) {
                        Ok(line) => TraceReader::parse_line(line, line_num),
                        Err(_) => Err(TraceParseError::ParseError(format!(
                            "line {}: invalid UTF-8",
                            line_num + 1
                        ))),
                    };

                    match parsed {
                        Ok(Some(record)) => return Some(Ok(record)),
                        Ok(None) => continue, // Skip ignored lines
                        Err(TraceParseError::ParseError(msg)) => {
                            self.done = true;
                            return Some(Err(TraceParseError::ParseError(format!(
                                "{}: {}",
                                self.path.display(),
                                msg
                            ))));
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(TraceParseError::IoError(e)));
                }
            }
        }
        None
    }
}
