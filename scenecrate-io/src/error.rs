//! Error types for I/O operations

use std::fmt;

use thiserror::Error;

/// What went wrong while decoding a PLY stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// The header does not follow the accepted grammar
    MalformedHeader,
    /// Valid PLY outside the accepted subset (binary, extra elements, list vertex properties, ...)
    UnsupportedFormat,
    /// The body ended before all declared vertices and faces were read
    TruncatedBody,
    /// A face refers to a vertex that does not exist, or has too few vertices
    BadIndex,
    /// A token that should be a number is not one
    BadNumber,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseErrorKind::MalformedHeader => "malformed header",
            ParseErrorKind::UnsupportedFormat => "unsupported format",
            ParseErrorKind::TruncatedBody => "truncated body",
            ParseErrorKind::BadIndex => "bad index",
            ParseErrorKind::BadNumber => "bad number",
        };
        f.write_str(name)
    }
}

/// A PLY decoding failure at a 1-based line of the input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at line {line}: {detail}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub detail: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: usize, detail: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            detail: detail.into(),
        }
    }
}

/// Errors that can occur while reading or writing files
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    /// The parse failure behind this error, if any
    pub fn as_parse_error(&self) -> Option<&ParseError> {
        match self {
            IoError::Parse(err) => Some(err),
            IoError::Io(_) => None,
        }
    }
}

impl From<ParseError> for scenecrate_core::Error {
    fn from(err: ParseError) -> Self {
        match err.kind {
            ParseErrorKind::UnsupportedFormat => scenecrate_core::Error::UnsupportedFormat(err.to_string()),
            _ => scenecrate_core::Error::Parse(err.to_string()),
        }
    }
}

impl From<IoError> for scenecrate_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Parse(err) => err.into(),
            IoError::Io(err) => scenecrate_core::Error::Io(err),
        }
    }
}
