//! Diagnostic positions and the error types for each processing stage.

use std::fmt;

/// A position in the input stream.
///
/// All fields are zero-based. `index` counts decoded characters (not
/// bytes); `offset` in [`ReaderError`] counts raw bytes of the source.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Mark {
    /// The character index.
    pub index: u64,
    /// The line number.
    pub line: u64,
    /// The column number.
    pub column: u64,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// Errors raised while pulling and decoding raw input.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// A byte sequence did not form a valid character in the detected encoding.
    #[error("{problem} at byte offset {offset}")]
    Problem {
        /// A human-readable description of the malformed input.
        problem: &'static str,
        /// The byte offset of the first offending byte.
        offset: usize,
        /// An encoding-specific value (an offending octet or code unit), or
        /// -1 when not applicable.
        value: i64,
    },
    /// The input callback reported a failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors raised while tokenizing.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    /// A lexical rule was violated.
    #[error("{problem_mark}: {problem} ({context} at {context_mark})")]
    Problem {
        /// What the scanner was doing when it failed.
        context: &'static str,
        /// Where that activity started.
        context_mark: Mark,
        /// A human-readable description of the violation.
        problem: &'static str,
        /// Where the violation was detected.
        problem_mark: Mark,
    },
    /// As [`ScannerError::Problem`], but without separate context (the
    /// violation is self-contained).
    #[error("{problem_mark}: {problem}")]
    ProblemAt {
        /// A human-readable description of the violation.
        problem: &'static str,
        /// Where the violation was detected.
        problem_mark: Mark,
    },
    /// The underlying reader failed.
    #[error(transparent)]
    Reader(#[from] ReaderError),
}

/// Errors raised while parsing tokens into events.
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    /// The token stream ended before a well-formed stream could be closed.
    #[error("unexpected end of token stream")]
    UnexpectedEof,
    /// A structural rule was violated.
    #[error("{mark}: {problem}")]
    Problem {
        /// A human-readable description of the violation.
        problem: &'static str,
        /// Where the violation was detected.
        mark: Mark,
    },
    /// As [`ParserError::Problem`], with the location of the construct that
    /// made the current token unexpected.
    #[error("{mark}: {problem} ({context} at {context_mark})")]
    ProblemWithContext {
        /// What the parser was parsing when it failed.
        context: &'static str,
        /// Where that construct started.
        context_mark: Mark,
        /// A human-readable description of the violation.
        problem: &'static str,
        /// Where the violation was detected.
        mark: Mark,
    },
    /// The underlying scanner failed.
    #[error(transparent)]
    Scanner(#[from] ScannerError),
}

/// Errors raised while flushing the emitter's output buffer.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// The output sink reported a failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// No output sink was attached before the first flush.
    #[error("no output sink attached")]
    NoOutput,
}

/// Errors raised while turning an event stream back into YAML text.
#[derive(Debug, thiserror::Error)]
pub enum EmitterError {
    /// A structural rule was violated (events out of order, or an
    /// anchor/tag that cannot be written as valid YAML).
    #[error("{0}")]
    Problem(&'static str),
    /// The underlying writer failed.
    #[error(transparent)]
    Writer(#[from] WriterError),
}

/// The broad category of a failure, independent of which concrete error type
/// carries it. Useful for the `kind: problem at line L, column C` CLI
/// diagnostic format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// I/O callback failure.
    Reader,
    /// Malformed encoding.
    Decoder,
    /// Lexical violation.
    Scanner,
    /// Structural violation.
    Parser,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Reader => "reader",
            ErrorKind::Decoder => "decoder",
            ErrorKind::Scanner => "scanner",
            ErrorKind::Parser => "parser",
        };
        f.write_str(s)
    }
}

impl ReaderError {
    /// Classify this error for the one-line CLI diagnostic format.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReaderError::Problem { .. } => ErrorKind::Decoder,
            ReaderError::Io(_) => ErrorKind::Reader,
        }
    }

    /// The one-line `kind: problem at line L, column C` CLI diagnostic.
    /// Lines/columns are reported 1-based; `Mark` itself is 0-based.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            ReaderError::Problem { problem, offset, .. } => {
                format!("{}: {problem} at byte offset {offset}", self.kind())
            }
            ReaderError::Io(err) => format!("{}: {err}", self.kind()),
        }
    }
}

impl ScannerError {
    /// Classify this error for the one-line CLI diagnostic format.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScannerError::Reader(reader) => reader.kind(),
            ScannerError::Problem { .. } | ScannerError::ProblemAt { .. } => ErrorKind::Scanner,
        }
    }

    /// The one-line `kind: problem at line L, column C[, context at line
    /// L, column C]` CLI diagnostic. Lines/columns are reported 1-based;
    /// `Mark` itself is 0-based.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            ScannerError::Problem {
                context,
                context_mark,
                problem,
                problem_mark,
            } => format!(
                "{}: {problem} at line {}, column {}, {context} at line {}, column {}",
                self.kind(),
                problem_mark.line + 1,
                problem_mark.column + 1,
                context_mark.line + 1,
                context_mark.column + 1,
            ),
            ScannerError::ProblemAt { problem, problem_mark } => format!(
                "{}: {problem} at line {}, column {}",
                self.kind(),
                problem_mark.line + 1,
                problem_mark.column + 1,
            ),
            ScannerError::Reader(reader) => reader.diagnostic(),
        }
    }
}

impl ParserError {
    /// Classify this error for the one-line CLI diagnostic format.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParserError::Scanner(scanner) => scanner.kind(),
            ParserError::UnexpectedEof | ParserError::Problem { .. } | ParserError::ProblemWithContext { .. } => {
                ErrorKind::Parser
            }
        }
    }

    /// The one-line `kind: problem at line L, column C[, context at line
    /// L, column C]` CLI diagnostic. Lines/columns are reported 1-based;
    /// `Mark` itself is 0-based.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            ParserError::UnexpectedEof => format!("{}: unexpected end of token stream", self.kind()),
            ParserError::Problem { problem, mark } => format!(
                "{}: {problem} at line {}, column {}",
                self.kind(),
                mark.line + 1,
                mark.column + 1,
            ),
            ParserError::ProblemWithContext {
                context,
                context_mark,
                problem,
                mark,
            } => format!(
                "{}: {problem} at line {}, column {}, {context} at line {}, column {}",
                self.kind(),
                mark.line + 1,
                mark.column + 1,
                context_mark.line + 1,
                context_mark.column + 1,
            ),
            ParserError::Scanner(scanner) => scanner.diagnostic(),
        }
    }
}
