//! Error types for the table reader.
//!
//! One error type per layer:
//!
//! - [`EscapeError`] - escape expression lookups
//! - [`CsvError`] - CSV tokenizing, positioned at origin/line/column
//! - [`TableError`] - structural validation of an associations table
//! - [`GameError`] - illegal moves against a game state
//! - [`LoadError`] - top-level bytes → table orchestration
//! - [`ServerError`] - HTTP layer
//!
//! Conversions are automatic via `From` implementations so `?` works
//! across layer boundaries.

use thiserror::Error;

use crate::models::Track;

// =============================================================================
// Escape Errors
// =============================================================================

/// Errors from the escape expression table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    /// Input was not exactly one character.
    #[error("Escape expression must be exactly one character, got {0:?}")]
    InvalidEscapeArgument(String),

    /// Single character with no table entry.
    #[error("Unknown escape code '{0}'")]
    UnknownEscapeCode(char),
}

// =============================================================================
// CSV Errors
// =============================================================================

/// What went wrong while tokenizing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvErrorKind {
    #[error("unknown escape code '{0}'")]
    UnknownEscapeCode(char),

    #[error("unexpected line end")]
    UnterminatedLine,

    #[error("expected cell end, found '{0}'")]
    UnexpectedCharacterAfterQuote(char),

    #[error("illegal quotes '{0}' inside cell")]
    IllegalQuoteInCell(char),

    #[error("starting line must not be negative, got {0}")]
    NegativeStartingLine(i64),

    #[error("cannot read input: {0}")]
    Io(String),

    #[error("cannot decode input: {0}")]
    Encoding(String),
}

/// CSV format error with its position.
///
/// `line` and `column` are 1-based. A column of 0 means the error is not
/// tied to a character (e.g. a read failure).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{origin}:{line}:{column}: {kind}")]
pub struct CsvError {
    pub origin: String,
    pub line: usize,
    pub column: usize,
    pub kind: CsvErrorKind,
}

impl CsvError {
    pub fn new(origin: impl Into<String>, line: usize, column: usize, kind: CsvErrorKind) -> Self {
        Self {
            origin: origin.into(),
            line,
            column,
            kind,
        }
    }
}

// =============================================================================
// Table Validation Errors
// =============================================================================

/// Structural violations of the associations table grammar.
///
/// Rows are numbered the way the table grammar names them: row 0 is the
/// shuffle row, rows 1-4 are the cell block and rows 5 onwards hold the
/// solutions. Blank lines dropped by the parser do not count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Table has {rows} rows, at least 6 are required")]
    TableTooShort { rows: usize },

    #[error("Shuffle row must have 5 cells, found {len}")]
    ShuffleRowWrongLength { len: usize },

    #[error("Shuffle flag for {track} must be \"0\" or \"1\", found \"{value}\"")]
    ShuffleRowInvalidValue { track: Track, value: String },

    #[error("Row {row} has {len} cells, expected {expected} like row 1")]
    CellBlockLengthMismatch { row: usize, len: usize, expected: usize },

    #[error("Cell rows must have 4 or 5 cells, found {len}")]
    CellBlockInvalidLength { len: usize },

    #[error("Row {row} must end with an empty cell, found \"{value}\"")]
    CellBlockNonEmptyPad { row: usize, value: String },

    #[error("Solution row {row} must have 5 cells, found {len}")]
    SolutionRowWrongLength { row: usize, len: usize },

    #[error("Late entry for {track} in row {row}: answers ended at row {closed_at}")]
    SolutionLateEntry { track: Track, row: usize, closed_at: usize },
}

// =============================================================================
// Game Errors
// =============================================================================

/// Illegal operations against a [`crate::game::Game`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Cell {0} is already open")]
    AlreadyOpen(String),

    #[error("{0} is already solved")]
    AlreadySolved(Track),

    #[error("Game is finished")]
    Finished,

    #[error("Invalid saved game: {0}")]
    Corrupt(String),
}

// =============================================================================
// Load Errors (top-level)
// =============================================================================

/// Top-level error for turning raw input into an associations table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type CsvResult<T> = Result<T, CsvError>;

pub type TableResult<T> = Result<T, TableError>;

pub type GameResult<T> = Result<T, GameError>;

pub type LoadResult<T> = Result<T, LoadError>;

pub type ServerResult<T> = Result<T, ServerError>;
