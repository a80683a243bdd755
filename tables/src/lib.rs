//! # Assoc - table reader for the associations word-grid game
//!
//! Reads game tables stored as CSV and checks them against the table
//! grammar before a game is built from them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV bytes  │────▶│   Parser    │────▶│  Validator  │────▶│    Game     │
//! │ (any enc.)  │     │ (rows/cells)│     │  (grammar)  │     │   (state)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use assoc::{parse_str, validate, is_acceptable, LineOffset, Track};
//!
//! let csv = "0,0,0,0,0\n\
//!            a,b,c,d\ne,f,g,h\ni,j,k,l\nm,n,o,p\n\
//!            A,B,C,D,Final\n,,,,Last\n";
//! let rows = parse_str(csv, "quick-start", LineOffset::default()).unwrap();
//! let table = validate(&rows).unwrap();
//!
//! assert!(is_acceptable("LAST", table.answers(Track::Final)));
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`escape`] - Escape expression table
//! - [`parser`] - CSV tokenizer and decoding
//! - [`models`] - Labels and the validated table
//! - [`validation`] - Table grammar checks
//! - [`answers`] - Answer normalization and guess checking
//! - [`game`] - Game state over a table
//! - [`loader`] - Bytes/file to table, with logging
//! - [`config`] - Constants and settings
//! - [`api`] - HTTP API server and logs

// Core modules
pub mod error;
pub mod models;

// Reading
pub mod escape;
pub mod parser;
pub mod validation;

// Gameplay
pub mod answers;
pub mod game;

// Orchestration
pub mod config;
pub mod loader;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    CsvError, CsvErrorKind, EscapeError, GameError, LoadError, ServerError, TableError,
};

pub use models::{cell_label, AssociationsTable, Column, Row, ShuffleFlags, Track};

pub use parser::{parse, parse_bytes, parse_line, parse_str, CsvRow, CsvTable, LineOffset};

pub use validation::{is_valid, validate};

pub use answers::{fix_acceptables, is_acceptable};

pub use game::{Game, Guess};

pub use config::{LoadOptions, ServerConfig};

pub use loader::{load_table_bytes, load_table_file, LoadedTable};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
