//! High-level loading API: raw input → validated table.
//!
//! Combines decoding, tokenizing and validation, and logs each step.
//!
//! # Example
//!
//! ```rust,ignore
//! use assoc::loader::load_table_file;
//! use assoc::config::LoadOptions;
//!
//! let loaded = load_table_file("assets/easy/12.csv", LoadOptions::default())?;
//! println!("Final answer: {}", loaded.table.solution[0]);
//! ```

use serde::Serialize;
use std::path::Path;

use crate::api::logs::{log_error, log_info, log_info_indent, log_success};
use crate::config::LoadOptions;
use crate::error::{CsvError, LoadError, LoadResult};
use crate::models::AssociationsTable;
use crate::parser::{parse_bytes, LineOffset, ParseResult};
use crate::validation::validate;

/// A loaded table and how it was read.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedTable {
    pub table: AssociationsTable,
    pub encoding: String,
    /// Non-blank rows read from the input
    pub row_count: usize,
}

fn offset(options: &LoadOptions) -> Result<LineOffset, CsvError> {
    options
        .offset()
        .map_err(|kind| CsvError::new(options.origin.as_str(), 0, 0, kind))
}

/// Decode and tokenize raw bytes without validating the table grammar.
pub fn parse_raw(bytes: &[u8], options: &LoadOptions) -> Result<ParseResult, CsvError> {
    parse_bytes(
        bytes,
        options.encoding.as_deref(),
        &options.origin,
        offset(options)?,
    )
}

/// Load a table from raw bytes.
pub fn load_table_bytes(bytes: &[u8], options: &LoadOptions) -> LoadResult<LoadedTable> {
    log_info(format!("Reading table: {}", options.origin));

    let parsed = parse_raw(bytes, options).map_err(|e| {
        log_error(e.to_string());
        e
    })?;
    log_info_indent(format!("Encoding: {}", parsed.encoding), 1);
    log_info_indent(format!("Rows: {}", parsed.rows.len()), 1);

    let table = validate(&parsed.rows).map_err(|e| {
        log_error(format!("{}: {}", options.origin, e));
        LoadError::from(e)
    })?;

    let alternates: usize = table
        .columns
        .iter()
        .chain(std::iter::once(&table.solution))
        .map(|answers| answers.len().saturating_sub(1))
        .sum();
    log_success(format!(
        "Valid table, final answer '{}', {} alternates",
        table.solution.first().map(String::as_str).unwrap_or(""),
        alternates
    ));

    Ok(LoadedTable {
        table,
        encoding: parsed.encoding,
        row_count: parsed.rows.len(),
    })
}

/// Load a table from a file. The path becomes the origin unless one was
/// set explicitly.
pub fn load_table_file<P: AsRef<Path>>(path: P, options: LoadOptions) -> LoadResult<LoadedTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    load_table_bytes(&bytes, &with_path_origin(options, path))
}

/// Use `path` as origin when the options still carry the default one.
pub fn with_path_origin(options: LoadOptions, path: &Path) -> LoadOptions {
    if options.origin == LoadOptions::default().origin {
        options.with_origin(path.display().to_string())
    } else {
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CsvErrorKind, TableError};
    use crate::models::{Column, Row, Track};
    use std::io::Write;

    const TABLE: &str = "\
1,0,0,0,1
sun,  'salt ',grass,coal
sky,sea,frog,night
jeans,tears,lime,crow
ice,  ocean,leaf,ink
Blue,Water,Green,Black,Colors
,Sea,,,Colours
";

    #[test]
    fn test_load_bytes() {
        let loaded = load_table_bytes(TABLE.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(loaded.row_count, 7);
        assert_eq!(loaded.encoding, "utf-8");

        let table = &loaded.table;
        assert_eq!(table.cell(Column::B, Row::First), "salt ");
        assert_eq!(table.cell(Column::B, Row::Fourth), "ocean");
        assert_eq!(table.answers(Track::Column(Column::B)), ["Water", "Sea"]);
        assert_eq!(table.answers(Track::Final), ["Colors", "Colours"]);
        assert!(table.shuffle.get(Track::Column(Column::A)));
    }

    #[test]
    fn test_load_file_uses_path_origin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0,0,0,0,0\na,b,c,d\n").unwrap();

        let err = load_table_file(file.path(), LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Table(TableError::TableTooShort { rows: 2 })));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        bad.write_all(b"0,0,0,0,0\na\"b\n").unwrap();
        match load_table_file(bad.path(), LoadOptions::default()) {
            Err(LoadError::Csv(e)) => {
                assert_eq!(e.origin, bad.path().display().to_string());
                assert_eq!((e.line, e.column), (2, 2));
            }
            other => panic!("expected CSV error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_table_file("/definitely/not/here.csv", LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_negative_offset() {
        let options = LoadOptions::default().with_line_offset(-3);
        match load_table_bytes(TABLE.as_bytes(), &options) {
            Err(LoadError::Csv(e)) => assert_eq!(e.kind, CsvErrorKind::NegativeStartingLine(-3)),
            other => panic!("expected CSV error, got {:?}", other),
        }
    }

    #[test]
    fn test_offset_shifts_lines() {
        let options = LoadOptions::default().with_origin("x").with_line_offset(2);
        let err = parse_raw(b"a\n'b", &options).unwrap_err();
        assert_eq!(err.to_string(), "x:4:3: unexpected line end");
    }
}
