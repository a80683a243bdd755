//! Structural validation of associations game tables.
//!
//! Turns a raw [`CsvTable`] into an [`AssociationsTable`].
//!
//! # Table Layout
//!
//! ```text
//! row 0      shuffle flags     A,B,C,D,Sol       each "0" or "1"
//! rows 1-4   cell block        4 cells (or 5 with an empty 5th)
//! rows 5..   solution block    5 cells: answers for A,B,C,D,Sol
//! ```
//!
//! The solution block is top-aggregated per track: the first answer is
//! canonical, later ones are alternates. Once a track has an empty cell,
//! every following row must be empty in that track too.
//!
//! # Example
//!
//! ```
//! use assoc::parser::{parse_str, LineOffset};
//! use assoc::validation::validate;
//! use assoc::models::{Column, Row, Track};
//!
//! let csv = "0,0,0,0,1\n\
//!            a1,b1,c1,d1\n\
//!            a2,b2,c2,d2\n\
//!            a3,b3,c3,d3\n\
//!            a4,b4,c4,d4\n\
//!            A,B,C,D,Final\n";
//! let rows = parse_str(csv, "doc", LineOffset::default()).unwrap();
//! let table = validate(&rows).unwrap();
//!
//! assert_eq!(table.cell(Column::C, Row::Second), "c2");
//! assert_eq!(table.answers(Track::Final), ["Final"]);
//! assert!(table.shuffle.get(Track::Final));
//! ```

use crate::error::{TableError, TableResult};
use crate::models::{AssociationsTable, Column, Row, ShuffleFlags, Track};
use crate::parser::CsvTable;

/// Rows before the solution block: shuffle row + 4 cell rows.
pub const SOLUTIONS_START: usize = 5;

/// Cells in the shuffle row and in every solution row.
pub const TRACK_COUNT: usize = 5;

/// Validate a parsed table and build the game table.
pub fn validate(table: &CsvTable) -> TableResult<AssociationsTable> {
    if table.len() <= SOLUTIONS_START {
        return Err(TableError::TableTooShort { rows: table.len() });
    }

    let shuffle = read_shuffle_row(&table[0])?;
    let cells = read_cell_block(&table[1..SOLUTIONS_START])?;
    let answers = read_solution_block(&table[SOLUTIONS_START..])?;

    let [a, b, c, d, solution] = answers;
    Ok(AssociationsTable {
        shuffle,
        cells,
        columns: [a, b, c, d],
        solution,
    })
}

/// Returns true if the parsed table is a valid associations table.
pub fn is_valid(table: &CsvTable) -> bool {
    validate(table).is_ok()
}

fn read_shuffle_row(row: &[String]) -> TableResult<ShuffleFlags> {
    if row.len() != TRACK_COUNT {
        return Err(TableError::ShuffleRowWrongLength { len: row.len() });
    }

    let mut flags = ShuffleFlags::default();
    for (track, value) in Track::ALL.into_iter().zip(row) {
        let allowed = match value.as_str() {
            "0" => false,
            "1" => true,
            _ => {
                return Err(TableError::ShuffleRowInvalidValue {
                    track,
                    value: value.clone(),
                })
            }
        };
        flags.set(track, allowed);
    }

    Ok(flags)
}

fn read_cell_block(rows: &[Vec<String>]) -> TableResult<[[String; 4]; 4]> {
    let expected = rows[0].len();

    for (idx, row) in rows.iter().enumerate() {
        if row.len() != expected {
            return Err(TableError::CellBlockLengthMismatch {
                row: idx + 1,
                len: row.len(),
                expected,
            });
        }
    }

    match expected {
        4 => {}
        5 => {
            for (idx, row) in rows.iter().enumerate() {
                if !row[4].is_empty() {
                    return Err(TableError::CellBlockNonEmptyPad {
                        row: idx + 1,
                        value: row[4].clone(),
                    });
                }
            }
        }
        len => return Err(TableError::CellBlockInvalidLength { len }),
    }

    let mut cells: [[String; 4]; 4] = Default::default();
    for row in Row::ALL {
        for column in Column::ALL {
            cells[column.index()][row.index()] = rows[row.index()][column.index()].clone();
        }
    }

    Ok(cells)
}

/// Per-track answer accumulator.
#[derive(Default)]
struct TrackAnswers {
    answers: Vec<String>,
    /// Row where the track first had an empty cell.
    closed_at: Option<usize>,
}

fn read_solution_block(rows: &[Vec<String>]) -> TableResult<[Vec<String>; 5]> {
    let mut tracks: [TrackAnswers; TRACK_COUNT] = Default::default();

    for (idx, row) in rows.iter().enumerate() {
        let row_number = SOLUTIONS_START + idx;
        if row.len() != TRACK_COUNT {
            return Err(TableError::SolutionRowWrongLength {
                row: row_number,
                len: row.len(),
            });
        }

        for (track, value) in Track::ALL.into_iter().zip(row) {
            let state = &mut tracks[track.index()];
            match (value.is_empty(), state.closed_at) {
                (true, None) => state.closed_at = Some(row_number),
                (true, Some(_)) => {}
                (false, None) => state.answers.push(value.clone()),
                (false, Some(closed_at)) => {
                    return Err(TableError::SolutionLateEntry {
                        track,
                        row: row_number,
                        closed_at,
                    })
                }
            }
        }
    }

    Ok(tracks.map(|t| t.answers))
}
