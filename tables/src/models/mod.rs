//! Domain models for associations game tables.
//!
//! - [`Column`] - column labels A to D
//! - [`Row`] - cell row labels 1 to 4
//! - [`Track`] - one of the five solution tracks (four columns + final)
//! - [`ShuffleFlags`] - per-track shuffle permission
//! - [`AssociationsTable`] - validated table: cells, answers, flags
//!
//! Labels follow the game board: cells are named `A1`..`D4`, column
//! solutions `A`..`D` and the final solution `Sol`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Label of the final solution track.
pub const FINAL_LABEL: &str = "Sol";

// =============================================================================
// Labels
// =============================================================================

/// Column of the game board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    A,
    B,
    C,
    D,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::A, Column::B, Column::C, Column::D];

    /// Zero-based position on the board.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    /// Parse `"A"`..`"D"`, case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        let mut chars = label.chars();
        let c = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() {
            return None;
        }
        Self::ALL.into_iter().find(|col| col.letter() == c)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Row of the cell block, numbered 1 to 4 top-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Row {
    First,
    Second,
    Third,
    Fourth,
}

impl Row {
    pub const ALL: [Row; 4] = [Row::First, Row::Second, Row::Third, Row::Fourth];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 1-based number as printed on the board.
    pub fn number(self) -> usize {
        self.index() + 1
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Build a cell label such as `"B3"`.
pub fn cell_label(column: Column, row: Row) -> String {
    format!("{}{}", column, row)
}

/// Parse a cell label such as `"b3"` back into its coordinates.
pub fn parse_cell_label(label: &str) -> Option<(Column, Row)> {
    let mut chars = label.chars();
    let column = Column::from_label(&chars.next()?.to_string())?;
    let digit = chars.next()?.to_digit(10)? as usize;
    if chars.next().is_some() || digit == 0 {
        return None;
    }
    Some((column, Row::from_index(digit - 1)?))
}

/// A solution track: one of the four columns or the final solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Track {
    Column(Column),
    Final,
}

impl Track {
    /// Track order used by the shuffle row and the solution block.
    pub const ALL: [Track; 5] = [
        Track::Column(Column::A),
        Track::Column(Column::B),
        Track::Column(Column::C),
        Track::Column(Column::D),
        Track::Final,
    ];

    /// Position within a five-cell shuffle or solution row.
    pub fn index(self) -> usize {
        match self {
            Track::Column(c) => c.index(),
            Track::Final => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short label: `"A"`..`"D"` or `"Sol"`.
    pub fn label(self) -> String {
        match self {
            Track::Column(c) => c.to_string(),
            Track::Final => FINAL_LABEL.to_string(),
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case(FINAL_LABEL) {
            return Some(Track::Final);
        }
        Column::from_label(label).map(Track::Column)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Column(c) => write!(f, "column {}", c),
            Track::Final => write!(f, "final solution"),
        }
    }
}

// =============================================================================
// Shuffle Flags
// =============================================================================

/// Shuffle permissions read from the first table row.
///
/// A column flag allows permuting that column's cells. The final flag
/// allows permuting the order of the columns themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleFlags {
    pub columns: [bool; 4],
    pub solution: bool,
}

impl ShuffleFlags {
    pub fn get(&self, track: Track) -> bool {
        match track {
            Track::Column(c) => self.columns[c.index()],
            Track::Final => self.solution,
        }
    }

    pub fn set(&mut self, track: Track, allowed: bool) {
        match track {
            Track::Column(c) => self.columns[c.index()] = allowed,
            Track::Final => self.solution = allowed,
        }
    }
}

// =============================================================================
// Associations Table
// =============================================================================

/// A validated associations table.
///
/// Answer lists keep the order found in the file: index 0 is the
/// canonical answer, the rest are alternates. An empty list means the
/// track had no answer at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationsTable {
    pub shuffle: ShuffleFlags,
    /// Cell values indexed `[column][row]`.
    pub cells: [[String; 4]; 4],
    /// Column answers indexed by column.
    pub columns: [Vec<String>; 4],
    pub solution: Vec<String>,
}

impl AssociationsTable {
    pub fn cell(&self, column: Column, row: Row) -> &str {
        &self.cells[column.index()][row.index()]
    }

    pub fn answers(&self, track: Track) -> &[String] {
        match track {
            Track::Column(c) => &self.columns[c.index()],
            Track::Final => &self.solution,
        }
    }

    pub fn answers_mut(&mut self, track: Track) -> &mut Vec<String> {
        match track {
            Track::Column(c) => &mut self.columns[c.index()],
            Track::Final => &mut self.solution,
        }
    }

    /// All 16 cells with their labels, column by column.
    pub fn labeled_cells(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        Column::ALL.into_iter().flat_map(move |column| {
            Row::ALL
                .into_iter()
                .map(move |row| (cell_label(column, row), self.cell(column, row)))
        })
    }

    /// Label-keyed JSON view, the shape a game shell consumes.
    ///
    /// ```text
    /// { "shuffle": { "A": true, .., "Sol": false },
    ///   "cells":   { "A1": "..", .., "D4": ".." },
    ///   "answers": { "A": [".."], .., "Sol": [".."] } }
    /// ```
    pub fn to_labeled_json(&self) -> Value {
        let mut shuffle = Map::new();
        let mut answers = Map::new();
        for track in Track::ALL {
            shuffle.insert(track.label(), json!(self.shuffle.get(track)));
            answers.insert(track.label(), json!(self.answers(track)));
        }

        let cells: Map<String, Value> = self
            .labeled_cells()
            .map(|(label, value)| (label, json!(value)))
            .collect();

        json!({
            "shuffle": shuffle,
            "cells": cells,
            "answers": answers,
        })
    }
}
