//! Game state built on top of a validated table.
//!
//! A [`Game`] owns its table and tracks which cells are open and which
//! tracks are solved. It is plain data: a shell saves it with
//! [`Game::to_json`] and restores it with [`Game::from_json`].

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::answers::{fix_acceptables, is_acceptable};
use crate::error::{GameError, GameResult};
use crate::models::{cell_label, AssociationsTable, Column, Row, Track};

/// Outcome of a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Guess {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    table: AssociationsTable,
    /// Indexed `[column][row]` like the table cells.
    opened: [[bool; 4]; 4],
    /// Indexed by [`Track::index`].
    solved: [bool; 5],
    finished: bool,
    surrendered: bool,
}

impl Game {
    /// Start a game with the table as written, everything hidden.
    pub fn new(mut table: AssociationsTable) -> Self {
        for track in Track::ALL {
            let fixed = fix_acceptables(table.answers(track));
            *table.answers_mut(track) = fixed;
        }

        Self {
            table,
            opened: [[false; 4]; 4],
            solved: [false; 5],
            finished: false,
            surrendered: false,
        }
    }

    /// Start a game after applying the table's shuffle permissions.
    pub fn shuffled<R: Rng + ?Sized>(table: AssociationsTable, rng: &mut R) -> Self {
        Self::new(shuffle_table(table, rng))
    }

    pub fn table(&self) -> &AssociationsTable {
        &self.table
    }

    pub fn is_open(&self, column: Column, row: Row) -> bool {
        self.opened[column.index()][row.index()]
    }

    pub fn is_solved(&self, track: Track) -> bool {
        self.solved[track.index()]
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn surrendered(&self) -> bool {
        self.surrendered
    }

    /// Cell text if the cell is open.
    pub fn visible_cell(&self, column: Column, row: Row) -> Option<&str> {
        self.is_open(column, row)
            .then(|| self.table.cell(column, row))
    }

    /// Canonical answer if the track is solved.
    pub fn visible_answer(&self, track: Track) -> Option<&str> {
        if !self.is_solved(track) {
            return None;
        }
        self.table.answers(track).first().map(String::as_str)
    }

    /// Reveal one cell and return its text.
    pub fn open_cell(&mut self, column: Column, row: Row) -> GameResult<&str> {
        if self.finished {
            return Err(GameError::Finished);
        }
        if self.is_open(column, row) {
            return Err(GameError::AlreadyOpen(cell_label(column, row)));
        }

        self.opened[column.index()][row.index()] = true;
        Ok(self.table.cell(column, row))
    }

    /// Judge a guess for one track.
    ///
    /// A correct column guess reveals that column. A correct final guess
    /// reveals the whole board and ends the game.
    pub fn guess(&mut self, track: Track, text: &str) -> GameResult<Guess> {
        if self.finished {
            return Err(GameError::Finished);
        }
        if self.is_solved(track) {
            return Err(GameError::AlreadySolved(track));
        }
        if !is_acceptable(text.trim(), self.table.answers(track)) {
            return Ok(Guess::Wrong);
        }

        match track {
            Track::Column(column) => self.solve_column(column),
            Track::Final => {
                self.reveal_all();
                self.finished = true;
            }
        }
        Ok(Guess::Correct)
    }

    /// Reveal everything and end the game.
    pub fn give_up(&mut self) -> GameResult<()> {
        if self.finished {
            return Err(GameError::Finished);
        }
        self.reveal_all();
        self.finished = true;
        self.surrendered = true;
        Ok(())
    }

    /// First character of the canonical answer, the rest masked.
    ///
    /// Whitespace is kept so word boundaries show: `"New York"` gives
    /// `"N__ ____"`.
    pub fn hint(&self, track: Track) -> String {
        let answer = self
            .table
            .answers(track)
            .first()
            .map(String::as_str)
            .unwrap_or("");

        answer
            .chars()
            .enumerate()
            .map(|(i, c)| match (i, c.is_whitespace()) {
                (0, _) | (_, true) => c,
                _ => '_',
            })
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> GameResult<Self> {
        serde_json::from_str(json).map_err(|e| GameError::Corrupt(e.to_string()))
    }

    fn solve_column(&mut self, column: Column) {
        self.solved[Track::Column(column).index()] = true;
        self.opened[column.index()] = [true; 4];
    }

    fn reveal_all(&mut self) {
        for column in Column::ALL {
            self.solve_column(column);
        }
        self.solved[Track::Final.index()] = true;
    }
}

/// Apply shuffle permissions to a table.
///
/// A column flag permutes that column's cells. The final flag permutes
/// the columns themselves, moving cells, answers and flags together.
pub fn shuffle_table<R: Rng + ?Sized>(mut table: AssociationsTable, rng: &mut R) -> AssociationsTable {
    for column in Column::ALL {
        if table.shuffle.columns[column.index()] {
            table.cells[column.index()].shuffle(rng);
        }
    }

    if table.shuffle.solution {
        let mut order = [0usize, 1, 2, 3];
        order.shuffle(rng);

        let cells = table.cells.clone();
        let columns = table.columns.clone();
        let flags = table.shuffle.columns;
        for (target, source) in order.into_iter().enumerate() {
            table.cells[target] = cells[source].clone();
            table.columns[target] = columns[source].clone();
            table.shuffle.columns[target] = flags[source];
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_table() -> AssociationsTable {
        let mut table = AssociationsTable::default();
        for column in Column::ALL {
            for row in Row::ALL {
                table.cells[column.index()][row.index()] = cell_label(column, row);
            }
            table.columns[column.index()] = vec![column.to_string()];
        }
        table.columns[0] = vec!["Sea".into(), "ocean".into(), "SEA".into()];
        table.solution = vec!["Water".into()];
        table
    }

    #[test]
    fn test_new_normalizes_answers() {
        let game = Game::new(sample_table());
        assert_eq!(game.table().answers(Track::Column(Column::A)), ["Sea", "ocean"]);
    }

    #[test]
    fn test_open_cell() {
        let mut game = Game::new(sample_table());
        assert_eq!(game.visible_cell(Column::B, Row::Third), None);
        assert_eq!(game.open_cell(Column::B, Row::Third), Ok("B3"));
        assert_eq!(game.visible_cell(Column::B, Row::Third), Some("B3"));
        assert_eq!(
            game.open_cell(Column::B, Row::Third),
            Err(GameError::AlreadyOpen("B3".into()))
        );
    }

    #[test]
    fn test_column_guess() {
        let mut game = Game::new(sample_table());
        let a = Track::Column(Column::A);

        assert_eq!(game.guess(a, "lake"), Ok(Guess::Wrong));
        assert!(!game.is_solved(a));
        assert_eq!(game.guess(a, " OCEAN "), Ok(Guess::Correct));
        assert!(game.is_solved(a));
        assert!(Row::ALL.iter().all(|&row| game.is_open(Column::A, row)));
        assert!(!game.is_open(Column::B, Row::First));
        assert_eq!(game.visible_answer(a), Some("Sea"));
        assert_eq!(game.guess(a, "sea"), Err(GameError::AlreadySolved(a)));
        assert!(!game.is_finished());
    }

    #[test]
    fn test_final_guess_finishes() {
        let mut game = Game::new(sample_table());
        assert_eq!(game.guess(Track::Final, "water"), Ok(Guess::Correct));
        assert!(game.is_finished());
        assert!(!game.surrendered());
        assert!(Track::ALL.iter().all(|&t| game.is_solved(t)));
        assert_eq!(game.open_cell(Column::A, Row::First), Err(GameError::Finished));
    }

    #[test]
    fn test_give_up() {
        let mut game = Game::new(sample_table());
        game.give_up().unwrap();
        assert!(game.surrendered());
        assert_eq!(game.visible_answer(Track::Final), Some("Water"));
        assert_eq!(game.give_up(), Err(GameError::Finished));
    }

    #[test]
    fn test_hint() {
        let mut table = sample_table();
        table.solution = vec!["New York".into()];
        let game = Game::new(table);
        assert_eq!(game.hint(Track::Final), "N__ ____");
        assert_eq!(game.hint(Track::Column(Column::A)), "S__");
    }

    #[test]
    fn test_save_and_restore() {
        let mut game = Game::new(sample_table());
        game.open_cell(Column::C, Row::Fourth).unwrap();
        let json = game.to_json().unwrap();
        assert_eq!(Game::from_json(&json).unwrap(), game);
        assert!(matches!(Game::from_json("{}"), Err(GameError::Corrupt(_))));
    }

    #[test]
    fn test_shuffle_without_permission_keeps_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let table = sample_table();
        assert_eq!(shuffle_table(table.clone(), &mut rng), table);
    }

    #[test]
    fn test_column_shuffle_stays_in_column() {
        let mut table = sample_table();
        table.shuffle.columns[1] = true;

        let mut rng = StdRng::seed_from_u64(42);
        let shuffled = shuffle_table(table.clone(), &mut rng);

        let mut cells = shuffled.cells[1].clone();
        cells.sort();
        assert_eq!(cells, table.cells[1]);
        assert_eq!(shuffled.cells[0], table.cells[0]);
        assert_eq!(shuffled.cells[2], table.cells[2]);
        assert_eq!(shuffled.cells[3], table.cells[3]);
    }

    #[test]
    fn test_final_shuffle_moves_columns_whole() {
        let mut table = sample_table();
        table.shuffle.solution = true;
        table.columns[0] = vec!["A".into()];

        let mut rng = StdRng::seed_from_u64(3);
        let shuffled = shuffle_table(table, &mut rng);

        for column in shuffled.cells.iter().zip(&shuffled.columns) {
            let (cells, answers) = column;
            let letter = &answers[0];
            assert!(cells.iter().all(|cell| cell.starts_with(letter.as_str())));
        }
        assert_eq!(shuffled.solution, ["Water"]);
    }
}
