//! REST API types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::answers::{fix_acceptables, is_acceptable};
use crate::loader::LoadedTable;

/// Response to a table upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse {
    pub success: bool,
    pub origin: String,
    pub encoding: String,
    pub row_count: usize,
    /// Label-keyed table, see [`crate::models::AssociationsTable::to_labeled_json`]
    pub table: Value,
}

impl TableResponse {
    pub fn new(origin: impl Into<String>, loaded: &LoadedTable) -> Self {
        Self {
            success: true,
            origin: origin.into(),
            encoding: loaded.encoding.clone(),
            row_count: loaded.row_count,
            table: loaded.table.to_labeled_json(),
        }
    }
}

/// Body of `POST /api/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub guess: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub acceptable: bool,
    /// Answers after normalization; the first one is canonical
    pub normalized: Vec<String>,
}

/// Judge a guess against an answer list.
pub fn check_guess(request: &CheckRequest) -> CheckResponse {
    CheckResponse {
        acceptable: is_acceptable(&request.guess, &request.answers),
        normalized: fix_acceptables(&request.answers),
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "success": false,
        "error": error,
    })
}
