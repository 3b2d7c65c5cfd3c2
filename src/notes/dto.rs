use serde::{Deserialize, Serialize};

use crate::notes::repo_types::Note;

/// Body for note creation. Optional fields so presence is a 400 with a
/// message, not a deserialization error.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Body for partial update; at least one field must be set.
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Serialize)]
pub struct NotePage {
    pub notes: Vec<Note>,
    pub pagination: PageInfo,
}
