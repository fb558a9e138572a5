// Core structs: ExtractedLabel, RowMatch, MatchOutcome
use thiserror::Error;

/// Structured fields read off one scanned label.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedLabel {
    pub manufacturer: String,
    pub reference: String,
    pub name: String,
    pub details: String,
    pub qty: u32,
}

/// One existing inventory row that matched a (manufacturer, reference) query.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMatch {
    /// 1-based row position in the store, header included.
    pub row: usize,
    pub current_qty: u32,
    pub name: String,
    pub details: String,
}

/// Result of an inventory lookup. `Unavailable` means the store could not be
/// read at all; callers degrade to the create-new workflow in that case, but
/// the two outcomes stay distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matches(Vec<RowMatch>),
    Unavailable,
}

impl MatchOutcome {
    pub fn rows(&self) -> &[RowMatch] {
        match self {
            MatchOutcome::Matches(rows) => rows,
            MatchOutcome::Unavailable => &[],
        }
    }

    /// The update target when there is exactly one candidate.
    pub fn preselected(&self) -> Option<&RowMatch> {
        match self.rows() {
            [single] => Some(single),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no text recognized on the label")]
    NoText,
    #[error("extraction request failed: {0}")]
    Http(String),
    #[error("invalid extraction response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(String),
    #[error("invalid store response: {0}")]
    InvalidResponse(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("row {0} not found")]
    RowNotFound(usize),
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("event {event} is not valid in state {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
    #[error("not a valid quantity: {0}")]
    InvalidQuantity(String),
}
