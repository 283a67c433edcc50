//! Error types surfaced by the filter engine.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

#[derive(Error, Debug)]
pub enum SavedSearchError {
    #[error("saved searches require an authenticated session")]
    NotAuthenticated,
    #[error("saved search not found: {0}")]
    NotFound(String),
    #[error("saved search storage failed: {0:#}")]
    Storage(#[from] anyhow::Error),
}
