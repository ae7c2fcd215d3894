use crate::model::Recipe;
use std::fmt;
use thiserror::Error;

/// The two branches of a search fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchSource {
    Local,
    Remote,
}

impl fmt::Display for SearchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchSource::Local => f.write_str("local"),
            SearchSource::Remote => f.write_str("remote"),
        }
    }
}

/// Why a search did not produce a clean result.
///
/// `Degraded` still carries data: the merged list of the source that
/// succeeded, which callers should display alongside a soft warning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PartialFailure {
    #[error("The {failed} source failed: {reason}")]
    Degraded {
        failed: SearchSource,
        reason: String,
        recipes: Vec<Recipe>,
    },

    #[error("Search failed: {reason}")]
    Total { reason: String },

    #[error("Search {generation} was superseded by search {current}")]
    Superseded { generation: u64, current: u64 },
}

impl PartialFailure {
    /// The recipes that are still displayable, empty unless degraded.
    pub fn recipes(&self) -> &[Recipe] {
        match self {
            PartialFailure::Degraded { recipes, .. } => recipes,
            _ => &[],
        }
    }

    /// Returns true if this failure should be shown to the user as an error
    /// rather than a warning or nothing at all.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, PartialFailure::Total { .. })
    }
}

/// Settled value of one fan-out branch: recipes, or the reason it failed.
pub(crate) type BranchResult = Result<Vec<Recipe>, String>;
