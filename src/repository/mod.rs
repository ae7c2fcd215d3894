//! The data collaborator contract.
//!
//! The core never talks to a database or HTTP client directly. Everything it
//! needs from the local store and the remote recipe API goes through
//! [`RecipeRepository`], which hosts implement and inject at construction.

use crate::model::{FilterOption, LocalField, OptionKind, Recipe, RemoteQuery};
use async_trait::async_trait;
use thiserror::Error;

mod memory;

pub use memory::{InMemoryRepository, Latency, RepositoryOp};

/// Errors a repository implementation can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    #[error("Recipe not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Recipe is incomplete: {0}")]
    Incomplete(String),
}

/// Access to the user's local recipe store and the remote recipe API.
///
/// Every method is a suspension point and may fail. Implementations must be
/// shareable across tasks; the core holds them as `Arc<dyn RecipeRepository>`.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Local recipes of `owner` whose title contains `substring`.
    async fn query_local_by_title(
        &self,
        owner: &str,
        substring: &str,
    ) -> Result<Vec<Recipe>, RepositoryError>;

    /// Local recipes of `owner` whose `field` equals `value`.
    async fn query_local_by_field(
        &self,
        owner: &str,
        field: LocalField,
        value: &str,
    ) -> Result<Vec<Recipe>, RepositoryError>;

    /// All local recipes of `owner`.
    async fn query_local_all(&self, owner: &str) -> Result<Vec<Recipe>, RepositoryError>;

    /// Recipes from the remote search provider.
    async fn search_remote(&self, query: &RemoteQuery) -> Result<Vec<Recipe>, RepositoryError>;

    /// One option collection of the filter dialog from the remote provider.
    async fn fetch_remote_option_set(
        &self,
        kind: OptionKind,
    ) -> Result<Vec<FilterOption>, RepositoryError>;

    /// Updates the favorite flag of an existing local recipe.
    async fn commit_favorite(&self, recipe_id: &str, value: bool) -> Result<(), RepositoryError>;

    /// Writes a local copy of a remote recipe and returns its new local id.
    async fn materialize_favorite(&self, recipe: &Recipe) -> Result<String, RepositoryError>;

    /// Full details of a remote recipe, used to complete stubs.
    async fn fetch_remote_detail(&self, recipe_id: &str) -> Result<Recipe, RepositoryError>;
}
