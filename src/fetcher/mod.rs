//! Detail fetching for stub recipes.
//!
//! Remote filter queries usually return only an id, a title and a thumbnail.
//! Such stubs are fine in a result list but have to be completed with a
//! full-detail fetch before the detail screen can show them.

use crate::model::{Recipe, RecipeOrigin};
use crate::repository::{RecipeRepository, RepositoryError};
use std::sync::Arc;
use tracing::debug;

/// Completes stub recipes through the remote detail endpoint.
pub struct DetailResolver {
    repository: Arc<dyn RecipeRepository>,
}

impl DetailResolver {
    pub fn new(repository: Arc<dyn RecipeRepository>) -> Self {
        DetailResolver { repository }
    }

    /// Returns a recipe that is complete enough for detail display.
    ///
    /// Recipes that are not stubs are returned as they are, without a
    /// repository call. Stubs are replaced by the remote detail record; the
    /// caller's `favorite` flag is carried over.
    ///
    /// # Errors
    ///
    /// Returns the repository's error if the fetch fails, or
    /// `RepositoryError::Incomplete` if the fetched record is still a stub.
    pub async fn resolve(&self, recipe: Recipe) -> Result<Recipe, RepositoryError> {
        if !recipe.is_stub() {
            return Ok(recipe);
        }

        debug!(recipe_id = %recipe.id, "fetching full details for stub recipe");
        let mut full = self.repository.fetch_remote_detail(&recipe.id).await?;
        full.origin = RecipeOrigin::ImportedFromRemote;
        full.favorite = recipe.favorite;

        if full.is_stub() {
            return Err(RepositoryError::Incomplete(recipe.id));
        }
        Ok(full)
    }
}
