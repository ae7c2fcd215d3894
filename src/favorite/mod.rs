//! Optimistic favorite toggling.
//!
//! The caller's copy of a recipe flips immediately so the UI feels instant.
//! The change is then committed through the repository and rolled back if the
//! commit fails. Nothing is retried automatically.

use crate::model::Recipe;
use crate::repository::{RecipeRepository, RepositoryError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Notifications for the UI while a toggle is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteEvent {
    /// The in-memory flag changed; sent before the commit starts
    Toggled { recipe_id: String, value: bool },
    /// The change was persisted. `recipe_id` is the local id after a materialization.
    Committed { recipe_id: String, value: bool },
    /// The commit failed and the flag was restored to `value`
    RolledBack {
        recipe_id: String,
        value: bool,
        reason: String,
    },
}

/// A favorite change that could not be persisted.
///
/// The in-memory flag has already been restored. The failure is transient:
/// toggling again is a valid retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to save favorite for recipe '{recipe_id}': {error}")]
pub struct CommitError {
    pub recipe_id: String,
    #[source]
    pub error: RepositoryError,
}

/// Applies favorite toggles for one user.
pub struct FavoriteReconciler {
    repository: Arc<dyn RecipeRepository>,
    owner: String,
    events: Option<UnboundedSender<FavoriteEvent>>,
}

impl FavoriteReconciler {
    pub fn new(repository: Arc<dyn RecipeRepository>, owner: impl Into<String>) -> Self {
        FavoriteReconciler {
            repository,
            owner: owner.into(),
            events: None,
        }
    }

    /// Sends [`FavoriteEvent`]s to `sender`. A dropped receiver is ignored.
    pub fn with_events(mut self, sender: UnboundedSender<FavoriteEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Sets `recipe.favorite` to `value` and persists the change.
    ///
    /// Favoriting an imported recipe that has no local row yet writes a new
    /// local copy owned by this user and stores the new local id and owner on
    /// `recipe`. Every other change updates the existing local row in place.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError`] if the repository rejects the write. `recipe`
    /// then holds its pre-toggle favorite flag again.
    pub async fn toggle(&self, recipe: &mut Recipe, value: bool) -> Result<(), CommitError> {
        let previous = recipe.favorite;
        recipe.favorite = value;
        self.emit(FavoriteEvent::Toggled {
            recipe_id: recipe.id.clone(),
            value,
        });

        let committed = if value && self.needs_local_copy(recipe) {
            self.materialize(recipe).await
        } else {
            self.repository.commit_favorite(&recipe.id, value).await
        };

        match committed {
            Ok(()) => {
                info!(recipe_id = %recipe.id, value, "favorite committed");
                self.emit(FavoriteEvent::Committed {
                    recipe_id: recipe.id.clone(),
                    value,
                });
                Ok(())
            }
            Err(error) => {
                recipe.favorite = previous;
                warn!(recipe_id = %recipe.id, %error, "favorite commit failed, rolled back");
                self.emit(FavoriteEvent::RolledBack {
                    recipe_id: recipe.id.clone(),
                    value: previous,
                    reason: error.to_string(),
                });
                Err(CommitError {
                    recipe_id: recipe.id.clone(),
                    error,
                })
            }
        }
    }

    /// Remote recipes carry no owner; a local copy is owned by its user.
    fn needs_local_copy(&self, recipe: &Recipe) -> bool {
        recipe.is_imported() && recipe.owner != self.owner
    }

    async fn materialize(&self, recipe: &mut Recipe) -> Result<(), RepositoryError> {
        let mut copy = recipe.clone();
        copy.owner = self.owner.clone();
        copy.favorite = true;

        let local_id = self.repository.materialize_favorite(&copy).await?;
        recipe.id = local_id;
        recipe.owner = copy.owner;
        Ok(())
    }

    fn emit(&self, event: FavoriteEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
