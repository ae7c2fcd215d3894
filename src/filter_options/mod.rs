//! Loading of the filter dialog's option pickers.
//!
//! Categories, areas and ingredients are fetched concurrently. A source that
//! fails takes its fallback list at once; a source still pending when the
//! group deadline fires takes its fallback list at that moment. The load
//! therefore always finishes by the deadline with every picker populated.

use crate::config::HubConfig;
use crate::model::{FilterOptionSet, OptionCollection, OptionKind};
use crate::repository::RecipeRepository;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Returned by a load that a newer load replaced before it finished.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Filter option load {token} was superseded by load {current}")]
pub struct Superseded {
    pub token: u64,
    pub current: u64,
}

/// Loads the [`FilterOptionSet`] for the filter dialog.
///
/// The loader tolerates the dialog being closed and reopened while requests
/// are still in flight. Each [`load`](FilterOptionsLoader::load) mints a token;
/// completions carrying an older token never touch the observable state.
///
/// # Examples
///
/// ```
/// use recipe_hub::{FilterOptionsLoader, InMemoryRepository, OptionState};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let loader = FilterOptionsLoader::new(Arc::new(InMemoryRepository::new()));
/// let options = loader.load().await?;
///
/// assert!(options.is_ready());
/// assert_eq!(options.areas.state(), OptionState::LoadedFromSource);
/// # Ok(())
/// # }
/// ```
pub struct FilterOptionsLoader {
    repository: Arc<dyn RecipeRepository>,
    deadline: Duration,
    token: AtomicU64,
    current: Mutex<FilterOptionSet>,
}

impl FilterOptionsLoader {
    /// Creates a loader with the default five second deadline.
    pub fn new(repository: Arc<dyn RecipeRepository>) -> Self {
        Self::from_config(repository, &HubConfig::default())
    }

    pub fn from_config(repository: Arc<dyn RecipeRepository>, config: &HubConfig) -> Self {
        FilterOptionsLoader {
            repository,
            deadline: config.filter_options_deadline(),
            token: AtomicU64::new(0),
            current: Mutex::new(FilterOptionSet::default()),
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// The option set of the most recent load, possibly still partial.
    ///
    /// Every [`load`](Self::load) starts from an all-`Unloaded` set, so
    /// collections filled by a previous load read as `Unloaded` again until
    /// the new load settles them. Within one load a collection never leaves
    /// its terminal state.
    pub fn snapshot(&self) -> FilterOptionSet {
        self.state().clone()
    }

    /// Loads all three option collections, replacing the previous snapshot.
    ///
    /// Resolves once every collection is terminal, at the latest when the
    /// deadline started by this call fires.
    ///
    /// # Errors
    ///
    /// Returns [`Superseded`] if another `load` started before this one
    /// finished. Its results were not applied.
    pub async fn load(&self) -> Result<FilterOptionSet, Superseded> {
        let token = {
            let mut state = self.state();
            *state = FilterOptionSet::default();
            self.token.fetch_add(1, Ordering::SeqCst) + 1
        };
        let deadline = Instant::now() + self.deadline;
        debug!(token, deadline_ms = self.deadline.as_millis() as u64, "loading filter options");

        let (categories, areas, ingredients) = tokio::join!(
            self.load_one(token, deadline, OptionKind::Category),
            self.load_one(token, deadline, OptionKind::Area),
            self.load_one(token, deadline, OptionKind::Ingredient),
        );

        let current = self.token.load(Ordering::SeqCst);
        if current != token {
            info!(token, current, "discarding superseded filter option load");
            return Err(Superseded { token, current });
        }

        Ok(FilterOptionSet {
            categories,
            areas,
            ingredients,
        })
    }

    async fn load_one(&self, token: u64, deadline: Instant, kind: OptionKind) -> OptionCollection {
        let mut collection = OptionCollection::default();

        match tokio::time::timeout_at(deadline, self.repository.fetch_remote_option_set(kind)).await {
            Ok(Ok(options)) => {
                debug!(%kind, count = options.len(), "filter options loaded");
                collection.resolve(options);
            }
            Ok(Err(error)) => {
                warn!(%kind, %error, "filter options failed, using fallback");
                collection.fall_back(kind);
            }
            Err(_) => {
                warn!(%kind, "filter options missed the deadline, using fallback");
                collection.fall_back(kind);
            }
        }

        self.apply(token, kind, &collection);
        collection
    }

    fn apply(&self, token: u64, kind: OptionKind, collection: &OptionCollection) {
        let mut state = self.state();
        if self.token.load(Ordering::SeqCst) != token {
            debug!(%kind, token, "ignoring stale filter options");
            return;
        }
        *state.get_mut(kind) = collection.clone();
    }

    fn state(&self) -> MutexGuard<'_, FilterOptionSet> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FilterOption, OptionState};
    use crate::repository::{InMemoryRepository, Latency, RepositoryError, RepositoryOp};

    fn repository() -> Arc<InMemoryRepository> {
        Arc::new(
            InMemoryRepository::new()
                .with_options(OptionKind::Category, vec![FilterOption::new("1", "Beef")])
                .with_options(OptionKind::Area, vec![FilterOption::new("2", "Greek")])
                .with_options(OptionKind::Ingredient, vec![FilterOption::new("3", "Feta")]),
        )
    }

    #[tokio::test]
    async fn test_all_sources_succeed() {
        let loader = FilterOptionsLoader::new(repository());
        let set = loader.load().await.unwrap();

        for kind in OptionKind::ALL {
            assert_eq!(set.get(kind).state(), OptionState::LoadedFromSource);
            assert_eq!(set.get(kind).options().len(), 1);
        }
        assert_eq!(loader.snapshot(), set);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_source_falls_back_immediately() {
        let repo = repository();
        repo.fail(
            RepositoryOp::Options(OptionKind::Area),
            RepositoryError::Unavailable("offline".to_string()),
        );

        let start = Instant::now();
        let set = FilterOptionsLoader::new(repo).load().await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(set.areas.state(), OptionState::LoadedAsFallback);
        assert_eq!(set.areas.options().len(), 10);
        assert_eq!(set.categories.state(), OptionState::LoadedFromSource);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_source_falls_back_at_deadline() {
        let repo = repository();
        repo.set_latency(RepositoryOp::Options(OptionKind::Ingredient), Latency::Hang);
        repo.set_latency(
            RepositoryOp::Options(OptionKind::Category),
            Latency::Delay(Duration::from_secs(3)),
        );

        let start = Instant::now();
        let set = FilterOptionsLoader::new(repo).load().await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_millis(5_100));
        assert_eq!(set.categories.state(), OptionState::LoadedFromSource);
        assert_eq!(set.areas.state(), OptionState::LoadedFromSource);
        assert_eq!(set.ingredients.state(), OptionState::LoadedAsFallback);
        assert_eq!(set.ingredients.options().len(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_a_ceiling() {
        let repo = repository();
        for kind in OptionKind::ALL {
            repo.set_latency(RepositoryOp::Options(kind), Latency::Delay(Duration::from_secs(1)));
        }

        let start = Instant::now();
        let set = FilterOptionsLoader::new(repo).load().await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(set.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_fills_in_progressively() {
        let repo = repository();
        repo.set_latency(
            RepositoryOp::Options(OptionKind::Area),
            Latency::Delay(Duration::from_secs(2)),
        );
        let loader = Arc::new(FilterOptionsLoader::new(repo));

        let handle = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load().await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;

        let partial = loader.snapshot();
        assert!(!partial.is_ready());
        assert_eq!(partial.categories.state(), OptionState::LoadedFromSource);
        assert_eq!(partial.areas.state(), OptionState::Unloaded);

        let set = handle.await.unwrap().unwrap();
        assert!(set.is_ready());
        assert!(loader.snapshot().is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_load_does_not_apply() {
        let repo = repository();
        for kind in OptionKind::ALL {
            repo.set_latency(RepositoryOp::Options(kind), Latency::Delay(Duration::from_secs(3)));
        }
        let loader = Arc::new(FilterOptionsLoader::new(repo.clone()));

        let first = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load().await }
        });
        tokio::time::sleep(Duration::from_millis(500)).await;

        for kind in OptionKind::ALL {
            repo.set_latency(RepositoryOp::Options(kind), Latency::Immediate);
            repo.set_options(kind, vec![FilterOption::named("Second")]);
        }
        let second = loader.load().await.unwrap();
        assert_eq!(second.categories.options()[0].display_name, "Second");

        let first = first.await.unwrap();
        assert_eq!(first, Err(Superseded { token: 1, current: 2 }));

        let snapshot = loader.snapshot();
        assert_eq!(snapshot, second);
        assert_eq!(snapshot.areas.options()[0].display_name, "Second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_starts_from_unloaded() {
        let repo = repository();
        let loader = Arc::new(FilterOptionsLoader::new(repo.clone()));
        assert!(loader.load().await.unwrap().is_ready());

        repo.set_latency(
            RepositoryOp::Options(OptionKind::Area),
            Latency::Delay(Duration::from_secs(2)),
        );
        let reload = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load().await }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;

        let partial = loader.snapshot();
        assert_eq!(partial.categories.state(), OptionState::LoadedFromSource);
        assert_eq!(partial.areas.state(), OptionState::Unloaded);

        let set = reload.await.unwrap().unwrap();
        assert_eq!(set.areas.state(), OptionState::LoadedFromSource);
        assert_eq!(loader.snapshot(), set);
    }
}
