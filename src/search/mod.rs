//! Search orchestration across the local store and the remote API.
//!
//! A search fans out to exactly two branches, waits for both to settle and
//! merges what came back. One failing branch degrades the result, both failing
//! fails the search. The default home view skips the fan-out entirely.

use crate::config::HubConfig;
use crate::model::{FilterKind, Recipe, SearchState};
use crate::repository::{RecipeRepository, RepositoryError};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

mod merge;
mod model;

pub use merge::ResultMerger;
pub use model::{PartialFailure, SearchSource};

use model::BranchResult;

/// Runs searches for one user against a [`RecipeRepository`].
///
/// Each call to [`search`](SearchOrchestrator::search) mints a generation. If a
/// newer search starts before an older one finishes, the older one's result is
/// discarded and it returns [`PartialFailure::Superseded`]. In-flight
/// repository calls are not cancelled.
pub struct SearchOrchestrator {
    repository: Arc<dyn RecipeRepository>,
    owner: String,
    merger: ResultMerger,
    deadline: Option<Duration>,
    generation: AtomicU64,
}

impl SearchOrchestrator {
    /// Creates an orchestrator for `owner` using the default configuration.
    pub fn new(repository: Arc<dyn RecipeRepository>, owner: impl Into<String>) -> Self {
        Self::from_config(repository, owner, &HubConfig::default())
    }

    pub fn from_config(
        repository: Arc<dyn RecipeRepository>,
        owner: impl Into<String>,
        config: &HubConfig,
    ) -> Self {
        let owner = owner.into();
        SearchOrchestrator {
            repository,
            merger: ResultMerger::new(owner.clone()),
            owner,
            deadline: config.search_deadline(),
            generation: AtomicU64::new(0),
        }
    }

    /// Overrides the per-branch deadline. `None` waits indefinitely.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Searches for recipes matching `state`.
    ///
    /// With neither query nor filter this lists the owner's own recipes.
    /// Otherwise the local store and the remote provider are queried
    /// concurrently and their results merged, local recipes first.
    ///
    /// # Errors
    ///
    /// - `PartialFailure::Degraded` when exactly one branch failed; it carries
    ///   the surviving branch's recipes.
    /// - `PartialFailure::Total` when every queried branch failed.
    /// - `PartialFailure::Superseded` when a newer search started meanwhile.
    pub async fn search(&self, state: &SearchState) -> Result<Vec<Recipe>, PartialFailure> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let outcome = if state.is_home_view() {
            self.home_view(state).await
        } else {
            self.fan_out(state).await
        };

        let current = self.generation.load(Ordering::SeqCst);
        if current != generation {
            info!(generation, current, "discarding superseded search");
            return Err(PartialFailure::Superseded {
                generation,
                current,
            });
        }
        outcome
    }

    async fn home_view(&self, state: &SearchState) -> Result<Vec<Recipe>, PartialFailure> {
        let local = self
            .settle(
                SearchSource::Local,
                self.repository.query_local_all(&self.owner),
            )
            .await;

        match local {
            Ok(recipes) => Ok(self.merger.merge(recipes, Vec::new(), state)),
            Err(reason) => Err(PartialFailure::Total { reason }),
        }
    }

    async fn fan_out(&self, state: &SearchState) -> Result<Vec<Recipe>, PartialFailure> {
        let (local, remote) = tokio::join!(
            self.settle(SearchSource::Local, self.query_local(state)),
            self.settle(SearchSource::Remote, self.query_remote(state)),
        );

        match (local, remote) {
            (Ok(local), Ok(remote)) => Ok(self.merger.merge(local, remote, state)),
            (Ok(local), Err(reason)) => Err(PartialFailure::Degraded {
                failed: SearchSource::Remote,
                reason,
                recipes: self.merger.merge(local, Vec::new(), state),
            }),
            (Err(reason), Ok(remote)) => Err(PartialFailure::Degraded {
                failed: SearchSource::Local,
                reason,
                recipes: self.merger.merge(Vec::new(), remote, state),
            }),
            (Err(local), Err(remote)) => Err(PartialFailure::Total {
                reason: format!("local: {local}; remote: {remote}"),
            }),
        }
    }

    /// The local branch. Text takes precedence over the filter here; area
    /// filters have no local counterpart and settle immediately with nothing.
    async fn query_local(&self, state: &SearchState) -> Result<Vec<Recipe>, RepositoryError> {
        if let Some(text) = state.query_text() {
            return self.repository.query_local_by_title(&self.owner, text).await;
        }

        let Some(filter) = state.active_filter() else {
            return Ok(Vec::new());
        };
        match (filter.kind, filter.local_field()) {
            (_, Some(field)) => {
                self.repository
                    .query_local_by_field(&self.owner, field, filter.primary())
                    .await
            }
            (FilterKind::FreeTextSearch, None) => {
                self.repository
                    .query_local_by_title(&self.owner, filter.primary())
                    .await
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn query_remote(&self, state: &SearchState) -> Result<Vec<Recipe>, RepositoryError> {
        match state.remote_query() {
            Some(query) => self.repository.search_remote(&query).await,
            None => Ok(Vec::new()),
        }
    }

    /// Awaits one branch, bounded by the configured deadline, and logs how it settled.
    async fn settle<F>(&self, source: SearchSource, branch: F) -> BranchResult
    where
        F: Future<Output = Result<Vec<Recipe>, RepositoryError>>,
    {
        let result = match self.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, branch).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => Err(format!("timed out after {}ms", deadline.as_millis())),
            },
            None => branch.await.map_err(|e| e.to_string()),
        };

        match &result {
            Ok(recipes) => debug!(%source, count = recipes.len(), "search branch settled"),
            Err(reason) => warn!(%source, %reason, "search branch failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ingredient, RecipeFilter};
    use crate::repository::{InMemoryRepository, Latency, RepositoryOp};

    fn ingredients(name: &str) -> Vec<Ingredient> {
        vec![Ingredient::new(name, "1", "")]
    }

    fn repository() -> Arc<InMemoryRepository> {
        Arc::new(
            InMemoryRepository::new()
                .with_local(vec![
                    Recipe::new("Greek Salad")
                        .with_id("1")
                        .with_owner("u1")
                        .with_category("Side")
                        .with_ingredients(ingredients("Feta")),
                    Recipe::new("Beef Stew")
                        .with_id("2")
                        .with_owner("u1")
                        .with_category("Beef")
                        .with_ingredients(ingredients("Beef")),
                    Recipe::imported("local-7", "Greek Moussaka")
                        .with_owner("u1")
                        .with_ingredients(ingredients("Aubergine")),
                    Recipe::new("Greek Yogurt")
                        .with_id("3")
                        .with_owner("u2")
                        .with_ingredients(ingredients("Milk")),
                ])
                .with_remote(vec![
                    Recipe::imported("52", "Greek Moussaka")
                        .with_category("Lamb")
                        .with_area("Greek")
                        .with_ingredients(ingredients("Aubergine")),
                    Recipe::imported("53", "Massaman Beef Curry")
                        .with_category("Beef")
                        .with_area("Thai")
                        .with_ingredients(ingredients("Beef")),
                ]),
        )
    }

    fn orchestrator(repo: &Arc<InMemoryRepository>) -> SearchOrchestrator {
        SearchOrchestrator::new(repo.clone(), "u1")
    }

    fn titles(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_home_view_skips_fan_out() {
        let repo = repository();
        let results = orchestrator(&repo).search(&SearchState::default()).await.unwrap();

        assert_eq!(titles(&results), vec!["Greek Salad", "Beef Stew"]);
        assert_eq!(repo.calls(RepositoryOp::RemoteSearch), 0);
        assert_eq!(repo.calls(RepositoryOp::LocalQuery), 1);
    }

    #[tokio::test]
    async fn test_home_view_failure_is_total() {
        let repo = repository();
        repo.fail(
            RepositoryOp::LocalQuery,
            RepositoryError::Unavailable("disk".to_string()),
        );
        let result = orchestrator(&repo).search(&SearchState::default()).await;
        assert!(matches!(result, Err(PartialFailure::Total { .. })));
    }

    #[tokio::test]
    async fn test_text_search_merges_local_first() {
        let repo = repository();
        let results = orchestrator(&repo)
            .search(&SearchState::with_query("greek"))
            .await
            .unwrap();

        // The local copy of the moussaka is excluded, the remote one kept
        assert_eq!(titles(&results), vec!["Greek Salad", "Greek Moussaka"]);
        assert_eq!(results[1].id, "52");
    }

    #[tokio::test]
    async fn test_category_filter_queries_local_field() {
        let repo = repository();
        let results = orchestrator(&repo)
            .search(&SearchState::with_filter(RecipeFilter::category("Beef")))
            .await
            .unwrap();
        assert_eq!(titles(&results), vec!["Beef Stew", "Massaman Beef Curry"]);
    }

    #[tokio::test]
    async fn test_ingredient_filter_queries_local_field() {
        let repo = repository();
        let results = orchestrator(&repo)
            .search(&SearchState::with_filter(RecipeFilter::ingredient("beef")))
            .await
            .unwrap();
        assert_eq!(titles(&results), vec!["Beef Stew", "Massaman Beef Curry"]);
        assert_eq!(repo.calls(RepositoryOp::LocalQuery), 1);
    }

    #[tokio::test]
    async fn test_free_text_filter_matches_local_titles() {
        let repo = repository();
        let results = orchestrator(&repo)
            .search(&SearchState::with_filter(RecipeFilter::free_text("greek")))
            .await
            .unwrap();

        // Greek Yogurt belongs to another user, the local moussaka copy is dropped
        assert_eq!(titles(&results), vec!["Greek Salad", "Greek Moussaka"]);
        assert_eq!(results[1].id, "52");
        assert_eq!(repo.calls(RepositoryOp::LocalQuery), 1);
    }

    #[tokio::test]
    async fn test_area_filter_has_no_local_branch() {
        let repo = repository();
        let results = orchestrator(&repo)
            .search(&SearchState::with_filter(RecipeFilter::area("Thai")))
            .await
            .unwrap();
        assert_eq!(titles(&results), vec!["Massaman Beef Curry"]);
        assert_eq!(repo.calls(RepositoryOp::LocalQuery), 0);
    }

    #[tokio::test]
    async fn test_filter_drives_remote_and_text_drives_local() {
        let repo = repository();
        let state = SearchState {
            query: "salad".to_string(),
            filter: Some(RecipeFilter::area("Thai")),
        };
        let results = orchestrator(&repo).search(&state).await.unwrap();
        assert_eq!(titles(&results), vec!["Greek Salad", "Massaman Beef Curry"]);
    }

    #[tokio::test]
    async fn test_remote_failure_degrades() {
        let repo = repository();
        repo.fail(
            RepositoryOp::RemoteSearch,
            RepositoryError::Unavailable("offline".to_string()),
        );
        let result = orchestrator(&repo).search(&SearchState::with_query("greek")).await;

        match result {
            Err(PartialFailure::Degraded {
                failed, recipes, ..
            }) => {
                assert_eq!(failed, SearchSource::Remote);
                assert_eq!(titles(&recipes), vec!["Greek Salad"]);
            }
            other => panic!("expected degraded result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_local_failure_degrades() {
        let repo = repository();
        repo.fail(
            RepositoryOp::LocalQuery,
            RepositoryError::Unavailable("disk".to_string()),
        );
        let failure = orchestrator(&repo)
            .search(&SearchState::with_query("greek"))
            .await
            .unwrap_err();

        assert!(!failure.is_user_visible());
        assert_eq!(titles(failure.recipes()), vec!["Greek Moussaka"]);
    }

    #[tokio::test]
    async fn test_both_failing_is_total() {
        let repo = repository();
        repo.fail(RepositoryOp::LocalQuery, RepositoryError::Unavailable("disk".to_string()));
        repo.fail(RepositoryOp::RemoteSearch, RepositoryError::Unavailable("net".to_string()));

        let failure = orchestrator(&repo)
            .search(&SearchState::with_query("greek"))
            .await
            .unwrap_err();
        assert!(failure.is_user_visible());
        assert!(failure.to_string().contains("disk"));
        assert!(failure.to_string().contains("net"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_join_waits_for_slower_branch() {
        let repo = repository();
        repo.set_latency(RepositoryOp::RemoteSearch, Latency::Delay(Duration::from_secs(3)));

        let start = tokio::time::Instant::now();
        let results = orchestrator(&repo)
            .search(&SearchState::with_query("greek"))
            .await
            .unwrap();
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert_eq!(results.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_branch_hits_deadline() {
        let repo = repository();
        repo.set_latency(RepositoryOp::RemoteSearch, Latency::Hang);

        let orchestrator = orchestrator(&repo).with_deadline(Some(Duration::from_secs(2)));
        let failure = orchestrator
            .search(&SearchState::with_query("greek"))
            .await
            .unwrap_err();

        match failure {
            PartialFailure::Degraded { failed, reason, .. } => {
                assert_eq!(failed, SearchSource::Remote);
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected degraded result, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_search_is_discarded() {
        let repo = repository();
        repo.set_latency(RepositoryOp::RemoteSearch, Latency::Delay(Duration::from_secs(2)));
        let orchestrator = Arc::new(orchestrator(&repo));

        let first = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.search(&SearchState::with_query("greek")).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        repo.set_latency(RepositoryOp::RemoteSearch, Latency::Immediate);
        let second = orchestrator
            .search(&SearchState::with_query("beef"))
            .await
            .unwrap();
        assert_eq!(titles(&second), vec!["Beef Stew", "Massaman Beef Curry"]);

        let first = first.await.unwrap();
        assert_eq!(
            first,
            Err(PartialFailure::Superseded {
                generation: 1,
                current: 2
            })
        );
    }
}
