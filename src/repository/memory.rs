use super::{RecipeRepository, RepositoryError};
use crate::model::{
    FilterKind, FilterOption, LocalField, OptionKind, Recipe, RecipeOrigin, RemoteQuery,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// How long a simulated call takes before it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Latency {
    #[default]
    Immediate,
    Delay(Duration),
    /// The call never settles.
    Hang,
}

impl Latency {
    async fn wait(self) {
        match self {
            Latency::Immediate => {}
            Latency::Delay(duration) => tokio::time::sleep(duration).await,
            Latency::Hang => std::future::pending::<()>().await,
        }
    }
}

/// Operation groups whose latency and failures can be configured separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOp {
    /// Any of the three local queries
    LocalQuery,
    RemoteSearch,
    Options(OptionKind),
    CommitFavorite,
    Materialize,
    RemoteDetail,
}

#[derive(Debug, Clone, Default)]
struct Behavior {
    latency: Latency,
    failure: Option<RepositoryError>,
}

#[derive(Debug, Default)]
struct State {
    local: Vec<Recipe>,
    remote: Vec<Recipe>,
    options: HashMap<OptionKind, Vec<FilterOption>>,
    behaviors: HashMap<RepositoryOp, Behavior>,
    calls: HashMap<RepositoryOp, usize>,
    next_id: u64,
}

/// An in-process [`RecipeRepository`].
///
/// Holds a local store and a remote catalogue in memory. Latency and failures
/// can be injected per [`RepositoryOp`], which makes it suitable both as an
/// offline backend and as a test double for the concurrent components.
///
/// Behaviour and data are sampled when a call starts, so reconfiguring the
/// repository does not affect calls already in flight.
///
/// # Examples
///
/// ```
/// use recipe_hub::{InMemoryRepository, Latency, Recipe, RepositoryOp};
/// use std::time::Duration;
///
/// let repo = InMemoryRepository::new()
///     .with_local(vec![Recipe::new("Greek Salad").with_owner("u1")]);
/// repo.set_latency(RepositoryOp::RemoteSearch, Latency::Delay(Duration::from_millis(200)));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the local store.
    pub fn with_local(self, recipes: Vec<Recipe>) -> Self {
        self.state().local = recipes;
        self
    }

    /// Seeds the remote catalogue. Entries are marked as imported.
    pub fn with_remote(self, recipes: Vec<Recipe>) -> Self {
        self.state().remote = recipes
            .into_iter()
            .map(|mut r| {
                r.origin = RecipeOrigin::ImportedFromRemote;
                r
            })
            .collect();
        self
    }

    pub fn with_options(self, kind: OptionKind, options: Vec<FilterOption>) -> Self {
        self.set_options(kind, options);
        self
    }

    pub fn set_options(&self, kind: OptionKind, options: Vec<FilterOption>) {
        self.state().options.insert(kind, options);
    }

    pub fn set_latency(&self, op: RepositoryOp, latency: Latency) {
        self.state().behaviors.entry(op).or_default().latency = latency;
    }

    /// Makes every subsequent call of `op` fail with `error`.
    pub fn fail(&self, op: RepositoryOp, error: RepositoryError) {
        self.state().behaviors.entry(op).or_default().failure = Some(error);
    }

    /// Clears an injected failure of `op`.
    pub fn recover(&self, op: RepositoryOp) {
        if let Some(behavior) = self.state().behaviors.get_mut(&op) {
            behavior.failure = None;
        }
    }

    /// Number of calls of `op` started so far.
    pub fn calls(&self, op: RepositoryOp) -> usize {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    /// Snapshot of the local store.
    pub fn local_recipes(&self) -> Vec<Recipe> {
        self.state().local.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records the call, samples its behaviour and a read of the state, then
    /// waits out the configured latency.
    async fn call<T>(
        &self,
        op: RepositoryOp,
        read: impl FnOnce(&State) -> T,
    ) -> Result<T, RepositoryError> {
        let (behavior, value) = {
            let mut state = self.state();
            *state.calls.entry(op).or_insert(0) += 1;
            let behavior = state.behaviors.get(&op).cloned().unwrap_or_default();
            (behavior, read(&state))
        };

        behavior.latency.wait().await;

        match behavior.failure {
            Some(error) => Err(error),
            None => Ok(value),
        }
    }
}

fn owned_by<'a>(recipes: &'a [Recipe], owner: &'a str) -> impl Iterator<Item = &'a Recipe> {
    recipes.iter().filter(move |r| r.owner == owner)
}

fn remote_matches(recipe: &Recipe, query: &RemoteQuery) -> bool {
    match query {
        RemoteQuery::Text(text) => recipe.title_contains(text),
        RemoteQuery::Filter(filter) => {
            let value = filter.primary();
            match filter.kind {
                FilterKind::Category => recipe.category.eq_ignore_ascii_case(value),
                FilterKind::Area => recipe.area.eq_ignore_ascii_case(value),
                FilterKind::Ingredient => recipe.has_ingredient(value),
                FilterKind::FreeTextSearch => recipe.title_contains(value),
            }
        }
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRepository {
    async fn query_local_by_title(
        &self,
        owner: &str,
        substring: &str,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        self.call(RepositoryOp::LocalQuery, |state| {
            owned_by(&state.local, owner)
                .filter(|r| r.title_contains(substring))
                .cloned()
                .collect()
        })
        .await
    }

    async fn query_local_by_field(
        &self,
        owner: &str,
        field: LocalField,
        value: &str,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        self.call(RepositoryOp::LocalQuery, |state| {
            owned_by(&state.local, owner)
                .filter(|r| match field {
                    LocalField::Category => r.category.eq_ignore_ascii_case(value.trim()),
                    LocalField::Ingredient => r.has_ingredient(value),
                })
                .cloned()
                .collect()
        })
        .await
    }

    async fn query_local_all(&self, owner: &str) -> Result<Vec<Recipe>, RepositoryError> {
        self.call(RepositoryOp::LocalQuery, |state| {
            owned_by(&state.local, owner).cloned().collect()
        })
        .await
    }

    async fn search_remote(&self, query: &RemoteQuery) -> Result<Vec<Recipe>, RepositoryError> {
        self.call(RepositoryOp::RemoteSearch, |state| {
            state
                .remote
                .iter()
                .filter(|r| remote_matches(r, query))
                .cloned()
                .collect()
        })
        .await
    }

    async fn fetch_remote_option_set(
        &self,
        kind: OptionKind,
    ) -> Result<Vec<FilterOption>, RepositoryError> {
        self.call(RepositoryOp::Options(kind), |state| {
            state.options.get(&kind).cloned().unwrap_or_default()
        })
        .await
    }

    async fn commit_favorite(&self, recipe_id: &str, value: bool) -> Result<(), RepositoryError> {
        self.call(RepositoryOp::CommitFavorite, |_| ()).await?;

        let mut state = self.state();
        let recipe = state
            .local
            .iter_mut()
            .find(|r| r.id == recipe_id)
            .ok_or_else(|| RepositoryError::NotFound(recipe_id.to_string()))?;
        recipe.favorite = value;
        Ok(())
    }

    async fn materialize_favorite(&self, recipe: &Recipe) -> Result<String, RepositoryError> {
        self.call(RepositoryOp::Materialize, |_| ()).await?;

        let mut state = self.state();
        state.next_id += 1;
        let id = format!("local-{}", state.next_id);
        let mut copy = recipe.clone();
        copy.id = id.clone();
        copy.favorite = true;
        copy.origin = RecipeOrigin::ImportedFromRemote;
        state.local.push(copy);
        Ok(id)
    }

    async fn fetch_remote_detail(&self, recipe_id: &str) -> Result<Recipe, RepositoryError> {
        let found = self
            .call(RepositoryOp::RemoteDetail, |state| {
                state.remote.iter().find(|r| r.id == recipe_id).cloned()
            })
            .await?;
        found.ok_or_else(|| RepositoryError::NotFound(recipe_id.to_string()))
    }
}
