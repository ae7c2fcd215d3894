//! UniFFI bindings for cross-platform support (iOS, Android).
//!
//! Mobile hosts own networking and storage. They implement
//! [`FfiRecipeRepository`] and hand it to [`FfiRecipeHub`], which runs the
//! search, filter option, favorite and detail components on its own runtime
//! behind blocking calls. The pure helpers (merging, stub detection, fallback
//! options, snapshots, configuration, logging) are exported as free functions.
//! Types are converted to flat records suitable for FFI.

use crate::config::{ConfigError, HubConfig};
use crate::favorite::CommitError;
use crate::filter_options::Superseded;
use crate::hub::RecipeHub;
use crate::logging::{self, LoggingError};
use crate::model::{
    FilterKind, FilterOption, FilterOptionSet, Ingredient, LocalField, OptionCollection,
    OptionKind, OptionState, Recipe, RecipeFilter, RecipeOrigin, RemoteQuery, SearchState,
};
use crate::repository::{RecipeRepository, RepositoryError};
use crate::search::{PartialFailure, ResultMerger, SearchSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// FFI-safe error type that wraps all possible errors.
#[derive(Debug, uniffi::Error, thiserror::Error)]
pub enum HubError {
    #[error("Config error: {message}")]
    ConfigError { message: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    #[error("Logging error: {message}")]
    LoggingError { message: String },

    #[error("Runtime error: {message}")]
    RuntimeError { message: String },

    #[error("Search failed: {message}")]
    SearchFailed { message: String },

    #[error("Superseded: {message}")]
    Superseded { message: String },

    #[error("Commit failed: {message}")]
    CommitFailed { message: String },

    #[error("Repository error: {message}")]
    RepositoryError { message: String },
}

impl From<ConfigError> for HubError {
    fn from(e: ConfigError) -> Self {
        HubError::ConfigError {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for HubError {
    fn from(e: serde_json::Error) -> Self {
        HubError::SerializationError {
            message: e.to_string(),
        }
    }
}

impl From<LoggingError> for HubError {
    fn from(e: LoggingError) -> Self {
        HubError::LoggingError {
            message: e.to_string(),
        }
    }
}

impl From<Superseded> for HubError {
    fn from(e: Superseded) -> Self {
        HubError::Superseded {
            message: e.to_string(),
        }
    }
}

impl From<CommitError> for HubError {
    fn from(e: CommitError) -> Self {
        HubError::CommitFailed {
            message: e.to_string(),
        }
    }
}

impl From<RepositoryError> for HubError {
    fn from(e: RepositoryError) -> Self {
        HubError::RepositoryError {
            message: e.to_string(),
        }
    }
}

/// Errors a host repository reports back across the FFI boundary.
#[derive(Debug, uniffi::Error, thiserror::Error)]
pub enum FfiRepositoryError {
    #[error("Data source unavailable: {message}")]
    Unavailable { message: String },

    #[error("Recipe not found: {message}")]
    NotFound { message: String },

    #[error("Request rejected: {message}")]
    Rejected { message: String },

    #[error("Recipe is incomplete: {message}")]
    Incomplete { message: String },
}

impl From<uniffi::UnexpectedUniFFICallbackError> for FfiRepositoryError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        FfiRepositoryError::Unavailable { message: e.reason }
    }
}

impl From<FfiRepositoryError> for RepositoryError {
    fn from(e: FfiRepositoryError) -> Self {
        match e {
            FfiRepositoryError::Unavailable { message } => RepositoryError::Unavailable(message),
            FfiRepositoryError::NotFound { message } => RepositoryError::NotFound(message),
            FfiRepositoryError::Rejected { message } => RepositoryError::Rejected(message),
            FfiRepositoryError::Incomplete { message } => RepositoryError::Incomplete(message),
        }
    }
}

/// FFI-safe representation of an ingredient line.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiIngredient {
    pub name: String,
    pub amount: String,
    pub unit: String,
}

/// FFI-safe representation of a recipe.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiRecipe {
    /// Empty until the recipe is persisted
    pub id: String,
    pub title: String,
    pub category: String,
    pub area: String,
    pub ingredients: Vec<FfiIngredient>,
    pub instructions: String,
    pub image: Option<String>,
    pub owner: String,
    pub favorite: bool,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at_ms: i64,
    pub imported_from_remote: bool,
}

impl From<Recipe> for FfiRecipe {
    fn from(r: Recipe) -> Self {
        FfiRecipe {
            imported_from_remote: r.is_imported(),
            created_at_ms: r.created_at.timestamp_millis(),
            id: r.id,
            title: r.title,
            category: r.category,
            area: r.area,
            ingredients: r
                .ingredients
                .into_iter()
                .map(|i| FfiIngredient {
                    name: i.name,
                    amount: i.amount,
                    unit: i.unit,
                })
                .collect(),
            instructions: r.instructions,
            image: r.image,
            owner: r.owner,
            favorite: r.favorite,
        }
    }
}

impl From<FfiRecipe> for Recipe {
    fn from(r: FfiRecipe) -> Self {
        Recipe {
            id: r.id,
            title: r.title,
            category: r.category,
            area: r.area,
            ingredients: r
                .ingredients
                .into_iter()
                .map(|i| Ingredient::new(i.name, i.amount, i.unit))
                .collect(),
            instructions: r.instructions,
            image: r.image,
            owner: r.owner,
            favorite: r.favorite,
            created_at: DateTime::<Utc>::from_timestamp_millis(r.created_at_ms).unwrap_or_default(),
            origin: if r.imported_from_remote {
                RecipeOrigin::ImportedFromRemote
            } else {
                RecipeOrigin::LocallyAuthored
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiFilterKind {
    Category,
    Area,
    Ingredient,
    FreeTextSearch,
}

impl From<FilterKind> for FfiFilterKind {
    fn from(k: FilterKind) -> Self {
        match k {
            FilterKind::Category => FfiFilterKind::Category,
            FilterKind::Area => FfiFilterKind::Area,
            FilterKind::Ingredient => FfiFilterKind::Ingredient,
            FilterKind::FreeTextSearch => FfiFilterKind::FreeTextSearch,
        }
    }
}

impl From<FfiFilterKind> for FilterKind {
    fn from(k: FfiFilterKind) -> Self {
        match k {
            FfiFilterKind::Category => FilterKind::Category,
            FfiFilterKind::Area => FilterKind::Area,
            FfiFilterKind::Ingredient => FilterKind::Ingredient,
            FfiFilterKind::FreeTextSearch => FilterKind::FreeTextSearch,
        }
    }
}

/// FFI-safe representation of a filter. Only `value` is used for matching.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiRecipeFilter {
    pub kind: FfiFilterKind,
    pub value: String,
    pub additional: Vec<String>,
}

impl From<RecipeFilter> for FfiRecipeFilter {
    fn from(f: RecipeFilter) -> Self {
        FfiRecipeFilter {
            kind: f.kind.into(),
            value: f.value,
            additional: f.additional,
        }
    }
}

/// What the remote provider is asked for.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiRemoteQuery {
    Filter { filter: FfiRecipeFilter },
    Text { text: String },
}

impl From<RemoteQuery> for FfiRemoteQuery {
    fn from(q: RemoteQuery) -> Self {
        match q {
            RemoteQuery::Filter(filter) => FfiRemoteQuery::Filter {
                filter: filter.into(),
            },
            RemoteQuery::Text(text) => FfiRemoteQuery::Text { text },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiLocalField {
    Category,
    Ingredient,
}

impl From<LocalField> for FfiLocalField {
    fn from(f: LocalField) -> Self {
        match f {
            LocalField::Category => FfiLocalField::Category,
            LocalField::Ingredient => FfiLocalField::Ingredient,
        }
    }
}

/// FFI-safe representation of the home screen's search state.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiSearchState {
    pub query: String,
    pub filter: Option<FfiRecipeFilter>,
}

impl From<FfiSearchState> for SearchState {
    fn from(s: FfiSearchState) -> Self {
        SearchState {
            query: s.query,
            filter: s
                .filter
                .map(|f| RecipeFilter::new(f.kind.into(), f.value).with_additional(f.additional)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiOptionKind {
    Category,
    Area,
    Ingredient,
}

impl From<FfiOptionKind> for OptionKind {
    fn from(k: FfiOptionKind) -> Self {
        match k {
            FfiOptionKind::Category => OptionKind::Category,
            FfiOptionKind::Area => OptionKind::Area,
            FfiOptionKind::Ingredient => OptionKind::Ingredient,
        }
    }
}

impl From<OptionKind> for FfiOptionKind {
    fn from(k: OptionKind) -> Self {
        match k {
            OptionKind::Category => FfiOptionKind::Category,
            OptionKind::Area => FfiOptionKind::Area,
            OptionKind::Ingredient => FfiOptionKind::Ingredient,
        }
    }
}

/// An entry of a filter picker.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiFilterOption {
    pub id: String,
    pub display_name: String,
}

impl From<FilterOption> for FfiFilterOption {
    fn from(o: FilterOption) -> Self {
        FfiFilterOption {
            id: o.id,
            display_name: o.display_name,
        }
    }
}

impl From<FfiFilterOption> for FilterOption {
    fn from(o: FfiFilterOption) -> Self {
        FilterOption::new(o.id, o.display_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiOptionState {
    Unloaded,
    LoadedFromSource,
    LoadedAsFallback,
}

impl From<OptionState> for FfiOptionState {
    fn from(s: OptionState) -> Self {
        match s {
            OptionState::Unloaded => FfiOptionState::Unloaded,
            OptionState::LoadedFromSource => FfiOptionState::LoadedFromSource,
            OptionState::LoadedAsFallback => FfiOptionState::LoadedAsFallback,
        }
    }
}

/// One filter picker and how its entries were obtained.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiOptionCollection {
    pub state: FfiOptionState,
    pub options: Vec<FfiFilterOption>,
}

impl From<&OptionCollection> for FfiOptionCollection {
    fn from(c: &OptionCollection) -> Self {
        FfiOptionCollection {
            state: c.state().into(),
            options: c.options().iter().cloned().map(FfiFilterOption::from).collect(),
        }
    }
}

/// The three pickers of the filter dialog.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiFilterOptionSet {
    pub categories: FfiOptionCollection,
    pub areas: FfiOptionCollection,
    pub ingredients: FfiOptionCollection,
    /// True once every picker is loaded, from source or fallback
    pub ready: bool,
}

impl From<FilterOptionSet> for FfiFilterOptionSet {
    fn from(set: FilterOptionSet) -> Self {
        FfiFilterOptionSet {
            categories: (&set.categories).into(),
            areas: (&set.areas).into(),
            ingredients: (&set.ingredients).into(),
            ready: set.is_ready(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiSearchSource {
    Local,
    Remote,
}

impl From<SearchSource> for FfiSearchSource {
    fn from(s: SearchSource) -> Self {
        match s {
            SearchSource::Local => FfiSearchSource::Local,
            SearchSource::Remote => FfiSearchSource::Remote,
        }
    }
}

/// The displayable result of a search.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiSearchOutcome {
    pub recipes: Vec<FfiRecipe>,
    /// The source that failed when `recipes` holds only the other source's results
    pub failed_source: Option<FfiSearchSource>,
    pub failure_reason: Option<String>,
}

/// FFI-safe representation of the configuration.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiHubConfig {
    pub filter_options_deadline_ms: u64,
    pub search_deadline_ms: Option<u64>,
    pub log_level: String,
}

impl TryFrom<FfiHubConfig> for HubConfig {
    type Error = ConfigError;

    fn try_from(c: FfiHubConfig) -> Result<Self, Self::Error> {
        let config = HubConfig {
            filter_options_deadline_ms: c.filter_options_deadline_ms,
            search_deadline_ms: c.search_deadline_ms,
            log_level: c.log_level,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<HubConfig> for FfiHubConfig {
    fn from(c: HubConfig) -> Self {
        FfiHubConfig {
            filter_options_deadline_ms: c.filter_options_deadline_ms,
            search_deadline_ms: c.search_deadline_ms,
            log_level: c.log_level,
        }
    }
}

// ============================================================================
// Exported FFI Functions
// ============================================================================

/// Merges local and remote search candidates.
///
/// # Arguments
/// * `local` - Candidates from the local store, in store order
/// * `remote` - Candidates from the remote API, in API order
/// * `state` - The search state that produced the candidates
/// * `current_user` - Id of the signed-in user, used by the home view
///
/// # Returns
/// The displayable recipes, local ones first.
#[uniffi::export]
pub fn merge_results(
    local: Vec<FfiRecipe>,
    remote: Vec<FfiRecipe>,
    state: FfiSearchState,
    current_user: String,
) -> Vec<FfiRecipe> {
    let merger = ResultMerger::new(current_user);
    merger
        .merge(
            local.into_iter().map(Recipe::from).collect(),
            remote.into_iter().map(Recipe::from).collect(),
            &state.into(),
        )
        .into_iter()
        .map(FfiRecipe::from)
        .collect()
}

/// Returns true if the recipe needs a full-detail fetch before display.
#[uniffi::export]
pub fn is_stub_recipe(recipe: FfiRecipe) -> bool {
    Recipe::from(recipe).is_stub()
}

/// Returns the hardcoded fallback list of a filter picker.
#[uniffi::export]
pub fn fallback_filter_options(kind: FfiOptionKind) -> Vec<FfiFilterOption> {
    OptionKind::from(kind)
        .fallback()
        .into_iter()
        .map(FfiFilterOption::from)
        .collect()
}

/// Serializes a recipe snapshot to JSON, e.g. for a host-side cache.
#[uniffi::export]
pub fn recipe_to_json(recipe: FfiRecipe) -> Result<String, HubError> {
    Ok(serde_json::to_string(&Recipe::from(recipe))?)
}

/// Parses a recipe snapshot previously produced by [`recipe_to_json`].
#[uniffi::export]
pub fn recipe_from_json(json: String) -> Result<FfiRecipe, HubError> {
    let recipe: Recipe = serde_json::from_str(&json)?;
    Ok(recipe.into())
}

/// Parses and validates YAML configuration.
#[uniffi::export]
pub fn parse_config(yaml: String) -> Result<FfiHubConfig, HubError> {
    Ok(HubConfig::from_yaml_str(&yaml)?.into())
}

/// Installs the default log subscriber.
///
/// # Returns
/// False if a subscriber was already installed.
#[uniffi::export]
pub fn init_logging(level: String) -> Result<bool, HubError> {
    Ok(logging::init(&level)?)
}

/// Returns the library version.
#[uniffi::export]
pub fn library_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// ============================================================================
// Host Repository and Hub
// ============================================================================

/// The data access a mobile host provides.
///
/// Methods are called from the hub's worker threads and may block; the local
/// and remote branches of a search run concurrently.
#[uniffi::export(with_foreign)]
pub trait FfiRecipeRepository: Send + Sync {
    fn query_local_by_title(
        &self,
        owner: String,
        substring: String,
    ) -> Result<Vec<FfiRecipe>, FfiRepositoryError>;

    fn query_local_by_field(
        &self,
        owner: String,
        field: FfiLocalField,
        value: String,
    ) -> Result<Vec<FfiRecipe>, FfiRepositoryError>;

    fn query_local_all(&self, owner: String) -> Result<Vec<FfiRecipe>, FfiRepositoryError>;

    fn search_remote(&self, query: FfiRemoteQuery) -> Result<Vec<FfiRecipe>, FfiRepositoryError>;

    fn fetch_remote_option_set(
        &self,
        kind: FfiOptionKind,
    ) -> Result<Vec<FfiFilterOption>, FfiRepositoryError>;

    fn commit_favorite(&self, recipe_id: String, value: bool) -> Result<(), FfiRepositoryError>;

    /// Writes a local copy and returns its new local id.
    fn materialize_favorite(&self, recipe: FfiRecipe) -> Result<String, FfiRepositoryError>;

    fn fetch_remote_detail(&self, recipe_id: String) -> Result<FfiRecipe, FfiRepositoryError>;
}

/// Adapts a host repository to [`RecipeRepository`].
///
/// Each call runs on the blocking pool so a slow host call cannot stall the
/// other branch or the deadlines.
struct HostRepository {
    inner: Arc<dyn FfiRecipeRepository>,
}

impl HostRepository {
    async fn call<T, F>(&self, op: F) -> Result<T, RepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn FfiRecipeRepository) -> Result<T, FfiRepositoryError> + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || op(inner.as_ref()))
            .await
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))?
            .map_err(RepositoryError::from)
    }
}

fn into_recipes(recipes: Vec<FfiRecipe>) -> Vec<Recipe> {
    recipes.into_iter().map(Recipe::from).collect()
}

#[async_trait]
impl RecipeRepository for HostRepository {
    async fn query_local_by_title(
        &self,
        owner: &str,
        substring: &str,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        let (owner, substring) = (owner.to_string(), substring.to_string());
        self.call(move |repo| repo.query_local_by_title(owner, substring))
            .await
            .map(into_recipes)
    }

    async fn query_local_by_field(
        &self,
        owner: &str,
        field: LocalField,
        value: &str,
    ) -> Result<Vec<Recipe>, RepositoryError> {
        let (owner, value) = (owner.to_string(), value.to_string());
        self.call(move |repo| repo.query_local_by_field(owner, field.into(), value))
            .await
            .map(into_recipes)
    }

    async fn query_local_all(&self, owner: &str) -> Result<Vec<Recipe>, RepositoryError> {
        let owner = owner.to_string();
        self.call(move |repo| repo.query_local_all(owner))
            .await
            .map(into_recipes)
    }

    async fn search_remote(&self, query: &RemoteQuery) -> Result<Vec<Recipe>, RepositoryError> {
        let query = FfiRemoteQuery::from(query.clone());
        self.call(move |repo| repo.search_remote(query))
            .await
            .map(into_recipes)
    }

    async fn fetch_remote_option_set(
        &self,
        kind: OptionKind,
    ) -> Result<Vec<FilterOption>, RepositoryError> {
        let options = self
            .call(move |repo| repo.fetch_remote_option_set(kind.into()))
            .await?;
        Ok(options.into_iter().map(FilterOption::from).collect())
    }

    async fn commit_favorite(&self, recipe_id: &str, value: bool) -> Result<(), RepositoryError> {
        let recipe_id = recipe_id.to_string();
        self.call(move |repo| repo.commit_favorite(recipe_id, value))
            .await
    }

    async fn materialize_favorite(&self, recipe: &Recipe) -> Result<String, RepositoryError> {
        let recipe = FfiRecipe::from(recipe.clone());
        self.call(move |repo| repo.materialize_favorite(recipe))
            .await
    }

    async fn fetch_remote_detail(&self, recipe_id: &str) -> Result<Recipe, RepositoryError> {
        let recipe_id = recipe_id.to_string();
        self.call(move |repo| repo.fetch_remote_detail(recipe_id))
            .await
            .map(Recipe::from)
    }
}

/// One signed-in user's recipe hub, for hosts without an async runtime.
///
/// Every method blocks the calling thread until the operation settles. Calls
/// may come from several host threads at once; a newer search or option load
/// supersedes an older one exactly as in [`RecipeHub`].
#[derive(uniffi::Object)]
pub struct FfiRecipeHub {
    runtime: tokio::runtime::Runtime,
    inner: RecipeHub,
}

#[uniffi::export]
impl FfiRecipeHub {
    /// Creates a hub over a host repository.
    #[uniffi::constructor]
    pub fn new(
        repository: Arc<dyn FfiRecipeRepository>,
        owner: String,
        config: FfiHubConfig,
    ) -> Result<Arc<Self>, HubError> {
        let config = HubConfig::try_from(config)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_time()
            .thread_name("recipe-hub")
            .build()
            .map_err(|e| HubError::RuntimeError {
                message: e.to_string(),
            })?;
        let repository = Arc::new(HostRepository { inner: repository });

        Ok(Arc::new(FfiRecipeHub {
            runtime,
            inner: RecipeHub::new(repository, owner, config),
        }))
    }

    /// Runs a search.
    ///
    /// A single failed source still yields the other source's recipes, with
    /// `failed_source` set.
    pub fn search(&self, state: FfiSearchState) -> Result<FfiSearchOutcome, HubError> {
        let state = SearchState::from(state);
        let outcome = self.runtime.block_on(self.inner.search().search(&state));

        match outcome {
            Ok(recipes) => Ok(FfiSearchOutcome {
                recipes: recipes.into_iter().map(FfiRecipe::from).collect(),
                failed_source: None,
                failure_reason: None,
            }),
            Err(PartialFailure::Degraded {
                failed,
                reason,
                recipes,
            }) => Ok(FfiSearchOutcome {
                recipes: recipes.into_iter().map(FfiRecipe::from).collect(),
                failed_source: Some(failed.into()),
                failure_reason: Some(reason),
            }),
            Err(failure @ PartialFailure::Total { .. }) => Err(HubError::SearchFailed {
                message: failure.to_string(),
            }),
            Err(failure @ PartialFailure::Superseded { .. }) => Err(HubError::Superseded {
                message: failure.to_string(),
            }),
        }
    }

    /// Loads the three filter pickers, falling back where a source fails or is late.
    pub fn load_filter_options(&self) -> Result<FfiFilterOptionSet, HubError> {
        let set = self.runtime.block_on(self.inner.filter_options().load())?;
        Ok(set.into())
    }

    /// The pickers of the most recent load, possibly still partial.
    pub fn filter_options_snapshot(&self) -> FfiFilterOptionSet {
        self.inner.filter_options().snapshot().into()
    }

    /// Sets the favorite flag and returns the updated recipe.
    ///
    /// A favorited remote recipe comes back with its new local id.
    pub fn toggle_favorite(&self, recipe: FfiRecipe, value: bool) -> Result<FfiRecipe, HubError> {
        let mut recipe = Recipe::from(recipe);
        self.runtime
            .block_on(self.inner.favorites().toggle(&mut recipe, value))?;
        Ok(recipe.into())
    }

    /// Completes a stub recipe with its full details.
    pub fn resolve_detail(&self, recipe: FfiRecipe) -> Result<FfiRecipe, HubError> {
        let recipe = self
            .runtime
            .block_on(self.inner.details().resolve(recipe.into()))?;
        Ok(recipe.into())
    }

    pub fn config(&self) -> FfiHubConfig {
        self.inner.config().clone().into()
    }
}
