use crate::config::HubConfig;
use crate::favorite::{FavoriteEvent, FavoriteReconciler};
use crate::fetcher::DetailResolver;
use crate::filter_options::FilterOptionsLoader;
use crate::repository::RecipeRepository;
use crate::search::SearchOrchestrator;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// The search, filter, favorite and detail components of one signed-in user,
/// all wired to the same repository.
///
/// Hosts build one hub per session and hand it to their screens instead of
/// reaching for a global manager.
///
/// # Examples
///
/// ```
/// use recipe_hub::{HubConfig, InMemoryRepository, RecipeHub, SearchState};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let hub = RecipeHub::new(Arc::new(InMemoryRepository::new()), "u1", HubConfig::default());
///
/// let home = hub.search().search(&SearchState::default()).await?;
/// assert!(home.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct RecipeHub {
    config: HubConfig,
    search: SearchOrchestrator,
    filter_options: FilterOptionsLoader,
    favorites: FavoriteReconciler,
    details: DetailResolver,
}

impl RecipeHub {
    pub fn new(
        repository: Arc<dyn RecipeRepository>,
        owner: impl Into<String>,
        config: HubConfig,
    ) -> Self {
        let owner = owner.into();
        RecipeHub {
            search: SearchOrchestrator::from_config(repository.clone(), owner.clone(), &config),
            filter_options: FilterOptionsLoader::from_config(repository.clone(), &config),
            favorites: FavoriteReconciler::new(repository.clone(), owner),
            details: DetailResolver::new(repository),
            config,
        }
    }

    /// Routes favorite notifications to `sender`.
    pub fn with_favorite_events(mut self, sender: UnboundedSender<FavoriteEvent>) -> Self {
        self.favorites = self.favorites.with_events(sender);
        self
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn search(&self) -> &SearchOrchestrator {
        &self.search
    }

    pub fn filter_options(&self) -> &FilterOptionsLoader {
        &self.filter_options
    }

    pub fn favorites(&self) -> &FavoriteReconciler {
        &self.favorites
    }

    pub fn details(&self) -> &DetailResolver {
        &self.details
    }
}
