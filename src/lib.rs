pub mod config;
pub mod favorite;
pub mod fetcher;
pub mod ffi;
pub mod filter_options;
mod hub;
pub mod logging;
pub mod model;
pub mod repository;
pub mod search;

pub use config::{ConfigError, HubConfig};
pub use favorite::{CommitError, FavoriteEvent, FavoriteReconciler};
pub use fetcher::DetailResolver;
pub use filter_options::{FilterOptionsLoader, Superseded};
pub use hub::RecipeHub;
pub use model::*;
pub use repository::{InMemoryRepository, Latency, RecipeRepository, RepositoryError, RepositoryOp};
pub use search::{PartialFailure, ResultMerger, SearchOrchestrator, SearchSource};

uniffi::setup_scaffolding!();
