//! Value types shared by the search, filter and favorite components.

mod filter;
mod options;
mod recipe;

pub use filter::{FilterKind, LocalField, RecipeFilter, RemoteQuery, SearchState};
pub use options::{FilterOption, FilterOptionSet, OptionCollection, OptionKind, OptionState};
pub use recipe::{Ingredient, Recipe, RecipeOrigin, STUB_MIN_INGREDIENTS};
