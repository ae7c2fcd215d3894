use serde::{Deserialize, Serialize};
use std::fmt;

/// The three option collections shown in the filter dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Category,
    Area,
    Ingredient,
}

impl OptionKind {
    pub const ALL: [OptionKind; 3] = [OptionKind::Category, OptionKind::Area, OptionKind::Ingredient];

    /// Hardcoded defaults used when the remote source fails or misses the deadline.
    pub fn fallback(self) -> Vec<FilterOption> {
        let names: &[&str] = match self {
            OptionKind::Category => FALLBACK_CATEGORIES,
            OptionKind::Area => FALLBACK_AREAS,
            OptionKind::Ingredient => FALLBACK_INGREDIENTS,
        };
        names.iter().map(|name| FilterOption::named(name)).collect()
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::Category => "categories",
            OptionKind::Area => "areas",
            OptionKind::Ingredient => "ingredients",
        };
        f.write_str(name)
    }
}

const FALLBACK_CATEGORIES: &[&str] = &[
    "Beef",
    "Chicken",
    "Dessert",
    "Lamb",
    "Miscellaneous",
    "Pasta",
    "Pork",
    "Seafood",
    "Side",
    "Starter",
    "Vegan",
    "Vegetarian",
];

const FALLBACK_AREAS: &[&str] = &[
    "American", "British", "Chinese", "French", "Indian", "Italian", "Japanese", "Mexican",
    "Spanish", "Thai",
];

const FALLBACK_INGREDIENTS: &[&str] = &[
    "Chicken", "Beef", "Pork", "Salmon", "Rice", "Pasta", "Potatoes", "Tomatoes", "Onion",
    "Garlic", "Eggs", "Cheese",
];

/// A single selectable entry of a picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub id: String,
    pub display_name: String,
}

impl FilterOption {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        FilterOption {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// An option whose id is its display name.
    pub fn named(name: &str) -> Self {
        Self::new(name, name)
    }
}

/// Lifecycle of one option collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionState {
    #[default]
    Unloaded,
    LoadedFromSource,
    LoadedAsFallback,
}

impl OptionState {
    pub fn is_terminal(self) -> bool {
        self != OptionState::Unloaded
    }
}

/// One option collection together with its lifecycle state.
///
/// A collection only ever leaves `Unloaded` once; later resolutions are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptionCollection {
    state: OptionState,
    options: Vec<FilterOption>,
}

impl OptionCollection {
    pub fn state(&self) -> OptionState {
        self.state
    }

    pub fn options(&self) -> &[FilterOption] {
        &self.options
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Stores options delivered by the remote source.
    ///
    /// Returns false and leaves the collection untouched if it was already resolved.
    pub fn resolve(&mut self, options: Vec<FilterOption>) -> bool {
        self.settle(OptionState::LoadedFromSource, options)
    }

    /// Stores the hardcoded fallback for `kind`.
    ///
    /// Returns false and leaves the collection untouched if it was already resolved.
    pub fn fall_back(&mut self, kind: OptionKind) -> bool {
        self.settle(OptionState::LoadedAsFallback, kind.fallback())
    }

    fn settle(&mut self, state: OptionState, options: Vec<FilterOption>) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = state;
        self.options = options;
        true
    }
}

/// The category, area and ingredient pickers of the filter dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterOptionSet {
    pub categories: OptionCollection,
    pub areas: OptionCollection,
    pub ingredients: OptionCollection,
}

impl FilterOptionSet {
    /// A set where every collection holds its fallback list.
    pub fn fallback() -> Self {
        let mut set = FilterOptionSet::default();
        for kind in OptionKind::ALL {
            set.get_mut(kind).fall_back(kind);
        }
        set
    }

    pub fn get(&self, kind: OptionKind) -> &OptionCollection {
        match kind {
            OptionKind::Category => &self.categories,
            OptionKind::Area => &self.areas,
            OptionKind::Ingredient => &self.ingredients,
        }
    }

    pub fn get_mut(&mut self, kind: OptionKind) -> &mut OptionCollection {
        match kind {
            OptionKind::Category => &mut self.categories,
            OptionKind::Area => &mut self.areas,
            OptionKind::Ingredient => &mut self.ingredients,
        }
    }

    /// Returns true once every collection is terminal, which is when the
    /// dialog may enable its "Apply" action.
    pub fn is_ready(&self) -> bool {
        OptionKind::ALL.iter().all(|kind| self.get(*kind).is_terminal())
    }
}
