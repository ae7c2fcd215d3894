use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum number of ingredients an imported recipe needs before it is
/// considered complete enough for detail display.
pub const STUB_MIN_INGREDIENTS: usize = 1;

/// Where a recipe snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecipeOrigin {
    /// Written by the user in the local store.
    #[default]
    LocallyAuthored,
    /// Parsed from the remote recipe API, or a local copy of such a recipe.
    ImportedFromRemote,
}

/// A single ingredient line.
///
/// `amount` is free-form text ("1 1/2", "a pinch") and is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    pub unit: String,
}

impl Ingredient {
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Ingredient {
            name: name.into(),
            amount: amount.into(),
            unit: unit.into(),
        }
    }
}

/// A recipe snapshot as delivered by the local store or the remote API.
///
/// Snapshots are treated as immutable values for the lifetime of a search
/// result. The only field the core ever rewrites is `favorite` (and `id`,
/// once a remote recipe has been materialized as a local favorite).
///
/// # Examples
///
/// ```
/// use recipe_hub::{Ingredient, Recipe, RecipeOrigin};
///
/// let recipe = Recipe::new("Greek Salad")
///     .with_owner("u1")
///     .with_ingredients(vec![Ingredient::new("Feta", "200", "g")]);
///
/// assert!(recipe.is_valid());
/// assert_eq!(recipe.origin, RecipeOrigin::LocallyAuthored);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Store identifier; empty until the recipe is persisted
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: String,
    /// Cuisine of the recipe, mostly populated for remote results
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub instructions: String,
    /// URL or storage reference of the title image
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub origin: RecipeOrigin,
}

impl Recipe {
    /// Creates an unsaved, locally authored recipe with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Recipe {
            id: String::new(),
            title: title.into(),
            category: String::new(),
            area: String::new(),
            ingredients: Vec::new(),
            instructions: String::new(),
            image: None,
            owner: String::new(),
            favorite: false,
            created_at: Utc::now(),
            origin: RecipeOrigin::LocallyAuthored,
        }
    }

    /// Creates a recipe snapshot that originates from the remote API.
    pub fn imported(id: impl Into<String>, title: impl Into<String>) -> Self {
        Recipe {
            id: id.into(),
            origin: RecipeOrigin::ImportedFromRemote,
            ..Recipe::new(title)
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    /// Returns true if this snapshot was parsed from, or copied from, the remote API.
    pub fn is_imported(&self) -> bool {
        self.origin == RecipeOrigin::ImportedFromRemote
    }

    /// Returns true if the recipe can be shown in a result list.
    ///
    /// A displayable recipe has a non-blank title and at least one ingredient.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.ingredients.is_empty()
    }

    /// Returns true if this is an imported recipe whose fields are too
    /// incomplete to display, meaning a full detail fetch is required first.
    ///
    /// Remote filter endpoints typically return only an id, title and
    /// thumbnail, which produces stubs.
    pub fn is_stub(&self) -> bool {
        self.is_imported()
            && (self.title.trim().is_empty() || self.ingredients.len() < STUB_MIN_INGREDIENTS)
    }

    /// Case-insensitive title substring match used for local text search.
    pub fn title_contains(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(&needle.to_lowercase())
    }

    /// Returns true if any ingredient name equals `name`, ignoring case.
    pub fn has_ingredient(&self, name: &str) -> bool {
        self.ingredients
            .iter()
            .any(|i| i.name.eq_ignore_ascii_case(name.trim()))
    }
}
