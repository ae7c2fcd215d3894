use serde::{Deserialize, Serialize};
use std::fmt;

/// The dimension a [`RecipeFilter`] selects on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Category,
    Area,
    Ingredient,
    FreeTextSearch,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterKind::Category => "category",
            FilterKind::Area => "area",
            FilterKind::Ingredient => "ingredient",
            FilterKind::FreeTextSearch => "search",
        };
        f.write_str(name)
    }
}

/// A filter picked in the filter dialog.
///
/// Carries one primary value plus optional additional values. Matching only
/// consumes the primary value; additional values are accepted and kept so the
/// dialog can round-trip them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFilter {
    pub kind: FilterKind,
    pub value: String,
    #[serde(default)]
    pub additional: Vec<String>,
}

impl RecipeFilter {
    pub fn new(kind: FilterKind, value: impl Into<String>) -> Self {
        RecipeFilter {
            kind,
            value: value.into(),
            additional: Vec::new(),
        }
    }

    pub fn category(value: impl Into<String>) -> Self {
        Self::new(FilterKind::Category, value)
    }

    pub fn area(value: impl Into<String>) -> Self {
        Self::new(FilterKind::Area, value)
    }

    pub fn ingredient(value: impl Into<String>) -> Self {
        Self::new(FilterKind::Ingredient, value)
    }

    pub fn free_text(value: impl Into<String>) -> Self {
        Self::new(FilterKind::FreeTextSearch, value)
    }

    pub fn with_additional(mut self, values: Vec<String>) -> Self {
        self.additional = values;
        self
    }

    /// The value matching logic uses.
    pub fn primary(&self) -> &str {
        self.value.trim()
    }

    /// Returns true if the primary value is blank.
    pub fn is_empty(&self) -> bool {
        self.primary().is_empty()
    }

    /// The local store field this filter maps onto, if any.
    ///
    /// Area filters have no local equivalent.
    pub fn local_field(&self) -> Option<LocalField> {
        match self.kind {
            FilterKind::Category => Some(LocalField::Category),
            FilterKind::Ingredient => Some(LocalField::Ingredient),
            FilterKind::Area | FilterKind::FreeTextSearch => None,
        }
    }
}

/// Local store fields that support equality queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalField {
    Category,
    Ingredient,
}

/// What is sent to the remote search provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteQuery {
    Filter(RecipeFilter),
    Text(String),
}

/// Current query text and active filter of the home screen.
///
/// Both may be set at once. The filter then drives the remote query while the
/// text drives local substring matching.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchState {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub filter: Option<RecipeFilter>,
}

impl SearchState {
    pub fn with_query(query: impl Into<String>) -> Self {
        SearchState {
            query: query.into(),
            filter: None,
        }
    }

    pub fn with_filter(filter: RecipeFilter) -> Self {
        SearchState {
            query: String::new(),
            filter: Some(filter),
        }
    }

    /// The trimmed query text, or `None` if blank.
    pub fn query_text(&self) -> Option<&str> {
        let query = self.query.trim();
        (!query.is_empty()).then_some(query)
    }

    /// The active filter, ignoring filters with a blank primary value.
    pub fn active_filter(&self) -> Option<&RecipeFilter> {
        self.filter.as_ref().filter(|f| !f.is_empty())
    }

    /// Returns true when neither a query nor a filter is set: the default home view.
    pub fn is_home_view(&self) -> bool {
        self.query_text().is_none() && self.active_filter().is_none()
    }

    /// The query for the remote provider. The filter takes precedence over text.
    pub fn remote_query(&self) -> Option<RemoteQuery> {
        if let Some(filter) = self.active_filter() {
            return Some(RemoteQuery::Filter(filter.clone()));
        }
        self.query_text().map(|q| RemoteQuery::Text(q.to_string()))
    }
}
