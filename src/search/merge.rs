use crate::model::{Recipe, RecipeOrigin, SearchState};

/// Combines local and remote candidates into the list shown to the user.
///
/// Every candidate must be displayable (non-blank title, at least one
/// ingredient); anything else is dropped silently. In the home view (no query
/// and no filter) only recipes the current user authored locally survive.
///
/// Local recipes come first, followed by remote ones, in the order the
/// sources delivered them. Local copies of remote recipes are dropped from the
/// local side so a favorited import does not show up twice. There is no
/// re-sort and no cross-source dedup: a local and a remote recipe with the same
/// title both survive.
#[derive(Debug, Clone)]
pub struct ResultMerger {
    current_user: String,
}

impl ResultMerger {
    pub fn new(current_user: impl Into<String>) -> Self {
        ResultMerger {
            current_user: current_user.into(),
        }
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }

    /// Merges `local` and `remote` for the given search state.
    ///
    /// # Examples
    ///
    /// ```
    /// use recipe_hub::{Ingredient, Recipe, ResultMerger, SearchState};
    ///
    /// let salt = vec![Ingredient::new("Salt", "1", "tsp")];
    /// let local = vec![Recipe::new("Greek Salad").with_owner("u1").with_ingredients(salt.clone())];
    /// let remote = vec![Recipe::imported("52", "Greek Salad").with_ingredients(salt)];
    ///
    /// let merged = ResultMerger::new("u1").merge(local, remote, &SearchState::with_query("greek"));
    /// assert_eq!(merged.len(), 2);
    /// assert!(!merged[0].is_imported());
    /// ```
    pub fn merge(&self, local: Vec<Recipe>, remote: Vec<Recipe>, state: &SearchState) -> Vec<Recipe> {
        let home_view = state.is_home_view();

        local
            .into_iter()
            .filter(|r| !r.is_imported())
            .chain(remote)
            .filter(|r| r.is_valid())
            .filter(|r| !home_view || self.is_own_authored(r))
            .collect()
    }

    fn is_own_authored(&self, recipe: &Recipe) -> bool {
        recipe.origin == RecipeOrigin::LocallyAuthored && recipe.owner == self.current_user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ingredient, RecipeFilter};

    fn ingredients() -> Vec<Ingredient> {
        vec![Ingredient::new("Olive oil", "2", "tbsp")]
    }

    fn local(title: &str) -> Recipe {
        Recipe::new(title).with_owner("u1").with_ingredients(ingredients())
    }

    fn remote(id: &str, title: &str) -> Recipe {
        Recipe::imported(id, title).with_ingredients(ingredients())
    }

    fn titles(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_local_first_ordering() {
        let merged = ResultMerger::new("u1").merge(
            vec![local("B local"), local("A local")],
            vec![remote("1", "Z remote"), remote("2", "C remote")],
            &SearchState::with_query("x"),
        );
        assert_eq!(titles(&merged), vec!["B local", "A local", "Z remote", "C remote"]);
    }

    #[test]
    fn test_invalid_candidates_are_dropped() {
        let merged = ResultMerger::new("u1").merge(
            vec![local("  "), local("Soup").with_ingredients(Vec::new()), local("Stew")],
            vec![Recipe::imported("1", "Stub only")],
            &SearchState::with_query("s"),
        );
        assert_eq!(titles(&merged), vec!["Stew"]);
    }

    #[test]
    fn test_local_copies_of_remote_recipes_are_excluded() {
        let mut copy = remote("local-1", "Pad Thai");
        copy.owner = "u1".to_string();
        let merged = ResultMerger::new("u1").merge(
            vec![copy],
            vec![remote("52", "Pad Thai")],
            &SearchState::with_filter(RecipeFilter::area("Thai")),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, "52");
    }

    #[test]
    fn test_same_title_across_sources_is_kept() {
        let merged = ResultMerger::new("u1").merge(
            vec![local("Greek Salad")],
            vec![remote("9", "Greek Salad")],
            &SearchState::with_query("greek"),
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_home_view_keeps_only_own_authored() {
        let merged = ResultMerger::new("u1").merge(
            vec![
                local("Mine"),
                local("Theirs").with_owner("u2"),
            ],
            vec![remote("1", "Remote")],
            &SearchState::default(),
        );
        assert_eq!(titles(&merged), vec!["Mine"]);
    }

    #[test]
    fn test_home_view_still_requires_valid_recipes() {
        let merged = ResultMerger::new("u1").merge(
            vec![local("Draft").with_ingredients(Vec::new())],
            Vec::new(),
            &SearchState::default(),
        );
        assert!(merged.is_empty());
    }

    #[test]
    fn test_merged_output_is_always_valid() {
        let candidates = vec![
            local(""),
            local("Ok"),
            local("No ingredients").with_ingredients(Vec::new()),
            remote("1", "\t"),
            remote("2", "Fine"),
            Recipe::imported("3", "Stub"),
        ];
        for state in [
            SearchState::default(),
            SearchState::with_query("o"),
            SearchState::with_filter(RecipeFilter::category("Beef")),
        ] {
            let merged = ResultMerger::new("u1").merge(candidates.clone(), candidates.clone(), &state);
            assert!(merged.iter().all(Recipe::is_valid));
        }
    }
}
