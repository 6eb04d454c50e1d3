use rc_session::coerce_user_id;

use std::num::NonZeroU64;

use serde_json::Value;

/// Client-side narrowing of a recipe list.
///
/// Blank criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub owner_id: Option<NonZeroU64>,
    /// Upper bound in minutes on `prep_time + cook_time`; zero means no bound
    pub max_time: Option<u32>,
}

impl RecipeFilter {
    pub fn owned_by(mut self, owner_id: NonZeroU64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn matches(&self, recipe: &Value) -> bool {
        self.matches_search(recipe)
            && matches_exact(self.category.as_deref(), recipe.get("category"))
            && matches_exact(self.difficulty.as_deref(), recipe.get("difficulty"))
            && self.matches_owner(recipe)
            && self.matches_time(recipe)
    }

    /// Keep matching entries of a recipe array. Other shapes pass through.
    pub fn apply(&self, recipes: Value) -> Value {
        match recipes {
            Value::Array(items) => {
                Value::Array(items.into_iter().filter(|r| self.matches(r)).collect())
            }
            other => other,
        }
    }

    fn matches_search(&self, recipe: &Value) -> bool {
        let Some(needle) = non_blank(self.search.as_deref()) else {
            return true;
        };
        let needle = needle.to_lowercase();

        ["title", "description"].iter().any(|field| {
            recipe
                .get(*field)
                .and_then(Value::as_str)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
    }

    fn matches_owner(&self, recipe: &Value) -> bool {
        match self.owner_id {
            None => true,
            Some(owner_id) => recipe.get("owner_id").and_then(coerce_user_id) == Some(owner_id),
        }
    }

    fn matches_time(&self, recipe: &Value) -> bool {
        match self.max_time.filter(|minutes| *minutes > 0) {
            None => true,
            Some(max) => {
                minutes(recipe, "prep_time") + minutes(recipe, "cook_time") <= f64::from(max)
            }
        }
    }
}

/// Missing or non-numeric durations count as zero.
fn minutes(recipe: &Value, field: &str) -> f64 {
    recipe.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

fn matches_exact(wanted: Option<&str>, actual: Option<&Value>) -> bool {
    match non_blank(wanted) {
        None => true,
        Some(wanted) => actual.and_then(Value::as_str) == Some(wanted),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
