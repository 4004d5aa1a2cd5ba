use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipePreview {
    pub id: i64,
    pub title: String,
    pub image_url: String,
}

/// Full recipe record as cached locally.
///
/// `is_favorite` is the only field that changes after the row is first
/// written; everything else is a snapshot of the remote recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct RecipeDetailed {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub instructions: Option<String>,
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
    pub very_healthy: bool,
    pub cheap: bool,
    pub ready_in_minutes: i64,
    pub is_favorite: bool,
    pub likes: i64,
    pub image_url: String,
}

impl RecipeDetailed {
    /// Human-readable labels for the characteristic flags that are set.
    #[must_use]
    pub fn characteristics(&self) -> Vec<&'static str> {
        [
            (self.vegetarian, "vegetarian"),
            (self.vegan, "vegan"),
            (self.gluten_free, "gluten free"),
            (self.dairy_free, "dairy free"),
            (self.very_healthy, "very healthy"),
            (self.cheap, "cheap"),
        ]
        .into_iter()
        .filter_map(|(set, label)| set.then_some(label))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredientLink {
    pub recipe_id: i64,
    pub ingredient_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeWithIngredients {
    pub recipe: RecipeDetailed,
    pub ingredients: Vec<Ingredient>,
}
