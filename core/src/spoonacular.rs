use serde::Deserialize;

use crate::models::{Ingredient, RecipeDetailed, RecipePreview, RecipeWithIngredients};

/// Maximum number of records a single `complexSearch` call returns.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<PreviewData>,
    pub offset: u32,
    pub number: u32,
    pub total_results: u32,
}

#[derive(Debug, Deserialize)]
pub struct PreviewData {
    pub id: i64,
    pub title: String,
    pub image: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct RecipeInformation {
    pub id: i64,
    pub title: String,
    pub summary: String,
    // Spoonacular sends null for recipes without written steps.
    pub instructions: Option<String>,
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
    pub dairy_free: bool,
    pub very_healthy: bool,
    pub cheap: bool,
    pub ready_in_minutes: i64,
    pub aggregate_likes: i64,
    pub image: String,
    pub extended_ingredients: Vec<IngredientData>,
}

#[derive(Debug, Deserialize)]
pub struct IngredientData {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub unit: String,
}

#[must_use]
pub fn previews_from_search(response: SearchResponse) -> Vec<RecipePreview> {
    response
        .results
        .into_iter()
        .map(|p| RecipePreview {
            id: p.id,
            title: p.title,
            image_url: p.image,
        })
        .collect()
}

#[must_use]
pub fn recipe_from_information(info: RecipeInformation) -> RecipeWithIngredients {
    let recipe = RecipeDetailed {
        id: info.id,
        title: info.title,
        summary: info.summary,
        instructions: info.instructions,
        vegetarian: info.vegetarian,
        vegan: info.vegan,
        gluten_free: info.gluten_free,
        dairy_free: info.dairy_free,
        very_healthy: info.very_healthy,
        cheap: info.cheap,
        ready_in_minutes: info.ready_in_minutes,
        is_favorite: false,
        likes: info.aggregate_likes,
        image_url: info.image,
    };
    let ingredients = info
        .extended_ingredients
        .into_iter()
        .map(ingredient_from_data)
        .collect();

    RecipeWithIngredients {
        recipe,
        ingredients,
    }
}

#[must_use]
pub fn ingredient_from_data(data: IngredientData) -> Ingredient {
    Ingredient {
        id: data.id,
        name: data.name,
        amount: data.amount,
        unit: data.unit,
    }
}
