mod favorites;
mod helpers;
mod recipes;
mod settings;

use spoonful_core::repository::RecipeRepository;

use crate::spoonacular::SpoonacularClient;

pub(crate) type Repository = RecipeRepository<SpoonacularClient>;

pub(crate) use favorites::{cmd_favorite, cmd_favorites};
pub(crate) use recipes::{cmd_browse, cmd_search, cmd_show};
pub(crate) use settings::cmd_settings;
