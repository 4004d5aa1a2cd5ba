use anyhow::{Context, Result};
use std::process;

use super::Repository;
use super::helpers::{json_error, print_recipe_table};

pub(crate) async fn cmd_favorites(repo: &Repository, json: bool) -> Result<()> {
    let favorites = repo
        .get_favorites()
        .await
        .context("Failed to load favorites")?;

    if favorites.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No favorite recipes yet. Add one with: spoonful favorite <id>");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&favorites)?);
    } else {
        print_recipe_table(&favorites);
    }
    Ok(())
}

/// Toggle the favorite flag of a recipe, fetching it first if it is not cached.
pub(crate) async fn cmd_favorite(repo: &Repository, id: i64, json: bool) -> Result<()> {
    let Some(is_favorite) = repo
        .toggle_favorite(id)
        .await
        .context("Failed to update favorite")?
    else {
        let msg = format!("Recipe {id} not found");
        if json {
            println!("{}", json_error(&msg));
        } else {
            eprintln!("{msg}");
        }
        process::exit(2);
    };

    if json {
        println!(
            "{}",
            serde_json::json!({ "id": id, "is_favorite": is_favorite })
        );
    } else if is_favorite {
        println!("Added recipe {id} to favorites");
    } else {
        println!("Removed recipe {id} from favorites");
    }
    Ok(())
}
