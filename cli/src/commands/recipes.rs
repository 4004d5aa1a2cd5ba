use anyhow::{Context, Result};
use std::process;

use super::Repository;
use super::helpers::{html_to_text, json_error, print_ingredient_table, print_preview_table};

const TEXT_WIDTH: usize = 80;

pub(crate) async fn cmd_browse(repo: &Repository, amount: u32, json: bool) -> Result<()> {
    let previews = repo.get_previews(amount).await;

    if previews.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes available. Check your API key and connection.");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&previews)?);
    } else {
        print_preview_table(&previews);
    }
    Ok(())
}

pub(crate) async fn cmd_search(repo: &Repository, name: &str, amount: u32, json: bool) -> Result<()> {
    let previews = repo
        .get_recipes_by_name(name, amount)
        .await
        .context("Failed to search recipes")?;

    if previews.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No recipes found for '{name}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&previews)?);
    } else {
        print_preview_table(&previews);
    }
    Ok(())
}

pub(crate) async fn cmd_show(repo: &Repository, id: i64, json: bool) -> Result<()> {
    let Some(detail) = repo
        .get_recipe_detailed(id)
        .await
        .context("Failed to load recipe")?
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
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let recipe = &detail.recipe;
    let title = &recipe.title;
    let marker = if recipe.is_favorite { " ★" } else { "" };
    println!("{title}{marker}");
    let minutes = recipe.ready_in_minutes;
    let likes = recipe.likes;
    println!("Ready in {minutes} min · {likes} likes");

    let tags = recipe.characteristics();
    if !tags.is_empty() {
        println!("{}", tags.join(" · "));
    }

    let summary = html_to_text(&recipe.summary, TEXT_WIDTH);
    if !summary.is_empty() {
        println!("\n{summary}");
    }

    if detail.ingredients.is_empty() {
        println!("\nNo ingredients listed.");
    } else {
        println!();
        print_ingredient_table(&detail.ingredients);
    }

    match recipe
        .instructions
        .as_deref()
        .map(|html| html_to_text(html, TEXT_WIDTH))
    {
        Some(steps) if !steps.is_empty() => println!("\nInstructions:\n{steps}"),
        _ => println!("\nNo instructions available."),
    }
    Ok(())
}
