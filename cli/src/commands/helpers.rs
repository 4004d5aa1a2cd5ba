use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use spoonful_core::models::{Ingredient, RecipeDetailed, RecipePreview};

pub(crate) fn print_preview_table(previews: &[RecipePreview]) {
    #[derive(Tabled)]
    struct PreviewRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Title")]
        title: String,
    }

    let rows: Vec<PreviewRow> = previews
        .iter()
        .enumerate()
        .map(|(i, p)| PreviewRow {
            idx: i + 1,
            id: p.id,
            title: truncate(&p.title, 60),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_recipe_table(recipes: &[RecipeDetailed]) {
    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Minutes")]
        minutes: i64,
        #[tabled(rename = "Likes")]
        likes: i64,
        #[tabled(rename = "Tags")]
        tags: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            id: r.id,
            title: truncate(&r.title, 45),
            minutes: r.ready_in_minutes,
            likes: r.likes,
            tags: r.characteristics().join(", "),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn print_ingredient_table(ingredients: &[Ingredient]) {
    #[derive(Tabled)]
    struct IngredientRow {
        #[tabled(rename = "Ingredient")]
        name: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Unit")]
        unit: String,
    }

    let rows: Vec<IngredientRow> = ingredients
        .iter()
        .map(|i| IngredientRow {
            name: truncate(&i.name, 40),
            amount: format_amount(i.amount),
            unit: i.unit.clone(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

/// "2", "0.5", "1.33"; at most two decimals, no trailing zeros.
pub(crate) fn format_amount(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Render Spoonacular's HTML summaries and instructions as wrapped plain text.
pub(crate) fn html_to_text(html: &str, width: usize) -> String {
    match html2text::from_read(html.as_bytes(), width) {
        Ok(text) => text.trim().to_string(),
        Err(_) => html.trim().to_string(),
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_decodes_entities() {
        assert_eq!(
            html_to_text("Caf&eacute; cr&egrave;me &#8217;n&#8217; more", 80),
            "Café crème ’n’ more"
        );
    }

    #[test]
    fn test_html_to_text_drops_tags() {
        let text = html_to_text("<p>Preheat the <b>oven</b>.</p><p>Bake for 20 minutes.</p>", 80);
        assert!(!text.contains('<'));
        assert!(text.contains("Preheat"));
        assert!(text.contains("Bake for 20 minutes."));
    }

    #[test]
    fn test_html_to_text_wraps() {
        let text = html_to_text("one two three four five six seven eight nine ten eleven", 20);
        assert!(text.lines().count() > 1);
        assert!(text.lines().all(|l| l.chars().count() <= 20));
    }

    #[test]
    fn test_html_to_text_empty() {
        assert_eq!(html_to_text("", 80), "");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(2.0), "2");
        assert_eq!(format_amount(0.5), "0.5");
        assert_eq!(format_amount(1.333_333), "1.33");
        assert_eq!(format_amount(10.0), "10");
        assert_eq!(format_amount(-0.0), "0");
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("Recipe 1 not found"), r#"{"error":"Recipe 1 not found"}"#);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème brûlée tart", 10), "Crème b...");
        assert_eq!(truncate("Rösti", 10), "Rösti");
    }
}
