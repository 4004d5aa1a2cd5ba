use std::path::Path;

use rusqlite::{OptionalExtension, params};
use tokio_rusqlite::Connection;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{
    Ingredient, RecipeDetailed, RecipeIngredientLink, RecipePreview, RecipeWithIngredients,
};

const RECIPE_COLUMNS: &str = "id, title, summary, instructions, vegetarian, vegan, gluten_free, \
     dairy_free, very_healthy, cheap, ready_in_minutes, is_favorite, likes, image_url";

/// Local recipe cache.
///
/// Every method runs as a single call on the tokio-rusqlite connection
/// thread, so each one is atomic with respect to the others. All inserts are
/// insert-if-absent; the only in-place mutation is [`Database::update_favorite`].
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    pub async fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).await?;
        let db = Database { conn };
        db.migrate().await?;
        Ok(db)
    }

    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        let db = Database { conn };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        self.conn
            .call(|conn| {
                conn.pragma_update(None, "foreign_keys", true)?;
                let version: i64 =
                    conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

                if version < 1 {
                    conn.execute_batch(
                        "CREATE TABLE IF NOT EXISTS recipe_previews (
                            id INTEGER PRIMARY KEY,
                            title TEXT NOT NULL,
                            image_url TEXT NOT NULL
                        );

                        CREATE TABLE IF NOT EXISTS recipes (
                            id INTEGER PRIMARY KEY,
                            title TEXT NOT NULL,
                            summary TEXT NOT NULL,
                            instructions TEXT,
                            vegetarian INTEGER NOT NULL,
                            vegan INTEGER NOT NULL,
                            gluten_free INTEGER NOT NULL,
                            dairy_free INTEGER NOT NULL,
                            very_healthy INTEGER NOT NULL,
                            cheap INTEGER NOT NULL,
                            ready_in_minutes INTEGER NOT NULL,
                            is_favorite INTEGER NOT NULL DEFAULT 0,
                            likes INTEGER NOT NULL,
                            image_url TEXT NOT NULL
                        );

                        CREATE TABLE IF NOT EXISTS ingredients (
                            id INTEGER PRIMARY KEY,
                            name TEXT NOT NULL,
                            amount REAL NOT NULL,
                            unit TEXT NOT NULL
                        );

                        CREATE TABLE IF NOT EXISTS recipe_ingredients (
                            recipe_id INTEGER NOT NULL REFERENCES recipes(id),
                            ingredient_id INTEGER NOT NULL REFERENCES ingredients(id),
                            PRIMARY KEY (recipe_id, ingredient_id)
                        );

                        CREATE UNIQUE INDEX IF NOT EXISTS idx_ingredients_name ON ingredients(name);
                        CREATE INDEX IF NOT EXISTS idx_recipes_favorite ON recipes(is_favorite);
                        CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_recipe
                            ON recipe_ingredients(recipe_id);

                        PRAGMA user_version = 1;",
                    )?;
                }

                Ok(())
            })
            .await?;
        Ok(())
    }

    // --- Row mapping helpers ---

    fn preview_from_row(row: &rusqlite::Row) -> rusqlite::Result<RecipePreview> {
        Ok(RecipePreview {
            id: row.get(0)?,
            title: row.get(1)?,
            image_url: row.get(2)?,
        })
    }

    // Expects RECIPE_COLUMNS order.
    fn recipe_from_row(row: &rusqlite::Row) -> rusqlite::Result<RecipeDetailed> {
        Ok(RecipeDetailed {
            id: row.get(0)?,
            title: row.get(1)?,
            summary: row.get(2)?,
            instructions: row.get(3)?,
            vegetarian: row.get(4)?,
            vegan: row.get(5)?,
            gluten_free: row.get(6)?,
            dairy_free: row.get(7)?,
            very_healthy: row.get(8)?,
            cheap: row.get(9)?,
            ready_in_minutes: row.get(10)?,
            is_favorite: row.get(11)?,
            likes: row.get(12)?,
            image_url: row.get(13)?,
        })
    }

    fn ingredient_from_row(row: &rusqlite::Row) -> rusqlite::Result<Ingredient> {
        Ok(Ingredient {
            id: row.get(0)?,
            name: row.get(1)?,
            amount: row.get(2)?,
            unit: row.get(3)?,
        })
    }

    // --- Previews ---

    /// Up to `amount` previews in random order.
    pub async fn random_previews(&self, amount: u32) -> Result<Vec<RecipePreview>> {
        let previews = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, image_url FROM recipe_previews ORDER BY RANDOM() LIMIT ?1",
                )?;
                let previews = stmt
                    .query_map(params![amount], Self::preview_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(previews)
            })
            .await?;
        Ok(previews)
    }

    /// Up to `amount` previews whose title contains `name`.
    ///
    /// Matching uses SQLite `LIKE`, so it is case-insensitive for ASCII.
    /// Wildcard characters in `name` match literally.
    pub async fn previews_by_title(&self, name: &str, amount: u32) -> Result<Vec<RecipePreview>> {
        let escaped = name
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        let previews = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, title, image_url FROM recipe_previews
                     WHERE title LIKE ?1 ESCAPE '\\'
                     ORDER BY RANDOM() LIMIT ?2",
                )?;
                let previews = stmt
                    .query_map(params![pattern, amount], Self::preview_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(previews)
            })
            .await?;
        Ok(previews)
    }

    /// Insert previews that are not cached yet. Returns how many rows were new.
    pub async fn insert_previews(&self, previews: Vec<RecipePreview>) -> Result<usize> {
        let inserted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut inserted = 0;
                {
                    let mut stmt = tx.prepare(
                        "INSERT OR IGNORE INTO recipe_previews (id, title, image_url)
                         VALUES (?1, ?2, ?3)",
                    )?;
                    for p in &previews {
                        inserted += stmt.execute(params![p.id, p.title, p.image_url])?;
                    }
                }
                tx.commit()?;
                Ok(inserted)
            })
            .await?;
        Ok(inserted)
    }

    pub async fn preview_count(&self) -> Result<i64> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM recipe_previews", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }

    // --- Recipes ---

    pub async fn get_recipe(&self, id: i64) -> Result<Option<RecipeDetailed>> {
        let recipe = self
            .conn
            .call(move |conn| Ok(find_recipe(conn, id)?))
            .await?;
        Ok(recipe)
    }

    pub async fn favorites(&self) -> Result<Vec<RecipeDetailed>> {
        let recipes = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {RECIPE_COLUMNS} FROM recipes WHERE is_favorite = 1 ORDER BY title"
                ))?;
                let recipes = stmt
                    .query_map([], Self::recipe_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(recipes)
            })
            .await?;
        Ok(recipes)
    }

    /// Returns `false` when a recipe with the same id is already cached.
    pub async fn insert_recipe(&self, recipe: RecipeDetailed) -> Result<bool> {
        let inserted = self
            .conn
            .call(move |conn| Ok(insert_recipe_row(conn, &recipe)?))
            .await?;
        Ok(inserted)
    }

    /// Set the favorite flag of recipe `id`. Returns `false` if no row has that id.
    ///
    /// No other column is touched; cached recipes are otherwise immutable.
    pub async fn update_favorite(&self, id: i64, is_favorite: bool) -> Result<bool> {
        let updated = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE recipes SET is_favorite = ?2 WHERE id = ?1",
                    params![id, is_favorite],
                )?;
                Ok(changed > 0)
            })
            .await?;
        Ok(updated)
    }

    // --- Ingredients ---

    pub async fn ingredient_by_name(&self, name: &str) -> Result<Option<Ingredient>> {
        let name = name.to_string();
        let ingredient = self
            .conn
            .call(move |conn| Ok(find_ingredient_by_name(conn, &name)?))
            .await?;
        Ok(ingredient)
    }

    /// Insert `ingredient` unless one with the same name (or id) exists, and
    /// return the row it resolves to: the one stored under its name, or the
    /// one already holding its id when that row carries a different name.
    pub async fn insert_ingredient(&self, ingredient: Ingredient) -> Result<Ingredient> {
        let stored = self
            .conn
            .call(move |conn| Ok(retain_ingredient(conn, &ingredient)?))
            .await?;
        Ok(stored)
    }

    // --- Recipe/ingredient links ---

    pub async fn get_link(
        &self,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> Result<Option<RecipeIngredientLink>> {
        let link = self
            .conn
            .call(move |conn| {
                let link = conn
                    .query_row(
                        "SELECT recipe_id, ingredient_id FROM recipe_ingredients
                         WHERE recipe_id = ?1 AND ingredient_id = ?2",
                        params![recipe_id, ingredient_id],
                        |row| {
                            Ok(RecipeIngredientLink {
                                recipe_id: row.get(0)?,
                                ingredient_id: row.get(1)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(link)
            })
            .await?;
        Ok(link)
    }

    /// Link a cached recipe to a cached ingredient. Both rows must already
    /// exist; foreign keys are enforced. Returns `false` if the pair is linked.
    pub async fn insert_link(&self, link: RecipeIngredientLink) -> Result<bool> {
        let inserted = self
            .conn
            .call(move |conn| Ok(insert_link_row(conn, link)?))
            .await?;
        Ok(inserted)
    }

    pub async fn recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<Ingredient>> {
        let ingredients = self
            .conn
            .call(move |conn| Ok(find_recipe_ingredients(conn, recipe_id)?))
            .await?;
        Ok(ingredients)
    }

    // --- Composite operations ---

    pub async fn recipe_with_ingredients(&self, id: i64) -> Result<Option<RecipeWithIngredients>> {
        let found = self
            .conn
            .call(move |conn| {
                let Some(recipe) = find_recipe(conn, id)? else {
                    return Ok(None);
                };
                let ingredients = find_recipe_ingredients(conn, id)?;
                debug!(recipe_id = id, count = ingredients.len(), "Loaded recipe ingredients");
                Ok(Some(RecipeWithIngredients {
                    recipe,
                    ingredients,
                }))
            })
            .await?;
        Ok(found)
    }

    /// Store a fetched recipe in one transaction: the recipe row, each
    /// ingredient deduplicated by name, then a link to the retained
    /// ingredient row.
    pub async fn insert_recipe_with_ingredients(&self, rwi: RecipeWithIngredients) -> Result<()> {
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let recipe_id = rwi.recipe.id;
                insert_recipe_row(&tx, &rwi.recipe)?;

                for ingredient in &rwi.ingredients {
                    let stored = retain_ingredient(&tx, ingredient)?;
                    if stored.name != ingredient.name {
                        warn!(
                            recipe_id,
                            ingredient_id = ingredient.id,
                            name = %ingredient.name,
                            existing = %stored.name,
                            "Ingredient id already used by another name, linking existing row"
                        );
                    }
                    insert_link_row(
                        &tx,
                        RecipeIngredientLink {
                            recipe_id,
                            ingredient_id: stored.id,
                        },
                    )?;
                }

                tx.commit()?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}

// Sync helpers shared by single-call methods and transactions.

fn find_recipe(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<RecipeDetailed>> {
    conn.query_row(
        &format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ?1"),
        params![id],
        Database::recipe_from_row,
    )
    .optional()
}

fn insert_recipe_row(conn: &rusqlite::Connection, recipe: &RecipeDetailed) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        &format!(
            "INSERT OR IGNORE INTO recipes ({RECIPE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ),
        params![
            recipe.id,
            recipe.title,
            recipe.summary,
            recipe.instructions,
            recipe.vegetarian,
            recipe.vegan,
            recipe.gluten_free,
            recipe.dairy_free,
            recipe.very_healthy,
            recipe.cheap,
            recipe.ready_in_minutes,
            recipe.is_favorite,
            recipe.likes,
            recipe.image_url,
        ],
    )?;
    Ok(changed > 0)
}

fn find_ingredient_by_name(
    conn: &rusqlite::Connection,
    name: &str,
) -> rusqlite::Result<Option<Ingredient>> {
    conn.query_row(
        "SELECT id, name, amount, unit FROM ingredients WHERE name = ?1",
        params![name],
        Database::ingredient_from_row,
    )
    .optional()
}

// Resolves by name first, then falls back to the row that already owns the id.
fn retain_ingredient(
    conn: &rusqlite::Connection,
    ingredient: &Ingredient,
) -> rusqlite::Result<Ingredient> {
    if let Some(existing) = find_ingredient_by_name(conn, &ingredient.name)? {
        return Ok(existing);
    }
    conn.execute(
        "INSERT OR IGNORE INTO ingredients (id, name, amount, unit) VALUES (?1, ?2, ?3, ?4)",
        params![
            ingredient.id,
            ingredient.name,
            ingredient.amount,
            ingredient.unit
        ],
    )?;
    if let Some(inserted) = find_ingredient_by_name(conn, &ingredient.name)? {
        return Ok(inserted);
    }
    conn.query_row(
        "SELECT id, name, amount, unit FROM ingredients WHERE id = ?1",
        params![ingredient.id],
        Database::ingredient_from_row,
    )
}

fn insert_link_row(
    conn: &rusqlite::Connection,
    link: RecipeIngredientLink,
) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO recipe_ingredients (recipe_id, ingredient_id) VALUES (?1, ?2)",
        params![link.recipe_id, link.ingredient_id],
    )?;
    Ok(changed > 0)
}

fn find_recipe_ingredients(
    conn: &rusqlite::Connection,
    recipe_id: i64,
) -> rusqlite::Result<Vec<Ingredient>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.name, i.amount, i.unit
         FROM recipe_ingredients ri
         JOIN ingredients i ON ri.ingredient_id = i.id
         WHERE ri.recipe_id = ?1
         ORDER BY ri.rowid",
    )?;
    let ingredients = stmt
        .query_map(params![recipe_id], Database::ingredient_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(ingredients)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(id: i64, title: &str) -> RecipePreview {
        RecipePreview {
            id,
            title: title.to_string(),
            image_url: format!("https://img.spoonacular.com/recipes/{id}-312x231.jpg"),
        }
    }

    fn sample_recipe(id: i64) -> RecipeDetailed {
        RecipeDetailed {
            id,
            title: "Red Lentil Soup with Chicken and Turnips".to_string(),
            summary: "A <b>hearty</b> soup".to_string(),
            instructions: Some("Simmer everything.".to_string()),
            vegetarian: false,
            vegan: false,
            gluten_free: true,
            dairy_free: true,
            very_healthy: true,
            cheap: false,
            ready_in_minutes: 55,
            is_favorite: false,
            likes: 12,
            image_url: "https://img.spoonacular.com/recipes/715415-556x370.jpg".to_string(),
        }
    }

    fn ingredient(id: i64, name: &str) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            amount: 2.0,
            unit: "cups".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_previews_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        let batch = vec![preview(1, "Red Lentil Soup"), preview(2, "Chickpea Curry")];

        assert_eq!(db.insert_previews(batch.clone()).await.unwrap(), 2);
        assert_eq!(db.insert_previews(batch).await.unwrap(), 0);
        assert_eq!(db.preview_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_previews_keeps_first_version() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_previews(vec![preview(1, "Red Lentil Soup")])
            .await
            .unwrap();
        db.insert_previews(vec![preview(1, "Renamed Soup")])
            .await
            .unwrap();

        let all = db.random_previews(10).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Red Lentil Soup");
    }

    #[tokio::test]
    async fn test_random_previews_respects_amount() {
        let db = Database::open_in_memory().await.unwrap();
        let batch: Vec<_> = (1..=20).map(|id| preview(id, "Soup")).collect();
        db.insert_previews(batch).await.unwrap();

        assert_eq!(db.random_previews(5).await.unwrap().len(), 5);
        assert_eq!(db.random_previews(50).await.unwrap().len(), 20);
        assert!(db.random_previews(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_previews_by_title() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_previews(vec![
            preview(1, "Red Lentil Soup"),
            preview(2, "Chickpea Curry"),
            preview(3, "Lentil Salad"),
        ])
        .await
        .unwrap();

        let mut found = db.previews_by_title("Lentil", 10).await.unwrap();
        found.sort_by_key(|p| p.id);
        assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3]);

        // LIKE is case-insensitive for ASCII
        assert_eq!(db.previews_by_title("curry", 10).await.unwrap().len(), 1);
        assert_eq!(db.previews_by_title("Lentil", 1).await.unwrap().len(), 1);
        assert!(db.previews_by_title("pizza", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_previews_by_title_escapes_wildcards() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_previews(vec![preview(1, "100% Rye Bread"), preview(2, "Rye Bread")])
            .await
            .unwrap();

        let found = db.previews_by_title("0%", 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
        assert!(db.previews_by_title("_ye", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_get_recipe() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(db.get_recipe(715_415).await.unwrap().is_none());

        assert!(db.insert_recipe(sample_recipe(715_415)).await.unwrap());
        let fetched = db.get_recipe(715_415).await.unwrap().unwrap();
        assert_eq!(fetched, sample_recipe(715_415));
    }

    #[tokio::test]
    async fn test_insert_recipe_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_recipe(sample_recipe(1)).await.unwrap();

        let mut again = sample_recipe(1);
        again.title = "Other".to_string();
        again.is_favorite = true;
        assert!(!db.insert_recipe(again).await.unwrap());

        let fetched = db.get_recipe(1).await.unwrap().unwrap();
        assert_eq!(fetched, sample_recipe(1));
    }

    #[tokio::test]
    async fn test_update_favorite_and_favorites() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_recipe(sample_recipe(1)).await.unwrap();
        db.insert_recipe(sample_recipe(2)).await.unwrap();
        assert!(db.favorites().await.unwrap().is_empty());

        assert!(db.update_favorite(2, true).await.unwrap());

        let favorites = db.favorites().await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, 2);
        assert!(favorites[0].is_favorite);

        assert!(db.update_favorite(2, false).await.unwrap());
        assert!(db.favorites().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_favorite_leaves_other_columns() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_recipe(sample_recipe(1)).await.unwrap();

        db.update_favorite(1, true).await.unwrap();

        let mut expected = sample_recipe(1);
        expected.is_favorite = true;
        assert_eq!(db.get_recipe(1).await.unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_update_favorite_missing_recipe() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(!db.update_favorite(99, true).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_ingredient_dedups_by_name() {
        let db = Database::open_in_memory().await.unwrap();
        let first = db.insert_ingredient(ingredient(11, "garlic")).await.unwrap();
        let second = db.insert_ingredient(ingredient(22, "garlic")).await.unwrap();

        assert_eq!(first.id, 11);
        assert_eq!(second.id, 11);
        assert_eq!(db.ingredient_by_name("garlic").await.unwrap().unwrap().id, 11);
    }

    #[tokio::test]
    async fn test_insert_ingredient_id_taken_by_other_name() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_ingredient(ingredient(11, "garlic")).await.unwrap();

        let stored = db.insert_ingredient(ingredient(11, "onion")).await.unwrap();
        assert_eq!(stored.id, 11);
        assert_eq!(stored.name, "garlic");
        assert!(db.ingredient_by_name("onion").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_link_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_recipe(sample_recipe(1)).await.unwrap();
        db.insert_ingredient(ingredient(11, "garlic")).await.unwrap();
        let link = RecipeIngredientLink {
            recipe_id: 1,
            ingredient_id: 11,
        };

        assert!(db.get_link(1, 11).await.unwrap().is_none());
        assert!(db.insert_link(link).await.unwrap());
        assert!(!db.insert_link(link).await.unwrap());
        assert_eq!(db.get_link(1, 11).await.unwrap(), Some(link));
    }

    #[tokio::test]
    async fn test_insert_link_requires_both_rows() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_recipe(sample_recipe(1)).await.unwrap();
        let link = RecipeIngredientLink {
            recipe_id: 1,
            ingredient_id: 11,
        };
        assert!(db.insert_link(link).await.is_err());
        assert!(db.get_link(1, 11).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recipe_with_ingredients_roundtrip() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(db.recipe_with_ingredients(1).await.unwrap().is_none());

        db.insert_recipe_with_ingredients(RecipeWithIngredients {
            recipe: sample_recipe(1),
            ingredients: vec![ingredient(11, "red lentils"), ingredient(12, "turnips")],
        })
        .await
        .unwrap();

        let rwi = db.recipe_with_ingredients(1).await.unwrap().unwrap();
        assert_eq!(rwi.recipe.id, 1);
        let names: Vec<_> = rwi.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["red lentils", "turnips"]);
    }

    #[tokio::test]
    async fn test_shared_ingredient_links_to_retained_row() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_recipe_with_ingredients(RecipeWithIngredients {
            recipe: sample_recipe(1),
            ingredients: vec![ingredient(11, "garlic")],
        })
        .await
        .unwrap();
        // Same name, different remote id
        db.insert_recipe_with_ingredients(RecipeWithIngredients {
            recipe: sample_recipe(2),
            ingredients: vec![ingredient(99, "garlic"), ingredient(12, "olive oil")],
        })
        .await
        .unwrap();

        let second = db.recipe_ingredients(2).await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].id, 11);
        assert!(db.get_link(2, 11).await.unwrap().is_some());
        assert!(db.get_link(2, 99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_colliding_ingredient_id_links_existing_row() {
        let db = Database::open_in_memory().await.unwrap();
        db.insert_recipe_with_ingredients(RecipeWithIngredients {
            recipe: sample_recipe(1),
            ingredients: vec![ingredient(2047, "salt")],
        })
        .await
        .unwrap();
        // Spoonacular reuses 2047 for a differently named ingredient
        db.insert_recipe_with_ingredients(RecipeWithIngredients {
            recipe: sample_recipe(2),
            ingredients: vec![ingredient(2047, "salt and pepper"), ingredient(1001, "butter")],
        })
        .await
        .unwrap();

        let names: Vec<_> = db
            .recipe_ingredients(2)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["salt", "butter"]);
        assert!(db.get_link(2, 2047).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_recipe_with_ingredients_twice() {
        let db = Database::open_in_memory().await.unwrap();
        let rwi = RecipeWithIngredients {
            recipe: sample_recipe(1),
            ingredients: vec![ingredient(11, "garlic"), ingredient(11, "garlic")],
        };
        db.insert_recipe_with_ingredients(rwi.clone()).await.unwrap();
        db.insert_recipe_with_ingredients(rwi).await.unwrap();

        let rwi = db.recipe_with_ingredients(1).await.unwrap().unwrap();
        assert_eq!(rwi.ingredients.len(), 1);
    }

    #[tokio::test]
    async fn test_open_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.db");

        {
            let db = Database::open(&path).await.unwrap();
            db.insert_previews(vec![preview(1, "Red Lentil Soup")])
                .await
                .unwrap();
        }

        let db = Database::open(&path).await.unwrap();
        assert_eq!(db.preview_count().await.unwrap(), 1);
    }
}
