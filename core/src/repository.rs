use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{RecipeDetailed, RecipePreview, RecipeWithIngredients};
use crate::spoonacular::{self, MAX_PAGE_SIZE, RecipeInformation, SearchResponse};

/// How many previews a backfill tries to pull into the cache.
pub const BACKFILL_TOTAL: u32 = 1000;

/// Remote recipe API.
///
/// The CLI implements this with reqwest; a mobile host can implement it with
/// its own HTTP stack. Every call is keyed by the API key the repository was
/// configured with.
pub trait RecipeSource: Send + Sync {
    fn fetch_previews(
        &self,
        key: &str,
        count: u32,
        offset: u32,
    ) -> impl Future<Output = Result<SearchResponse>> + Send;

    fn fetch_previews_by_query(
        &self,
        key: &str,
        query: &str,
        count: u32,
    ) -> impl Future<Output = Result<SearchResponse>> + Send;

    fn fetch_detail(&self, id: i64, key: &str)
    -> impl Future<Output = Result<RecipeInformation>> + Send;
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub api_key: String,
    /// Page-size cap of a single remote call.
    pub max_page_size: u32,
    pub backfill_total: u32,
}

impl SyncSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            max_page_size: MAX_PAGE_SIZE,
            backfill_total: BACKFILL_TOTAL,
        }
    }
}

/// Cache-or-fetch access to recipes.
///
/// Reads go to the local cache first. When the cache cannot satisfy a read the
/// repository fetches from the [`RecipeSource`], stores the results and reads
/// the cache again. Remote failures never escape a read; the caller gets
/// whatever the cache holds.
pub struct RecipeRepository<S> {
    db: Database,
    source: S,
    settings: SyncSettings,
}

impl<S: RecipeSource> RecipeRepository<S> {
    pub fn new(db: Database, source: S, settings: SyncSettings) -> Self {
        Self {
            db,
            source,
            settings,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // --- Previews ---

    /// Up to `amount` random previews, backfilling the cache when it is short.
    ///
    /// Never fails: a store error yields an empty list and a failed backfill
    /// leaves the result short.
    pub async fn get_previews(&self, amount: u32) -> Vec<RecipePreview> {
        match self.previews_with_backfill(amount).await {
            Ok(previews) => previews,
            Err(e) => {
                error!(amount, error = %e, "Failed to read recipe previews");
                Vec::new()
            }
        }
    }

    async fn previews_with_backfill(&self, amount: u32) -> Result<Vec<RecipePreview>> {
        let cached = self.db.random_previews(amount).await?;
        info!(count = cached.len(), "Got previews from cache");
        if cached.len() >= amount as usize {
            return Ok(cached);
        }

        info!(amount, "Not enough cached previews, backfilling");
        if let Err(e) = self.backfill_previews().await {
            warn!(error = %e, "Preview backfill incomplete");
        }

        let previews = self.db.random_previews(amount).await?;
        info!(count = previews.len(), "Got previews from cache after backfill");
        Ok(previews)
    }

    /// Fetch `backfill_total` previews as concurrent paged requests.
    ///
    /// Each batch stores its own results, so batches that succeed persist even
    /// when a sibling fails. The first failure is returned once every batch
    /// has finished.
    async fn backfill_previews(&self) -> Result<()> {
        let page = self.settings.max_page_size;
        let batches = self.settings.backfill_total.checked_div(page).unwrap_or(0);
        // Every batch asks for the full backfill size; the API caps each
        // response at one page.
        let count = page * batches;

        let results: Vec<Result<()>> = stream::iter(0..batches)
            .map(|batch| self.store_preview_batch(count, batch * page))
            .buffer_unordered(batches.max(1) as usize)
            .collect()
            .await;

        let mut failures = results.into_iter().filter_map(Result::err);
        match failures.next() {
            Some(first) => {
                let others = failures.count();
                if others > 0 {
                    debug!(others, "Additional preview batches failed");
                }
                Err(first)
            }
            None => Ok(()),
        }
    }

    async fn store_preview_batch(&self, count: u32, offset: u32) -> Result<()> {
        let result = async {
            let response = self
                .source
                .fetch_previews(&self.settings.api_key, count, offset)
                .await?;
            let previews = spoonacular::previews_from_search(response);
            info!(offset, fetched = previews.len(), "Fetched preview batch");
            let inserted = self.db.insert_previews(previews).await?;
            debug!(offset, inserted, "Stored preview batch");
            Ok::<_, Error>(())
        }
        .await;

        if let Err(e) = &result {
            warn!(offset, count, error = %e, "Preview batch failed");
        }
        result
    }

    // --- Search ---

    /// Up to `amount` previews whose title contains `name`, asking the API
    /// once when the cache has fewer.
    ///
    /// A failing cache read is returned as an error; a failing API call is
    /// logged and the cached matches are returned.
    pub async fn get_recipes_by_name(&self, name: &str, amount: u32) -> Result<Vec<RecipePreview>> {
        let cached = self.db.previews_by_title(name, amount).await?;
        if cached.len() >= amount as usize {
            debug!(query = name, count = cached.len(), "Search satisfied from cache");
            return Ok(cached);
        }

        info!(
            query = name,
            cached = cached.len(),
            amount,
            "Not enough cached matches, searching the API"
        );
        if let Err(e) = self.store_search_results(name, amount).await {
            warn!(query = name, error = %e, "Failed to fetch recipes by name");
            return Ok(cached);
        }

        self.db.previews_by_title(name, amount).await
    }

    async fn store_search_results(&self, name: &str, amount: u32) -> Result<()> {
        let response = self
            .source
            .fetch_previews_by_query(&self.settings.api_key, name, amount)
            .await?;
        let previews = spoonacular::previews_from_search(response);
        info!(query = name, fetched = previews.len(), "Fetched recipes by name");
        self.db.insert_previews(previews).await?;
        Ok(())
    }

    // --- Detail ---

    /// The recipe with its ingredients, fetched and cached on first access.
    ///
    /// `Ok(None)` means the recipe is neither cached nor obtainable from the
    /// API right now.
    pub async fn get_recipe_detailed(&self, id: i64) -> Result<Option<RecipeWithIngredients>> {
        if let Some(found) = self.db.recipe_with_ingredients(id).await? {
            debug!(recipe_id = id, "Recipe found in cache");
            return Ok(Some(found));
        }

        info!(recipe_id = id, "Recipe not cached, fetching from the API");
        if let Err(e) = self.store_recipe_detailed(id).await {
            warn!(recipe_id = id, error = %e, "Failed to add recipe details to cache");
        }

        let found = self.db.recipe_with_ingredients(id).await?;
        if found.is_none() {
            info!(recipe_id = id, "Recipe unavailable");
        }
        Ok(found)
    }

    async fn store_recipe_detailed(&self, id: i64) -> Result<()> {
        let info = self
            .source
            .fetch_detail(id, &self.settings.api_key)
            .await?;
        let rwi = spoonacular::recipe_from_information(info);
        debug!(
            recipe_id = id,
            ingredients = rwi.ingredients.len(),
            "Saving recipe details"
        );
        self.db.insert_recipe_with_ingredients(rwi).await
    }

    // --- Favorites ---

    pub async fn get_favorites(&self) -> Result<Vec<RecipeDetailed>> {
        let favorites = self.db.favorites().await?;
        debug!(count = favorites.len(), "Loaded favorite recipes");
        Ok(favorites)
    }

    /// Persist the favorite flag the caller has already set on `recipe`.
    ///
    /// Only `is_favorite` is written; the other fields of `recipe` are ignored.
    pub async fn set_favorite(&self, recipe: &RecipeDetailed) -> Result<()> {
        if recipe.is_favorite {
            info!(recipe_id = recipe.id, "Adding recipe to favorites");
        } else {
            info!(recipe_id = recipe.id, "Removing recipe from favorites");
        }
        if !self.db.update_favorite(recipe.id, recipe.is_favorite).await? {
            warn!(recipe_id = recipe.id, "Favorite change for a recipe that is not cached");
        }
        Ok(())
    }

    /// Flip the favorite flag of recipe `id` and return the new state.
    ///
    /// The recipe is loaded through [`Self::get_recipe_detailed`], so an
    /// uncached recipe is fetched first. Returns `Ok(None)` if it cannot be
    /// found.
    pub async fn toggle_favorite(&self, id: i64) -> Result<Option<bool>> {
        let Some(RecipeWithIngredients { mut recipe, .. }) = self.get_recipe_detailed(id).await?
        else {
            return Ok(None);
        };
        recipe.is_favorite = !recipe.is_favorite;
        self.set_favorite(&recipe).await?;
        Ok(Some(recipe.is_favorite))
    }
}
