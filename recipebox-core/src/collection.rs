//! Client-side recipe collection state.
//!
//! [`CollectionState`] owns the loaded recipes together with the search
//! query, the favorites-only flag and the sort key. The list shown to the
//! user is always [`CollectionState::derived_view`], a pure function of that
//! state, recomputed on demand.
//!
//! Remote writes go through a [`RecipeStore`] passed to each call. Local
//! state is only patched after the store confirms the write.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::config::DEFAULT_DEBOUNCE_MS;
use crate::debounce::Debouncer;
use crate::error::StoreError;
use crate::store::RecipeStore;
use crate::types::{ListFilter, Recipe, RecipeId, RecipePatch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Most recently created first.
    #[default]
    Newest,
    /// Alphabetical by title.
    Title,
    /// Favorites first, otherwise in list order.
    FavoriteFirst,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Title => "title",
            SortKey::FavoriteFirst => "favorite-first",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "new" => Ok(SortKey::Newest),
            "title" => Ok(SortKey::Title),
            "favorite-first" | "favorites" | "fav" => Ok(SortKey::FavoriteFirst),
            other => Err(format!(
                "Unknown sort key: {:?} (expected newest, title or favorite-first)",
                other
            )),
        }
    }
}

/// Progress of the most recent `load`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Behaves like `Loaded` with an empty list; only a new load recovers.
    LoadFailed,
}

/// Inputs of the derived view other than the recipes themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    /// Already trimmed and lowercased.
    pub query: String,
    pub favorites_only: bool,
    pub sort: SortKey,
}

/// Filter and sort `recipes` for display.
///
/// Pure: the input is not modified and identical inputs give identical output.
pub fn derive_view<'a>(recipes: &'a [Recipe], options: &ViewOptions) -> Vec<&'a Recipe> {
    let mut view: Vec<&Recipe> = recipes
        .iter()
        .filter(|r| matches_query(r, &options.query))
        .filter(|r| !options.favorites_only || r.is_favorite)
        .collect();

    // `sort_by` is stable, which favorite-first relies on
    match options.sort {
        SortKey::Newest => view.sort_by(|a, b| b.created_millis().cmp(&a.created_millis())),
        SortKey::Title => view.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortKey::FavoriteFirst => view.sort_by(|a, b| b.is_favorite.cmp(&a.is_favorite)),
    }
    view
}

/// `query` must already be lowercased.
fn matches_query(recipe: &Recipe, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    recipe.title.to_lowercase().contains(query)
        || recipe.description.to_lowercase().contains(query)
        || recipe.tags.join(" ").to_lowercase().contains(query)
        || recipe.ingredients.join(" ").to_lowercase().contains(query)
}

/// Dictionary-style comparison: accents and case are ignored first ("Éclair"
/// sorts with the e's), exact text breaks ties so the order is total.
fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Decompose, drop combining marks, fold case.
fn collation_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Marks a load as in flight. If the load future is dropped before it
/// finishes, the previous state comes back and the list is left as it was.
struct LoadingGuard<'a> {
    state: &'a mut LoadState,
    previous: LoadState,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a mut LoadState) -> Self {
        let previous = std::mem::replace(state, LoadState::Loading);
        Self { state, previous }
    }

    fn finish(self, outcome: LoadState) {
        *self.state = outcome;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if *self.state == LoadState::Loading {
            *self.state = self.previous;
        }
    }
}

/// In-memory recipe list plus the search/filter/sort state of one view.
#[derive(Debug)]
pub struct CollectionState {
    recipes: Vec<Recipe>,
    load_state: LoadState,
    options: ViewOptions,
    query_debounce: Debouncer<String>,
}

impl Default for CollectionState {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl CollectionState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            recipes: Vec::new(),
            load_state: LoadState::Idle,
            options: ViewOptions::default(),
            query_debounce: Debouncer::new(debounce),
        }
    }

    /// Start from an already-fetched list.
    pub fn with_recipes(mut self, recipes: Vec<Recipe>) -> Self {
        self.recipes = recipes;
        self.load_state = LoadState::Loaded;
        self
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn query(&self) -> &str {
        &self.options.query
    }

    pub fn favorites_only(&self) -> bool {
        self.options.favorites_only
    }

    pub fn sort(&self) -> SortKey {
        self.options.sort
    }

    pub fn get(&self, id: &RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id.as_ref() == Some(id))
    }

    /// Fetch the whole collection and replace the local list.
    ///
    /// On failure the list is emptied rather than left stale, and the error
    /// is handed back for the caller to report.
    pub async fn load<S>(&mut self, store: &S) -> Result<(), StoreError>
    where
        S: RecipeStore + ?Sized,
    {
        self.load_with(store, &ListFilter::default()).await
    }

    /// Like [`CollectionState::load`], but lets the server pre-filter by the
    /// current query and favorites flag.
    pub async fn load_filtered<S>(&mut self, store: &S) -> Result<(), StoreError>
    where
        S: RecipeStore + ?Sized,
    {
        let filter = ListFilter {
            query: Some(self.options.query.clone()).filter(|q| !q.is_empty()),
            favorites_only: self.options.favorites_only,
            ..ListFilter::default()
        };
        self.load_with(store, &filter).await
    }

    async fn load_with<S>(&mut self, store: &S, filter: &ListFilter) -> Result<(), StoreError>
    where
        S: RecipeStore + ?Sized,
    {
        let guard = LoadingGuard::start(&mut self.load_state);
        match store.list(filter).await {
            Ok(recipes) => {
                tracing::debug!(count = recipes.len(), "loaded recipes");
                self.recipes = recipes;
                guard.finish(LoadState::Loaded);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load recipes");
                self.recipes.clear();
                guard.finish(LoadState::LoadFailed);
                Err(e)
            }
        }
    }

    /// Schedule a query update. It takes effect once input has been quiet for
    /// the debounce delay; a newer call replaces a pending one.
    pub fn set_query(&mut self, text: &str) {
        self.query_debounce.schedule(text.to_string());
    }

    /// Apply a query right away, dropping any pending debounced one.
    pub fn set_query_now(&mut self, text: &str) {
        self.query_debounce.cancel();
        self.options.query = normalize_query(text);
    }

    pub fn has_pending_query(&self) -> bool {
        self.query_debounce.is_pending()
    }

    /// Wait for the pending query (if any) to fire and apply it.
    ///
    /// Returns false without waiting when nothing is pending. Cancel-safe:
    /// if the returned future is dropped the query stays pending.
    pub async fn apply_pending_query(&mut self) -> bool {
        match self.query_debounce.fired().await {
            Some(text) => {
                self.options.query = normalize_query(&text);
                tracing::debug!(query = %self.options.query, "applied search query");
                true
            }
            None => false,
        }
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        self.options.favorites_only = favorites_only;
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.options.sort = sort;
    }

    /// The recipes to display, filtered and sorted.
    pub fn derived_view(&self) -> Vec<&Recipe> {
        derive_view(&self.recipes, &self.options)
    }

    /// Flip a recipe's favorite flag on the server, then replace the local
    /// copy with the server's version. Local state is untouched on failure.
    pub async fn toggle_favorite<S>(&mut self, store: &S, id: &RecipeId) -> Result<Recipe, StoreError>
    where
        S: RecipeStore + ?Sized,
    {
        let current = self
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?
            .is_favorite;

        let mut updated = store.update(id, &RecipePatch::favorite(!current)).await?;
        if updated.id.is_none() {
            updated.id = Some(id.clone());
        }

        if let Some(slot) = self
            .recipes
            .iter_mut()
            .find(|r| r.id.as_ref() == updated.id.as_ref())
        {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Drop a recipe from the local list after the server deleted it.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, id: &RecipeId) -> bool {
        let before = self.recipes.len();
        self.recipes.retain(|r| r.id.as_ref() != Some(id));
        self.recipes.len() != before
    }

    /// Delete on the server and reconcile locally. A record that is already
    /// gone on the server counts as deleted.
    pub async fn delete<S>(&mut self, store: &S, id: &RecipeId) -> Result<(), StoreError>
    where
        S: RecipeStore + ?Sized,
    {
        match store.delete(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::debug!(%id, "recipe already deleted on server");
            }
            Err(e) => return Err(e),
        }
        self.remove(id);
        Ok(())
    }
}
