//! In-memory recipe store for tests and offline demos.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{ListFilter, Recipe, RecipeId, RecipePatch};

use super::RecipeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

#[derive(Debug, Default)]
struct Inner {
    recipes: Vec<Recipe>,
    next_id: u64,
    failures: HashMap<MockOperation, String>,
    calls: Vec<MockOperation>,
}

/// Mock recipe store that mimics json-server's behavior in memory.
///
/// Failures can be injected per operation; every call is recorded so tests
/// can assert on the traffic a component generated.
#[derive(Debug, Default)]
pub struct MockRecipeStore {
    inner: Mutex<Inner>,
    latency: Option<Duration>,
}

impl MockRecipeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store. Records without an id are assigned one.
    pub fn with_recipes(self, recipes: Vec<Recipe>) -> Self {
        {
            let mut inner = self.lock();
            for recipe in recipes {
                inner.insert(recipe);
            }
        }
        self
    }

    /// Delay every call by `latency` before it touches the store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make every subsequent call of `op` fail with a 500.
    pub fn with_failure(self, op: MockOperation, message: &str) -> Self {
        self.fail(op, message);
        self
    }

    pub fn fail(&self, op: MockOperation, message: &str) {
        self.lock().failures.insert(op, message.to_string());
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Current contents of the store.
    pub fn recipes(&self) -> Vec<Recipe> {
        self.lock().recipes.clone()
    }

    /// Operations invoked so far, in order.
    pub fn calls(&self) -> Vec<MockOperation> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, op: MockOperation) -> usize {
        self.lock().calls.iter().filter(|c| **c == op).count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    /// Record the call and return the injected failure, if any.
    fn begin(&self, op: MockOperation) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(op);
        if let Some(message) = inner.failures.get(&op) {
            return Err(StoreError::Status {
                status: 500,
                body: message.clone(),
            });
        }
        Ok(inner)
    }
}

impl Inner {
    fn insert(&mut self, mut recipe: Recipe) -> Recipe {
        match recipe.id {
            Some(RecipeId::Number(n)) => self.next_id = self.next_id.max(n),
            Some(RecipeId::Text(_)) => {}
            None => {
                self.next_id += 1;
                recipe.id = Some(RecipeId::Number(self.next_id));
            }
        }
        self.recipes.push(recipe.clone());
        recipe
    }

    fn position(&self, id: &RecipeId) -> Option<usize> {
        self.recipes
            .iter()
            .position(|r| r.id.as_ref() == Some(id))
    }
}

/// json-server's `title_like`/`ingredients_like` are ANDed regex matches;
/// the mock approximates them with a case-insensitive substring test on
/// either field so a query finds recipes by title or by ingredient.
fn matches_filter(recipe: &Recipe, filter: &ListFilter) -> bool {
    if filter.favorites_only && !recipe.is_favorite {
        return false;
    }
    match filter.query.as_deref().map(str::to_lowercase) {
        Some(q) if !q.is_empty() => {
            recipe.title.to_lowercase().contains(&q)
                || recipe
                    .ingredients
                    .iter()
                    .any(|i| i.to_lowercase().contains(&q))
        }
        _ => true,
    }
}

#[async_trait]
impl RecipeStore for MockRecipeStore {
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Recipe>, StoreError> {
        self.wait().await;
        let inner = self.begin(MockOperation::List)?;
        let matching = inner
            .recipes
            .iter()
            .filter(|r| matches_filter(r, filter))
            .cloned();

        let recipes: Vec<Recipe> = match filter.limit {
            Some(limit) => {
                let page = filter.page.unwrap_or(1).max(1);
                let skip = (page as usize - 1) * limit as usize;
                matching.skip(skip).take(limit as usize).collect()
            }
            None => matching.collect(),
        };
        Ok(recipes.into_iter().map(Recipe::normalize).collect())
    }

    async fn get(&self, id: &RecipeId) -> Result<Recipe, StoreError> {
        self.wait().await;
        let inner = self.begin(MockOperation::Get)?;
        let idx = inner
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(inner.recipes[idx].clone().normalize())
    }

    async fn create(&self, recipe: &Recipe) -> Result<Recipe, StoreError> {
        self.wait().await;
        let mut inner = self.begin(MockOperation::Create)?;
        let mut recipe = recipe.clone();
        // The server always assigns ids for new records
        recipe.id = None;
        Ok(inner.insert(recipe).normalize())
    }

    async fn update(&self, id: &RecipeId, patch: &RecipePatch) -> Result<Recipe, StoreError> {
        self.wait().await;
        let mut inner = self.begin(MockOperation::Update)?;
        let idx = inner
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let recipe = &mut inner.recipes[idx];
        patch.apply_to(recipe);
        Ok(recipe.clone().normalize())
    }

    async fn delete(&self, id: &RecipeId) -> Result<(), StoreError> {
        self.wait().await;
        let mut inner = self.begin(MockOperation::Delete)?;
        let idx = inner
            .position(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        inner.recipes.remove(idx);
        Ok(())
    }
}
