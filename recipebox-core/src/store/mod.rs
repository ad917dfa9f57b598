//! Remote recipe collection client.
//!
//! Every read or write of recipes goes through [`RecipeStore`], so the
//! collection state and the forms can run against the real json-server
//! endpoint or the in-memory [`MockRecipeStore`] in tests.

mod http;
mod mock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{ListFilter, Recipe, RecipeId, RecipePatch};

pub use http::{HttpRecipeStore, HttpRecipeStoreBuilder};
pub use mock::{MockOperation, MockRecipeStore};

/// Path of the recipe collection under the server base URL.
pub const COLLECTION_PATH: &str = "recipes";

/// CRUD operations against the recipe collection.
///
/// Records returned by every method are normalized (see [`Recipe::normalize`]).
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// List recipes. Filtering is done by the server; the client only passes
    /// the filter through.
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Recipe>, StoreError>;

    /// Fetch one recipe. Fails with [`StoreError::NotFound`] if it doesn't exist.
    async fn get(&self, id: &RecipeId) -> Result<Recipe, StoreError>;

    /// Create a recipe. The server assigns the id; `createdAt` must already be set.
    async fn create(&self, recipe: &Recipe) -> Result<Recipe, StoreError>;

    /// Merge `patch` into an existing recipe and return the stored result.
    async fn update(&self, id: &RecipeId, patch: &RecipePatch) -> Result<Recipe, StoreError>;

    /// Delete a recipe. A missing record surfaces as [`StoreError::NotFound`].
    async fn delete(&self, id: &RecipeId) -> Result<(), StoreError>;
}
