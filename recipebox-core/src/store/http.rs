//! json-server backed recipe store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::types::{ListFilter, Recipe, RecipeId, RecipePatch};

use super::{RecipeStore, COLLECTION_PATH};

/// Configuration for HttpRecipeStore.
#[derive(Clone)]
pub struct HttpRecipeStoreBuilder {
    api_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for HttpRecipeStoreBuilder {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}

impl HttpRecipeStoreBuilder {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            timeout: config.timeout,
            user_agent: format!("recipebox/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the server base URL (without the `/recipes` suffix).
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn build(self) -> Result<HttpRecipeStore, StoreError> {
        let collection_url = collection_url(&self.api_url)?;

        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;

        Ok(HttpRecipeStore {
            inner,
            collection_url,
        })
    }
}

/// Recipe store talking to a json-server style `/recipes` collection.
pub struct HttpRecipeStore {
    inner: reqwest::Client,
    collection_url: Url,
}

impl HttpRecipeStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        HttpRecipeStoreBuilder::from_config(config).build()
    }

    pub fn builder() -> HttpRecipeStoreBuilder {
        HttpRecipeStoreBuilder::default()
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    fn item_url(&self, id: &RecipeId) -> Result<Url, StoreError> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.collection_url.to_string()))?
            .push(&id.to_string());
        Ok(url)
    }
}

fn collection_url(api_url: &str) -> Result<Url, StoreError> {
    let mut url = Url::parse(api_url.trim())
        .map_err(|e| StoreError::InvalidUrl(format!("{}: {}", api_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| StoreError::InvalidUrl(format!("{}: cannot be a base URL", api_url)))?
        .pop_if_empty()
        .push(COLLECTION_PATH);
    Ok(url)
}

/// Turn a non-success status into an error. A 404 on an addressed record
/// becomes `NotFound`.
async fn check_status(response: Response, id: Option<&RecipeId>) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(StoreError::NotFound(id.to_string()));
        }
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl RecipeStore for HttpRecipeStore {
    async fn list(&self, filter: &ListFilter) -> Result<Vec<Recipe>, StoreError> {
        let pairs = filter.query_pairs();
        tracing::debug!(url = %self.collection_url, ?pairs, "listing recipes");

        let response = self
            .inner
            .get(self.collection_url.clone())
            .query(&pairs)
            .send()
            .await?;
        let response = check_status(response, None).await?;

        // json-server answers `null` for some empty query results
        let recipes: Option<Vec<Recipe>> = read_json(response).await?;
        let recipes: Vec<Recipe> = recipes
            .unwrap_or_default()
            .into_iter()
            .map(Recipe::normalize)
            .collect();

        tracing::debug!(count = recipes.len(), "listed recipes");
        Ok(recipes)
    }

    async fn get(&self, id: &RecipeId) -> Result<Recipe, StoreError> {
        let url = self.item_url(id)?;
        tracing::debug!(%id, "fetching recipe");

        let response = self.inner.get(url).send().await?;
        let response = check_status(response, Some(id)).await?;
        Ok(read_json::<Recipe>(response).await?.normalize())
    }

    async fn create(&self, recipe: &Recipe) -> Result<Recipe, StoreError> {
        tracing::debug!(title = %recipe.title, "creating recipe");

        let response = self
            .inner
            .post(self.collection_url.clone())
            .json(recipe)
            .send()
            .await?;
        let response = check_status(response, None).await?;
        let created = read_json::<Recipe>(response).await?.normalize();

        tracing::debug!(id = ?created.id, "created recipe");
        Ok(created)
    }

    async fn update(&self, id: &RecipeId, patch: &RecipePatch) -> Result<Recipe, StoreError> {
        let url = self.item_url(id)?;
        tracing::debug!(%id, "patching recipe");

        let response = self.inner.patch(url).json(patch).send().await?;
        let response = check_status(response, Some(id)).await?;
        Ok(read_json::<Recipe>(response).await?.normalize())
    }

    async fn delete(&self, id: &RecipeId) -> Result<(), StoreError> {
        let url = self.item_url(id)?;
        tracing::debug!(%id, "deleting recipe");

        let response = self.inner.delete(url).send().await?;
        check_status(response, Some(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_url() {
        assert_eq!(
            collection_url("http://localhost:3000").unwrap().as_str(),
            "http://localhost:3000/recipes"
        );
        assert_eq!(
            collection_url("http://example.com/api/").unwrap().as_str(),
            "http://example.com/api/recipes"
        );
        assert!(collection_url("not a url").is_err());
    }

    #[test]
    fn test_item_url_escapes_id() {
        let store = HttpRecipeStore::builder()
            .api_url("http://localhost:3000")
            .build()
            .unwrap();
        assert_eq!(
            store.item_url(&RecipeId::Number(12)).unwrap().as_str(),
            "http://localhost:3000/recipes/12"
        );
        assert_eq!(
            store
                .item_url(&RecipeId::Text("a b/c".to_string()))
                .unwrap()
                .as_str(),
            "http://localhost:3000/recipes/a%20b%2Fc"
        );
    }
}
