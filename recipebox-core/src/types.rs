use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Highest allowed star rating.
pub const MAX_RATING: f64 = 5.0;

/// Identifier assigned by the remote store.
///
/// json-server hands out numbers for seeded data and strings for records it
/// created itself, so both shapes are accepted. Two ids are equal when their
/// textual forms are equal: `1` and `"1"` address the same record. Numbers
/// that aren't non-negative integers (`-3`, `1.5`) are kept in textual form.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RecipeId {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(u64),
    Text(String),
    OtherNumber(serde_json::Number),
}

impl<'de> Deserialize<'de> for RecipeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(WireId::deserialize(deserializer)?.into())
    }
}

impl From<WireId> for RecipeId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(n) => RecipeId::Number(n),
            WireId::Text(s) => RecipeId::Text(s),
            WireId::OtherNumber(n) => RecipeId::Text(n.to_string()),
        }
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeId::Number(n) => write!(f, "{}", n),
            RecipeId::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq for RecipeId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RecipeId::Number(a), RecipeId::Number(b)) => a == b,
            (RecipeId::Text(a), RecipeId::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl Eq for RecipeId {}

impl Hash for RecipeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl From<u64> for RecipeId {
    fn from(n: u64) -> Self {
        RecipeId::Number(n)
    }
}

impl From<&str> for RecipeId {
    fn from(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| RecipeId::Text(s.to_string()))
    }
}

impl FromStr for RecipeId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<u64>() {
            Ok(n) => RecipeId::Number(n),
            Err(_) => RecipeId::Text(s.to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!(
                "Unknown difficulty: {:?} (expected Easy, Medium or Hard)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A recipe as stored by the remote collection.
///
/// Nullable fields coming off the wire are coerced to their defaults on
/// deserialization: a missing or `null` `isFavorite` becomes `false`,
/// `rating` becomes 0 and `tags` becomes empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecipeId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_favorite: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_difficulty",
        skip_serializing_if = "Option::is_none"
    )]
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl Recipe {
    /// Re-establish the record invariants after reading it from the wire:
    /// rating clamped to [0, 5], no case-insensitive duplicates in
    /// ingredients or tags.
    pub fn normalize(mut self) -> Self {
        self.rating = clamp_rating(self.rating);
        dedupe_ignore_case(&mut self.ingredients);
        dedupe_ignore_case(&mut self.tags);
        self
    }

    /// Milliseconds since the Unix epoch for `createdAt`.
    ///
    /// Missing or unparseable timestamps count as the epoch itself, which
    /// sinks them to the end of a newest-first ordering.
    pub fn created_millis(&self) -> i64 {
        self.created_at
            .as_deref()
            .and_then(parse_timestamp_millis)
            .unwrap_or(0)
    }
}

/// Partial record for PATCH requests. Unset fields are not serialized, so
/// the server leaves them untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl RecipePatch {
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge this patch into a full record, the way the remote store does.
    pub fn apply_to(&self, recipe: &mut Recipe) {
        if let Some(v) = &self.title {
            recipe.title = v.clone();
        }
        if let Some(v) = &self.description {
            recipe.description = v.clone();
        }
        if let Some(v) = &self.ingredients {
            recipe.ingredients = v.clone();
        }
        if let Some(v) = &self.instructions {
            recipe.instructions = v.clone();
        }
        if let Some(v) = &self.thumbnail {
            recipe.thumbnail = Some(v.clone());
        }
        if let Some(v) = self.is_favorite {
            recipe.is_favorite = v;
        }
        if let Some(v) = self.time_minutes {
            recipe.time_minutes = Some(v);
        }
        if let Some(v) = self.servings {
            recipe.servings = Some(v);
        }
        if let Some(v) = self.difficulty {
            recipe.difficulty = Some(v);
        }
        if let Some(v) = self.rating {
            recipe.rating = v;
        }
        if let Some(v) = &self.tags {
            recipe.tags = v.clone();
        }
        if let Some(v) = &self.author {
            recipe.author = Some(v.clone());
        }
    }
}

/// Server-side filtering options for listing recipes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Substring query, sent as `title_like` and `ingredients_like`.
    pub query: Option<String>,
    /// Restrict to favorites (`isFavorite=true`).
    pub favorites_only: bool,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListFilter {
    /// Query-string pairs in the json-server dialect.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(q) = self.query.as_deref().filter(|q| !q.is_empty()) {
            pairs.push(("title_like", q.to_string()));
            pairs.push(("ingredients_like", q.to_string()));
        }
        if self.favorites_only {
            pairs.push(("isFavorite", "true".to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("_page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("_limit", limit.to_string()));
        }
        pairs
    }
}

pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        0.0
    } else {
        rating.clamp(0.0, MAX_RATING)
    }
}

/// Drop later entries that equal an earlier one ignoring case. Order of the
/// survivors is preserved.
pub fn dedupe_ignore_case(items: &mut Vec<String>) {
    let mut seen: Vec<String> = Vec::with_capacity(items.len());
    items.retain(|item| {
        let key = item.to_lowercase();
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
}

/// Parse an ISO 8601 timestamp into milliseconds since the epoch.
///
/// Accepts full RFC 3339, a naive date-time (read as UTC) or a bare date.
pub fn parse_timestamp_millis(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Older records were saved with `difficulty: ""` by the web form; treat
/// anything that isn't a known level as unset.
fn lenient_difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_get_defaults() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"id": 3, "title": "Soup", "description": "Hot soup"}"#)
                .unwrap();
        assert_eq!(recipe.id, Some(RecipeId::Number(3)));
        assert!(!recipe.is_favorite);
        assert_eq!(recipe.rating, 0.0);
        assert!(recipe.tags.is_empty());
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn test_null_fields_get_defaults() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"id": "ab12", "title": "Soup", "isFavorite": null, "rating": null, "tags": null}"#,
        )
        .unwrap();
        assert_eq!(recipe.id, Some(RecipeId::Text("ab12".to_string())));
        assert!(!recipe.is_favorite);
        assert_eq!(recipe.rating, 0.0);
        assert!(recipe.tags.is_empty());
    }

    #[test]
    fn test_empty_difficulty_is_unset() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"title": "Soup", "difficulty": ""}"#).unwrap();
        assert_eq!(recipe.difficulty, None);

        let recipe: Recipe =
            serde_json::from_str(r#"{"title": "Soup", "difficulty": "Hard"}"#).unwrap();
        assert_eq!(recipe.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn test_serializes_camel_case_and_skips_unset() {
        let recipe = Recipe {
            id: None,
            title: "Toast".to_string(),
            description: "Bread, but hot".to_string(),
            ingredients: vec!["bread".to_string()],
            instructions: "Put bread in toaster".to_string(),
            thumbnail: None,
            is_favorite: true,
            created_at: Some("2024-01-01T00:00:00.000Z".to_string()),
            time_minutes: Some(3),
            servings: None,
            difficulty: None,
            rating: 4.0,
            tags: vec![],
            author: None,
        };
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["createdAt"], "2024-01-01T00:00:00.000Z");
        assert_eq!(json["timeMinutes"], 3);
        assert!(json.get("id").is_none());
        assert!(json.get("servings").is_none());
        assert!(json.get("author").is_none());
    }

    #[test]
    fn test_normalize_clamps_and_dedupes() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"title": "x", "rating": 9, "tags": ["Vegan", "vegan", "Quick"], "ingredients": ["Salt", "salt"]}"#,
        )
        .unwrap();
        let recipe = recipe.normalize();
        assert_eq!(recipe.rating, 5.0);
        assert_eq!(recipe.tags, vec!["Vegan", "Quick"]);
        assert_eq!(recipe.ingredients, vec!["Salt"]);
    }

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating(-1.0), 0.0);
        assert_eq!(clamp_rating(3.5), 3.5);
        assert_eq!(clamp_rating(f64::NAN), 0.0);
    }

    #[test]
    fn test_id_equality_across_shapes() {
        assert_eq!(RecipeId::Number(7), RecipeId::Text("7".to_string()));
        assert_ne!(RecipeId::Number(7), RecipeId::Text("07".to_string()));
        assert_eq!(RecipeId::from("12"), RecipeId::Number(12));
        assert_eq!(RecipeId::from("x9"), RecipeId::Text("x9".to_string()));
    }

    #[test]
    fn test_odd_numeric_ids_decode_as_text() {
        let recipes: Vec<Recipe> = serde_json::from_str(
            r#"[{"id": 7}, {"id": "ab"}, {"id": -3}, {"id": 1.5}]"#,
        )
        .unwrap();
        let ids: Vec<Option<RecipeId>> = recipes.into_iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![
                Some(RecipeId::Number(7)),
                Some(RecipeId::Text("ab".to_string())),
                Some(RecipeId::Text("-3".to_string())),
                Some(RecipeId::Text("1.5".to_string())),
            ]
        );
        assert_eq!(RecipeId::from("-3").to_string(), "-3");
    }

    #[test]
    fn test_created_millis() {
        let mut recipe: Recipe = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(recipe.created_millis(), 0);

        recipe.created_at = Some("not a date".to_string());
        assert_eq!(recipe.created_millis(), 0);

        recipe.created_at = Some("1970-01-01T00:00:01Z".to_string());
        assert_eq!(recipe.created_millis(), 1000);

        recipe.created_at = Some("1970-01-02".to_string());
        assert_eq!(recipe.created_millis(), 86_400_000);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let json = serde_json::to_value(RecipePatch::favorite(true)).unwrap();
        assert_eq!(json, serde_json::json!({"isFavorite": true}));
        assert!(RecipePatch::default().is_empty());
    }

    #[test]
    fn test_list_filter_query_pairs() {
        let filter = ListFilter {
            query: Some("pasta".to_string()),
            favorites_only: true,
            page: Some(2),
            limit: Some(10),
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("title_like", "pasta".to_string()),
                ("ingredients_like", "pasta".to_string()),
                ("isFavorite", "true".to_string()),
                ("_page", "2".to_string()),
                ("_limit", "10".to_string()),
            ]
        );
        assert!(ListFilter::default().query_pairs().is_empty());
    }
}
