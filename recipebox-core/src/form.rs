//! Add/edit recipe form state, validation and payload shaping.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::FormError;
use crate::types::{clamp_rating, Author, Difficulty, Recipe, RecipePatch, MAX_RATING};

pub const TITLE_MIN_LEN: usize = 3;
pub const DESCRIPTION_MIN_LEN: usize = 10;
pub const INSTRUCTIONS_MIN_LEN: usize = 15;

/// An ordered list input where each entry is a removable chip.
///
/// Entries are unique ignoring case; adding a duplicate is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipList {
    items: Vec<String>,
}

impl ChipList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chip. Input is trimmed; blank input and case-insensitive
    /// duplicates are ignored. Returns whether the list changed.
    pub fn add(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.contains(text) {
            return false;
        }
        self.items.push(text.to_string());
        true
    }

    /// Remove the chip at `index`, keeping the order of the rest.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        let needle = text.trim().to_lowercase();
        self.items.iter().any(|item| item.to_lowercase() == needle)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.items.clone()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ChipList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = ChipList::new();
        for item in iter {
            list.add(item.as_ref());
        }
        list
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Ingredients,
    Instructions,
    TimeMinutes,
    Servings,
    Rating,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Description => "description",
            FormField::Ingredients => "ingredients",
            FormField::Instructions => "instructions",
            FormField::TimeMinutes => "timeMinutes",
            FormField::Servings => "servings",
            FormField::Rating => "rating",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    Required,
    MinLength { min: usize, actual: usize },
    AtLeast { min: f64 },
    AtMost { max: f64 },
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: FormField,
    pub kind: ViolationKind,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field.as_str();
        match &self.kind {
            ViolationKind::Required if self.field == FormField::Ingredients => {
                write!(f, "{}: add at least one ingredient", field)
            }
            ViolationKind::Required => write!(f, "{}: required", field),
            ViolationKind::MinLength { min, actual } => write!(
                f,
                "{}: must be at least {} characters (got {})",
                field, min, actual
            ),
            ViolationKind::AtLeast { min } => write!(f, "{}: must be at least {}", field, min),
            ViolationKind::AtMost { max } => write!(f, "{}: must be at most {}", field, max),
        }
    }
}

/// Everything the add and edit forms collect.
///
/// Numeric inputs are kept as typed (possibly out of range) so that
/// [`RecipeForm::validate`] can report them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeForm {
    pub title: String,
    pub description: String,
    pub ingredients: ChipList,
    pub instructions: String,
    /// URL or data URL typed/uploaded by the user.
    pub thumbnail: String,
    /// What the image preview currently shows.
    pub thumb_preview: Option<String>,
    pub time_minutes: Option<i64>,
    pub servings: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub rating: Option<f64>,
    pub tags: ChipList,
    pub is_favorite: bool,
    pub author_name: String,
    pub author_avatar: String,
}

impl RecipeForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill the edit form from a stored recipe.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        let thumbnail = recipe.thumbnail.clone().unwrap_or_default();
        Self {
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            ingredients: recipe.ingredients.iter().collect(),
            instructions: recipe.instructions.clone(),
            thumb_preview: Some(thumbnail.clone()).filter(|t| !t.is_empty()),
            thumbnail,
            time_minutes: recipe.time_minutes.map(i64::from),
            servings: recipe.servings.map(i64::from),
            difficulty: recipe.difficulty,
            rating: Some(recipe.rating),
            tags: recipe.tags.iter().collect(),
            is_favorite: recipe.is_favorite,
            author_name: recipe
                .author
                .as_ref()
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            author_avatar: recipe
                .author
                .as_ref()
                .and_then(|a| a.avatar.clone())
                .unwrap_or_default(),
        }
    }

    /// The user typed an image URL.
    pub fn set_thumbnail_url(&mut self, url: &str) {
        let url = url.trim();
        self.thumbnail = url.to_string();
        self.thumb_preview = Some(url.to_string()).filter(|u| !u.is_empty());
    }

    /// The user uploaded a file, already encoded as a data URL.
    pub fn set_thumbnail_data(&mut self, data_url: String) {
        self.thumb_preview = Some(data_url.clone());
        self.thumbnail = data_url;
    }

    pub fn clear_thumbnail(&mut self) {
        self.thumbnail.clear();
        self.thumb_preview = None;
    }

    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        check_text(&mut violations, FormField::Title, &self.title, TITLE_MIN_LEN);
        check_text(
            &mut violations,
            FormField::Description,
            &self.description,
            DESCRIPTION_MIN_LEN,
        );
        if self.ingredients.is_empty() {
            violations.push(FieldViolation {
                field: FormField::Ingredients,
                kind: ViolationKind::Required,
            });
        }
        check_text(
            &mut violations,
            FormField::Instructions,
            &self.instructions,
            INSTRUCTIONS_MIN_LEN,
        );

        if self.time_minutes.is_some_and(|m| m < 1) {
            violations.push(FieldViolation {
                field: FormField::TimeMinutes,
                kind: ViolationKind::AtLeast { min: 1.0 },
            });
        }
        if self.servings.is_some_and(|s| s < 1) {
            violations.push(FieldViolation {
                field: FormField::Servings,
                kind: ViolationKind::AtLeast { min: 1.0 },
            });
        }
        if let Some(rating) = self.rating {
            if rating.is_nan() || rating < 0.0 {
                violations.push(FieldViolation {
                    field: FormField::Rating,
                    kind: ViolationKind::AtLeast { min: 0.0 },
                });
            } else if rating > MAX_RATING {
                violations.push(FieldViolation {
                    field: FormField::Rating,
                    kind: ViolationKind::AtMost { max: MAX_RATING },
                });
            }
        }

        violations
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Build the body for creating a recipe. `now` becomes `createdAt`.
    pub fn create_payload(&self, now: DateTime<Utc>) -> Result<Recipe, FormError> {
        self.ensure_valid()?;
        Ok(Recipe {
            id: None,
            title: self.title.clone(),
            description: self.description.clone(),
            ingredients: self.ingredients.to_vec(),
            instructions: self.instructions.clone(),
            thumbnail: Some(self.resolved_thumbnail()),
            is_favorite: self.is_favorite,
            created_at: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            time_minutes: self.time_minutes.and_then(to_count),
            servings: self.servings.and_then(to_count),
            difficulty: self.difficulty,
            rating: clamp_rating(self.rating.unwrap_or(0.0)),
            tags: self.tags.to_vec(),
            author: self.author(),
        })
    }

    /// Build the partial body for saving edits. `createdAt` is never sent,
    /// and unset optional fields leave the stored values alone.
    pub fn update_patch(&self) -> Result<RecipePatch, FormError> {
        self.ensure_valid()?;
        Ok(RecipePatch {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            ingredients: Some(self.ingredients.to_vec()),
            instructions: Some(self.instructions.clone()),
            thumbnail: Some(self.resolved_thumbnail()),
            is_favorite: Some(self.is_favorite),
            time_minutes: self.time_minutes.and_then(to_count),
            servings: self.servings.and_then(to_count),
            difficulty: self.difficulty,
            rating: Some(clamp_rating(self.rating.unwrap_or(0.0))),
            tags: Some(self.tags.to_vec()),
            author: self.author(),
        })
    }

    fn ensure_valid(&self) -> Result<(), FormError> {
        let violations = self.validate();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(FormError::Invalid(violations))
        }
    }

    /// Typed thumbnail wins; otherwise whatever the preview shows.
    fn resolved_thumbnail(&self) -> String {
        let typed = self.thumbnail.trim();
        if !typed.is_empty() {
            return typed.to_string();
        }
        self.thumb_preview.clone().unwrap_or_default()
    }

    /// Only present when a name was given.
    fn author(&self) -> Option<Author> {
        let name = self.author_name.trim();
        if name.is_empty() {
            return None;
        }
        let avatar = self.author_avatar.trim();
        Some(Author {
            name: name.to_string(),
            avatar: Some(avatar.to_string()).filter(|a| !a.is_empty()),
        })
    }
}

fn check_text(violations: &mut Vec<FieldViolation>, field: FormField, value: &str, min: usize) {
    let actual = value.trim().chars().count();
    if actual == 0 {
        violations.push(FieldViolation {
            field,
            kind: ViolationKind::Required,
        });
    } else if actual < min {
        violations.push(FieldViolation {
            field,
            kind: ViolationKind::MinLength { min, actual },
        });
    }
}

fn to_count(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| *v >= 1)
}
