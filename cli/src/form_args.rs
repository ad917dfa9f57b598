//! Command-line flags that fill in a [`RecipeForm`].

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use recipebox_core::thumbnail::thumbnail_from_file;
use recipebox_core::{ChipList, Difficulty, RecipeForm};

/// Recipe fields shared by `add` and `edit`. Anything left unset keeps the
/// form's current value.
#[derive(Args, Debug, Default)]
pub struct FormArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Ingredient line, e.g. "2 cups flour" (repeatable)
    #[arg(long = "ingredient")]
    pub ingredients: Vec<String>,
    #[arg(long)]
    pub instructions: Option<String>,
    /// Image URL for the thumbnail
    #[arg(long, conflicts_with = "thumbnail_file")]
    pub thumbnail: Option<String>,
    /// Local image to embed as the thumbnail
    #[arg(long)]
    pub thumbnail_file: Option<PathBuf>,
    /// Total time in minutes
    #[arg(long = "time", allow_negative_numbers = true)]
    pub time_minutes: Option<i64>,
    #[arg(long, allow_negative_numbers = true)]
    pub servings: Option<i64>,
    /// easy, medium or hard
    #[arg(long)]
    pub difficulty: Option<Difficulty>,
    /// 0 to 5
    #[arg(long, allow_negative_numbers = true)]
    pub rating: Option<f64>,
    /// Tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Mark as favorite (true or false)
    #[arg(long)]
    pub favorite: Option<bool>,
    /// Author name
    #[arg(long)]
    pub author: Option<String>,
    /// Author avatar URL
    #[arg(long)]
    pub avatar: Option<String>,
}

impl FormArgs {
    pub fn apply(self, form: &mut RecipeForm) -> Result<()> {
        if let Some(title) = self.title {
            form.title = title;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        add_chips(&mut form.ingredients, &self.ingredients);
        if let Some(instructions) = self.instructions {
            form.instructions = instructions;
        }

        if let Some(url) = self.thumbnail {
            form.set_thumbnail_url(&url);
        }
        if let Some(path) = self.thumbnail_file {
            let data_url = thumbnail_from_file(&path)
                .with_context(|| format!("Failed to embed {}", path.display()))?;
            form.set_thumbnail_data(data_url);
        }

        if self.time_minutes.is_some() {
            form.time_minutes = self.time_minutes;
        }
        if self.servings.is_some() {
            form.servings = self.servings;
        }
        if self.difficulty.is_some() {
            form.difficulty = self.difficulty;
        }
        if self.rating.is_some() {
            form.rating = self.rating;
        }
        add_chips(&mut form.tags, &self.tags);
        if let Some(favorite) = self.favorite {
            form.is_favorite = favorite;
        }
        if let Some(author) = self.author {
            form.author_name = author;
        }
        if let Some(avatar) = self.avatar {
            form.author_avatar = avatar;
        }
        Ok(())
    }
}

/// Removals requested by `edit`, applied before new values are added.
#[derive(Debug, Default)]
pub struct ChipRemovals {
    pub ingredients: Vec<String>,
    pub tags: Vec<String>,
    pub clear_thumbnail: bool,
}

impl ChipRemovals {
    pub fn apply(self, form: &mut RecipeForm) {
        for text in &self.ingredients {
            remove_chip(&mut form.ingredients, text);
        }
        for text in &self.tags {
            remove_chip(&mut form.tags, text);
        }
        if self.clear_thumbnail {
            form.clear_thumbnail();
        }
    }
}

fn add_chips(chips: &mut ChipList, values: &[String]) {
    for value in values {
        if !chips.add(value) {
            tracing::debug!(value = %value, "skipped blank or duplicate entry");
        }
    }
}

fn remove_chip(chips: &mut ChipList, text: &str) {
    let wanted = text.trim().to_lowercase();
    match chips
        .items()
        .iter()
        .position(|item| item.to_lowercase() == wanted)
    {
        Some(index) => {
            chips.remove(index);
        }
        None => tracing::warn!(entry = %text.trim(), "nothing to remove"),
    }
}
