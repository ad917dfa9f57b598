//! Terminal output for recipes and the collection view.

use recipebox_core::thumbnail::is_data_url;
use recipebox_core::{parse_ingredients, CollectionState, ParsedIngredient, Recipe};

const STAR_COUNT: usize = 5;

/// Rating as filled and empty stars, rounded to the nearest whole star.
pub fn stars(rating: f64) -> String {
    let filled = (rating.round().max(0.0) as usize).min(STAR_COUNT);
    format!("{}{}", "★".repeat(filled), "☆".repeat(STAR_COUNT - filled))
}

/// One-line summary used by `list`, `add`, `edit` and the browser.
pub fn recipe_row(recipe: &Recipe) -> String {
    let id = recipe
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    let marker = if recipe.is_favorite { "♥" } else { " " };

    let mut details = Vec::new();
    if let Some(minutes) = recipe.time_minutes {
        details.push(format!("{} min", minutes));
    }
    if let Some(difficulty) = recipe.difficulty {
        details.push(difficulty.to_string());
    }

    let mut row = format!("{} [{}] {} {}", marker, id, recipe.title, stars(recipe.rating));
    if !details.is_empty() {
        row.push_str(&format!(" ({})", details.join(", ")));
    }
    row
}

pub fn print_view(state: &CollectionState) {
    let view = state.derived_view();
    let options = state.options();

    let mut header = format!("{} recipe(s), sorted by {}", view.len(), options.sort);
    if !options.query.is_empty() {
        header.push_str(&format!(", matching \"{}\"", options.query));
    }
    if options.favorites_only {
        header.push_str(", favorites only");
    }
    println!("{}", header);

    if view.is_empty() {
        println!("  No recipes found.");
        return;
    }
    for recipe in view {
        println!("{}", recipe_row(recipe));
    }
}

pub fn print_detail(recipe: &Recipe) {
    println!("{}", recipe_row(recipe));
    println!();
    println!("{}", recipe.description);

    if let Some(servings) = recipe.servings {
        println!("Serves {}", servings);
    }
    if let Some(author) = &recipe.author {
        println!("By {}", author.name);
    }
    if let Some(thumbnail) = recipe.thumbnail.as_deref().filter(|t| !t.is_empty()) {
        if is_data_url(thumbnail) {
            println!("Thumbnail: embedded image");
        } else {
            println!("Thumbnail: {}", thumbnail);
        }
    }

    println!();
    println!("Ingredients:");
    for ingredient in parse_ingredients(recipe.ingredients.as_slice()) {
        println!("  {:>12}  {}", amount_column(&ingredient), ingredient.name);
    }

    println!();
    println!("Instructions:");
    println!("{}", recipe.instructions);

    if !recipe.tags.is_empty() {
        println!();
        println!("Tags: {}", recipe.tags.join(", "));
    }
}

/// Quantity and unit, blank when the name already carries the whole line.
fn amount_column(ingredient: &ParsedIngredient) -> String {
    if ingredient.name_is_whole_line() {
        return String::new();
    }
    [ingredient.quantity.as_deref(), ingredient.unit.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Errors are shown as a single line on stderr.
pub fn alert(message: &str) {
    eprintln!("! {}", message.lines().next().unwrap_or_default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipebox_core::{parse_ingredient, Difficulty, RecipeId};

    fn recipe() -> Recipe {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Shakshuka",
            "description": "Eggs poached in spiced tomato sauce",
            "ingredients": ["4 eggs"],
            "instructions": "Simmer the sauce, crack in the eggs.",
            "isFavorite": true,
            "rating": 3.6,
            "timeMinutes": 30,
            "difficulty": "easy",
        }))
        .unwrap()
    }

    #[test]
    fn test_stars_round_and_clamp() {
        assert_eq!(stars(0.0), "☆☆☆☆☆");
        assert_eq!(stars(3.6), "★★★★☆");
        assert_eq!(stars(9.0), "★★★★★");
        assert_eq!(stars(-1.0), "☆☆☆☆☆");
    }

    #[test]
    fn test_amount_column() {
        assert_eq!(amount_column(&parse_ingredient("2 cups flour")), "2 cups");
        assert_eq!(amount_column(&parse_ingredient("4 eggs")), "");
        assert_eq!(amount_column(&parse_ingredient("salt to taste")), "");
    }

    #[test]
    fn test_row_shows_favorite_and_details() {
        let row = recipe_row(&recipe());
        assert_eq!(row, "♥ [7] Shakshuka ★★★★☆ (30 min, Easy)");
    }

    #[test]
    fn test_row_without_id_or_details() {
        let mut recipe = recipe();
        recipe.id = None;
        recipe.is_favorite = false;
        recipe.time_minutes = None;
        recipe.difficulty = None;
        assert_eq!(recipe_row(&recipe), "  [-] Shakshuka ★★★★☆");

        recipe.id = Some(RecipeId::from("ab12"));
        recipe.difficulty = Some(Difficulty::Hard);
        assert_eq!(recipe_row(&recipe), "  [ab12] Shakshuka ★★★★☆ (Hard)");
    }
}
