pub mod collection;
pub mod config;
pub mod debounce;
pub mod dialog;
pub mod error;
pub mod form;
pub mod ingredient_parser;
pub mod store;
pub mod thumbnail;
pub mod types;

pub use collection::{derive_view, CollectionState, LoadState, SortKey, ViewOptions};
pub use config::StoreConfig;
pub use debounce::Debouncer;
pub use dialog::{ConfirmDialog, ConfirmKind, DialogResponse};
pub use error::{ConfigError, FormError, StoreError, ThumbnailError};
pub use form::{ChipList, FieldViolation, FormField, RecipeForm, ViolationKind};
pub use ingredient_parser::{parse_ingredient, parse_ingredients, ParsedIngredient};
pub use store::{HttpRecipeStore, HttpRecipeStoreBuilder, MockOperation, MockRecipeStore, RecipeStore};
pub use types::{Author, Difficulty, ListFilter, Recipe, RecipeId, RecipePatch};
