mod browse;
mod form_args;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipebox_core::{
    CollectionState, ConfirmDialog, ConfirmKind, DialogResponse, FormError, HttpRecipeStore,
    RecipeForm, RecipeId, RecipeStore, SortKey, StoreConfig,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use form_args::FormArgs;

#[derive(Parser)]
#[command(name = "recipebox")]
#[command(about = "Browse and manage a recipe collection", long_about = None)]
struct Cli {
    /// Recipe API base URL (default: RECIPEBOX_API_URL or http://localhost:3000)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List recipes
    List {
        /// Search titles and ingredients
        #[arg(long, short)]
        query: Option<String>,
        /// Only show favorites
        #[arg(long)]
        favorites: bool,
        /// Sort order: newest, title or favorite-first
        #[arg(long, default_value = "newest")]
        sort: SortKey,
        /// Let the server do the search instead of filtering locally
        #[arg(long)]
        remote: bool,
    },
    /// Show a single recipe with parsed ingredients
    Show { id: RecipeId },
    /// Add a new recipe
    Add {
        #[command(flatten)]
        form: FormArgs,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Edit an existing recipe
    Edit {
        id: RecipeId,
        #[command(flatten)]
        form: FormArgs,
        /// Remove an ingredient (repeatable)
        #[arg(long = "remove-ingredient")]
        remove_ingredients: Vec<String>,
        /// Remove a tag (repeatable)
        #[arg(long = "remove-tag")]
        remove_tags: Vec<String>,
        /// Drop the current thumbnail
        #[arg(long)]
        clear_thumbnail: bool,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Toggle a recipe's favorite flag
    Favorite { id: RecipeId },
    /// Delete a recipe
    Delete {
        id: RecipeId,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Interactive browser with live search
    Browse,
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = StoreConfig::from_env().context("Invalid configuration")?;
    if let Some(server) = cli.server {
        config.api_url = server;
    }
    let store = HttpRecipeStore::new(&config).context("Failed to create HTTP client")?;

    let result = match cli.command {
        Commands::List {
            query,
            favorites,
            sort,
            remote,
        } => list(&store, &config, query, favorites, sort, remote).await,
        Commands::Show { id } => show(&store, &id).await,
        Commands::Add { form, yes } => add(&store, form, yes).await,
        Commands::Edit {
            id,
            form,
            remove_ingredients,
            remove_tags,
            clear_thumbnail,
            yes,
        } => {
            let edits = form_args::ChipRemovals {
                ingredients: remove_ingredients,
                tags: remove_tags,
                clear_thumbnail,
            };
            edit(&store, &id, form, edits, yes).await
        }
        Commands::Favorite { id } => favorite(&store, &config, &id).await,
        Commands::Delete { id, yes } => delete(&store, &config, &id, yes).await,
        Commands::Browse => browse::run(&store, config.debounce).await,
    };

    if let Err(e) = result {
        render::alert(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

async fn list(
    store: &HttpRecipeStore,
    config: &StoreConfig,
    query: Option<String>,
    favorites: bool,
    sort: SortKey,
    remote: bool,
) -> Result<()> {
    let mut state = CollectionState::new(config.debounce);
    state.set_query_now(query.as_deref().unwrap_or(""));
    state.set_favorites_only(favorites);
    state.set_sort(sort);

    if remote {
        state.load_filtered(store).await?;
    } else {
        state.load(store).await?;
    }

    render::print_view(&state);
    Ok(())
}

async fn show(store: &HttpRecipeStore, id: &RecipeId) -> Result<()> {
    let recipe = store.get(id).await?;
    render::print_detail(&recipe);
    Ok(())
}

async fn add(store: &HttpRecipeStore, args: FormArgs, yes: bool) -> Result<()> {
    let mut form = RecipeForm::new();
    args.apply(&mut form)?;

    let payload = match form.create_payload(chrono::Utc::now()) {
        Ok(payload) => payload,
        Err(e) => return Err(report_invalid(e)),
    };

    let dialog = ConfirmDialog::new(ConfirmKind::Save)
        .with_message(format!("Add \"{}\" to your recipes?", payload.title));
    if !confirm(&dialog, yes).await? {
        println!("Cancelled.");
        return Ok(());
    }

    let created = store.create(&payload).await?;
    tracing::info!(id = ?created.id, "created recipe");
    println!("{}", render::recipe_row(&created));
    Ok(())
}

async fn edit(
    store: &HttpRecipeStore,
    id: &RecipeId,
    args: FormArgs,
    removals: form_args::ChipRemovals,
    yes: bool,
) -> Result<()> {
    let current = store.get(id).await?;
    let mut form = RecipeForm::from_recipe(&current);
    removals.apply(&mut form);
    args.apply(&mut form)?;

    let patch = match form.update_patch() {
        Ok(patch) => patch,
        Err(e) => return Err(report_invalid(e)),
    };

    let dialog = ConfirmDialog::new(ConfirmKind::Save);
    if !confirm(&dialog, yes).await? {
        println!("Cancelled.");
        return Ok(());
    }

    let updated = store.update(id, &patch).await?;
    println!("{}", render::recipe_row(&updated));
    Ok(())
}

async fn favorite(store: &HttpRecipeStore, config: &StoreConfig, id: &RecipeId) -> Result<()> {
    let mut state = CollectionState::new(config.debounce);
    state.load(store).await?;
    let updated = state.toggle_favorite(store, id).await?;
    println!("{}", render::recipe_row(&updated));
    Ok(())
}

async fn delete(
    store: &HttpRecipeStore,
    config: &StoreConfig,
    id: &RecipeId,
    yes: bool,
) -> Result<()> {
    let mut state = CollectionState::new(config.debounce);
    state.load(store).await?;

    let title = state
        .get(id)
        .map(|r| r.title.clone())
        .with_context(|| format!("Recipe {} not found", id))?;

    let dialog = ConfirmDialog::new(ConfirmKind::Delete)
        .with_message(format!("\"{}\" will be removed permanently.", title));
    if !confirm(&dialog, yes).await? {
        println!("Cancelled.");
        return Ok(());
    }

    state.delete(store, id).await?;
    println!("Deleted \"{}\".", title);
    Ok(())
}

/// Print each field problem, then fail with the summary.
fn report_invalid(err: FormError) -> anyhow::Error {
    let FormError::Invalid(violations) = &err;
    for violation in violations {
        eprintln!("  - {}", violation);
    }
    err.into()
}

async fn confirm(dialog: &ConfirmDialog, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }

    let mut stdout = tokio::io::stdout();
    stdout.write_all(dialog.prompt().as_bytes()).await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(ConfirmDialog::response_for_answer(&answer) == DialogResponse::Confirm)
}
