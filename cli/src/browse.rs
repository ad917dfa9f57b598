//! Interactive browser: typed text becomes a debounced search, lines
//! starting with `:` are commands.

use std::time::Duration;

use anyhow::Result;
use recipebox_core::{
    CollectionState, ConfirmDialog, ConfirmKind, DialogResponse, RecipeId, RecipeStore, SortKey,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::render;

const HELP: &str = "\
Type to search titles and ingredients. Commands:
  :fav          toggle favorites only
  :sort <key>   newest, title or favorite-first
  :star <id>    toggle a recipe's favorite flag
  :rm <id>      delete a recipe
  :reload       fetch the collection again
  :clear        clear the search
  :q            quit";

#[derive(Debug, PartialEq)]
enum Input {
    Search(String),
    ToggleFavoritesOnly,
    Sort(SortKey),
    Star(RecipeId),
    Remove(RecipeId),
    Reload,
    Clear,
    Help,
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.trim().strip_prefix(':') else {
        return Input::Search(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();

    match (name, arg) {
        ("fav", None) => Input::ToggleFavoritesOnly,
        ("sort", Some(key)) => match key.parse() {
            Ok(sort) => Input::Sort(sort),
            Err(e) => Input::Invalid(e),
        },
        ("star", Some(id)) => Input::Star(RecipeId::from(id)),
        ("rm", Some(id)) => Input::Remove(RecipeId::from(id)),
        ("reload", None) => Input::Reload,
        ("clear", None) => Input::Clear,
        ("help" | "h", None) => Input::Help,
        ("q" | "quit", None) => Input::Quit,
        _ => Input::Invalid(format!("Unknown command :{} (try :help)", command)),
    }
}

pub async fn run<S>(store: &S, debounce: Duration) -> Result<()>
where
    S: RecipeStore + ?Sized,
{
    let mut state = CollectionState::new(debounce);
    if let Err(e) = state.load(store).await {
        render::alert(&format!("Could not load recipes: {}", e));
    }
    println!("{}", HELP);
    render::print_view(&state);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            applied = state.apply_pending_query(), if state.has_pending_query() => {
                if applied {
                    render::print_view(&state);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle(&mut state, store, &mut lines, parse_input(&line)).await? {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Returns false when the user asked to quit.
async fn handle<S, R>(
    state: &mut CollectionState,
    store: &S,
    lines: &mut Lines<R>,
    input: Input,
) -> Result<bool>
where
    S: RecipeStore + ?Sized,
    R: AsyncBufRead + Unpin,
{
    match input {
        Input::Search(text) => {
            // Shown once the debounce settles
            state.set_query(&text);
            return Ok(true);
        }
        Input::ToggleFavoritesOnly => state.set_favorites_only(!state.favorites_only()),
        Input::Sort(sort) => state.set_sort(sort),
        Input::Star(id) => {
            if let Err(e) = state.toggle_favorite(store, &id).await {
                render::alert(&e.to_string());
                return Ok(true);
            }
        }
        Input::Remove(id) => {
            let Some(title) = state.get(&id).map(|r| r.title.clone()) else {
                render::alert(&format!("Recipe {} not found", id));
                return Ok(true);
            };
            let dialog = ConfirmDialog::new(ConfirmKind::Delete)
                .with_message(format!("\"{}\" will be removed permanently.", title));
            println!("{}", dialog.prompt());
            let answer = lines.next_line().await?.unwrap_or_default();
            if ConfirmDialog::response_for_answer(&answer) == DialogResponse::Cancel {
                println!("Cancelled.");
                return Ok(true);
            }
            if let Err(e) = state.delete(store, &id).await {
                render::alert(&e.to_string());
                return Ok(true);
            }
        }
        Input::Reload => {
            if let Err(e) = state.load(store).await {
                render::alert(&format!("Could not load recipes: {}", e));
            }
        }
        Input::Clear => state.set_query_now(""),
        Input::Help => {
            println!("{}", HELP);
            return Ok(true);
        }
        Input::Quit => return Ok(false),
        Input::Invalid(message) => {
            render::alert(&message);
            return Ok(true);
        }
    }
    render::print_view(state);
    Ok(true)
}
