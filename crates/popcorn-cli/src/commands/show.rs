use super::context::AppContext;
use super::ui::{header_cell, new_table, LoadingSpinner};
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;
use popcorn_core::{AppOptions, DetailState, PopcornApp};
use popcorn_models::MovieDetail;
use serde_json::json;

pub async fn run_show(id: String, output: &Output) -> Result<()> {
    tracing::debug!(id = %id, "Show command started");

    let ctx = AppContext::load()?;
    let mut app = PopcornApp::new(
        ctx.lookup()?,
        ctx.watched_store(),
        AppOptions::from(&ctx.config.search),
    );

    let movie = open_movie(&mut app, &id, output).await?;

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            print_detail(&app.window_title(), &movie);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({ "movie": movie }));
        }
    }

    Ok(())
}

/// Open `id` in the session and wait for its details
pub(crate) async fn open_movie(app: &mut PopcornApp, id: &str, output: &Output) -> Result<MovieDetail> {
    app.select_movie(id);
    let spinner = LoadingSpinner::start(format!("Loading {}...", id), output);
    let state = app.detail().settled().await;
    spinner.finish();
    app.sync_title();

    detail_or_error(state)
}

fn detail_or_error(state: DetailState) -> Result<MovieDetail> {
    match (state.movie, state.error) {
        (Some(movie), _) => Ok(movie),
        (None, Some(message)) => Err(color_eyre::eyre::eyre!("{}", message)),
        (None, None) => Err(color_eyre::eyre::eyre!("No movie was loaded")),
    }
}

fn print_detail(heading: &str, movie: &MovieDetail) {
    println!();
    println!("{} ({})", heading.bright_cyan().bold(), movie.year);
    println!();

    let mut table = new_table(vec![header_cell("Field"), header_cell("Value")]);
    let rows = [
        ("IMDb ID", movie.id.as_str()),
        ("Released", movie.release_date.as_str()),
        ("Runtime", movie.runtime.as_str()),
        ("Genre", movie.genre.as_str()),
        ("Director", movie.director.as_str()),
        ("Actors", movie.actors.as_str()),
        ("Poster", movie.poster_url.as_str()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    let imdb_rating = movie
        .imdb_rating
        .map(|rating| format!("⭐ {:.1}", rating))
        .unwrap_or_else(|| "N/A".to_string());
    table.add_row(vec![Cell::new("IMDb rating"), Cell::new(imdb_rating)]);
    println!("{}", table);

    if !movie.plot.is_empty() {
        println!();
        println!("{}", movie.plot.italic());
    }
    println!();
}
