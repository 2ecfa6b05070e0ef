use super::context::AppContext;
use super::ui::{header_cell, new_table, LoadingSpinner};
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::Cell;
use popcorn_core::{SearchLifecycle, SearchStatus};
use serde_json::json;

pub async fn run_search(query: String, output: &Output) -> Result<()> {
    tracing::debug!(query = %query, "Search command started");

    let ctx = AppContext::load()?;
    let min_query_length = ctx.config.search.min_query_length;
    let search = SearchLifecycle::with_min_query_length(ctx.lookup()?, min_query_length);

    search.set_query(&query);
    let spinner = LoadingSpinner::start(format!("Searching for \"{}\"...", query), output);
    let state = search.settled().await;
    spinner.finish();

    match state.status() {
        SearchStatus::Idle => {
            output.warn(format!(
                "Type at least {} characters to search",
                min_query_length
            ));
            Ok(())
        }
        SearchStatus::Error | SearchStatus::Loading => {
            let message = state.error.unwrap_or_default();
            Err(color_eyre::eyre::eyre!("{}", message))
        }
        SearchStatus::Success => {
            match output.format() {
                OutputFormat::Human => {
                    if output.is_quiet() {
                        return Ok(());
                    }
                    let mut table = new_table(vec![
                        header_cell("IMDb ID"),
                        header_cell("Title"),
                        header_cell("Year"),
                    ]);
                    for movie in &state.movies {
                        table.add_row(vec![
                            Cell::new(&movie.id),
                            Cell::new(&movie.title),
                            Cell::new(&movie.year),
                        ]);
                    }
                    println!("{}", table);
                    output.info(format!("Found {} results", state.movies.len()));
                }
                OutputFormat::Json | OutputFormat::JsonPretty => {
                    output.json(&json!({
                        "query": state.query,
                        "count": state.movies.len(),
                        "movies": state.movies,
                    }));
                }
            }
            Ok(())
        }
    }
}
