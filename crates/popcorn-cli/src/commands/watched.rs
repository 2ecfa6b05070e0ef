use super::context::AppContext;
use super::ui::{header_cell, new_table};
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;
use popcorn_models::{WatchedEntry, WatchedSummary};
use serde_json::json;

pub async fn run_watched(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.watched_store();
    let summary = store.summary();

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if store.is_empty() {
                output.info("Your watched list is empty. Add movies with 'popcorn rate <ID> <RATING>'.");
                return Ok(());
            }
            print_summary(&summary);
            print_entries(store.entries());
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "summary": summary,
                "watched": store.entries(),
            }));
        }
    }

    Ok(())
}

fn print_summary(summary: &WatchedSummary) {
    println!();
    println!("{}", "Movies you watched".bright_cyan().bold());
    println!(
        "#️⃣ {} movies   ⭐️ {:.2}   🌟 {:.2}   ⏳ {:.0} min",
        summary.count, summary.avg_imdb_rating, summary.avg_user_rating, summary.avg_runtime
    );
    println!();
}

fn print_entries(entries: &[WatchedEntry]) {
    let mut table = new_table(vec![
        header_cell("Title"),
        header_cell("Year"),
        header_cell("IMDb"),
        header_cell("Yours"),
        header_cell("Runtime"),
        header_cell("Added"),
    ]);
    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.title),
            Cell::new(&entry.year),
            Cell::new(format!("{:.1}", entry.imdb_rating)),
            Cell::new(entry.user_rating),
            Cell::new(format!("{} min", entry.runtime_minutes)),
            Cell::new(entry.added_at.format("%Y-%m-%d").to_string()),
        ]);
    }
    println!("{}", table);
}
