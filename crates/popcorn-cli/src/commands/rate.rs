use super::context::AppContext;
use super::show::open_movie;
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use owo_colors::OwoColorize;
use popcorn_core::{AppOptions, PopcornApp};
use serde_json::json;

pub async fn run_rate(id: String, rating: u8, output: &Output) -> Result<()> {
    tracing::debug!(id = %id, rating, "Rate command started");

    let ctx = AppContext::load()?;
    let mut app = PopcornApp::new(
        ctx.lookup()?,
        ctx.watched_store(),
        AppOptions::from(&ctx.config.search),
    );

    open_movie(&mut app, &id, output).await?;

    app.rate(rating)
        .map_err(|e| color_eyre::eyre::eyre!("Invalid rating: {}", e))?;
    let stars = app.rating().render();

    let entry = app.add_to_watched()
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    let summary = app.summary();

    match output.format() {
        OutputFormat::Human => {
            output.success(format!("Added {} ({}) to your watched list", entry.title, entry.year));
            output.println(format!("  Your rating: {} {}/{}", stars.yellow(), entry.user_rating, app.rating().max_stars()));
            output.println(format!("  IMDb rating: {:.1}", entry.imdb_rating));
            output.println(format!("  Runtime: {} min", entry.runtime_minutes));
            output.println(format!("  Movies watched: {}", summary.count));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "success": true,
                "entry": entry,
                "summary": summary,
            }));
        }
    }

    Ok(())
}
