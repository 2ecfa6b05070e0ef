use super::context::AppContext;
use crate::output::Output;
use color_eyre::Result;
use popcorn_config::{CredentialStore, PathManager};
use std::fs;

pub async fn run_clear(all: bool, watched: bool, credentials: bool, output: &Output) -> Result<()> {
    if all {
        clear_watched(output)?;
        clear_credentials(&PathManager::default(), output)?;
        output.success("Watched list and credentials cleared");
        return Ok(());
    }

    let mut cleared_anything = false;

    if watched {
        clear_watched(output)?;
        cleared_anything = true;
    }

    if credentials {
        clear_credentials(&PathManager::default(), output)?;
        cleared_anything = true;
    }

    if !cleared_anything {
        output.warn("No clear option specified. Use --watched, --credentials, or --all");
        output.println("\nExample: popcorn clear --watched");
    }

    Ok(())
}

fn clear_watched(output: &Output) -> Result<()> {
    let ctx = AppContext::load()?;
    let watched_file = ctx.path_manager.watched_file();

    if !watched_file.exists() {
        output.info("No watched list found to clear");
        return Ok(());
    }

    let mut store = ctx.watched_store();
    let count = store.len();
    store.clear();
    output.success(format!("Cleared {} movie(s) from {}", count, watched_file.display()));
    Ok(())
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();

    if !credentials_file.exists() {
        output.info("No credentials file found to clear");
        return Ok(());
    }

    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    if cred_store.remove_omdb_api_key().is_none() {
        output.info("No OMDb API key was stored");
    }

    // Keys written by other tools stay put
    if cred_store.is_empty() {
        fs::remove_file(&credentials_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to remove credentials file at {}: {}", credentials_file.display(), e))?;
    } else {
        cred_store.save()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;
    }
    output.success(format!("Cleared credentials: {}", credentials_file.display()));

    Ok(())
}
