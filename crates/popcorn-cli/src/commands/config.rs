use super::prompts;
use super::ui::{header_cell, is_interactive, new_table};
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Attribute, Cell};
use owo_colors::OwoColorize;
use popcorn_config::{resolve_omdb_api_key, Config, CredentialStore, PathManager, OMDB_API_KEY_ENV};
use serde_json::json;

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output).await,
        crate::ConfigCommands::Omdb { api_key, base_url, timeout_secs } => {
            configure_omdb(api_key, base_url, timeout_secs, output).await
        }
    }
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Defaults are in use. Run 'popcorn config omdb' to create it.");
    }

    let config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store.load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    let api_key = resolve_omdb_api_key(&cred_store);
    let key_source = api_key_source(&cred_store);
    let api_key_display = match &api_key {
        Some(key) if full => key.clone(),
        Some(key) => mask_string(key),
        None => "<not set>".to_string(),
    };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!();
            println!("{}", "Configuration".bright_cyan().bold());
            println!();

            let mut info_table = new_table(vec![
                Cell::new("Config File").add_attribute(Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            info_table.add_row(vec![
                Cell::new("Watched List"),
                Cell::new(path_manager.watched_file().display().to_string()),
            ]);
            info_table.add_row(vec![
                Cell::new("Log File"),
                Cell::new(path_manager.log_file().display().to_string()),
            ]);
            println!("{}", info_table);
            println!();

            let mut omdb_table = new_table(vec![header_cell("OMDb Configuration")]);
            omdb_table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.omdb.base_url)]);
            omdb_table.add_row(vec![
                Cell::new("Timeout"),
                Cell::new(format!("{} seconds", config.omdb.timeout_secs)),
            ]);
            omdb_table.add_row(vec![
                Cell::new("API Key"),
                Cell::new(format!("{} ({})", api_key_display, key_source)),
            ]);
            println!("{}", omdb_table);
            println!();

            let mut search_table = new_table(vec![header_cell("Search Options")]);
            search_table.add_row(vec![
                Cell::new("Minimum Query Length"),
                Cell::new(config.search.min_query_length),
            ]);
            search_table.add_row(vec![Cell::new("Rating Stars"), Cell::new(config.search.stars)]);
            println!("{}", search_table);
            println!();

            if api_key.is_none() {
                output.warn("No OMDb API key configured. Run 'popcorn config omdb' or set OMDB_API_KEY.");
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "watched_file": path_manager.watched_file().display().to_string(),
                "omdb": {
                    "base_url": config.omdb.base_url,
                    "timeout_secs": config.omdb.timeout_secs,
                    "api_key": api_key.as_ref().map(|_| api_key_display.clone()),
                    "api_key_source": key_source,
                },
                "search": {
                    "min_query_length": config.search.min_query_length,
                    "stars": config.search.stars,
                },
            }));
        }
    }

    Ok(())
}

async fn configure_omdb(
    api_key_arg: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager.ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let config_file = path_manager.config_file();
    let mut config = if config_file.exists() {
        Config::load_from_file(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?
    } else {
        output.info("Configuration file not found. Creating default configuration...");
        Config::default()
    };

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    let settings_given = base_url.is_some() || timeout_secs.is_some();
    let api_key = match api_key_arg {
        Some(key) => Some(key.trim().to_string()),
        None if settings_given => None,
        None => prompt_api_key(&cred_store, output)?,
    };

    if let Some(key) = &api_key {
        validate_api_key(key).map_err(|e| color_eyre::eyre::eyre!("Validation error: {}", e))?;
    }

    if let Some(url) = base_url {
        config.omdb.base_url = url.trim().to_string();
    }
    if let Some(secs) = timeout_secs {
        config.omdb.timeout_secs = secs;
    }
    config.validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration: {}", e))?;

    config.save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    if let Some(key) = api_key {
        cred_store.set_omdb_api_key(key);
        cred_store.save()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;
    }

    output.success("OMDb configuration saved!");
    output.println(format!("  Base URL: {}", config.omdb.base_url));
    output.println(format!("  Timeout: {} seconds", config.omdb.timeout_secs));
    if let Some(key) = cred_store.get_omdb_api_key() {
        output.println(format!("  API Key: {}", mask_string(key)));
    }
    if std::env::var(OMDB_API_KEY_ENV).is_ok() {
        output.warn(format!("{} is set and takes precedence over the stored key", OMDB_API_KEY_ENV));
    }

    Ok(())
}

/// Ask for a key, keeping the stored one unless the user wants to replace it
fn prompt_api_key(cred_store: &CredentialStore, output: &Output) -> Result<Option<String>> {
    if !is_interactive() {
        return Err(color_eyre::eyre::eyre!("No API key given. Pass --api-key when not running in a terminal"));
    }

    print_section_header("OMDb API Key Setup", output);
    if let Some(existing) = cred_store.get_omdb_api_key() {
        output.info(format!("An API key is already stored: {}", mask_string(existing)));
        if !prompts::prompt_yes_no("Replace it?", Some(false))? {
            return Ok(None);
        }
    } else {
        output.println("  Get a free key at https://www.omdbapi.com/apikey.aspx");
    }

    loop {
        let input = prompts::prompt_secret("OMDb API Key")?;
        let input = input.trim().to_string();
        match validate_api_key(&input) {
            Ok(()) => return Ok(Some(input)),
            Err(e) => output.error(format!("Validation error: {}", e)),
        }
    }
}

fn api_key_source(cred_store: &CredentialStore) -> &'static str {
    let from_env = std::env::var(OMDB_API_KEY_ENV)
        .map(|key| !key.trim().is_empty())
        .unwrap_or(false);
    if from_env {
        "environment"
    } else if cred_store.get_omdb_api_key().is_some() {
        "credentials file"
    } else {
        "missing"
    }
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

fn validate_api_key(input: &str) -> Result<(), &'static str> {
    if input.is_empty() {
        return Err("API key cannot be empty");
    }
    if !input.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("API key should only contain letters and digits");
    }
    Ok(())
}

fn print_section_header(title: &str, output: &Output) {
    output.println("");
    output.println(format!("{}", title.bold().bright_cyan()));
    output.println(format!("{}", "─".repeat(title.len()).bright_cyan()));
}
