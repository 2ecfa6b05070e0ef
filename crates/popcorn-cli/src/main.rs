use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, rate, search, show, watched};
use popcorn_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "popcorn - Find movies, rate them and keep a list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to the rolling log file instead of stderr
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    #[command(long_about = "Search OMDb for movies whose title matches QUERY. Queries shorter than the configured minimum (3 characters by default) are not sent.")]
    Search {
        /// Title to search for
        query: String,
    },
    /// Show details for a movie
    Show {
        /// IMDb id, e.g. tt0096895
        id: String,
    },
    /// Rate a movie and add it to the watched list
    #[command(long_about = "Fetch the movie's details, rate it and append it to the watched list. The runtime and IMDb rating must be numeric for the movie to be added.")]
    Rate {
        /// IMDb id, e.g. tt0096895
        id: String,

        /// Your rating, from 1 to the configured number of stars
        rating: u8,
    },
    /// List watched movies with average ratings and runtime
    Watched,
    /// View or edit configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Clear stored data
    #[command(long_about = "Clear the watched list or stored credentials. Use --watched to empty the watched list, --credentials to remove the stored API key, or --all to clear both.")]
    Clear {
        /// Clear the watched list and credentials
        #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["watched", "credentials"])]
        all: bool,

        /// Empty the watched list
        #[arg(long, action = ArgAction::SetTrue)]
        watched: bool,

        /// Remove stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure the OMDb connection
    #[command(long_about = "Configure the OMDb API key and connection settings. Get a free key at https://www.omdbapi.com/apikey.aspx. The key is stored in the credentials file; OMDB_API_KEY overrides it.")]
    Omdb {
        /// OMDb API key (if not provided, will prompt)
        #[arg(long)]
        api_key: Option<String>,

        /// Base URL of the OMDb API
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = if cli.log_file {
        Some(PathManager::default().log_file())
    } else {
        None
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(query, &output).await,
        Commands::Show { id } => show::run_show(id, &output).await,
        Commands::Rate { id, rating } => rate::run_rate(id, rating, &output).await,
        Commands::Watched => watched::run_watched(&output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Clear { all, watched, credentials } => clear::run_clear(all, watched, credentials, &output).await,
    }
}
