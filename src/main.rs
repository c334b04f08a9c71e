use std::path::PathBuf;

use clap::Parser;
use clippings::config::{Cli, Config, default_config_path};
use clippings::import::{self, ImportOptions, ImportOutcome};
use clippings::notion::NotionClient;
use clippings::prompt::Prompter;
use clippings::unpack_error;
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to load .env file: {}", e);
            std::process::exit(1);
        }
    }

    init_tracing(args.json);
    tracing::info!("clippings starting");

    // --config wins; otherwise ~/.clippings/config.yaml when it exists
    let config_path = match &args.config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => Some(default_config_path()).filter(|p| p.is_file()),
    };

    let mut cfg = Config::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::error!(error = %unpack_error(&e), path = ?config_path, "failed to load config");
        std::process::exit(1);
    });
    if let Some(dir) = &args.books_dir {
        cfg.books_dir = dir.clone();
    }

    let client = NotionClient::new(&cfg.notion).unwrap_or_else(|e| {
        tracing::error!(error = %unpack_error(&e), "failed to setup notion client");
        std::process::exit(1);
    });

    let options = ImportOptions {
        csv: args.csv.clone(),
        book: args.book.clone(),
        target: args.target(),
        assume_yes: args.yes,
        cache_lookups: args.cache_lookups,
    };

    let mut prompter = Prompter::stdio();
    match import::run(&cfg, &client, &mut prompter, options).await {
        Ok(ImportOutcome::Cancelled) => tracing::info!("import canceled by user"),
        Ok(ImportOutcome::Completed { stats, database_name }) => {
            tracing::info!(
                created = stats.created,
                failed = stats.failed,
                database = %database_name,
                "import complete"
            );
        }
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "import failed");
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}
