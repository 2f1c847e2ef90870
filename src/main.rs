//! sqlgate - a safety-gated SQL and natural-language query engine.
//!
//! The binary is a thin headless caller around the library: it parses
//! arguments, wires the pipeline together, runs one query, and prints the
//! result envelope as JSON on stdout.

mod cli;

use anyhow::{bail, Context};
use cli::Cli;
use sqlgate::config::{Config, ConnectionConfig};
use sqlgate::db;
use sqlgate::query::{QueryExecutor, QueryRouter, ResultEnvelope};
use sqlgate::safety::SqlValidator;
use sqlgate::translate;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    sqlgate::logging::init();

    match run().await {
        Ok(envelope) => {
            // The envelope itself reports failures; exit codes mirror the
            // success flag so scripts can branch without parsing JSON.
            if envelope.success {
                std::process::exit(0);
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("{e:#}");
            std::process::exit(2);
        }
    }
}

async fn run() -> anyhow::Result<ResultEnvelope> {
    let cli = Cli::parse_args();

    let Some(query) = cli.query.clone() else {
        bail!("no query given; see --help for usage");
    };

    let config_path = cli.config_path();
    let mut config =
        Config::load_from_file(&config_path).context("failed to load configuration")?;

    if let Some(strategy) = &cli.strategy {
        config.translator.strategy = strategy.clone();
    }

    // Connection precedence: CLI arguments, then DATABASE_URL, then the
    // config file, with PG* environment variables filling any gaps. Pool
    // bounds always come from the config file.
    let mut connection = config.database.clone();
    match cli.to_connection_config()? {
        Some(conn) => connection.merge(&conn),
        None => {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                connection.merge(&ConnectionConfig::from_connection_string(&url)?);
            }
        }
    }
    connection.apply_env_defaults();

    info!("Connecting to {}", connection.display_string());
    let db = db::connect(&connection)
        .await
        .context("failed to connect to database")?;

    let validator = SqlValidator::new()?;
    let executor = QueryExecutor::new(db.clone(), validator);
    let translator = translate::from_config(&config).context("failed to build translator")?;
    let router = QueryRouter::new(executor, translator);

    let envelope = if cli.nl {
        router.execute_nlp(&query, None).await
    } else {
        let params = cli.parse_params().map_err(anyhow::Error::msg)?;
        router.execute_sql(&query, params.as_ref()).await
    };

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    }
    .context("failed to serialize result envelope")?;
    println!("{rendered}");

    db.close().await.ok();

    Ok(envelope)
}
