//! Command implementations for the redic CLI.

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::AppConfig;
use crate::core::{
    with_deadline, DictionaryError, DictionaryService, FindWordsInput, GetWordDefinitionsInput,
};
use crate::database::{get_current_version, Database};
use crate::server::{self, ApiState};

/// Configuration for this invocation: the chosen file plus command line overrides.
pub fn load_config(args: &RedicArgs) -> Result<AppConfig, DictionaryError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    if let Some(database) = &args.database {
        config.database.filename = if database.is_absolute() {
            database.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(database))
                .unwrap_or_else(|_| database.clone())
        };
    }

    Ok(config)
}

/// Execute a CLI command.
pub async fn execute_command(args: &RedicArgs, config: &AppConfig) -> anyhow::Result<()> {
    let path = config.database_path();
    let db = Database::open(&path, &config.database_options())
        .await
        .with_context(|| format!("cannot open database {}", path.display()))?;
    let service = DictionaryService::new(db, config.service_options());

    let result = match &args.command {
        Command::Migrate => migrate(&service, args.output_format).await,
        Command::Load(load) => load_directory(&service, load, config, args.output_format).await,
        Command::Reindex => reindex(&service, config, args.output_format).await,
        Command::Define(define) => define_word(&service, define, config, args.output_format).await,
        Command::Search(search) => search_words(&service, search, config, args.output_format).await,
        Command::Serve(serve) => serve_api(&service, serve, config).await,
    };

    service.database().close().await;
    result
}

async fn migrate(service: &DictionaryService, format: OutputFormat) -> anyhow::Result<()> {
    // Opening the database already applied pending migrations.
    let db = service.database();
    let schema_version = get_current_version(db.pool()).await?;

    output_result(
        &MigrationResult {
            database: db.path().display().to_string(),
            schema_version,
        },
        format,
        &mut io::stdout(),
    )?;
    Ok(())
}

async fn load_directory(
    service: &DictionaryService,
    args: &LoadArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let dir: PathBuf = args
        .dir
        .clone()
        .or_else(|| config.ingestion.source_dir.clone())
        .ok_or_else(|| {
            DictionaryError::Config(
                "no source directory given and ingestion.source_dir is not set".to_string(),
            )
        })?;

    let report = with_deadline(
        "ingest directory",
        config.ingestion_timeout(),
        service.ingest_directory(&dir, !args.no_reindex),
    )
    .await?;

    output_result(&report, format, &mut io::stdout())?;
    Ok(())
}

async fn reindex(
    service: &DictionaryService,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let indexed = with_deadline("index words", config.ingestion_timeout(), service.index_words()).await?;

    output_result(&IndexResult { indexed }, format, &mut io::stdout())?;
    Ok(())
}

async fn define_word(
    service: &DictionaryService,
    args: &DefineArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let input = GetWordDefinitionsInput {
        word: args.word.clone(),
        part_of_speech: args.part_of_speech,
        verbatim: args.verbatim,
    };

    let definitions = with_deadline(
        "get definition",
        config.lookup_timeout(),
        service.get_definition(&input),
    )
    .await?;

    output_result(&definitions, format, &mut io::stdout())?;
    Ok(())
}

async fn search_words(
    service: &DictionaryService,
    args: &SearchArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let input = FindWordsInput {
        description: args.terms.join(" "),
        part_of_speech: args.part_of_speech,
        cursor: args.cursor,
        include_explicit: args.include_explicit,
    };

    let matches = with_deadline(
        "find matching words",
        config.lookup_timeout(),
        service.find_matching_words(&input),
    )
    .await?;

    output_result(&matches, format, &mut io::stdout())?;
    Ok(())
}

async fn serve_api(
    service: &DictionaryService,
    args: &ServeArgs,
    config: &AppConfig,
) -> anyhow::Result<()> {
    let host = args.host.clone().unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let ip: IpAddr = host
        .parse()
        .map_err(|_| DictionaryError::Config(format!("invalid host address: {host}")))?;

    let state = ApiState::new(service.clone(), config.request_timeout())
        .with_index_timeout(config.ingestion_timeout());

    server::serve(SocketAddr::new(ip, port), state, shutdown_signal())
        .await
        .context("dictionary API failed")?;

    info!("dictionary API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c, serving until killed");
        std::future::pending::<()>().await;
    }
}
