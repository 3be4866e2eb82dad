use anyhow::Context;
use ragline::{
    AppState, IndexOptions, RaglineConfig, RetrievalService,
    api::routes::create_router,
    cli::{Cli, Commands, output::Output},
    rag::embeddings,
    utils::toml_config::LogFormat,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = match RaglineConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            output.error(&format!("Invalid configuration: {}", e));
            return Err(e).context("Failed to load configuration");
        }
    };

    init_tracing(&config, cli.verbose);
    if cli.config.exists() {
        tracing::info!("Loaded configuration from {:?}", cli.config);
    } else {
        tracing::warn!("Configuration file {:?} not found, using defaults", cli.config);
    }

    match cli.selected_command() {
        Commands::Serve => serve(config, &output).await,
        Commands::Query { text, top_k } => {
            let top_k = top_k.unwrap_or(config.rag.top_k);
            query(config, text, top_k, &output).await
        }
        Commands::Config { validate } => show_config(&config, &cli, *validate, &output),
    }
}

/// RUST_LOG wins over the configured level; `--verbose` raises it to debug.
fn init_tracing(config: &RaglineConfig, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        config.server.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ragline={level},ragline_server={level},tower_http={level}"
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    match config.server.log_format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn serve(config: RaglineConfig, output: &Output) -> anyhow::Result<()> {
    output.banner();
    output.step(1, 2, "Building retrieval index");

    let addr = config.bind_address();
    let state = AppState::initialize(config).await?;

    if let Some(reason) = state.retrieval.degraded_reason() {
        output.warning(&format!(
            "Retrieval disabled ({}); answers will have no context",
            reason
        ));
    } else {
        output.success(&format!(
            "Indexed {} chunks from {}",
            state.retrieval.chunk_count(),
            state.config.rag.corpus_path.display()
        ));
    }

    output.info(&format!(
        "Generating with {} at {}",
        state.config.generation.model, state.config.generation.base_url
    ));

    output.step(2, 2, "Starting HTTP server");
    let app = create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    output.success(&format!("Listening on http://{}", addr));
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn query(
    config: RaglineConfig,
    text: &str,
    top_k: usize,
    output: &Output,
) -> anyhow::Result<()> {
    let embedder = embeddings::from_config(&config.embeddings)?;
    let retrieval = RetrievalService::initialize(
        &config.rag.corpus_path,
        embedder,
        IndexOptions::from(&config.rag),
    )
    .await;

    if let Some(reason) = retrieval.degraded_reason() {
        output.error(&format!("Retrieval unavailable: {}", reason));
        anyhow::bail!("retrieval unavailable");
    }

    output.header(&format!("Top {} chunks for \"{}\"", top_k, text));
    let hits = retrieval.retrieve(text, top_k).await;
    if hits.is_empty() {
        output.warning("No chunks retrieved");
    }
    for (rank, hit) in hits.iter().enumerate() {
        output.hit(rank + 1, hit.chunk.id, hit.distance, &hit.chunk.text);
    }
    Ok(())
}

fn show_config(
    config: &RaglineConfig,
    cli: &Cli,
    validate: bool,
    output: &Output,
) -> anyhow::Result<()> {
    // Loading already validated; reaching here means the config is usable
    if validate {
        output.success(&format!("{} is valid", cli.config.display()));
        return Ok(());
    }

    if !cli.config.exists() {
        output.warning(&format!(
            "{} not found, showing defaults",
            cli.config.display()
        ));
    }
    output.header("Effective configuration");
    output.kv("bind", &config.bind_address());
    output.kv("corpus", &config.rag.corpus_path.display().to_string());
    output.kv("embedding model", config.embeddings.model());
    output.kv("generation model", &config.generation.model);
    output.raw("");
    output.raw(&config.to_toml_string()?);
    output.hint("Environment variables prefixed with RAGLINE_ override file values");
    Ok(())
}
