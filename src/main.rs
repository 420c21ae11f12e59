//! SentiFlow - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use sentiflow::{
    cli::{Args, Commands},
    config::Config,
    logging,
    providers::{ElasticClient, Providers},
    rag::HybridRetriever,
    repl::{DisplayManager, ReplSession},
    service::SupportService,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = args.verbosity();
    logging::init(verbosity);

    let display = DisplayManager::new(verbosity.show_progress(), verbosity.show_details());

    match args.command() {
        Commands::Config { init } => show_config(&args, init),
        Commands::Chat => run_chat(&args, display).await,
        Commands::Ask {
            message,
            k,
            no_retrieval,
        } => run_ask(&args, &display, &message, k, !no_retrieval).await,
        Commands::Sentiment { text, json } => run_sentiment(&args, &display, &text, json).await,
        Commands::Search { query, k, category } => {
            run_search(&args, &display, &query, k, category.as_deref()).await
        }
        Commands::Status => run_status(&args, &display).await,
    }
}

fn load_config(args: &Args) -> Result<Config> {
    Config::load(args.config.clone()).context("Failed to load configuration")
}

/// Load configuration and build providers, reporting missing credentials up front
fn connect(args: &Args) -> Result<(Config, Providers)> {
    let config = load_config(args)?;

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        anyhow::bail!(
            "Missing credentials: {}. Set them in the environment or in {}",
            missing.join(", "),
            config_location(args)
        );
    }

    let providers = Providers::from_config(&config).context("Failed to initialize providers")?;
    Ok((config, providers))
}

async fn run_chat(args: &Args, display: DisplayManager) -> Result<()> {
    let (config, providers) = connect(args)?;
    let service = SupportService::new(&providers, &config);

    let model = config
        .generation
        .primary_model
        .clone()
        .unwrap_or_else(|| "default".to_string());
    display.show_banner(env!("CARGO_PKG_VERSION"), &model, &config.elastic.index);

    let history_path = dirs::home_dir().map(|home| home.join(".sentiflow_history"));
    let mut repl = ReplSession::new(service, display, history_path).await?;
    repl.run().await
}

async fn run_ask(
    args: &Args,
    display: &DisplayManager,
    message: &str,
    k: Option<usize>,
    retrieve: bool,
) -> Result<()> {
    let (config, providers) = connect(args)?;
    let service = SupportService::new(&providers, &config);
    let k = k.unwrap_or(config.retrieval.k);

    let conversation = service.open_conversation().await;
    let spinner = display.spinner("Thinking...");
    let reply = service.chat_with(&conversation, message, retrieve, k).await;
    spinner.finish_and_clear();

    let reply = match reply {
        Ok(reply) => reply,
        Err(e) if e.is_retryable_by_user() => {
            return Err(e).context("Could not generate a reply, please try again");
        }
        Err(e) => return Err(e.into()),
    };
    display.show_reply(&reply);
    Ok(())
}

async fn run_sentiment(args: &Args, display: &DisplayManager, text: &str, json: bool) -> Result<()> {
    let (config, providers) = connect(args)?;
    let service = SupportService::new(&providers, &config);

    let spinner = display.spinner("Analyzing sentiment...");
    let verdict = service.analyze_sentiment(text).await;
    spinner.finish_and_clear();
    let verdict = verdict?;

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        display.show_verdict(&verdict);
    }
    Ok(())
}

async fn run_search(
    args: &Args,
    display: &DisplayManager,
    query: &str,
    k: usize,
    category: Option<&str>,
) -> Result<()> {
    let (config, providers) = connect(args)?;
    let orchestrator = sentiflow::GenerationOrchestrator::new(&providers, &config);
    let retriever: &HybridRetriever = orchestrator.retriever();

    let spinner = display.spinner("Searching knowledge base...");
    let documents = retriever.retrieve_with_filter(query, category, k).await;
    spinner.finish_and_clear();

    display.show_documents(&documents.context("Search failed")?);
    Ok(())
}

async fn run_status(args: &Args, display: &DisplayManager) -> Result<()> {
    let config = load_config(args)?;
    let client = ElasticClient::new(&config.elastic).context("Search cluster is not configured")?;

    println!("\n{}", "SentiFlow Status".bold());
    println!("─────────────────────────────────────");
    println!("Endpoint: {}", client.endpoint());
    println!("Index:    {}", client.index());

    match client.ping().await {
        Ok(true) => display.show_success("Search cluster reachable"),
        Ok(false) => {
            display.show_error("Search cluster did not respond");
            std::process::exit(1);
        }
        Err(e) => {
            display.show_error(&format!("Search cluster unreachable: {}", e));
            std::process::exit(1);
        }
    }

    match client.document_count().await {
        Ok(count) => display.show_info(&format!("{} documents indexed", count)),
        Err(e) => display.show_warning(&format!("Could not count documents: {}", e)),
    }

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        display.show_warning(&format!("Missing credentials: {}", missing.join(", ")));
    }
    println!();
    Ok(())
}

fn show_config(args: &Args, init: bool) -> Result<()> {
    if init {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => Config::default_path().context("Could not determine home directory")?,
        };
        if path.exists() {
            anyhow::bail!("Configuration already exists at {}", path.display());
        }
        Config::default().save(&path)?;
        println!("{} Wrote default configuration to {}", "✓".green(), path.display());
        return Ok(());
    }

    let config = load_config(args)?;
    let generation = &config.generation;

    println!("\n{}", "SentiFlow Configuration".bold());
    println!("─────────────────────────────────────");
    println!("File: {}\n", config_location(args));

    println!("Generation:");
    println!("  Provider:        {:?}", generation.provider);
    println!("  Primary model:   {}", generation.primary_model.as_deref().unwrap_or("(unset)"));
    println!("  Fallbacks:       {}", generation.fallback_models.join(", "));
    println!("  Attempts/model:  {}", generation.max_attempts);
    println!("  Backoff step:    {}ms", generation.backoff_step_ms);
    println!();

    println!("Retrieval:");
    println!("  Index:           {}", config.elastic.index);
    println!("  k:               {}", config.retrieval.k);
    println!(
        "  Weights:         semantic {:.2} / keyword {:.2}",
        config.retrieval.semantic_weight, config.retrieval.keyword_weight
    );
    println!("  Embedding model: {}", config.embedding.model);
    println!();

    let missing = config.missing_credentials();
    if missing.is_empty() {
        println!("Credentials:       {}", "complete".green());
    } else {
        println!("Credentials:       {} {}", "missing".yellow(), missing.join(", "));
    }
    println!("Verbosity:         {}", args.verbosity().as_str());
    println!();

    Ok(())
}

fn config_location(args: &Args) -> String {
    args.config
        .clone()
        .or_else(Config::default_path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string())
}
