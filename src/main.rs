mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use meme_scout::analysis::Collaborators;
use meme_scout::config::ScoutConfig;
use meme_scout::dispatch::{dispatch, function_specs, CallEnvelope};
use meme_scout::providers::{
    ChainMetadataProvider, DexScreenerProvider, FileChainProvider, FileMemeFeed, FileSocialProvider,
    MarketDataProvider, SolanaRpcProvider, StaticMarketProvider,
};
use meme_scout::store::AuditStore;
use meme_scout::Analyzer;

const DEFAULT_LOG_FILTER: &str = "meme_scout=info,tower_http=info";

#[derive(Parser)]
#[command(name = "meme-scout", about = "Solana memecoin scoring service")]
struct Cli {
    /// Path to a TOML config file (defaults to SCOUT_CONFIG_PATH or config/scout.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP dispatch server.
    Serve(ServeArgs),
    /// Invoke one function and print its JSON result.
    Call(CallArgs),
    /// List the callable functions.
    Functions,
    /// Write the effective configuration to a TOML file.
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    /// Read chain facts from the tokens file and skip market lookups.
    #[arg(long)]
    offline: bool,
}

#[derive(Args, Debug, Clone)]
struct CallArgs {
    name: String,
    /// JSON object with the function parameters.
    #[arg(long, default_value = "{}")]
    params: String,
    /// Read chain facts from the tokens file and skip market lookups.
    #[arg(long)]
    offline: bool,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/scout.toml")]
    path: PathBuf,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, loaded_from) = ScoutConfig::load(cli.config).map_err(|err| err.to_string())?;
    if let Some(path) = loaded_from.as_ref().filter(|path| path.exists()) {
        info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Serve(args) => run_serve(config, args).await,
        Command::Call(args) => run_call(config, args).await,
        Command::Functions => {
            run_functions();
            Ok(())
        }
        Command::InitConfig(args) => {
            config.write(&args.path).map_err(|err| err.to_string())?;
            println!("Wrote config to {}", args.path.display());
            Ok(())
        }
    }
}

async fn run_serve(config: ScoutConfig, args: ServeArgs) -> Result<(), String> {
    let analyzer = build_analyzer(&config, args.offline).await?;
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    server::serve(analyzer, &host, port).await
}

async fn run_call(config: ScoutConfig, args: CallArgs) -> Result<(), String> {
    let parameters: Value = serde_json::from_str(&args.params)
        .map_err(|err| format!("--params is not valid JSON: {}", err))?;
    let analyzer = build_analyzer(&config, args.offline).await?;
    let envelope = CallEnvelope {
        name: args.name,
        parameters,
    };

    let result = dispatch(&analyzer, envelope)
        .await
        .map_err(|err| err.to_string())?;
    let rendered = serde_json::to_string_pretty(&result)
        .map_err(|err| format!("failed to render result: {}", err))?;
    println!("{}", rendered);
    Ok(())
}

fn run_functions() {
    for spec in function_specs() {
        println!("{:<26} {}", spec.name, spec.description);
    }
}

async fn build_analyzer(config: &ScoutConfig, offline: bool) -> Result<Arc<Analyzer>, String> {
    let (chain, market): (Arc<dyn ChainMetadataProvider>, Arc<dyn MarketDataProvider>) = if offline {
        info!(tokens = %config.providers.tokens_path.display(), "offline mode: chain facts from file, market lookups disabled");
        (
            Arc::new(FileChainProvider::new(config.providers.tokens_path.clone())),
            Arc::new(StaticMarketProvider::default()),
        )
    } else {
        (
            Arc::new(SolanaRpcProvider::from_config(config)?),
            Arc::new(DexScreenerProvider::from_config(config)?),
        )
    };

    let store = AuditStore::load(config.store.path.clone(), config.store.max_records_per_kind)
        .await
        .map_err(|err| err.to_string())?;

    let collaborators = Collaborators {
        chain,
        market,
        social: Arc::new(FileSocialProvider::new(config.providers.social_fixture_path.clone())),
        memes: Arc::new(FileMemeFeed::new(config.providers.memes_path.clone())),
        sink: Arc::new(store),
    };
    Ok(Arc::new(Analyzer::new(collaborators, config.correlation.clone())))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
