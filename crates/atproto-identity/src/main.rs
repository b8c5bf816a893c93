//! `atproto-resolve` - look up AT Protocol identities from the command line
//!
//! Configuration comes from the `ATP_*` environment variables read by
//! [`ResolverConfig::from_env`].

use std::process::ExitCode;
use std::sync::Arc;

use atproto_identity::{IdentityResolver, LexiconResolver, ResolverConfig};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Bypass the resolver cache
    #[arg(long)]
    no_cache: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the DID document for a DID or handle
    Identity { actor: String },
    /// Resolve a handle to its DID
    Did { handle: String },
    /// Print the PDS endpoint for a DID or handle
    Pds { actor: String },
    /// Fetch the lexicon schema published for an NSID
    Lexicon { nsid: String },
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("atproto_identity=info,atproto_resolve=info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.json);

    let config = ResolverConfig::from_env();
    info!(
        plc_directory = %config.plc_directory,
        methods = ?config.handle_methods,
        "Starting identity resolution"
    );

    let use_cache = !args.no_cache;
    let resolver = Arc::new(IdentityResolver::from_config(&config));

    let output = match args.command {
        Command::Identity { actor } => resolver
            .resolve_identity(&actor, use_cache)
            .await
            .map(|doc| doc.raw().clone()),
        Command::Did { handle } => resolver
            .handle_to_did(&handle, use_cache)
            .await
            .map(|did| json!({ "handle": handle, "did": did })),
        Command::Pds { actor } => resolver
            .resolve_pds(&actor, use_cache)
            .await
            .map(|pds| json!({ "actor": actor, "pds": pds })),
        Command::Lexicon { nsid } => {
            LexiconResolver::with_system_dns(resolver.clone(), config.timeout)
                .resolve(&nsid)
                .await
        }
    };

    match output {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "Failed to encode output");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!(error = %e, "Resolution failed");
            ExitCode::FAILURE
        }
    }
}
