//! CLI entry point for the trellis-wire graph synchronizer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::{fmt, EnvFilter};

use trellis_core::config::{StoreBackend, StoreSettings};
use trellis_core::{Item, QuadParam, Relationship, TrellisConfig};
use trellis_graph::{GraphConfig, Neo4jGraph};
use trellis_store::{DocumentStore, FileDocumentStore, InMemoryDocumentStore};

use trellis_wire::{DocumentPatternSource, FilePatternSource, PatternSource, Wire};

#[derive(Parser)]
#[command(name = "trellis-wire")]
#[command(about = "Relationship graph synchronizer for Trellis")]
struct Cli {
    /// Config file prefix (default: trellis).
    #[arg(short, long, default_value = "trellis")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Infer relationships for each item in a JSON array and write them to the graph.
    Ingest {
        #[arg(long)]
        items: PathBuf,
    },
    /// Remove the quads described by a JSON array of {subject, predicate, object}.
    Remove {
        #[arg(long)]
        quads: PathBuf,
    },
    /// Manage relationships.
    #[command(subcommand)]
    Relationship(RelationshipCommand),
    /// Inspect and run views.
    #[command(subcommand)]
    View(ViewCommand),
    /// Manage patterns kept in the document store.
    #[command(subcommand)]
    Pattern(PatternCommand),
    /// List nodes reached from a node along one predicate.
    Traverse {
        #[arg(long)]
        from: String,
        #[arg(long)]
        predicate: String,
    },
}

#[derive(Subcommand)]
enum RelationshipCommand {
    Add {
        #[arg(long)]
        predicate: String,
        /// Use this identifier instead of generating one.
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Remove {
        #[arg(long)]
        id: String,
    },
    List,
}

#[derive(Subcommand)]
enum ViewCommand {
    List,
    /// Execute a view by name from a starting node.
    Run {
        #[arg(long)]
        name: String,
        #[arg(long)]
        from: String,
    },
}

#[derive(Subcommand)]
enum PatternCommand {
    /// Save the pattern, or array of patterns, in a JSON file.
    Put {
        #[arg(long)]
        file: PathBuf,
    },
    Remove {
        #[arg(long)]
        name: String,
    },
    /// Print the active patterns.
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let config = TrellisConfig::load(&cli.config)?;

    let store = open_store(&config.store)?;
    let patterns: Arc<dyn PatternSource> = match &config.patterns.path {
        Some(path) => Arc::new(FilePatternSource::new(path)),
        None => Arc::new(DocumentPatternSource::new(store.clone())),
    };

    // Pattern maintenance never touches the graph.
    if let Command::Pattern(cmd) = &cli.command {
        return run_pattern(cmd, store, patterns.as_ref(), config.patterns.path.as_deref());
    }

    let graph = Neo4jGraph::connect(&GraphConfig::from(config.neo4j.clone())).await?;
    graph.ensure_schema().await?;

    let wire = Wire::new(store, Arc::new(graph), patterns).with_catalog_settings(&config.catalog);

    match cli.command {
        Command::Ingest { items } => {
            let items: Vec<Item> = read_json(&items)?;
            let mut failed = 0;
            for item in &items {
                if let Err(e) = wire.add_to_graph(item).await {
                    tracing::error!(item_id = %item.id, error = %e, "Item not fully applied");
                    failed += 1;
                }
            }
            tracing::info!(items = items.len(), failed, "Ingest complete");
            if failed > 0 {
                anyhow::bail!("{failed} of {} items failed to apply", items.len());
            }
        }
        Command::Remove { quads } => {
            let params: Vec<QuadParam> = read_json(&quads)?;
            let removed = wire.remove_from_graph(&params).await?;
            tracing::info!(removed, "Remove complete");
        }
        Command::Relationship(RelationshipCommand::Add {
            predicate,
            id,
            description,
        }) => {
            let mut rel = Relationship::new(predicate);
            rel.id = id.unwrap_or_default();
            rel.description = description;
            println!("{}", wire.add_relationship(rel)?);
        }
        Command::Relationship(RelationshipCommand::Remove { id }) => {
            wire.remove_relationship(&id)?;
        }
        Command::Relationship(RelationshipCommand::List) => {
            let rels = wire.catalog().relationships()?;
            println!("{}", serde_json::to_string_pretty(&rels)?);
        }
        Command::View(ViewCommand::List) => {
            let views = wire.catalog().views()?;
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        Command::View(ViewCommand::Run { name, from }) => {
            let nodes = wire.execute_view(&name, &from).await?.collect().await?;
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
        Command::Traverse { from, predicate } => {
            let nodes = wire.traverse(&from, &predicate).await?.collect().await?;
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
        // Handled before connecting.
        Command::Pattern(_) => {}
    }

    Ok(())
}

fn run_pattern(
    cmd: &PatternCommand,
    store: Arc<dyn DocumentStore>,
    active: &dyn PatternSource,
    patterns_path: Option<&str>,
) -> anyhow::Result<()> {
    if let PatternCommand::List = cmd {
        println!("{}", serde_json::to_string_pretty(&active.patterns()?)?);
        return Ok(());
    }
    if let Some(path) = patterns_path {
        anyhow::bail!("patterns are read from {path}; edit that file or unset patterns.path");
    }

    let source = DocumentPatternSource::new(store);
    match cmd {
        PatternCommand::Put { file } => {
            let saved = source.import(file)?;
            tracing::info!(saved, "Patterns saved");
        }
        PatternCommand::Remove { name } => source.remove(name)?,
        PatternCommand::List => {}
    }
    Ok(())
}

fn open_store(settings: &StoreSettings) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match settings.backend {
        StoreBackend::Memory => Arc::new(InMemoryDocumentStore::new()),
        StoreBackend::File => Arc::new(FileDocumentStore::new(&settings.root)?),
    };
    tracing::info!(backend = ?settings.backend, root = %settings.root, "Document store opened");
    Ok(store)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&json)?)
}
