use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::{Path, PathBuf};

use guideline_rs::config::Settings;
use guideline_rs::engine::{summarize_inputs, DecisionEngine, PatientInputs};
use guideline_rs::guideline::{validate, GuidelineDocument, GuidelineLoader, Severity};
use guideline_rs::Guideline;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk a decision tree for a set of patient inputs
    Evaluate {
        /// Path to the guideline file
        #[arg(short, long)]
        guideline: PathBuf,

        /// Inputs as inline JSON or a path to a JSON file
        #[arg(short, long, default_value = "{}")]
        inputs: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the one-line summary of patient inputs
    Summarize {
        #[arg(short, long)]
        guideline: PathBuf,

        #[arg(short, long, default_value = "{}")]
        inputs: String,
    },
    /// Check a guideline for structural problems
    Validate {
        #[arg(short, long)]
        guideline: PathBuf,
    },
    /// Explain a node path reported for a graph/rules guideline
    Explain {
        #[arg(short, long)]
        guideline: PathBuf,

        /// Comma separated node ids
        #[arg(short, long, value_delimiter = ',')]
        path: Vec<String>,
    },
    /// List the guidelines in a directory
    List {
        /// Defaults to GUIDELINES_DIR
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Serve the HTTP API
    Serve {
        /// Defaults to GUIDELINE_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn load_document(path: &Path) -> anyhow::Result<GuidelineDocument> {
    GuidelineLoader::new()
        .load(path)
        .with_context(|| format!("Failed to load guideline {}", path.display()))
}

fn load_legacy(path: &Path) -> anyhow::Result<Guideline> {
    match load_document(path)? {
        GuidelineDocument::Legacy(g) => Ok(g),
        GuidelineDocument::Nice(g) => Err(anyhow!(
            "'{}' is a graph/rules guideline and has no decision tree to evaluate",
            g.guideline_id
        )),
    }
}

fn parse_inputs(raw: &str) -> anyhow::Result<PatientInputs> {
    let trimmed = raw.trim();
    let content = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        std::fs::read_to_string(trimmed)
            .with_context(|| format!("Failed to read inputs file {}", trimmed))?
    };
    serde_json::from_str(&content).context("Inputs must be a JSON object")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::from_env()?;

    match args.command {
        Commands::Evaluate {
            guideline,
            inputs,
            json,
        } => {
            let guideline = load_legacy(&guideline)?;
            let inputs = parse_inputs(&inputs)?;
            let engine = DecisionEngine::with_options(&guideline, settings.engine_options());
            let result = engine.evaluate(&inputs)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", result.action.level.heading());
                println!("{}", result.action.text);
                for note in &result.notes {
                    println!("  * {}", note);
                }
                println!("Path: {}", result.path_display());
            }
        }
        Commands::Summarize { guideline, inputs } => {
            let guideline = load_legacy(&guideline)?;
            let inputs = parse_inputs(&inputs)?;
            println!("{}", summarize_inputs(&guideline, &inputs));
        }
        Commands::Validate { guideline } => match load_document(&guideline)? {
            GuidelineDocument::Legacy(g) => {
                let report = validate(&g);
                for issue in &report.issues {
                    let tag = match issue.severity() {
                        Severity::Error => "error",
                        Severity::Warning => "warning",
                    };
                    println!("{}: {}", tag, issue);
                }
                if !report.is_valid() {
                    bail!("'{}' has {} error(s)", g.guideline_id, report.errors().count());
                }
                println!("'{}' is valid", g.guideline_id);
            }
            GuidelineDocument::Nice(g) => {
                let dangling = g.dangling_edges();
                for edge in &dangling {
                    println!(
                        "warning: edge {} -> {} references an unknown node",
                        edge.from, edge.to
                    );
                }
                println!("'{}' has {} rule(s)", g.guideline_id, g.rules.len());
            }
        },
        Commands::Explain { guideline, path } => {
            let doc = load_document(&guideline)?;
            let nice = doc
                .as_nice()
                .ok_or_else(|| anyhow!("'{}' is not a graph/rules guideline", doc.id()))?;
            for (i, step) in nice.explain_path(&path).iter().enumerate() {
                println!("{}. [{:?}] {}", i + 1, step.node_type, step.text);
                if let Some(label) = &step.edge_label {
                    println!("   -- {} -->", label);
                }
            }
        }
        Commands::List { dir } => {
            let dir = dir.unwrap_or_else(|| settings.guidelines_dir.clone());
            for (path, doc) in GuidelineLoader::new().load_dir(&dir)? {
                println!("{}\t{}\t{}\t{}", doc.id(), doc.format(), doc.name(), path.display());
            }
        }
        Commands::Serve { port } => {
            let mut settings = settings;
            if let Some(port) = port {
                settings.port = port;
            }
            guideline_rs::server::serve(settings).await?;
        }
    }

    Ok(())
}
