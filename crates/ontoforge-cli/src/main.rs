//! Ontoforge CLI
//!
//! - `run`: stage → OCR → chunk → generate → merge → validate → persist
//! - `review`: retry fragments parked in the review queue
//! - `viz`: render an ontology as an HTML explorer, DOT or JSON
//! - `clear`: overwrite the output with an empty ontology

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use ontoforge_cli::config::{PipelineArgs, PipelineConfig, DEFAULT_BASE_URI, DEFAULT_OUTPUT};
use ontoforge_cli::logging::{init_tracing, DEFAULT_LOG_FILE};
use ontoforge_cli::pipeline::{run_pipeline, Collaborators, RunSummary};
use ontoforge_cli::review_mode::{run_review, ReviewSummary};
use ontoforge_cli::viz::{self, VizFormat, DEFAULT_VIZ_OUTPUT};
use ontoforge_ingest::{LlmOcr, PdftoppmRasterizer};
use ontoforge_llm::{LlmClient, LlmConfig, LoggedClient, ResponseLog};
use ontoforge_storage::{DirReviewQueue, OntologyStore};
use ontoforge_turtle::OntologyGraph;

#[derive(Parser)]
#[command(name = "ontoforge")]
#[command(
    author,
    version,
    about = "Ontoforge: build an OWL ontology (Turtle) from a document corpus"
)]
struct Cli {
    /// Log progress to stderr (honours RUST_LOG)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Silence stderr logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Append-only log file
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over `{data-dir}/raw`.
    Run {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Skip staging of raw/ (reuse images/ and processed/ as they are)
        #[arg(long)]
        skip_raw: bool,

        /// Skip OCR of staged images
        #[arg(long)]
        skip_ocr: bool,

        /// Only retry the review queue (same as `ontoforge review`)
        #[arg(long)]
        review: bool,
    },

    /// Retry every fragment in the review queue against the saved ontology.
    Review {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Visualize an ontology.
    Viz {
        /// Turtle file to render
        input: PathBuf,

        /// Output file
        #[arg(short, long, default_value = DEFAULT_VIZ_OUTPUT)]
        out: PathBuf,

        /// Output format: html, dot or json
        #[arg(long, default_value = "html")]
        format: String,

        /// Page title (HTML only)
        #[arg(long, default_value = "Ontology")]
        title: String,
    },

    /// Overwrite the output ontology with an empty one.
    Clear {
        #[arg(long, env = "ONTOFORGE_OUTPUT", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        #[arg(long, env = "BASE_URI", default_value = DEFAULT_BASE_URI)]
        base_uri: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet, Some(cli.log_file.as_path()));

    if let Err(e) = dispatch(cli.command) {
        tracing::error!(error = %format!("{e:#}"), "ontoforge failed");
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            pipeline,
            skip_raw,
            skip_ocr,
            review,
        } => {
            let config = pipeline.into_config(skip_raw, skip_ocr)?;
            if review {
                cmd_review(&config)
            } else {
                cmd_run(&config)
            }
        }
        Commands::Review { pipeline } => cmd_review(&pipeline.into_config(true, true)?),
        Commands::Viz {
            input,
            out,
            format,
            title,
        } => cmd_viz(&input, &out, VizFormat::parse(&format)?, &title),
        Commands::Clear { output, base_uri } => cmd_clear(&output, &base_uri),
    }
}

type Llm = LoggedClient<Box<dyn LlmClient>>;

fn load_llm_config() -> Result<LlmConfig> {
    let llm_config = LlmConfig::from_env().context("LLM configuration")?;
    tracing::info!(
        backend = ?llm_config.backend,
        model = %llm_config.model,
        base_url = %llm_config.base_url,
        "LLM client configured"
    );
    Ok(llm_config)
}

/// Generation client; every call is appended to the response log.
fn text_client(llm_config: &LlmConfig, config: &PipelineConfig) -> Result<Llm> {
    Ok(LoggedClient::new(
        llm_config.build_client()?,
        ResponseLog::new(&config.response_log),
    ))
}

fn ocr_engine(llm_config: &LlmConfig, config: &PipelineConfig) -> Result<LlmOcr<Llm>> {
    Ok(LlmOcr::new(LoggedClient::new(
        llm_config.build_ocr_client()?,
        ResponseLog::new(&config.response_log),
    )))
}

fn cmd_run(config: &PipelineConfig) -> Result<()> {
    println!(
        "{} {} {} {}",
        "Generating ontology from".green().bold(),
        config.data_dir.display(),
        "→".yellow(),
        config.output.display()
    );
    let llm_config = load_llm_config()?;
    let llm = text_client(&llm_config, config)?;
    let ocr = ocr_engine(&llm_config, config)?;
    let rasterizer = PdftoppmRasterizer::new();
    let review = DirReviewQueue::new(config.review_dir());

    let summary = run_pipeline(
        config,
        &Collaborators {
            llm: &llm,
            ocr: &ocr,
            rasterizer: &rasterizer,
            review: &review,
        },
    )?;
    print_run_summary(&summary);
    println!(
        "{} wrote {} ({} triples)",
        "ok".green().bold(),
        config.output.display(),
        summary.triples
    );
    Ok(())
}

fn cmd_review(config: &PipelineConfig) -> Result<()> {
    println!(
        "{} {}",
        "Reviewing queued fragments in".green().bold(),
        config.review_dir().display()
    );
    let llm = text_client(&load_llm_config()?, config)?;
    let queue = DirReviewQueue::new(config.review_dir());
    let summary = run_review(config, &llm, &queue)?;
    print_review_summary(&summary);
    println!(
        "{} wrote {} ({} triples)",
        "ok".green().bold(),
        config.output.display(),
        summary.triples
    );
    Ok(())
}

fn cmd_viz(input: &Path, out: &Path, format: VizFormat, title: &str) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let graph = OntologyGraph::parse(&text, None)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let viz_graph = viz::extract_viz_graph(&graph);
    let rendered = viz::render(&viz_graph, format, title)?;

    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(out, rendered).with_context(|| format!("failed to write {}", out.display()))?;
    println!(
        "{} {} ({} nodes, {} edges)",
        "wrote".green().bold(),
        out.display().to_string().bold(),
        viz_graph.nodes.len(),
        viz_graph.edges.len()
    );
    Ok(())
}

fn cmd_clear(output: &Path, base_uri: &str) -> Result<()> {
    let mut store = OntologyStore::new(base_uri)?;
    store.clear();
    store.save_to_file(output)?;
    tracing::info!(output = %output.display(), "ontology cleared");
    println!("{} cleared {}", "ok".green().bold(), output.display());
    Ok(())
}

fn print_run_summary(s: &RunSummary) {
    if let Some(staging) = &s.staging {
        println!(
            "  {} pdfs={} pages={} images={} texts={} unsupported={} failed={}",
            "staging".cyan(),
            staging.pdfs,
            staging.pages,
            staging.images,
            staging.texts,
            staging.unsupported,
            staging.failed
        );
    }
    if let Some(ocr) = &s.ocr {
        println!(
            "  {} extracted={} empty={} failed={} unsupported={}",
            "ocr".cyan(),
            ocr.extracted,
            ocr.empty,
            ocr.failed,
            ocr.unsupported
        );
    }
    println!(
        "  {} documents={} chunks={} merged={} repaired={} skipped={}",
        "fragments".cyan(),
        s.documents,
        s.chunks,
        s.merged,
        s.repaired,
        s.skipped
    );
    if s.queued > 0 {
        println!(
            "  {} {} fragment(s) queued for review",
            "review".yellow().bold(),
            s.queued
        );
    }
    let validation = format!("ok={} failed={}", s.validations_ok, s.validations_failed);
    if s.validations_failed > 0 {
        println!("  {} {}", "validation".cyan(), validation.yellow());
    } else {
        println!("  {} {}", "validation".cyan(), validation);
    }
}

fn print_review_summary(s: &ReviewSummary) {
    println!(
        "  {} total={} merged={} remaining={} skipped={}",
        "review".cyan(),
        s.total,
        s.merged,
        s.remaining,
        s.skipped
    );
}
