use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

mod output;

use output::ColorMode;

use docsift_core::config_file::{self, ConfigFile};
use docsift_core::{RankingConfig, analyze_collection};
use docsift_embed::FastembedBackend;
use docsift_model::TreeEnsembleClassifier;
use docsift_pdf::{
    ExtractionConfig, ExtractionConfigBuilder, ProgressEvent, extract_document, process_documents,
};
use docsift_pdf_oxide::OxideBackend;

/// Persona-driven document intelligence: rank PDF sections against a task
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a collection directory and write the ranked-section report
    Process {
        /// Collection directory containing the input JSON and a pdfs/ subdirectory
        collection_dir: PathBuf,

        /// Path to the frozen heading-classifier artifact (JSON)
        #[arg(long)]
        model: Option<PathBuf>,

        /// Number of extraction workers
        #[arg(long)]
        workers: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Input file name inside the collection directory
        #[arg(long, default_value = "collection.json")]
        input_name: String,

        /// Output file name inside the collection directory
        #[arg(long, default_value = "analysis.json")]
        output_name: String,
    },

    /// Extract and print detected headings for a single PDF (no ranking)
    Headings {
        /// Path to the PDF file
        pdf_path: PathBuf,

        /// Path to the frozen heading-classifier artifact (JSON)
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Process {
            collection_dir,
            model,
            workers,
            no_color,
            input_name,
            output_name,
        } => {
            process(
                collection_dir,
                model,
                workers,
                no_color,
                input_name,
                output_name,
            )
            .await
        }
        Command::Headings { pdf_path, model } => headings(pdf_path, model),
    }
}

async fn process(
    collection_dir: PathBuf,
    model: Option<PathBuf>,
    workers: Option<usize>,
    no_color: bool,
    input_name: String,
    output_name: String,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let color = ColorMode(!no_color);

    if !collection_dir.is_dir() {
        anyhow::bail!("collection directory not found: {}", collection_dir.display());
    }

    let file_config = config_file::load_config();
    let extraction_config = build_extraction_config(&file_config)?;
    let ranking_config = build_ranking_config(&file_config);
    let num_workers = workers
        .or_else(|| file_config.concurrency.as_ref().and_then(|c| c.num_workers))
        .unwrap_or(4);

    let model_path = resolve_model_path(model)?;
    let classifier = Arc::new(
        TreeEnsembleClassifier::load(&model_path)
            .map_err(|e| anyhow::anyhow!("failed to load classifier {}: {}", model_path.display(), e))?,
    );
    let backend = Arc::new(build_backend(&file_config));
    // Load the embedding model up front so a broken installation fails
    // before any PDF work starts
    let embedder = Arc::new(
        FastembedBackend::new().map_err(|e| anyhow::anyhow!("failed to load embedder: {}", e))?,
    );

    let input = output::load_input(&collection_dir.join(&input_name))?;
    let pdf_dir = collection_dir.join("pdfs");
    let paths: Vec<PathBuf> = input
        .documents
        .iter()
        .map(|d| pdf_dir.join(&d.filename))
        .collect();

    let bar = ProgressBar::new(paths.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let progress_bar = bar.clone();

    let corpus = process_documents(
        &paths,
        backend,
        classifier,
        extraction_config,
        num_workers,
        move |event| match event {
            ProgressEvent::DocumentStarted { document, .. } => {
                progress_bar.set_message(document);
            }
            ProgressEvent::DocumentFinished { .. } => {
                progress_bar.inc(1);
            }
            ProgressEvent::DocumentFailed { document, message, .. } => {
                progress_bar.inc(1);
                progress_bar.println(format!("skipped {document}: {message}"));
            }
        },
    )
    .await;
    bar.finish_and_clear();

    tracing::info!(
        sections = corpus.sections.len(),
        lines = corpus.lines.len(),
        "batch extraction complete"
    );

    // Ranking is CPU-bound in the embedding model; keep it off the runtime
    let task = input.job_to_be_done.task.clone();
    let analysis = {
        let embedder = embedder.clone();
        tokio::task::spawn_blocking(move || {
            analyze_collection(&task, &corpus, embedder.as_ref(), &ranking_config)
        })
        .await??
    };

    let report = output::build_report(&input, analysis);
    let output_path = collection_dir.join(&output_name);
    output::write_report(&output_path, &report)?;

    let mut stdout = std::io::stdout();
    output::print_summary(
        &mut stdout,
        &report,
        input.documents.len(),
        start.elapsed().as_secs_f64(),
        color,
    )?;
    println!("Report written to {}", output_path.display());

    Ok(())
}

fn headings(pdf_path: PathBuf, model: Option<PathBuf>) -> anyhow::Result<()> {
    if !pdf_path.exists() {
        anyhow::bail!("file not found: {}", pdf_path.display());
    }

    let file_config = config_file::load_config();
    let extraction_config = build_extraction_config(&file_config)?;
    let model_path = resolve_model_path(model)?;
    let classifier = TreeEnsembleClassifier::load(&model_path)
        .map_err(|e| anyhow::anyhow!("failed to load classifier {}: {}", model_path.display(), e))?;
    let backend = build_backend(&file_config);

    let extraction = extract_document(&pdf_path, &backend, &classifier, &extraction_config)
        .map_err(|e| anyhow::anyhow!("extraction failed: {}", e))?;

    if extraction.headings.is_empty() {
        println!("No headings detected.");
        return Ok(());
    }

    for heading in &extraction.headings {
        println!("p.{:<4} {}", heading.page_number, heading.section_title);
    }
    println!(
        "\n{} headings across {} retained lines",
        extraction.headings.len(),
        extraction.lines.len()
    );

    Ok(())
}

/// Resolve configuration: CLI flag > env var > error.
fn resolve_model_path(model: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    let path = model
        .or_else(|| std::env::var("DOCSIFT_MODEL").ok().map(PathBuf::from))
        .ok_or_else(|| {
            anyhow::anyhow!("no classifier artifact: pass --model or set DOCSIFT_MODEL")
        })?;
    if !path.exists() {
        anyhow::bail!("classifier artifact not found: {}", path.display());
    }
    Ok(path)
}

fn build_extraction_config(file_config: &ConfigFile) -> anyhow::Result<ExtractionConfig> {
    let mut builder = ExtractionConfigBuilder::new();
    if let Some(extraction) = &file_config.extraction {
        if let Some(threshold) = extraction.font_size_threshold {
            builder = builder.font_size_threshold(threshold);
        }
        if let Some(tolerance) = extraction.merge_size_tolerance {
            builder = builder.merge_size_tolerance(tolerance);
        }
        if let Some(chars) = extraction.min_line_chars {
            builder = builder.min_line_chars(chars);
        }
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))
}

fn build_ranking_config(file_config: &ConfigFile) -> RankingConfig {
    let mut config = RankingConfig::default();
    if let Some(ranking) = &file_config.ranking {
        if let Some(n) = ranking.max_sections {
            config = config.with_max_sections(n);
        }
        if let Some(n) = ranking.max_passages {
            config = config.with_max_passages(n);
        }
        if let Some(floor) = ranking.similarity_floor {
            config = config.with_similarity_floor(floor);
        }
    }
    config
}

fn build_backend(file_config: &ConfigFile) -> OxideBackend {
    let mut backend = OxideBackend::new();
    if let Some(tolerance) = file_config
        .extraction
        .as_ref()
        .and_then(|e| e.centering_tolerance)
    {
        backend = backend.with_centering_tolerance(tolerance);
    }
    backend
}
