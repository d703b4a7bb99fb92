use anyhow::{Context, Result};
use clap::Parser;
use segscope::config::{DEFAULT_ID_FIELD, DEFAULT_LIMIT};
use segscope::inspect::{JsonRenderer, TextRenderer};
use segscope::{run_inspection, BatchSummary, InspectConfig, OutputFormat, Renderer};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "segscope")]
#[command(about = "Browse the documents of a segment index", long_about = None)]
struct Args {
    /// Path to the index directory
    index_path: PathBuf,

    /// Maximum number of documents to display
    #[arg(long, env = "SEGSCOPE_LIMIT", default_value_t = DEFAULT_LIMIT, allow_negative_numbers = true)]
    limit: i64,

    /// First ordinal to display (range mode only)
    #[arg(long, env = "SEGSCOPE_OFFSET", default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,

    /// Comma-separated ids to look up; overrides range mode
    #[arg(long = "doc-ids", visible_alias = "doc_ids")]
    doc_ids: Option<String>,

    /// Field the ids are matched against
    #[arg(long, env = "SEGSCOPE_ID_FIELD", default_value = DEFAULT_ID_FIELD)]
    id_field: String,

    /// Output format (text, json)
    #[arg(long, env = "SEGSCOPE_FORMAT", default_value = "text")]
    format: String,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    segscope::telemetry::init(if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    });

    let format = match args.format.parse::<OutputFormat>() {
        Ok(format) => format,
        Err(e) => {
            warn!("{}, using 'text'", e);
            OutputFormat::Text
        }
    };

    let mut config = InspectConfig::new(&args.index_path)
        .with_limit(args.limit)
        .with_offset(args.offset)
        .with_id_field(args.id_field)
        .with_format(format);
    if let Some(raw) = &args.doc_ids {
        config = config.with_doc_ids(raw);
    }

    info!("segscope v{} inspecting {:?}", segscope::VERSION, config.index_path);

    let stdout = BufWriter::new(io::stdout().lock());
    let summary = match config.format {
        OutputFormat::Text => render(&config, TextRenderer::new(stdout), TextRenderer::into_inner)?,
        OutputFormat::Json => render(&config, JsonRenderer::new(stdout), JsonRenderer::into_inner)?,
    };

    if summary.has_problems() {
        info!(
            not_found = summary.not_found,
            lookup_errors = summary.lookup_errors,
            fetch_failures = summary.fetch_failures,
            "finished with skipped items"
        );
    }

    Ok(())
}

/// Run the inspection, then flush whatever the renderer wrote
fn render<R, W>(config: &InspectConfig, mut renderer: R, into_inner: fn(R) -> W) -> Result<BatchSummary>
where
    R: Renderer,
    W: Write,
{
    let summary = run_inspection(config, &mut renderer)
        .with_context(|| format!("cannot inspect {}", config.index_path.display()))?;
    into_inner(renderer).flush()?;
    Ok(summary)
}
