use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use gene_trends::app::{App, RunResult};
use gene_trends::citations::PubmedHttpClient;
use gene_trends::config::{ConfigLoader, DEFAULT_WINDOW_DAYS};
use gene_trends::domain::{DebugLevel, Pipeline, SortKey};
use gene_trends::dumps::WikimediaHttpClient;
use gene_trends::error::TrendsError;
use gene_trends::output::{JsonOutput, LogSink, OutputMode};
use gene_trends::store::Store;

#[derive(Parser)]
#[command(name = "gene-trends")]
#[command(about = "Rank gene popularity by Wikipedia page views and PubMed citations")]
#[command(version, author)]
struct Cli {
    /// Number of trailing days to analyze
    #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
    days: u32,

    /// Metric by which to sort the merged trend table
    #[arg(long, value_enum, default_value_t = SortKey::Count)]
    sort_by: SortKey,

    /// Data types to include
    #[arg(long, num_args = 1.., value_enum)]
    only: Option<Vec<Pipeline>>,

    /// Get fast but incomplete data. Dev setting. 0: full window, no
    /// caching. 1: two-day window, reuse downloaded dumps. 2: level 1 plus
    /// reuse computed series files.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    debug: u8,

    /// Path to a JSON config file (default: ./gene-trends.json if present)
    #[arg(long)]
    config: Option<String>,

    /// Print a machine-readable run summary
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(trends) = report.downcast_ref::<TrendsError>() {
            return ExitCode::from(map_exit_code(trends));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &TrendsError) -> u8 {
    match error {
        TrendsError::MissingResource(_) | TrendsError::ConfigRead(_) => 2,
        TrendsError::Fetch { .. }
        | TrendsError::WikimediaHttp(_)
        | TrendsError::WikimediaStatus { .. }
        | TrendsError::PubmedHttp(_)
        | TrendsError::PubmedStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config = ConfigLoader::resolve(
        cli.config.as_deref(),
        cli.days,
        cli.sort_by,
        cli.only,
        DebugLevel::from_level(cli.debug),
    )
    .into_diagnostic()?;

    let store = Store::new(config.output_dir.clone()).into_diagnostic()?;
    let dumps = WikimediaHttpClient::new(config.pageviews_base_url.clone()).into_diagnostic()?;
    let pubmed = PubmedHttpClient::new(config.eutils_base_url.clone()).into_diagnostic()?;
    let app = App::new(store, dumps, pubmed, config);

    match output_mode {
        OutputMode::Json => {
            let result = app.run(&JsonOutput).into_diagnostic()?;
            JsonOutput::print_run(&result).into_diagnostic()?;
        }
        OutputMode::Human => {
            let result = app.run(&LogSink).into_diagnostic()?;
            print_run_summary(&result);
        }
    }
    Ok(())
}

fn print_run_summary(result: &RunResult) {
    let green = "\x1b[32m";
    let cyan = "\x1b[36m";
    let reset = "\x1b[0m";

    println!("{cyan}📈 gene-trends summary{reset}");
    println!("{green}✅ Ranked genes: {}{reset}", result.genes);
    println!("{green}   📁 views: {}{reset}", result.views_path);
    println!("{green}   📁 citations: {}{reset}", result.citations_path);
    println!("{green}   📁 trends: {}{reset}", result.trends_path);
}
