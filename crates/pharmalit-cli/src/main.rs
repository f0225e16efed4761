//! pharmalit - find PubMed papers with pharmaceutical or biotech authors
//!
//! Searches PubMed for a query and reports papers where at least one author
//! is affiliated with a company, as a console table or a CSV file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use pharmalit_core::ProgressContext;
use pharmalit_pubmed::{EutilsClient, MAX_RESULTS_CAP};

mod config;
mod output;

use config::Config;

#[derive(Parser)]
#[command(name = "pharmalit")]
#[command(about = "Find PubMed papers with pharmaceutical/biotech company authors")]
#[command(version)]
struct Cli {
    /// PubMed query (full PubMed syntax supported)
    #[arg(required_unless_present = "show_config", value_parser = non_blank)]
    query: Option<String>,

    /// Write results to this CSV file instead of printing a table
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Maximum PubMed IDs to retrieve
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..=MAX_RESULTS_CAP as u64))]
    max_results: Option<u64>,

    /// Restrict the search to company-affiliated records using PubMed's [ad] field
    #[arg(long)]
    prefilter: bool,

    /// Config file path (default: ./pharmalit.toml or ~/.config/pharmalit/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show current configuration and exit
    #[arg(long)]
    show_config: bool,
}

fn non_blank(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("query must not be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = ProgressContext::new();
    let multi = progress.is_tty().then(|| progress.multi());
    pharmalit_core::init_logging(cli.quiet, cli.debug, multi);

    let config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    if cli.show_config {
        show_config(&config);
        return Ok(());
    }

    let Some(query) = cli.query.as_deref() else {
        anyhow::bail!("a query is required");
    };

    let client_config = config.client_config(cli.max_results.map(|n| n as usize), cli.prefilter);
    let max_results = client_config.effective_max_results();
    let client = EutilsClient::new(client_config)?;

    let summary = pharmalit_pubmed::run(&client, query, max_results, &progress)?;

    if summary.papers.is_empty() {
        println!("No papers found with company affiliations");
        return Ok(());
    }

    match &cli.file {
        Some(path) => {
            output::write_csv(&summary.papers, path)?;
            println!("Results saved to {}", path.display());
        }
        None => {
            println!(
                "\nFound {} papers with pharmaceutical/biotech company affiliations:\n",
                summary.papers.len()
            );
            println!("{}", output::render_table(&summary.papers, &config.output));
        }
    }
    Ok(())
}

fn show_config(config: &Config) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let eutils = &config.eutils;
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Setting").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);

    table.add_row(vec!["E-utilities URL", &eutils.base_url]);
    table.add_row(vec!["Tool", &eutils.tool]);
    table.add_row(vec!["Email", eutils.email.as_deref().unwrap_or("not set")]);
    table.add_row(vec![
        "API key",
        if eutils.api_key.is_some() {
            "configured"
        } else {
            "not set"
        },
    ]);
    table.add_row(vec!["Timeout", &format!("{}s", eutils.timeout_secs)]);
    table.add_row(vec![
        "Min interval",
        &format!("{}ms", eutils.min_interval_ms),
    ]);
    table.add_row(vec![
        "Max results",
        &format!("{} (cap: {MAX_RESULTS_CAP})", eutils.max_results),
    ]);
    table.add_row(vec![
        "Cell widths",
        &format!(
            "title {}, other {}",
            config.output.title_width, config.output.cell_width
        ),
    ]);

    eprintln!("\n{table}");
}
