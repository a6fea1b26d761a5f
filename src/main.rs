use analyzer::{export_json, Analyzer, GroupStats};
use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{init_logging, load_config, Settings};
use core_types::{Exchange, SymbolData};
use datastore::CsvDataStore;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::path::PathBuf;
use validator::{DataValidator, ValidationReport};

/// The main entry point for the Hawk screener.
fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let settings = load_config().context("Failed to load configuration")?;
    let _log_guards = init_logging(&settings.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &settings),
        Commands::Validate(args) => handle_validate(args, &settings),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Fundamental metrics and data quality checks for Saudi-listed stocks.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute per-stock metrics and sector/industry aggregates, then write them as JSON.
    Analyze(AnalyzeArgs),
    /// Run the data quality checks for one symbol or the whole universe.
    Validate(ValidateArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Directory holding the CSV exports. Overrides `data.input_dir`.
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Destination of the analysis JSON. Overrides `data.output_path`.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct ValidateArgs {
    /// Only validate this symbol (e.g., "2222.SR").
    #[arg(long)]
    symbol: Option<String>,

    /// Check what the data store holds instead of the collected series.
    #[arg(long)]
    stored: bool,

    /// Directory holding the CSV exports. Overrides `data.input_dir`.
    #[arg(long)]
    input_dir: Option<PathBuf>,
}

// ==============================================================================
// Analyze Command Logic
// ==============================================================================

fn handle_analyze(args: AnalyzeArgs, settings: &Settings) -> anyhow::Result<()> {
    let input_dir = args.input_dir.unwrap_or_else(|| settings.data.input_dir.clone());
    let output_path = args.output.unwrap_or_else(|| settings.data.output_path.clone());

    let store = CsvDataStore::load(&input_dir)
        .with_context(|| format!("Failed to load data from {}", input_dir.display()))?;
    let universe = store.universe();

    let run = Analyzer::new().run(&universe);
    export_json(&run.output, &output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    for failure in &run.failures {
        tracing::warn!(
            symbol = %failure.symbol,
            reason = %failure.reason,
            "Symbol omitted from output."
        );
    }

    println!("{}", sector_table(&run.output.sector_overview));
    println!(
        "Analyzed {} of {} symbols ({} failed). Output written to {}",
        run.output.metadata.total_stocks,
        universe.len(),
        run.failures.len(),
        output_path.display()
    );
    Ok(())
}

fn sector_table<'a>(overview: impl IntoIterator<Item = (&'a String, &'a GroupStats)>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Sector",
        "Stocks",
        "P/E (median)",
        "P/B (median)",
        "EV/FCF (median)",
        "Rev CAGR 3y % (median)",
        "Net margin % (median)",
        "Volatility (median)",
    ]);
    for (sector, stats) in overview {
        table.add_row(vec![
            sector.clone(),
            stats.stock_count.to_string(),
            display(stats.pe_median),
            display(stats.pb_median),
            display(stats.ev_fcf_median),
            display(stats.revenue_cagr_3y_median),
            display(stats.net_margin_median),
            display(stats.volatility_median),
        ]);
    }
    table
}

fn display(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.round_dp(2).to_string())
}

// ==============================================================================
// Validate Command Logic
// ==============================================================================

fn handle_validate(args: ValidateArgs, settings: &Settings) -> anyhow::Result<()> {
    let input_dir = args.input_dir.unwrap_or_else(|| settings.data.input_dir.clone());
    let store = CsvDataStore::load(&input_dir)
        .with_context(|| format!("Failed to load data from {}", input_dir.display()))?;
    let validator = DataValidator::new(settings.validation.tolerance_pct);

    let reports = match (args.symbol, args.stored) {
        (Some(symbol), true) => vec![validator.validate_stored_data(&store, &symbol)?],
        (Some(symbol), false) => {
            let data = store
                .symbol_data(&symbol)
                .with_context(|| format!("Symbol {symbol} not found in {}", input_dir.display()))?;
            vec![validate_collected(&validator, &data)]
        }
        (None, stored) => validate_universe(&validator, &store, stored)?,
    };

    let valid = reports.iter().filter(|r| r.is_valid).count();
    for report in &reports {
        print!("{report}");
    }
    println!(
        "Validated {} symbols: {} valid, {} invalid.",
        reports.len(),
        valid,
        reports.len() - valid
    );
    Ok(())
}

/// Symbols without an exchange tag are treated as main-market listings.
fn validate_collected(validator: &DataValidator, data: &SymbolData) -> ValidationReport {
    let exchange = data.info().exchange.unwrap_or(Exchange::Tadawul);
    validator.validate_collected_data(data, exchange)
}

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

fn validate_universe(
    validator: &DataValidator,
    store: &CsvDataStore,
    stored: bool,
) -> anyhow::Result<Vec<ValidationReport>> {
    let symbols: Vec<String> = store.symbols().map(str::to_string).collect();

    let progress_bar = ProgressBar::new(symbols.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .map_err(|e| anyhow::anyhow!("Invalid progress bar template: {e}"))?
            .progress_chars("=>-"),
    );

    let mut reports = Vec::with_capacity(symbols.len());
    for symbol in &symbols {
        progress_bar.set_message(symbol.clone());
        let report = if stored {
            validator.validate_stored_data(store, symbol)?
        } else {
            match store.symbol_data(symbol) {
                Some(data) => validate_collected(validator, &data),
                None => {
                    let mut report = ValidationReport::new(symbol.as_str());
                    report.add_error("Stock not found in data store");
                    report
                }
            }
        };
        reports.push(report);
        progress_bar.inc(1);
    }

    progress_bar.finish_with_message("Validation complete!");
    Ok(reports)
}
