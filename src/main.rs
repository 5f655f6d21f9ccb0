use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use allele_duo_report::output::{self, ReportFormat};
use allele_duo_report::{
    Dataset, DuoSession, ReportAssembler, ReportConfig, ReportGenerator, TsvParser,
};

/// Father/son duo allele comparison reports
#[derive(Parser, Debug)]
#[command(
    name = "allele-duo-report",
    version,
    about = "Compare father/son duos marker by marker and highlight allele mismatches",
    long_about = r#"
Loads a tab-separated table (sample, marker, up to 8 allele columns) and
writes one comparison block per father/son duo:
- one row per marker, in lexical marker order
- allele columns dropped when empty for both members of the duo
- mismatching alleles highlighted, numeric values compared as numbers

Without --input the tool prompts for the table, the output name and the
duos, until 'end' is entered.
"#
)]
struct Cli {
    /// Tab-separated allele table
    #[arg(short, long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    input: Option<PathBuf>,

    /// Output file name, placed next to the input file
    #[arg(short, long, value_name = "NAME")]
    output: Option<PathBuf>,

    /// Duo to compare as FATHER,SON (repeatable)
    #[arg(short, long = "duo", value_name = "FATHER,SON", value_parser = parse_duo)]
    duos: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: OutputFormat,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE", env = "ALLELE_DUO_CONFIG", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions
    Completions { shell: Shell },
    /// List supported output formats
    Formats,
    /// Summarize the samples and markers of a table
    Inspect {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Sample names to look up (case-insensitive)
        #[arg(short, long = "sample", value_name = "NAME")]
        samples: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
    Tsv,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> ReportFormat {
        match format {
            OutputFormat::Xlsx => ReportFormat::Xlsx,
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Tsv => ReportFormat::Tsv,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn parse_duo(s: &str) -> Result<(String, String), String> {
    match s.split_once(',') {
        Some((father, son)) if !father.trim().is_empty() && !son.trim().is_empty() => {
            Ok((father.to_string(), son.to_string()))
        }
        _ => Err(format!("expected FATHER,SON but got '{}'", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate_completions(*shell);
            return Ok(());
        }
        Some(Commands::Formats) => {
            list_formats();
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => ReportConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReportConfig::default(),
    };

    if let Some(Commands::Inspect { file, samples }) = &cli.command {
        return inspect(file, samples, &config);
    }

    match &cli.input {
        Some(input) => run_batch(&cli, input, &config),
        None => run_interactive_mode(cli.format.into(), &config),
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn list_formats() {
    println!("{}", style("Supported Report Formats:").bold().cyan());
    println!();

    let formats = vec![
        ("XLSX", "Excel workbook (.xlsx)", "Mismatches filled in the highlight color"),
        ("CSV", "Comma-separated values (.csv)", "Plain values, no highlighting"),
        ("TSV", "Tab-separated values (.tsv)", "Plain values, no highlighting"),
        ("JSON", "JSON document (.json)", "Display rows with highlight flags"),
    ];

    for (name, ext, desc) in formats {
        println!("  {} - {}", style(name).green().bold(), style(ext).yellow());
        println!("         {}", style(desc).dim());
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("allele_duo_report={}", level))
        .with_writer(io::stderr)
        .init();
}

fn load_dataset(input: &Path, config: &ReportConfig) -> Result<Dataset> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Loading {}...", input.display()));

    let parser = TsvParser::with_delimiter(config.delimiter_char()?);
    let result = Dataset::load(input, &parser);
    pb.finish_and_clear();

    let dataset = result.with_context(|| format!("Failed to load {}", input.display()))?;
    println!(
        "{} Loaded {} sample(s), {} marker(s), {} allele column(s)",
        style("✓").green().bold(),
        dataset.store.sample_count(),
        dataset.catalog.len(),
        dataset.store.allele_columns()
    );
    Ok(dataset)
}

fn inspect(file: &Path, samples: &[String], config: &ReportConfig) -> Result<()> {
    let dataset = load_dataset(file, config)?;

    if !samples.is_empty() {
        for name in samples {
            if dataset.store.contains(name) {
                println!("{} {}", style("✓").green().bold(), name);
            } else {
                println!("{} {} not found", style("✗").red(), name);
            }
        }
        return Ok(());
    }

    println!("{}", style("Samples:").bold().cyan());
    for name in dataset.store.sample_names() {
        println!("  {}", name);
    }
    println!("{}", style("Markers:").bold().cyan());
    for marker in dataset.catalog.iter() {
        println!("  {}", marker);
    }
    if dataset.skipped_rows > 0 {
        println!(
            "{}",
            style(format!("{} row(s) skipped", dataset.skipped_rows)).dim()
        );
    }
    Ok(())
}

fn run_interactive_mode(format: ReportFormat, config: &ReportConfig) -> Result<()> {
    println!(
        "{}",
        style("╔══════════════════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║        Allele Duo Report - Interactive Mode                  ║")
            .cyan()
            .bold()
    );
    println!(
        "{}",
        style("╚══════════════════════════════════════════════════════════════╝").cyan()
    );
    println!();

    let theme = ColorfulTheme::default();

    let input: String = Input::with_theme(&theme)
        .with_prompt("TSV file name (with path)")
        .interact_text()?;
    let input = PathBuf::from(input.trim());

    let output_name: String = Input::with_theme(&theme)
        .with_prompt(format!(
            "Output {} file name",
            format.extension().to_uppercase()
        ))
        .default(output::default_output_name(&input, format))
        .interact_text()?;
    let output_path = output::resolve_output_path(&input, Path::new(output_name.trim()));

    let dataset = load_dataset(&input, config)?;
    let mut session = DuoSession::new(&dataset.store, &dataset.catalog);

    loop {
        let father: String = Input::with_theme(&theme)
            .with_prompt(format!("Father name (or '{}' to finish)", config.end_token))
            .allow_empty(true)
            .interact_text()?;
        if config.is_end_token(&father) {
            break;
        }

        let son: String = Input::with_theme(&theme)
            .with_prompt(format!("Son name (or '{}' to finish)", config.end_token))
            .allow_empty(true)
            .interact_text()?;
        if config.is_end_token(&son) {
            break;
        }

        submit_duo(&mut session, &father, &son);
    }

    write_report(session, &output_path, format, config)
}

fn run_batch(cli: &Cli, input: &Path, config: &ReportConfig) -> Result<()> {
    let format: ReportFormat = cli.format.into();
    let output_name = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(output::default_output_name(input, format)));
    let output_path = output::resolve_output_path(input, &output_name);

    let dataset = load_dataset(input, config)?;
    let mut session = DuoSession::new(&dataset.store, &dataset.catalog);

    if cli.duos.is_empty() {
        warn!("No --duo given; the report will be empty");
    }
    for (father, son) in &cli.duos {
        submit_duo(&mut session, father, son);
    }

    write_report(session, &output_path, format, config)
}

fn submit_duo(session: &mut DuoSession, father: &str, son: &str) {
    let ordinal = session.next_ordinal();
    match session.submit(father, son) {
        Ok(result) => {
            let slots: Vec<String> = result
                .active_slots
                .iter()
                .map(|s| (s + 1).to_string())
                .collect();
            println!(
                "{} Duo #{}: {} of {} marker(s) mismatched (alleles {})",
                style("✓").green().bold(),
                ordinal,
                style(result.mismatch_count()).yellow(),
                result.rows.len(),
                slots.join(", ")
            );
        }
        Err(e) => {
            warn!("Rejected duo {} / {}: {}", father, son, e);
            eprintln!("{} {}. Try again.", style("✗").red(), e);
        }
    }
}

fn write_report(
    session: DuoSession,
    output_path: &Path,
    format: ReportFormat,
    config: &ReportConfig,
) -> Result<()> {
    let results = session.into_results();
    info!("Assembling report for {} duo(s)", results.len());

    let rows = ReportAssembler::new().assemble(&results);
    let generator = ReportGenerator::new(output_path, config.clone());
    generator
        .generate(&rows, format)
        .with_context(|| format!("Failed to write report {}", output_path.display()))?;

    println!(
        "\n{} Done. Saved: {}",
        style("✓").green().bold(),
        style(generator.output_path().display()).cyan()
    );
    Ok(())
}
