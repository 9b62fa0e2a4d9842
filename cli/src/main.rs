//! its-missions CLI - ITS mission extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use its_missions::render::{report_to_json, write_json};
use its_missions::{
    check_file, ExtractionReport, JsonFormat, MissionExtractor, MissionType, PageSource,
    ParseOptions, PdfSource,
};

/// Output file used when `-o` is not given.
const DEFAULT_OUTPUT: &str = "infinity_its_missions.json";

const SAMPLE_LINES: usize = 20;
const SAMPLE_WIDTH: usize = 100;

#[derive(Parser)]
#[command(name = "its-missions")]
#[command(version)]
#[command(about = "Extract ITS mission data from ruleset PDFs to JSON", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "PDF")]
    input: Option<PathBuf>,

    #[command(flatten)]
    extract: ExtractArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract all missions to JSON
    Extract {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        #[command(flatten)]
        args: ExtractArgs,
    },

    /// List missions found in the table of contents
    Toc {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,
    },

    /// Check the structure of a previously written JSON file
    Check {
        /// Mission JSON file
        #[arg(value_name = "JSON")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
struct ExtractArgs {
    /// Output JSON file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Write per-mission and whole-document raw text into this directory
    #[arg(long, value_name = "DIR")]
    raw: Option<PathBuf>,

    /// Write the completeness report as JSON
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Parse missions one after another
    #[arg(long)]
    sequential: bool,

    /// Abort on the first unreadable page
    #[arg(long)]
    strict: bool,

    /// Document name
    #[arg(long, env = "ITS_MISSIONS_NAME")]
    name: Option<String>,

    /// Document version (read from the cover page if omitted)
    #[arg(long = "doc-version", env = "ITS_MISSIONS_VERSION")]
    doc_version: Option<String>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Extract { input, args }) => cmd_extract(&input, &args),
        Some(Commands::Toc { input }) => cmd_toc(&input),
        Some(Commands::Check { input }) => cmd_check(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: extract if input is provided
            if let Some(input) = cli.input {
                cmd_extract(&input, &cli.extract)
            } else {
                println!("{}", "Usage: its-missions <PDF> [-o FILE]".yellow());
                println!("       its-missions --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract(input: &Path, args: &ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} {}", "Extracting missions from".cyan().bold(), input.display());

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    let mut options = ParseOptions::new().with_raw_text(args.raw.is_some());
    if !args.strict {
        options = options.lenient();
    }
    if args.sequential {
        options = options.sequential();
    }

    let mut extractor = MissionExtractor::with_options(options);
    if let Some(ref name) = args.name {
        extractor = extractor.with_name(name);
    }
    if let Some(ref version) = args.doc_version {
        extractor = extractor.with_version(version);
    }
    log::debug!("extract options: {:?}", extractor.options());

    pb.set_message("Opening PDF...");
    let source = PdfSource::open(input)?;
    pb.inc(1);

    pb.set_message("Parsing missions...");
    let mut extraction = extractor.extract(&source)?;
    if args.name.is_none() {
        if let Some(stem) = input.file_stem() {
            extraction.document.name = stem.to_string_lossy().into_owned();
        }
    }
    pb.inc(1);

    pb.set_message("Writing output...");
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    let format = if args.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    write_json(&extraction.document, &output, format)?;

    if let Some(ref dir) = args.raw {
        extraction.write_raw_text(dir)?;
    }
    if let Some(ref path) = args.report {
        fs::write(path, report_to_json(&extraction.report, JsonFormat::Pretty)?)?;
    }
    pb.inc(1);
    pb.finish_with_message("Done!");

    let doc = &extraction.document;
    let scenarios = doc
        .missions
        .iter()
        .filter(|m| m.mission_type == MissionType::ItsScenario)
        .count();
    println!(
        "\n{} {} missions ({} scenarios, {} direct actions)",
        "✓ Extracted".green().bold(),
        doc.mission_count(),
        scenarios,
        doc.mission_count() - scenarios
    );
    println!("{} {}", "✓ Output saved to".green().bold(), output.display());
    if let Some(ref dir) = args.raw {
        println!("{} {}", "✓ Raw text saved to".green().bold(), dir.display());
    }

    if let Some(first) = doc.missions.first() {
        println!("\n{}", "First mission sample:".bold());
        let sample = serde_json::to_string_pretty(first)?;
        for line in sample.lines().take(SAMPLE_LINES) {
            println!("  {}", truncate(line, SAMPLE_WIDTH).dimmed());
        }
    }

    print_report(&extraction.report);

    Ok(())
}

fn truncate(line: &str, width: usize) -> String {
    match line.char_indices().nth(width) {
        Some((i, _)) => format!("{}...", &line[..i]),
        None => line.to_string(),
    }
}

fn print_report(report: &ExtractionReport) {
    for warning in &report.document_warnings {
        println!("{} {}", "!".yellow().bold(), warning);
    }

    let incomplete = report.incomplete_missions();
    if incomplete.is_empty() {
        return;
    }

    println!("\n{}", "Incomplete missions".yellow().bold());
    println!("{}", "─".repeat(40).dimmed());
    for mission in incomplete {
        let absent: Vec<&str> = mission.absent_sections.iter().map(|s| s.heading()).collect();
        println!("  {} {}: {}", "├─".dimmed(), mission.mission.bold(), absent.join(", "));
    }
    println!(
        "{}: {} (RUST_LOG=debug for details)",
        "Warnings".bold(),
        report.warning_count()
    );
}

fn cmd_toc(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = PdfSource::open(input)?;
    let locations = MissionExtractor::new().locate(&source)?;

    println!("{}", "Table of Contents".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    println!("{}: {}", "Pages".bold(), source.page_count());

    for location in &locations {
        println!(
            "  {:<32} {:<14} {:>4}-{:<4}",
            location.name,
            location.mission_type.to_string().dimmed(),
            location.start_page,
            location.end_page.saturating_sub(1)
        );
    }

    println!("\n{} {} missions", "Found".green().bold(), locations.len());

    Ok(())
}

fn cmd_check(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let report = check_file(input)?;

    println!("\n{} {} missions...\n", "Checking".cyan().bold(), report.mission_count);

    for failure in &report.failures {
        println!("{} {}", "✗".red().bold(), failure.mission);
        println!("   Missing keys: {}", failure.missing_keys.join(", "));
    }

    println!("\n{}", "Section Structure by Mission Type".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    for (mission_type, sections) in &report.shapes {
        println!("  {}:", mission_type.bold());
        for (section, kinds) in sections {
            for (kind, missions) in kinds {
                println!("    • {}: {} ({} mission(s))", section, kind, missions.len());
                if missions.len() <= 3 {
                    for mission in missions {
                        println!("      - {}", mission.dimmed());
                    }
                }
            }
        }
    }
    println!("{}", "─".repeat(60).dimmed());

    if report.mission_count == 0 {
        return Err("no missions found in JSON data".into());
    }
    if report.passed() {
        println!("{} All {} missions passed", "✓".green().bold(), report.mission_count);
        Ok(())
    } else {
        Err(format!(
            "{} of {} missions failed the structure check",
            report.failures.len(),
            report.mission_count
        )
        .into())
    }
}

fn cmd_version() {
    println!("{} {}", "its-missions".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("ITS mission extraction tool");
    println!();
    println!("License: MIT");
}
