use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use examstruct::config::ExamProfile;
use examstruct::parser::layout_builder::LayoutAnalyzer;
use examstruct::pipeline::{
    build_document, export_document, load_document, parse_document, OutputFormat, PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "examstruct")]
#[command(version, about = "Structured question recovery from OCR'd multiple-choice exams", long_about = None)]
struct Cli {
    /// Log debug output (merges, table bindings)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert one OCR document (.json or .txt) to structured questions
    Convert {
        /// Input document path
        input: PathBuf,

        /// Output directory (default: ./<input_name>_output)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format(s) to generate
        #[arg(short, long, value_enum, default_values_t = vec![Format::Json, Format::Markdown])]
        format: Vec<Format>,

        /// Exam profile (TOML); the built-in accounting profile when omitted
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Convert multiple documents in parallel
    Batch {
        /// Input document paths
        inputs: Vec<PathBuf>,

        /// Output directory for all results
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format(s) to generate
        #[arg(short, long, value_enum, default_values_t = vec![Format::Json, Format::Markdown])]
        format: Vec<Format>,

        /// Exam profile (TOML)
        #[arg(long)]
        profile: Option<PathBuf>,
    },

    /// Show information about an input document
    Info {
        /// Input document path
        input: PathBuf,

        /// Exam profile (TOML)
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Format {
    Json,
    Markdown,
    Csv,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Markdown => OutputFormat::Markdown,
            Format::Csv => OutputFormat::Csv,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG, when set, wins over --verbose.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            profile,
            quiet,
        } => {
            let profile = load_profile(profile.as_deref())?;
            convert_single(input, output, &format, &profile, quiet)
        }
        Commands::Batch {
            inputs,
            output,
            format,
            profile,
        } => {
            let profile = load_profile(profile.as_deref())?;
            convert_batch(inputs, output, &format, &profile)
        }
        Commands::Info { input, profile } => {
            let profile = load_profile(profile.as_deref())?;
            show_info(input, &profile)
        }
    }
}

fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn load_profile(path: Option<&Path>) -> Result<ExamProfile> {
    match path {
        Some(path) => ExamProfile::load(path),
        None => Ok(ExamProfile::default()),
    }
}

fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    PathBuf::from(format!("{}_output", stem))
}

fn convert_single(
    input: PathBuf,
    output: Option<PathBuf>,
    formats: &[Format],
    profile: &ExamProfile,
    quiet: bool,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    if !input.is_file() {
        anyhow::bail!("Input is not a file: {}", input.display());
    }

    let output_dir = output.unwrap_or_else(|| default_output_dir(&input));

    if !quiet {
        println!("[*] Processing: {}", input.display());
        println!("[*] Output: {}", output_dir.display());
        println!("[*] Profile: {}", profile.name);
    }

    let formats: Vec<OutputFormat> = formats.iter().copied().map(OutputFormat::from).collect();
    let config = PipelineConfig::new(input.clone(), output_dir.clone(), formats, profile.clone());

    if !quiet {
        println!("\n[+] Parsing questions...");
    }

    let result = build_document(&config)
        .with_context(|| format!("Failed to process document: {}", input.display()))?;

    if !quiet {
        println!(
            "[+] {} question(s), {} diagnostic(s)",
            result.questions.len(),
            result.diagnostics.len()
        );
        println!("[+] Exporting results...");
    }

    export_document(&result, &config.output, &config.formats)
        .with_context(|| format!("Failed to export to: {}", output_dir.display()))?;

    if !quiet {
        println!("\n[✓] Done! Results saved to: {}", output_dir.display());
    }

    Ok(())
}

fn convert_batch(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    formats: &[Format],
    profile: &ExamProfile,
) -> Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("No input files specified");
    }

    let base_output = output.unwrap_or_else(|| PathBuf::from("batch_output"));

    println!("[*] Batch processing {} file(s)", inputs.len());
    println!("[*] Base output: {}\n", base_output.display());

    // Each document gets its own parse; nothing is shared between them.
    let outcomes: Vec<(PathBuf, Result<()>)> = inputs
        .par_iter()
        .map(|input| {
            let output_dir = input
                .file_stem()
                .map(|stem| base_output.join(stem))
                .unwrap_or_else(|| base_output.join("document"));
            let outcome = convert_single(input.clone(), Some(output_dir), formats, profile, true);
            (input.clone(), outcome)
        })
        .collect();

    let mut success = 0;
    let mut failed = 0;
    for (i, (input, outcome)) in outcomes.iter().enumerate() {
        println!("[{}/{}] {}", i + 1, outcomes.len(), input.display());
        match outcome {
            Ok(()) => {
                println!("  [✓] Success");
                success += 1;
            }
            Err(e) => {
                eprintln!("  [✗] Failed: {:#}", e);
                failed += 1;
            }
        }
    }

    println!("\n[*] Summary: {} succeeded, {} failed", success, failed);

    if failed > 0 {
        anyhow::bail!("{} file(s) failed to process", failed);
    }

    Ok(())
}

fn show_info(input: PathBuf, profile: &ExamProfile) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let document = load_document(&input)
        .with_context(|| format!("Failed to open document: {}", input.display()))?;
    let analyzer = LayoutAnalyzer::new();

    println!("Document Information");
    println!("====================");
    println!("File: {}", input.display());
    println!("Pages: {}", document.pages.len());
    println!("Tables: {}", document.table_count());
    for (page_idx, page) in document.pages.iter().enumerate() {
        let layout = analyzer
            .analyze_page(page, page_idx)
            .layout
            .map(|layout| format!("{:?}", layout))
            .unwrap_or_else(|| "text".to_string());
        println!(
            "  page {}: {} word(s), {} table(s), {}",
            page_idx + 1,
            page.words.len(),
            page.tables.len(),
            layout
        );
    }

    let result = parse_document(&document, profile);
    println!("Questions: {}", result.questions.len());
    for diagnostic in &result.diagnostics {
        println!("  [!] {:?}: {}", diagnostic.kind, diagnostic.message);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_flag_picks_fallback_level() {
        assert_eq!(default_log_level(true), "debug");
        assert_eq!(default_log_level(false), "warn");
    }

    #[test]
    fn output_dir_follows_input_stem() {
        assert_eq!(
            default_output_dir(Path::new("scans/exam.json")),
            PathBuf::from("exam_output")
        );
    }
}
