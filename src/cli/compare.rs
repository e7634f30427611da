use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::clustering::pfm::{similarity, PfmSimilarity};
use crate::parsing::pfm::{parse_pfm_file, NamedPfm};
use crate::utils::validation::validate_gc_fraction;

#[derive(Args)]
pub struct CompareArgs {
    /// First PFM file
    #[arg(required = true)]
    pub pfm_a: PathBuf,

    /// Second PFM file
    #[arg(required = true)]
    pub pfm_b: PathBuf,

    /// GC fraction of the background columns
    #[arg(long, required = true, value_parser = validate_gc_fraction_arg)]
    pub gc: f64,

    /// Also try the second PFM's reverse complement
    #[arg(short = 'r', long)]
    pub reverse_complement: bool,

    /// Maximum alignment window
    #[arg(long = "ws", default_value = "7", value_parser = clap::value_parser!(u64).range(1..))]
    pub window: u64,
}

fn validate_gc_fraction_arg(s: &str) -> Result<f64, String> {
    let gc: f64 = s.parse().map_err(|e| format!("{e}"))?;
    validate_gc_fraction(gc)
}

/// Execute compare subcommand
///
/// # Errors
///
/// Returns an error if either PFM file cannot be parsed.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CompareArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let a = parse_pfm_file(&args.pfm_a)
        .with_context(|| format!("Failed to read PFM {}", args.pfm_a.display()))?;
    let b = parse_pfm_file(&args.pfm_b)
        .with_context(|| format!("Failed to read PFM {}", args.pfm_b.display()))?;

    if verbose {
        eprintln!(
            "{}: {} columns, {}: {} columns",
            a.name,
            a.pfm.len(),
            b.name,
            b.pfm.len()
        );
    }

    let window = usize::try_from(args.window).unwrap_or(usize::MAX);
    let result = similarity(&a.pfm, &b.pfm, args.gc, Some(window), args.reverse_complement)?;

    match format {
        OutputFormat::Text => print_text_comparison(&a, &b, &result),
        OutputFormat::Json => print_json_comparison(&args, &a, &b, &result)?,
    }

    Ok(())
}

fn print_text_comparison(a: &NamedPfm, b: &NamedPfm, result: &PfmSimilarity) {
    println!("PFM similarity");
    println!("  {} vs {}", a.name, b.name);
    println!("  Score: {:.6}", result.score);
    println!(
        "  Orientation: {} / {}",
        result.orientation_a, result.orientation_b
    );
}

fn print_json_comparison(
    args: &CompareArgs,
    a: &NamedPfm,
    b: &NamedPfm,
    result: &PfmSimilarity,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "pfm_a": {
            "path": args.pfm_a.display().to_string(),
            "name": a.name,
            "columns": a.pfm.len(),
        },
        "pfm_b": {
            "path": args.pfm_b.display().to_string(),
            "name": b.name,
            "columns": b.pfm.len(),
        },
        "gc": args.gc,
        "reverse_complement": args.reverse_complement,
        "similarity": result,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
