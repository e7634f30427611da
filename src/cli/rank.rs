use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::store::{PatternCatalog, PatternFailure};
use crate::cli::OutputFormat;
use crate::clustering::engine::{ClusterConfig, ClusterEngine};
use crate::clustering::report::{summarize_clusters, ClusterSummary};
use crate::core::types::SequenceType;
use crate::parsing::fasta::parse_fasta_file;
use crate::parsing::patterns::parse_pattern_file;
use crate::parsing::pfm::format_pfm;
use crate::parsing::score_table::parse_score_table_file;
use crate::scoring::engine::{ScoreMap, ScoringEngine, ScoringOptions, ScoringWeights};
use crate::utils::validation::validate_gc_fraction;

#[derive(Args)]
pub struct RankArgs {
    /// Positive sequence set (FASTA, optionally gzipped)
    #[arg(long, required = true, value_name = "FILE")]
    pub pset: PathBuf,

    /// Negative sequence set (FASTA, optionally gzipped)
    #[arg(long, required = true, value_name = "FILE")]
    pub nset: PathBuf,

    /// Pattern list, one pattern per line
    #[arg(long, required = true, value_name = "FILE")]
    pub plist: PathBuf,

    /// Sequence type of the patterns; DNA patterns also match the reverse strand
    #[arg(long, required = true, value_enum)]
    pub seqtype: SequenceType,

    /// Output directory, created if missing
    #[arg(long, required = true, value_name = "DIR")]
    pub out: PathBuf,

    /// Nucleosome-occupancy score table
    #[arg(long, value_name = "FILE")]
    pub oc: Option<PathBuf>,

    /// Conservation score table
    #[arg(long, value_name = "FILE")]
    pub cs: Option<PathBuf>,

    // === Scoring weight options ===
    /// Weight of the position score
    #[arg(long, default_value = "1")]
    pub sp: u32,

    /// Weight of the nucleosome-occupancy score (only used with --oc)
    #[arg(long, default_value = "1")]
    pub sn: u32,

    /// Weight of the conservation score (only used with --cs)
    #[arg(long, default_value = "1")]
    pub sc: u32,

    /// Skip sequences beyond a pattern's hit-sequence count in position scoring
    #[arg(long)]
    pub seqmask: bool,

    // === Clustering options ===
    /// Maximum number of clusters in the output
    #[arg(long, default_value = "5")]
    pub nc: usize,

    /// Maximum number of patterns per cluster
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u64).range(1..))]
    pub np: u64,

    /// Minimum PFM similarity for a pattern to join a cluster
    #[arg(long, default_value = "0.8")]
    pub threshold: f64,

    /// Maximum window size of the PFM similarity (default: auto)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub ws: Option<u64>,

    /// Background GC fraction (default: from the positive set)
    #[arg(long, value_parser = validate_gc_fraction_arg)]
    pub gc: Option<f64>,
}

fn validate_gc_fraction_arg(s: &str) -> Result<f64, String> {
    let gc: f64 = s.parse().map_err(|e| format!("{e}"))?;
    validate_gc_fraction(gc)
}

/// A pattern that was dropped before clustering
#[derive(Debug, Serialize)]
pub struct FailureSummary {
    pub pattern: String,
    pub stage: String,
    pub error: String,
}

impl From<&PatternFailure> for FailureSummary {
    fn from(f: &PatternFailure) -> Self {
        Self {
            pattern: f.pattern.clone(),
            stage: f.stage.to_string(),
            error: format!("{:#}", f.error),
        }
    }
}

/// A scored pattern in rank order
#[derive(Debug, Serialize)]
pub struct RankedPattern {
    pub rank: usize,
    pub pattern: String,
    pub score: f64,
    pub z_score: f64,
    pub position: f64,
    pub occupancy: Option<f64>,
    pub conservation: Option<f64>,
}

/// Everything printed at the end of a run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub output_dir: String,
    pub positive_sequences: usize,
    pub negative_sequences: usize,
    pub patterns: usize,
    pub background_gc: f64,
    pub ranked: Vec<RankedPattern>,
    pub failures: Vec<FailureSummary>,
    pub clusters: Vec<ClusterSummary>,
}

/// Execute rank subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be parsed, no pattern can be scored,
/// clustering or merging fails, or the result files cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: RankArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let positive = parse_fasta_file(&args.pset)
        .with_context(|| format!("Failed to read positive set {}", args.pset.display()))?;
    let negative = parse_fasta_file(&args.nset)
        .with_context(|| format!("Failed to read negative set {}", args.nset.display()))?;
    let patterns = parse_pattern_file(&args.plist)
        .with_context(|| format!("Failed to read pattern list {}", args.plist.display()))?;

    info!(
        "Read {} positive sequences, {} negative sequences and {} patterns",
        positive.len(),
        negative.len(),
        patterns.len()
    );

    let reverse_complement = args.seqtype.reverse_complement();
    let mut catalog = PatternCatalog::new(reverse_complement);
    for pattern in patterns {
        catalog.add(pattern);
    }
    if verbose {
        eprintln!("{} distinct patterns after de-duplication", catalog.len());
    }

    info!("Building match tables of patterns");
    let mut failures = catalog.build_all(&positive, &negative)?;

    let mut engine = ScoringEngine::new(ScoringOptions {
        weights: ScoringWeights {
            sp: args.sp,
            sn: args.sn,
            sc: args.sc,
        },
        seqmask: args.seqmask,
    });
    if let Some(path) = &args.oc {
        let table = parse_score_table_file(path)
            .with_context(|| format!("Failed to read occupancy table {}", path.display()))?;
        engine = engine.with_occupancy(table);
    }
    if let Some(path) = &args.cs {
        let table = parse_score_table_file(path)
            .with_context(|| format!("Failed to read conservation table {}", path.display()))?;
        engine = engine.with_conservation(table);
    }

    let report = engine.score(&catalog);
    // patterns that failed indexing are already reported
    let scoring_failures: Vec<PatternFailure> = report
        .failures
        .into_iter()
        .filter(|f| !failures.iter().any(|i| i.pattern == f.pattern))
        .collect();
    failures.extend(scoring_failures);
    for failure in &failures {
        warn!(
            "Pattern {} failed at {}: {:#}",
            failure.pattern, failure.stage, failure.error
        );
    }
    if report.scores.is_empty() {
        bail!("No pattern could be scored");
    }

    let background_gc = match args.gc {
        Some(gc) => gc,
        None => positive
            .gc_content()
            .context("Positive set has no A, C, G or T to estimate GC content from")?,
    };
    info!("Background GC content: {:.4}", background_gc);

    let config = ClusterConfig {
        max_clusters: args.nc,
        max_patterns_per_cluster: usize::try_from(args.np).unwrap_or(usize::MAX),
        similarity_threshold: args.threshold,
        max_window: args.ws.map(|w| usize::try_from(w).unwrap_or(usize::MAX)),
        background_gc,
        reverse_complement,
    };
    let clustering = ClusterEngine::new(&catalog, config)
        .run(&report.scores)
        .context("Clustering failed")?;

    info!("Merging patterns and calculating PFMs");
    let summaries = summarize_clusters(&clustering.clusters, &catalog, &positive)
        .context("Merging clusters failed")?;

    write_results(&args.out, &summaries)?;
    info!("Results written to {}", args.out.display());

    let summary = RunSummary {
        output_dir: args.out.display().to_string(),
        positive_sequences: positive.len(),
        negative_sequences: negative.len(),
        patterns: catalog.len(),
        background_gc,
        ranked: ranked_patterns(&catalog, &report.scores),
        failures: failures.iter().map(FailureSummary::from).collect(),
        clusters: summaries,
    };

    match format {
        OutputFormat::Text => print_text_summary(&summary, verbose),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}

fn ranked_patterns(catalog: &PatternCatalog, scores: &ScoreMap) -> Vec<RankedPattern> {
    scores
        .ranked()
        .into_iter()
        .enumerate()
        .filter_map(|(i, (id, _))| {
            let score = scores.get(id)?;
            let pattern = catalog.get(id)?;
            Some(RankedPattern {
                rank: i + 1,
                pattern: pattern.sequence.to_uppercase(),
                score: score.composite,
                z_score: score.z_score,
                position: score.position,
                occupancy: score.occupancy,
                conservation: score.conservation,
            })
        })
        .collect()
}

/// Write every result file into `out`, creating it if needed
///
/// # Errors
///
/// Returns an error if the directory or a file cannot be written.
pub fn write_results(out: &Path, summaries: &[ClusterSummary]) -> anyhow::Result<()> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create output directory {}", out.display()))?;

    write_file(&out.join("clustered_patterns.txt"), |w| {
        write_clustered_patterns(w, summaries)
    })?;
    write_file(&out.join("merged_patterns.txt"), |w| {
        write_merged_patterns(w, summaries)
    })?;
    write_file(&out.join("consensus_patterns.txt"), |w| {
        write_consensus_patterns(w, summaries)
    })?;
    write_file(&out.join("match_sequences.txt"), |w| {
        write_match_sequences(w, summaries)
    })?;
    for summary in summaries {
        let name = format!("cluster_{}", summary.id);
        write_file(&out.join(format!("{name}.pfm.txt")), |w| {
            w.write_all(format_pfm(&name, &summary.pfm).as_bytes())
        })?;
    }
    Ok(())
}

fn write_file<F>(path: &Path, write: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Support rounded to two decimals without trailing zeros: `0.5`, `0.67`, `1.0`
fn format_support(support: f64) -> String {
    let rounded = (support * 100.0).round() / 100.0;
    let text = rounded.to_string();
    if text.contains('.') || !rounded.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

fn write_clustered_patterns<W: Write>(w: &mut W, summaries: &[ClusterSummary]) -> std::io::Result<()> {
    writeln!(w, "cluster_no\tpattern\tpset_support")?;
    for summary in summaries {
        for member in &summary.members {
            writeln!(
                w,
                "{}\t{}\t{}",
                summary.id,
                member.sequence.to_uppercase(),
                format_support(member.support)
            )?;
        }
    }
    Ok(())
}

fn write_merged_patterns<W: Write>(w: &mut W, summaries: &[ClusterSummary]) -> std::io::Result<()> {
    writeln!(w, "cluster_no\tstrand\tpattern\tpset_support")?;
    for summary in summaries {
        for member in &summary.members {
            writeln!(
                w,
                "{}\t{}\t{}\t{}",
                summary.id,
                member.strand,
                member.sequence.to_uppercase(),
                format_support(member.support)
            )?;
        }
    }
    Ok(())
}

fn write_consensus_patterns<W: Write>(
    w: &mut W,
    summaries: &[ClusterSummary],
) -> std::io::Result<()> {
    writeln!(w, "cluster_no\tpattern\tpset_support")?;
    for summary in summaries {
        writeln!(
            w,
            "{}\t{}\t{}",
            summary.id,
            summary.consensus.to_uppercase(),
            format_support(summary.consensus_support)
        )?;
    }
    Ok(())
}

fn write_match_sequences<W: Write>(w: &mut W, summaries: &[ClusterSummary]) -> std::io::Result<()> {
    writeln!(w, "cluster_no\tgene_name\tstart\tsequence\tstrand")?;
    for summary in summaries {
        for site in &summary.matches {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                summary.id,
                site.gene_name,
                site.start,
                site.sequence.to_uppercase(),
                site.strand
            )?;
        }
    }
    Ok(())
}

fn print_text_summary(summary: &RunSummary, verbose: bool) {
    println!("Ranked Patterns");
    println!("{}", "=".repeat(60));
    println!(
        "Positive: {} sequences, negative: {} sequences, patterns: {}",
        summary.positive_sequences, summary.negative_sequences, summary.patterns
    );
    println!("Background GC: {:.4}", summary.background_gc);

    let shown = if verbose { summary.ranked.len() } else { 10 };
    println!(
        "\n{:>5}  {:<20} {:>10} {:>10} {:>10}",
        "Rank", "Pattern", "Score", "Z", "Position"
    );
    for r in summary.ranked.iter().take(shown) {
        println!(
            "{:>5}  {:<20} {:>10.4} {:>10.4} {:>10.4}",
            r.rank, r.pattern, r.score, r.z_score, r.position
        );
    }
    if summary.ranked.len() > shown {
        println!("  ... {} more", summary.ranked.len() - shown);
    }

    if !summary.failures.is_empty() {
        println!("\nUnscored patterns: {}", summary.failures.len());
        for f in &summary.failures {
            println!("  {} ({}): {}", f.pattern.to_uppercase(), f.stage, f.error);
        }
    }

    println!("\nClusters: {}", summary.clusters.len());
    for c in &summary.clusters {
        println!(
            "  cluster_{}: {} (support {}, {} patterns, {} sites)",
            c.id,
            c.consensus.to_uppercase(),
            format_support(c.consensus_support),
            c.members.len(),
            c.matches.len()
        );
    }
    println!("\nResults written to {}", summary.output_dir);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::pfm::Pfm;
    use crate::clustering::report::{MemberSummary, SiteMatch};
    use crate::core::types::{ClusterId, Strand};

    fn summary() -> ClusterSummary {
        ClusterSummary {
            id: ClusterId(1),
            members: vec![
                MemberSummary {
                    sequence: "acgt".to_string(),
                    strand: Strand::Forward,
                    support: 2.0 / 3.0,
                },
                MemberSummary {
                    sequence: "acgc".to_string(),
                    strand: Strand::Reverse,
                    support: 0.5,
                },
            ],
            consensus: "acgy".to_string(),
            consensus_support: 1.0,
            matches: vec![SiteMatch {
                gene_name: "geneA".to_string(),
                start: 3,
                sequence: "acgt".to_string(),
                strand: Strand::Reverse,
            }],
            pfm: Pfm::from_sequences(&["ac"]).unwrap(),
        }
    }

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> std::io::Result<()>,
    {
        let mut buf = Vec::new();
        write(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_clustered_patterns() {
        let text = render(|w| write_clustered_patterns(w, &[summary()]));
        assert_eq!(
            text,
            "cluster_no\tpattern\tpset_support\n1\tACGT\t0.67\n1\tACGC\t0.5\n"
        );
    }

    #[test]
    fn test_write_merged_patterns() {
        let text = render(|w| write_merged_patterns(w, &[summary()]));
        assert_eq!(
            text,
            "cluster_no\tstrand\tpattern\tpset_support\n1\t+\tACGT\t0.67\n1\t-\tACGC\t0.5\n"
        );
    }

    #[test]
    fn test_write_consensus_and_matches() {
        let consensus = render(|w| write_consensus_patterns(w, &[summary()]));
        assert_eq!(consensus, "cluster_no\tpattern\tpset_support\n1\tACGY\t1.0\n");

        let matches = render(|w| write_match_sequences(w, &[summary()]));
        assert_eq!(
            matches,
            "cluster_no\tgene_name\tstart\tsequence\tstrand\n1\tgeneA\t3\tACGT\t-\n"
        );
    }

    #[test]
    fn test_write_results_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("results");
        write_results(&out, &[summary()]).unwrap();

        for name in [
            "clustered_patterns.txt",
            "merged_patterns.txt",
            "consensus_patterns.txt",
            "match_sequences.txt",
            "cluster_1.pfm.txt",
        ] {
            assert!(out.join(name).exists(), "{name} missing");
        }
        let pfm = std::fs::read_to_string(out.join("cluster_1.pfm.txt")).unwrap();
        assert!(pfm.starts_with("cluster_1\t2\n"));
    }

    #[test]
    fn test_format_support_drops_trailing_zeros() {
        assert_eq!(format_support(0.5), "0.5");
        assert_eq!(format_support(2.0 / 3.0), "0.67");
        assert_eq!(format_support(1.0), "1.0");
        assert_eq!(format_support(0.0), "0.0");
    }
}
