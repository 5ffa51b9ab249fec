use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use baitmark::{Classification, ContentTree, Document, ScanConfig, ScanReport, ScanSession};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "baitmark",
    about = "Detect and flag clickbait headlines",
    version
)]
struct Cli {
    /// JSON configuration (catalog, queries, scanner options)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one fragment per line (reads stdin if no files provided)
    Classify { files: Vec<PathBuf> },
    /// Scan a JSON content tree and report which elements get flagged
    Scan { tree: PathBuf },
    /// Validate the configuration and print the effective catalog
    Check,
}

#[derive(Serialize)]
struct Verdict<'a> {
    text: &'a str,
    #[serde(flatten)]
    classification: Classification,
}

#[derive(Serialize)]
struct Flagged {
    node: usize,
    tag: String,
    text: String,
}

#[derive(Serialize)]
struct ScanOutput {
    report: ScanReport,
    flagged: Vec<Flagged>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn read_input(files: &[PathBuf]) -> anyhow::Result<String> {
    if files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("reading stdin")?;
        return Ok(input);
    }
    let mut input = String::new();
    for path in files {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        input.push_str(&text);
        input.push('\n');
    }
    Ok(input)
}

fn classify(config: ScanConfig, files: &[PathBuf]) -> anyhow::Result<()> {
    let classifier = config.classifier();
    let input = read_input(files)?;
    let verdicts: Vec<Verdict> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|text| Verdict {
            text,
            classification: classifier.evaluate(text),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&verdicts)?);
    Ok(())
}

fn scan(config: ScanConfig, tree: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(tree)
        .with_context(|| format!("reading {}", tree.display()))?;
    let doc = Document::from_json(&raw).with_context(|| format!("parsing {}", tree.display()))?;
    let root = doc.root();

    let mut session = ScanSession::new(doc, Some(root), config.into_scanner());
    let report = session.start();

    let doc = session.into_tree();
    let flagged = doc
        .marked_elements()
        .into_iter()
        .map(|id| Flagged {
            node: id.index(),
            tag: doc.tag_name(id).unwrap_or_default().to_string(),
            text: doc.text_content(id).trim().to_string(),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&ScanOutput { report, flagged })?
    );
    Ok(())
}

fn check(config: ScanConfig) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Classify { files } => classify(config, &files),
        Command::Scan { tree } => scan(config, &tree),
        Command::Check => check(config),
    }
}
