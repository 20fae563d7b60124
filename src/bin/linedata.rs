use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use is_terminal::IsTerminal;
use linedata::{ConsolidateOptions, FileInput, LineRecord, consolidate_all};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    Scm,
    Measures,
    Duplications,
    Highlighting,
    Symbols,
}

#[derive(Debug, Parser)]
#[command(name = "linedata", version, about = "Consolidate per-file analysis data into per-line records")]
struct Args {
    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Json, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Consolidate every file of a JSON batch and print its lines
    Consolidate {
        /// Batch file path, or '-' for stdin
        #[arg(long = "input", default_value = "-")]
        input: String,
        /// Skip a mapper (repeatable)
        #[arg(long = "skip", value_enum)]
        skip: Vec<Section>,
    },
    /// Print the data hash of every consolidated file
    Hash {
        #[arg(long = "input", default_value = "-")]
        input: String,
    },
}

#[derive(Debug, Deserialize)]
struct Batch {
    files: Vec<FileInput>,
}

#[derive(Debug, Serialize)]
struct ConsolidatedFile {
    key: String,
    lines: Vec<LineRecord>,
}

#[derive(Debug, Serialize)]
struct FileHash {
    key: String,
    lines: usize,
    hash: String,
}

fn main() -> anyhow::Result<()> {
    // default level comes from RUST_LOG
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(""))
        .format_timestamp(None)
        .try_init();
    let args = Args::parse();

    match args.cmd {
        Command::Consolidate { input, skip } => run_consolidate(args.format, &input, &skip),
        Command::Hash { input } => run_hash(args.format, &input),
    }
}

fn read_input(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return std::fs::read_to_string(arg).with_context(|| format!("read batch: {}", arg));
    }
    if io::stdin().is_terminal() {
        anyhow::bail!("no stdin detected: pass --input or pipe a JSON batch into linedata");
    }
    let mut s = String::new();
    io::stdin().read_to_string(&mut s)?;
    Ok(s)
}

fn load_batch(arg: &str) -> anyhow::Result<Batch> {
    let content = read_input(arg)?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("failed to parse batch JSON: {}", e))
}

fn options_for(skip: &[Section]) -> ConsolidateOptions {
    ConsolidateOptions {
        scm: !skip.contains(&Section::Scm),
        measures: !skip.contains(&Section::Measures),
        duplications: !skip.contains(&Section::Duplications),
        highlighting: !skip.contains(&Section::Highlighting),
        symbols: !skip.contains(&Section::Symbols),
    }
}

/// Consolidated files plus the number of files that failed. Failures are
/// reported on stderr and do not stop the rest of the batch.
fn consolidate_batch(batch: Batch, opts: ConsolidateOptions) -> (Vec<ConsolidatedFile>, usize) {
    let results = consolidate_all(&batch.files, opts);
    let mut out = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (input, res) in batch.files.into_iter().zip(results) {
        match res {
            Ok(lines) => {
                log::info!("consolidated {} lines={}", input.key, lines.len());
                out.push(ConsolidatedFile { key: input.key, lines });
            }
            Err(e) => {
                eprintln!("error: {}", e);
                failed += 1;
            }
        }
    }
    (out, failed)
}

fn finish(failed: usize, total: usize) -> anyhow::Result<()> {
    if failed > 0 {
        anyhow::bail!("{} of {} files failed to consolidate", failed, total);
    }
    Ok(())
}

fn run_consolidate(fmt: OutputFormat, input: &str, skip: &[Section]) -> anyhow::Result<()> {
    let batch = load_batch(input)?;
    log::info!("mode=consolidate files={} skip={:?}", batch.files.len(), skip);
    let (files, failed) = consolidate_batch(batch, options_for(skip));
    match fmt {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&files)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&files)?),
        OutputFormat::Text => {
            for f in &files {
                println!("# {}", f.key);
                print!("{}", linedata::to_text(&f.lines));
            }
        }
    }
    finish(failed, files.len() + failed)
}

fn run_hash(fmt: OutputFormat, input: &str) -> anyhow::Result<()> {
    let batch = load_batch(input)?;
    let (files, failed) = consolidate_batch(batch, ConsolidateOptions::default());
    let hashes: Vec<FileHash> = files
        .iter()
        .map(|f| FileHash { key: f.key.clone(), lines: f.lines.len(), hash: linedata::data_hash(&f.lines) })
        .collect();
    match fmt {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hashes)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&hashes)?),
        OutputFormat::Text => {
            for h in &hashes {
                println!("{}\t{}\t{}", h.hash, h.lines, h.key);
            }
        }
    }
    finish(failed, hashes.len() + failed)
}
