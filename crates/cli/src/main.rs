use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use filepack_chunker::{render_collection, ChunkingConfig, ChunkingStrategy};
use filepack_session::{ChunkSet, ChunkSizeController};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod collector;

use collector::{Collector, DEFAULT_MAX_FILE_SIZE};

#[derive(Parser)]
#[command(name = "filepack")]
#[command(about = "Split file collections into linked, size-bounded chunks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect files and directories, then chunk the combined text
    Pack(PackArgs),

    /// Chunk an existing combined text
    Chunk(ChunkArgs),
}

#[derive(Args)]
struct PackArgs {
    /// Files or directories to collect
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Also write the combined text to this file
    #[arg(long)]
    combined: Option<PathBuf>,

    /// Skip files larger than this many bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_file_size: u64,

    /// Include hidden files
    #[arg(long)]
    hidden: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct ChunkArgs {
    /// Combined text file ("-" reads stdin)
    file: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args)]
struct OutputArgs {
    /// Target chunk size in bytes
    #[arg(long, short = 's')]
    size: Option<usize>,

    /// Chunking strategy
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// TOML file with chunking settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write each chunk to chunk_<label>.txt in this directory
    #[arg(long, short = 'o')]
    out_dir: Option<PathBuf>,

    /// Print the analysis report instead of chunk contents
    #[arg(long)]
    report: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Skip instruction wrapping
    #[arg(long)]
    raw: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Semantic,
    SizeBased,
}

impl From<StrategyArg> for ChunkingStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Semantic => ChunkingStrategy::Semantic,
            StrategyArg::SizeBased => ChunkingStrategy::SizeBased,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Pack(args) => run_pack(args),
        Commands::Chunk(args) => run_chunk(args),
    }
}

fn run_pack(args: PackArgs) -> Result<()> {
    let entries = Collector::new(args.max_file_size, args.hidden).collect(&args.paths)?;
    if entries.is_empty() {
        bail!("No files found under the given paths");
    }
    let text = render_collection(&entries);

    if let Some(path) = &args.combined {
        fs::write(path, &text)
            .with_context(|| format!("Failed to write combined text to {}", path.display()))?;
        log::info!("Wrote combined text to {}", path.display());
    }

    emit(text, &args.output)
}

fn run_chunk(args: ChunkArgs) -> Result<()> {
    let text = if args.file.as_os_str() == "-" {
        io::read_to_string(io::stdin()).context("Failed to read stdin")?
    } else {
        fs::read_to_string(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?
    };
    emit(text, &args.output)
}

fn emit(text: String, output: &OutputArgs) -> Result<()> {
    let config = build_config(output)?;
    let controller = ChunkSizeController::new(text, config)?;
    let set = controller.snapshot();
    if set.degraded {
        log::warn!("Chunking failed; output holds unprocessed content");
    }

    if let Some(dir) = &output.out_dir {
        write_chunks(dir, &set)?;
    }

    if output.report {
        let report = controller.report();
        let rendered = if output.json {
            serde_json::to_string_pretty(&report)?
        } else {
            report.to_string()
        };
        return print_stdout(rendered.trim_end());
    }

    if output.out_dir.is_some() {
        return Ok(());
    }

    if output.json {
        return print_stdout(&serde_json::to_string_pretty(&*set)?);
    }
    let body = set
        .chunks
        .iter()
        .map(|chunk| chunk.wrapped_content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    print_stdout(&body)
}

/// Defaults, then the TOML file, then flags
fn build_config(output: &OutputArgs) -> Result<ChunkingConfig> {
    let mut config = match &output.config {
        Some(path) => load_config(path)?,
        None => ChunkingConfig::default(),
    };

    if let Some(size) = output.size {
        if size == 0 {
            bail!("--size must be greater than zero");
        }
        config.target_chunk_size = size;
        config.min_chunk_size = config.min_chunk_size.min(size);
    }
    if let Some(strategy) = output.strategy {
        config.strategy = strategy.into();
    }
    if output.raw {
        config.include_instructions = false;
    }

    config
        .validate()
        .map_err(|err| anyhow::anyhow!("Invalid chunking settings: {err}"))?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<ChunkingConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
}

fn write_chunks(dir: &Path, set: &ChunkSet) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    for chunk in &set.chunks {
        let path = dir.join(format!("chunk_{}.txt", chunk.label));
        fs::write(&path, &chunk.wrapped_content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    log::info!("Wrote {} chunks to {}", set.len(), dir.display());
    Ok(())
}

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> OutputArgs {
        OutputArgs {
            size: None,
            strategy: None,
            config: None,
            out_dir: None,
            report: false,
            json: false,
            raw: false,
        }
    }

    #[test]
    fn size_flag_lowers_the_minimum() {
        let args = OutputArgs {
            size: Some(500),
            raw: true,
            ..output()
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.target_chunk_size, 500);
        assert_eq!(config.min_chunk_size, 500);
        assert!(!config.include_instructions);
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filepack.toml");
        fs::write(
            &path,
            "strategy = \"size-based\"\ntarget_chunk_size = 4000\nmin_chunk_size = 1000\nresolve_calls = false\n",
        )
        .unwrap();

        let from_file = build_config(&OutputArgs {
            config: Some(path.clone()),
            ..output()
        })
        .unwrap();
        assert_eq!(from_file.strategy, ChunkingStrategy::SizeBased);
        assert_eq!(from_file.target_chunk_size, 4000);
        assert!(!from_file.resolve_calls);

        let overridden = build_config(&OutputArgs {
            config: Some(path),
            strategy: Some(StrategyArg::Semantic),
            size: Some(2000),
            ..output()
        })
        .unwrap();
        assert_eq!(overridden.strategy, ChunkingStrategy::Semantic);
        assert_eq!(overridden.target_chunk_size, 2000);
        assert_eq!(overridden.min_chunk_size, 1000);
    }

    #[test]
    fn zero_size_is_rejected() {
        let args = OutputArgs {
            size: Some(0),
            ..output()
        };
        assert!(build_config(&args).is_err());
    }
}
