use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;

#[derive(Parser)]
#[command(name = "huffcode", about = "Huffman compress and decompress files", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log progress to stderr (honours RUST_LOG)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress INPUT into OUTPUT
    Compress { input: PathBuf, output: PathBuf },

    /// Decompress INPUT into OUTPUT
    Decompress { input: PathBuf, output: PathBuf },
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into())
    } else if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli.command) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Compress { input, output } => {
            let data = fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let tree = huffcode::build_tree(&data);

            let stats = write_atomically(&output, |file| {
                huffcode::compress(&tree, &data[..], file).map_err(Into::into)
            })?;

            info!(
                input = %input.display(),
                output = %output.display(),
                original = stats.input_bytes,
                compressed = stats.output_bytes(),
                "compressed file"
            );
        }
        Commands::Decompress { input, output } => {
            let file = File::open(&input).with_context(|| format!("opening {}", input.display()))?;

            let written = write_atomically(&output, |out| {
                huffcode::decompress(file, out)
                    .with_context(|| format!("decompressing {}", input.display()))
            })?;

            info!(output = %output.display(), bytes = written, "decompressed file");
        }
    }

    Ok(())
}

/// Runs `f` against a temporary file next to `path` and renames it into
/// place only if `f` succeeds.
fn write_atomically<T>(
    path: &Path,
    f: impl FnOnce(&mut File) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".part");
    let tmp = PathBuf::from(tmp_name);

    let mut file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;

    match f(&mut file) {
        Ok(value) => {
            file.sync_all()?;
            drop(file);
            fs::rename(&tmp, path)
                .with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;
            Ok(value)
        }
        Err(e) => {
            drop(file);
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}
