//! # shadow-share
//!
//! Hides a secret BMP image in `n` cover BMPs so that any `k` of them
//! reconstruct it.
//!
//! ```bash
//! shadow-share distribute --secret secret.bmp -k 3 -n 5 --dir covers/
//! ```
//!
//! The first `n` `.bmp` files of `--dir`, in file name order, are
//! overwritten in place with shadows `1..=n`.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;

use shadow_share::{
    Bitmap, Config, FileShadowStore, RemainderPolicy, ShadowGenerator, ShadowStore, SplitMode,
};

#[derive(Parser, Debug)]
#[command(
    name = "shadow-share",
    version,
    about = "(k, n) threshold secret image sharing in BMP covers",
    long_about = None
)]
struct Cli {
    /// Log every shadow as it is written
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a secret image into shadows hidden in cover images
    Distribute(DistributeArgs),
}

#[derive(Args, Debug)]
struct DistributeArgs {
    /// Secret BMP image
    #[arg(short, long)]
    secret: PathBuf,

    /// Shadows needed to reconstruct the secret
    #[arg(short)]
    k: u8,

    /// Total number of shadows; defaults to the number of covers found
    #[arg(short)]
    n: Option<u8>,

    /// Directory holding the cover BMP images
    #[arg(short, long)]
    dir: PathBuf,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed the blinding random source for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Process shadows one at a time
    #[arg(long)]
    sequential: bool,

    /// Handling of secret bytes that do not fill a final block
    #[arg(long, value_enum)]
    remainder: Option<RemainderArg>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RemainderArg {
    Reject,
    Truncate,
    Pad,
}

impl From<RemainderArg> for RemainderPolicy {
    fn from(arg: RemainderArg) -> Self {
        match arg {
            RemainderArg::Reject => RemainderPolicy::Reject,
            RemainderArg::Truncate => RemainderPolicy::Truncate,
            RemainderArg::Pad => RemainderPolicy::Pad,
        }
    }
}

/// Initialize the logging system with level and message formatting.
///
/// `RUST_LOG` overrides the level chosen on the command line.
fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    Builder::new()
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .filter_level(level)
        .parse_default_env()
        .init();
}

impl DistributeArgs {
    /// Configuration file contents with command line overrides applied
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Config::from_toml_str(&content)?
            }
            None => Config::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.sequential {
            config = config.with_mode(SplitMode::Sequential);
        }
        if let Some(remainder) = self.remainder {
            config = config.with_remainder(remainder.into());
        }
        Ok(config)
    }
}

fn distribute(args: DistributeArgs) -> Result<()> {
    let config = args.load_config()?;

    let secret = Bitmap::open(&args.secret)
        .with_context(|| format!("reading secret image {}", args.secret.display()))?;

    let store = FileShadowStore::open(&args.dir)
        .with_context(|| format!("listing covers in {}", args.dir.display()))?;
    if store.contains(&args.secret)? {
        bail!(
            "secret image {} is inside the cover directory and would be overwritten",
            args.secret.display()
        );
    }

    let n = match args.n {
        Some(n) => n,
        None => u8::try_from(store.cover_count())
            .context("too many cover images; pass -n explicitly")?,
    };
    let store = store.with_limit(n as usize)?;

    log::info!(
        "distributing {} ({} pixel bytes) into {} shadows, threshold {}",
        args.secret.display(),
        secret.image_size_bytes(),
        n,
        args.k
    );

    let mut generator = ShadowGenerator::builder(n, args.k)
        .with_config(config)
        .build()?;
    let shadows = generator.distribute(&secret, &store)?;

    for (shadow, path) in shadows.iter().zip(store.paths()) {
        log::info!("shadow {} -> {}", shadow.number, path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Distribute(args) => distribute(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
