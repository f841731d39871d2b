use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "proctex", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a JSON recipe and write its bitmaps.
    Run(RunArgs),
    /// Parse a recipe without executing it.
    Check(CheckArgs),
    /// Convert an image file to a 32-bit bitmap.
    Bitmap(BitmapArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input recipe JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override dispatcher worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Directory relative recipe paths resolve against (defaults to the recipe's directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input recipe JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct BitmapArgs {
    /// Input image (any format the `image` crate decodes).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output BMP path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Check(args) => cmd_check(args),
        Command::Bitmap(args) => cmd_bitmap(args),
    }
}

fn load_config(path: Option<&Path>, threads: Option<usize>) -> anyhow::Result<proctex::EngineConfig> {
    let mut cfg = match path {
        Some(p) => proctex::EngineConfig::load(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => proctex::EngineConfig::default(),
    };
    if threads.is_some() {
        cfg.threads = threads;
    }
    Ok(cfg)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let recipe = proctex::Recipe::load(&args.in_path)
        .with_context(|| format!("read recipe '{}'", args.in_path.display()))?;
    let cfg = load_config(args.config.as_deref(), args.threads)?;
    let base_dir = match args.out_dir {
        Some(dir) => dir,
        None => args
            .in_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };

    let mut reg = proctex::TextureRegistry::new(&cfg, proctex::NoResources)
        .context("initialise texture registry")?;
    let outcome = proctex::run_recipe(&mut reg, &recipe, &base_dir)
        .with_context(|| format!("run recipe '{}'", args.in_path.display()))?;

    for path in &outcome.written {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let recipe = proctex::Recipe::load(&args.in_path)
        .with_context(|| format!("read recipe '{}'", args.in_path.display()))?;
    eprintln!("{}: {} steps", args.in_path.display(), recipe.steps.len());
    Ok(())
}

fn cmd_bitmap(args: BitmapArgs) -> anyhow::Result<()> {
    let mut reg = proctex::TextureRegistry::new(&proctex::EngineConfig::default(), proctex::NoResources)
        .context("initialise texture registry")?;
    let h = reg
        .load_image(&args.in_path)
        .with_context(|| format!("decode image '{}'", args.in_path.display()))?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    reg.write_bitmap(h, &args.out)
        .with_context(|| format!("write bitmap '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
