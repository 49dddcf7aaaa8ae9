use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod cart;
mod session;

use cart::{check_cart, disassemble_image, load_config, read_cart, CartInfo, ConfigOverrides};
use session::{run_cart, RunOptions};

/// Gamequeer - badge game engine
#[derive(Parser)]
#[command(name = "gamequeer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Headless runner for Gamequeer badge cartridges", long_about = "Gamequeer Cartridge Toolkit\n\nRuns and examines compiled Gamequeer cartridges without badge hardware:\n  - Headless runs driven by a key script\n  - Header inspection and load checks\n  - Bytecode disassembly")]
#[command(author = "Gamequeer Team")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a cartridge headless
    Run {
        /// Path to the cartridge image
        cart: PathBuf,
        /// Save image to load and write back
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
        /// Stop after this many ticks
        #[arg(long, value_name = "N")]
        ticks: Option<u64>,
        /// Key script, one key per tick (a=L d=R l=A k=B s=CLICK .=idle)
        #[arg(long, value_name = "KEYS", default_value = "")]
        input: String,
        /// Pace ticks to wall-clock time
        #[arg(long)]
        realtime: bool,
        /// JSON engine configuration
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: ConfigOverrides,
    },
    /// Show the cartridge header
    Inspect {
        /// Path to the cartridge image
        cart: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a cartridge and walk its code without running it
    Check {
        /// Path to the cartridge image
        cart: PathBuf,
    },
    /// Disassemble startup code and every reachable stage
    Disassemble {
        /// Path to the cartridge image
        cart: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            cart,
            save,
            ticks,
            input,
            realtime,
            config,
            overrides,
        } => {
            let options = RunOptions {
                save,
                ticks,
                keys: input,
                realtime,
            };
            run_command(&cart, config, &overrides, &options)
        }
        Commands::Inspect { cart, json } => inspect_command(&cart, json),
        Commands::Check { cart } => check_command(&cart),
        Commands::Disassemble { cart } => disassemble_command(&cart),
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(
    path: &Path,
    config: Option<PathBuf>,
    overrides: &ConfigOverrides,
    options: &RunOptions,
) -> Result<()> {
    let config = load_config(config.as_deref(), overrides)?;
    let image = read_cart(path)?;
    let report = run_cart(image, config, options)?;
    report.print();
    if report.summary.unloaded {
        bail!("cartridge requested an unload: it is not compatible with this engine");
    }
    Ok(())
}

fn inspect_command(path: &Path, json: bool) -> Result<()> {
    let info = CartInfo::from_image(&read_cart(path)?)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        info.print();
    }
    Ok(())
}

fn check_command(path: &Path) -> Result<()> {
    let report = check_cart(read_cart(path)?, &Default::default())?;
    println!("✓ Cartridge '{}' loads", report.title);
    if report.code_faults.is_empty() {
        println!("✓ All reachable code decodes");
        return Ok(());
    }
    for line in &report.code_faults {
        eprintln!("✗ {line}");
    }
    bail!("{} problem(s) in reachable code", report.code_faults.len())
}

fn disassemble_command(path: &Path) -> Result<()> {
    let listing = disassemble_image(read_cart(path)?, &Default::default())?;
    println!("Disassembly of '{}':", path.display());
    println!();
    print!("{listing}");
    Ok(())
}
