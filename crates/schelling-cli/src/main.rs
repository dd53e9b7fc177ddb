use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schelling_core::config::{OutputMode, ScenarioConfig};
use schelling_core::metrics::ScenarioResult;
use schelling_core::scenario::{run_replicates, simulate};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

const BENCHMARK_REPLICATES: usize = 20;

#[derive(Parser)]
#[command(name = "schelling")]
#[command(about = "Schelling segregation scenario runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single scenario from a config file
    Run {
        /// Path to config file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for the run summary and final grid (optional)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run independent replicates of a scenario and print their results as JSON
    Replicates {
        /// Path to config file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Number of replicates (default: 10)
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Time the default scenario across grid sizes
    Benchmark,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn load_config(path: &Path) -> Result<ScenarioConfig> {
    let file = File::open(path).context("failed to open config file")?;
    let reader = BufReader::new(file);
    let config: ScenarioConfig =
        serde_json::from_reader(reader).context("failed to parse config")?;
    config.validate().context("Config validation error")?;
    Ok(config)
}

fn run_benchmark(side: usize) -> Result<()> {
    let config = ScenarioConfig {
        height: side,
        width: side,
        output: OutputMode::Patches,
        ..ScenarioConfig::default()
    };
    let start = Instant::now();
    let results = run_replicates(&config, BENCHMARK_REPLICATES)
        .with_context(|| format!("benchmark failed on {side}x{side} grid"))?;
    let elapsed = start.elapsed();

    let mean = |f: fn(&ScenarioResult) -> f64| {
        results.iter().map(f).sum::<f64>() / results.len() as f64
    };
    println!("--- {side}x{side} grid, {BENCHMARK_REPLICATES} replicates ---");
    println!(
        "  Wall time:     {:.1} ms ({:.2} ms/replicate)",
        elapsed.as_secs_f64() * 1e3,
        elapsed.as_secs_f64() * 1e3 / BENCHMARK_REPLICATES as f64
    );
    println!("  Mean steps:    {:.1}", mean(|r| r.n_steps));
    println!("  Mean happy:    {:.3}", mean(|r| r.happiness));
    println!(
        "  Mean patches:  {:.1}",
        mean(|r| r.n_patches.unwrap_or(0.0))
    );
    println!();
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = ScenarioConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p schelling-cli --release -- benchmark");
                eprintln!();
            }
            for side in [20, 50, 100, 200] {
                run_benchmark(side)?;
            }
        }
        Commands::Run { config, out } => {
            let scenario = load_config(&config)?;
            info!(path = %config.display(), "loaded config");

            let run = simulate(&scenario).context("scenario failed")?;
            let result = run.to_result(scenario.output, scenario.seam_stitching);

            if let Some(out_dir) = out {
                std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
                let summary_path = out_dir.join("summary.json");
                let file = File::create(summary_path).context("failed to create summary file")?;
                serde_json::to_writer_pretty(file, &run).context("failed to write summary")?;
                let result_path = out_dir.join("result.json");
                let file = File::create(result_path).context("failed to create result file")?;
                serde_json::to_writer_pretty(file, &result).context("failed to write result")?;
                println!("Run complete. Results saved to {:?}", out_dir);
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Commands::Replicates { config, count } => {
            let scenario = load_config(&config)?;
            let results = run_replicates(&scenario, count).context("replicate run failed")?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }
    Ok(())
}
