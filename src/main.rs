//! BB84 Simulator CLI
//!
//! Command-line interface for single runs, Monte Carlo batches and noise
//! sweeps of the BB84 protocol simulator.

use bb84_sim::{
    amplification::PrivacyAmplifier,
    config::FileConfig,
    metrics::MetricsRegistry,
    montecarlo::{BatchStatistics, MonteCarloRunner, SeedStrategy},
    protocol::{Protocol, RunResult},
    SimulatedChannel,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "bb84-sim", version, about = "BB84 quantum key distribution simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute a single protocol run
    Run(CommonArgs),
    /// Execute a Monte Carlo batch of independent runs
    Batch(CommonArgs),
    /// Execute one batch per noise level
    Sweep {
        #[command(flatten)]
        common: CommonArgs,
        /// Noise levels to sweep (overrides the config file)
        #[arg(long, value_delimiter = ',')]
        levels: Vec<f64>,
    },
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of qubits Alice prepares
    #[arg(long)]
    bits: Option<usize>,
    /// Channel bit-flip probability
    #[arg(long)]
    noise: Option<f64>,
    /// Enable the intercept-resend eavesdropper
    #[arg(long)]
    eve: bool,
    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Number of runs per batch
    #[arg(long)]
    runs: Option<usize>,
    /// Give every run of a batch the same seed
    #[arg(long)]
    fixed_seed: bool,
    /// Print batch metrics in Prometheus text format
    #[arg(long)]
    metrics: bool,
}

impl CommonArgs {
    /// Loads the file configuration and applies command-line overrides.
    fn load(&self) -> Result<FileConfig, String> {
        let mut config = match &self.config {
            Some(path) => FileConfig::from_file(path).map_err(|e| e.to_string())?,
            None => FileConfig::default(),
        };

        if let Some(bits) = self.bits {
            config.run.bit_count = bits;
        }
        if let Some(noise) = self.noise {
            config.run.noise_probability = noise;
        }
        if self.eve {
            config.run.eavesdropper_enabled = true;
        }
        if self.seed.is_some() {
            config.run.random_seed = self.seed;
        }
        if let Some(runs) = self.runs {
            config.batch.runs = runs;
        }
        if self.fixed_seed {
            config.batch.seed_strategy = SeedStrategy::Fixed;
        }

        config.run.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("BB84 Simulator v{}", bb84_sim::VERSION);

    if let Err(e) = execute(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn execute(command: Command) -> Result<(), String> {
    match command {
        Command::Run(args) => {
            let config = args.load()?;
            let result = protocol(&config)
                .run_once(&config.run)
                .map_err(|e| e.to_string())?;
            report_run(&result);
        }
        Command::Batch(args) => {
            let config = args.load()?;
            let stats = runner(&config)?
                .run(&config.run, config.batch.runs)
                .map_err(|e| e.to_string())?;
            report_batch(&stats);
            if args.metrics {
                print_metrics(&stats)?;
            }
        }
        Command::Sweep { common, levels } => {
            let config = common.load()?;
            let levels = if levels.is_empty() {
                config.batch.sweep_noise.clone()
            } else {
                levels
            };
            if levels.is_empty() {
                return Err("no noise levels given (use --levels or [batch] sweep_noise)".into());
            }

            let points = runner(&config)?
                .sweep_noise(&config.run, &levels, config.batch.runs)
                .map_err(|e| e.to_string())?;
            for point in &points {
                println!("noise = {:.4}", point.noise_probability);
                report_batch(&point.statistics);
            }
        }
    }
    Ok(())
}

fn protocol(config: &FileConfig) -> Protocol<SimulatedChannel> {
    let amplifier = config
        .amplification
        .enabled
        .then(|| PrivacyAmplifier::new(config.amplification.algorithm));
    Protocol::<SimulatedChannel>::default().with_amplifier(amplifier)
}

fn runner(config: &FileConfig) -> Result<MonteCarloRunner<SimulatedChannel>, String> {
    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        warn!("Interrupt received, finishing in-flight runs");
        handler_flag.store(true, Ordering::Relaxed);
    })
    .map_err(|e| format!("failed to install interrupt handler: {}", e))?;

    Ok(MonteCarloRunner::new(protocol(config))
        .with_seed_strategy(config.batch.seed_strategy)
        .with_stop_flag(stop))
}

fn report_run(result: &RunResult) {
    match result.abort_reason() {
        None => info!(seed = result.seed, "Run completed: SECURE"),
        Some(reason) => warn!(seed = result.seed, "Run completed: ABORT ({})", reason),
    }

    println!("seed:               {}", result.seed);
    println!(
        "outcome:            {}",
        if result.secure { "SECURE" } else { "ABORT" }
    );
    println!("sifted length:      {}", result.sifted_length);
    println!("sifting efficiency: {:.4}", result.sifting_efficiency);
    match result.qber {
        Some(qber) => println!("qber:               {:.4}", qber),
        None => println!("qber:               n/a"),
    }
    if let Some(info) = &result.information {
        println!("I(A:B):             {:.4}", info.mutual_info_ab);
        println!("I(A:E) bound:       {:.4}", info.mutual_info_ae_bound);
        println!("secret key rate:    {:.4}", info.secret_key_rate);
    }
    println!("final key length:   {}", result.final_key_length);
    if let Some(key) = &result.distilled_key {
        println!("distilled length:   {}", key.bit_length());
    }
}

fn report_batch(stats: &BatchStatistics) {
    if stats.completed_runs < stats.requested_runs {
        warn!(
            "Batch incomplete: {} of {} runs",
            stats.completed_runs, stats.requested_runs
        );
    }

    println!(
        "runs:               {} / {}",
        stats.completed_runs, stats.requested_runs
    );
    match (stats.qber_mean, stats.qber_std_dev) {
        (Some(mean), Some(std_dev)) => {
            println!("qber:               {:.4} ± {:.4}", mean, std_dev)
        }
        _ => println!("qber:               n/a"),
    }
    println!(
        "sifting efficiency: {:.4} ± {:.4}",
        stats.sifting_efficiency_mean, stats.sifting_efficiency_std_dev
    );
    println!(
        "final key length:   {:.1} ± {:.1}",
        stats.final_key_length_mean, stats.final_key_length_std_dev
    );
    println!("secret key rate:    {:.4}", stats.secret_key_rate_mean);
    println!(
        "aborted:            {} ({} insufficient data)",
        stats.aborted_runs, stats.insufficient_data_runs
    );
    println!("abort rate:         {:.4}", stats.abort_rate);
}

fn print_metrics(stats: &BatchStatistics) -> Result<(), String> {
    let registry = MetricsRegistry::new().map_err(|e| e.to_string())?;
    registry.record_batch(stats);
    print!("{}", registry.encode().map_err(|e| e.to_string())?);
    Ok(())
}
