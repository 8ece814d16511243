//! Runs the tandem queue model and prints its report.
//!
//! Usage: `selene-tandem [--arrival-rate L] [--service-rate-1 M1] [--service-rate-2 M2] [--horizon T]`

use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use selene::tandem::{self, TandemConfig};

#[derive(Parser, Debug)]
#[command(name = "selene-tandem")]
#[command(about = "Simulate two single-server stations in series")]
struct Args {
    /// Customer arrival rate
    #[arg(long, default_value_t = 1.0)]
    arrival_rate: f64,

    /// Service rate of station 1
    #[arg(long = "service-rate-1", default_value_t = 1.0 / 0.7)]
    service_rate_1: f64,

    /// Service rate of station 2
    #[arg(long = "service-rate-2", default_value_t = 1.0 / 0.9)]
    service_rate_2: f64,

    /// Simulation time at which the run ends
    #[arg(long, default_value_t = 1_000_000.0)]
    horizon: f64,
}

impl Args {
    fn tandem_config(&self) -> TandemConfig {
        TandemConfig::new(self.arrival_rate, self.service_rate_1, self.service_rate_2)
            .with_horizon(self.horizon)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() {
    init_logging();
    let args = Args::parse();
    let config = args.tandem_config();

    println!("═══════════════════════════════════════════════════════");
    println!("  Selene — Discrete-Event Simulation Kernel");
    println!("  Tandem queue: two stations in series");
    println!("═══════════════════════════════════════════════════════");
    println!();
    println!("  Parameters:");
    println!("    Arrival rate:        {:.4}", config.arrival_rate);
    println!(
        "    Service rates:       {:.4} / {:.4}",
        config.service_rate_1, config.service_rate_2
    );
    println!(
        "    Offered load:        {:.4} / {:.4}",
        config.load_1(),
        config.load_2()
    );
    println!("    Horizon:             {}", config.horizon);
    println!();

    let report = match tandem::run(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            eprintln!("  ✗ {}", e);
            process::exit(1);
        }
    };

    println!("  Results:");
    println!("{}", report);
    println!();
    println!("  ✓ Run complete.");
}
