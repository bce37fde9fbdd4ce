//! spell_sim - run a scenario file from the command line

mod cli;

use anyhow::{Context, Result};
use spell_core::config::load_constants;
use spell_sim::{run_trials, Scenario};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> Result<()> {
    setup_logging();
    let args = cli::parse_args();

    let mut scenario = Scenario::load(&args.scenario)
        .with_context(|| format!("failed to load scenario {}", args.scenario.display()))?;
    if let Some(path) = &args.constants {
        scenario.constants =
            load_constants(path).with_context(|| format!("failed to load constants {}", path.display()))?;
    }

    let iterations = args.iterations.unwrap_or(scenario.iterations);
    let seed = args.seed.unwrap_or(scenario.seed);
    let summary = run_trials(&scenario, iterations, seed).context("simulation failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}

/// Log to stderr so stdout stays clean for the summary
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
