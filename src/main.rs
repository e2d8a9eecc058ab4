//! Galton board entry point
//!
//! Native: runs a headless board for a fixed amount of simulated time and
//! prints the resulting bin histogram. The browser build drives the engine
//! through `galton::wasm` instead.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;
    use galton::{BoardConfig, DropperConfig, FrameDriver, PinPattern, SimulationEngine};

    env_logger::init();

    let options = Options::parse();

    let mut config = match &options.config {
        Some(path) => BoardConfig::load(path),
        None => BoardConfig::default(),
    };
    if options.triangular {
        config.pattern = PinPattern::Triangular;
    }

    let engine = match options.seed {
        Some(seed) => SimulationEngine::with_seed(config, seed),
        None => SimulationEngine::new(config),
    };
    let mut driver = FrameDriver::new(
        engine,
        DropperConfig {
            interval_ms: options.interval,
            budget: Some(options.balls),
        },
    );

    log::info!(
        "Galton board (native) running {:.1}s at {} fps",
        options.seconds,
        FPS
    );

    let frame_ms = 1000.0 / FPS as f64;
    let frames = (options.seconds * FPS as f64).ceil() as u64;
    driver.start_drop();
    for frame in 0..=frames {
        driver.frame(frame as f64 * frame_ms);
    }

    let snapshot = driver.snapshot();
    if options.json {
        match snapshot.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Failed to serialize snapshot: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    print!("{}", snapshot.histogram(HISTOGRAM_WIDTH));
    println!(
        "dropped={} settled={} falling={}",
        driver.dropper().dropped(),
        snapshot.settled,
        snapshot.falling
    );
    if let Some(mean) = snapshot.mean_bin() {
        let center = (snapshot.bin_counts.len().saturating_sub(1)) as f64 / 2.0;
        println!("mean bin {mean:.2} (center {center:.1})");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is galton::wasm::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
const FPS: u32 = 60;

#[cfg(not(target_arch = "wasm32"))]
const HISTOGRAM_WIDTH: usize = 50;

/// Run a headless Galton board and print where the balls landed
#[cfg(not(target_arch = "wasm32"))]
#[derive(clap::Parser, Debug, Clone, PartialEq)]
#[command(version)]
struct Options {
    /// JSON board config. Missing or invalid files fall back to the defaults.
    config: Option<std::path::PathBuf>,

    /// Simulated seconds to run for.
    #[arg(long, value_name = "SECONDS", default_value_t = 30.0)]
    seconds: f64,

    /// Number of balls to drop.
    #[arg(long, value_name = "COUNT", default_value_t = 200)]
    balls: usize,

    /// Milliseconds between drops.
    #[arg(
        long,
        value_name = "MILLISECONDS",
        default_value_t = galton::consts::DROP_INTERVAL_MS
    )]
    interval: f64,

    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Use a triangular pin pattern regardless of the config.
    #[arg(long)]
    triangular: bool,

    /// Print the final snapshot as JSON instead of a histogram.
    #[arg(long)]
    json: bool,
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    fn parse(args: &[&str]) -> Result<Options, clap::Error> {
        Options::try_parse_from(std::iter::once("galton").chain(args.iter().copied()))
    }

    #[test]
    fn test_command_is_well_formed() {
        Options::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let options = parse(&[]).unwrap();
        assert_eq!(options.config, None);
        assert_eq!(options.seconds, 30.0);
        assert_eq!(options.balls, 200);
        assert_eq!(options.interval, galton::consts::DROP_INTERVAL_MS);
        assert_eq!(options.seed, None);
        assert!(!options.triangular);
        assert!(!options.json);
    }

    #[test]
    fn test_flags_and_path() {
        let options = parse(&["board.json", "--balls", "10", "--seed", "3", "--triangular"]).unwrap();
        assert_eq!(
            options.config.as_deref(),
            Some(std::path::Path::new("board.json"))
        );
        assert_eq!(options.balls, 10);
        assert_eq!(options.seed, Some(3));
        assert!(options.triangular);
    }

    #[test]
    fn test_bad_values() {
        assert!(parse(&["--balls"]).is_err());
        assert!(parse(&["--seconds", "soon"]).is_err());
        assert!(parse(&["--wat"]).is_err());
        assert!(parse(&["a.json", "b.json"]).is_err());
    }
}
