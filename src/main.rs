// stopwatch - main.rs
// Demo runner: times a few checkpoints and reports them through a Stopwatch.

use std::env;
use std::process::ExitCode;
use std::thread::sleep;
use std::time::Duration;

use stopwatch::{Stopwatch, StopwatchConfig};

const DEFAULT_ITERATIONS: u32 = 3;

fn run() -> Result<(), String> {
    // --- Get iteration count and optional config path from the command line ---
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("stopwatch");
    let iterations = match args.get(1) {
        Some(n) => n.parse::<u32>().map_err(|e| format!("Usage: {} [iterations] [config.json] ({})", program, e))?,
        None => DEFAULT_ITERATIONS,
    };
    let config = match args.get(2) {
        Some(path) => StopwatchConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => StopwatchConfig::new().label("demo").include_timestamp(true),
    };
    log::info!("running {} checkpoints with {:?}", iterations, config);

    let stopwatch = Stopwatch::new(config).map_err(|e| e.to_string())?;
    for n_iter in 0..iterations {
        sleep(Duration::from_millis(100));
        stopwatch.log(Some(&format!("{} th iteration", n_iter))).map_err(|e| e.to_string())?;
    }

    let total = stopwatch.finish();
    log::info!("finished after {:.3} sec.", total);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
