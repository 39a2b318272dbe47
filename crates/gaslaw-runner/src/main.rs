use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use gaslaw_core::SimConfig;
use gaslaw_runner::report;
use gaslaw_runner::runner::ScenarioRunner;
use gaslaw_runner::scenarios;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut scenario = String::from("all");
    let mut seconds = 5.0f64;
    let mut fps = 60.0f64;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config_path = Some(PathBuf::from(value(&args, i, "--config")));
            }
            "--output" => {
                i += 1;
                output_path = Some(PathBuf::from(value(&args, i, "--output")));
            }
            "--scenario" => {
                i += 1;
                scenario = value(&args, i, "--scenario").to_string();
            }
            "--seconds" => {
                i += 1;
                seconds = parse(&args, i, "--seconds");
            }
            "--fps" => {
                i += 1;
                fps = parse(&args, i, "--fps");
            }
            "--list" => {
                for s in scenarios::standard_scenarios() {
                    println!("{:<32} {}", s.name, s.description);
                }
                process::exit(0);
            }
            "--dump-config" => {
                match ron::ser::to_string_pretty(&SimConfig::default(), Default::default()) {
                    Ok(text) => println!("{text}"),
                    Err(e) => {
                        eprintln!("failed to serialize default config: {e}");
                        process::exit(1);
                    }
                }
                process::exit(0);
            }
            "--help" | "-h" => {
                eprintln!("Usage: gaslaw-runner [OPTIONS]");
                eprintln!("  --config <path>      Load a RON SimConfig (default: built-in values)");
                eprintln!("  --scenario <name>    Scenario to run, or 'all' (default: all)");
                eprintln!("  --seconds <s>        Simulated seconds per scenario (default: 5)");
                eprintln!("  --fps <f>            Frame rate driving the clock (default: 60)");
                eprintln!("  --output <path>      Save results as JSON");
                eprintln!("  --list               List built-in scenarios");
                eprintln!("  --dump-config        Print the default config as RON");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    if !(seconds.is_finite() && seconds > 0.0 && fps.is_finite() && fps > 0.0) {
        eprintln!("--seconds and --fps must be positive");
        process::exit(1);
    }

    let config = match config_path {
        Some(ref path) => {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("failed to read {}: {e}", path.display());
                process::exit(1);
            });
            SimConfig::from_ron(&text).unwrap_or_else(|e| {
                eprintln!("invalid config {}: {e}", path.display());
                process::exit(1);
            })
        }
        None => SimConfig::default(),
    };

    let selected = if scenario == "all" {
        scenarios::standard_scenarios()
    } else {
        match scenarios::find(&scenario) {
            Some(s) => vec![s],
            None => {
                eprintln!("Unknown scenario: {scenario} (try --list)");
                process::exit(1);
            }
        }
    };

    let runner = ScenarioRunner::new(config, seconds, fps);
    let mut results = Vec::new();
    for s in &selected {
        match runner.run(s) {
            Ok(result) => results.push(result),
            Err(e) => {
                log::error!("scenario '{}' failed: {e}", s.name);
                process::exit(1);
            }
        }
    }

    println!("\n## Gas Law Scenarios\n");
    println!("{}", report::format_markdown(&results));

    if let Some(ref path) = output_path {
        let run = report::RunReport {
            seconds,
            fps,
            results: results.clone(),
        };
        if let Err(e) = report::save_report(path, &run) {
            log::error!("failed to save report to {}: {e}", path.display());
            process::exit(1);
        }
        log::info!("Saved report to {}", path.display());
    }

    let unsettled = report::unsettled(&results);
    if !unsettled.is_empty() {
        eprintln!("ERROR: scenarios did not settle: {}", unsettled.join(", "));
        process::exit(1);
    }

    log::info!("All scenarios settled.");
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("{flag} needs a value");
            process::exit(1);
        }
    }
}

fn parse<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    let raw = value(args, i, flag);
    raw.parse().unwrap_or_else(|_| {
        eprintln!("invalid {flag} value: {raw}");
        process::exit(1);
    })
}
