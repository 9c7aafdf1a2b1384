//! Panel simulator entry point — CLI wiring and config-driven demo runs.

use std::path::Path;
use std::process;

use loadshed_sim::config::PanelConfig;
use loadshed_sim::io::export::{export_alerts_csv, export_telemetry_csv};
use loadshed_sim::runner::run_demo;

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    preset: Option<String>,
    threshold_override: Option<u32>,
    ticks_override: Option<usize>,
    seed_override: Option<u64>,
    telemetry_out: Option<String>,
    alerts_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
    #[cfg(feature = "tui")]
    tui: bool,
}

fn print_help() {
    eprintln!("loadshed-sim — Simulated load-management panel with threshold shedding");
    eprintln!();
    eprintln!("Usage: loadshed-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load panel config from TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (demo, brownout, manual)");
    eprintln!("  --threshold <watts>      Override starting threshold");
    eprintln!("  --ticks <n>              Override demo tick count");
    eprintln!("  --seed <u64>             Override meter random seed");
    eprintln!("  --telemetry-out <path>   Export per-tick telemetry to CSV");
    eprintln!("  --alerts-out <path>      Export emitted alerts to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the demo run");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    #[cfg(feature = "tui")]
    eprintln!("  --tui                    Run the live interactive panel");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the demo preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        preset: None,
        threshold_override: None,
        ticks_override: None,
        seed_override: None,
        telemetry_out: None,
        alerts_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
        #[cfg(feature = "tui")]
        tui: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --config requires a path argument");
                    process::exit(1);
                }
                cli.config_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--threshold" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --threshold requires a watts argument");
                    process::exit(1);
                }
                if let Ok(w) = args[i].parse::<u32>() {
                    cli.threshold_override = Some(w);
                } else {
                    eprintln!(
                        "error: --threshold value \"{}\" is not a valid u32",
                        args[i]
                    );
                    process::exit(1);
                }
            }
            "--ticks" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --ticks requires a count argument");
                    process::exit(1);
                }
                if let Ok(n) = args[i].parse::<usize>() {
                    cli.ticks_override = Some(n);
                } else {
                    eprintln!("error: --ticks value \"{}\" is not a valid count", args[i]);
                    process::exit(1);
                }
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--telemetry-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --telemetry-out requires a path argument");
                    process::exit(1);
                }
                cli.telemetry_out = Some(args[i].clone());
            }
            "--alerts-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --alerts-out requires a path argument");
                    process::exit(1);
                }
                cli.alerts_out = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            #[cfg(feature = "tui")]
            "--tui" => {
                cli.tui = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load config: --config takes priority, then --preset, then demo default
    let mut config = if let Some(ref path) = cli.config_path {
        match PanelConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match PanelConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        PanelConfig::demo()
    };

    // Apply overrides
    if let Some(watts) = cli.threshold_override {
        config.panel.threshold_w = watts;
    }
    if let Some(ticks) = cli.ticks_override {
        config.demo.ticks = ticks;
    }
    if let Some(seed) = cli.seed_override {
        config.meter.seed = seed;
    }

    // Validate
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    #[cfg(feature = "tui")]
    if cli.tui {
        let preset = cli.preset.as_deref().unwrap_or("demo");
        loadshed_sim::tui::run(&config, preset);
        return;
    }

    // Run the scripted demo
    let report = match run_demo(&config, true) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: demo run failed: {e}");
            process::exit(1);
        }
    };

    // Final panel summary
    let snap = &report.snapshot;
    println!(
        "\nFinal state: {} W commanded of {} W capacity ({} W headroom), \
         threshold {} W, auto mode {}",
        snap.total_power_w,
        snap.capacity_w,
        snap.headroom_w,
        snap.threshold_w,
        if snap.auto_mode { "on" } else { "off" },
    );
    for load in &snap.loads {
        println!(
            "  [{}] {:<18} {:>4} W  feeder {}",
            if load.on { "ON " } else { "off" },
            load.name,
            load.power_draw_w,
            load.feeder,
        );
    }

    // Export CSVs if requested
    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_telemetry_csv(&report.telemetry, Path::new(path)) {
            eprintln!("error: failed to write telemetry CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }
    if let Some(ref path) = cli.alerts_out {
        if let Err(e) = export_alerts_csv(&report.alerts, Path::new(path)) {
            eprintln!("error: failed to write alerts CSV: {e}");
            process::exit(1);
        }
        eprintln!("Alerts written to {path}");
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(loadshed_sim::api::AppState {
            snapshot: report.snapshot,
            alerts: report.alerts,
            telemetry: report.telemetry,
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(loadshed_sim::api::serve(state, addr));
    }
}
