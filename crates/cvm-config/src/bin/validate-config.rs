//! Config validation CLI tool
//!
//! Validates a cvm-session configuration file and reports any errors.

use cvm_config::{CURRENT_CONFIG_VERSION, ConfigError, LaunchStrategy};
use cvm_util::{default_config_path, format_countdown};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a cvm-session configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match cvm_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", CURRENT_CONFIG_VERSION);
            println!(
                "  Quota: free {}, premium {} (warning at {})",
                format_countdown(settings.timer.free_quota_seconds),
                format_countdown(settings.timer.premium_quota_seconds),
                format_countdown(settings.timer.warning_seconds),
            );
            let strategy = match settings.session.launch_strategy {
                LaunchStrategy::Direct => "direct",
                LaunchStrategy::EndpointRelative => "endpoint-relative",
            };
            println!("  Launch strategy: {}", strategy);
            println!("  Landing: {}", settings.landing_url());

            for (title, list) in [
                ("Endpoints", &settings.endpoints),
                ("Premium endpoints", &settings.premium_endpoints),
            ] {
                println!();
                println!("{}:", title);
                for endpoint in list {
                    let marker = if endpoint.is_selected { "*" } else { " " };
                    println!("  {} {} ({})", marker, endpoint.label, endpoint.url);
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
