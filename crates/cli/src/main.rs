mod commands;
mod exit_code;
mod project;

use clap::{Parser, Subcommand};
use colored::Colorize;
use exit_code::ExitCode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "graphql-paginate")]
#[command(about = "Compile @paginate fields into refetchable GraphQL documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file (default: search upwards from the working directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Worker threads (default: available parallelism)
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    /// Force colored output even when not a TTY
    #[arg(long, global = true, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long, global = true, conflicts_with = "color")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every document and print the result with its refetch spec
    Compile {
        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Run the pass and report problems without printing documents
    ///
    /// Exits with 1 when any document could not be paginated. Recommended
    /// for CI pipelines.
    Check {
        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for tooling
    Json,
}

fn main() {
    let cli = Cli::parse();

    init_tracing();
    configure_colors(cli.color, cli.no_color);

    let workers = cli.workers.unwrap_or_else(|| {
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    });
    tracing::debug!(workers, "starting");

    let result = match cli.command {
        Commands::Compile { format } => commands::compile::run(cli.config, workers, format),
        Commands::Check { format } => commands::check::run(cli.config, workers, format),
    };

    let code = result.unwrap_or_else(|error| {
        eprintln!("{} {error:#}", "✗".red());
        ExitCode::IoError
    });
    code.exit()
}

/// Tracing is off unless `RUST_LOG` asks for it, and always goes to stderr.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Flags win over the `NO_COLOR`, `CLICOLOR_FORCE` and `CLICOLOR` variables,
/// in that order. With none of them set, `colored` decides from the TTY.
fn configure_colors(force_color: bool, no_color: bool) {
    use colored::control;

    if force_color {
        control::set_override(true);
    } else if no_color || std::env::var_os("NO_COLOR").is_some() {
        control::set_override(false);
    } else if let Ok(val) = std::env::var("CLICOLOR_FORCE") {
        if !val.is_empty() && val != "0" {
            control::set_override(true);
        }
    } else if std::env::var("CLICOLOR").is_ok_and(|val| val == "0") {
        control::set_override(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use colored::control::{self, SHOULD_COLORIZE};
    use std::sync::Mutex;

    // Serializes tests touching color env vars and the global override
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn with_clean_env<F: FnOnce()>(f: F) {
        let _lock = TEST_MUTEX.lock().unwrap();
        let saved: Vec<_> = ["NO_COLOR", "CLICOLOR", "CLICOLOR_FORCE"]
            .into_iter()
            .map(|key| (key, std::env::var_os(key)))
            .collect();
        for (key, _) in &saved {
            std::env::remove_var(key);
        }
        control::unset_override();

        f();

        control::unset_override();
        for (key, value) in saved {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_compile_with_global_flags() {
        let cli = Cli::try_parse_from([
            "graphql-paginate",
            "compile",
            "--format",
            "json",
            "--workers",
            "4",
            "--config",
            "paginate.config.yaml",
        ])
        .unwrap();
        assert_eq!(cli.workers, Some(4));
        assert_eq!(cli.config, Some(PathBuf::from("paginate.config.yaml")));
        assert!(matches!(
            cli.command,
            Commands::Compile {
                format: OutputFormat::Json
            }
        ));
    }

    #[test]
    fn test_color_flag_forces_colors_on() {
        with_clean_env(|| {
            std::env::set_var("NO_COLOR", "1");
            configure_colors(true, false);
            assert!(SHOULD_COLORIZE.should_colorize());
        });
    }

    #[test]
    fn test_no_color_env_beats_clicolor_force() {
        with_clean_env(|| {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("CLICOLOR_FORCE", "1");
            configure_colors(false, false);
            assert!(!SHOULD_COLORIZE.should_colorize());
        });
    }
}
