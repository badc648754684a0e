//! `sqlcheck` -- Sensu/Nagios check that runs one SQL query and compares
//! the result against warning/critical thresholds.
//!
//! Prints a single status line on stdout and exits with the check state:
//! `0` OK, `1` WARNING, `2` CRITICAL, `3` UNKNOWN. Logs go to stderr.
//!
//! # Environment variables
//!
//! | Variable           | Flag             | Default |
//! |--------------------|------------------|---------|
//! | `SQL_URL`          | `--dburl`        | --      |
//! | `SQL_DRIVER`       | `--driver`       | `mysql` |
//! | `SQL_HOST`         | `-H/--host`      | --      |
//! | `SQL_PORT`         | `-P/--port`      | `0`     |
//! | `SQL_USER`         | `-u/--user`      | --      |
//! | `SQL_PASSWORD`     | `-p/--password`  | --      |
//! | `SQL_DATABASE`     | `-d/--database`  | --      |
//! | `SQL_QUERY`        | `-q/--query`     | --      |
//! | `SQL_QUERY_ARGS`   | `-a/--query-args`| --      |
//! | `SQL_WARNING`      | `-w/--warning`   | --      |
//! | `SQL_CRITICAL`     | `-c/--critical`  | --      |
//! | `SQL_UNQUOTE`      | `-j/--unquote`   | `false` |
//! | `SQL_TIMEOUT_SECS` | `--timeout-secs` | `10`    |
//! | `DEBUG`            | `--debug`        | `false` |

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sqlcheck::config::{CheckArgs, CheckConfig};
use sqlcheck::check;

const DEFAULT_FILTER: &str = "sqlcheck=info,sqlcheck_db=info,sqlcheck_core=info";
const DEBUG_FILTER: &str = "sqlcheck=debug,sqlcheck_db=debug,sqlcheck_core=debug";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = CheckArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                if args.debug {
                    DEBUG_FILTER.into()
                } else {
                    DEFAULT_FILTER.into()
                }
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let outcome = match CheckConfig::try_from(args) {
        Ok(config) => {
            tracing::debug!(
                driver = %config.connection.driver,
                query = %config.query,
                warning = %config.warning,
                critical = %config.critical,
                "Loaded check configuration"
            );
            check::run(&config).await
        }
        Err(e) => Err(e.into()),
    };

    let (line, severity) = check::render(&outcome);
    println!("{line}");
    ExitCode::from(severity.exit_code())
}
