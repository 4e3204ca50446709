//! tablesort command-line library
//!
//! Flag definitions and the connect → fetch → render pipeline used by the
//! `tablesort` binary (main.rs).

use clap::Parser;
use tablesort::{connect, reorder_schema, ConfigOverrides, ReorderConfig, ReorderError};

/// Exit status for every failed run
pub const EXIT_FAILURE: i32 = 1;

pub const USAGE_HINT: &str =
    "\nUsage: tablesort --db=<database> [OPTIONS]\nFor more information, use tablesort --help\n";

const AFTER_HELP: &str = "\
Description:
  Generates SQL statements that modify the columns of every table in a database,
  ordering them alphabetically with `id` first. Nothing is executed; the statements
  are printed to standard output.
  The only required parameter is the database name (--db or -d). The others can be
  taken from MYSQL_USER, MYSQL_PASSWORD and MYSQL_HOST (also read from a .env file
  or config/tablesort.toml) or use their defaults.

Example usage:
  tablesort --db=my_database --user=my_user --password=my_password --host=localhost";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "tablesort")]
#[command(
    about = "Print ALTER TABLE statements that sort each table's columns alphabetically, \
             keeping `id` first"
)]
#[command(version, after_help = AFTER_HELP)]
pub struct Cli {
    /// Name of the database (required)
    #[arg(short = 'd', long = "db", value_name = "DATABASE")]
    pub db: Option<String>,

    /// Username [env: MYSQL_USER] [default: root]
    #[arg(short = 'u', long, value_name = "USER")]
    pub user: Option<String>,

    /// User password [env: MYSQL_PASSWORD] [default: empty]
    #[arg(short = 'p', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// MySQL server address, optionally with :port [env: MYSQL_HOST] [default: 127.0.0.1]
    #[arg(short = 'H', long, value_name = "HOST")]
    pub host: Option<String>,

    /// House style: `created`/`updated` as timestamps, `json*` columns as JSON NULL,
    /// no CHECK clauses
    #[arg(long)]
    pub custom: bool,

    /// Verbose output on stderr
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            db: self.db.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            host: self.host.clone(),
            custom: self.custom,
        }
    }

    /// Default log filter; `RUST_LOG` still wins
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

/// Connect, read the catalog and render the statements
///
/// The connection is closed before returning, also when the query failed.
///
/// # Errors
///
/// Returns `ReorderError` for a bad host, a failed connection or a failed
/// catalog query.
pub fn generate(config: &ReorderConfig) -> tablesort::Result<String> {
    let options = config.connection_options()?;
    log::info!(
        "Reading schema `{}` from {}:{}",
        config.db,
        options.host,
        options.port
    );

    let mut catalog = connect(&options)?;
    let result = reorder_schema(&mut catalog, &config.db, config.custom);

    if let Err(e) = catalog.close() {
        log::warn!("{}", e);
    }

    Ok(result?)
}

/// The line printed to stderr when a run fails
///
/// A usage error is followed by a short usage hint; anything else is printed
/// with its full context chain.
pub fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ReorderError>() {
        Some(ReorderError::Usage(usage)) => format!("Error: {}{}", usage, USAGE_HINT),
        _ => format!("Error: {:#}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use clap::CommandFactory;
    use tablesort::{ConnectionError, FetchError, UsageError};

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_filter() {
        let cli = Cli::try_parse_from(["tablesort", "-q"]).unwrap();
        assert_eq!(cli.log_filter(), "error");
        let cli = Cli::try_parse_from(["tablesort", "-v"]).unwrap();
        assert_eq!(cli.log_filter(), "debug");
        let cli = Cli::try_parse_from(["tablesort"]).unwrap();
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_usage_failure_carries_hint() {
        let err = anyhow::Error::from(ReorderError::from(UsageError::MissingDatabase));
        let message = failure_message(&err);

        assert!(message.starts_with("Error: missing required parameter --db=<database>"));
        assert!(message.ends_with(USAGE_HINT));
    }

    #[test]
    fn test_other_failures_have_no_hint() {
        let errors = vec![
            anyhow::Error::from(ReorderError::from(FetchError::Closed)),
            anyhow::Error::from(ReorderError::from(ConnectionError::InvalidHost(
                "db:port".to_string(),
            ))),
        ];

        for err in errors {
            let message = failure_message(&err);
            assert!(message.starts_with("Error: "), "{}", message);
            assert!(!message.contains("Usage:"), "{}", message);
        }
    }

    #[test]
    fn test_failure_message_includes_context() {
        let err = Err::<(), _>(std::io::Error::other("broken pipe"))
            .context("Failed to write statements to stdout")
            .unwrap_err();

        assert_eq!(
            failure_message(&err),
            "Error: Failed to write statements to stdout: broken pipe"
        );
    }
}
