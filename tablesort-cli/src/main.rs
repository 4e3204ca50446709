//! tablesort
//!
//! Prints `ALTER TABLE` statements that reorder the columns of every table in
//! a MySQL schema. Statements go to stdout, logs and errors to stderr.

use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::process;
use tablesort::ReorderConfig;
use tablesort_cli::{failure_message, generate, Cli, EXIT_FAILURE};

fn main() {
    // MYSQL_* may live in .env; a missing file is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    match run(&cli) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", failure_message(&e));
            process::exit(EXIT_FAILURE);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = ReorderConfig::load(cli.overrides())?;
    log::debug!("Resolved configuration: {:?}", config);

    let sql = generate(&config)?;

    // Single write, only after the whole schema rendered
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(sql.as_bytes())
        .and_then(|()| stdout.flush())
        .context("Failed to write statements to stdout")?;

    Ok(())
}
