mod cli;
mod error;
mod fmt;
mod models;
mod palette;
mod reports;
mod settings;
mod split;
mod store;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt as log_fmt, EnvFilter};

use cli::{Cli, Commands};

fn init_tracing() {
    let log_format = std::env::var("OCRGANISE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(log_fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(log_fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir, tz, range } => cli::init::run(data_dir, tz, range),
        Commands::Report { window, view, json } => cli::report::run(window, view, json),
        Commands::Export { window, output } => cli::export::run(window, output),
        Commands::Category { name, file } => cli::category::run(name.as_deref(), file.as_deref()),
        Commands::Split {
            receipt,
            assign,
            skip,
            file,
            now,
            dry_run,
        } => cli::split::run(&receipt, &assign, &skip, file.as_deref(), now.as_deref(), dry_run),
        Commands::Owed { file, clear } => cli::owed::run(file.as_deref(), clear.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
