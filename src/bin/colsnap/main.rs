use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};

mod cli;
mod util;
mod cmd_ingest;
mod cmd_analyze;
mod cmd_status;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт — info.
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Ingest {
            path,
            base_url,
            users_file,
            posts_file,
        } => cmd_ingest::exec(path, base_url, users_file, posts_file),

        cli::Cmd::Analyze { path } => cmd_analyze::exec(path),

        cli::Cmd::Status { path } => cmd_status::exec(path),
    }
}
