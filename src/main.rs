use clap::Parser;
use color_eyre::eyre::Result;
use log::*;
use std::{env, io::Write, process::ExitCode};

use github_changelog::{
    ChangelogFetcher, cli, forge::factory::ForgeFactory, formatter,
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("github_changelog")
        .build();

    // stdout carries the changelog
    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli_args = cli::Args::parse();

    initialize_logger(cli_args.debug)?;

    let config = cli_args.config(&env::current_dir()?)?;
    let api = ForgeFactory::create(config.api, config.remote.clone())?;
    let fetcher = ChangelogFetcher::new(api, config);

    let result = if cli_args.latest {
        fetcher.fetch_latest_changelog().await
    } else {
        fetcher.fetch_full_changelog().await
    };

    let releases = match result {
        Ok(releases) => releases,
        Err(err) if err.is_duplicate_release() => {
            warn!("{err}: nothing to do");
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => return Err(err.into()),
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(formatter::format_changelog(&releases).as_bytes())?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}
