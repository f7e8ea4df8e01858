//! Insight driver: command-line front end wiring the job store to the engine.
pub mod app;
pub mod cli;
pub mod config;
pub mod effects;
pub mod render;

use std::process::ExitCode;

use insight_core::{Category, JobPhase, Msg};
use insight_engine::EngineHandle;
use log::LevelFilter;

use crate::cli::{Cli, Command};
use crate::config::load_config;

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    insight_logging::initialize(cli.log.clone(), level);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
        config.validate()?;
    }
    let engine = EngineHandle::new(config.engine_settings())?;
    Ok(execute(engine, cli.command))
}

/// Runs one command against `engine` and maps the final store to an exit code.
pub fn execute(engine: EngineHandle, command: Command) -> ExitCode {
    match command {
        Command::Analyze {
            categories,
            print_results,
        } => {
            let categories = dedupe(categories);
            let initial = categories
                .iter()
                .map(|category| Msg::AnalyzeRequested(*category))
                .collect();
            let state = app::run_session(engine, initial);

            for line in render::summary(&state.view(), &categories, print_results) {
                println!("{line}");
            }
            let all_completed = categories
                .iter()
                .all(|category| state.phase(*category) == JobPhase::Completed);
            if all_completed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Status => {
            let state = app::run_session(engine, vec![Msg::BackendStatusRequested]);
            if state.backend_status().is_some() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Latest { category } => {
            let state = app::run_session(engine, vec![Msg::LatestResultRequested(category)]);
            match state.result(category) {
                Some(result) => {
                    println!("{}", render::pretty_json(result));
                    ExitCode::SUCCESS
                }
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn dedupe(categories: Vec<Category>) -> Vec<Category> {
    let mut unique = Vec::with_capacity(categories.len());
    for category in categories {
        if !unique.contains(&category) {
            unique.push(category);
        }
    }
    unique
}
