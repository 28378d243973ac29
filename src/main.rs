#[macro_use]
extern crate prettytable;

use anyhow::{anyhow, Context};
use chrono::{Local, NaiveDate};
use directories::ProjectDirs;
use std::io;
use std::path::PathBuf;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod interface;
mod model;
mod store;
mod tasks;
mod validation;

use cli::CommandLineArgs;
use interface::Session;
use store::JsonStore;
use tasks::TaskList;

/// Default location of the tasks file, creating its directory if needed.
fn find_default_tasks_file() -> anyhow::Result<PathBuf> {
    let base_dirs = ProjectDirs::from("com", "gozque", "todoman")
        .ok_or_else(|| anyhow!("Failed to find a data directory."))?;
    let root_dir = base_dirs.data_dir();
    if !root_dir.exists() {
        std::fs::create_dir_all(root_dir)
            .with_context(|| format!("Failed to create directory {}.", root_dir.display()))?;
    }
    Ok(root_dir.join("tasks.json"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Get the command-line arguments.
    let CommandLineArgs {
        tasks_file,
        wrap_width,
    } = CommandLineArgs::from_args();

    let tasks_file = match tasks_file {
        Some(path) => path,
        None => find_default_tasks_file()?,
    };

    let store = JsonStore::new(tasks_file);
    let tasks = TaskList::load(store);
    info!(path = %tasks.store().path().display(), count = tasks.len(), "loaded tasks");

    let stdin = io::stdin();
    let mut session = Session::new(tasks, stdin.lock(), io::stdout(), today, wrap_width);
    session.run()?;
    Ok(())
}
