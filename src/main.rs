use std::{io, process};

use clap::Parser;
use log::{debug, error, info};

use todolist::{App, Cli, Config, FileStore, Result, TodoStore};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    debug!("Logger initialized");
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.data_dir, cli.key);
    config.validate()?;
    debug!("Using configuration: {:?}", config);

    let storage = FileStore::open(&config.data_dir)?;
    debug!("Storing lists in {}", storage.dir().display());
    // Fail before touching the list if the key cannot name a slot file
    storage.slot_path(&config.storage_key)?;

    let store = TodoStore::open(storage, config.storage_key);
    let mut app = App::new(store, cli.verbose);

    let stdin = io::stdin();
    let stdout = io::stdout();
    app.run(cli.command, &mut stdin.lock(), &mut stdout.lock())
}

fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    info!("Application starting up");
    if let Err(e) = run(cli) {
        error!("{}", e);
        eprintln!("error: {}", e);
        process::exit(1);
    }
    info!("Application shutting down");
}
