use std::{io, sync::Arc};

use log::{error, info};

mod audio;
mod console;
mod extract;
mod reader;
mod settings;
mod speech;
mod state;
mod text;
mod util;

use console::{print_event, Console};
use state::AppState;

fn main() {
    if let Err(err) = util::logging::init() {
        eprintln!("Failed to initialise logger: {err}");
    }
    info!("Starting PDF read-aloud");

    let app = match AppState::initialise(Arc::new(print_event)) {
        Ok(app) => app,
        Err(err) => {
            error!("Startup failed: {err:?}");
            eprintln!("{err:?}");
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut console = Console::new(&app.controller, app.settings.reading, io::stdout());
    if let Err(err) = console.run(stdin.lock()) {
        error!("Console error: {err}");
        eprintln!("{err}");
        std::process::exit(1);
    }
    info!("Bye");
}
