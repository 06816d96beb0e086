use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::prelude::*;
use std::{error::Error, io};

use daylist::app::{clock::SystemClock, ui};
use daylist::config::Config;
use daylist::{logging, Session, SqliteSlot, Storage, TaskStore};

// Start the app.
// The terminal handling follows
// https://github.com/ratatui-org/ratatui/blob/main/examples/list.rs
pub fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load()?;
    logging::init_logging(&config.log_level, &config.log_dir)?;

    // Open the persistence slot before touching the terminal so failures print normally
    if let Some(parent) = config.database.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let slot = SqliteSlot::open(&config.database)?;
    let storage = Storage::new(Box::new(slot), config.storage_key.clone());
    let mut session = Session::new(TaskStore::open(storage, Box::new(SystemClock)));
    info!(
        "event=session_start module=main status=ok database={}",
        config.database.display()
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = ui::App::new(&mut session, config.background);
    let res = ui::run_app(&mut terminal, app, config.tick_rate());

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("event=app_exit module=main status=error error={err}");
        println!("{err:?}");
    } else {
        info!("event=app_exit module=main status=ok");
    }

    Ok(())
}
