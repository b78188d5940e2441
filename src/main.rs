use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use folio::{
    app::{App, Control},
    app_dirs::AppDirs,
    clock::{Clock, ThreadClock},
    config::{ConfigStore, FileConfigStore},
    ingest::{self, PdfTextExtractor, TextExtractor},
    logging,
    runtime::{spawn_terminal_reader, AppEvent, ChannelEventSource, FixedTicker, Runner},
    ui,
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::{mpsc::Sender, Arc},
};

/// turn any pdf into a typing lesson in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Extracts the text of a PDF and turns it into a live typing lesson with WPM, error count and timing."
)]
pub struct Cli {
    /// pdf document to practice with
    file: Option<PathBuf>,

    /// show mistyped spaces as a middle dot
    #[clap(long)]
    visible_whitespace: bool,

    /// write logs to this file instead of the default state directory
    #[clap(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(e) = logging::init(&log_path) {
            eprintln!("logging disabled: {e}");
        }
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    if cli.visible_whitespace {
        config.visible_whitespace = true;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, events) = ChannelEventSource::channel();
    spawn_terminal_reader(tx.clone());
    let runner = Runner::new(events, FixedTicker::default());

    let mut app = App::new(ThreadClock::new(tx.clone()), config);
    let mut workers = Workers {
        tx,
        extractor: Arc::new(PdfTextExtractor),
        store,
    };

    let result = start_tui(&mut terminal, &mut app, &runner, &mut workers, cli.file);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

/// Handles shared by everything that starts work outside the event loop
struct Workers<S: ConfigStore> {
    tx: Sender<AppEvent>,
    extractor: Arc<dyn TextExtractor>,
    store: S,
}

impl<S: ConfigStore> Workers<S> {
    fn apply<C: Clock>(&mut self, app: &mut App<C>, control: Control) -> bool {
        match control {
            Control::Continue => true,
            Control::Quit => false,
            Control::Ingest(path) => {
                if app.config.remember_document(&path) {
                    if let Err(e) = self.store.save(&app.config) {
                        warn!("could not save config: {e}");
                    }
                }
                ingest::spawn(path, Arc::clone(&self.extractor), self.tx.clone());
                true
            }
        }
    }
}

fn start_tui<B: Backend, C: Clock, S: ConfigStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
    runner: &Runner<ChannelEventSource, FixedTicker>,
    workers: &mut Workers<S>,
    initial: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    if let Some(path) = initial {
        let control = app.open(path);
        workers.apply(app, control);
    }

    info!("ui started");
    terminal.draw(|f| ui::draw(f, app))?;

    loop {
        let Some(event) = runner.step() else {
            continue;
        };

        let control = app.on_event(event);
        if !workers.apply(app, control) {
            break;
        }
        terminal.draw(|f| ui::draw(f, app))?;
    }

    info!("ui closed");
    Ok(())
}
