//! Interactive status page

mod state;
mod view;

use std::io;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crossterm::{
    event::{self, Event as CEvent, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{error, info};

use statuslite_core::model::ServiceRecord;
use statuslite_core::probe::{HealthChecker, Transport};
use statuslite_core::reducer::{Action, reduce};
use statuslite_core::store::ServiceStore;

use crate::context::Context;
use crate::transport::HttpTransport;
use state::{Intent, UiState};

type Checker = Arc<HealthChecker<HttpTransport>>;

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn to_io<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::other(e.to_string())
}

pub async fn run_tui(ctx: Context) -> io::Result<()> {
    let mut store = ctx.open_store().map_err(to_io)?;
    let checker: Checker = Arc::new(HealthChecker::new(HttpTransport::new().map_err(to_io)?));
    let (results_tx, results_rx) = mpsc::channel::<CheckEvent>(4);

    info!(services = store.len(), "starting dashboard");

    let mut terminal = setup_terminal()?;
    let result = tui_loop(
        &mut terminal,
        &mut store,
        &ctx.config.title,
        checker,
        results_tx,
        results_rx,
    )
    .await;
    restore_terminal(terminal)?;
    result
}

/// How a background batch ended
#[derive(Debug)]
enum CheckEvent {
    Finished(Vec<ServiceRecord>),
    Failed(String),
}

/// Run one batch on a background task.
///
/// Exactly one event comes back over `tx`, also when the batch panics.
fn spawn_check<T: Transport + 'static>(
    checker: &Arc<HealthChecker<T>>,
    records: Vec<ServiceRecord>,
    tx: &mpsc::Sender<CheckEvent>,
) {
    let checker = checker.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let batch = tokio::spawn(async move { checker.check_all(&records).await });
        let event = match batch.await {
            Ok(results) => CheckEvent::Finished(results),
            Err(e) => CheckEvent::Failed(e.to_string()),
        };
        let _ = tx.send(event).await;
    });
}

/// Fold every batch that has ended since the last frame into the UI and store
fn drain_checks(ui: &mut UiState, store: &mut ServiceStore, rx: &mut mpsc::Receiver<CheckEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            CheckEvent::Finished(results) => {
                ui.finish_check(SystemTime::now());
                apply(ui, store, Action::ChecksCompleted { results });
            }
            CheckEvent::Failed(reason) => {
                error!("check batch failed: {}", reason);
                ui.abort_check(format!("Check failed: {}", reason));
            }
        }
    }
}

fn apply(ui: &mut UiState, store: &mut ServiceStore, action: Action) {
    match reduce(store, action) {
        Ok(outcome) => {
            info!("{}", outcome);
            ui.flash_ok(outcome.to_string());
        }
        Err(e) => {
            error!("{}", e);
            ui.flash_err(e.to_string());
        }
    }
    ui.clamp_selection(store.len());
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: &mut ServiceStore,
    title: &str,
    checker: Checker,
    results_tx: mpsc::Sender<CheckEvent>,
    mut results_rx: mpsc::Receiver<CheckEvent>,
) -> io::Result<()> {
    let mut ui = UiState::default();

    loop {
        drain_checks(&mut ui, store, &mut results_rx);

        terminal.draw(|f| view::draw(f, &ui, title, store.records()))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }

        let CEvent::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }

        match ui.handle_key(code, modifiers, store.records()) {
            Intent::None => {}
            Intent::Quit => return Ok(()),
            Intent::Dispatch(action) => apply(&mut ui, store, action),
            Intent::CheckAll => {
                info!(services = store.len(), "checking all services");
                spawn_check(&checker, store.records().to_vec(), &results_tx);
            }
        }
    }
}
