use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use chrono::Local;
use insight_core::{update, AppState, Msg};
use insight_engine::EngineHandle;
use insight_logging::{insight_debug, insight_warn};

use crate::effects::EffectRunner;
use crate::render;

const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Drives the store until no job or lookup is outstanding.
///
/// `initial` messages are applied before the loop starts. Ctrl-C turns into
/// [`Msg::DiscardAll`], which cancels every in-flight job and ends the session.
pub fn run_session(engine: EngineHandle, initial: Vec<Msg>) -> AppState {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, msg_tx.clone());

    let interrupt_tx = msg_tx.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(Msg::DiscardAll);
    }) {
        insight_warn!("Could not install Ctrl-C handler: {}", err);
    }

    let mut state = AppState::new();
    let mut last_view = state.view();

    for msg in initial {
        state = dispatch(state, msg, &runner, &mut last_view);
    }

    while state.is_busy() {
        let msg = match msg_rx.recv_timeout(TICK_INTERVAL) {
            Ok(msg) => msg,
            Err(RecvTimeoutError::Timeout) => Msg::Tick,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        if matches!(msg, Msg::DiscardAll) {
            eprintln!("\nInterrupted, cancelling running analyses...");
        }
        state = dispatch(state, msg, &runner, &mut last_view);
    }

    insight_debug!("Session finished");
    state
}

fn dispatch(
    state: AppState,
    msg: Msg,
    runner: &EffectRunner,
    last_view: &mut insight_core::AppViewModel,
) -> AppState {
    let (mut state, effects) = update(state, msg);
    runner.enqueue(effects);

    if state.consume_dirty() {
        let view = state.view();
        let stamp = Local::now().format("%H:%M:%S");
        for line in render::render_changes(last_view, &view) {
            println!("[{stamp}] {line}");
        }
        state.take_notices();
        *last_view = view;
    }
    state
}
