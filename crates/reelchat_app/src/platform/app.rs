use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use reelchat_core::{update, AppState, MessageKind, Msg};
use reelchat_engine::DispatchSettings;
use reelchat_logging::reel_debug;

use super::effects::EffectRunner;
use super::ui;

const TICK_INTERVAL: Duration = Duration::from_millis(75);
const QUIT_COMMAND: &str = "/quit";

/// Everything the chat loop reacts to.
pub enum AppEvent {
    Msg(Msg),
    /// Stdin reached EOF or the user typed `/quit`.
    InputClosed,
}

pub enum ChatMode {
    Interactive,
    Once(String),
}

pub struct ChatSummary {
    pub ended_with_error: bool,
}

pub fn run_chat(settings: DispatchSettings, mode: ChatMode) -> anyhow::Result<ChatSummary> {
    let (app_tx, app_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(settings, app_tx.clone()).context("starting webhook engine")?;
    let interactive = matches!(mode, ChatMode::Interactive);
    let mut session = ChatSession::new(runner, interactive);
    let mut out = io::stdout();

    session.render(&mut out)?;

    let mut input_closed = match mode {
        ChatMode::Interactive => {
            spawn_stdin_reader(app_tx.clone()).context("starting input reader")?;
            false
        }
        ChatMode::Once(topic) => {
            session.dispatch(Msg::InputChanged(topic));
            session.dispatch(Msg::Submitted);
            true
        }
    };
    spawn_ticker(app_tx).context("starting render ticker")?;

    loop {
        let Ok(event) = app_rx.recv() else {
            break;
        };
        match event {
            AppEvent::Msg(msg) => {
                if session.dispatch(msg) {
                    session.render(&mut out)?;
                }
            }
            AppEvent::InputClosed => input_closed = true,
        }
        // An outstanding submission always gets to finish before exit.
        if input_closed && !session.state.is_busy() {
            break;
        }
    }

    session.render(&mut out)?;
    let ended_with_error = session
        .state
        .messages()
        .last()
        .is_some_and(|message| message.kind == MessageKind::Error);
    Ok(ChatSummary { ended_with_error })
}

struct ChatSession {
    state: AppState,
    effects: EffectRunner,
    printed: usize,
    interactive: bool,
}

impl ChatSession {
    fn new(effects: EffectRunner, interactive: bool) -> Self {
        Self {
            state: AppState::new(),
            effects,
            printed: 0,
            interactive,
        }
    }

    /// Applies `msg`; returns true when a coalesced render is due.
    fn dispatch(&mut self, msg: Msg) -> bool {
        let is_tick = matches!(msg, Msg::Tick);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.effects.enqueue(effects);
        is_tick && self.state.consume_dirty()
    }

    fn render(&mut self, out: &mut impl Write) -> io::Result<()> {
        let view = self.state.view();
        let lines = ui::render::render_transcript(&view, self.printed, Utc::now().timestamp_millis());
        if lines.is_empty() && self.printed != 0 {
            return Ok(());
        }
        for line in lines {
            writeln!(out, "{line}")?;
        }
        self.printed = view.messages.len();
        if self.interactive {
            write!(out, "{}", ui::render::prompt(&view))?;
            if view.busy {
                writeln!(out)?;
            }
        }
        out.flush()
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("reelchat-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line.trim() == QUIT_COMMAND {
                    break;
                }
                let sent = tx.send(AppEvent::Msg(Msg::InputChanged(line))).is_ok()
                    && tx.send(AppEvent::Msg(Msg::Submitted)).is_ok();
                if !sent {
                    return;
                }
            }
            reel_debug!("Input closed");
            let _ = tx.send(AppEvent::InputClosed);
        })?;
    Ok(())
}

// Background tick to throttle rendering.
fn spawn_ticker(tx: mpsc::Sender<AppEvent>) -> io::Result<()> {
    thread::Builder::new()
        .name("reelchat-ticker".to_string())
        .spawn(move || {
            while tx.send(AppEvent::Msg(Msg::Tick)).is_ok() {
                thread::sleep(TICK_INTERVAL);
            }
        })?;
    Ok(())
}
