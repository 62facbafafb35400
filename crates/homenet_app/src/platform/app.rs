use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use engine_logging::{engine_debug, engine_info};
use homenet_core::{update, AppState, EntityForm, EntityKind, Msg, RequestPhase};

use super::effects::EffectRunner;
use super::render::{render_board, render_random, TranscriptPrinter};
use crate::cli::{AddArgs, BoardAction, DetailArgs, EditArgs};

const INPUT_POLL: Duration = Duration::from_millis(20);

/// Owns the core state and routes messages through `update`, handing the
/// resulting effects to the engine.
pub struct App {
    state: AppState,
    runner: EffectRunner,
}

impl App {
    pub fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Applies one message. Returns whether the message started engine work.
    pub fn dispatch(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        let started = !effects.is_empty();
        self.runner.enqueue(effects);
        started
    }

    /// Dispatches `msg` and, if it started engine work, waits for the result.
    fn dispatch_and_wait(&mut self, msg: Msg) -> Result<bool> {
        if !self.dispatch(msg) {
            return Ok(false);
        }
        let settled = self
            .runner
            .next_msg()
            .context("engine stopped before answering")?;
        self.dispatch(settled);
        Ok(true)
    }

    fn drain_engine(&mut self) -> bool {
        let mut any = false;
        while let Some(msg) = self.runner.try_next_msg() {
            self.dispatch(msg);
            any = true;
        }
        any
    }

    pub fn shutdown(self) {
        self.runner.shutdown();
    }
}

/// Reads stdin lines on a background thread.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Interactive chat loop.
///
/// Ends on `/quit` (cancelling any pending answer) or when input closes and
/// no answer is pending.
pub fn run_chat(app: &mut App, input: mpsc::Receiver<String>, out: &mut impl Write) -> Result<()> {
    let mut printer = TranscriptPrinter::default();
    let mut input_open = true;
    print_transcript(app, &mut printer, out)?;
    write!(out, "> ")?;
    out.flush()?;

    loop {
        if app.drain_engine() {
            print_transcript(app, &mut printer, out)?;
        }
        let idle = app.state().chat().phase() == RequestPhase::Idle;
        if app.state.consume_focus_request() && input_open {
            write!(out, "> ")?;
            out.flush()?;
        }
        if !input_open {
            if idle {
                break;
            }
            if let Some(msg) = app.runner.next_msg_timeout(INPUT_POLL) {
                app.dispatch(msg);
                print_transcript(app, &mut printer, out)?;
            }
            continue;
        }

        let line = match input.recv_timeout(INPUT_POLL) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                engine_debug!("Chat input closed");
                input_open = false;
                continue;
            }
        };

        match line.trim() {
            "/quit" => {
                app.dispatch(Msg::CancelClicked);
                print_transcript(app, &mut printer, out)?;
                break;
            }
            "/stop" => {
                app.dispatch(Msg::CancelClicked);
            }
            "/clear" => {
                app.dispatch(Msg::ClearChatClicked);
            }
            text => {
                if !idle {
                    writeln!(out, "(still waiting for the last answer; /stop cancels it)")?;
                }
                app.dispatch(Msg::InputChanged(text.to_string()));
                let submitted_at_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
                app.dispatch(Msg::SubmitClicked { submitted_at_ms });
                if idle && text.is_empty() {
                    write!(out, "> ")?;
                    out.flush()?;
                }
            }
        }
        print_transcript(app, &mut printer, out)?;
    }
    engine_info!("Chat session ended");
    Ok(())
}

fn print_transcript(
    app: &App,
    printer: &mut TranscriptPrinter,
    out: &mut impl Write,
) -> io::Result<()> {
    for line in printer.render(&app.state().view().chat) {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

/// One-shot board command.
pub fn run_board(
    app: &mut App,
    kind: EntityKind,
    action: BoardAction,
    out: &mut impl Write,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<()> {
    match action {
        BoardAction::List => {
            load_board(app, kind)?;
            print_board(app, kind, out)?;
        }
        BoardAction::Delete { id, yes } => {
            load_board(app, kind)?;
            app.dispatch(Msg::DeleteClicked { kind, id });
            let Some(prompt) = app.state().view().board(kind).confirm_prompt.clone() else {
                bail!("no {kind} with id {id}");
            };
            if yes || confirm(&prompt) {
                app.dispatch_and_wait(Msg::DeleteConfirmed(kind))?;
                report_alert(app, kind)?;
                writeln!(out, "{}", app.state().board(kind).count_text())?;
            } else {
                app.dispatch(Msg::DeleteDeclined(kind));
                writeln!(out, "Delete cancelled")?;
            }
        }
        BoardAction::Random => {
            app.dispatch_and_wait(Msg::RandomClicked(kind))?;
            let view = app.state().view();
            if let Some(text) = render_random(view.board(kind)) {
                writeln!(out, "{text}")?;
            }
            app.dispatch(Msg::RandomClosed(kind));
        }
        BoardAction::Add(args) => {
            app.dispatch(Msg::ToggleAddFormClicked(kind));
            app.dispatch(Msg::AddDraftChanged {
                kind,
                form: add_form(args),
            });
            if !app.dispatch_and_wait(Msg::AddFormSubmitted(kind))? {
                bail!("a {kind} needs a title");
            }
            report_alert(app, kind)?;
            print_board(app, kind, out)?;
        }
        BoardAction::Edit(args) => {
            load_board(app, kind)?;
            app.dispatch(Msg::EditClicked { kind, id: args.id });
            let Some(modal) = app.state().view().board(kind).edit_modal.clone() else {
                bail!("no {kind} with id {}", args.id);
            };
            app.dispatch(Msg::EditDraftChanged {
                kind,
                form: apply_edits(modal.form, args),
            });
            if !app.dispatch_and_wait(Msg::EditFormSubmitted(kind))? {
                bail!("a {kind} needs a title");
            }
            report_alert(app, kind)?;
            print_board(app, kind, out)?;
        }
    }
    Ok(())
}

fn load_board(app: &mut App, kind: EntityKind) -> Result<()> {
    app.dispatch_and_wait(Msg::LoadBoardRequested(kind))?;
    report_alert(app, kind)
}

/// Turns a pending alert into an error.
fn report_alert(app: &mut App, kind: EntityKind) -> Result<()> {
    let alert = app.state().view().board(kind).alert.clone();
    if let Some(alert) = alert {
        app.dispatch(Msg::AlertDismissed(kind));
        bail!(alert);
    }
    Ok(())
}

fn print_board(app: &App, kind: EntityKind, out: &mut impl Write) -> io::Result<()> {
    for line in render_board(app.state().view().board(kind)) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn add_form(args: AddArgs) -> EntityForm {
    let details = args.details;
    EntityForm {
        id: None,
        title: args.title,
        year: details.year.unwrap_or_default(),
        genre: details.genre.unwrap_or_default(),
        streaming: details.streaming.unwrap_or_default(),
        notes: details.notes.unwrap_or_default(),
        imdb_link: details.imdb_link.unwrap_or_default(),
        flag: args.flag,
    }
}

fn apply_edits(mut form: EntityForm, args: EditArgs) -> EntityForm {
    let DetailArgs {
        year,
        genre,
        streaming,
        notes,
        imdb_link,
    } = args.details;
    if let Some(title) = args.title {
        form.title = title;
    }
    for (slot, value) in [
        (&mut form.year, year),
        (&mut form.genre, genre),
        (&mut form.streaming, streaming),
        (&mut form.notes, notes),
        (&mut form.imdb_link, imdb_link),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if args.flag {
        form.flag = true;
    } else if args.no_flag {
        form.flag = false;
    }
    form
}

/// Asks a yes/no question on the terminal. Anything but `y`/`yes` is no.
pub fn confirm_on_terminal(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
