use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use prettytable::Table;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cli::Action;
use crate::editor::{EditMode, Editor};
use crate::model::Task;
use crate::reminder::{Priority, ReminderScheduler};

const TEXT_WIDTH: usize = 40;

/// One run of the to-do page: the editor, the reminder scheduler and what
/// the last confirmation decided.
pub struct Session {
    editor: Editor,
    scheduler: ReminderScheduler,
    timers: Vec<JoinHandle<()>>,
    priority: Option<Priority>,
    clock: fn() -> NaiveDateTime,
}

impl Session {
    pub fn new(editor: Editor, scheduler: ReminderScheduler) -> Self {
        Session {
            editor,
            scheduler,
            timers: Vec::new(),
            priority: None,
            clock: local_now,
        }
    }

    /// Use another clock for confirmations.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// The colour picked at the last confirmation.
    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// Reminders armed but not fired yet.
    pub fn pending_reminders(&self) -> usize {
        self.timers.iter().filter(|timer| !timer.is_finished()).count()
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Read actions from `input` until it ends or the user quits, rendering the
/// list to `output` after every change.
pub fn run<R: BufRead, W: Write>(session: &mut Session, mut input: R, mut output: W) -> Result<()> {
    render(session, &mut output)?;

    let mut line = String::new();
    loop {
        write!(output, "> ").context("Failed to write prompt.")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line).context("Failed to read input.")? == 0 {
            break;
        }

        let action = match Action::parse_line(&line) {
            None => continue,
            Some(Ok(action)) => action,
            Some(Err(err)) => {
                writeln!(output, "{}", err.message)?;
                continue;
            }
        };
        debug!(?action, "session action");

        match action {
            Action::Quit => break,
            Action::List => render(session, &mut output)?,
            Action::Text { words } => session.editor.set_text(&words.join(" ")),
            Action::Time { time } => session.editor.set_time(time.as_deref().unwrap_or("")),
            Action::Submit => {
                if session.editor.submit().is_ok() {
                    render(session, &mut output)?;
                }
            }
            Action::Add { time, words } => {
                session.editor.set_text(&words.join(" "));
                session.editor.set_time(&time);
                if session.editor.submit().is_ok() {
                    render(session, &mut output)?;
                }
            }
            Action::Edit { id } => {
                if session.editor.begin_edit(id) {
                    render(session, &mut output)?;
                }
            }
            Action::Rm { id } => {
                session.editor.delete(id);
                render(session, &mut output)?;
            }
            Action::Confirm => confirm(session, &mut input, &mut output)?,
        }
    }

    let pending = session.pending_reminders();
    if pending > 0 {
        writeln!(
            output,
            "{} reminder(s) still pending, they are discarded on exit.",
            pending
        )?;
    }
    Ok(())
}

fn confirm<R: BufRead, W: Write>(session: &mut Session, input: &mut R, output: &mut W) -> Result<()> {
    let now = (session.clock)();
    let mut prompt_failure = None;
    let result = session
        .scheduler
        .confirm(session.editor.store().list(), now, |task| {
            match ask_importance(task, &mut *input, &mut *output) {
                Ok(important) => important,
                Err(err) => {
                    prompt_failure = Some(err);
                    false
                }
            }
        });
    if let Some(err) = prompt_failure {
        return Err(err);
    }

    if let Ok(confirmation) = result {
        writeln!(
            output,
            "Reminders set for '{}' ({}).",
            confirmation.plan.task.text,
            confirmation.priority.color()
        )?;
        session.priority = Some(confirmation.priority);
        session.timers.retain(|timer| !timer.is_finished());
        session.timers.extend(confirmation.timers);
    }
    Ok(())
}

/// Ask whether a task is important. Anything but an answer starting with
/// "y" means no.
fn ask_importance<R: BufRead, W: Write>(task: &Task, input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "Is '{}' important? [y/N] ", task.text)?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read the answer.")?;
    Ok(answer.trim().to_lowercase().starts_with('y'))
}

/// Print the task list and the status line.
pub fn render<W: Write>(session: &Session, output: &mut W) -> Result<()> {
    let editor = &session.editor;
    let mode = editor.mode();
    let mut table = Table::new();

    table.add_row(row!["id", "task", "time", ""]);
    for task in editor.store().list() {
        let marker = match mode {
            EditMode::Editing(id) if id == task.id => "editing",
            _ => "",
        };
        table.add_row(row![
            task.id,
            textwrap::fill(&task.text, TEXT_WIDTH),
            task.time,
            marker
        ]);
    }
    table.print(output).context("Failed to print the task list.")?;

    if editor.store().is_empty() {
        writeln!(output, "No tasks yet.")?;
    }

    let button = match mode {
        EditMode::Editing(_) => "Update Task",
        EditMode::Idle => "Submit",
    };
    write!(output, "[{}]", button)?;
    if let Some(last) = editor.last_submitted() {
        write!(output, " Task submitted: {}", last)?;
    }
    if let Some(priority) = session.priority {
        write!(output, " Task color: {}", priority.color())?;
    }
    writeln!(output)?;
    Ok(())
}
