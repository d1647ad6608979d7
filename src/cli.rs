use std::path::PathBuf;
use std::time::Duration;

use structopt::StructOpt;

use crate::config::{parse_lead, NotificationMode};

/// One line typed in the session.
#[derive(Debug, PartialEq, StructOpt)]
#[structopt(name = "todoalarm", no_version)]
pub enum Action {
    /// Type the task description.
    Text {
        #[structopt()]
        words: Vec<String>,
    },
    /// Pick the task time (HH:MM). Without a value the time is cleared.
    Time {
        #[structopt()]
        time: Option<String>,
    },
    /// Submit the draft: add a new task, or update the one being edited.
    Submit,
    /// Type a time and a description, then submit.
    Add {
        /// The task time (HH:MM).
        #[structopt()]
        time: String,

        /// The task description text.
        #[structopt()]
        words: Vec<String>,
    },
    /// Load a task into the draft for editing.
    Edit {
        #[structopt()]
        id: u32,
    },
    /// Delete a task.
    Rm {
        #[structopt()]
        id: u32,
    },
    /// Show the task list.
    #[structopt(alias = "ls")]
    List,
    /// Arm the reminders for the first task.
    Confirm,
    /// Leave the session.
    #[structopt(alias = "exit")]
    Quit,
}

impl Action {
    /// Parse a line of input. Blank lines give `None`.
    pub fn parse_line(line: &str) -> Option<Result<Action, structopt::clap::Error>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return None;
        }
        Some(Action::from_iter_safe(
            std::iter::once("todoalarm").chain(words),
        ))
    }
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "todoalarm",
    about = "A minimal to-do list that reminds you before things are due."
)]
pub struct CommandLineArgs {
    /// Use a different configuration file.
    #[structopt(parse(from_os_str), short, long)]
    pub config: Option<PathBuf>,

    /// How long before a task the reminder fires, at most a day (e.g. "5m").
    #[structopt(short, long, parse(try_from_str = parse_lead))]
    pub lead: Option<Duration>,

    /// Notification behaviour: granted, denied or unavailable.
    #[structopt(short, long)]
    pub notifications: Option<NotificationMode>,

    /// Log filter, e.g. "todoalarm=debug". RUST_LOG wins when set.
    #[structopt(long)]
    pub log: Option<String>,
}
