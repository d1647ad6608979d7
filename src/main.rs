use std::sync::Arc;

use anyhow::Context;
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use todoalarm::cli::CommandLineArgs;
use todoalarm::config::Config;
use todoalarm::editor::Editor;
use todoalarm::interface::{self, Session};
use todoalarm::notify::{ConsoleToaster, Toaster};
use todoalarm::reminder::ReminderScheduler;

fn main() -> anyhow::Result<()> {
    // Get the command-line arguments.
    let CommandLineArgs {
        config,
        lead,
        notifications,
        log,
    } = CommandLineArgs::from_args();

    // Flags win over the configuration file.
    let mut config = Config::load(config.as_deref())?;
    if let Some(lead) = lead {
        config.reminder_lead = lead;
    }
    if let Some(notifications) = notifications {
        config.notifications = notifications;
    }
    if let Some(log) = log {
        config.log = log;
    }

    // Logs go to stderr so they do not mix with the list.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Timers run here while the main thread waits for input.
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the timer runtime.")?;

    let toaster: Arc<dyn Toaster> = Arc::new(ConsoleToaster);
    let notifier = config.notifier();
    let editor = Editor::new(toaster.clone(), notifier.clone());
    let scheduler = ReminderScheduler::new(
        runtime.handle().clone(),
        toaster,
        notifier,
        config.reminder_lead,
    );
    let mut session = Session::new(editor, scheduler);

    let stdin = std::io::stdin();
    interface::run(&mut session, stdin.lock(), std::io::stdout())?;
    Ok(())
}
