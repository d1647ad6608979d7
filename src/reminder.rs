use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDateTime};
use humantime::format_duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::error::ValidationError;
use crate::model::Task;
use crate::notify::{Notifier, Toaster};

/// How long before a task's time the reminder goes off, unless configured.
pub const DEFAULT_LEAD: StdDuration = StdDuration::from_secs(120);

/// The longest lead accepted from the configuration.
pub const MAX_LEAD: StdDuration = StdDuration::from_secs(24 * 60 * 60);

/// The colour tag derived from the importance question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Red,
    Blue,
}

impl Priority {
    pub fn from_importance(important: bool) -> Self {
        if important {
            Priority::Red
        } else {
            Priority::Blue
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Priority::Red => "red",
            Priority::Blue => "blue",
        }
    }
}

/// When the two notices about a task go off. Delays are measured from the
/// moment the plan was made and are negative when that moment has already
/// passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlan {
    /// The task as it was when confirmed.
    pub task: Task,
    pub reminder_at: NaiveDateTime,
    pub due_at: NaiveDateTime,
    pub reminder_delay: Duration,
    pub due_delay: Duration,
}

impl ReminderPlan {
    /// Plan the notices for the first task. Every task must be complete.
    pub fn for_tasks(
        tasks: &[Task],
        now: NaiveDateTime,
        lead: Duration,
    ) -> Result<Self, ValidationError> {
        let first = tasks.first().ok_or(ValidationError::EmptyList)?;
        if !tasks.iter().all(Task::is_complete) {
            return Err(ValidationError::IncompleteTasks);
        }

        let due_at = now.date().and_time(first.scheduled_time()?);
        let reminder_at = due_at
            .checked_sub_signed(lead)
            .ok_or(ValidationError::LeadOutOfRange)?;
        Ok(ReminderPlan {
            task: first.clone(),
            reminder_at,
            due_at,
            reminder_delay: reminder_at - now,
            due_delay: due_at - now,
        })
    }

    pub fn reminder_message(&self) -> String {
        format!(
            "Reminder: {} at {}",
            self.task.text,
            self.reminder_at.format("%H:%M")
        )
    }

    pub fn due_message(&self) -> String {
        format!("Task: {} at {}", self.task.text, self.task.time)
    }
}

/// The result of a confirmation.
#[derive(Debug)]
pub struct Confirmation {
    pub plan: ReminderPlan,
    pub priority: Priority,
    pub timers: Vec<JoinHandle<()>>,
}

/// Arms the reminder and due notices on a tokio runtime.
pub struct ReminderScheduler {
    runtime: Handle,
    toaster: Arc<dyn Toaster>,
    notifier: Notifier,
    lead: Duration,
}

impl ReminderScheduler {
    pub fn new(
        runtime: Handle,
        toaster: Arc<dyn Toaster>,
        notifier: Notifier,
        lead: StdDuration,
    ) -> Self {
        let lead = Duration::from_std(lead).unwrap_or_else(|_| {
            warn!("reminder lead out of range, using the default");
            Duration::minutes(2)
        });
        ReminderScheduler {
            runtime,
            toaster,
            notifier,
            lead,
        }
    }

    /// Check the whole list, arm the two notices for its first task and then
    /// ask `judge` whether that task is important.
    pub fn confirm<F>(
        &self,
        tasks: &[Task],
        now: NaiveDateTime,
        judge: F,
    ) -> Result<Confirmation, ValidationError>
    where
        F: FnOnce(&Task) -> bool,
    {
        let plan = match ReminderPlan::for_tasks(tasks, now, self.lead) {
            Ok(plan) => plan,
            Err(err) => {
                self.toaster.error(&err.to_string());
                return Err(err);
            }
        };

        let timers = vec![
            self.arm(plan.reminder_delay, plan.reminder_message()),
            self.arm(plan.due_delay, plan.due_message()),
        ];

        let priority = Priority::from_importance(judge(&plan.task));
        info!(id = plan.task.id, color = priority.color(), "task priority");

        Ok(Confirmation {
            plan,
            priority,
            timers,
        })
    }

    /// Fire `message` once after `delay`. A delay that is already over fires
    /// right away.
    fn arm(&self, delay: Duration, message: String) -> JoinHandle<()> {
        let wait = delay.to_std().unwrap_or(StdDuration::ZERO);
        info!(delay = %format_duration(wait), "armed: {}", message);

        let toaster = self.toaster.clone();
        let notifier = self.notifier.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(wait).await;
            toaster.info(&message);
            notifier.notify(&message);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MemoryBackend, MemoryToaster, ToastLevel};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn task(id: u32, text: &str, time: &str) -> Task {
        Task {
            id,
            text: text.to_string(),
            time: time.to_string(),
        }
    }

    fn scheduler() -> (ReminderScheduler, Arc<MemoryToaster>, Arc<MemoryBackend>) {
        let toaster = Arc::new(MemoryToaster::new());
        let backend = Arc::new(MemoryBackend::granted());
        let scheduler = ReminderScheduler::new(
            Handle::current(),
            toaster.clone(),
            Notifier::Available(backend.clone()),
            DEFAULT_LEAD,
        );
        (scheduler, toaster, backend)
    }

    #[test]
    fn plan_uses_the_first_task() {
        let tasks = vec![task(1, "Stand-up", "09:00"), task(2, "Lunch", "12:30")];
        let plan = ReminderPlan::for_tasks(&tasks, at(8, 0), Duration::minutes(2)).unwrap();

        assert_eq!(plan.task, tasks[0]);
        assert_eq!(plan.due_at, at(9, 0));
        assert_eq!(plan.reminder_at, at(8, 58));
        assert_eq!(plan.due_delay, Duration::minutes(60));
        assert_eq!(plan.reminder_delay, Duration::minutes(58));
        assert_eq!(plan.reminder_message(), "Reminder: Stand-up at 08:58");
        assert_eq!(plan.due_message(), "Task: Stand-up at 09:00");
    }

    #[test]
    fn past_times_give_negative_delays() {
        let tasks = vec![task(1, "Breakfast", "07:00")];
        let plan = ReminderPlan::for_tasks(&tasks, at(8, 0), Duration::minutes(2)).unwrap();

        assert_eq!(plan.due_delay, Duration::minutes(-60));
        assert_eq!(plan.reminder_delay, Duration::minutes(-62));
    }

    #[test]
    fn reminder_can_cross_midnight_backwards() {
        let tasks = vec![task(1, "Late call", "00:01")];
        let plan = ReminderPlan::for_tasks(&tasks, at(0, 0), Duration::minutes(2)).unwrap();
        assert_eq!(plan.reminder_at.format("%H:%M").to_string(), "23:59");
        assert_eq!(plan.reminder_delay, Duration::minutes(-1));
    }

    #[test]
    fn oversized_lead_is_rejected() {
        let tasks = vec![task(1, "Lunch", "13:00")];
        assert_eq!(
            ReminderPlan::for_tasks(&tasks, at(12, 0), Duration::days(365 * 300_000)),
            Err(ValidationError::LeadOutOfRange)
        );
    }

    #[tokio::test]
    async fn oversized_lead_reaches_the_toaster_instead_of_panicking() {
        let toaster = Arc::new(MemoryToaster::new());
        let scheduler = ReminderScheduler::new(
            Handle::current(),
            toaster.clone(),
            Notifier::Unavailable,
            humantime::parse_duration("300000years").unwrap(),
        );
        let tasks = vec![task(1, "Lunch", "13:00")];

        let result = scheduler.confirm(&tasks, at(12, 0), |_| true);

        assert_eq!(result.err(), Some(ValidationError::LeadOutOfRange));
        assert_eq!(
            toaster.messages(ToastLevel::Error),
            vec!["Please pick a shorter reminder lead."]
        );
    }

    #[test]
    fn plan_requires_complete_tasks() {
        assert_eq!(
            ReminderPlan::for_tasks(&[], at(8, 0), Duration::minutes(2)),
            Err(ValidationError::EmptyList)
        );
        let tasks = vec![task(1, "ok", "09:00"), task(2, "untimed", "")];
        assert_eq!(
            ReminderPlan::for_tasks(&tasks, at(8, 0), Duration::minutes(2)),
            Err(ValidationError::IncompleteTasks)
        );
    }

    #[tokio::test]
    async fn incomplete_list_arms_nothing() {
        let (scheduler, toaster, backend) = scheduler();
        let tasks = vec![task(1, "Buy milk", "")];
        let mut asked = false;

        let result = scheduler.confirm(&tasks, at(8, 0), |_| {
            asked = true;
            true
        });

        assert_eq!(result.err(), Some(ValidationError::IncompleteTasks));
        assert!(!asked);
        assert_eq!(
            toaster.messages(ToastLevel::Error),
            vec!["Please fill in all task details before submitting."]
        );
        assert!(backend.shown().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn overdue_notices_fire_immediately() {
        let (scheduler, toaster, backend) = scheduler();
        let tasks = vec![task(1, "Breakfast", "07:00")];

        let confirmation = scheduler.confirm(&tasks, at(8, 0), |_| false).unwrap();
        assert_eq!(confirmation.priority, Priority::Blue);

        let started = tokio::time::Instant::now();
        for timer in confirmation.timers {
            timer.await.unwrap();
        }
        assert!(started.elapsed() < StdDuration::from_secs(1));
        assert_eq!(
            backend.shown(),
            vec!["Reminder: Breakfast at 06:58", "Task: Breakfast at 07:00"]
        );
        assert_eq!(toaster.messages(ToastLevel::Info).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn notices_fire_at_their_time_with_the_confirmed_snapshot() {
        let (scheduler, toaster, _) = scheduler();
        let mut tasks = vec![task(1, "Stand-up", "08:10")];

        let confirmation = scheduler.confirm(&tasks, at(8, 0), |_| true).unwrap();
        assert_eq!(confirmation.priority, Priority::Red);

        // later edits do not reach already armed notices
        tasks[0].text = "Renamed".to_string();

        let started = tokio::time::Instant::now();
        let mut timers = confirmation.timers.into_iter();
        timers.next().unwrap().await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= StdDuration::from_secs(8 * 60));
        assert!(elapsed < StdDuration::from_secs(9 * 60));
        assert_eq!(
            toaster.messages(ToastLevel::Info),
            vec!["Reminder: Stand-up at 08:08"]
        );

        timers.next().unwrap().await.unwrap();
        assert!(started.elapsed() >= StdDuration::from_secs(10 * 60));
        assert_eq!(
            toaster.messages(ToastLevel::Info),
            vec!["Reminder: Stand-up at 08:08", "Task: Stand-up at 08:10"]
        );
    }

    #[test]
    fn importance_maps_to_a_color() {
        assert_eq!(Priority::from_importance(true).color(), "red");
        assert_eq!(Priority::from_importance(false).color(), "blue");
    }
}
