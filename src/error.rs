use thiserror::Error;

/// Input problems reported back to the user. The display string is the
/// exact message shown by the toast sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a task and select a time.")]
    MissingInput,

    #[error("Please select a valid time (HH:MM).")]
    InvalidTime(String),

    #[error("Please add tasks before submitting.")]
    EmptyList,

    #[error("Please fill in all task details before submitting.")]
    IncompleteTasks,

    #[error("Please pick a shorter reminder lead.")]
    LeadOutOfRange,
}
