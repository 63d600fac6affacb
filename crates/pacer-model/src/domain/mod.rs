mod flag;
pub use flag::Flag;

mod labels;
pub use labels::Labels;

mod constants;
pub use constants::LABEL_PAGE_TAG;

/// Identifier of the subject an outbound operation acts on.
///
/// Typically a customer or account id. Operations sharing a subject and an
/// operation kind share a single staggering lane.
pub type SubjectId = String;

/// Delay value in milliseconds.
///
/// Used in backoff policies wherever an explicit wait is configured.
pub type DelayMs = u64;
