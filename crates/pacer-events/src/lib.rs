//! Event intake for pacer.
//!
//! Analytics events arrive as JSON of arbitrary shape and nesting. This crate
//! extracts the relevant fields from anywhere in the structure, flattens
//! events into analyzable rows, and maps page types to environment-specific
//! URLs. It holds no scheduling logic — the controller consumes its output.

mod error;
pub use error::{EventError, EventResult};

mod extract;
pub use extract::{extract_fields, find_page_type};

mod event;
pub use event::{ParsedEvent, parse_event};

mod flatten;
pub use flatten::{FieldStats, FlattenedField, ValueType, field_frequencies, flatten};

mod pages;
pub use pages::{Environment, PageTypeEntry, PageTypeMap};
