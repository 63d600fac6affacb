mod domain;
pub use domain::LABEL_PAGE_TAG;
pub use domain::{DelayMs, Flag, Labels, SubjectId};

mod error;
pub use error::{ModelError, ModelResult};

mod kind;
pub use kind::OperationKind;

mod context;
pub use context::RequestContext;

mod policy;
pub use policy::{BackoffPolicy, DelayStrategy, PolicyPreset};
