use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::{
    LABEL_PAGE_TAG,
    domain::{Labels, SubjectId},
    kind::OperationKind,
};

/// Context for one logical stream of staggered, retried work.
///
/// `RequestContext` describes *who* the operation acts on and *which* kind of
/// operation it is; together these form the staggering key. Contexts with
/// different keys are fully independent and never block each other.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Subject the operation acts on (e.g. a customer id).
    pub subject_id: SubjectId,
    /// Kind of outbound operation.
    pub kind: OperationKind,
    /// 0-based attempt number within one logical operation.
    ///
    /// A brand-new operation starts at 0. The caller driving the retry loop
    /// advances it via [`RequestContext::next_attempt`] after a transient
    /// failure; the controller never mutates a context it was given.
    #[serde(default)]
    pub attempt: u32,
    /// Optional metadata for routing / logging / observability.
    ///
    /// The well-known key [`LABEL_PAGE_TAG`] carries the page type or workflow
    /// the operation belongs to.
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
}

impl RequestContext {
    /// Create a fresh context at attempt 0 with no labels.
    pub fn new(subject_id: impl Into<SubjectId>, kind: OperationKind) -> Self {
        Self {
            subject_id: subject_id.into(),
            kind,
            attempt: 0,
            labels: Labels::new(),
        }
    }

    /// Composite key grouping related operations for staggering purposes.
    ///
    /// Format: `{subject_id}/{kind}`.
    pub fn stagger_key(&self) -> String {
        format!("{}/{}", self.subject_id, self.kind.kind())
    }

    /// Copy of this context with the attempt counter advanced by one.
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt.saturating_add(1),
            ..self.clone()
        }
    }

    /// Attach a page tag label used by logging and metrics consumers.
    ///
    /// The tag is stored under the [`LABEL_PAGE_TAG`] key. This is a
    /// builder-style helper:
    ///
    /// ```rust
    /// # use pacer_model::{OperationKind, RequestContext};
    /// let ctx = RequestContext::new("customer-42", OperationKind::Create)
    ///     .with_page_tag("autoship");
    /// assert_eq!(ctx.page_tag(), Some("autoship"));
    /// ```
    pub fn with_page_tag(mut self, tag: impl Into<String>) -> Self {
        self.labels.insert(LABEL_PAGE_TAG, tag);
        self
    }

    /// Return the page tag label (if present).
    pub fn page_tag(&self) -> Option<&str> {
        self.labels.get(LABEL_PAGE_TAG)
    }
}
