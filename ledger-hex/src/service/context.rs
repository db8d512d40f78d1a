use std::time::Duration;

use tokio::time::Instant;
use uuid::Uuid;

/// Per-request correlation data passed into every service call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: None,
        }
    }

    /// A context with a freshly generated request id.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Sets the deadline to `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Span that service logging for `operation` is recorded under.
    pub fn span(&self, operation: &'static str) -> tracing::Span {
        tracing::info_span!("service", operation, request_id = %self.request_id)
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::generate()
    }
}
