//! Audit events for cross-border exchanges.
//!
//! Security-relevant outcomes (tokens minted and consumed, forged or replayed
//! tokens, rejected requests) are recorded as [`Event`] values and emitted
//! through `tracing`. Events never carry secrets or message bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    // Light token events
    /// A light token was minted for a stored message.
    LightTokenIssued,
    /// A light token was redeemed and its message removed.
    LightTokenConsumed,
    /// A light token failed size, format or digest checks.
    LightTokenRejected,

    // Anti-replay events
    /// A message id was seen twice within the replay window.
    ReplayDetected,

    // Protocol events
    /// An authentication request passed validation.
    RequestAccepted,
    /// An authentication request failed validation.
    RequestRejected,
    /// An authentication response failed validation.
    ResponseRejected,
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// A security event for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// Issuer of the token or message involved.
    pub issuer: Option<String>,

    /// Token or message id involved.
    pub subject_id: Option<String>,

    /// Error message (for failure events).
    pub error: Option<String>,

    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }

    /// Writes the event to the `eidas::audit` tracing target.
    pub fn emit(&self) {
        let details = self
            .details
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");

        match self.outcome {
            EventOutcome::Success => tracing::info!(
                target: "eidas::audit",
                event_id = %self.id,
                event_type = ?self.event_type,
                issuer = self.issuer.as_deref().unwrap_or(""),
                subject_id = self.subject_id.as_deref().unwrap_or(""),
                details = %details,
                "audit event"
            ),
            EventOutcome::Failure => tracing::warn!(
                target: "eidas::audit",
                event_id = %self.id,
                event_type = ?self.event_type,
                issuer = self.issuer.as_deref().unwrap_or(""),
                subject_id = self.subject_id.as_deref().unwrap_or(""),
                error = self.error.as_deref().unwrap_or(""),
                details = %details,
                "audit event"
            ),
        }
    }
}

/// Builder for creating events.
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    issuer: Option<String>,
    subject_id: Option<String>,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            issuer: None,
            subject_id: None,
            error: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to success.
    #[must_use]
    pub const fn success(mut self) -> Self {
        self.outcome = EventOutcome::Success;
        self
    }

    /// Sets the outcome to failure with an error message.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Sets the issuer.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the token or message id.
    #[must_use]
    pub fn subject(mut self, id: impl Into<String>) -> Self {
        self.subject_id = Some(id.into());
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            issuer: self.issuer,
            subject_id: self.subject_id,
            error: self.error,
            details: self.details,
        }
    }

    /// Builds and emits the event.
    pub fn emit(self) {
        self.build().emit();
    }
}
