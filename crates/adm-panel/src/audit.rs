//! Audit trail
//!
//! Every successful view and mutation records an [`AuditEvent`]. A failing
//! [`AuditSink`] fails the request that produced the event.

use crate::error::AuditError;
use crate::request::RequestContext;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditLevel {
    PanelView,
    ListView,
    InstanceView,
    InstanceAdd,
    InstanceEdit,
    InstanceDelete,
}

/// One audited action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: AuditLevel,
    /// What was touched: an app name, `app | model`, or an instance id
    pub subject: String,
    pub model: Option<String>,
    pub detail: Option<serde_json::Value>,
}

impl AuditEvent {
    #[must_use]
    pub fn new(level: AuditLevel, subject: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level,
            subject: subject.into(),
            model: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Audit storage
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, ctx: &dyn RequestContext, event: AuditEvent) -> Result<(), AuditError>;
}

/// Emits audit events as `tracing` events on the `audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, ctx: &dyn RequestContext, event: AuditEvent) -> Result<(), AuditError> {
        tracing::info!(
            target: "audit",
            id = %event.id,
            level = ?event.level,
            subject = %event.subject,
            model = event.model.as_deref().unwrap_or(""),
            method = %ctx.method(),
            "audit event"
        );
        Ok(())
    }
}

/// Keeps audit events in memory
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    inner: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events, oldest first
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.inner.lock().clone()
    }

    /// Recorded events of one level
    #[must_use]
    pub fn events_of(&self, level: AuditLevel) -> Vec<AuditEvent> {
        self.inner
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditLog {
    async fn record(&self, _ctx: &dyn RequestContext, event: AuditEvent) -> Result<(), AuditError> {
        self.inner.lock().push(event);
        Ok(())
    }
}
