//! Admin Panel test utilities
//!
//! In-memory collaborators (data store, permissions, router, renderer) and a
//! [`TestPanel`] harness with a sample [`Persona`] entity registered.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

pub mod fixtures;
pub mod memory;
pub mod permissions;
pub mod request;

pub use fixtures::{
    persona_record, CapturingRenderer, FailingAuditSink, Persona, TestPanel, TestPanelBuilder, APP,
};
pub use memory::MemoryDataIntegrator;
pub use permissions::RulePermissions;
pub use request::{RecordingRouter, TestRequest};
