//! Admin Schema - entity descriptors and field configuration
//!
//! Compiles an entity declaration into the configuration every request
//! path reads:
//! - [`Directives`] / [`Inclusion`]: per-field directive strings
//! - [`FieldConfig`]: inclusion flags plus form widgets for one field
//! - [`ModelSchema`]: the whole entity, built all-or-nothing
//!
//! Entities declare their fields through [`AdminModel`] and
//! [`ModelDescriptor`].

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod descriptor;
pub mod directive;
pub mod error;
pub mod field;
pub mod humanize;
pub mod schema;

pub use descriptor::{AdminModel, FieldDescriptor, FormMode, ModelDescriptor};
pub use directive::{Directives, Inclusion};
pub use error::{DirectiveError, RegistrationError};
pub use field::{apply_initial, build_widget, FieldConfig};
pub use humanize::{humanize, is_url_safe};
pub use schema::ModelSchema;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
