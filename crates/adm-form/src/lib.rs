//! Admin Forms - typed widgets and form validation
//!
//! Building blocks shared by the schema builder and the request pipeline:
//! - [`ValueKind`] / [`FieldValue`] and the single string conversion
//!   function [`convert_str`]
//! - [`Widget`], a closed tagged union of form inputs with constraints
//! - [`Form`] with [`values_are_valid`] and [`clean_data`]
//! - four interchangeable [`FormRenderer`]s
//!
//! # Example
//!
//! ```rust
//! use adm_form::{values_are_valid, Form, FormValues, NumericWidget, Widget};
//! use std::sync::Arc;
//!
//! let mut form = Form::new();
//! form.add_field(
//!     "Age",
//!     "Age",
//!     Arc::new(Widget::Integer(NumericWidget { min: Some(0), ..NumericWidget::default() })),
//! )
//! .unwrap();
//!
//! let mut values = FormValues::new();
//! values.insert("Age".into(), "-1".into());
//! let report = values_are_valid(&form, &values).unwrap();
//! assert!(!report.is_valid());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod form;
pub mod render;
pub mod value;
pub mod widget;

pub use form::{
    clean_data, first_values, validation_fn, values_are_valid, CleanData, Form, FormError,
    FormField, FormValues, ValidationFn, ValidationReport,
};
pub use render::{
    FormRenderer, ListRenderer, PanelRenderer, ParagraphRenderer, RenderStyle, TableRenderer,
};
pub use value::{convert_str, json_to_form_string, parse_bool, ConversionError, FieldValue, ValueKind};
pub use widget::{
    escape_text, BooleanWidget, IdentifierWidget, NumericValue, NumericWidget, OpaqueWidget,
    TextWidget, Widget, REQUIRED_MESSAGE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
