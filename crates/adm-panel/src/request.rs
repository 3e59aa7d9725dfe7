//! Transport contract
//!
//! The panel never touches sockets. A web framework binding implements
//! [`WebIntegrator`] to receive routes and wraps each incoming request in a
//! [`RequestContext`]; handlers answer with a framework-neutral [`Response`].

use crate::error::{status, RequestError};
use futures::future::BoxFuture;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Arc;

/// HTTP method of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request view supplied by the web framework binding
pub trait RequestContext: Send + Sync {
    fn method(&self) -> Method;

    /// Query string parameter
    fn query_param(&self, name: &str) -> Option<String>;

    /// Path parameter bound by a `:name` route segment
    fn path_param(&self, name: &str) -> Option<String>;

    /// Url-encoded form fields, possibly multi-valued
    fn form_data(&self) -> HashMap<String, Vec<String>>;

    /// Parsed JSON body
    ///
    /// # Errors
    /// [`RequestError::InvalidJson`] when the body is absent or malformed.
    fn json_body(&self) -> Result<serde_json::Value, RequestError>;

    /// Framework-specific request for downcasting by collaborators
    fn as_any(&self) -> &dyn Any;
}

/// Response payload
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Html(String),
    Json(serde_json::Value),
    Empty,
}

/// Framework-neutral response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: ResponseBody,
    /// `Location` header for redirects
    pub location: Option<String>,
}

impl Response {
    #[must_use]
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: ResponseBody::Html(body.into()),
            location: None,
        }
    }

    #[must_use]
    pub fn json(status: u16, body: &JsonResponse) -> Self {
        let value = serde_json::to_value(body).unwrap_or_else(|err| {
            tracing::error!(error = %err, "failed to serialize JSON response");
            serde_json::json!({ "success": false, "errors": [err.to_string()] })
        });
        Self {
            status,
            body: ResponseBody::Json(value),
            location: None,
        }
    }

    /// `303 See Other` to `location`
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: status::SEE_OTHER,
            body: ResponseBody::Empty,
            location: Some(location.into()),
        }
    }

    /// Plain error page: `Code: <status>. Error: <err>`
    #[must_use]
    pub fn error_html(status: u16, err: &dyn Display) -> Self {
        Self::html(status, format!("Code: {status}. Error: {err}"))
    }

    /// HTML body, if any
    #[must_use]
    pub fn html_body(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Html(s) => Some(s),
            _ => None,
        }
    }

    /// JSON body, if any
    #[must_use]
    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            ResponseBody::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Uniform AJAX payload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JsonResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl JsonResponse {
    /// Successful response
    #[must_use]
    pub fn success(data: Option<serde_json::Value>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: true,
            message: (!message.is_empty()).then_some(message),
            data,
            errors: Vec::new(),
        }
    }

    /// Failed response
    #[must_use]
    pub fn error(errors: Vec<String>) -> Self {
        Self {
            success: false,
            errors,
            ..Self::default()
        }
    }
}

/// Route handler
pub type Handler = Arc<dyn Fn(Arc<dyn RequestContext>) -> BoxFuture<'static, Response> + Send + Sync>;

/// Web framework binding
pub trait WebIntegrator: Send + Sync {
    /// Register `handler` for `method` on `path`
    ///
    /// Paths use `:name` segments for path parameters.
    fn handle_route(&self, method: Method, path: &str, handler: Handler);
}
