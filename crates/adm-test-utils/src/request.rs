//! In-process requests and routing

use adm_panel::{Handler, Method, RequestContext, RequestError, Response, WebIntegrator};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Request built in code
#[derive(Debug, Clone)]
pub struct TestRequest {
    method: Method,
    query: HashMap<String, String>,
    path: HashMap<String, String>,
    form: HashMap<String, Vec<String>>,
    body: Option<String>,
}

impl TestRequest {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: HashMap::new(),
            path: HashMap::new(),
            form: HashMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::Delete)
    }

    #[must_use]
    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn path_param(mut self, name: &str, value: impl ToString) -> Self {
        self.path.insert(name.to_string(), value.to_string());
        self
    }

    /// Add one form value
    #[must_use]
    pub fn form(mut self, name: &str, value: impl ToString) -> Self {
        self.form.entry(name.to_string()).or_default().push(value.to_string());
        self
    }

    /// JSON body
    #[must_use]
    pub fn json(mut self, value: &serde_json::Value) -> Self {
        self.body = Some(value.to_string());
        self
    }

    /// Raw body text
    #[must_use]
    pub fn body(mut self, raw: impl Into<String>) -> Self {
        self.body = Some(raw.into());
        self
    }

    /// Wrap for handler calls
    #[must_use]
    pub fn into_context(self) -> Arc<dyn RequestContext> {
        Arc::new(self)
    }
}

impl RequestContext for TestRequest {
    fn method(&self) -> Method {
        self.method
    }

    fn query_param(&self, name: &str) -> Option<String> {
        self.query.get(name).cloned()
    }

    fn path_param(&self, name: &str) -> Option<String> {
        self.path.get(name).cloned()
    }

    fn form_data(&self) -> HashMap<String, Vec<String>> {
        self.form.clone()
    }

    fn json_body(&self) -> Result<serde_json::Value, RequestError> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| RequestError::InvalidJson("empty body".into()))?;
        serde_json::from_str(body).map_err(|err| RequestError::InvalidJson(err.to_string()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct Route {
    method: Method,
    path: String,
    handler: Handler,
}

/// Web binding that records routes and dispatches in-process
#[derive(Default)]
pub struct RecordingRouter {
    routes: Mutex<Vec<Route>>,
}

impl std::fmt::Debug for RecordingRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.routes()).finish()
    }
}

impl RecordingRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered `(method, path)` pairs in registration order
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.routes
            .lock()
            .iter()
            .map(|r| (r.method, r.path.clone()))
            .collect()
    }

    /// Route `request` to the first matching handler
    ///
    /// `:name` segments of the route fill the request's path parameters.
    /// Returns `None` when nothing matches.
    pub async fn dispatch(&self, path: &str, mut request: TestRequest) -> Option<Response> {
        let handler = {
            let routes = self.routes.lock();
            let (route, params) = routes.iter().find_map(|route| {
                if route.method != request.method {
                    return None;
                }
                match_path(&route.path, path).map(|params| (route, params))
            })?;
            request.path.extend(params);
            Arc::clone(&route.handler)
        };
        Some(handler(request.into_context()).await)
    }
}

impl WebIntegrator for RecordingRouter {
    fn handle_route(&self, method: Method, path: &str, handler: Handler) {
        self.routes.lock().push(Route {
            method,
            path: path.to_string(),
            handler,
        });
    }
}

fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern: Vec<&str> = pattern.split('/').collect();
    let path: Vec<&str> = path.split('/').collect();
    if pattern.len() != path.len() {
        return None;
    }
    let mut params = HashMap::new();
    for (p, s) in pattern.iter().zip(&path) {
        if let Some(name) = p.strip_prefix(':') {
            if s.is_empty() {
                return None;
            }
            params.insert(name.to_string(), (*s).to_string());
        } else if p != s {
            return None;
        }
    }
    Some(params)
}
