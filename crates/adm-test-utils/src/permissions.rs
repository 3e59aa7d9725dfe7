//! Rule-based permission checker

use adm_form::FieldValue;
use adm_panel::{PermissionAction, PermissionChecker, PermissionError, PermissionRequest, RequestContext};
use async_trait::async_trait;
use parking_lot::Mutex;

type Rule = Box<dyn Fn(&PermissionRequest) -> bool + Send + Sync>;

/// Allows everything except what a deny rule matches
///
/// Every request is recorded for later assertions.
#[derive(Default)]
pub struct RulePermissions {
    deny: Vec<Rule>,
    failure: Option<String>,
    checks: Mutex<Vec<PermissionRequest>>,
}

impl std::fmt::Debug for RulePermissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulePermissions")
            .field("deny_rules", &self.deny.len())
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

impl RulePermissions {
    #[must_use]
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Deny requests matching `rule`
    #[must_use]
    pub fn deny(mut self, rule: impl Fn(&PermissionRequest) -> bool + Send + Sync + 'static) -> Self {
        self.deny.push(Box::new(rule));
        self
    }

    /// Deny `action` on one instance
    #[must_use]
    pub fn deny_instance(self, action: PermissionAction, id: impl Into<FieldValue>) -> Self {
        let id = id.into();
        self.deny(move |r| r.action == action && r.instance.as_ref() == Some(&id))
    }

    /// Deny model-level `action`
    #[must_use]
    pub fn deny_model(self, action: PermissionAction) -> Self {
        self.deny(move |r| r.action == action && r.model.is_some() && r.instance.is_none())
    }

    /// Deny reading the app page
    #[must_use]
    pub fn deny_app_read(self) -> Self {
        self.deny(|r| r.action == PermissionAction::Read && r.model.is_none())
    }

    /// Fail every check with `message`
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Requests seen so far
    #[must_use]
    pub fn checks(&self) -> Vec<PermissionRequest> {
        self.checks.lock().clone()
    }
}

#[async_trait]
impl PermissionChecker for RulePermissions {
    async fn check(&self, request: &PermissionRequest, _ctx: &dyn RequestContext) -> Result<bool, PermissionError> {
        self.checks.lock().push(request.clone());
        if let Some(message) = &self.failure {
            return Err(PermissionError(message.clone()));
        }
        Ok(!self.deny.iter().any(|rule| rule(request)))
    }
}
