//! Editor engine and side-panel widgets, reduced to the calls the session makes.

use serde_json::Value;
use shared::domain::Selection;

pub trait EditorAdapter: Send + Sync {
    fn apply_changeset_as_user(&self, changeset: &str);
    fn show_code_completion_proposals(&self, offset: u64, proposals: &[Value]);
    fn set_annotations(&self, annotation_type: &str, annotations: &[Value]);
    fn selection(&self) -> Selection;
}

pub trait TestRunnerPanel: Send + Sync {
    fn update_test(&self, test: &Value, result: &Value);
    fn update_order(&self, order: &Value);
}

pub trait OrgImportsPrompt: Send + Sync {
    /// Presents an import-organisation suggestion; the user's answer comes
    /// back through `EditorSession::resolve_org_imports`.
    fn handle_org_imports_resolve(&self, suggestion: &Value);
}

pub trait OutsourcePanel: Send + Sync {
    fn update_requests(&self, requests: &[Value]);
    /// Builds an outsourcing request for the selection, or `None` if the user
    /// backed out.
    fn create_request(&self, selection: &Selection) -> Option<Value>;
}
