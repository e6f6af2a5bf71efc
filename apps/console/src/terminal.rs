//! Stdout stand-ins for the editor, status bar and side panels.

use std::{
    collections::BTreeSet,
    sync::Mutex,
    time::Duration,
};

use client_core::{
    Affordance, EditorAdapter, OrgImportsPrompt, OutsourcePanel, TestRunnerPanel, UiAffordances,
};
use serde_json::{json, Value};
use shared::domain::Selection;
use tracing::debug;

#[derive(Default)]
pub struct TerminalEditor {
    selection: Mutex<Selection>,
}

impl TerminalEditor {
    pub fn select(&self, selection: Selection) {
        match self.selection.lock() {
            Ok(mut guard) => *guard = selection,
            Err(poisoned) => *poisoned.into_inner() = selection,
        }
    }
}

impl EditorAdapter for TerminalEditor {
    fn apply_changeset_as_user(&self, changeset: &str) {
        println!("[editor] apply changeset {changeset}");
    }

    fn show_code_completion_proposals(&self, offset: u64, proposals: &[Value]) {
        println!("[editor] {} completion proposal(s) at {offset}", proposals.len());
        for proposal in proposals {
            println!("    {proposal}");
        }
    }

    fn set_annotations(&self, annotation_type: &str, annotations: &[Value]) {
        println!(
            "[editor] {} {annotation_type} annotation(s)",
            annotations.len()
        );
    }

    fn selection(&self) -> Selection {
        match self.selection.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Prints the status line whenever the visible set changes.
#[derive(Default)]
pub struct TerminalStatus {
    visible: Mutex<BTreeSet<Affordance>>,
}

impl TerminalStatus {
    fn update(&self, affordance: Affordance, show: bool) {
        let mut visible = match self.visible.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let changed = if show {
            visible.insert(affordance)
        } else {
            visible.remove(&affordance)
        };
        if changed {
            let line: Vec<&str> = visible.iter().map(|a| a.element_id()).collect();
            println!("[status] {}", line.join(" "));
        }
    }
}

impl UiAffordances for TerminalStatus {
    fn show(&self, affordance: Affordance) {
        self.update(affordance, true);
    }

    fn hide(&self, affordance: Affordance) {
        self.update(affordance, false);
    }

    fn fade_out(&self, affordance: Affordance, duration: Duration) {
        debug!(%affordance, ?duration, "fading out");
    }
}

/// Test runner, organize-imports prompt and outsourcing panel in one.
#[derive(Default)]
pub struct TerminalPanels;

impl TestRunnerPanel for TerminalPanels {
    fn update_test(&self, test: &Value, result: &Value) {
        println!("[tests] {test} -> {result}");
    }

    fn update_order(&self, order: &Value) {
        println!("[tests] order {order}");
    }
}

impl OrgImportsPrompt for TerminalPanels {
    fn handle_org_imports_resolve(&self, suggestion: &Value) {
        println!("[imports] choose with `resolve <json>`: {suggestion}");
    }
}

impl OutsourcePanel for TerminalPanels {
    fn update_requests(&self, requests: &[Value]) {
        println!("[outsource] {} open request(s)", requests.len());
        for request in requests {
            println!("    {request}");
        }
    }

    fn create_request(&self, selection: &Selection) -> Option<Value> {
        if selection.is_empty() {
            println!("[outsource] select a range first with `select <start> <end>`");
            return None;
        }
        Some(json!({
            "startOffset": selection.start_offset,
            "endOffset": selection.end_offset,
        }))
    }
}
