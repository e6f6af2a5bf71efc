//! Recording doubles for the session's collaborators.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use serde_json::Value;
use shared::{
    domain::{ConnectionState, Selection, UserId, UserIdentity},
    protocol::OutboundMessage,
};
use tokio::sync::broadcast;

use crate::{
    channel::{ChannelClient, ChannelEvent},
    editor::{EditorAdapter, OrgImportsPrompt, OutsourcePanel, TestRunnerPanel},
    error::ChannelError,
    session::Collaborators,
    ui::{Affordance, UiAffordances},
};

pub struct RecordingChannel {
    state: Mutex<ConnectionState>,
    sent: Mutex<Vec<OutboundMessage>>,
    closed: Mutex<bool>,
    events: broadcast::Sender<ChannelEvent>,
}

impl RecordingChannel {
    pub fn new(state: ConnectionState) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            state: Mutex::new(state),
            sent: Mutex::new(Vec::new()),
            closed: Mutex::new(false),
            events,
        })
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.lock().expect("state lock") = state;
    }

    pub fn close(&self) {
        *self.closed.lock().expect("closed lock") = true;
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().expect("sent lock").clone()
    }

    pub fn emit(&self, event: ChannelEvent) {
        self.events.send(event).expect("session should be subscribed");
    }
}

impl ChannelClient for RecordingChannel {
    fn channel_state(&self) -> ConnectionState {
        *self.state.lock().expect("state lock")
    }

    fn send_extended_message(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        if *self.closed.lock().expect("closed lock") {
            return Err(ChannelError::Closed);
        }
        self.sent.lock().expect("sent lock").push(message);
        Ok(())
    }

    fn subscribe_events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events.subscribe()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Show(Affordance),
    Hide(Affordance),
    FadeOut(Affordance, Duration),
}

#[derive(Default)]
pub struct RecordingUi {
    visible: Mutex<BTreeSet<Affordance>>,
    calls: Mutex<Vec<UiCall>>,
}

impl RecordingUi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn visible(&self) -> BTreeSet<Affordance> {
        self.visible.lock().expect("visible lock").clone()
    }

    pub fn is_visible(&self, affordance: Affordance) -> bool {
        self.visible.lock().expect("visible lock").contains(&affordance)
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl UiAffordances for RecordingUi {
    fn show(&self, affordance: Affordance) {
        self.visible.lock().expect("visible lock").insert(affordance);
        self.calls.lock().expect("calls lock").push(UiCall::Show(affordance));
    }

    fn hide(&self, affordance: Affordance) {
        self.visible.lock().expect("visible lock").remove(&affordance);
        self.calls.lock().expect("calls lock").push(UiCall::Hide(affordance));
    }

    fn fade_out(&self, affordance: Affordance, duration: Duration) {
        self.calls
            .lock()
            .expect("calls lock")
            .push(UiCall::FadeOut(affordance, duration));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorCall {
    ApplyChangeset(String),
    ShowProposals(u64, Vec<Value>),
    SetAnnotations(String, Vec<Value>),
}

#[derive(Default)]
pub struct RecordingEditor {
    calls: Mutex<Vec<EditorCall>>,
    selection: Mutex<Selection>,
}

impl RecordingEditor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn select(&self, selection: Selection) {
        *self.selection.lock().expect("selection lock") = selection;
    }

    pub fn calls(&self) -> Vec<EditorCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl EditorAdapter for RecordingEditor {
    fn apply_changeset_as_user(&self, changeset: &str) {
        self.calls
            .lock()
            .expect("calls lock")
            .push(EditorCall::ApplyChangeset(changeset.to_string()));
    }

    fn show_code_completion_proposals(&self, offset: u64, proposals: &[Value]) {
        self.calls
            .lock()
            .expect("calls lock")
            .push(EditorCall::ShowProposals(offset, proposals.to_vec()));
    }

    fn set_annotations(&self, annotation_type: &str, annotations: &[Value]) {
        self.calls.lock().expect("calls lock").push(EditorCall::SetAnnotations(
            annotation_type.to_string(),
            annotations.to_vec(),
        ));
    }

    fn selection(&self) -> Selection {
        *self.selection.lock().expect("selection lock")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelCall {
    UpdateTest(Value, Value),
    UpdateOrder(Value),
    OrgImportsPrompt(Value),
    UpdateRequests(Vec<Value>),
    CreateRequest(Selection),
}

#[derive(Default)]
pub struct RecordingPanels {
    calls: Mutex<Vec<PanelCall>>,
    outsource_reply: Mutex<Option<Value>>,
}

impl RecordingPanels {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply_to_outsource(&self, request: Option<Value>) {
        *self.outsource_reply.lock().expect("reply lock") = request;
    }

    pub fn calls(&self) -> Vec<PanelCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: PanelCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl TestRunnerPanel for RecordingPanels {
    fn update_test(&self, test: &Value, result: &Value) {
        self.record(PanelCall::UpdateTest(test.clone(), result.clone()));
    }

    fn update_order(&self, order: &Value) {
        self.record(PanelCall::UpdateOrder(order.clone()));
    }
}

impl OrgImportsPrompt for RecordingPanels {
    fn handle_org_imports_resolve(&self, suggestion: &Value) {
        self.record(PanelCall::OrgImportsPrompt(suggestion.clone()));
    }
}

impl OutsourcePanel for RecordingPanels {
    fn update_requests(&self, requests: &[Value]) {
        self.record(PanelCall::UpdateRequests(requests.to_vec()));
    }

    fn create_request(&self, selection: &Selection) -> Option<Value> {
        self.record(PanelCall::CreateRequest(*selection));
        self.outsource_reply.lock().expect("reply lock").clone()
    }
}

pub struct Fixture {
    pub channel: Arc<RecordingChannel>,
    pub editor: Arc<RecordingEditor>,
    pub ui: Arc<RecordingUi>,
    pub panels: Arc<RecordingPanels>,
}

impl Fixture {
    pub fn new(state: ConnectionState) -> Self {
        Self {
            channel: RecordingChannel::new(state),
            editor: RecordingEditor::new(),
            ui: RecordingUi::new(),
            panels: RecordingPanels::new(),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            channel: self.channel.clone(),
            editor: self.editor.clone(),
            ui: self.ui.clone(),
            tests: self.panels.clone(),
            org_imports: self.panels.clone(),
            outsource: self.panels.clone(),
        }
    }
}

pub fn local_user() -> UserIdentity {
    UserIdentity {
        user_id: UserId::new("a.local"),
        name: "Ada".to_string(),
        color_id: 3,
    }
}
