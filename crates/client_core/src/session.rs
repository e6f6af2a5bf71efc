//! Composition root: wires the channel, editor, widgets and UI together.

use std::sync::Arc;

use serde_json::Value;
use shared::{
    domain::{Selection, UserIdentity},
    protocol::{
        Annotations, ApplyChangesetAsUser, CodeCompleteProposals, ExtendedMessage, InboundKind,
        OrgImportsPrompt as OrgImportsPromptPayload, OutboundMessage, Outsourced, TestOrder,
        TestResult,
    },
};
use tokio::{runtime::Handle, sync::broadcast, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    channel::{ChannelClient, ChannelEvent},
    config::SessionTimings,
    editor::{EditorAdapter, OrgImportsPrompt, OutsourcePanel, TestRunnerPanel},
    error::{ChannelError, RouterError, SessionError},
    keybindings::{default_interceptors, ClaimToken, KeyEvent, KeybindingArbiter},
    lifecycle::ConnectionLifecycle,
    router::MessageRouter,
    ui::{SyncStatus, UiAffordances},
};

/// Everything the session talks to but does not own.
#[derive(Clone)]
pub struct Collaborators {
    pub channel: Arc<dyn ChannelClient>,
    pub editor: Arc<dyn EditorAdapter>,
    pub ui: Arc<dyn UiAffordances>,
    pub tests: Arc<dyn TestRunnerPanel>,
    pub org_imports: Arc<dyn OrgImportsPrompt>,
    pub outsource: Arc<dyn OutsourcePanel>,
}

pub struct EditorSession {
    user: UserIdentity,
    channel: Arc<dyn ChannelClient>,
    editor: Arc<dyn EditorAdapter>,
    outsource: Arc<dyn OutsourcePanel>,
    router: MessageRouter,
    lifecycle: ConnectionLifecycle,
    keys: KeybindingArbiter,
    sync_status: Arc<SyncStatus>,
}

impl EditorSession {
    /// Builds a session whose timers and catch-up sends run on the current
    /// tokio runtime.
    pub fn new(
        user: UserIdentity,
        collaborators: Collaborators,
        timings: SessionTimings,
    ) -> Result<Self, SessionError> {
        let runtime = Handle::try_current()?;
        Self::with_runtime(user, collaborators, timings, runtime)
    }

    /// Builds a session that spawns onto `runtime`. Use this when key and
    /// channel events arrive on a thread that is not part of the runtime.
    pub fn with_runtime(
        user: UserIdentity,
        collaborators: Collaborators,
        timings: SessionTimings,
        runtime: Handle,
    ) -> Result<Self, SessionError> {
        let sync_status = Arc::new(SyncStatus::new(
            Arc::clone(&collaborators.ui),
            timings,
            runtime.clone(),
        ));
        let router = build_router(&user, &collaborators)?;
        let lifecycle = ConnectionLifecycle::new(
            Arc::clone(&collaborators.channel),
            Arc::clone(&collaborators.ui),
            runtime,
        );
        let keys = KeybindingArbiter::with_interceptors(default_interceptors(
            Arc::clone(&collaborators.channel),
            Arc::clone(&sync_status),
        ));

        Ok(Self {
            user,
            channel: collaborators.channel,
            editor: collaborators.editor,
            outsource: collaborators.outsource,
            router,
            lifecycle,
            keys,
            sync_status,
        })
    }

    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    pub fn router_mut(&mut self) -> &mut MessageRouter {
        &mut self.router
    }

    pub fn keybindings_mut(&mut self) -> &mut KeybindingArbiter {
        &mut self.keys
    }

    /// Routes one channel event. Returns the catch-up task spawned by a
    /// `Connected` transition, if any.
    pub fn handle_channel_event(&self, event: ChannelEvent) -> Option<JoinHandle<()>> {
        match event {
            ChannelEvent::StateChanged(state) => self.lifecycle.on_state_change(state),
            ChannelEvent::Message(message) => {
                self.dispatch(&message);
                None
            }
            ChannelEvent::InternalAction(action) => {
                self.sync_status.on_internal_action(&action);
                None
            }
        }
    }

    pub fn dispatch(&self, message: &ExtendedMessage) -> bool {
        debug!(kind = %message.kind, "dispatching channel message");
        self.router.dispatch(message)
    }

    pub fn handle_key(&self, event: &mut KeyEvent) -> ClaimToken {
        self.keys.handle_key(event)
    }

    /// Applies the channel's current state, then pumps channel events until
    /// the event stream closes.
    pub async fn run(&self, mut events: broadcast::Receiver<ChannelEvent>) {
        info!(user_id = %self.user.user_id, "editor session started");
        self.lifecycle.on_state_change(self.channel.channel_state());
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle_channel_event(event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "editor session lagged behind channel events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        info!(user_id = %self.user.user_id, "editor session stopped");
    }

    pub fn request_format(&self) -> Result<(), ChannelError> {
        self.send(OutboundMessage::FormatRequest)
    }

    pub fn request_org_imports(&self) -> Result<(), ChannelError> {
        self.send(OutboundMessage::OrgImportsRequest)
    }

    pub fn run_tests(&self) -> Result<(), ChannelError> {
        self.send(OutboundMessage::TestsRunRequest)
    }

    /// Asks the outsourcing panel to build a request from the current
    /// selection. Nothing is sent if the panel declines.
    pub fn request_outsource(&self) -> Result<(), ChannelError> {
        let selection = self.editor.selection();
        match self.outsource.create_request(&selection) {
            Some(request) => self.send(OutboundMessage::outsource_create(request)),
            None => {
                debug!(?selection, "outsource request declined");
                Ok(())
            }
        }
    }

    pub fn force_commit(&self) -> Result<(), ChannelError> {
        let selection: Selection = self.editor.selection();
        self.send(OutboundMessage::force_commit(selection))
    }

    pub fn resolve_org_imports(&self, choices: Value) -> Result<(), ChannelError> {
        self.send(OutboundMessage::OrgImportsResolved { choices })
    }

    fn send(&self, message: OutboundMessage) -> Result<(), ChannelError> {
        let kind = message.kind();
        self.channel.send_extended_message(message)?;
        debug!(kind, "sent channel request");
        Ok(())
    }
}

fn build_router(
    user: &UserIdentity,
    collaborators: &Collaborators,
) -> Result<MessageRouter, RouterError> {
    let mut router = MessageRouter::new();

    let editor = Arc::clone(&collaborators.editor);
    router.register_typed(
        InboundKind::ApplyChangesetAsUser,
        move |msg: ApplyChangesetAsUser| editor.apply_changeset_as_user(&msg.changeset),
    )?;

    let editor = Arc::clone(&collaborators.editor);
    router.register_typed(
        InboundKind::CodeCompleteProposals,
        move |msg: CodeCompleteProposals| {
            editor.show_code_completion_proposals(msg.offset, &msg.proposals)
        },
    )?;

    let editor = Arc::clone(&collaborators.editor);
    let local_user = user.user_id.clone();
    router.register_typed(InboundKind::Annotations, move |msg: Annotations| {
        if msg.user_id == local_user {
            editor.set_annotations(&msg.annotation_type, &msg.annotations);
        }
    })?;

    let tests = Arc::clone(&collaborators.tests);
    router.register_typed(InboundKind::TestResult, move |msg: TestResult| {
        tests.update_test(&msg.test, &msg.result)
    })?;

    let tests = Arc::clone(&collaborators.tests);
    router.register_typed(InboundKind::TestOrder, move |msg: TestOrder| {
        tests.update_order(&msg.order)
    })?;

    let org_imports = Arc::clone(&collaborators.org_imports);
    router.register_typed(
        InboundKind::OrgImportsPrompt,
        move |msg: OrgImportsPromptPayload| org_imports.handle_org_imports_resolve(&msg.suggestion),
    )?;

    let outsource = Arc::clone(&collaborators.outsource);
    router.register_typed(InboundKind::Outsourced, move |msg: Outsourced| {
        outsource.update_requests(&msg.requests)
    })?;

    Ok(router)
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
