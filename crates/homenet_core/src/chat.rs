use std::collections::BTreeSet;
use std::fmt;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};

use crate::markup::{escape_html, render};
use crate::view_model::{ChatViewModel, EntryRole, TranscriptEntryView};
use crate::Effect;

pub type RequestId = u64;

pub const WELCOME_HTML: &str =
    r#"<div class="text-gray-300">Welcome! Ask me anything and I'll help you out.</div>"#;
pub const CANCELLED_HTML: &str = r#"<span class="text-gray-400">Request cancelled by user</span>"#;
pub const CONNECTION_ERROR_HTML: &str =
    r#"<span class="text-red-400">Error: Failed to connect to AI service</span>"#;

/// Identity of a Display Node: submission time plus a per-session sequence,
/// so two submissions within the same millisecond still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub stamp_ms: u64,
    pub seq: u64,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ai-response-{}-{}", self.stamp_ms, self.seq)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPhase {
    #[default]
    Idle,
    Submitting,
    AwaitingResponse,
}

/// How the most recent request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Completed,
    Cancelled,
    Failed,
}

/// What the engine reports when an AI request settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Answered(String),
    Failed { detail: String },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Pending,
    Rendered(String),
    Cancelled,
    Failed,
}

impl NodeContent {
    pub fn html(&self) -> &str {
        match self {
            NodeContent::Pending => "",
            NodeContent::Rendered(html) => html,
            NodeContent::Cancelled => CANCELLED_HTML,
            NodeContent::Failed => CONNECTION_ERROR_HTML,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Welcome,
    Query { text: String },
    Response { node_id: NodeId, content: NodeContent },
}

/// Cancellation capability for the single in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelHandle {
    pub request_id: RequestId,
    pub node_id: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatState {
    phase: RequestPhase,
    handle: Option<CancelHandle>,
    cancelled: BTreeSet<RequestId>,
    transcript: Vec<TranscriptEntry>,
    input: String,
    next_request_id: RequestId,
    next_node_seq: u64,
    loading_visible: bool,
    send_visible: bool,
    stop_visible: bool,
    focus_requested: bool,
    last_settlement: Option<Settlement>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            phase: RequestPhase::Idle,
            handle: None,
            cancelled: BTreeSet::new(),
            transcript: vec![TranscriptEntry::Welcome],
            input: String::new(),
            next_request_id: 1,
            next_node_seq: 1,
            loading_visible: false,
            send_visible: true,
            stop_visible: false,
            focus_requested: false,
            last_settlement: None,
        }
    }
}

impl ChatState {
    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    pub fn handle(&self) -> Option<CancelHandle> {
        self.handle
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn last_settlement(&self) -> Option<Settlement> {
        self.last_settlement
    }

    pub(crate) fn view(&self) -> ChatViewModel {
        let entries = self
            .transcript
            .iter()
            .map(|entry| match entry {
                TranscriptEntry::Welcome => TranscriptEntryView {
                    role: EntryRole::Notice,
                    node_id: None,
                    pending: false,
                    content_html: WELCOME_HTML.to_string(),
                    html: WELCOME_HTML.to_string(),
                },
                TranscriptEntry::Query { text } => {
                    let html = user_echo_html(text);
                    TranscriptEntryView {
                        role: EntryRole::User,
                        node_id: None,
                        pending: false,
                        content_html: escape_html(text),
                        html,
                    }
                }
                TranscriptEntry::Response { node_id, content } => TranscriptEntryView {
                    role: EntryRole::Assistant,
                    node_id: Some(node_id.to_string()),
                    pending: *content == NodeContent::Pending,
                    content_html: content.html().to_string(),
                    html: response_container_html(*node_id, content.html()),
                },
            })
            .collect();

        ChatViewModel {
            phase: self.phase,
            input: self.input.clone(),
            loading_visible: self.loading_visible,
            send_visible: self.send_visible,
            stop_visible: self.stop_visible,
            focus_input: self.focus_requested,
            entries,
        }
    }

    pub fn node_content(&self, node_id: NodeId) -> Option<&NodeContent> {
        self.transcript.iter().find_map(|entry| match entry {
            TranscriptEntry::Response {
                node_id: id,
                content,
            } if *id == node_id => Some(content),
            _ => None,
        })
    }

    pub(crate) fn set_input(&mut self, text: String) {
        self.input = text;
    }

    pub(crate) fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    /// Starts a request for the current input, unless one is already running
    /// or the trimmed input is empty. Returns `None` when the submission was
    /// ignored.
    pub(crate) fn submit(&mut self, submitted_at_ms: u64) -> Option<Vec<Effect>> {
        if self.phase != RequestPhase::Idle {
            engine_warn!("Form submission ignored - already processing");
            return None;
        }
        let prompt = self.input.trim().to_string();
        if prompt.is_empty() {
            engine_warn!("Empty message submitted");
            return None;
        }

        engine_info!("Form submitted with message: {}", prompt);
        self.phase = RequestPhase::Submitting;
        self.transcript.push(TranscriptEntry::Query {
            text: prompt.clone(),
        });
        self.input.clear();
        self.loading_visible = true;
        self.send_visible = false;
        self.stop_visible = true;

        let node_id = NodeId {
            stamp_ms: submitted_at_ms,
            seq: self.next_node_seq,
        };
        self.next_node_seq += 1;
        engine_debug!("Creating AI response container with ID: {}", node_id);
        self.transcript.push(TranscriptEntry::Response {
            node_id,
            content: NodeContent::Pending,
        });

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.handle = Some(CancelHandle {
            request_id,
            node_id,
        });
        self.phase = RequestPhase::AwaitingResponse;
        engine_info!("Sending request {} to /ai/query", request_id);

        Some(vec![Effect::SendQuery { request_id, prompt }])
    }

    /// Cancels the in-flight request. The UI returns to idle right away; the
    /// engine's later settlement for this request is dropped.
    pub(crate) fn cancel(&mut self) -> Option<Vec<Effect>> {
        let Some(handle) = self.handle.take() else {
            engine_debug!("Stop ignored - no request in flight");
            return None;
        };
        engine_info!("Stopping request {} via cancellation handle", handle.request_id);
        self.cancelled.insert(handle.request_id);
        self.set_node_content(handle.node_id, NodeContent::Cancelled);
        self.last_settlement = Some(Settlement::Cancelled);
        self.reset_ui();
        Some(vec![Effect::CancelQuery {
            request_id: handle.request_id,
        }])
    }

    /// Applies a settlement. Returns `false` when it was stale and ignored.
    pub(crate) fn settle(&mut self, request_id: RequestId, outcome: QueryOutcome) -> bool {
        if self.cancelled.remove(&request_id) {
            engine_info!(
                "Request {} settled after user cancellation; keeping cancellation message",
                request_id
            );
            return false;
        }
        let handle = match self.handle {
            Some(handle) if handle.request_id == request_id => handle,
            _ => {
                engine_warn!("Ignoring settlement for unknown request {}", request_id);
                return false;
            }
        };
        self.handle = None;

        let (content, settlement) = match outcome {
            QueryOutcome::Answered(body) => {
                engine_debug!("Raw response received, length: {}", body.len());
                (NodeContent::Rendered(render(&body)), Settlement::Completed)
            }
            QueryOutcome::Failed { detail } => {
                engine_error!("Connection error: {}", detail);
                (NodeContent::Failed, Settlement::Failed)
            }
            QueryOutcome::Cancelled => {
                engine_info!("Request cancelled");
                (NodeContent::Cancelled, Settlement::Cancelled)
            }
        };
        self.set_node_content(handle.node_id, content);
        self.last_settlement = Some(settlement);
        self.reset_ui();
        true
    }

    pub(crate) fn clear(&mut self) {
        engine_info!("Clearing chat history");
        self.transcript = vec![TranscriptEntry::Welcome];
    }

    fn set_node_content(&mut self, node_id: NodeId, new_content: NodeContent) {
        let slot = self.transcript.iter_mut().find_map(|entry| match entry {
            TranscriptEntry::Response {
                node_id: id,
                content,
            } if *id == node_id => Some(content),
            _ => None,
        });
        match slot {
            Some(content) => *content = new_content,
            None => engine_debug!("Display node {} no longer in transcript", node_id),
        }
    }

    fn reset_ui(&mut self) {
        engine_debug!("Resetting UI state");
        self.loading_visible = false;
        self.send_visible = true;
        self.stop_visible = false;
        self.phase = RequestPhase::Idle;
        self.focus_requested = true;
    }
}

/// Markup for an echoed user query. The text is always escaped.
pub fn user_echo_html(text: &str) -> String {
    format!(
        r#"<b class="text-blue-400">You:</b> <span class="text-gray-300">{}</span>"#,
        escape_html(text)
    )
}

/// Markup for an AI response container holding `content`.
pub fn response_container_html(node_id: NodeId, content: &str) -> String {
    format!(
        r#"<b class="text-green-400">AI:</b> <div id="{node_id}" class="text-gray-300 mt-2">{content}</div>"#
    )
}
