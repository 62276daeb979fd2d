//! Typed message channel between the UI and the engine, and the session
//! that turns requests into events.

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::document::DocumentProvider;
use crate::focus::focus_node;
use crate::scanner::{scan, ScanScope};
use crate::types::{ScanOptions, ScanResult};

pub const CODE_SCAN_FAILED: &str = "SCAN_FAILED";
pub const CODE_BAD_MESSAGE: &str = "BAD_MESSAGE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusRequest {
    pub node_id: String,
}

/// UI → engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiRequest {
    ScanRequest(ScanOptions),
    RescanRequest,
    FocusNode(FocusRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInfo {
    pub has_selection: bool,
    pub selection_count: usize,
}

impl SelectionInfo {
    pub fn of(count: usize) -> Self {
        Self {
            has_selection: count > 0,
            selection_count: count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub scanned: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Engine → UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineEvent {
    PluginReady(SelectionInfo),
    ScanStarted,
    ScanProgress(ScanProgress),
    ScanResult(ScanResult),
    SelectionChanged(SelectionInfo),
    Error(ErrorPayload),
}

impl EngineEvent {
    pub fn error(message: impl Into<String>, code: &str) -> Self {
        EngineEvent::Error(ErrorPayload {
            message: message.into(),
            code: Some(code.to_string()),
        })
    }
}

/// Where the session sends its events.
pub trait EventSink {
    fn emit(&mut self, event: EngineEvent);
}

impl EventSink for Vec<EngineEvent> {
    fn emit(&mut self, event: EngineEvent) {
        self.push(event);
    }
}

impl EventSink for Sender<EngineEvent> {
    fn emit(&mut self, event: EngineEvent) {
        if self.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Scanning,
}

/// One UI connection: a provider handle, an event sink and the scan state.
pub struct PluginSession<P, S> {
    provider: P,
    sink: S,
    state: SessionState,
}

impl<P: DocumentProvider, S: EventSink> PluginSession<P, S> {
    pub fn new(provider: P, sink: S) -> Self {
        Self {
            provider,
            sink,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (P, S) {
        (self.provider, self.sink)
    }

    fn selection_info(&self) -> SelectionInfo {
        SelectionInfo::of(self.provider.selection().len())
    }

    pub fn ready(&mut self) {
        let info = self.selection_info();
        self.sink.emit(EngineEvent::PluginReady(info));
    }

    pub fn selection_changed(&mut self) {
        let info = self.selection_info();
        self.sink.emit(EngineEvent::SelectionChanged(info));
    }

    /// Decode a raw JSON message and handle it. Undecodable messages are
    /// answered with an `ERROR` event.
    pub async fn handle_json(&mut self, raw: &str) {
        match serde_json::from_str::<UiRequest>(raw) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                debug!(error = %e, "undecodable message");
                self.sink.emit(EngineEvent::error(
                    format!("Unrecognized message: {e}"),
                    CODE_BAD_MESSAGE,
                ));
            }
        }
    }

    pub async fn handle(&mut self, request: UiRequest) {
        match request {
            UiRequest::ScanRequest(options) => self.run_scan(options).await,
            UiRequest::RescanRequest => self.run_scan(ScanOptions::default()).await,
            UiRequest::FocusNode(FocusRequest { node_id }) => {
                if let Err(e) = focus_node(&mut self.provider, &node_id).await {
                    self.sink.emit(EngineEvent::error(e.to_string(), e.code()));
                }
            }
        }
    }

    async fn run_scan(&mut self, options: ScanOptions) {
        if let Err(e) = options.validate() {
            self.sink.emit(EngineEvent::error(e.to_string(), CODE_BAD_MESSAGE));
            return;
        }

        if self.state == SessionState::Scanning {
            info!("scan requested while another is running, starting over");
        }
        self.state = SessionState::Scanning;
        self.sink.emit(EngineEvent::ScanStarted);

        let sink = &mut self.sink;
        let mut on_progress =
            |scanned: usize| sink.emit(EngineEvent::ScanProgress(ScanProgress { scanned }));
        let outcome = scan(&self.provider, ScanScope::Auto, &options, Some(&mut on_progress)).await;

        match outcome {
            Ok(result) => self.sink.emit(EngineEvent::ScanResult(result)),
            Err(e) => {
                error!(error = %e, "scan failed");
                self.sink.emit(EngineEvent::error(
                    format!("Scan failed: {e}"),
                    CODE_SCAN_FAILED,
                ));
            }
        }
        self.state = SessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentSnapshot, FontName, Node, NodeId, TextStyle};
    use crate::error::ProviderError;
    use crate::test_utils::{frame, text_node};
    use async_trait::async_trait;
    use futures::executor::block_on;
    use serde_json::json;

    fn document(selection: Vec<&str>) -> DocumentSnapshot {
        DocumentSnapshot::from_value(json!({
            "pages": [
                {"id": "1:1", "children": [
                    frame("f1", Some("#ffffff"), [0.0, 0.0, 100.0, 100.0], vec![
                        text_node("a", "Dark", "#000000", 16.0, "Regular"),
                        text_node("b", "Faint", "#eeeeee", 16.0, "Regular")
                    ]),
                    frame("f2", Some("#ffffff"), [0.0, 0.0, 100.0, 100.0], vec![
                        text_node("c", "Other", "#000000", 16.0, "Regular")
                    ])
                ]},
                {"id": "1:2", "children": [
                    frame("f3", None, [0.0, 0.0, 100.0, 100.0], vec![])
                ]}
            ],
            "selection": selection
        }))
        .unwrap()
    }

    fn session(selection: Vec<&str>) -> PluginSession<DocumentSnapshot, Vec<EngineEvent>> {
        PluginSession::new(document(selection), Vec::new())
    }

    // ── Wire format ──

    #[test]
    fn requests_decode_from_tagged_json() {
        let req: UiRequest = serde_json::from_str(
            r#"{"type": "SCAN_REQUEST", "payload": {"includeHiddenLayers": true}}"#,
        )
        .unwrap();
        match req {
            UiRequest::ScanRequest(options) => {
                assert!(options.include_hidden_layers);
                assert_eq!(options.min_contrast_ratio, 4.5);
            }
            other => panic!("unexpected {other:?}"),
        }

        let req: UiRequest = serde_json::from_str(r#"{"type": "RESCAN_REQUEST"}"#).unwrap();
        assert_eq!(req, UiRequest::RescanRequest);

        let req: UiRequest =
            serde_json::from_str(r#"{"type": "FOCUS_NODE", "payload": {"nodeId": "12:34"}}"#)
                .unwrap();
        assert_eq!(
            req,
            UiRequest::FocusNode(FocusRequest {
                node_id: "12:34".to_string()
            })
        );
    }

    #[test]
    fn events_encode_to_tagged_json() {
        let ready = serde_json::to_value(EngineEvent::PluginReady(SelectionInfo::of(2))).unwrap();
        assert_eq!(
            ready,
            json!({"type": "PLUGIN_READY", "payload": {"hasSelection": true, "selectionCount": 2}})
        );

        let started = serde_json::to_value(EngineEvent::ScanStarted).unwrap();
        assert_eq!(started, json!({"type": "SCAN_STARTED"}));

        let error = serde_json::to_value(EngineEvent::error("boom", CODE_SCAN_FAILED)).unwrap();
        assert_eq!(
            error,
            json!({"type": "ERROR", "payload": {"message": "boom", "code": "SCAN_FAILED"}})
        );
    }

    #[test]
    fn scan_result_payload_is_camel_case() {
        let mut s = session(vec![]);
        block_on(s.handle(UiRequest::RescanRequest));
        let result = s.sink().last().unwrap();
        let value = serde_json::to_value(result).unwrap();
        assert_eq!(value["type"], "SCAN_RESULT");
        assert_eq!(value["payload"]["totalScanned"], 3);
        assert_eq!(value["payload"]["textLayers"][1]["issueType"], "contrast-fail");
        assert_eq!(value["payload"]["textLayers"][0]["wcagLevel"], "AAA");
    }

    // ── Lifecycle ──

    #[test]
    fn ready_and_selection_events() {
        let mut s = session(vec!["f2"]);
        s.ready();
        s.selection_changed();
        assert_eq!(
            s.sink(),
            &vec![
                EngineEvent::PluginReady(SelectionInfo::of(1)),
                EngineEvent::SelectionChanged(SelectionInfo::of(1)),
            ]
        );

        let mut empty = session(vec![]);
        empty.ready();
        assert_eq!(
            empty.sink()[0],
            EngineEvent::PluginReady(SelectionInfo {
                has_selection: false,
                selection_count: 0
            })
        );
    }

    #[test]
    fn scan_emits_started_progress_then_result() {
        let mut s = session(vec![]);
        block_on(s.handle(UiRequest::ScanRequest(ScanOptions::default())));
        let events = s.sink();

        assert_eq!(events.first(), Some(&EngineEvent::ScanStarted));
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::ScanProgress(ScanProgress { scanned: 3 }))));
        match events.last() {
            Some(EngineEvent::ScanResult(result)) => {
                assert_eq!(result.total_scanned, 3);
                assert_eq!(result.error_count, 1);
            }
            other => panic!("expected result, got {other:?}"),
        }
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn scan_uses_selection_when_present() {
        let mut s = session(vec!["f2"]);
        block_on(s.handle(UiRequest::RescanRequest));
        match s.sink().last() {
            Some(EngineEvent::ScanResult(result)) => assert_eq!(result.total_scanned, 1),
            other => panic!("expected result, got {other:?}"),
        }
    }

    #[test]
    fn invalid_options_are_rejected_before_scanning() {
        let mut s = session(vec![]);
        block_on(s.handle_json(
            r#"{"type": "SCAN_REQUEST", "payload": {"minContrastRatio": 40}}"#,
        ));
        assert_eq!(s.sink().len(), 1);
        assert!(matches!(
            &s.sink()[0],
            EngineEvent::Error(ErrorPayload { code: Some(code), .. }) if code == CODE_BAD_MESSAGE
        ));
    }

    #[test]
    fn garbage_message_is_reported() {
        let mut s = session(vec![]);
        block_on(s.handle_json(r#"{"type": "DANCE"}"#));
        block_on(s.handle_json("not json"));
        assert_eq!(s.sink().len(), 2);
        assert!(s
            .sink()
            .iter()
            .all(|e| matches!(e, EngineEvent::Error(p) if p.code.as_deref() == Some(CODE_BAD_MESSAGE))));
    }

    // ── Focus ──

    #[test]
    fn focus_request_moves_selection_silently() {
        let mut s = session(vec![]);
        block_on(s.handle_json(r#"{"type": "FOCUS_NODE", "payload": {"nodeId": "f3"}}"#));
        assert!(s.sink().is_empty());
        assert_eq!(s.provider().current_page(), NodeId::from("1:2"));
        assert_eq!(s.provider().selection(), vec![NodeId::from("f3")]);
    }

    #[test]
    fn focus_failure_becomes_error_event() {
        let mut s = session(vec![]);
        block_on(s.handle(UiRequest::FocusNode(FocusRequest {
            node_id: "missing".to_string(),
        })));
        assert_eq!(
            s.sink(),
            &vec![EngineEvent::error(
                "Layer not found. It may have been deleted.",
                "NODE_NOT_FOUND"
            )]
        );
    }

    // ── Failure recovery ──

    /// Provider whose current page can never be loaded.
    struct BrokenPages;

    #[async_trait]
    impl DocumentProvider for BrokenPages {
        fn node(&self, _id: &NodeId) -> Option<Node> {
            None
        }
        fn current_page(&self) -> NodeId {
            NodeId::from("1:1")
        }
        fn selection(&self) -> Vec<NodeId> {
            Vec::new()
        }
        async fn text_style(&self, _style_id: &str) -> Result<Option<TextStyle>, ProviderError> {
            Ok(None)
        }
        async fn load_font(&self, _font: &FontName) -> Result<(), ProviderError> {
            Ok(())
        }
        async fn node_by_id(&self, _id: &str) -> Option<Node> {
            None
        }
        async fn load_page(&self, page: &NodeId) -> Result<(), ProviderError> {
            Err(ProviderError::PageLoad(page.to_string()))
        }
        fn set_current_page(&mut self, _page: &NodeId) -> Result<(), ProviderError> {
            Ok(())
        }
        fn set_selection(&mut self, _nodes: Vec<NodeId>) {}
        fn scroll_and_zoom_into_view(&mut self, _nodes: &[NodeId]) {}
    }

    #[test]
    fn scan_failure_emits_error_and_returns_to_idle() {
        let mut s = PluginSession::new(BrokenPages, Vec::new());
        block_on(s.handle(UiRequest::RescanRequest));
        let (_, events) = s.into_parts();
        assert_eq!(events[0], EngineEvent::ScanStarted);
        match &events[1] {
            EngineEvent::Error(payload) => {
                assert_eq!(payload.code.as_deref(), Some(CODE_SCAN_FAILED));
                assert!(payload.message.contains("1:1"));
            }
            other => panic!("expected error, got {other:?}"),
        }
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn channel_sink_forwards_events() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut s = PluginSession::new(document(vec![]), tx);
        s.ready();
        assert_eq!(rx.recv().unwrap(), EngineEvent::PluginReady(SelectionInfo::of(0)));
    }
}
