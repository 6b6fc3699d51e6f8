// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Recording host doubles for controller tests.

use super::error::TransportError;
use super::host::{
    ClientEvent, Clipboard, ConfirmRequest, ConfirmService, Document, ElementRef, FrameSource, Host,
    HttpRequest, HttpResponse, ModalSurface, NavigateOptions, Notifier, PrintHost, Timer, Transport,
};
use crate::action::ContentKind;
use crate::result::Notification;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub(crate) struct RecordingDocument {
    csrf: Mutex<Option<String>>,
    loading: Mutex<HashSet<String>>,
    loading_history: Mutex<Vec<(String, bool)>>,
    events: Mutex<Vec<(String, ClientEvent)>>,
    navigations: Mutex<Vec<(String, NavigateOptions)>>,
    elements: Mutex<HashMap<String, ElementRef>>,
    contents: Mutex<HashMap<String, String>>,
    content_requests: Mutex<Vec<(String, ContentKind)>>,
    selection: Mutex<Option<String>>,
    records: Mutex<Vec<JsonValue>>,
    confirm_answer: AtomicBool,
    confirm_messages: Mutex<Vec<String>>,
}

impl RecordingDocument {
    pub(crate) fn set_csrf(&self, token: &str) {
        *self.csrf.lock().unwrap() = Some(token.to_string());
    }

    pub(crate) fn add_element(&self, selector: &str, element: ElementRef) {
        self.elements.lock().unwrap().insert(selector.to_string(), element);
    }

    pub(crate) fn set_content(&self, selector: &str, content: &str) {
        self.contents
            .lock()
            .unwrap()
            .insert(selector.to_string(), content.to_string());
    }

    pub(crate) fn set_selection(&self, text: &str) {
        *self.selection.lock().unwrap() = Some(text.to_string());
    }

    pub(crate) fn set_selected_records(&self, records: Vec<JsonValue>) {
        *self.records.lock().unwrap() = records;
    }

    pub(crate) fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    pub(crate) fn confirm_messages(&self) -> Vec<String> {
        self.confirm_messages.lock().unwrap().clone()
    }

    pub(crate) fn events(&self, element: &str) -> Vec<ClientEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == element)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub(crate) fn event_names(&self, element: &str) -> Vec<&'static str> {
        self.events(element).into_iter().map(|e| e.name).collect()
    }

    pub(crate) fn navigations(&self) -> Vec<(String, NavigateOptions)> {
        self.navigations.lock().unwrap().clone()
    }

    pub(crate) fn content_requests(&self) -> Vec<(String, ContentKind)> {
        self.content_requests.lock().unwrap().clone()
    }

    pub(crate) fn is_loading_now(&self, element: &str) -> bool {
        self.loading.lock().unwrap().contains(element)
    }

    pub(crate) fn loading_history(&self, element: &str) -> Vec<bool> {
        self.loading_history
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == element)
            .map(|(_, loading)| *loading)
            .collect()
    }
}

impl Document for RecordingDocument {
    fn csrf_token(&self) -> Option<String> {
        self.csrf.lock().unwrap().clone()
    }

    fn is_loading(&self, element: &str) -> bool {
        self.loading.lock().unwrap().contains(element)
    }

    fn set_loading(&self, element: &str, loading: bool) {
        if loading {
            self.loading.lock().unwrap().insert(element.to_string());
        } else {
            self.loading.lock().unwrap().remove(element);
        }
        self.loading_history
            .lock()
            .unwrap()
            .push((element.to_string(), loading));
    }

    fn dispatch(&self, element: &str, event: ClientEvent) {
        self.events.lock().unwrap().push((element.to_string(), event));
    }

    fn navigate(&self, url: &str, options: NavigateOptions) {
        self.navigations.lock().unwrap().push((url.to_string(), options));
    }

    fn find(&self, selector: &str) -> Option<ElementRef> {
        self.elements.lock().unwrap().get(selector).cloned()
    }

    fn element_content(&self, selector: &str, kind: ContentKind) -> Option<String> {
        self.content_requests
            .lock()
            .unwrap()
            .push((selector.to_string(), kind));
        self.contents.lock().unwrap().get(selector).cloned()
    }

    fn selected_text(&self) -> Option<String> {
        self.selection.lock().unwrap().clone()
    }

    fn selected_records(&self) -> Vec<JsonValue> {
        self.records.lock().unwrap().clone()
    }

    fn blocking_confirm(&self, message: &str) -> bool {
        self.confirm_messages.lock().unwrap().push(message.to_string());
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    shown: Mutex<Vec<(Notification, Option<Duration>)>>,
}

impl RecordingNotifier {
    pub(crate) fn shown(&self) -> Vec<(Notification, Option<Duration>)> {
        self.shown.lock().unwrap().clone()
    }

    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.shown().into_iter().map(|(n, _)| n).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification, duration: Option<Duration>) {
        self.shown.lock().unwrap().push((notification.clone(), duration));
    }
}

#[derive(Default)]
pub(crate) struct RecordingModals {
    log: Mutex<Vec<String>>,
    markup: Mutex<HashMap<String, String>>,
    busy: Mutex<HashMap<String, bool>>,
}

impl RecordingModals {
    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn markup(&self, id: &str) -> Option<String> {
        self.markup.lock().unwrap().get(id).cloned()
    }

    pub(crate) fn is_busy(&self, id: &str) -> bool {
        self.busy.lock().unwrap().get(id).copied().unwrap_or(false)
    }

    pub(crate) fn was_busy(&self, id: &str) -> bool {
        self.log().contains(&format!("busy:{}:true", id))
    }
}

impl ModalSurface for RecordingModals {
    fn mount(&self, modal_id: &str, html: &str) {
        self.log.lock().unwrap().push(format!("mount:{}", modal_id));
        self.markup
            .lock()
            .unwrap()
            .insert(modal_id.to_string(), html.to_string());
    }

    fn set_visible(&self, modal_id: &str, visible: bool) {
        self.log
            .lock()
            .unwrap()
            .push(format!("visible:{}:{}", modal_id, visible));
    }

    fn set_submit_busy(&self, modal_id: &str, busy: bool) {
        self.log
            .lock()
            .unwrap()
            .push(format!("busy:{}:{}", modal_id, busy));
        self.busy.lock().unwrap().insert(modal_id.to_string(), busy);
    }

    fn remove(&self, modal_id: &str) {
        self.log.lock().unwrap().push(format!("remove:{}", modal_id));
    }
}

#[derive(Default)]
pub(crate) struct RecordingClipboard {
    written: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
}

impl RecordingClipboard {
    pub(crate) fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }

    pub(crate) fn fail_with(&self, error: &str) {
        *self.failure.lock().unwrap() = Some(error.to_string());
    }
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<(), String> {
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.written.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingPrinter {
    log: Mutex<Vec<String>>,
    frames: Mutex<Vec<FrameSource>>,
    styles: AtomicUsize,
    silent: AtomicBool,
}

impl RecordingPrinter {
    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn frames(&self) -> Vec<FrameSource> {
        self.frames.lock().unwrap().clone()
    }

    /// Frames never signal load or "after print".
    pub(crate) fn set_silent(&self, silent: bool) {
        self.silent.store(silent, Ordering::SeqCst);
    }

    fn push(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl PrintHost for RecordingPrinter {
    fn inject_style(&self, css: &str) -> String {
        self.push(format!("inject_style:{}", css));
        format!("style-{}", self.styles.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn remove_style(&self, handle: &str) {
        self.push(format!("remove_style:{}", handle));
    }

    async fn print_page(&self) -> Result<(), String> {
        self.push("print_page".to_string());
        Ok(())
    }

    fn create_frame(&self, source: FrameSource) -> Result<String, String> {
        self.push("create_frame".to_string());
        let mut frames = self.frames.lock().unwrap();
        frames.push(source);
        Ok(format!("frame-{}", frames.len()))
    }

    async fn frame_loaded(&self, frame: &str) {
        if self.silent.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.push(format!("frame_loaded:{}", frame));
    }

    fn print_frame(&self, frame: &str) -> Result<(), String> {
        self.push(format!("print_frame:{}", frame));
        Ok(())
    }

    async fn after_print(&self, frame: &str) {
        if self.silent.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.push(format!("after_print:{}", frame));
    }

    fn remove_frame(&self, frame: &str) {
        self.push(format!("remove_frame:{}", frame));
    }
}

/// Timer that records durations and only yields once.
#[derive(Default)]
pub(crate) struct InstantTimer {
    slept: Mutex<Vec<Duration>>,
}

impl InstantTimer {
    pub(crate) fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait]
impl Timer for InstantTimer {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }

    async fn next_frame(&self) {
        tokio::task::yield_now().await;
    }
}

#[derive(Default)]
pub(crate) struct RecordingConfirm {
    answer: AtomicBool,
    requests: Mutex<Vec<ConfirmRequest>>,
}

impl RecordingConfirm {
    pub(crate) fn requests(&self) -> Vec<ConfirmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfirmService for RecordingConfirm {
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        self.requests.lock().unwrap().push(request.clone());
        self.answer.load(Ordering::SeqCst)
    }
}

/// Transport answering from a queue of scripted responses.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn push_json(&self, status: u16, body: JsonValue) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub(crate) fn push_raw(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub(crate) fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".to_string())))
    }
}

/// A host wired to recording doubles.
pub(crate) struct TestHost {
    pub(crate) host: Host,
    pub(crate) transport: Arc<ScriptedTransport>,
    pub(crate) document: Arc<RecordingDocument>,
    pub(crate) notifier: Arc<RecordingNotifier>,
    pub(crate) modals: Arc<RecordingModals>,
    pub(crate) clipboard: Arc<RecordingClipboard>,
    pub(crate) printer: Arc<RecordingPrinter>,
    pub(crate) timer: Arc<InstantTimer>,
    pub(crate) confirm: Arc<RecordingConfirm>,
}

impl TestHost {
    pub(crate) fn new() -> Self {
        let transport = Arc::new(ScriptedTransport::default());
        Self::build(transport.clone(), transport)
    }

    pub(crate) fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::build(Arc::new(ScriptedTransport::default()), transport)
    }

    fn build(scripted: Arc<ScriptedTransport>, transport: Arc<dyn Transport>) -> Self {
        let document = Arc::new(RecordingDocument::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let modals = Arc::new(RecordingModals::default());
        let clipboard = Arc::new(RecordingClipboard::default());
        let printer = Arc::new(RecordingPrinter::default());
        let timer = Arc::new(InstantTimer::default());
        let confirm = Arc::new(RecordingConfirm::default());

        let host = Host::new(
            transport,
            document.clone(),
            notifier.clone(),
            modals.clone(),
            clipboard.clone(),
            printer.clone(),
        )
        .with_timer(timer.clone());

        Self {
            host,
            transport: scripted,
            document,
            notifier,
            modals,
            clipboard,
            printer,
            timer,
            confirm,
        }
    }

    /// Routes confirmations through the recording confirm service.
    pub(crate) fn use_confirm_service(mut self, answer: bool) -> Self {
        self.confirm.answer.store(answer, Ordering::SeqCst);
        self.host = self.host.with_confirm(self.confirm.clone());
        self
    }
}
