//! The session controller.
//!
//! [`SessionController`] owns the client-side state of one conversation: the
//! current feature and model, the session, and whether a request is in flight.
//! It serializes requests (at most one in flight), reconciles their outcome into
//! the [`HistoryStore`] and drives a [`Renderer`].
//!
//! All operations take `&self`.  State lives behind `Cell`/`RefCell` and no
//! borrow is ever held across an await, so concurrent calls on one thread are
//! well defined: the busy check and the flag set happen before the first
//! suspension point, and a second call made while the first is suspended is
//! rejected with [`Error::Busy`].

use std::cell::{Cell, Ref, RefCell};
use std::time::Instant;

use crate::config::{ControllerConfig, DEFAULT_FEATURE};
use crate::error::{Error, Result};
use crate::history::{HistoryStore, Storage};
use crate::observability::{
    CONTROLLER_FAILURES, CONTROLLER_REJECTED, CONTROLLER_REQUEST_DURATION, CONTROLLER_REQUESTS,
    CONTROLLER_STALE_SETTLES, CONTROLLER_UPLOADS,
};
use crate::registry::Registry;
use crate::render::Renderer;
use crate::transport::{
    CHAT_ENDPOINT, STATUS_ENDPOINT, Transport, UPLOAD_ENDPOINT, conversation_endpoint,
};
use crate::types::{
    Action, ChatReply, ChatRequest, FeatureId, Message, ModelId, MultipartForm,
    RemoteConversation, ServiceStatus, Session, Severity, UploadFile,
};

/////////////////////////////////////////////// Context ////////////////////////////////////////////

#[derive(Debug)]
struct Context {
    session: Session,
    feature: Option<FeatureId>,
    model: ModelId,
    staged_upload: Option<UploadFile>,
}

/// What was current when a request was issued.
#[derive(Debug, Clone)]
struct RequestContext {
    session_id: String,
    feature: FeatureId,
    model: ModelId,
    started: Instant,
}

////////////////////////////////////////////// InFlight ////////////////////////////////////////////

/// Holds the processing flag for the lifetime of one request.
///
/// Dropping it clears the flag, removes the placeholder, re-enables input and
/// discards any staged upload.  This happens on every exit path, including a
/// panic inside the transport or the request future being dropped.
struct InFlight<'a, R: Renderer> {
    processing: &'a Cell<bool>,
    renderer: &'a RefCell<R>,
    context: &'a RefCell<Context>,
}

impl<'a, R: Renderer> InFlight<'a, R> {
    fn begin(
        processing: &'a Cell<bool>,
        renderer: &'a RefCell<R>,
        context: &'a RefCell<Context>,
    ) -> Self {
        processing.set(true);
        Self {
            processing,
            renderer,
            context,
        }
    }
}

impl<R: Renderer> Drop for InFlight<'_, R> {
    fn drop(&mut self) {
        self.processing.set(false);
        if let Ok(mut renderer) = self.renderer.try_borrow_mut() {
            renderer.hide_placeholder();
            renderer.set_input_enabled(true);
        }
        if let Ok(mut context) = self.context.try_borrow_mut() {
            context.staged_upload = None;
        }
    }
}

////////////////////////////////////////// SessionController ///////////////////////////////////////

/// Orchestrates the request lifecycle of one conversation.
pub struct SessionController<T: Transport, S: Storage, R: Renderer> {
    transport: T,
    registry: Registry,
    history: RefCell<HistoryStore<S>>,
    renderer: RefCell<R>,
    context: RefCell<Context>,
    processing: Cell<bool>,
}

impl<T: Transport, S: Storage, R: Renderer> SessionController<T, S, R> {
    /// Start a fresh session and show the welcome view.
    pub fn new(
        config: &ControllerConfig,
        registry: Registry,
        transport: T,
        storage: S,
        renderer: R,
    ) -> Self {
        let session = Session::generate();
        let controller = Self::assemble(config, registry, transport, storage, renderer, session);
        controller.renderer.borrow_mut().reset_view(&controller.registry.featured());
        controller
    }

    /// Reopen a persisted session and replay its history into the renderer.
    ///
    /// A session with no stored history behaves like a fresh one that happens
    /// to carry the given id.
    pub fn resume(
        config: &ControllerConfig,
        registry: Registry,
        transport: T,
        storage: S,
        renderer: R,
        session_id: impl Into<String>,
    ) -> Self {
        let session = Session::with_id(session_id);
        let controller = Self::assemble(config, registry, transport, storage, renderer, session);
        {
            let history = controller.history.borrow();
            let mut renderer = controller.renderer.borrow_mut();
            renderer.reset_view(&controller.registry.featured());
            for message in history.messages() {
                renderer.render_message(message, &controller.registry.meta_for(message));
            }
            tracing::info!(
                session_id = history.session_id(),
                replayed = history.len(),
                "resumed session"
            );
        }
        controller
    }

    fn assemble(
        config: &ControllerConfig,
        registry: Registry,
        transport: T,
        storage: S,
        renderer: R,
        session: Session,
    ) -> Self {
        let history = HistoryStore::new(storage, config.history_capacity, session.id.clone());
        Self {
            transport,
            registry,
            history: RefCell::new(history),
            renderer: RefCell::new(renderer),
            context: RefCell::new(Context {
                session,
                feature: config.default_feature.clone(),
                model: config.default_model.clone(),
                staged_upload: None,
            }),
            processing: Cell::new(false),
        }
    }

    /// Make `feature` current.  Never fails, even while a request is in flight.
    pub fn select_feature(&self, feature: FeatureId) {
        let name = self.registry.feature_name(&feature);
        tracing::debug!(%feature, "feature selected");
        self.context.borrow_mut().feature = Some(feature);
        self.notify(&format!("Feature activated: {name}"), Severity::Success);
    }

    /// Make `model` current.  Never fails, even while a request is in flight.
    pub fn select_model(&self, model: ModelId) {
        let label = self.registry.model_label(&model);
        tracing::debug!(%model, "model selected");
        self.context.borrow_mut().model = model;
        self.notify(&format!("Model changed to: {label}"), Severity::Info);
    }

    /// Send a chat message.
    ///
    /// Fails with [`Error::EmptyInput`] or [`Error::Busy`] without touching any
    /// state.  Once accepted, the user message is rendered and persisted and
    /// exactly one request is issued.  A failed request is reported inline and
    /// through a notice, and its error is returned.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(self.reject(Error::EmptyInput));
        }
        if self.processing.get() {
            return Err(self.reject(Error::Busy));
        }
        let request = self.capture();
        let _in_flight = InFlight::begin(&self.processing, &self.renderer, &self.context);
        CONTROLLER_REQUESTS.click();

        self.record(Message::user(request.feature.clone(), text));
        self.start_waiting(&request);

        let body = ChatRequest::new(
            request.feature.clone(),
            text,
            request.model.clone(),
            request.session_id.clone(),
        );
        tracing::info!(
            session_id = %request.session_id,
            feature = %request.feature,
            model = %request.model,
            "sending message"
        );
        let result = match serde_json::to_value(&body) {
            Ok(payload) => self
                .transport
                .post_json(CHAT_ENDPOINT, payload)
                .await
                .and_then(ChatReply::from_value),
            Err(err) => Err(err.into()),
        };
        CONTROLLER_REQUEST_DURATION.add(request.started.elapsed().as_secs_f64());

        match result {
            Ok(reply) => {
                let reply = self.reply_message(&request, reply);
                self.settle(&request, vec![reply]);
                Ok(())
            }
            Err(err) => {
                self.fail(
                    &request,
                    format!("❌ Error: {err}"),
                    format!("Error: {err}"),
                    &err,
                );
                Err(err)
            }
        }
    }

    /// Upload a file under the current feature.
    ///
    /// Fails with [`Error::NoFeatureSelected`], [`Error::UnsupportedFileType`]
    /// or [`Error::Busy`] without touching any state.  On success the upload
    /// notice and the assistant reply are both rendered and persisted.
    pub async fn upload_file(&self, file: UploadFile) -> Result<()> {
        let feature = self.context.borrow().feature.clone();
        if feature.is_none() {
            return Err(self.reject(Error::NoFeatureSelected));
        }
        if let Err(err) = file.check_allowed() {
            return Err(self.reject(err));
        }
        if self.processing.get() {
            return Err(self.reject(Error::Busy));
        }
        let request = self.capture();
        self.context.borrow_mut().staged_upload = Some(file.clone());
        let _in_flight = InFlight::begin(&self.processing, &self.renderer, &self.context);
        CONTROLLER_UPLOADS.click();
        self.start_waiting(&request);

        let name = file.name.clone();
        tracing::info!(
            session_id = %request.session_id,
            feature = %request.feature,
            file = %name,
            size = file.bytes.len(),
            "uploading file"
        );
        let form = MultipartForm::upload(file, &request.feature, &request.session_id);
        let result = self
            .transport
            .post_multipart(UPLOAD_ENDPOINT, form)
            .await
            .and_then(ChatReply::from_value);
        CONTROLLER_REQUEST_DURATION.add(request.started.elapsed().as_secs_f64());

        match result {
            Ok(reply) => {
                let notice =
                    Message::user(request.feature.clone(), format!("📁 Uploaded file: {name}"));
                let reply = self.reply_message(&request, reply);
                self.settle(&request, vec![notice, reply]);
                Ok(())
            }
            Err(err) => {
                self.fail(
                    &request,
                    format!("❌ Upload error: {err}"),
                    format!("Upload error: {err}"),
                    &err,
                );
                Err(err)
            }
        }
    }

    /// Discard the conversation and start a new session.
    ///
    /// Allowed while a request is in flight; that request's reply is dropped
    /// when it settles.
    pub fn clear_conversation(&self) {
        let session = Session::generate();
        let new_id = session.id.clone();
        let old = std::mem::replace(&mut self.context.borrow_mut().session, session);
        if let Err(err) = self.history.borrow_mut().reset(new_id.clone()) {
            tracing::warn!(session_id = %old.id, error = %err, "failed to discard history");
        }
        tracing::info!(old = %old.id, new = %new_id, "conversation cleared");
        self.renderer
            .borrow_mut()
            .reset_view(&self.registry.featured());
        self.notify("Conversation cleared", Severity::Info);
    }

    /// Dispatch a user action.
    pub async fn handle(&self, action: Action) -> Result<()> {
        match action {
            Action::SelectFeature(feature) => {
                self.select_feature(feature);
                Ok(())
            }
            Action::SelectModel(model) => {
                self.select_model(model);
                Ok(())
            }
            Action::Send(text) => self.send_message(&text).await,
            Action::Upload(file) => self.upload_file(file).await,
            Action::Clear => {
                self.clear_conversation();
                Ok(())
            }
        }
    }

    /// Ask the backend for its health report.
    pub async fn service_status(&self) -> Result<ServiceStatus> {
        let value = self.transport.get_json(STATUS_ENDPOINT).await?;
        ServiceStatus::from_value(value)
    }

    /// Fetch the server-side log of the current session.
    pub async fn remote_history(&self) -> Result<RemoteConversation> {
        let session_id = self.session_id();
        let value = self
            .transport
            .get_json(&conversation_endpoint(&session_id))
            .await?;
        RemoteConversation::from_value(value)
    }

    /// True while a request is in flight.
    pub fn processing(&self) -> bool {
        self.processing.get()
    }

    /// The current session.
    pub fn session(&self) -> Session {
        self.context.borrow().session.clone()
    }

    /// Id of the current session.
    pub fn session_id(&self) -> String {
        self.context.borrow().session.id.clone()
    }

    /// The current feature, if one is selected.
    pub fn current_feature(&self) -> Option<FeatureId> {
        self.context.borrow().feature.clone()
    }

    /// The current model.
    pub fn current_model(&self) -> ModelId {
        self.context.borrow().model.clone()
    }

    /// The file being uploaded, while an upload is in flight.
    pub fn staged_upload(&self) -> Option<UploadFile> {
        self.context.borrow().staged_upload.clone()
    }

    /// A snapshot of the current session's history, oldest first.
    pub fn history(&self) -> Vec<Message> {
        self.history.borrow().messages().cloned().collect()
    }

    /// The history store.
    pub fn history_store(&self) -> Ref<'_, HistoryStore<S>> {
        self.history.borrow()
    }

    /// The renderer.
    pub fn renderer(&self) -> Ref<'_, R> {
        self.renderer.borrow()
    }

    /// The feature/model registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn capture(&self) -> RequestContext {
        let context = self.context.borrow();
        let feature = context
            .feature
            .clone()
            .unwrap_or_else(|| FeatureId::from(DEFAULT_FEATURE));
        RequestContext {
            session_id: context.session.id.clone(),
            feature,
            model: context.model.clone(),
            started: Instant::now(),
        }
    }

    fn start_waiting(&self, request: &RequestContext) {
        let meta = self.registry.meta(&request.feature, Some(&request.model));
        let mut renderer = self.renderer.borrow_mut();
        renderer.show_placeholder(&meta);
        renderer.set_input_enabled(false);
    }

    fn reply_message(&self, request: &RequestContext, reply: ChatReply) -> Message {
        let model = reply.model.unwrap_or_else(|| request.model.clone());
        Message::assistant(request.feature.clone(), Some(model), reply.response)
            .with_detection(reply.detected_language, reply.detected_domain)
    }

    /// Persist and render a message in the current session.
    fn record(&self, message: Message) {
        if let Err(err) = self.history.borrow_mut().append(message.clone()) {
            tracing::warn!(error = %err, "failed to persist history");
        }
        let meta = self.registry.meta_for(&message);
        self.renderer.borrow_mut().render_message(&message, &meta);
    }

    fn is_stale(&self, request: &RequestContext) -> bool {
        self.context.borrow().session.id != request.session_id
    }

    fn settle(&self, request: &RequestContext, messages: Vec<Message>) {
        self.renderer.borrow_mut().hide_placeholder();
        if !self.is_stale(request) {
            tracing::info!(session_id = %request.session_id, "request settled");
            for message in messages {
                self.record(message);
            }
            return;
        }
        // The conversation was cleared; its log stays deleted.
        CONTROLLER_STALE_SETTLES.click();
        tracing::info!(
            session_id = %request.session_id,
            dropped = messages.len(),
            "request settled after its conversation was cleared"
        );
    }

    fn fail(&self, request: &RequestContext, inline: String, notice: String, err: &Error) {
        CONTROLLER_FAILURES.click();
        tracing::warn!(session_id = %request.session_id, error = %err, "request failed");
        {
            let mut renderer = self.renderer.borrow_mut();
            renderer.hide_placeholder();
            if !self.is_stale(request) {
                let message = Message::assistant(request.feature.clone(), None, inline);
                renderer.render_message(&message, &self.registry.meta_for(&message));
            }
        }
        self.notify(&notice, err.severity());
    }

    fn reject(&self, err: Error) -> Error {
        CONTROLLER_REJECTED.click();
        tracing::debug!(error = %err, "action rejected");
        self.notify(&err.to_string(), err.severity());
        err
    }

    fn notify(&self, text: &str, severity: Severity) {
        self.renderer.borrow_mut().render_notice(text, severity);
    }
}
