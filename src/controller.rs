//! UI-thread orchestrator. Owns the session and the view model, turns agent
//! actions into work items and applies service events as they arrive.

use log::{debug, error, info, warn};
use std::sync::mpsc;

use crate::clipboard::ClipboardHelper;
use crate::config::AppConfig;
use crate::error::{AssistError, AssistResult};
use crate::launch::LaunchParams;
use crate::service::{
    AssistService, Delivery, Dispatch, Operation, ServiceEvent, SessionId, WorkItem,
};
use crate::session::{SessionPhase, SessionState};
use crate::view::{html_to_plain, Pane, Purpose, ResultsPanel, ViewModel};
use crate::workflow::ReplyMode;

pub const COPIED_NOTICE: &str = "Translated message copied to clipboard!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryLoad {
    Idle,
    Loading,
    Loaded,
}

pub struct Controller {
    pub session: SessionState,
    pub view: ViewModel,
    launch: AssistResult<LaunchParams>,
    /// Bumped on every retry; events tagged with an older id are dropped.
    session_id: SessionId,
    work_tx: mpsc::Sender<Dispatch>,
    events: mpsc::Receiver<Delivery>,
    clipboard: Option<ClipboardHelper>,
    library_load: LibraryLoad,
    search_token: u64,
    _service: Option<AssistService>,
}

impl Controller {
    /// Spawn the assist service and wire a controller to it.
    pub fn start(config: &AppConfig, launch: AssistResult<LaunchParams>) -> Self {
        let (service, events) = AssistService::start(config.clone());
        let mut controller = Self::new(
            config,
            launch,
            service.sender(),
            events,
            ClipboardHelper::new(),
        );
        controller._service = Some(service);
        controller
    }

    pub fn new(
        config: &AppConfig,
        launch: AssistResult<LaunchParams>,
        work_tx: mpsc::Sender<Dispatch>,
        events: mpsc::Receiver<Delivery>,
        clipboard: Option<ClipboardHelper>,
    ) -> Self {
        Self {
            session: SessionState::new(config.agent_alias()),
            view: ViewModel::default(),
            launch,
            session_id: 1,
            work_tx,
            events,
            clipboard,
            library_load: LibraryLoad::Idle,
            search_token: 0,
            _service: None,
        }
    }

    pub fn library_load(&self) -> LibraryLoad {
        self.library_load
    }

    pub fn source_language(&self) -> &str {
        self.session.source_language()
    }

    fn dispatch(&mut self, item: WorkItem) {
        if self.work_tx.send((self.session_id, item)).is_err() {
            error!("Assist service is not running");
            self.fail(AssistError::Service("the background worker has stopped".into()));
        }
    }

    fn fail(&mut self, error: AssistError) {
        self.session.phase = SessionPhase::Errored(error.to_string());
        self.view.busy = None;
        self.view.show_fatal(&error);
    }

    // ─── Session pipeline ────────────────────────────────────────────

    pub fn initialize(&mut self) {
        match self.launch.clone() {
            Err(e) => {
                error!("Cannot start: {}", e);
                self.fail(e);
            }
            Ok(params) => {
                info!(
                    "Starting session for conversation {} ({})",
                    params.conversation_id, params.language
                );
                self.session.apply_launch(&params);
                self.session.phase = SessionPhase::Authenticating;
                self.view.busy = Some("Signing in...".into());
                self.dispatch(WorkItem::Login(params));
            }
        }
    }

    /// Start over after a blocking error.
    pub fn retry(&mut self) {
        if !matches!(self.session.phase, SessionPhase::Errored(_)) {
            return;
        }
        self.session_id += 1;
        self.session = SessionState::new(self.session.agent_alias.clone());
        self.library_load = LibraryLoad::Idle;
        self.view = ViewModel {
            compose: std::mem::take(&mut self.view.compose),
            search_query: std::mem::take(&mut self.view.search_query),
            ..ViewModel::default()
        };
        self.initialize();
    }

    // ─── Agent actions ───────────────────────────────────────────────

    pub fn send_message(&mut self) {
        self.reply(ReplyMode::Send);
    }

    pub fn copy_to_clipboard(&mut self) {
        self.reply(ReplyMode::Copy);
    }

    fn reply(&mut self, mode: ReplyMode) {
        if !self.session.is_ready() {
            self.view.show_warning("The conversation is still loading");
            return;
        }
        if self.view.compose.trim().is_empty() {
            self.view.show_warning("Type a reply first");
            return;
        }
        let ctx = self.session.reply_context();
        debug!("Translating reply into '{}'", ctx.target_language);
        self.view.busy = Some("Translating reply...".into());
        self.dispatch(WorkItem::Reply {
            mode,
            text: self.view.compose.clone(),
            ctx,
        });
    }

    /// Switch between the translator and the canned responses; the library
    /// listing is requested the first time canned responses are shown.
    pub fn toggle_iframe(&mut self) {
        if self.view.toggle_pane() == Pane::CannedResponses && self.library_load == LibraryLoad::Idle
        {
            self.get_libraries();
        }
    }

    pub fn get_libraries(&mut self) {
        self.library_load = LibraryLoad::Loading;
        self.dispatch(WorkItem::LoadLibraries);
    }

    pub fn toggle_search(&mut self) {
        self.view.toggle_results();
    }

    pub fn search_response(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.search_token += 1;
        self.view.busy = Some("Searching...".into());
        self.dispatch(WorkItem::Search {
            token: self.search_token,
            query: query.to_string(),
        });
    }

    /// Put a canned response into the compose box once its placeholders are
    /// resolved.
    pub fn insert_response(&mut self, response_id: &str) {
        let Some(entry) = self.view.find_response(response_id) else {
            warn!("Response {} is not displayed", response_id);
            return;
        };
        let text = html_to_plain(&entry.html);
        self.dispatch(WorkItem::Substitute {
            response_id: response_id.to_string(),
            text,
            ctx: self.session.substitution_context(),
        });
    }

    pub fn dismiss_banner(&mut self) {
        self.view.dismiss_banner();
    }

    // ─── Events ──────────────────────────────────────────────────────

    /// Apply every event the service has produced since the last frame.
    pub fn poll(&mut self) {
        while let Ok((session_id, event)) = self.events.try_recv() {
            if session_id != self.session_id {
                debug!("Dropping event from abandoned session {}", session_id);
                continue;
            }
            self.apply(event);
        }
    }

    fn apply(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::Authenticated(state) => {
                self.session.apply_launch(&state);
                self.view.busy = Some("Loading conversation...".into());
                self.dispatch(WorkItem::LoadSession {
                    conversation_id: state.conversation_id,
                });
            }
            ServiceEvent::SessionLoaded(details) => {
                self.session.apply_email(details);
                if self.session.inbound_text.trim().is_empty() {
                    info!("Customer message has no text body");
                    self.session.phase = SessionPhase::Ready;
                    self.view.busy = None;
                    self.view.show_info("The customer's message has no text to translate");
                    return;
                }
                self.view.busy = Some("Translating message...".into());
                self.dispatch(WorkItem::TranslateInbound {
                    text: self.session.inbound_text.clone(),
                    language: self.session.language.clone(),
                });
            }
            ServiceEvent::InboundTranslated(result) => {
                info!("Customer wrote in '{}'", result.source_language);
                self.view
                    .add_message(result.translated_text.clone(), Purpose::Customer);
                self.session.last_translation = Some(result);
                self.session.phase = SessionPhase::Ready;
                self.view.busy = None;
            }
            ServiceEvent::ReplyTranslated { mode, result } => {
                self.view.busy = None;
                self.view
                    .add_message(result.translated_text.clone(), Purpose::Agent);
                match mode {
                    ReplyMode::Send => {
                        self.view.compose.clear();
                        self.view.show_info("Translated email sent to customer");
                    }
                    ReplyMode::Copy => self.copy_translated(&result.translated_text),
                }
            }
            ServiceEvent::LibraryLoaded { library, responses } => {
                self.view.display_library(&library);
                for response in &responses {
                    self.view.display_response(&library.id, response);
                }
            }
            ServiceEvent::LibrariesLoaded(summary) => {
                self.library_load = LibraryLoad::Loaded;
                if !summary.failed.is_empty() {
                    self.view.show_warning(format!(
                        "Could not load responses for: {}",
                        summary.failed.join(", ")
                    ));
                } else if summary.libraries == 0 {
                    self.view.show_info("No canned response libraries found");
                }
            }
            ServiceEvent::SearchResults { token, results } => {
                if token != self.search_token {
                    debug!("Dropping stale search results (token {})", token);
                    return;
                }
                self.view.busy = None;
                self.view.clear_search_results();
                self.view.results_panel = ResultsPanel::Search;
                for response in &results {
                    self.view.display_search_result(response);
                }
                if results.is_empty() {
                    self.view.show_info("No responses match your search");
                }
            }
            ServiceEvent::Substituted { text, error } => {
                self.view.compose = text;
                if let Some(e) = error {
                    if e.is_blocking() {
                        self.fail(e);
                    } else {
                        self.view
                            .show_warning(format!("{} (custom values not filled in)", e));
                    }
                }
            }
            ServiceEvent::Failed { op, error } => self.apply_failure(op, error),
        }
    }

    fn copy_translated(&mut self, text: &str) {
        let result = match self.clipboard.as_mut() {
            Some(cb) => cb.copy(text),
            None => Err(AssistError::Clipboard("clipboard unavailable".into())),
        };
        match result {
            Ok(()) => self.view.compose = COPIED_NOTICE.into(),
            Err(e) => self.view.show_error(&e),
        }
    }

    fn apply_failure(&mut self, op: Operation, error: AssistError) {
        if error.is_blocking() {
            self.library_load = LibraryLoad::Idle;
            self.fail(error);
            return;
        }
        match op {
            Operation::Login | Operation::LoadSession => self.fail(error),
            Operation::InboundTranslation => {
                self.view
                    .add_message(self.session.inbound_text.clone(), Purpose::Customer);
                self.session.phase = SessionPhase::Ready;
                self.view.busy = None;
                self.view
                    .show_warning(format!("{} (showing the original message)", error));
            }
            Operation::Reply(_) => {
                self.view.busy = None;
                self.view.show_error(&error);
            }
            Operation::Libraries => {
                self.library_load = LibraryLoad::Idle;
                self.view.show_error(&error);
            }
            Operation::Search(token) => {
                if token == self.search_token {
                    self.view.busy = None;
                    self.view.show_error(&error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Contact, Library, Response};
    use crate::session::EmailDetails;
    use crate::translation::TranslationResult;
    use crate::view::BannerLevel;
    use crate::workflow::LibraryTreeSummary;
    use std::collections::HashMap;

    struct Harness {
        ctl: Controller,
        work_rx: mpsc::Receiver<Dispatch>,
        event_tx: mpsc::Sender<Delivery>,
    }

    impl Harness {
        fn new(launch: AssistResult<LaunchParams>) -> Self {
            let (work_tx, work_rx) = mpsc::channel();
            let (event_tx, events) = mpsc::channel();
            let ctl = Controller::new(&AppConfig::default(), launch, work_tx, events, None);
            Self {
                ctl,
                work_rx,
                event_tx,
            }
        }

        fn launched() -> Self {
            Self::new(Ok(LaunchParams {
                conversation_id: "c1".into(),
                language: "en-us".into(),
            }))
        }

        fn emit(&mut self, event: ServiceEvent) {
            let session_id = self.ctl.session_id;
            self.emit_from(session_id, event);
        }

        fn emit_from(&mut self, session_id: SessionId, event: ServiceEvent) {
            self.event_tx.send((session_id, event)).unwrap();
            self.ctl.poll();
        }

        fn sent(&self) -> Vec<WorkItem> {
            self.work_rx.try_iter().map(|(_, item)| item).collect()
        }

        fn inbound_translated() -> ServiceEvent {
            ServiceEvent::InboundTranslated(TranslationResult {
                translated_text: "Hello, my order did not arrive".into(),
                source_language: "es".into(),
                target_language: "en-us".into(),
            })
        }

        /// Drive the harness through login to a ready session.
        fn ready() -> Self {
            let mut h = Self::launched();
            h.ctl.initialize();
            h.emit(ServiceEvent::Authenticated(LaunchParams {
                conversation_id: "c1".into(),
                language: "en-us".into(),
            }));
            h.emit(ServiceEvent::SessionLoaded(details()));
            h.emit(Self::inbound_translated());
            h.sent();
            h
        }
    }

    fn details() -> EmailDetails {
        EmailDetails {
            message_id: "m1".into(),
            customer: Contact {
                email: "cat@example.com".into(),
                name: "Cat".into(),
            },
            agent: Contact {
                email: "support@example.com".into(),
                name: "Ann".into(),
            },
            subject: "Pedido".into(),
            text_body: "Hola, mi pedido no llegó".into(),
            customer_attributes: HashMap::new(),
        }
    }

    fn response(id: &str, html: &str) -> Response {
        Response {
            id: id.into(),
            name: id.to_uppercase(),
            texts: vec![crate::platform::ResponseText {
                content: html.into(),
                content_type: "text/html".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn startup_pipeline_reaches_ready() {
        let mut h = Harness::launched();
        h.ctl.initialize();
        assert_eq!(h.ctl.session.phase, SessionPhase::Authenticating);
        assert!(matches!(&h.sent()[..], [WorkItem::Login(p)] if p.conversation_id == "c1"));

        // The state round-tripped through the provider is authoritative.
        h.emit(ServiceEvent::Authenticated(LaunchParams {
            conversation_id: "c2".into(),
            language: "fr".into(),
        }));
        assert_eq!(
            h.sent(),
            vec![WorkItem::LoadSession {
                conversation_id: "c2".into()
            }]
        );

        h.emit(ServiceEvent::SessionLoaded(details()));
        assert_eq!(h.ctl.session.phase, SessionPhase::SessionLoaded);
        assert_eq!(
            h.sent(),
            vec![WorkItem::TranslateInbound {
                text: "Hola, mi pedido no llegó".into(),
                language: "fr".into(),
            }]
        );

        assert_eq!(h.ctl.source_language(), "en");
        h.emit(ServiceEvent::InboundTranslated(TranslationResult {
            translated_text: "Bonjour".into(),
            source_language: "es".into(),
            target_language: "fr".into(),
        }));
        assert!(h.ctl.session.is_ready());
        assert_eq!(h.ctl.source_language(), "es");
        assert_eq!(h.ctl.view.messages[0].text, "Bonjour");
        assert_eq!(h.ctl.view.messages[0].purpose, Purpose::Customer);
        assert!(h.ctl.view.busy.is_none());
    }

    #[test]
    fn missing_conversation_blocks_without_login() {
        let mut h = Harness::new(LaunchParams::parse("language=es"));
        h.ctl.initialize();
        assert!(matches!(h.ctl.session.phase, SessionPhase::Errored(_)));
        assert!(h.ctl.view.is_blocked());
        assert!(h.sent().is_empty());
    }

    #[test]
    fn login_failure_blocks_until_retry() {
        let mut h = Harness::launched();
        h.ctl.initialize();
        h.sent();
        h.emit(ServiceEvent::Failed {
            op: Operation::Login,
            error: AssistError::Auth("access_denied".into()),
        });
        assert!(matches!(h.ctl.session.phase, SessionPhase::Errored(_)));
        assert!(h.ctl.view.is_blocked());

        h.ctl.retry();
        assert_eq!(h.ctl.session.phase, SessionPhase::Authenticating);
        assert!(!h.ctl.view.is_blocked());
        assert!(matches!(&h.sent()[..], [WorkItem::Login(_)]));
    }

    #[test]
    fn retry_after_expired_session_starts_clean() {
        let mut h = Harness::ready();
        let first = h.ctl.session_id;
        h.ctl.toggle_iframe();
        h.sent();
        h.emit(ServiceEvent::LibraryLoaded {
            library: Library {
                id: "l1".into(),
                name: "General".into(),
            },
            responses: vec![response("r1", "<p>Hi</p>")],
        });
        h.ctl.view.compose = "draft".into();
        h.emit(ServiceEvent::Failed {
            op: Operation::Libraries,
            error: AssistError::Auth("401 session expired".into()),
        });
        assert!(h.ctl.view.is_blocked());

        h.ctl.retry();
        assert!(h.ctl.view.messages.is_empty());
        assert!(h.ctl.view.libraries.is_empty());
        assert_eq!(h.ctl.view.compose, "draft");
        assert!(matches!(&h.sent()[..], [WorkItem::Login(_)]));

        // Late results from the abandoned session are ignored.
        h.emit_from(first, Harness::inbound_translated());
        h.emit_from(
            first,
            ServiceEvent::LibrariesLoaded(LibraryTreeSummary {
                libraries: 1,
                failed: Vec::new(),
            }),
        );
        assert!(h.ctl.view.messages.is_empty());
        assert_eq!(h.ctl.library_load(), LibraryLoad::Idle);

        h.emit(ServiceEvent::Authenticated(LaunchParams {
            conversation_id: "c1".into(),
            language: "en-us".into(),
        }));
        h.emit(ServiceEvent::SessionLoaded(details()));
        h.emit(Harness::inbound_translated());
        assert_eq!(h.ctl.view.messages.len(), 1);
        assert!(h.ctl.session.is_ready());

        h.ctl.toggle_iframe();
        assert!(h.sent().contains(&WorkItem::LoadLibraries));
        h.emit(ServiceEvent::LibraryLoaded {
            library: Library {
                id: "l1".into(),
                name: "General".into(),
            },
            responses: vec![response("r1", "<p>Hi</p>")],
        });
        assert_eq!(h.ctl.view.libraries[0].responses.len(), 1);
    }

    #[test]
    fn stopped_service_blocks_with_its_own_error() {
        let Harness {
            mut ctl, work_rx, ..
        } = Harness::launched();
        drop(work_rx);
        ctl.initialize();
        let banner = ctl.view.banner.as_ref().unwrap();
        assert!(banner.blocking);
        assert!(banner.text.starts_with("Assist service unavailable"));
        assert!(matches!(ctl.session.phase, SessionPhase::Errored(_)));
    }

    #[test]
    fn session_fetch_failure_blocks() {
        let mut h = Harness::launched();
        h.ctl.initialize();
        h.emit(ServiceEvent::Failed {
            op: Operation::LoadSession,
            error: AssistError::fetch("conversation", "404 Not Found"),
        });
        assert!(matches!(h.ctl.session.phase, SessionPhase::Errored(_)));
        assert!(h.ctl.view.is_blocked());
    }

    #[test]
    fn inbound_translation_failure_shows_original() {
        let mut h = Harness::launched();
        h.ctl.initialize();
        h.emit(ServiceEvent::SessionLoaded(details()));
        h.emit(ServiceEvent::Failed {
            op: Operation::InboundTranslation,
            error: AssistError::Translation("timeout".into()),
        });
        assert!(h.ctl.session.is_ready());
        assert_eq!(h.ctl.view.messages[0].text, "Hola, mi pedido no llegó");
        assert_eq!(h.ctl.view.banner.as_ref().unwrap().level, BannerLevel::Warning);
        assert_eq!(h.ctl.source_language(), "en");
    }

    #[test]
    fn reply_requires_ready_session_and_text() {
        let mut h = Harness::launched();
        h.ctl.view.compose = "thanks".into();
        h.ctl.send_message();
        assert!(h.sent().is_empty());

        let mut h = Harness::ready();
        h.ctl.view.compose = "   ".into();
        h.ctl.send_message();
        assert!(h.sent().is_empty());
    }

    #[test]
    fn send_targets_detected_language() {
        let mut h = Harness::ready();
        h.ctl.view.compose = "We are on it".into();
        h.ctl.send_message();
        match &h.sent()[..] {
            [WorkItem::Reply { mode, text, ctx }] => {
                assert_eq!(*mode, ReplyMode::Send);
                assert_eq!(text, "We are on it");
                assert_eq!(ctx.target_language, "es");
                assert_eq!(ctx.conversation_id, "c1");
                assert_eq!(ctx.customer.name, "Cat");
            }
            other => panic!("unexpected work {:?}", other),
        }

        h.emit(ServiceEvent::ReplyTranslated {
            mode: ReplyMode::Send,
            result: TranslationResult {
                translated_text: "Estamos en ello".into(),
                source_language: "en".into(),
                target_language: "es".into(),
            },
        });
        let last = h.ctl.view.messages.last().unwrap();
        assert_eq!(last.text, "Estamos en ello");
        assert_eq!(last.purpose, Purpose::Agent);
        assert!(h.ctl.view.compose.is_empty());
        // Replies never replace the detected customer language.
        assert_eq!(h.ctl.source_language(), "es");
    }

    #[test]
    fn copy_without_clipboard_reports_error() {
        let mut h = Harness::ready();
        h.ctl.view.compose = "thanks".into();
        h.ctl.copy_to_clipboard();
        h.emit(ServiceEvent::ReplyTranslated {
            mode: ReplyMode::Copy,
            result: TranslationResult {
                translated_text: "gracias".into(),
                source_language: "en".into(),
                target_language: "es".into(),
            },
        });
        assert_eq!(h.ctl.view.compose, "thanks");
        let banner = h.ctl.view.banner.as_ref().unwrap();
        assert!(banner.text.starts_with("Clipboard error"));
        assert!(!banner.blocking);
    }

    #[test]
    fn libraries_are_requested_once() {
        let mut h = Harness::ready();
        h.ctl.toggle_iframe();
        assert_eq!(h.ctl.view.pane, Pane::CannedResponses);
        assert_eq!(h.ctl.library_load(), LibraryLoad::Loading);
        h.ctl.toggle_iframe();
        h.ctl.toggle_iframe();
        assert_eq!(h.sent(), vec![WorkItem::LoadLibraries]);

        h.emit(ServiceEvent::LibraryLoaded {
            library: Library {
                id: "l1".into(),
                name: "General".into(),
            },
            responses: vec![response("r1", "<p>Hi</p>")],
        });
        h.emit(ServiceEvent::LibrariesLoaded(LibraryTreeSummary {
            libraries: 1,
            failed: Vec::new(),
        }));
        assert_eq!(h.ctl.library_load(), LibraryLoad::Loaded);
        assert_eq!(h.ctl.view.libraries[0].responses.len(), 1);

        h.ctl.toggle_iframe();
        h.ctl.toggle_iframe();
        assert!(h.sent().is_empty());
    }

    #[test]
    fn failed_library_load_retries_on_next_open() {
        let mut h = Harness::ready();
        h.ctl.toggle_iframe();
        h.emit(ServiceEvent::Failed {
            op: Operation::Libraries,
            error: AssistError::fetch("libraries", "500"),
        });
        assert_eq!(h.ctl.library_load(), LibraryLoad::Idle);
        h.ctl.toggle_iframe();
        h.ctl.toggle_iframe();
        assert_eq!(h.sent(), vec![WorkItem::LoadLibraries, WorkItem::LoadLibraries]);
    }

    #[test]
    fn only_latest_search_is_rendered() {
        let mut h = Harness::ready();
        h.ctl.search_response("refund");
        h.ctl.search_response("  ");
        h.ctl.search_response("greeting");
        let tokens: Vec<u64> = h
            .sent()
            .into_iter()
            .filter_map(|w| match w {
                WorkItem::Search { token, .. } => Some(token),
                _ => None,
            })
            .collect();
        assert_eq!(tokens, vec![1, 2]);

        h.emit(ServiceEvent::SearchResults {
            token: 2,
            results: vec![response("g1", "Hello")],
        });
        h.emit(ServiceEvent::SearchResults {
            token: 1,
            results: vec![response("r1", "Refund"), response("r2", "Refund 2")],
        });
        assert_eq!(h.ctl.view.results_panel, ResultsPanel::Search);
        assert_eq!(h.ctl.view.search_results.len(), 1);
        assert_eq!(h.ctl.view.search_results[0].id, "g1");

        h.emit(ServiceEvent::Failed {
            op: Operation::Search(1),
            error: AssistError::fetch("search results", "500"),
        });
        assert!(h.ctl.view.banner.is_none());
    }

    #[test]
    fn insert_response_substitutes_plain_text() {
        let mut h = Harness::ready();
        h.emit(ServiceEvent::SearchResults {
            token: 0,
            results: vec![response("r1", "<p>Hi {{CUSTOMER_NAME}}</p>")],
        });
        h.ctl.insert_response("r1");
        match &h.sent()[..] {
            [WorkItem::Substitute {
                response_id,
                text,
                ctx,
            }] => {
                assert_eq!(response_id, "r1");
                assert_eq!(text, "Hi {{CUSTOMER_NAME}}\n");
                assert_eq!(ctx.customer_name, "Cat");
            }
            other => panic!("unexpected work {:?}", other),
        }

        h.emit(ServiceEvent::Substituted {
            text: "Hi Cat\n".into(),
            error: None,
        });
        assert_eq!(h.ctl.view.compose, "Hi Cat\n");

        h.ctl.insert_response("unknown");
        assert!(h.sent().is_empty());
    }

    #[test]
    fn expired_token_mid_session_blocks() {
        let mut h = Harness::ready();
        h.ctl.search_response("x");
        h.emit(ServiceEvent::Failed {
            op: Operation::Search(1),
            error: AssistError::Auth("session expired, sign in again".into()),
        });
        assert!(matches!(h.ctl.session.phase, SessionPhase::Errored(_)));
        assert!(h.ctl.view.is_blocked());
    }

    #[test]
    fn toggle_search_flips_panel() {
        let mut h = Harness::ready();
        h.ctl.toggle_search();
        assert_eq!(h.ctl.view.results_panel, ResultsPanel::Search);
        h.ctl.toggle_search();
        assert_eq!(h.ctl.view.results_panel, ResultsPanel::Libraries);
    }
}
