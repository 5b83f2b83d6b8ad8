use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use crate::auth::{self, TokenCache};
use crate::config::AppConfig;
use crate::error::{AssistError, AssistResult};
use crate::launch::LaunchParams;
use crate::platform::{Library, PlatformApi, PlatformClient, Response};
use crate::session::{EmailDetails, ReplyContext};
use crate::substitution::{self, SubstitutionContext};
use crate::translation::{Translate, TranslationClient, TranslationResult};
use crate::workflow::{self, LibraryTreeSummary, ReplyMode};

// ─── Work items / events ─────────────────────────────────────────────

/// Identifies one sign-in attempt. Work and events carry it so results of a
/// session abandoned by a retry can be told apart from the current one.
pub type SessionId = u64;

pub type Dispatch = (SessionId, WorkItem);
pub type Delivery = (SessionId, ServiceEvent);

#[derive(Debug, Clone, PartialEq)]
pub enum WorkItem {
    Login(LaunchParams),
    LoadSession {
        conversation_id: String,
    },
    TranslateInbound {
        text: String,
        language: String,
    },
    Reply {
        mode: ReplyMode,
        text: String,
        ctx: ReplyContext,
    },
    LoadLibraries,
    Search {
        token: u64,
        query: String,
    },
    Substitute {
        response_id: String,
        text: String,
        ctx: SubstitutionContext,
    },
    Shutdown,
}

/// Which request a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    LoadSession,
    InboundTranslation,
    Reply(ReplyMode),
    Libraries,
    Search(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    Authenticated(LaunchParams),
    SessionLoaded(EmailDetails),
    InboundTranslated(TranslationResult),
    ReplyTranslated {
        mode: ReplyMode,
        result: TranslationResult,
    },
    LibraryLoaded {
        library: Library,
        responses: Vec<Response>,
    },
    LibrariesLoaded(LibraryTreeSummary),
    SearchResults {
        token: u64,
        results: Vec<Response>,
    },
    /// Always carries text to insert; `error` is set when only the built-in
    /// placeholders could be filled.
    Substituted {
        text: String,
        error: Option<AssistError>,
    },
    Failed {
        op: Operation,
        error: AssistError,
    },
}

// ─── Assist service ──────────────────────────────────────────────────

/// Background thread that owns the tokio runtime and the HTTP clients.
/// The UI thread talks to it only through channels.
pub struct AssistService {
    work_tx: mpsc::Sender<Dispatch>,
    _handle: thread::JoinHandle<()>,
}

impl AssistService {
    /// Start the worker thread.
    /// Returns (service, event_receiver).
    pub fn start(config: AppConfig) -> (Self, mpsc::Receiver<Delivery>) {
        let (work_tx, work_rx) = mpsc::channel::<Dispatch>();
        let (event_tx, event_rx) = mpsc::channel::<Delivery>();

        let handle = thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime: {}", e);
                    return;
                }
            };

            let translator: Option<Arc<dyn Translate>> =
                match TranslationClient::new(config.translate_service_uri.clone()) {
                    Ok(client) => Some(Arc::new(client)),
                    Err(e) => {
                        warn!("Translation disabled: {}", e);
                        None
                    }
                };
            let mut platform: Option<Arc<dyn PlatformApi>> = None;
            let token_path = auth::token_path();
            info!("Assist service started (region: {})", config.region);

            rt.block_on(async {
                while let Ok((session, item)) = work_rx.recv() {
                    match item {
                        WorkItem::Shutdown => {
                            info!("Assist service shutting down");
                            break;
                        }
                        // Nothing else is queued before login completes, so
                        // it runs inline and owns `platform`.
                        WorkItem::Login(params) => {
                            let event = match sign_in(&config, &params, &token_path).await {
                                Ok((client, state)) => {
                                    platform = Some(Arc::new(client));
                                    ServiceEvent::Authenticated(state)
                                }
                                Err(error) => {
                                    error!("Login failed: {}", error);
                                    ServiceEvent::Failed {
                                        op: Operation::Login,
                                        error,
                                    }
                                }
                            };
                            let _ = event_tx.send((session, event));
                        }
                        other => {
                            let worker = Worker {
                                session,
                                token_path: token_path.clone(),
                                platform: platform.clone(),
                                translator: translator.clone(),
                                events: event_tx.clone(),
                            };
                            tokio::spawn(worker.run(other));
                        }
                    }
                }
            });

            info!("Assist service thread exiting");
        });

        let service = AssistService {
            work_tx,
            _handle: handle,
        };

        (service, event_rx)
    }

    pub fn sender(&self) -> mpsc::Sender<Dispatch> {
        self.work_tx.clone()
    }
}

impl Drop for AssistService {
    fn drop(&mut self) {
        let _ = self.work_tx.send((0, WorkItem::Shutdown));
    }
}

/// Reuse a persisted token when allowed, otherwise run the implicit grant.
/// Returns the signed-in client and the launch context recovered from the
/// OAuth state.
async fn sign_in(
    config: &AppConfig,
    params: &LaunchParams,
    token_path: &Path,
) -> AssistResult<(PlatformClient, LaunchParams)> {
    if config.persist_token {
        if let Some(cache) = TokenCache::load_from(token_path) {
            info!("Reusing persisted access token");
            let client = PlatformClient::new(config.api_base_url(), cache.access_token)?;
            return Ok((client, params.clone()));
        }
    }

    let grant = auth::run_implicit_grant(config, params).await?;
    let state = LaunchParams::decode_state(&grant.state)?;
    if config.persist_token {
        if let Some(cache) = TokenCache::from_grant(&grant) {
            cache.save_to(token_path);
        }
    }
    info!("Signed in for conversation {}", state.conversation_id);
    let client = PlatformClient::new(config.api_base_url(), grant.access_token)?;
    Ok((client, state))
}

// ─── Per-item execution ──────────────────────────────────────────────

struct Worker {
    session: SessionId,
    token_path: PathBuf,
    platform: Option<Arc<dyn PlatformApi>>,
    translator: Option<Arc<dyn Translate>>,
    events: mpsc::Sender<Delivery>,
}

impl Worker {
    fn platform(&self) -> AssistResult<&dyn PlatformApi> {
        self.platform
            .as_deref()
            .ok_or_else(|| AssistError::Auth("not signed in".into()))
    }

    fn translator(&self) -> AssistResult<&dyn Translate> {
        self.translator
            .as_deref()
            .ok_or_else(|| AssistError::Translation("no translation service configured".into()))
    }

    fn send(&self, event: ServiceEvent) {
        let _ = self.events.send((self.session, event));
    }

    /// A rejected token must not be reused by the next sign-in.
    fn forget_token_on_auth(&self, error: &AssistError) {
        if matches!(error, AssistError::Auth(_)) {
            TokenCache::clear_at(&self.token_path);
        }
    }

    fn fail(&self, op: Operation, error: AssistError) {
        self.forget_token_on_auth(&error);
        error!("{:?} failed: {}", op, error);
        self.send(ServiceEvent::Failed { op, error });
    }

    async fn run(self, item: WorkItem) {
        match item {
            WorkItem::LoadSession { conversation_id } => {
                let result = match self.platform() {
                    Ok(api) => workflow::load_email_details(api, &conversation_id).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(details) => self.send(ServiceEvent::SessionLoaded(details)),
                    Err(e) => self.fail(Operation::LoadSession, e),
                }
            }
            WorkItem::TranslateInbound { text, language } => {
                let result = match self.translator() {
                    Ok(t) => t.translate(&text, &language).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(result) => self.send(ServiceEvent::InboundTranslated(result)),
                    Err(e) => self.fail(Operation::InboundTranslation, e),
                }
            }
            WorkItem::Reply { mode, text, ctx } => {
                let result = match self.translator() {
                    Ok(t) => {
                        workflow::translate_reply(t, self.platform().ok(), mode, &text, &ctx).await
                    }
                    Err(e) => Err(e),
                };
                match result {
                    Ok(result) => self.send(ServiceEvent::ReplyTranslated { mode, result }),
                    Err(e) => self.fail(Operation::Reply(mode), e),
                }
            }
            WorkItem::LoadLibraries => {
                let result = match self.platform() {
                    Ok(api) => {
                        let events = self.events.clone();
                        let session = self.session;
                        workflow::load_library_tree(api, move |library, responses| {
                            let _ = events
                                .send((session, ServiceEvent::LibraryLoaded { library, responses }));
                        })
                        .await
                    }
                    Err(e) => Err(e),
                };
                match result {
                    Ok(summary) => self.send(ServiceEvent::LibrariesLoaded(summary)),
                    Err(e) => self.fail(Operation::Libraries, e),
                }
            }
            WorkItem::Search { token, query } => {
                let result = match self.platform() {
                    Ok(api) => workflow::search_responses(api, &query).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(results) => self.send(ServiceEvent::SearchResults { token, results }),
                    Err(e) => self.fail(Operation::Search(token), e),
                }
            }
            WorkItem::Substitute {
                response_id,
                text,
                ctx,
            } => {
                let result = match self.platform() {
                    Ok(api) => {
                        substitution::do_response_substitution(api, &text, &response_id, &ctx).await
                    }
                    Err(e) => Err(e),
                };
                let event = match result {
                    Ok(text) => ServiceEvent::Substituted { text, error: None },
                    Err(e) => {
                        self.forget_token_on_auth(&e);
                        warn!("Substitution for response {} failed: {}", response_id, e);
                        ServiceEvent::Substituted {
                            text: substitution::apply_builtin(&text, &ctx),
                            error: Some(e),
                        }
                    }
                };
                self.send(event);
            }
            WorkItem::Login(_) | WorkItem::Shutdown => {}
        }
    }
}
