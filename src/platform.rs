use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{AssistError, AssistResult};

const PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ─── Conversation model ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Participant {
    pub id: String,
    pub purpose: String,
    pub message_id: Option<String>,
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Conversation {
    pub id: String,
    pub participants: Vec<Participant>,
}

impl Conversation {
    pub fn customer(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.purpose == "customer")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailMessage {
    pub id: String,
    pub from: Contact,
    pub to: Vec<Contact>,
    pub subject: String,
    pub text_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBody {
    pub to: Vec<Contact>,
    pub from: Contact,
    pub subject: String,
    pub text_body: String,
    pub history_included: bool,
}

// ─── Response management model ───────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Library {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseText {
    pub content: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseSubstitution {
    pub id: String,
    pub description: Option<String>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    pub id: String,
    pub name: String,
    pub texts: Vec<ResponseText>,
    pub libraries: Vec<Library>,
    pub substitutions: Vec<ResponseSubstitution>,
}

impl Response {
    /// Body of the first text block; canned responses are authored as HTML.
    pub fn content(&self) -> &str {
        self.texts.first().map(|t| t.content.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityListing<T> {
    #[serde(default = "Vec::new")]
    entities: Vec<T>,
    page_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct QueryResults {
    results: EntityListing<Response>,
}

// ─── API seam ────────────────────────────────────────────────────────

#[async_trait]
pub trait PlatformApi: Send + Sync {
    async fn get_conversation(&self, conversation_id: &str) -> AssistResult<Conversation>;

    async fn get_message(&self, conversation_id: &str, message_id: &str)
        -> AssistResult<EmailMessage>;

    async fn post_reply(&self, conversation_id: &str, body: &ReplyBody) -> AssistResult<()>;

    async fn get_libraries(&self) -> AssistResult<Vec<Library>>;

    async fn get_responses(&self, library_id: &str) -> AssistResult<Vec<Response>>;

    async fn get_response(&self, response_id: &str) -> AssistResult<Response>;

    async fn query_responses(&self, query: &str) -> AssistResult<Vec<Response>>;
}

// ─── HTTP client ─────────────────────────────────────────────────────

pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl PlatformClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> AssistResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AssistError::Auth(format!("cannot create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &'static str,
    ) -> AssistResult<T> {
        debug!("GET {}", path);
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AssistError::fetch(what, e.to_string()))?;
        read_json(resp, what).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        what: &'static str,
    ) -> AssistResult<T> {
        debug!("POST {}", path);
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| AssistError::fetch(what, e.to_string()))?;
        read_json(resp, what).await
    }

    /// Walk every page of a listing endpoint.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &'static str,
    ) -> AssistResult<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let mut q = query.to_vec();
            q.push(("pageSize", PAGE_SIZE.to_string()));
            q.push(("pageNumber", page.to_string()));
            let listing: EntityListing<T> = self.get_json(path, &q, what).await?;
            let fetched = listing.entities.len();
            all.extend(listing.entities);
            if fetched == 0 || page >= listing.page_count.unwrap_or(1) {
                return Ok(all);
            }
            page += 1;
        }
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response, what: &'static str) -> AssistResult<T> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    check_status(status, &body, what)?;
    serde_json::from_str(&body)
        .map_err(|e| AssistError::fetch(what, format!("unexpected response body: {}", e)))
}

fn check_status(status: StatusCode, body: &str, what: &'static str) -> AssistResult<()> {
    if status == StatusCode::UNAUTHORIZED {
        warn!("Platform rejected the access token while fetching {}", what);
        return Err(AssistError::Auth("session expired, sign in again".into()));
    }
    if !status.is_success() {
        let detail: String = body.chars().take(200).collect();
        return Err(AssistError::fetch(what, format!("{} {}", status, detail)));
    }
    Ok(())
}

#[async_trait]
impl PlatformApi for PlatformClient {
    async fn get_conversation(&self, conversation_id: &str) -> AssistResult<Conversation> {
        self.get_json(
            &format!("/api/v2/conversations/emails/{}", conversation_id),
            &[],
            "conversation",
        )
        .await
    }

    async fn get_message(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> AssistResult<EmailMessage> {
        self.get_json(
            &format!(
                "/api/v2/conversations/emails/{}/messages/{}",
                conversation_id, message_id
            ),
            &[],
            "email message",
        )
        .await
    }

    async fn post_reply(&self, conversation_id: &str, body: &ReplyBody) -> AssistResult<()> {
        let path = format!("/api/v2/conversations/emails/{}/messages", conversation_id);
        self.post_json::<_, serde_json::Value>(&path, body, "reply")
            .await
            .map(|_| ())
            .map_err(|e| match e {
                AssistError::Fetch { message, .. } => AssistError::Send(message),
                other => other,
            })
    }

    async fn get_libraries(&self) -> AssistResult<Vec<Library>> {
        self.get_all("/api/v2/responsemanagement/libraries", &[], "libraries")
            .await
    }

    async fn get_responses(&self, library_id: &str) -> AssistResult<Vec<Response>> {
        self.get_all(
            "/api/v2/responsemanagement/responses",
            &[("libraryId", library_id.to_string())],
            "responses",
        )
        .await
    }

    async fn get_response(&self, response_id: &str) -> AssistResult<Response> {
        self.get_json(
            &format!("/api/v2/responsemanagement/responses/{}", response_id),
            &[],
            "response",
        )
        .await
    }

    async fn query_responses(&self, query: &str) -> AssistResult<Vec<Response>> {
        let body = serde_json::json!({ "queryPhrase": query });
        let results: QueryResults = self
            .post_json("/api/v2/responsemanagement/responses/query", &body, "search results")
            .await?;
        Ok(results.results.entities)
    }
}
