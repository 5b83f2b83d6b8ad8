use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AssistError, AssistResult};

pub const DEFAULT_LANGUAGE: &str = "en-us";

/// Conversation context the panel is opened for. Also serialized as the
/// OAuth `state` so it survives the login redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchParams {
    pub conversation_id: String,
    pub language: String,
}

impl LaunchParams {
    /// Accepts a full page URL (`https://host/email?conversationid=..`) or a
    /// bare query string (`conversationid=..&language=..`).
    pub fn parse(input: &str) -> AssistResult<Self> {
        let input = input.trim();
        let query = match Url::parse(input) {
            Ok(url) => url.query().unwrap_or_default().to_string(),
            Err(_) => input.trim_start_matches('?').to_string(),
        };

        let mut conversation_id = None;
        let mut language = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "conversationid" if !value.is_empty() => conversation_id = Some(value.into_owned()),
                "language" if !value.is_empty() => language = Some(value.into_owned()),
                _ => {}
            }
        }

        let conversation_id = conversation_id
            .ok_or_else(|| AssistError::Launch("missing 'conversationid' parameter".into()))?;

        Ok(Self {
            conversation_id,
            language: language.unwrap_or_else(|| DEFAULT_LANGUAGE.into()),
        })
    }

    pub fn encode_state(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn decode_state(state: &str) -> AssistResult<Self> {
        serde_json::from_str(state)
            .map_err(|e| AssistError::Auth(format!("unreadable login state: {}", e)))
    }
}
