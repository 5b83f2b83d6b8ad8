use std::collections::HashMap;

use crate::launch::{LaunchParams, DEFAULT_LANGUAGE};
use crate::platform::{Contact, ReplyBody};
use crate::substitution::SubstitutionContext;
use crate::translation::{TranslationResult, FALLBACK_SOURCE_LANGUAGE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    SessionLoaded,
    Ready,
    Errored(String),
}

/// Everything read off the conversation when the session loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailDetails {
    pub message_id: String,
    pub customer: Contact,
    pub agent: Contact,
    pub subject: String,
    pub text_body: String,
    pub customer_attributes: HashMap<String, String>,
}

/// Conversation snapshot sent along with a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    pub conversation_id: String,
    pub target_language: String,
    pub customer: Contact,
    pub agent: Contact,
    pub subject: String,
}

impl ReplyContext {
    pub fn body(&self, translated_text: String) -> ReplyBody {
        ReplyBody {
            to: vec![self.customer.clone()],
            from: self.agent.clone(),
            subject: self.subject.clone(),
            text_body: translated_text,
            history_included: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub conversation_id: String,
    /// Language customer messages are translated into.
    pub language: String,
    pub message_id: String,
    pub customer: Contact,
    pub agent: Contact,
    pub agent_alias: Option<String>,
    pub subject: String,
    pub customer_attributes: HashMap<String, String>,
    pub inbound_text: String,
    pub last_translation: Option<TranslationResult>,
}

impl SessionState {
    pub fn new(agent_alias: Option<String>) -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            conversation_id: String::new(),
            language: DEFAULT_LANGUAGE.into(),
            message_id: String::new(),
            customer: Contact::default(),
            agent: Contact::default(),
            agent_alias,
            subject: String::new(),
            customer_attributes: HashMap::new(),
            inbound_text: String::new(),
            last_translation: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase == SessionPhase::Ready
    }

    pub fn apply_launch(&mut self, params: &LaunchParams) {
        self.conversation_id = params.conversation_id.clone();
        self.language = params.language.clone();
    }

    pub fn apply_email(&mut self, details: EmailDetails) {
        self.message_id = details.message_id;
        self.customer = details.customer;
        self.agent = details.agent;
        self.subject = details.subject;
        self.inbound_text = details.text_body;
        self.customer_attributes = details.customer_attributes;
        self.phase = SessionPhase::SessionLoaded;
    }

    /// Language replies are translated into: whatever the customer wrote in.
    pub fn source_language(&self) -> &str {
        self.last_translation
            .as_ref()
            .map(|t| t.source_language.as_str())
            .filter(|lang| !lang.is_empty())
            .unwrap_or(FALLBACK_SOURCE_LANGUAGE)
    }

    pub fn reply_context(&self) -> ReplyContext {
        ReplyContext {
            conversation_id: self.conversation_id.clone(),
            target_language: self.source_language().to_string(),
            customer: self.customer.clone(),
            agent: self.agent.clone(),
            subject: self.subject.clone(),
        }
    }

    pub fn substitution_context(&self) -> SubstitutionContext {
        SubstitutionContext {
            agent_name: self.agent.name.clone(),
            customer_name: self.customer.name.clone(),
            agent_alias: self.agent_alias.clone(),
            customer_attributes: self.customer_attributes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(email: &str, name: &str) -> Contact {
        Contact {
            email: email.into(),
            name: name.into(),
        }
    }

    #[test]
    fn source_language_defaults_to_english() {
        let mut s = SessionState::new(None);
        assert_eq!(s.source_language(), "en");

        s.last_translation = Some(TranslationResult {
            translated_text: "Hello".into(),
            source_language: "es".into(),
            target_language: "en-us".into(),
        });
        assert_eq!(s.source_language(), "es");
        assert_eq!(s.reply_context().target_language, "es");
    }

    #[test]
    fn loading_email_moves_to_session_loaded() {
        let mut s = SessionState::new(Some("A.".into()));
        s.apply_launch(&LaunchParams {
            conversation_id: "c1".into(),
            language: "fr".into(),
        });
        s.apply_email(EmailDetails {
            message_id: "m1".into(),
            customer: contact("c@example.com", "Cat"),
            agent: contact("a@example.com", "Ann"),
            subject: "Order".into(),
            text_body: "Bonjour".into(),
            customer_attributes: HashMap::new(),
        });
        assert_eq!(s.phase, SessionPhase::SessionLoaded);
        assert_eq!(s.language, "fr");

        let ctx = s.substitution_context();
        assert_eq!(ctx.agent_name, "Ann");
        assert_eq!(ctx.customer_name, "Cat");
        assert_eq!(ctx.agent_alias.as_deref(), Some("A."));
    }

    #[test]
    fn reply_goes_from_agent_to_customer() {
        let mut s = SessionState::new(None);
        s.customer = contact("c@example.com", "Cat");
        s.agent = contact("a@example.com", "Ann");
        s.subject = "Order".into();
        let body = s.reply_context().body("Translated".into());
        assert_eq!(body.to, vec![contact("c@example.com", "Cat")]);
        assert_eq!(body.from, contact("a@example.com", "Ann"));
        assert_eq!(body.text_body, "Translated");
        assert!(body.history_included);
    }
}
