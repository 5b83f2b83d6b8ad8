//! The network-facing steps of the panel, written against the API traits.
//! The service runs these on its runtime; the controller never awaits.

use log::{info, warn};

use crate::error::{AssistError, AssistResult};
use crate::platform::{Library, PlatformApi, Response};
use crate::session::{EmailDetails, ReplyContext};
use crate::translation::{Translate, TranslationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    Send,
    Copy,
}

/// Fetch the conversation, then the customer's message, and pull out the
/// identities a reply needs.
pub async fn load_email_details(
    api: &dyn PlatformApi,
    conversation_id: &str,
) -> AssistResult<EmailDetails> {
    let conversation = api.get_conversation(conversation_id).await?;
    let customer = conversation.customer().ok_or_else(|| {
        AssistError::fetch("conversation", "no customer participant on this conversation")
    })?;
    let message_id = customer
        .message_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AssistError::fetch("conversation", "customer participant has no message"))?;
    let customer_attributes = customer.attributes.clone();

    let message = api.get_message(conversation_id, &message_id).await?;
    let agent = message
        .to
        .first()
        .cloned()
        .ok_or_else(|| AssistError::fetch("email message", "message has no recipient"))?;

    info!(
        "Loaded message {} of conversation {} ({} attributes)",
        message_id,
        conversation_id,
        customer_attributes.len()
    );
    Ok(EmailDetails {
        message_id,
        customer: message.from,
        agent,
        subject: message.subject,
        text_body: message.text_body,
        customer_attributes,
    })
}

/// Translate the agent's text into the customer's language and, for
/// [`ReplyMode::Send`], post the translated text as the reply.
pub async fn translate_reply(
    translator: &dyn Translate,
    api: Option<&dyn PlatformApi>,
    mode: ReplyMode,
    text: &str,
    ctx: &ReplyContext,
) -> AssistResult<TranslationResult> {
    let result = translator.translate(text, &ctx.target_language).await?;
    if mode == ReplyMode::Send {
        let api = api.ok_or_else(|| AssistError::Auth("not signed in".into()))?;
        api.post_reply(&ctx.conversation_id, &ctx.body(result.translated_text.clone()))
            .await?;
        info!("Translated email sent to customer");
    }
    Ok(result)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryTreeSummary {
    pub libraries: usize,
    /// Names of libraries whose responses could not be fetched.
    pub failed: Vec<String>,
}

/// List every library, then each library's responses, handing each library
/// to `on_library` as soon as its responses arrive.
pub async fn load_library_tree<F>(api: &dyn PlatformApi, mut on_library: F) -> AssistResult<LibraryTreeSummary>
where
    F: FnMut(Library, Vec<Response>) + Send,
{
    let libraries = api.get_libraries().await?;
    let mut summary = LibraryTreeSummary::default();
    for library in libraries {
        match api.get_responses(&library.id).await {
            Ok(responses) => {
                summary.libraries += 1;
                on_library(library, responses);
            }
            Err(e @ AssistError::Auth(_)) => return Err(e),
            Err(e) => {
                warn!("Skipping library '{}': {}", library.name, e);
                summary.failed.push(library.name);
            }
        }
    }
    Ok(summary)
}

pub async fn search_responses(api: &dyn PlatformApi, query: &str) -> AssistResult<Vec<Response>> {
    let results = api.query_responses(query).await?;
    info!("Search '{}' returned {} responses", query, results.len());
    Ok(results)
}
