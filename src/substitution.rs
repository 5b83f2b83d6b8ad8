//! Canned-response variable substitution.
//!
//! Phase one fills the built-in placeholders from the session. Phase two
//! fetches the response's declared substitutions and resolves each one from
//! the customer participant's attributes, then the declared default. Anything
//! unresolved stays as a literal `{{id}}`. Every replacement is global.

use log::{debug, error};
use std::collections::HashMap;

use crate::error::{AssistError, AssistResult};
use crate::platform::{PlatformApi, ResponseSubstitution};

pub const AGENT_NAME: &str = "{{AGENT_NAME}}";
pub const CUSTOMER_NAME: &str = "{{CUSTOMER_NAME}}";
pub const AGENT_ALIAS: &str = "{{AGENT_ALIAS}}";

/// Snapshot of the session values substitution reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionContext {
    pub agent_name: String,
    pub customer_name: String,
    pub agent_alias: Option<String>,
    /// Attributes of the customer participant; empty when there is none.
    pub customer_attributes: HashMap<String, String>,
}

pub fn placeholder(id: &str) -> String {
    format!("{{{{{}}}}}", id)
}

pub fn apply_builtin(text: &str, ctx: &SubstitutionContext) -> String {
    let mut out = text
        .replace(AGENT_NAME, &ctx.agent_name)
        .replace(CUSTOMER_NAME, &ctx.customer_name);
    if let Some(alias) = &ctx.agent_alias {
        out = out.replace(AGENT_ALIAS, alias);
    }
    out
}

pub fn apply_declared(
    text: &str,
    substitutions: &[ResponseSubstitution],
    attributes: &HashMap<String, String>,
) -> String {
    let mut out = text.to_string();
    for sub in substitutions {
        if sub.id.is_empty() {
            continue;
        }
        let value = attributes
            .get(&sub.id)
            .filter(|v| !v.is_empty())
            .or(sub.default_value.as_ref().filter(|v| !v.is_empty()));
        match value {
            Some(value) => out = out.replace(&placeholder(&sub.id), value),
            None => debug!("No value for substitution '{}', leaving placeholder", sub.id),
        }
    }
    out
}

/// Resolve all placeholders in `text` for the given response.
///
/// On failure the error carries no text; callers fall back to
/// [`apply_builtin`] alone.
pub async fn do_response_substitution(
    api: &dyn PlatformApi,
    text: &str,
    response_id: &str,
    ctx: &SubstitutionContext,
) -> AssistResult<String> {
    let text = apply_builtin(text, ctx);
    let response = api.get_response(response_id).await.map_err(|e| {
        error!("Substitution lookup for response {} failed: {}", response_id, e);
        match e {
            AssistError::Auth(_) => e,
            other => AssistError::Substitution(other.to_string()),
        }
    })?;
    Ok(apply_declared(
        &text,
        &response.substitutions,
        &ctx.customer_attributes,
    ))
}
