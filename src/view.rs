//! Retained view model for the panel. The frame loop in `main.rs` draws it;
//! nothing in here talks to the network.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::AssistError;
use crate::platform::{Library, Response};

// ─── HTML to plain text ──────────────────────────────────────────────

/// Block-level closers must be rewritten before the generic tag stripper
/// runs, so the order of this table matters.
static HTML_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)</div>", "\n"),
        (r"(?i)</li>", "\n"),
        (r"(?i)<li>", "  *  "),
        (r"(?i)</ul>", "\n"),
        (r"(?i)</p>", "\n"),
        (r"(?i)<br\s*/?>", "\n"),
        (r"<[^>]+>", ""),
        (r"(?i)&nbsp;", " "),
        (r"(?i)&amp;", "&"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("invalid html rule"), replacement))
    .collect()
});

/// Lossy conversion of a canned response body into compose-box text.
pub fn html_to_plain(raw_html: &str) -> String {
    HTML_RULES
        .iter()
        .fold(raw_html.to_string(), |text, (re, replacement)| {
            re.replace_all(&text, *replacement).into_owned()
        })
}

// ─── Model types ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Customer,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBubble {
    pub text: String,
    pub purpose: Purpose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Translator,
    CannedResponses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsPanel {
    Libraries,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEntry {
    pub id: String,
    pub name: String,
    pub html: String,
    /// Display text; imgui cannot render the HTML itself.
    pub preview: String,
    pub expanded: bool,
}

impl ResponseEntry {
    fn from_response(response: &Response) -> Self {
        Self {
            id: response.id.clone(),
            name: response.name.clone(),
            html: response.content().to_string(),
            preview: html_to_plain(response.content()),
            expanded: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub id: String,
    pub name: String,
    pub expanded: bool,
    pub responses: Vec<ResponseEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collapsible {
    Library(String),
    Response(String),
    SearchResult(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub level: BannerLevel,
    pub text: String,
    /// Blocking banners replace the whole panel until the agent retries.
    pub blocking: bool,
}

// ─── View model ──────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ViewModel {
    pub messages: Vec<MessageBubble>,
    pub scroll_to_bottom: bool,
    pub pane: Pane,
    pub results_panel: ResultsPanel,
    pub libraries: Vec<LibraryEntry>,
    pub search_results: Vec<ResponseEntry>,
    pub banner: Option<Banner>,
    pub compose: String,
    pub search_query: String,
    pub busy: Option<String>,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            scroll_to_bottom: false,
            pane: Pane::Translator,
            results_panel: ResultsPanel::Libraries,
            libraries: Vec::new(),
            search_results: Vec::new(),
            banner: None,
            compose: String::new(),
            search_query: String::new(),
            busy: None,
        }
    }
}

impl ViewModel {
    pub fn add_message(&mut self, text: impl Into<String>, purpose: Purpose) {
        self.messages.push(MessageBubble {
            text: text.into(),
            purpose,
        });
        self.scroll_to_bottom = true;
    }

    pub fn toggle_pane(&mut self) -> Pane {
        self.pane = match self.pane {
            Pane::Translator => Pane::CannedResponses,
            Pane::CannedResponses => Pane::Translator,
        };
        self.pane
    }

    /// Label of the button that switches panes: names the hidden pane.
    pub fn toggle_label(&self) -> &'static str {
        match self.pane {
            Pane::Translator => "Open Canned Responses",
            Pane::CannedResponses => "Open Email Translator",
        }
    }

    pub fn toggle_results(&mut self) -> ResultsPanel {
        self.results_panel = match self.results_panel {
            ResultsPanel::Libraries => ResultsPanel::Search,
            ResultsPanel::Search => ResultsPanel::Libraries,
        };
        self.results_panel
    }

    pub fn display_library(&mut self, library: &Library) {
        if self.libraries.iter().any(|l| l.id == library.id) {
            return;
        }
        self.libraries.push(LibraryEntry {
            id: library.id.clone(),
            name: library.name.clone(),
            expanded: false,
            responses: Vec::new(),
        });
    }

    /// Returns false when the library has not been displayed.
    pub fn display_response(&mut self, library_id: &str, response: &Response) -> bool {
        let Some(library) = self.libraries.iter_mut().find(|l| l.id == library_id) else {
            return false;
        };
        library.responses.push(ResponseEntry::from_response(response));
        true
    }

    pub fn display_search_result(&mut self, response: &Response) {
        self.search_results.push(ResponseEntry::from_response(response));
    }

    pub fn clear_search_results(&mut self) {
        self.search_results.clear();
    }

    pub fn toggle_collapsible(&mut self, target: &Collapsible) {
        let flag = match target {
            Collapsible::Library(id) => self
                .libraries
                .iter_mut()
                .find(|l| &l.id == id)
                .map(|l| &mut l.expanded),
            Collapsible::Response(id) => self
                .libraries
                .iter_mut()
                .flat_map(|l| l.responses.iter_mut())
                .find(|r| &r.id == id)
                .map(|r| &mut r.expanded),
            Collapsible::SearchResult(id) => self
                .search_results
                .iter_mut()
                .find(|r| &r.id == id)
                .map(|r| &mut r.expanded),
        };
        if let Some(expanded) = flag {
            *expanded = !*expanded;
        }
    }

    pub fn find_response(&self, response_id: &str) -> Option<&ResponseEntry> {
        self.search_results
            .iter()
            .chain(self.libraries.iter().flat_map(|l| l.responses.iter()))
            .find(|r| r.id == response_id)
    }

    pub fn show_error(&mut self, error: &AssistError) {
        if self.is_blocked() && !error.is_blocking() {
            return;
        }
        self.banner = Some(Banner {
            level: BannerLevel::Error,
            text: error.to_string(),
            blocking: error.is_blocking(),
        });
    }

    /// Error that blocks the panel regardless of its kind.
    pub fn show_fatal(&mut self, error: &AssistError) {
        self.banner = Some(Banner {
            level: BannerLevel::Error,
            text: error.to_string(),
            blocking: true,
        });
    }

    pub fn show_warning(&mut self, text: impl Into<String>) {
        self.show(BannerLevel::Warning, text);
    }

    pub fn show_info(&mut self, text: impl Into<String>) {
        self.show(BannerLevel::Info, text);
    }

    fn show(&mut self, level: BannerLevel, text: impl Into<String>) {
        // Never hide a blocking error behind a lesser message.
        if self.is_blocked() {
            return;
        }
        self.banner = Some(Banner {
            level,
            text: text.into(),
            blocking: false,
        });
    }

    pub fn dismiss_banner(&mut self) {
        if !self.is_blocked() {
            self.banner = None;
        }
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    pub fn is_blocked(&self) -> bool {
        self.banner.as_ref().is_some_and(|b| b.blocking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ResponseText;

    fn response(id: &str, html: &str) -> Response {
        Response {
            id: id.into(),
            name: format!("Response {}", id),
            texts: vec![ResponseText {
                content: html.into(),
                content_type: "text/html".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn every_html_rule_compiles() {
        assert_eq!(HTML_RULES.len(), 9);
        assert_eq!(HTML_RULES[6].0.as_str(), r"<[^>]+>");
    }

    #[test]
    fn html_lists_become_bullets() {
        assert_eq!(
            html_to_plain("<p>Hi</p><ul><li>A</li><li>B</li></ul>"),
            "Hi\n  *  A\n  *  B\n\n"
        );
    }

    #[test]
    fn html_block_boundaries_become_newlines() {
        let out = html_to_plain(
            "<DIV>One</DIV><div><span class=\"x\">Two</span><br>Three<br/>Four<BR /></div>",
        );
        assert_eq!(out, "One\nTwo\nThree\nFour\n\n");
        assert!(!out.contains('<') && !out.contains('>'));
    }

    #[test]
    fn html_entities_decoded_last() {
        assert_eq!(html_to_plain("Tom&nbsp;&AMP;&nbsp;Jerry"), "Tom & Jerry");
        // Decoding happens after stripping, so an escaped tag survives as text.
        assert_eq!(html_to_plain("a &amp;lt;b"), "a &lt;b");
    }

    #[test]
    fn nested_markup_leaves_no_tags() {
        let out = html_to_plain(
            "<div><p>Dear {{CUSTOMER_NAME}},</p><ul><li><b>Step</b> one</li></ul></div>",
        );
        assert_eq!(out, "Dear {{CUSTOMER_NAME}},\n  *  Step one\n\n\n");
    }

    #[test]
    fn toggling_pane_twice_restores_it() {
        let mut view = ViewModel::default();
        assert_eq!(view.toggle_label(), "Open Canned Responses");
        assert_eq!(view.toggle_pane(), Pane::CannedResponses);
        assert_eq!(view.toggle_label(), "Open Email Translator");
        assert_eq!(view.toggle_pane(), Pane::Translator);

        let before = view.results_panel;
        view.toggle_results();
        view.toggle_results();
        assert_eq!(view.results_panel, before);
    }

    #[test]
    fn responses_group_under_their_library() {
        let mut view = ViewModel::default();
        let lib = Library {
            id: "l1".into(),
            name: "General".into(),
        };
        view.display_library(&lib);
        view.display_library(&lib);
        assert_eq!(view.libraries.len(), 1);

        assert!(view.display_response("l1", &response("r1", "<p>Hello</p>")));
        assert!(!view.display_response("missing", &response("r2", "x")));
        assert_eq!(view.libraries[0].responses[0].preview, "Hello\n");
        assert_eq!(view.find_response("r1").unwrap().html, "<p>Hello</p>");
    }

    #[test]
    fn collapsibles_toggle_once_per_click() {
        let mut view = ViewModel::default();
        view.display_library(&Library {
            id: "l1".into(),
            name: "General".into(),
        });
        view.display_response("l1", &response("r1", "x"));
        view.display_search_result(&response("s1", "y"));

        view.toggle_collapsible(&Collapsible::Library("l1".into()));
        view.toggle_collapsible(&Collapsible::Response("r1".into()));
        view.toggle_collapsible(&Collapsible::SearchResult("s1".into()));
        assert!(view.libraries[0].expanded);
        assert!(view.libraries[0].responses[0].expanded);
        assert!(view.search_results[0].expanded);

        view.toggle_collapsible(&Collapsible::Library("l1".into()));
        assert!(!view.libraries[0].expanded);
    }

    #[test]
    fn blocking_error_sticks() {
        let mut view = ViewModel::default();
        view.show_error(&AssistError::Auth("denied".into()));
        view.show_warning("later warning");
        view.dismiss_banner();
        let banner = view.banner.as_ref().unwrap();
        assert!(banner.blocking);
        assert_eq!(banner.text, "Login failed: denied");

        let mut view = ViewModel::default();
        view.show_error(&AssistError::Translation("timeout".into()));
        view.dismiss_banner();
        assert!(view.banner.is_none());
    }

    #[test]
    fn add_message_requests_scroll() {
        let mut view = ViewModel::default();
        view.add_message("Hello", Purpose::Customer);
        assert!(view.scroll_to_bottom);
        assert_eq!(view.messages[0].purpose, Purpose::Customer);
    }
}
