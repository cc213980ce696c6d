//! Template loading for viewport fragments.
//!
//! A viewport template is a single root element (its first class names the
//! container, e.g. `instance-viewport`) holding a `.map-container` node the
//! map engine renders into.

use std::cell::RefCell;
use std::collections::HashMap;

use runtime::{Deferred, EventLoop, Promise, deferred};

pub const VIEWPORT_TEMPLATE_URL: &str = "/templates/main/viewport.html";
pub const TOOLBAR_TEMPLATE_URL: &str = "/templates/main/tools/tm-toolbar.html";
pub const MAP_CONTAINER_CLASS: &str = "map-container";

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "link", "meta", "source"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    NotFound(String),
    Http { url: String, status: u16 },
    Network(String),
    Invalid(String),
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::NotFound(url) => write!(f, "template not found: {url}"),
            TemplateError::Http { url, status } => {
                write!(f, "template request {url} failed with status {status}")
            }
            TemplateError::Network(msg) => write!(f, "template request failed: {msg}"),
            TemplateError::Invalid(msg) => write!(f, "invalid template: {msg}"),
        }
    }
}

impl std::error::Error for TemplateError {}

/// Fetches template markup by URL.
pub trait TemplateLoader {
    fn load(&self, url: &str) -> Promise<String, TemplateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportTemplate {
    markup: String,
    root_tag: String,
    root_class: String,
}

impl ViewportTemplate {
    pub fn parse(markup: &str) -> Result<Self, TemplateError> {
        let markup = markup.trim();
        let tags = scan_tags(markup)?;
        let Some(root) = tags.first() else {
            return Err(TemplateError::Invalid("no root element".to_string()));
        };
        if root.closing {
            return Err(TemplateError::Invalid("starts with a closing tag".to_string()));
        }
        if !markup.starts_with('<') {
            return Err(TemplateError::Invalid("text before root element".to_string()));
        }

        let mut depth = 0usize;
        for (i, tag) in tags.iter().enumerate() {
            if tag.closing {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    TemplateError::Invalid(format!("unbalanced </{}>", tag.name))
                })?;
            } else if !tag.self_closing {
                depth += 1;
            }
            if depth == 0 && i + 1 < tags.len() {
                return Err(TemplateError::Invalid("more than one root element".to_string()));
            }
        }
        if depth != 0 {
            return Err(TemplateError::Invalid(format!("unclosed <{}>", root.name)));
        }

        let has_map_container = tags
            .iter()
            .skip(1)
            .any(|t| t.classes.iter().any(|c| c == MAP_CONTAINER_CLASS));
        if !has_map_container {
            return Err(TemplateError::Invalid(format!(
                "missing .{MAP_CONTAINER_CLASS} element"
            )));
        }

        Ok(Self {
            markup: markup.to_string(),
            root_tag: root.name.clone(),
            root_class: root.classes.first().cloned().unwrap_or_default(),
        })
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn root_tag(&self) -> &str {
        &self.root_tag
    }

    pub fn root_class(&self) -> &str {
        &self.root_class
    }
}

#[derive(Debug)]
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    classes: Vec<String>,
}

fn scan_tags(markup: &str) -> Result<Vec<Tag>, TemplateError> {
    let mut tags = Vec::new();
    let mut rest = markup;
    while let Some(start) = rest.find('<') {
        rest = &rest[start..];
        if let Some(after) = rest.strip_prefix("<!--") {
            let end = after
                .find("-->")
                .ok_or_else(|| TemplateError::Invalid("unterminated comment".to_string()))?;
            rest = &after[end + 3..];
            continue;
        }
        let end = tag_end(rest)
            .ok_or_else(|| TemplateError::Invalid("unterminated tag".to_string()))?;
        let inner = &rest[1..end];
        rest = &rest[end + 1..];

        let closing = inner.starts_with('/');
        let body = inner.trim_start_matches('/');
        let name: String = body
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect::<String>()
            .to_ascii_lowercase();
        if name.is_empty() {
            return Err(TemplateError::Invalid(format!("malformed tag <{inner}>")));
        }
        let self_closing =
            !closing && (inner.ends_with('/') || VOID_ELEMENTS.contains(&name.as_str()));
        tags.push(Tag {
            classes: if closing { Vec::new() } else { class_list(body) },
            name,
            closing,
            self_closing,
        });
    }
    Ok(tags)
}

/// Index of the `>` closing the tag that starts at `tag[0]`. A `>` inside a
/// quoted attribute value (`ng-show="n > 0"`) does not end the tag.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in tag.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

fn class_list(tag_body: &str) -> Vec<String> {
    for quote in ['"', '\''] {
        let needle = format!("class={quote}");
        let mut from = 0;
        while let Some(found) = tag_body[from..].find(&needle) {
            let pos = from + found;
            from = pos + needle.len();
            // Skip attributes that merely end in "class", e.g. `ng-class`.
            if !tag_body[..pos].ends_with(char::is_whitespace) {
                continue;
            }
            let value = tag_body[from..].split(quote).next().unwrap_or("");
            return value.split_whitespace().map(str::to_string).collect();
        }
    }
    Vec::new()
}

/// Template loader answering from registered responses.
///
/// Requests stay pending until [`InMemoryTemplates::flush`], which settles
/// them in request order; unknown URLs reject with
/// [`TemplateError::NotFound`].
pub struct InMemoryTemplates {
    event_loop: EventLoop,
    responses: RefCell<HashMap<String, Result<String, TemplateError>>>,
    pending: RefCell<Vec<(String, Deferred<String, TemplateError>)>>,
    requests: RefCell<Vec<String>>,
}

impl InMemoryTemplates {
    pub fn new(event_loop: &EventLoop) -> Self {
        Self {
            event_loop: event_loop.clone(),
            responses: RefCell::new(HashMap::new()),
            pending: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn respond(&self, url: impl Into<String>, markup: impl Into<String>) {
        self.responses
            .borrow_mut()
            .insert(url.into(), Ok(markup.into()));
    }

    pub fn fail(&self, url: impl Into<String>, error: TemplateError) {
        self.responses.borrow_mut().insert(url.into(), Err(error));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Settles every pending request. Returns how many were settled.
    pub fn flush(&self) -> usize {
        let pending: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        let responses = self.responses.borrow();
        for (url, d) in &pending {
            let result = responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(TemplateError::NotFound(url.clone())));
            let _ = d.settle(result);
        }
        pending.len()
    }
}

impl TemplateLoader for InMemoryTemplates {
    fn load(&self, url: &str) -> Promise<String, TemplateError> {
        let (d, p) = deferred(&self.event_loop);
        self.requests.borrow_mut().push(url.to_string());
        self.pending.borrow_mut().push((url.to_string(), d));
        p
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryTemplates, TemplateError, TemplateLoader, ViewportTemplate};
    use runtime::EventLoop;

    const MINIMAL: &str =
        r#"<div class="instance-viewport"><div class="map-container"></div></div>"#;

    #[test]
    fn parses_minimal_viewport_template() {
        let t = ViewportTemplate::parse(MINIMAL).unwrap();
        assert_eq!(t.root_tag(), "div");
        assert_eq!(t.root_class(), "instance-viewport");
    }

    #[test]
    fn accepts_comments_void_elements_and_extra_classes() {
        let markup = r#"
            <!-- viewport -->
            <section class='instance-viewport dark'>
                <img src="logo.png">
                <div class="map-container full"></div>
                <br/>
            </section>"#;
        let t = ViewportTemplate::parse(markup).unwrap();
        assert_eq!(t.root_tag(), "section");
        assert_eq!(t.root_class(), "instance-viewport");

        let guarded = r#"<div class="instance-viewport"><div ng-show="layers.length > 0" ng-class="{'hidden': n < 1}" class="map-container"></div></div>"#;
        let t = ViewportTemplate::parse(guarded).unwrap();
        assert_eq!(t.root_class(), "instance-viewport");
    }

    #[test]
    fn rejects_bad_templates() {
        for bad in [
            "",
            "plain text",
            r#"<div class="instance-viewport"></div>"#,
            r#"<div class="a"><div class="map-container"></div></div><div></div>"#,
            r#"<div class="a"><div class="map-container"></div>"#,
            r#"</div><div class="map-container"></div>"#,
        ] {
            assert!(
                matches!(ViewportTemplate::parse(bad), Err(TemplateError::Invalid(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn in_memory_loader_settles_on_flush() {
        let ev = EventLoop::new();
        let templates = InMemoryTemplates::new(&ev);
        templates.respond("/a.html", "<p></p>");

        let a = templates.load("/a.html");
        let b = templates.load("/missing.html");
        assert!(a.is_pending());
        assert_eq!(templates.pending_count(), 2);

        assert_eq!(templates.flush(), 2);
        assert_eq!(*a.settled().unwrap(), Ok("<p></p>".to_string()));
        assert_eq!(
            *b.settled().unwrap(),
            Err(TemplateError::NotFound("/missing.html".to_string()))
        );
        assert_eq!(templates.requests(), vec!["/a.html", "/missing.html"]);
    }
}
