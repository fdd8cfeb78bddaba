//! Page resolution and descriptor parsing.
//!
//! A page is a folder in the service tree: `<pages root>/<service>/` for the
//! root page, one subfolder per dotted-name segment below that. The folder
//! may hold a TOML descriptor (`<leaf>.toml`) declaring input fields,
//! transition rules and an optional custom handler, and a screen blob
//! (`<leaf>.vdt`, falling back to `<leaf>.vtx`) streamed verbatim when the
//! page renders. Every piece is optional; a bare folder is a valid page.

use std::path::{Path, PathBuf};

use regex::RegexBuilder;
use serde::Deserialize;
use teletel_proto::Color;

/// One transition rule of a form field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransitionRule {
    /// Pattern tried against the start of the submitted text.
    pub value: String,
    /// Dotted name of the destination page.
    pub page: String,
}

impl TransitionRule {
    /// Match the pattern against the start of `text`, case-insensitively.
    ///
    /// A pattern that does not compile never matches; a typo in one
    /// descriptor must not take the session down.
    pub fn matches(&self, text: &str) -> bool {
        match RegexBuilder::new(&format!("^(?:{})", self.value)).case_insensitive(true).build() {
            Ok(pattern) => pattern.is_match(text),
            Err(err) => {
                tracing::warn!(pattern = %self.value, error = %err, "unusable transition pattern");
                false
            }
        }
    }
}

/// Declarative description of one input field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSpec {
    /// One-based `[row, column]` of the field's first cell.
    pub location: [u8; 2],
    /// Maximum text length; zero makes a "press any key" field.
    #[serde(default)]
    pub length: usize,
    /// Videotex colour code, `0..=7`.
    #[serde(default = "default_color")]
    pub color: u8,
    /// Text the field starts with.
    #[serde(default)]
    pub text: String,
    /// Transition rules, tried in order.
    #[serde(default)]
    pub actions: Vec<TransitionRule>,
}

fn default_color() -> u8 {
    Color::White.code()
}

impl FieldSpec {
    /// Field colour, falling back to white when the code is out of range.
    pub fn resolved_color(&self) -> Color {
        Color::from_code(self.color).unwrap_or_else(|| {
            tracing::warn!(code = self.color, "unknown field colour, using white");
            Color::White
        })
    }
}

/// Parsed page descriptor. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageDescriptor {
    /// Registry name of the handler driving this page.
    pub handler: Option<String>,
    /// Input fields in focus order.
    #[serde(default)]
    pub forms: Vec<FieldSpec>,
}

/// A resolved page template.
///
/// Pages are immutable value objects recreated on every resolution; equality
/// is by service and dotted name, never by folder contents.
#[derive(Debug, Clone)]
pub struct Page {
    pages_root: PathBuf,
    service: u16,
    fullname: Option<String>,
    name: String,
    folder: PathBuf,
    descriptor: PageDescriptor,
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.service == other.service && self.fullname == other.fullname
    }
}

impl Eq for Page {}

impl Page {
    /// Resolve `name` inside a service's page tree.
    ///
    /// `None` resolves the service's own root page, whose short name is the
    /// service number. Resolution never fails: a missing or unreadable
    /// descriptor yields a page with no forms and no handler.
    pub async fn resolve(pages_root: &Path, service: u16, name: Option<&str>) -> Self {
        let mut folder = pages_root.join(service.to_string());
        let mut leaf = service.to_string();
        if let Some(dotted) = name {
            for segment in dotted.split('.') {
                folder.push(segment);
                leaf = segment.to_string();
            }
        }
        tracing::debug!(service, name = name.unwrap_or(""), folder = %folder.display(), "resolving page");

        let descriptor_path = folder.join(format!("{leaf}.toml"));
        let descriptor = match tokio::fs::read_to_string(&descriptor_path).await {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(descriptor) => descriptor,
                Err(err) => {
                    tracing::warn!(
                        path = %descriptor_path.display(),
                        error = %err,
                        "unparseable page descriptor, treating page as empty"
                    );
                    PageDescriptor::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => PageDescriptor::default(),
            Err(err) => {
                tracing::warn!(
                    path = %descriptor_path.display(),
                    error = %err,
                    "cannot read page descriptor, treating page as empty"
                );
                PageDescriptor::default()
            }
        };

        Self {
            pages_root: pages_root.to_path_buf(),
            service,
            fullname: name.map(str::to_string),
            name: leaf,
            folder,
            descriptor,
        }
    }

    /// Resolve another page of the same service.
    pub async fn navigate(&self, name: Option<&str>) -> Self {
        Page::resolve(&self.pages_root, self.service, name).await
    }

    /// Service number this page belongs to.
    pub fn service(&self) -> u16 {
        self.service
    }

    /// Short name: the last dotted segment, or the service number for the
    /// root page.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full dotted name, `None` for the root page.
    pub fn fullname(&self) -> Option<&str> {
        self.fullname.as_deref()
    }

    /// Key under which this page's submitted texts are stored in a
    /// navigation context.
    pub fn data_key(&self) -> String {
        self.name.clone()
    }

    /// Registry name of the custom handler, if the descriptor names one.
    pub fn handler_name(&self) -> Option<&str> {
        self.descriptor.handler.as_deref()
    }

    /// The descriptor's input fields.
    pub fn forms(&self) -> &[FieldSpec] {
        &self.descriptor.forms
    }

    /// Raw videotex blob for this page, if one exists.
    ///
    /// `.vdt` wins over `.vtx`; having neither is normal and draws nothing.
    pub async fn screen_data(&self) -> Option<Vec<u8>> {
        for extension in ["vdt", "vtx"] {
            let candidate = self.folder.join(format!("{}.{extension}", self.name));
            match tokio::fs::read(&candidate).await {
                Ok(blob) => return Some(blob),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!(path = %candidate.display(), error = %err, "cannot read screen data");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str) -> TransitionRule {
        TransitionRule { value: pattern.to_string(), page: "target".to_string() }
    }

    #[test]
    fn rule_matching_is_a_case_insensitive_prefix_match() {
        assert!(rule("meteo").matches("METEO"));
        assert!(rule("meteo").matches("meteo paris"));
        assert!(rule("1").matches("123"));
        assert!(!rule("meteo").matches("la meteo"));
        assert!(!rule("2").matches("12"));
    }

    #[test]
    fn rule_patterns_are_regular_expressions() {
        assert!(rule("a+b").matches("aaab"));
        assert!(rule("(oui|non)").matches("NON"));
        assert!(!rule("a+b").matches("b"));
    }

    #[test]
    fn invalid_rule_pattern_never_matches() {
        assert!(!rule("(unclosed").matches("(unclosed"));
    }

    #[test]
    fn out_of_range_colour_falls_back_to_white() {
        let spec = FieldSpec {
            location: [1, 1],
            length: 5,
            color: 42,
            text: String::new(),
            actions: Vec::new(),
        };
        assert_eq!(spec.resolved_color(), Color::White);
    }

    #[tokio::test]
    async fn root_page_is_named_after_the_service() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("3615")).unwrap();

        let page = Page::resolve(dir.path(), 3615, None).await;
        assert_eq!(page.name(), "3615");
        assert_eq!(page.fullname(), None);
        assert_eq!(page.data_key(), "3615");
        assert!(page.forms().is_empty());
        assert!(page.handler_name().is_none());
    }

    #[tokio::test]
    async fn dotted_names_walk_one_folder_per_segment() {
        let dir = tempfile::tempdir().unwrap();
        let chat_dir = dir.path().join("3615/ulla/chat");
        std::fs::create_dir_all(&chat_dir).unwrap();
        std::fs::write(chat_dir.join("chat.toml"), "handler = \"chat\"\n").unwrap();

        let page = Page::resolve(dir.path(), 3615, Some("ulla.chat")).await;
        assert_eq!(page.name(), "chat");
        assert_eq!(page.fullname(), Some("ulla.chat"));
        assert_eq!(page.handler_name(), Some("chat"));
    }

    #[tokio::test]
    async fn descriptor_defaults_fill_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let service_dir = dir.path().join("3615");
        std::fs::create_dir(&service_dir).unwrap();
        std::fs::write(
            service_dir.join("3615.toml"),
            "[[forms]]\nlocation = [10, 2]\n\n[[forms]]\nlocation = [12, 2]\nlength = 8\ncolor = 2\ntext = \"oui\"\n",
        )
        .unwrap();

        let page = Page::resolve(dir.path(), 3615, None).await;
        assert_eq!(page.forms().len(), 2);

        let bare = &page.forms()[0];
        assert_eq!(bare.location, [10, 2]);
        assert_eq!(bare.length, 0);
        assert_eq!(bare.resolved_color(), Color::White);
        assert_eq!(bare.text, "");
        assert!(bare.actions.is_empty());

        let filled = &page.forms()[1];
        assert_eq!(filled.length, 8);
        assert_eq!(filled.resolved_color(), Color::Green);
        assert_eq!(filled.text, "oui");
    }

    #[tokio::test]
    async fn malformed_descriptor_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let service_dir = dir.path().join("3615");
        std::fs::create_dir(&service_dir).unwrap();
        std::fs::write(service_dir.join("3615.toml"), "forms = [not toml\n").unwrap();

        let page = Page::resolve(dir.path(), 3615, None).await;
        assert!(page.forms().is_empty());
        assert!(page.handler_name().is_none());
    }

    #[tokio::test]
    async fn screen_data_prefers_vdt_over_vtx() {
        let dir = tempfile::tempdir().unwrap();
        let service_dir = dir.path().join("3615");
        std::fs::create_dir(&service_dir).unwrap();
        std::fs::write(service_dir.join("3615.vdt"), b"primary").unwrap();
        std::fs::write(service_dir.join("3615.vtx"), b"fallback").unwrap();

        let page = Page::resolve(dir.path(), 3615, None).await;
        assert_eq!(page.screen_data().await.as_deref(), Some(b"primary".as_slice()));
    }

    #[tokio::test]
    async fn screen_data_falls_back_to_vtx() {
        let dir = tempfile::tempdir().unwrap();
        let service_dir = dir.path().join("3615");
        std::fs::create_dir(&service_dir).unwrap();
        std::fs::write(service_dir.join("3615.vtx"), b"fallback").unwrap();

        let page = Page::resolve(dir.path(), 3615, None).await;
        assert_eq!(page.screen_data().await.as_deref(), Some(b"fallback".as_slice()));
    }

    #[tokio::test]
    async fn pages_without_screen_data_draw_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("3615")).unwrap();

        let page = Page::resolve(dir.path(), 3615, None).await;
        assert_eq!(page.screen_data().await, None);
    }

    #[tokio::test]
    async fn pages_compare_by_service_and_dotted_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("3615/clock")).unwrap();

        let root = Page::resolve(dir.path(), 3615, None).await;
        let root_again = Page::resolve(dir.path(), 3615, None).await;
        let clock = Page::resolve(dir.path(), 3615, Some("clock")).await;

        assert_eq!(root, root_again);
        assert_ne!(root, clock);
    }
}
