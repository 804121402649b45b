//! Hugo front-matter generation and parsing.
//!
//! # Responsibilities
//! - Slugify titles and build `YYYY-MM-DD-<slug>.md` filenames
//! - Render the `---`-fenced front-matter block and wrap article bodies
//! - Parse the simple key/value subset the generator emits (used to pull
//!   `date` out of published files)

use chrono::{FixedOffset, Utc};
use std::collections::BTreeMap;

/// Category applied when the author supplies none.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

const SLUG_MAX_CHARS: usize = 100;

/// Publishing timezone (UTC+8, where the blog is operated).
fn publish_timezone() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).expect("UTC+8 is a valid offset")
}

/// Current timestamp in the publishing timezone, RFC 3339-style.
pub fn now_stamp() -> String {
    Utc::now()
        .with_timezone(&publish_timezone())
        .format("%Y-%m-%dT%H:%M:%S%:z")
        .to_string()
}

/// Today's date in the publishing timezone, `YYYY-MM-DD`.
pub fn today_stamp() -> String {
    Utc::now()
        .with_timezone(&publish_timezone())
        .format("%Y-%m-%d")
        .to_string()
}

/// Turn a title into a URL-friendly slug: lower-cased, alphanumerics
/// kept (Unicode letters included), separator runs collapsed to `-`,
/// capped at 100 characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug.chars().take(SLUG_MAX_CHARS).collect()
}

/// Build the Hugo article filename `YYYY-MM-DD-<slug>.md`. The date part
/// is the first ten characters of the supplied date, today otherwise.
pub fn generate_filename(title: &str, date: Option<&str>) -> String {
    let date_part = match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(date) => date.chars().take(10).collect::<String>(),
        None => today_stamp(),
    };
    let slug = slugify(title);
    let slug = if slug.is_empty() { "post".to_string() } else { slug };
    format!("{date_part}-{slug}.md")
}

/// Front-matter fields for one article.
#[derive(Debug, Clone, Default)]
pub struct FrontMatter {
    pub title: String,
    /// Defaults to now in the publishing timezone when empty.
    pub date: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub draft: bool,
}

impl FrontMatter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Render the `---`-fenced front-matter block.
    pub fn generate(&self) -> String {
        let date = self
            .date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .unwrap_or_else(now_stamp);
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        let mut lines = vec!["---".to_string()];
        lines.push(format!("title: \"{}\"", escape_yaml(&self.title)));
        lines.push(format!("date: \"{date}\""));
        if self.draft {
            lines.push("draft: true".to_string());
        }
        lines.push(format!("categories: [{}]", escape_yaml(category)));
        if !self.tags.is_empty() {
            let tags = self
                .tags
                .iter()
                .map(|tag| escape_yaml(tag))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("tags: [{tags}]"));
        }
        lines.push("---".to_string());
        lines.join("\n")
    }

    /// Full article document: front matter, blank line, body.
    pub fn wrap(&self, content: &str) -> String {
        format!("{}\n\n{}", self.generate(), content)
    }
}

fn escape_yaml(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// Parsed value of one front-matter field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
    Bool(bool),
}

/// A document split into front matter and body.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub fields: BTreeMap<String, FieldValue>,
    pub content: String,
}

impl ParsedDocument {
    /// Scalar field value, if present and scalar.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        match self.fields.get(key) {
            Some(FieldValue::Scalar(value)) => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Split a leading `---` fence off a document and parse the simple
/// key/value subset the generator emits. Documents without a fence come
/// back with empty fields and the full content.
pub fn parse(document: &str) -> ParsedDocument {
    let mut lines = document.lines();
    if lines.next() != Some("---") {
        return ParsedDocument {
            fields: BTreeMap::new(),
            content: document.to_string(),
        };
    }

    let mut fields = BTreeMap::new();
    let mut body = Vec::new();
    let mut in_front_matter = true;
    for line in lines {
        if in_front_matter {
            if line == "---" {
                in_front_matter = false;
                continue;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = trimmed.split_once(':') {
                fields.insert(key.trim().to_string(), parse_value(value.trim()));
            }
        } else {
            body.push(line);
        }
    }

    // An unterminated fence means there was no front matter at all.
    if in_front_matter {
        return ParsedDocument {
            fields: BTreeMap::new(),
            content: document.to_string(),
        };
    }

    ParsedDocument {
        fields,
        content: body.join("\n"),
    }
}

fn parse_value(raw: &str) -> FieldValue {
    if raw.starts_with('[') && raw.ends_with(']') {
        return FieldValue::List(parse_list(&raw[1..raw.len() - 1]));
    }
    match raw {
        "true" => FieldValue::Bool(true),
        "false" => FieldValue::Bool(false),
        _ => FieldValue::Scalar(unquote(raw).to_string()),
    }
}

/// Split a bracketed list on commas, honoring quoted items.
fn parse_list(inner: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in inner.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ',' => {
                if !current.trim().is_empty() {
                    items.push(current.trim().to_string());
                }
                current.clear();
            }
            None => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        items.push(current.trim().to_string());
    }
    items
}

fn unquote(raw: &str) -> &str {
    let raw = raw.trim();
    for q in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(q) && raw.ends_with(q) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Hello,  World_of Rust!"), "hello-world-of-rust");
        assert_eq!(slugify("  --trimmed--  "), "trimmed");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn slugify_keeps_unicode_letters() {
        assert_eq!(slugify("Rust 入门指南"), "rust-入门指南");
    }

    #[test]
    fn filename_uses_date_prefix_and_slug() {
        assert_eq!(
            generate_filename("My First Post", Some("2024-12-25 10:30")),
            "2024-12-25-my-first-post.md"
        );
    }

    #[test]
    fn filename_falls_back_for_empty_slug() {
        let name = generate_filename("!!!", Some("2024-12-25"));
        assert_eq!(name, "2024-12-25-post.md");
    }

    #[test]
    fn generate_includes_required_fields() {
        let fm = FrontMatter {
            title: "A \"quoted\" title".to_string(),
            date: Some("2024-12-25T10:30:00+08:00".to_string()),
            tags: vec!["rust".to_string(), "hugo".to_string()],
            category: Some("Tech".to_string()),
            draft: true,
        };
        let block = fm.generate();
        assert!(block.starts_with("---\n"));
        assert!(block.ends_with("\n---"));
        assert!(block.contains("title: \"A \\\"quoted\\\" title\""));
        assert!(block.contains("date: \"2024-12-25T10:30:00+08:00\""));
        assert!(block.contains("draft: true"));
        assert!(block.contains("categories: [Tech]"));
        assert!(block.contains("tags: [rust, hugo]"));
    }

    #[test]
    fn missing_category_gets_default() {
        let fm = FrontMatter::new("Untitled");
        assert!(fm.generate().contains(&format!("categories: [{DEFAULT_CATEGORY}]")));
    }

    #[test]
    fn wrap_round_trips_through_parse() {
        let fm = FrontMatter {
            title: "Round Trip".to_string(),
            date: Some("2024-12-25T10:30:00+08:00".to_string()),
            tags: vec!["a".to_string(), "b".to_string()],
            category: Some("Tech".to_string()),
            draft: false,
        };
        let document = fm.wrap("body text\n\nmore body");
        let parsed = parse(&document);
        assert_eq!(parsed.scalar("title"), Some("Round Trip"));
        assert_eq!(parsed.scalar("date"), Some("2024-12-25T10:30:00+08:00"));
        assert_eq!(
            parsed.fields.get("tags"),
            Some(&FieldValue::List(vec!["a".to_string(), "b".to_string()]))
        );
        assert_eq!(parsed.content.trim(), "body text\n\nmore body");
    }

    #[test]
    fn parse_without_fence_returns_content_unchanged() {
        let parsed = parse("just a body");
        assert!(parsed.fields.is_empty());
        assert_eq!(parsed.content, "just a body");
    }

    #[test]
    fn parse_handles_quoted_list_items() {
        let parsed = parse("---\ntags: [\"a, b\", 'c']\n---\nbody");
        assert_eq!(
            parsed.fields.get("tags"),
            Some(&FieldValue::List(vec!["a, b".to_string(), "c".to_string()]))
        );
    }

    #[test]
    fn stamps_carry_the_publishing_offset() {
        assert!(now_stamp().ends_with("+08:00"));
        assert_eq!(today_stamp().len(), 10);
    }
}
