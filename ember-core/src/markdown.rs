use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};
use serde::Deserialize;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightOptions;

// Initialize syntax highlighting resources once
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

#[derive(Debug)]
pub enum MarkdownError {
    Io(PathBuf, std::io::Error),
    FrontMatter(PathBuf, serde_yaml::Error),
    MissingFrontMatter(PathBuf),
}

impl std::fmt::Display for MarkdownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkdownError::Io(p, e) => write!(f, "Failed to read {}: {}", p.display(), e),
            MarkdownError::FrontMatter(p, e) => {
                write!(f, "Invalid front matter in {}: {}", p.display(), e)
            }
            MarkdownError::MissingFrontMatter(p) => {
                write!(f, "Missing front matter in {}", p.display())
            }
        }
    }
}

impl std::error::Error for MarkdownError {}

/// YAML front matter of a post. Keys the CMS writes but the site does not
/// consume are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct FrontMatter {
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub front: FrontMatter,
    pub body_html: String,
    pub excerpt: String,
}

pub fn parse_document(path: &Path, highlight: &HighlightOptions) -> Result<Document, MarkdownError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| MarkdownError::Io(path.to_path_buf(), e))?;

    let (front, body) = split_front_matter(&raw);
    let front = front.ok_or_else(|| MarkdownError::MissingFrontMatter(path.to_path_buf()))?;
    let front: FrontMatter = serde_yaml::from_str(front)
        .map_err(|e| MarkdownError::FrontMatter(path.to_path_buf(), e))?;

    Ok(Document {
        front,
        body_html: render_markdown(body, highlight),
        excerpt: excerpt(body),
    })
}

fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw.strip_prefix("---") else {
        return (None, raw);
    };
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return (None, raw);
    };

    match rest.find("\n---") {
        Some(end) => {
            let front = &rest[..end];
            let body = rest[end + 4..]
                .trim_start_matches('\r')
                .trim_start_matches('\n');
            (Some(front), body)
        }
        None => (None, raw),
    }
}

/// Render a markdown body to HTML. Fenced code blocks go through syntect,
/// headings get a slug id so in-page links work.
pub fn render_markdown(source: &str, highlight: &HighlightOptions) -> String {
    let parser = Parser::new_ext(source, Options::all());
    let events: Vec<Event> = parser.collect();
    let mut processed = Vec::new();
    let mut i = 0;

    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::CodeBlock(kind)) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };

                // Collect all text events until the end of the code block
                let mut code = String::new();
                i += 1;
                while i < events.len() {
                    match &events[i] {
                        Event::End(TagEnd::CodeBlock) => break,
                        Event::Text(text) => code.push_str(text),
                        _ => {}
                    }
                    i += 1;
                }

                processed.push(Event::Html(highlight_block(lang.as_deref(), &code, highlight).into()));
            }
            Event::Start(Tag::Heading { level, .. }) => {
                let level = *level as u32;
                let mut inner = Vec::new();
                i += 1;
                while i < events.len() {
                    match &events[i] {
                        Event::End(TagEnd::Heading(_)) => break,
                        other => inner.push(other.clone()),
                    }
                    i += 1;
                }

                let slug = slugify(&plain_text(&inner));
                let mut inner_html = String::new();
                html::push_html(&mut inner_html, inner.into_iter());
                processed.push(Event::Html(
                    format!("<h{0} id=\"{1}\">{2}</h{0}>\n", level, slug, inner_html.trim_end())
                        .into(),
                ));
            }
            Event::Code(code) if !highlight.no_inline_highlight => {
                processed.push(Event::Html(
                    format!(
                        "<code class=\"{}text\">{}</code>",
                        highlight.class_prefix,
                        html_escape::encode_text(code)
                    )
                    .into(),
                ));
            }
            other => {
                processed.push(other.clone());
            }
        }
        i += 1;
    }

    let mut out = String::new();
    html::push_html(&mut out, processed.into_iter());

    out
}

fn highlight_block(lang: Option<&str>, code: &str, options: &HighlightOptions) -> String {
    let syntax = lang.and_then(|lang| {
        SYNTAX_SET.find_syntax_by_token(lang).or_else(|| {
            // Fallback mappings for grammars syntect doesn't ship
            match lang {
                "toml" => SYNTAX_SET.find_syntax_by_name("YAML"),
                _ => None,
            }
        })
    });

    let html = match syntax {
        Some(syntax) => {
            let theme = THEME_SET
                .themes
                .get(&options.theme)
                .unwrap_or(&THEME_SET.themes["base16-ocean.dark"]);
            highlighted_html_for_string(code, &SYNTAX_SET, syntax, theme)
                .unwrap_or_else(|_| plain_block(lang, code, options))
        }
        None => plain_block(lang, code, options),
    };

    if options.show_line_numbers {
        format!("<div class=\"line-numbers\">{}</div>", html)
    } else {
        html
    }
}

fn plain_block(lang: Option<&str>, code: &str, options: &HighlightOptions) -> String {
    format!(
        "<pre><code class=\"{}{}\">{}</code></pre>\n",
        options.class_prefix,
        lang.unwrap_or("text"),
        html_escape::encode_text(code)
    )
}

fn plain_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) => text.push_str(t),
            Event::Code(c) => text.push_str(c),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }

    text
}

/// Plain text of the first paragraph, used for post listings and meta
/// descriptions when the front matter has none.
pub fn excerpt(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::all());
    let mut in_paragraph = false;
    let mut text = String::new();

    for event in parser {
        match event {
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::End(TagEnd::Paragraph) => {
                if !text.is_empty() {
                    break;
                }
                in_paragraph = false;
            }
            Event::Text(t) if in_paragraph => text.push_str(&t),
            Event::Code(c) if in_paragraph => text.push_str(&c),
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }

    text
}

pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}
