//! Markdown rendering for entry previews and the read-only viewer.
//!
//! HTML output follows GitHub-flavored markdown. Raw HTML in the source is
//! escaped and links open in a new browsing context. Fenced code blocks in a
//! known language are highlighted into classed `<span>`s while rendering.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::OnceLock;

use pulldown_cmark::{html, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

/// Raw-source length (in characters) above which previews are cut.
pub const PREVIEW_CHAR_LIMIT: usize = 300;
/// Marker appended to a cut preview.
pub const PREVIEW_ELLIPSIS: &str = "...";

const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];
const TERMINAL_THEME: &str = "base16-ocean.dark";
const ANSI_RESET: &str = "\x1b[0m";

fn markdown_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Render markdown to sanitized HTML.
#[must_use]
pub fn render_markdown(source: &str) -> String {
    let mut events = Vec::new();
    let mut code_block: Option<CodeBlock> = None;

    for event in Parser::new_ext(source, markdown_options()) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let block = CodeBlock::new(&kind);
                events.push(Event::Html(code_block_open_tag(&block.language).into()));
                code_block = Some(block);
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = code_block.take() {
                    events.push(Event::Html(block.into_html().into()));
                }
                events.push(Event::End(TagEnd::CodeBlock));
            }
            Event::Text(text) if code_block.is_some() => {
                if let Some(block) = code_block.as_mut() {
                    block.source.push_str(&text);
                }
            }
            Event::Html(raw) | Event::InlineHtml(raw) => events.push(Event::Text(raw)),
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) => events.push(Event::Html(link_open_tag(&dest_url, &title).into())),
            other => events.push(other),
        }
    }

    let mut output = String::new();
    html::push_html(&mut output, events.into_iter());
    output
}

/// Cut the raw source to the preview limit.
///
/// The cut happens before rendering, so a long block element can be split
/// mid-syntax.
#[must_use]
pub fn truncate_preview(source: &str) -> Cow<'_, str> {
    if source.chars().count() <= PREVIEW_CHAR_LIMIT {
        return Cow::Borrowed(source);
    }
    let mut truncated = source
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect::<String>();
    truncated.push_str(PREVIEW_ELLIPSIS);
    Cow::Owned(truncated)
}

/// Truncate, then render. Used by list cards.
#[must_use]
pub fn render_preview(source: &str) -> String {
    render_markdown(&truncate_preview(source))
}

/// Render markdown as plain terminal text.
#[must_use]
pub fn render_terminal(source: &str) -> String {
    render_terminal_with(source, false)
}

/// Like [`render_terminal`], with 24-bit color escapes inside code blocks.
#[must_use]
pub fn render_terminal_highlighted(source: &str) -> String {
    render_terminal_with(source, true)
}

fn render_terminal_with(source: &str, highlight: bool) -> String {
    let mut writer = TerminalWriter {
        highlight,
        ..TerminalWriter::default()
    };
    for event in Parser::new_ext(source, markdown_options()) {
        writer.handle(event);
    }
    writer.finish()
}

struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

fn highlighter() -> &'static Highlighter {
    static HIGHLIGHTER: OnceLock<Highlighter> = OnceLock::new();
    HIGHLIGHTER.get_or_init(|| {
        let mut themes = ThemeSet::load_defaults();
        Highlighter {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme: themes.themes.remove(TERMINAL_THEME).unwrap_or_default(),
        }
    })
}

impl Highlighter {
    fn syntax_for(&self, language: &str) -> Option<&SyntaxReference> {
        if language.is_empty() {
            return None;
        }
        self.syntaxes.find_syntax_by_token(language)
    }

    /// Classed span markup, or `None` for an unknown language.
    fn html(&self, language: &str, code: &str) -> Option<String> {
        let syntax = self.syntax_for(language)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            if let Err(error) = generator.parse_html_for_line_which_includes_newline(line) {
                tracing::warn!("Failed to highlight {} code block: {}", language, error);
                return None;
            }
        }
        Some(generator.finalize())
    }

    fn terminal(&self, language: &str, code: &str) -> Option<String> {
        let syntax = self.syntax_for(language)?;
        let mut lines = HighlightLines::new(syntax, &self.theme);
        let mut output = String::new();
        for line in LinesWithEndings::from(code) {
            let ranges = match lines.highlight_line(line, &self.syntaxes) {
                Ok(ranges) => ranges,
                Err(error) => {
                    tracing::warn!("Failed to highlight {} code block: {}", language, error);
                    return None;
                }
            };
            let escaped = as_24_bit_terminal_escaped(&ranges, false);
            output.push_str(escaped.trim_end_matches('\n'));
            output.push_str(ANSI_RESET);
            if line.ends_with('\n') {
                output.push('\n');
            }
        }
        Some(output)
    }
}

/// A fenced or indented block collected until its end tag.
struct CodeBlock {
    language: String,
    source: String,
}

impl CodeBlock {
    fn new(kind: &CodeBlockKind<'_>) -> Self {
        let language = match kind {
            CodeBlockKind::Fenced(info) => info.split_whitespace().next().unwrap_or(""),
            CodeBlockKind::Indented => "",
        };
        Self {
            language: language.to_string(),
            source: String::new(),
        }
    }

    fn into_html(self) -> String {
        highlighter()
            .html(&self.language, &self.source)
            .unwrap_or_else(|| escape_attribute(&self.source))
    }
}

fn link_open_tag(dest_url: &str, title: &str) -> String {
    let href = if is_blocked_href(dest_url) {
        "#"
    } else {
        dest_url
    };
    let mut tag = format!("<a href=\"{}\"", escape_attribute(href));
    if !title.is_empty() {
        let _ = write!(tag, " title=\"{}\"", escape_attribute(title));
    }
    tag.push_str(" target=\"_blank\" rel=\"noopener noreferrer\">");
    tag
}

fn code_block_open_tag(language: &str) -> String {
    if language.is_empty() {
        "<pre><code class=\"hljs\">".to_string()
    } else {
        format!(
            "<pre><code class=\"hljs language-{}\">",
            escape_attribute(language)
        )
    }
}

fn is_blocked_href(dest_url: &str) -> bool {
    let lowered = dest_url.trim().to_ascii_lowercase();
    BLOCKED_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[derive(Default)]
struct TerminalWriter {
    output: String,
    quote_depth: usize,
    lists: Vec<Option<u64>>,
    links: Vec<String>,
    at_line_start: bool,
    highlight: bool,
    code_block: Option<CodeBlock>,
}

impl TerminalWriter {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.code_block.is_some() => {
                if let Some(block) = self.code_block.as_mut() {
                    block.source.push_str(&text);
                }
            }
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                self.write_text(&text);
            }
            Event::Code(code) => {
                self.write_text("`");
                self.write_text(&code);
                self.write_text("`");
            }
            Event::SoftBreak | Event::HardBreak => self.newline(),
            Event::Rule => {
                self.write_text("---");
                self.block_gap();
            }
            Event::TaskListMarker(checked) => {
                self.write_text(if checked { "[x] " } else { "[ ] " });
            }
            Event::FootnoteReference(label) => {
                self.write_text(&format!("[^{label}]"));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                let marker = "#".repeat(heading_depth(level));
                self.write_text(&format!("{marker} "));
            }
            Tag::BlockQuote(_) => self.quote_depth += 1,
            Tag::CodeBlock(kind) => {
                let block = CodeBlock::new(&kind);
                self.write_text(&format!("```{}", block.language));
                self.newline();
                self.code_block = Some(block);
            }
            Tag::List(start) => self.lists.push(start),
            Tag::Item => {
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let bullet = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let bullet = format!("{number}. ");
                        *number += 1;
                        bullet
                    }
                    _ => "- ".to_string(),
                };
                self.write_text(&format!("{indent}{bullet}"));
            }
            Tag::Strikethrough => self.write_text("~~"),
            Tag::Link { dest_url, .. } => self.links.push(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) | TagEnd::Paragraph => self.block_gap(),
            TagEnd::BlockQuote(_) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.block_gap();
            }
            TagEnd::CodeBlock => {
                if let Some(block) = self.code_block.take() {
                    self.write_code(&block);
                }
                if !self.at_line_start {
                    self.newline();
                }
                self.write_text("```");
                self.block_gap();
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.block_gap();
                }
            }
            TagEnd::Item => {
                if !self.at_line_start {
                    self.newline();
                }
            }
            TagEnd::Strikethrough => self.write_text("~~"),
            TagEnd::Link => {
                if let Some(url) = self.links.pop() {
                    self.write_text(&format!(" ({url})"));
                }
            }
            TagEnd::TableCell => self.write_text(" | "),
            TagEnd::TableHead | TagEnd::TableRow => self.newline(),
            TagEnd::Table => self.block_gap(),
            _ => {}
        }
    }

    fn write_code(&mut self, block: &CodeBlock) {
        let colored = if self.highlight {
            highlighter().terminal(&block.language, &block.source)
        } else {
            None
        };
        self.write_text(colored.as_deref().unwrap_or(&block.source));
    }

    fn write_text(&mut self, text: &str) {
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                self.newline();
            }
            if line.is_empty() {
                continue;
            }
            if self.at_line_start || self.output.is_empty() {
                for _ in 0..self.quote_depth {
                    self.output.push_str("> ");
                }
            }
            self.output.push_str(line);
            self.at_line_start = false;
        }
    }

    fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }

    fn block_gap(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
        if !self.output.ends_with("\n\n") {
            self.newline();
        }
    }

    fn finish(self) -> String {
        self.output.trim_end().to_string()
    }
}

const fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
