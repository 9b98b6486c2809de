//! Rich text as an ordered list of styled spans.
//!
//! DESIGN
//! ======
//! Note text is stored remotely as a small markup fragment. Editing happens
//! on [`RichText`], a run-length list of [`Span`]s addressed by character
//! offsets, and the fragment is produced by [`RichText::to_markup`]. Styling
//! operations split spans at the range boundaries, update the covered spans,
//! and re-merge neighbours with equal style, so the span list is always
//! minimal: no empty spans, no two adjacent spans with the same style.
//!
//! [`RichText::from_markup`] runs the fragment through the `html5ever`
//! tokenizer, which decodes character references and tolerates broken
//! markup. It understands the tags the editor emits (`b`/`strong`,
//! `i`/`em`, `u`, `font`, `span style`, `br`, `div`/`p`); any other tag is
//! dropped while its text is kept.

#[cfg(test)]
#[path = "richtext_test.rs"]
mod richtext_test;

use std::ops::Range;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts, TokenizerResult,
};

use crate::consts::{FONT_SIZE_FALLBACK, FONT_SIZES};

/// Character-level formatting of a span.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    /// Overrides the note's text color.
    pub color: Option<String>,
    /// Overrides the note's font size, in pixels.
    pub font_size: Option<f64>,
    /// Overrides the note's font family.
    pub font_family: Option<String>,
}

impl SpanStyle {
    fn has_css(&self) -> bool {
        self.color.is_some() || self.font_size.is_some() || self.font_family.is_some()
    }
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

/// A rich text document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RichText {
    spans: Vec<Span>,
}

impl RichText {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An unstyled document holding `text`.
    #[must_use]
    pub fn plain(text: &str) -> Self {
        let mut doc = Self::new();
        doc.push(text, SpanStyle::default());
        doc
    }

    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The text with all formatting removed.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Whether any non-whitespace character is present.
    #[must_use]
    pub fn has_visible_text(&self) -> bool {
        self.spans.iter().any(|s| s.text.chars().any(|c| !c.is_whitespace()))
    }

    // --- Editing ---

    /// Insert `text` at character offset `at`, inheriting the style of the
    /// character before it. Offsets past the end append.
    pub fn insert_text(&mut self, at: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let at = at.min(self.len());
        let style = self.style_before(at);
        let index = self.split_at(at);
        self.spans.insert(index, Span { text: text.to_owned(), style });
        self.normalize();
    }

    /// Remove the characters in `range`. Out-of-range bounds are clamped.
    pub fn delete_range(&mut self, range: Range<usize>) {
        let Some((start, end)) = self.split_range(range) else {
            return;
        };
        self.spans.drain(start..end);
        self.normalize();
    }

    pub fn set_bold(&mut self, range: Range<usize>, on: bool) {
        self.restyle(range, |s| s.bold = on);
    }

    pub fn set_italic(&mut self, range: Range<usize>, on: bool) {
        self.restyle(range, |s| s.italic = on);
    }

    pub fn set_underline(&mut self, range: Range<usize>, on: bool) {
        self.restyle(range, |s| s.underline = on);
    }

    /// Set or clear (`None`) the color override.
    pub fn set_color(&mut self, range: Range<usize>, color: Option<&str>) {
        self.restyle(range, |s| s.color = color.map(str::to_owned));
    }

    pub fn set_font_size(&mut self, range: Range<usize>, size: Option<f64>) {
        self.restyle(range, |s| s.font_size = size);
    }

    pub fn set_font_family(&mut self, range: Range<usize>, family: Option<&str>) {
        self.restyle(range, |s| s.font_family = family.map(str::to_owned));
    }

    /// Apply `edit` to the style of every character in `range`.
    pub fn restyle(&mut self, range: Range<usize>, mut edit: impl FnMut(&mut SpanStyle)) {
        let Some((start, end)) = self.split_range(range) else {
            return;
        };
        for span in &mut self.spans[start..end] {
            edit(&mut span.style);
        }
        self.normalize();
    }

    /// Style of the character at offset `at`, if there is one.
    #[must_use]
    pub fn style_at(&self, at: usize) -> Option<&SpanStyle> {
        let mut offset = 0;
        for span in &self.spans {
            let len = span.text.chars().count();
            if at < offset + len {
                return Some(&span.style);
            }
            offset += len;
        }
        None
    }

    // =============================================================
    // Markup
    // =============================================================

    /// Render the markup fragment stored in a note's `text` field.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            let style = &span.style;
            if style.has_css() {
                out.push_str("<span style=\"");
                out.push_str(&css_declarations(style));
                out.push_str("\">");
            }
            if style.bold {
                out.push_str("<b>");
            }
            if style.italic {
                out.push_str("<i>");
            }
            if style.underline {
                out.push_str("<u>");
            }
            escape_into(&span.text, &mut out);
            if style.underline {
                out.push_str("</u>");
            }
            if style.italic {
                out.push_str("</i>");
            }
            if style.bold {
                out.push_str("</b>");
            }
            if style.has_css() {
                out.push_str("</span>");
            }
        }
        out
    }

    /// Parse a markup fragment.
    #[must_use]
    pub fn from_markup(markup: &str) -> Self {
        let mut input = BufferQueue::default();
        input.push_back(StrTendril::from_slice(markup));
        let mut tokenizer = Tokenizer::new(SpanSink::default(), TokenizerOpts::default());
        match tokenizer.feed(&mut input) {
            TokenizerResult::Done | TokenizerResult::Script(()) => {}
        }
        tokenizer.end();
        tokenizer.sink.doc
    }

    // =============================================================
    // Internals
    // =============================================================

    fn push(&mut self, text: &str, style: SpanStyle) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.spans.push(Span { text: text.to_owned(), style }),
        }
    }

    fn style_before(&self, at: usize) -> SpanStyle {
        let probe = if at == 0 { self.style_at(0) } else { self.style_at(at - 1) };
        probe.cloned().unwrap_or_default()
    }

    /// Split so a span boundary falls at character offset `at`; returns the
    /// index of the first span starting at or after `at`.
    fn split_at(&mut self, at: usize) -> usize {
        let mut offset = 0;
        for index in 0..self.spans.len() {
            if offset == at {
                return index;
            }
            let len = self.spans[index].text.chars().count();
            if at < offset + len {
                let local = at - offset;
                let byte = self.spans[index].text.char_indices().nth(local).map_or(0, |(b, _)| b);
                let tail = self.spans[index].text.split_off(byte);
                let style = self.spans[index].style.clone();
                self.spans.insert(index + 1, Span { text: tail, style });
                return index + 1;
            }
            offset += len;
        }
        self.spans.len()
    }

    fn split_range(&mut self, range: Range<usize>) -> Option<(usize, usize)> {
        let len = self.len();
        let end = range.end.min(len);
        let start = range.start.min(end);
        if start == end {
            return None;
        }
        let first = self.split_at(start);
        let last = self.split_at(end);
        Some((first, last))
    }

    fn normalize(&mut self) {
        let spans = std::mem::take(&mut self.spans);
        for span in spans {
            self.push(&span.text, span.style);
        }
    }
}

// =============================================================
// Markup helpers
// =============================================================

/// Collects tokenizer output into spans, tracking the style of each open tag.
#[derive(Default)]
struct SpanSink {
    doc: RichText,
    stack: Vec<(String, SpanStyle)>,
}

impl SpanSink {
    fn current(&self) -> SpanStyle {
        self.stack.last().map(|(_, s)| s.clone()).unwrap_or_default()
    }

    fn tag(&mut self, tag: &Tag) {
        let name = tag.name.to_string();
        let current = self.current();
        match tag.kind {
            TagKind::EndTag => {
                if let Some(pos) = self.stack.iter().rposition(|(open, _)| *open == name) {
                    self.stack.truncate(pos);
                }
            }
            TagKind::StartTag => {
                if name == "br" {
                    self.doc.push("\n", current);
                } else if name == "div" || name == "p" {
                    let text = self.doc.plain_text();
                    if !text.is_empty() && !text.ends_with('\n') {
                        self.doc.push("\n", current.clone());
                    }
                    if !tag.self_closing {
                        self.stack.push((name, current));
                    }
                } else if !tag.self_closing {
                    let attrs: Vec<(String, String)> =
                        tag.attrs.iter().map(|a| (a.name.local.to_string(), a.value.to_string())).collect();
                    let style = styled_by(&name, &attrs, current);
                    self.stack.push((name, style));
                }
            }
        }
    }
}

impl TokenSink for SpanSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::CharacterTokens(text) => {
                let style = self.current();
                self.doc.push(&text, style);
            }
            Token::TagToken(tag) => self.tag(&tag),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// The style in effect inside an opening tag.
fn styled_by(name: &str, attrs: &[(String, String)], mut style: SpanStyle) -> SpanStyle {
    match name {
        "b" | "strong" => style.bold = true,
        "i" | "em" => style.italic = true,
        "u" => style.underline = true,
        "font" => {
            if let Some(color) = attr(attrs, "color") {
                style.color = Some(color.to_owned());
            }
            if let Some(face) = attr(attrs, "face") {
                style.font_family = Some(unquote(face).to_owned());
            }
            if let Some(size) = attr(attrs, "size") {
                style.font_size = Some(font_step_size(size));
            }
        }
        _ => {}
    }
    if let Some(css) = attr(attrs, "style") {
        apply_css(css, &mut style);
    }
    style
}

/// Pixel size for a 1-based `<font size>` step.
fn font_step_size(raw: &str) -> f64 {
    match raw.trim().parse::<usize>() {
        Ok(step) if step >= 1 => FONT_SIZES.get(step - 1).copied().unwrap_or(FONT_SIZE_FALLBACK),
        _ => FONT_SIZE_FALLBACK,
    }
}

fn apply_css(css: &str, style: &mut SpanStyle) {
    for decl in css.split(';') {
        let Some((prop, value)) = decl.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match prop.trim().to_ascii_lowercase().as_str() {
            "color" => style.color = Some(value.to_owned()),
            "font-size" => {
                if let Ok(px) = value.trim_end_matches("px").trim().parse::<f64>() {
                    style.font_size = Some(px);
                }
            }
            "font-family" => style.font_family = Some(unquote(value).to_owned()),
            "font-weight" => style.bold = value == "bold" || value.parse::<u32>().is_ok_and(|w| w >= 600),
            "font-style" => style.italic = value == "italic",
            "text-decoration" | "text-decoration-line" => style.underline = value.contains("underline"),
            _ => {}
        }
    }
}

fn css_declarations(style: &SpanStyle) -> String {
    let mut decls = Vec::new();
    if let Some(color) = &style.color {
        decls.push(format!("color: {color}"));
    }
    if let Some(size) = style.font_size {
        decls.push(format!("font-size: {size}px"));
    }
    if let Some(family) = &style.font_family {
        decls.push(format!("font-family: {family}"));
    }
    let mut out = decls.join("; ");
    escape_attr(&mut out);
    out
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '"' || c == '\'')
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &mut String) {
    if value.contains('"') {
        *value = value.replace('"', "&quot;");
    }
}
