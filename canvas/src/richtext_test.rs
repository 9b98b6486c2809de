#![allow(clippy::float_cmp)]

use super::*;

fn bold() -> SpanStyle {
    SpanStyle { bold: true, ..SpanStyle::default() }
}

fn texts(doc: &RichText) -> Vec<&str> {
    doc.spans().iter().map(|s| s.text.as_str()).collect()
}

// =============================================================
// Editing
// =============================================================

#[test]
fn len_counts_characters_not_bytes() {
    let doc = RichText::plain("héllo ✓");
    assert_eq!(doc.len(), 7);
    assert_eq!(doc.plain_text(), "héllo ✓");
}

#[test]
fn styling_a_range_splits_spans() {
    let mut doc = RichText::plain("hello world");
    doc.set_bold(0..5, true);
    assert_eq!(texts(&doc), vec!["hello", " world"]);
    assert_eq!(doc.to_markup(), "<b>hello</b> world");
}

#[test]
fn unstyling_merges_neighbours_back() {
    let mut doc = RichText::plain("hello world");
    doc.set_bold(0..5, true);
    doc.set_bold(0..5, false);
    assert_eq!(texts(&doc), vec!["hello world"]);
}

#[test]
fn styling_inside_multibyte_text() {
    let mut doc = RichText::plain("añb");
    doc.set_underline(1..2, true);
    assert_eq!(texts(&doc), vec!["a", "ñ", "b"]);
    assert_eq!(doc.style_at(1).map(|s| s.underline), Some(true));
}

#[test]
fn insert_inherits_style_of_previous_character() {
    let mut doc = RichText::plain("hello");
    doc.set_bold(0..5, true);
    doc.insert_text(5, " world");
    assert_eq!(doc.spans(), &[Span { text: "hello world".into(), style: bold() }]);
}

#[test]
fn insert_at_start_takes_first_character_style() {
    let mut doc = RichText::plain("b");
    doc.set_italic(0..1, true);
    doc.insert_text(0, "a");
    assert_eq!(texts(&doc), vec!["ab"]);
    assert!(doc.style_at(0).is_some_and(|s| s.italic));
}

#[test]
fn insert_into_empty_document() {
    let mut doc = RichText::new();
    doc.insert_text(10, "x");
    assert_eq!(doc.plain_text(), "x");
    doc.insert_text(0, "");
    assert_eq!(doc.len(), 1);
}

#[test]
fn delete_across_span_boundary() {
    let mut doc = RichText::from_markup("<b>ab</b>cd");
    doc.delete_range(1..3);
    assert_eq!(doc.spans(), &[
        Span { text: "a".into(), style: bold() },
        Span { text: "d".into(), style: SpanStyle::default() },
    ]);
}

#[test]
fn delete_range_is_clamped() {
    let mut doc = RichText::plain("abc");
    doc.delete_range(2..100);
    assert_eq!(doc.plain_text(), "ab");
    doc.delete_range(1..1);
    assert_eq!(doc.plain_text(), "ab");
    doc.delete_range(0..2);
    assert!(doc.is_empty());
}

#[test]
fn css_overrides_render_as_span_style() {
    let mut doc = RichText::plain("x");
    doc.set_color(0..1, Some("#FF0000"));
    doc.set_font_size(0..1, Some(18.0));
    doc.set_font_family(0..1, Some("Georgia"));
    doc.set_bold(0..1, true);
    assert_eq!(
        doc.to_markup(),
        "<span style=\"color: #FF0000; font-size: 18px; font-family: Georgia\"><b>x</b></span>"
    );
    doc.set_color(0..1, None);
    doc.set_font_size(0..1, None);
    doc.set_font_family(0..1, None);
    assert_eq!(doc.to_markup(), "<b>x</b>");
}

#[test]
fn plain_text_is_escaped() {
    assert_eq!(RichText::plain("a<b & c\n").to_markup(), "a&lt;b &amp; c<br>");
}

// =============================================================
// Markup import
// =============================================================

#[test]
fn imports_basic_inline_tags() {
    let doc = RichText::from_markup("<b>bold</b> and <I>it</I>");
    assert_eq!(texts(&doc), vec!["bold", " and ", "it"]);
    assert!(doc.style_at(0).is_some_and(|s| s.bold));
    assert!(doc.style_at(9).is_some_and(|s| s.italic && !s.bold));
}

#[test]
fn nested_strong_em_u_combine() {
    let doc = RichText::from_markup("<strong><em><u>x</u></em></strong>y");
    let style = doc.style_at(0).cloned().unwrap_or_default();
    assert!(style.bold && style.italic && style.underline);
    assert_eq!(doc.style_at(1), Some(&SpanStyle::default()));
}

#[test]
fn font_tag_maps_color_face_and_size_step() {
    let doc = RichText::from_markup("<font color=\"#00B8D9\" face='Verdana' size=3>hi</font>");
    let style = doc.style_at(0).cloned().unwrap_or_default();
    assert_eq!(style.color.as_deref(), Some("#00B8D9"));
    assert_eq!(style.font_family.as_deref(), Some("Verdana"));
    assert_eq!(style.font_size, Some(16.0));
}

#[test]
fn font_size_step_out_of_range_falls_back() {
    let doc = RichText::from_markup("<font size=\"42\">a</font><font size=\"0\">b</font>");
    assert_eq!(doc.style_at(0).and_then(|s| s.font_size), Some(16.0));
    assert_eq!(doc.style_at(1).and_then(|s| s.font_size), Some(16.0));
}

#[test]
fn span_style_declarations_are_read() {
    let doc = RichText::from_markup(
        "<span style=\"font-weight: 700; font-size: 20px; text-decoration: underline; font-family: 'Comic Sans MS'\">x</span>",
    );
    let style = doc.style_at(0).cloned().unwrap_or_default();
    assert!(style.bold && style.underline && !style.italic);
    assert_eq!(style.font_size, Some(20.0));
    assert_eq!(style.font_family.as_deref(), Some("Comic Sans MS"));
}

#[test]
fn line_breaks_from_br_and_blocks() {
    assert_eq!(RichText::from_markup("a<br>b").plain_text(), "a\nb");
    assert_eq!(RichText::from_markup("a<div>b</div>").plain_text(), "a\nb");
    assert_eq!(RichText::from_markup("<div>first</div><div>second</div>").plain_text(), "first\nsecond");
    assert_eq!(RichText::from_markup("<p>one</p><p>two</p>").plain_text(), "one\ntwo");
}

#[test]
fn entities_are_decoded() {
    let doc = RichText::from_markup("a &amp; b &lt;c&gt; &#65;&#x42; &bogus; &quot;q&quot;&nbsp;");
    assert_eq!(doc.plain_text(), "a & b <c> AB &bogus; \"q\"\u{a0}");
}

#[test]
fn attribute_references_and_uppercase_tags_are_normalised() {
    let doc = RichText::from_markup("<SPAN STYLE=\"font-family: &quot;Comic Sans MS&quot;; color: #FF5630\">x</SPAN>y");
    assert_eq!(doc.spans()[0].style.font_family.as_deref(), Some("Comic Sans MS"));
    assert_eq!(doc.spans()[0].style.color.as_deref(), Some("#FF5630"));
    assert_eq!(doc.spans()[1].text, "y");
    assert_eq!(doc.spans()[1].style, SpanStyle::default());
}

#[test]
fn unknown_tags_keep_their_text() {
    let doc = RichText::from_markup("<a href=\"x\">link</a><img src=\"y\"> after");
    assert_eq!(doc.plain_text(), "link after");
    assert_eq!(texts(&doc), vec!["link after"]);
}

#[test]
fn stray_angle_bracket_is_text() {
    assert_eq!(RichText::from_markup("a < b").plain_text(), "a < b");
}

#[test]
fn unmatched_close_tag_is_ignored() {
    let doc = RichText::from_markup("a</b>b");
    assert_eq!(doc.plain_text(), "ab");
    assert_eq!(doc.spans().len(), 1);
}

#[test]
fn visible_text_ignores_whitespace_and_breaks() {
    assert!(!RichText::from_markup("<br>&nbsp; <div></div>").has_visible_text());
    assert!(RichText::from_markup("<b> x </b>").has_visible_text());
}

#[test]
fn exported_markup_reimports_to_same_document() {
    let mut doc = RichText::plain("Hello brave world");
    doc.set_bold(0..5, true);
    doc.set_italic(3..11, true);
    doc.set_color(6..11, Some("#FF5630"));
    doc.set_font_size(12..17, Some(28.0));
    doc.set_font_family(12..17, Some("Comic Sans MS"));

    let back = RichText::from_markup(&doc.to_markup());
    assert_eq!(back, doc);
    assert_eq!(texts(&back), vec!["Hel", "lo", " ", "brave", " ", "world"]);
}
