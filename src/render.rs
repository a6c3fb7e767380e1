//! Markdown rendering with reading-unit markup
//!
//! Converts markdown to HTML with pulldown-cmark, then wraps the text nodes
//! in sentence and word spans so a display surface can address units by id.
//! Segmentation reuses the span indexer's rules; sentence and word ids run
//! continuously across text nodes, mirroring the ids a whole-document index
//! assigns when reading order matches render order. The decoration is
//! best-effort over whatever HTML the converter produces; markup inside
//! `<pre>` blocks is left untouched.

use pulldown_cmark::{html, Options, Parser};

use crate::config::HighlightConfig;
use crate::index::SpanIndex;

/// Render a full HTML document with unit spans and highlight styles
pub fn render_document(markdown: &str, highlight: &HighlightConfig) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut body = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut body, parser);

    let decorated = decorate(&body);
    build_document(&decorated, highlight)
}

/// Wrap text nodes outside tags in sentence/word spans
fn decorate(html: &str) -> String {
    let mut out = String::with_capacity(html.len() * 2);
    let mut sentence_id = 0usize;
    let mut word_id = 0usize;
    let mut pre_depth = 0usize;

    let mut rest = html;
    while !rest.is_empty() {
        let Some(tag_start) = rest.find('<') else {
            decorate_text(rest, pre_depth, &mut sentence_id, &mut word_id, &mut out);
            break;
        };

        decorate_text(
            &rest[..tag_start],
            pre_depth,
            &mut sentence_id,
            &mut word_id,
            &mut out,
        );

        let tag_end = rest[tag_start..]
            .find('>')
            .map(|i| tag_start + i + 1)
            .unwrap_or(rest.len());
        let tag = &rest[tag_start..tag_end];
        if is_tag_named(tag, "<pre") {
            pre_depth += 1;
        } else if is_tag_named(tag, "</pre") {
            pre_depth = pre_depth.saturating_sub(1);
        }
        out.push_str(tag);
        rest = &rest[tag_end..];
    }

    out
}

/// True when `tag` opens with exactly `name` as its element name
///
/// The name must be followed by `>`, whitespace, or `/`, so `<pre>` and
/// `<pre class="x">` match but `<presentation>` does not.
fn is_tag_named(tag: &str, name: &str) -> bool {
    match tag.strip_prefix(name).and_then(|rest| rest.chars().next()) {
        Some('>') | Some('/') => true,
        Some(c) => c.is_whitespace(),
        None => false,
    }
}

/// Decorate one text node, advancing the running unit counters
fn decorate_text(
    text: &str,
    pre_depth: usize,
    sentence_id: &mut usize,
    word_id: &mut usize,
    out: &mut String,
) {
    if text.is_empty() {
        return;
    }
    if pre_depth > 0 || text.trim().is_empty() {
        out.push_str(text);
        return;
    }

    let index = SpanIndex::build(text);

    // Char offsets from the indexer, byte offsets for slicing.
    let mut byte_at: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
    byte_at.push(text.len());
    let slice = |start: usize, end: usize| &text[byte_at[start]..byte_at[end]];

    let mut emitted_to = 0usize;
    for sentence in index.sentences() {
        out.push_str(slice(emitted_to, sentence.start));
        out.push_str(&format!(
            "<span class=\"tts-sentence\" data-sentence-id=\"{}\">",
            *sentence_id
        ));

        let mut cursor = sentence.start;
        for word in index.words().iter().filter(|w| w.parent_sentence == Some(sentence.id)) {
            out.push_str(slice(cursor, word.start));
            out.push_str(&format!(
                "<span class=\"tts-word\" data-word-id=\"{}\">",
                *word_id
            ));
            out.push_str(slice(word.start, word.end));
            out.push_str("</span>");
            cursor = word.end;
            *word_id += 1;
        }
        out.push_str(slice(cursor, sentence.end));
        out.push_str("</span>");
        emitted_to = sentence.end;
        *sentence_id += 1;
    }
    out.push_str(slice(emitted_to, index.char_len()));
}

/// Wrap the decorated body in a complete document with highlight styles and
/// the marker script the display surface invokes
fn build_document(body: &str, highlight: &HighlightConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body {{ font-family: sans-serif; max-width: 48em; margin: 2em auto; line-height: 1.6; }}
pre {{ background: #f6f8fa; padding: 1em; overflow-x: auto; }}
.tts-sentence.active {{ background-color: {sentence_color}; }}
.tts-word.active {{ background-color: {word_color}; }}
</style>
<script>
let autoScroll = true;
function clearHighlights() {{
  document.querySelectorAll('.tts-sentence.active, .tts-word.active')
    .forEach(el => el.classList.remove('active'));
}}
function highlightSentence(id) {{
  clearHighlights();
  const el = document.querySelector(`[data-sentence-id="${{id}}"]`);
  if (el) {{
    el.classList.add('active');
    if (autoScroll) el.scrollIntoView({{ block: 'center', behavior: 'smooth' }});
  }}
}}
function highlightWord(id) {{
  const el = document.querySelector(`[data-word-id="${{id}}"]`);
  if (el) el.classList.add('active');
}}
function enableAutoScroll() {{ autoScroll = true; }}
function disableAutoScroll() {{ autoScroll = false; }}
</script>
</head>
<body>
{body}
</body>
</html>
"#,
        sentence_color = highlight.sentence_color,
        word_color = highlight.word_color,
        body = body,
    )
}
