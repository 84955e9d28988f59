//! Markdown transforms used when assembling an export.
//!
//! All transforms work line by line and leave fenced code blocks (```` ``` ```` or `~~~`)
//! untouched, except [`strip_comments`] which removes every `<!-- ... -->` span.

use crate::constants::{DIVIDER_LINE, MAX_HEADING_LEVEL, TOC_HEADING};
use crate::validation::ContentWidth;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn is_fence(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("```") || t.starts_with("~~~")
}

/// Applies `f` to every line outside fenced code blocks, preserving line breaks.
fn map_lines<F: FnMut(&str) -> String>(content: &str, mut f: F) -> String {
    let mut in_fence = false;
    content
        .split('\n')
        .map(|line| {
            if is_fence(line) {
                in_fence = !in_fence;
                return line.to_string();
            }
            if in_fence {
                line.to_string()
            } else {
                f(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses an ATX heading line, returning its level and text.
///
/// `"## Setup"` → `Some((2, "Setup"))`. The `#` run must start the line and be followed by
/// whitespace or the end of the line.
pub fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > MAX_HEADING_LEVEL {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t', '\r']) {
        return None;
    }
    Some((hashes, rest.trim()))
}

/// Pushes every heading `by` levels deeper, capped at level 6.
pub fn shift_headings(content: &str, by: usize) -> String {
    if by == 0 {
        return content.to_string();
    }
    map_lines(content, |line| match parse_heading(line) {
        Some((level, text)) => {
            let hashes = "#".repeat((level + by).min(MAX_HEADING_LEVEL));
            if text.is_empty() {
                hashes
            } else {
                format!("{} {}", hashes, text)
            }
        }
        None => line.to_string(),
    })
}

/// Removes `<!-- ... -->` comments.
///
/// A comment that occupies a whole line takes its line break with it. An unterminated `<!--`
/// is left in place.
pub fn strip_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("<!--") {
        let Some(len) = rest[start + 4..].find("-->") else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + 4 + len + 3..];

        if (out.is_empty() || out.ends_with('\n')) && rest.starts_with('\n') {
            rest = &rest[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Matches the opening of an inline image, `![alt](`.
fn image_open_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!\[([^\]\n]*)\]\(").ok())
        .as_ref()
}

/// Matches a whole inline link or image, `[text](url)` or `![alt](url)`.
fn inline_link_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(!?)\[([^\]\n]*)\]\(([^)\s]*)\)").ok())
        .as_ref()
}

/// Matches `**bold**` spans.
fn strong_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*\n]+)\*\*").ok())
        .as_ref()
}

/// Prefixes image alt text with a running figure number.
///
/// `![Chart](a.png)` becomes `![Figure 3: Chart](a.png)` when `counter` was 2 on entry.
/// `counter` is left at the number of the last figure seen so numbering can continue across
/// several pieces of content. Bracketed text that is not immediately followed by `(` is not an
/// image and is left alone.
pub fn number_figures(content: &str, counter: &mut usize) -> String {
    let Some(re) = image_open_re() else {
        return content.to_string();
    };

    map_lines(content, |line| {
        re.replace_all(line, |caps: &Captures<'_>| {
            *counter += 1;
            let alt = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            if alt.is_empty() {
                format!("![Figure {}](", counter)
            } else {
                format!("![Figure {}: {}](", counter, alt)
            }
        })
        .into_owned()
    })
}

/// Generates GitHub-style heading anchors, suffixing repeats with `-1`, `-2`, ...
#[derive(Debug, Default)]
pub struct SlugTracker {
    seen: HashMap<String, usize>,
}

impl SlugTracker {
    pub fn slug(&mut self, text: &str) -> String {
        let base: String = text
            .trim()
            .to_lowercase()
            .chars()
            .filter_map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    Some(c)
                } else if c.is_whitespace() {
                    Some('-')
                } else {
                    None
                }
            })
            .collect();

        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        slug
    }
}

/// Lists the headings of a document outside code blocks.
pub fn collect_headings(content: &str) -> Vec<(usize, String)> {
    let mut in_fence = false;
    let mut headings = Vec::new();
    for line in content.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some((level, text)) = parse_heading(line) {
            headings.push((level, text.to_string()));
        }
    }
    headings
}

/// Builds a table of contents for `document`.
///
/// Entries are nested by heading level relative to the shallowest heading and link to the
/// anchors [`to_html`] assigns once the table has been placed at the top of the document.
pub fn table_of_contents(document: &str) -> String {
    let headings = collect_headings(document);
    let mut slugs = SlugTracker::default();
    if let Some((_, title)) = parse_heading(TOC_HEADING) {
        slugs.slug(title);
    }

    let min_level = headings.iter().map(|(level, _)| *level).min().unwrap_or(1);
    let mut out = format!("{}\n", TOC_HEADING);
    if !headings.is_empty() {
        out.push('\n');
    }
    for (level, text) in &headings {
        out.push_str(&"  ".repeat(level - min_level));
        out.push_str(&format!("- [{}](#{})\n", text, slugs.slug(text)));
    }
    out
}

/// Escapes text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns false for URLs whose scheme could run script when followed.
fn is_safe_url(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    match lower.split_once(':') {
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => {
            matches!(scheme, "http" | "https" | "mailto")
        }
        _ => true,
    }
}

/// Renders one line of inline markdown: links, images and `**bold**`.
///
/// The text is escaped first, so only markup produced here reaches the output.
pub fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);

    let linked = match inline_link_re() {
        Some(re) => re
            .replace_all(&escaped, |caps: &Captures<'_>| {
                let whole = caps.get(0).map(|m| m.as_str()).unwrap_or("");
                let label = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                let url = caps.get(3).map(|m| m.as_str()).unwrap_or("");
                if !is_safe_url(url) {
                    return whole.to_string();
                }
                if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) {
                    format!("<img src=\"{}\" alt=\"{}\" />", url, label)
                } else {
                    format!("<a href=\"{}\">{}</a>", url, label)
                }
            })
            .into_owned(),
        None => escaped,
    };

    match strong_re() {
        Some(re) => re
            .replace_all(&linked, "<strong>$1</strong>")
            .into_owned(),
        None => linked,
    }
}

/// Renders the inside of a meta comment as an HTML comment that cannot end early.
fn comment_html(inner: &str) -> String {
    let mut text = escape_html(inner.trim());
    while text.contains("--") {
        text = text.replace("--", "-");
    }
    format!("<!-- {} -->\n", text)
}

/// Parses a `- item` or `* item` line into its nesting level and text.
fn parse_list_item(line: &str) -> Option<(usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    let rest = &line[indent..];
    let text = rest
        .strip_prefix("- ")
        .or_else(|| rest.strip_prefix("* "))?;
    Some((indent / 2, text.trim()))
}

/// Accumulates block-level HTML while tracking open paragraphs and lists.
#[derive(Default)]
struct HtmlBody {
    out: String,
    paragraph: Vec<String>,
    list_depth: usize,
}

impl HtmlBody {
    fn close_blocks(&mut self) {
        if !self.paragraph.is_empty() {
            self.out
                .push_str(&format!("<p>{}</p>\n", self.paragraph.join("\n")));
            self.paragraph.clear();
        }
        while self.list_depth > 0 {
            self.out.push_str("</li>\n</ul>\n");
            self.list_depth -= 1;
        }
    }

    fn list_item(&mut self, level: usize, text: &str) {
        if !self.paragraph.is_empty() {
            self.close_blocks();
        }
        // A list can only nest one level deeper than the item before it.
        let depth = (level + 1).min(self.list_depth + 1);
        if depth > self.list_depth {
            if self.list_depth > 0 {
                self.out.push('\n');
            }
            self.out.push_str("<ul>\n");
            self.list_depth = depth;
        } else {
            self.out.push_str("</li>\n");
            while self.list_depth > depth {
                self.out.push_str("</ul>\n</li>\n");
                self.list_depth -= 1;
            }
        }
        self.out.push_str(&format!("<li>{}", render_inline(text)));
    }

    fn paragraph_line(&mut self, text: &str) {
        if self.list_depth > 0 {
            self.close_blocks();
        }
        self.paragraph.push(render_inline(text));
    }

    fn block(&mut self, html: &str) {
        self.close_blocks();
        self.out.push_str(html);
    }
}

/// Converts export markdown into a minimal standalone HTML document.
///
/// Headings, divider lines, fenced code, `-` lists and paragraphs are recognised, and inline
/// links, images and `**bold**` are converted. Every piece of source text is escaped. Whole-line
/// comments are carried over as HTML comments with their text escaped. When `width` is set it
/// becomes the `max-width` of the `<main>` element.
pub fn to_html(markdown: &str, title: &str, width: Option<&ContentWidth>) -> String {
    let mut body = HtmlBody::default();
    let mut code: Option<Vec<&str>> = None;
    let mut slugs = SlugTracker::default();

    for line in markdown.lines() {
        if code.is_some() {
            if is_fence(line) {
                let lines = code.take().unwrap_or_default();
                body.block(&format!(
                    "<pre><code>{}</code></pre>\n",
                    escape_html(&lines.join("\n"))
                ));
            } else if let Some(lines) = code.as_mut() {
                lines.push(line);
            }
            continue;
        }

        let trimmed = line.trim();
        if is_fence(line) {
            body.close_blocks();
            code = Some(Vec::new());
        } else if let Some((level, text)) = parse_heading(line) {
            body.block(&format!(
                "<h{level} id=\"{}\">{}</h{level}>\n",
                escape_html(&slugs.slug(text)),
                render_inline(text),
            ));
        } else if trimmed == DIVIDER_LINE {
            body.block("<hr />\n");
        } else if trimmed.is_empty() {
            body.close_blocks();
        } else if trimmed.len() >= 7 && trimmed.starts_with("<!--") && trimmed.ends_with("-->") {
            body.block(&comment_html(&trimmed[4..trimmed.len() - 3]));
        } else if let Some((level, text)) = parse_list_item(line) {
            body.list_item(level, text);
        } else {
            body.paragraph_line(trimmed);
        }
    }

    // An unclosed fence runs to the end of the document.
    if let Some(lines) = code {
        body.block(&format!(
            "<pre><code>{}</code></pre>\n",
            escape_html(&lines.join("\n"))
        ));
    }
    body.close_blocks();

    let style = width
        .map(|w| format!(" style=\"max-width: {}\"", w))
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<title>{}</title>\n</head>\n<body>\n<main{}>\n{}</main>\n</body>\n</html>\n",
        escape_html(title),
        style,
        body.out
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_heading() {
        assert_eq!(parse_heading("# Title"), Some((1, "Title")));
        assert_eq!(parse_heading("###   Spaced  "), Some((3, "Spaced")));
        assert_eq!(parse_heading("##"), Some((2, "")));
        assert_eq!(parse_heading("#hashtag"), None);
        assert_eq!(parse_heading("####### seven"), None);
        assert_eq!(parse_heading(" # indented"), None);
    }

    #[test]
    fn test_shift_headings_caps_and_skips_code() {
        let content = "# One\n##### Five\ntext\n```\n# not a heading\n```\n";
        let shifted = shift_headings(content, 2);
        assert_eq!(
            shifted,
            "### One\n###### Five\ntext\n```\n# not a heading\n```\n"
        );
        assert_eq!(shift_headings(content, 0), content);
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("a <!-- x --> b"), "a  b");
        assert_eq!(strip_comments("a\n<!-- whole line -->\nb"), "a\nb");
        assert_eq!(strip_comments("<!-- first -->\nb"), "b");
        assert_eq!(strip_comments("a <!--\nmulti\nline --> b"), "a  b");
        assert_eq!(strip_comments("a <!-- open"), "a <!-- open");
    }

    #[test]
    fn test_number_figures_counts_across_calls() {
        let mut counter = 0;
        let first = number_figures("![Chart](a.png) and ![](b.png)", &mut counter);
        assert_eq!(first, "![Figure 1: Chart](a.png) and ![Figure 2](b.png)");

        let second = number_figures("```\n![skip](c.png)\n```\n![Map](d.png)", &mut counter);
        assert_eq!(second, "```\n![skip](c.png)\n```\n![Figure 3: Map](d.png)");
        assert_eq!(counter, 3);
    }

    #[test]
    fn test_number_figures_leaves_bracketed_text_and_links_alone() {
        let mut counter = 0;
        let text = "See ![x] then [y](z)";
        assert_eq!(number_figures(text, &mut counter), text);
        assert_eq!(counter, 0);

        let text = "![a] and ![b](b.png)";
        assert_eq!(number_figures(text, &mut counter), "![a] and ![Figure 1: b](b.png)");
        assert_eq!(counter, 1);
    }

    #[test]
    fn test_slug_tracker_dedupes() {
        let mut slugs = SlugTracker::default();
        assert_eq!(slugs.slug("Getting Started!"), "getting-started");
        assert_eq!(slugs.slug("Getting Started"), "getting-started-1");
        assert_eq!(slugs.slug("C++ & Rust"), "c--rust");
    }

    #[test]
    fn test_table_of_contents_nests_by_level() {
        let toc = table_of_contents("# Guide\ntext\n## Install\n### Linux\n## Usage\n");
        assert_eq!(
            toc,
            "## Table of Contents\n\n- [Guide](#guide)\n  - [Install](#install)\n    - [Linux](#linux)\n  - [Usage](#usage)\n"
        );
    }

    #[test]
    fn test_table_of_contents_avoids_its_own_anchor() {
        let toc = table_of_contents("# Table of Contents\n");
        assert!(toc.contains("(#table-of-contents-1)"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_to_html_structure() {
        let width = ContentWidth::parse("720px").unwrap();
        let html = to_html(
            "# Title\n\nfirst line\nsecond <b>\n\n---\n<!-- note -->\n```\nlet x = 1 < 2;\n```\n",
            "Doc & Co",
            width.as_ref(),
        );

        assert!(html.contains("<title>Doc &amp; Co</title>"));
        assert!(html.contains("<main style=\"max-width: 720px\">"));
        assert!(html.contains("<h1 id=\"title\">Title</h1>"));
        assert!(html.contains("<p>first line\nsecond &lt;b&gt;</p>"));
        assert!(html.contains("<hr />"));
        assert!(html.contains("<!-- note -->"));
        assert!(html.contains("<pre><code>let x = 1 &lt; 2;</code></pre>"));
    }

    #[test]
    fn test_to_html_converts_toc_lists_images_and_bold() {
        let html = to_html(
            "- [Book](#book)\n  - [Chapter](#chapter)\n- [End](#end)\n\n**ID:** root\n\n![Figure 1: Map](m.png)\n",
            "t",
            None,
        );

        assert!(html.contains(
            "<ul>\n<li><a href=\"#book\">Book</a>\n<ul>\n<li><a href=\"#chapter\">Chapter</a></li>\n</ul>\n</li>\n<li><a href=\"#end\">End</a></li>\n</ul>\n"
        ));
        assert!(html.contains("<p><strong>ID:</strong> root</p>"));
        assert!(html.contains("<p><img src=\"m.png\" alt=\"Figure 1: Map\" /></p>"));
    }

    #[test]
    fn test_to_html_comment_cannot_close_early() {
        let html = to_html("<!--><script>alert(1)</script><!-- -->", "t", None);

        assert!(!html.contains("<script>"));
        assert!(!html.contains("<!-->"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_render_inline_escapes_and_filters_urls() {
        assert_eq!(
            render_inline("<b>[x](y)</b>"),
            "&lt;b&gt;<a href=\"y\">x</a>&lt;/b&gt;"
        );
        assert!(!render_inline("[bad](javascript:alert(1))").contains("<a"));
        assert!(!render_inline("![bad](data:text/html;base64,xx)").contains("<img"));
        assert_eq!(
            render_inline("[site](https://example.com/a?b=1&c=2)"),
            "<a href=\"https://example.com/a?b=1&amp;c=2\">site</a>"
        );
    }

    #[test]
    fn test_to_html_without_width() {
        let html = to_html("text", "t", None);
        assert!(html.contains("<main>\n<p>text</p>\n</main>"));
    }
}
