//! Readable-text extraction from HTML pages.
//!
//! Not a full parser: elements that never carry page content (scripts,
//! styles, navigation, headers, footers) are cut out, every remaining tag
//! becomes a line break, and the result is normalised line by line.

use std::sync::OnceLock;

use regex::Regex;

/// Maximum characters of page text handed to the model.
pub const MAX_CONTENT_CHARS: usize = 8000;

pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated due to length...]";

/// Title reported for pages without one.
pub const NO_TITLE: &str = "No title";

const STRIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header", "noscript"];

/// Title and body text of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub text: String,
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"))
}

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("valid regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A `<` not followed by a tag name, `/`, `!` or `?` is page text.
    RE.get_or_init(|| {
        Regex::new(r"(?s)</?[A-Za-z][^>]*>|<![^>]*>|<\?[^>]*>").expect("valid regex")
    })
}

fn numeric_entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&#([xX]?)([0-9a-fA-F]+);").expect("valid regex"))
}

fn element_res() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        STRIPPED_ELEMENTS
            .iter()
            .map(|tag| {
                Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).expect("valid regex")
            })
            .collect()
    })
}

/// Extract the title and readable text of an HTML document.
pub fn extract_page(html: &str) -> ExtractedPage {
    let title = title_re()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| collapse_whitespace(&decode_entities(m.as_str())))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let mut body = comment_re().replace_all(html, "").into_owned();
    for re in element_res() {
        body = re.replace_all(&body, "").into_owned();
    }
    let body = tag_re().replace_all(&body, "\n");
    let body = decode_entities(&body);

    ExtractedPage {
        title,
        text: normalize_lines(&body),
    }
}

/// Cap text at `max_chars` characters, appending the truncation marker.
pub fn truncate_content(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Trim each line, split on runs of double spaces, and drop empty chunks.
fn normalize_lines(text: &str) -> String {
    text.lines()
        .flat_map(|line| line.trim().split("  "))
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the common named entities and all numeric ones.
pub fn decode_entities(s: &str) -> String {
    let decoded = numeric_entity_re().replace_all(s, |caps: &regex::Captures| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_default()
    });
    decoded
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>  Ownership &amp; Borrowing </title>
  <style>body { color: red; }</style>
  <script>var tracking = "noise";</script>
</head>
<body>
  <header><h1>Site banner</h1></header>
  <nav><a href="/">Home</a> <a href="/docs">Docs</a></nav>
  <!-- hidden comment -->
  <main>
    <h2>What is ownership?</h2>
    <p>Each value has a single <em>owner</em>.</p>
    <p>Values are dropped when the owner goes out of scope.&#x21;</p>
  </main>
  <footer>Copyright notice</footer>
</body>
</html>"#;

    #[test]
    fn extracts_decoded_title() {
        assert_eq!(extract_page(PAGE).title, "Ownership & Borrowing");
    }

    #[test]
    fn strips_boilerplate_elements() {
        let text = extract_page(PAGE).text;
        for noise in ["color: red", "tracking", "Site banner", "Docs", "Copyright", "hidden comment"] {
            assert!(!text.contains(noise), "{noise:?} should be stripped from {text:?}");
        }
        assert!(text.contains("What is ownership?"));
        assert!(text.contains("Values are dropped when the owner goes out of scope.!"));
    }

    #[test]
    fn every_tag_breaks_the_line() {
        let text = extract_page("<p>Each value has a single <em>owner</em>.</p>").text;
        assert_eq!(text, "Each value has a single\nowner\n.");
    }

    #[test]
    fn bare_less_than_is_kept_as_text() {
        let text = extract_page("<p>if x < y then swap</p><p>kept paragraph</p>").text;
        assert_eq!(text, "if x < y then swap\nkept paragraph");

        let text = extract_page("<p>Vec&lt;T&gt; and a -> b</p><?xml version=\"1.0\"?>").text;
        assert_eq!(text, "Vec<T> and a -> b");
    }

    #[test]
    fn missing_title_falls_back() {
        assert_eq!(extract_page("<p>plain</p>").title, "No title");
    }

    #[test]
    fn double_spaces_split_chunks() {
        assert_eq!(normalize_lines("  alpha  beta \n\n   \n gamma"), "alpha\nbeta\ngamma");
    }

    #[test]
    fn header_rule_does_not_swallow_head() {
        let page = extract_page("<head><title>T</title></head><body><p>kept</p></body>");
        assert_eq!(page.text, "T\nkept");
    }

    #[test]
    fn truncation_appends_marker_after_limit() {
        let text = "é".repeat(MAX_CONTENT_CHARS + 5);
        let out = truncate_content(text, MAX_CONTENT_CHARS);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            out.chars().count(),
            MAX_CONTENT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn short_text_is_not_truncated() {
        assert_eq!(truncate_content("short".to_string(), 10), "short");
    }
}
