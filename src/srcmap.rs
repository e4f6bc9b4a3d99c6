//! Paragraph-indent correlation from raw source markup
//!
//! The structured tree carries no paragraph-layout hints, so indentation is
//! recovered by a pre-pass over the raw HTML source: paragraphs whose inline
//! style sets `margin-left` or `text-indent` are keyed by a normalized
//! prefix of their text. Lookups are explicitly best-effort - two paragraphs
//! sharing a prefix collide (first occurrence wins) and a missing source
//! document means every lookup misses.

use log::debug;
use std::collections::HashMap;

use crate::units::css_length_to_units;
use crate::units::UNITS_PER_PT;

/// Paragraph indentation in points
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Indent {
    /// Left margin
    pub left_pt: f32,
    /// First-line offset; negative means hanging indent
    pub first_line_pt: f32,
}

/// Prefix-keyed paragraph indentation map
#[derive(Debug, Default)]
pub struct IndentMap {
    entries: HashMap<String, Indent>,
}

/// Characters of normalized text used as the correlation key
const PREFIX_LEN: usize = 100;

impl IndentMap {
    /// Build the map from raw HTML markup
    pub fn from_markup(html: &str) -> Self {
        let mut entries = HashMap::new();

        let mut rest = html;
        while let Some(open) = rest.find("<p") {
            let tag_rest = &rest[open + 2..];
            // require a real <p> tag, not <pre>, <param>, ...
            if !tag_rest.starts_with(&['>', ' ', '\t', '\n'][..]) {
                rest = &rest[open + 2..];
                continue;
            }
            let Some(tag_end) = tag_rest.find('>') else { break };
            let tag = &tag_rest[..tag_end];
            let after_tag = &tag_rest[tag_end + 1..];

            let body_end = after_tag.find("</p").unwrap_or(after_tag.len());
            let body = &after_tag[..body_end];

            if let Some(indent) = indent_from_tag(tag) {
                let key = prefix_key(&strip_tags(body));
                if !key.is_empty() {
                    // first occurrence wins on prefix collision
                    entries.entry(key).or_insert(indent);
                }
            }

            rest = &after_tag[body_end..];
        }

        debug!("collected {} indented paragraph prefixes", entries.len());
        IndentMap { entries }
    }

    /// Look up the indentation recorded for a paragraph's plain text
    pub fn lookup(&self, plain_text: &str) -> Option<Indent> {
        self.entries.get(&prefix_key(plain_text)).copied()
    }

    /// Whether the pre-pass found anything
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extract margin-left / text-indent from a `<p ...>` tag's style attribute
fn indent_from_tag(tag: &str) -> Option<Indent> {
    let style = attr_value(tag, "style")?;

    let mut indent = Indent::default();
    let mut found = false;
    for declaration in style.split(';') {
        let Some((key, value)) = declaration.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "margin-left" => {
                if let Some(units) = css_length_to_units(value) {
                    indent.left_pt = units as f32 / UNITS_PER_PT;
                    found = true;
                }
            }
            "text-indent" => {
                if let Some(units) = css_length_to_units(value) {
                    indent.first_line_pt = units as f32 / UNITS_PER_PT;
                    found = true;
                }
            }
            _ => {}
        }
    }

    found.then_some(indent)
}

/// Find an attribute value inside a raw tag body
///
/// The name must sit on a whitespace boundary so `style` does not match
/// inside `data-style`.
fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let mut search = 0;
    while let Some(pos) = tag[search..].find(name) {
        let start = search + pos;
        search = start + name.len();

        let on_boundary = start == 0
            || tag[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_whitespace());
        if !on_boundary {
            continue;
        }

        let rest = tag[start + name.len()..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        let quote = rest.chars().next()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        let rest = &rest[1..];
        let end = rest.find(quote)?;
        return Some(&rest[..end]);
    }
    None
}

/// Drop nested tags and decode the common entities
fn strip_tags(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_tag = false;
    for c in body.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Whitespace-normalized leading prefix used as the map key
fn prefix_key(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    normalized.chars().take(PREFIX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<html><body>
      <p>plain paragraph</p>
      <p style="margin-left: 40px; text-indent: -20px">hanging <b>indent</b> paragraph</p>
      <p style="text-indent: 12pt">first-line only</p>
      <pre style="margin-left: 40px">not a paragraph</pre>
    </body></html>"#;

    #[test]
    fn test_collects_only_indented_paragraphs() {
        let map = IndentMap::from_markup(SAMPLE);

        assert!(map.lookup("plain paragraph").is_none());
        let hanging = map.lookup("hanging indent paragraph").unwrap();
        assert_eq!(hanging.left_pt, 30.0);
        assert_eq!(hanging.first_line_pt, -15.0);

        let first_line = map.lookup("first-line only").unwrap();
        assert_eq!(first_line.left_pt, 0.0);
        assert_eq!(first_line.first_line_pt, 12.0);
    }

    #[test]
    fn test_lookup_is_best_effort() {
        let map = IndentMap::from_markup(SAMPLE);
        assert!(map.lookup("never seen before").is_none());

        let empty = IndentMap::from_markup("");
        assert!(empty.is_empty());
        assert!(empty.lookup("hanging indent paragraph").is_none());
    }

    #[test]
    fn test_prefix_truncation_and_normalization() {
        let long: String = "word ".repeat(50);
        let html = format!(r#"<p style="margin-left:10pt">{}</p>"#, long);
        let map = IndentMap::from_markup(&html);

        // whitespace differences beyond normalization do not matter,
        // nor does anything past the prefix length
        let query = format!("{}EXTRA", "word  ".repeat(50));
        assert!(map.lookup(&query).is_some());
    }

    #[test]
    fn test_style_attribute_requires_boundary() {
        // a data-style attribute must not shadow the real style attribute
        let html = r#"
          <p data-style="margin-left: 99pt" style="margin-left: 10pt">anchored</p>
          <p data-style="margin-left: 99pt">prefixed only</p>"#;
        let map = IndentMap::from_markup(html);

        assert_eq!(map.lookup("anchored").unwrap().left_pt, 10.0);
        assert!(map.lookup("prefixed only").is_none());
    }

    #[test]
    fn test_first_occurrence_wins_on_collision() {
        let html = r#"
          <p style="margin-left: 10pt">same lead text</p>
          <p style="margin-left: 99pt">same lead text</p>"#;
        let map = IndentMap::from_markup(html);
        assert_eq!(map.lookup("same lead text").unwrap().left_pt, 10.0);
    }
}
