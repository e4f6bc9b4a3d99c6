//! Character-property resolution
//!
//! Maps (base charPr id, format flags, color, size) to a reused or freshly
//! synthesized charPr id. Synthesis clones the base record and edits the
//! copy; the registry grows by at most one record per distinct combination.

use log::warn;

use super::HeaderRegistry;
use crate::units::{css_color_to_hex, font_size_to_units};

/// Run-level format flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Formats {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub superscript: bool,
    pub subscript: bool,
}

impl Formats {
    /// No flag set
    pub fn is_empty(&self) -> bool {
        *self == Formats::default()
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn with_strikeout(mut self) -> Self {
        self.strikeout = true;
        self
    }

    pub fn with_superscript(mut self) -> Self {
        self.superscript = true;
        self
    }

    pub fn with_subscript(mut self) -> Self {
        self.subscript = true;
        self
    }
}

/// Cache key for one resolved combination
///
/// Color is normalized and size converted before keying, so "red" and
/// "#FF0000" share a record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct CharKey {
    base: u32,
    formats: Formats,
    color: Option<String>,
    height: Option<i32>,
}

impl HeaderRegistry {
    /// Resolve a character-property id for the given formatting
    ///
    /// The no-op combination returns `base_id` unchanged and leaves the
    /// registry untouched. An unknown `base_id` also returns unchanged (the
    /// reference may still be meaningful to the consumer).
    pub fn resolve_char_pr(
        &mut self,
        base_id: u32,
        formats: Formats,
        color: Option<&str>,
        size: Option<&str>,
    ) -> u32 {
        if formats.is_empty() && color.is_none() && size.is_none() {
            return base_id;
        }

        let key = CharKey {
            base: base_id,
            formats,
            color: color.map(css_color_to_hex),
            height: size.map(font_size_to_units),
        };
        if let Some(&id) = self.char_cache.get(&key) {
            return id;
        }

        let base = match self.find_record("charPr", base_id) {
            Some(record) => record.clone(),
            None => {
                warn!("charPr base {} not found in template, leaving reference as-is", base_id);
                return base_id;
            }
        };

        let id = self.next_char_pr_id;
        self.next_char_pr_id += 1;

        let mut record = base;
        record.set_attr("id", id.to_string());

        if let Some(hex) = &key.color {
            record.set_attr("textColor", hex.clone());
            // keep an existing underline marker in step with the text color
            if let Some(underline) = record.child_mut("underline") {
                underline.set_attr("color", hex.clone());
            }
        }

        if let Some(height) = key.height {
            record.set_attr("height", height.to_string());
        }

        if formats.bold {
            record.ensure_child("hh:bold");
        }
        if formats.italic {
            record.ensure_child("hh:italic");
        }

        let marker_color = key.color.clone().unwrap_or_else(|| "#000000".to_string());
        if formats.underline {
            let underline = record.ensure_child("hh:underline");
            underline.set_attr("type", "SOLID");
            underline.set_attr("shape", "SOLID");
            underline.set_attr("color", marker_color.clone());
        }
        if formats.strikeout {
            let strikeout = record.ensure_child("hh:strikeout");
            strikeout.set_attr("shape", "SOLID");
            strikeout.set_attr("color", marker_color);
        }

        // mutually exclusive vertical positions; superscript wins a conflict
        if formats.superscript {
            record.remove_child("subscript");
            record.ensure_child("hh:supscript");
        } else if formats.subscript {
            record.remove_child("supscript");
            record.ensure_child("hh:subscript");
        }

        self.collection_mut("hh:charProperties").push_element(record);
        self.char_cache.insert(key, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::TEST_HEADER;

    fn registry() -> HeaderRegistry {
        HeaderRegistry::from_xml(TEST_HEADER).unwrap()
    }

    #[test]
    fn test_noop_returns_base_unchanged() {
        let mut registry = registry();
        let before = registry.next_char_pr_id;

        let id = registry.resolve_char_pr(0, Formats::default(), None, None);

        assert_eq!(id, 0);
        assert_eq!(registry.next_char_pr_id, before);
        assert!(registry.char_cache.is_empty());
    }

    #[test]
    fn test_idempotent_resolution() {
        let mut registry = registry();

        let first = registry.resolve_char_pr(0, Formats::default().with_bold(), None, None);
        let second = registry.resolve_char_pr(0, Formats::default().with_bold(), None, None);

        assert_eq!(first, second);
        assert_eq!(registry.char_cache.len(), 1);
        // exactly one record synthesized across both calls
        assert_eq!(registry.next_char_pr_id, 9);
    }

    #[test]
    fn test_monotonic_allocation_above_template_max() {
        let mut registry = registry();

        let bold = registry.resolve_char_pr(0, Formats::default().with_bold(), None, None);
        let italic = registry.resolve_char_pr(0, Formats::default().with_italic(), None, None);
        let both = registry.resolve_char_pr(
            0,
            Formats::default().with_bold().with_italic(),
            None,
            None,
        );

        // template max is 7; every synthesized id exceeds it, no collisions
        assert_eq!((bold, italic, both), (8, 9, 10));
    }

    #[test]
    fn test_three_distinct_combinations_three_records() {
        let mut registry = registry();

        for _ in 0..2 {
            registry.resolve_char_pr(0, Formats::default().with_bold(), None, None);
            registry.resolve_char_pr(0, Formats::default().with_italic(), None, None);
            registry.resolve_char_pr(
                0,
                Formats::default().with_bold().with_italic(),
                None,
                None,
            );
        }

        assert_eq!(registry.char_cache.len(), 3);
        assert_eq!(registry.next_char_pr_id, 11);
    }

    #[test]
    fn test_unknown_base_returned_unchanged() {
        let mut registry = registry();
        let id = registry.resolve_char_pr(99, Formats::default().with_bold(), None, None);
        assert_eq!(id, 99);
        assert_eq!(registry.next_char_pr_id, 8);
    }

    #[test]
    fn test_superscript_wins_over_subscript() {
        let mut registry = registry();

        let id = registry.resolve_char_pr(
            0,
            Formats::default().with_superscript().with_subscript(),
            None,
            None,
        );

        let record = registry.find_record("charPr", id).unwrap();
        assert!(record.child("supscript").is_some());
        assert!(record.child("subscript").is_none());
    }

    #[test]
    fn test_color_and_size_attributes() {
        let mut registry = registry();

        let id = registry.resolve_char_pr(
            0,
            Formats::default().with_underline(),
            Some("red"),
            Some("14pt"),
        );

        let record = registry.find_record("charPr", id).unwrap();
        assert_eq!(record.attr("textColor"), Some("#FF0000"));
        assert_eq!(record.attr("height"), Some("1400"));
        // underline marker inherits the text color
        let underline = record.child("underline").unwrap();
        assert_eq!(underline.attr("shape"), Some("SOLID"));
        assert_eq!(underline.attr("color"), Some("#FF0000"));
    }

    #[test]
    fn test_strikeout_defaults_to_black() {
        let mut registry = registry();

        let id = registry.resolve_char_pr(0, Formats::default().with_strikeout(), None, None);

        let record = registry.find_record("charPr", id).unwrap();
        let strikeout = record.child("strikeout").unwrap();
        assert_eq!(strikeout.attr("color"), Some("#000000"));
    }

    #[test]
    fn test_normalized_color_shares_record() {
        let mut registry = registry();

        let named = registry.resolve_char_pr(0, Formats::default(), Some("red"), None);
        let hex = registry.resolve_char_pr(0, Formats::default(), Some("#ff0000"), None);

        assert_eq!(named, hex);
    }
}
