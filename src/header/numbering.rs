//! List numbering definitions
//!
//! Every list node gets its own numbering definition, even when sibling
//! lists would look identical - restart semantics in the output format hang
//! off the definition, so sharing one would chain unrelated lists together.

use super::HeaderRegistry;
use crate::xml::XmlElement;

/// Kind of list a numbering definition renders
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListKind {
    /// Unordered: filled circle, hollow circle, filled square, repeating
    Bullet,
    /// Ordered: digit, upper-case letter, lower-case roman, repeating
    Ordered,
}

/// Levels carried by one numbering definition
const LEVEL_COUNT: u8 = 7;

/// Marker glyph progression for bullet levels
const BULLET_GLYPHS: [&str; 3] = ["\u{25CF}", "\u{25CB}", "\u{25A0}"];

/// Number format progression for ordered levels
const ORDERED_FORMATS: [&str; 3] = ["DIGIT", "LATIN_CAPITAL", "ROMAN_SMALL"];

impl HeaderRegistry {
    /// Allocate a fresh numbering definition for one list node
    ///
    /// `start` is honored for ordered lists (the list's own start number);
    /// bullets ignore it.
    pub fn create_numbering(&mut self, kind: ListKind, start: i64) -> u32 {
        let id = self.next_numbering_id;
        self.next_numbering_id += 1;

        let start = if kind == ListKind::Ordered { start } else { 1 };
        let mut numbering = XmlElement::new("hh:numbering")
            .with_attr("id", id.to_string())
            .with_attr("start", start.to_string());

        for level in 1..=LEVEL_COUNT {
            numbering.push_element(para_head(kind, level));
        }

        self.collection_mut("hh:numberings").push_element(numbering);
        id
    }

    /// Paragraph-property variant for one (numbering, level) pair
    ///
    /// Clones the Normal paraPr, points its heading at the numbering
    /// definition and applies level-scaled indentation with a fixed hanging
    /// offset. Reused for every item on the same level of the same list.
    pub fn list_para_pr(&mut self, num_id: u32, level: u8) -> u32 {
        if let Some(&id) = self.list_para_cache.get(&(num_id, level)) {
            return id;
        }

        let base = match self.find_record("paraPr", self.normal_para_pr_id) {
            Some(record) => record.clone(),
            None => return self.normal_para_pr_id,
        };

        let id = self.next_para_pr_id;
        self.next_para_pr_id += 1;

        let mut record = base;
        record.set_attr("id", id.to_string());

        let heading = record.ensure_child("hh:heading");
        heading.set_attr("type", "NUMBER");
        heading.set_attr("idRef", num_id.to_string());
        heading.set_attr("level", level.to_string());

        const INDENT_PER_LEVEL: i32 = 2000;
        super::para_pr::set_margins(
            &mut record,
            (level as i32 + 1) * INDENT_PER_LEVEL,
            -INDENT_PER_LEVEL,
        );

        self.collection_mut("hh:paraProperties").push_element(record);
        self.list_para_cache.insert((num_id, level), id);
        id
    }
}

/// Build one level descriptor
fn para_head(kind: ListKind, level: u8) -> XmlElement {
    let cycle = ((level - 1) % 3) as usize;
    let (num_format, text) = match kind {
        ListKind::Bullet => ("DIGIT", BULLET_GLYPHS[cycle].to_string()),
        ListKind::Ordered => (ORDERED_FORMATS[cycle], format!("^{}.", level)),
    };

    XmlElement::new("hh:paraHead")
        .with_attr("start", "1")
        .with_attr("level", level.to_string())
        .with_attr("align", "LEFT")
        .with_attr("useInstWidth", "1")
        .with_attr("autoIndent", "0")
        .with_attr("widthAdjust", "0")
        .with_attr("textOffsetType", "PERCENT")
        .with_attr("textOffset", "50")
        .with_attr("numFormat", num_format)
        .with_attr("charPrIDRef", "4294967295")
        .with_attr("checkable", "0")
        .with_text(text)
}
