//! Paragraph-property resolution
//!
//! Maps an (left indent, first-line indent) pair to a reused or freshly
//! synthesized paraPr id. The margin values are written to every descendant
//! occurrence so both the conditional and the default margin variants the
//! format requires stay in step.

use log::warn;

use super::HeaderRegistry;
use crate::units::pt_to_units;
use crate::xml::XmlElement;

impl HeaderRegistry {
    /// Resolve a paragraph-property id for the given indentation (points)
    ///
    /// A negative first-line indent is a hanging indent. Zero/zero returns
    /// the Normal paraPr unchanged.
    pub fn resolve_para_pr(&mut self, left_pt: f32, first_line_pt: f32) -> u32 {
        let left = pt_to_units(left_pt);
        let first_line = pt_to_units(first_line_pt);
        if left == 0 && first_line == 0 {
            return self.normal_para_pr_id;
        }

        if let Some(&id) = self.para_cache.get(&(left, first_line)) {
            return id;
        }

        let id = match self.synthesize_para_pr(left, first_line) {
            Some(id) => id,
            None => self.normal_para_pr_id,
        };
        self.para_cache.insert((left, first_line), id);
        id
    }

    /// Clone the Normal paraPr and apply margin values; None when the
    /// template lacks the Normal record
    fn synthesize_para_pr(&mut self, left: i32, first_line: i32) -> Option<u32> {
        let base = match self.find_record("paraPr", self.normal_para_pr_id) {
            Some(record) => record.clone(),
            None => {
                warn!(
                    "paraPr base {} not found in template, keeping Normal reference",
                    self.normal_para_pr_id
                );
                return None;
            }
        };

        let id = self.next_para_pr_id;
        self.next_para_pr_id += 1;

        let mut record = base;
        record.set_attr("id", id.to_string());
        set_margins(&mut record, left, first_line);

        self.collection_mut("hh:paraProperties").push_element(record);
        Some(id)
    }
}

/// Write indent values into every margin variant of a paraPr record,
/// creating the margin substructure when the base record has none
pub(crate) fn set_margins(record: &mut XmlElement, left: i32, first_line: i32) {
    let margin = record.ensure_child("hh:margin");
    margin.ensure_child("hc:intent");
    margin.ensure_child("hc:left");

    record.for_each_descendant_mut("intent", &mut |intent| {
        intent.set_attr("value", first_line.to_string());
        intent.set_attr("unit", "HWPUNIT");
    });
    record.for_each_descendant_mut("left", &mut |left_elem| {
        left_elem.set_attr("value", left.to_string());
        left_elem.set_attr("unit", "HWPUNIT");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::TEST_HEADER;

    fn registry() -> HeaderRegistry {
        HeaderRegistry::from_xml(TEST_HEADER).unwrap()
    }

    #[test]
    fn test_zero_zero_returns_normal() {
        let mut registry = registry();
        let before = registry.next_para_pr_id;

        let id = registry.resolve_para_pr(0.0, 0.0);

        assert_eq!(id, registry.normal_para_pr_id());
        assert_eq!(registry.next_para_pr_id, before);
    }

    #[test]
    fn test_indent_pair_is_cached() {
        let mut registry = registry();

        let first = registry.resolve_para_pr(20.0, -10.0);
        let second = registry.resolve_para_pr(20.0, -10.0);
        let other = registry.resolve_para_pr(20.0, 0.0);

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(registry.next_para_pr_id, 4);
    }

    #[test]
    fn test_margins_written_to_all_variants() {
        let mut registry = registry();

        let id = registry.resolve_para_pr(20.0, -10.0);
        let record = registry.find_record("paraPr", id).unwrap();

        let mut lefts = Vec::new();
        record.for_each_descendant("left", &mut |e| {
            lefts.push(e.attr("value").unwrap_or_default().to_string());
        });
        assert!(!lefts.is_empty());
        assert!(lefts.iter().all(|v| v == "2000"));

        let margin = record.child("margin").unwrap();
        assert_eq!(margin.child("intent").unwrap().attr("value"), Some("-1000"));
    }

    #[test]
    fn test_margin_substructure_created_when_missing() {
        let mut registry = HeaderRegistry::from_xml(
            r#"<hh:head><hh:refList>
                 <hh:paraProperties itemCnt="2">
                   <hh:paraPr id="0"/>
                   <hh:paraPr id="1"/>
                 </hh:paraProperties>
                 <hh:styles itemCnt="1">
                   <hh:style id="0" engName="Normal" paraPrIDRef="1"/>
                 </hh:styles>
               </hh:refList></hh:head>"#,
        )
        .unwrap();

        let id = registry.resolve_para_pr(10.0, 5.0);
        assert_eq!(id, 2);

        let record = registry.find_record("paraPr", id).unwrap();
        let margin = record.child("margin").unwrap();
        assert_eq!(margin.child("left").unwrap().attr("value"), Some("1000"));
        assert_eq!(margin.child("intent").unwrap().attr("value"), Some("500"));
    }
}
