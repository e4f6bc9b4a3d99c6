//! Property registry (header.xml)
//!
//! Parses the template's property-definition document into an element tree
//! and tracks, per collection, the highest id seen so synthesized records
//! always allocate above the template. Ids are never reused, even when two
//! synthesized records would be identical - deduplication is cache-driven.
//!
//! One registry instance belongs to exactly one conversion run; concurrent
//! conversions need independent registries seeded from independent template
//! copies.

mod char_pr;
mod numbering;
mod para_pr;

pub use char_pr::Formats;
pub use numbering::ListKind;

use log::warn;
use std::collections::HashMap;

use crate::error::Result;
use crate::xml::XmlElement;

use char_pr::CharKey;

/// In-memory header.xml with per-collection id allocation and resolution
/// caches
#[derive(Debug)]
pub struct HeaderRegistry {
    /// Parsed header document
    root: XmlElement,
    /// Style id of the "Normal" (바탕글) paragraph style
    pub(crate) normal_style_id: u32,
    /// paraPr id referenced by the Normal style
    pub(crate) normal_para_pr_id: u32,
    /// Next ids, seeded one past each collection's template maximum
    pub(crate) next_char_pr_id: u32,
    pub(crate) next_para_pr_id: u32,
    pub(crate) next_border_fill_id: u32,
    pub(crate) next_numbering_id: u32,
    /// Character-property resolution cache
    pub(crate) char_cache: HashMap<CharKey, u32>,
    /// Paragraph-property resolution cache, keyed by converted indent pair
    pub(crate) para_cache: HashMap<(i32, i32), u32>,
    /// List paragraph-property cache, keyed by (numbering id, level)
    pub(crate) list_para_cache: HashMap<(u32, u8), u32>,
    /// Lazily created table border/fill record, shared for the whole run
    table_border_fill: Option<u32>,
}

impl HeaderRegistry {
    /// Parse a template header.xml
    ///
    /// Missing styles or collections degrade to defaults; only malformed XML
    /// is fatal.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let root = XmlElement::parse(xml)?;

        let mut normal_style_id = 0;
        let mut normal_para_pr_id = 1;
        let mut found_normal = false;
        root.for_each_descendant("style", &mut |style| {
            let is_normal = style.attr("name") == Some("바탕글")
                || style.attr("engName") == Some("Normal");
            if is_normal && !found_normal {
                found_normal = true;
                normal_style_id = style.attr_u32("id").unwrap_or(0);
                if let Some(para_pr) = style.attr_u32("paraPrIDRef") {
                    normal_para_pr_id = para_pr;
                }
            }
        });
        if !found_normal {
            warn!("template has no Normal paragraph style, assuming style 0 / paraPr 1");
        }

        Ok(Self {
            normal_style_id,
            normal_para_pr_id,
            next_char_pr_id: max_record_id(&root, "charPr") + 1,
            next_para_pr_id: max_record_id(&root, "paraPr") + 1,
            next_border_fill_id: max_record_id(&root, "borderFill") + 1,
            next_numbering_id: max_record_id(&root, "numbering") + 1,
            char_cache: HashMap::new(),
            para_cache: HashMap::new(),
            list_para_cache: HashMap::new(),
            table_border_fill: None,
            root,
        })
    }

    /// Style id of the Normal paragraph style
    pub fn normal_style_id(&self) -> u32 {
        self.normal_style_id
    }

    /// paraPr id of the Normal paragraph style
    pub fn normal_para_pr_id(&self) -> u32 {
        self.normal_para_pr_id
    }

    /// Find a record by collection-local name and id
    pub(crate) fn find_record(&self, local: &str, id: u32) -> Option<&XmlElement> {
        self.root
            .find_descendant(&|e| e.local_name() == local && e.attr_u32("id") == Some(id))
    }

    /// Get a collection container, creating it when the template lacks one
    pub(crate) fn collection_mut(&mut self, name: &str) -> &mut XmlElement {
        let local = name.rsplit(':').next().unwrap_or(name).to_string();
        let exists = self
            .root
            .find_descendant(&|e| e.local_name() == local)
            .is_some();
        if !exists {
            warn!("template header has no {} collection, creating one", local);
            let parent = match self.root.child_mut("refList") {
                Some(ref_list) => ref_list,
                None => &mut self.root,
            };
            parent.push_element(XmlElement::new(name));
        }
        self.root
            .find_descendant_mut(&|e| e.local_name() == local)
            .expect("collection just ensured")
    }

    /// Id of the shared table border/fill record, created on first use
    pub fn table_border_fill(&mut self) -> u32 {
        if let Some(id) = self.table_border_fill {
            return id;
        }

        let id = self.next_border_fill_id;
        self.next_border_fill_id += 1;

        let solid = |name: &str| {
            XmlElement::new(name)
                .with_attr("type", "SOLID")
                .with_attr("width", "0.12 mm")
                .with_attr("color", "#000000")
        };
        let record = XmlElement::new("hh:borderFill")
            .with_attr("id", id.to_string())
            .with_attr("threeD", "0")
            .with_attr("shadow", "0")
            .with_attr("centerLine", "NONE")
            .with_attr("breakCellSeparateLine", "0")
            .with_child(
                XmlElement::new("hh:slash")
                    .with_attr("type", "NONE")
                    .with_attr("Crooked", "0")
                    .with_attr("isCounter", "0"),
            )
            .with_child(
                XmlElement::new("hh:backSlash")
                    .with_attr("type", "NONE")
                    .with_attr("Crooked", "0")
                    .with_attr("isCounter", "0"),
            )
            .with_child(solid("hh:leftBorder"))
            .with_child(solid("hh:rightBorder"))
            .with_child(solid("hh:topBorder"))
            .with_child(solid("hh:bottomBorder"))
            .with_child(
                XmlElement::new("hh:diagonal")
                    .with_attr("type", "SOLID")
                    .with_attr("width", "0.1 mm")
                    .with_attr("color", "#000000"),
            );

        self.collection_mut("hh:borderFills").push_element(record);
        self.table_border_fill = Some(id);
        id
    }

    /// Serialize the mutated header with refreshed per-collection item counts
    pub fn to_xml(&mut self) -> Result<String> {
        for (container, record) in [
            ("charProperties", "charPr"),
            ("paraProperties", "paraPr"),
            ("borderFills", "borderFill"),
            ("numberings", "numbering"),
        ] {
            if let Some(coll) = self
                .root
                .find_descendant_mut(&|e| e.local_name() == container)
            {
                let count = coll.elements().filter(|e| e.local_name() == record).count();
                coll.set_attr("itemCnt", count.to_string());
            }
        }
        self.root.to_document_xml()
    }
}

/// Highest record id in a collection, 0 when the collection is absent
fn max_record_id(root: &XmlElement, local: &str) -> u32 {
    let mut max = 0;
    root.for_each_descendant(local, &mut |record| {
        if let Some(id) = record.attr_u32("id") {
            max = max.max(id);
        }
    });
    max
}

#[cfg(test)]
pub(crate) const TEST_HEADER: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<hh:head xmlns:hh="http://www.hancom.co.kr/hwpml/2011/head" xmlns:hc="http://www.hancom.co.kr/hwpml/2011/core" version="1.4" secCnt="1">
  <hh:refList>
    <hh:borderFills itemCnt="2">
      <hh:borderFill id="1" threeD="0" shadow="0" centerLine="NONE" breakCellSeparateLine="0"/>
      <hh:borderFill id="2" threeD="0" shadow="0" centerLine="NONE" breakCellSeparateLine="0"/>
    </hh:borderFills>
    <hh:charProperties itemCnt="2">
      <hh:charPr id="0" height="1000" textColor="#000000" shadeColor="none" useFontSpace="0" useKerning="0" symMark="NONE" borderFillIDRef="2"/>
      <hh:charPr id="7" height="1000" textColor="#000000" shadeColor="none" useFontSpace="0" useKerning="0" symMark="NONE" borderFillIDRef="2"/>
    </hh:charProperties>
    <hh:paraProperties itemCnt="2">
      <hh:paraPr id="0" tabPrIDRef="0" condense="0" fontLineHeight="0" snapToGrid="1" suppressLineNumbers="0" checked="0">
        <hh:align horizontal="JUSTIFY" vertical="BASELINE"/>
        <hh:margin>
          <hc:intent value="0" unit="HWPUNIT"/>
          <hc:left value="0" unit="HWPUNIT"/>
          <hc:right value="0" unit="HWPUNIT"/>
        </hh:margin>
      </hh:paraPr>
      <hh:paraPr id="1" tabPrIDRef="0" condense="0" fontLineHeight="0" snapToGrid="1" suppressLineNumbers="0" checked="0">
        <hh:margin>
          <hc:intent value="0" unit="HWPUNIT"/>
          <hc:left value="0" unit="HWPUNIT"/>
        </hh:margin>
      </hh:paraPr>
    </hh:paraProperties>
    <hh:styles itemCnt="3">
      <hh:style id="0" type="PARA" name="바탕글" engName="Normal" paraPrIDRef="1" charPrIDRef="0" nextStyleIDRef="0" langID="1042" lockForm="0"/>
      <hh:style id="1" type="PARA" name="개요 1" engName="Outline 1" paraPrIDRef="0" charPrIDRef="0" nextStyleIDRef="1" langID="1042" lockForm="0"/>
      <hh:style id="2" type="PARA" name="개요 2" engName="Outline 2" paraPrIDRef="0" charPrIDRef="0" nextStyleIDRef="2" langID="1042" lockForm="0"/>
    </hh:styles>
  </hh:refList>
</hh:head>"##;
