//! One-run conversion orchestration
//!
//! A run owns one registry seeded from the template header and one renderer
//! over it; the two rewritten parts come out together so their property id
//! references always agree.

use log::{debug, info};
use std::path::Path;

use crate::error::Result;
use crate::header::HeaderRegistry;
use crate::package::HwpxTemplate;
use crate::section::{serialize_section, SectionRenderer};
use crate::srcmap::IndentMap;
use crate::tree::{pandoc, Block};

/// The two generated document parts of one conversion run
#[derive(Debug)]
pub struct Conversion {
    /// Rewritten Contents/header.xml
    pub header_xml: String,
    /// Rewritten Contents/section0.xml
    pub section_xml: String,
}

/// Convert a block tree against a template header
///
/// `source_html` is the raw markup the tree was derived from, when the
/// caller has it; it only feeds the best-effort paragraph-indent
/// correlation and may be omitted.
pub fn convert(
    blocks: &[Block],
    template_header_xml: &str,
    source_html: Option<&str>,
) -> Result<Conversion> {
    let mut registry = HeaderRegistry::from_xml(template_header_xml)?;

    let indents = source_html.map(IndentMap::from_markup);
    let indents = match &indents {
        Some(map) if !map.is_empty() => Some(map),
        _ => None,
    };

    let body = SectionRenderer::new(&mut registry, indents).render(blocks);
    debug!("rendered {} body elements", body.len());

    Ok(Conversion {
        section_xml: serialize_section(&body)?,
        header_xml: registry.to_xml()?,
    })
}

/// Convert a Pandoc JSON AST string
pub fn convert_json(
    pandoc_json: &str,
    template_header_xml: &str,
    source_html: Option<&str>,
) -> Result<Conversion> {
    let blocks = pandoc::blocks_from_json(pandoc_json)?;
    convert(&blocks, template_header_xml, source_html)
}

/// End-to-end file conversion: template in, document out
pub fn convert_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
    pandoc_json: &str,
    template_path: P,
    output_path: Q,
    source_html: Option<&str>,
) -> Result<()> {
    let template = HwpxTemplate::open(template_path)?;
    let conversion = convert_json(pandoc_json, &template.header_xml()?, source_html)?;
    template.save(output_path.as_ref(), &conversion.header_xml, &conversion.section_xml)?;
    info!("wrote {}", output_path.as_ref().display());
    Ok(())
}
