//! # hwpx-compose
//!
//! Converts a structured document tree into an HWPX (Hancom Office)
//! document by rewriting the two generated parts of a template package:
//! the property definitions (`Contents/header.xml`) and the section body
//! (`Contents/section0.xml`). Every other template entry is preserved
//! byte for byte.
//!
//! ## Features
//!
//! - Pandoc JSON AST ingestion into a format-agnostic block/inline tree
//! - Cache-driven property synthesis: records are cloned from the
//!   template's own definitions, ids allocated above the template maxima
//! - Tables with row/column spans laid out on an occupancy grid
//! - Per-list numbering definitions with level-cycled markers
//! - Best-effort paragraph-indent recovery from the raw HTML source
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hwpx_compose::{convert_to_file, HwpxTemplate};
//!
//! // One call: Pandoc JSON + template in, document out
//! convert_to_file(&pandoc_json, "template.hwpx", "out.hwpx", None)?;
//!
//! // Or drive the parts yourself
//! let template = HwpxTemplate::open("template.hwpx")?;
//! let result = hwpx_compose::convert_json(&pandoc_json, &template.header_xml()?, None)?;
//! template.save("out.hwpx", &result.header_xml, &result.section_xml)?;
//! ```

pub mod convert;
pub mod error;
pub mod header;
pub mod package;
pub mod section;
pub mod srcmap;
pub mod tree;
pub mod units;
pub mod xml;

pub use convert::{convert, convert_json, convert_to_file, Conversion};
pub use error::{Error, Result};
pub use header::HeaderRegistry;
pub use package::HwpxTemplate;
pub use section::SectionRenderer;
pub use srcmap::IndentMap;
pub use tree::{Block, Inline};
