//! Section body rendering (section0.xml)
//!
//! Walks the structured document tree and emits paragraph/run markup that
//! references only registry-resident property ids. Formatting state flows
//! down the inline recursion by copy, so a sibling subtree can never leak
//! formats into the next.

mod table;

use log::warn;

use crate::error::Result;
use crate::header::{Formats, HeaderRegistry, ListKind};
use crate::srcmap::IndentMap;
use crate::tree::{plain_text, Attr, Block, Inline, ListItem};
use crate::xml::XmlElement;

/// HWPML namespace for paragraph content
pub const NS_PARAGRAPH: &str = "http://www.hancom.co.kr/hwpml/2011/paragraph";
/// HWPML namespace for sections
pub const NS_SECTION: &str = "http://www.hancom.co.kr/hwpml/2011/section";

/// Nesting bound for block and inline recursion; deeper subtrees are dropped
const MAX_DEPTH: usize = 64;

/// Inherited inline formatting, copied before every descent
#[derive(Clone, Debug, Default)]
struct InlineState {
    formats: Formats,
    color: Option<String>,
    size: Option<String>,
}

/// Renders the block tree against one property registry
pub struct SectionRenderer<'a> {
    registry: &'a mut HeaderRegistry,
    indents: Option<&'a IndentMap>,
}

impl<'a> SectionRenderer<'a> {
    /// Create a renderer borrowing the run's registry and the optional
    /// source-markup indent map
    pub fn new(registry: &'a mut HeaderRegistry, indents: Option<&'a IndentMap>) -> Self {
        Self { registry, indents }
    }

    /// Render a block sequence into body elements
    pub fn render(&mut self, blocks: &[Block]) -> Vec<XmlElement> {
        self.render_blocks(blocks, 0)
    }

    fn render_blocks(&mut self, blocks: &[Block], depth: usize) -> Vec<XmlElement> {
        let mut out = Vec::new();
        for block in blocks {
            self.render_block(block, depth, &mut out);
        }
        out
    }

    fn render_block(&mut self, block: &Block, depth: usize, out: &mut Vec<XmlElement>) {
        if depth >= MAX_DEPTH {
            warn!("dropping block nested deeper than {} levels", MAX_DEPTH);
            return;
        }

        match block {
            Block::Paragraph(inlines) | Block::Plain(inlines) => {
                let para_pr = self.paragraph_para_pr(inlines);
                out.push(self.paragraph(inlines, self.registry.normal_style_id(), para_pr, depth));
            }
            Block::Heading { level, inlines } => {
                let style = (*level).clamp(1, 6) as u32;
                let para_pr = self.registry.normal_para_pr_id();
                out.push(self.paragraph(inlines, style, para_pr, depth));
            }
            Block::BulletList(items) => {
                self.render_list(ListKind::Bullet, 1, items, 0, depth, out);
            }
            Block::OrderedList { start, items } => {
                self.render_list(ListKind::Ordered, *start, items, 0, depth, out);
            }
            Block::Table(table) => {
                out.push(self.render_table(table, depth));
            }
        }
    }

    /// Indentation for a plain paragraph: best-effort correlation against
    /// the raw source markup, Normal otherwise
    fn paragraph_para_pr(&mut self, inlines: &[Inline]) -> u32 {
        let indent = self
            .indents
            .and_then(|map| map.lookup(&plain_text(inlines)));
        match indent {
            Some(indent) => self
                .registry
                .resolve_para_pr(indent.left_pt, indent.first_line_pt),
            None => self.registry.normal_para_pr_id(),
        }
    }

    /// One list node: a fresh numbering definition, then one paragraph per
    /// item block, recursing into nested lists with level + 1
    fn render_list(
        &mut self,
        kind: ListKind,
        start: i64,
        items: &[ListItem],
        level: u8,
        depth: usize,
        out: &mut Vec<XmlElement>,
    ) {
        if depth >= MAX_DEPTH {
            warn!("dropping list nested deeper than {} levels", MAX_DEPTH);
            return;
        }

        let num_id = self.registry.create_numbering(kind, start);

        for item in items {
            for block in item {
                match block {
                    Block::Paragraph(inlines) | Block::Plain(inlines) => {
                        let para_pr = self.registry.list_para_pr(num_id, level);
                        let style = self.registry.normal_style_id();
                        out.push(self.paragraph(inlines, style, para_pr, depth));
                    }
                    Block::BulletList(nested) => {
                        self.render_list(ListKind::Bullet, 1, nested, level + 1, depth + 1, out);
                    }
                    Block::OrderedList { start, items: nested } => {
                        self.render_list(ListKind::Ordered, *start, nested, level + 1, depth + 1, out);
                    }
                    other => self.render_block(other, depth + 1, out),
                }
            }
        }
    }

    /// Build one hp:p with its runs
    fn paragraph(
        &mut self,
        inlines: &[Inline],
        style_id: u32,
        para_pr_id: u32,
        depth: usize,
    ) -> XmlElement {
        let mut para = paragraph_shell(para_pr_id, style_id);
        let runs = self.render_inlines(inlines, &InlineState::default(), depth);
        if runs.is_empty() {
            para.push_element(empty_run());
        }
        for run in runs {
            para.push_element(run);
        }
        para
    }

    fn render_inlines(
        &mut self,
        inlines: &[Inline],
        state: &InlineState,
        depth: usize,
    ) -> Vec<XmlElement> {
        if depth >= MAX_DEPTH {
            warn!("dropping inline content nested deeper than {} levels", MAX_DEPTH);
            return Vec::new();
        }

        let mut out = Vec::new();
        for inline in inlines {
            match inline {
                Inline::Text(text) => out.push(self.text_run(state, text)),
                Inline::Space => out.push(self.text_run(state, " ")),
                Inline::LineBreak => out.push(XmlElement::new("hp:lineseg")),
                Inline::Strong(children) => {
                    let mut next = state.clone();
                    next.formats.bold = true;
                    out.extend(self.render_inlines(children, &next, depth + 1));
                }
                Inline::Emphasis(children) => {
                    let mut next = state.clone();
                    next.formats.italic = true;
                    out.extend(self.render_inlines(children, &next, depth + 1));
                }
                Inline::Underline(children) => {
                    let mut next = state.clone();
                    next.formats.underline = true;
                    out.extend(self.render_inlines(children, &next, depth + 1));
                }
                Inline::Strikeout(children) => {
                    let mut next = state.clone();
                    next.formats.strikeout = true;
                    out.extend(self.render_inlines(children, &next, depth + 1));
                }
                Inline::Superscript(children) => {
                    let mut next = state.clone();
                    next.formats.superscript = true;
                    out.extend(self.render_inlines(children, &next, depth + 1));
                }
                Inline::Subscript(children) => {
                    let mut next = state.clone();
                    next.formats.subscript = true;
                    out.extend(self.render_inlines(children, &next, depth + 1));
                }
                Inline::Span(attr, children) => {
                    let next = span_state(attr, state);
                    out.extend(self.render_inlines(children, &next, depth + 1));
                }
            }
        }
        out
    }

    /// One hp:run carrying text under the resolved character property
    fn text_run(&mut self, state: &InlineState, text: &str) -> XmlElement {
        let char_pr = self.registry.resolve_char_pr(
            0,
            state.formats,
            state.color.as_deref(),
            state.size.as_deref(),
        );
        XmlElement::new("hp:run")
            .with_attr("charPrIDRef", char_pr.to_string())
            .with_child(XmlElement::new("hp:t").with_text(text))
    }
}

/// Apply a span's recognized style attributes over the inherited state,
/// for its subtree only
fn span_state(attr: &Attr, state: &InlineState) -> InlineState {
    let mut next = state.clone();
    let Some(style) = attr.get("style") else {
        return next;
    };

    for declaration in style.split(';') {
        let Some((key, value)) = declaration.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "color" => next.color = Some(value.to_string()),
            "font-size" => next.size = Some(value.to_string()),
            "font-weight" => {
                let lowered = value.to_ascii_lowercase();
                if lowered.contains("bold") || matches!(lowered.as_str(), "700" | "800" | "900") {
                    next.formats.bold = true;
                }
            }
            "font-style" => {
                if value.to_ascii_lowercase().contains("italic") {
                    next.formats.italic = true;
                }
            }
            "text-decoration" => {
                let lowered = value.to_ascii_lowercase();
                if lowered.contains("underline") {
                    next.formats.underline = true;
                }
                if lowered.contains("line-through") {
                    next.formats.strikeout = true;
                }
            }
            _ => {}
        }
    }
    next
}

/// Empty hp:p shell with the standard paragraph attributes
pub(crate) fn paragraph_shell(para_pr_id: u32, style_id: u32) -> XmlElement {
    XmlElement::new("hp:p")
        .with_attr("paraPrIDRef", para_pr_id.to_string())
        .with_attr("styleIDRef", style_id.to_string())
        .with_attr("pageBreak", "0")
        .with_attr("columnBreak", "0")
        .with_attr("merged", "0")
}

/// Run with an empty text element, keeping empty paragraphs well-formed
fn empty_run() -> XmlElement {
    XmlElement::new("hp:run")
        .with_attr("charPrIDRef", "0")
        .with_child(XmlElement::new("hp:t"))
}

/// Section-properties paragraph cloned from the reference template's page
/// setup (A4 portrait, 7200-unit side margins)
const SECTION_PRELUDE: &str = r##"<hp:p paraPrIDRef="1" styleIDRef="0" pageBreak="0" columnBreak="0" merged="0" xmlns:hp="http://www.hancom.co.kr/hwpml/2011/paragraph">
  <hp:run charPrIDRef="0">
    <hp:secPr id="" textDirection="HORIZONTAL" spaceColumns="1134" tabStop="8000" tabStopVal="4000" tabStopUnit="HWPUNIT" outlineShapeIDRef="1" memoShapeIDRef="1" textVerticalWidthHead="0" masterPageCnt="0">
      <hp:grid lineGrid="0" charGrid="0" wonggojiFormat="0"/>
      <hp:startNum pageStartsOn="BOTH" page="0" pic="0" tbl="0" equation="0"/>
      <hp:visibility hideFirstHeader="0" hideFirstFooter="0" hideFirstMasterPage="0" border="SHOW_ALL" fill="SHOW_ALL" hideFirstPageNum="0" hideFirstEmptyLine="0" showLineNumber="0"/>
      <hp:lineNumberShape restartType="0" countBy="0" distance="0" startNumber="0"/>
      <hp:pagePr landscape="WIDELY" width="59530" height="84190" gutterType="LEFT_ONLY">
        <hp:margin header="4250" footer="2240" gutter="0" left="7200" right="7200" top="4255" bottom="4960"/>
      </hp:pagePr>
      <hp:footNotePr>
        <hp:autoNumFormat type="DIGIT" userChar="" prefixChar="" suffixChar="" supscript="1"/>
        <hp:noteLine length="-1" type="SOLID" width="0.25 mm" color="#000000"/>
        <hp:noteSpacing betweenNotes="283" belowLine="0" aboveLine="1000"/>
        <hp:numbering type="CONTINUOUS" newNum="1"/>
        <hp:placement place="EACH_COLUMN" beneathText="0"/>
      </hp:footNotePr>
      <hp:endNotePr>
        <hp:autoNumFormat type="ROMAN_SMALL" userChar="" prefixChar="" suffixChar="" supscript="1"/>
        <hp:noteLine length="-1" type="SOLID" width="0.25 mm" color="#000000"/>
        <hp:noteSpacing betweenNotes="0" belowLine="0" aboveLine="1000"/>
        <hp:numbering type="CONTINUOUS" newNum="1"/>
        <hp:placement place="END_OF_DOCUMENT" beneathText="0"/>
      </hp:endNotePr>
      <hp:pageBorderFill type="BOTH" borderFillIDRef="1" textBorder="PAPER" headerInside="0" footerInside="0" fillArea="PAPER">
        <hp:offset left="1417" right="1417" top="1417" bottom="1417"/>
      </hp:pageBorderFill>
      <hp:pageBorderFill type="EVEN" borderFillIDRef="1" textBorder="PAPER" headerInside="0" footerInside="0" fillArea="PAPER">
        <hp:offset left="1417" right="1417" top="1417" bottom="1417"/>
      </hp:pageBorderFill>
      <hp:pageBorderFill type="ODD" borderFillIDRef="1" textBorder="PAPER" headerInside="0" footerInside="0" fillArea="PAPER">
        <hp:offset left="1417" right="1417" top="1417" bottom="1417"/>
      </hp:pageBorderFill>
    </hp:secPr>
    <hp:ctrl>
      <hp:colPr id="" type="NEWSPAPER" layout="LEFT" colCount="1" sameSz="1" sameGap="0"/>
    </hp:ctrl>
  </hp:run>
  <hp:run charPrIDRef="0">
    <hp:t/>
  </hp:run>
</hp:p>"##;

/// Wrap rendered body elements into a complete section document
pub fn serialize_section(body: &[XmlElement]) -> Result<String> {
    let mut prelude = XmlElement::parse(SECTION_PRELUDE)?;
    // namespaces are declared on the section root
    prelude.attributes.retain(|(k, _)| !k.starts_with("xmlns"));

    let mut sec = XmlElement::new("hs:sec")
        .with_attr("xmlns:hp", NS_PARAGRAPH)
        .with_attr("xmlns:hs", NS_SECTION)
        .with_child(prelude);
    for element in body {
        sec.push_element(element.clone());
    }
    sec.to_document_xml()
}
