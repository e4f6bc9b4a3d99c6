//! Table layout (hp:tbl)
//!
//! Head, body and foot rows flatten into one addressed grid; an occupancy
//! set advances the column pointer past positions claimed by spans from
//! earlier rows, so every (row, col) position is covered by exactly one
//! cell's footprint.

use std::collections::HashSet;

use super::{paragraph_shell, SectionRenderer};
use crate::tree::{Cell, Table};
use crate::xml::XmlElement;

/// Total table width: the template page's usable width
/// (59530 - 2 x 7200 HWP units)
const TABLE_TOTAL_WIDTH: i32 = 45130;

/// Default row height in HWP units
const ROW_HEIGHT: i32 = 282;

/// Fixed cell padding in HWP units
const CELL_MARGIN: i32 = 141;

impl SectionRenderer<'_> {
    /// Render one table into its hp:p/hp:run wrapper
    pub(crate) fn render_table(&mut self, table: &Table, depth: usize) -> XmlElement {
        let border_fill = self.registry.table_border_fill();
        let rows = table.flattened_rows();

        // declared width hints are not honored: columns share evenly
        let declared = table.columns.len().max(1);
        let widths = vec![TABLE_TOTAL_WIDTH / declared as i32; declared];

        let mut occupied: HashSet<(usize, usize)> = HashSet::new();
        let mut col_count = declared;
        let mut row_elements = Vec::with_capacity(rows.len());

        for (row_idx, row) in rows.iter().enumerate() {
            let mut tr = XmlElement::new("hp:tr");
            let mut col = 0;

            for cell in &row.cells {
                // skip columns claimed by spans from earlier rows
                while occupied.contains(&(row_idx, col)) {
                    col += 1;
                }
                for dr in 0..cell.row_span {
                    for dc in 0..cell.col_span {
                        occupied.insert((row_idx + dr, col + dc));
                    }
                }
                col_count = col_count.max(col + cell.col_span);

                let width: i32 = (col..col + cell.col_span)
                    .map(|c| widths.get(c).copied().unwrap_or(widths[0]))
                    .sum();
                tr.push_element(self.table_cell(cell, row_idx, col, width, border_fill, depth));
                col += cell.col_span;
            }

            row_elements.push(tr);
        }

        let row_count = rows.len();
        let mut tbl = XmlElement::new("hp:tbl")
            .with_attr("id", "")
            .with_attr("zOrder", "0")
            .with_attr("numberingType", "TABLE")
            .with_attr("textWrap", "TOP_AND_BOTTOM")
            .with_attr("textFlow", "BOTH_SIDES")
            .with_attr("lock", "0")
            .with_attr("dropcapstyle", "None")
            .with_attr("pageBreak", "CELL")
            .with_attr("repeatHeader", "1")
            .with_attr("rowCnt", row_count.to_string())
            .with_attr("colCnt", col_count.to_string())
            .with_attr("cellSpacing", "0")
            .with_attr("borderFillIDRef", border_fill.to_string())
            .with_attr("noAdjust", "0")
            .with_child(
                XmlElement::new("hp:sz")
                    .with_attr("width", TABLE_TOTAL_WIDTH.to_string())
                    .with_attr("widthRelTo", "ABSOLUTE")
                    .with_attr("height", (ROW_HEIGHT * row_count.max(1) as i32).to_string())
                    .with_attr("heightRelTo", "ABSOLUTE")
                    .with_attr("protect", "0"),
            )
            .with_child(
                XmlElement::new("hp:outMargin")
                    .with_attr("left", "0")
                    .with_attr("right", "0")
                    .with_attr("top", "0")
                    .with_attr("bottom", "0"),
            )
            .with_child(
                XmlElement::new("hp:inMargin")
                    .with_attr("left", CELL_MARGIN.to_string())
                    .with_attr("right", CELL_MARGIN.to_string())
                    .with_attr("top", CELL_MARGIN.to_string())
                    .with_attr("bottom", CELL_MARGIN.to_string()),
            );
        for tr in row_elements {
            tbl.push_element(tr);
        }

        // tables live inside a run of an anchoring paragraph
        let normal_para = self.registry.normal_para_pr_id();
        let normal_style = self.registry.normal_style_id();
        paragraph_shell(normal_para, normal_style).with_child(
            XmlElement::new("hp:run")
                .with_attr("charPrIDRef", "0")
                .with_child(tbl),
        )
    }

    /// One hp:tc with its address, span, size, margins and rendered content
    fn table_cell(
        &mut self,
        cell: &Cell,
        row: usize,
        col: usize,
        width: i32,
        border_fill: u32,
        depth: usize,
    ) -> XmlElement {
        let mut sub_list = XmlElement::new("hp:subList")
            .with_attr("id", "")
            .with_attr("textDirection", "HORIZONTAL")
            .with_attr("lineWrap", "BREAK")
            .with_attr("vertAlign", "CENTER")
            .with_attr("linkListIDRef", "0")
            .with_attr("linkListNextIDRef", "0")
            .with_attr("textWidth", "0")
            .with_attr("textHeight", "0")
            .with_attr("hasTextRef", "0")
            .with_attr("hasNumRef", "0");

        let mut content = self.render_blocks(&cell.blocks, depth + 1);
        if content.is_empty() {
            // a cell needs at least one paragraph to stay well-formed
            let para = paragraph_shell(
                self.registry.normal_para_pr_id(),
                self.registry.normal_style_id(),
            )
            .with_child(
                XmlElement::new("hp:run")
                    .with_attr("charPrIDRef", "0")
                    .with_child(XmlElement::new("hp:t")),
            );
            content.push(para);
        }
        for block in content {
            sub_list.push_element(block);
        }

        XmlElement::new("hp:tc")
            .with_attr("name", "")
            .with_attr("header", "0")
            .with_attr("hasMargin", "1")
            .with_attr("protect", "0")
            .with_attr("editable", "0")
            .with_attr("dirty", "0")
            .with_attr("borderFillIDRef", border_fill.to_string())
            .with_child(sub_list)
            .with_child(
                XmlElement::new("hp:cellAddr")
                    .with_attr("colAddr", col.to_string())
                    .with_attr("rowAddr", row.to_string()),
            )
            .with_child(
                XmlElement::new("hp:cellSpan")
                    .with_attr("colSpan", cell.col_span.to_string())
                    .with_attr("rowSpan", cell.row_span.to_string()),
            )
            .with_child(
                XmlElement::new("hp:cellSz")
                    .with_attr("width", width.to_string())
                    .with_attr("height", ROW_HEIGHT.to_string()),
            )
            .with_child(
                XmlElement::new("hp:cellMargin")
                    .with_attr("left", CELL_MARGIN.to_string())
                    .with_attr("right", CELL_MARGIN.to_string())
                    .with_attr("top", CELL_MARGIN.to_string())
                    .with_attr("bottom", CELL_MARGIN.to_string()),
            )
    }
}
