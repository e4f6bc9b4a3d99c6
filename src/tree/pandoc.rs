//! Pandoc JSON AST ingestion
//!
//! Maps the tagged-variant JSON Pandoc emits (`pandoc -t json`) onto the
//! [`Block`]/[`Inline`] tree. A document without a `blocks` array is an
//! upstream parse failure; individual node kinds with no rendering rule are
//! dropped silently and logged at debug level.

use log::debug;
use serde_json::Value;

use super::{Attr, Block, Cell, ColSpec, Inline, ListItem, Row, Table, TableBody};
use crate::error::{Error, Result};

/// Parse a full Pandoc JSON document into the block tree
pub fn blocks_from_json(json: &str) -> Result<Vec<Block>> {
    let doc: Value = serde_json::from_str(json)?;
    let blocks = doc
        .get("blocks")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Parse("Pandoc document has no blocks array".into()))?;
    Ok(parse_blocks(blocks))
}

/// Parse a sequence of block values, dropping unsupported kinds
pub fn parse_blocks(values: &[Value]) -> Vec<Block> {
    values.iter().filter_map(parse_block).collect()
}

fn parse_block(value: &Value) -> Option<Block> {
    let tag = value.get("t")?.as_str()?;
    let content = value.get("c");

    match tag {
        "Para" => Some(Block::Paragraph(parse_inlines(content?.as_array()?))),
        "Plain" => Some(Block::Plain(parse_inlines(content?.as_array()?))),
        "Header" => {
            // c = [level, attr, inlines]
            let parts = content?.as_array()?;
            let level = parts.first()?.as_u64()? as u8;
            let inlines = parse_inlines(parts.get(2)?.as_array()?);
            Some(Block::Heading { level, inlines })
        }
        "BulletList" => {
            let items = parse_list_items(content?.as_array()?);
            Some(Block::BulletList(items))
        }
        "OrderedList" => {
            // c = [[start, numberStyle, numberDelim], [items]]
            let parts = content?.as_array()?;
            let attrs = parts.first()?.as_array()?;
            let start = attrs.first().and_then(Value::as_i64).unwrap_or(1);
            let items = parse_list_items(parts.get(1)?.as_array()?);
            Some(Block::OrderedList { start, items })
        }
        "Table" => parse_table(content?.as_array()?).map(Block::Table),
        other => {
            debug!("dropping unsupported block node: {}", other);
            None
        }
    }
}

fn parse_list_items(values: &[Value]) -> Vec<ListItem> {
    values
        .iter()
        .filter_map(Value::as_array)
        .map(|blocks| parse_blocks(blocks))
        .collect()
}

fn parse_inlines(values: &[Value]) -> Vec<Inline> {
    values.iter().filter_map(parse_inline).collect()
}

fn parse_inline(value: &Value) -> Option<Inline> {
    let tag = value.get("t")?.as_str()?;
    let content = value.get("c");

    match tag {
        "Str" => Some(Inline::Text(content?.as_str()?.to_string())),
        "Space" | "SoftBreak" => Some(Inline::Space),
        "LineBreak" => Some(Inline::LineBreak),
        "Strong" => Some(Inline::Strong(parse_inlines(content?.as_array()?))),
        "Emph" => Some(Inline::Emphasis(parse_inlines(content?.as_array()?))),
        "Underline" => Some(Inline::Underline(parse_inlines(content?.as_array()?))),
        "Strikeout" => Some(Inline::Strikeout(parse_inlines(content?.as_array()?))),
        "Superscript" => Some(Inline::Superscript(parse_inlines(content?.as_array()?))),
        "Subscript" => Some(Inline::Subscript(parse_inlines(content?.as_array()?))),
        "Span" => {
            // c = [attr, inlines]
            let parts = content?.as_array()?;
            let attr = parse_attr(parts.first()?);
            let inlines = parse_inlines(parts.get(1)?.as_array()?);
            Some(Inline::Span(attr, inlines))
        }
        "Link" => {
            // c = [attr, inlines, [url, title]] - rendered as its visible text
            let parts = content?.as_array()?;
            let attr = parse_attr(parts.first()?);
            let inlines = parse_inlines(parts.get(1)?.as_array()?);
            Some(Inline::Span(attr, inlines))
        }
        "Code" => {
            // c = [attr, text]
            let parts = content?.as_array()?;
            Some(Inline::Text(parts.get(1)?.as_str()?.to_string()))
        }
        other => {
            debug!("dropping unsupported inline node: {}", other);
            None
        }
    }
}

fn parse_attr(value: &Value) -> Attr {
    // attr = [id, [classes], [[key, value]]]
    let parts = match value.as_array() {
        Some(p) => p,
        None => return Attr::default(),
    };

    let id = parts
        .first()
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let classes = parts
        .get(1)
        .and_then(Value::as_array)
        .map(|c| {
            c.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let pairs = parts
        .get(2)
        .and_then(Value::as_array)
        .map(|kvs| {
            kvs.iter()
                .filter_map(Value::as_array)
                .filter_map(|kv| {
                    Some((kv.first()?.as_str()?.to_string(), kv.get(1)?.as_str()?.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    Attr { id, classes, pairs }
}

/// Parse a Pandoc table
///
/// c = [attr, caption, colspecs, head, bodies, foot]
fn parse_table(parts: &[Value]) -> Option<Table> {
    let columns = parts
        .get(2)?
        .as_array()?
        .iter()
        .map(parse_colspec)
        .collect();

    // TableHead / TableFoot = [attr, rows]
    let head = parts
        .get(3)?
        .as_array()
        .and_then(|h| h.get(1))
        .and_then(Value::as_array)
        .map(|rows| parse_rows(rows))
        .unwrap_or_default();

    let bodies = parts
        .get(4)?
        .as_array()?
        .iter()
        .filter_map(parse_table_body)
        .collect();

    let foot = parts
        .get(5)?
        .as_array()
        .and_then(|f| f.get(1))
        .and_then(Value::as_array)
        .map(|rows| parse_rows(rows))
        .unwrap_or_default();

    Some(Table {
        columns,
        head,
        bodies,
        foot,
    })
}

fn parse_colspec(value: &Value) -> ColSpec {
    // colspec = [alignment, colwidth]; colwidth = ColWidthDefault | ColWidth(f)
    let width = value
        .as_array()
        .and_then(|parts| parts.get(1))
        .and_then(|w| {
            if w.get("t")?.as_str()? == "ColWidth" {
                w.get("c")?.as_f64()
            } else {
                None
            }
        });
    ColSpec { width }
}

fn parse_table_body(value: &Value) -> Option<TableBody> {
    // body = [attr, rowHeadColumns, intermediateHeadRows, rows]
    let parts = value.as_array()?;
    Some(TableBody {
        head: parts
            .get(2)
            .and_then(Value::as_array)
            .map(|rows| parse_rows(rows))
            .unwrap_or_default(),
        rows: parts
            .get(3)
            .and_then(Value::as_array)
            .map(|rows| parse_rows(rows))
            .unwrap_or_default(),
    })
}

fn parse_rows(values: &[Value]) -> Vec<Row> {
    values
        .iter()
        .filter_map(|row| {
            // row = [attr, cells]
            let cells = row.as_array()?.get(1)?.as_array()?;
            Some(Row {
                cells: cells.iter().filter_map(parse_cell).collect(),
            })
        })
        .collect()
}

fn parse_cell(value: &Value) -> Option<Cell> {
    // cell = [attr, alignment, rowSpan, colSpan, blocks]
    let parts = value.as_array()?;
    Some(Cell {
        row_span: parts.get(2).and_then(Value::as_u64).unwrap_or(1).max(1) as usize,
        col_span: parts.get(3).and_then(Value::as_u64).unwrap_or(1).max(1) as usize,
        blocks: parts
            .get(4)
            .and_then(Value::as_array)
            .map(|blocks| parse_blocks(blocks))
            .unwrap_or_default(),
    })
}
