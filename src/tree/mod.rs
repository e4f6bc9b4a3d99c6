//! Structured document tree - the format-agnostic input model
//!
//! An upstream parser (Pandoc, via [`pandoc`]) produces this tree; the
//! converter only reads it. Block and inline variants mirror the subset of
//! the Pandoc AST the renderer understands.

pub mod pandoc;

/// Element attributes: identifier, class names, key/value pairs
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attr {
    /// Element identifier
    pub id: String,
    /// Class names
    pub classes: Vec<String>,
    /// Key/value attribute pairs
    pub pairs: Vec<(String, String)>,
}

impl Attr {
    /// Get a key/value attribute
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Block-level content
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Regular paragraph
    Paragraph(Vec<Inline>),
    /// Plain text block (list items, table cells)
    Plain(Vec<Inline>),
    /// Heading with level 1..=6
    Heading { level: u8, inlines: Vec<Inline> },
    /// Unordered list
    BulletList(Vec<ListItem>),
    /// Ordered list with an explicit start number
    OrderedList { start: i64, items: Vec<ListItem> },
    /// Table
    Table(Table),
}

/// One list item: a sequence of blocks
pub type ListItem = Vec<Block>;

/// Inline content
#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    /// Text run
    Text(String),
    /// Inter-word space
    Space,
    /// Hard line break
    LineBreak,
    /// Bold
    Strong(Vec<Inline>),
    /// Italic
    Emphasis(Vec<Inline>),
    /// Underline
    Underline(Vec<Inline>),
    /// Strike-through
    Strikeout(Vec<Inline>),
    /// Superscript
    Superscript(Vec<Inline>),
    /// Subscript
    Subscript(Vec<Inline>),
    /// Attributed span (carries inline CSS via its `style` attribute)
    Span(Attr, Vec<Inline>),
}

/// Table: declared columns plus head / body / foot row groups
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    /// Declared column specifications
    pub columns: Vec<ColSpec>,
    /// Header rows
    pub head: Vec<Row>,
    /// Body row groups
    pub bodies: Vec<TableBody>,
    /// Footer rows
    pub foot: Vec<Row>,
}

/// Declared column specification
///
/// Source width hints are parsed but not honored by the layout engine:
/// columns always share the table width evenly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColSpec {
    /// Relative width hint from the source, if any
    pub width: Option<f64>,
}

/// One body group: optional intermediate header rows plus main rows
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableBody {
    /// Intermediate header rows
    pub head: Vec<Row>,
    /// Main rows
    pub rows: Vec<Row>,
}

/// Table row
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    /// Cells in source order (spanned positions are not materialized)
    pub cells: Vec<Cell>,
}

/// Table cell with its span footprint
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Rows this cell covers (>= 1)
    pub row_span: usize,
    /// Columns this cell covers (>= 1)
    pub col_span: usize,
    /// Cell content
    pub blocks: Vec<Block>,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            row_span: 1,
            col_span: 1,
            blocks: Vec::new(),
        }
    }
}

impl Table {
    /// All rows in output order: head, then each body group's intermediate
    /// header rows followed by its main rows, then foot. The output format
    /// has no head/body/foot sectioning, only a flat addressed grid.
    pub fn flattened_rows(&self) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self.head.iter().collect();
        for body in &self.bodies {
            rows.extend(body.head.iter());
            rows.extend(body.rows.iter());
        }
        rows.extend(self.foot.iter());
        rows
    }
}

/// Extract the plain text of a sequence of inlines
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    push_plain_text(inlines, &mut out);
    out
}

fn push_plain_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) => out.push_str(t),
            Inline::Space => out.push(' '),
            Inline::LineBreak => out.push('\n'),
            Inline::Strong(children)
            | Inline::Emphasis(children)
            | Inline::Underline(children)
            | Inline::Strikeout(children)
            | Inline::Superscript(children)
            | Inline::Subscript(children)
            | Inline::Span(_, children) => push_plain_text(children, out),
        }
    }
}
