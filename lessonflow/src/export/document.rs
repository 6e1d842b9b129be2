//! Format-neutral document model produced by the layout and consumed by writers.

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    /// Left aligned.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Justified.
    Justified,
}

/// Paragraph style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParagraphStyle {
    /// Document title.
    Title,
    /// Section heading (A. .. E.).
    Heading1,
    /// Numbered subsection.
    Heading2,
    /// Lettered sub-subsection.
    Heading3,
    /// Body text.
    #[default]
    Body,
}

/// A run of uniformly formatted text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    /// Text.
    pub text: String,
    /// Bold.
    pub bold: bool,
    /// Single underline.
    pub underline: bool,
}

impl Run {
    /// Plain text.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Bold text.
    #[must_use]
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Self::default()
        }
    }

    /// Underlined text.
    #[must_use]
    pub fn underlined(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            underline: true,
            ..Self::default()
        }
    }
}

/// A paragraph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Runs in order.
    pub runs: Vec<Run>,
    /// Style.
    pub style: ParagraphStyle,
    /// Alignment.
    pub align: Align,
    /// Left indent in twips.
    pub indent: Option<u32>,
}

impl Paragraph {
    /// An empty spacer paragraph.
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    /// A body paragraph with one plain run.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::runs(vec![Run::plain(text)])
    }

    /// A body paragraph from runs.
    #[must_use]
    pub fn runs(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }

    /// A heading of the given style.
    #[must_use]
    pub fn heading(style: ParagraphStyle, text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::plain(text)],
            style,
            ..Self::default()
        }
    }

    /// A bold label followed by plain text.
    #[must_use]
    pub fn labeled(label: &str, value: impl Into<String>) -> Self {
        Self::runs(vec![Run::bold(format!("{label}: ")), Run::plain(value)])
    }

    /// Sets the alignment.
    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Sets the left indent.
    #[must_use]
    pub fn indent(mut self, twips: u32) -> Self {
        self.indent = Some(twips);
        self
    }

    /// Concatenated text of all runs.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    /// Paragraphs in the cell.
    pub paragraphs: Vec<Paragraph>,
}

impl Cell {
    /// A cell holding one paragraph.
    #[must_use]
    pub fn new(paragraph: Paragraph) -> Self {
        Self {
            paragraphs: vec![paragraph],
        }
    }
}

/// A table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Rows of cells.
    pub rows: Vec<Vec<Cell>>,
    /// Column widths in twips; empty means equal widths.
    pub column_widths: Vec<u32>,
    /// Whether cell borders are drawn.
    pub borders: bool,
}

/// A top-level document block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A paragraph.
    Paragraph(Paragraph),
    /// A table.
    Table(Table),
}

/// A document ready to be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Title core property.
    pub title: String,
    /// Creator core property.
    pub creator: String,
    /// Description core property.
    pub description: String,
    /// Body blocks in order.
    pub blocks: Vec<Block>,
}

impl Document {
    /// Appends a paragraph.
    pub fn push(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Appends a table.
    pub fn push_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// All paragraph texts in reading order, table cells included.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => lines.push(p.plain_text()),
                Block::Table(t) => {
                    for cell in t.rows.iter().flatten() {
                        lines.extend(cell.paragraphs.iter().map(Paragraph::plain_text));
                    }
                }
            }
        }
        lines
    }

    /// Texts of all paragraphs with `style`.
    #[must_use]
    pub fn headings(&self, style: ParagraphStyle) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) if p.style == style => Some(p.plain_text()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labeled_paragraph() {
        let p = Paragraph::labeled("Instrumen", "Tes tertulis");
        assert_eq!(p.plain_text(), "Instrumen: Tes tertulis");
        assert!(p.runs[0].bold);
        assert!(!p.runs[1].bold);
    }

    #[test]
    fn test_lines_include_table_cells() {
        let mut doc = Document::default();
        doc.push(Paragraph::heading(ParagraphStyle::Heading1, "A. Spesifikasi"));
        doc.push_table(Table {
            rows: vec![vec![Cell::new(Paragraph::text("1. Madrasah")), Cell::new(Paragraph::text(": MTs"))]],
            ..Table::default()
        });

        assert_eq!(doc.lines(), ["A. Spesifikasi", "1. Madrasah", ": MTs"]);
        assert_eq!(doc.headings(ParagraphStyle::Heading1), ["A. Spesifikasi"]);
        assert!(doc.headings(ParagraphStyle::Title).is_empty());
    }
}
