//! WordprocessingML writer.
//!
//! Produces the minimal package Word needs: content types, package and
//! document relationships, the document body, styles and core properties.

use std::io::{Cursor, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::document::{Align, Block, Document, Paragraph, ParagraphStyle, Table};
use super::layout::build_document;
use super::{DocumentExporter, ExportBundle, ExportedDocument};
use crate::errors::ExportError;

const PAGE_WIDTH: u32 = 11906;
const PAGE_HEIGHT: u32 = 16840;
const PAGE_MARGIN: u32 = 1440;
const TEXT_WIDTH: u32 = PAGE_WIDTH - 2 * PAGE_MARGIN;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="120"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="24"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:outlineLvl w:val="2"/></w:pPr><w:rPr><w:b/><w:i/></w:rPr></w:style></w:styles>"#;

/// Writes bundles as `.docx` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExporter;

impl DocxExporter {
    /// Creates the exporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Packages `doc` into docx bytes.
    pub fn write(&self, doc: &Document) -> Result<Vec<u8>, ExportError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.to_string()),
            ("word/styles.xml", STYLES.to_string()),
            ("word/document.xml", document_xml(doc)),
            ("docProps/core.xml", core_xml(doc)),
        ];
        for (name, content) in &parts {
            zip.start_file(*name, opts)?;
            zip.write_all(content.as_bytes())?;
        }

        let bytes = zip.finish()?.into_inner();
        debug!(bytes = bytes.len(), blocks = doc.blocks.len(), "docx written");
        Ok(bytes)
    }
}

impl DocumentExporter for DocxExporter {
    fn export(&self, bundle: &ExportBundle) -> Result<ExportedDocument, ExportError> {
        let doc = build_document(bundle);
        Ok(ExportedDocument {
            filename: bundle.filename(),
            bytes: self.write(&doc)?,
        })
    }
}

/// Escapes XML text and drops characters XML 1.0 cannot carry.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn core_xml(doc: &Document) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{}</dc:title><dc:creator>{}</dc:creator><dc:description>{}</dc:description>",
            "</cp:coreProperties>"
        ),
        escape(&doc.title),
        escape(&doc.creator),
        escape(&doc.description),
    )
}

fn document_xml(doc: &Document) -> String {
    let mut body = String::new();
    for block in &doc.blocks {
        match block {
            Block::Paragraph(p) => paragraph_xml(&mut body, p),
            Block::Table(t) => table_xml(&mut body, t),
        }
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
            "{body}",
            r#"<w:sectPr><w:pgSz w:w="{w}" w:h="{h}"/>"#,
            r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="720" w:footer="720" w:gutter="0"/>"#,
            "</w:sectPr></w:body></w:document>"
        ),
        body = body,
        w = PAGE_WIDTH,
        h = PAGE_HEIGHT,
        m = PAGE_MARGIN,
    )
}

fn paragraph_xml(out: &mut String, p: &Paragraph) {
    out.push_str("<w:p><w:pPr>");
    let style = match p.style {
        ParagraphStyle::Title => Some("Title"),
        ParagraphStyle::Heading1 => Some("Heading1"),
        ParagraphStyle::Heading2 => Some("Heading2"),
        ParagraphStyle::Heading3 => Some("Heading3"),
        ParagraphStyle::Body => None,
    };
    if let Some(style) = style {
        out.push_str(&format!(r#"<w:pStyle w:val="{style}"/>"#));
    }
    if let Some(indent) = p.indent {
        out.push_str(&format!(r#"<w:ind w:left="{indent}"/>"#));
    }
    let jc = match p.align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Justified => "both",
    };
    out.push_str(&format!(r#"<w:jc w:val="{jc}"/></w:pPr>"#));

    for run in &p.runs {
        out.push_str("<w:r>");
        if run.bold || run.underline {
            out.push_str("<w:rPr>");
            if run.bold {
                out.push_str("<w:b/>");
            }
            if run.underline {
                out.push_str(r#"<w:u w:val="single"/>"#);
            }
            out.push_str("</w:rPr>");
        }
        out.push_str(&format!(
            r#"<w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape(&run.text)
        ));
    }
    out.push_str("</w:p>");
}

fn table_xml(out: &mut String, table: &Table) {
    let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return;
    }
    let widths: Vec<u32> = if table.column_widths.len() == columns {
        table.column_widths.clone()
    } else {
        let each = TEXT_WIDTH / u32::try_from(columns).unwrap_or(1);
        vec![each; columns]
    };

    let border = if table.borders {
        r#"w:val="single" w:sz="4" w:space="0" w:color="000000""#
    } else {
        r#"w:val="nil""#
    };
    out.push_str(r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblBorders>"#);
    for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
        out.push_str(&format!("<w:{edge} {border}/>"));
    }
    out.push_str("</w:tblBorders></w:tblPr><w:tblGrid>");
    for width in &widths {
        out.push_str(&format!(r#"<w:gridCol w:w="{width}"/>"#));
    }
    out.push_str("</w:tblGrid>");

    for row in &table.rows {
        out.push_str("<w:tr>");
        for (cell, width) in row.iter().zip(&widths) {
            out.push_str(&format!(
                r#"<w:tc><w:tcPr><w:tcW w:w="{width}" w:type="dxa"/></w:tcPr>"#
            ));
            if cell.paragraphs.is_empty() {
                paragraph_xml(out, &Paragraph::blank());
            }
            for p in &cell.paragraphs {
                paragraph_xml(out, p);
            }
            out.push_str("</w:tc>");
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
}
