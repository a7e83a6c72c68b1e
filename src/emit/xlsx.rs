//! XLSX emitter – a single worksheet listing every node as a row.
//!
//! Columns: Section | Entry | Kind | Content. Pages and zones are ignored;
//! sections appear in display order with their chunks merged.

use super::ooxml::{self, escape_xml, Package, XML_DECL};
use super::{Document, EmitError};

const HEADERS: [&str; 4] = ["Section", "Entry", "Kind", "Content"];

pub fn render_xlsx(doc: &Document) -> Result<Vec<u8>, EmitError> {
    let mut pkg = Package::new();
    pkg.add("[Content_Types].xml", &content_types())?;
    pkg.add("_rels/.rels", &ooxml::package_rels(ooxml::OFFICE_DOCUMENT_REL, "xl/workbook.xml"))?;
    pkg.add("docProps/core.xml", &ooxml::core_properties(&doc.title))?;
    pkg.add("docProps/app.xml", &ooxml::app_properties())?;
    pkg.add("xl/workbook.xml", WORKBOOK)?;
    pkg.add("xl/_rels/workbook.xml.rels", WORKBOOK_RELS)?;
    pkg.add("xl/styles.xml", STYLES)?;
    pkg.add("xl/worksheets/sheet1.xml", &sheet(&rows(doc)))?;
    pkg.finish()
}

fn content_types() -> String {
    format!(
        r#"{XML_DECL}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>{}</Types>"#,
        ooxml::PROPERTY_OVERRIDES
    )
}

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Profile" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Style 0 is plain, style 1 is the bold header row.
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs></styleSheet>"#;

/// One row per content node, after the header row.
fn rows(doc: &Document) -> Vec<[String; 4]> {
    let mut rows = vec![HEADERS.map(str::to_string)];
    for section in doc.flat_sections() {
        let name = section
            .title
            .clone()
            .unwrap_or_else(|| section.section_type.default_label().to_string());
        for (i, item) in section.items.iter().enumerate() {
            for node in &item.nodes {
                rows.push([
                    name.clone(),
                    (i + 1).to_string(),
                    node.kind().to_string(),
                    node.plain_text(),
                ]);
            }
        }
    }
    rows
}

fn column_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

fn sheet(rows: &[[String; 4]]) -> String {
    let mut data = String::new();
    for (r, row) in rows.iter().enumerate() {
        let number = r + 1;
        let style = if r == 0 { r#" s="1""# } else { "" };
        data.push_str(&format!(r#"<row r="{number}">"#));
        for (c, value) in row.iter().enumerate() {
            data.push_str(&format!(
                r#"<c r="{col}{number}" t="inlineStr"{style}><is><t xml:space="preserve">{}</t></is></c>"#,
                escape_xml(value),
                col = column_letter(c),
            ));
        }
        data.push_str("</row>");
    }
    format!(
        r#"{XML_DECL}
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cols><col min="1" max="1" width="24" customWidth="1"/><col min="2" max="3" width="12" customWidth="1"/><col min="4" max="4" width="80" customWidth="1"/></cols><sheetData>{data}</sheetData></worksheet>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::test_support::sample_document;
    use crate::layout_config::LayoutType;

    #[test]
    fn rows_follow_sections_in_order() {
        let doc = sample_document(LayoutType::TwoColumn);
        let rows = rows(&doc);
        assert_eq!(rows[0][0], "Section");
        assert_eq!(rows[1][0], "Profile");
        assert_eq!(rows[1][2], "headline");
        assert!(rows.iter().any(|r| r[0] == "Skills" && r[3].contains("Poetry")));
    }

    #[test]
    fn sheet_escapes_and_styles_header() {
        let rows = vec![HEADERS.map(str::to_string), ["A & B".into(), "1".into(), "subtitle".into(), "<x>".into()]];
        let xml = sheet(&rows);
        assert!(xml.contains(r#"<c r="A1" t="inlineStr" s="1">"#));
        assert!(xml.contains("A &amp; B"));
        assert!(xml.contains("&lt;x&gt;"));
    }

    #[test]
    fn workbook_is_a_zip() {
        let bytes = render_xlsx(&sample_document(LayoutType::SingleColumn)).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }
}
