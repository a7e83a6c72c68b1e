//! Shared Office Open XML plumbing for the DOCX, PPTX and XLSX emitters:
//! the ZIP package writer, XML escaping and the document property parts.

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

use super::EmitError;

pub const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// An OPC package being written to memory.
pub struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
}

impl Package {
    pub fn new() -> Self {
        // Fixed timestamps keep repeated builds byte-identical.
        let options = FileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options,
        }
    }

    pub fn add(&mut self, path: &str, xml: &str) -> Result<(), EmitError> {
        self.zip.start_file(path, self.options)?;
        self.zip.write_all(xml.as_bytes())?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<Vec<u8>, EmitError> {
        Ok(self.zip.finish()?.into_inner())
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape text for element content and attribute values. Characters XML 1.0
/// cannot carry are dropped.
pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

/// `docProps/core.xml` carrying the document title.
pub fn core_properties(title: &str) -> String {
    format!(
        r#"{XML_DECL}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>profile-forge</dc:creator></cp:coreProperties>"#,
        escape_xml(title)
    )
}

/// `docProps/app.xml`.
pub fn app_properties() -> String {
    format!(
        r#"{XML_DECL}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>profile-forge</Application></Properties>"#
    )
}

/// Package-level `_rels/.rels` pointing at the main part and the property parts.
pub fn package_rels(main_type: &str, main_target: &str) -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{main_type}" Target="{main_target}"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#
    )
}

pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Content-type overrides shared by every package.
pub const PROPERTY_OVERRIDES: &str = r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_drops_controls() {
        assert_eq!(escape_xml("a<b & \"c\"\u{1}"), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn package_is_a_zip() {
        let mut pkg = Package::new();
        pkg.add("hello.xml", "<a/>").unwrap();
        let bytes = pkg.finish().unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }
}
