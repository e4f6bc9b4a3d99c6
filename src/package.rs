//! HWPX package container
//!
//! An HWPX document is a ZIP archive. Conversion only ever rewrites two
//! parts, Contents/header.xml and Contents/section0.xml; every other entry
//! of the template is carried over byte for byte, so the saved document
//! keeps the template's settings, preview and manifest untouched.

use log::debug;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::{Error, Result};

/// Archive path of the property-definition part
pub const HEADER_PART: &str = "Contents/header.xml";

/// Archive path of the first section body
pub const SECTION_PART: &str = "Contents/section0.xml";

/// A template HWPX archive held in memory
#[derive(Debug)]
pub struct HwpxTemplate {
    /// Every entry in archive order
    entries: Vec<(String, Vec<u8>)>,
}

impl HwpxTemplate {
    /// Open a template from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Open a template from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Open a template from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            entries.push((entry.name().to_string(), data));
        }
        debug!("template holds {} entries", entries.len());

        let template = Self { entries };
        // both rewritable parts must exist before conversion starts
        template.part(HEADER_PART)?;
        template.part(SECTION_PART)?;
        Ok(template)
    }

    /// Raw bytes of one part
    pub fn part(&self, name: &str) -> Result<&[u8]> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, data)| data.as_slice())
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// The template's header.xml as text
    pub fn header_xml(&self) -> Result<String> {
        Ok(String::from_utf8(self.part(HEADER_PART)?.to_vec())?)
    }

    /// The template's section0.xml as text
    pub fn section_xml(&self) -> Result<String> {
        Ok(String::from_utf8(self.part(SECTION_PART)?.to_vec())?)
    }

    /// Write the document with the two rewritten parts substituted
    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
        header_xml: &str,
        section_xml: &str,
    ) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file, header_xml, section_xml)
    }

    /// Write the document to bytes
    pub fn to_bytes(&self, header_xml: &str, section_xml: &str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(Cursor::new(&mut buf), header_xml, section_xml)?;
        Ok(buf)
    }

    /// Write the document to a writer
    pub fn write_to<W: Write + Seek>(
        &self,
        writer: W,
        header_xml: &str,
        section_xml: &str,
    ) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let deflated: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);
        // readers sniff the mimetype entry, which must stay uncompressed
        let stored: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Stored);

        for (name, data) in &self.entries {
            let options = if name == "mimetype" { stored } else { deflated };
            zip.start_file(name.as_str(), options)?;
            match name.as_str() {
                HEADER_PART => zip.write_all(header_xml.as_bytes())?,
                SECTION_PART => zip.write_all(section_xml.as_bytes())?,
                _ => zip.write_all(data)?,
            }
        }

        zip.finish()?;
        Ok(())
    }
}
