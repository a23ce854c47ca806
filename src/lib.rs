#![warn(
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::pedantic
)]

mod error;
mod parser;
pub mod progress;
pub mod registry;
mod section;

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::io::{self, BufWriter, Read, Write};

pub use error::{Denial, ProfileError};
pub use registry::write_registry_value;
pub use section::{Properties, Property, Section};

use parser::{Line, Parser};
use section::section_key;

/// Byte Order Mark (BOM) is used to signal the endianness of an encoding. The order `0xFF 0xFE`
/// strongly suggests that the encoding is using little-endian byte order.
///
/// <https://en.wikipedia.org/wiki/Byte_order_mark>
const BOM_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

/// An in-memory private profile (INI) document.
///
/// Sections and properties are looked up case-insensitively. Properties that
/// appear before the first section header belong to a section with an empty
/// name, which is written back without a header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    sections: BTreeMap<String, Section>,
}

impl ConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a profile from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::StreamUnavailable`] if `reader` fails.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ProfileError> {
        let mut store = Self::new();
        store.load(reader)?;
        Ok(store)
    }

    /// Parse a profile held in memory. Never fails; unparsable lines are skipped.
    #[must_use]
    pub fn from_bytes(buffer: &[u8]) -> Self {
        let mut store = Self::new();
        store.merge(&decode_data(buffer));
        store
    }

    /// Read `reader` to the end and merge its sections and properties into
    /// this store. Lines that are neither a section header nor a `key=value`
    /// pair are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::StreamUnavailable`] if `reader` fails, in which
    /// case the store is left untouched.
    pub fn load<R: Read>(&mut self, mut reader: R) -> Result<(), ProfileError> {
        let mut buffer = Vec::with_capacity(4096);
        reader
            .read_to_end(&mut buffer)
            .map_err(|source| ProfileError::StreamUnavailable { source })?;

        self.merge(&decode_data(&buffer));
        Ok(())
    }

    fn merge(&mut self, text: &str) {
        let mut current = String::new();

        for line in Parser::new(text) {
            match line {
                Line::Section(name) => {
                    self.add_section(name);
                    current = name.to_owned();
                }
                Line::Property { key, value } => self.set_string_property(&current, key, value),
            }
        }
    }

    /// Write the document to `writer`: a `[Name]` header per section (none for
    /// the unnamed section), one `Name=Value` line per property, and a blank
    /// line after every section.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::StreamUnavailable`] if writing or flushing fails.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), ProfileError> {
        self.write_to(BufWriter::new(writer))
            .map_err(|source| ProfileError::StreamUnavailable { source })
    }

    fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for section in self.sections.values() {
            if !section.name().is_empty() {
                write!(writer, "[{}]{LINE_ENDING}", section.name())?;
            }

            for property in section.properties() {
                write!(
                    writer,
                    "{}={}{LINE_ENDING}",
                    property.name(),
                    property.value()
                )?;
            }

            writer.write_all(LINE_ENDING.as_bytes())?;
        }

        writer.flush()
    }

    /// Set `key` in `section` to `value`, creating the section when needed.
    /// Both names match case-insensitively and the key and value are trimmed.
    pub fn set_string_property(&mut self, section: &str, key: &str, value: &str) {
        self.add_section(section).insert(key, value);
    }

    /// Look up the value of `key` in `section`, ignoring case.
    #[must_use]
    pub fn string_property(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key).map(Property::value)
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(&section_key(name))
    }

    /// Sections in the order they are saved.
    #[must_use]
    pub fn sections(&self) -> Sections<'_> {
        Sections {
            inner: self.sections.values(),
        }
    }

    /// Number of sections, including empty ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of properties across all sections.
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.sections.values().map(Section::len).sum()
    }

    fn add_section(&mut self, name: &str) -> &mut Section {
        self.sections
            .entry(section_key(name))
            .or_insert_with(|| Section::new(name.to_owned()))
    }
}

#[derive(Debug, Clone)]
pub struct Sections<'a> {
    inner: btree_map::Values<'a, String, Section>,
}

impl<'a> Iterator for Sections<'a> {
    type Item = &'a Section;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Sections<'_> {}

// Native profile writers emit either UTF-16 LE with a BOM or 8-bit text.
fn decode_data(data: &[u8]) -> String {
    if let Some(rest) = data.strip_prefix(BOM_LE) {
        let utf16 = rest
            .chunks_exact(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect::<Vec<u16>>();

        char::decode_utf16(utf16)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect::<String>()
    } else {
        let data = data.strip_prefix(BOM_UTF8).unwrap_or(data);
        String::from_utf8_lossy(data).into_owned()
    }
}
