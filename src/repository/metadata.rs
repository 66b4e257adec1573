//! Parsers for the `repodata/` documents of an RPM repository.
//!
//! Only the parts needed for resolution are read: the location of the primary
//! document from `repomd.xml`, and name/arch/build time/location plus the
//! provides and requires capability names from each primary `<package>`.
//! Elements are matched by local name so the `rpm:` prefix does not matter.

use std::collections::BTreeSet;
use std::io::BufRead;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::PackageRecord;

/// Returns the `href` of the primary metadata document listed in `repomd.xml`.
pub fn parse_repomd<B: BufRead>(input: B) -> Result<String> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut in_primary = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .context("Failed to parse repomd.xml")?;
        match event {
            Event::Start(e) if e.local_name().as_ref() == b"data" => {
                in_primary = attribute(&e, b"type")?.as_deref() == Some("primary");
            }
            Event::End(e) if e.local_name().as_ref() == b"data" => in_primary = false,
            Event::Start(e) | Event::Empty(e)
                if in_primary && e.local_name().as_ref() == b"location" =>
            {
                if let Some(href) = attribute(&e, b"href")? {
                    return Ok(href);
                }
            }
            Event::Eof => bail!("repomd.xml does not list a primary metadata document"),
            _ => {}
        }
        buf.clear();
    }
}

#[derive(Clone, Copy)]
enum TextField {
    Name,
    Arch,
}

#[derive(Clone, Copy)]
enum Capabilities {
    Provides,
    Requires,
}

#[derive(Default)]
struct RecordBuilder {
    name: Option<String>,
    arch: Option<String>,
    build_time: Option<i64>,
    location: Option<String>,
    provides: BTreeSet<String>,
    requires: BTreeSet<String>,
}

impl RecordBuilder {
    fn push_text(&mut self, field: TextField, text: &str) {
        let slot = match field {
            TextField::Name => &mut self.name,
            TextField::Arch => &mut self.arch,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    /// `depth` is 1 for direct children of `<package>`.
    fn read_element(
        &mut self,
        e: &BytesStart<'_>,
        depth: usize,
        section: Option<Capabilities>,
    ) -> Result<()> {
        match (depth, e.local_name().as_ref()) {
            (1, b"time") => {
                if let Some(build) = attribute(e, b"build")? {
                    let build_time = build
                        .trim()
                        .parse()
                        .with_context(|| format!("Invalid build time '{}'", build))?;
                    self.build_time = Some(build_time);
                }
            }
            (1, b"location") => {
                if let Some(href) = attribute(e, b"href")? {
                    self.location = Some(href);
                }
            }
            (3, b"entry") => {
                if let (Some(section), Some(name)) = (section, attribute(e, b"name")?) {
                    match section {
                        Capabilities::Provides => self.provides.insert(name),
                        Capabilities::Requires => self.requires.insert(name),
                    };
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<PackageRecord> {
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            _ => bail!("Package entry without <name>"),
        };
        let arch = self
            .arch
            .with_context(|| format!("Package {} has no <arch>", name))?;
        let location = self
            .location
            .with_context(|| format!("Package {} has no <location href>", name))?;
        let build_time = self
            .build_time
            .with_context(|| format!("Package {} has no build time", name))?;

        Ok(PackageRecord {
            name,
            build_time,
            location,
            arch,
            provides: self.provides,
            requires: self.requires,
        })
    }
}

/// Parses every `<package>` of a (decompressed) primary metadata document.
pub fn parse_primary<B: BufRead>(input: B) -> Result<Vec<PackageRecord>> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut records = Vec::new();

    let mut current: Option<RecordBuilder> = None;
    let mut depth = 0usize;
    let mut text_field: Option<TextField> = None;
    let mut section: Option<Capabilities> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .context("Failed to parse primary metadata")?;
        match event {
            Event::Start(e) => match current.as_mut() {
                Some(builder) => {
                    depth += 1;
                    match (depth, e.local_name().as_ref()) {
                        (1, b"name") => text_field = Some(TextField::Name),
                        (1, b"arch") => text_field = Some(TextField::Arch),
                        (2, b"provides") => section = Some(Capabilities::Provides),
                        (2, b"requires") => section = Some(Capabilities::Requires),
                        _ => builder.read_element(&e, depth, section)?,
                    }
                }
                None if e.local_name().as_ref() == b"package" => {
                    current = Some(RecordBuilder::default());
                    depth = 0;
                }
                None => {}
            },
            Event::Empty(e) => {
                if let Some(builder) = current.as_mut() {
                    builder.read_element(&e, depth + 1, section)?;
                }
            }
            Event::Text(t) => {
                if let (Some(builder), Some(field)) = (current.as_mut(), text_field) {
                    let text = t.unescape().context("Invalid text in primary metadata")?;
                    builder.push_text(field, text.trim());
                }
            }
            Event::CData(t) => {
                if let (Some(builder), Some(field)) = (current.as_mut(), text_field) {
                    builder.push_text(field, String::from_utf8_lossy(&t).trim());
                }
            }
            Event::End(e) => {
                if current.is_some() {
                    if depth == 0 {
                        if let Some(builder) = current.take() {
                            records.push(builder.finish()?);
                        }
                    } else {
                        match (depth, e.local_name().as_ref()) {
                            (1, b"name") | (1, b"arch") => text_field = None,
                            (2, b"provides") | (2, b"requires") => section = None,
                            _ => {}
                        }
                        depth -= 1;
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if current.is_some() {
        bail!("Primary metadata ended inside a <package> element");
    }

    Ok(records)
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    match e.try_get_attribute(key).context("Malformed XML attribute")? {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .context("Malformed XML attribute value")?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}
