//! Parser for Cobertura XML coverage reports.
//!
//! Structure consumed (everything else is ignored):
//!   <coverage>
//!     <sources><source>...</source></sources>
//!     <packages>
//!       <package name="...">
//!         <classes>
//!           <class name="..." filename="...">
//!             <lines><line number="..." hits="..."/></lines>
//!           </class>
//!         </classes>
//!       </package>
//!     </packages>
//!   </coverage>
//!
//! Parsing is permissive: a class or line whose mandatory attribute is
//! missing or fails integer parsing is dropped and parsing continues. The
//! only fatal condition is a document that is not well-formed XML.
use std::collections::HashMap;
use std::str;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::Result;
use crate::model::{Class, Coverage, Line, Package};

/// Parse raw report bytes into a `Coverage` model. Pure; no I/O.
pub fn parse(input: &[u8]) -> Result<Coverage> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    let mut coverage = Coverage::new();
    let mut buf = Vec::new();

    // State tracking
    let mut in_source = false;
    let mut current_package: Option<Package> = None;
    let mut current_class: Option<Class> = None;
    // Classes that appear outside any <package> land in an unnamed package.
    let mut orphans = Package::default();

    loop {
        let event = reader.read_event_into(&mut buf);
        let is_start_event = matches!(&event, Ok(Event::Start(_)));
        match event {
            Err(e) => return Err(e.into()),
            Ok(Event::Eof) => break,
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let local_name = e.name();
                let local = local_name.as_ref().to_vec();

                match local.as_slice() {
                    b"source" => {
                        // Only set in_source for Start events; self-closing
                        // <source/> has no text content and no corresponding
                        // End event, so setting the flag would capture the
                        // next unrelated Text event.
                        if is_start_event {
                            in_source = true;
                        }
                    }
                    b"package" => {
                        let attrs = attr_map(e);
                        current_package = Some(Package {
                            name: attrs.get("name").cloned().unwrap_or_default(),
                            classes: Vec::new(),
                        });
                    }
                    b"class" => {
                        let attrs = attr_map(e);
                        // filename is mandatory; a class without one cannot
                        // be resolved and is dropped.
                        match attrs.get("filename") {
                            Some(filename) if !filename.is_empty() => {
                                current_class = Some(Class::new(
                                    attrs.get("name").cloned().unwrap_or_default(),
                                    filename.clone(),
                                ));
                            }
                            _ => current_class = None,
                        }
                    }
                    b"line" => {
                        let attrs = attr_map(e);
                        if let Some(class) = current_class.as_mut() {
                            // Both number and hits must parse; a bad record
                            // is skipped, never fatal.
                            let number = attrs.get("number").and_then(|n| n.parse::<u32>().ok());
                            let hit_count = attrs.get("hits").and_then(|h| h.parse::<u64>().ok());
                            if let (Some(number), Some(hit_count)) = (number, hit_count) {
                                class.lines.push(Line { number, hit_count });
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_source {
                    if let Ok(text) = e.unescape() {
                        coverage.sources.push(text.to_string());
                    }
                    in_source = false;
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name = e.name();
                let local = local_name.as_ref().to_vec();
                match local.as_slice() {
                    b"source" => {
                        in_source = false;
                    }
                    b"class" => {
                        if let Some(class) = current_class.take() {
                            match current_package.as_mut() {
                                Some(package) => package.classes.push(class),
                                None => orphans.classes.push(class),
                            }
                        }
                    }
                    b"package" => {
                        if let Some(package) = current_package.take() {
                            coverage.packages.push(package);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        buf.clear();
    }

    // Handle unclosed elements
    if let Some(class) = current_class.take() {
        match current_package.as_mut() {
            Some(package) => package.classes.push(class),
            None => orphans.classes.push(class),
        }
    }
    if let Some(package) = current_package.take() {
        coverage.packages.push(package);
    }
    if !orphans.classes.is_empty() {
        coverage.packages.push(orphans);
    }

    Ok(coverage)
}

/// Extract attributes from an XML element into a HashMap. Works for any
/// attribute order and quoting style; malformed attributes are skipped
/// individually so the rest of the element still parses.
fn attr_map(e: &quick_xml::events::BytesStart) -> HashMap<String, String> {
    e.attributes()
        .filter_map(|a| {
            let attr = a.ok()?;
            let key = str::from_utf8(attr.key.local_name().into_inner())
                .ok()?
                .to_string();
            let value = attr.unescape_value().ok()?.to_string();
            Some((key, value))
        })
        .collect()
}
