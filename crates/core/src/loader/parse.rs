//! Line-level parsing of generated fragment payloads.
//!
//! A payload file is an IIFE wrapper around one assignment per contributing
//! module:
//!
//! ```text
//! implementors["forge"] = [{"text":"...","synthetic":false,"types":["..."]}];
//! ```
//!
//! Wrapper lines carry no data and are ignored.

use std::path::{Component, Path};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use traitdex_api::{CapabilityId, ImplementorRecord, IndexFragment, ModuleName};

use crate::error::{Result, TraitdexError};

/// Matches one module assignment, capturing the module name and the JSON
/// record array.
static MODULE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^implementors\["([^"]+)"\]\s*=\s*(\[.*\]);?$"#)
        .expect("Failed to compile fragment line pattern - this is a fatal error")
});

/// File names carrying a capability payload, e.g. `trait.Test.js`.
static CAPABILITY_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^trait\.([A-Za-z_][A-Za-z0-9_]*)\.js$")
        .expect("Failed to compile capability file pattern - this is a fatal error")
});

/// Derives the capability id from a payload path relative to the fragment
/// root: `forge/interface/test/trait.Test.js` becomes
/// `forge::interface::test::Test`.
pub fn capability_from_path(relative: &Path) -> Result<CapabilityId> {
    let file_name = relative
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            TraitdexError::Parsing(format!(
                "fragment path has no file name: {}",
                relative.display()
            ))
        })?;
    let captures = CAPABILITY_FILE.captures(file_name).ok_or_else(|| {
        TraitdexError::Parsing(format!("not a capability payload file: {file_name}"))
    })?;

    let mut segments = Vec::new();
    for component in relative.parent().into_iter().flat_map(Path::components) {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    TraitdexError::Parsing(format!(
                        "non-UTF-8 segment in fragment path: {}",
                        relative.display()
                    ))
                })?;
                segments.push(part.to_string());
            }
            _ => {
                return Err(TraitdexError::Parsing(format!(
                    "unexpected component in fragment path: {}",
                    relative.display()
                )));
            }
        }
    }
    segments.push(captures[1].to_string());
    Ok(CapabilityId::from_segments(segments)?)
}

/// Parses one payload into a fragment.
///
/// A module line whose record array fails to parse is logged and counted, and
/// any such line poisons the payload: the returned fragment carries no entries
/// at all. Returns the fragment plus the number of malformed lines.
pub fn parse_fragment(capability: CapabilityId, source: &str) -> (IndexFragment, usize) {
    let mut fragment = IndexFragment::new(capability);
    let mut malformed = 0;
    for line in source.lines() {
        let captures = match MODULE_LINE.captures(line.trim()) {
            Some(captures) => captures,
            None => continue,
        };
        match serde_json::from_str::<Vec<ImplementorRecord>>(&captures[2]) {
            Ok(records) => fragment.set_module(ModuleName::from(&captures[1]), records),
            Err(err) => {
                warn!(
                    "Malformed record list for module {:?} in {}: {}",
                    &captures[1], fragment.capability, err
                );
                malformed += 1;
            }
        }
    }
    if malformed > 0 {
        // One bad line poisons the whole payload; nothing from it registers.
        fragment.entries.clear();
    }
    (fragment, malformed)
}
