//! Manifest content rewriting
//!
//! The content is scanned again with the manifest's parser, and each update
//! replaces exactly the byte span of the entry whose text equals its `old`.
//! Updates are matched in scan order: each one consumes the first matching
//! entry after the previous replacement, so identical entries elsewhere in
//! the file are left alone and a replacement is never rewritten twice. Text
//! outside the entries (comments, other setup() arguments) is never touched.

use crate::domain::{ManifestKind, VersionUpdate};
use crate::error::ManifestError;
use crate::manifest::get_parser;

/// Apply `updates` to the content of the manifest at `path`
///
/// Fails if `path` is not a recognized manifest, or if an `old` text has no
/// matching entry after the previous replacement.
pub fn apply_updates(
    path: &str,
    content: &str,
    updates: &[VersionUpdate],
) -> Result<String, ManifestError> {
    let kind = ManifestKind::from_file_name(path)
        .ok_or_else(|| ManifestError::unsupported_format(path))?;
    let entries = get_parser(kind).entries(content)?;

    let mut output = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut remaining = entries.iter();

    for update in updates {
        let entry = remaining
            .by_ref()
            .find(|entry| entry.text == update.old)
            .ok_or_else(|| ManifestError::requirement_not_found(path, update.old.as_str()))?;

        output.push_str(&content[cursor..entry.span.start]);
        output.push_str(&update.new);
        cursor = entry.span.end;
    }

    output.push_str(&content[cursor..]);
    Ok(output)
}
