//! Field-precise PKGBUILD rewriting

use std::collections::BTreeMap;
use std::ops::Range;

use tracing::debug;

use crate::checksum::ChecksumSet;
use crate::parser::types::{SourceTarget, VersionRecord};
use crate::pkgbuild::document::{PkgbuildDocument, Quote, Word};
use crate::pkgbuild::error::PatchError;

/// Characters that force quoting of an otherwise bare word
const NEEDS_QUOTING: &[char] = &[
    ' ', '\t', '\n', '\'', '"', '\\', '$', '`', ';', '&', '|', '<', '>', '(', ')', '{', '}', '*',
    '?', '!', '~', '#', '[', ']',
];

/// Apply upstream release data to a PKGBUILD
///
/// Rewrites `pkgver` (and resets `pkgrel` to 1 when the version changes), the
/// remote entry of `source<suffix>` for every target in `checksums`, and the
/// matching entry of each `<algo>sums<suffix>` array. All other bytes are
/// returned unchanged. Nothing is returned on error, so a caller can never
/// persist a partial edit.
pub fn apply(
    existing: &str,
    record: &VersionRecord,
    checksums: &BTreeMap<SourceTarget, ChecksumSet>,
) -> Result<String, PatchError> {
    let document = PkgbuildDocument::parse(existing)?;
    let mut edits = Edits::default();

    let pkgver = document
        .scalar("pkgver")
        .ok_or_else(|| PatchError::MissingField("pkgver".to_string()))?;
    if pkgver.inner != record.version {
        edits.set_value(pkgver, &record.version);
        let pkgrel = document
            .scalar("pkgrel")
            .ok_or_else(|| PatchError::MissingField("pkgrel".to_string()))?;
        edits.set_value(pkgrel, "1");
    }

    for (&target, set) in checksums {
        let url = record
            .url_for(target)
            .ok_or(PatchError::MissingDownloadUrl { target })?;

        let source_field = target.field("source");
        let sources = document
            .array(&source_field)
            .ok_or_else(|| PatchError::MissingField(source_field.clone()))?;
        let index = sources
            .iter()
            .position(Word::is_remote)
            .ok_or_else(|| PatchError::NoRemoteSource {
                field: source_field.clone(),
            })?;
        edits.set_url(&sources[index], url);

        let mut found = false;
        for (algorithm, digest) in set.iter() {
            let field = target.field(&algorithm.sums_field());
            let Some(sums) = document.array(&field) else {
                continue;
            };
            found = true;
            let word = sums.get(index).ok_or(PatchError::ChecksumCountMismatch {
                field: field.clone(),
                index,
                len: sums.len(),
            })?;
            edits.set_value(word, digest);
        }
        if !found {
            return Err(PatchError::MissingChecksums { target });
        }
    }

    debug!("Applying {} PKGBUILD edits", edits.len());
    Ok(edits.apply(existing))
}

/// Byte-range replacements over the original text
#[derive(Default)]
struct Edits {
    replacements: Vec<(Range<usize>, String)>,
}

impl Edits {
    fn len(&self) -> usize {
        self.replacements.len()
    }

    fn push(&mut self, word: &Word, replacement: String) {
        self.replacements.push((word.span.clone(), replacement));
    }

    /// Replace a whole word's value, keeping its quote style
    fn set_value(&mut self, word: &Word, value: &str) {
        if word.inner == value {
            return;
        }
        self.push(word, word.requote(&escape_for(word.quote, value)));
    }

    /// Replace the URL part of a source entry, keeping any `name::` prefix
    fn set_url(&mut self, word: &Word, url: &str) {
        let (prefix, current) = word.rename_split();
        // Entries built from variables follow pkgver on their own
        if current == url || current.contains('$') {
            return;
        }
        let inner = format!("{prefix}{}", escape_for(word.quote, url));
        self.push(word, word.requote(&inner));
    }

    fn apply(mut self, text: &str) -> String {
        self.replacements.sort_by_key(|(range, _)| range.start);
        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;
        for (range, replacement) in &self.replacements {
            debug_assert!(range.start >= cursor, "overlapping PKGBUILD edits");
            output.push_str(&text[cursor..range.start]);
            output.push_str(replacement);
            cursor = range.end;
        }
        output.push_str(&text[cursor..]);
        output
    }
}

/// Escape a value for placement inside quotes of the given style
fn escape_for(quote: Quote, value: &str) -> String {
    match quote {
        Quote::Single => value.replace('\'', r"'\''"),
        Quote::Double => {
            let mut escaped = String::with_capacity(value.len());
            for c in value.chars() {
                if matches!(c, '\\' | '$' | '`' | '"') {
                    escaped.push('\\');
                }
                escaped.push(c);
            }
            escaped
        }
        Quote::None if value.is_empty() || value.contains(NEEDS_QUOTING) => {
            format!("'{}'", escape_for(Quote::Single, value))
        }
        Quote::None => value.to_string(),
    }
}
