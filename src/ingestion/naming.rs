//! Filesystem-safe name allocation for stored assets.
//!
//! The caller supplies a snapshot of the names already present in the target
//! directory, so allocation is a pure function and unit tests never touch the
//! real filesystem. Uniqueness holds against that snapshot only; two racing
//! uploads can still collide (accepted, see the pipeline docs).

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// Extension given to every stored audio asset.
pub const AUDIO_EXT: &str = "mp3";

/// Extension used for cover art whose mime subtype is missing or unusable.
pub const FALLBACK_COVER_EXT: &str = "jpg";

/// Base substituted when sanitization leaves nothing usable.
pub const FALLBACK_BASE: &str = "audio";

/// Maximum length, in characters, of a sanitized base name.
pub const MAX_BASE_LEN: usize = 120;

lazy_static! {
    // Word characters, hyphen, parentheses, whitespace and dot survive;
    // everything else is dropped.
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^\w\-()\s.]").unwrap();
    static ref SEPARATOR: Regex = Regex::new(r"[-_]").unwrap();
}

/// A sanitized base name plus the collision-free filename derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// Sanitized base, before any disambiguation suffix.
    pub base: String,
    /// `base.ext`, or `base (N).ext` when the plain name was taken.
    pub filename: String,
}

/// Derive a safe, unique filename from a client-declared one.
///
/// Path components and the extension are stripped, unsafe characters dropped,
/// the result bounded to [`MAX_BASE_LEN`] characters (falling back to
/// [`FALLBACK_BASE`] when empty), and a ` (N)` counter appended until the name
/// is absent from `existing`.
pub fn allocate(declared_filename: &str, target_ext: &str, existing: &HashSet<String>) -> ResolvedName {
    let stem = Path::new(declared_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let cleaned = UNSAFE_CHARS.replace_all(stem, "");
    let mut base: String = cleaned.chars().take(MAX_BASE_LEN).collect();
    if base.is_empty() {
        base = FALLBACK_BASE.to_string();
    }

    let mut filename = format!("{}.{}", base, target_ext);
    let mut counter = 1usize;
    while existing.contains(&filename) {
        filename = format!("{} ({}).{}", base, counter, target_ext);
        counter += 1;
    }

    ResolvedName { base, filename }
}

/// Pick the cover-art extension from a declared image mime type.
///
/// Uses the mime subtype when it is a plain alphanumeric token, otherwise
/// [`FALLBACK_COVER_EXT`].
pub fn cover_extension(mime: Option<&str>) -> &str {
    match mime.and_then(|m| m.split('/').nth(1)) {
        Some(sub) if !sub.is_empty() && sub.chars().all(|c| c.is_ascii_alphanumeric()) => sub,
        _ => FALLBACK_COVER_EXT,
    }
}

/// Turn a sanitized base name into a display title: separators become spaces.
pub fn title_from_filename(base: &str) -> String {
    SEPARATOR.replace_all(base, " ").trim().to_string()
}
