//! Namespace-legal name generation.
//!
//! Turns a caller supplied path component into a name that is legal in the target namespace and
//! unique among its future siblings. Sibling lookup is abstracted behind an `is_taken` predicate
//! so the algorithm stays a pure function of its inputs.

use crate::error::{IsoMakerError, Result};
use crate::namespace::NamespaceKind;

/// Maximum primary name length for levels 2 and 3 (base, separator and extension together).
pub const ISO9660_MAX_NAME_LEN: usize = 30;
/// Level 1 base name length (the `8` of `8.3`).
pub const ISO9660_L1_BASE_LEN: usize = 8;
/// Level 1 extension length (the `3` of `8.3`).
pub const ISO9660_L1_EXT_LEN: usize = 3;
/// Documented Joliet limit in UCS-2 units. Not enforced; Joliet names are copied verbatim.
pub const JOLIET_MAX_NAME_LEN: usize = 64;
/// Candidates tried before giving up: the plain name plus numbered variants.
pub const MAX_MANGLE_ATTEMPTS: u32 = 32 * 1024;

/// Substitute for names consisting solely of dots.
const DOTS: &str = "DOTS";
/// Substitute for names without a single d-character.
const EMPTY_SUBSTITUTE: &str = "_";

/// Produces a legal, sibling-unique name for `raw` in namespace `kind` at `level`.
///
/// `is_taken` reports whether a sibling already uses a name (case-insensitively).
pub fn normalize_name(
    kind: NamespaceKind,
    level: u8,
    raw: &str,
    is_dir: bool,
    is_taken: impl Fn(&str) -> bool,
) -> Result<String> {
    match kind {
        NamespaceKind::Iso9660 => normalize_primary(level, raw, is_dir, is_taken),
        NamespaceKind::Joliet => normalize_joliet(raw, is_taken),
        NamespaceKind::Udf | NamespaceKind::Hfs => Err(IsoMakerError::NotSupported(kind)),
    }
}

/// Primary ISO-9660 names: d-characters only, upper-cased, level dependent length.
pub fn normalize_primary(
    level: u8,
    raw: &str,
    is_dir: bool,
    is_taken: impl Fn(&str) -> bool,
) -> Result<String> {
    let candidate = PrimaryCandidate::new(level, raw, is_dir);
    if !is_taken(&candidate.name) {
        return Ok(candidate.name);
    }

    for attempt in 1..MAX_MANGLE_ATTEMPTS {
        let mangled = candidate.with_suffix(attempt);
        tracing::trace!(raw, candidate = %mangled, attempt, "primary name collision, retrying");
        if !is_taken(&mangled) {
            return Ok(mangled);
        }
    }

    Err(IsoMakerError::DuplicateName {
        namespace: NamespaceKind::Iso9660,
        name: raw.to_owned(),
    })
}

/// Joliet names are taken as given; the only check is sibling pre-existence.
///
/// A Joliet name is the specified name, so a taken name means the entry already exists.
pub fn normalize_joliet(raw: &str, is_taken: impl Fn(&str) -> bool) -> Result<String> {
    if is_taken(raw) {
        return Err(IsoMakerError::AlreadyExists {
            namespace: NamespaceKind::Joliet,
            name: raw.to_owned(),
        });
    }
    Ok(raw.to_owned())
}

/// A first primary name plus where a disambiguating number may be spliced in.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PrimaryCandidate {
    name: String,
    /// Byte offset of the extension separator (or the end of the name).
    suffix_at: usize,
    /// Maximum length of `name[..suffix_at]` including any numeric suffix.
    base_budget: usize,
    /// Maximum length of the whole name.
    max_len: usize,
}

impl PrimaryCandidate {
    fn new(level: u8, raw: &str, is_dir: bool) -> Self {
        let raw = match raw.trim_start_matches('.') {
            "" => DOTS,
            rest => rest,
        };
        let max_base = if level >= 2 {
            ISO9660_MAX_NAME_LEN
        } else {
            ISO9660_L1_BASE_LEN
        };

        if is_dir {
            return Self::unsegmented(raw, max_base);
        }
        let Some(dot) = raw.rfind('.') else {
            return Self::unsegmented(raw, max_base);
        };
        let (raw_base, raw_ext) = (&raw[..dot], &raw[dot + 1..]);

        if level < 2 {
            let ext = copy_d_chars(raw_ext, ISO9660_L1_EXT_LEN);
            if ext.is_empty() {
                return Self::unsegmented(raw, max_base);
            }
            let base = copy_d_chars(raw_base, ISO9660_L1_BASE_LEN);
            return Self::segmented(
                base,
                &ext,
                ISO9660_L1_BASE_LEN,
                ISO9660_L1_BASE_LEN + 1 + ISO9660_L1_EXT_LEN,
            );
        }

        let mut ext = copy_d_chars(raw_ext, ISO9660_MAX_NAME_LEN - 2);
        if ext.is_empty() {
            return Self::unsegmented(raw, max_base);
        }
        let mut base = copy_d_chars(raw_base, ISO9660_MAX_NAME_LEN - 2);
        if base.len() + 1 + ext.len() > ISO9660_MAX_NAME_LEN {
            // Long extensions give way to the base name, but never below four characters.
            let keep = ISO9660_MAX_NAME_LEN - 1 - ext.len().min(4);
            base.truncate(base.len().min(keep));
        }
        ext.truncate(ISO9660_MAX_NAME_LEN - 1 - base.len());
        let budget = ISO9660_MAX_NAME_LEN - 1 - ext.len();
        Self::segmented(base, &ext, budget, ISO9660_MAX_NAME_LEN)
    }

    fn unsegmented(raw: &str, max_len: usize) -> Self {
        let mut name = copy_d_chars(raw, max_len);
        if name.is_empty() {
            name.push_str(EMPTY_SUBSTITUTE);
        }
        Self {
            suffix_at: name.len(),
            name,
            base_budget: max_len,
            max_len,
        }
    }

    fn segmented(mut base: String, ext: &str, base_budget: usize, max_len: usize) -> Self {
        let suffix_at = base.len();
        base.push('.');
        base.push_str(ext);
        Self {
            name: base,
            suffix_at,
            base_budget,
            max_len,
        }
    }

    /// `REPORT.TXT` with suffix 12 becomes `REPORT12.TXT`, shortening the base to fit.
    fn with_suffix(&self, attempt: u32) -> String {
        let digits = attempt.to_string();
        let keep = self
            .suffix_at
            .min(self.base_budget.saturating_sub(digits.len()));

        let mut out = String::with_capacity(self.name.len() + digits.len());
        out.push_str(&self.name[..keep]);
        out.push_str(&digits);
        out.push_str(&self.name[self.suffix_at..]);
        // Only reachable when a long extension left less room than the suffix needs.
        out.truncate(self.max_len);
        out
    }
}

/// Maps a code point to its d-character, if it has one.
fn to_d_char(c: char) -> Option<char> {
    match c {
        'A'..='Z' | '0'..='9' | '_' => Some(c),
        'a'..='z' => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

/// Copies at most `max_len` d-characters out of `src`, dropping everything else.
fn copy_d_chars(src: &str, max_len: usize) -> String {
    src.chars().filter_map(to_d_char).take(max_len).collect()
}

/// True if `name` only contains d-characters and at most one `.` separator.
pub fn is_valid_primary_name(name: &str) -> bool {
    !name.is_empty()
        && name.matches('.').count() <= 1
        && name.chars().all(|c| c == '.' || to_d_char(c) == Some(c))
}
