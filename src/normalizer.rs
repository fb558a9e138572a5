//! Maps noisy scanned manufacturer names onto a maintained canonical list.
use std::fs;
use std::path::Path;

use strsim::normalized_levenshtein;
use tracing::{info, warn};

/// Minimum similarity for a fuzzy hit. Kept high so distinct manufacturers
/// are never unified by accident.
const FUZZY_THRESHOLD: f64 = 0.8;

/// The canonical manufacturer list, loaded once at startup. Edits to the
/// underlying file are only picked up on restart.
#[derive(Debug, Clone, Default)]
pub struct KnownManufacturers {
    /// (display name, comparison key), in file order.
    entries: Vec<(String, String)>,
}

impl KnownManufacturers {
    /// Reads one canonical name per line. A missing or unreadable file
    /// yields an empty list; scanning still works, every manufacturer is
    /// just treated as unknown.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => {
                let set = Self::from_lines(content.lines());
                info!("Loaded {} known manufacturers from {}", set.len(), path.display());
                set
            }
            Err(e) => {
                warn!("Manufacturer list {} not readable: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let entries = lines
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let display = line.to_uppercase();
                let key = comparison_key(line);
                (display, key)
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a scanned manufacturer string to its canonical spelling.
    ///
    /// Priority order: exact match, containment (longer names first, so a
    /// truncated or suffixed scan still lands on the most specific entry),
    /// then fuzzy similarity. Unknown names come back trimmed and
    /// upper-cased instead of being rejected.
    pub fn canonicalize(&self, raw: &str) -> String {
        let scanned = raw.trim().to_uppercase();
        let scanned_key = comparison_key(&scanned);

        for (display, key) in &self.entries {
            if *key == scanned_key {
                return display.clone();
            }
        }

        let mut by_length: Vec<&(String, String)> = self.entries.iter().collect();
        by_length.sort_by_key(|(_, key)| std::cmp::Reverse(key.len()));
        for (display, key) in by_length {
            if scanned_key.starts_with(key.as_str()) || key.starts_with(&scanned_key) {
                return display.clone();
            }
        }

        let mut best: Option<(&str, f64)> = None;
        for (display, key) in &self.entries {
            let score = normalized_levenshtein(&scanned_key, key);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((display.as_str(), score));
            }
        }
        if let Some((display, score)) = best {
            if score >= FUZZY_THRESHOLD {
                return display.to_string();
            }
        }

        scanned
    }
}

/// Comparison key: upper-cased, punctuation folded to spaces, whitespace
/// collapsed. OCR likes to sprinkle dots and commas into brand names.
fn comparison_key(value: &str) -> String {
    let mapped: String = value
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(names: &[&str]) -> KnownManufacturers {
        KnownManufacturers::from_lines(names.iter().copied())
    }

    #[test]
    fn exact_match_ignores_case_and_whitespace() {
        let set = known(&["B BRAUN", "BAXTER"]);
        assert_eq!(set.canonicalize("  baxter "), "BAXTER");
        assert_eq!(set.canonicalize("b braun"), "B BRAUN");
    }

    #[test]
    fn containment_resolves_suffixed_scans() {
        let set = known(&["B BRAUN", "BAXTER"]);
        assert_eq!(set.canonicalize("B. Braun Medical"), "B BRAUN");
    }

    #[test]
    fn containment_resolves_truncated_scans() {
        let set = known(&["INTERSURGICAL"]);
        assert_eq!(set.canonicalize("INTERSURG"), "INTERSURGICAL");
    }

    #[test]
    fn containment_prefers_the_longest_entry() {
        let set = known(&["MEDI", "MEDITECH SYSTEMS"]);
        assert_eq!(set.canonicalize("Meditech Systems GmbH"), "MEDITECH SYSTEMS");
    }

    #[test]
    fn fuzzy_match_accepts_close_misreads() {
        let set = known(&["B BRAUN", "BAXTER"]);
        // One substituted character out of six.
        assert_eq!(set.canonicalize("BAXTAR"), "BAXTER");
    }

    #[test]
    fn fuzzy_match_rejects_distant_names() {
        let set = known(&["B BRAUN", "BAXTER"]);
        assert_eq!(set.canonicalize("Acme Corp"), "ACME CORP");
    }

    #[test]
    fn unknown_names_come_back_cleaned() {
        let set = known(&[]);
        assert_eq!(set.canonicalize("  novel vendor "), "NOVEL VENDOR");
    }

    #[test]
    fn canonicalize_is_deterministic() {
        let set = known(&["B BRAUN", "BAXTER"]);
        let first = set.canonicalize("B. Braun Medical");
        assert_eq!(set.canonicalize("B. Braun Medical"), first);
    }

    #[test]
    fn blank_lines_are_skipped_on_load() {
        let set = KnownManufacturers::from_lines("B BRAUN\n\n  \nBAXTER\n".lines());
        assert_eq!(set.len(), 2);
    }
}
