//! Ordering and section assignment.
//!
//! Sections run A to Z followed by a single catch-all for titles that do
//! not start with an ASCII letter. Entries are ordered by section, then by
//! upper-cased title; equal titles keep their input order.

use crate::models::Entry;

const OTHER_LABEL: &str = "Numbers & Special Characters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    /// Upper-case ASCII letter.
    Letter(char),
    Other,
}

impl Section {
    /// Section for a title: its first character once leading double quotes
    /// are stripped.
    pub fn of(title: &str) -> Section {
        match title.trim_start_matches('"').chars().next() {
            Some(c) if c.is_ascii_alphabetic() => Section::Letter(c.to_ascii_uppercase()),
            _ => Section::Other,
        }
    }

    /// 1 to 26 for letters, 27 for the catch-all.
    pub fn number(&self) -> u8 {
        match self {
            Section::Letter(c) => *c as u8 - b'A' + 1,
            Section::Other => 27,
        }
    }

    /// Display header, e.g. `Aa`.
    pub fn label(&self) -> String {
        match self {
            Section::Letter(c) => format!("{}{}", c, c.to_ascii_lowercase()),
            Section::Other => OTHER_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSection {
    pub section: Section,
    pub entries: Vec<Entry>,
}

/// What the renderer consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDocument {
    /// Non-empty sections in display order.
    pub sections: Vec<IndexSection>,
    /// Show the course segment on every entry.
    pub has_course: bool,
}

impl IndexDocument {
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    /// Entries in display order, each with its section.
    pub fn entries(&self) -> impl Iterator<Item = (Section, &Entry)> {
        self.sections
            .iter()
            .flat_map(|s| s.entries.iter().map(move |e| (s.section, e)))
    }
}

/// Stable sort by (section, upper-cased title).
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        Section::of(&a.sort_key)
            .cmp(&Section::of(&b.sort_key))
            .then_with(|| a.sort_key.cmp(&b.sort_key))
    });
}

/// Sort entries and cut them into sections. A section starts wherever the
/// section changes, so no header repeats and empty sections never appear.
pub fn build_index(mut entries: Vec<Entry>, has_course: bool) -> IndexDocument {
    sort_entries(&mut entries);

    let mut sections: Vec<IndexSection> = Vec::new();
    for entry in entries {
        let section = Section::of(&entry.sort_key);
        match sections.last_mut() {
            Some(current) if current.section == section => current.entries.push(entry),
            _ => sections.push(IndexSection {
                section,
                entries: vec![entry],
            }),
        }
    }

    IndexDocument {
        sections,
        has_course,
    }
}
