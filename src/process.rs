//! Row processing: empty-title filtering and duplicate detection.
//!
//! Duplicates are reported, never removed. Rows with a blank title are
//! dropped and counted.

use std::collections::HashMap;
use std::path::Path;

use crate::config::DuplicatesConfig;
use crate::error::IndexError;
use crate::models::{Entry, MalformedRow, RawDataset};

/// Rows sharing one identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Upper-cased title.
    pub title: String,
    pub book: String,
    pub page: String,
    /// Set only when the course is part of the key.
    pub course: Option<String>,
    /// Source row numbers, ascending.
    pub rows: Vec<usize>,
}

/// Advisory counts gathered while processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub empty_titles_skipped: usize,
    /// Ordered by first occurrence.
    pub duplicates: Vec<DuplicateGroup>,
    pub malformed: Vec<MalformedRow>,
}

#[derive(Debug, Clone)]
pub struct Processed {
    pub entries: Vec<Entry>,
    pub has_course: bool,
    pub report: ProcessReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IdentityKey {
    title: String,
    book: String,
    page: String,
    course: Option<String>,
}

pub fn process_rows(
    path: &Path,
    dataset: RawDataset,
    duplicates: &DuplicatesConfig,
) -> Result<Processed, IndexError> {
    let RawDataset {
        rows,
        has_course,
        malformed,
        ..
    } = dataset;

    let mut entries = Vec::with_capacity(rows.len());
    let mut empty_titles_skipped = 0usize;
    let mut groups: Vec<(IdentityKey, Vec<usize>)> = Vec::new();
    let mut group_index: HashMap<IdentityKey, usize> = HashMap::new();

    for raw in rows {
        let title = raw.title.trim();
        if title.is_empty() {
            empty_titles_skipped += 1;
            continue;
        }
        let sort_key = title.to_uppercase();

        let key = IdentityKey {
            title: sort_key.clone(),
            book: raw.book.clone(),
            page: raw.page.clone(),
            course: (duplicates.include_course && has_course).then(|| raw.course.clone()),
        };
        match group_index.get(&key) {
            Some(&i) => groups[i].1.push(raw.row),
            None => {
                group_index.insert(key.clone(), groups.len());
                groups.push((key, vec![raw.row]));
            }
        }

        entries.push(Entry {
            title: title.to_string(),
            sort_key,
            description: raw.description,
            page: raw.page,
            book: raw.book,
            course: raw.course,
            row: raw.row,
        });
    }

    if entries.is_empty() {
        return Err(IndexError::empty(
            path,
            format!(
                "every row has an empty title ({} skipped)",
                empty_titles_skipped
            ),
        ));
    }

    let duplicates = groups
        .into_iter()
        .filter(|(_, rows)| rows.len() > 1)
        .map(|(key, rows)| DuplicateGroup {
            title: key.title,
            book: key.book,
            page: key.page,
            course: key.course,
            rows,
        })
        .collect();

    Ok(Processed {
        entries,
        has_course,
        report: ProcessReport {
            empty_titles_skipped,
            duplicates,
            malformed,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRow;

    fn raw(row: usize, title: &str, book: &str, page: &str, course: &str) -> RawRow {
        RawRow {
            row,
            title: title.to_string(),
            description: format!("desc {}", row),
            page: page.to_string(),
            book: book.to_string(),
            course: course.to_string(),
        }
    }

    fn process(rows: Vec<RawRow>) -> Result<Processed, IndexError> {
        process_rows(
            Path::new("notes.csv"),
            RawDataset::new(rows, Vec::new()),
            &DuplicatesConfig::default(),
        )
    }

    #[test]
    fn case_folded_titles_are_duplicates() {
        let out = process(vec![
            raw(2, "AES", "SEC401", "142", ""),
            raw(3, "aes", "SEC401", "142", ""),
        ])
        .unwrap();
        assert_eq!(out.entries.len(), 2);
        assert_eq!(out.report.duplicates.len(), 1);
        let group = &out.report.duplicates[0];
        assert_eq!(group.title, "AES");
        assert_eq!(group.book, "SEC401");
        assert_eq!(group.page, "142");
        assert_eq!(group.rows, vec![2, 3]);
        assert_eq!(group.course, None);
    }

    #[test]
    fn description_is_not_part_of_identity() {
        let mut a = raw(2, "RSA", "B", "1", "");
        let mut b = raw(3, "RSA", "B", "1", "");
        a.description = "one".to_string();
        b.description = "two".to_string();
        let out = process(vec![a, b]).unwrap();
        assert_eq!(out.report.duplicates.len(), 1);
    }

    #[test]
    fn different_page_or_book_is_not_duplicate() {
        let out = process(vec![
            raw(2, "RSA", "B", "1", ""),
            raw(3, "RSA", "B", "2", ""),
            raw(4, "RSA", "C", "1", ""),
        ])
        .unwrap();
        assert!(out.report.duplicates.is_empty());
        assert_eq!(out.entries.len(), 3);
    }

    #[test]
    fn groups_follow_first_occurrence() {
        let out = process(vec![
            raw(2, "Zeta", "B", "1", ""),
            raw(3, "Alpha", "B", "1", ""),
            raw(4, "alpha", "B", "1", ""),
            raw(5, "ZETA", "B", "1", ""),
            raw(6, "Zeta", "B", "1", ""),
        ])
        .unwrap();
        let titles: Vec<&str> = out.report.duplicates.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["ZETA", "ALPHA"]);
        assert_eq!(out.report.duplicates[0].rows, vec![2, 5, 6]);
    }

    #[test]
    fn empty_titles_are_skipped_and_counted() {
        let out = process(vec![
            raw(2, "", "B", "1", ""),
            raw(3, "Zebra", "B", "2", ""),
            raw(4, "   ", "B", "3", ""),
            raw(5, "", "B", "1", ""),
        ])
        .unwrap();
        assert_eq!(out.entries.len(), 1);
        assert_eq!(out.entries[0].title, "Zebra");
        assert_eq!(out.report.empty_titles_skipped, 3);
        // Blank titles never form duplicate groups.
        assert!(out.report.duplicates.is_empty());
    }

    #[test]
    fn all_empty_titles_is_empty_dataset() {
        let err = process(vec![raw(2, "", "B", "1", "")]).unwrap_err();
        assert!(matches!(err, IndexError::EmptyDataset { .. }));
    }

    #[test]
    fn gse_flag_is_dataset_level() {
        let out = process(vec![
            raw(2, "Kerberos", "SEC505", "201", "SEC575"),
            raw(3, "IDS", "SEC503", "89", ""),
        ])
        .unwrap();
        assert!(out.has_course);
        assert_eq!(out.entries[1].course, "");
    }

    #[test]
    fn course_excluded_from_key_by_default() {
        let out = process(vec![
            raw(2, "RSA", "B", "1", "SEC401"),
            raw(3, "RSA", "B", "1", "SEC501"),
        ])
        .unwrap();
        assert_eq!(out.report.duplicates.len(), 1);
    }

    #[test]
    fn course_can_be_folded_into_key() {
        let config = DuplicatesConfig {
            include_course: true,
            ..DuplicatesConfig::default()
        };
        let rows = vec![
            raw(2, "RSA", "B", "1", "SEC401"),
            raw(3, "RSA", "B", "1", "SEC501"),
            raw(4, "rsa", "B", "1", "SEC401"),
        ];
        let out = process_rows(
            Path::new("notes.csv"),
            RawDataset::new(rows, Vec::new()),
            &config,
        )
        .unwrap();
        assert_eq!(out.report.duplicates.len(), 1);
        assert_eq!(out.report.duplicates[0].course.as_deref(), Some("SEC401"));
        assert_eq!(out.report.duplicates[0].rows, vec![2, 4]);
    }

    #[test]
    fn malformed_rows_are_carried_into_report() {
        let dataset = RawDataset::new(
            vec![raw(2, "A", "B", "1", "")],
            vec![MalformedRow {
                row: 3,
                reason: "row has 2 fields, expected at least 4".to_string(),
            }],
        );
        let out = process_rows(Path::new("x.csv"), dataset, &DuplicatesConfig::default()).unwrap();
        assert_eq!(out.report.malformed.len(), 1);
    }
}
