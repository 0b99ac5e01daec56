//! Markdown export of the record collection.

use clipnote_core::Record;

/// Render the record collection as a Markdown document, oldest first.
pub fn export_markdown(records: &[Record]) -> String {
    let mut md = String::from("# Clipboard Export\n\n");
    for r in records.iter().rev() {
        match r.title.as_deref() {
            Some(title) => md.push_str(&format!("## {}\n\n", title)),
            None => md.push_str("## (untitled)\n\n"),
        }
        md.push_str(&format!("Created: {}\n\n", r.created_at.to_rfc3339()));
        md.push_str(&format!("{}\n\n", r.content));
        if let Some(summary) = r.summary.as_deref() {
            md.push_str(&format!("> Summary: {}\n\n", summary));
        }
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipnote_core::Summary;

    #[test]
    fn export_lists_oldest_first() {
        let older = Record::new("first captured");
        let newer = Record::new("second captured");
        // Most-recent-first, as the store keeps them.
        let md = export_markdown(&[newer, older]);

        let first = md.find("first captured").unwrap();
        let second = md.find("second captured").unwrap();
        assert!(first < second);
    }

    #[test]
    fn export_includes_title_and_summary() {
        let mut r = Record::new("content body");
        r.apply_summary(&Summary {
            title: "A Title".to_string(),
            summary: "A summary line.".to_string(),
            confidence: 0.8,
        });
        let md = export_markdown(&[r]);

        assert!(md.starts_with("# Clipboard Export"));
        assert!(md.contains("## A Title"));
        assert!(md.contains("content body"));
        assert!(md.contains("> Summary: A summary line."));
    }

    #[test]
    fn export_marks_untitled_records() {
        let md = export_markdown(&[Record::new("no title yet")]);
        assert!(md.contains("## (untitled)"));
        assert!(!md.contains("> Summary:"));
    }

    #[test]
    fn export_of_empty_collection_is_just_header() {
        assert_eq!(export_markdown(&[]), "# Clipboard Export\n\n");
    }
}
