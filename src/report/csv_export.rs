use std::path::Path;

use crate::error::Result;
use crate::models::InsightRow;

/// Writes `rows` to `path`, replacing any previous report. The header is
/// written even when there are no rows.
pub fn write_csv(path: &Path, rows: &[InsightRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    writer.write_record([
        "id",
        "Headline",
        "Publication date",
        "Author",
        "URL",
        "Total views",
        "Average view duration",
        "Average scroll depth",
    ])?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> InsightRow {
        InsightRow {
            id: id.to_string(),
            headline: "Council votes, again".to_string(),
            publication_date: "Mon, 04 Apr 2016 10:00:00 +0000".to_string(),
            author: "desk@example.com".to_string(),
            url: format!("http://x/{id}"),
            total_views: 10,
            average_view_duration: 5,
            average_scroll_depth: 50,
        }
    }

    #[test]
    fn writes_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fbia.csv");
        write_csv(&path, &[row("A1")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "id,Headline,Publication date,Author,URL,Total views,Average view duration,Average scroll depth"
        );
        assert_eq!(
            lines[1],
            "A1,\"Council votes, again\",\"Mon, 04 Apr 2016 10:00:00 +0000\",desk@example.com,http://x/A1,10,5,50"
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fbia.csv");
        write_csv(&path, &[row("A1"), row("B2")]).unwrap();
        write_csv(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
