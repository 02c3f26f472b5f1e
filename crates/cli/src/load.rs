// Table loading: CSV/TSV text into an engine TableSource

use std::io::{self, Read};
use std::path::Path;

use tablesort_engine::{Cell, Column, TableSource};

use crate::CliError;

/// Delimiter implied by the file name: tab for `.tsv`/`.tab`, comma otherwise
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "tsv" || ext == "tab" => b'\t',
        _ => b',',
    }
}

/// Read the whole input; `-` means stdin
pub fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::io(format!("stdin: {}", e)))?;
        return Ok(content);
    }
    std::fs::read_to_string(path).map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
}

/// Parsed table before indexing
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Parse delimited text. Without a header row, columns are labelled
    /// `1`, `2`, ... Ragged rows are kept as-is.
    pub fn parse(content: &str, delimiter: u8, has_header: bool) -> Result<Self, CliError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let record = result.map_err(|e| CliError::parse(format!("line {}: {}", line + 1, e)))?;
            records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let labels = if has_header && !records.is_empty() {
            records.remove(0)
        } else {
            let width = records.iter().map(Vec::len).max().unwrap_or(0);
            (1..=width).map(|n| n.to_string()).collect()
        };
        log::info!("read {} row(s) x {} column(s)", records.len(), labels.len());
        Ok(Self { labels, rows: records })
    }

    /// Resolve a column reference: a 1-based number or a header label
    /// (case-insensitive)
    pub fn resolve_column(&self, reference: &str) -> Result<usize, CliError> {
        let reference = reference.trim();
        if let Ok(n) = reference.parse::<usize>() {
            if (1..=self.labels.len()).contains(&n) {
                return Ok(n - 1);
            }
        }
        let wanted = reference.to_lowercase();
        self.labels
            .iter()
            .position(|label| label.trim().to_lowercase() == wanted)
            .ok_or_else(|| {
                CliError::args(format!("unknown column '{}'", reference))
                    .with_hint(format!("columns: {}", self.labels.join(", ")))
            })
    }

    /// Engine source; columns listed in `unsortable` are excluded from indexing
    pub fn into_source(self, unsortable: &[usize]) -> TableSource {
        let header = self
            .labels
            .into_iter()
            .enumerate()
            .map(|(col, label)| {
                if unsortable.contains(&col) {
                    Column::unsortable(label)
                } else {
                    Column::new(label)
                }
            })
            .collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(Cell::from).collect())
            .collect();
        TableSource::new(header, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_from_extension() {
        assert_eq!(delimiter_for(Path::new("books.tsv")), b'\t');
        assert_eq!(delimiter_for(Path::new("BOOKS.TAB")), b'\t');
        assert_eq!(delimiter_for(Path::new("books.csv")), b',');
        assert_eq!(delimiter_for(Path::new("-")), b',');
    }

    #[test]
    fn test_parse_with_header() {
        let t = RawTable::parse("Titre,Année\nNana,1880\nGerminal,1885\n", b',', true).unwrap();
        assert_eq!(t.labels, vec!["Titre", "Année"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[1], vec!["Germinal", "1885"]);
    }

    #[test]
    fn test_parse_without_header() {
        let t = RawTable::parse("a\tb\tc\nd\te\n", b'\t', false).unwrap();
        assert_eq!(t.labels, vec!["1", "2", "3"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[1], vec!["d", "e"]);
    }

    #[test]
    fn test_parse_strips_bom_and_quotes() {
        let t = RawTable::parse("\u{feff}name,note\n\"Hugo, Victor\",5\n", b',', true).unwrap();
        assert_eq!(t.labels[0], "name");
        assert_eq!(t.rows[0][0], "Hugo, Victor");
    }

    #[test]
    fn test_resolve_column() {
        let t = RawTable::parse("Titre,Année\nNana,1880\n", b',', true).unwrap();
        assert_eq!(t.resolve_column("1").unwrap(), 0);
        assert_eq!(t.resolve_column("2").unwrap(), 1);
        assert_eq!(t.resolve_column("année").unwrap(), 1);
        assert_eq!(t.resolve_column(" TITRE ").unwrap(), 0);
        assert!(t.resolve_column("3").is_err());
        assert!(t.resolve_column("auteur").is_err());
    }

    #[test]
    fn test_into_source_marks_unsortable() {
        let t = RawTable::parse("a,b\n1,2\n", b',', true).unwrap();
        let source = t.into_source(&[1]);
        let header = source.header.unwrap();
        assert!(header[0].sortable);
        assert!(!header[1].sortable);
        assert_eq!(source.rows[0][1].text, "2");
    }
}
