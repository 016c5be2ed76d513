use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::schema::Row;

pub fn read_rows(path: &Path, has_header: bool) -> Result<Vec<Row>> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    rows_from_reader(file, has_header).with_context(|| format!("Failed to read {:?}", path))
}

/// Rows of any width are passed through; short ones fail later in the
/// schema accessor with their line number.
pub fn rows_from_reader<R: Read>(reader: R, has_header: bool) -> Result<Vec<Row>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, record) in csv.byte_records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1 + usize::from(has_header));
        let fields = record
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect();
        rows.push(Row::new(line, fields));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use std::io::Write;

    const ROSTER: &str = "\
state,full,last,first,party,a1,a2,a3,tel,dc,dctel,email,web,class,id,photo
NY,Jane Q. Doe,Doe,Jane,D,123 Main St,Suite 4,\"Springfield, NY 12345\",555-1234,...,555-5678,jane@example.gov,http://jane.senate.gov,I,D000123,photo.jpg
TX,John Roe,Roe,John,R,1 Elm St,,\"Austin, TX 78701\",555-0000,...,555-1111,http://roe.senate.gov/contact,http://roe.senate.gov,II,R000001,roe.jpg
";

    #[test]
    fn skips_header_and_keeps_quoted_commas() {
        let rows = rows_from_reader(ROSTER.as_bytes(), true).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line(), 2);
        assert_eq!(rows[0].get(Field::DistrictAddress3).unwrap(), "Springfield, NY 12345");
        assert_eq!(rows[1].get(Field::DistrictAddress2).unwrap(), "");
        assert_eq!(rows[1].get(Field::Email).unwrap(), "http://roe.senate.gov/contact");
    }

    #[test]
    fn header_row_is_data_when_disabled() {
        let rows = rows_from_reader(ROSTER.as_bytes(), false).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get(Field::FirstName).unwrap(), "first");
    }

    #[test]
    fn short_rows_reach_the_caller() {
        let rows = rows_from_reader("h1,h2\nNY,Jane\n".as_bytes(), true).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
        assert!(rows[0].validate().is_err());
    }

    #[test]
    fn reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ROSTER.as_bytes()).unwrap();
        let rows = read_rows(file.path(), true).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(read_rows(Path::new("/nonexistent/senators.csv"), true).is_err());
    }
}
