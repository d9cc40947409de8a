use super::{Grid, TabularError};
use contracts::domain::a001_question::CellValue;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV (запятая, UTF-8). Все значения читаются как текст
pub fn read_grid(bytes: &[u8]) -> Result<Grid, TabularError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::tabular::rows_from_grid;

    #[test]
    fn test_reads_bom_and_quoted_fields() {
        let csv = "\u{FEFF}key,text,option1,option2\nsoru1,\"Hangisi, doğru?\",A,B\n,,,\n";
        let grid = read_grid(csv.as_bytes()).unwrap();
        assert_eq!(grid[0][0], CellValue::Text("key".to_string()));
        assert_eq!(grid[1][1], CellValue::Text("Hangisi, doğru?".to_string()));

        let rows = rows_from_grid(grid).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_number, 2);
    }

    #[test]
    fn test_short_rows_are_accepted() {
        let grid = read_grid(b"a,b,c\n1\n").unwrap();
        assert_eq!(grid[1].len(), 1);
    }
}
