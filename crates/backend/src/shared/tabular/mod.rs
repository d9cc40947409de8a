//! Чтение табличных файлов (xlsx/csv) в строки `ImportRow`.
//!
//! Первая строка листа - заголовки. Полностью пустые строки отбрасываются,
//! пустые ячейки в строку не попадают.

pub mod delimited;
pub mod xlsx;

use contracts::domain::a001_question::{CellValue, ImportRow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TabularError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("file has no header row")]
    NoHeader,
    #[error("workbook has no sheets")]
    NoSheet,
    #[error("workbook part not found: {0}")]
    MissingPart(String),
    #[error("not a valid xlsx container: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("invalid cell address: {0}")]
    InvalidAddress(String),
    #[error("shared string index {0} out of bounds")]
    SharedStringOutOfBounds(usize),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ячейки листа по строкам; строки могут быть разной длины
pub type Grid = Vec<Vec<CellValue>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xlsx,
    Csv,
}

impl SourceFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self, TabularError> {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("xlsx") => Ok(SourceFormat::Xlsx),
            Some("csv") => Ok(SourceFormat::Csv),
            _ => Err(TabularError::UnsupportedFormat(file_name.to_string())),
        }
    }
}

/// Прочитать файл целиком и вернуть строки данных первого листа
pub fn read_rows(file_name: &str, bytes: &[u8]) -> Result<Vec<ImportRow>, TabularError> {
    let grid = match SourceFormat::from_file_name(file_name)? {
        SourceFormat::Xlsx => xlsx::read_first_sheet(bytes)?,
        SourceFormat::Csv => delimited::read_grid(bytes)?,
    };
    rows_from_grid(grid)
}

/// Превратить сетку ячеек в строки "заголовок -> значение"
pub fn rows_from_grid(grid: Grid) -> Result<Vec<ImportRow>, TabularError> {
    let mut grid_rows = grid.into_iter().enumerate();

    let headers: Vec<Option<String>> = match grid_rows.next() {
        Some((_, header_row)) => header_row.iter().map(CellValue::as_text).collect(),
        None => return Err(TabularError::NoHeader),
    };
    if headers.iter().all(Option::is_none) {
        return Err(TabularError::NoHeader);
    }

    let mut rows = Vec::new();
    for (idx, cells) in grid_rows {
        let mut row = ImportRow::new(idx + 1);
        for (col, value) in cells.into_iter().enumerate() {
            let Some(Some(header)) = headers.get(col) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            // Повторяющийся заголовок: побеждает первая колонка
            row.cells.entry(header.clone()).or_insert(value);
        }
        if !row.cells.is_empty() {
            rows.push(row);
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SourceFormat::from_file_name("Sorular.XLSX").unwrap(),
            SourceFormat::Xlsx
        );
        assert_eq!(
            SourceFormat::from_file_name("export.csv").unwrap(),
            SourceFormat::Csv
        );
        assert!(matches!(
            SourceFormat::from_file_name("legacy.xls"),
            Err(TabularError::UnsupportedFormat(_))
        ));
        assert!(SourceFormat::from_file_name("noext").is_err());
    }

    #[test]
    fn test_rows_from_grid_skips_blank_rows_and_cells() {
        let grid = vec![
            vec![text("Soru"), text("Cevap"), CellValue::Empty],
            vec![text("Başkent?"), text("Ankara"), text("orphan")],
            vec![CellValue::Empty, text("  ")],
            vec![CellValue::Empty, CellValue::Number(4.0)],
        ];

        let rows = rows_from_grid(grid).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].cells.len(), 2);
        assert_eq!(rows[0].cells["Soru"], text("Başkent?"));

        assert_eq!(rows[1].row_number, 4);
        assert!(!rows[1].cells.contains_key("Soru"));
        assert_eq!(rows[1].cells["Cevap"], CellValue::Number(4.0));
    }

    #[test]
    fn test_duplicate_header_keeps_first_column() {
        let grid = vec![
            vec![text("answer"), text("answer")],
            vec![text("first"), text("second")],
        ];
        let rows = rows_from_grid(grid).unwrap();
        assert_eq!(rows[0].cells["answer"], text("first"));
    }

    #[test]
    fn test_missing_header_is_an_error() {
        assert!(matches!(rows_from_grid(vec![]), Err(TabularError::NoHeader)));
        assert!(matches!(
            rows_from_grid(vec![vec![CellValue::Empty]]),
            Err(TabularError::NoHeader)
        ));
    }

    #[test]
    fn test_read_rows_rejects_unknown_extension_before_parsing() {
        let err = read_rows("sorular.ods", b"whatever").unwrap_err();
        assert!(matches!(err, TabularError::UnsupportedFormat(_)));
    }
}
