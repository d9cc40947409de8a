use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Значение ячейки табличного источника
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// Текстовое представление ячейки; пустые и пробельные ячейки дают None
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().is_none()
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Целые числа без ".0": в Excel номер варианта "1" хранится как 1.0
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Строка из табличного файла до нормализации заголовков
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    /// Номер строки в листе (заголовок - строка 1)
    pub row_number: usize,
    /// Заголовок колонки -> значение. Пустые ячейки отсутствуют
    pub cells: HashMap<String, CellValue>,
}

impl ImportRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            cells: HashMap::new(),
        }
    }

    pub fn with_cell(mut self, header: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.insert(header.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(3.0).as_text().as_deref(), Some("3"));
        assert_eq!(CellValue::Number(2.5).as_text().as_deref(), Some("2.5"));
        assert_eq!(CellValue::Number(-7.0).as_text().as_deref(), Some("-7"));
    }

    #[test]
    fn test_blank_cells_have_no_text() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::Text("   ".to_string()).is_empty());
        assert_eq!(
            CellValue::Text("  Ankara ".to_string()).as_text().as_deref(),
            Some("Ankara")
        );
    }

    #[test]
    fn test_untagged_json_cells() {
        let row: HashMap<String, CellValue> =
            serde_json::from_str(r#"{"a": "x", "b": 4, "c": null, "d": true}"#).unwrap();
        assert_eq!(row["a"], CellValue::Text("x".to_string()));
        assert_eq!(row["b"], CellValue::Number(4.0));
        assert_eq!(row["c"], CellValue::Empty);
        assert_eq!(row["d"], CellValue::Bool(true));
    }
}
