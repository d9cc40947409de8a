use contracts::domain::a001_question::aggregate::MAX_OPTIONS;
use contracts::domain::a001_question::{CanonicalField, QuestionRecord};
use contracts::usecases::u501_import_questions::ExportFormat;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV buffer error: {0}")]
    Buffer(String),
}

const SHEET_NAME: &str = "Sorular";

/// Выгрузка коллекции в тех же колонках, что принимает импорт
pub fn export_records(
    records: &[QuestionRecord],
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    let truncated = records
        .iter()
        .filter(|r| r.options.len() > MAX_OPTIONS)
        .count();
    if truncated > 0 {
        tracing::warn!(
            "{} questions have more than {} options, extra options are not exported",
            truncated,
            MAX_OPTIONS
        );
    }

    match format {
        ExportFormat::Xlsx => to_xlsx(records),
        ExportFormat::Csv => to_csv(records),
    }
}

fn to_xlsx(records: &[QuestionRecord]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, field) in CanonicalField::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, field.column_name(), &header_format)?;
    }
    sheet.set_column_width(1, 60)?;

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, field) in CanonicalField::ALL.iter().enumerate() {
            if let Some(value) = record.field_value(*field) {
                sheet.write_string(row, col as u16, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn to_csv(records: &[QuestionRecord]) -> Result<Vec<u8>, ExportError> {
    // BOM, чтобы Excel открыл турецкие символы как UTF-8
    let mut writer = csv::Writer::from_writer(b"\xEF\xBB\xBF".to_vec());

    writer.write_record(CanonicalField::ALL.iter().map(|f| f.column_name()))?;
    for record in records {
        writer.write_record(
            CanonicalField::ALL
                .iter()
                .map(|f| record.field_value(*f).unwrap_or("")),
        )?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))
}
