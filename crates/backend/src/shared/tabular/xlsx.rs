//! Минимальный разбор xlsx: workbook, связи, shared strings и первый лист.

use super::{Grid, TabularError};
use contracts::domain::a001_question::CellValue;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

/// Пределы листа Excel: 1 048 576 строк, 16 384 колонки (XFD)
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

struct SheetDescriptor {
    rel_id: Option<String>,
    sheet_id: Option<u32>,
}

/// Ячейки первого листа книги
pub fn read_first_sheet(bytes: &[u8]) -> Result<Grid, TabularError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let workbook_xml = read_part(&mut archive, "xl/workbook.xml")?
        .ok_or_else(|| TabularError::MissingPart("xl/workbook.xml".to_string()))?;
    let sheets = parse_workbook_sheets(&workbook_xml)?;
    let first = sheets.first().ok_or(TabularError::NoSheet)?;

    let relationships = match read_part(&mut archive, "xl/_rels/workbook.xml.rels")? {
        Some(xml) => parse_relationships(&xml)?,
        None => HashMap::new(),
    };
    let target = resolve_sheet_target(first, &relationships);

    let shared_strings = match read_part(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let sheet_xml =
        read_part(&mut archive, &target)?.ok_or_else(|| TabularError::MissingPart(target.clone()))?;
    parse_sheet(&sheet_xml, &shared_strings)
}

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<Vec<u8>>, TabularError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(Some(buf))
}

fn parse_workbook_sheets(xml: &[u8]) -> Result<Vec<SheetDescriptor>, TabularError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                let mut rel_id = None;
                let mut sheet_id = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(xml_err)?;
                    let value = attr.unescape_value().map_err(xml_err)?.into_owned();
                    if attr.key.as_ref() == b"sheetId" {
                        sheet_id = value.parse::<u32>().ok();
                    } else if attr.key.local_name().as_ref() == b"id" && attr.key.prefix().is_some()
                    {
                        // r:id
                        rel_id = Some(value);
                    }
                }
                sheets.push(SheetDescriptor { rel_id, sheet_id });
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, TabularError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut map = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = get_attr_value(&e, b"Id")?;
                let target = get_attr_value(&e, b"Target")?;
                let rel_type = get_attr_value(&e, b"Type")?.unwrap_or_default();
                if let (Some(id), Some(target)) = (id, target) {
                    if rel_type.contains("worksheet") {
                        map.insert(id, target);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(map)
}

fn resolve_sheet_target(sheet: &SheetDescriptor, relationships: &HashMap<String, String>) -> String {
    if let Some(target) = sheet.rel_id.as_ref().and_then(|id| relationships.get(id)) {
        return normalize_target(target);
    }

    let guessed = format!("worksheets/sheet{}.xml", sheet.sheet_id.unwrap_or(1));
    normalize_target(&guessed)
}

fn normalize_target(target: &str) -> String {
    let trimmed = target.trim_start_matches('/');
    if trimmed.starts_with("xl/") {
        trimmed.to_string()
    } else {
        format!("xl/{trimmed}")
    }
}

/// Таблица общих строк; rich text склеивается, фонетические подсказки (rPh) пропускаются
fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, TabularError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"si" => {
                current.clear();
                in_si = true;
            }
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"rPh" => in_phonetic = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"rPh" => in_phonetic = false,
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" && in_si => {
                let text = read_unescaped_text(&mut reader, &e)?;
                if !in_phonetic {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"si" => {
                strings.push(std::mem::take(&mut current));
                in_si = false;
            }
            // <si/> - пустая строка, но индекс занимает
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

fn parse_sheet(xml: &[u8], shared_strings: &[String]) -> Result<Grid, TabularError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut grid: Grid = Vec::new();
    // Позиция для ячеек без атрибута r
    let mut current_row: usize = 0;
    let mut next_col: usize = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"row" => {
                current_row = match get_attr_value(&e, b"r")? {
                    Some(r) => r
                        .parse::<usize>()
                        .ok()
                        .filter(|r| (1..=MAX_ROWS).contains(r))
                        .map(|r| r - 1)
                        .ok_or(TabularError::InvalidAddress(r))?,
                    None => grid.len(),
                };
                next_col = 0;
            }
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"c" => {
                let (row, col) = cell_position(&e, current_row, next_col)?;
                let value = parse_cell(&mut reader, &e, shared_strings)?;
                place_cell(&mut grid, row, col, value);
                next_col = col + 1;
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"c" => {
                let (_, col) = cell_position(&e, current_row, next_col)?;
                next_col = col + 1;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(grid)
}

fn cell_position(
    cell: &BytesStart<'_>,
    current_row: usize,
    next_col: usize,
) -> Result<(usize, usize), TabularError> {
    match get_attr_value(cell, b"r")? {
        Some(address) => address_to_index(&address).ok_or(TabularError::InvalidAddress(address)),
        None if next_col < MAX_COLS => Ok((current_row, next_col)),
        None => Err(TabularError::InvalidAddress(format!(
            "row {} column {}",
            current_row + 1,
            next_col + 1
        ))),
    }
}

fn place_cell(grid: &mut Grid, row: usize, col: usize, value: CellValue) {
    if grid.len() <= row {
        grid.resize_with(row + 1, Vec::new);
    }
    let cells = &mut grid[row];
    if cells.len() <= col {
        cells.resize(col + 1, CellValue::Empty);
    }
    cells[col] = value;
}

fn parse_cell(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    shared_strings: &[String],
) -> Result<CellValue, TabularError> {
    let cell_type = get_attr_value(start, b"t")?;
    let mut value_text: Option<String> = None;
    let mut inline_text: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"v" => {
                value_text = Some(read_unescaped_text(reader, &e)?);
            }
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"is" => {
                inline_text = Some(read_inline_string(reader)?);
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"c" => break,
            Ok(Event::Eof) => {
                return Err(TabularError::Xml("unexpected EOF inside cell".to_string()))
            }
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }

    if let Some(text) = inline_text {
        return Ok(CellValue::Text(text));
    }
    convert_value(value_text.as_deref(), cell_type.as_deref(), shared_strings)
}

fn read_inline_string(reader: &mut Reader<&[u8]>) -> Result<String, TabularError> {
    let mut buf = Vec::new();
    let mut value = String::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => {
                value.push_str(&read_unescaped_text(reader, &e)?);
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"is" => break,
            Ok(Event::Eof) => {
                return Err(TabularError::Xml(
                    "unexpected EOF inside inline string".to_string(),
                ))
            }
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(value)
}

fn read_unescaped_text(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<String, TabularError> {
    let raw = reader.read_text(start.name()).map_err(xml_err)?;
    let text = quick_xml::escape::unescape(&raw).map_err(xml_err)?;
    Ok(text.into_owned())
}

fn convert_value(
    value_text: Option<&str>,
    cell_type: Option<&str>,
    shared_strings: &[String],
) -> Result<CellValue, TabularError> {
    let raw = match value_text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Ok(CellValue::Empty),
    };
    let trimmed = raw.trim();

    match cell_type {
        Some("s") => {
            let idx = trimmed
                .parse::<usize>()
                .map_err(|e| TabularError::Xml(e.to_string()))?;
            shared_strings
                .get(idx)
                .map(|s| CellValue::Text(s.clone()))
                .ok_or(TabularError::SharedStringOutOfBounds(idx))
        }
        Some("b") => Ok(match trimmed {
            "1" => CellValue::Bool(true),
            "0" => CellValue::Bool(false),
            _ => CellValue::Empty,
        }),
        // #N/A, #DIV/0! и т.п. не несут данных для импорта
        Some("e") => Ok(CellValue::Empty),
        Some("str") | Some("inlineStr") => Ok(CellValue::Text(raw.to_string())),
        _ => Ok(trimmed
            .parse::<f64>()
            .map(CellValue::Number)
            .unwrap_or_else(|_| CellValue::Text(trimmed.to_string()))),
    }
}

/// "B3" -> (2, 1), нумерация с нуля. Адреса за пределами листа Excel - None
fn address_to_index(address: &str) -> Option<(usize, usize)> {
    let split = address.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = address.split_at(split);
    if letters.is_empty()
        || letters.len() > 3
        || !letters.chars().all(|c| c.is_ascii_alphabetic())
    {
        return None;
    }

    let mut col: usize = 0;
    for ch in letters.chars() {
        let n = (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        col = col.checked_mul(26)?.checked_add(n)?;
    }
    let row = digits.parse::<usize>().ok()?;
    if !(1..=MAX_ROWS).contains(&row) || col > MAX_COLS {
        return None;
    }
    Some((row - 1, col - 1))
}

fn get_attr_value(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, TabularError> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_err)?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value().map_err(xml_err)?.into_owned()));
        }
    }
    Ok(None)
}

fn xml_err(err: impl std::fmt::Display) -> TabularError {
    TabularError::Xml(err.to_string())
}
