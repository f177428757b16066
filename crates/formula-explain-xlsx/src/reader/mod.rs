//! XLSX reader

mod shared;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use formula_explain_core::{CellAddress, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' || chars.peek() != Some(&'x') {
            result.push(c);
            continue;
        }

        chars.next(); // consume 'x'
        let mut hex_chars = String::new();
        while hex_chars.len() < 4 {
            match chars.peek() {
                Some(&ch) if ch.is_ascii_hexdigit() => {
                    hex_chars.push(ch);
                    chars.next();
                }
                _ => break,
            }
        }

        let decoded = if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
            u32::from_str_radix(&hex_chars, 16)
                .ok()
                .and_then(char::from_u32)
        } else {
            None
        };

        match decoded {
            Some(decoded) => {
                chars.next(); // consume closing '_'
                result.push(decoded);
            }
            None => {
                // Not a valid escape sequence, output what we consumed
                result.push_str("_x");
                result.push_str(&hex_chars);
            }
        }
    }

    result
}

/// Display text of a numeric cell: integral values print without a fraction
fn format_number(value: &str) -> String {
    match value.parse::<f64>() {
        Ok(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        Ok(n) => format!("{}", n),
        Err(_) => value.to_string(),
    }
}

/// A cell as collected between `<c>` and `</c>`
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    value: Option<String>,
    formula: Option<String>,
    shared_group: Option<String>,
}

/// Anchor cell and text of a shared formula group
struct SharedFormula {
    anchor: CellAddress,
    text: String,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        // Read shared strings (if present)
        let shared_strings = Self::read_shared_strings(&mut archive)?;

        // Read workbook.xml to get sheet info
        let sheet_info = Self::read_workbook_xml(&mut archive)?;

        // Read workbook.xml.rels to get sheet paths
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no worksheet part ({}), skipping", name, r_id);
                continue;
            };

            let mut worksheet = Worksheet::new(name.as_str());
            Self::read_worksheet(&mut archive, path, &mut worksheet, &shared_strings)?;
            workbook.add_existing_worksheet(worksheet)?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    let text = e.unescape()?;
                    current_string.push_str(&text);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds, in workbook order
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let name = attribute(&e, b"name");
                    let r_id = attribute(&e, b"r:id");

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attribute(&e, b"Id");
                    let target = attribute(&e, b"Target");
                    let rel_type = attribute(&e, b"Type");

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read cell text and formulas of a worksheet
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(false);

        let mut buf = Vec::new();

        let mut cell: Option<PendingCell> = None;
        let mut shared_formulas: HashMap<String, SharedFormula> = HashMap::new();
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"c" => cell = Some(start_cell(&e)),
                    b"v" if cell.is_some() => in_value = true,
                    b"f" => {
                        if let Some(cell) = cell.as_mut() {
                            in_formula = true;
                            cell.shared_group = shared_group(&e);
                        }
                    }
                    b"is" if cell.is_some() => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    // <c r="A1"/> carries neither value nor formula
                    b"c" => cell = None,
                    // Follower cell of a shared formula
                    b"f" => {
                        if let Some(cell) = cell.as_mut() {
                            cell.shared_group = shared_group(&e);
                        }
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(done) = cell.take() {
                            Self::process_cell(worksheet, done, shared_strings, &mut shared_formulas)?;
                        }
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"is" => in_inline_str = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some(cell) = cell.as_mut() {
                        if in_value {
                            push_text(&mut cell.value, &e.unescape()?);
                        } else if in_formula {
                            push_text(&mut cell.formula, &e.unescape()?);
                        } else if in_inline_text {
                            push_text(&mut cell.value, &e.unescape()?);
                            cell.cell_type = Some("inlineStr".to_string());
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Store a finished cell's text and formula in the worksheet
    fn process_cell(
        worksheet: &mut Worksheet,
        cell: PendingCell,
        shared_strings: &[String],
        shared_formulas: &mut HashMap<String, SharedFormula>,
    ) -> XlsxResult<()> {
        let Some(cell_ref) = cell.reference.as_deref() else {
            log::warn!("cell without a reference in '{}', skipping", worksheet.name());
            return Ok(());
        };

        let addr = CellAddress::parse(cell_ref).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
        })?;

        if let Some(value) = cell.value.as_deref() {
            let text = match cell.cell_type.as_deref() {
                // Shared string
                Some("s") => {
                    let idx: usize = value.trim().parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", value))
                    })?;
                    shared_strings
                        .get(idx)
                        .cloned()
                        .ok_or_else(|| {
                            XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                        })?
                }

                // Boolean
                Some("b") => {
                    if value == "1" || value.eq_ignore_ascii_case("true") {
                        "TRUE".to_string()
                    } else {
                        "FALSE".to_string()
                    }
                }

                // Inline or formula string - decode Excel escape sequences
                Some("inlineStr") | Some("str") => decode_excel_escapes(value),

                // Number (default type or explicit "n")
                None | Some("n") => format_number(value),

                // Error codes and anything unknown keep their text
                Some(_) => value.to_string(),
            };

            worksheet.set_value_at(addr.row, addr.col, text)?;
        }

        let formula = match (cell.formula, cell.shared_group) {
            (Some(text), Some(group)) => {
                shared_formulas.insert(
                    group,
                    SharedFormula {
                        anchor: addr,
                        text: text.clone(),
                    },
                );
                Some(text)
            }
            (Some(text), None) => Some(text),
            (None, Some(group)) => match shared_formulas.get(&group) {
                Some(shared) => Some(shared::shift_formula(
                    &shared.text,
                    addr.row as i64 - shared.anchor.row as i64,
                    addr.col as i64 - shared.anchor.col as i64,
                )),
                None => {
                    log::warn!(
                        "{}!{} refers to unknown shared formula {}",
                        worksheet.name(),
                        cell_ref,
                        group
                    );
                    None
                }
            },
            (None, None) => None,
        };

        if let Some(formula) = formula {
            worksheet.set_formula_at(addr.row, addr.col, formula)?;
        }

        Ok(())
    }
}

/// Read the attributes of a `<c>` element
fn start_cell(e: &BytesStart) -> PendingCell {
    PendingCell {
        reference: attribute(e, b"r"),
        cell_type: attribute(e, b"t"),
        ..PendingCell::default()
    }
}

/// Shared group id of an `<f>` element, if it is a shared formula
fn shared_group(e: &BytesStart) -> Option<String> {
    if attribute(e, b"t").as_deref() == Some("shared") {
        attribute(e, b"si")
    } else {
        None
    }
}

fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

fn push_text(target: &mut Option<String>, text: &str) {
    target.get_or_insert_with(String::new).push_str(text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("col1_x0009_col2"), "col1\tcol2");
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("_x000A_"), "\n");
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("unit_price"), "unit_price");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number("42"), "42");
        assert_eq!(format_number("42.0"), "42");
        assert_eq!(format_number("3.5"), "3.5");
        assert_eq!(format_number("-1E+2"), "-100");
        assert_eq!(format_number("abc"), "abc");
    }

    fn xlsx_with_sheets(sheets: &[(&str, &str)], shared_strings: Option<&str>) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

            let mut workbook = String::from(r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
            let mut rels = String::from(r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
            for (i, (name, _)) in sheets.iter().enumerate() {
                workbook.push_str(&format!(
                    r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                    name,
                    i + 1,
                    i + 1
                ));
                rels.push_str(&format!(
                    r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                    i + 1,
                    i + 1
                ));
            }
            workbook.push_str("</sheets></workbook>");
            rels.push_str("</Relationships>");

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(workbook.as_bytes()).unwrap();
            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(rels.as_bytes()).unwrap();

            if let Some(sst) = shared_strings {
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(sst.as_bytes()).unwrap();
            }

            for (i, (_, sheet_data)) in sheets.iter().enumerate() {
                zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
                    .unwrap();
                zip.write_all(format!(
                    r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                    sheet_data
                ).as_bytes()).unwrap();
            }

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_empty_sheet() {
        let bytes = xlsx_with_sheets(&[("Sheet1", "")], None);
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();

        assert_eq!(workbook.sheet_count(), 1);
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.name(), "Sheet1");
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_read_headers_and_formulas() {
        let sst = r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="4" uniqueCount="4"><si><t>Price</t></si><si><t>Qty</t></si><si><r><t>To</t></r><r><t>tal</t></r></si><si><t>Avg</t><rPh sb="0" eb="1"><t>ignored</t></rPh></si></sst>"#;
        let sheet = concat!(
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="s"><v>2</v></c><c r="D1" t="s"><v>3</v></c></row>"#,
            r#"<row r="2"><c r="A2"><v>2.5</v></c><c r="B2"><v>4</v></c><c r="C2"><f>SUM(A2:B2)</f><v>6.5</v></c><c r="D2"><f>AVERAGE(A2:B2)</f><v>3.25</v></c></row>"#,
        );

        let bytes = xlsx_with_sheets(&[("Sales", sheet)], Some(sst));
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        let sheet = workbook.worksheet_by_name("Sales").unwrap();

        assert_eq!(
            sheet.header_row().iter().collect::<Vec<_>>(),
            vec!["Price", "Qty", "Total", "Avg"]
        );
        assert_eq!(sheet.value_at(1, 0), Some("2.5"));
        assert_eq!(sheet.value_at(1, 2), Some("6.5"));

        let formulas: Vec<String> = sheet.raw_formulas().iter().map(ToString::to_string).collect();
        assert_eq!(formulas, vec!["C2=SUM(A2:B2)", "D2=AVERAGE(A2:B2)"]);
    }

    #[test]
    fn test_read_inline_strings_and_booleans() {
        let sheet = r#"<row r="1"><c r="A1" t="inlineStr"><is><t>Line_x000a_Two</t></is></c><c r="B1" t="b"><v>1</v></c><c r="C1" t="e"><v>#N/A</v></c><c r="D1" s="3"/></row>"#;

        let bytes = xlsx_with_sheets(&[("Sheet1", sheet)], None);
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        let sheet = workbook.worksheet(0).unwrap();

        assert_eq!(
            sheet.header_row().iter().collect::<Vec<_>>(),
            vec!["Line\nTwo", "TRUE", "#N/A"]
        );
    }

    #[test]
    fn test_read_shared_formulas() {
        let sheet = concat!(
            r#"<row r="2"><c r="C2"><f t="shared" ref="C2:D3" si="0">SUM(A2:B2)</f><v>3</v></c><c r="D2"><f t="shared" si="0"/><v>5</v></c></row>"#,
            r#"<row r="3"><c r="C3"><f t="shared" si="0"/><v>7</v></c><c r="E3"><f t="shared" si="9"/></c></row>"#,
        );

        let bytes = xlsx_with_sheets(&[("Sheet1", sheet)], None);
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        let sheet = workbook.worksheet(0).unwrap();

        let formulas: Vec<String> = sheet.raw_formulas().iter().map(ToString::to_string).collect();
        assert_eq!(
            formulas,
            vec!["C2=SUM(A2:B2)", "D2=SUM(B2:C2)", "C3=SUM(A3:B3)"]
        );
    }

    #[test]
    fn test_sheet_order_follows_workbook() {
        let bytes = xlsx_with_sheets(
            &[
                ("Summary", r#"<row r="1"><c r="A1"><v>1</v></c></row>"#),
                ("Data", ""),
            ],
            None,
        );
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Summary", "Data"]);
    }

    #[test]
    fn test_missing_content_types() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("xl/workbook.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<workbook/>").unwrap();
            zip.finish().unwrap();
        }

        assert!(matches!(
            XlsxReader::read(Cursor::new(buf)),
            Err(XlsxError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            XlsxReader::read(Cursor::new(b"Price,Qty\n".to_vec())),
            Err(XlsxError::Zip(_))
        ));
    }
}
