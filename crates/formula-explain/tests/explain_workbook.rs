//! End-to-end tests: open a file, pick a sheet, explain its formulas

use formula_explain::prelude::*;
use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};
use std::path::Path;

/// Write a minimal XLSX package with the given `(name, sheetData)` sheets
fn write_xlsx(path: &Path, sheets: &[(&str, &str)]) {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();

        let mut workbook = String::from(r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
        let mut rels = String::from("<Relationships>");
        for (i, (name, data)) in sheets.iter().enumerate() {
            let n = i + 1;
            workbook.push_str(&format!(r#"<sheet name="{name}" sheetId="{n}" r:id="rId{n}"/>"#));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
            ));

            zip.start_file(format!("xl/worksheets/sheet{n}.xml"), options)
                .unwrap();
            zip.write_all(format!("<worksheet><sheetData>{data}</sheetData></worksheet>").as_bytes())
                .unwrap();
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(workbook.as_bytes()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    std::fs::write(path, buf).unwrap();
}

const SALES: &str = concat!(
    r#"<row r="1"><c r="A1" t="inlineStr"><is><t>Price</t></is></c><c r="B1" t="inlineStr"><is><t>Qty</t></is></c>"#,
    r#"<c r="C1" t="inlineStr"><is><t>Total</t></is></c><c r="D1" t="inlineStr"><is><t>Avg</t></is></c></row>"#,
    r#"<row r="2"><c r="A2"><v>2.5</v></c><c r="B2"><v>4</v></c>"#,
    r#"<c r="C2"><f t="shared" ref="C2:C3" si="0">SUM(A2:B2)</f><v>6.5</v></c><c r="D2"><f>AVERAGE(A2:B2)</f><v>3.25</v></c></row>"#,
    r#"<row r="3"><c r="A3"><v>1</v></c><c r="B3"><v>1</v></c><c r="C3"><f t="shared" si="0"/><v>2</v></c></row>"#,
);

#[test]
fn test_open_xlsx_and_explain() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.xlsx");
    write_xlsx(&path, &[("Sales", SALES)]);

    let workbook = Workbook::open(&path).unwrap();
    let sheet = workbook.worksheet(0).unwrap();

    assert_eq!(
        sheet.explain(&InterpretOptions::default()).lines(),
        vec!["Total = SUM(Price + Qty)", "Avg = AVERAGE(Price + Qty)"]
    );

    let append = InterpretOptions {
        duplicate_headers: DuplicateHeaders::Append,
    };
    assert_eq!(
        sheet.explain(&append).pairs(),
        vec![
            ("Total", "SUM(Price + Qty)"),
            ("Avg", "AVERAGE(Price + Qty)"),
            ("Total", "SUM(Price + Qty)"),
        ]
    );
}

#[test]
fn test_open_xlsm_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Macros.XLSM");
    write_xlsx(&path, &[("Sales", SALES)]);

    let workbook = Workbook::open(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Sales"]);
}

#[test]
fn test_explain_all_sheets_independently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    let budget = concat!(
        r#"<row r="1"><c r="A1" t="inlineStr"><is><t>Rent</t></is></c><c r="B1" t="inlineStr"><is><t>Food</t></is></c>"#,
        r#"<c r="C1" t="inlineStr"><is><t>Total</t></is></c></row>"#,
        r#"<row r="2"><c r="C2"><f>SUM(A2:B2)</f></c></row>"#,
    );
    write_xlsx(&path, &[("Sales", SALES), ("Budget", budget), ("Notes", "")]);

    let workbook = Workbook::open(&path).unwrap();
    let all = workbook.explain_all(&InterpretOptions::default());

    let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Sales", "Budget", "Notes"]);

    // Same expression text, different headers per sheet
    assert_eq!(all[0].explanations.pairs()[0], ("Total", "SUM(Price + Qty)"));
    assert_eq!(all[1].explanations.pairs(), vec![("Total", "SUM(Rent + Food)")]);
    assert!(all[2].explanations.is_empty());
}

#[test]
fn test_open_csv_and_explain() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.csv");
    std::fs::write(
        &path,
        "Price,Qty,Total,Avg\n2.5,4,=SUM(A2:B2),=AVERAGE(A2:B2)\n1,1,=MEDIAN(A3:B3),\n",
    )
    .unwrap();

    let workbook = Workbook::open(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Sheet1"]);

    let explanations = workbook.worksheet(0).unwrap().explain(&InterpretOptions::default());
    assert_eq!(
        explanations.to_string(),
        "Total = SUM(Price + Qty)\nAvg = AVERAGE(Price + Qty)\n"
    );
}

#[test]
fn test_open_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();

    let err = Workbook::open(&path).unwrap_err();
    assert!(matches!(err, Error::Other(_)));
    assert!(err.to_string().starts_with("Unsupported file format"));
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Workbook::open(dir.path().join("missing.xlsx")).is_err());
}

#[cfg(feature = "serde")]
#[test]
fn test_explanations_serialize_as_json() {
    let explanations = formula_explain::interpret_strings(
        &["C2=SUM(A2:B2)", "D2=AVERAGE(A2:B2)"],
        &HeaderRow::from(vec!["Price", "Qty", "Total", "Avg"]),
        &InterpretOptions::default(),
    );

    assert_eq!(
        serde_json::to_value(&explanations).unwrap(),
        serde_json::json!([
            {"header": "Total", "formula": "SUM(Price + Qty)"},
            {"header": "Avg", "formula": "AVERAGE(Price + Qty)"},
        ])
    );
}
