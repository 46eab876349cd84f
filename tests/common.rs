#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A fixture cell
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Empty,
}

use Cell::{Empty, Number as N, Text as T};

fn column_letter(col: usize) -> char {
    (b'A' + col as u8) as char
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn sheet_xml(rows: &[Vec<Cell>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (row_idx, row) in rows.iter().enumerate() {
        let r = row_idx + 1;
        xml.push_str(&format!(r#"<row r="{r}">"#));
        for (col_idx, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letter(col_idx), r);
            match cell {
                Cell::Text(text) => xml.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    escape(text)
                )),
                Cell::Number(n) => xml.push_str(&format!(r#"<c r="{reference}"><v>{n}</v></c>"#)),
                Cell::Empty => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Build an xlsx archive in memory with the given sheets
pub fn workbook_bytes(sheets: &[(&str, Vec<Vec<Cell>>)]) -> Vec<u8> {
    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut workbook_rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            escape(name)
        ));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }

    content_types.push_str("</Types>");
    workbook.push_str("</sheets></workbook>");
    workbook_rels.push_str("</Relationships>");

    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

    let cursor = Cursor::new(Vec::new());
    let mut writer = ZipWriter::new(cursor);
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Stored);

    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".to_string(), content_types),
        ("_rels/.rels".to_string(), root_rels.to_string()),
        ("xl/workbook.xml".to_string(), workbook),
        ("xl/_rels/workbook.xml.rels".to_string(), workbook_rels),
    ];
    for (i, (_, rows)) in sheets.iter().enumerate() {
        parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), sheet_xml(rows)));
    }

    for (name, body) in &parts {
        writer.start_file(name.as_str(), options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

fn header_row() -> Vec<Cell> {
    vec![
        T("Data"),
        T("Placa"),
        T("Tipo Combustível"),
        T("Km Atual"),
        T("Quantidade de Litros"),
        T("Valor Unitário"),
        T("Valor Total"),
    ]
}

/// Internal sheet: three ABC1234 diesel fills (100/10, 150/5, 200/10),
/// one tank fill and one row with an unreadable odometer
pub fn internal_sheet() -> Vec<Vec<Cell>> {
    vec![
        header_row(),
        vec![T("05/01/2024"), T("abc1234"), T("Diesel"), N(100.0), N(10.0), T("R$ 6,00"), T("R$ 60,00")],
        vec![T("20/01/2024"), T("ABC1234"), T("DIESEL"), N(150.0), N(5.0), T("R$ 6,00"), T("R$ 30,00")],
        vec![T("10/02/2024"), T("ABC1234 "), T("diesel"), N(200.0), N(10.0), T("6,00"), T("60,00")],
        vec![T("12/02/2024"), T("-"), T("DIESEL"), Empty, N(5000.0), T("R$ 5,50"), T("R$ 27.500,00")],
        vec![T("15/02/2024"), T("DEF5678"), T("Gasolina"), T("km?"), N(30.0), T("R$ 5,90"), T("R$ 177,00")],
    ]
}

/// External sheet: two GHI9012 gasoline fills (480 km on 40 l), a
/// no-vehicle fill and an undated single fill with an unreadable unit price
pub fn external_sheet() -> Vec<Vec<Cell>> {
    vec![
        header_row(),
        vec![T("03/01/2024"), T("GHI9012"), T("Gasolina"), N(1000.0), N(40.0), T("R$ 5,80"), T("R$ 232,00")],
        vec![T("25/01/2024"), T("GHI9012"), T("Gasolina"), N(1480.0), N(40.0), T("R$ 5,90"), T("R$ 236,00")],
        vec![T("08/02/2024"), T("-"), T("Diesel"), N(0.0), N(20.0), T("R$ 6,10"), T("R$ 122,00")],
        vec![T("sem data"), T("JKL3456"), Empty, N(500.0), N(25.0), T("garbage"), T("R$ 150,00")],
    ]
}

/// The standard two-sheet fixture workbook
pub fn standard_workbook() -> Vec<u8> {
    workbook_bytes(&[
        ("Abastecimento Interno", internal_sheet()),
        ("Abastecimento Externo", external_sheet()),
        ("Resumo", vec![vec![T("nada aqui")]]),
    ])
}

/// A workbook that lacks the external sheet
pub fn internal_only_workbook() -> Vec<u8> {
    workbook_bytes(&[("Interno", internal_sheet())])
}
