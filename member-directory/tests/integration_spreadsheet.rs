//! Extraction tests against small workbooks assembled on the fly.
//!
//! Each workbook is a minimal OOXML package with inline strings, one or two
//! worksheets and a worksheet relationship part holding hyperlink targets.

#![cfg(feature = "xlsx")]

use std::{fs::File, io::Write, path::Path};

use member_directory::{
    spreadsheet::{extract_sheet, DEFAULT_SHEET},
    write_grid, ExportPolicy, Exporter, Table,
};
use slog::{o, Discard, Logger};
use tempfile::tempdir;
use zip::{write::FileOptions, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
  <Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
</Relationships>"#;

const SHEET_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://orcid.org/0000-0002-1825-0097" TargetMode="External"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="mailto:ana@example.org" TargetMode="External"/>
</Relationships>"#;

const MEMBERS_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
  xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheetData>
    <row r="1">
      <c r="A1" t="inlineStr"><is><t>Prénom</t></is></c>
      <c r="B1" t="inlineStr"><is><t>Nom de la famille</t></is></c>
      <c r="C1" t="inlineStr"><is><t>E-mail / Courriel</t></is></c>
      <c r="D1" t="inlineStr"><is><t>ORCID</t></is></c>
      <c r="E1" t="inlineStr"><is><t>Autorisez-vous le RSN à vous créer un profil de membre public</t></is></c>
    </row>
    <row r="2">
      <c r="A2" t="inlineStr"><is><t> Ana </t></is></c>
      <c r="B2" t="inlineStr"><is><t>Lee</t></is></c>
      <c r="C2" t="inlineStr"><is><t>Courriel</t></is></c>
      <c r="D2" t="inlineStr"><is><t>Profil ORCID</t></is></c>
      <c r="E2" t="inlineStr"><is><t>Oui</t></is></c>
    </row>
    <row r="3">
      <c r="A3" t="inlineStr"><is><t>Bo</t></is></c>
      <c r="B3" t="inlineStr"><is><t>Ng</t></is></c>
      <c r="C3" t="inlineStr"><is><t>Voir feuille</t></is></c>
      <c r="D3"><v>42</v></c>
    </row>
  </sheetData>
  <hyperlinks>
    <hyperlink ref="C2" r:id="rId2"/>
    <hyperlink ref="D2" r:id="rId1"/>
    <hyperlink ref="C3" location="'Notes'!A1" display="Voir feuille"/>
  </hyperlinks>
</worksheet>"#;

const RANGE_LINKED_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
  xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheetData>
    <row r="1">
      <c r="A1" t="inlineStr"><is><t>Prénom</t></is></c>
      <c r="B1" t="inlineStr"><is><t>ORCID</t></is></c>
    </row>
    <row r="2">
      <c r="A2" t="inlineStr"><is><t>Ana</t></is></c>
      <c r="B2" t="inlineStr"><is><t>Profil</t></is></c>
    </row>
    <row r="3">
      <c r="A3" t="inlineStr"><is><t>Bo</t></is></c>
      <c r="B3" t="inlineStr"><is><t>Profil</t></is></c>
    </row>
  </sheetData>
  <hyperlinks>
    <hyperlink ref="B2:B3" r:id="rId1"/>
    <hyperlink ref="C1:XFD1048576" r:id="rId2"/>
  </hyperlinks>
</worksheet>"#;

const NOTES_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1"><c r="A1" t="inlineStr"><is><t>note</t></is></c></row>
  </sheetData>
</worksheet>"#;

fn workbook_xml(first_sheet: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
  xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="{first_sheet}" sheetId="1" r:id="rId1"/>
    <sheet name="Notes" sheetId="2" r:id="rId2"/>
  </sheets>
</workbook>"#
    )
}

fn write_workbook(path: &Path, first_sheet: &str) {
    write_workbook_with(path, first_sheet, MEMBERS_SHEET);
}

fn write_workbook_with(path: &Path, first_sheet: &str, members_sheet: &str) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_owned()),
        ("_rels/.rels", ROOT_RELS.to_owned()),
        ("xl/workbook.xml", workbook_xml(first_sheet)),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_owned()),
        ("xl/worksheets/sheet1.xml", members_sheet.to_owned()),
        ("xl/worksheets/_rels/sheet1.xml.rels", SHEET_RELS.to_owned()),
        ("xl/worksheets/sheet2.xml", NOTES_SHEET.to_owned()),
    ];
    for (name, body) in parts {
        zip.start_file(name, FileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn logger() -> Logger {
    Logger::root(Discard, o!())
}

#[test]
fn test_linked_cells_become_their_targets() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("RSN.xlsx");
    write_workbook(&path, DEFAULT_SHEET);

    let grid = extract_sheet(&path, DEFAULT_SHEET, &logger()).unwrap();
    assert_eq!(grid.name, DEFAULT_SHEET);
    assert_eq!(grid.rows.len(), 3);
    assert_eq!(grid.width(), 5);
    assert_eq!(grid.linked_cells, 2);

    assert_eq!(grid.rows[1][0], "Ana");
    assert_eq!(grid.rows[1][2], "mailto:ana@example.org");
    assert_eq!(grid.rows[1][3], "https://orcid.org/0000-0002-1825-0097");
    // internal links keep the displayed text
    assert_eq!(grid.rows[2][2], "Voir feuille");
    assert_eq!(grid.rows[2][3], "42");
    // short rows are padded to the sheet width
    assert_eq!(grid.rows[2][4], "");
}

#[test]
fn test_range_link_covers_every_cell() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("RSN.xlsx");
    write_workbook_with(&path, DEFAULT_SHEET, RANGE_LINKED_SHEET);

    let grid = extract_sheet(&path, DEFAULT_SHEET, &logger()).unwrap();
    assert_eq!(grid.linked_cells, 2);
    assert_eq!(grid.rows[1][1], "https://orcid.org/0000-0002-1825-0097");
    assert_eq!(grid.rows[2][1], "https://orcid.org/0000-0002-1825-0097");
    assert_eq!(grid.rows[1][0], "Ana");
}

#[test]
fn test_links_beyond_the_data_are_clipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("RSN.xlsx");
    write_workbook_with(&path, DEFAULT_SHEET, RANGE_LINKED_SHEET);

    // C1:XFD1048576 lies entirely right of the last used column
    let grid = extract_sheet(&path, DEFAULT_SHEET, &logger()).unwrap();
    assert_eq!(grid.rows.len(), 3);
    assert_eq!(grid.width(), 2);
    assert!(grid.rows.iter().flatten().all(|cell| !cell.starts_with("mailto:")));
}

#[test]
fn test_missing_sheet_falls_back_to_first() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("RSN.xlsx");
    write_workbook(&path, "Membres");

    let grid = extract_sheet(&path, DEFAULT_SHEET, &logger()).unwrap();
    assert_eq!(grid.name, "Membres");
    assert_eq!(grid.rows[1][3], "https://orcid.org/0000-0002-1825-0097");
}

#[test]
fn test_named_sheet_is_used() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("RSN.xlsx");
    write_workbook(&path, DEFAULT_SHEET);

    let grid = extract_sheet(&path, "Notes", &logger()).unwrap();
    assert_eq!(grid.rows, vec![vec!["note".to_owned()]]);
    assert_eq!(grid.linked_cells, 0);
}

#[test]
fn test_extracted_grid_feeds_the_export() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("RSN.xlsx");
    write_workbook(&path, DEFAULT_SHEET);

    let grid = extract_sheet(&path, DEFAULT_SHEET, &logger()).unwrap();
    let mut csv = Vec::new();
    write_grid(&grid.rows, &mut csv).unwrap();

    let table = Table::from_bytes(&csv).unwrap();
    let export = Exporter::new(ExportPolicy::default()).run(&table).unwrap();
    assert_eq!(
        export.public()[0].get("ORCID"),
        "https://orcid.org/0000-0002-1825-0097"
    );
    // Bo has no consent answer yet: the linked email column is masked
    assert_eq!(
        export.pending()[0].get("E-mail / Courriel"),
        "membre@rsn-placeholder.ca"
    );
}

#[test]
fn test_not_a_workbook_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"not a zip").unwrap();
    assert!(extract_sheet(&path, DEFAULT_SHEET, &logger()).is_err());
}
