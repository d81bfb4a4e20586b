//! Hyperlink-aware extraction of one worksheet into a grid of strings.
//!
//! Cell values come from `calamine`. Hyperlinks are not exposed there, so the
//! worksheet part and its relationships are read straight from the package
//! with `zip` and `quick-xml`. A cell covered by a hyperlink with an external
//! target is emitted as that target instead of its displayed text; the member
//! sheet keeps ORCID, CV and email links this way.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use calamine::{open_workbook, Reader, Xlsx};
use quick_xml::{events::Event, Reader as XmlReader};
use slog::{debug, warn, Logger};
use zip::{result::ZipError, ZipArchive};

use crate::error::{ExportError, Result};

/// Sheet extracted when the caller does not name one.
pub const DEFAULT_SHEET: &str = "ALL (new)";

/// Zero-based `(row, column)` position.
type Position = (u32, u32);

/// One worksheet as trimmed strings, from A1 to the last used cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SheetGrid {
    /// Name of the sheet actually read.
    pub name: String,
    /// Rows of equal width.
    pub rows: Vec<Vec<String>>,
    /// Number of cells whose text was replaced by a hyperlink target.
    pub linked_cells: usize,
}

impl SheetGrid {
    /// Number of columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// Extracts `sheet` from the workbook at `path`.
///
/// Falls back to the first sheet, with a warning, when `sheet` does not exist.
pub fn extract_sheet(path: impl AsRef<Path>, sheet: &str, logger: &Logger) -> Result<SheetGrid> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|err| {
        spreadsheet_error(format!("failed to open workbook '{}'", path.display()), err)
    })?;

    let names = workbook.sheet_names();
    let index = match names.iter().position(|name| name == sheet) {
        Some(index) => index,
        None if !names.is_empty() => {
            warn!(logger, "sheet not found, using the first sheet";
                "requested" => sheet,
                "available" => ?names,
                "using" => &names[0]);
            0
        }
        None => return Err(ExportError::Spreadsheet("workbook has no sheets".into())),
    };
    let name = names[index].clone();

    let range = workbook
        .worksheet_range_at(index)
        .ok_or_else(|| ExportError::Spreadsheet(format!("sheet '{name}' has no data part")))?
        .map_err(|err| spreadsheet_error(format!("failed to read sheet '{name}'"), err))?;

    let Some((last_row, last_col)) = range.end() else {
        return Ok(SheetGrid {
            name,
            ..SheetGrid::default()
        });
    };

    let links = hyperlink_targets(path, &name, (last_row, last_col))?;
    debug!(logger, "resolved hyperlinks"; "sheet" => &name, "count" => links.len());

    let mut linked_cells = 0;
    let mut rows = Vec::new();
    for row in 0..=last_row {
        let mut cells = Vec::new();
        for col in 0..=last_col {
            let text = if let Some(target) = links.get(&(row, col)) {
                linked_cells += 1;
                target.trim().to_owned()
            } else {
                range
                    .get_value((row, col))
                    .map(ToString::to_string)
                    .unwrap_or_default()
                    .trim()
                    .to_owned()
            };
            cells.push(text);
        }
        rows.push(cells);
    }

    Ok(SheetGrid {
        name,
        rows,
        linked_cells,
    })
}

/// Maps every hyperlinked cell of `sheet` to its external target.
///
/// Link ranges are clipped to `last`, the bottom-right used cell, so a ref
/// spanning whole columns does not expand past the data.
fn hyperlink_targets(
    path: &Path,
    sheet: &str,
    last: Position,
) -> Result<HashMap<Position, String>> {
    let file = File::open(path).map_err(|err| ExportError::io(path, err))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|err| spreadsheet_error("failed to open package", err))?;

    let Some(workbook) = read_part(&mut archive, "xl/workbook.xml")? else {
        return Ok(HashMap::new());
    };
    let workbook_rels = relationships(&mut archive, "xl/_rels/workbook.xml.rels")?;

    let sheet_rid = elements(&workbook, b"sheet")?
        .into_iter()
        .find(|attrs| attrs.get("name").map(String::as_str) == Some(sheet))
        .and_then(|mut attrs| attrs.remove("id"));
    let Some(sheet_part) = sheet_rid
        .and_then(|rid| workbook_rels.get(&rid).cloned())
        .map(|target| part_path("xl", &target))
    else {
        return Ok(HashMap::new());
    };

    let Some(sheet_xml) = read_part(&mut archive, &sheet_part)? else {
        return Ok(HashMap::new());
    };
    let sheet_rels = relationships(&mut archive, &rels_path(&sheet_part))?;

    let mut targets = HashMap::new();
    for attrs in elements(&sheet_xml, b"hyperlink")? {
        let (Some(reference), Some(rid)) = (attrs.get("ref"), attrs.get("id")) else {
            // internal links (location only) keep their displayed text
            continue;
        };
        let Some(target) = sheet_rels.get(rid).filter(|target| !target.is_empty()) else {
            continue;
        };
        let Some(((top, left), (bottom, right))) = parse_range(reference) else {
            continue;
        };
        for row in top..=bottom.min(last.0) {
            for col in left..=right.min(last.1) {
                targets.insert((row, col), target.clone());
            }
        }
    }
    Ok(targets)
}

/// Reads a relationship part into `Id -> Target`. A missing part is empty.
fn relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<HashMap<String, String>> {
    let Some(xml) = read_part(archive, name)? else {
        return Ok(HashMap::new());
    };
    Ok(elements(&xml, b"Relationship")?
        .into_iter()
        .filter_map(|mut attrs| Some((attrs.remove("Id")?, attrs.remove("Target")?)))
        .collect())
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    let mut part = match archive.by_name(name) {
        Ok(part) => part,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(spreadsheet_error(format!("failed to read '{name}'"), err)),
    };
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|err| spreadsheet_error(format!("failed to read '{name}'"), err))?;
    Ok(Some(xml))
}

/// Collects the attributes of every element whose local name is `wanted`.
///
/// Attribute keys are local names, so `r:id` is stored as `id`.
fn elements(xml: &str, wanted: &[u8]) -> Result<Vec<BTreeMap<String, String>>> {
    let mut reader = XmlReader::from_str(xml);
    let mut found = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(element) | Event::Empty(element))
                if element.local_name().as_ref() == wanted =>
            {
                let mut attrs = BTreeMap::new();
                for attr in element.attributes() {
                    let attr = attr.map_err(|err| spreadsheet_error("malformed attribute", err))?;
                    let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                    let value = attr
                        .decode_and_unescape_value(&reader)
                        .map_err(|err| spreadsheet_error("malformed attribute value", err))?
                        .into_owned();
                    attrs.insert(key, value);
                }
                found.push(attrs);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(spreadsheet_error("malformed XML part", err)),
        }
    }
    Ok(found)
}

/// Resolves a relationship target against the directory of its source part.
fn part_path(base_dir: &str, target: &str) -> String {
    target
        .strip_prefix('/')
        .map_or_else(|| format!("{base_dir}/{target}"), str::to_owned)
}

/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Parses `B12` (or `$B$12`) into a zero-based position.
fn parse_cell(reference: &str) -> Option<Position> {
    let reference: String = reference.trim().chars().filter(|&c| c != '$').collect();
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = u32::from(c.to_ascii_uppercase()) - u32::from('A') + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}

/// Parses `A1` or `A1:C4` into its top-left and bottom-right corners.
fn parse_range(reference: &str) -> Option<(Position, Position)> {
    match reference.split_once(':') {
        Some((start, end)) => {
            let (r1, c1) = parse_cell(start)?;
            let (r2, c2) = parse_cell(end)?;
            Some(((r1.min(r2), c1.min(c2)), (r1.max(r2), c1.max(c2))))
        }
        None => parse_cell(reference).map(|cell| (cell, cell)),
    }
}

fn spreadsheet_error(context: impl Display, err: impl Display) -> ExportError {
    ExportError::Spreadsheet(format!("{context}: {err}"))
}
