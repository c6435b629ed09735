//! Dictionary sheet rows and column discovery.
//!
//! A [`Row`] is a sequence of nullable cells. [`locate_header`] splits the
//! sheet at its header row and [`ColumnMap::discover`] resolves the semantic
//! columns by normalized header name; a missing required column is the one
//! fatal input-shape error of the compiler.

use log::debug;

use crate::{
    config::SheetLayout,
    error::CompileError,
    normalize::normalize_header,
};

pub type Row = Vec<Option<String>>;

/// Returns the cell at `index`, trimmed, or `None` when null or out of range.
pub fn cell(row: &[Option<String>], index: usize) -> Option<&str> {
    row.get(index)
        .and_then(|value| value.as_deref())
        .map(str::trim)
}

/// Like [`cell`] but maps a missing column or null cell to an empty string.
pub fn cell_or_empty(row: &[Option<String>], index: Option<usize>) -> String {
    index
        .and_then(|idx| cell(row, idx))
        .unwrap_or_default()
        .to_string()
}

/// Splits the sheet into its header row and the data rows below it.
pub fn locate_header<'a>(
    rows: &'a [Row],
    layout: &SheetLayout,
) -> Result<(&'a Row, &'a [Row]), CompileError> {
    if layout.header_row == 0 {
        return Err(CompileError::ZeroHeaderRow);
    }
    let header_idx = layout.header_row - 1;
    let header = rows
        .get(header_idx)
        .ok_or(CompileError::HeaderRowOutOfRange {
            row: layout.header_row,
            available: rows.len(),
        })?;
    Ok((header, &rows[header_idx + 1..]))
}

/// Resolved positions of the semantic columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub applicability: usize,
    pub id: usize,
    pub description: Option<usize>,
    pub dat_typ: Option<usize>,
    pub delka: Option<usize>,
    pub specificke_povinnosti: Option<usize>,
    pub logicke_kontroly: Option<usize>,
    pub vysvetlivky: Option<usize>,
    pub p: usize,
    pub n: usize,
    pub z: usize,
}

impl ColumnMap {
    pub fn discover(header: &[Option<String>], layout: &SheetLayout) -> Result<Self, CompileError> {
        let keys = header
            .iter()
            .enumerate()
            .map(|(idx, value)| normalize_header(value.as_deref(), idx))
            .collect::<Vec<_>>();
        debug!("Normalized headers: {:?}", keys);

        let find = |name: &str| keys.iter().position(|key| key == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| CompileError::MissingColumn {
                name: name.to_string(),
                row: layout.header_row,
            })
        };

        let columns = &layout.columns;
        Ok(ColumnMap {
            name: require(&columns.name)?,
            applicability: require(&columns.applicability)?,
            id: require(&columns.id)?,
            description: find(&columns.description),
            dat_typ: find(&columns.dat_typ),
            delka: find(&columns.delka),
            specificke_povinnosti: find(&columns.specificke_povinnosti),
            logicke_kontroly: find(&columns.logicke_kontroly),
            vysvetlivky: find(&columns.vysvetlivky),
            p: layout.positional.p,
            n: layout.positional.n,
            z: layout.positional.z,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells
            .iter()
            .map(|c| if c.is_empty() { None } else { Some(c.to_string()) })
            .collect()
    }

    fn layout(header_row: usize) -> SheetLayout {
        SheetLayout {
            header_row,
            ..SheetLayout::default()
        }
    }

    #[test]
    fn discovers_columns_by_normalized_header() {
        let header = row(&["ID položky (DS)", "Název atributu", "", "Popis", "A1 - OST"]);
        let map = ColumnMap::discover(&header, &layout(1)).expect("discover columns");
        assert_eq!(map.id, 0);
        assert_eq!(map.name, 1);
        assert_eq!(map.description, Some(3));
        assert_eq!(map.applicability, 4);
        assert_eq!(map.dat_typ, None);
        assert_eq!((map.p, map.n, map.z), (24, 25, 26));
    }

    #[test]
    fn missing_required_column_names_it() {
        let header = row(&["ID položky (DS)", "Popis", "A1 - OST"]);
        let err = ColumnMap::discover(&header, &layout(16)).unwrap_err();
        assert_eq!(
            err,
            CompileError::MissingColumn {
                name: "nazev_atributu".to_string(),
                row: 16
            }
        );
        assert!(err.to_string().contains("nazev_atributu"));
    }

    #[test]
    fn header_row_splits_sheet() {
        let rows = vec![row(&["title"]), row(&["a", "b"]), row(&["1", "2"])];
        let (header, data) = locate_header(&rows, &layout(2)).unwrap();
        assert_eq!(header, &rows[1]);
        assert_eq!(data.len(), 1);

        let err = locate_header(&rows, &layout(5)).unwrap_err();
        assert_eq!(err, CompileError::HeaderRowOutOfRange { row: 5, available: 3 });
        assert_eq!(locate_header(&rows, &layout(0)).unwrap_err(), CompileError::ZeroHeaderRow);
    }

    #[test]
    fn cells_are_trimmed_and_nullable() {
        let r = row(&["  P ", ""]);
        assert_eq!(cell(&r, 0), Some("P"));
        assert_eq!(cell(&r, 1), None);
        assert_eq!(cell(&r, 9), None);
        assert_eq!(cell_or_empty(&r, None), "");
        assert_eq!(cell_or_empty(&r, Some(0)), "P");
    }
}
