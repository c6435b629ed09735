//! Row selection and the composite-row split.
//!
//! Most dictionary rows describe attributes that the employee form does not
//! collect; only rows flagged `P`, `N` or `PP` in the applicability column and
//! named under the root prefix become [`Item`]s.

use std::{fmt, str::FromStr};

use anyhow::{Result, anyhow};
use log::debug;

use crate::rows::{ColumnMap, Row, cell, cell_or_empty};

/// Applicability flag of a dictionary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mandatory {
    P,
    N,
    PP,
}

impl Mandatory {
    pub fn as_str(self) -> &'static str {
        match self {
            Mandatory::P => "P",
            Mandatory::N => "N",
            Mandatory::PP => "PP",
        }
    }
}

impl FromStr for Mandatory {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "P" => Ok(Mandatory::P),
            "N" => Ok(Mandatory::N),
            "PP" => Ok(Mandatory::PP),
            other => Err(anyhow!("Unknown applicability flag '{other}'")),
        }
    }
}

impl fmt::Display for Mandatory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One compiled attribute, ready to be folded into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub path: String,
    /// `None` when the id cell is null; such items are skipped by the builder.
    pub id: Option<String>,
    pub mandatory: Mandatory,
    pub description: String,
    pub dat_typ: String,
    pub delka: String,
    pub specificke_povinnosti: String,
    pub logicke_kontroly: String,
    pub vysvetlivky: String,
    pub p: String,
    pub n: String,
    pub z: String,
}

// One dictionary row carries both the birth number (10057) and the insurance
// registration number (10058). The ids and target paths are fixed by the form;
// review this branch whenever the dictionary layout changes.
const BIRTH_NUMBER_ID: &str = "10057";
const INSURANCE_NUMBER_ID: &str = "10058";
const BIRTH_NUMBER_PATH: &str = "employee.client.bno";
const INSURANCE_NUMBER_PATH: &str = "employee.client.ecp";
const BIRTH_NUMBER_DESCRIPTION: &str = "Rodné číslo";
const INSURANCE_NUMBER_DESCRIPTION: &str = "EČP (Evidenční číslo pojištěnce)";

/// Filters data rows to applicable items, expanding the composite row.
///
/// The result keeps sheet order; call [`sort_items`] before folding.
pub fn select_items(rows: &[Row], columns: &ColumnMap, root_prefix: &str) -> Vec<Item> {
    let mut items = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let Some(mandatory) = cell(row, columns.applicability)
            .and_then(|v| v.parse::<Mandatory>().ok())
        else {
            continue;
        };
        let Some(path) = cell(row, columns.name).map(str::to_lowercase) else {
            continue;
        };
        if !path.starts_with(root_prefix) {
            debug!("Row {idx}: '{path}' outside '{root_prefix}', dropped");
            continue;
        }

        let item = item_from_row(row, columns, path, mandatory);
        let composite = item
            .id
            .as_deref()
            .is_some_and(|id| id.contains(BIRTH_NUMBER_ID) && id.contains(INSURANCE_NUMBER_ID));
        if !composite {
            items.push(item);
            continue;
        }
        debug!("Row {idx}: splitting composite id {:?}", item.id);
        items.push(Item {
            path: BIRTH_NUMBER_PATH.to_string(),
            id: Some(BIRTH_NUMBER_ID.to_string()),
            description: BIRTH_NUMBER_DESCRIPTION.to_string(),
            ..item.clone()
        });
        items.push(Item {
            path: INSURANCE_NUMBER_PATH.to_string(),
            id: Some(INSURANCE_NUMBER_ID.to_string()),
            description: INSURANCE_NUMBER_DESCRIPTION.to_string(),
            ..item
        });
    }
    items
}

/// Sorts items by full dotted path; tree shape depends on this order.
pub fn sort_items(items: &mut [Item]) {
    items.sort_by(|a, b| a.path.cmp(&b.path));
}

fn item_from_row(row: &Row, columns: &ColumnMap, path: String, mandatory: Mandatory) -> Item {
    Item {
        path,
        id: cell(row, columns.id)
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        mandatory,
        description: cell_or_empty(row, columns.description),
        dat_typ: cell_or_empty(row, columns.dat_typ),
        delka: cell_or_empty(row, columns.delka),
        specificke_povinnosti: cell_or_empty(row, columns.specificke_povinnosti),
        logicke_kontroly: cell_or_empty(row, columns.logicke_kontroly),
        vysvetlivky: cell_or_empty(row, columns.vysvetlivky),
        p: cell_or_empty(row, Some(columns.p)),
        n: cell_or_empty(row, Some(columns.n)),
        z: cell_or_empty(row, Some(columns.z)),
    }
}
