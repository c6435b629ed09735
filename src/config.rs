//! YAML configuration for sheet layout and fill overrides.
//!
//! Every field has a default matching the registration-form dictionary, so an
//! absent config file (or an empty one) behaves like the stock layout.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEADER_ROW: usize = 16;
pub const DEFAULT_ROOT_PREFIX: &str = "employee.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub sheet: SheetLayout,
    pub fill: FillOptions,
}

impl FormConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let mut contents = String::new();
        File::open(path)
            .map(BufReader::new)
            .and_then(|mut reader| reader.read_to_string(&mut contents))
            .with_context(|| format!("Reading config file {path:?}"))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).context("Parsing config YAML")
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Where the dictionary sheet keeps its headers and semantic columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// 1-based row number holding the column headers.
    pub header_row: usize,
    pub root_prefix: String,
    pub columns: ColumnNames,
    pub positional: PositionalColumns,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: DEFAULT_HEADER_ROW,
            root_prefix: DEFAULT_ROOT_PREFIX.to_string(),
            columns: ColumnNames::default(),
            positional: PositionalColumns::default(),
        }
    }
}

/// Normalized header names of the semantic columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub name: String,
    pub applicability: String,
    pub id: String,
    pub description: String,
    pub dat_typ: String,
    pub delka: String,
    pub specificke_povinnosti: String,
    pub logicke_kontroly: String,
    pub vysvetlivky: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            name: "nazev_atributu".to_string(),
            applicability: "a1_ost".to_string(),
            id: "id_polozky_ds".to_string(),
            description: "popis".to_string(),
            dat_typ: "dat_typ".to_string(),
            delka: "delka".to_string(),
            specificke_povinnosti: "specificke_povinnosti_pro_jednotlive_akce".to_string(),
            logicke_kontroly: "logicke_kontroly".to_string(),
            vysvetlivky: "vysvetlivky_k_vyplneni".to_string(),
        }
    }
}

/// 0-based indices of the unlabeled free-text columns (Y, Z, AA).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionalColumns {
    pub p: usize,
    pub n: usize,
    pub z: usize,
}

impl Default for PositionalColumns {
    fn default() -> Self {
        Self { p: 24, n: 25, z: 26 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillOptions {
    /// Default values forced for specific field ids, taking precedence over
    /// the node's own `default_value`.
    pub default_overrides: BTreeMap<String, String>,
}

impl Default for FillOptions {
    fn default() -> Self {
        let mut default_overrides = BTreeMap::new();
        // Country of birth: the form preselects CZ even though the sheet has no default.
        default_overrides.insert("10067".to_string(), "CZ".to_string());
        Self { default_overrides }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let yaml = "sheet:\n  header_row: 1\n  columns:\n    id: kod\n";
        let config: FormConfig = serde_yaml::from_str(yaml).expect("parse config");
        assert_eq!(config.sheet.header_row, 1);
        assert_eq!(config.sheet.columns.id, "kod");
        assert_eq!(config.sheet.columns.name, "nazev_atributu");
        assert_eq!(config.sheet.root_prefix, DEFAULT_ROOT_PREFIX);
        assert_eq!(config.sheet.positional, PositionalColumns::default());
        assert_eq!(
            config.fill.default_overrides.get("10067").map(String::as_str),
            Some("CZ")
        );
    }

    #[test]
    fn empty_file_loads_defaults() {
        let file = NamedTempFile::new().expect("temp file");
        let config = FormConfig::load(file.path()).expect("load empty config");
        assert_eq!(config, FormConfig::default());
    }

    #[test]
    fn written_yaml_loads_back() {
        let mut file = NamedTempFile::new().expect("temp file");
        let mut config = FormConfig::default();
        config.fill.default_overrides.clear();
        config.sheet.root_prefix = "employer.".to_string();
        serde_yaml::to_writer(&mut file, &config).expect("write config");
        let loaded = FormConfig::load(file.path()).expect("reload config");
        assert_eq!(loaded, config);
    }
}
