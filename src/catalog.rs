//! Enumeration catalog (`ciselnik`) model and builder.
//!
//! Selection and combobox fields draw their options from named lists such as
//! `state` or `sex`. The catalog is persisted as a JSON object mapping list key
//! to `[{value, label}]`. [`build_catalog`] assembles it from CSV exports of the
//! enumeration sheets described by a YAML manifest.

use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    cli::CatalogArgs,
    io_utils,
    rows::{Row, cell},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub value: String,
    pub label: String,
}

impl EnumOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumCatalog {
    lists: BTreeMap<String, Vec<EnumOption>>,
}

impl EnumCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, options: Vec<EnumOption>) {
        self.lists.insert(key.into(), options);
    }

    pub fn get(&self, key: &str) -> Option<&[EnumOption]> {
        self.lists.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lists.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    pub fn load(path: &Path) -> Result<Self> {
        io_utils::read_json(path).context("Loading enumeration catalog")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFormat {
    #[default]
    Plain,
    /// `<value> - <label>`, used for insurer codes.
    CodePrefixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSource {
    pub key: String,
    pub path: PathBuf,
    #[serde(default)]
    pub value_column: usize,
    #[serde(default = "default_label_column")]
    pub label_column: usize,
    #[serde(default)]
    pub label_format: LabelFormat,
}

fn default_label_column() -> usize {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogManifest {
    #[serde(default)]
    pub sources: Vec<CatalogSource>,
    #[serde(default = "default_true")]
    pub builtin_enums: bool,
}

impl CatalogManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening manifest {path:?}"))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).context("Parsing catalog manifest YAML")
    }
}

/// Static lists that have no sheet of their own.
pub fn builtin_lists() -> Vec<(&'static str, Vec<EnumOption>)> {
    vec![
        (
            "bool",
            vec![EnumOption::new("A", "ANO"), EnumOption::new("N", "NE")],
        ),
        (
            "rodinny_stav",
            vec![
                EnumOption::new("0", "Nezjištěn"),
                EnumOption::new("1", "Svobodný/á"),
                EnumOption::new("2", "Ženatý/Vdaná"),
                EnumOption::new("3", "Rozvedený/á"),
                EnumOption::new("4", "Vdovec/Vdova"),
                EnumOption::new("5", "Registrovaný partner"),
            ],
        ),
    ]
}

/// Extracts options from an enumeration sheet; the first row is its header.
pub fn options_from_rows(rows: &[Row], source: &CatalogSource) -> Vec<EnumOption> {
    rows.iter()
        .skip(1)
        .filter_map(|row| {
            let value = cell(row, source.value_column).filter(|v| !v.is_empty())?;
            let label = cell(row, source.label_column).unwrap_or_default();
            let label = match source.label_format {
                LabelFormat::Plain => label.to_string(),
                LabelFormat::CodePrefixed => format!("{value} - {label}"),
            };
            Some(EnumOption::new(value, label))
        })
        .collect()
}

/// Builds a catalog from the manifest; unreadable sources are skipped.
///
/// Relative source paths resolve against `base_dir`.
pub fn build_catalog(
    manifest: &CatalogManifest,
    base_dir: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> EnumCatalog {
    let mut catalog = EnumCatalog::new();
    for source in &manifest.sources {
        let path = base_dir.join(&source.path);
        let delimiter = io_utils::resolve_input_delimiter(&path, delimiter);
        match io_utils::read_sheet(&path, delimiter, encoding) {
            Ok(rows) => {
                let options = options_from_rows(&rows, source);
                info!(
                    "Extracted {} '{}' entries from {:?}",
                    options.len(),
                    source.key,
                    path
                );
                if catalog.contains(&source.key) {
                    warn!("'{}' is listed more than once; {:?} replaces it", source.key, path);
                }
                catalog.insert(source.key.clone(), options);
            }
            Err(err) => warn!("Skipping '{}': {err:#}", source.key),
        }
    }
    if manifest.builtin_enums {
        for (key, options) in builtin_lists() {
            catalog.insert(key, options);
        }
    }
    catalog
}

pub fn execute(args: &CatalogArgs) -> Result<()> {
    let manifest = CatalogManifest::load(&args.manifest)?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let base_dir = args
        .manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let catalog = build_catalog(&manifest, &base_dir, args.delimiter, encoding);
    if catalog.is_empty() {
        warn!("No enumeration lists were built from {:?}", args.manifest);
    }
    debug!("Enumeration lists: {:?}", catalog.keys().collect::<Vec<_>>());
    io_utils::write_json(Some(&args.output), &catalog)
        .with_context(|| format!("Writing catalog to {:?}", args.output))?;
    info!("Saved {} enumeration(s) to {:?}", catalog.len(), args.output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn catalog_json_is_a_plain_object() {
        let json = r#"{"sex":[{"value":"M","label":"Muž"},{"value":"Z","label":"Žena"}]}"#;
        let catalog: EnumCatalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.get("sex").unwrap()[1].label, "Žena");
        assert!(catalog.get("state").is_none());
        assert_eq!(serde_json::to_string(&catalog).unwrap(), json);
    }

    #[test]
    fn sheet_rows_skip_header_and_blank_values() {
        let source = CatalogSource {
            key: "zdravotni_pojistovny".to_string(),
            path: PathBuf::from("c_zpoj.csv"),
            value_column: 0,
            label_column: 1,
            label_format: LabelFormat::CodePrefixed,
        };
        let rows = vec![
            vec![Some("KOD".to_string()), Some("NAZEV".to_string())],
            vec![Some(" 111 ".to_string()), Some("VZP".to_string())],
            vec![None, Some("orphan".to_string())],
            vec![Some("201".to_string())],
        ];
        let options = options_from_rows(&rows, &source);
        assert_eq!(
            options,
            vec![EnumOption::new("111", "111 - VZP"), EnumOption::new("201", "201 - ")]
        );
    }

    #[test]
    fn manifest_builds_from_sheets_and_builtins() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("stat.csv"),
            "KOD,ZKRATKA,NAZEV\nCZ,CZE,Česká republika\nAD,AND,Andorra\n",
        )
        .unwrap();
        let manifest: CatalogManifest = serde_yaml::from_str(concat!(
            "sources:\n",
            "  - key: state\n    path: stat.csv\n    label_column: 2\n",
            "  - key: missing\n    path: nope.csv\n",
        ))
        .unwrap();

        let catalog = build_catalog(&manifest, dir.path(), None, encoding_rs::UTF_8);
        assert!(!catalog.contains("missing"));
        assert_eq!(
            catalog.get("state").unwrap(),
            &[
                EnumOption::new("CZ", "Česká republika"),
                EnumOption::new("AD", "Andorra")
            ]
        );
        assert_eq!(catalog.get("bool").unwrap().len(), 2);
        assert_eq!(catalog.get("rodinny_stav").unwrap().len(), 6);
        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["bool", "rodinny_stav", "state"]);
    }

    #[test]
    fn repeated_source_key_keeps_the_later_sheet() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("old.csv"), "KOD,NAZEV\nM,Muž\n").unwrap();
        std::fs::write(dir.path().join("new.csv"), "KOD,NAZEV\nZ,Žena\n").unwrap();
        let manifest: CatalogManifest = serde_yaml::from_str(concat!(
            "builtin_enums: false\n",
            "sources:\n",
            "  - key: sex\n    path: old.csv\n",
            "  - key: sex\n    path: new.csv\n",
        ))
        .unwrap();

        let catalog = build_catalog(&manifest, dir.path(), None, encoding_rs::UTF_8);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("sex").unwrap(), &[EnumOption::new("Z", "Žena")]);
    }
}
