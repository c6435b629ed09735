#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Header labels of the dictionary sheet, as they appear in the export.
pub const DICTIONARY_HEADER: [&str; 9] = [
    "ID položky (DS)",
    "Název atributu",
    "Popis",
    "Dat. typ",
    "Délka",
    "Specifické povinnosti pro jednotlivé akce",
    "Logické kontroly",
    "Vysvětlivky k vyplnění",
    "A1 - OST",
];

/// Title rows above the header; the stock layout has its header on row 16.
const PREAMBLE_ROWS: usize = 15;
const SHEET_WIDTH: usize = 27;

/// One dictionary row: id, attribute name, applicability, description, P note.
pub type DictionaryRow<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str);

/// Renders a dictionary sheet export with the stock layout: a title block,
/// the header on row 16, and the P/N/Z notes in columns Y, Z, AA.
pub fn dictionary_sheet(rows: &[DictionaryRow<'_>]) -> String {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer
        .write_record(["Slovník atributů - registrace zaměstnance"])
        .expect("write title");
    for _ in 1..PREAMBLE_ROWS {
        writer.write_record([""]).expect("write preamble");
    }

    let mut header = vec![String::new(); SHEET_WIDTH];
    for (idx, label) in DICTIONARY_HEADER.iter().enumerate() {
        header[idx] = label.to_string();
    }
    header[24] = "P".to_string();
    header[25] = "N".to_string();
    header[26] = "Z".to_string();
    writer.write_record(&header).expect("write header");

    for (id, name, applicability, description, p_note) in rows {
        let mut record = vec![String::new(); SHEET_WIDTH];
        record[0] = id.to_string();
        record[1] = name.to_string();
        record[2] = description.to_string();
        record[3] = "AN".to_string();
        record[4] = "50".to_string();
        record[8] = applicability.to_string();
        record[24] = p_note.to_string();
        writer.write_record(&record).expect("write row");
    }
    String::from_utf8(writer.into_inner().expect("flush sheet")).expect("utf-8 sheet")
}

/// The small registration dictionary most tests compile.
pub fn sample_dictionary() -> String {
    dictionary_sheet(&[
        ("10001", "employee.name", "P", "Jméno", "povinné"),
        ("10002", "employee.surname", "P", "Příjmení", ""),
        ("10057, 10058", "employee.client.bno_ecp", "P", "RČ / EČP", ""),
        ("10056", "employee.client.birth_date", "P", "Datum narození", ""),
        ("10059", "employee.client.sex", "N", "Pohlaví", ""),
        ("10067", "employee.client.birth_state", "PP", "Stát narození", ""),
        ("20001", "employer.name", "P", "Název zaměstnavatele", ""),
        ("10099", "employee.note", "X", "Poznámka", ""),
    ])
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Returns the path a file named `name` would have in the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.file(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}
