//! Identifier uniqueness and leaf completeness checks.
//!
//! Every leaf the form renders as an input must carry a stable `id`, and no
//! `id` may appear twice. Subtrees marked `skip` are not rendered and are
//! therefore ignored entirely.

use std::{collections::BTreeMap, fmt::Write as _};

use anyhow::{Result, bail};
use log::info;
use serde::Serialize;

use crate::{
    cli::{ReportFormat, ValidateArgs},
    io_utils,
    tree::Node,
};

const IGNORED_WIDGETS: &[&str] = &["markdown", "separator"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidLeaf {
    pub path: String,
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingId {
    pub path: String,
    pub key: String,
    pub description: String,
    pub widget: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: Vec<ValidLeaf>,
    /// Ids observed at two or more paths.
    pub duplicates: BTreeMap<String, Vec<String>>,
    pub missing: Vec<MissingId>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.duplicates.is_empty() && self.missing.is_empty()
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "INFO: Found {} valid leaf nodes with IDs:",
            self.valid.len()
        );
        for leaf in &self.valid {
            let _ = writeln!(out, "  {}: {}", leaf.id, leaf.label);
        }
        let _ = writeln!(out, "{}", "-".repeat(20));

        if self.duplicates.is_empty() {
            let _ = writeln!(out, "PASS: All found IDs are unique.");
        } else {
            let _ = writeln!(out, "FAIL: Found {} duplicate IDs:", self.duplicates.len());
            for (id, paths) in &self.duplicates {
                let _ = writeln!(out, "  ID '{id}' found at:");
                for path in paths {
                    let _ = writeln!(out, "    - {path}");
                }
            }
            let _ = writeln!(out, "{}", "-".repeat(20));
        }

        if self.missing.is_empty() {
            let _ = writeln!(out, "PASS: All non-skipped leaf nodes have IDs.");
        } else {
            let _ = writeln!(
                out,
                "FAIL: Found {} leaf nodes without an ID (excluding ignored widgets):",
                self.missing.len()
            );
            for node in &self.missing {
                let _ = writeln!(out, "  Path: {}", node.path);
                let _ = writeln!(out, "    Key: {}", node.key);
                let _ = writeln!(out, "    Desc: {}", node.description);
                let _ = writeln!(out, "    Widget: {}", node.widget);
                let _ = writeln!(out, "{}", "-".repeat(10));
            }
        }

        if self.passed() {
            let _ = writeln!(out, "SUCCESS: JSON structure validation passed.");
        }
        out
    }
}

/// Validates a forest, reporting every violation found.
pub fn validate(forest: &[Node]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (idx, node) in forest.iter().enumerate() {
        visit(node, format!("[{idx}]"), &mut report, &mut seen);
    }
    report.duplicates = seen
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .collect();
    report
}

fn visit(
    node: &Node,
    path: String,
    report: &mut ValidationReport,
    seen: &mut BTreeMap<String, Vec<String>>,
) {
    if node.skip {
        return;
    }
    let id = node.field_id();

    if node.is_leaf() {
        match id {
            Some(id) => report.valid.push(ValidLeaf {
                path: path.clone(),
                id: id.to_string(),
                label: node.display_label().unwrap_or(&node.key).to_string(),
            }),
            None => {
                let widget = node.widget.as_deref().unwrap_or_default().to_lowercase();
                if !is_ignored_widget(&widget) {
                    report.missing.push(MissingId {
                        path: path.clone(),
                        key: node.key.clone(),
                        description: node.description.clone(),
                        widget,
                    });
                }
            }
        }
    }

    if let Some(id) = id {
        seen.entry(id.to_string()).or_default().push(path.clone());
    }

    for (idx, child) in node.children().iter().enumerate() {
        visit(child, format!("{path}.children[{idx}]"), report, seen);
    }
}

fn is_ignored_widget(widget: &str) -> bool {
    IGNORED_WIDGETS.contains(&widget) || widget.contains("separator")
}

pub fn execute(args: &ValidateArgs) -> Result<()> {
    let forest: Vec<Node> = io_utils::read_json(&args.input)?;
    let report = validate(&forest);
    match args.format {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => io_utils::write_json(None, &report)?,
    }
    if !report.passed() {
        bail!(
            "Validation of {:?} failed: {} duplicate id(s), {} leaf node(s) without id",
            args.input,
            report.duplicates.len(),
            report.missing.len()
        );
    }
    info!("✓ {:?} passed validation", args.input);
    Ok(())
}
