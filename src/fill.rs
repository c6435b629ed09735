//! Synthetic form data.
//!
//! Walks a compiled form and produces a flat `field id → value` map suitable
//! for driving the rendered form in end-to-end tests. A [`FillPolicy`] decides
//! how fields that already have a default are represented, so the same form
//! can be exercised with defaults overridden, restated, or left implicit.

use std::{collections::BTreeMap, path::Path};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::EnumCatalog,
    cli::{FillArgs, ScenariosArgs},
    config::{FillOptions, FormConfig},
    io_utils,
    tree::{DEFAULT_WIDGET, Node},
};

const STRUCTURAL_WIDGETS: &[&str] = &["separator", "markdown", "title", "label", "html"];
const DATE_VALUE: &str = "2025-01-01";
const NUMBER_VALUE: &str = "123";
const PREFERRED_ENUM_VALUE: &str = "AD";
const UNKNOWN_ENUM_VALUE: &str = "UNKNOWN";

// Fields whose synthetic value has to pass the form's own consistency checks:
// the birth number must be modulus-11 valid and agree with the birth date.
const BIRTH_NUMBER_ID: &str = "10057";
const BIRTH_DATE_ID: &str = "10056";
const SEX_ID: &str = "10059";
const SEX_VALUE: &str = "M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "kebab-case")]
pub enum FillPolicy {
    /// Generate a value that differs from any configured default
    #[value(alias = "non_default")]
    NonDefault,
    /// Restate configured defaults verbatim
    #[value(alias = "explicit_default")]
    ExplicitDefault,
    /// Omit fields that have a default
    #[value(alias = "implicit_default")]
    ImplicitDefault,
}

impl FillPolicy {
    pub const ALL: [FillPolicy; 3] = [
        FillPolicy::NonDefault,
        FillPolicy::ExplicitDefault,
        FillPolicy::ImplicitDefault,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FillPolicy::NonDefault => "non_default",
            FillPolicy::ExplicitDefault => "explicit_default",
            FillPolicy::ImplicitDefault => "implicit_default",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FillPolicy::NonDefault => "Set 1 (Non-Default)",
            FillPolicy::ExplicitDefault => "Set 2 (Explicit Default)",
            FillPolicy::ImplicitDefault => "Set 3 (Implicit Default)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: FillPolicy,
    pub label: String,
    pub data: BTreeMap<String, String>,
}

/// Birth number with a modulus-11 check: the first `yymmdd` + 4-digit suffix
/// divisible by 11, searching suffixes in ascending order.
pub fn generate_rc(yy: u32, mm: u32, dd: u32) -> String {
    let prefix = format!("{yy:02}{mm:02}{dd:02}");
    let prefix_value = u64::from(yy) * 10_000 + u64::from(mm) * 100 + u64::from(dd);
    (0..10_000u64)
        .find(|suffix| (prefix_value * 10_000 + suffix) % 11 == 0)
        .map(|suffix| format!("{prefix}{suffix:04}"))
        .unwrap_or(prefix)
}

pub fn birth_number(date: NaiveDate) -> String {
    let yy = date.year().rem_euclid(100).unsigned_abs();
    generate_rc(yy, date.month(), date.day())
}

fn synthetic_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1985, 1, 1).unwrap_or_default()
}

/// Picks an option value from `key`, avoiding `exclude` where possible.
pub fn choose_enum_value(catalog: &EnumCatalog, key: &str, exclude: &[&str]) -> String {
    let Some(options) = catalog.get(key) else {
        return UNKNOWN_ENUM_VALUE.to_string();
    };
    let all = options
        .iter()
        .map(|option| option.value.as_str())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>();
    let mut candidates = all
        .iter()
        .copied()
        .filter(|value| !exclude.contains(value))
        .collect::<Vec<_>>();
    if candidates.is_empty() && !all.is_empty() {
        warn!("Excluding {exclude:?} leaves no options in '{key}'; using the full list");
        candidates = all;
    }
    if candidates.contains(&PREFERRED_ENUM_VALUE) {
        return PREFERRED_ENUM_VALUE.to_string();
    }
    candidates
        .first()
        .map_or_else(|| UNKNOWN_ENUM_VALUE.to_string(), |value| value.to_string())
}

fn generate_value(node: &Node, id: &str, catalog: &EnumCatalog, exclude: &[&str]) -> String {
    match id {
        BIRTH_NUMBER_ID => return birth_number(synthetic_birth_date()),
        BIRTH_DATE_ID => return synthetic_birth_date().format("%Y-%m-%d").to_string(),
        SEX_ID => return SEX_VALUE.to_string(),
        _ => {}
    }
    match node.widget.as_deref().unwrap_or(DEFAULT_WIDGET) {
        "date" => DATE_VALUE.to_string(),
        "number" => NUMBER_VALUE.to_string(),
        "selection" | "combobox" => match node.ciselnik.as_deref().filter(|c| !c.is_empty()) {
            Some(key) => choose_enum_value(catalog, key, exclude),
            None => format!("Test {}", node.key),
        },
        _ => format!("Test {}", node.key),
    }
}

struct Filler<'a> {
    catalog: &'a EnumCatalog,
    policy: FillPolicy,
    options: &'a FillOptions,
    data: BTreeMap<String, String>,
}

impl Filler<'_> {
    fn visit(&mut self, node: &Node) {
        if node.skip {
            return;
        }
        if node.is_leaf() {
            self.fill_leaf(node);
        }
        for child in node.children() {
            self.visit(child);
        }
    }

    fn fill_leaf(&mut self, node: &Node) {
        let Some(id) = node.field_id() else {
            return;
        };
        let widget = node.widget.as_deref().unwrap_or(DEFAULT_WIDGET);
        if STRUCTURAL_WIDGETS.contains(&widget) {
            return;
        }

        let default = self
            .options
            .default_overrides
            .get(id)
            .map(String::as_str)
            .unwrap_or(&node.default_value);
        let has_default = !default.trim().is_empty();

        let value = match (self.policy, has_default) {
            (_, false) => Some(generate_value(node, id, self.catalog, &[])),
            (FillPolicy::ImplicitDefault, true) => None,
            (FillPolicy::ExplicitDefault, true) => Some(default.to_string()),
            (FillPolicy::NonDefault, true) => {
                Some(generate_value(node, id, self.catalog, &[default]))
            }
        };
        if let Some(value) = value {
            self.data.insert(id.to_string(), value);
        }
    }
}

/// Produces the field id → value map for one policy.
pub fn fill(
    forest: &[Node],
    catalog: &EnumCatalog,
    policy: FillPolicy,
    options: &FillOptions,
) -> BTreeMap<String, String> {
    let mut filler = Filler {
        catalog,
        policy,
        options,
        data: BTreeMap::new(),
    };
    for node in forest {
        filler.visit(node);
    }
    filler.data
}

/// One scenario per policy, in [`FillPolicy::ALL`] order.
pub fn build_scenarios(
    forest: &[Node],
    catalog: &EnumCatalog,
    options: &FillOptions,
) -> Vec<Scenario> {
    FillPolicy::ALL
        .iter()
        .map(|&policy| Scenario {
            name: policy,
            label: policy.label().to_string(),
            data: fill(forest, catalog, policy, options),
        })
        .collect()
}

fn load_inputs(form: &Path, enums: &Path) -> Result<(Vec<Node>, EnumCatalog)> {
    let forest: Vec<Node> =
        io_utils::read_json(form).with_context(|| format!("Loading form from {form:?}"))?;
    let catalog = EnumCatalog::load(enums)?;
    Ok((forest, catalog))
}

pub fn execute(args: &FillArgs) -> Result<()> {
    let config = FormConfig::load_or_default(args.config.as_deref())?;
    let (forest, catalog) = load_inputs(&args.form, &args.enums)?;
    let data = fill(&forest, &catalog, args.policy, &config.fill);
    io_utils::write_json(args.output.as_deref(), &data)?;
    info!(
        "Generated {} value(s) with policy {}",
        data.len(),
        args.policy.as_str()
    );
    Ok(())
}

pub fn execute_scenarios(args: &ScenariosArgs) -> Result<()> {
    let config = FormConfig::load_or_default(args.config.as_deref())?;
    let (forest, catalog) = load_inputs(&args.form, &args.enums)?;
    let scenarios = build_scenarios(&forest, &catalog, &config.fill);
    io_utils::write_json(args.output.as_deref(), &scenarios)?;
    info!("Generated {} scenario(s)", scenarios.len());
    Ok(())
}
