//! Form-definition tree: node model, builder and pruner.
//!
//! The compiled document is a JSON array of top-level [`Node`]s. Each node
//! owns its children; a node is a leaf iff `children` is absent or empty.
//! [`fold_items`] grows the tree from path-sorted [`Item`]s and [`prune`]
//! removes the transient empty `children` markers afterwards so that a pruned
//! tree represents leaves in exactly one way.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

use crate::{items::Item, normalize::normalize_key};

pub const DEFAULT_ORDER: i64 = 100;
pub const DEFAULT_WIDGET: &str = "input";
pub const DEFAULT_WIDTH: u32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skip: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_only: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub default_value: String,
    #[serde(default = "default_order", deserialize_with = "lenient_order")]
    pub order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub original_path: String,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub dat_typ: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub delka: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub specificke_povinnosti: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub logicke_kontroly: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub vysvetlivky: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub widget: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_width",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub manual_parent: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub ciselnik: Option<String>,
    /// Applicability flag as written; the builder writes `P`, `N` or `PP` but
    /// hand-edited values are kept as they are.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub mandatory: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub p: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub n: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub z: Option<String>,
    /// Hand-authored attributes (labels, layout hints) carried through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_order() -> i64 {
    DEFAULT_ORDER
}

// Hand-edited form documents are loosely typed: ids and sheet values may be
// numbers, widths and orders may be strings, and any attribute may be null.
// None of that may reject the document.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

fn lenient_width<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let width = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|w| u32::try_from(w).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(width)
}

fn lenient_order<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let order = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(order.unwrap_or(DEFAULT_ORDER))
}

impl Node {
    /// A fresh node with default attributes and an empty children marker.
    pub fn new(key: impl Into<String>) -> Self {
        Node {
            key: key.into(),
            skip: false,
            new_only: false,
            description: String::new(),
            default_value: String::new(),
            order: DEFAULT_ORDER,
            children: Some(Vec::new()),
            original_path: String::new(),
            id: None,
            dat_typ: None,
            delka: None,
            specificke_povinnosti: None,
            logicke_kontroly: None,
            vysvetlivky: None,
            widget: None,
            width: None,
            manual_parent: None,
            ciselnik: None,
            mandatory: None,
            p: None,
            n: None,
            z: None,
            extra: Map::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.as_ref().is_none_or(|c| c.is_empty())
    }

    pub fn children(&self) -> &[Node] {
        self.children.as_deref().unwrap_or_default()
    }

    /// The id when present and non-blank.
    pub fn field_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// Description, then hand-authored `label`, then `None`.
    pub fn display_label(&self) -> Option<&str> {
        if !self.description.is_empty() {
            return Some(&self.description);
        }
        self.extra
            .get("label")
            .and_then(Value::as_str)
            .filter(|label| !label.is_empty())
    }

    fn attach(&mut self, item: &Item, id: &str) {
        self.id = Some(id.to_string());
        self.dat_typ = Some(item.dat_typ.clone());
        self.delka = Some(item.delka.clone());
        self.specificke_povinnosti = Some(item.specificke_povinnosti.clone());
        self.logicke_kontroly = Some(item.logicke_kontroly.clone());
        self.vysvetlivky = Some(item.vysvetlivky.clone());
        self.mandatory = Some(item.mandatory.to_string());
        self.p = Some(item.p.clone());
        self.n = Some(item.n.clone());
        self.z = Some(item.z.clone());

        self.widget.get_or_insert_with(|| DEFAULT_WIDGET.to_string());
        self.width.get_or_insert(DEFAULT_WIDTH);
        self.manual_parent.get_or_insert_with(String::new);
        self.ciselnik.get_or_insert_with(String::new);

        // First writer wins: curated descriptions survive recompilation.
        if self.description.is_empty() {
            self.description = item.description.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub inserted: usize,
    pub skipped: Vec<SkippedItem>,
}

/// Folds path-sorted items into `forest`, creating nodes on demand.
///
/// `forest` may be empty or a hand-authored skeleton; existing nodes are found
/// by key and only their leaf fields are filled.
pub fn fold_items(forest: &mut Vec<Node>, items: &[Item]) -> BuildSummary {
    let mut summary = BuildSummary::default();
    for item in items {
        let outcome = path_keys(&item.path).and_then(|keys| {
            let id = item
                .id
                .as_deref()
                .ok_or_else(|| "id cell is empty".to_string())?;
            insert(forest, &keys, item, id);
            Ok(())
        });
        match outcome {
            Ok(()) => summary.inserted += 1,
            Err(reason) => {
                warn!("Skipping item '{}': {reason}", item.path);
                summary.skipped.push(SkippedItem {
                    path: item.path.clone(),
                    reason,
                });
            }
        }
    }
    summary
}

fn path_keys(path: &str) -> Result<Vec<String>, String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err("path is blank".to_string());
    }
    trimmed
        .split('.')
        .map(|segment| {
            let key = normalize_key(segment);
            if key.is_empty() {
                Err(format!("segment '{segment}' has no usable characters"))
            } else {
                Ok(key)
            }
        })
        .collect()
}

fn insert(forest: &mut Vec<Node>, keys: &[String], item: &Item, id: &str) {
    let mut level = forest;
    let mut prefix = String::new();
    for (depth, key) in keys.iter().enumerate() {
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(key);

        let node = find_or_create(level, key);
        node.original_path = prefix.clone();
        if depth + 1 == keys.len() {
            node.attach(item, id);
        }
        level = node.children.get_or_insert_with(Vec::new);
    }
}

fn find_or_create<'a>(siblings: &'a mut Vec<Node>, key: &str) -> &'a mut Node {
    let idx = match siblings.iter().position(|node| node.key == key) {
        Some(idx) => idx,
        None => {
            siblings.push(Node::new(key));
            siblings.len() - 1
        }
    };
    &mut siblings[idx]
}

/// Removes every present-but-empty `children` marker.
pub fn prune(forest: &mut [Node]) {
    for node in forest {
        match node.children.as_mut() {
            Some(children) if children.is_empty() => node.children = None,
            Some(children) => prune(children),
            None => {}
        }
    }
}
