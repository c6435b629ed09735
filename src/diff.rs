//! First-divergence structural comparison of JSON documents.
//!
//! Objects compare by key set and then per key (key order never matters);
//! arrays compare by length and then by index. The walk stops at the first
//! difference and reports it with a `root.children[3].id` style locator.

use std::{collections::BTreeSet, fmt};

use anyhow::{Result, bail};
use log::info;
use serde_json::Value;

use crate::{cli::DiffArgs, io_utils};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Object,
    Array,
    Scalar,
}

impl Kind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Kind::Object,
            Value::Array(_) => Kind::Array,
            _ => Kind::Scalar,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::Scalar => "scalar",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    Type { first: Kind, second: Kind },
    MissingInSecond(BTreeSet<String>),
    MissingInFirst(BTreeSet<String>),
    Length { first: usize, second: usize },
    Value { first: Value, second: Value },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Divergence {
    pub path: String,
    pub mismatch: Mismatch,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = &self.path;
        match &self.mismatch {
            Mismatch::Type { first, second } => {
                write!(f, "{path}: Type mismatch ({first} vs {second})")
            }
            Mismatch::MissingInSecond(keys) => {
                write!(f, "{path}: Keys missing in second file: {keys:?}")
            }
            Mismatch::MissingInFirst(keys) => {
                write!(f, "{path}: Keys missing in first file: {keys:?}")
            }
            Mismatch::Length { first, second } => {
                write!(f, "{path}: List length mismatch ({first} vs {second})")
            }
            Mismatch::Value { first, second } => {
                write!(f, "{path}: Value mismatch ({first} vs {second})")
            }
        }
    }
}

/// Compares two documents from `root`; `None` means structurally equal.
pub fn deep_compare(first: &Value, second: &Value) -> Option<Divergence> {
    compare_at(first, second, "root")
}

fn compare_at(first: &Value, second: &Value, path: &str) -> Option<Divergence> {
    let diverge = |mismatch| {
        Some(Divergence {
            path: path.to_string(),
            mismatch,
        })
    };

    match (first, second) {
        (Value::Object(a), Value::Object(b)) => {
            let missing_in_second = a
                .keys()
                .filter(|k| !b.contains_key(*k))
                .cloned()
                .collect::<BTreeSet<_>>();
            if !missing_in_second.is_empty() {
                return diverge(Mismatch::MissingInSecond(missing_in_second));
            }
            let missing_in_first = b
                .keys()
                .filter(|k| !a.contains_key(*k))
                .cloned()
                .collect::<BTreeSet<_>>();
            if !missing_in_first.is_empty() {
                return diverge(Mismatch::MissingInFirst(missing_in_first));
            }
            a.iter().find_map(|(key, left)| {
                b.get(key)
                    .and_then(|right| compare_at(left, right, &format!("{path}.{key}")))
            })
        }
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return diverge(Mismatch::Length {
                    first: a.len(),
                    second: b.len(),
                });
            }
            a.iter()
                .zip(b)
                .enumerate()
                .find_map(|(idx, (left, right))| compare_at(left, right, &format!("{path}[{idx}]")))
        }
        _ if Kind::of(first) != Kind::of(second) => diverge(Mismatch::Type {
            first: Kind::of(first),
            second: Kind::of(second),
        }),
        _ if first != second => diverge(Mismatch::Value {
            first: first.clone(),
            second: second.clone(),
        }),
        _ => None,
    }
}

/// Removes `keys` from a top-level object; other values are left untouched.
pub fn strip_keys(value: &mut Value, keys: &[String]) {
    if let Value::Object(map) = value {
        for key in keys {
            map.remove(key);
        }
    }
}

pub fn execute(args: &DiffArgs) -> Result<()> {
    let mut first: Value = io_utils::read_json(&args.first)?;
    let mut second: Value = io_utils::read_json(&args.second)?;
    strip_keys(&mut first, &args.ignore_keys);
    strip_keys(&mut second, &args.ignore_keys);

    match deep_compare(&first, &second) {
        None => {
            println!("OK: Files are identical (recursively).");
            info!("{:?} and {:?} match", args.first, args.second);
            Ok(())
        }
        Some(divergence) => {
            println!("FAIL: Files differ.");
            println!("{divergence}");
            bail!("{:?} and {:?} differ", args.first, args.second)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn key_order_is_irrelevant() {
        let a = json!({"a": 1, "b": [1, {"c": "x", "d": null}]});
        let b = json!({"b": [1, {"d": null, "c": "x"}], "a": 1});
        assert_eq!(deep_compare(&a, &b), None);
    }

    #[test]
    fn key_set_mismatch_stops_before_common_keys() {
        let a = json!({"a": 1, "b": 2, "extra": true});
        let b = json!({"a": 99, "b": 2});
        let divergence = deep_compare(&a, &b).unwrap();
        assert_eq!(divergence.path, "root");
        assert_eq!(
            divergence.mismatch,
            Mismatch::MissingInSecond(BTreeSet::from(["extra".to_string()]))
        );
        assert_eq!(
            divergence.to_string(),
            "root: Keys missing in second file: {\"extra\"}"
        );

        let flipped = deep_compare(&b, &a).unwrap();
        assert!(matches!(flipped.mismatch, Mismatch::MissingInFirst(_)));
    }

    #[test]
    fn arrays_are_order_sensitive() {
        let a = json!([{"key": "a", "children": [{"id": "1"}, {"id": "2"}]}]);
        let b = json!([{"key": "a", "children": [{"id": "1"}, {"id": "3"}]}]);
        let divergence = deep_compare(&a, &b).unwrap();
        assert_eq!(divergence.path, "root[0].children[1].id");
        assert_eq!(
            divergence.to_string(),
            "root[0].children[1].id: Value mismatch (\"2\" vs \"3\")"
        );

        let shorter = json!([1]);
        let longer = json!([1, 2]);
        assert_eq!(
            deep_compare(&shorter, &longer).unwrap().mismatch,
            Mismatch::Length { first: 1, second: 2 }
        );
    }

    #[test]
    fn structural_kind_mismatch() {
        let divergence = deep_compare(&json!({"a": [1]}), &json!({"a": {"0": 1}})).unwrap();
        assert_eq!(divergence.path, "root.a");
        assert_eq!(
            divergence.mismatch,
            Mismatch::Type { first: Kind::Array, second: Kind::Object }
        );
    }

    #[test]
    fn scalar_types_differ_by_value() {
        let divergence = deep_compare(&json!("1"), &json!(1)).unwrap();
        assert!(matches!(divergence.mismatch, Mismatch::Value { .. }));
    }

    #[test]
    fn strip_keys_ignores_file_fields() {
        let mut a = json!({"10057": "x", "999102": "upload-a.pdf"});
        let mut b = json!({"10057": "x", "999102": "upload-b.pdf"});
        let ignore = vec!["999102".to_string()];
        strip_keys(&mut a, &ignore);
        strip_keys(&mut b, &ignore);
        assert_eq!(deep_compare(&a, &b), None);
    }

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (-50i64..50).prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                proptest::collection::btree_map("[a-d]", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn compare_is_reflexive(value in json_value()) {
            prop_assert_eq!(deep_compare(&value, &value), None);
        }

        #[test]
        fn divergence_path_is_symmetric(a in json_value(), b in json_value()) {
            let forward = deep_compare(&a, &b).map(|d| d.path);
            let backward = deep_compare(&b, &a).map(|d| d.path);
            prop_assert_eq!(forward, backward);
        }
    }
}
