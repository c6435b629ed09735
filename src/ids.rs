use std::fmt::Write as _;

use anyhow::Result;
use itertools::{Either, Itertools};
use log::{info, warn};

use crate::{cli::IdsArgs, io_utils, tree::Node};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdEntry {
    pub id: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdListing {
    /// Numeric ids, highest first.
    pub numeric: Vec<IdEntry>,
    /// Everything else, descending as strings.
    pub other: Vec<IdEntry>,
}

impl IdListing {
    pub fn len(&self) -> usize {
        self.numeric.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<10} | Description", "ID");
        let _ = writeln!(out, "{}", "-".repeat(50));
        for entry in &self.numeric {
            let _ = writeln!(out, "{:<10} | {}", entry.id, entry.description);
        }
        if !self.other.is_empty() {
            let _ = writeln!(out, "\n--- Non-Numeric IDs ---");
            for entry in &self.other {
                let _ = writeln!(out, "{:<10} | {}", entry.id, entry.description);
            }
        }
        out
    }
}

/// Lists every node carrying an id, including nodes under skipped subtrees.
pub fn list_ids(forest: &[Node]) -> IdListing {
    let mut entries = Vec::new();
    collect(forest, &mut entries);

    let (numeric, other): (Vec<_>, Vec<_>) =
        entries
            .into_iter()
            .partition_map(|entry| match entry.id.trim().parse::<i64>() {
                Ok(value) => Either::Left((value, entry)),
                Err(_) => Either::Right(entry),
            });

    IdListing {
        numeric: numeric
            .into_iter()
            .sorted_by(|a, b| b.0.cmp(&a.0))
            .map(|(_, entry)| entry)
            .collect(),
        other: other
            .into_iter()
            .sorted_by(|a, b| b.id.cmp(&a.id))
            .collect(),
    }
}

fn collect(nodes: &[Node], entries: &mut Vec<IdEntry>) {
    for node in nodes {
        if let Some(id) = node.field_id() {
            entries.push(IdEntry {
                id: id.to_string(),
                description: node.display_label().unwrap_or("No description").to_string(),
            });
        }
        collect(node.children(), entries);
    }
}

pub fn execute(args: &IdsArgs) -> Result<()> {
    let forest: Vec<Node> = io_utils::read_json(&args.input)?;
    let listing = list_ids(&forest);
    if listing.is_empty() {
        warn!("No ids found in {:?}", args.input);
    }
    print!("{}", listing.render());
    info!("Listed {} id(s) from {:?}", listing.len(), args.input);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_sort_by_value_descending() {
        let forest: Vec<Node> = serde_json::from_str(
            r#"[{"key":"e","children":[
                {"key":"a","id":"9","description":"Devět"},
                {"key":"b","id":"10057","description":"Rodné číslo"},
                {"key":"c","id":"100"},
                {"key":"d","id":"ext_a","label":"Externí"},
                {"key":"f","id":"ext_b"},
                {"key":"g","skip":true,"id":"42"}
            ]}]"#,
        )
        .unwrap();
        let listing = list_ids(&forest);
        let numeric = listing.numeric.iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
        assert_eq!(numeric, vec!["10057", "100", "42", "9"]);
        let other = listing.other.iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
        assert_eq!(other, vec!["ext_b", "ext_a"]);
        assert_eq!(listing.numeric[1].description, "No description");
        assert_eq!(listing.other[1].description, "Externí");

        let rendered = listing.render();
        assert!(rendered.starts_with("ID         | Description\n"));
        assert!(rendered.contains("10057      | Rodné číslo"));
        assert!(rendered.contains("--- Non-Numeric IDs ---"));
    }

    #[test]
    fn forest_without_ids_lists_nothing() {
        let forest: Vec<Node> =
            serde_json::from_str(r#"[{"key":"e","children":[{"key":"a"}]}]"#).unwrap();
        let listing = list_ids(&forest);
        assert!(listing.is_empty());
        assert!(!listing.render().contains("Non-Numeric"));
    }
}
