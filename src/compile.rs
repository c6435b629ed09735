//! Dictionary sheet → form-definition tree.
//!
//! The pipeline is: locate the header row, discover columns, select and split
//! rows into items, sort by path, fold into the (optionally pre-populated)
//! forest, prune. Only a missing required column or an unusable header row
//! aborts; everything else is reported through [`BuildSummary`].

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::{
    cli::CompileArgs,
    config::{FormConfig, SheetLayout},
    error::CompileError,
    io_utils,
    items::{select_items, sort_items},
    rows::{ColumnMap, Row, locate_header},
    tree::{BuildSummary, Node, fold_items, prune},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub forest: Vec<Node>,
    pub summary: BuildSummary,
    /// Items produced by selection, after the composite split.
    pub selected: usize,
}

/// Compiles sheet rows into a pruned forest, folding onto `skeleton`.
pub fn compile_rows(
    rows: &[Row],
    layout: &SheetLayout,
    skeleton: Vec<Node>,
) -> Result<Compilation, CompileError> {
    let (header, data) = locate_header(rows, layout)?;
    let columns = ColumnMap::discover(header, layout)?;
    debug!("Column map: {:?}", columns);

    let mut items = select_items(data, &columns, &layout.root_prefix);
    sort_items(&mut items);

    let mut forest = skeleton;
    let summary = fold_items(&mut forest, &items);
    prune(&mut forest);
    Ok(Compilation {
        forest,
        summary,
        selected: items.len(),
    })
}

pub fn execute(args: &CompileArgs) -> Result<()> {
    let mut config = FormConfig::load_or_default(args.config.as_deref())?;
    if let Some(header_row) = args.header_row {
        config.sheet.header_row = header_row;
    }
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;

    let rows = io_utils::read_sheet(&args.input, delimiter, encoding)
        .with_context(|| format!("Reading dictionary sheet {:?}", args.input))?;
    let skeleton = match &args.skeleton {
        Some(path) => io_utils::read_json::<Vec<Node>>(path)
            .with_context(|| format!("Loading skeleton from {path:?}"))?,
        None => Vec::new(),
    };

    let compilation = compile_rows(&rows, &config.sheet, skeleton)
        .with_context(|| format!("Compiling {:?}", args.input))?;
    if !compilation.summary.skipped.is_empty() {
        warn!(
            "Skipped {} item(s) with a malformed path or missing id",
            compilation.summary.skipped.len()
        );
    }

    io_utils::write_json(Some(&args.output), &compilation.forest)
        .with_context(|| format!("Writing structure to {:?}", args.output))?;
    info!(
        "Generated structure with {} path(s) from {} row(s) into {:?}",
        compilation.summary.inserted,
        rows.len(),
        args.output
    );
    Ok(())
}
