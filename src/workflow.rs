use crate::clipboard::{ClipboardWorker, NoClipboard};
use crate::file_tree::{FileTree, TreeConfig};
use crate::tree_model::Node;
use crate::{cli, file_scanner, tree_builder, tui};
use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{Config, WriteLogger};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

// The TUI owns the terminal, so logs only ever go to a file.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file =
        File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), file)
        .context("logger already initialised")?;
    Ok(())
}

/// Initially visible rows as text. Headless runs never copy, so no
/// clipboard worker is started.
fn headless_lines(root: Node, config: TreeConfig) -> Vec<String> {
    let tree = FileTree::new(Arc::new(root), config, Box::new(NoClipboard));
    tree_builder::render_rows(&tree.visible_rows())
}

pub fn run_treeyank(cli_args: cli::Cli) -> Result<()> {
    init_logging(cli_args.log_file.as_deref())?;

    let notes = file_scanner::parse_notes(&cli_args.notes)?;
    let root = file_scanner::scan_tree(
        &cli_args.root,
        &cli_args.types,
        cli_args.include_ignored,
        &notes,
    )?;

    if cli_args.headless {
        for line in headless_lines(root, cli_args.tree_config()) {
            println!("{line}");
        }
        return Ok(());
    }

    let clipboard = ClipboardWorker::spawn()?;
    let tree = FileTree::new(Arc::new(root), cli_args.tree_config(), Box::new(clipboard));

    let rescan: tui::Rescan = {
        let root = cli_args.root.clone();
        let types = cli_args.types.clone();
        let include_ignored = cli_args.include_ignored;
        Box::new(move || file_scanner::scan_tree(&root, &types, include_ignored, &notes))
    };

    let selected = tui::run_tui(tree, Some(rescan))?;
    log::info!("exiting with selection {:?}", selected);
    println!("Selected: {selected}");
    Ok(())
}
