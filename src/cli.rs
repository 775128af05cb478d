use crate::file_tree::TreeConfig;
use clap::Parser;
use std::path::PathBuf;

/// treeyank – browse a directory tree and yank paths to the clipboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root to browse (defaults to CWD)
    #[arg(value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Prefix prepended to the root's name in every path (e.g. "apps/web").
    #[arg(long, value_name = "PREFIX", default_value = "")]
    pub base_path: String,

    /// Directories at this depth or shallower start expanded (root = 0).
    #[arg(long = "depth", value_name = "N", default_value_t = 2)]
    pub default_expand_depth: usize,

    /// Start with every directory expanded.
    #[arg(long)]
    pub expand_all: bool,

    /// Maximum width of the tree view in columns.
    #[arg(long, value_name = "COLS")]
    pub max_width: Option<u16>,

    /// Comma-separated file-types to include (extension only, no dot).
    #[arg(long, value_delimiter = ',', value_name = "EXTENSIONS")]
    pub types: Vec<String>,

    /// Include files ignored by .gitignore
    #[arg(long)]
    pub include_ignored: bool,

    /// Annotate a node, e.g. --note "src/main.rs=entry point".
    /// Paths are relative to the root directory. Can be repeated.
    #[arg(long = "note", value_name = "PATH=TEXT")]
    pub notes: Vec<String>,

    /// Print the initially visible tree and exit without the TUI.
    #[arg(long)]
    pub headless: bool,

    /// Write debug logs to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            base_path: self.base_path.clone(),
            default_expand_depth: self.default_expand_depth,
            expand_all: self.expand_all,
            max_width: self.max_width,
        }
    }
}
