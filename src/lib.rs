pub mod cli;
pub mod clipboard;
pub mod expand_state;
pub mod file_scanner;
pub mod file_tree;
pub mod path;
pub mod selection;
pub mod tree_builder;
pub mod tree_model;
pub mod tui;
pub mod workflow;
