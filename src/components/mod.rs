//! Reusable UI components.

pub mod lineage_tree;
