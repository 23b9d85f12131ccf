//! Data layer: the canonical Table, its derived TableView, and the
//! loaders/exporter that move tables in and out of files.

pub mod compare;
pub mod exporter;
pub mod loaders;
pub mod table;
pub mod view;
