//! Rows, the authoritative row store and the models built on top of it.

pub mod csv_loader;
pub mod data_provider;
pub mod row;
pub mod row_store;
pub mod searchable_model;
