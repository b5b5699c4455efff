pub mod config;
pub mod data;
pub mod remote;
pub mod search;
pub mod utils;
pub mod widgets;

pub use data::data_provider::{DataProvider, ModelEvent, SearchModel};
pub use data::row::Row;
pub use data::searchable_model::SearchableModel;
pub use remote::remote_model::RemoteTableModel;
pub use search::pattern::SearchPattern;
pub use widgets::combo_table::ComboTable;
