pub mod combo_table;
pub mod debouncer;
pub mod selection;
