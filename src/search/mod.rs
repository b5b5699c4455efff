pub mod filter;
pub mod pattern;
