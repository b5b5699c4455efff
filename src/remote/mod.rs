//! Paged/virtual row provider: the backend boundary, a count estimator,
//! a simulated backend and the generation-aware model over them.

pub mod estimator;
pub mod remote_model;
pub mod row_source;
pub mod simulated;
