//! Defect Tracer core: the pipeline between the submission UI and the
//! append-only record table. Validation, case numbering, duplicate
//! detection, filtering, case closing and chart rollups.

pub mod draft;
pub mod error;
pub mod filter;
pub mod record;
pub mod rollup;
pub mod service;
pub mod session;
pub mod store;
pub mod utils;
