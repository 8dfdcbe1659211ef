//! Applicant scoring engine.
//!
//! Leaves first: `normalize` → `similarity` / `coverage` → `compose` feed the
//! baseline scanner. `parser` guards every scanner that reads foreign text.
//! `batch` and `handlers` are the callers.

pub mod baseline;
pub mod batch;
pub mod compose;
pub mod coverage;
pub mod external;
pub mod generative;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod prompts;
pub mod scanner;
pub mod similarity;
