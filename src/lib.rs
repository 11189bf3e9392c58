//! attrition-pfi: permutation feature importance for employee attrition
//!
//! Loads a schema-typed CSV, fits a text + numeric feature pipeline and an
//! L2-regularized logistic regression, evaluates it on a held-out split and
//! ranks the input features by how much shuffling them hurts the model.

pub mod analysis;
pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
