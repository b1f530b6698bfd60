//! # Normalizer Pipeline
//! This crate holds the transform engine that turns the nested attribute
//! columns of the owner table into dimension, junction and child tables.
//! It includes modules for building the schema, extracting entries, resolving
//! dimensions, linking owners, pruning columns and orchestrating the phases,
//! along with error handling.
pub mod extractor;
pub mod linker;
pub mod orchestrator;
pub mod pruner;
pub mod resolver;
pub mod schema;

pub mod errors;
