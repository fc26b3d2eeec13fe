pub mod batch;
pub mod config;
pub mod data_models;
pub mod detection;
pub mod errors;
pub mod file_processor;
pub mod parsers;
pub mod utils;
pub mod visualization;
pub mod writer;

#[cfg(test)]
mod tests;
