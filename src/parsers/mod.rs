pub mod logger_parser;

pub use logger_parser::{parse_logger_file, parse_logger_reader};
