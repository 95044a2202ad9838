//! different utility modules used throughout the project
/// terminal and file logging
pub mod logger;
/// run-wide options
pub mod settings;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into a task
pub mod task_parser;
/// save result into file as plain text, toml or json
pub mod writer;
