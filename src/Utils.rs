//! different utility modules used throughout the project
/// tiny module to set up logging and save sample sets into csv files
pub mod logger;
/// tiny module to pretty-print a summary of a sample set
pub mod summary;
/// parse task document with structure like " title1 key1: value1 title2 key2: value2, value3" into a plot task
pub mod task_parser;
