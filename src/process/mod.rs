// src/process/mod.rs

pub mod clean;
pub mod extract;
pub mod verify;

pub use clean::{clean_csv, clean_line};
pub use extract::unzip_file;
pub use verify::verify_ingest;
