//! Polyline file I/O and the bridge between file records and model data

pub mod polyline;
mod records;

pub use polyline::{PolylineRecord, read, read_file, read_files_parallel, write, write_file};
pub use records::{ColumnLoad, export_records, import_records, load_columns, record_from};
