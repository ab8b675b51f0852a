pub mod csv_export;
pub mod lowrance;
pub mod lowrance_writer;
