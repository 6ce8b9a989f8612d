mod csv_export;
mod reporter;

pub use csv_export::write_csv;
pub use reporter::Reporter;
