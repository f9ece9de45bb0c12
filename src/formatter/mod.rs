use crate::error::Result;
use crate::table::EventTable;

mod binary_formatter;
mod c_header_formatter;

pub use binary_formatter::BinaryFormatter;
pub use c_header_formatter::CHeaderFormatter;

/// Packages a finished table into the bytes of an output artifact.
pub trait TableFormatter {
    fn format(&self, table: &EventTable) -> Result<Vec<u8>>;
}
