use crate::error::Result;
use crate::formatter::TableFormatter;
use crate::table::EventTable;

/// The bare record table, nothing around it.
pub struct BinaryFormatter {}

impl BinaryFormatter {
    pub fn new() -> Self {
        Self {}
    }
}

impl TableFormatter for BinaryFormatter {
    fn format(&self, table: &EventTable) -> Result<Vec<u8>> {
        Ok(table.bytes().to_vec())
    }
}
