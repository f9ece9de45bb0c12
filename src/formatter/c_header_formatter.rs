use crate::error::Result;
use crate::formatter::TableFormatter;
use crate::record::RECORD_SIZE;
use crate::table::EventTable;

pub const DEFAULT_ARRAY_NAME: &str = "midi_content";

/// An Arduino header: timing constants and a PROGMEM byte array,
/// one 12-byte record per line.
pub struct CHeaderFormatter {
    array_name: String,
}

impl CHeaderFormatter {
    pub fn new(array_name: impl Into<String>) -> Self {
        Self {
            array_name: array_name.into(),
        }
    }
}

impl Default for CHeaderFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_ARRAY_NAME)
    }
}

impl TableFormatter for CHeaderFormatter {
    fn format(&self, table: &EventTable) -> Result<Vec<u8>> {
        let total_bytes = table.total_byte_size()?;
        let mut out = String::new();

        out.push_str("// This file was auto-generated by midi2progmem\n");
        out.push_str("// Each line is a 12-byte event:\n");
        out.push_str(
            "// [code(1), channel(1), note(1), volume(1), time_abs[4,LE], duration[4,LE]]\n\n",
        );
        out.push_str(&format!(
            "const uint32_t TICKS_PER_BEAT = {}; // Ticks per Quarter Note (PPQ)\n",
            table.timing.ticks_per_beat
        ));
        out.push_str(&format!(
            "const uint32_t MICROSECONDS_PER_BEAT = {}; // Tempo: Microseconds per Beat\n\n",
            table.timing.micros_per_beat
        ));
        out.push_str(&format!("const uint32_t MIDI_CONTENT_SIZE = {};\n", total_bytes));
        out.push_str(&format!(
            "const uint32_t MIDI_EVENT_COUNT = {};\n",
            table.event_count()?
        ));
        out.push_str(&format!(
            "const uint32_t EVENT_SIZE_BYTES = {};\n",
            RECORD_SIZE
        ));
        out.push_str(
            "const float TICK_TIME_MS = (float)MICROSECONDS_PER_BEAT / (float)TICKS_PER_BEAT / 1000.0f;\n\n",
        );
        out.push_str(&format!(
            "const uint8_t {}[{}] PROGMEM = {{\n",
            self.array_name, total_bytes
        ));

        let lines: Vec<String> = table
            .bytes()
            .chunks(RECORD_SIZE)
            .map(|record| {
                let hex: Vec<String> = record.iter().map(|b| format!("0x{:02x}", b)).collect();
                format!("   {}", hex.join(", "))
            })
            .collect();
        // no trailing comma after the last record
        out.push_str(&lines.join(",\n"));
        if !lines.is_empty() {
            out.push('\n');
        }

        out.push_str("};\n");
        Ok(out.into_bytes())
    }
}
