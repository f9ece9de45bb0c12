use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info, Level};

use crate::extractor::Extractor;
use crate::formatter::{BinaryFormatter, CHeaderFormatter, TableFormatter};
use crate::reconstruct::ClosePolicy;
use crate::table::{decode_records, EventTable};

mod error;
mod extractor;
mod formatter;
mod midi_event;
mod reconstruct;
mod record;
mod table;
mod tempo;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[arg(short, long)]
    midi_file: PathBuf,

    #[arg(short, long, default_value = "midi_data.h", help = "Output path, or - for stdout")]
    output: PathBuf,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::CHeader)]
    format: OutputFormat,

    #[arg(long, default_value = "midi_content", help = "Name of the PROGMEM array")]
    array_name: String,

    #[arg(
        long,
        value_enum,
        default_value_t = CloseOpenNotes::OwnTrack,
        help = "Where notes still sounding at the end of a track are closed"
    )]
    close_open_notes: CloseOpenNotes,

    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    CHeader,
    Binary,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum CloseOpenNotes {
    OwnTrack,
    LastTrack,
}

/// Everything the conversion needs, independent of the command line.
#[derive(Debug, Clone)]
struct ConvertOptions {
    midi_file: PathBuf,
    output: PathBuf,
    format: OutputFormat,
    array_name: String,
    close_policy: ClosePolicy,
}

impl From<Args> for ConvertOptions {
    fn from(args: Args) -> Self {
        Self {
            midi_file: args.midi_file,
            output: args.output,
            format: args.format,
            array_name: args.array_name,
            close_policy: match args.close_open_notes {
                CloseOpenNotes::OwnTrack => ClosePolicy::OwnTrack,
                CloseOpenNotes::LastTrack => ClosePolicy::LastTrack,
            },
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    let options = ConvertOptions::from(args);
    let output = convert(&options)?;
    write_output(&options.output, &output)
}

fn convert(options: &ConvertOptions) -> Result<Vec<u8>> {
    info!("MIDI FILE: {}", options.midi_file.display());

    let source = Extractor::load(&options.midi_file)
        .and_then(|extractor| extractor.run())
        .context("load midi file")?;
    let table = EventTable::build(&source, options.close_policy).context("build event table")?;

    info!("Detected Ticks/Beat (PPQ): {}", table.timing.ticks_per_beat);
    info!(
        "Detected Tempo (us/beat): {} ({} BPM)",
        table.timing.micros_per_beat,
        table.timing.bpm()
    );
    info!("Tick duration: {} ms", table.tick_duration_ms());

    let end_tick = table
        .records()
        .iter()
        .map(|r| r.time_abs + r.duration)
        .max()
        .unwrap_or(0);
    info!(
        "Song length: {} ticks ({:.3} s)",
        end_tick,
        end_tick as f64 * table.tick_duration_ms() / 1000.0
    );

    let formatter: Box<dyn TableFormatter> = match options.format {
        OutputFormat::CHeader => Box::new(CHeaderFormatter::new(options.array_name.as_str())),
        OutputFormat::Binary => Box::new(BinaryFormatter::new()),
    };
    let output = formatter.format(&table).context("format event table")?;

    if tracing::enabled!(Level::DEBUG) {
        // what the firmware will read back
        for record in decode_records(table.bytes())? {
            debug!("{:?}", record);
        }
    }

    info!(
        "{} events ({} bytes)",
        table.event_count()?,
        table.total_byte_size()?
    );
    Ok(output)
}

fn write_output(path: &Path, output: &[u8]) -> Result<()> {
    if path == Path::new("-") {
        let mut stdout = io::stdout().lock();
        stdout.write_all(output).context("write to stdout")?;
        return stdout.flush().context("write to stdout");
    }

    fs::write(path, output).with_context(|| format!("write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EventRecord;
    use pretty_assertions::assert_eq;

    // format 0, 96 ticks/beat, tempo 600000, one note of 10 ticks
    const ONE_NOTE_SMF: &[u8] = &[
        b'M', b'T', b'h', b'd', 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x00, 0x60, //
        b'M', b'T', b'r', b'k', 0x00, 0x00, 0x00, 0x13, //
        0x00, 0xff, 0x51, 0x03, 0x09, 0x27, 0xc0, //
        0x00, 0x90, 0x3c, 0x64, //
        0x0a, 0x80, 0x3c, 0x40, //
        0x00, 0xff, 0x2f, 0x00,
    ];

    fn options(dir: &Path, format: OutputFormat) -> ConvertOptions {
        let midi_file = dir.join("song.mid");
        fs::write(&midi_file, ONE_NOTE_SMF).unwrap();
        ConvertOptions {
            midi_file,
            output: dir.join("out"),
            format,
            array_name: "midi_content".to_string(),
            close_policy: ClosePolicy::OwnTrack,
        }
    }

    #[test]
    fn converts_file_to_binary_table() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(dir.path(), OutputFormat::Binary);

        let output = convert(&options).unwrap();
        assert_eq!(
            decode_records(&output).unwrap(),
            vec![
                EventRecord::on(0, 60, 100, 0),
                EventRecord::off(0, 60, 100, 0, 10),
            ]
        );
    }

    #[test]
    fn converts_file_to_header() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(dir.path(), OutputFormat::CHeader);

        let output = String::from_utf8(convert(&options).unwrap()).unwrap();
        assert!(output.contains("const uint32_t TICKS_PER_BEAT = 96;"));
        assert!(output.contains("const uint32_t MICROSECONDS_PER_BEAT = 600000;"));
        assert!(output.contains("const uint32_t MIDI_EVENT_COUNT = 2;"));

        write_output(&options.output, output.as_bytes()).unwrap();
        assert_eq!(fs::read_to_string(&options.output).unwrap(), output);
    }

    #[test]
    fn missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(dir.path(), OutputFormat::Binary);
        options.midi_file = dir.path().join("missing.mid");

        let err = convert(&options).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<error::Error>(),
            Some(error::Error::SourceNotFound(_))
        ));
        assert!(!options.output.exists());
    }

    #[test]
    fn cli_defaults() {
        let args = Args::parse_from(["midi2progmem", "-m", "song.mid"]);
        let options = ConvertOptions::from(args);
        assert_eq!(options.output, PathBuf::from("midi_data.h"));
        assert_eq!(options.format, OutputFormat::CHeader);
        assert_eq!(options.array_name, "midi_content");
        assert_eq!(options.close_policy, ClosePolicy::OwnTrack);
    }

    #[test]
    fn cli_legacy_closure() {
        let args = Args::parse_from([
            "midi2progmem",
            "-m",
            "song.mid",
            "-f",
            "binary",
            "--close-open-notes",
            "last-track",
        ]);
        let options = ConvertOptions::from(args);
        assert_eq!(options.format, OutputFormat::Binary);
        assert_eq!(options.close_policy, ClosePolicy::LastTrack);
    }
}
