use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use meterframe_frame::{ChecksumKind, Frame, Header, ScannerStats};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct CommandOutput {
    pub id: u16,
    pub size: usize,
    pub body: String,
}

#[derive(Serialize)]
pub struct FrameOutput {
    pub index: usize,
    pub wire_size: usize,
    pub checksum: &'static str,
    pub calculated: String,
    pub received: String,
    pub valid: bool,
    pub payload: String,
    pub commands: Vec<CommandOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_error: Option<String>,
}

impl FrameOutput {
    pub fn new(index: usize, frame: &Frame) -> Self {
        let kind = frame.checksum.kind;
        let mut commands = Vec::new();
        let mut command_error = None;
        for record in frame.commands() {
            match record {
                Ok(command) => commands.push(CommandOutput {
                    id: command.id,
                    size: command.size(),
                    body: hex::encode(&command.body),
                }),
                Err(err) => command_error = Some(err.to_string()),
            }
        }

        Self {
            index,
            wire_size: frame.wire_size(),
            checksum: kind.name(),
            calculated: checksum_hex(kind, frame.checksum.calculated),
            received: checksum_hex(kind, frame.checksum.received),
            valid: frame.is_valid(),
            payload: hex::encode(&frame.payload),
            commands,
            command_error,
        }
    }
}

#[derive(Serialize)]
struct StatsOutput {
    frames_emitted: u64,
    overflows: u64,
    malformed: u64,
    bytes_ignored: u64,
}

#[derive(Serialize)]
struct ScanOutput<'a> {
    frames: &'a [FrameOutput],
    stats: StatsOutput,
}

pub fn print_scan(frames: &[Frame], stats: &ScannerStats, format: OutputFormat) {
    if let OutputFormat::Raw = format {
        for frame in frames {
            print_raw(frame.payload.as_ref());
        }
        return;
    }

    let reports: Vec<FrameOutput> = frames
        .iter()
        .enumerate()
        .map(|(index, frame)| FrameOutput::new(index, frame))
        .collect();

    match format {
        OutputFormat::Json => {
            let out = ScanOutput {
                frames: &reports,
                stats: StatsOutput {
                    frames_emitted: stats.frames_emitted,
                    overflows: stats.overflows,
                    malformed: stats.malformed,
                    bytes_ignored: stats.bytes_ignored,
                },
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "SIZE", "CHECKSUM", "VALID", "COMMANDS", "PAYLOAD"]);
            for report in &reports {
                table.add_row(vec![
                    report.index.to_string(),
                    report.wire_size.to_string(),
                    format!("{} {}", report.checksum, report.received),
                    report.valid.to_string(),
                    command_summary(report),
                    report.payload.clone(),
                ]);
            }
            println!("{table}");
            println!(
                "frames={} overflows={} malformed={} ignored={}",
                stats.frames_emitted, stats.overflows, stats.malformed, stats.bytes_ignored
            );
        }
        OutputFormat::Pretty => {
            for report in &reports {
                println!(
                    "frame {} size={} {}={} valid={} commands=[{}]",
                    report.index,
                    report.wire_size,
                    report.checksum,
                    report.received,
                    report.valid,
                    command_summary(report)
                );
            }
        }
        OutputFormat::Raw => {}
    }
}

#[derive(Serialize)]
struct HeaderOutput {
    id: u16,
    header_size: usize,
    body_size: u8,
    bytes: String,
}

pub fn print_header(header: &Header, encoded: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&HeaderOutput {
            id: header.id,
            header_size: header.header_size,
            body_size: header.body_size,
            bytes: hex::encode(encoded),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["ID", "HEADER SIZE", "BODY SIZE", "BYTES"])
                .add_row(vec![
                    format!("{:#06x}", header.id),
                    header.header_size.to_string(),
                    header.body_size.to_string(),
                    hex::encode(encoded),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "id={:#06x} header_size={} body_size={} bytes={}",
            header.id,
            header.header_size,
            header.body_size,
            hex::encode(encoded)
        ),
        OutputFormat::Raw => print_raw(encoded),
    }
}

#[derive(Serialize)]
struct ChecksumOutput {
    kind: &'static str,
    value: String,
    trailer: String,
}

pub fn print_checksum(kind: ChecksumKind, value: u32, trailer: &[u8], format: OutputFormat) {
    let rendered = checksum_hex(kind, value);
    match format {
        OutputFormat::Json => print_json(&ChecksumOutput {
            kind: kind.name(),
            value: rendered,
            trailer: hex::encode(trailer),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["KIND", "VALUE", "TRAILER"])
                .add_row(vec![kind.name().to_string(), rendered, hex::encode(trailer)]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}={rendered}", kind.name()),
        OutputFormat::Raw => print_raw(trailer),
    }
}

#[derive(Serialize)]
struct PayloadOutput<'a> {
    session: &'a str,
    fragments: usize,
    size: usize,
    payload: String,
}

pub fn print_payload(session: &str, fragments: usize, payload: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&PayloadOutput {
            session,
            fragments,
            size: payload.len(),
            payload: hex::encode(payload),
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SESSION", "FRAGMENTS", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    session.to_string(),
                    fragments.to_string(),
                    payload.len().to_string(),
                    hex::encode(payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "session={session} fragments={fragments} size={} payload={}",
            payload.len(),
            hex::encode(payload)
        ),
        OutputFormat::Raw => print_raw(payload),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn command_summary(report: &FrameOutput) -> String {
    let mut parts: Vec<String> = report
        .commands
        .iter()
        .map(|command| format!("{:#06x}:{}", command.id, command.size))
        .collect();
    if let Some(err) = &report.command_error {
        parts.push(format!("error: {err}"));
    }
    parts.join(" ")
}

/// Render a checksum zero-padded to its trailer width.
pub fn checksum_hex(kind: ChecksumKind, value: u32) -> String {
    format!("{value:0width$x}", width = kind.trailer_len() * 2)
}
