mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "meterframe", version, about = "Metering frame codec CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "METERFRAME_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "METERFRAME_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{ChecksumArg, FragmentKind, HeaderAction};

    #[test]
    fn parses_scan_subcommand() {
        let cli = Cli::try_parse_from([
            "meterframe",
            "scan",
            "--hex",
            "7e0102039d3b7e",
            "--checksum",
            "crc16",
        ])
        .expect("scan args should parse");

        assert!(matches!(cli.command, Command::Scan(_)));
    }

    #[test]
    fn rejects_conflicting_scan_inputs() {
        let err = Cli::try_parse_from([
            "meterframe",
            "scan",
            "--hex",
            "7e",
            "--file",
            "/tmp/capture.bin",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_header_encode_with_hex_id() {
        let cli = Cli::try_parse_from([
            "meterframe", "header", "encode", "--id", "0x021F", "--size", "4",
        ])
        .expect("header args should parse");

        match cli.command {
            Command::Header(args) => match args.action {
                HeaderAction::Encode { id, size } => {
                    assert_eq!(id, 0x021F);
                    assert_eq!(size, 4);
                }
                HeaderAction::Decode { .. } => panic!("expected encode"),
            },
            _ => panic!("expected header"),
        }
    }

    #[test]
    fn parses_checksum_kind() {
        let cli = Cli::try_parse_from(["meterframe", "checksum", "--kind", "lrc", "0102"])
            .expect("checksum args should parse");
        match cli.command {
            Command::Checksum(args) => assert!(matches!(args.kind, ChecksumArg::Lrc)),
            _ => panic!("expected checksum"),
        }
    }

    #[test]
    fn reassemble_requires_fragments() {
        let err = Cli::try_parse_from(["meterframe", "reassemble"])
            .expect_err("missing fragments should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from([
            "meterframe", "reassemble", "--kind", "fragment", "01000181aa",
        ])
        .expect("reassemble args should parse");
        match cli.command {
            Command::Reassemble(args) => {
                assert!(matches!(args.kind, FragmentKind::Fragment));
                assert_eq!(args.fragments.len(), 1);
            }
            _ => panic!("expected reassemble"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "meterframe", "version", "--format", "json", "--log-level", "debug",
        ])
        .expect("global flags should parse");
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }
}
