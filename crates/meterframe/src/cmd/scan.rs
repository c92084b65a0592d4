use std::fs::File;
use std::io::Read;

use meterframe_frame::{Frame, FrameConfig, FrameReader, ScannerStats, StreamScanner, ESCAPE};
use tracing::{info, warn};

use crate::cmd::{parse_hex, ScanArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_scan, OutputFormat};

pub fn run(args: ScanArgs, format: OutputFormat) -> CliResult<i32> {
    let config = FrameConfig {
        escape: (!args.no_escape).then_some(ESCAPE),
        checksum: args.checksum.into(),
        max_frame_size: args.max_frame_size,
        read_chunk_size: args.read_chunk_size,
        ..FrameConfig::default()
    };
    if config.max_frame_size < config.min_frame_size() {
        return Err(CliError::new(
            USAGE,
            format!(
                "--max-frame-size must be at least {} for {}",
                config.min_frame_size(),
                config.checksum.name()
            ),
        ));
    }

    let (frames, stats) = if let Some(hex) = &args.hex {
        let bytes = parse_hex(hex)?;
        let mut scanner = StreamScanner::with_config(config);
        let frames = scanner.process(&bytes);
        (frames, scanner.stats().clone())
    } else if let Some(path) = &args.file {
        let file = File::open(path)
            .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
        read_all(FrameReader::with_config(file, config))?
    } else {
        read_all(FrameReader::with_config(std::io::stdin().lock(), config))?
    };

    let invalid = frames.iter().filter(|frame| !frame.is_valid()).count();
    info!(
        frames = stats.frames_emitted,
        overflows = stats.overflows,
        malformed = stats.malformed,
        ignored = stats.bytes_ignored,
        "scan complete"
    );
    if invalid > 0 {
        warn!(invalid, "frames failed checksum");
    }

    print_scan(&frames, &stats, format);

    if args.strict && invalid > 0 {
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}

fn read_all<R: Read>(mut reader: FrameReader<R>) -> CliResult<(Vec<Frame>, ScannerStats)> {
    let frames = reader
        .read_to_end()
        .map_err(|err| frame_error("failed reading capture", err))?;
    Ok((frames, reader.stats().clone()))
}
