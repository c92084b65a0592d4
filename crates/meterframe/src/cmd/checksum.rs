use meterframe_frame::ChecksumKind;

use crate::cmd::{parse_hex, ChecksumArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_checksum, OutputFormat};

pub fn run(args: ChecksumArgs, format: OutputFormat) -> CliResult<i32> {
    let data = parse_hex(&args.hex)?;
    let kind = ChecksumKind::from(args.kind);
    let value = kind.compute(&data);

    let wide = value.to_be_bytes();
    let trailer = &wide[wide.len() - kind.trailer_len()..];

    print_checksum(kind, value, trailer, format);
    Ok(SUCCESS)
}
