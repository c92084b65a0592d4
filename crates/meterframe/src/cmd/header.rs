use bytes::BytesMut;
use meterframe_frame::{decode_header, encode_header, Header};

use crate::cmd::{parse_hex, HeaderAction, HeaderArgs};
use crate::exit::{CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_header, OutputFormat};

pub fn run(args: HeaderArgs, format: OutputFormat) -> CliResult<i32> {
    match args.action {
        HeaderAction::Encode { id, size } => {
            let mut buf = BytesMut::new();
            let header_size = encode_header(id, size, &mut buf)
                .map_err(|err| CliError::new(USAGE, format!("cannot encode header: {err}")))?;
            let header = Header {
                header_size,
                id,
                body_size: size,
            };
            print_header(&header, &buf, format);
        }
        HeaderAction::Decode { hex } => {
            let bytes = parse_hex(&hex)?;
            let header = decode_header(&bytes)
                .map_err(|err| CliError::new(DATA_INVALID, format!("cannot decode header: {err}")))?;
            print_header(&header, &bytes[..header.header_size], format);
        }
    }
    Ok(SUCCESS)
}
