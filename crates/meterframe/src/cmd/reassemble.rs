use meterframe_fragment::{CommandFragment, DataSegment, Fragment, Reassembler};
use tracing::{debug, warn};

use crate::cmd::{parse_hex, FragmentKind, ReassembleArgs};
use crate::exit::{fragment_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_payload, OutputFormat};

type Decoder<F> = fn(&[u8]) -> meterframe_fragment::Result<F>;

pub fn run(args: ReassembleArgs, format: OutputFormat) -> CliResult<i32> {
    let bodies = args
        .fragments
        .iter()
        .map(|input| parse_hex(input))
        .collect::<CliResult<Vec<_>>>()?;

    match args.kind {
        FragmentKind::Segment => reassemble::<DataSegment>(&bodies, DataSegment::decode, format),
        FragmentKind::Fragment => {
            reassemble::<CommandFragment>(&bodies, CommandFragment::decode, format)
        }
    }
}

fn reassemble<F: Fragment>(
    bodies: &[Vec<u8>],
    decode: Decoder<F>,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut reassembler = Reassembler::<F>::default();

    for (index, body) in bodies.iter().enumerate() {
        let fragment =
            decode(body).map_err(|err| fragment_error(&format!("fragment {index}"), err))?;
        let session = fragment.session_id();
        let count = fragment.count();
        debug!(index, ordinal = fragment.ordinal(), count, "pushing fragment");

        if let Some(payload) = reassembler.push(fragment) {
            let trailing = bodies.len() - index - 1;
            if trailing > 0 {
                warn!(trailing, "ignoring fragments after completed payload");
            }
            print_payload(&format!("{session:?}"), count as usize, &payload, format);
            return Ok(SUCCESS);
        }
    }

    let reason = reassembler
        .last_reset()
        .map(|reason| format!(", last reset: {reason:?}"))
        .unwrap_or_default();
    Err(CliError::new(
        FAILURE,
        format!(
            "transfer incomplete: {} fragment(s) buffered{reason}",
            reassembler.len()
        ),
    ))
}
