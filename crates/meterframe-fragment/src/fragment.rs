use std::fmt::Debug;

/// One piece of a larger payload, tagged with its position.
///
/// Ordinals are 1-based: a transfer of `count` pieces uses ordinals
/// `1..=count`, and only the piece with `ordinal == count` is flagged last.
pub trait Fragment {
    /// Value grouping the pieces of one transfer.
    type SessionId: Copy + Eq + Debug;

    fn session_id(&self) -> Self::SessionId;

    /// 1-based position within the transfer.
    fn ordinal(&self) -> u32;

    /// Total number of pieces in the transfer.
    fn count(&self) -> u32;

    /// True on the terminating piece.
    fn is_last(&self) -> bool;

    fn data(&self) -> &[u8];

    /// Shape check: ordinal in `1..=count`, and flagged last exactly when it
    /// is the final ordinal.
    fn is_well_formed(&self) -> bool {
        let ordinal = self.ordinal();
        let count = self.count();
        ordinal != 0 && ordinal <= count && (ordinal == count) == self.is_last()
    }
}

pub(crate) fn check_range(field: &'static str, value: usize, max: usize) -> crate::Result<()> {
    if value > max {
        return Err(crate::FragmentError::FieldOutOfRange { field, value, max });
    }
    Ok(())
}

pub(crate) fn require(body: &[u8], needed: usize) -> crate::Result<()> {
    if body.len() < needed {
        return Err(crate::FragmentError::Truncated {
            needed,
            available: body.len(),
        });
    }
    Ok(())
}

/// Split `payload` into chunks of at most `max_chunk` bytes, yielding
/// `(ordinal, count, chunk)`. An empty payload yields one empty chunk.
pub(crate) fn chunks(
    payload: &[u8],
    max_chunk: usize,
    max_count: usize,
) -> crate::Result<Vec<(usize, usize, &[u8])>> {
    if max_chunk == 0 {
        return Err(crate::FragmentError::InvalidChunkSize);
    }
    if payload.is_empty() {
        return Ok(vec![(1, 1, payload)]);
    }

    let count = payload.len().div_ceil(max_chunk);
    check_range("count", count, max_count)?;

    Ok(payload
        .chunks(max_chunk)
        .enumerate()
        .map(|(index, chunk)| (index + 1, count, chunk))
        .collect())
}
