use std::ops::Range;

/// Computes the byte range `offset..offset + len` inside a buffer of `size` bytes.
///
/// # Returns
/// - `Some(range)` if the whole range lies within the buffer.
/// - `None` if the range overflows or reaches past `size`.
pub fn checked_range(offset: u64, len: u64, size: u64) -> Option<Range<usize>> {
    let end = offset.checked_add(len)?;
    if end > size {
        return None;
    }

    Some(usize::try_from(offset).ok()?..usize::try_from(end).ok()?)
}

/// Extracts a 32-bit little-endian unsigned integer from a buffer at a given offset.
///
/// # Arguments
///
/// - `buffer`: A slice of bytes from which the value will be extracted.
/// - `offset`: The offset within the buffer where the 32-bit value starts.
///
/// Returns `None` if the slice does not contain enough bytes starting from the offset.
pub fn u32_at(buffer: &[u8], offset: usize) -> Option<u32> {
    let bytes = buffer.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

/// Extracts a 16-bit little-endian unsigned integer from a buffer at a given offset.
///
/// Returns `None` if the slice does not contain enough bytes starting from the offset.
pub fn u16_at(buffer: &[u8], offset: usize) -> Option<u16> {
    let bytes = buffer.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes(bytes.try_into().ok()?))
}

/// Extracts an 8-bit unsigned integer from a buffer at a given offset.
pub fn u8_at(buffer: &[u8], offset: usize) -> Option<u8> {
    buffer.get(offset).copied()
}
