//! Modulo-256 byte-sum checksum used by RSP frames.

/// Sum of all payload bytes, truncated to 8 bits
pub fn compute(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Check a received checksum against the payload it arrived with
pub fn verify(payload: &[u8], checksum: u8) -> bool {
    compute(payload) == checksum
}
