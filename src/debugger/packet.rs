//! Packet framing
//!
//! Inbound buffers are classified by their first byte: `+` ack, `-` nak,
//! `$` frame, anything else is noise. A frame must span the whole buffer
//! as `$<payload>#<hh>` with exactly two hex digits after the `#`.

use super::checksum;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Bare nak sent back when a frame does not match the grammar
pub const NAK: &[u8] = b"-";

/// A frame whose checksum matched its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub payload: &'a [u8],
    pub checksum: u8,
}

/// Classification of one received buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// `+`, the peer acknowledged our last frame
    Ack,
    /// `-`, the peer wants our last frame again
    Nak,
    /// Well-formed frame with a valid checksum
    Packet(Packet<'a>),
    /// Well-formed frame whose checksum does not match
    Corrupt { expected: u8, received: u8 },
    /// Starts with `$` but is not `$<payload>#<hh>`
    Malformed,
    /// Unclassified leading byte
    Noise,
}

/// Classify a raw buffer read from the socket
pub fn parse(buf: &[u8]) -> Inbound<'_> {
    match buf.first() {
        Some(b'-') => Inbound::Nak,
        Some(b'+') => Inbound::Ack,
        Some(b'$') => parse_frame(&buf[1..]),
        _ => Inbound::Noise,
    }
}

fn parse_frame(body: &[u8]) -> Inbound<'_> {
    let hash = match body.iter().position(|&b| b == b'#') {
        Some(pos) => pos,
        None => return Inbound::Malformed,
    };

    let (payload, tail) = (&body[..hash], &body[hash + 1..]);
    let received = match tail {
        [hi, lo] => match (hex_value(*hi), hex_value(*lo)) {
            (Some(hi), Some(lo)) => (hi << 4) | lo,
            _ => return Inbound::Malformed,
        },
        _ => return Inbound::Malformed,
    };

    let expected = checksum::compute(payload);
    if expected != received {
        return Inbound::Corrupt { expected, received };
    }

    Inbound::Packet(Packet {
        payload,
        checksum: received,
    })
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Append the two lowercase hex digits of `byte` to `out`
pub fn push_hex_byte(out: &mut Vec<u8>, byte: u8) {
    out.push(HEX_DIGITS[(byte >> 4) as usize]);
    out.push(HEX_DIGITS[(byte & 0x0f) as usize]);
}

/// Frame a payload as `$<payload>#<hh>`
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 4);
    out.push(b'$');
    out.extend_from_slice(payload);
    out.push(b'#');
    push_hex_byte(&mut out, checksum::compute(payload));
    out
}

/// Ack the request and frame the reply: `+$<payload>#<hh>`
pub fn encode_reply(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 5);
    out.push(b'+');
    out.extend_from_slice(&frame(payload));
    out
}
