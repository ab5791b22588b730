//! Block oriented Base64 codec.
//!
//! Input is consumed in 3 byte blocks which are emitted as 4 symbols of the
//! standard alphabet, with `=` padding on the final block. Decoding stops at the
//! first padding or invalid symbol and reports how many bytes were produced,
//! so a stream written with an end marker can be decoded without knowing its
//! length up front.

pub mod constants {
    pub const ALPHABET: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    pub const PAD: u8 = b'=';
    pub const END_MARKER: &[u8; 4] = b"====";
}

use self::constants::*;

const INVALID: u8 = 0xff;

const DECODE_TABLE: [u8; 256] = {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 64 {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Number of symbols needed to encode `len` bytes, excluding any end marker.
#[inline(always)]
pub const fn encoded_len(len: usize) -> usize {
    (len + 2) / 3 * 4
}

/// Upper bound on the bytes produced by decoding `len` symbols.
#[inline(always)]
pub const fn decoded_len_bound(len: usize) -> usize {
    len / 4 * 3 + 3
}

#[inline(always)]
fn symbol(bits: u8) -> u8 {
    ALPHABET[(bits & 0x3f) as usize]
}

/// Encodes `input` into `output`, returning the number of symbols written.
///
/// When `mark_end` is set and the input length is a multiple of three, `====`
/// is appended so a decoder can find the end of the stream.
///
/// # Panics
///
/// If `output` cannot hold the encoded form. Callers size it up front.
pub fn encode(input: &[u8], output: &mut [u8], mark_end: bool) -> usize {
    let marker = if mark_end && input.len() % 3 == 0 { END_MARKER.len() } else { 0 };
    let required = encoded_len(input.len()) + marker;
    assert!(
        output.len() >= required,
        "Base64 output buffer holds {} bytes but {} are required",
        output.len(),
        required
    );

    let mut written = 0;
    let mut blocks = input.chunks_exact(3);
    for block in &mut blocks {
        output[written] = symbol(block[0] >> 2);
        output[written + 1] = symbol((block[0] << 4) | (block[1] >> 4));
        output[written + 2] = symbol((block[1] << 2) | (block[2] >> 6));
        output[written + 3] = symbol(block[2]);
        written += 4;
    }

    match *blocks.remainder() {
        [a, b] => {
            output[written] = symbol(a >> 2);
            output[written + 1] = symbol((a << 4) | (b >> 4));
            output[written + 2] = symbol(b << 2);
            output[written + 3] = PAD;
            written += 4;
        }
        [a] => {
            output[written] = symbol(a >> 2);
            output[written + 1] = symbol(a << 4);
            output[written + 2] = PAD;
            output[written + 3] = PAD;
            written += 4;
        }
        _ => {
            if marker > 0 {
                output[written..written + marker].copy_from_slice(END_MARKER);
                written += marker;
            }
        }
    }

    written
}

/// Encodes `input` into a freshly allocated string.
pub fn encode_to_string(input: &[u8]) -> String {
    let mut output = vec![0u8; encoded_len(input.len())];
    let len = encode(input, &mut output, false);
    output.truncate(len);
    output.into_iter().map(char::from).collect()
}

/// Decodes `input` into `output`, returning the number of bytes produced.
///
/// At most `max_input_len` symbols are consumed when given. Decoding halts at
/// the first padding or invalid symbol; bytes whose bits were fully available
/// before that symbol are still produced. Decoding also halts once `output` is
/// full.
pub fn decode(input: &[u8], output: &mut [u8], max_input_len: Option<usize>) -> usize {
    let input = match max_input_len {
        Some(max) if max < input.len() => &input[..max],
        _ => input,
    };

    let mut produced = 0;
    for quad in input.chunks(4) {
        let mut values = [INVALID; 4];
        for (value, &c) in values.iter_mut().zip(quad) {
            *value = DECODE_TABLE[c as usize];
        }

        let available = values.iter().take_while(|&&v| v != INVALID).count();
        let bytes = [
            (values[0] << 2) | (values[1] >> 4),
            (values[1] << 4) | (values[2] >> 2),
            (values[2] << 6) | values[3],
        ];
        let count = available.saturating_sub(1);

        for &byte in &bytes[..count] {
            if produced == output.len() {
                return produced;
            }
            output[produced] = byte;
            produced += 1;
        }

        if count < 3 {
            break;
        }
    }

    produced
}

/// Decodes `input` into a freshly allocated buffer, stopping as [`decode`] does.
pub fn decode_to_vec(input: &[u8]) -> Vec<u8> {
    let mut output = vec![0u8; decoded_len_bound(input.len())];
    let len = decode(input, &mut output, None);
    output.truncate(len);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(encode_to_string(b""), "");
        assert_eq!(encode_to_string(b"f"), "Zg==");
        assert_eq!(encode_to_string(b"fo"), "Zm8=");
        assert_eq!(encode_to_string(b"foo"), "Zm9v");
        assert_eq!(encode_to_string(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn round_trip_every_tail_length() {
        let data: Vec<u8> = (0..=255u8).cycle().take(300).collect();
        for len in 0..data.len() {
            let encoded = encode_to_string(&data[..len]);
            assert_eq!(decode_to_vec(encoded.as_bytes()), &data[..len], "length {}", len);
        }
    }

    #[test]
    fn end_marker_only_on_whole_blocks() {
        let mut out = [0u8; 12];
        assert_eq!(encode(b"abc", &mut out, true), 8);
        assert_eq!(&out[..8], b"YWJj====");

        assert_eq!(encode(b"ab", &mut out, true), 4);
        assert_eq!(&out[..4], b"YWI=");
    }

    #[test]
    fn decode_stops_at_end_marker() {
        let mut out = [0u8; 16];
        let n = decode(b"YWJj====garbage", &mut out, None);
        assert_eq!(&out[..n], b"abc");
    }

    #[test]
    fn decode_stops_at_invalid_symbol() {
        let mut out = [0u8; 16];
        // Invalid symbol at a block boundary: only whole blocks before it.
        assert_eq!(decode(b"QUJD!UFG", &mut out, None), 3);
        assert_eq!(&out[..3], b"ABC");

        // Invalid symbol third in a block: the first byte of that block is complete.
        assert_eq!(decode(b"QUJDRA!!", &mut out, None), 4);
        assert_eq!(&out[..4], b"ABCD");
    }

    #[test]
    fn decode_respects_bounds() {
        let mut out = [0u8; 2];
        assert_eq!(decode(b"Zm9vYmFy", &mut out, None), 2);
        assert_eq!(&out, b"fo");

        let mut out = [0u8; 16];
        assert_eq!(decode(b"Zm9vYmFy", &mut out, Some(4)), 3);
    }

    #[test]
    #[should_panic]
    fn undersized_output_panics() {
        let mut out = [0u8; 3];
        encode(b"abcd", &mut out, false);
    }
}
