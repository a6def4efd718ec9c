//! Session level checks: round trips, chunking, corruption and misuse.

use proptest::prelude::*;

use bzstream::{
    compress, decompress, new_compressor, new_decompressor, BzError, CompressorState,
    DecompressorState,
};

/// Deterministic text-like data, long enough to fill several small blocks.
fn sample_text(len: usize) -> Vec<u8> {
    let words = [
        "block ", "sorting ", "compression ", "of ", "the ", "stream ", "with ", "runs ",
        "aaaaaaa ", "zzz ", "\n",
    ];
    let mut seed: u32 = 0x2545_f491;
    let mut out = Vec::with_capacity(len + 16);
    while out.len() < len {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        out.extend_from_slice(words[seed as usize % words.len()].as_bytes());
    }
    out.truncate(len);
    out
}

/// Compress with the given chunk size, concatenating every piece of output.
fn compress_chunked(data: &[u8], class: u8, chunk: usize) -> Vec<u8> {
    let mut c = new_compressor(class).unwrap();
    let mut out = Vec::new();
    for piece in data.chunks(chunk) {
        out.extend(c.feed(piece).unwrap());
    }
    out.extend(c.finish().unwrap());
    out
}

fn decompress_chunked(stream: &[u8], chunk: usize) -> Result<Vec<u8>, BzError> {
    let mut d = new_decompressor();
    let mut out = Vec::new();
    for piece in stream.chunks(chunk) {
        out.extend(d.feed(piece)?);
    }
    d.finish()?;
    Ok(out)
}

#[test]
fn empty_input() {
    let stream = compress(b"", 9).unwrap();
    assert_eq!(&stream[..4], b"BZi9");
    assert_eq!(decompress(&stream).unwrap(), b"");
}

#[test]
fn single_byte() {
    let stream = compress(b"A", 1).unwrap();
    assert_eq!(decompress(&stream).unwrap(), b"A");
}

#[test]
fn ten_a() {
    let mut c = new_compressor(1).unwrap();
    assert!(c.feed(b"aaaaaaaaaa").unwrap().is_empty());
    let stream = c.finish().unwrap();
    assert_eq!(decompress(&stream).unwrap(), b"aaaaaaaaaa");
}

#[test]
fn multi_block() {
    let data = sample_text(250_000);
    let mut c = new_compressor(1).unwrap();
    let first = c.feed(&data[..150_000]).unwrap();
    assert_eq!(c.blocks(), 1);
    assert!(!first.is_empty());
    let second = c.feed(&data[150_000..]).unwrap();
    assert_eq!(c.blocks(), 2);
    let tail = c.finish().unwrap();
    assert_eq!(c.blocks(), 3);
    assert_eq!(c.state(), CompressorState::Finished);

    let mut d = new_decompressor();
    let mut plain = d.feed(&first).unwrap();
    assert_eq!(plain.len(), 100_000);
    plain.extend(d.feed(&second).unwrap());
    assert_eq!(plain.len(), 200_000);
    plain.extend(d.feed(&tail).unwrap());
    d.finish().unwrap();
    assert_eq!(d.blocks(), 3);
    assert_eq!(plain, data);
}

#[test]
fn byte_at_a_time() {
    let data = sample_text(3_000);
    let stream = compress_chunked(&data, 1, 1);
    assert_eq!(stream, compress(&data, 1).unwrap());
    assert_eq!(decompress_chunked(&stream, 1).unwrap(), data);
}

#[test]
fn chunking_does_not_change_output() {
    let data = sample_text(210_000);
    let whole = compress(&data, 1).unwrap();
    for chunk in [64, 999, 65_536, 100_000, 100_001] {
        assert_eq!(compress_chunked(&data, 1, chunk), whole, "chunk {}", chunk);
    }
    for chunk in [1_000, 7_777, whole.len()] {
        assert_eq!(decompress_chunked(&whole, chunk).unwrap(), data);
    }
}

#[test]
fn deterministic() {
    let data = sample_text(20_000);
    assert_eq!(compress(&data, 2).unwrap(), compress(&data, 2).unwrap());
}

#[test]
fn finish_twice() {
    let mut c = new_compressor(1).unwrap();
    c.finish().unwrap();
    assert!(matches!(c.finish(), Err(BzError::InvalidState(_))));

    let stream = compress(b"twice", 1).unwrap();
    let mut d = new_decompressor();
    d.feed(&stream).unwrap();
    d.finish().unwrap();
    assert!(matches!(d.finish(), Err(BzError::InvalidState(_))));
}

#[test]
fn truncated_stream() {
    let stream = compress(&sample_text(5_000), 1).unwrap();
    for cut in [0, 3, 10, 20, stream.len() / 2, stream.len() - 1] {
        let mut d = new_decompressor();
        d.feed(&stream[..cut]).unwrap();
        assert!(
            matches!(d.finish(), Err(BzError::TruncatedStream(_))),
            "cut at {}",
            cut
        );
        assert_eq!(d.state(), DecompressorState::Error);
    }
}

#[test]
fn corrupt_payload_and_crc() {
    let stream = compress(&sample_text(4_000), 1).unwrap();
    let payload_len = u32::from_be_bytes([stream[14], stream[15], stream[16], stream[17]]) as usize;
    let payload_start = 18;
    let crc_start = payload_start + payload_len;
    for pos in [payload_start, payload_start + payload_len / 2, crc_start, crc_start + 3] {
        for bit in 0..8 {
            let mut bad = stream.clone();
            bad[pos] ^= 1 << bit;
            assert!(
                matches!(decompress(&bad), Err(BzError::CorruptStream(_))),
                "flip at byte {} bit {}",
                pos,
                bit
            );
        }
    }
}

#[test]
fn damaged_header_class() {
    let mut stream = compress(&sample_text(4_000), 1).unwrap();
    stream[3] ^= 0b10;
    assert_eq!(&stream[..4], b"BZi3");
    assert!(matches!(decompress(&stream), Err(BzError::CorruptStream(_))));
}

#[test]
fn corrupt_footer_crc() {
    let mut stream = compress(b"footer check", 1).unwrap();
    let crc_pos = stream.len() - 12;
    stream[crc_pos] ^= 0x80;
    assert!(matches!(decompress(&stream), Err(BzError::CorruptStream(_))));
}

#[test]
fn bad_block_size() {
    assert_eq!(
        new_compressor(10).unwrap_err(),
        BzError::UnsupportedBlockSize(10)
    );
    assert!(matches!(
        decompress(b"BZi0"),
        Err(BzError::UnsupportedBlockSize(0))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Any input survives a round trip through any chunking.
    #[test]
    fn round_trip(
        data in prop::collection::vec(any::<u8>(), 0..4_000),
        chunk in 1usize..700,
    ) {
        let stream = compress_chunked(&data, 1, chunk);
        prop_assert_eq!(&stream, &compress(&data, 1).unwrap());
        prop_assert_eq!(decompress_chunked(&stream, chunk).unwrap(), data);
    }

    /// Skewed inputs exercise long runs and small alphabets.
    #[test]
    fn round_trip_runs(
        runs in prop::collection::vec((0u8..4, 1usize..600), 1..40),
    ) {
        let data: Vec<u8> = runs
            .iter()
            .flat_map(|&(b, n)| std::iter::repeat(b).take(n))
            .collect();
        let stream = compress(&data, 1).unwrap();
        prop_assert_eq!(decompress(&stream).unwrap(), data);
    }
}
