#![no_main]

use libfuzzer_sys::fuzz_target;
use shadow_share::{Bitmap, EmbedDepth, embedder};

// Fuzzing target for Bitmap::from_bytes
//
// Arbitrary bytes, usually with a forced "BM" signature so the header
// checks are reached. Parsing must return Ok or Err and never panic, and
// any bitmap that parses must survive a shadow stamp and an embed.
fuzz_target!(|data: &[u8]| {
    let _result = Bitmap::from_bytes(data);

    let mut bytes = data.to_vec();
    if bytes.len() >= 2 {
        bytes[..2].copy_from_slice(b"BM");
    }

    if let Ok(mut bitmap) = Bitmap::from_bytes(&bytes) {
        assert_eq!(bitmap.file_size(), bitmap.header_size() + bitmap.image_size_bytes());
        assert!(bitmap.file_size() <= bytes.len());

        bitmap.set_shadow_number(u16::from(data[0]));
        assert_eq!(bitmap.shadow_number(), u16::from(data[0]));

        // Embed whatever fits; the header must be untouched
        let header = bitmap.header().to_vec();
        let depth = if data[1] & 1 == 0 {
            EmbedDepth::Lsb4
        } else {
            EmbedDepth::Lsb2
        };
        let stream_len = embedder::capacity(bitmap.image_size_bytes(), depth).min(data.len());
        let _ = embedder::embed(bitmap.pixels_mut(), &data[..stream_len], depth);
        assert_eq!(bitmap.header(), header.as_slice());

        let reparsed = Bitmap::from_bytes(&bitmap.to_bytes());
        assert!(reparsed.is_ok());
    }
});
