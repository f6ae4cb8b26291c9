use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use tracing::debug;

use crate::error::{CloudCompileError, Result};

/// Bytes made safe to embed in a JSON request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// Base64 text of the (possibly zlib-compressed) input
    pub data: String,
    pub compressed: bool,
}

/// Compress (optionally) and base64-encode `data`.
///
/// Returns `None` for empty input: there is nothing to send and the caller
/// must skip the network call.
pub fn encode(data: &[u8], compressed: bool) -> Result<Option<EncodedPayload>> {
    if data.is_empty() {
        return Ok(None);
    }

    let encoded = if compressed {
        let packed = compress_into(data, Vec::with_capacity(data.len() / 2))?;
        debug!("Compressed {} bytes to {} bytes", data.len(), packed.len());
        STANDARD.encode(packed)
    } else {
        STANDARD.encode(data)
    };

    Ok(Some(EncodedPayload {
        data: encoded,
        compressed,
    }))
}

/// Reverse of [`encode`]
pub fn decode(payload: &EncodedPayload) -> Result<Vec<u8>> {
    let bytes = decode_base64(&payload.data)?;
    if !payload.compressed {
        return Ok(bytes);
    }

    let mut out = Vec::new();
    ZlibDecoder::new(bytes.as_slice())
        .read_to_end(&mut out)
        .map_err(|e| CloudCompileError::Encoding(format!("invalid zlib stream: {}", e)))?;
    Ok(out)
}

/// Decode standard base64 text, ignoring surrounding whitespace
pub fn decode_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text.trim())
        .map_err(|e| CloudCompileError::Encoding(format!("invalid base64: {}", e)))
}

/// zlib-compress `data` into `sink`
fn compress_into<W: Write>(data: &[u8], sink: W) -> Result<W> {
    let compression_error =
        |e: std::io::Error| CloudCompileError::Encoding(format!("zlib compression failed: {}", e));

    let mut encoder = ZlibEncoder::new(sink, Compression::default());
    encoder.write_all(data).map_err(compression_error)?;
    encoder.finish().map_err(compression_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_nothing_to_send() {
        assert!(encode(b"", false).unwrap().is_none());
        assert!(encode(b"", true).unwrap().is_none());
    }

    #[test]
    fn test_plain_encoding_is_base64() {
        let payload = encode(b"int main(){}", false).unwrap().unwrap();
        assert_eq!(payload.data, "aW50IG1haW4oKXt9");
        assert!(!payload.compressed);
    }

    #[test]
    fn test_compressed_encoding_is_zlib() {
        let source = b"int main(){ return 0; }\n".repeat(64);
        let payload = encode(&source, true).unwrap().unwrap();
        assert!(payload.compressed);

        let raw = decode_base64(&payload.data).unwrap();
        // zlib header, default compression
        assert_eq!(raw[0], 0x78);
        assert!(raw.len() < source.len());
    }

    #[test]
    fn test_decode_reverses_encode() {
        let inputs: [&[u8]; 3] = [b"x", b"int main(){}", &[0u8, 255, 17, 4, 0, 0, 9]];
        for input in inputs {
            for compressed in [false, true] {
                let payload = encode(input, compressed).unwrap().unwrap();
                assert_eq!(decode(&payload).unwrap(), input);
            }
        }
    }

    #[test]
    fn test_encode_leaves_input_untouched() {
        let input = b"define i32 @main()".to_vec();
        let copy = input.clone();
        let _ = encode(&input, true);
        assert_eq!(input, copy);
    }

    /// Sink that refuses every write
    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_compression_failure_is_reported() {
        let source = b"define i32 @main() { ret i32 0 }\n".repeat(256);
        match compress_into(&source, BrokenSink) {
            Err(CloudCompileError::Encoding(message)) => {
                assert!(message.contains("zlib compression failed"));
                assert!(message.contains("sink closed"));
            }
            other => panic!("Expected encoding error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        assert!(matches!(
            decode_base64("not base64!!"),
            Err(CloudCompileError::Encoding(_))
        ));
    }
}
