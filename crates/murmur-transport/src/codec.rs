//! Inbound line framing that survives malformed input.

use std::io;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, Decoder};

/// One inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Inbound {
    Line(String),
    /// A line over the length limit. Its bytes were skipped up to the
    /// next newline.
    TooLong,
}

/// Splits on `\n`, drops one trailing `\r`, and decodes UTF-8 lossily.
///
/// Invalid byte sequences become U+FFFD instead of an error, and an
/// over-long line is reported once as [`Inbound::TooLong`]. Neither ends
/// the stream; only I/O errors do.
#[derive(Debug)]
pub(crate) struct LossyLineCodec {
    inner: AnyDelimiterCodec,
}

impl LossyLineCodec {
    pub(crate) fn new(max_length: usize) -> Self {
        Self {
            inner: AnyDelimiterCodec::new_with_max_length(
                b"\n".to_vec(),
                b"\n".to_vec(),
                max_length,
            ),
        }
    }
}

fn frame(decoded: Result<Option<Bytes>, AnyDelimiterCodecError>) -> io::Result<Option<Inbound>> {
    match decoded {
        Ok(Some(chunk)) => {
            let bytes: &[u8] = &chunk;
            let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
            Ok(Some(Inbound::Line(String::from_utf8_lossy(bytes).into_owned())))
        }
        Ok(None) => Ok(None),
        Err(AnyDelimiterCodecError::MaxChunkLengthExceeded) => Ok(Some(Inbound::TooLong)),
        Err(AnyDelimiterCodecError::Io(e)) => Err(e),
    }
}

impl Decoder for LossyLineCodec {
    type Item = Inbound;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Inbound>> {
        frame(self.inner.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Inbound>> {
        frame(self.inner.decode_eof(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LossyLineCodec, input: &[u8]) -> Vec<Inbound> {
        let mut buf = BytesMut::from(input);
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(&mut buf).unwrap() {
            frames.push(frame);
        }
        frames
    }

    fn line(s: &str) -> Inbound {
        Inbound::Line(s.to_string())
    }

    #[test]
    fn test_decode_splits_lines_and_strips_carriage_return() {
        let mut codec = LossyLineCodec::new(64);
        assert_eq!(
            decode_all(&mut codec, b"HELLO alice\r\nUSERS\n"),
            vec![line("HELLO alice"), line("USERS")]
        );
    }

    #[test]
    fn test_decode_invalid_utf8_becomes_replacement_char() {
        let mut codec = LossyLineCodec::new(64);
        assert_eq!(
            decode_all(&mut codec, b"MSG caf\xe9\n"),
            vec![line("MSG caf\u{fffd}")]
        );
    }

    #[test]
    fn test_decode_overlong_line_is_skipped_and_stream_continues() {
        let mut codec = LossyLineCodec::new(8);
        assert_eq!(
            decode_all(&mut codec, b"MSG xxxxxxxxxxxx\nQUIT\n"),
            vec![Inbound::TooLong, line("QUIT")]
        );
    }

    #[test]
    fn test_decode_waits_for_terminator() {
        let mut codec = LossyLineCodec::new(64);
        let mut buf = BytesMut::from(&b"MSG hi"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(line("MSG hi")));
    }

    #[test]
    fn test_decode_eof_yields_unterminated_last_line() {
        let mut codec = LossyLineCodec::new(64);
        let mut buf = BytesMut::from(&b"QUIT"[..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some(line("QUIT")));
    }
}
