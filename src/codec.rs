use bytes::{Buf, BytesMut};
use std::io;
use tokio_util::codec::Decoder;

/// Streaming decoder from a legacy charset (e.g. windows-1252 exports) to UTF-8.
pub struct Utf8Transcoder {
    decoder: encoding_rs::Decoder,
    finished: bool,
}

impl Utf8Transcoder {
    pub fn new(charset: &'static encoding_rs::Encoding) -> Self {
        Self {
            decoder: charset.new_decoder(),
            finished: false,
        }
    }

    fn transcode(&mut self, src: &mut BytesMut, last: bool) -> Option<BytesMut> {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(src.len())
            .unwrap_or_else(|| src.len() * 3 + 4);
        let mut out = String::with_capacity(capacity);

        // malformed sequences become U+FFFD rather than failing the sheet
        let (_result, read, _had_errors) = self.decoder.decode_to_string(src, &mut out, last);
        src.advance(read);

        if out.is_empty() {
            None
        } else {
            Some(BytesMut::from(out.as_bytes()))
        }
    }
}

impl Decoder for Utf8Transcoder {
    type Item = BytesMut;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        Ok(self.transcode(src, false))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // the decoder must not be fed again once flushed
        if self.finished {
            return Ok(None);
        }
        self.finished = true;
        let out = self.transcode(buf, true);
        buf.clear();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_1252_is_transcoded() {
        let mut t = Utf8Transcoder::new(encoding_rs::WINDOWS_1252);
        let mut src = BytesMut::from(&b"caf\xe9,1"[..]);
        let out = t.decode_eof(&mut src).unwrap().unwrap();
        assert_eq!(std::str::from_utf8(&out).unwrap(), "café,1");
    }
}
