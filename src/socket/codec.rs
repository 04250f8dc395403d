use std::io::Error;
use std::result::Result;

use bytes::{BufMut, BytesMut};
use tokio::net::UnixStream;
use tokio_util::codec::{Decoder, Encoder, Framed};
use twoway::find_bytes;

pub type ReplyProtocol = Framed<UnixStream, ReplyCodec>;

/// One line of a BIRD control-socket reply
///
/// Coded lines look like `DDDD-text` (more lines follow) or `DDDD text`
/// (last line for that code); continuation lines start with a space.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyLine {
    pub code: Option<u16>,
    pub more: bool,
    pub text: String,
}

impl ReplyLine {
    pub fn parse(line: &str) -> Self {
        let bytes = line.as_bytes();
        let coded = bytes.len() >= 5
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && (bytes[4] == b'-' || bytes[4] == b' ');
        if coded {
            ReplyLine {
                code: line[..4].parse().ok(),
                more: bytes[4] == b'-',
                text: line[5..].to_string(),
            }
        } else if let Some(text) = line.strip_prefix(' ') {
            ReplyLine {
                code: None,
                more: true,
                text: text.to_string(),
            }
        } else {
            // A bare status code, e.g. "0000" with the trailing space stripped
            let code = if bytes.len() == 4 && bytes.iter().all(u8::is_ascii_digit) {
                line.parse().ok()
            } else {
                None
            };
            ReplyLine {
                code,
                more: code.is_none(),
                text: if code.is_some() {
                    String::new()
                } else {
                    line.to_string()
                },
            }
        }
    }

    /// Does this line end the reply? (0xxx ok, 8xxx runtime error, 9xxx parse error)
    pub fn is_final(&self) -> bool {
        match self.code {
            Some(code) if !self.more => code < 1000 || code >= 8000,
            _ => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.code, Some(code) if code >= 8000)
    }
}

#[derive(Debug, Default)]
pub struct ReplyCodec;

impl ReplyCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for ReplyCodec {
    type Item = ReplyLine;
    type Error = Error;

    // Replies are newline-framed; each line decodes on its own
    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Error> {
        if let Some(end) = find_bytes(&buf[..], b"\n") {
            let line = buf.split_to(end + 1);
            let line = String::from_utf8_lossy(&line[..end]);
            Ok(Some(ReplyLine::parse(line.trim_end_matches('\r'))))
        } else {
            Ok(None)
        }
    }
}

impl Encoder<String> for ReplyCodec {
    type Error = Error;

    fn encode(&mut self, command: String, buf: &mut BytesMut) -> Result<(), Error> {
        buf.reserve(command.len() + 1);
        buf.put_slice(command.as_bytes());
        buf.put_u8(b'\n');
        Ok(())
    }
}
