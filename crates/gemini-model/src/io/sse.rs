use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Reading from the underlying stream failed. The stream is unusable.
    ChunksError(ChunksError),
    /// One event could not be parsed. It has been consumed, and the next
    /// call may still return events.
    InvalidPayload(String),
}

/// A type for reading server-sent events from a chunk stream.
pub struct Sse {
    buf: Vec<u8>,
    chunks: Chunks,
    exhausted: bool,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: Vec::new(),
            chunks,
            exhausted: false,
        }
    }

    /// Returns the data of the next event.
    ///
    /// Buffered events are returned before reading more from the stream.
    /// Trailing bytes without a terminating blank line are discarded when
    /// the stream ends.
    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            if let Some(event) = self.try_parse_event()? {
                return Ok(Some(event));
            }
            if self.exhausted {
                return Ok(None);
            }

            match self.chunks.next_chunk().await.map_err(Error::ChunksError)? {
                // Only line feeds delimit lines here, carriage returns are
                // dropped so that `\r\n` framing works too.
                Some(bytes) => self
                    .buf
                    .extend(bytes.iter().copied().filter(|b| *b != b'\r')),
                None => self.exhausted = true,
            }
        }
    }

    fn try_parse_event(&mut self) -> Result<Option<String>, Error> {
        // event         = *( comment / field ) end-of-line
        // comment       = colon *any-char end-of-line
        // field         = 1*name-char [ colon [ space ] *any-char ] end-of-line
        loop {
            let Some(eol_idx) = self.buf.windows(2).position(|w| w == b"\n\n")
            else {
                return Ok(None);
            };

            // Consume the event from the buffer before parsing, so a bad
            // event never blocks the ones behind it.
            let block: Vec<u8> = self.buf.drain(0..eol_idx + 2).collect();
            if let Some(data) = parse_block(&block[..eol_idx])? {
                return Ok(Some(data));
            }
        }
    }
}

fn parse_block(block: &[u8]) -> Result<Option<String>, Error> {
    let Ok(block) = str::from_utf8(block) else {
        return Err(Error::InvalidPayload("event is not valid UTF-8".into()));
    };

    let mut data_lines = vec![];
    for line in block.split('\n') {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => {
                (field, value.strip_prefix(' ').unwrap_or(value))
            }
            None => (line, ""),
        };
        match field {
            "data" => data_lines.push(value),
            "event" | "id" | "retry" => {}
            _ => {
                return Err(Error::InvalidPayload(format!(
                    "unexpected field `{field}`"
                )));
            }
        }
    }

    if data_lines.is_empty() {
        return Ok(None);
    }
    Ok(Some(data_lines.join("\n")))
}
