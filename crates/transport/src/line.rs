//! Line-oriented backend: one event per line of UTF-8 text.
//!
//! Input grammar is `name`, `name=value` or `quit`. Emitted signals are
//! written as `name` (absent value) or `name=value`, one per line.

use async_trait::async_trait;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};
use tracing::debug;
use vsm_core::{Inbound, Value};

use crate::error::TransportError;
use crate::traits::SignalTransport;

pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
    buf: Vec<u8>,
}

impl LineTransport<BufReader<Stdin>, Stdout> {
    /// Read from stdin, write to stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            buf: Vec::new(),
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

/// Text form of an emitted signal, without the trailing newline.
pub fn format_line(name: &str, value: &Value) -> String {
    if value.is_absent() {
        name.to_string()
    } else {
        format!("{name}={value}")
    }
}

#[async_trait]
impl<R, W> SignalTransport for LineTransport<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn receive(&mut self) -> Result<Option<Inbound>, TransportError> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf).await?;
        if n == 0 {
            debug!("input stream closed");
            return Ok(None);
        }
        // Invalid UTF-8 degrades to replacement characters; the line then
        // simply matches no rule.
        let line = String::from_utf8_lossy(&self.buf);
        Ok(Some(Inbound::parse(&line)))
    }

    async fn send(&mut self, name: &str, value: &Value) -> Result<(), TransportError> {
        let mut line = format_line(name, value);
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.writer.flush().await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "line"
    }
}
