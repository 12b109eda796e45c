// GaugeConnection: framed message exchange with the Gauge host.
//
// The wire protocol is simple:
// - 4 bytes: body length as little-endian u32
// - N bytes: body as UTF-8 JSON encoding one `Message`

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::constants::MAX_MESSAGE_SIZE;
use crate::messages::Message;

/// A connection to the host over any byte stream.
///
/// Production code uses a [`TcpStream`]; tests can use an in-memory
/// `tokio::io::duplex` pair.
pub struct GaugeConnection<S = TcpStream> {
    stream: S,
}

impl GaugeConnection<TcpStream> {
    /// Connect to the host listening on `host:port`.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((host, port))
            .await
            .with_context(|| format!("Failed to connect to Gauge at {host}:{port}"))?;
        stream
            .set_nodelay(true)
            .context("Failed to configure host connection")?;

        tracing::debug!(host, port, "Connected to Gauge");
        Ok(Self { stream })
    }
}

impl<S> GaugeConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already-connected stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Send a message through the connection.
    pub async fn send_message(&mut self, message: &Message) -> Result<()> {
        let body = serde_json::to_vec(message).context("Failed to serialize message")?;
        if body.len() > MAX_MESSAGE_SIZE {
            anyhow::bail!(
                "Message body of {} bytes exceeds the limit of {} bytes",
                body.len(),
                MAX_MESSAGE_SIZE
            );
        }

        // Write body length as u32 LE
        self.stream
            .write_all(&(body.len() as u32).to_le_bytes())
            .await?;

        // Write body
        self.stream.write_all(&body).await?;
        self.stream.flush().await?;

        tracing::trace!(
            message_type = %message.message_type,
            message_id = message.message_id,
            "Sent message"
        );
        Ok(())
    }

    /// Receive the body of the next frame without decoding it.
    ///
    /// Returns `Ok(None)` when the host closes the connection between frames.
    /// Any error here leaves the stream out of step, so callers should stop
    /// reading.
    pub async fn receive_frame(&mut self) -> Result<Option<Vec<u8>>> {
        // Read body length
        let mut len_buf = [0u8; 4];
        match self.stream.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e).context("Failed to read message length"),
        }
        let body_len = u32::from_le_bytes(len_buf) as usize;
        if body_len > MAX_MESSAGE_SIZE {
            anyhow::bail!(
                "Incoming message of {} bytes exceeds the limit of {} bytes",
                body_len,
                MAX_MESSAGE_SIZE
            );
        }

        // Read body
        let mut body_buf = vec![0u8; body_len];
        self.stream
            .read_exact(&mut body_buf)
            .await
            .context("Connection closed in the middle of a message")?;

        tracing::trace!(bytes = body_len, "Received frame");
        Ok(Some(body_buf))
    }

    /// Receive and decode the next message.
    ///
    /// Returns `Ok(None)` when the host closes the connection between messages.
    pub async fn receive_message(&mut self) -> Result<Option<Message>> {
        let Some(body) = self.receive_frame().await? else {
            return Ok(None);
        };

        let message = Message::from_json(&body).context("Failed to deserialize message")?;

        tracing::trace!(
            message_type = %message.message_type,
            message_id = message.message_id,
            "Received message"
        );
        Ok(Some(message))
    }
}
