//! Transport between the client and the game server.
//!
//! The game only sees a [`Transport`] for outbound frames and a stream of
//! [`Inbound`] events. Over TCP every frame is one line of text; a reader task
//! and a writer task bridge the socket to unbounded channels so that the frame
//! loop never blocks on I/O.

use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection is closed")]
    Closed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Events delivered from the server side of the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message(String),
    Error(String),
    Closed,
}

/// Frames queued for the server side of the channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Text(String),
    Close { code: u16, reason: String },
}

pub trait Transport {
    fn send(&mut self, message: String) -> Result<(), TransportError>;
    /// Closes the channel. Later sends fail with [`TransportError::Closed`].
    fn close(&mut self, code: u16, reason: &str);
}

/// Transport handle writing into an unbounded queue.
#[derive(Debug)]
pub struct ChannelTransport {
    outbound: mpsc::UnboundedSender<Outbound>,
    closed: bool,
}

impl ChannelTransport {
    pub fn new(outbound: mpsc::UnboundedSender<Outbound>) -> Self {
        Self {
            outbound,
            closed: false,
        }
    }

    /// A transport together with the receiving end of its queue.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, message: String) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.outbound
            .send(Outbound::Text(message))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self, code: u16, reason: &str) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self
            .outbound
            .send(Outbound::Close {
                code,
                reason: reason.to_string(),
            })
            .is_err()
        {
            debug!("Writer already gone while closing ({})", code);
        }
    }
}

/// Connects to `addr` and spawns the reader and writer tasks.
pub async fn connect(
    addr: &str,
) -> Result<(ChannelTransport, mpsc::UnboundedReceiver<Inbound>), TransportError> {
    let stream = TcpStream::connect(addr).await?;
    stream.set_nodelay(true)?;
    info!("Connected to {}", addr);
    Ok(spawn_stream_tasks(stream))
}

/// Longest accepted inbound frame, newline excluded.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

#[derive(Debug, PartialEq)]
enum Frame {
    Line(String),
    /// Blank, over-long or not UTF-8. Dropped without ending the stream.
    Skipped,
    Eof,
}

async fn read_frame<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let limit = MAX_FRAME_LEN as u64 + 1;

    buf.clear();
    if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
        return Ok(Frame::Eof);
    }

    if buf.last() != Some(&b'\n') && buf.len() > MAX_FRAME_LEN {
        debug!("Dropping inbound frame longer than {} bytes", MAX_FRAME_LEN);
        loop {
            buf.clear();
            if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
                return Ok(Frame::Eof);
            }
            if buf.last() == Some(&b'\n') {
                return Ok(Frame::Skipped);
            }
        }
    }

    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }

    match std::str::from_utf8(buf) {
        Ok(line) if line.trim().is_empty() => Ok(Frame::Skipped),
        Ok(line) => Ok(Frame::Line(line.to_string())),
        Err(e) => {
            debug!("Dropping inbound frame that is not UTF-8: {}", e);
            Ok(Frame::Skipped)
        }
    }
}

/// Wraps an already connected stream.
pub fn spawn_stream_tasks(
    stream: TcpStream,
) -> (ChannelTransport, mpsc::UnboundedReceiver<Inbound>) {
    let (read_half, mut write_half) = stream.into_split();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (transport, mut outbound_rx) = ChannelTransport::pair();

    tokio::spawn(async move {
        let mut reader = BufReader::new(read_half);
        let mut buf = Vec::new();
        loop {
            let event = match read_frame(&mut reader, &mut buf).await {
                Ok(Frame::Line(line)) => Inbound::Message(line),
                Ok(Frame::Skipped) => continue,
                Ok(Frame::Eof) => Inbound::Closed,
                Err(e) => {
                    error!("Error receiving frame: {}", e);
                    Inbound::Error(e.to_string())
                }
            };

            let last = !matches!(event, Inbound::Message(_));
            if inbound_tx.send(event).is_err() || last {
                break;
            }
        }
    });

    tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            match frame {
                Outbound::Text(mut text) => {
                    text.push('\n');
                    if let Err(e) = write_half.write_all(text.as_bytes()).await {
                        error!("Error sending frame: {}", e);
                        break;
                    }
                }
                Outbound::Close { code, reason } => {
                    info!("Closing connection ({}): {}", code, reason);
                    if let Err(e) = write_half.shutdown().await {
                        warn!("Error shutting down connection: {}", e);
                    }
                    break;
                }
            }
        }
    });

    (transport, inbound_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_channel_transport_send_and_close() {
        let (mut transport, mut rx) = ChannelTransport::pair();

        assert_ok!(transport.send("Ping:{}".to_string()));
        transport.close(1000, "done");
        transport.close(1000, "again");
        assert_err!(transport.send("late".to_string()));

        assert_eq!(rx.try_recv().ok(), Some(Outbound::Text("Ping:{}".to_string())));
        assert_eq!(
            rx.try_recv().ok(),
            Some(Outbound::Close {
                code: 1000,
                reason: "done".to_string()
            })
        );
        assert!(rx.try_recv().is_err());
        assert!(transport.is_closed());
    }

    #[test]
    fn test_send_fails_when_writer_is_gone() {
        let (mut transport, rx) = ChannelTransport::pair();
        drop(rx);
        assert!(matches!(
            transport.send("x".to_string()),
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_bad_frames_are_skipped() {
        let mut input = b"Garbage:\xff\xfe\n\r\nPointsUpdate:{}\r\nLast:1".to_vec();
        let mut reader: &[u8] = &input;
        let mut buf = Vec::new();

        assert_eq!(read_frame(&mut reader, &mut buf).await.unwrap(), Frame::Skipped);
        assert_eq!(read_frame(&mut reader, &mut buf).await.unwrap(), Frame::Skipped);
        assert_eq!(
            read_frame(&mut reader, &mut buf).await.unwrap(),
            Frame::Line("PointsUpdate:{}".to_string())
        );
        assert_eq!(
            read_frame(&mut reader, &mut buf).await.unwrap(),
            Frame::Line("Last:1".to_string())
        );
        assert_eq!(read_frame(&mut reader, &mut buf).await.unwrap(), Frame::Eof);

        // Over-long frames are dropped up to their newline.
        input = vec![b'x'; MAX_FRAME_LEN * 2 + 7];
        input.extend_from_slice(b"\nAfter:1\n");
        let mut reader: &[u8] = &input;
        assert_eq!(read_frame(&mut reader, &mut buf).await.unwrap(), Frame::Skipped);
        assert_eq!(
            read_frame(&mut reader, &mut buf).await.unwrap(),
            Frame::Line("After:1".to_string())
        );
        assert!(buf.capacity() <= MAX_FRAME_LEN * 4);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_keeps_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket
                .write_all(b"Garbage:\xff\xfe\nPointsUpdate:{\"username\":\"a\",\"numPoints\":1}\n")
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        });

        let (_transport, mut inbound) = connect(&addr).await.unwrap();
        assert_eq!(
            inbound.recv().await,
            Some(Inbound::Message(
                "PointsUpdate:{\"username\":\"a\",\"numPoints\":1}".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_tcp_frames_are_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"First:1\n\nSecond:2\n").await.unwrap();

            let mut received = String::new();
            socket.read_to_string(&mut received).await.unwrap();
            received
        });

        let (mut transport, mut inbound) = connect(&addr).await.unwrap();
        assert_eq!(inbound.recv().await, Some(Inbound::Message("First:1".to_string())));
        assert_eq!(inbound.recv().await, Some(Inbound::Message("Second:2".to_string())));

        assert_ok!(transport.send("Hello:{}".to_string()));
        transport.close(1000, "bye");

        let received = server.await.unwrap();
        assert_eq!(received, "Hello:{}\n");
        assert_eq!(inbound.recv().await, Some(Inbound::Closed));
    }
}
