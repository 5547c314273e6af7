//! Newline-delimited TCP transport using `tokio-util`'s [`LinesCodec`].

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Longest line accepted when no explicit limit is given.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A TCP [`Transport`] that listens for line-based connections.
pub struct TcpLineTransport {
    listener: TcpListener,
    max_line_length: usize,
}

impl TcpLineTransport {
    /// Binds a new transport to the given address.
    pub async fn bind(
        addr: impl ToSocketAddrs,
        max_line_length: usize,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        if let Ok(local) = listener.local_addr() {
            tracing::info!(%local, max_line_length, "TCP line transport listening");
        }
        Ok(Self {
            listener,
            max_line_length,
        })
    }

    /// The address the listener is bound to.
    ///
    /// Useful after binding to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener
            .local_addr()
            .map_err(TransportError::AcceptFailed)
    }
}

impl Transport for TcpLineTransport {
    type Connection = TcpLineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = TcpLineConnection::from_stream(stream, self.max_line_length);
        tracing::debug!(id = %conn.id, %addr, "accepted TCP connection");
        Ok(conn)
    }
}

/// A single line-based TCP connection.
///
/// The socket is split so a reader task can wait on [`recv_line`] while
/// another task sends.
///
/// [`recv_line`]: Connection::recv_line
pub struct TcpLineConnection {
    id: ConnectionId,
    max_line_length: usize,
    reader: Mutex<FramedRead<OwnedReadHalf, LinesCodec>>,
    writer: Mutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,
    /// Set after an oversized line. `FramedRead` ends the stream once after
    /// a decode error and then resumes, so that one `None` is not EOF.
    resuming: AtomicBool,
}

impl TcpLineConnection {
    /// Connects to a remote line server. Used by clients.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        max_line_length: usize,
    ) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::ConnectFailed)?;
        let conn = Self::from_stream(stream, max_line_length);
        tracing::debug!(id = %conn.id, "connected");
        Ok(conn)
    }

    fn from_stream(stream: TcpStream, max_line_length: usize) -> Self {
        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        let (read_half, write_half) = stream.into_split();
        Self {
            id,
            max_line_length,
            reader: Mutex::new(FramedRead::new(
                read_half,
                LinesCodec::new_with_max_length(max_line_length),
            )),
            writer: Mutex::new(FramedWrite::new(
                write_half,
                LinesCodec::new_with_max_length(max_line_length),
            )),
            resuming: AtomicBool::new(false),
        }
    }

    fn receive_error(&self, err: LinesCodecError) -> TransportError {
        match err {
            LinesCodecError::MaxLineLengthExceeded => {
                TransportError::LineTooLong(self.max_line_length)
            }
            LinesCodecError::Io(e) => TransportError::ReceiveFailed(e),
        }
    }
}

fn send_error(err: LinesCodecError) -> TransportError {
    match err {
        LinesCodecError::Io(e) => TransportError::SendFailed(e),
        LinesCodecError::MaxLineLengthExceeded => TransportError::SendFailed(
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "line too long"),
        ),
    }
}

impl Connection for TcpLineConnection {
    type Error = TransportError;

    async fn send_line(&self, line: &str) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .send(line)
            .await
            .map_err(send_error)
    }

    async fn recv_line(&self) -> Result<Option<String>, Self::Error> {
        let mut reader = self.reader.lock().await;
        let mut next = reader.next().await;
        if next.is_none() && self.resuming.swap(false, Ordering::Relaxed) {
            next = reader.next().await;
        }
        match next {
            Some(Ok(line)) => {
                self.resuming.store(false, Ordering::Relaxed);
                Ok(Some(line.trim().to_string()))
            }
            Some(Err(e)) => {
                let resumable = matches!(e, LinesCodecError::MaxLineLengthExceeded);
                self.resuming.store(resumable, Ordering::Relaxed);
                Err(self.receive_error(e))
            }
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        SinkExt::<&str>::close(&mut *self.writer.lock().await)
            .await
            .map_err(send_error)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
