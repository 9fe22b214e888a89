use tokio::io::{AsyncRead, AsyncWrite};

/// Byte stream a fetch runs over: plain TCP, TLS over TCP, or a test pipe.
pub trait IoStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> IoStream for T {}

pub type BoxedIoStream = Box<dyn IoStream>;

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_boxed_stream_round_trips_bytes() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut boxed: BoxedIoStream = Box::new(client);

        boxed.write_all(b"GET").await.unwrap();
        let mut buf = [0u8; 3];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"GET");
    }
}
