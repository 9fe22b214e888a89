use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpStream;
use crate::domain::TtffError;
use crate::ports::{TcpDialer, BoxedIoStream};

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTcpDialer;

impl TokioTcpDialer {
    pub fn new() -> Self { Self }
}

impl TcpDialer for TokioTcpDialer {
    async fn connect(&self, ip: IpAddr, port: u16) -> Result<BoxedIoStream, TtffError> {
        let addr = SocketAddr::new(ip, port);
        let stream = TcpStream::connect(addr).await.map_err(|e| {
            let msg = match e.kind() {
                std::io::ErrorKind::ConnectionRefused => format!("connection refused: {}", addr),
                std::io::ErrorKind::TimedOut => format!("connection timed out: {}", addr),
                _ => format!("TCP connect failed to {}: {}", addr, e),
            };
            TtffError::tcp(msg)
        })?;
        stream.set_nodelay(true).map_err(|e| TtffError::tcp(format!("failed to set TCP_NODELAY on {}: {}", addr, e)))?;
        Ok(Box::new(stream))
    }
}
