use crate::domain::{Playlist, TtffError};

pub trait PlaylistParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<Playlist, TtffError>;
}
