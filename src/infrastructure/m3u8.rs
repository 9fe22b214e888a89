use m3u8_rs::Playlist as M3u8;
use crate::domain::{Playlist, TtffError};
use crate::ports::PlaylistParser;

#[derive(Debug, Clone, Copy, Default)]
pub struct M3u8PlaylistParser;

impl PlaylistParser for M3u8PlaylistParser {
    fn parse(&self, bytes: &[u8]) -> Result<Playlist, TtffError> {
        match m3u8_rs::parse_playlist_res(bytes) {
            // I-frame-only renditions carry no playable segments
            Ok(M3u8::MasterPlaylist(master)) => Ok(Playlist::Variants(
                master.variants.into_iter().filter(|v| !v.is_i_frame).map(|v| v.uri).collect(),
            )),
            Ok(M3u8::MediaPlaylist(media)) => Ok(Playlist::Media(
                media.segments.into_iter().map(|s| Some(s.uri).filter(|uri| !uri.is_empty())).collect(),
            )),
            Err(_) => Err(TtffError::format(format!("not a valid m3u8 playlist ({} bytes)", bytes.len()))),
        }
    }
}
