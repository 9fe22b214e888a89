use super::TtffError;

/// What a parsed manifest tells the probe: either renditions to pick from,
/// or the segments to fetch. Media entries may be missing (`None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playlist {
    Variants(Vec<String>),
    Media(Vec<Option<String>>),
}

impl Playlist {
    pub fn is_variant_index(&self) -> bool {
        matches!(self, Playlist::Variants(_))
    }

    pub fn first_variant(&self) -> Result<&str, TtffError> {
        match self {
            Playlist::Variants(variants) => variants.iter()
                .map(String::as_str)
                .find(|uri| !uri.is_empty())
                .ok_or_else(|| TtffError::no_variants("master playlist has no variants")),
            Playlist::Media(_) => Err(TtffError::no_variants("playlist is a media playlist, not a master playlist")),
        }
    }

    /// Skips empty entries in order; a master playlist has no segments.
    pub fn first_segment(&self) -> Result<&str, TtffError> {
        match self {
            Playlist::Media(segments) => segments.iter()
                .filter_map(|s| s.as_deref())
                .find(|uri| !uri.is_empty())
                .ok_or_else(|| TtffError::no_segments("media playlist has no segments")),
            Playlist::Variants(_) => Err(TtffError::no_segments("variant playlist is itself a master playlist")),
        }
    }
}
