//! Serde helpers writing durations as fractional milliseconds.

use std::time::Duration;
use serde::Serializer;

pub fn as_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(as_ms(*d))
}

pub mod option {
    use std::time::Duration;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&super::as_ms(*d)),
            None => s.serialize_none(),
        }
    }
}
