use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Config,
    Dns,
    Tcp,
    Tls,
    Http,
    Timeout,
    Format,
    NoVariants,
    NoSegments,
    DetectorUnavailable,
    NoFrames,
    Detector,
    Other,
}

impl ErrorClass {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorClass::Config => 2,
            ErrorClass::Dns => 3,
            ErrorClass::Tcp => 4,
            ErrorClass::Tls => 5,
            ErrorClass::Http => 6,
            ErrorClass::Timeout => 7,
            ErrorClass::Format => 8,
            ErrorClass::NoVariants => 9,
            ErrorClass::NoSegments => 10,
            ErrorClass::DetectorUnavailable => 11,
            ErrorClass::NoFrames => 12,
            ErrorClass::Detector => 13,
            ErrorClass::Other => 1,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ErrorClass::Config => "CONFIG",
            ErrorClass::Dns => "DNS",
            ErrorClass::Tcp => "TCP",
            ErrorClass::Tls => "TLS",
            ErrorClass::Http => "HTTP",
            ErrorClass::Timeout => "TIMEOUT",
            ErrorClass::Format => "FORMAT",
            ErrorClass::NoVariants => "NO_VARIANTS",
            ErrorClass::NoSegments => "NO_SEGMENTS",
            ErrorClass::DetectorUnavailable => "DETECTOR_UNAVAILABLE",
            ErrorClass::NoFrames => "NO_FRAMES",
            ErrorClass::Detector => "DETECTOR",
            ErrorClass::Other => "ERROR",
        }
    }
}

#[derive(Debug)]
pub struct TtffError {
    pub class: ErrorClass,
    pub message: String,
}

impl TtffError {
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self { class, message: message.into() }
    }

    pub fn config(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Config, msg) }
    pub fn dns(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Dns, msg) }
    pub fn tcp(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Tcp, msg) }
    pub fn tls(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Tls, msg) }
    pub fn http(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Http, msg) }
    pub fn timeout(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Timeout, msg) }
    pub fn format(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Format, msg) }
    pub fn no_variants(msg: impl Into<String>) -> Self { Self::new(ErrorClass::NoVariants, msg) }
    pub fn no_segments(msg: impl Into<String>) -> Self { Self::new(ErrorClass::NoSegments, msg) }
    pub fn detector_unavailable(msg: impl Into<String>) -> Self { Self::new(ErrorClass::DetectorUnavailable, msg) }
    pub fn no_frames(msg: impl Into<String>) -> Self { Self::new(ErrorClass::NoFrames, msg) }
    pub fn detector(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Detector, msg) }
    pub fn other(msg: impl Into<String>) -> Self { Self::new(ErrorClass::Other, msg) }

    /// Prefixes the message with the operation that failed; the class is kept.
    pub fn context(self, ctx: impl fmt::Display) -> Self {
        Self { class: self.class, message: format!("{}: {}", ctx, self.message) }
    }

    pub fn format_stderr(&self) -> String {
        format!("error[{}]: {}", self.class.tag(), self.message)
    }
}

impl fmt::Display for TtffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_stderr())
    }
}

impl std::error::Error for TtffError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_class_and_cause() {
        let err = TtffError::tcp("connection refused: 10.0.0.1:443")
            .context("fetch playlist https://cdn.example/live.m3u8")
            .context("sample 3/5");

        assert_eq!(err.class, ErrorClass::Tcp);
        assert_eq!(
            err.message,
            "sample 3/5: fetch playlist https://cdn.example/live.m3u8: connection refused: 10.0.0.1:443"
        );
        assert!(err.to_string().starts_with("error[TCP]: sample 3/5"));
    }

    #[test]
    fn test_transport_classes_are_distinguishable_from_detector_failures() {
        for network in [ErrorClass::Dns, ErrorClass::Tcp, ErrorClass::Tls, ErrorClass::Http, ErrorClass::Timeout] {
            for detection in [ErrorClass::DetectorUnavailable, ErrorClass::NoFrames, ErrorClass::Detector] {
                assert_ne!(network.exit_code(), detection.exit_code());
                assert_ne!(network.tag(), detection.tag());
            }
        }
    }
}
