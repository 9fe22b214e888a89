use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use bytes::Bytes;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;
use crate::domain::TtffError;
use crate::ports::FrameDetector;

const PROBE_ARGS: &[&str] = &[
    "-show_frames",
    "-select_streams", "v:0",
    "-print_format", "json",
    "-read_intervals", "%+#1",
    "-i", "pipe:0",
];

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    frames: Vec<ProbeFrame>,
}

#[derive(Debug, Deserialize)]
struct ProbeFrame {
    media_type: Option<String>,
    key_frame: Option<u8>,
    pts_time: Option<String>,
}

/// Pipes a segment into `ffprobe` and waits for it to decode one video frame.
#[derive(Debug, Clone)]
pub struct FfprobeDetector {
    program: String,
}

impl FfprobeDetector {
    pub fn new() -> Self {
        Self::with_program("ffprobe")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    fn locate(&self) -> Result<PathBuf, TtffError> {
        find_program(&self.program)
            .ok_or_else(|| TtffError::detector_unavailable(format!("{} not found in PATH", self.program)))
    }
}

impl Default for FfprobeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDetector for FfprobeDetector {
    fn check(&self) -> Result<(), TtffError> {
        self.locate().map(|_| ())
    }

    async fn detect(&self, segment: Bytes, deadline: Duration) -> Result<Duration, TtffError> {
        let program = self.locate()?;
        let start = Instant::now();

        let mut child = Command::new(&program)
            .args(PROBE_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TtffError::detector_unavailable(format!("failed to start {}: {}", program.display(), e)))?;

        let mut stdin = child.stdin.take()
            .ok_or_else(|| TtffError::detector("ffprobe stdin was not captured"))?;
        // ffprobe stops reading after the first frame, so a broken pipe here is normal
        let writer = tokio::spawn(async move {
            let _ = stdin.write_all(&segment).await;
        });

        let output = tokio::time::timeout(deadline, child.wait_with_output()).await
            .map_err(|_| TtffError::timeout(format!("frame detection exceeded {:?}", deadline)))?
            .map_err(|e| TtffError::detector(format!("ffprobe failed: {}", e)))?;
        writer.abort();
        let elapsed = start.elapsed();

        if !output.status.success() {
            return Err(TtffError::detector(format!(
                "ffprobe failed: {} (stderr: {})",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let frames = parse_probe_output(&output.stdout)?;
        debug!(frames, elapsed_ms = elapsed.as_secs_f64() * 1000.0, "frame detected");
        Ok(elapsed)
    }
}

/// Number of frames ffprobe reported; none is an error.
pub fn parse_probe_output(stdout: &[u8]) -> Result<usize, TtffError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| TtffError::detector(format!("failed to parse ffprobe output: {}", e)))?;

    let first = output.frames.first()
        .ok_or_else(|| TtffError::no_frames("no video frames found in segment"))?;
    debug!(
        media_type = first.media_type.as_deref().unwrap_or("?"),
        key_frame = first.key_frame.unwrap_or(0),
        pts_time = first.pts_time.as_deref().unwrap_or("?"),
        "first frame"
    );
    Ok(output.frames.len())
}

fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorClass;

    #[test]
    fn test_parse_reports_frames() {
        let stdout = br#"{"frames":[{"media_type":"video","key_frame":1,"pts_time":"10.010000","pkt_pos":"564"}]}"#;
        assert_eq!(parse_probe_output(stdout).unwrap(), 1);
    }

    #[test]
    fn test_parse_empty_frame_list_is_no_frames() {
        assert_eq!(parse_probe_output(br#"{"frames":[]}"#).unwrap_err().class, ErrorClass::NoFrames);
        assert_eq!(parse_probe_output(b"{}").unwrap_err().class, ErrorClass::NoFrames);
    }

    #[test]
    fn test_parse_garbage_is_detector_error() {
        assert_eq!(parse_probe_output(b"Invalid data found when processing input").unwrap_err().class, ErrorClass::Detector);
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let detector = FfprobeDetector::with_program("ffprobe-definitely-not-installed");
        assert_eq!(detector.check().unwrap_err().class, ErrorClass::DetectorUnavailable);
    }

    #[tokio::test]
    async fn test_detect_without_program_fails_before_spawning() {
        let detector = FfprobeDetector::with_program("/nonexistent/bin/ffprobe");
        let err = detector.detect(Bytes::from_static(b"\x47"), Duration::from_secs(1)).await.unwrap_err();
        assert_eq!(err.class, ErrorClass::DetectorUnavailable);
    }
}
