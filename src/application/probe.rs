use std::time::{Duration, Instant};
use tracing::{debug, info};
use crate::domain::*;
use crate::domain::millis::as_ms;
use crate::ports::*;
use super::{base_of, comparison_report, multi_report, resolve, single_report, Config};

/// Drives measurement passes: playlist, optional variant hop, first segment,
/// frame detection. `S` is the stream transport and `Q` the multiplexed one.
pub struct TtffProbe<S, Q, P, F, C>
where
    S: Fetcher,
    Q: Fetcher,
    P: PlaylistParser,
    F: FrameDetector,
    C: Clock,
{
    stream: S,
    multiplexed: Q,
    parser: P,
    detector: F,
    clock: C,
    config: Config,
}

impl<S, Q, P, F, C> TtffProbe<S, Q, P, F, C>
where
    S: Fetcher,
    Q: Fetcher,
    P: PlaylistParser,
    F: FrameDetector,
    C: Clock,
{
    pub fn new(stream: S, multiplexed: Q, parser: P, detector: F, clock: C, config: Config) -> Self {
        Self { stream, multiplexed, parser, detector, clock, config }
    }

    pub async fn run(&self) -> Result<Report, TtffError> {
        if self.config.kind == MeasurementKind::Ttff {
            self.detector.check()?;
        }

        let url = &self.config.url;
        let kind = self.config.kind;

        if self.config.compare {
            let (first, second) = self.compare().await?;
            return Ok(Report::Comparison(comparison_report(
                url,
                kind,
                (self.stream.transport(), &first),
                (self.multiplexed.transport(), &second),
            )));
        }

        let (transport, measurements) = match self.config.transport {
            TransportKind::Stream => (self.stream.transport(), self.collect(&self.stream).await?),
            TransportKind::Multiplexed => (self.multiplexed.transport(), self.collect(&self.multiplexed).await?),
        };

        match measurements.as_slice() {
            [only] => Ok(Report::Single(single_report(url, only))),
            _ => Ok(Report::Multi(multi_report(url, kind, transport, &measurements, self.config.exclude_outliers))),
        }
    }

    /// Runs `samples` passes back to back on one transport, waiting between
    /// passes. The first failing pass aborts the run.
    pub async fn collect<T: Fetcher>(&self, fetcher: &T) -> Result<Vec<Measurement>, TtffError> {
        let n = self.config.samples;
        let mut measurements = Vec::with_capacity(n);

        for i in 0..n {
            if i > 0 {
                self.pause().await;
            }
            info!(sample = i + 1, of = n, transport = %fetcher.transport(), "measuring");
            let m = self.measure(fetcher).await.map_err(|e| e.context(format!("sample {}/{}", i + 1, n)))?;
            debug!(sample = i + 1, total_ms = as_ms(m.total()), "sample done");
            measurements.push(m);
        }

        Ok(measurements)
    }

    /// One stream pass then one multiplexed pass per logical sample, so both
    /// transports see the same network conditions.
    pub async fn compare(&self) -> Result<(Vec<Measurement>, Vec<Measurement>), TtffError> {
        let n = self.config.samples;
        let mut first = Vec::with_capacity(n);
        let mut second = Vec::with_capacity(n);

        for i in 0..n {
            if i > 0 {
                self.pause().await;
            }
            info!(sample = i + 1, of = n, "comparing transports");
            let a = self.measure(&self.stream).await
                .map_err(|e| e.context(format!("sample {}/{} ({})", i + 1, n, self.stream.transport())))?;
            let b = self.measure(&self.multiplexed).await
                .map_err(|e| e.context(format!("sample {}/{} ({})", i + 1, n, self.multiplexed.transport())))?;
            first.push(a);
            second.push(b);
        }

        Ok((first, second))
    }

    pub async fn measure<T: Fetcher>(&self, fetcher: &T) -> Result<Measurement, TtffError> {
        match self.config.kind {
            MeasurementKind::Ttff => self.measure_ttff(fetcher).await.map(Measurement::Ttff),
            MeasurementKind::Asset => self.measure_asset(fetcher).await.map(Measurement::Asset),
        }
    }

    pub async fn measure_ttff<T: Fetcher>(&self, fetcher: &T) -> Result<Sample, TtffError> {
        let deadline = self.clock.now() + self.config.timeout;
        let url = &self.config.url;

        let mut manifest = fetcher.fetch(url, self.remaining(deadline)?).await
            .map_err(|e| e.context(format!("fetch playlist {}", url)))?;
        let mut playlist = self.parser.parse(&manifest.body)
            .map_err(|e| e.context(format!("parse playlist {}", url)))?;

        if playlist.is_variant_index() {
            let variant_url = resolve(&base_of(&manifest.url)?, playlist.first_variant()?)?;
            debug!(variant = %variant_url, "following first variant");
            manifest = fetcher.fetch(&variant_url, self.remaining(deadline)?).await
                .map_err(|e| e.context(format!("fetch variant playlist {}", variant_url)))?;
            playlist = self.parser.parse(&manifest.body)
                .map_err(|e| e.context(format!("parse variant playlist {}", variant_url)))?;
        }

        let segment_url = resolve(&base_of(&manifest.url)?, playlist.first_segment()?)?;
        debug!(segment = %segment_url, "fetching first segment");
        let segment = fetcher.fetch(&segment_url, self.remaining(deadline)?).await
            .map_err(|e| e.context(format!("fetch segment {}", segment_url)))?;

        let detection = self.detector.detect(segment.body, self.remaining(deadline)?).await
            .map_err(|e| e.context(format!("detect first frame in {}", segment_url)))?;

        let sample = Sample::new(manifest.trace, &segment.trace, detection);
        info!(
            manifest_ms = as_ms(sample.manifest.total()),
            segment_ms = as_ms(sample.segment_total),
            detection_ms = as_ms(sample.frame_detection),
            ttff_ms = as_ms(sample.total),
            "first frame confirmed"
        );
        Ok(sample)
    }

    pub async fn measure_asset<T: Fetcher>(&self, fetcher: &T) -> Result<AssetSample, TtffError> {
        let url = &self.config.url;
        let fetched = fetcher.fetch(url, self.config.timeout).await
            .map_err(|e| e.context(format!("fetch {}", url)))?;
        info!(ttfb_ms = as_ms(fetched.trace.ttfb()), total_ms = as_ms(fetched.trace.total()), protocol = fetched.protocol, "asset fetched");
        Ok(AssetSample { trace: fetched.trace })
    }

    async fn pause(&self) {
        let delay = self.config.delay.next_delay(&mut rand::thread_rng());
        debug!(delay_ms = as_ms(delay), "waiting before next sample");
        self.clock.sleep(delay).await;
    }

    fn remaining(&self, deadline: Instant) -> Result<Duration, TtffError> {
        deadline.checked_duration_since(self.clock.now())
            .filter(|d| !d.is_zero())
            .ok_or_else(|| TtffError::timeout(format!("measurement exceeded {:?}", self.config.timeout)))
    }
}
