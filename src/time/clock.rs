//! Scene clock and sample instants

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::interval::{offset_seconds, seconds_between, TimeInterval};
use crate::error::{CzmlError, Result};

/// Time scale in which clock bounds are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeScale {
    #[default]
    Utc,
    Tai,
    Gps,
}

impl TimeScale {
    /// Seconds this scale runs ahead of UTC (leap table as of 2017)
    pub fn offset_from_utc(&self) -> f64 {
        match self {
            Self::Utc => 0.0,
            Self::Tai => 37.0,
            Self::Gps => 18.0,
        }
    }

    /// Convert an instant read in this scale to UTC
    pub fn to_utc(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        offset_seconds(&instant, -self.offset_from_utc())
    }
}

/// Behavior of the playback clock at the interval bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockRange {
    Unbounded,
    Clamped,
    #[default]
    LoopStop,
}

impl ClockRange {
    pub fn as_czml(&self) -> &'static str {
        match self {
            Self::Unbounded => "UNBOUNDED",
            Self::Clamped => "CLAMPED",
            Self::LoopStop => "LOOP_STOP",
        }
    }
}

/// How the playback clock advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockStep {
    TickDependent,
    #[default]
    SystemClockMultiplier,
    SystemClock,
}

impl ClockStep {
    pub fn as_czml(&self) -> &'static str {
        match self {
            Self::TickDependent => "TICK_DEPENDENT",
            Self::SystemClockMultiplier => "SYSTEM_CLOCK_MULTIPLIER",
            Self::SystemClock => "SYSTEM_CLOCK",
        }
    }
}

/// Simulation-wide time base
///
/// Immutable once built. Every time-sampled property derives its instants from
/// [`Clock::all_samples`], which always yields the same values for the same clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    interval: TimeInterval,
    tick: f64,
    current: DateTime<Utc>,
    multiplier: f64,
    range: ClockRange,
    step: ClockStep,
}

impl Clock {
    /// Create a clock from bounds expressed in `scale` and a tick in seconds
    pub fn new(
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        scale: TimeScale,
        tick: f64,
    ) -> Result<Self> {
        let start = scale.to_utc(start);
        let stop = scale.to_utc(stop);
        validate(&start, &stop, tick)?;

        Ok(Self {
            interval: TimeInterval { start, stop },
            tick,
            current: start,
            multiplier: tick,
            range: ClockRange::default(),
            step: ClockStep::default(),
        })
    }

    /// Create a clock from an existing interval with explicit playback policies
    ///
    /// The multiplier doubles as the sampling tick.
    pub fn with_policies(
        interval: TimeInterval,
        current: DateTime<Utc>,
        multiplier: f64,
        range: ClockRange,
        step: ClockStep,
    ) -> Result<Self> {
        validate(&interval.start, &interval.stop, multiplier)?;
        if !interval.contains(&current) {
            return Err(CzmlError::InvalidClock(
                "current instant outside clock interval".into(),
            ));
        }

        Ok(Self {
            interval,
            tick: multiplier,
            current,
            multiplier,
            range,
            step,
        })
    }

    /// Derive a clock from an ordered sample sequence such as an ephemeris segment
    ///
    /// The tick is `(stop - start) / sample_count` rounded to the nearest second.
    pub fn from_samples(instants: &[DateTime<Utc>]) -> Result<Self> {
        let interval = TimeInterval::spanning(instants)
            .map_err(|_| CzmlError::InvalidClock("empty sample sequence".into()))?;
        let tick = (interval.duration_seconds() / instants.len() as f64).round();
        Self::new(interval.start, interval.stop, TimeScale::Utc, tick)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.interval.start
    }

    pub fn stop(&self) -> DateTime<Utc> {
        self.interval.stop
    }

    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    /// Tick size in seconds
    pub fn tick(&self) -> f64 {
        self.tick
    }

    pub fn current(&self) -> DateTime<Utc> {
        self.current
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn range(&self) -> ClockRange {
        self.range
    }

    pub fn step(&self) -> ClockStep {
        self.step
    }

    /// Same clock with a different current instant
    pub fn with_current(mut self, current: DateTime<Utc>) -> Result<Self> {
        if !self.interval.contains(&current) {
            return Err(CzmlError::InvalidClock(
                "current instant outside clock interval".into(),
            ));
        }
        self.current = current;
        Ok(self)
    }

    /// Same clock with a different playback range policy
    pub fn with_range(mut self, range: ClockRange) -> Self {
        self.range = range;
        self
    }

    /// Same clock with a different playback multiplier and step policy
    ///
    /// Sampling keeps the original tick.
    pub fn with_playback(mut self, multiplier: f64, step: ClockStep) -> Result<Self> {
        if !(multiplier > 0.0) || !multiplier.is_finite() {
            return Err(CzmlError::InvalidClock(format!(
                "multiplier must be > 0, got {}",
                multiplier
            )));
        }
        self.multiplier = multiplier;
        self.step = step;
        Ok(self)
    }

    /// Number of instants yielded by [`Clock::all_samples`]
    pub fn sample_count(&self) -> usize {
        (self.interval.duration_seconds() / self.tick).floor() as usize
    }

    /// All sample instants `start + i * tick` for `i` in `[0, sample_count)`
    pub fn all_samples(&self) -> ClockSamples {
        ClockSamples {
            start: self.interval.start,
            tick: self.tick,
            index: 0,
            count: self.sample_count(),
        }
    }
}

fn validate(start: &DateTime<Utc>, stop: &DateTime<Utc>, tick: f64) -> Result<()> {
    if !(tick > 0.0) || !tick.is_finite() {
        return Err(CzmlError::InvalidClock(format!(
            "tick must be > 0 s, got {}",
            tick
        )));
    }
    if seconds_between(start, stop) <= 0.0 {
        return Err(CzmlError::InvalidClock("stop must be after start".into()));
    }
    Ok(())
}

/// Lazy, restartable sequence of clock instants
#[derive(Debug, Clone)]
pub struct ClockSamples {
    start: DateTime<Utc>,
    tick: f64,
    index: usize,
    count: usize,
}

impl Iterator for ClockSamples {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }
        let instant = offset_seconds(&self.start, self.index as f64 * self.tick);
        self.index += 1;
        Some(instant)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ClockSamples {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_sample_count_and_order() {
        for (span, tick) in [(3600.0, 60.0), (100.0, 7.0), (10.5, 0.25), (59.0, 60.0 - 1.0)] {
            let clock = Clock::new(t0(), offset_seconds(&t0(), span), TimeScale::Utc, tick).unwrap();
            let samples: Vec<_> = clock.all_samples().collect();
            assert_eq!(samples.len(), (span / tick).floor() as usize);
            assert_eq!(samples[0], t0());
            assert!(samples.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_samples_restartable_and_identical() {
        let clock = Clock::new(t0(), offset_seconds(&t0(), 3600.0), TimeScale::Utc, 60.0).unwrap();
        let samples = clock.all_samples();
        let first: Vec<_> = samples.clone().collect();
        let second: Vec<_> = samples.collect();
        let third: Vec<_> = clock.clone().all_samples().collect();
        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(first.len(), 60);
        assert_eq!(*first.last().unwrap(), offset_seconds(&t0(), 3540.0));
    }

    #[test]
    fn test_invalid_tick() {
        let stop = offset_seconds(&t0(), 10.0);
        for tick in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                Clock::new(t0(), stop, TimeScale::Utc, tick),
                Err(CzmlError::InvalidClock(_))
            ));
        }
    }

    #[test]
    fn test_stop_before_start() {
        let stop = offset_seconds(&t0(), -10.0);
        assert!(Clock::new(t0(), stop, TimeScale::Utc, 1.0).is_err());
    }

    #[test]
    fn test_from_samples_rounds_tick() {
        let instants: Vec<_> = (0..7).map(|i| offset_seconds(&t0(), i as f64 * 10.0)).collect();
        // span 60 s over 7 samples -> 8.57 s -> 9 s
        let clock = Clock::from_samples(&instants).unwrap();
        assert_eq!(clock.tick(), 9.0);
        assert_eq!(clock.start(), t0());
        assert_eq!(clock.stop(), offset_seconds(&t0(), 60.0));
    }

    #[test]
    fn test_timescale_shift() {
        let clock = Clock::new(t0(), offset_seconds(&t0(), 60.0), TimeScale::Tai, 1.0).unwrap();
        assert_eq!(clock.start(), offset_seconds(&t0(), -37.0));
    }

    #[test]
    fn test_with_policies() {
        let interval = TimeInterval::new(t0(), offset_seconds(&t0(), 600.0)).unwrap();
        let current = offset_seconds(&t0(), 120.0);
        let clock =
            Clock::with_policies(interval, current, 10.0, ClockRange::Clamped, ClockStep::TickDependent)
                .unwrap();
        assert_eq!(clock.current(), current);
        assert_eq!(clock.sample_count(), 60);
        assert_eq!(clock.range().as_czml(), "CLAMPED");

        let outside = offset_seconds(&t0(), 601.0);
        assert!(Clock::with_policies(interval, outside, 10.0, ClockRange::Clamped, ClockStep::SystemClock)
            .is_err());
    }

    #[test]
    fn test_playback_keeps_tick() {
        let clock = Clock::new(t0(), offset_seconds(&t0(), 600.0), TimeScale::Utc, 10.0)
            .unwrap()
            .with_playback(120.0, ClockStep::TickDependent)
            .unwrap();
        assert_eq!(clock.tick(), 10.0);
        assert_eq!(clock.sample_count(), 60);
        assert_eq!(clock.multiplier(), 120.0);
        assert_eq!(clock.step(), ClockStep::TickDependent);

        let base = Clock::new(t0(), offset_seconds(&t0(), 600.0), TimeScale::Utc, 10.0).unwrap();
        assert!(matches!(
            base.with_playback(0.0, ClockStep::SystemClock),
            Err(CzmlError::InvalidClock(_))
        ));
    }
}
