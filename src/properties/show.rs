//! Show/visibility intervals shared by several graphics

use crate::czml::PropertyWriter;
use crate::time::TimeInterval;

/// Boolean visibility over time
///
/// A single `(interval, true)` entry is the common "always shown while available" case.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShowIntervals {
    entries: Vec<(TimeInterval, bool)>,
}

impl ShowIntervals {
    pub fn new(entries: Vec<(TimeInterval, bool)>) -> Self {
        Self { entries }
    }

    /// Shown over the whole interval
    pub fn always(interval: TimeInterval) -> Self {
        Self::new(vec![(interval, true)])
    }

    pub fn push(&mut self, interval: TimeInterval, show: bool) {
        self.entries.push((interval, show));
    }

    pub fn entries(&self) -> &[(TimeInterval, bool)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total time shown, in seconds
    pub fn shown_seconds(&self) -> f64 {
        self.entries
            .iter()
            .filter(|(_, show)| *show)
            .map(|(interval, _)| interval.duration_seconds())
            .sum()
    }

    /// Write as the `show` sub-property; nothing is written when empty
    pub fn write_into(&self, prop: &mut PropertyWriter<'_>) {
        if self.entries.is_empty() {
            return;
        }
        let mut show = prop.open_property("show");
        show.write_boolean_intervals(&self.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::offset_seconds;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_shown_seconds() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut show = ShowIntervals::always(TimeInterval::new(t0, offset_seconds(&t0, 30.0)).unwrap());
        show.push(
            TimeInterval::new(offset_seconds(&t0, 30.0), offset_seconds(&t0, 90.0)).unwrap(),
            false,
        );
        assert_eq!(show.entries().len(), 2);
        assert_eq!(show.shown_seconds(), 30.0);
    }
}
