//! Experiment markers in the trigger channel.
//!
//! Every change of the trigger level is a transition. The level the trigger
//! settles on after the change decides what the transition marks. A
//! transition at index `i` happens at `time[i]`, which is `i / sample_rate`
//! for a recording clocked from zero at its nominal rate.

use contracts::EventConfig;
use tracing::debug;

/// What a classified transition marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    Corner,
    ExperimentStart,
}

/// One classified trigger transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeEvent {
    /// Index `i` of the transition between `trigger[i]` and `trigger[i + 1]`
    pub index: usize,
    /// `time[index]`, seconds on the device clock
    pub instant: f64,
    /// Post-transition level
    pub level: f64,
    pub class: EventClass,
}

/// Classified markers of one recording
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeEvents {
    pub corners: Vec<EdgeEvent>,
    pub experiment_starts: Vec<EdgeEvent>,
}

impl EdgeEvents {
    pub fn corner_instants(&self) -> Vec<f64> {
        self.corners.iter().map(|e| e.instant).collect()
    }

    pub fn experiment_instants(&self) -> Vec<f64> {
        self.experiment_starts.iter().map(|e| e.instant).collect()
    }
}

/// Extracts corner and experiment-start markers from a trigger signal
#[derive(Debug, Clone)]
pub struct EdgeEventExtractor {
    config: EventConfig,
}

impl EdgeEventExtractor {
    pub fn new(config: &EventConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// `time` and `trigger` are sampled together; transitions past the end of
    /// `time` are dropped
    pub fn extract(&self, time: &[f64], trigger: &[f64]) -> EdgeEvents {
        let mut events = EdgeEvents::default();

        for (index, pair) in trigger.windows(2).enumerate() {
            if pair[1] == pair[0] {
                continue;
            }
            let Some(&instant) = time.get(index) else {
                break;
            };
            let level = pair[1];
            let Some(class) = self.classify(level) else {
                continue;
            };
            let event = EdgeEvent {
                index,
                instant,
                level,
                class,
            };
            match class {
                EventClass::Corner => events.corners.push(event),
                EventClass::ExperimentStart => events.experiment_starts.push(event),
            }
        }

        debug!(
            corners = events.corners.len(),
            experiment_starts = events.experiment_starts.len(),
            "trigger transitions classified"
        );
        events
    }

    fn classify(&self, level: f64) -> Option<EventClass> {
        if contains_level(&self.config.corner_levels, level) {
            Some(EventClass::Corner)
        } else if contains_level(&self.config.experiment_levels, level) {
            Some(EventClass::ExperimentStart)
        } else {
            None
        }
    }

    /// Extent of each experiment-start region
    ///
    /// Every region lasts `experiment_extent` except the last, which lasts
    /// `final_experiment_extent`, so a lone region gets the final extent.
    pub fn experiment_extents(&self, count: usize) -> Vec<f64> {
        if count == 0 {
            return Vec::new();
        }
        let mut extents = vec![self.config.experiment_extent; count];
        extents[count - 1] = self.config.final_experiment_extent;
        extents
    }
}

fn contains_level(levels: &[f64], level: f64) -> bool {
    levels.iter().any(|l| (l - level).abs() < 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> EdgeEventExtractor {
        EdgeEventExtractor::new(&EventConfig::default())
    }

    fn clock(len: usize, sample_rate: f64) -> Vec<f64> {
        (0..len).map(|i| i as f64 / sample_rate).collect()
    }

    #[test]
    fn test_extract_corner_and_experiment_start() {
        let trigger = [0.0, 0.0, 8.0, 8.0, 0.0, 0.0, 4.0, 4.0, 0.0];
        let events = extractor().extract(&clock(trigger.len(), 512.0), &trigger);

        assert_eq!(events.corners.len(), 1);
        assert_eq!(events.corners[0].index, 1);
        assert_eq!(events.corners[0].level, 8.0);
        assert!((events.corners[0].instant - 1.0 / 512.0).abs() < 1e-12);

        assert_eq!(events.experiment_starts.len(), 1);
        assert_eq!(events.experiment_starts[0].index, 5);
        assert_eq!(events.experiment_starts[0].class, EventClass::ExperimentStart);

        let extents = extractor().experiment_extents(events.experiment_starts.len());
        assert_eq!(extents, vec![100.0]);
    }

    #[test]
    fn test_falling_edges_to_zero_ignored() {
        let events = extractor().extract(&clock(4, 1.0), &[10.0, 0.0, 6.0, 0.0]);
        assert!(events.corners.is_empty());
        assert_eq!(events.experiment_instants(), vec![1.0]);
    }

    #[test]
    fn test_level_ten_is_corner() {
        let events = extractor().extract(&clock(3, 2.0), &[0.0, 10.0, 8.0]);
        assert_eq!(events.corner_instants(), vec![0.0, 0.5]);
    }

    #[test]
    fn test_instants_follow_the_time_axis() {
        let time = [40.0, 40.5, 41.0, 41.5];
        let events = extractor().extract(&time, &[0.0, 0.0, 8.0, 8.0]);
        assert_eq!(events.corner_instants(), vec![40.5]);
        assert_eq!(events.corners[0].index, 1);
    }

    #[test]
    fn test_short_time_axis_drops_trailing_transitions() {
        let events = extractor().extract(&[0.0], &[0.0, 4.0, 8.0]);
        assert_eq!(events.experiment_instants(), vec![0.0]);
        assert!(events.corners.is_empty());
    }

    #[test]
    fn test_no_experiment_start() {
        let events = extractor().extract(&clock(3, 1.0), &[0.0, 8.0, 0.0]);
        assert!(events.experiment_starts.is_empty());
        assert!(extractor().experiment_extents(0).is_empty());
    }

    #[test]
    fn test_extents_policy() {
        assert_eq!(extractor().experiment_extents(3), vec![1.0, 1.0, 100.0]);
        assert_eq!(extractor().experiment_extents(2), vec![1.0, 100.0]);
    }
}
