//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Covers:
//! - Loader output flowing through the assembler into a store
//! - Offset resolution, overrides and sync failures
//! - Container layout: groups, regions, cross references, metadata links
//! - JSON container files written and read back

#[cfg(test)]
mod fixtures {
    use contracts::{ConversionInput, EventRecord, Eye, MetadataNode, PrimaryStream, SyncDirection};

    pub const SESSION: &str = "20170412";

    /// 30 samples at 2 Hz, two channels
    ///
    /// Sync pulses (height 2) rise at transitions 2, 6, 10, 14, so the
    /// reference pulse lies at t = 7.0. A corner marker (level 8) follows at
    /// transition 17, an experiment start (level 4) at transition 21.
    pub fn primary() -> PrimaryStream {
        let mut trigger = vec![0.0; 30];
        for start in [3, 7, 11, 15] {
            trigger[start] = 2.0;
        }
        trigger[18] = 8.0;
        trigger[19] = 8.0;
        trigger[22] = 4.0;
        trigger[23] = 4.0;

        PrimaryStream {
            time: (0..30).map(|i| i as f64 * 0.5).collect(),
            trigger,
            channels: vec![
                (0..30).map(|i| i as f64).collect(),
                (0..30).map(|i| -(i as f64)).collect(),
            ],
            sample_rate: 2.0,
        }
    }

    pub fn sync(ts: f64, dir: SyncDirection) -> EventRecord {
        EventRecord {
            ts,
            dir: Some(dir),
            sig: Some(1.0),
            ..Default::default()
        }
    }

    pub fn pupil(ts: f64, eye: Eye, pd: f64) -> EventRecord {
        EventRecord {
            ts,
            eye: Some(eye),
            pd: Some(pd),
            ..Default::default()
        }
    }

    /// First outgoing pulse at 1 s (device µs), so the offset is 11 s
    pub fn secondary() -> Vec<EventRecord> {
        vec![
            sync(900_000.0, SyncDirection::In),
            sync(1_000_000.0, SyncDirection::Out),
            pupil(11_500_000.0, Eye::Left, 3.0),
            pupil(11_000_000.0, Eye::Left, 3.1),
            pupil(11_250_000.0, Eye::Left, 3.2),
            pupil(11_000_000.0, Eye::Right, 2.9),
            EventRecord {
                ts: 11_100_000.0,
                gp: Some([0.5, 0.25]),
                ..Default::default()
            },
        ]
    }

    pub fn input() -> ConversionInput {
        ConversionInput {
            session: SESSION.to_string(),
            primary: primary(),
            secondary: Some(secondary()),
            descriptor: MetadataNode::new(SESSION, "recording"),
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use container_store::{Container, MemoryStore};
    use contracts::{
        AlignmentConfig, AnnotatedStore, ArrayValues, Condition, ConversionInput, Dimension,
        MetadataValue, OffsetOverrides, OffsetSource, RegionPlacement, SamplingStrategy,
        StreamOffset,
    };
    use sync_engine::{
        catalog, Assembled, ContainerAssembler, CORNER_REGION, EXPERIMENT_REGION, TRIGGER_NAME,
    };

    use crate::fixtures::{self, SESSION};

    fn convert(input: &ConversionInput) -> Assembled<MemoryStore> {
        ContainerAssembler::new(AlignmentConfig::default())
            .assemble(input, |name| Ok(MemoryStore::new(name)))
            .unwrap()
    }

    fn ticks(container: &Container, array: &str) -> Vec<f64> {
        match container.array(array).unwrap().time_dimension() {
            Some(Dimension::Irregular { ticks, .. }) => ticks.clone(),
            other => panic!("expected irregular time dimension on '{array}', got {other:?}"),
        }
    }

    /// Two channels, sync pulses, one experiment start, three left pupil diameters
    #[test]
    fn test_e2e_session_layout() {
        let Assembled { report, store } = convert(&fixtures::input());
        assert!(store.is_closed());
        let container = store.into_container();

        assert_eq!(container.name, SESSION);
        assert_eq!(
            container.group_array_names("eeg data"),
            vec!["channel 1", "channel 2"]
        );
        assert_eq!(container.arrays_of_kind("nix.eeg.trigger").len(), 1);
        assert_eq!(container.group_array_names("tobii data").len(), catalog().len());

        let pupil = container.array("pupil diameter left").unwrap();
        assert_eq!(pupil.len(), 3);
        assert_eq!(ticks(&container, "pupil diameter left"), vec![0.0, 250_000.0, 500_000.0]);

        let corners = container.region(CORNER_REGION).unwrap();
        let starts = container.region(EXPERIMENT_REGION).unwrap();
        assert_eq!(corners.references.len(), 2 + catalog().len());
        assert_eq!(starts.references.len(), 2 + catalog().len());

        let mut annotated = container.group_array_names("eeg data");
        annotated.extend(container.group_array_names("tobii data"));
        assert_eq!(container.referenced_names(EXPERIMENT_REGION), annotated);
        assert!(!annotated.contains(&TRIGGER_NAME));

        assert_eq!(report.channel_arrays, 2);
        assert_eq!(report.property_channels, catalog().len());
        assert_eq!(report.corner_events, 1);
        assert_eq!(report.experiment_starts, 1);
    }

    #[test]
    fn test_e2e_offsets_and_event_positions() {
        let Assembled { report, store } = convert(&fixtures::input());
        let container = store.into_container();

        assert_eq!(report.offsets.primary, StreamOffset::resolved(7.0));
        assert_eq!(report.offsets.secondary, StreamOffset::resolved(11_000_000.0));
        assert_eq!(report.sampling, SamplingStrategy::Uniform { dt: 0.5 });

        // Transition 17 at 2 Hz is 8.5 s on the device clock
        assert_eq!(ticks(&container, "corner_times"), vec![1.5]);
        assert_eq!(ticks(&container, "experiment times"), vec![3.5]);

        let durations = container.array("experiment durations").unwrap();
        assert_eq!(durations.spec.values, ArrayValues::Scalars(vec![100.0]));
        assert!(durations.dimensions.is_empty());

        let trigger_region = container.region(TRIGGER_NAME).unwrap();
        assert_eq!(
            trigger_region.placement,
            RegionPlacement::Inline {
                position: vec![-7.0],
                extent: vec![14.5],
                units: vec!["s".to_string()],
            }
        );
        assert_eq!(
            container.referenced_names(TRIGGER_NAME),
            vec!["channel 1", "channel 2"]
        );
        assert_eq!(trigger_region.features.len(), 1);
    }

    /// Index of the sample a corrected instant falls on
    fn sample_at(dimension: &Dimension, instant: f64) -> usize {
        match dimension {
            Dimension::Uniform { origin, dt, .. } => ((instant - origin) / dt).round() as usize,
            Dimension::Irregular { ticks, .. } => ticks
                .iter()
                .position(|t| (t - instant).abs() < 1e-9)
                .unwrap(),
            other => panic!("not a time dimension: {other:?}"),
        }
    }

    fn assert_regions_land_on_markers(input: &ConversionInput) {
        let Assembled { store, .. } = convert(input);
        let container = store.into_container();
        let trigger = &input.primary.trigger;

        for (positions, level) in [("corner_times", 8.0), ("experiment times", 4.0)] {
            for array in ["channel 1", "channel 2", TRIGGER_NAME] {
                let dimension = container.array(array).unwrap().time_dimension().unwrap();
                for instant in ticks(&container, positions) {
                    let sample = sample_at(dimension, instant);
                    assert_ne!(trigger[sample], trigger[sample + 1], "{positions} on '{array}'");
                    assert_eq!(trigger[sample + 1], level, "{positions} on '{array}'");
                }
            }
        }

        let trigger_region = container.region(TRIGGER_NAME).unwrap();
        let channel = container.array("channel 1").unwrap().time_dimension().unwrap();
        let RegionPlacement::Inline { position, extent, .. } = &trigger_region.placement else {
            panic!("trigger region should be inline");
        };
        assert_eq!(sample_at(channel, position[0]), 0);
        assert_eq!(sample_at(channel, position[0] + extent[0]), trigger.len() - 1);
    }

    #[test]
    fn test_e2e_regions_land_on_trigger_markers() {
        assert_regions_land_on_markers(&fixtures::input());
    }

    #[test]
    fn test_e2e_regions_land_on_markers_when_clock_starts_late() {
        let mut input = fixtures::input();
        for t in &mut input.primary.time {
            *t += 40.0;
        }
        assert_regions_land_on_markers(&input);

        let Assembled { report, store } = convert(&input);
        let container = store.into_container();
        assert_eq!(report.offsets.primary, StreamOffset::resolved(47.0));
        assert_eq!(ticks(&container, "corner_times"), vec![1.5]);
        assert!(matches!(
            container.array("channel 1").unwrap().time_dimension(),
            Some(Dimension::Uniform { origin, .. }) if *origin == -7.0
        ));
    }

    #[test]
    fn test_e2e_regions_land_on_markers_with_explicit_times() {
        let mut input = fixtures::input();
        input.primary.sample_rate = 1.9;
        assert_regions_land_on_markers(&input);
    }

    #[test]
    fn test_e2e_property_rows_and_sync_port() {
        let Assembled { report, store } = convert(&fixtures::input());
        let container = store.into_container();

        let pupil = container.array("pupil diameter left").unwrap();
        assert_eq!(
            pupil.spec.values,
            ArrayValues::Tuples {
                width: 2,
                rows: vec![vec![3.1, 0.0], vec![3.2, 0.0], vec![3.0, 0.0]],
            }
        );
        assert_eq!(
            pupil.dimensions.last(),
            Some(&Dimension::Categorical {
                labels: vec!["diameter".to_string(), "error".to_string()],
            })
        );

        // Both sync records, in and out, land in the sync port channel
        let sync_port = container.array("sync port").unwrap();
        assert_eq!(sync_port.len(), 2);
        assert_eq!(ticks(&container, "sync port"), vec![-10_100_000.0, -10_000_000.0]);
        assert!(sync_port
            .spec
            .description
            .as_deref()
            .unwrap()
            .ends_with("direction 0=out, 1=in"));

        // pupil left 3, pupil right 1, gaze position 1, sync port 2
        assert_eq!(report.property_samples, 7);
        assert_eq!(report.empty_property_channels, catalog().len() - 4);
    }

    #[test]
    fn test_e2e_empty_channels_are_reported() {
        let Assembled { report, store } = convert(&fixtures::input());
        let container = store.into_container();

        let empty = container.array("MEMS gyroscope").unwrap();
        assert!(empty.is_empty());
        assert!(empty.dimensions.is_empty());
        assert!(empty.spec.unit.is_none());
        assert!(empty.spec.description.is_none());

        let missing: Vec<&str> = report
            .diagnostics
            .iter()
            .filter(|d| d.condition == Condition::MissingTelemetry)
            .map(|d| d.entity.as_str())
            .collect();
        assert_eq!(missing.len(), report.empty_property_channels);
        assert!(missing.contains(&"MEMS gyroscope"));
        assert!(!missing.contains(&"pupil diameter left"));
    }

    #[test]
    fn test_e2e_hardware_metadata_links() {
        let Assembled { store, .. } = convert(&fixtures::input());
        let container = store.into_container();

        let metadata = container.metadata.as_ref().unwrap();
        assert_eq!(metadata.name, SESSION);
        let channel = metadata
            .find(&["hardware", "eeg system", "channel 2"])
            .unwrap();
        assert_eq!(channel.property("gain"), Some(&MetadataValue::Number(101.0)));
        assert_eq!(
            container.array("channel 2").unwrap().metadata_link,
            vec!["hardware", "eeg system", "channel 2"]
        );
    }

    #[test]
    fn test_e2e_manual_offsets_skip_missing_pulses() {
        let mut input = fixtures::input();
        // No sync pulses left in the trigger, no outgoing tracker pulse
        for level in input.primary.trigger.iter_mut() {
            if *level == 2.0 {
                *level = 0.0;
            }
        }
        input
            .secondary
            .as_mut()
            .unwrap()
            .retain(|r| !r.is_outgoing_sync());

        let overrides = OffsetOverrides {
            primary: Some(1.0),
            secondary: Some(10_000_000.0),
        };
        let Assembled { report, store } = ContainerAssembler::new(AlignmentConfig::default())
            .with_overrides(overrides)
            .assemble(&input, |name| Ok(MemoryStore::new(name)))
            .unwrap();
        let container = store.into_container();

        assert_eq!(report.offsets.primary.source, OffsetSource::Manual);
        assert_eq!(report.offsets.secondary.source, OffsetSource::Manual);
        assert_eq!(ticks(&container, "corner_times"), vec![7.5]);
        assert_eq!(
            ticks(&container, "pupil diameter left"),
            vec![1_000_000.0, 1_250_000.0, 1_500_000.0]
        );
    }

    #[test]
    fn test_e2e_sync_failure_opens_no_container() {
        let mut input = fixtures::input();
        input.primary.trigger = vec![0.0; input.primary.len()];

        let mut opened = false;
        let result = ContainerAssembler::new(AlignmentConfig::default()).assemble(&input, |name| {
            opened = true;
            Ok(MemoryStore::new(name))
        });

        let err = result.unwrap_err();
        assert!(err.is_sync_failure(), "got: {err}");
        assert!(!opened);
    }

    #[test]
    fn test_e2e_without_tracker_log() {
        let mut input = fixtures::input();
        input.secondary = None;

        let Assembled { report, store } = convert(&input);
        assert_eq!(report.offsets.secondary, StreamOffset::unused());
        assert_eq!(report.property_samples, 0);
        assert_eq!(report.empty_property_channels, catalog().len());
        assert_eq!(
            store.container().group_array_names("tobii data").len(),
            catalog().len()
        );
    }

    #[test]
    fn test_e2e_irregular_sampling() {
        let mut input = fixtures::input();
        // Timestamps advance 0.5 s but the amplifier reports 1.9 Hz
        input.primary.sample_rate = 1.9;

        let Assembled { report, store } = convert(&input);
        let container = store.into_container();

        assert!(report.sampling.is_irregular());
        assert!(report.has(Condition::SamplingDriftDetected));
        let channel_ticks = ticks(&container, "channel 1");
        assert_eq!(channel_ticks.len(), 30);
        assert_eq!(channel_ticks[14], 0.0);

        let trigger = container.array(TRIGGER_NAME).unwrap();
        assert!(matches!(
            trigger.time_dimension(),
            Some(Dimension::Uniform { dt, .. }) if *dt == 0.5
        ));
    }

    #[test]
    fn test_e2e_no_experiment_start() {
        let mut input = fixtures::input();
        input.primary.trigger[22] = 0.0;
        input.primary.trigger[23] = 0.0;

        let Assembled { report, store } = convert(&input);
        let container = store.into_container();

        assert!(report.has(Condition::NoExperimentStartFound));
        assert!(container.array("experiment times").unwrap().is_empty());
        assert!(container.array("experiment durations").unwrap().is_empty());
        assert!(container.region(EXPERIMENT_REGION).is_some());
    }

    #[test]
    fn test_e2e_reference_pulse_from_config() {
        let config = config_loader::ConfigLoader::load_from_str(
            "[sync]\nmin_step = 1.0\nmax_step = 5.0\nreference_pulse_index = 1\nsecondary_lag_s = 10.0\n",
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let Assembled { report, .. } = ContainerAssembler::new(config)
            .assemble(&fixtures::input(), |name| Ok(MemoryStore::new(name)))
            .unwrap();
        assert_eq!(report.offsets.primary, StreamOffset::resolved(3.0));
    }

    #[test]
    fn test_inspect_matches_conversion() {
        let assembler = ContainerAssembler::new(AlignmentConfig::default());
        let input = fixtures::input();
        let inspection = assembler.inspect(&input).unwrap();
        let Assembled { report, .. } = convert(&input);

        assert_eq!(inspection.offsets, report.offsets);
        assert_eq!(inspection.channels, report.channel_arrays);
        assert_eq!(inspection.secondary_records, Some(7));
        let pupil = inspection
            .property_records
            .iter()
            .find(|(name, _)| name == "pupil diameter left")
            .unwrap();
        assert_eq!(pupil.1, 3);
        assert_eq!(
            inspection.property_records.iter().map(|(_, n)| n).sum::<usize>(),
            report.property_samples
        );
    }
}

#[cfg(test)]
mod store_tests {
    use container_store::{JsonFileStore, MemoryStore};
    use contracts::{AlignmentConfig, AnnotatedStore, ArraySpec, ArrayValues};
    use sync_engine::{Assembled, ContainerAssembler, ContainerSession};

    use crate::fixtures::{self, SESSION};

    #[test]
    fn test_json_container_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let Assembled { store, .. } = ContainerAssembler::new(AlignmentConfig::default())
            .assemble(&fixtures::input(), |name| JsonFileStore::create(&out, name))
            .unwrap();

        let path = out.join(format!("{SESSION}.json"));
        assert_eq!(store.path(), path.as_path());
        let container = JsonFileStore::load(&path).unwrap();
        assert_eq!(container.name, store.container().name);
        assert_eq!(container.arrays.len(), store.container().arrays.len());
        assert_eq!(container.regions, store.container().regions);

        // The gaze position sample lacks its companion value
        let gaze = container.array("gaze position").unwrap();
        let ArrayValues::Tuples { rows, .. } = &gaze.spec.values else {
            panic!("expected tuples");
        };
        assert_eq!(&rows[0][..2], &[0.5, 0.25]);
        assert!(rows[0][2].is_nan());
    }

    #[test]
    fn test_session_closes_store_on_drop() {
        let mut store = MemoryStore::new("aborted");
        {
            let mut session = ContainerSession::new(&mut store);
            session
                .write_array(ArraySpec::scalars("channel 1", "nix.eeg.channeldata", vec![1.0]))
                .unwrap();
        }
        assert!(store.is_closed());
        assert_eq!(store.container().arrays.len(), 1);
    }

    #[test]
    fn test_session_close_reports_once() {
        let mut store = MemoryStore::new("closed");
        let session = ContainerSession::new(&mut store);
        session.close().unwrap();
        assert!(store.is_closed());
        assert!(store.write_array(ArraySpec::scalars("a", "k", vec![])).is_err());
    }
}

#[cfg(test)]
mod loader_tests {
    use std::fs;
    use std::path::Path;

    use container_store::MemoryStore;
    use contracts::{AlignmentConfig, Condition};
    use ingestion::{load_session, SessionPaths};
    use sync_engine::{Assembled, ContainerAssembler};

    use crate::fixtures::{self, SESSION};

    fn write_session(dir: &Path) -> SessionPaths {
        let primary = dir.join(format!("{SESSION}_eeg_1.json"));
        fs::write(&primary, serde_json::to_string(&fixtures::primary()).unwrap()).unwrap();

        let tracker = dir.join(format!("{SESSION}_tobii.jsonl"));
        let lines: Vec<String> = fixtures::secondary()
            .iter()
            .map(|r| serde_json::to_string(r).unwrap())
            .collect();
        fs::write(&tracker, lines.join("\n\n")).unwrap();

        let descriptor = dir.join("meta.csv");
        fs::write(&descriptor, "Subject\n,name,S01\n,,,too,deep\n").unwrap();

        SessionPaths {
            primary,
            secondary: Some(tracker),
            descriptor,
        }
    }

    #[test]
    fn test_loaded_session_converts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_session(dir.path());

        let loaded = load_session(&paths).unwrap();
        assert_eq!(loaded.input.session, SESSION);
        assert_eq!(loaded.input.secondary.as_ref().map(Vec::len), Some(7));
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].condition, Condition::MalformedDescriptorRow);

        let Assembled { report, store } = ContainerAssembler::new(AlignmentConfig::default())
            .assemble(&loaded.input, |name| Ok(MemoryStore::new(name)))
            .unwrap();
        assert_eq!(report.channel_arrays, 2);

        let metadata = store.container().metadata.as_ref().unwrap();
        assert!(metadata.find(&["Subject"]).is_some());
        assert!(metadata.find(&["hardware", "eeg system", "channel 1"]).is_some());
    }
}
