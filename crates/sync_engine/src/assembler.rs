//! Container assembly.
//!
//! Stage order: offsets, session metadata, channel arrays, trigger, property
//! channels, edge events, cross references. Offsets are resolved before the
//! store is opened, so an unresolvable sync pulse leaves no output behind.

use std::time::Instant;

use contracts::{
    AlignmentConfig, AnnotatedStore, ArrayRef, ArraySpec, ArrayValues, ClockOffsets, Component,
    Condition, ContractError, ConversionInput, ConversionReport, Diagnostic, MetadataTarget,
    OffsetOverrides, RegionPlacement, RegionRef, SamplingStrategy,
};
use observability::metrics::{record_conversion_metrics, record_diagnostic, record_stage_duration_ms};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::annotation::AnnotationRelation;
use crate::edges::{EdgeEventExtractor, EdgeEvents};
use crate::hardware::{channel_name, hardware_metadata, EEG_SYSTEM_SECTION, HARDWARE_SECTION};
use crate::offset::OffsetResolver;
use crate::property::{catalog, PropertyChannel, PropertyChannelBuilder, PROPERTY_KIND};
use crate::session::ContainerSession;
use crate::time_base::sampling_strategy;

pub const TRIGGER_NAME: &str = "trigger signal";
const TRIGGER_KIND: &str = "nix.eeg.trigger";
const CHANNEL_KIND: &str = "nix.eeg.channeldata";
const CHANNEL_GROUP_KIND: &str = "nix.eeg.channels";
const PROPERTY_GROUP_KIND: &str = "nix.tobii";
const EVENT_KIND: &str = "nix.eeg.event";
const TIMESTAMPS_KIND: &str = "nix.timestamps";
const EXTENTS_KIND: &str = "nix.extents";

pub const CORNER_REGION: &str = "corners";
pub const EXPERIMENT_REGION: &str = "experiment starts";
const CORNER_POSITIONS: &str = "corner_times";
const EXPERIMENT_POSITIONS: &str = "experiment times";
const EXPERIMENT_EXTENTS: &str = "experiment durations";

const SECONDS: &str = "s";

/// Result of a finished conversion, with the closed store handed back
#[derive(Debug)]
pub struct Assembled<S> {
    pub report: ConversionReport,
    pub store: S,
}

/// Dry-run summary: what a conversion would write
#[derive(Debug, Clone, Serialize)]
pub struct InspectionReport {
    pub session: String,
    pub offsets: ClockOffsets,
    pub sampling: SamplingStrategy,
    pub primary_samples: usize,
    pub channels: usize,
    pub secondary_records: Option<usize>,
    /// Matching record count per property channel, in container order
    pub property_records: Vec<(String, usize)>,
    pub corner_events: usize,
    pub experiment_starts: usize,
}

/// Writes one session into an annotated store
#[derive(Debug, Clone, Default)]
pub struct ContainerAssembler {
    config: AlignmentConfig,
    overrides: OffsetOverrides,
}

impl ContainerAssembler {
    pub fn new(config: AlignmentConfig) -> Self {
        Self {
            config,
            overrides: OffsetOverrides::default(),
        }
    }

    /// Manually supplied offsets, bypassing resolution for their stream
    pub fn with_overrides(mut self, overrides: OffsetOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    #[instrument(name = "resolve_offsets", skip_all, fields(session = %input.session))]
    pub fn resolve_offsets(&self, input: &ConversionInput) -> Result<ClockOffsets, ContractError> {
        OffsetResolver::new(&self.config.sync, &self.config.secondary).resolve(
            &input.primary.time,
            &input.primary.trigger,
            input.secondary.as_deref(),
            &self.overrides,
        )
    }

    /// Run every stage without touching a store
    pub fn inspect(&self, input: &ConversionInput) -> Result<InspectionReport, ContractError> {
        input.primary.validate()?;
        let offsets = self.resolve_offsets(input)?;
        let records = input.secondary.as_deref().unwrap_or(&[]);
        let builder = PropertyChannelBuilder::new(offsets.secondary);

        let mut property_records = Vec::new();
        for descriptor in catalog() {
            let count = builder.build(records, &descriptor).map_or(0, |c| c.len());
            property_records.push((descriptor.name.to_string(), count));
        }

        let events = EdgeEventExtractor::new(&self.config.events)
            .extract(&input.primary.time, &input.primary.trigger);

        Ok(InspectionReport {
            session: input.session.clone(),
            offsets,
            sampling: sampling_strategy(&input.primary.time, input.primary.sample_rate),
            primary_samples: input.primary.len(),
            channels: input.primary.channels.len(),
            secondary_records: input.secondary.as_ref().map(Vec::len),
            property_records,
            corner_events: events.corners.len(),
            experiment_starts: events.experiment_starts.len(),
        })
    }

    /// Convert one session
    ///
    /// `open` creates the store for the container named after the session. It is
    /// called only once the offsets are known. The store is flushed and closed on
    /// every path that reaches it.
    #[instrument(name = "assemble", skip_all, fields(session = %input.session))]
    pub fn assemble<S, F>(&self, input: &ConversionInput, open: F) -> Result<Assembled<S>, ContractError>
    where
        S: AnnotatedStore,
        F: FnOnce(&str) -> Result<S, ContractError>,
    {
        input.primary.validate()?;
        let offsets = timed("offsets", || self.resolve_offsets(input))?;

        let mut store = open(&input.session)?;
        let report = {
            let mut session = ContainerSession::new(&mut store);
            let report = Pass::new(&self.config, input, offsets, &mut *session).run()?;
            session.close()?;
            report
        };

        record_conversion_metrics(&report);
        info!(
            container = %report.container,
            channels = report.channel_arrays,
            property_channels = report.property_channels,
            property_samples = report.property_samples,
            diagnostics = report.diagnostics.len(),
            "conversion finished"
        );
        Ok(Assembled { report, store })
    }
}

fn timed<T>(stage: &'static str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    record_stage_duration_ms(stage, start.elapsed().as_secs_f64() * 1000.0);
    out
}

/// One conversion writing into an open store
struct Pass<'a, S: AnnotatedStore + ?Sized> {
    config: &'a AlignmentConfig,
    input: &'a ConversionInput,
    offsets: ClockOffsets,
    store: &'a mut S,
    diagnostics: Vec<Diagnostic>,
}

struct ChannelStage {
    arrays: Vec<ArrayRef>,
    sampling: SamplingStrategy,
    /// Offset-corrected time of the first sample
    origin: f64,
}

struct PropertyStage {
    arrays: Vec<ArrayRef>,
    empty: usize,
    samples: usize,
}

impl<'a, S: AnnotatedStore + ?Sized> Pass<'a, S> {
    fn new(
        config: &'a AlignmentConfig,
        input: &'a ConversionInput,
        offsets: ClockOffsets,
        store: &'a mut S,
    ) -> Self {
        Self {
            config,
            input,
            offsets,
            store,
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> Result<ConversionReport, ContractError> {
        timed("metadata", || self.write_metadata())?;
        let channels = timed("channels", || self.write_channels())?;
        timed("trigger", || self.write_trigger(&channels))?;
        let properties = timed("properties", || self.write_properties())?;

        let mut annotated = channels.arrays.clone();
        annotated.extend(&properties.arrays);
        let events = timed("events", || self.write_events(&annotated))?;

        Ok(ConversionReport {
            container: self.input.session.clone(),
            offsets: self.offsets,
            sampling: channels.sampling,
            channel_arrays: channels.arrays.len(),
            property_channels: properties.arrays.len(),
            empty_property_channels: properties.empty,
            property_samples: properties.samples,
            corner_events: events.corners.len(),
            experiment_starts: events.experiment_starts.len(),
            diagnostics: self.diagnostics,
        })
    }

    fn raise(&mut self, diagnostic: Diagnostic) {
        warn!(
            component = diagnostic.component.as_str(),
            condition = diagnostic.condition.as_str(),
            entity = %diagnostic.entity,
            detail = diagnostic.detail.as_deref().unwrap_or_default(),
            "conversion diagnostic"
        );
        record_diagnostic(&diagnostic);
        self.diagnostics.push(diagnostic);
    }

    #[instrument(name = "write_metadata", skip_all)]
    fn write_metadata(&mut self) -> Result<(), ContractError> {
        let hardware = hardware_metadata(self.input.primary.channels.len(), &self.config.primary);
        let tree = self.input.descriptor.clone().with_child(hardware);
        self.store.attach_metadata_tree(MetadataTarget::Container, tree)
    }

    fn primary_description(&self) -> String {
        format!("The time dimension has been modified by -{}", self.offsets.primary.value)
    }

    #[instrument(name = "write_channels", skip_all, fields(channels = self.input.primary.channels.len()))]
    fn write_channels(&mut self) -> Result<ChannelStage, ContractError> {
        let (config, input) = (self.config, self.input);
        let primary = &input.primary;
        let group_name = &config.container.primary_group;
        let group = self.store.define_group(group_name, CHANNEL_GROUP_KIND)?;

        let sampling = sampling_strategy(&primary.time, primary.sample_rate);
        if let SamplingStrategy::Irregular { drift, .. } = sampling {
            self.raise(
                Diagnostic::new(Component::TimeBase, Condition::SamplingDriftDetected, group_name.clone())
                    .with_detail(format!(
                        "sample rate does not match timestamps (drift {drift:.6} Hz), storing explicit times"
                    )),
            );
        }
        let corrected: Vec<f64> = primary
            .time
            .iter()
            .map(|&t| self.offsets.primary.correct(t))
            .collect();
        let origin = corrected.first().copied().unwrap_or_default();

        let mut arrays = Vec::with_capacity(primary.channels.len());
        for (index, samples) in primary.channels.iter().enumerate() {
            let name = channel_name(index);
            let spec = ArraySpec::scalars(name.clone(), CHANNEL_KIND, samples.clone())
                .with_unit(config.primary.channel_unit.clone())
                .with_label(config.primary.channel_label.clone())
                .with_description(self.primary_description());
            let array = self.store.write_array(spec)?;

            match sampling {
                SamplingStrategy::Uniform { dt } => self
                    .store
                    .attach_uniform_time_dimension(array, origin, dt, SECONDS, "time")?,
                SamplingStrategy::Irregular { .. } => self.store.attach_irregular_time_dimension(
                    array,
                    corrected.clone(),
                    SECONDS,
                    "time",
                )?,
            }
            self.store
                .link_metadata(array, &[HARDWARE_SECTION, EEG_SYSTEM_SECTION, &name])?;
            self.store.add_to_group(group, array)?;
            arrays.push(array);
        }

        Ok(ChannelStage {
            arrays,
            sampling,
            origin,
        })
    }

    #[instrument(name = "write_trigger", skip_all)]
    fn write_trigger(&mut self, channels: &ChannelStage) -> Result<(), ContractError> {
        let (config, input) = (self.config, self.input);
        let primary = &input.primary;
        let spec = ArraySpec::scalars(TRIGGER_NAME, TRIGGER_KIND, primary.trigger.clone())
            .with_unit(config.primary.trigger_unit.clone())
            .with_label(config.primary.trigger_label.clone())
            .with_description(self.primary_description());
        let trigger = self.store.write_array(spec)?;
        self.store.attach_uniform_time_dimension(
            trigger,
            channels.origin,
            channels.sampling.dt(),
            SECONDS,
            "time",
        )?;

        // Spans the whole recording on the corrected axis
        let duration = match (primary.time.first(), primary.time.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        let region = self.store.define_region(
            TRIGGER_NAME,
            TRIGGER_KIND,
            RegionPlacement::Inline {
                position: vec![channels.origin],
                extent: vec![duration],
                units: vec![SECONDS.to_string()],
            },
        )?;

        let mut relation = AnnotationRelation::new();
        relation.link_all(region, &channels.arrays);
        relation.apply(&mut *self.store)?;
        self.store.add_feature(region, trigger)
    }

    #[instrument(name = "write_properties", skip_all)]
    fn write_properties(&mut self) -> Result<PropertyStage, ContractError> {
        let (config, input) = (self.config, self.input);
        let group = self
            .store
            .define_group(&config.container.secondary_group, PROPERTY_GROUP_KIND)?;
        let records = input.secondary.as_deref().unwrap_or(&[]);
        let builder = PropertyChannelBuilder::new(self.offsets.secondary);

        let mut stage = PropertyStage {
            arrays: Vec::new(),
            empty: 0,
            samples: 0,
        };
        for descriptor in catalog() {
            let channel = match builder.build(records, &descriptor) {
                Ok(channel) => {
                    if channel.is_empty() {
                        self.raise(
                            Diagnostic::new(
                                Component::PropertyChannelBuilder,
                                Condition::MissingTelemetry,
                                descriptor.name,
                            )
                            .with_detail(format!("no '{}' data found", descriptor.key)),
                        );
                    }
                    channel
                }
                Err(err) => {
                    self.raise(
                        Diagnostic::new(
                            Component::PropertyChannelBuilder,
                            Condition::ChannelDegraded,
                            descriptor.name,
                        )
                        .with_detail(err.to_string()),
                    );
                    PropertyChannel::empty(descriptor)
                }
            };

            let array = self.write_property_channel(&channel)?;
            self.store.add_to_group(group, array)?;
            if channel.is_empty() {
                stage.empty += 1;
            }
            stage.samples += channel.len();
            stage.arrays.push(array);
        }

        Ok(stage)
    }

    fn write_property_channel(&mut self, channel: &PropertyChannel) -> Result<ArrayRef, ContractError> {
        let descriptor = &channel.descriptor;
        let values = ArrayValues::Tuples {
            width: descriptor.width(),
            rows: channel.rows.clone(),
        };
        let mut spec = ArraySpec::new(descriptor.name, PROPERTY_KIND, values).with_label(descriptor.label);

        if channel.is_empty() {
            return self.store.write_array(spec);
        }

        if let Some(unit) = descriptor.unit {
            spec = spec.with_unit(unit);
        }
        let mut description = format!(
            "The timestamp has been modified by an offset of -{}",
            self.offsets.secondary.value
        );
        if let Some(note) = descriptor.note {
            description.push_str("; ");
            description.push_str(note);
        }
        let array = self.store.write_array(spec.with_description(description))?;

        self.store.attach_irregular_time_dimension(
            array,
            channel.times.clone(),
            self.config.secondary.time_unit.symbol(),
            "timestamp",
        )?;
        let labels = descriptor.components.iter().map(|c| c.to_string()).collect();
        self.store.attach_categorical_dimension(array, labels)?;
        Ok(array)
    }

    #[instrument(name = "write_events", skip_all, fields(annotated = annotated.len()))]
    fn write_events(&mut self, annotated: &[ArrayRef]) -> Result<EdgeEvents, ContractError> {
        let input = self.input;
        let primary = &input.primary;
        let extractor = EdgeEventExtractor::new(&self.config.events);
        let events = extractor.extract(&primary.time, &primary.trigger);

        if events.experiment_starts.is_empty() {
            self.raise(
                Diagnostic::new(
                    Component::EdgeEventExtractor,
                    Condition::NoExperimentStartFound,
                    TRIGGER_NAME,
                )
                .with_detail("did not find an experiment start condition"),
            );
        }

        let offset = self.offsets.primary;
        let corner_times: Vec<f64> = events
            .corner_instants()
            .into_iter()
            .map(|t| offset.correct(t))
            .collect();
        let start_times: Vec<f64> = events
            .experiment_instants()
            .into_iter()
            .map(|t| offset.correct(t))
            .collect();
        let extents = extractor.experiment_extents(start_times.len());

        let corner_positions = self.write_time_points(CORNER_POSITIONS, TIMESTAMPS_KIND, corner_times, true)?;
        let corners = self.store.define_region(
            CORNER_REGION,
            EVENT_KIND,
            RegionPlacement::Arrays {
                positions: corner_positions,
                extents: None,
            },
        )?;

        let start_positions =
            self.write_time_points(EXPERIMENT_POSITIONS, TIMESTAMPS_KIND, start_times, true)?;
        let start_extents = self.write_time_points(EXPERIMENT_EXTENTS, EXTENTS_KIND, extents, false)?;
        let starts = self.store.define_region(
            EXPERIMENT_REGION,
            EVENT_KIND,
            RegionPlacement::Arrays {
                positions: start_positions,
                extents: Some(start_extents),
            },
        )?;

        let regions: [RegionRef; 2] = [corners, starts];
        let relation = AnnotationRelation::cross_product(&regions, annotated);
        relation.apply(&mut *self.store)?;

        info!(
            corners = events.corners.len(),
            experiment_starts = events.experiment_starts.len(),
            references = relation.len(),
            "event regions written"
        );
        Ok(events)
    }

    /// Position or extent array; positions are indexed by themselves
    fn write_time_points(
        &mut self,
        name: &str,
        kind: &str,
        values: Vec<f64>,
        self_indexed: bool,
    ) -> Result<ArrayRef, ContractError> {
        let spec = ArraySpec::scalars(name, kind, values.clone())
            .with_unit(SECONDS)
            .with_label("time");
        let array = self.store.write_array(spec)?;
        if self_indexed && !values.is_empty() {
            self.store
                .attach_irregular_time_dimension(array, values, SECONDS, "time")?;
        }
        Ok(array)
    }
}
