//! Recording hardware metadata for the biosignal amplifier.

use contracts::{MetadataNode, PrimaryConfig};

pub const HARDWARE_SECTION: &str = "hardware";
pub const EEG_SYSTEM_SECTION: &str = "eeg system";

/// Name of the channel array and its metadata section, one-based
pub fn channel_name(index: usize) -> String {
    format!("channel {}", index + 1)
}

/// `hardware / eeg system / channel N` with one gain per channel
pub fn hardware_metadata(channel_count: usize, config: &PrimaryConfig) -> MetadataNode {
    let mut eeg = MetadataNode::new(EEG_SYSTEM_SECTION, "hardware.eeg");
    for index in 0..channel_count {
        eeg = eeg.with_child(
            MetadataNode::new(channel_name(index), "eeg_channel")
                .with_property("gain", config.gain(index)),
        );
    }
    MetadataNode::new(HARDWARE_SECTION, "recording hardware").with_child(eeg)
}
