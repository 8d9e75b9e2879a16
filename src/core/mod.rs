//! Band-misalignment clipping engine

pub mod profile;
pub mod selector;
pub mod processor;
pub mod dispatch;

// Re-export main types
pub use profile::{BandProfile, InstrumentMatch, SensorFamily, SensorVariant, LEVEL1_FILL, QUALITY_FILL};
pub use selector::{BandSelection, BandSelector, OpenBandSet};
pub use processor::ClipProcessor;
pub use dispatch::{clip_band_misalignment, clip_band_misalignment_xml, ProfileDispatcher};
