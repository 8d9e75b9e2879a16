//! bandclip: band-misalignment clipping for Landsat raw binary products
//!
//! Each Landsat band is resampled independently, so the image footprints of the
//! bands disagree by a few pixels at the scene edges. This library rewrites the
//! spectral bands and the quality band of an ESPA raw binary product in place so
//! that any pixel which is fill in one band is fill in all of them.

pub mod types;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use types::{
    ClipError, ClipOutcome, ClipResult, ClipSummary, Dimensions, SampleWidth,
};

pub use io::{BandDescriptor, MetadataReader, ProductMetadata, RawBinaryFile};
pub use crate::core::{
    clip_band_misalignment, clip_band_misalignment_xml, BandProfile, ClipProcessor,
    ProfileDispatcher,
};
