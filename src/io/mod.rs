//! I/O modules for ESPA metadata and raw binary bands

pub mod metadata;
pub mod raw_binary;

pub use metadata::{BandDescriptor, MetadataReader, ProductMetadata};
pub use raw_binary::RawBinaryFile;
