use std::path::PathBuf;

/// Width of one raw binary sample on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleWidth {
    /// 8-bit unsigned samples
    U8,
    /// 16-bit unsigned samples, little-endian
    U16,
}

impl SampleWidth {
    /// Number of bytes occupied by a single sample
    pub fn bytes(self) -> usize {
        match self {
            SampleWidth::U8 => 1,
            SampleWidth::U16 => 2,
        }
    }

    /// Map an ESPA `data_type` attribute to a sample width.
    ///
    /// Only the unsigned integer types the clipping engine can stream are
    /// recognised; everything else yields `None`.
    pub fn from_espa_data_type(data_type: &str) -> Option<Self> {
        match data_type {
            "UINT8" => Some(SampleWidth::U8),
            "UINT16" => Some(SampleWidth::U16),
            _ => None,
        }
    }
}

impl std::fmt::Display for SampleWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleWidth::U8 => write!(f, "UINT8"),
            SampleWidth::U16 => write!(f, "UINT16"),
        }
    }
}

/// Raster dimensions shared by every band of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub nlines: usize,
    pub nsamps: usize,
}

impl Dimensions {
    pub fn new(nlines: usize, nsamps: usize) -> Self {
        Self { nlines, nsamps }
    }

    /// Byte length of one line, `None` if it does not fit in memory
    pub fn line_bytes(&self, width: SampleWidth) -> Option<usize> {
        self.nsamps.checked_mul(width.bytes())
    }

    /// Byte length of a raw binary file holding these dimensions,
    /// `None` if the declared size overflows
    pub fn file_bytes(&self, width: SampleWidth) -> Option<u64> {
        let line = u64::try_from(self.line_bytes(width)?).ok()?;
        u64::try_from(self.nlines).ok()?.checked_mul(line)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} lines x {} samples", self.nlines, self.nsamps)
    }
}

/// Statistics gathered by a completed clipping pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSummary {
    pub dimensions: Dimensions,
    pub band_count: usize,
    /// Pixels where at least one band or the quality value was forced to fill
    pub pixels_clipped: u64,
}

/// Result of running the clipping engine against a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipOutcome {
    /// The bands and quality layer were streamed and rewritten
    Applied(ClipSummary),
    /// The instrument is outside the supported sensor families; nothing was touched
    NotApplicable { instrument: String },
}

impl ClipOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ClipOutcome::Applied(_))
    }
}

/// Error types for band clipping
#[derive(Debug, thiserror::Error)]
pub enum ClipError {
    #[error("Raw binary error on {}: {}", .path.display(), .message)]
    RawBinary {
        path: PathBuf,
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Allocation error: {0}")]
    Allocation(String),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("XML parsing error: {0}")]
    XmlParsing(String),
}

/// Result type for clipping operations
pub type ClipResult<T> = Result<T, ClipError>;
