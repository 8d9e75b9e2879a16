use crate::types::{ClipError, ClipResult, SampleWidth};

/// Level-1 fill value shared by the Landsat spectral bands
pub const LEVEL1_FILL: u16 = 0;

/// Quality band value flagging a fill pixel (bit 0 set)
pub const QUALITY_FILL: u16 = 1;

/// Sensor families with band-misalignment clipping rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorFamily {
    /// Landsat 4-7 TM and ETM+ (8-bit bands)
    TmEtm,
    /// Landsat 8-9 OLI and OLI/TIRS (16-bit bands)
    OliTirs,
}

impl std::fmt::Display for SensorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorFamily::TmEtm => write!(f, "TM/ETM+"),
            SensorFamily::OliTirs => write!(f, "OLI/TIRS"),
        }
    }
}

/// How an instrument identifier from the metadata is matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrumentMatch {
    Exact(String),
    Prefix(String),
}

impl InstrumentMatch {
    pub fn matches(&self, instrument: &str) -> bool {
        match self {
            InstrumentMatch::Exact(name) => instrument == name,
            InstrumentMatch::Prefix(prefix) => instrument.starts_with(prefix.as_str()),
        }
    }
}

/// One sensor sub-variant and the number of bands it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorVariant {
    /// Human readable variant name used in messages
    pub label: String,
    pub instrument: InstrumentMatch,
    /// Total number of clipped bands expected for this variant
    pub band_count: usize,
}

/// Band-misalignment clipping rules for one sensor family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandProfile {
    pub family: SensorFamily,
    pub variants: Vec<SensorVariant>,
    /// Canonical band names, in the order they are tried against the metadata
    pub band_names: Vec<String>,
    pub quality_band: String,
    pub band_sample: SampleWidth,
    pub quality_sample: SampleWidth,
    pub band_fill: u16,
    pub quality_fill: u16,
}

impl BandProfile {
    /// TM and ETM+: bands 1-7 plus the thermal band(s). TM carries a single
    /// band 6, ETM+ the low/high gain pair 61/62.
    pub fn tm_etm() -> Self {
        Self {
            family: SensorFamily::TmEtm,
            variants: vec![
                SensorVariant {
                    label: "TM".to_string(),
                    instrument: InstrumentMatch::Exact("TM".to_string()),
                    band_count: 7,
                },
                SensorVariant {
                    label: "ETM+".to_string(),
                    instrument: InstrumentMatch::Exact("ETM".to_string()),
                    band_count: 8,
                },
            ],
            band_names: band_names(&[1, 2, 3, 4, 5, 6, 61, 62, 7]),
            quality_band: "qa_pixel".to_string(),
            band_sample: SampleWidth::U8,
            quality_sample: SampleWidth::U16,
            band_fill: LEVEL1_FILL,
            quality_fill: QUALITY_FILL,
        }
    }

    /// OLI-only and OLI/TIRS: bands 1-7, 9 and the thermal bands 10/11.
    /// The panchromatic band 8 has a different resolution and is skipped.
    pub fn oli_tirs() -> Self {
        Self {
            family: SensorFamily::OliTirs,
            variants: vec![
                SensorVariant {
                    label: "OLI".to_string(),
                    instrument: InstrumentMatch::Prefix("OLI".to_string()),
                    band_count: 8,
                },
                SensorVariant {
                    label: "OLI/TIRS".to_string(),
                    instrument: InstrumentMatch::Prefix("OLI".to_string()),
                    band_count: 10,
                },
            ],
            band_names: band_names(&[1, 2, 3, 4, 5, 6, 7, 9, 10, 11]),
            quality_band: "bqa".to_string(),
            band_sample: SampleWidth::U16,
            quality_sample: SampleWidth::U16,
            band_fill: LEVEL1_FILL,
            quality_fill: QUALITY_FILL,
        }
    }

    /// Does any variant of this profile cover the instrument
    pub fn matches_instrument(&self, instrument: &str) -> bool {
        self.variants.iter().any(|v| v.instrument.matches(instrument))
    }

    /// Variants applicable to the instrument
    pub fn variants_for<'a>(&'a self, instrument: &'a str) -> impl Iterator<Item = &'a SensorVariant> + 'a {
        self.variants.iter().filter(move |v| v.instrument.matches(instrument))
    }

    /// Band counts accepted for the instrument, in variant order
    pub fn allowed_band_counts(&self, instrument: &str) -> Vec<usize> {
        let mut counts = Vec::new();
        for variant in self.variants_for(instrument) {
            if !counts.contains(&variant.band_count) {
                counts.push(variant.band_count);
            }
        }
        counts
    }

    /// Index of `name` in the canonical band list
    pub fn band_index(&self, name: &str) -> Option<usize> {
        self.band_names.iter().position(|b| b == name)
    }

    pub fn is_quality_band(&self, name: &str) -> bool {
        self.quality_band == name
    }

    /// Check the profile is internally consistent before it is used
    pub fn validate(&self) -> ClipResult<()> {
        if self.band_names.is_empty() {
            return Err(ClipError::Validation(format!(
                "{} profile lists no bands",
                self.family
            )));
        }

        if self.variants.is_empty() {
            return Err(ClipError::Validation(format!(
                "{} profile has no sensor variants",
                self.family
            )));
        }

        for variant in &self.variants {
            if variant.band_count == 0 || variant.band_count > self.band_names.len() {
                return Err(ClipError::Validation(format!(
                    "{} variant {} expects {} bands but the profile lists {}",
                    self.family,
                    variant.label,
                    variant.band_count,
                    self.band_names.len()
                )));
            }
        }

        if self.band_names.iter().any(|b| *b == self.quality_band) {
            return Err(ClipError::Validation(format!(
                "{} quality band {} is also listed as a spectral band",
                self.family, self.quality_band
            )));
        }

        if !fits_width(self.band_fill, self.band_sample)
            || !fits_width(self.quality_fill, self.quality_sample)
        {
            return Err(ClipError::Validation(format!(
                "{} fill values do not fit the sample widths",
                self.family
            )));
        }

        Ok(())
    }
}

/// Band names follow the ESPA "b<number>" convention
fn band_names(numbers: &[u32]) -> Vec<String> {
    numbers.iter().map(|n| format!("b{}", n)).collect()
}

fn fits_width(value: u16, width: SampleWidth) -> bool {
    match width {
        SampleWidth::U8 => value <= u16::from(u8::MAX),
        SampleWidth::U16 => true,
    }
}
