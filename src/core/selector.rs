use crate::core::profile::BandProfile;
use crate::io::{BandDescriptor, ProductMetadata, RawBinaryFile};
use crate::types::{ClipError, ClipResult, Dimensions, SampleWidth};

/// Product bands matched against a profile and validated, not yet opened
#[derive(Debug, Clone)]
pub struct BandSelection<'m> {
    /// Matched spectral bands in metadata order
    pub bands: Vec<&'m BandDescriptor>,
    pub quality: &'m BandDescriptor,
    /// Dimensions adopted from the first matched band
    pub dimensions: Dimensions,
}

/// Read-write handles for every band taking part in a clipping pass
#[derive(Debug)]
pub struct OpenBandSet {
    pub bands: Vec<RawBinaryFile>,
    pub quality: RawBinaryFile,
    pub dimensions: Dimensions,
}

impl OpenBandSet {
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }
}

/// Resolves a product's declared bands against a band profile
pub struct BandSelector<'p> {
    profile: &'p BandProfile,
}

impl<'p> BandSelector<'p> {
    pub fn new(profile: &'p BandProfile) -> Self {
        Self { profile }
    }

    /// Match and validate the declared bands without touching any file
    pub fn select<'m>(&self, metadata: &'m ProductMetadata) -> ClipResult<BandSelection<'m>> {
        let mut bands: Vec<&'m BandDescriptor> = Vec::new();
        let mut quality: Option<&'m BandDescriptor> = None;
        let mut dimensions: Option<Dimensions> = None;

        for band in &metadata.bands {
            if self.profile.band_index(&band.name).is_some() {
                if bands.iter().any(|b| b.name == band.name) {
                    return Err(ClipError::Validation(format!(
                        "Band {} is declared more than once",
                        band.name
                    )));
                }

                if dimensions.is_none() {
                    dimensions = Some(band.dimensions());
                }

                log::debug!("Matched band {} -> {}", band.name, band.file_name.display());
                bands.push(band);
            }

            if self.profile.is_quality_band(&band.name) {
                if quality.is_some() {
                    return Err(ClipError::Validation(format!(
                        "Quality band {} is declared more than once",
                        band.name
                    )));
                }
                log::debug!("Matched quality band {} -> {}", band.name, band.file_name.display());
                quality = Some(band);
            }
        }

        self.validate_band_count(&metadata.instrument, bands.len())?;

        let dimensions = match dimensions {
            Some(dims) if dims.nlines > 0 && dims.nsamps > 0 => dims,
            _ => {
                return Err(ClipError::Validation(
                    "nlines and/or nsamps are not valid".to_string(),
                ))
            }
        };

        let quality = quality.ok_or_else(|| {
            ClipError::Validation(format!(
                "Unable to find the band quality band ({})",
                self.profile.quality_band
            ))
        })?;

        for width in [self.profile.band_sample, self.profile.quality_sample] {
            expected_file_bytes(dimensions, width)?;
        }

        for band in &bands {
            self.validate_band(band, dimensions, self.profile.band_sample)?;
        }
        self.validate_band(quality, dimensions, self.profile.quality_sample)?;

        log::debug!(
            "Selected {} {} bands plus {} ({})",
            bands.len(),
            self.profile.family,
            quality.name,
            dimensions
        );

        Ok(BandSelection {
            bands,
            quality,
            dimensions,
        })
    }

    /// Open every selected band and the quality band for read-write access.
    ///
    /// Handles opened before a failure are dropped, and so closed, on return.
    pub fn open(&self, selection: &BandSelection<'_>) -> ClipResult<OpenBandSet> {
        let dims = selection.dimensions;

        let mut bands = Vec::with_capacity(selection.bands.len());
        for band in &selection.bands {
            let raw = RawBinaryFile::open_read_write(&band.file_name, self.profile.band_sample, dims.nsamps)?;
            Self::check_file_size(&raw, dims)?;
            bands.push(raw);
        }

        let quality = RawBinaryFile::open_read_write(
            &selection.quality.file_name,
            self.profile.quality_sample,
            dims.nsamps,
        )?;
        Self::check_file_size(&quality, dims)?;

        Ok(OpenBandSet {
            bands,
            quality,
            dimensions: dims,
        })
    }

    /// Select, validate and open in one step
    pub fn select_and_open(&self, metadata: &ProductMetadata) -> ClipResult<OpenBandSet> {
        let selection = self.select(metadata)?;
        self.open(&selection)
    }

    fn validate_band_count(&self, instrument: &str, found: usize) -> ClipResult<()> {
        let allowed = self.profile.allowed_band_counts(instrument);
        if allowed.contains(&found) {
            return Ok(());
        }

        let expected = self
            .profile
            .variants_for(instrument)
            .map(|v| format!("{} {} bands", v.band_count, v.label))
            .collect::<Vec<_>>()
            .join(" or ");

        Err(ClipError::Validation(format!(
            "Expecting {}, but {} bands found",
            if expected.is_empty() { "no bands".to_string() } else { expected },
            found
        )))
    }

    fn validate_band(
        &self,
        band: &BandDescriptor,
        dimensions: Dimensions,
        width: SampleWidth,
    ) -> ClipResult<()> {
        if band.dimensions() != dimensions {
            return Err(ClipError::Validation(format!(
                "Band {} is {} but the product bands are {}",
                band.name,
                band.dimensions(),
                dimensions
            )));
        }

        // Types outside UINT8/UINT16 are left to the file size check
        if let Some(declared) = band.sample_width() {
            if declared != width {
                return Err(ClipError::Validation(format!(
                    "Band {} is declared as {} but {} expects {}",
                    band.name, declared, self.profile.family, width
                )));
            }
        }

        Ok(())
    }

    fn check_file_size(raw: &RawBinaryFile, dims: Dimensions) -> ClipResult<()> {
        let expected = expected_file_bytes(dims, raw.width())?;
        let actual = raw.len()?;
        if actual < expected {
            return Err(ClipError::Validation(format!(
                "{} holds {} bytes, expected {} for {} of {}",
                raw.path().display(),
                actual,
                expected,
                dims,
                raw.width()
            )));
        }
        Ok(())
    }
}

/// Declared byte size of one band file, rejecting dimensions whose size overflows
fn expected_file_bytes(dims: Dimensions, width: SampleWidth) -> ClipResult<u64> {
    dims.file_bytes(width).ok_or_else(|| {
        ClipError::Validation(format!(
            "{} of {} exceeds the addressable file size",
            dims, width
        ))
    })
}
