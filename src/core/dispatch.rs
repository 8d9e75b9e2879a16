use crate::core::processor::ClipProcessor;
use crate::core::profile::BandProfile;
use crate::core::selector::BandSelector;
use crate::io::{MetadataReader, ProductMetadata};
use crate::types::{ClipOutcome, ClipResult};
use std::path::Path;

/// Chooses the band profile for a product and drives the clipping pass
#[derive(Debug, Clone)]
pub struct ProfileDispatcher {
    profiles: Vec<BandProfile>,
}

impl Default for ProfileDispatcher {
    fn default() -> Self {
        Self::landsat()
    }
}

impl ProfileDispatcher {
    /// Dispatcher over an explicit list of profiles, tried in order
    pub fn new(profiles: Vec<BandProfile>) -> Self {
        Self { profiles }
    }

    /// The Landsat TM/ETM+ and OLI/TIRS profiles
    pub fn landsat() -> Self {
        Self::new(vec![BandProfile::oli_tirs(), BandProfile::tm_etm()])
    }

    pub fn profiles(&self) -> &[BandProfile] {
        &self.profiles
    }

    /// First profile covering the instrument, if any
    pub fn profile_for_instrument(&self, instrument: &str) -> Option<&BandProfile> {
        self.profiles.iter().find(|p| p.matches_instrument(instrument))
    }

    /// Clip the product's bands in place.
    ///
    /// Instruments without a profile are passed back untouched as
    /// [`ClipOutcome::NotApplicable`].
    pub fn run(&self, metadata: &ProductMetadata) -> ClipResult<ClipOutcome> {
        let profile = match self.profile_for_instrument(&metadata.instrument) {
            Some(profile) => profile,
            None => {
                log::warn!(
                    "Only TM, ETM+, OLI and OLI/TIRS are processed for band misalignment. \
                     Instrument {} is passed back as-is.",
                    metadata.instrument
                );
                return Ok(ClipOutcome::NotApplicable {
                    instrument: metadata.instrument.clone(),
                });
            }
        };

        profile.validate()?;
        log::info!(
            "Clipping band misalignment for {} {} using the {} profile",
            metadata.satellite,
            metadata.instrument,
            profile.family
        );

        let open = BandSelector::new(profile).select_and_open(metadata)?;
        let summary = ClipProcessor::new(profile).process(open)?;

        Ok(ClipOutcome::Applied(summary))
    }
}

/// Clip the band misalignment of a product using the Landsat profiles
pub fn clip_band_misalignment(metadata: &ProductMetadata) -> ClipResult<ClipOutcome> {
    ProfileDispatcher::default().run(metadata)
}

/// Read an ESPA XML file and clip the band misalignment of its product
pub fn clip_band_misalignment_xml<P: AsRef<Path>>(xml_path: P) -> ClipResult<ClipOutcome> {
    let metadata = MetadataReader::read_metadata_file(xml_path)?;
    clip_band_misalignment(&metadata)
}
