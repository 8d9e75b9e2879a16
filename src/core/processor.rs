use crate::core::profile::BandProfile;
use crate::core::selector::OpenBandSet;
use crate::types::{ClipError, ClipResult, ClipSummary};

/// Streams every line of an open band set and forces a shared fill footprint
/// onto the spectral bands and the quality band.
pub struct ClipProcessor {
    band_fill: u16,
    quality_fill: u16,
}

impl ClipProcessor {
    /// Create a processor using the fill values of a profile
    pub fn new(profile: &BandProfile) -> Self {
        Self {
            band_fill: profile.band_fill,
            quality_fill: profile.quality_fill,
        }
    }

    /// Run the clipping pass over every line, rewriting each in place.
    ///
    /// The band set is consumed; its handles and the line buffers are released
    /// when this returns, whether or not the pass completed.
    pub fn process(&self, mut open: OpenBandSet) -> ClipResult<ClipSummary> {
        let dims = open.dimensions;
        let band_count = open.band_count();
        log::info!(
            "Clipping {} bands and quality band over {}",
            band_count,
            dims
        );

        let mut band_bufs = Vec::with_capacity(band_count);
        for i in 0..band_count {
            band_bufs.push(allocate_line(dims.nsamps, &format!("band {}", i))?);
        }
        let mut quality_buf = allocate_line(dims.nsamps, "the band quality band")?;

        let mut pixels_clipped = 0u64;
        for line in 0..dims.nlines {
            for (raw, buf) in open.bands.iter_mut().zip(band_bufs.iter_mut()) {
                raw.read_line(line, buf)?;
            }
            open.quality.read_line(line, &mut quality_buf)?;

            pixels_clipped += self.clip_line(&mut band_bufs, &mut quality_buf);

            for (raw, buf) in open.bands.iter_mut().zip(band_bufs.iter()) {
                raw.write_line(line, buf)?;
            }
            open.quality.write_line(line, &quality_buf)?;

            if line > 0 && line % 1000 == 0 {
                log::debug!("Clipped {} of {} lines", line, dims.nlines);
            }
        }

        for raw in open.bands.iter_mut() {
            raw.flush()?;
        }
        open.quality.flush()?;

        log::info!(
            "Band clipping complete: {} pixels forced to fill",
            pixels_clipped
        );

        Ok(ClipSummary {
            dimensions: dims,
            band_count,
            pixels_clipped,
        })
    }

    /// Reconcile one line across all bands and the quality band.
    ///
    /// A sample that is fill in any band, or flagged fill in the quality band,
    /// becomes fill everywhere. Quality-only fill does occur in delivered
    /// products, so the bands are pulled into agreement with the quality band
    /// as well as the other way round. Returns the number of samples where at
    /// least one value changed.
    ///
    /// Only the samples common to every buffer are reconciled.
    pub(crate) fn clip_line(&self, bands: &mut [Vec<u16>], quality: &mut [u16]) -> u64 {
        let nsamps = bands.iter().map(Vec::len).fold(quality.len(), usize::min);
        let mut changed_pixels = 0u64;

        for (s, qa) in quality[..nsamps].iter_mut().enumerate() {
            let fill = bands.iter().any(|band| band[s] == self.band_fill);
            if !fill && *qa != self.quality_fill {
                continue;
            }

            let mut changed = false;
            for band in bands.iter_mut() {
                if band[s] != self.band_fill {
                    band[s] = self.band_fill;
                    changed = true;
                }
            }
            if *qa != self.quality_fill {
                *qa = self.quality_fill;
                changed = true;
            }

            if changed {
                changed_pixels += 1;
            }
        }

        changed_pixels
    }
}

fn allocate_line(nsamps: usize, what: &str) -> ClipResult<Vec<u16>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(nsamps).map_err(|e| {
        ClipError::Allocation(format!(
            "Allocating memory for {} containing {} samples: {}",
            what, nsamps, e
        ))
    })?;
    buf.resize(nsamps, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_fill_spreads_to_all_bands() {
        let processor = ClipProcessor::new(&BandProfile::tm_etm());
        let mut bands = vec![vec![10, 0, 12], vec![20, 21, 22], vec![30, 31, 32]];
        let mut quality = vec![0, 0, 0];

        let changed = processor.clip_line(&mut bands, &mut quality);

        assert_eq!(changed, 1);
        assert_eq!(bands, vec![vec![10, 0, 12], vec![20, 0, 22], vec![30, 0, 32]]);
        assert_eq!(quality, vec![0, 1, 0]);
    }

    #[test]
    fn test_quality_fill_heals_bands() {
        let processor = ClipProcessor::new(&BandProfile::oli_tirs());
        let mut bands = vec![vec![5000, 6000], vec![7000, 8000]];
        let mut quality = vec![2720, 1];

        let changed = processor.clip_line(&mut bands, &mut quality);

        assert_eq!(changed, 1);
        assert_eq!(bands, vec![vec![5000, 0], vec![7000, 0]]);
        assert_eq!(quality, vec![2720, 1]);
    }

    #[test]
    fn test_consistent_line_is_untouched() {
        let processor = ClipProcessor::new(&BandProfile::tm_etm());
        let mut bands = vec![vec![0, 40, 41], vec![0, 50, 51]];
        let mut quality = vec![1, 0, 672];
        let before = (bands.clone(), quality.clone());

        let changed = processor.clip_line(&mut bands, &mut quality);

        assert_eq!(changed, 0);
        assert_eq!((bands, quality), before);
    }

    #[test]
    fn test_uneven_buffers_stop_at_shortest() {
        let processor = ClipProcessor::new(&BandProfile::tm_etm());
        let mut bands = vec![vec![0, 40, 0], vec![50]];
        let mut quality = vec![0, 0, 0, 0];

        let changed = processor.clip_line(&mut bands, &mut quality);

        assert_eq!(changed, 1);
        assert_eq!(bands, vec![vec![0, 40, 0], vec![0]]);
        assert_eq!(quality, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_allocate_line() {
        let buf = allocate_line(16, "test").unwrap();
        assert_eq!(buf.len(), 16);
        assert!(buf.iter().all(|&v| v == 0));
    }
}
