use crate::types::{ClipError, ClipResult, Dimensions, SampleWidth};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A flat, headerless raster file of fixed-width unsigned samples,
/// opened for in-place line updates.
///
/// Samples are widened to `u16` in memory regardless of the on-disk width so
/// a single line buffer type serves both 8-bit and 16-bit products.
#[derive(Debug)]
pub struct RawBinaryFile {
    path: PathBuf,
    file: File,
    width: SampleWidth,
    nsamps: usize,
    /// On-disk bytes of the current line
    line: Vec<u8>,
}

impl RawBinaryFile {
    /// Open an existing raw binary file for read-write access
    pub fn open_read_write<P: AsRef<Path>>(
        path: P,
        width: SampleWidth,
        nsamps: usize,
    ) -> ClipResult<Self> {
        let path = path.as_ref().to_path_buf();

        let line_bytes = Dimensions::new(1, nsamps).line_bytes(width).ok_or_else(|| {
            ClipError::Validation(format!(
                "{} samples of {} do not fit in one line buffer",
                nsamps, width
            ))
        })?;

        let mut line = Vec::new();
        line.try_reserve_exact(line_bytes).map_err(|e| {
            ClipError::Allocation(format!(
                "Allocating a {} byte line buffer for {}: {}",
                line_bytes,
                path.display(),
                e
            ))
        })?;
        line.resize(line_bytes, 0u8);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| ClipError::RawBinary {
                message: "Opening the raw binary file with read-write access".to_string(),
                path: path.clone(),
                source,
            })?;

        log::debug!("Opened {} ({}, {} samples/line)", path.display(), width, nsamps);

        Ok(Self {
            path,
            file,
            width,
            nsamps,
            line,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> SampleWidth {
        self.width
    }

    pub fn nsamps(&self) -> usize {
        self.nsamps
    }

    /// Number of bytes occupied by one line
    pub fn line_bytes(&self) -> usize {
        self.line.len()
    }

    /// Absolute byte offset of the start of `line`
    pub fn line_offset(&self, line: usize) -> ClipResult<u64> {
        u64::try_from(line)
            .ok()
            .and_then(|l| l.checked_mul(self.line_bytes() as u64))
            .ok_or_else(|| {
                ClipError::Validation(format!(
                    "Line {} of {} lies beyond the addressable file size",
                    line,
                    self.path.display()
                ))
            })
    }

    /// Current size of the file on disk
    pub fn len(&self) -> ClipResult<u64> {
        let metadata = self.file.metadata().map_err(|source| ClipError::RawBinary {
            path: self.path.clone(),
            message: "Querying the file size".to_string(),
            source,
        })?;
        Ok(metadata.len())
    }

    /// Read one line into `samples`, which must hold exactly one line
    pub fn read_line(&mut self, line: usize, samples: &mut [u16]) -> ClipResult<()> {
        self.check_buffer(samples.len())?;

        self.seek_line(line)?;
        self.file.read_exact(&mut self.line).map_err(|source| ClipError::RawBinary {
            path: self.path.clone(),
            message: format!(
                "Reading line {} ({} elements of {} bytes)",
                line,
                self.nsamps,
                self.width.bytes()
            ),
            source,
        })?;

        match self.width {
            SampleWidth::U8 => {
                for (sample, byte) in samples.iter_mut().zip(self.line.iter()) {
                    *sample = u16::from(*byte);
                }
            }
            SampleWidth::U16 => {
                for (sample, pair) in samples.iter_mut().zip(self.line.chunks_exact(2)) {
                    *sample = u16::from_le_bytes([pair[0], pair[1]]);
                }
            }
        }

        Ok(())
    }

    /// Write one line from `samples` back to its position in the file.
    ///
    /// 8-bit files keep only the low byte of each sample.
    pub fn write_line(&mut self, line: usize, samples: &[u16]) -> ClipResult<()> {
        self.check_buffer(samples.len())?;

        match self.width {
            SampleWidth::U8 => {
                for (byte, sample) in self.line.iter_mut().zip(samples.iter()) {
                    *byte = *sample as u8;
                }
            }
            SampleWidth::U16 => {
                for (pair, sample) in self.line.chunks_exact_mut(2).zip(samples.iter()) {
                    pair.copy_from_slice(&sample.to_le_bytes());
                }
            }
        }

        self.seek_line(line)?;
        self.file.write_all(&self.line).map_err(|source| ClipError::RawBinary {
            path: self.path.clone(),
            message: format!(
                "Writing line {} ({} elements of {} bytes)",
                line,
                self.nsamps,
                self.width.bytes()
            ),
            source,
        })
    }

    /// Push pending writes to storage
    pub fn flush(&mut self) -> ClipResult<()> {
        self.file.flush().map_err(|source| ClipError::RawBinary {
            path: self.path.clone(),
            message: "Flushing the raw binary file".to_string(),
            source,
        })
    }

    fn check_buffer(&self, len: usize) -> ClipResult<()> {
        if len != self.nsamps {
            return Err(ClipError::Validation(format!(
                "Line buffer holds {} samples but {} has {} per line",
                len,
                self.path.display(),
                self.nsamps
            )));
        }
        Ok(())
    }

    fn seek_line(&mut self, line: usize) -> ClipResult<()> {
        let offset = self.line_offset(line)?;
        self.file
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(|source| ClipError::RawBinary {
                path: self.path.clone(),
                message: format!("Not able to seek to line {} (offset {})", line, offset),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_u8_line_update() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&[1, 2, 3, 4, 5, 6]).unwrap();

        let mut raw = RawBinaryFile::open_read_write(temp.path(), SampleWidth::U8, 3).unwrap();
        let mut line = vec![0u16; 3];

        raw.read_line(1, &mut line).unwrap();
        assert_eq!(line, vec![4, 5, 6]);

        line[1] = 0;
        raw.write_line(1, &line).unwrap();
        raw.flush().unwrap();

        assert_eq!(std::fs::read(temp.path()).unwrap(), vec![1, 2, 3, 4, 0, 6]);
    }

    #[test]
    fn test_u16_little_endian_lines() {
        let mut temp = NamedTempFile::new().unwrap();
        let values: [u16; 4] = [1, 0x0102, 20000, 65535];
        for v in values {
            temp.write_all(&v.to_le_bytes()).unwrap();
        }

        let mut raw = RawBinaryFile::open_read_write(temp.path(), SampleWidth::U16, 2).unwrap();
        assert_eq!(raw.line_bytes(), 4);
        assert_eq!(raw.line_offset(1).unwrap(), 4);
        assert_eq!(raw.len().unwrap(), 8);

        let mut line = vec![0u16; 2];
        raw.read_line(1, &mut line).unwrap();
        assert_eq!(line, vec![20000, 65535]);

        raw.read_line(0, &mut line).unwrap();
        assert_eq!(line, vec![1, 0x0102]);
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&[9, 9, 9]).unwrap();

        let mut raw = RawBinaryFile::open_read_write(temp.path(), SampleWidth::U8, 3).unwrap();
        let mut line = vec![0u16; 3];

        let result = raw.read_line(1, &mut line);
        assert!(matches!(result, Err(ClipError::RawBinary { .. })));
    }

    #[test]
    fn test_wrong_buffer_length_is_rejected() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(&[7; 8]).unwrap();

        let mut raw = RawBinaryFile::open_read_write(temp.path(), SampleWidth::U8, 4).unwrap();

        let mut short = vec![0u16; 3];
        assert!(matches!(raw.read_line(0, &mut short), Err(ClipError::Validation(_))));

        let long = vec![0u16; 5];
        assert!(matches!(raw.write_line(0, &long), Err(ClipError::Validation(_))));

        // Nothing was written by the rejected call
        assert_eq!(std::fs::read(temp.path()).unwrap(), vec![7; 8]);
    }

    #[test]
    fn test_unaddressable_line_is_rejected() {
        let temp = NamedTempFile::new().unwrap();
        let raw = RawBinaryFile::open_read_write(temp.path(), SampleWidth::U16, 4).unwrap();
        assert!(matches!(raw.line_offset(usize::MAX), Err(ClipError::Validation(_))));
    }

    #[test]
    fn test_oversized_line_is_rejected() {
        let temp = NamedTempFile::new().unwrap();
        let result = RawBinaryFile::open_read_write(temp.path(), SampleWidth::U16, usize::MAX);
        assert!(matches!(result, Err(ClipError::Validation(_))));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = RawBinaryFile::open_read_write("/nonexistent/band.img", SampleWidth::U8, 1);
        match result {
            Err(ClipError::RawBinary { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/band.img"));
            }
            other => panic!("expected a raw binary error, got {:?}", other),
        }
    }
}
