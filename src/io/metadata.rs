use crate::types::{ClipError, ClipResult, Dimensions, SampleWidth};
use chrono::NaiveDate;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// ESPA internal metadata document.
/// This represents the root <espa_metadata> element directly
#[derive(Debug, Deserialize)]
struct EspaMetadataRoot {
    #[serde(rename = "global_metadata")]
    global_metadata: GlobalMetadata,
    #[serde(rename = "bands")]
    bands: BandList,
}

#[derive(Debug, Deserialize)]
struct GlobalMetadata {
    #[serde(rename = "satellite", default)]
    satellite: Option<String>,
    #[serde(rename = "instrument")]
    instrument: String,
    #[serde(rename = "acquisition_date", default)]
    acquisition_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BandList {
    #[serde(rename = "band", default)]
    bands: Vec<BandElement>,
}

#[derive(Debug, Deserialize)]
struct BandElement {
    #[serde(rename = "@product", default)]
    product: String,
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@category", default)]
    category: String,
    #[serde(rename = "@data_type")]
    data_type: String,
    #[serde(rename = "@nlines")]
    nlines: usize,
    #[serde(rename = "@nsamps")]
    nsamps: usize,
    #[serde(rename = "@fill_value", default)]
    fill_value: Option<i64>,
    #[serde(rename = "file_name")]
    file_name: String,
}

/// One band declared in the product metadata
#[derive(Debug, Clone, PartialEq)]
pub struct BandDescriptor {
    pub name: String,
    pub product: String,
    pub category: String,
    /// ESPA data type string (UINT8, UINT16, INT16, ...)
    pub data_type: String,
    pub nlines: usize,
    pub nsamps: usize,
    pub fill_value: Option<i64>,
    /// Raw binary file, already resolved against the metadata directory
    pub file_name: PathBuf,
}

impl BandDescriptor {
    /// Describe a band with the fields the clipping engine relies on
    pub fn new<P: Into<PathBuf>>(
        name: &str,
        file_name: P,
        data_type: &str,
        nlines: usize,
        nsamps: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            product: String::new(),
            category: String::new(),
            data_type: data_type.to_string(),
            nlines,
            nsamps,
            fill_value: None,
            file_name: file_name.into(),
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.nlines, self.nsamps)
    }

    /// Sample width implied by the declared data type, if it is one we stream
    pub fn sample_width(&self) -> Option<SampleWidth> {
        SampleWidth::from_espa_data_type(&self.data_type)
    }
}

/// The subset of the ESPA metadata used for band clipping
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMetadata {
    pub satellite: String,
    pub instrument: String,
    pub acquisition_date: Option<NaiveDate>,
    pub bands: Vec<BandDescriptor>,
}

/// Parser for ESPA internal metadata XML files
pub struct MetadataReader;

impl MetadataReader {
    /// Read and parse an ESPA XML file.
    ///
    /// Band file names are resolved relative to the directory holding the XML.
    pub fn read_metadata_file<P: AsRef<Path>>(xml_path: P) -> ClipResult<ProductMetadata> {
        let xml_path = xml_path.as_ref();
        log::debug!("Reading ESPA metadata from {}", xml_path.display());

        let xml_content = std::fs::read_to_string(xml_path).map_err(|e| {
            ClipError::Metadata(format!(
                "Failed to read metadata file {}: {}",
                xml_path.display(),
                e
            ))
        })?;

        let base_dir = xml_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self::parse_metadata(&xml_content, &base_dir)
    }

    /// Parse ESPA XML content
    pub fn parse_metadata(xml_content: &str, base_dir: &Path) -> ClipResult<ProductMetadata> {
        let root = from_str::<EspaMetadataRoot>(xml_content)
            .map_err(|e| ClipError::XmlParsing(format!("Failed to parse ESPA metadata: {}", e)))?;

        let instrument = root.global_metadata.instrument.trim().to_string();
        if instrument.is_empty() {
            return Err(ClipError::Metadata(
                "Global metadata does not name an instrument".to_string(),
            ));
        }

        if root.bands.bands.is_empty() {
            return Err(ClipError::Metadata("No bands found in metadata".to_string()));
        }

        let acquisition_date = root
            .global_metadata
            .acquisition_date
            .as_deref()
            .and_then(Self::parse_acquisition_date);

        let bands = root
            .bands
            .bands
            .into_iter()
            .map(|band| {
                let file_name = Self::resolve_file_name(base_dir, band.file_name.trim());
                BandDescriptor {
                    name: band.name,
                    product: band.product,
                    category: band.category,
                    data_type: band.data_type,
                    nlines: band.nlines,
                    nsamps: band.nsamps,
                    fill_value: band.fill_value,
                    file_name,
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Parsed metadata for instrument {} with {} bands",
            instrument,
            bands.len()
        );

        Ok(ProductMetadata {
            satellite: root.global_metadata.satellite.unwrap_or_default(),
            instrument,
            acquisition_date,
            bands,
        })
    }

    fn parse_acquisition_date(value: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(e) => {
                log::warn!("Ignoring unparseable acquisition date '{}': {}", value, e);
                None
            }
        }
    }

    fn resolve_file_name(base_dir: &Path, file_name: &str) -> PathBuf {
        let path = Path::new(file_name);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }
}
