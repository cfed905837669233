use tracing::debug;

use super::document::Document;
use super::element::ElementHandle;
use super::errors::header::HeaderError;
use super::specs;
use super::stream::Stream;

///
/// The values found in a document's EBML header.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EbmlHeader {
    pub version: u64,
    pub read_version: u64,
    pub max_id_width: u64,
    pub max_size_width: u64,
    pub doc_type: Option<String>,
    pub doc_type_version: Option<u64>,
    pub doc_type_read_version: Option<u64>,
}

impl<S: Stream> Document<S> {

    ///
    /// Checks whether the stream holds an EBML document this crate can work with and caches the verdict for [`Document::is_valid()`].
    ///
    pub fn file_valid(&mut self) -> bool {
        self.validate().is_ok()
    }

    ///
    /// Checks the EBML header and returns its values.
    ///
    /// The checks run in order and the first failing one is reported: the stream must be readable, start with the EBML magic code, and contain a header element whose `EBMLVersion` and `EBMLReadVersion` are 1 and whose `EBMLMaxIDLength` and `EBMLMaxSizeLength` are at most 8.  The verdict is cached for [`Document::is_valid()`].
    ///
    pub fn validate(&mut self) -> Result<EbmlHeader, HeaderError> {
        let result = self.read_header();
        self.header_valid = result.is_ok();
        if let Err(err) = &result {
            debug!(error = %err, "EBML header validation failed");
        }
        result
    }

    fn read_header(&mut self) -> Result<EbmlHeader, HeaderError> {
        let root = self.root;
        if !self.valid(root) {
            return Err(HeaderError::RootInvalid);
        }

        let found = self.read(0, 4)?;
        if found[..] != specs::magic()[..] {
            return Err(HeaderError::MagicMismatch { found });
        }

        let head = self.get_child(root, specs::EBML_HEADER)?.ok_or(HeaderError::MissingHeader)?;

        let version = self.required_unsigned(head, specs::EBML_VERSION)?;
        if version != 1 {
            return Err(HeaderError::UnsupportedVersion { id: specs::EBML_VERSION, version });
        }
        let read_version = self.required_unsigned(head, specs::EBML_READ_VERSION)?;
        if read_version != 1 {
            return Err(HeaderError::UnsupportedVersion { id: specs::EBML_READ_VERSION, version: read_version });
        }
        // The format itself only allows ids up to 4 bytes, but anything a vint can hold is readable here.
        let max_id_width = self.required_unsigned(head, specs::EBML_MAX_ID_WIDTH)?;
        if max_id_width > 8 {
            return Err(HeaderError::WidthTooLarge { id: specs::EBML_MAX_ID_WIDTH, width: max_id_width });
        }
        let max_size_width = self.required_unsigned(head, specs::EBML_MAX_SIZE_WIDTH)?;
        if max_size_width > 8 {
            return Err(HeaderError::WidthTooLarge { id: specs::EBML_MAX_SIZE_WIDTH, width: max_size_width });
        }

        let doc_type = match self.get_child(head, specs::DOC_TYPE)? {
            Some(element) => Some(self.get_as_string(element)?),
            None => None,
        };

        Ok(EbmlHeader {
            version,
            read_version,
            max_id_width,
            max_size_width,
            doc_type,
            doc_type_version: self.optional_unsigned(head, specs::DOC_TYPE_VERSION)?,
            doc_type_read_version: self.optional_unsigned(head, specs::DOC_TYPE_READ_VERSION)?,
        })
    }

    fn required_unsigned(&mut self, head: ElementHandle, id: u64) -> Result<u64, HeaderError> {
        self.optional_unsigned(head, id)?.ok_or(HeaderError::MissingField { id })
    }

    fn optional_unsigned(&mut self, head: ElementHandle, id: u64) -> Result<Option<u64>, HeaderError> {
        match self.get_child(head, id)? {
            Some(element) => Ok(Some(self.get_as_unsigned(element)?)),
            None => Ok(None),
        }
    }
}
