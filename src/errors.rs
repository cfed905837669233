use std::fmt;
use std::error::Error;

pub mod tool {
    use super::fmt;
    use super::Error;
    use std::io;

    #[derive(Debug)]
    pub enum ToolError {
        ReadVintOverflow,
        ReadVintTruncated {
            position: u64,
            expected: usize,
            available: usize,
        },
        WriteVintOverflow(u64),
        InvalidElementId(u64),
        HeaderDoesNotFit {
            id: u64,
            footprint: u64,
        },
        ReadU64Overflow(Vec<u8>),
        ReadI64Overflow(Vec<u8>),
        ReadF64Mismatch(Vec<u8>),
        ReadError {
            source: io::Error,
        },
    }

    impl fmt::Display for ToolError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ToolError::ReadVintOverflow => write!(f, "Unrepresentable Vint size encountered."),
                ToolError::ReadVintTruncated { position, expected, available } => write!(f, "Vint at position {} needs {} bytes, but only {} are available.", position, expected, available),
                ToolError::WriteVintOverflow(val) => write!(f, "Value too large to be written as a vint: {}", val),
                ToolError::InvalidElementId(id) => write!(f, "Element id does not carry a valid length marker: {:#x}", id),
                ToolError::HeaderDoesNotFit { id, footprint } => write!(f, "A header for id {:#x} cannot fill exactly {} bytes", id, footprint),
                ToolError::ReadU64Overflow(arr) => write!(f, "Could not read unsigned int from array: {:?}", arr),
                ToolError::ReadI64Overflow(arr) => write!(f, "Could not read int from array: {:?}", arr),
                ToolError::ReadF64Mismatch(arr) => write!(f, "Could not read float from array: {:?}", arr),
                ToolError::ReadError { source: _ } => write!(f, "Error reading vint from source."),
            }
        }
    }

    impl Error for ToolError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            match self {
                ToolError::ReadError { source } => Some(source),
                _ => None,
            }
        }
    }
}

pub mod element {
    use super::fmt;
    use super::Error;
    use super::tool::ToolError;

    #[derive(Debug)]
    pub enum ElementError {
        Vint {
            position: u64,
            source: ToolError,
        },
        RangeOverflow {
            position: u64,
            end: u64,
            limit: u64,
        },
        IdTooWide {
            position: u64,
            width: usize,
            max: usize,
        },
        SizeTooWide {
            position: u64,
            width: usize,
            max: usize,
        },
    }

    impl fmt::Display for ElementError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ElementError::Vint { position, source: _ } => write!(f, "Could not read element header at position {}.  See `source()` for details.", position),
                ElementError::RangeOverflow { position, end, limit } => write!(f, "Element at position {} ends at {}, beyond its parent's end at {}", position, end, limit),
                ElementError::IdTooWide { position, width, max } => write!(f, "Element at position {} has a {} byte id (maximum {})", position, width, max),
                ElementError::SizeTooWide { position, width, max } => write!(f, "Element at position {} has a {} byte size (maximum {})", position, width, max),
            }
        }
    }

    impl Error for ElementError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            match self {
                ElementError::Vint { position: _, source } => Some(source),
                _ => None,
            }
        }
    }
}

pub mod document {
    use super::fmt;
    use super::Error;
    use super::tool::ToolError;
    use std::{io, string};

    #[derive(Debug)]
    pub enum DocumentError {
        StaleHandle,
        RootElement,
        VoidElement,
        PopulationInProgress,
        SizeUnderflow {
            position: u64,
            size: u64,
            delta: u64,
        },
        Vint(ToolError),
        Utf8ParseError {
            source: string::FromUtf8Error,
        },
        ReadError {
            source: io::Error,
        },
        WriteError {
            source: io::Error,
        },
    }

    impl fmt::Display for DocumentError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                DocumentError::StaleHandle => write!(f, "Element handle no longer refers to an element of this document."),
                DocumentError::RootElement => write!(f, "Operation is not available on the document root."),
                DocumentError::VoidElement => write!(f, "Void elements cannot have children."),
                DocumentError::SizeUnderflow { position, size, delta } => write!(f, "Element at position {} has size {} and cannot shrink by {} bytes.", position, size, delta),
                DocumentError::PopulationInProgress => write!(f, "Element children were requested while they were being read."),
                DocumentError::Vint(err) => write!(f, "Problem encoding element header. {}", err),
                DocumentError::Utf8ParseError { source: _ } => write!(f, "Error parsing data as Utf8.  See `source()` for details."),
                DocumentError::ReadError { source: _ } => write!(f, "Error reading from source."),
                DocumentError::WriteError { source: _ } => write!(f, "Error writing to destination."),
            }
        }
    }

    impl Error for DocumentError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            match self {
                DocumentError::Vint(err) => Some(err),
                DocumentError::Utf8ParseError { source } => Some(source),
                DocumentError::ReadError { source } => Some(source),
                DocumentError::WriteError { source } => Some(source),
                _ => None,
            }
        }
    }

    impl From<ToolError> for DocumentError {
        fn from(err: ToolError) -> Self {
            DocumentError::Vint(err)
        }
    }
}

pub mod header {
    use super::fmt;
    use super::Error;
    use super::document::DocumentError;

    #[derive(Debug)]
    pub enum HeaderError {
        RootInvalid,
        MagicMismatch {
            found: Vec<u8>,
        },
        MissingHeader,
        MissingField {
            id: u64,
        },
        UnsupportedVersion {
            id: u64,
            version: u64,
        },
        WidthTooLarge {
            id: u64,
            width: u64,
        },
        ReadFailed {
            source: DocumentError,
        },
    }

    impl fmt::Display for HeaderError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                HeaderError::RootInvalid => write!(f, "Source could not be read."),
                HeaderError::MagicMismatch { found } => write!(f, "Source does not start with the EBML magic code. Found {:x?}", found),
                HeaderError::MissingHeader => write!(f, "Source has no EBML header element."),
                HeaderError::MissingField { id } => write!(f, "EBML header is missing required element {:#x}", id),
                HeaderError::UnsupportedVersion { id, version } => write!(f, "Unsupported version {} in EBML header element {:#x}", version, id),
                HeaderError::WidthTooLarge { id, width } => write!(f, "EBML header element {:#x} declares a width of {} bytes (maximum 8)", id, width),
                HeaderError::ReadFailed { source: _ } => write!(f, "Error reading EBML header.  See `source()` for details."),
            }
        }
    }

    impl Error for HeaderError {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            match self {
                HeaderError::ReadFailed { source } => Some(source),
                _ => None,
            }
        }
    }

    impl From<DocumentError> for HeaderError {
        fn from(source: DocumentError) -> Self {
            HeaderError::ReadFailed { source }
        }
    }
}
