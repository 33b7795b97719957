use std::{error, fmt, io, string};

use crate::atom::Fourcc;

/// Type alias for the result of metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of errors that may occur while performing metadata operations.
#[derive(Debug)]
pub enum ErrorKind {
    /// An error kind indicating that an atom could not be found. Contains the atom's identifier.
    AtomNotFound(Fourcc),
    /// An error kind indicating that a descriptor could not be found. Contains the descriptor's
    /// tag.
    DescriptorNotFound(u8),
    /// An error kind indicating that an IO error has occurred. Contains the original `io::Error`.
    Io(io::Error),
    /// An error kind indicating that the file does not start with an MPEG-4 filetype atom.
    NoFtyp,
    /// An error kind indicating that the reader does not contain a tag.
    NoTag,
    /// An error kind indicating that an error occurred during parsing.
    Parsing,
    /// An error kind indicating that a value does not fit the integer field it has to be stored
    /// in. Contains the value.
    SizeOverflow(u64),
    /// An error kind indicating that the metadata handler is of an unsupported kind. Contains the
    /// handler type.
    UnsupportedMetaHandler(Fourcc),
    /// An error kind indicating that the `data` atom contains an unknown datatype. Contains the
    /// datatype code.
    UnknownDataType(u32),
    /// An error kind indicating an unknown atom version. Contains the version.
    UnknownVersion(u8),
    /// An error kind indicating an unknown media type code. Contains the media type code.
    UnknownMediaType(u8),
    /// An error kind indicating that a string decoding error has occurred. Contains the original
    /// error.
    Utf8StringDecoding(string::FromUtf8Error),
    /// An error kind indicating that a string decoding error has occurred.
    Utf16StringDecoding(string::FromUtf16Error),
}

/// A structure able to represent any error that may occur while performing metadata operations.
pub struct Error {
    /// The kind of error.
    pub kind: ErrorKind,
    /// A human readable string describing the error.
    pub description: String,
}

impl Error {
    /// Creates a new `Error` using the error kind and description.
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self { kind, description: description.into() }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(err) => Some(err),
            ErrorKind::Utf8StringDecoding(err) => Some(err),
            ErrorKind::Utf16StringDecoding(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self { kind: ErrorKind::Io(err), description: String::new() }
    }
}

impl From<string::FromUtf8Error> for Error {
    fn from(err: string::FromUtf8Error) -> Self {
        Self {
            kind: ErrorKind::Utf8StringDecoding(err),
            description: "Data is not valid utf-8".to_owned(),
        }
    }
}

impl From<string::FromUtf16Error> for Error {
    fn from(err: string::FromUtf16Error) -> Self {
        Self {
            kind: ErrorKind::Utf16StringDecoding(err),
            description: "Data is not valid utf-16".to_owned(),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{:?}: {}", self.kind, self.description)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            write!(f, "{}", self.description)
        }
    }
}
