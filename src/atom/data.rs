use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

use lazy_static::lazy_static;

use crate::{Img, ImgBuf, ImgFmt, ImgMut, ImgRef};

use super::*;

pub const HEADER_SIZE: u64 = 8;

// [Table 3-5 Well-known data types](https://developer.apple.com/documentation/quicktime-file-format/well-known_types) codes
/// Reserved for use where no type needs to be indicated.
const RESERVED: u32 = 0;
/// UTF-8 without any count or NULL terminator.
const UTF8: u32 = 1;
/// UTF-16 also known as UTF-16BE.
const UTF16: u32 = 2;
/// JPEG in a JFIF wrapper.
const JPEG: u32 = 13;
/// PNG in a PNG wrapper.
const PNG: u32 = 14;
/// A big-endian signed integer in 1,2,3 or 4 bytes.
const BE_SIGNED: u32 = 21;
/// Windows bitmap format graphics.
const BMP: u32 = 27;

lazy_static! {
    /// Unknown datatype codes observed during parsing. Only used to log each code once, the
    /// code itself travels with the parsed value so that writes are symmetric.
    static ref OBSERVED_UNKNOWN_TYPES: Mutex<HashSet<u32>> = Mutex::new(HashSet::new());
}

/// Different types of data defined by [Table 3-5 Well-known data types](https://developer.apple.com/documentation/quicktime-file-format/well-known_types).
#[derive(Clone, Eq, PartialEq)]
pub enum Data {
    /// Reserved for use where no type needs to be indicated.
    /// This is often used for track/disc numbers and standard genre codes.
    Reserved(Vec<u8>),
    /// A utf-8 encoded string.
    Utf8(String),
    /// A utf-16 encoded string.
    Utf16(String),
    /// A JPEG image. Note that this type is more of a hint and many encoders use any of the
    /// image formats for all kinds of image data.
    Jpeg(Vec<u8>),
    /// A PNG image. Note that this type is more of a hint and many encoders use any of the
    /// image formats for all kinds of image data.
    Png(Vec<u8>),
    /// A BMP image. Note that this type is more of a hint and many encoders use any of the
    /// image formats for all kinds of image data.
    Bmp(Vec<u8>),
    /// A big-endian signed integer.
    /// This is often used for flags and small integer values.
    BeSigned(Vec<u8>),
    /// A value containing an unknown data type code and data.
    Unknown {
        /// The data type code.
        code: u32,
        /// The data.
        data: Vec<u8>,
    },
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved(d) => write!(f, "Data::Reserved({d:?})"),
            Self::Utf8(d) => write!(f, "Data::Utf8({d:?})"),
            Self::Utf16(d) => write!(f, "Data::Utf16({d:?})"),
            Self::Jpeg(_) => write!(f, "Data::Jpeg"),
            Self::Png(_) => write!(f, "Data::Png"),
            Self::Bmp(_) => write!(f, "Data::Bmp"),
            Self::BeSigned(d) => write!(f, "Data::BeSigned({d:?})"),
            Self::Unknown { code, data } => {
                f.debug_struct("Data::Unknown").field("code", code).field("data", data).finish()
            }
        }
    }
}

impl<T: Into<Vec<u8>>> From<Img<T>> for Data {
    fn from(image: Img<T>) -> Self {
        match image.fmt {
            ImgFmt::Bmp => Self::Bmp(image.data.into()),
            ImgFmt::Jpeg => Self::Jpeg(image.data.into()),
            ImgFmt::Png => Self::Png(image.data.into()),
        }
    }
}

impl Data {
    /// Parses typed data based on the class byte of the data atom. Reserved picture data of the
    /// artwork (`covr`) item is sniffed from the image header bytes.
    pub fn parse(
        reader: &mut (impl Read + Seek),
        parent: Fourcc,
        cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let (version, [b2, b1, b0]) = head::parse_full(reader)?;
        if version != 0 {
            return Err(crate::Error::new(
                crate::ErrorKind::UnknownVersion(version),
                "Unknown data atom (data) version",
            ));
        }
        let datatype = u32::from_be_bytes([0, b2, b1, b0]);

        reader.skip(4)?; // locale indicator

        let len = size.content_len() - HEADER_SIZE;
        Ok(match datatype {
            RESERVED if parent == ARTWORK => {
                let data = read_image(reader, cfg.read_image_data, len)?;
                match ImgFmt::sniff(&data) {
                    Some(ImgFmt::Jpeg) => Data::Jpeg(data),
                    Some(ImgFmt::Png) => Data::Png(data),
                    Some(ImgFmt::Bmp) => Data::Bmp(data),
                    None => Data::Reserved(data),
                }
            }
            RESERVED => Data::Reserved(reader.read_u8_vec(len)?),
            UTF8 => Data::Utf8(reader.read_utf8(len)?),
            UTF16 => Data::Utf16(reader.read_be_utf16(len)?),
            JPEG => Data::Jpeg(read_image(reader, cfg.read_image_data, len)?),
            PNG => Data::Png(read_image(reader, cfg.read_image_data, len)?),
            BE_SIGNED => Data::BeSigned(reader.read_u8_vec(len)?),
            BMP => Data::Bmp(read_image(reader, cfg.read_image_data, len)?),
            _ => {
                if OBSERVED_UNKNOWN_TYPES.lock().map(|mut s| s.insert(datatype)).unwrap_or(false) {
                    log::warn!("unknown data atom type code {datatype} inside {parent}");
                }
                Data::Unknown { code: datatype, data: reader.read_u8_vec(len)? }
            }
        })
    }

    /// Attempts to write the typed data atom to the writer.
    pub fn write(&self, writer: &mut impl Write) -> crate::Result<()> {
        head::write(writer, Head::new(false, self.len(), DATA))?;

        let datatype = match self {
            Self::Reserved(_) => RESERVED,
            Self::Utf8(_) => UTF8,
            Self::Utf16(_) => UTF16,
            Self::Jpeg(_) => JPEG,
            Self::Png(_) => PNG,
            Self::Bmp(_) => BMP,
            Self::BeSigned(_) => BE_SIGNED,
            Self::Unknown { code, .. } => *code,
        };

        writer.write_be_u32(datatype)?;
        writer.write_all(&[0; 4])?; // locale indicator
        match self {
            Self::Reserved(v) => writer.write_all(v)?,
            Self::Utf8(s) => writer.write_utf8(s)?,
            Self::Utf16(s) => writer.write_be_utf16(s)?,
            Self::Jpeg(v) => writer.write_all(v)?,
            Self::Png(v) => writer.write_all(v)?,
            Self::Bmp(v) => writer.write_all(v)?,
            Self::BeSigned(v) => writer.write_all(v)?,
            Self::Unknown { data, .. } => writer.write_all(data)?,
        }

        Ok(())
    }

    /// Returns the external length of the data atom in bytes.
    pub fn len(&self) -> u64 {
        Head::NORMAL_SIZE + HEADER_SIZE + self.data_len()
    }
}

impl Data {
    /// Returns the length of the raw data (without version, datatype and locale header) in
    /// bytes.
    pub fn data_len(&self) -> u64 {
        (match self {
            Self::Reserved(v) => v.len(),
            Self::Utf8(s) => s.len(),
            Self::Utf16(s) => 2 * s.encode_utf16().count(),
            Self::Jpeg(v) => v.len(),
            Self::Png(v) => v.len(),
            Self::Bmp(v) => v.len(),
            Self::BeSigned(v) => v.len(),
            Self::Unknown { data, .. } => data.len(),
        }) as u64
    }

    /// Returns true if the data is of length 0, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.data_len() == 0
    }

    /// Returns true if the data is of type [`Data::Jpeg`], [`Data::Png`] or [`Data::Bmp`].
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::Jpeg(_) | Self::Png(_) | Self::Bmp(_))
    }

    /// Returns a byte reference if the data is of type [`Data::Reserved`] or
    /// [`Data::BeSigned`].
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Reserved(v) => Some(v),
            Self::BeSigned(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a mutable byte reference if the data is of type [`Data::Reserved`] or
    /// [`Data::BeSigned`].
    pub fn bytes_mut(&mut self) -> Option<&mut Vec<u8>> {
        match self {
            Self::Reserved(v) => Some(v),
            Self::BeSigned(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the owned bytes if the data is of type [`Data::Reserved`] or [`Data::BeSigned`].
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Reserved(v) => Some(v),
            Self::BeSigned(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a string reference if the data is of type [`Data::Utf8`] or [`Data::Utf16`].
    pub fn string(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            Self::Utf16(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns a mutable string reference if the data is of type [`Data::Utf8`] or
    /// [`Data::Utf16`].
    pub fn string_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Utf8(s) => Some(s),
            Self::Utf16(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the owned string if the data is of type [`Data::Utf8`] or [`Data::Utf16`].
    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Utf8(s) => Some(s),
            Self::Utf16(s) => Some(s),
            _ => None,
        }
    }

    /// Returns an image reference if the data is of type [`Data::Jpeg`], [`Data::Png`] or
    /// [`Data::Bmp`].
    pub fn image(&self) -> Option<ImgRef<'_>> {
        match self {
            Self::Jpeg(v) => Some(Img::jpeg(v)),
            Self::Png(v) => Some(Img::png(v)),
            Self::Bmp(v) => Some(Img::bmp(v)),
            _ => None,
        }
    }

    /// Returns a mutable image reference if the data is of type [`Data::Jpeg`], [`Data::Png`]
    /// or [`Data::Bmp`].
    pub fn image_mut(&mut self) -> Option<ImgMut<'_>> {
        match self {
            Self::Jpeg(v) => Some(Img::jpeg(v)),
            Self::Png(v) => Some(Img::png(v)),
            Self::Bmp(v) => Some(Img::bmp(v)),
            _ => None,
        }
    }

    /// Returns the owned image if the data is of type [`Data::Jpeg`], [`Data::Png`] or
    /// [`Data::Bmp`].
    pub fn into_image(self) -> Option<ImgBuf> {
        match self {
            Self::Jpeg(v) => Some(Img::jpeg(v)),
            Self::Png(v) => Some(Img::png(v)),
            Self::Bmp(v) => Some(Img::bmp(v)),
            _ => None,
        }
    }
}

fn read_image(reader: &mut (impl Read + Seek), parse: bool, len: u64) -> crate::Result<Vec<u8>> {
    if parse {
        Ok(reader.read_u8_vec(len)?)
    } else {
        reader.skip(len as i64)?;
        Ok(Vec::new())
    }
}
