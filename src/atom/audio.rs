//! Audio sample description entry
//!
//! ```md
//! 6 bytes reserved
//! 2 bytes data reference index
//! 2 bytes version
//! 2 bytes revision level
//! 4 bytes vendor
//! 2 bytes channel count
//! 2 bytes sample size
//! 2 bytes compression id
//! 2 bytes packet size
//! 4 bytes sample rate (16.16 fixed point)
//! │
//! └─ esds atom (mp4a)
//! ```
use crate::{ChannelConfig, Codec};

use super::*;

/// Es descriptor tag
const ELEMENTARY_STREAM_DESCRIPTOR: u8 = 0x03;
/// Decoder config descriptor tag
const DECODER_CONFIG_DESCRIPTOR: u8 = 0x04;

/// The decoded physical parameters of an audio sample description entry (`mp4a`, `enca`,
/// `alac`, `samr`, `sawb`).
#[derive(Clone, Debug, PartialEq)]
pub struct Audio {
    pub codec: Codec,
    pub channel_config: ChannelConfig,
    pub sample_rate: u32,
    pub max_bitrate: Option<u32>,
    pub avg_bitrate: Option<u32>,
}

impl Audio {
    /// Parses an audio sample description entry. The reader is positioned at the first content
    /// byte, the head has already been consumed.
    pub fn parse(
        reader: &mut (impl Read + Seek),
        fourcc: Fourcc,
        size: Size,
    ) -> crate::Result<Self> {
        let bounds = find_bounds(reader, size)?;

        reader.skip(16)?; // reserved fields up to the channel count
        let channels = reader.read_be_u16()?;
        reader.skip(6)?; // sample size, compression id, packet size
        let sample_rate = reader.read_be_u32()? >> 16;

        let codec = match fourcc {
            MPEG4_AUDIO => Codec::Aac,
            ENCRYPTED_AUDIO => Codec::EncryptedAac,
            APPLE_LOSSLESS => Codec::Alac,
            AMR_NARROWBAND => Codec::AmrNb,
            AMR_WIDEBAND => Codec::AmrWb,
            other => Codec::Unknown(other),
        };

        let mut audio = Self {
            codec,
            channel_config: ChannelConfig::from(channels),
            sample_rate,
            max_bitrate: None,
            avg_bitrate: None,
        };

        if fourcc == MPEG4_AUDIO && size.content_len() > 28 + Head::NORMAL_SIZE {
            let esds = head::find(reader, ELEMENTARY_STREAM_DESCRIPTION, size.content_len() - 28)?;
            if let Some(head) = esds {
                parse_esds(reader, &mut audio, head.size())?;
            }
        }

        seek_to_end(reader, &bounds)?;

        Ok(audio)
    }
}

/// esds atom
///
/// ```md
/// 4 bytes len
/// 4 bytes ident
/// 1 byte version
/// 3 bytes flags
/// │
/// └──elementary stream descriptor
///    │
///    └──decoder config descriptor
/// ```
fn parse_esds(reader: &mut (impl Read + Seek), info: &mut Audio, size: Size) -> crate::Result<()> {
    let (version, _) = head::parse_full(reader)?;

    if version != 0 {
        return Err(crate::Error::new(
            crate::ErrorKind::UnknownVersion(version),
            "Unknown elementary stream description (esds) version",
        ));
    }

    let (tag, head_len, desc_len) = parse_desc_head(reader)?;
    if tag != ELEMENTARY_STREAM_DESCRIPTOR {
        return Err(crate::Error::new(
            crate::ErrorKind::DescriptorNotFound(ELEMENTARY_STREAM_DESCRIPTOR),
            "Missing elementary stream descriptor",
        ));
    }

    let Some(max_len) = size.content_len().checked_sub(4 + head_len) else {
        return Err(crate::Error::new(
            crate::ErrorKind::Parsing,
            "Elementary stream descriptor head exceeds the esds atom",
        ));
    };
    parse_es_desc(reader, info, desc_len.min(max_len))?;

    Ok(())
}

/// elementary stream descriptor
///
/// ```md
/// 1 byte tag (0x03)
/// 1~4 bytes len
/// 2 bytes id
/// 1 byte flag
/// │
/// └──decoder config descriptor
/// ```
fn parse_es_desc(reader: &mut (impl Read + Seek), info: &mut Audio, len: u64) -> crate::Result<()> {
    reader.skip(3)?;

    let mut parsed_bytes = 3;
    while parsed_bytes < len {
        let (tag, head_len, desc_len) = parse_desc_head(reader)?;

        match tag {
            DECODER_CONFIG_DESCRIPTOR => parse_dc_desc(reader, info, desc_len)?,
            _ => reader.skip(desc_len as i64)?,
        }

        parsed_bytes += head_len + desc_len;
    }

    Ok(())
}

/// decoder config descriptor
///
/// ```md
/// 1 byte tag (0x04)
/// 1~4 bytes len
/// 1 byte object type indication
/// 1 byte stream type
/// 3 bytes buffer size
/// 4 bytes maximum bitrate
/// 4 bytes average bitrate
/// ```
fn parse_dc_desc(reader: &mut (impl Read + Seek), info: &mut Audio, len: u64) -> crate::Result<()> {
    if len < 13 {
        return Err(crate::Error::new(
            crate::ErrorKind::Parsing,
            format!("Decoder config descriptor with length {len} is too short"),
        ));
    }

    reader.skip(5)?;
    let max_bitrate = reader.read_be_u32()?;
    let avg_bitrate = reader.read_be_u32()?;

    if max_bitrate != 0 {
        info.max_bitrate = Some(max_bitrate);
    }
    if avg_bitrate != 0 {
        info.avg_bitrate = Some(avg_bitrate);
    }

    reader.skip((len - 13) as i64)?;
    Ok(())
}

fn parse_desc_head(reader: &mut impl Read) -> crate::Result<(u8, u64, u64)> {
    let tag = reader.read_u8()?;

    let mut head_len = 1;
    let mut len = 0;
    while head_len < 5 {
        let b = reader.read_u8()?;
        len = (len << 7) | (b & 0x7F) as u64;
        head_len += 1;
        if b & 0x80 == 0 {
            break;
        }
    }

    Ok((tag, head_len, len))
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn truncated_decoder_config_descriptor() {
        let mut esds = vec![0; 4]; // version and flags
        esds.extend_from_slice(&[0x03, 8, 0, 0, 0]); // elementary stream descriptor
        esds.extend_from_slice(&[0x04, 5, 0, 0, 0, 0, 0]); // truncated decoder config

        let mut content = vec![0; 28];
        content.extend_from_slice(&(esds.len() as u32 + 8).to_be_bytes());
        content.extend_from_slice(b"esds");
        content.extend_from_slice(&esds);

        let mut entry = (content.len() as u32 + 8).to_be_bytes().to_vec();
        entry.extend_from_slice(b"mp4a");
        entry.extend_from_slice(&content);

        let len = entry.len() as u64;
        let mut reader = Cursor::new(entry);
        let head = head::parse(&mut reader, len).unwrap();

        let err = Audio::parse(&mut reader, head.fourcc(), head.size()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Parsing));
    }
}
