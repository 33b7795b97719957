//! Coexistence with foreign tag systems.
//!
//! Other tools append or prepend their own tag blocks to MPEG-4 files: ID3v2 at the file head,
//! ID3v1 and APE at the tail. Each detected block is tracked as an independent zone, so that
//! rewriting the native metadata copies them through verbatim, and removing one of them keeps
//! every chunk offset valid.

use std::io::{Read, Seek, SeekFrom};

use crate::util::ReadUtil;

pub(crate) const ID3V2_ZONE: &str = "id3v2";
pub(crate) const ID3V1_ZONE: &str = "id3v1";
pub(crate) const APE_ZONE: &str = "ape";

const ID3V2_HEADER_LEN: u64 = 10;
const ID3V1_LEN: u64 = 128;
const APE_FOOTER_LEN: u64 = 32;

/// The tag systems a file may carry. MPEG-4 files natively only use the item list, the other
/// systems are tolerated when placed by foreign tools.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TagSystem {
    /// The container native item list (`ilst`) metadata.
    Native,
    /// An ID3v1 tag at the end of the file.
    Id3v1,
    /// An ID3v2 tag at the start of the file.
    Id3v2,
    /// An APEv2 tag at the end of the file.
    Ape,
}

/// A foreign tag block inside the file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Block {
    pub pos: u64,
    pub len: u64,
}

/// The foreign tag blocks found in a file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Siblings {
    pub id3v2: Option<Block>,
    pub id3v1: Option<Block>,
    pub ape: Option<Block>,
}

impl Siblings {
    /// The length of the blocks preceding the container data.
    pub fn head_len(&self) -> u64 {
        self.id3v2.map_or(0, |b| b.len)
    }

    /// The length of the blocks following the container data.
    pub fn tail_len(&self) -> u64 {
        self.id3v1.map_or(0, |b| b.len) + self.ape.map_or(0, |b| b.len)
    }
}

/// Scans the file head and tail for foreign tag blocks.
pub(crate) fn scan(reader: &mut (impl Read + Seek)) -> crate::Result<Siblings> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    let mut siblings = Siblings::default();

    if file_len >= ID3V2_HEADER_LEN {
        reader.seek(SeekFrom::Start(0))?;
        let header = reader.read_u8_vec(ID3V2_HEADER_LEN)?;

        if header.starts_with(b"ID3") {
            let size = synchsafe_u32(&header[6..10]);
            let footer = match header[5] & 0x10 != 0 {
                true => ID3V2_HEADER_LEN,
                false => 0,
            };
            let len = (ID3V2_HEADER_LEN + size as u64 + footer).min(file_len);
            siblings.id3v2 = Some(Block { pos: 0, len });
        }
    }

    let mut tail_end = file_len;
    if tail_end >= ID3V1_LEN {
        reader.seek(SeekFrom::Start(tail_end - ID3V1_LEN))?;
        let mut magic = [0; 3];
        reader.read_exact(&mut magic)?;

        if &magic == b"TAG" {
            siblings.id3v1 = Some(Block { pos: tail_end - ID3V1_LEN, len: ID3V1_LEN });
            tail_end -= ID3V1_LEN;
        }
    }

    if tail_end >= APE_FOOTER_LEN {
        reader.seek(SeekFrom::Start(tail_end - APE_FOOTER_LEN))?;
        let footer = reader.read_u8_vec(APE_FOOTER_LEN)?;

        if footer.starts_with(b"APETAGEX") {
            // the size includes the footer but not the optional header
            let size = u32::from_le_bytes(footer[12..16].try_into().unwrap()) as u64;
            let flags = u32::from_le_bytes(footer[20..24].try_into().unwrap());
            let has_header = flags & 0x8000_0000 != 0;
            let len = (size + if has_header { APE_FOOTER_LEN } else { 0 }).min(tail_end);
            siblings.ape = Some(Block { pos: tail_end - len, len });
        }
    }

    Ok(siblings)
}

/// Decodes a 28 bit synchsafe integer, 4 bytes of 7 bits each.
fn synchsafe_u32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0, |acc, b| (acc << 7) | (*b & 0x7F) as u32)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn id3v2_at_head() {
        let mut file = Vec::new();
        file.extend_from_slice(b"ID3\x04\x00\x00\x00\x00\x00\x0a");
        file.extend_from_slice(&[0; 10]); // tag content
        file.extend_from_slice(&[1; 40]); // container data

        let siblings = scan(&mut Cursor::new(file)).unwrap();
        assert_eq!(siblings.id3v2, Some(Block { pos: 0, len: 20 }));
        assert_eq!(siblings.head_len(), 20);
        assert_eq!(siblings.tail_len(), 0);
    }

    #[test]
    fn id3v1_and_ape_at_tail() {
        let mut file = vec![1; 64]; // container data

        let ape_items = [0u8; 16];
        let mut footer = Vec::new();
        footer.extend_from_slice(b"APETAGEX");
        footer.extend_from_slice(&2000u32.to_le_bytes());
        footer.extend_from_slice(&(ape_items.len() as u32 + 32).to_le_bytes());
        footer.extend_from_slice(&1u32.to_le_bytes());
        footer.extend_from_slice(&0u32.to_le_bytes());
        footer.extend_from_slice(&[0; 8]);
        file.extend_from_slice(&ape_items);
        file.extend_from_slice(&footer);

        let mut id3v1 = vec![0; ID3V1_LEN as usize];
        id3v1[..3].copy_from_slice(b"TAG");
        file.extend_from_slice(&id3v1);

        let siblings = scan(&mut Cursor::new(file)).unwrap();
        assert_eq!(siblings.id3v2, None);
        assert_eq!(siblings.id3v1, Some(Block { pos: 64 + 48, len: 128 }));
        assert_eq!(siblings.ape, Some(Block { pos: 64, len: 48 }));
        assert_eq!(siblings.tail_len(), 176);
    }

    #[test]
    fn plain_file() {
        let file = vec![0u8; 200];
        let siblings = scan(&mut Cursor::new(file)).unwrap();
        assert_eq!(siblings, Siblings::default());
    }
}
