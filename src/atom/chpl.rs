use crate::util::{scale_duration, unscale_duration};
use crate::Chapter;

use super::*;

/// Nero chapter start times are stored in units of 100 nanoseconds.
const TIMESCALE: u32 = 10_000_000;

/// 1 byte version, 3 bytes flags, 1 byte reserved, 4 bytes chapter count.
pub const HEADER_SIZE: u64 = 9;
/// 8 bytes start time, 1 byte title length.
pub const ITEM_HEADER_SIZE: u64 = 9;

/// A struct representing a Nero style chapter list atom (`chpl`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Chpl {
    pub chapters: Vec<Chapter>,
}

impl Atom for Chpl {
    const FOURCC: Fourcc = CHAPTER_LIST;
}

impl ParseAtom for Chpl {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        _cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let (version, _) = head::parse_full(reader)?;
        if version > 1 {
            return Err(crate::Error::new(
                crate::ErrorKind::UnknownVersion(version),
                "Unknown chapter list (chpl) version",
            ));
        }

        reader.skip(1)?; // reserved
        let num_entries = reader.read_be_u32()?;
        let mut parsed_bytes = HEADER_SIZE;

        let mut chapters = Vec::with_capacity(num_entries as usize);
        while parsed_bytes < size.content_len() {
            let start = reader.read_be_u64()?;

            let str_len = reader.read_u8()?;
            let title = reader.read_utf8(str_len as u64)?;

            chapters.push(Chapter { start: scale_duration(TIMESCALE, start), title });

            parsed_bytes += ITEM_HEADER_SIZE + str_len as u64;
        }

        Ok(Self { chapters })
    }
}

impl WriteAtom for Chpl {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        head::write_full(writer, 1, [0; 3])?;

        writer.write_u8(0)?; // reserved
        writer.write_be_u32(self.chapters.len() as u32)?;
        for c in self.chapters.iter() {
            writer.write_be_u64(unscale_duration(TIMESCALE, c.start))?;

            let title_len = truncated_title_len(&c.title);
            writer.write_u8(title_len as u8)?;
            writer.write_utf8(&c.title[..title_len])?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let data_len = self
            .chapters
            .iter()
            .map(|c| ITEM_HEADER_SIZE + truncated_title_len(&c.title) as u64)
            .sum::<u64>();
        Size::from(HEADER_SIZE + data_len)
    }
}

pub struct ChplBounds {
    pub bounds: AtomBounds,
}

impl Deref for ChplBounds {
    type Target = AtomBounds;

    fn deref(&self) -> &Self::Target {
        &self.bounds
    }
}

impl FindAtom for Chpl {
    type Bounds = ChplBounds;

    fn find_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self::Bounds> {
        let bounds = find_bounds(reader, size)?;
        seek_to_end(reader, &bounds)?;
        Ok(Self::Bounds { bounds })
    }
}

impl Chpl {
    pub fn new(chapters: Vec<Chapter>) -> Self {
        Self { chapters }
    }
}

/// Returns the length in bytes of the title clamped to 255 bytes, respecting char boundaries.
fn truncated_title_len(title: &str) -> usize {
    if title.len() <= u8::MAX as usize {
        return title.len();
    }

    let mut len = u8::MAX as usize;
    while !title.is_char_boundary(len) {
        len -= 1;
    }
    len
}
