use super::*;

/// The upper bound of sibling atoms scanned at one nesting level before a search is abandoned.
const MAX_SCANNED_ATOMS: u32 = 100;

/// A struct storing the size of an atom and whether it is extended.
///
/// 4 bytes standard length
/// 4 bytes identifier
/// 8 bytes optional extended length
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Size {
    /// Whether the head is of standard size (8 bytes) with a 32 bit length or extended (16
    /// bytes) with a 64 bit length.
    ext: bool,
    /// The length including this head.
    len: u64,
}

impl Size {
    pub const fn from(content_len: u64) -> Self {
        let mut len = content_len + 8;
        let ext = len > u32::MAX as u64;
        if ext {
            len += 8;
        }
        Self { ext, len }
    }

    pub const fn ext(&self) -> bool {
        self.ext
    }

    pub const fn len(&self) -> u64 {
        self.len
    }

    pub const fn head_len(&self) -> u64 {
        match self.ext {
            true => 16,
            false => 8,
        }
    }

    pub const fn content_len(&self) -> u64 {
        match self.ext {
            true => self.len - 16,
            false => self.len - 8,
        }
    }
}

/// A head specifying the size and type of an atom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Head {
    size: Size,
    /// The identifier.
    fourcc: Fourcc,
}

impl Deref for Head {
    type Target = Size;

    fn deref(&self) -> &Self::Target {
        &self.size
    }
}

impl Head {
    pub const NORMAL_SIZE: u64 = 8;

    pub const fn new(ext: bool, len: u64, fourcc: Fourcc) -> Self {
        Self { size: Size { ext, len }, fourcc }
    }

    pub const fn from(size: Size, fourcc: Fourcc) -> Self {
        Self { size, fourcc }
    }

    pub const fn size(&self) -> Size {
        self.size
    }

    pub const fn fourcc(&self) -> Fourcc {
        self.fourcc
    }
}

/// Attempts to parse the atom's head containing a 32 bit unsigned integer determining the size
/// of the atom in bytes and the following 4 byte identifier from the reader. If the 32 bit
/// length is set to 1 an extended 64 bit length is read. A length of 0 means the atom extends
/// to the end of the enclosing box, `remaining` bytes.
pub fn parse(reader: &mut impl Read, remaining: u64) -> crate::Result<Head> {
    let len = match reader.read_be_u32() {
        Ok(l) => l as u64,
        Err(e) => {
            return Err(crate::Error::new(ErrorKind::Io(e), "Error reading atom length"));
        }
    };
    let mut ident = Fourcc([0u8; 4]);
    if let Err(e) = reader.read_exact(&mut *ident) {
        return Err(crate::Error::new(ErrorKind::Io(e), "Error reading atom identifier"));
    }

    let head = if len == 1 {
        match reader.read_be_u64() {
            Ok(l) => Head::new(true, l, ident),
            Err(e) => {
                return Err(crate::Error::new(
                    ErrorKind::Io(e),
                    "Error reading extended atom length",
                ));
            }
        }
    } else if len == 0 {
        Head::new(false, remaining, ident)
    } else if len < 8 {
        return Err(crate::Error::new(
            crate::ErrorKind::Parsing,
            format!("Read length of '{ident}' which is less than 8 bytes: {len}"),
        ));
    } else {
        Head::new(false, len, ident)
    };

    if head.len() > remaining {
        return Err(crate::Error::new(
            crate::ErrorKind::Parsing,
            format!(
                "Atom '{}' with length {} exceeds the {} remaining bytes of its parent",
                head.fourcc(),
                head.len(),
                remaining,
            ),
        ));
    }

    Ok(head)
}

pub fn write(writer: &mut impl Write, head: Head) -> crate::Result<()> {
    if head.ext() {
        writer.write_be_u32(1)?;
        writer.write_all(&*head.fourcc)?;
        writer.write_be_u64(head.len())?;
    } else {
        writer.write_be_u32(head.len() as u32)?;
        writer.write_all(&*head.fourcc)?;
    }
    Ok(())
}

/// Attempts to parse a full atom head.
///
/// 1 byte version
/// 3 bytes flags
pub fn parse_full(reader: &mut impl Read) -> crate::Result<(u8, [u8; 3])> {
    let version = match reader.read_u8() {
        Ok(v) => v,
        Err(e) => {
            return Err(crate::Error::new(
                crate::ErrorKind::Io(e),
                "Error reading version of full atom head",
            ));
        }
    };

    let mut flags = [0u8; 3];
    if let Err(e) = reader.read_exact(&mut flags) {
        return Err(crate::Error::new(
            crate::ErrorKind::Io(e),
            "Error reading flags of full atom head",
        ));
    };

    Ok((version, flags))
}

pub fn write_full(writer: &mut impl Write, version: u8, flags: [u8; 3]) -> crate::Result<()> {
    writer.write_all(&[version])?;
    writer.write_all(&flags)?;
    Ok(())
}

/// Advances to the next atom with the matching identifier at the current nesting level.
///
/// Starting at the current position heads are parsed and non matching atoms are skipped, until
/// either a match is found and the reader is positioned at its first content byte, or the
/// `remaining` bytes of the enclosing box are exhausted. Scanning is bounded to prevent runaway
/// searches on corrupt input.
pub fn find(
    reader: &mut (impl Read + Seek),
    fourcc: Fourcc,
    mut remaining: u64,
) -> crate::Result<Option<Head>> {
    let mut scanned = 0;

    while remaining >= Head::NORMAL_SIZE && scanned < MAX_SCANNED_ATOMS {
        let head = parse(reader, remaining)?;

        if head.fourcc() == fourcc {
            return Ok(Some(head));
        }

        reader.skip(head.content_len() as i64)?;
        remaining -= head.len();
        scanned += 1;
    }

    Ok(None)
}

/// A struct storing the position and size of an atom.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AtomBounds {
    pos: u64,
    size: Size,
}

impl Deref for AtomBounds {
    type Target = Size;

    fn deref(&self) -> &Self::Target {
        &self.size
    }
}

impl AtomBounds {
    pub const fn pos(&self) -> u64 {
        self.pos
    }

    pub fn content_pos(&self) -> u64 {
        self.pos + self.head_len()
    }

    pub fn end(&self) -> u64 {
        self.pos + self.len()
    }

    /// Returns the position and width of the length field inside the atom's head.
    pub fn len_field(&self) -> (u64, Width) {
        match self.ext() {
            true => (self.pos + 8, Width::U64),
            false => (self.pos, Width::U32),
        }
    }
}

/// Determines the bounds of the atom whose content the reader is positioned at.
pub fn find_bounds(reader: &mut impl Seek, size: Size) -> crate::Result<AtomBounds> {
    let pos = reader.stream_position()? - size.head_len();
    Ok(AtomBounds { pos, size })
}

pub fn seek_to_end(reader: &mut impl Seek, bounds: &AtomBounds) -> crate::Result<()> {
    reader.seek(SeekFrom::Start(bounds.end()))?;
    Ok(())
}
