use super::*;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hdlr {
    pub data: Vec<u8>,
}

impl Deref for Hdlr {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl Atom for Hdlr {
    const FOURCC: Fourcc = HANDLER_REFERENCE;
}

impl ParseAtom for Hdlr {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        _cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        Ok(Self { data: reader.read_u8_vec(size.content_len())? })
    }
}

impl WriteAtom for Hdlr {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        writer.write_all(self)?;
        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(self.data.len() as u64)
    }
}

pub struct HdlrBounds {
    pub bounds: AtomBounds,
    pub handler_type: Fourcc,
}

impl Deref for HdlrBounds {
    type Target = AtomBounds;

    fn deref(&self) -> &Self::Target {
        &self.bounds
    }
}

impl FindAtom for Hdlr {
    type Bounds = HdlrBounds;

    fn find_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self::Bounds> {
        let bounds = find_bounds(reader, size)?;
        let handler_type = parse_handler_type(reader, size)?;
        seek_to_end(reader, &bounds)?;
        Ok(Self::Bounds { bounds, handler_type })
    }
}

impl Hdlr {
    /// The component subtype of the handler.
    pub fn handler_type(&self) -> Option<Fourcc> {
        self.data.get(8..12).map(|b| Fourcc(b.try_into().unwrap()))
    }

    /// Creates the handler reference atom of an iTunes style metadata (`meta`) atom.
    pub fn meta() -> Self {
        Self {
            data: vec![
                0x00, 0x00, 0x00, 0x00, // version + flags
                0x00, 0x00, 0x00, 0x00, // component type
                0x6d, 0x64, 0x69, 0x72, // component subtype
                0x61, 0x70, 0x70, 0x6c, // component manufacturer
                0x00, 0x00, 0x00, 0x00, // component flags
                0x00, 0x00, 0x00, 0x00, // component flags mask
                0x00, // component name
            ],
        }
    }
}

/// Reads the component subtype out of a handler atom's content.
pub fn parse_handler_type(
    reader: &mut (impl Read + Seek),
    size: Size,
) -> crate::Result<Fourcc> {
    if size.content_len() < 12 {
        return Err(crate::Error::new(
            ErrorKind::Parsing,
            "Handler reference (hdlr) atom is too short",
        ));
    }

    reader.skip(8)?; // version + flags, component type
    let mut handler_type = Fourcc([0; 4]);
    reader.read_exact(&mut *handler_type)?;

    Ok(handler_type)
}
