use super::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Meta {
    pub hdlr: Option<Hdlr>,
    pub ilst: Option<Ilst<'static>>,
}

impl Atom for Meta {
    const FOURCC: Fourcc = METADATA;
}

impl ParseAtom for Meta {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let (version, _) = head::parse_full(reader)?;

        if version != 0 {
            return Err(crate::Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown metadata (meta) version",
            ));
        }

        let mut meta = Self::default();
        let mut parsed_bytes = 4;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                HANDLER_REFERENCE => meta.hdlr = Some(Hdlr::parse(reader, cfg, head.size())?),
                ITEM_LIST => meta.ilst = Some(Ilst::parse(reader, cfg, head.size())?),
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        meta.check_handler()?;

        Ok(meta)
    }
}

impl Meta {
    /// Item lists are only interpreted when the handler is an iTunes style metadata handler,
    /// other handlers like `mp7t` or `mp7b` are rejected.
    pub fn check_handler(&self) -> crate::Result<()> {
        check_meta_handler_type(self.hdlr.as_ref().and_then(|h| h.handler_type()))
    }
}

pub fn check_meta_handler_type(handler_type: Option<Fourcc>) -> crate::Result<()> {
    match handler_type {
        None | Some(APPLE_METADATA) => Ok(()),
        Some(other) => Err(crate::Error::new(
            ErrorKind::UnsupportedMetaHandler(other),
            format!("Unsupported metadata handler type {other}"),
        )),
    }
}

#[derive(Default)]
pub struct MetaBounds {
    pub bounds: AtomBounds,
    pub hdlr: Option<HdlrBounds>,
    pub ilst: Option<IlstBounds>,
}

impl Deref for MetaBounds {
    type Target = AtomBounds;

    fn deref(&self) -> &Self::Target {
        &self.bounds
    }
}

impl FindAtom for Meta {
    type Bounds = MetaBounds;

    fn find_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self::Bounds> {
        let bounds = find_bounds(reader, size)?;
        head::parse_full(reader)?;

        let mut meta = MetaBounds { bounds, ..Default::default() };
        let mut parsed_bytes = 4;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                HANDLER_REFERENCE => meta.hdlr = Some(Hdlr::find(reader, head.size())?),
                ITEM_LIST => meta.ilst = Some(Ilst::find(reader, head.size())?),
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        check_meta_handler_type(meta.hdlr.as_ref().map(|h| h.handler_type))?;

        Ok(meta)
    }
}
