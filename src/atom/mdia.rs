use super::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mdia {
    pub mdhd: Option<Mdhd>,
    pub hdlr: Option<Hdlr>,
    pub minf: Option<Minf>,
}

impl Atom for Mdia {
    const FOURCC: Fourcc = MEDIA;
}

impl ParseAtom for Mdia {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let mut mdia = Self::default();
        let mut parsed_bytes = 0;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                MEDIA_HEADER => mdia.mdhd = Some(Mdhd::parse(reader, cfg, head.size())?),
                HANDLER_REFERENCE => mdia.hdlr = Some(Hdlr::parse(reader, cfg, head.size())?),
                MEDIA_INFORMATION => mdia.minf = Some(Minf::parse(reader, cfg, head.size())?),
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        Ok(mdia)
    }
}

#[derive(Default)]
pub struct MdiaBounds {
    #[allow(dead_code)]
    pub bounds: AtomBounds,
    pub minf: Option<MinfBounds>,
}

impl FindAtom for Mdia {
    type Bounds = MdiaBounds;

    fn find_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self::Bounds> {
        let bounds = find_bounds(reader, size)?;
        let mut mdia = MdiaBounds { bounds, ..Default::default() };
        let mut parsed_bytes = 0;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                MEDIA_INFORMATION => mdia.minf = Some(Minf::find(reader, head.size())?),
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        Ok(mdia)
    }
}
