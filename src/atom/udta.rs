use super::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Udta {
    pub chpl: Option<Chpl>,
    pub meta: Option<Meta>,
}

impl Atom for Udta {
    const FOURCC: Fourcc = USER_DATA;
}

impl ParseAtom for Udta {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let mut udta = Self::default();
        let mut parsed_bytes = 0;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                CHAPTER_LIST if cfg.read_chapters => {
                    udta.chpl = Some(Chpl::parse(reader, cfg, head.size())?)
                }
                METADATA => udta.meta = Some(Meta::parse(reader, cfg, head.size())?),
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        Ok(udta)
    }
}

#[derive(Default)]
pub struct UdtaBounds {
    pub bounds: AtomBounds,
    pub chpl: Option<ChplBounds>,
    pub meta: Option<MetaBounds>,
}

impl Deref for UdtaBounds {
    type Target = AtomBounds;

    fn deref(&self) -> &Self::Target {
        &self.bounds
    }
}

impl FindAtom for Udta {
    type Bounds = UdtaBounds;

    fn find_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self::Bounds> {
        let bounds = find_bounds(reader, size)?;
        let mut udta = UdtaBounds { bounds, ..Default::default() };
        let mut parsed_bytes = 0;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                CHAPTER_LIST => udta.chpl = Some(Chpl::find(reader, head.size())?),
                METADATA => udta.meta = Some(Meta::find(reader, head.size())?),
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        Ok(udta)
    }
}
