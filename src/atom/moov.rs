use super::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Moov {
    pub mvhd: Option<Mvhd>,
    pub trak: Vec<Trak>,
    pub udta: Option<Udta>,
}

impl Atom for Moov {
    const FOURCC: Fourcc = MOVIE;
}

impl ParseAtom for Moov {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let mut moov = Self::default();
        let mut parsed_bytes = 0;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                MOVIE_HEADER => moov.mvhd = Some(Mvhd::parse(reader, cfg, head.size())?),
                TRACK => moov.trak.push(Trak::parse(reader, cfg, head.size())?),
                USER_DATA => moov.udta = Some(Udta::parse(reader, cfg, head.size())?),
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        Ok(moov)
    }
}

impl Moov {
    /// Returns the track referenced by the first chapter (`tref/chap`) entry of any track,
    /// the chapter title track.
    pub fn chapter_track(&self) -> Option<&Trak> {
        let chap = self.trak.iter().find_map(|t| t.tref.as_ref()?.chap.as_ref())?;

        chap.chapter_ids.iter().find_map(|id| {
            self.trak
                .iter()
                .find(|t| t.tkhd.as_ref().map(|h| h.id) == Some(*id))
                .filter(|t| t.media_handler_type() == Some(TEXT_MEDIA))
        })
    }
}

#[derive(Default)]
pub struct MoovBounds {
    pub bounds: AtomBounds,
    pub trak: Vec<TrakBounds>,
    pub udta: Option<UdtaBounds>,
}

impl Deref for MoovBounds {
    type Target = AtomBounds;

    fn deref(&self) -> &Self::Target {
        &self.bounds
    }
}

impl FindAtom for Moov {
    type Bounds = MoovBounds;

    fn find_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self::Bounds> {
        let bounds = find_bounds(reader, size)?;
        let mut moov = MoovBounds { bounds, ..Default::default() };
        let mut parsed_bytes = 0;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                TRACK => moov.trak.push(Trak::find(reader, head.size())?),
                USER_DATA => moov.udta = Some(Udta::find(reader, head.size())?),
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        Ok(moov)
    }
}
