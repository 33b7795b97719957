use super::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stbl {
    pub stsd: Option<Stsd>,
    pub stts: Option<Stts>,
    pub stsc: Option<Stsc>,
    pub stsz: Option<Stsz>,
    pub stco: Option<Stco>,
    pub co64: Option<Co64>,
}

impl Atom for Stbl {
    const FOURCC: Fourcc = SAMPLE_TABLE;
}

impl ParseAtom for Stbl {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let mut stbl = Self::default();
        let mut parsed_bytes = 0;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                SAMPLE_TABLE_SAMPLE_DESCRIPTION => {
                    stbl.stsd = Some(Stsd::parse(reader, cfg, head.size())?)
                }
                SAMPLE_TABLE_TIME_TO_SAMPLE => {
                    stbl.stts = Some(Stts::parse(reader, cfg, head.size())?)
                }
                SAMPLE_TABLE_SAMPLE_TO_CHUNK => {
                    stbl.stsc = Some(Stsc::parse(reader, cfg, head.size())?)
                }
                SAMPLE_TABLE_SAMPLE_SIZE => {
                    stbl.stsz = Some(Stsz::parse(reader, cfg, head.size())?)
                }
                SAMPLE_TABLE_CHUNK_OFFSET => {
                    stbl.stco = Some(Stco::parse(reader, cfg, head.size())?)
                }
                SAMPLE_TABLE_CHUNK_OFFSET_64 => {
                    stbl.co64 = Some(Co64::parse(reader, cfg, head.size())?)
                }
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        Ok(stbl)
    }
}

impl Stbl {
    /// Returns the absolute file offset of the chunk at the 0 based index.
    pub fn chunk_offset(&self, chunk: usize) -> Option<u64> {
        if let Some(stco) = &self.stco {
            return stco.offsets.get(chunk).map(|o| *o as u64);
        }
        self.co64.as_ref().and_then(|c| c.offsets.get(chunk).copied())
    }
}

#[derive(Default)]
pub struct StblBounds {
    #[allow(dead_code)]
    pub bounds: AtomBounds,
    pub stco: Option<StcoBounds>,
    pub co64: Option<Co64Bounds>,
}

impl FindAtom for Stbl {
    type Bounds = StblBounds;

    fn find_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self::Bounds> {
        let bounds = find_bounds(reader, size)?;
        let mut stbl = StblBounds { bounds, ..Default::default() };
        let mut parsed_bytes = 0;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                SAMPLE_TABLE_CHUNK_OFFSET => stbl.stco = Some(Stco::find(reader, head.size())?),
                SAMPLE_TABLE_CHUNK_OFFSET_64 => {
                    stbl.co64 = Some(Co64::find(reader, head.size())?)
                }
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        Ok(stbl)
    }
}
