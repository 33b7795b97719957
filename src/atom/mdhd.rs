use super::*;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mdhd {
    pub timescale: u32,
    /// The duration in timescale units.
    pub duration: u64,
}

impl Atom for Mdhd {
    const FOURCC: Fourcc = MEDIA_HEADER;
}

impl ParseAtom for Mdhd {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        _cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let bounds = find_bounds(reader, size)?;
        let mut mdhd = Self::default();

        let (version, _) = head::parse_full(reader)?;
        match version {
            0 => {
                reader.skip(8)?; // creation and modification time
                mdhd.timescale = reader.read_be_u32()?;
                mdhd.duration = reader.read_be_u32()? as u64;
            }
            1 => {
                reader.skip(16)?; // creation and modification time
                mdhd.timescale = reader.read_be_u32()?;
                mdhd.duration = reader.read_be_u64()?;
            }
            v => {
                return Err(crate::Error::new(
                    crate::ErrorKind::UnknownVersion(version),
                    format!("Unknown media header (mdhd) version {v}"),
                ));
            }
        }

        seek_to_end(reader, &bounds)?;

        Ok(mdhd)
    }
}
