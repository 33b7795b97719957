use super::*;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tkhd {
    pub id: u32,
}

impl Atom for Tkhd {
    const FOURCC: Fourcc = TRACK_HEADER;
}

impl ParseAtom for Tkhd {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        _cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let bounds = find_bounds(reader, size)?;
        let mut tkhd = Self::default();

        let (version, _) = head::parse_full(reader)?;
        match version {
            0 => {
                reader.skip(8)?; // creation and modification time
                tkhd.id = reader.read_be_u32()?;
            }
            1 => {
                reader.skip(16)?; // creation and modification time
                tkhd.id = reader.read_be_u32()?;
            }
            v => {
                return Err(crate::Error::new(
                    crate::ErrorKind::UnknownVersion(version),
                    format!("Unknown track header (tkhd) version {v}"),
                ));
            }
        }

        seek_to_end(reader, &bounds)?;

        Ok(tkhd)
    }
}
