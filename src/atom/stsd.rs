use super::*;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stsd {
    pub audio: Option<Audio>,
}

impl Atom for Stsd {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_DESCRIPTION;
}

impl ParseAtom for Stsd {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        _cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let (version, _) = head::parse_full(reader)?;

        if version != 0 {
            return Err(crate::Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown sample table sample description (stsd) version",
            ));
        }

        reader.skip(4)?; // number of entries

        let mut stsd = Self::default();
        let mut parsed_bytes = 8;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                MPEG4_AUDIO | ENCRYPTED_AUDIO | APPLE_LOSSLESS | AMR_NARROWBAND
                | AMR_WIDEBAND => {
                    stsd.audio = Some(Audio::parse(reader, head.fourcc(), head.size())?);
                }
                _ => reader.skip(head.content_len() as i64)?,
            }

            parsed_bytes += head.len();
        }

        Ok(stsd)
    }
}
