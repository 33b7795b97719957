use super::*;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stsz {
    pub sample_size: u32,
    pub sizes: Vec<u32>,
}

impl Atom for Stsz {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_SIZE;
}

impl ParseAtom for Stsz {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        _cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let (version, _) = head::parse_full(reader)?;

        if version != 0 {
            return Err(crate::Error::new(
                crate::ErrorKind::UnknownVersion(version),
                "Unknown sample table sample size (stsz) version",
            ));
        }

        let sample_size = reader.read_be_u32()?;
        let entries = reader.read_be_u32()?;

        let sizes = if sample_size == 0 {
            let table_size = 12 + 4 * entries as u64;
            if table_size != size.content_len() {
                return Err(crate::Error::new(
                    crate::ErrorKind::Parsing,
                    format!(
                        "Sample table sample size (stsz) table size {} doesn't match atom content length {}",
                        table_size,
                        size.content_len(),
                    ),
                ));
            }

            let mut sizes = Vec::with_capacity(entries as usize);
            for _ in 0..entries {
                sizes.push(reader.read_be_u32()?);
            }
            sizes
        } else {
            if size.content_len() != 12 {
                return Err(crate::Error::new(
                    crate::ErrorKind::Parsing,
                    format!(
                        "Sample table sample size (stsz) uniform sample size set, but content length {} doesn't match",
                        size.content_len(),
                    ),
                ));
            }

            Vec::new()
        };

        Ok(Self { sample_size, sizes })
    }
}

impl Stsz {
    /// Returns the size of the sample at the 0 based index.
    pub fn size_of(&self, sample: usize) -> Option<u32> {
        if self.sample_size != 0 {
            return Some(self.sample_size);
        }
        self.sizes.get(sample).copied()
    }

    /// Returns whether the sample sizes vary by more than 1%, indicating variable bitrate
    /// encoding.
    pub fn is_vbr(&self) -> bool {
        if self.sample_size != 0 || self.sizes.is_empty() {
            return false;
        }

        let min = *self.sizes.iter().min().unwrap();
        let max = *self.sizes.iter().max().unwrap();
        (max - min) as u64 * 100 > max as u64
    }
}
