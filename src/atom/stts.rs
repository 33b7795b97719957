use super::*;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stts {
    pub items: Vec<SttsItem>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SttsItem {
    pub sample_count: u32,
    pub sample_duration: u32,
}

impl Atom for Stts {
    const FOURCC: Fourcc = SAMPLE_TABLE_TIME_TO_SAMPLE;
}

impl ParseAtom for Stts {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        _cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let (version, _) = head::parse_full(reader)?;

        if version != 0 {
            return Err(crate::Error::new(
                crate::ErrorKind::UnknownVersion(version),
                "Unknown sample table time to sample (stts) version",
            ));
        }

        let entries = reader.read_be_u32()?;
        if 8 + 8 * entries as u64 != size.content_len() {
            return Err(crate::Error::new(
                crate::ErrorKind::Parsing,
                "Sample table time to sample (stts) table size doesn't match atom length",
            ));
        }

        let mut items = Vec::with_capacity(entries as usize);
        for _ in 0..entries {
            items.push(SttsItem {
                sample_count: reader.read_be_u32()?,
                sample_duration: reader.read_be_u32()?,
            });
        }

        Ok(Self { items })
    }
}

impl Stts {
    /// Expands the run length encoded entries into a per sample duration list.
    pub fn sample_durations(&self) -> Vec<u32> {
        let num_samples = self.items.iter().map(|i| i.sample_count as usize).sum();
        let mut durations = Vec::with_capacity(num_samples);
        for i in self.items.iter() {
            durations.extend(std::iter::repeat(i.sample_duration).take(i.sample_count as usize));
        }
        durations
    }
}
