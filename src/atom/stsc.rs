use super::*;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stsc {
    pub items: Vec<StscItem>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StscItem {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_id: u32,
}

impl Atom for Stsc {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_TO_CHUNK;
}

impl ParseAtom for Stsc {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        _cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let (version, _) = head::parse_full(reader)?;

        if version != 0 {
            return Err(crate::Error::new(
                crate::ErrorKind::UnknownVersion(version),
                "Unknown sample table sample to chunk (stsc) version",
            ));
        }

        let entries = reader.read_be_u32()?;
        let table_size = 8 + 12 * entries as u64;
        if table_size != size.content_len() {
            return Err(crate::Error::new(
                crate::ErrorKind::Parsing,
                format!(
                    "Sample table sample to chunk (stsc) table size {} doesn't match atom content length {}",
                    table_size,
                    size.content_len(),
                ),
            ));
        }

        let mut items = Vec::with_capacity(entries as usize);
        for _ in 0..entries {
            items.push(StscItem {
                first_chunk: reader.read_be_u32()?,
                samples_per_chunk: reader.read_be_u32()?,
                sample_description_id: reader.read_be_u32()?,
            });
        }

        Ok(Self { items })
    }
}

impl Stsc {
    /// Resolves the samples per chunk runs into a per sample chunk index list (0 based) for the
    /// given number of samples.
    pub fn sample_chunk_indices(&self, num_samples: usize) -> Vec<u32> {
        let mut indices = Vec::with_capacity(num_samples);

        for (i, item) in self.items.iter().enumerate() {
            if indices.len() == num_samples {
                break;
            }
            if item.samples_per_chunk == 0 || item.first_chunk == 0 {
                continue;
            }

            let last_chunk = match self.items.get(i + 1) {
                Some(next) => next.first_chunk,
                None => {
                    // the last run extends as far as needed
                    let remaining = (num_samples - indices.len()) as u32;
                    let chunks = remaining.div_ceil(item.samples_per_chunk);
                    item.first_chunk + chunks
                }
            };

            for chunk in item.first_chunk..last_chunk {
                for _ in 0..item.samples_per_chunk {
                    if indices.len() == num_samples {
                        return indices;
                    }
                    indices.push(chunk - 1);
                }
            }
        }

        indices
    }
}
