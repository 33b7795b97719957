use std::borrow::Cow;

use super::*;

/// The core signature of the item list zone: the head of an empty `ilst` atom.
pub const SIGNATURE: [u8; 8] = [0, 0, 0, 8, b'i', b'l', b's', b't'];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ilst<'a> {
    pub items: Cow<'a, [MetaItem]>,
}

impl Atom for Ilst<'_> {
    const FOURCC: Fourcc = ITEM_LIST;
}

impl ParseAtom for Ilst<'_> {
    fn parse_atom(
        reader: &mut (impl Read + Seek),
        cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        let mut items = Vec::<MetaItem>::new();
        let mut parsed_bytes = 0;

        while parsed_bytes < size.content_len() {
            let head = head::parse(reader, size.content_len() - parsed_bytes)?;

            match head.fourcc() {
                FREE => reader.skip(head.content_len() as i64)?,
                _ => {
                    let item = MetaItem::parse(reader, cfg, head)?;
                    // Repeated data atoms of multi valued items are merged into the previous
                    // item of the same identifier.
                    let other = items.iter_mut().find(|o| item.ident == o.ident);

                    match other {
                        Some(other) => other.data.extend(item.data),
                        None => items.push(item),
                    }
                }
            }

            parsed_bytes += head.len();
        }

        Ok(Self { items: Cow::Owned(items) })
    }
}

impl WriteAtom for Ilst<'_> {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.write_head(writer)?;
        for a in self.items.iter() {
            a.write(writer)?;
        }
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = self.items.iter().map(|a| a.len()).sum();
        Size::from(content_len)
    }
}

pub struct IlstBounds {
    pub bounds: AtomBounds,
}

impl Deref for IlstBounds {
    type Target = AtomBounds;

    fn deref(&self) -> &Self::Target {
        &self.bounds
    }
}

impl FindAtom for Ilst<'_> {
    type Bounds = IlstBounds;

    fn find_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self::Bounds> {
        let bounds = find_bounds(reader, size)?;
        seek_to_end(reader, &bounds)?;
        Ok(Self::Bounds { bounds })
    }
}

impl<'a> Ilst<'a> {
    pub fn new(items: impl Into<Cow<'a, [MetaItem]>>) -> Self {
        Self { items: items.into() }
    }

    /// Serializes the item list into a standalone buffer, starting with the zone signature.
    pub fn zone_bytes(&self) -> crate::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.len() as usize);
        self.write(&mut buf)?;
        Ok(buf)
    }
}
