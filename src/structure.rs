//! Bookkeeping of rewritable zones and dependent integer fields.
//!
//! A zone is a named contiguous byte range that may be replaced by bytes of a different length
//! when the file is rewritten. A dependent field is an integer stored elsewhere in the file
//! whose value is a function of zone sizes or positions:
//!
//! * size fields track the length of an enclosing container, either of every tag zone
//!   ([`SizeScope::Global`]) or of one named zone ([`SizeScope::Zone`]),
//! * offset fields hold an absolute file offset that shifts with every zone located in front
//!   of it.
//!
//! [`FileStructure::rewrite`] applies staged zone contents and patches every dependent field
//! in a single streaming pass over the file. Padding zones are elastic: length changes of the
//! other zones are absorbed by resizing the padding where possible, so that downstream bytes
//! keep their position.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::ErrorKind;

/// The smallest length-prefixed filler box: a 4 byte length and a 4 byte identifier.
const FILLER_HEAD_LEN: u64 = 8;

/// The width of a dependent integer field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Width {
    #[allow(dead_code)]
    U16,
    U32,
    U64,
}

impl Width {
    pub const fn len(&self) -> u64 {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }

    pub const fn max(&self) -> u64 {
        match self {
            Self::U16 => u16::MAX as u64,
            Self::U32 => u32::MAX as u64,
            Self::U64 => u64::MAX,
        }
    }

    fn encode(&self, value: u64, endian: Endian) -> Vec<u8> {
        let mut buf = vec![0; self.len() as usize];
        match (self, endian) {
            (Self::U16, Endian::Big) => BigEndian::write_u16(&mut buf, value as u16),
            (Self::U32, Endian::Big) => BigEndian::write_u32(&mut buf, value as u32),
            (Self::U64, Endian::Big) => BigEndian::write_u64(&mut buf, value),
            (Self::U16, Endian::Little) => LittleEndian::write_u16(&mut buf, value as u16),
            (Self::U32, Endian::Little) => LittleEndian::write_u32(&mut buf, value as u32),
            (Self::U64, Endian::Little) => LittleEndian::write_u64(&mut buf, value),
        }
        buf
    }
}

/// The byte order of a dependent integer field.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Endian {
    Big,
    #[allow(dead_code)]
    Little,
}

/// The role of a zone during delta accounting.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ZoneKind {
    /// A metadata zone counted by global size fields.
    Tag,
    /// An elastic filler zone, not counted by size fields.
    Padding,
    /// A foreign tag block outside the container, not counted by size fields.
    Sibling,
}

/// Which zone deltas a size field tracks.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SizeScope {
    /// The sum of deltas of every [`ZoneKind::Tag`] zone.
    Global,
    /// The delta of one named zone.
    Zone(&'static str),
}

/// A named rewritable byte range.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Zone {
    pub name: &'static str,
    pub pos: u64,
    pub len: u64,
    /// The bytes a newly created zone has to start with, e.g. the head of an empty item list.
    /// For padding zones this is the filler box identifier.
    pub signature: Vec<u8>,
    pub kind: ZoneKind,
}

impl Zone {
    pub fn end(&self) -> u64 {
        self.pos + self.len
    }
}

#[derive(Clone, Debug)]
struct SizeField {
    pos: u64,
    value: u64,
    width: Width,
    endian: Endian,
    scope: SizeScope,
}

#[derive(Clone, Debug)]
struct OffsetField {
    pos: u64,
    value: u64,
    width: Width,
    endian: Endian,
}

/// The staged content and patch tables of a file rewrite.
pub struct FileStructure {
    file_len: u64,
    zones: Vec<Zone>,
    sizes: Vec<SizeField>,
    offsets: Vec<OffsetField>,
}

impl FileStructure {
    pub fn new(file_len: u64) -> Self {
        Self { file_len, zones: Vec::new(), sizes: Vec::new(), offsets: Vec::new() }
    }

    /// Declares a rewritable region.
    ///
    /// # Panics
    /// Panics if the zone lies outside the file, overlaps a previously declared zone, or reuses
    /// a name. All of these are programmer errors.
    pub fn add_zone(
        &mut self,
        name: &'static str,
        pos: u64,
        len: u64,
        signature: impl Into<Vec<u8>>,
        kind: ZoneKind,
    ) {
        assert!(
            pos + len <= self.file_len,
            "zone {name} [{pos}, {}) lies outside the file (len {})",
            pos + len,
            self.file_len
        );
        assert!(self.zone(name).is_none(), "zone {name} declared twice");
        for z in self.zones.iter() {
            let overlapping = pos < z.end() && z.pos < pos + len;
            assert!(!overlapping, "zone {name} overlaps zone {}", z.name);
        }

        self.zones.push(Zone { name, pos, len, signature: signature.into(), kind });
        self.zones.sort_by_key(|z| z.pos);
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    /// Declares a container size field.
    pub fn add_size(
        &mut self,
        pos: u64,
        value: u64,
        width: Width,
        endian: Endian,
        scope: SizeScope,
    ) -> crate::Result<()> {
        self.check_field_pos(pos, width)?;
        self.sizes.push(SizeField { pos, value, width, endian, scope });
        Ok(())
    }

    /// Declares a chunk offset field holding an absolute file offset.
    pub fn add_offset(
        &mut self,
        pos: u64,
        value: u64,
        width: Width,
        endian: Endian,
    ) -> crate::Result<()> {
        self.check_field_pos(pos, width)?;
        self.offsets.push(OffsetField { pos, value, width, endian });
        Ok(())
    }

    fn check_field_pos(&self, pos: u64, width: Width) -> crate::Result<()> {
        if pos + width.len() > self.file_len {
            return Err(crate::Error::new(
                ErrorKind::Parsing,
                format!("Dependent field at {pos} lies outside the file"),
            ));
        }
        Ok(())
    }

    /// Streams the file from `reader` to `writer`, replacing every zone named in `replacements`
    /// with its staged content and patching all dependent fields.
    ///
    /// Regions outside of zones are copied verbatim. Zones without a staged replacement keep
    /// their original content. If a padding zone exists and has no explicit replacement, it
    /// absorbs the net length change of the zones in front of it where its capacity allows.
    pub fn rewrite(
        &self,
        reader: &mut (impl Read + Seek),
        writer: &mut impl Write,
        replacements: Vec<(&'static str, Vec<u8>)>,
    ) -> crate::Result<()> {
        let mut contents: Vec<Option<Vec<u8>>> = vec![None; self.zones.len()];
        for (name, data) in replacements {
            let i = self
                .zones
                .iter()
                .position(|z| z.name == name)
                .unwrap_or_else(|| panic!("replacement for undeclared zone {name}"));
            contents[i] = Some(data);
        }

        self.absorb_into_padding(&mut contents);

        let deltas: Vec<i64> = self
            .zones
            .iter()
            .zip(contents.iter())
            .map(|(z, c)| c.as_ref().map_or(0, |c| c.len() as i64 - z.len as i64))
            .collect();

        for (z, c) in self.zones.iter().zip(contents.iter()) {
            if let Some(c) = c {
                debug_assert!(
                    c.is_empty() || z.kind == ZoneKind::Padding || c.starts_with(&z.signature),
                    "zone {} content doesn't start with its signature",
                    z.name
                );
            }
        }

        let mut edits = Vec::new();
        for ((z, c), delta) in self.zones.iter().zip(contents.iter()).zip(deltas.iter()) {
            if let Some(c) = c {
                if *delta != 0 || !c.is_empty() || z.len != 0 {
                    edits.push(Edit { pos: z.pos, old_len: z.len, data: EditData::Zone(c) });
                }
            }
        }
        for s in self.sizes.iter() {
            let diff = match &s.scope {
                SizeScope::Global => self
                    .zones
                    .iter()
                    .zip(deltas.iter())
                    .filter(|(z, _)| z.kind == ZoneKind::Tag)
                    .map(|(_, d)| d)
                    .sum(),
                SizeScope::Zone(name) => self
                    .zones
                    .iter()
                    .zip(deltas.iter())
                    .filter(|(z, _)| z.name == *name)
                    .map(|(_, d)| d)
                    .sum::<i64>(),
            };
            let new = self.patched_value(s.value, diff, s.width)?;
            edits.push(Edit {
                pos: s.pos,
                old_len: s.width.len(),
                data: EditData::Patch(s.width.encode(new, s.endian)),
            });
        }
        for o in self.offsets.iter() {
            let shift: i64 = self
                .zones
                .iter()
                .zip(deltas.iter())
                .filter(|(z, _)| z.pos <= o.value)
                .map(|(_, d)| d)
                .sum();
            let new = self.patched_value(o.value, shift, o.width)?;
            edits.push(Edit {
                pos: o.pos,
                old_len: o.width.len(),
                data: EditData::Patch(o.width.encode(new, o.endian)),
            });
        }

        // Zero length insertions sort in front of the zone starting at the same position.
        edits.sort_by_key(|e| (e.pos, e.old_len));

        reader.seek(SeekFrom::Start(0))?;
        let mut pos = 0;
        for e in edits.iter() {
            if e.pos < pos {
                return Err(crate::Error::new(
                    ErrorKind::Parsing,
                    format!("Dependent field at {} lies inside a rewritable zone", e.pos),
                ));
            }

            copy_exact(reader, writer, e.pos - pos)?;
            match &e.data {
                EditData::Zone(data) => writer.write_all(data)?,
                EditData::Patch(bytes) => writer.write_all(bytes)?,
            }
            reader.seek(SeekFrom::Current(e.old_len as i64))?;
            pos = e.pos + e.old_len;
        }
        io::copy(reader, writer)?;

        Ok(())
    }

    /// Resizes the padding zone against the net delta of all zones in front of it, so that the
    /// bytes following the padding keep their position.
    fn absorb_into_padding(&self, contents: &mut [Option<Vec<u8>>]) {
        let Some(pi) = self.zones.iter().position(|z| z.kind == ZoneKind::Padding) else {
            return;
        };
        if contents[pi].is_some() {
            return;
        }

        let padding = &self.zones[pi];
        let net: i64 = self
            .zones
            .iter()
            .zip(contents.iter())
            .filter(|(z, _)| z.pos < padding.pos)
            .map(|(z, c)| c.as_ref().map_or(0, |c| c.len() as i64 - z.len as i64))
            .sum();
        if net == 0 {
            return;
        }

        let min_len = if padding.signature.is_empty() { 0 } else { FILLER_HEAD_LEN as i64 };
        let new_len = padding.len as i64 - net;
        if new_len == 0 || new_len >= min_len {
            contents[pi] = Some(filler(new_len as u64, &padding.signature));
        }
    }

    fn patched_value(&self, value: u64, diff: i64, width: Width) -> crate::Result<u64> {
        let new = value as i64 + diff;
        if new < 0 {
            return Err(crate::Error::new(
                ErrorKind::Parsing,
                format!("Dependent field value {value} underflows by {diff}"),
            ));
        }
        let new = new as u64;
        if new > width.max() {
            return Err(crate::Error::new(
                ErrorKind::SizeOverflow(new),
                format!("Dependent field value {new} exceeds its {} byte field", width.len()),
            ));
        }
        Ok(new)
    }
}

enum EditData<'a> {
    Zone(&'a [u8]),
    Patch(Vec<u8>),
}

struct Edit<'a> {
    pos: u64,
    old_len: u64,
    data: EditData<'a>,
}

/// Builds a length-prefixed filler box of the exact length, or plain zeroes if the signature is
/// empty.
pub fn filler(len: u64, signature: &[u8]) -> Vec<u8> {
    if len == 0 {
        return Vec::new();
    }

    let mut buf = Vec::with_capacity(len as usize);
    if !signature.is_empty() {
        buf.extend_from_slice(&u32::to_be_bytes(len as u32));
        buf.extend_from_slice(signature);
    }
    buf.resize(len as usize, 0);
    buf
}

fn copy_exact(
    reader: &mut impl Read,
    writer: &mut impl Write,
    len: u64,
) -> crate::Result<()> {
    let copied = io::copy(&mut reader.by_ref().take(len), writer)?;
    if copied != len {
        return Err(crate::Error::new(
            ErrorKind::Parsing,
            format!("Unexpected end of file, expected {len} more bytes, found {copied}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    fn rewrite(
        fs: &FileStructure,
        file: &[u8],
        replacements: Vec<(&'static str, Vec<u8>)>,
    ) -> Vec<u8> {
        let mut reader = Cursor::new(file.to_vec());
        let mut out = Vec::new();
        fs.rewrite(&mut reader, &mut out, replacements).unwrap();
        out
    }

    #[test]
    fn verbatim_copy() {
        let file = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let fs = FileStructure::new(file.len() as u64);
        assert_eq!(rewrite(&fs, &file, Vec::new()), file);
    }

    #[test]
    fn zone_replacement_and_global_size() {
        // | 2 size | 4 payload | zone(4) | 2 tail |
        let file = [0u8, 8, b'a', b'b', b'c', b'd', 1, 1, 1, 1, b'x', b'y'];
        let mut fs = FileStructure::new(file.len() as u64);
        fs.add_zone("tag", 6, 4, Vec::new(), ZoneKind::Tag);
        fs.add_size(0, 8, Width::U16, Endian::Big, SizeScope::Global).unwrap();

        let out = rewrite(&fs, &file, vec![("tag", vec![9, 9])]);
        assert_eq!(out, [0u8, 6, b'a', b'b', b'c', b'd', 9, 9, b'x', b'y']);
    }

    #[test]
    fn zone_scoped_size_ignores_other_zones() {
        let file = [0u8, 4, 1, 1, 2, 2, 2, 0];
        let mut fs = FileStructure::new(file.len() as u64);
        fs.add_zone("a", 2, 2, Vec::new(), ZoneKind::Tag);
        fs.add_zone("b", 4, 3, Vec::new(), ZoneKind::Tag);
        fs.add_size(0, 4, Width::U16, Endian::Big, SizeScope::Zone("b")).unwrap();

        let out = rewrite(&fs, &file, vec![("a", vec![1]), ("b", vec![2, 2])]);
        assert_eq!(out, [0u8, 3, 1, 2, 2, 0]);
    }

    #[test]
    fn offsets_shift_by_preceding_deltas_only() {
        // zone at 2..4, offset field at 4 referencing position 8
        let file = [b'h', b'h', 1, 1, 0, 0, 0, 8, b'p', b'q'];
        let mut fs = FileStructure::new(file.len() as u64);
        fs.add_zone("tag", 2, 2, Vec::new(), ZoneKind::Tag);
        fs.add_offset(4, 8, Width::U32, Endian::Big).unwrap();

        // growing the zone by 3 shifts the referenced chunk
        let out = rewrite(&fs, &file, vec![("tag", vec![1, 1, 1, 1, 1])]);
        assert_eq!(out, [b'h', b'h', 1, 1, 1, 1, 1, 0, 0, 0, 11, b'p', b'q']);

        // a zone behind the referenced offset doesn't
        let mut fs = FileStructure::new(file.len() as u64);
        fs.add_zone("tail", 9, 1, Vec::new(), ZoneKind::Tag);
        fs.add_offset(4, 8, Width::U32, Endian::Big).unwrap();
        let out = rewrite(&fs, &file, vec![("tail", Vec::new())]);
        assert_eq!(out, [b'h', b'h', 1, 1, 0, 0, 0, 8, b'p']);
    }

    #[test]
    fn little_endian_field() {
        let file = [4u8, 0, 1, 1, 1, 1];
        let mut fs = FileStructure::new(file.len() as u64);
        fs.add_zone("tag", 2, 4, Vec::new(), ZoneKind::Tag);
        fs.add_size(0, 4, Width::U16, Endian::Little, SizeScope::Global).unwrap();

        let out = rewrite(&fs, &file, vec![("tag", vec![7; 5])]);
        assert_eq!(out, [5u8, 0, 7, 7, 7, 7, 7]);
    }

    #[test]
    fn padding_absorbs_shrink() {
        // zone(4) | padding free box (16) | tail
        let mut file = vec![9u8, 9, 9, 9];
        file.extend_from_slice(&u32::to_be_bytes(16));
        file.extend_from_slice(b"free");
        file.extend_from_slice(&[0; 8]);
        file.extend_from_slice(b"tail");

        let mut fs = FileStructure::new(file.len() as u64);
        fs.add_zone("tag", 0, 4, Vec::new(), ZoneKind::Tag);
        fs.add_zone("pad", 4, 16, *b"free", ZoneKind::Padding);
        fs.add_offset(file.len() as u64 - 4, 20, Width::U32, Endian::Big).unwrap();

        // hm, offset field at the tail start referencing the tail itself
        let mut with_field = file.clone();
        with_field[file.len() - 4..].copy_from_slice(&u32::to_be_bytes(20));

        let mut reader = Cursor::new(with_field);
        let mut out = Vec::new();
        fs.rewrite(&mut reader, &mut out, vec![("tag", vec![9, 9])]).unwrap();

        // the padding grew by 2, the tail offset is unchanged
        assert_eq!(out.len(), file.len());
        assert_eq!(&out[..2], &[9, 9]);
        assert_eq!(&out[2..6], &u32::to_be_bytes(18));
        assert_eq!(&out[6..10], b"free");
        assert_eq!(&out[out.len() - 4..], &u32::to_be_bytes(20));
    }

    #[test]
    fn padding_rejects_overgrown_deltas() {
        let mut file = vec![9u8, 9];
        file.extend_from_slice(&u32::to_be_bytes(10));
        file.extend_from_slice(b"free");
        file.extend_from_slice(&[0; 2]);

        let mut fs = FileStructure::new(file.len() as u64);
        fs.add_zone("tag", 0, 2, Vec::new(), ZoneKind::Tag);
        fs.add_zone("pad", 2, 10, *b"free", ZoneKind::Padding);

        // growing the tag by 4 exceeds the padding capacity of 2, the padding stays
        let out = rewrite(&fs, &file, vec![("tag", vec![9; 6])]);
        assert_eq!(out.len(), file.len() + 4);
        assert_eq!(&out[6..10], &u32::to_be_bytes(10));
    }

    #[test]
    fn size_overflow_aborts() {
        let file = [0u8, 0, 0, 0, 1, 1];
        let mut fs = FileStructure::new(file.len() as u64);
        fs.add_zone("tag", 4, 2, Vec::new(), ZoneKind::Tag);
        fs.add_size(0, u16::MAX as u64 - 1, Width::U16, Endian::Big, SizeScope::Global).unwrap();

        let mut reader = Cursor::new(file.to_vec());
        let mut out = Vec::new();
        let err = fs.rewrite(&mut reader, &mut out, vec![("tag", vec![1; 6])]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::SizeOverflow(_)));
    }

    #[test]
    #[should_panic]
    fn overlapping_zones_panic() {
        let mut fs = FileStructure::new(100);
        fs.add_zone("a", 10, 10, Vec::new(), ZoneKind::Tag);
        fs.add_zone("b", 15, 10, Vec::new(), ZoneKind::Tag);
    }

    #[test]
    fn field_outside_file_is_rejected() {
        let mut fs = FileStructure::new(10);
        let err = fs.add_size(8, 0, Width::U32, Endian::Big, SizeScope::Global).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Parsing));
    }

    #[test]
    fn insertion_zone_at_existing_boundary() {
        let file = [b'a', b'b', 1, 1, b'c'];
        let mut fs = FileStructure::new(file.len() as u64);
        fs.add_zone("old", 2, 2, Vec::new(), ZoneKind::Tag);
        fs.add_zone("new", 2, 0, Vec::new(), ZoneKind::Tag);

        let out = rewrite(&fs, &file, vec![("new", vec![7, 7])]);
        assert_eq!(out, [b'a', b'b', 7, 7, 1, 1, b'c']);
    }
}
