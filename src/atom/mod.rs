pub(crate) use std::io::{Read, Seek, SeekFrom, Write};
pub(crate) use std::ops::Deref;

pub(crate) use crate::structure::{Endian, FileStructure, SizeScope, Width, ZoneKind};

use crate::structure;
use crate::tag::ChapterSource;
use crate::{coexist, AudioInfo, Chapter, Tag};

pub(crate) use crate::util::*;
pub(crate) use crate::ErrorKind;

pub use data::Data;
pub use ident::*;
pub use metaitem::MetaItem;

pub(crate) use audio::*;
pub(crate) use chap::*;
pub(crate) use chpl::*;
pub(crate) use co64::*;
pub(crate) use ftyp::*;
pub(crate) use head::*;
pub(crate) use hdlr::*;
pub(crate) use ilst::*;
pub(crate) use mdhd::*;
pub(crate) use mdia::*;
pub(crate) use meta::*;
pub(crate) use minf::*;
pub(crate) use moov::*;
pub(crate) use mvhd::*;
pub(crate) use stbl::*;
pub(crate) use stco::*;
pub(crate) use stsc::*;
pub(crate) use stsd::*;
pub(crate) use stsz::*;
pub(crate) use stts::*;
pub(crate) use tkhd::*;
pub(crate) use trak::*;
pub(crate) use tref::*;
pub(crate) use udta::*;

/// A module for working with identifiers.
pub mod ident;

mod audio;
mod chap;
mod chpl;
mod co64;
mod data;
mod ftyp;
pub(crate) mod head;
mod hdlr;
mod ilst;
mod mdhd;
mod mdia;
mod meta;
mod metaitem;
mod minf;
mod moov;
mod mvhd;
mod stbl;
mod stco;
mod stsc;
mod stsd;
mod stsz;
mod stts;
mod tkhd;
mod trak;
mod tref;
mod udta;

/// A struct configuring which parts of the file are read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReadConfig {
    /// Whether to read the raw bytes of embedded images, otherwise only their presence and
    /// format are reported.
    pub read_image_data: bool,
    /// Whether to read chapter information, both the Nero style chapter list and the Quicktime
    /// style chapter track.
    pub read_chapters: bool,
    /// Whether to read the physical parameters of the audio track.
    pub read_audio_info: bool,
    /// Whether to keep metadata items that aren't mapped to a well known identifier.
    pub read_all_meta_items: bool,
    /// Whether the title falls back to the file name when the file has no title item. Only
    /// applies when reading from a path.
    pub title_from_filename: bool,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            read_image_data: true,
            read_chapters: true,
            read_audio_info: true,
            read_all_meta_items: true,
            title_from_filename: false,
        }
    }
}

/// A struct configuring how the file is written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WriteConfig {
    /// Whether a padding (`free`) atom is created when the file has none, so that the next
    /// edit can be absorbed without shifting the sample data.
    pub add_new_padding: bool,
    /// The size in bytes of a newly created padding atom, including its 8 byte head.
    pub default_padding_size: u64,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self { add_new_padding: true, default_padding_size: 1024 }
    }
}

/// A trait providing the 4 byte identifier of an atom kind.
pub(crate) trait Atom: Sized {
    const FOURCC: Fourcc;
}

/// A trait for parsing an atom's content into a typed representation.
pub(crate) trait ParseAtom: Atom {
    fn parse(
        reader: &mut (impl Read + Seek),
        cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self> {
        match Self::parse_atom(reader, cfg, size) {
            Err(e) => Err(crate::Error::new(
                e.kind,
                format!("Error parsing {}: {}", Self::FOURCC, e.description),
            )),
            ok => ok,
        }
    }

    fn parse_atom(
        reader: &mut (impl Read + Seek),
        cfg: &ReadConfig,
        size: Size,
    ) -> crate::Result<Self>;
}

/// A trait for writing a typed atom representation.
pub(crate) trait WriteAtom: Atom {
    fn write(&self, writer: &mut impl Write) -> crate::Result<()> {
        match self.write_atom(writer) {
            Err(e) => Err(crate::Error::new(
                e.kind,
                format!("Error writing {}: {}", Self::FOURCC, e.description),
            )),
            ok => ok,
        }
    }

    fn write_head(&self, writer: &mut impl Write) -> crate::Result<()> {
        head::write(writer, Head::from(self.size(), Self::FOURCC))
    }

    fn len(&self) -> u64 {
        self.size().len()
    }

    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()>;

    fn size(&self) -> Size;
}

/// A trait for determining the bounds of atoms without materializing their content.
pub(crate) trait FindAtom: Atom {
    type Bounds;

    fn find(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self::Bounds> {
        match Self::find_atom(reader, size) {
            Err(e) => Err(crate::Error::new(
                e.kind,
                format!("Error finding {}: {}", Self::FOURCC, e.description),
            )),
            ok => ok,
        }
    }

    fn find_atom(reader: &mut (impl Read + Seek), size: Size) -> crate::Result<Self::Bounds>;
}

/// The name of the item list zone.
const TAG_ZONE: &str = "tag";
/// The name of the Nero chapter list zone.
const CHAPTER_ZONE: &str = "chapters";
/// The name of the metadata handler insertion zone.
const HDLR_ZONE: &str = "meta.hdlr";
/// The name of the elastic padding zone.
const PADDING_ZONE: &str = "padding";

/// Attempts to read MPEG-4 audio metadata from the reader.
pub(crate) fn read_tag(reader: &mut (impl Read + Seek), cfg: &ReadConfig) -> crate::Result<Tag> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    let siblings = coexist::scan(reader)?;

    let scan_start = siblings.head_len();
    let scan_len = file_len - scan_start - siblings.tail_len();
    reader.seek(SeekFrom::Start(scan_start))?;

    let ftyp = Ftyp::parse(reader, scan_len)?;

    let mut moov = None;
    let mut mdat_len = 0u64;
    let mut remaining = scan_len - ftyp.size.len();
    while remaining >= Head::NORMAL_SIZE {
        let head = head::parse(reader, remaining)?;

        match head.fourcc() {
            MOVIE => moov = Some(Moov::parse(reader, cfg, head.size())?),
            MEDIA_DATA => {
                mdat_len += head.content_len();
                reader.skip(head.content_len() as i64)?;
            }
            _ => reader.skip(head.content_len() as i64)?,
        }

        remaining -= head.len();
    }

    let Some(moov) = moov else {
        log::error!("missing movie (moov) atom, returning an empty tag");
        return Ok(Tag { ftyp: ftyp.string, ..Default::default() });
    };

    let mut info = AudioInfo::default();
    if cfg.read_audio_info {
        info = read_audio_info(&moov, mdat_len);
    }

    let mut chapters = Vec::new();
    let mut chapter_source = None;
    if cfg.read_chapters {
        let chpl = moov.udta.as_ref().and_then(|u| u.chpl.as_ref());
        match chpl {
            Some(chpl) if !chpl.chapters.is_empty() => {
                chapters = chpl.chapters.clone();
                chapter_source = Some(ChapterSource::Nero);
            }
            _ => {
                if let Some(trak) = moov.chapter_track() {
                    chapters = read_chapter_track(reader, trak)?;
                    chapter_source = Some(ChapterSource::QuicktimeTrack);
                }
            }
        }
    }

    let mut items = moov
        .udta
        .and_then(|u| u.meta)
        .and_then(|m| m.ilst)
        .map_or(Vec::new(), |i| i.items.into_owned());

    let pictures = take_pictures(&mut items);
    convert_standard_genre(&mut items);
    if !cfg.read_all_meta_items {
        items.retain(|i| crate::tag::is_standard_ident(&i.ident));
    }

    Ok(Tag {
        ftyp: ftyp.string,
        info,
        items,
        pictures,
        chapters,
        chapter_source,
        ..Default::default()
    })
}

/// Derives the physical parameters from the parsed movie structure.
fn read_audio_info(moov: &Moov, mdat_len: u64) -> AudioInfo {
    let mut info = AudioInfo::default();

    match &moov.mvhd {
        Some(mvhd) if mvhd.timescale != 0 => {
            info.duration = Some(scale_duration(mvhd.timescale, mvhd.duration));
        }
        _ => log::warn!("missing or invalid movie header (mvhd), duration unknown"),
    }

    let audio_entry = moov.trak.iter().find_map(|t| {
        let mdia = t.mdia.as_ref()?;
        let audio = audio_entry_of(mdia)?;
        Some((mdia, audio))
    });
    let Some((mdia, audio)) = audio_entry else {
        log::warn!("no audio sample description found");
        return info;
    };

    info.channel_config = Some(audio.channel_config);
    info.sample_rate = Some(audio.sample_rate);
    info.codec = Some(audio.codec);
    info.max_bitrate = audio.max_bitrate;
    info.avg_bitrate = audio.avg_bitrate;

    if info.avg_bitrate.is_none() {
        if let Some(duration) = info.duration.filter(|d| !d.is_zero()) {
            let millis = duration.as_millis() as u64;
            info.avg_bitrate = Some((mdat_len * 8 * 1000 / millis) as u32);
        }
    }

    if let Some(stsz) = mdia.minf.as_ref().and_then(|m| m.stbl.as_ref()).and_then(|s| s.stsz.as_ref())
    {
        info.vbr = stsz.is_vbr();
    }

    info
}

fn audio_entry_of(mdia: &Mdia) -> Option<&Audio> {
    mdia.minf.as_ref()?.stbl.as_ref()?.stsd.as_ref()?.audio.as_ref()
}

/// Reads the chapter titles of a Quicktime style chapter track.
///
/// Every sample of the text track is one chapter title, a 16 bit big endian length prefixed
/// utf-8 string located inside the media data. Start times are accumulated sample durations on
/// the track's media timescale.
fn read_chapter_track(
    reader: &mut (impl Read + Seek),
    trak: &Trak,
) -> crate::Result<Vec<Chapter>> {
    let mdia = trak.mdia.as_ref();
    let timescale = match mdia.and_then(|m| m.mdhd.as_ref()) {
        Some(mdhd) if mdhd.timescale != 0 => mdhd.timescale,
        _ => {
            log::error!("chapter track has no valid media header (mdhd)");
            return Ok(Vec::new());
        }
    };
    let Some(stbl) = mdia.and_then(|m| m.minf.as_ref()).and_then(|m| m.stbl.as_ref()) else {
        log::error!("chapter track has no sample table (stbl)");
        return Ok(Vec::new());
    };
    let (Some(stts), Some(stsc), Some(stsz)) = (&stbl.stts, &stbl.stsc, &stbl.stsz) else {
        log::error!("chapter track is missing sample tables");
        return Ok(Vec::new());
    };

    let durations = stts.sample_durations();
    let chunk_indices = stsc.sample_chunk_indices(durations.len());

    let mut chapters = Vec::with_capacity(durations.len());
    let mut start = 0u64;
    let mut current_chunk = None;
    let mut sample_pos = 0u64;

    for (i, duration) in durations.iter().enumerate() {
        let chunk = chunk_indices.get(i).copied().unwrap_or_default();
        if current_chunk != Some(chunk) {
            let Some(offset) = stbl.chunk_offset(chunk as usize) else {
                log::error!("chapter track chunk {chunk} has no offset entry");
                return Ok(chapters);
            };
            current_chunk = Some(chunk);
            sample_pos = offset;
        }

        reader.seek(SeekFrom::Start(sample_pos))?;
        let title_len = reader.read_be_u16()?;
        let title = reader.read_utf8(title_len as u64)?;

        chapters.push(Chapter::new(scale_duration(timescale, start), title));

        start += *duration as u64;
        match stsz.size_of(i) {
            Some(size) => sample_pos += size as u64,
            None => {
                log::error!("chapter track sample {i} has no size entry");
                return Ok(chapters);
            }
        }
    }

    Ok(chapters)
}

/// Takes the artwork (`covr`) item out of the item list and converts its data values into
/// pictures.
fn take_pictures(items: &mut Vec<MetaItem>) -> Vec<crate::Picture> {
    let mut pictures = Vec::new();

    let mut i = 0;
    while i < items.len() {
        if items[i].ident == DataIdent::Fourcc(ARTWORK) {
            let item = items.remove(i);
            for data in item.data {
                match data.into_image() {
                    Some(img) => pictures.push(crate::Picture::new(img)),
                    None => log::warn!("artwork (covr) data of unrecognized image format"),
                }
            }
        } else {
            i += 1;
        }
    }

    pictures
}

/// Converts standard genre (`gnre`) items into their textual custom genre (`©gen`)
/// counterpart. The code is a 1 based index into the ID3v1 genre table, and is emitted back as
/// text on write.
fn convert_standard_genre(items: &mut Vec<MetaItem>) {
    for item in items.iter_mut() {
        if item.ident != DataIdent::Fourcc(STANDARD_GENRE) {
            continue;
        }

        let genres: Vec<Data> = item
            .data
            .iter()
            .filter_map(|d| {
                let code = be_int!(d.bytes()?, 0, u16)?;
                match crate::genre::genre_name(code) {
                    Some(name) => Some(Data::Utf8(name.to_owned())),
                    None => {
                        log::warn!("unknown standard genre code {code}");
                        None
                    }
                }
            })
            .collect();

        if !genres.is_empty() {
            item.ident = DataIdent::Fourcc(CUSTOM_GENRE);
            item.data = genres;
        }
    }
}

/// Attempts to write the metadata to the writer, streaming all unchanged parts of the file
/// from the reader.
pub(crate) fn write_tag(
    reader: &mut (impl Read + Seek),
    writer: &mut impl Write,
    tag: &Tag,
    cfg: &WriteConfig,
) -> crate::Result<()> {
    let file_len = reader.seek(SeekFrom::End(0))?;
    let siblings = coexist::scan(reader)?;

    let scan_start = siblings.head_len();
    let scan_len = file_len - scan_start - siblings.tail_len();
    reader.seek(SeekFrom::Start(scan_start))?;

    let ftyp = Ftyp::parse(reader, scan_len)?;

    let mut moov = None;
    let mut free = None;
    let mut remaining = scan_len - ftyp.size.len();
    while remaining >= Head::NORMAL_SIZE {
        let head = head::parse(reader, remaining)?;

        match head.fourcc() {
            MOVIE => moov = Some(Moov::find(reader, head.size())?),
            FREE if free.is_none() => {
                let bounds = find_bounds(reader, head.size())?;
                free = Some(bounds);
                reader.skip(head.content_len() as i64)?;
            }
            _ => reader.skip(head.content_len() as i64)?,
        }

        remaining -= head.len();
    }

    let moov = moov.ok_or_else(|| {
        crate::Error::new(
            ErrorKind::AtomNotFound(MOVIE),
            "Missing necessary data, no movie (moov) atom found",
        )
    })?;

    let mut fs = FileStructure::new(file_len);
    let mut replacements: Vec<(&'static str, Vec<u8>)> = Vec::new();

    register_sibling_zones(&mut fs, &mut replacements, &siblings, tag);

    let (pos, width) = moov.bounds.len_field();
    fs.add_size(pos, moov.len(), width, Endian::Big, SizeScope::Global)?;

    let items = tag.items_for_write();
    let ilst_bytes = Ilst::new(&items[..]).zone_bytes()?;
    let chapters = tag.chapters_for_write();
    let chpl_bytes = match chapters.is_empty() {
        true => Vec::new(),
        false => {
            let chpl = Chpl::new(chapters.to_vec());
            let mut buf = Vec::with_capacity(chpl.len() as usize);
            chpl.write(&mut buf)?;
            buf
        }
    };

    match &moov.udta {
        Some(udta) => {
            let (pos, width) = udta.bounds.len_field();
            fs.add_size(pos, udta.len(), width, Endian::Big, SizeScope::Global)?;

            match &udta.meta {
                Some(meta) => {
                    let (meta_pos, meta_width) = meta.bounds.len_field();
                    fs.add_size(
                        meta_pos,
                        meta.len(),
                        meta_width,
                        Endian::Big,
                        SizeScope::Zone(TAG_ZONE),
                    )?;

                    match &meta.ilst {
                        Some(ilst) => {
                            fs.add_zone(
                                TAG_ZONE,
                                ilst.pos(),
                                ilst.len(),
                                ilst::SIGNATURE,
                                ZoneKind::Tag,
                            );
                        }
                        None => {
                            fs.add_zone(TAG_ZONE, meta.end(), 0, ilst::SIGNATURE, ZoneKind::Tag);
                        }
                    }
                    replacements.push((TAG_ZONE, ilst_bytes));

                    if meta.hdlr.is_none() {
                        // insert the handler directly after the meta atom's version and flags
                        fs.add_zone(
                            HDLR_ZONE,
                            meta.bounds.content_pos() + 4,
                            0,
                            Vec::new(),
                            ZoneKind::Tag,
                        );
                        fs.add_size(
                            meta_pos,
                            meta.len(),
                            meta_width,
                            Endian::Big,
                            SizeScope::Zone(HDLR_ZONE),
                        )?;

                        let hdlr = Hdlr::meta();
                        let mut buf = Vec::with_capacity(hdlr.len() as usize);
                        hdlr.write(&mut buf)?;
                        replacements.push((HDLR_ZONE, buf));
                    }
                }
                None => {
                    // the meta hierarchy is created inside the tag zone
                    fs.add_zone(TAG_ZONE, udta.end(), 0, Vec::new(), ZoneKind::Tag);
                    replacements.push((TAG_ZONE, meta_atom_bytes(ilst_bytes)?));
                }
            }

            match &udta.chpl {
                Some(chpl) => {
                    fs.add_zone(CHAPTER_ZONE, chpl.pos(), chpl.len(), Vec::new(), ZoneKind::Tag);
                }
                None => {
                    fs.add_zone(CHAPTER_ZONE, udta.end(), 0, Vec::new(), ZoneKind::Tag);
                }
            }
            replacements.push((CHAPTER_ZONE, chpl_bytes));
        }
        None => {
            // the whole user data hierarchy is created inside the tag zone
            let mut udta_content = meta_atom_bytes(ilst_bytes)?;
            udta_content.extend_from_slice(&chpl_bytes);
            let bytes = wrap_atom(USER_DATA, udta_content);

            fs.add_zone(TAG_ZONE, moov.end(), 0, Vec::new(), ZoneKind::Tag);
            replacements.push((TAG_ZONE, bytes));
        }
    }

    for trak in moov.trak.iter() {
        let Some(stbl) = trak.mdia.as_ref().and_then(|m| m.minf.as_ref()).and_then(|m| m.stbl.as_ref())
        else {
            continue;
        };

        if let Some(stco) = &stbl.stco {
            let table_pos = stco.content_pos() + stco::TABLE_OFFSET;
            for (i, offset) in stco.offsets.iter().enumerate() {
                fs.add_offset(table_pos + 4 * i as u64, *offset as u64, Width::U32, Endian::Big)?;
            }
        }
        if let Some(co64) = &stbl.co64 {
            let table_pos = co64.content_pos() + stco::TABLE_OFFSET;
            for (i, offset) in co64.offsets.iter().enumerate() {
                fs.add_offset(table_pos + 8 * i as u64, *offset, Width::U64, Endian::Big)?;
            }
        }
    }

    match free {
        Some(bounds) => {
            fs.add_zone(PADDING_ZONE, bounds.pos(), bounds.len(), *b"free", ZoneKind::Padding);
        }
        None if cfg.add_new_padding => {
            let len = cfg.default_padding_size.max(Head::NORMAL_SIZE);
            fs.add_zone(PADDING_ZONE, moov.end(), 0, *b"free", ZoneKind::Padding);
            replacements.push((PADDING_ZONE, structure::filler(len, b"free")));
        }
        None => {}
    }

    fs.rewrite(reader, writer, replacements)
}

/// Registers the sibling tag blocks as independent zones. They are copied through verbatim,
/// unless their tag system is marked for removal.
fn register_sibling_zones(
    fs: &mut FileStructure,
    replacements: &mut Vec<(&'static str, Vec<u8>)>,
    siblings: &coexist::Siblings,
    tag: &Tag,
) {
    let blocks = [
        (coexist::ID3V2_ZONE, &siblings.id3v2, crate::TagSystem::Id3v2),
        (coexist::APE_ZONE, &siblings.ape, crate::TagSystem::Ape),
        (coexist::ID3V1_ZONE, &siblings.id3v1, crate::TagSystem::Id3v1),
    ];

    for (name, block, system) in blocks {
        if let Some(b) = block {
            fs.add_zone(name, b.pos, b.len, Vec::new(), ZoneKind::Sibling);
            if tag.system_removed(system) {
                replacements.push((name, Vec::new()));
            }
        }
    }
}

/// Wraps the content into a length prefixed atom.
fn wrap_atom(fourcc: Fourcc, content: Vec<u8>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(content.len() + 8);
    buf.extend_from_slice(&u32::to_be_bytes(content.len() as u32 + 8));
    buf.extend_from_slice(&*fourcc);
    buf.extend_from_slice(&content);
    buf
}

/// Builds a metadata (`meta`) atom containing a handler reference and the item list.
fn meta_atom_bytes(ilst_bytes: Vec<u8>) -> crate::Result<Vec<u8>> {
    let hdlr = Hdlr::meta();
    let mut content = vec![0; 4]; // version and flags
    content.reserve(hdlr.len() as usize + ilst_bytes.len());
    hdlr.write(&mut content)?;
    content.extend_from_slice(&ilst_bytes);
    Ok(wrap_atom(METADATA, content))
}

/// Attempts to dump the metadata atoms to the writer. This doesn't include sample data and
/// won't result in a playable file.
pub(crate) fn dump_tag(writer: &mut impl Write, tag: &Tag) -> crate::Result<()> {
    let items = tag.items_for_write();
    let ilst_bytes = Ilst::new(&items[..]).zone_bytes()?;

    let mut udta_content = meta_atom_bytes(ilst_bytes)?;
    let chapters = tag.chapters_for_write();
    if !chapters.is_empty() {
        let chpl = Chpl::new(chapters.to_vec());
        let mut buf = Vec::with_capacity(chpl.len() as usize);
        chpl.write(&mut buf)?;
        udta_content.extend_from_slice(&buf);
    }

    let moov = wrap_atom(MOVIE, wrap_atom(USER_DATA, udta_content));

    let ftyp = b"M4A \x00\x00\x02\x00isomiso2";
    writer.write_be_u32(ftyp.len() as u32 + 8)?;
    writer.write_all(&*FILETYPE)?;
    writer.write_all(ftyp)?;
    writer.write_all(&moov)?;

    Ok(())
}
