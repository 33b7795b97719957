use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::fs::{self, File};
use std::hash::Hasher;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use std::time::Duration;

use crate::atom::{
    self, idents_match, Data, DataIdent, Ident, MetaItem, ReadConfig, WriteConfig,
};
use crate::coexist::TagSystem;
use crate::{
    rating, AdvisoryRating, AudioInfo, ChannelConfig, Chapter, Codec, ImgBuf, ImgRef, MediaType,
};

/// An embedded picture with tombstone deletion semantics.
///
/// Pictures are kept separate from the other metadata items, all of them share the single
/// artwork (`covr`) atom when written. The content hash allows detecting that a slot was
/// refilled with different bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Picture {
    img: ImgBuf,
    hash: u64,
    removed: bool,
}

impl Picture {
    /// Creates a new picture from the image.
    pub fn new(img: ImgBuf) -> Self {
        let hash = content_hash(&img.data);
        Self { img, hash, removed: false }
    }

    /// Returns a borrowed reference to the image.
    pub fn img(&self) -> ImgRef<'_> {
        self.img.as_ref()
    }

    /// Replaces the image and updates the content hash.
    pub fn set_img(&mut self, img: ImgBuf) {
        self.hash = content_hash(&img.data);
        self.img = img;
    }

    /// Returns the hash of the image bytes.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Marks the picture for deletion. It is dropped on the next save.
    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// Returns whether the picture is marked for deletion.
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

fn content_hash(data: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    hasher.write(data);
    hasher.finish()
}

/// The representation chapters were read from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChapterSource {
    /// A Nero style chapter list (`chpl`) atom.
    Nero,
    /// A Quicktime style chapter text track. This representation is read only, chapters are
    /// written back as a Nero style chapter list.
    QuicktimeTrack,
}

/// A MPEG-4 audio tag containing metadata items, pictures and chapters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tag {
    /// The `ftyp` atom's content identifying the file type.
    pub ftyp: String,
    pub(crate) info: AudioInfo,
    pub(crate) items: Vec<MetaItem>,
    pub(crate) pictures: Vec<Picture>,
    pub(crate) chapters: Vec<Chapter>,
    pub(crate) chapter_source: Option<ChapterSource>,
    pub(crate) fallback_title: Option<String>,
    pub(crate) removed_systems: Vec<TagSystem>,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.title() {
            writeln!(f, "title: {s}")?;
        }
        for s in self.artists() {
            writeln!(f, "artist: {s}")?;
        }
        if let Some(s) = self.album() {
            writeln!(f, "album: {s}")?;
        }
        for s in self.genres() {
            writeln!(f, "genre: {s}")?;
        }
        if let (Some(n), total) = self.track() {
            match total {
                Some(t) => writeln!(f, "track: {n} of {t}")?,
                None => writeln!(f, "track: {n}")?,
            }
        }
        if let Some(d) = self.duration() {
            writeln!(f, "duration: {}s", d.as_secs_f32())?;
        }
        if !self.chapters.is_empty() {
            writeln!(f, "chapters: {}", self.chapters.len())?;
        }
        let pictures = self.pictures().count();
        if pictures > 0 {
            writeln!(f, "pictures: {pictures}")?;
        }
        Ok(())
    }
}

impl Tag {
    /// Attempts to read a MPEG-4 audio tag from the reader.
    pub fn read_from(reader: &mut (impl Read + Seek)) -> crate::Result<Self> {
        atom::read_tag(reader, &ReadConfig::default())
    }

    /// Attempts to read a MPEG-4 audio tag from the reader using the configuration.
    pub fn read_from_with(
        reader: &mut (impl Read + Seek),
        cfg: &ReadConfig,
    ) -> crate::Result<Self> {
        atom::read_tag(reader, cfg)
    }

    /// Attempts to read a MPEG-4 audio tag from the file at the indicated path.
    pub fn read_from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        Self::read_from_path_with(path, &ReadConfig::default())
    }

    /// Attempts to read a MPEG-4 audio tag from the file at the indicated path using the
    /// configuration.
    pub fn read_from_path_with(
        path: impl AsRef<Path>,
        cfg: &ReadConfig,
    ) -> crate::Result<Self> {
        let path = path.as_ref();
        let mut file = BufReader::new(File::open(path)?);
        let mut tag = Self::read_from_with(&mut file, cfg)?;

        if cfg.title_from_filename && tag.title().is_none() {
            tag.fallback_title =
                path.file_stem().map(|s| s.to_string_lossy().into_owned());
        }

        Ok(tag)
    }

    /// Attempts to write the MPEG-4 audio tag to the writer, streaming all unchanged parts of
    /// the file from the reader. The reader and writer have to be distinct, the original file
    /// is never modified in place.
    pub fn write_to(
        &self,
        reader: &mut (impl Read + Seek),
        writer: &mut impl Write,
    ) -> crate::Result<()> {
        atom::write_tag(reader, writer, self, &WriteConfig::default())
    }

    /// Attempts to write the MPEG-4 audio tag to the writer using the configuration.
    pub fn write_to_with(
        &self,
        reader: &mut (impl Read + Seek),
        writer: &mut impl Write,
        cfg: &WriteConfig,
    ) -> crate::Result<()> {
        atom::write_tag(reader, writer, self, cfg)
    }

    /// Attempts to write the MPEG-4 audio tag to the file at the indicated path.
    ///
    /// The new file is assembled in a temporary file next to the original and committed with
    /// an atomic rename. On any error the original file is left untouched and the temporary
    /// file is removed.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        self.write_to_path_with(path, &WriteConfig::default())
    }

    /// Attempts to write the MPEG-4 audio tag to the file at the indicated path using the
    /// configuration.
    pub fn write_to_path_with(
        &self,
        path: impl AsRef<Path>,
        cfg: &WriteConfig,
    ) -> crate::Result<()> {
        let path = path.as_ref();
        let mut tmp_path = path.as_os_str().to_owned();
        tmp_path.push(".tmp");

        let mut reader = BufReader::new(File::open(path)?);
        let result: crate::Result<()> = (|| {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            atom::write_tag(&mut reader, &mut writer, self, cfg)?;
            writer.flush()?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                fs::rename(&tmp_path, path)?;
                Ok(())
            }
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                Err(e)
            }
        }
    }

    /// Attempts to dump the metadata atoms to the writer. This doesn't include sample data and
    /// won't result in a playable file.
    pub fn dump_to(&self, writer: &mut impl Write) -> crate::Result<()> {
        atom::dump_tag(writer, self)
    }

    /// Attempts to dump the metadata atoms to a new file at the indicated path.
    pub fn dump_to_path(&self, path: impl AsRef<Path>) -> crate::Result<()> {
        let mut file = File::create(path)?;
        self.dump_to(&mut file)
    }

    /// Marks a whole tagging system for removal.
    ///
    /// Removing [`TagSystem::Native`] clears all items, pictures and chapters immediately.
    /// Foreign systems are dropped from the file on the next save.
    pub fn remove_system(&mut self, system: TagSystem) {
        match system {
            TagSystem::Native => {
                for item in self.items.iter_mut() {
                    item.removed = true;
                }
                for pic in self.pictures.iter_mut() {
                    pic.removed = true;
                }
                self.chapters.clear();
            }
            _ => {
                if !self.removed_systems.contains(&system) {
                    self.removed_systems.push(system);
                }
            }
        }
    }

    pub(crate) fn system_removed(&self, system: TagSystem) -> bool {
        self.removed_systems.contains(&system)
    }

    /// Returns whether the tag contains no live items, pictures or chapters.
    pub fn is_empty(&self) -> bool {
        self.meta_items().next().is_none()
            && self.pictures().next().is_none()
            && self.chapters.is_empty()
    }
}

// ## Item accessors
impl Tag {
    /// Returns all metadata items that aren't marked for deletion.
    pub fn meta_items(&self) -> impl Iterator<Item = &MetaItem> {
        self.items.iter().filter(|i| !i.removed)
    }

    /// Returns all data references corresponding to the identifier.
    pub fn data_of<'a>(&'a self, ident: &'a impl Ident) -> impl Iterator<Item = &'a Data> {
        self.meta_items()
            .filter(move |i| idents_match(&i.ident, ident))
            .flat_map(|i| i.data.iter())
    }

    /// Returns all string references corresponding to the identifier.
    pub fn strings_of<'a>(&'a self, ident: &'a impl Ident) -> impl Iterator<Item = &'a str> {
        self.data_of(ident).filter_map(Data::string)
    }

    /// Returns all byte data references corresponding to the identifier.
    pub fn bytes_of<'a>(&'a self, ident: &'a impl Ident) -> impl Iterator<Item = &'a [u8]> {
        self.data_of(ident).filter_map(Data::bytes)
    }

    /// Removes all other items corresponding to the identifier and adds a new item containing
    /// the data.
    pub fn set_data(&mut self, ident: impl Into<DataIdent>, data: Data) {
        let ident = ident.into();
        self.remove_data_of(&ident);
        self.items.push(MetaItem::new(ident, vec![data]));
    }

    /// Adds a new item, corresponding to the identifier, containing the data.
    pub fn add_data(&mut self, ident: impl Into<DataIdent>, data: Data) {
        self.items.push(MetaItem::new(ident.into(), vec![data]));
    }

    /// Marks all items corresponding to the identifier for deletion.
    pub fn remove_data_of(&mut self, ident: &impl Ident) {
        for item in self.items.iter_mut() {
            if idents_match(&item.ident, ident) {
                item.removed = true;
            }
        }
    }

    /// Consumes and returns all data corresponding to the identifier.
    pub fn take_data_of(&mut self, ident: &impl Ident) -> impl Iterator<Item = Data> {
        let mut data = Vec::new();

        let mut i = 0;
        while i < self.items.len() {
            if idents_match(&self.items[i].ident, ident) {
                let removed = self.items.swap_remove(i);
                if !removed.removed {
                    data.extend(removed.data);
                }
            } else {
                i += 1;
            }
        }

        data.into_iter()
    }
}

// ## Individual string values
mp4tag_proc::individual_string_value_accessor!("album", "©alb");
mp4tag_proc::individual_string_value_accessor!("copyright", "cprt");
mp4tag_proc::individual_string_value_accessor!("encoder", "©too");
mp4tag_proc::individual_string_value_accessor!("lyrics", "©lyr");
mp4tag_proc::individual_string_value_accessor!("year", "©day");

// ## Multiple string values
mp4tag_proc::multiple_string_values_accessor!("album_artist", "aART");
mp4tag_proc::multiple_string_values_accessor!("artist", "©ART");
mp4tag_proc::multiple_string_values_accessor!("category", "catg");
mp4tag_proc::multiple_string_values_accessor!("comment", "©cmt");
mp4tag_proc::multiple_string_values_accessor!("composer", "©wrt");
mp4tag_proc::multiple_string_values_accessor!("description", "desc");
mp4tag_proc::multiple_string_values_accessor!("grouping", "©grp");
mp4tag_proc::multiple_string_values_accessor!("keyword", "keyw");

// ## Flags
mp4tag_proc::flag_value_accessor!("compilation", "cpil");
mp4tag_proc::flag_value_accessor!("gapless_playback", "pgap");

// ## Integer values
mp4tag_proc::u16_value_accessor!("bpm", "tmpo");

/// ### Title
impl Tag {
    /// Returns the title (`©nam`), or the file name when the
    /// [`title_from_filename`](crate::ReadConfig::title_from_filename) fallback applies.
    pub fn title(&self) -> Option<&str> {
        self.strings_of(&atom::TITLE).next().or(self.fallback_title.as_deref())
    }

    /// Sets the title (`©nam`).
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.fallback_title = None;
        self.set_data(atom::TITLE, Data::Utf8(title.into()));
    }

    /// Removes the title (`©nam`).
    pub fn remove_title(&mut self) {
        self.fallback_title = None;
        self.remove_data_of(&atom::TITLE);
    }
}

/// ### Genre
impl Tag {
    /// Returns all genres (`©gen`). Standard genre codes (`gnre`) are converted to their
    /// textual counterpart when the file is read.
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.strings_of(&atom::CUSTOM_GENRE)
    }

    /// Returns the first genre (`©gen`).
    pub fn genre(&self) -> Option<&str> {
        self.genres().next()
    }

    /// Sets the genre (`©gen`). This will remove all other genres.
    pub fn set_genre(&mut self, genre: impl Into<String>) {
        self.remove_data_of(&atom::STANDARD_GENRE);
        self.set_data(atom::CUSTOM_GENRE, Data::Utf8(genre.into()));
    }

    /// Removes all genres (`©gen` and `gnre`).
    pub fn remove_genres(&mut self) {
        self.remove_data_of(&atom::STANDARD_GENRE);
        self.remove_data_of(&atom::CUSTOM_GENRE);
    }
}

/// ### Track and disc number
impl Tag {
    /// Returns the track number and the total number of tracks (`trkn`).
    pub fn track(&self) -> (Option<u16>, Option<u16>) {
        let data = match self.bytes_of(&atom::TRACK_NUMBER).next() {
            Some(d) => d,
            None => return (None, None),
        };

        let number = be_int!(data, 2, u16).filter(|n| *n != 0);
        let total = be_int!(data, 4, u16).filter(|n| *n != 0);
        (number, total)
    }

    /// Returns the track number (`trkn`).
    pub fn track_number(&self) -> Option<u16> {
        self.track().0
    }

    /// Returns the total number of tracks (`trkn`).
    pub fn total_tracks(&self) -> Option<u16> {
        self.track().1
    }

    /// Sets the track number and the total number of tracks (`trkn`).
    pub fn set_track(&mut self, number: u16, total: u16) {
        let mut data = Vec::with_capacity(8);
        data.extend_from_slice(&[0; 2]);
        data.extend_from_slice(&number.to_be_bytes());
        data.extend_from_slice(&total.to_be_bytes());
        data.extend_from_slice(&[0; 2]);

        self.set_data(atom::TRACK_NUMBER, Data::Reserved(data));
    }

    /// Removes the track number and the total number of tracks (`trkn`).
    pub fn remove_track(&mut self) {
        self.remove_data_of(&atom::TRACK_NUMBER);
    }

    /// Returns the disc number and the total number of discs (`disk`).
    pub fn disc(&self) -> (Option<u16>, Option<u16>) {
        let data = match self.bytes_of(&atom::DISC_NUMBER).next() {
            Some(d) => d,
            None => return (None, None),
        };

        let number = be_int!(data, 2, u16).filter(|n| *n != 0);
        let total = be_int!(data, 4, u16).filter(|n| *n != 0);
        (number, total)
    }

    /// Returns the disc number (`disk`).
    pub fn disc_number(&self) -> Option<u16> {
        self.disc().0
    }

    /// Returns the total number of discs (`disk`).
    pub fn total_discs(&self) -> Option<u16> {
        self.disc().1
    }

    /// Sets the disc number and the total number of discs (`disk`).
    pub fn set_disc(&mut self, number: u16, total: u16) {
        let mut data = Vec::with_capacity(6);
        data.extend_from_slice(&[0; 2]);
        data.extend_from_slice(&number.to_be_bytes());
        data.extend_from_slice(&total.to_be_bytes());

        self.set_data(atom::DISC_NUMBER, Data::Reserved(data));
    }

    /// Removes the disc number and the total number of discs (`disk`).
    pub fn remove_disc(&mut self) {
        self.remove_data_of(&atom::DISC_NUMBER);
    }
}

/// ### Pictures
impl Tag {
    /// Returns all pictures (`covr`) that aren't marked for deletion.
    pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.pictures.iter().filter(|p| !p.removed)
    }

    /// Returns mutable references to all pictures (`covr`), including ones marked for
    /// deletion.
    pub fn pictures_mut(&mut self) -> impl Iterator<Item = &mut Picture> {
        self.pictures.iter_mut()
    }

    /// Returns the first picture (`covr`).
    pub fn artwork(&self) -> Option<ImgRef<'_>> {
        self.pictures().next().map(|p| p.img())
    }

    /// Adds a picture (`covr`).
    pub fn add_picture(&mut self, img: ImgBuf) {
        self.pictures.push(Picture::new(img));
    }

    /// Sets the picture (`covr`). This will remove all other pictures.
    pub fn set_artwork(&mut self, img: ImgBuf) {
        self.remove_pictures();
        self.add_picture(img);
    }

    /// Marks all pictures (`covr`) for deletion.
    pub fn remove_pictures(&mut self) {
        for pic in self.pictures.iter_mut() {
            pic.removed = true;
        }
    }
}

/// ### Chapters
impl Tag {
    /// Returns the chapter list.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Returns a mutable reference to the chapter list. Chapters are written back as a Nero
    /// style chapter list (`chpl`).
    pub fn chapters_mut(&mut self) -> &mut Vec<Chapter> {
        &mut self.chapters
    }

    /// Replaces the chapter list.
    pub fn set_chapters(&mut self, chapters: impl IntoIterator<Item = Chapter>) {
        self.chapters = chapters.into_iter().collect();
    }

    /// Removes all chapters.
    pub fn remove_chapters(&mut self) {
        self.chapters.clear();
    }

    /// Returns the representation the chapters were read from.
    pub fn chapter_source(&self) -> Option<ChapterSource> {
        self.chapter_source
    }

    /// Returns the end of the chapter at the index: the start of the following chapter, or
    /// the file duration for the last one.
    pub fn chapter_end(&self, index: usize) -> Option<Duration> {
        self.chapters.get(index)?;
        match self.chapters.get(index + 1) {
            Some(next) => Some(next.start),
            None => self.duration(),
        }
    }
}

/// ### Popularity
impl Tag {
    /// Returns the popularity as a fraction in `0.0..=1.0` where 1.0 means five stars, read
    /// from the rating (`----:com.apple.iTunes:RATING`) percentage.
    pub fn popularity(&self) -> Option<f32> {
        let percent: u8 = self.strings_of(&atom::RATING).next()?.trim().parse().ok()?;
        Some(rating::from_percent(percent))
    }

    /// Sets the popularity, a fraction in `0.0..=1.0` where 1.0 means five stars, stored as a
    /// rating (`----:com.apple.iTunes:RATING`) percentage.
    pub fn set_popularity(&mut self, popularity: f32) {
        let percent = rating::to_percent(popularity);
        self.set_data(atom::RATING, Data::Utf8(percent.to_string()));
    }

    /// Removes the popularity (`----:com.apple.iTunes:RATING`).
    pub fn remove_popularity(&mut self) {
        self.remove_data_of(&atom::RATING);
    }
}

/// ### Conductor
impl Tag {
    /// Returns the conductor (`----:com.apple.iTunes:CONDUCTOR`).
    pub fn conductor(&self) -> Option<&str> {
        self.strings_of(&atom::CONDUCTOR).next()
    }

    /// Sets the conductor (`----:com.apple.iTunes:CONDUCTOR`).
    pub fn set_conductor(&mut self, conductor: impl Into<String>) {
        self.set_data(atom::CONDUCTOR, Data::Utf8(conductor.into()));
    }

    /// Removes the conductor (`----:com.apple.iTunes:CONDUCTOR`).
    pub fn remove_conductor(&mut self) {
        self.remove_data_of(&atom::CONDUCTOR);
    }
}

/// ### Publisher
impl Tag {
    /// Returns the publisher (`----:com.apple.iTunes:PUBLISHER`).
    pub fn publisher(&self) -> Option<&str> {
        self.strings_of(&atom::PUBLISHER).next()
    }

    /// Sets the publisher (`----:com.apple.iTunes:PUBLISHER`).
    pub fn set_publisher(&mut self, publisher: impl Into<String>) {
        self.set_data(atom::PUBLISHER, Data::Utf8(publisher.into()));
    }

    /// Removes the publisher (`----:com.apple.iTunes:PUBLISHER`).
    pub fn remove_publisher(&mut self) {
        self.remove_data_of(&atom::PUBLISHER);
    }
}

/// ### Original artist
impl Tag {
    /// Returns the original artist (`----:com.apple.iTunes:ORIGINAL ARTIST`).
    pub fn original_artist(&self) -> Option<&str> {
        self.strings_of(&atom::ORIGINAL_ARTIST).next()
    }

    /// Sets the original artist (`----:com.apple.iTunes:ORIGINAL ARTIST`).
    pub fn set_original_artist(&mut self, artist: impl Into<String>) {
        self.set_data(atom::ORIGINAL_ARTIST, Data::Utf8(artist.into()));
    }

    /// Removes the original artist (`----:com.apple.iTunes:ORIGINAL ARTIST`).
    pub fn remove_original_artist(&mut self) {
        self.remove_data_of(&atom::ORIGINAL_ARTIST);
    }
}

/// ### Original album
impl Tag {
    /// Returns the original album (`----:com.apple.iTunes:ORIGINAL ALBUM`).
    pub fn original_album(&self) -> Option<&str> {
        self.strings_of(&atom::ORIGINAL_ALBUM).next()
    }

    /// Sets the original album (`----:com.apple.iTunes:ORIGINAL ALBUM`).
    pub fn set_original_album(&mut self, album: impl Into<String>) {
        self.set_data(atom::ORIGINAL_ALBUM, Data::Utf8(album.into()));
    }

    /// Removes the original album (`----:com.apple.iTunes:ORIGINAL ALBUM`).
    pub fn remove_original_album(&mut self) {
        self.remove_data_of(&atom::ORIGINAL_ALBUM);
    }
}

/// ### Media type
impl Tag {
    /// Returns the media type (`stik`).
    pub fn media_type(&self) -> Option<MediaType> {
        let data = self.bytes_of(&atom::MEDIA_TYPE).next()?;
        MediaType::try_from(*data.first()?).ok()
    }

    /// Sets the media type (`stik`).
    pub fn set_media_type(&mut self, media_type: MediaType) {
        self.set_data(atom::MEDIA_TYPE, Data::BeSigned(vec![media_type.value()]));
    }

    /// Removes the media type (`stik`).
    pub fn remove_media_type(&mut self) {
        self.remove_data_of(&atom::MEDIA_TYPE);
    }
}

/// ### Advisory rating
impl Tag {
    /// Returns the advisory rating (`rtng`).
    pub fn advisory_rating(&self) -> Option<AdvisoryRating> {
        let data = self.bytes_of(&atom::ADVISORY_RATING).next()?;
        Some(AdvisoryRating::from(*data.first()?))
    }

    /// Sets the advisory rating (`rtng`).
    pub fn set_advisory_rating(&mut self, rating: AdvisoryRating) {
        self.set_data(atom::ADVISORY_RATING, Data::BeSigned(vec![rating.value()]));
    }

    /// Removes the advisory rating (`rtng`).
    pub fn remove_advisory_rating(&mut self) {
        self.remove_data_of(&atom::ADVISORY_RATING);
    }
}

// ## Readonly values
impl Tag {
    /// Returns the physical parameters of the audio track.
    pub fn audio_info(&self) -> &AudioInfo {
        &self.info
    }

    /// Returns the duration of the file.
    pub fn duration(&self) -> Option<Duration> {
        self.info.duration
    }

    /// Returns the channel configuration of the audio track.
    pub fn channel_config(&self) -> Option<ChannelConfig> {
        self.info.channel_config
    }

    /// Returns the sample rate of the audio track in Hz.
    pub fn sample_rate(&self) -> Option<u32> {
        self.info.sample_rate
    }

    /// Returns the codec family of the audio track.
    pub fn codec(&self) -> Option<Codec> {
        self.info.codec
    }

    /// Returns the average bitrate of the audio track in bits per second.
    pub fn avg_bitrate(&self) -> Option<u32> {
        self.info.avg_bitrate
    }

    /// Returns the maximum bitrate of the audio track in bits per second.
    pub fn max_bitrate(&self) -> Option<u32> {
        self.info.max_bitrate
    }

    /// Returns whether the audio track is variable bitrate encoded.
    pub fn is_vbr(&self) -> bool {
        self.info.vbr
    }

    /// Returns the filetype (`ftyp`).
    pub fn filetype(&self) -> &str {
        self.ftyp.as_str()
    }
}

// ## Serialization helpers
impl Tag {
    /// Collects the items to serialize: live metadata items followed by the artwork item
    /// built from the live pictures.
    pub(crate) fn items_for_write(&self) -> Vec<MetaItem> {
        let mut items: Vec<MetaItem> = self.meta_items().cloned().collect();

        let pictures: Vec<Data> =
            self.pictures().map(|p| Data::from(p.img.clone())).collect();
        if !pictures.is_empty() {
            items.push(MetaItem::new(DataIdent::Fourcc(atom::ARTWORK), pictures));
        }

        items
    }

    pub(crate) fn chapters_for_write(&self) -> &[Chapter] {
        &self.chapters
    }
}

/// Returns whether the identifier is one of the well known metadata identifiers.
pub(crate) fn is_standard_ident(ident: &DataIdent) -> bool {
    const STANDARD: &[atom::Fourcc] = &[
        atom::ADVISORY_RATING,
        atom::ALBUM,
        atom::ALBUM_ARTIST,
        atom::ARTIST,
        atom::ARTWORK,
        atom::BPM,
        atom::CATEGORY,
        atom::COMMENT,
        atom::COMPILATION,
        atom::COMPOSER,
        atom::COPYRIGHT,
        atom::CUSTOM_GENRE,
        atom::DESCRIPTION,
        atom::DISC_NUMBER,
        atom::ENCODER,
        atom::GAPLESS_PLAYBACK,
        atom::GROUPING,
        atom::KEYWORD,
        atom::LYRICS,
        atom::MEDIA_TYPE,
        atom::STANDARD_GENRE,
        atom::TITLE,
        atom::TRACK_NUMBER,
        atom::YEAR,
    ];

    match ident {
        DataIdent::Fourcc(fourcc) => STANDARD.contains(fourcc),
        DataIdent::Freeform { .. } => false,
    }
}
