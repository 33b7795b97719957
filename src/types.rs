use std::fmt;
use std::time::Duration;

use crate::atom::Fourcc;
use crate::ErrorKind;

// ITunes media types
pub(crate) const MOVIE: u8 = 0;
pub(crate) const NORMAL: u8 = 1;
pub(crate) const AUDIOBOOK: u8 = 2;
pub(crate) const WHACKED_BOOKMARK: u8 = 5;
pub(crate) const MUSIC_VIDEO: u8 = 6;
pub(crate) const SHORT_FILM: u8 = 9;
pub(crate) const TV_SHOW: u8 = 10;
pub(crate) const BOOKLET: u8 = 11;

// ITunes advisory ratings
pub(crate) const CLEAN: u8 = 2;
pub(crate) const INOFFENSIVE: u8 = 0;

/// An enum describing the media type of a file stored in the `stik` atom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MediaType {
    /// A media type stored as 0 in the `stik` atom.
    Movie,
    /// A media type stored as 1 in the `stik` atom.
    Normal,
    /// A media type stored as 2 in the `stik` atom.
    AudioBook,
    /// A media type stored as 5 in the `stik` atom.
    WhackedBookmark,
    /// A media type stored as 6 in the `stik` atom.
    MusicVideo,
    /// A media type stored as 9 in the `stik` atom.
    ShortFilm,
    /// A media type stored as 10 in the `stik` atom.
    TvShow,
    /// A media type stored as 11 in the `stik` atom.
    Booklet,
}

impl MediaType {
    /// Returns the integer value corresponding to the media type.
    pub fn value(&self) -> u8 {
        match self {
            Self::Movie => MOVIE,
            Self::Normal => NORMAL,
            Self::AudioBook => AUDIOBOOK,
            Self::WhackedBookmark => WHACKED_BOOKMARK,
            Self::MusicVideo => MUSIC_VIDEO,
            Self::ShortFilm => SHORT_FILM,
            Self::TvShow => TV_SHOW,
            Self::Booklet => BOOKLET,
        }
    }
}

impl TryFrom<u8> for MediaType {
    type Error = crate::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            MOVIE => Ok(Self::Movie),
            NORMAL => Ok(Self::Normal),
            AUDIOBOOK => Ok(Self::AudioBook),
            WHACKED_BOOKMARK => Ok(Self::WhackedBookmark),
            MUSIC_VIDEO => Ok(Self::MusicVideo),
            SHORT_FILM => Ok(Self::ShortFilm),
            TV_SHOW => Ok(Self::TvShow),
            BOOKLET => Ok(Self::Booklet),
            _ => Err(crate::Error::new(ErrorKind::UnknownMediaType(value), "Unknown media type")),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Normal => write!(f, "normal"),
            Self::AudioBook => write!(f, "audiobook"),
            Self::WhackedBookmark => write!(f, "whacked bookmark"),
            Self::MusicVideo => write!(f, "music video"),
            Self::ShortFilm => write!(f, "short film"),
            Self::TvShow => write!(f, "tv show"),
            Self::Booklet => write!(f, "booklet"),
        }
    }
}

/// An enum describing the advisory rating of a file stored in the `rtng` atom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdvisoryRating {
    /// A rating stored as 2 in the `rtng` atom.
    Clean,
    /// A rating stored as 0 in the `rtng` atom.
    Inoffensive,
    /// A rating indicated by any other value than 0 or 2 in the `rtng` atom, containing the
    /// value.
    Explicit(u8),
}

impl AdvisoryRating {
    /// Returns the integer value corresponding to the rating.
    pub fn value(&self) -> u8 {
        match self {
            Self::Clean => CLEAN,
            Self::Inoffensive => INOFFENSIVE,
            Self::Explicit(r) => *r,
        }
    }
}

impl From<u8> for AdvisoryRating {
    fn from(rating: u8) -> Self {
        match rating {
            CLEAN => Self::Clean,
            INOFFENSIVE => Self::Inoffensive,
            _ => Self::Explicit(rating),
        }
    }
}

impl fmt::Display for AdvisoryRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Inoffensive => write!(f, "inoffensive"),
            Self::Explicit(r) => write!(f, "explicit {r}"),
        }
    }
}

/// An enum representing the channel layout of an audio track, derived from the channel count of
/// its sample description entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChannelConfig {
    /// A single channel.
    Mono,
    /// Two channels.
    Stereo,
    /// More than two channels, containing the channel count.
    Multichannel(u16),
}

impl From<u16> for ChannelConfig {
    fn from(channels: u16) -> Self {
        match channels {
            1 => Self::Mono,
            2 => Self::Stereo,
            n => Self::Multichannel(n),
        }
    }
}

impl ChannelConfig {
    /// Returns the number of channels.
    pub fn channel_count(&self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
            Self::Multichannel(n) => *n,
        }
    }
}

impl fmt::Display for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mono => write!(f, "mono"),
            Self::Stereo => write!(f, "stereo"),
            Self::Multichannel(n) => write!(f, "{n} channels"),
        }
    }
}

/// An enum representing the codec family of an audio track, derived from the fourcc of its
/// sample description entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Codec {
    /// Advanced audio coding (`mp4a`).
    Aac,
    /// Encrypted advanced audio coding (`enca`).
    EncryptedAac,
    /// Apple lossless audio codec (`alac`).
    Alac,
    /// Adaptive multi-rate narrowband speech (`samr`).
    AmrNb,
    /// Adaptive multi-rate wideband speech (`sawb`).
    AmrWb,
    /// An unrecognized sample description entry, containing its fourcc.
    Unknown(Fourcc),
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aac => write!(f, "aac"),
            Self::EncryptedAac => write!(f, "aac (encrypted)"),
            Self::Alac => write!(f, "alac"),
            Self::AmrNb => write!(f, "amr-nb"),
            Self::AmrWb => write!(f, "amr-wb"),
            Self::Unknown(fourcc) => write!(f, "unknown ({fourcc})"),
        }
    }
}

/// A struct containing the physical parameters of the audio track, read alongside the metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioInfo {
    /// The duration of the file.
    pub duration: Option<Duration>,
    /// The channel configuration of the audio track.
    pub channel_config: Option<ChannelConfig>,
    /// The sample rate of the audio track in Hz.
    pub sample_rate: Option<u32>,
    /// The codec family of the audio track.
    pub codec: Option<Codec>,
    /// The maximum bitrate of the audio track in bits per second.
    pub max_bitrate: Option<u32>,
    /// The average bitrate of the audio track in bits per second.
    pub avg_bitrate: Option<u32>,
    /// Whether the sample sizes vary by more than 1%, indicating variable bitrate encoding.
    pub vbr: bool,
}

/// A chapter of an audio file. Start times are absolute, the end of a chapter is the start of
/// the following one, or the end of the file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Chapter {
    /// The start of the chapter.
    pub start: Duration,
    /// The title of the chapter.
    pub title: String,
}

impl Chapter {
    /// Creates a new chapter with the start time and title.
    pub fn new(start: Duration, title: impl Into<String>) -> Self {
        Self { start, title: title.into() }
    }
}
