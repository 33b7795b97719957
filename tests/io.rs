use std::io::Cursor;
use std::time::Duration;

use mp4tag::{
    Chapter, ChapterSource, ChannelConfig, Codec, Data, FreeformIdent, Img, ImgBuf, Tag,
    TagSystem, WriteConfig,
};

const TEST_IDENT: FreeformIdent = FreeformIdent::new("com.apple.iTunes", "TEST");
const TES2_IDENT: FreeformIdent = FreeformIdent::new("com.apple.iTunes", "TES2");

const JPEG_DATA: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x10, 0x20, 0x30, 0x40];
const PNG_DATA: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x01, 0x02];

// ## Fixture builder
//
// Builds a small but structurally complete m4a file: ftyp, moov with an audio track (sample
// tables included), user data, and an mdat whose chunk offsets are consistent.

fn atom(fourcc: &[u8; 4], content: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(content.len() + 8);
    buf.extend_from_slice(&(content.len() as u32 + 8).to_be_bytes());
    buf.extend_from_slice(fourcc);
    buf.extend_from_slice(content);
    buf
}

fn full_content(version: u8, content: &[u8]) -> Vec<u8> {
    let mut buf = vec![version, 0, 0, 0];
    buf.extend_from_slice(content);
    buf
}

fn data_atom(class: u32, payload: &[u8]) -> Vec<u8> {
    let mut content = class.to_be_bytes().to_vec();
    content.extend_from_slice(&[0; 4]);
    content.extend_from_slice(payload);
    atom(b"data", &content)
}

fn item(fourcc: &[u8; 4], class: u32, payload: &[u8]) -> Vec<u8> {
    atom(fourcc, &data_atom(class, payload))
}

fn freeform_item(mean: &str, name: &str, class: u32, payload: &[u8]) -> Vec<u8> {
    let mut content = atom(b"mean", &full_content(0, mean.as_bytes()));
    content.extend_from_slice(&atom(b"name", &full_content(0, name.as_bytes())));
    content.extend_from_slice(&data_atom(class, payload));
    atom(b"----", &content)
}

fn chpl_box(chapters: &[(u64, &str)]) -> Vec<u8> {
    let mut content = vec![1, 0, 0, 0, 0]; // version, flags, reserved
    content.extend_from_slice(&(chapters.len() as u32).to_be_bytes());
    for (start_ms, title) in chapters {
        content.extend_from_slice(&(start_ms * 10_000).to_be_bytes());
        content.push(title.len() as u8);
        content.extend_from_slice(title.as_bytes());
    }
    atom(b"chpl", &content)
}

fn media_hdlr(subtype: &[u8; 4]) -> Vec<u8> {
    let mut content = vec![0; 8];
    content.extend_from_slice(subtype);
    content.extend_from_slice(&[0; 13]);
    atom(b"hdlr", &content)
}

fn stbl_box(
    durations: &[(u32, u32)],
    stsc: &[(u32, u32)],
    sizes: &[u32],
    offsets: &[u32],
    entry: Vec<u8>,
) -> Vec<u8> {
    let mut stsd = vec![0; 4]; // entry count follows the full head
    stsd.extend_from_slice(&1u32.to_be_bytes());
    stsd.extend_from_slice(&entry);

    let mut stts = (durations.len() as u32).to_be_bytes().to_vec();
    for (count, duration) in durations {
        stts.extend_from_slice(&count.to_be_bytes());
        stts.extend_from_slice(&duration.to_be_bytes());
    }

    let mut stsc_content = (stsc.len() as u32).to_be_bytes().to_vec();
    for (first_chunk, samples_per_chunk) in stsc {
        stsc_content.extend_from_slice(&first_chunk.to_be_bytes());
        stsc_content.extend_from_slice(&samples_per_chunk.to_be_bytes());
        stsc_content.extend_from_slice(&1u32.to_be_bytes());
    }

    let mut stsz = 0u32.to_be_bytes().to_vec();
    stsz.extend_from_slice(&(sizes.len() as u32).to_be_bytes());
    for s in sizes {
        stsz.extend_from_slice(&s.to_be_bytes());
    }

    let mut stco = (offsets.len() as u32).to_be_bytes().to_vec();
    for o in offsets {
        stco.extend_from_slice(&o.to_be_bytes());
    }

    let mut content = atom(b"stsd", &stsd);
    content.extend_from_slice(&atom(b"stts", &full_content(0, &stts)));
    content.extend_from_slice(&atom(b"stsc", &full_content(0, &stsc_content)));
    content.extend_from_slice(&atom(b"stsz", &full_content(0, &stsz)));
    content.extend_from_slice(&atom(b"stco", &full_content(0, &stco)));
    atom(b"stbl", &content)
}

fn mp4a_entry(channels: u16, sample_rate: u32) -> Vec<u8> {
    let mut content = vec![0; 16];
    content.extend_from_slice(&channels.to_be_bytes());
    content.extend_from_slice(&16u16.to_be_bytes()); // sample size
    content.extend_from_slice(&[0; 4]); // compression id, packet size
    content.extend_from_slice(&(sample_rate << 16).to_be_bytes());
    atom(b"mp4a", &content)
}

fn tkhd_box(id: u32) -> Vec<u8> {
    let mut content = vec![0; 8];
    content.extend_from_slice(&id.to_be_bytes());
    atom(b"tkhd", &full_content(0, &content))
}

fn mdhd_box(timescale: u32, duration: u32) -> Vec<u8> {
    let mut content = vec![0; 8];
    content.extend_from_slice(&timescale.to_be_bytes());
    content.extend_from_slice(&duration.to_be_bytes());
    content.extend_from_slice(&[0; 4]); // language, quality
    atom(b"mdhd", &full_content(0, &content))
}

#[derive(Default)]
struct Fixture {
    items: Vec<Vec<u8>>,
    chpl: Option<Vec<u8>>,
    qt_chapters: Vec<(u32, &'static str)>,
    free_len: Option<u32>,
    /// Bytes the caller intends to prepend to the finished file.
    head_extra: u32,
}

const AUDIO_SAMPLES: [&[u8]; 4] = [b"aaa", b"bbb", b"ccc", b"ddd"];
const MOVIE_TIMESCALE: u32 = 1000;
const MOVIE_DURATION: u32 = 4000;
const MEDIA_TIMESCALE: u32 = 44100;

impl Fixture {
    fn build(&self) -> Vec<u8> {
        // offsets are unknown until the moov length is, so the file is built twice
        let first = self.build_with_base(0);
        let probe = first.len() as u32
            - AUDIO_SAMPLES.iter().map(|s| s.len() as u32).sum::<u32>()
            - self
                .qt_chapters
                .iter()
                .map(|(_, t)| t.len() as u32 + 2)
                .sum::<u32>();
        self.build_with_base(probe + self.head_extra)
    }

    /// Builds the file with mdat content starting at `content_base`.
    fn build_with_base(&self, content_base: u32) -> Vec<u8> {
        let audio_offsets = [content_base, content_base + 6];
        let titles_offset =
            content_base + AUDIO_SAMPLES.iter().map(|s| s.len() as u32).sum::<u32>();

        let mut mvhd = vec![0; 8];
        mvhd.extend_from_slice(&MOVIE_TIMESCALE.to_be_bytes());
        mvhd.extend_from_slice(&MOVIE_DURATION.to_be_bytes());
        let mvhd = atom(b"mvhd", &full_content(0, &mvhd));

        let audio_stbl = stbl_box(
            &[(4, MEDIA_TIMESCALE)],
            &[(1, 2)],
            &[3, 3, 3, 3],
            &audio_offsets,
            mp4a_entry(2, MEDIA_TIMESCALE),
        );
        let mut audio_mdia = mdhd_box(MEDIA_TIMESCALE, MEDIA_TIMESCALE * 4);
        audio_mdia.extend_from_slice(&media_hdlr(b"soun"));
        audio_mdia.extend_from_slice(&atom(b"minf", &audio_stbl));

        let mut audio_trak = tkhd_box(1);
        if !self.qt_chapters.is_empty() {
            let chap = atom(b"chap", &2u32.to_be_bytes());
            audio_trak.extend_from_slice(&atom(b"tref", &chap));
        }
        audio_trak.extend_from_slice(&atom(b"mdia", &audio_mdia));
        let audio_trak = atom(b"trak", &audio_trak);

        let mut moov_content = mvhd;
        moov_content.extend_from_slice(&audio_trak);

        if !self.qt_chapters.is_empty() {
            let durations: Vec<(u32, u32)> =
                self.qt_chapters.iter().map(|(d, _)| (1, *d)).collect();
            let sizes: Vec<u32> =
                self.qt_chapters.iter().map(|(_, t)| t.len() as u32 + 2).collect();
            let text_stbl = stbl_box(
                &durations,
                &[(1, self.qt_chapters.len() as u32)],
                &sizes,
                &[titles_offset],
                atom(b"text", &[0; 8]),
            );
            let mut text_mdia = mdhd_box(MOVIE_TIMESCALE, MOVIE_DURATION);
            text_mdia.extend_from_slice(&media_hdlr(b"text"));
            text_mdia.extend_from_slice(&atom(b"minf", &text_stbl));

            let mut text_trak = tkhd_box(2);
            text_trak.extend_from_slice(&atom(b"mdia", &text_mdia));
            moov_content.extend_from_slice(&atom(b"trak", &text_trak));
        }

        let mut ilst = Vec::new();
        for i in self.items.iter() {
            ilst.extend_from_slice(i);
        }
        let mut meta = media_hdlr(b"mdir");
        meta.extend_from_slice(&atom(b"ilst", &ilst));
        let mut udta = atom(b"meta", &full_content(0, &meta));
        if let Some(chpl) = &self.chpl {
            udta.extend_from_slice(chpl);
        }
        moov_content.extend_from_slice(&atom(b"udta", &udta));

        let mut file = atom(b"ftyp", b"M4A \x00\x00\x02\x00isomiso2");
        file.extend_from_slice(&atom(b"moov", &moov_content));
        if let Some(len) = self.free_len {
            file.extend_from_slice(&atom(b"free", &vec![0; len as usize - 8]));
        }

        let mut mdat = Vec::new();
        for s in AUDIO_SAMPLES {
            mdat.extend_from_slice(s);
        }
        for (_, title) in self.qt_chapters.iter() {
            mdat.extend_from_slice(&(title.len() as u16).to_be_bytes());
            mdat.extend_from_slice(title.as_bytes());
        }
        file.extend_from_slice(&atom(b"mdat", &mdat));

        file
    }
}

fn tagged_fixture() -> Vec<u8> {
    Fixture {
        items: vec![
            item(b"\xa9nam", 1, b"TEST TITLE"),
            item(b"\xa9ART", 1, b"TEST ARTIST"),
            item(b"trkn", 0, &[0, 0, 0, 7, 0, 13, 0, 0]),
            item(b"gnre", 0, &[0, 80]),
            item(b"covr", 13, JPEG_DATA),
            freeform_item("com.apple.iTunes", "TEST", 1, b"xxx"),
        ],
        ..Default::default()
    }
    .build()
}

// ## Helpers

#[track_caller]
fn read_tag(file: &[u8]) -> Tag {
    Tag::read_from(&mut Cursor::new(file.to_vec())).unwrap()
}

#[track_caller]
fn save_tag(file: &[u8], tag: &Tag) -> Vec<u8> {
    let mut reader = Cursor::new(file.to_vec());
    let mut out = Vec::new();
    tag.write_to(&mut reader, &mut out).unwrap();
    out
}

/// Locates a top level box and returns the range of its content.
fn find_box(file: &[u8], fourcc: &[u8; 4]) -> Option<(usize, usize)> {
    let mut pos = 0;
    while pos + 8 <= file.len() {
        let len = u32::from_be_bytes(file[pos..pos + 4].try_into().unwrap()) as usize;
        if &file[pos + 4..pos + 8] == fourcc {
            return Some((pos + 8, pos + len));
        }
        pos += len;
    }
    None
}

/// Verifies that the box sizes tile their parent exactly, recursively.
#[track_caller]
fn assert_box_tiling(file: &[u8]) {
    assert_tiling_range(file, 0, file.len());
}

#[track_caller]
fn assert_tiling_range(file: &[u8], start: usize, end: usize) {
    const CONTAINERS: [&[u8; 4]; 8] =
        [b"moov", b"trak", b"mdia", b"minf", b"stbl", b"udta", b"ilst", b"tref"];

    let mut pos = start;
    while pos < end {
        assert!(pos + 8 <= end, "truncated box head at {pos}");
        let len = u32::from_be_bytes(file[pos..pos + 4].try_into().unwrap()) as usize;
        let fourcc: [u8; 4] = file[pos + 4..pos + 8].try_into().unwrap();
        assert!(len >= 8, "box {} with invalid length {len}", String::from_utf8_lossy(&fourcc));
        assert!(
            pos + len <= end,
            "box {} with length {len} exceeds parent",
            String::from_utf8_lossy(&fourcc)
        );

        if CONTAINERS.contains(&&fourcc) {
            assert_tiling_range(file, pos + 8, pos + len);
        } else if &fourcc == b"meta" {
            assert_tiling_range(file, pos + 12, pos + len);
        }

        pos += len;
    }
    assert_eq!(pos, end, "boxes don't tile their parent");
}

/// Reads the first audio sample of every chunk through the chunk offset table.
#[track_caller]
fn assert_chunk_offsets_valid(file: &[u8]) {
    let tag = read_tag(file);
    assert_eq!(tag.duration(), Some(Duration::from_secs(4)));

    let offsets = audio_chunk_offsets(file);
    assert_eq!(offsets.len(), 2);
    assert_eq!(&file[offsets[0]..offsets[0] + 3], b"aaa");
    assert_eq!(&file[offsets[1]..offsets[1] + 3], b"ccc");
}

/// Extracts the chunk offsets of the first track the hard way.
fn audio_chunk_offsets(file: &[u8]) -> Vec<usize> {
    fn child(file: &[u8], start: usize, end: usize, fourcc: &[u8; 4]) -> Option<(usize, usize)> {
        let mut pos = start;
        while pos + 8 <= end {
            let len = u32::from_be_bytes(file[pos..pos + 4].try_into().unwrap()) as usize;
            if &file[pos + 4..pos + 8] == fourcc {
                return Some((pos + 8, pos + len));
            }
            pos += len;
        }
        None
    }

    let (mut start, mut end) = find_box(file, b"moov").unwrap();
    for fourcc in [b"trak", b"mdia", b"minf", b"stbl", b"stco"] {
        let range = child(file, start, end, fourcc).unwrap();
        start = range.0;
        end = range.1;
    }

    let entries = u32::from_be_bytes(file[start + 4..start + 8].try_into().unwrap()) as usize;
    (0..entries)
        .map(|i| {
            let pos = start + 8 + 4 * i;
            u32::from_be_bytes(file[pos..pos + 4].try_into().unwrap()) as usize
        })
        .collect()
}

// ## Reading

#[test]
fn read_tagged_file() {
    let file = tagged_fixture();
    let tag = read_tag(&file);

    assert_eq!(tag.title(), Some("TEST TITLE"));
    assert_eq!(tag.artist(), Some("TEST ARTIST"));
    assert_eq!(tag.track(), (Some(7), Some(13)));
    assert_eq!(tag.genre(), Some("Hard Rock"));
    assert_eq!(tag.strings_of(&TEST_IDENT).next(), Some("xxx"));

    assert_eq!(tag.pictures().count(), 1);
    let artwork = tag.artwork().unwrap();
    assert_eq!(artwork, Img::jpeg(JPEG_DATA));

    assert_eq!(tag.duration(), Some(Duration::from_secs(4)));
    assert_eq!(tag.channel_config(), Some(ChannelConfig::Stereo));
    assert_eq!(tag.sample_rate(), Some(44100));
    assert_eq!(tag.codec(), Some(Codec::Aac));
    assert!(tag.avg_bitrate().is_some());
    assert!(!tag.is_vbr());
}

#[test]
fn read_untagged_file() {
    let file = Fixture::default().build();
    let tag = read_tag(&file);

    assert!(tag.is_empty());
    assert_eq!(tag.duration(), Some(Duration::from_secs(4)));
}

// ## Writing

#[test]
fn add_conductor_and_picture() {
    let file = tagged_fixture();

    let mut tag = read_tag(&file);
    tag.set_conductor("John Jackman");
    tag.add_picture(ImgBuf::png(PNG_DATA.to_vec()));
    let out = save_tag(&file, &tag);

    let tag = read_tag(&out);
    assert_eq!(tag.conductor(), Some("John Jackman"));
    assert_eq!(tag.pictures().count(), 2);
    let png = tag.pictures().nth(1).unwrap();
    assert_eq!(png.img(), Img::png(PNG_DATA));

    // everything else is untouched
    assert_eq!(tag.title(), Some("TEST TITLE"));
    assert_eq!(tag.strings_of(&TEST_IDENT).next(), Some("xxx"));
    assert_box_tiling(&out);
    assert_chunk_offsets_valid(&out);
}

#[test]
fn clear_conductor_and_remove_picture() {
    let file = tagged_fixture();

    let mut tag = read_tag(&file);
    tag.set_conductor("John Jackman");
    tag.add_picture(ImgBuf::png(PNG_DATA.to_vec()));
    let out = save_tag(&file, &tag);

    let mut tag = read_tag(&out);
    tag.set_conductor("");
    for pic in tag.pictures_mut().filter(|p| p.img().fmt == mp4tag::ImgFmt::Png) {
        pic.mark_removed();
    }
    let out = save_tag(&out, &tag);

    let tag = read_tag(&out);
    assert_eq!(tag.conductor(), Some(""));
    assert_eq!(tag.pictures().count(), 1);
    assert_eq!(tag.artwork().unwrap(), Img::jpeg(JPEG_DATA));
    assert_chunk_offsets_valid(&out);
}

#[test]
fn custom_fields_and_pictures_survive_round_trip() {
    let file = Fixture::default().build();

    let mut tag = read_tag(&file);
    tag.set_data(TEST_IDENT, Data::Utf8("This is a test 父".to_owned()));
    tag.set_data(TES2_IDENT, Data::Utf8("This is another test 父".to_owned()));
    tag.add_picture(ImgBuf::jpeg(JPEG_DATA.to_vec()));
    tag.add_picture(ImgBuf::jpeg(b"\xff\xd8\xff\xdbsecond".to_vec()));
    let out = save_tag(&file, &tag);

    let tag = read_tag(&out);
    assert_eq!(tag.strings_of(&TEST_IDENT).next(), Some("This is a test 父"));
    assert_eq!(tag.strings_of(&TES2_IDENT).next(), Some("This is another test 父"));
    assert_eq!(tag.pictures().count(), 2);
    assert_box_tiling(&out);
    assert_chunk_offsets_valid(&out);
}

#[test]
fn tombstoned_items_are_dropped_on_save() {
    let file = Fixture::default().build();

    let mut tag = read_tag(&file);
    tag.set_data(TEST_IDENT, Data::Utf8("This is a test 父".to_owned()));
    tag.set_data(TES2_IDENT, Data::Utf8("This is another test 父".to_owned()));
    tag.add_picture(ImgBuf::jpeg(JPEG_DATA.to_vec()));
    tag.add_picture(ImgBuf::jpeg(b"\xff\xd8\xff\xdbsecond".to_vec()));
    let out = save_tag(&file, &tag);

    let mut tag = read_tag(&out);
    tag.remove_data_of(&TEST_IDENT);
    if let Some(first) = tag.pictures_mut().next() {
        first.mark_removed();
    }
    // tombstones are still skipped by the accessors before saving
    assert_eq!(tag.strings_of(&TEST_IDENT).next(), None);
    assert_eq!(tag.pictures().count(), 1);
    let out = save_tag(&out, &tag);

    let tag = read_tag(&out);
    assert_eq!(tag.strings_of(&TEST_IDENT).next(), None);
    assert_eq!(tag.strings_of(&TES2_IDENT).next(), Some("This is another test 父"));
    assert_eq!(tag.pictures().count(), 1);
    assert_eq!(tag.artwork().unwrap(), Img::jpeg(&b"\xff\xd8\xff\xdbsecond"[..]));
}

#[test]
fn media_data_is_preserved() {
    let file = tagged_fixture();
    let (mdat_start, mdat_end) = find_box(&file, b"mdat").unwrap();
    let mdat = file[mdat_start..mdat_end].to_vec();

    let mut tag = read_tag(&file);
    tag.set_album("NEW ALBUM");
    tag.add_picture(ImgBuf::png(PNG_DATA.to_vec()));
    let out = save_tag(&file, &tag);

    let (out_start, out_end) = find_box(&out, b"mdat").unwrap();
    assert_eq!(&out[out_start..out_end], &mdat[..]);
    assert_chunk_offsets_valid(&out);
}

#[test]
fn second_save_is_idempotent() {
    let file = tagged_fixture();

    let mut tag = read_tag(&file);
    tag.set_album("IDEMPOTENT");
    let first = save_tag(&file, &tag);

    let tag = read_tag(&first);
    let second = save_tag(&first, &tag);

    assert_eq!(first, second);
}

#[test]
fn shrinking_tag_is_absorbed_by_padding() {
    let file = tagged_fixture();

    // the first save creates a padding atom
    let mut tag = read_tag(&file);
    tag.set_comment("A reasonably sized comment");
    let out = save_tag(&file, &tag);
    assert!(find_box(&out, b"free").is_some());

    // dropping the comment shrinks the tag, the padding absorbs the delta
    let mut tag = read_tag(&out);
    tag.remove_comments();
    let next = save_tag(&out, &tag);

    assert_eq!(out.len(), next.len());
    let (mdat, _) = find_box(&out, b"mdat").unwrap();
    let (next_mdat, _) = find_box(&next, b"mdat").unwrap();
    assert_eq!(mdat, next_mdat);
    assert_chunk_offsets_valid(&next);
}

#[test]
fn no_padding_is_created_when_disabled() {
    let file = Fixture::default().build();
    let tag = read_tag(&file);

    let mut reader = Cursor::new(file.to_vec());
    let mut out = Vec::new();
    let cfg = WriteConfig { add_new_padding: false, ..Default::default() };
    tag.write_to_with(&mut reader, &mut out, &cfg).unwrap();

    assert!(find_box(&out, b"free").is_none());
    assert_box_tiling(&out);
}

#[test]
fn write_bigger() {
    let file = tagged_fixture();

    let mut tag = read_tag(&file);
    let data: Vec<u8> = (0..64 * 1024).map(|n| n as u8).collect();
    tag.add_picture(ImgBuf::png(
        PNG_DATA.iter().copied().chain(data).collect::<Vec<u8>>(),
    ));
    let out = save_tag(&file, &tag);

    let tag = read_tag(&out);
    assert_eq!(tag.pictures().count(), 2);
    assert_eq!(tag.title(), Some("TEST TITLE"));
    assert_chunk_offsets_valid(&out);
}

#[test]
fn write_empty() {
    let file = tagged_fixture();

    let tag = Tag::default();
    let out = save_tag(&file, &tag);

    let tag = read_tag(&out);
    assert!(tag.is_empty());
    assert_eq!(tag.duration(), Some(Duration::from_secs(4)));
    assert_box_tiling(&out);
    assert_chunk_offsets_valid(&out);
}

// ## Chapters

#[test]
fn nero_chapters() {
    let chapters: [(u64, &str); 4] =
        [(0, "Chapter One"), (1139, "Chapter 2"), (2728, "Chapter 003"), (3269, "Chapter 四")];
    let file = Fixture { chpl: Some(chpl_box(&chapters)), ..Default::default() }.build();

    let tag = read_tag(&file);
    assert_eq!(tag.chapter_source(), Some(ChapterSource::Nero));
    assert_eq!(tag.chapters().len(), 4);
    for (i, (start_ms, title)) in chapters.iter().enumerate() {
        assert_eq!(tag.chapters()[i].start, Duration::from_millis(*start_ms));
        assert_eq!(tag.chapters()[i].title, *title);
    }
}

#[test]
fn replace_nero_chapters() {
    let chapters: [(u64, &str); 4] =
        [(0, "Chapter One"), (1139, "Chapter 2"), (2728, "Chapter 003"), (3269, "Chapter 四")];
    let file = Fixture { chpl: Some(chpl_box(&chapters)), ..Default::default() }.build();

    let mut tag = read_tag(&file);
    tag.set_chapters([
        Chapter::new(Duration::from_millis(123), "aaa"),
        Chapter::new(Duration::from_millis(1230), "aaa0"),
    ]);
    let out = save_tag(&file, &tag);

    let tag = read_tag(&out);
    assert_eq!(
        tag.chapters(),
        [
            Chapter::new(Duration::from_millis(123), "aaa"),
            Chapter::new(Duration::from_millis(1230), "aaa0"),
        ]
    );
    assert_box_tiling(&out);
    assert_chunk_offsets_valid(&out);
}

#[test]
fn removing_all_chapters_drops_the_chapter_list() {
    let file =
        Fixture { chpl: Some(chpl_box(&[(0, "only")])), ..Default::default() }.build();

    let mut tag = read_tag(&file);
    tag.remove_chapters();
    let out = save_tag(&file, &tag);

    let (start, end) = find_box(&out, b"moov").unwrap();
    let moov = &out[start..end];
    assert!(!moov.windows(4).any(|w| w == b"chpl"));

    let tag = read_tag(&out);
    assert!(tag.chapters().is_empty());
}

#[test]
fn quicktime_chapter_track() {
    let file = Fixture {
        qt_chapters: vec![
            (1139, "Chapter One"),
            (1589, "Chapter 2"),
            (541, "Chapter 003"),
            (731, "Chapter 四"),
        ],
        ..Default::default()
    }
    .build();

    let tag = read_tag(&file);
    assert_eq!(tag.chapter_source(), Some(ChapterSource::QuicktimeTrack));
    assert_eq!(
        tag.chapters(),
        [
            Chapter::new(Duration::from_millis(0), "Chapter One"),
            Chapter::new(Duration::from_millis(1139), "Chapter 2"),
            Chapter::new(Duration::from_millis(2728), "Chapter 003"),
            Chapter::new(Duration::from_millis(3269), "Chapter 四"),
        ]
    );
}

#[test]
fn quicktime_chapters_are_written_back_as_nero() {
    let file = Fixture {
        qt_chapters: vec![(1139, "Chapter One"), (2861, "Chapter 2")],
        ..Default::default()
    }
    .build();

    let tag = read_tag(&file);
    let out = save_tag(&file, &tag);

    let tag = read_tag(&out);
    assert_eq!(tag.chapter_source(), Some(ChapterSource::Nero));
    assert_eq!(
        tag.chapters(),
        [
            Chapter::new(Duration::from_millis(0), "Chapter One"),
            Chapter::new(Duration::from_millis(1139), "Chapter 2"),
        ]
    );
}

// ## Coexistence

fn id3v2_block(content_len: usize) -> Vec<u8> {
    let mut block = b"ID3\x04\x00\x00".to_vec();
    let len = content_len as u32;
    block.extend_from_slice(&[
        (len >> 21) as u8 & 0x7f,
        (len >> 14) as u8 & 0x7f,
        (len >> 7) as u8 & 0x7f,
        len as u8 & 0x7f,
    ]);
    block.extend_from_slice(&vec![0; content_len]);
    block
}

fn id3v1_block() -> Vec<u8> {
    let mut block = vec![0; 128];
    block[..3].copy_from_slice(b"TAG");
    block
}

fn fixture_with_siblings() -> Vec<u8> {
    let id3v2 = id3v2_block(20);
    let file = Fixture {
        items: vec![item(b"\xa9nam", 1, b"TEST TITLE")],
        head_extra: id3v2.len() as u32,
        ..Default::default()
    }
    .build();

    let mut full = id3v2;
    full.extend_from_slice(&file);
    full.extend_from_slice(&id3v1_block());
    full
}

#[test]
fn sibling_tags_are_preserved() {
    let file = fixture_with_siblings();

    let tag = read_tag(&file);
    assert_eq!(tag.title(), Some("TEST TITLE"));

    let mut tag = read_tag(&file);
    tag.set_album("NEW ALBUM");
    let out = save_tag(&file, &tag);

    assert!(out.starts_with(b"ID3"));
    assert_eq!(&out[out.len() - 128..out.len() - 125], b"TAG");

    let tag = read_tag(&out);
    assert_eq!(tag.title(), Some("TEST TITLE"));
    assert_eq!(tag.album(), Some("NEW ALBUM"));
}

#[test]
fn removing_sibling_systems() {
    let file = fixture_with_siblings();
    let id3v2_len = 30;

    let mut tag = read_tag(&file);
    tag.remove_system(TagSystem::Id3v2);
    tag.remove_system(TagSystem::Id3v1);
    let out = save_tag(&file, &tag);

    assert!(!out.starts_with(b"ID3"));
    assert_ne!(&out[out.len() - 128..out.len() - 125], b"TAG");
    assert_eq!(out.len(), file.len() - id3v2_len - 128 + 1024);

    let tag = read_tag(&out);
    assert_eq!(tag.title(), Some("TEST TITLE"));
    assert_chunk_offsets_valid(&out);
}

#[test]
fn removing_the_native_system() {
    let file = tagged_fixture();

    let mut tag = read_tag(&file);
    tag.remove_system(TagSystem::Native);
    assert!(tag.is_empty());
    let out = save_tag(&file, &tag);

    let tag = read_tag(&out);
    assert!(tag.is_empty());
    assert_eq!(tag.duration(), Some(Duration::from_secs(4)));
}

// ## Paths

#[test]
fn path_round_trip() {
    let _ = std::fs::create_dir_all("target/test-files");
    let path = "target/test-files/sample.m4a";
    std::fs::write(path, tagged_fixture()).unwrap();

    let mut tag = Tag::read_from_path(path).unwrap();
    assert_eq!(tag.title(), Some("TEST TITLE"));

    tag.set_album("PATH ALBUM");
    tag.write_to_path(path).unwrap();

    let tag = Tag::read_from_path(path).unwrap();
    assert_eq!(tag.album(), Some("PATH ALBUM"));
    assert_eq!(tag.title(), Some("TEST TITLE"));
}

#[test]
fn scan_directory() {
    let _ = std::fs::create_dir_all("target/test-files/scan");
    std::fs::write("target/test-files/scan/a.m4a", tagged_fixture()).unwrap();
    std::fs::write("target/test-files/scan/b.m4a", Fixture::default().build()).unwrap();
    std::fs::write("target/test-files/scan/ignored.txt", b"not an mp4").unwrap();

    let mut read = 0;
    for entry in walkdir::WalkDir::new("target/test-files/scan")
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(".m4a") {
            continue;
        }

        let tag = Tag::read_from_path(entry.path()).unwrap();
        assert_eq!(tag.duration(), Some(Duration::from_secs(4)));
        read += 1;
    }
    assert_eq!(read, 2);
}

#[test]
fn title_falls_back_to_the_file_name() {
    let _ = std::fs::create_dir_all("target/test-files");
    let path = "target/test-files/untitled track.m4a";
    std::fs::write(path, Fixture::default().build()).unwrap();

    let cfg = mp4tag::ReadConfig { title_from_filename: true, ..Default::default() };
    let tag = Tag::read_from_path_with(path, &cfg).unwrap();
    assert_eq!(tag.title(), Some("untitled track"));

    let tag = Tag::read_from_path(path).unwrap();
    assert_eq!(tag.title(), None);
}
