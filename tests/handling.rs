use std::io::Cursor;
use std::time::Duration;

use mp4tag::{
    AdvisoryRating, Chapter, Data, Fourcc, FreeformIdent, ImgBuf, MediaType, Tag,
};

#[test]
fn string_accessors() {
    let mut tag = Tag::default();

    tag.set_title("TEST TITLE");
    tag.set_album("TEST ALBUM");
    tag.set_artist("TEST ARTIST");
    tag.add_artist("SECOND ARTIST");
    tag.set_year("2013");

    assert_eq!(tag.title(), Some("TEST TITLE"));
    assert_eq!(tag.album(), Some("TEST ALBUM"));
    assert_eq!(tag.artist(), Some("TEST ARTIST"));
    let artists: Vec<&str> = tag.artists().collect();
    assert_eq!(artists, ["TEST ARTIST", "SECOND ARTIST"]);
    assert_eq!(tag.year(), Some("2013"));

    tag.remove_artists();
    assert_eq!(tag.artist(), None);
    assert_eq!(tag.title(), Some("TEST TITLE"));
}

#[test]
fn data_accessors() {
    let mut tag = Tag::default();
    let test = Fourcc(*b"test");

    tag.set_data(test, Data::Utf8("data".into()));
    assert_eq!(tag.strings_of(&test).next(), Some("data"));

    tag.set_data(test, Data::Utf8("other".into()));
    let strings: Vec<&str> = tag.strings_of(&test).collect();
    assert_eq!(strings, ["other"]);

    tag.add_data(test, Data::Utf8("second".into()));
    let strings: Vec<&str> = tag.strings_of(&test).collect();
    assert_eq!(strings, ["other", "second"]);

    let taken: Vec<Data> = tag.take_data_of(&test).collect();
    assert_eq!(taken, [Data::Utf8("other".into()), Data::Utf8("second".into())]);
    assert_eq!(tag.data_of(&test).next(), None);
}

#[test]
fn tombstones_hide_data_until_saved() {
    let mut tag = Tag::default();
    let test = Fourcc(*b"test");

    tag.set_data(test, Data::Utf8("data".into()));
    tag.remove_data_of(&test);

    assert_eq!(tag.data_of(&test).next(), None);
    assert!(tag.is_empty());

    // setting new data over a tombstone works
    tag.set_data(test, Data::Utf8("fresh".into()));
    assert_eq!(tag.strings_of(&test).next(), Some("fresh"));
}

#[test]
fn freeform_idents() {
    let mut tag = Tag::default();
    let ident = FreeformIdent::new("com.apple.iTunes", "ISRC");

    tag.set_data(ident.clone(), Data::Utf8("TEST ISRC".into()));
    assert_eq!(tag.strings_of(&ident).next(), Some("TEST ISRC"));

    // a fourcc with the freeform code doesn't match a freeform ident
    assert_eq!(tag.strings_of(&Fourcc(*b"----")).next(), None);

    assert_eq!(tag.conductor(), None);
    tag.set_conductor("John Jackman");
    assert_eq!(tag.conductor(), Some("John Jackman"));
    tag.remove_conductor();
    assert_eq!(tag.conductor(), None);
}

#[test]
fn track_and_disc_tuples() {
    let mut tag = Tag::default();

    tag.set_track(7, 13);
    tag.set_disc(1, 2);

    assert_eq!(tag.track(), (Some(7), Some(13)));
    assert_eq!(tag.track_number(), Some(7));
    assert_eq!(tag.total_tracks(), Some(13));
    assert_eq!(tag.disc(), (Some(1), Some(2)));

    tag.set_track(3, 0);
    assert_eq!(tag.track(), (Some(3), None));

    tag.remove_track();
    tag.remove_disc();
    assert_eq!(tag.track(), (None, None));
    assert_eq!(tag.disc(), (None, None));
}

#[test]
fn flags_and_integers() {
    let mut tag = Tag::default();

    assert!(!tag.compilation());
    tag.set_compilation();
    assert!(tag.compilation());
    tag.remove_compilation();
    assert!(!tag.compilation());

    tag.set_bpm(132);
    assert_eq!(tag.bpm(), Some(132));
}

#[test]
fn media_type_and_advisory_rating() {
    let mut tag = Tag::default();

    tag.set_media_type(MediaType::AudioBook);
    assert_eq!(tag.media_type(), Some(MediaType::AudioBook));

    tag.set_advisory_rating(AdvisoryRating::Explicit(4));
    assert_eq!(tag.advisory_rating(), Some(AdvisoryRating::Explicit(4)));

    tag.set_advisory_rating(AdvisoryRating::Clean);
    assert_eq!(tag.advisory_rating(), Some(AdvisoryRating::Clean));
}

#[test]
fn popularity_percentages() {
    let mut tag = Tag::default();

    assert_eq!(tag.popularity(), None);

    // star ratings map onto percentages, 1.0 means five stars
    for steps in 0..=10u8 {
        tag.set_popularity(steps as f32 / 10.0);
        let expected = steps as f32 / 10.0;
        assert!((tag.popularity().unwrap() - expected).abs() < f32::EPSILON);
    }

    // the percentage is stored in the rating freeform item
    let rating_ident = FreeformIdent::new("com.apple.iTunes", "RATING");
    assert_eq!(tag.strings_of(&rating_ident).next(), Some("100"));

    // and a rating written by another tagger is picked up
    tag.set_data(rating_ident.clone(), Data::Utf8("50".into()));
    assert_eq!(tag.popularity(), Some(0.5));

    tag.set_popularity(7.5);
    assert_eq!(tag.popularity(), Some(1.0));

    tag.remove_popularity();
    assert_eq!(tag.popularity(), None);
}

#[test]
fn pictures_and_hashes() {
    let mut tag = Tag::default();
    let jpeg = ImgBuf::jpeg(vec![0xff, 0xd8, 0xff, 0xe0, 1, 2, 3]);
    let png = ImgBuf::png(vec![0x89, b'P', b'N', b'G', 4, 5, 6]);

    tag.add_picture(jpeg.clone());
    tag.add_picture(png);
    assert_eq!(tag.pictures().count(), 2);
    assert_eq!(tag.artwork().unwrap(), jpeg.as_ref());

    let hashes: Vec<u64> = tag.pictures().map(|p| p.hash()).collect();
    assert_ne!(hashes[0], hashes[1]);

    // same slot, new bytes
    let other = ImgBuf::jpeg(vec![0xff, 0xd8, 0xff, 0xe0, 9, 9, 9]);
    let first = tag.pictures_mut().next().unwrap();
    let before = first.hash();
    first.set_img(other);
    assert_ne!(first.hash(), before);

    tag.remove_pictures();
    assert_eq!(tag.pictures().count(), 0);
}

#[test]
fn chapter_list() {
    let mut tag = Tag::default();
    assert!(tag.chapters().is_empty());
    assert_eq!(tag.chapter_source(), None);

    tag.set_chapters([
        Chapter::new(Duration::ZERO, "one"),
        Chapter::new(Duration::from_millis(1500), "two"),
    ]);
    assert_eq!(tag.chapters().len(), 2);
    assert_eq!(tag.chapter_end(0), Some(Duration::from_millis(1500)));
    // without a known file duration the last chapter has no end
    assert_eq!(tag.chapter_end(1), None);

    tag.chapters_mut().push(Chapter::new(Duration::from_millis(3000), "three"));
    assert_eq!(tag.chapters().len(), 3);
}

#[test]
fn dump_round_trip() {
    let mut tag = Tag::default();
    tag.set_title("DUMPED TITLE");
    tag.set_artist("DUMPED ARTIST");
    tag.set_track(2, 9);
    tag.set_data(
        FreeformIdent::new("com.apple.iTunes", "TEST"),
        Data::Utf8("This is a test 父".into()),
    );
    tag.add_picture(ImgBuf::jpeg(vec![0xff, 0xd8, 0xff, 0xe0, 1, 2, 3]));
    tag.set_chapters([
        Chapter::new(Duration::ZERO, "one"),
        Chapter::new(Duration::from_millis(1500), "two"),
    ]);

    let mut buf = Vec::new();
    tag.dump_to(&mut buf).unwrap();

    let read = Tag::read_from(&mut Cursor::new(buf)).unwrap();
    assert_eq!(read.title(), Some("DUMPED TITLE"));
    assert_eq!(read.artist(), Some("DUMPED ARTIST"));
    assert_eq!(read.track(), (Some(2), Some(9)));
    assert_eq!(
        read.strings_of(&FreeformIdent::new("com.apple.iTunes", "TEST")).next(),
        Some("This is a test 父")
    );
    assert_eq!(read.pictures().count(), 1);
    assert_eq!(read.chapters(), tag.chapters());
}

#[test]
fn meta_item_order_independence() {
    let mut a = Tag::default();
    a.set_title("TITLE");
    a.set_data(FreeformIdent::new("com.apple.iTunes", "ONE"), Data::Utf8("1".into()));
    a.set_data(FreeformIdent::new("com.apple.iTunes", "TWO"), Data::Utf8("2".into()));

    let mut b = Tag::default();
    b.set_data(FreeformIdent::new("com.apple.iTunes", "TWO"), Data::Utf8("2".into()));
    b.set_title("TITLE");
    b.set_data(FreeformIdent::new("com.apple.iTunes", "ONE"), Data::Utf8("1".into()));

    let mut set_a: Vec<(String, Option<&str>)> =
        a.meta_items().map(|i| (i.ident.to_string(), i.data[0].string())).collect();
    let mut set_b: Vec<(String, Option<&str>)> =
        b.meta_items().map(|i| (i.ident.to_string(), i.data[0].string())).collect();
    set_a.sort();
    set_b.sort();
    assert_eq!(set_a, set_b);
}
