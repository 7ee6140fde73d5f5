use byteorder::{BigEndian, ByteOrder};
use fmp4::*;

const CONTAINERS: [&[u8; 4]; 9] = [
    b"moov", b"mvex", b"trak", b"mdia", b"minf", b"dinf", b"stbl", b"moof", b"traf",
];

/// Full boxes whose children follow version, flags and a 32-bit entry count.
const ENTRY_LISTS: [&[u8; 4]; 2] = [b"dref", b"stsd"];

struct ScannedBox<'a> {
    name: [u8; 4],
    size: u64,
    /// Everything after the size and type fields, version and flags included.
    body: &'a [u8],
}

fn scan(mut data: &[u8]) -> Vec<ScannedBox<'_>> {
    let mut boxes = Vec::new();

    while !data.is_empty() {
        let mut size = BigEndian::read_u32(&data[..4]) as u64;
        let mut header = 8;

        if size == 1 {
            size = BigEndian::read_u64(&data[8..16]);
            header = 16;
        }

        let mut name = [0u8; 4];
        name.copy_from_slice(&data[4..8]);

        boxes.push(ScannedBox {
            name,
            size,
            body: &data[header..size as usize],
        });

        data = &data[size as usize..];
    }

    boxes
}

/// Bodies of every box named `name`, searching through known containers and
/// entry lists.
fn find_all<'a>(data: &'a [u8], name: &[u8; 4]) -> Vec<&'a [u8]> {
    let mut found = Vec::new();

    for boks in scan(data) {
        if &boks.name == name {
            found.push(boks.body);
        }

        if CONTAINERS.contains(&&boks.name) {
            found.extend(find_all(boks.body, name));
        } else if ENTRY_LISTS.contains(&&boks.name) {
            found.extend(find_all(&boks.body[8..], name));
        }
    }

    found
}

fn find<'a>(data: &'a [u8], name: &[u8; 4]) -> &'a [u8] {
    let found = find_all(data, name);
    assert_eq!(found.len(), 1, "expected one '{}' box", String::from_utf8_lossy(name));

    found[0]
}

fn frame(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}

#[test]
fn first_call_is_header_only() {
    let mut writer = FragmentWriter::default();

    let header = writer.wrap(&frame(100), 1920, 1080).unwrap();
    let boxes = scan(&header);

    assert_eq!(boxes.len(), 1);
    assert_eq!(&boxes[0].name, b"moov");
    assert_eq!(boxes[0].size, header.len() as u64);
    assert!(find_all(&header, b"mdat").is_empty());
    assert!(find_all(&header, b"moof").is_empty());
    assert!(writer.is_initialized());
}

#[test]
fn movie_header_describes_the_track() {
    let mut writer = FragmentWriter::default();
    let header = writer.wrap(&frame(16), 1280, 720).unwrap();

    let mvhd = find(&header, b"mvhd");
    assert_eq!(mvhd.len(), 4 + 96);
    assert_eq!(BigEndian::read_u32(&mvhd[12..]), 1000);

    let tkhd = find(&header, b"tkhd");
    assert_eq!(&tkhd[..4], &[1, 0, 0, 7]);
    assert_eq!(BigEndian::read_u32(&tkhd[tkhd.len() - 8..]), 1280 << 16);
    assert_eq!(BigEndian::read_u32(&tkhd[tkhd.len() - 4..]), 720 << 16);

    let mdhd = find(&header, b"mdhd");
    assert_eq!(BigEndian::read_u32(&mdhd[20..]), 120);
    assert_eq!(BigEndian::read_u16(&mdhd[mdhd.len() - 4..]), 0x15c7);

    let hdlr = find(&header, b"hdlr");
    assert_eq!(&hdlr[8..12], b"vide");

    let trex = find(&header, b"trex");
    assert_eq!(BigEndian::read_u32(&trex[4..]), 1);
    assert_eq!(BigEndian::read_u32(&trex[8..]), 1);

    // self-contained data entry without a location
    let url = find(&header, b"url ");
    assert_eq!(url, &[0, 0, 0, 1]);

    let stsd = find(&header, b"stsd");
    assert_eq!(BigEndian::read_u32(&stsd[4..]), 1);
    let entries = scan(&stsd[8..]);
    assert_eq!(entries.len(), 1);
    assert_eq!(&entries[0].name, b"avc1");
}

#[test]
fn data_reference_holds_one_header_only_url() {
    let mut writer = FragmentWriter::default();
    let header = writer.wrap(&frame(16), 1920, 1080).unwrap();

    let dref = find(&header, b"dref");
    assert_eq!(BigEndian::read_u32(&dref[4..]), 1);

    let entries = scan(&dref[8..]);
    assert_eq!(entries.len(), 1);
    assert_eq!(&entries[0].name, b"url ");
    assert_eq!(entries[0].size, 12);

    assert_eq!(find_all(&header, b"url ").len(), 1);
    assert_eq!(find_all(&header, b"avc1").len(), 1);
}

#[test]
fn later_calls_are_single_fragments() {
    let mut writer = FragmentWriter::default();
    writer.wrap(&frame(100), 1920, 1080).unwrap();

    for expected_time in 1..5u64 {
        let fragment = writer.wrap(&frame(64), 1920, 1080).unwrap();
        let boxes = scan(&fragment);

        assert_eq!(boxes.len(), 2);
        assert_eq!(&boxes[0].name, b"moof");
        assert_eq!(&boxes[1].name, b"mdat");
        assert_eq!(find_all(&fragment, b"mdat").len(), 1);

        let tfdt = find(&fragment, b"tfdt");
        assert_eq!(tfdt[0], 1);
        assert_eq!(BigEndian::read_u64(&tfdt[4..]), expected_time);

        let mfhd = find(&fragment, b"mfhd");
        assert_eq!(BigEndian::read_u32(&mfhd[4..]) as u64, expected_time);
    }
}

#[test]
fn end_to_end_scenario() {
    let mut writer = FragmentWriter::default();

    let a = writer.wrap(&frame(100), 1920, 1080).unwrap();
    assert_eq!(&scan(&a)[0].name, b"moov");

    let b = writer.wrap(&frame(50), 1920, 1080).unwrap();
    let boxes = scan(&b);
    assert_eq!(&boxes[0].name, b"moof");

    let trun = find(&b, b"trun");
    assert_eq!(BigEndian::read_u32(&trun[4..]), 1);
    assert_eq!(BigEndian::read_u32(&trun[16..]), 50);

    let mdat = find(&b, b"mdat");
    assert_eq!(mdat.len(), 46);
    assert_eq!(mdat, &frame(50)[4..]);

    let tfdt = find(&b, b"tfdt");
    assert_eq!(BigEndian::read_u64(&tfdt[4..]), 1);
}

#[test]
fn data_offset_points_at_mdat_payload() {
    let mut writer = FragmentWriter::default();
    writer.wrap(&frame(8), 640, 480).unwrap();

    let fragment = writer.wrap(&frame(200), 640, 480).unwrap();
    let moof = &scan(&fragment)[0];

    let trun = find(&fragment, b"trun");
    let data_offset = BigEndian::read_i32(&trun[8..]) as usize;

    assert_eq!(data_offset as u64, moof.size + 8);
    assert_eq!(&fragment[data_offset..], &frame(200)[4..]);
}

#[test]
fn fragment_header_carries_sample_defaults() {
    let config = FragmentWriterConfig {
        track_id: 3,
        default_sample_duration: 4,
        default_sample_flags: SYNC_SAMPLE_FLAGS,
        ..Default::default()
    };

    let mut writer = FragmentWriter::new(config);
    writer.wrap(&frame(8), 640, 480).unwrap();
    let fragment = writer.wrap(&frame(77), 640, 480).unwrap();

    let tfhd = find(&fragment, b"tfhd");
    assert_eq!(BigEndian::read_u32(&tfhd[..4]), 0x0002_0038);
    assert_eq!(BigEndian::read_u32(&tfhd[4..]), 3);
    assert_eq!(BigEndian::read_u32(&tfhd[8..]), 4);
    assert_eq!(BigEndian::read_u32(&tfhd[12..]), 77);
    assert_eq!(BigEndian::read_u32(&tfhd[16..]), SYNC_SAMPLE_FLAGS);

    let trun = find(&fragment, b"trun");
    assert_eq!(BigEndian::read_u32(&trun[..4]), 0x0000_0205);
    assert_eq!(BigEndian::read_u32(&trun[12..]), SYNC_SAMPLE_FLAGS);
}

#[test]
fn fragment_size_does_not_depend_on_frame() {
    let mut writer = FragmentWriter::default();
    writer.wrap(&frame(4), 320, 240).unwrap();

    let small = writer.wrap(&frame(4), 320, 240).unwrap();
    let large = writer.wrap(&frame(4096), 320, 240).unwrap();

    assert_eq!(scan(&small)[0].size, scan(&large)[0].size);
    assert_eq!(scan(&small)[1].size, 8);
    assert_eq!(scan(&large)[1].size, 8 + 4092);
}

#[test]
fn initial_fragment_can_follow_header() {
    let config = FragmentWriterConfig {
        emit_initial_fragment: true,
        ..Default::default()
    };

    let mut writer = FragmentWriter::new(config);
    let first = writer.wrap(&frame(30), 1920, 1080).unwrap();

    let names: Vec<_> = scan(&first).iter().map(|b| b.name).collect();
    assert_eq!(names, vec![*b"moov", *b"moof", *b"mdat"]);
    assert_eq!(BigEndian::read_u64(&find(&first, b"tfdt")[4..]), 0);

    let second = writer.wrap(&frame(30), 1920, 1080).unwrap();
    assert_eq!(BigEndian::read_u64(&find(&second, b"tfdt")[4..]), 1);
}

#[test]
fn short_frame_is_rejected() {
    let mut writer = FragmentWriter::default();
    writer.wrap(&frame(10), 1920, 1080).unwrap();

    let err = writer.wrap(&frame(2), 1920, 1080).unwrap_err();
    assert!(matches!(err, Mp4BoxError::FrameTooShort(2)));
    assert_eq!(writer.sequence_number(), 1);

    let fragment = writer.wrap(&frame(10), 1920, 1080).unwrap();
    assert_eq!(BigEndian::read_u64(&find(&fragment, b"tfdt")[4..]), 1);
}

#[test]
fn wrap_into_appends() {
    let mut writer = FragmentWriter::default();
    let mut stream = bytes::BytesMut::new();

    writer.wrap_into(&frame(12), 1920, 1080, &mut stream).unwrap();
    writer.wrap_into(&frame(12), 1920, 1080, &mut stream).unwrap();
    writer.wrap_into(&frame(12), 1920, 1080, &mut stream).unwrap();

    let names: Vec<_> = scan(&stream).iter().map(|b| b.name).collect();
    assert_eq!(
        names,
        vec![*b"moov", *b"moof", *b"mdat", *b"moof", *b"mdat"]
    );
}

#[test]
fn wrap_to_file_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.mp4");

    let mut writer = FragmentWriter::default();
    for _ in 0..3 {
        writer.wrap_to_file(&frame(40), 1920, 1080, &path).unwrap();
    }

    let contents = std::fs::read(&path).unwrap();
    let names: Vec<_> = scan(&contents).iter().map(|b| b.name).collect();

    assert_eq!(
        names,
        vec![*b"moov", *b"moof", *b"mdat", *b"moof", *b"mdat"]
    );
}
