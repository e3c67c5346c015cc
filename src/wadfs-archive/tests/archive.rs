use wadfs_archive::{Archive, ArchiveBuilder, ArchiveError};

// Builds archive bytes from a flat entry list; `None` payload makes a
// zero/zero marker descriptor.
fn wad(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
    let mut builder = ArchiveBuilder::new();
    for (name, data) in entries {
        match data {
            Some(data) => builder.lump(name, data).unwrap(),
            None => builder.marker(name).unwrap(),
        }
    }
    builder.build().unwrap()
}

fn namespace_fixture() -> Archive {
    Archive::from_vec(wad(&[("F1_START", None), ("F1_END", None)])).unwrap()
}

fn map_fixture() -> Archive {
    let mut builder = ArchiveBuilder::new();
    builder.marker("E1M1").unwrap();
    for i in 0..10u8 {
        builder.lump(&format!("L{i}"), &[i]).unwrap();
    }
    builder.lump("AFTER", b"after").unwrap();
    Archive::from_vec(builder.build().unwrap()).unwrap()
}

#[test]
fn namespace_markers_form_directories() {
    let archive = namespace_fixture();

    assert_eq!(archive.magic(), "PWAD");
    assert_eq!(archive.len(), 2);
    assert!(archive.is_directory("/F1"));
    assert!(!archive.is_content("/F1"));
    assert_eq!(archive.size("/F1"), -1);

    let mut v = Vec::new();
    assert_eq!(archive.read_dir("/F1", &mut v), 0);
    assert!(v.is_empty());

    assert_eq!(archive.read_dir("/", &mut v), 1);
    assert_eq!(v, ["F1"]);
}

#[test]
fn map_marker_claims_ten_lumps() {
    let archive = map_fixture();

    assert!(archive.is_directory("/E1M1"));

    let mut v = Vec::new();
    assert_eq!(archive.read_dir("/E1M1", &mut v), 10);
    assert_eq!(v[0], "L0");
    assert_eq!(v[9], "L9");

    // The eleventh lump is back at root level.
    assert!(archive.is_content("/AFTER"));
    assert_eq!(archive.read_dir("/", &mut v), 2);
    assert_eq!(v, ["E1M1", "AFTER"]);

    assert!(archive.is_content("/E1M1/L3"));
    assert_eq!(archive.contents("/E1M1/L3"), Some(&[3u8][..]));
    assert!(!archive.is_content("/L3"));
}

#[test]
fn nested_namespaces() {
    let archive = Archive::from_vec(wad(&[
        ("A_START", None),
        ("B_START", None),
        ("X", Some(b"xx")),
        ("B_END", None),
        ("Y", Some(b"yyy")),
        ("A_END", None),
        ("Z", Some(b"z")),
    ]))
    .unwrap();

    assert!(archive.is_directory("/A"));
    assert!(archive.is_directory("/A/B"));
    assert!(!archive.is_directory("/B"));
    assert!(archive.is_content("/A/B/X"));
    assert!(archive.is_content("/A/Y"));
    assert!(archive.is_content("/Z"));

    let mut v = Vec::new();
    assert_eq!(archive.read_dir("/A", &mut v), 2);
    assert_eq!(v, ["B", "Y"]);

    assert_eq!(archive.size("/A/B/X"), 2);
    assert_eq!(archive.contents("/A/Y"), Some(&b"yyy"[..]));
}

#[test]
fn surplus_end_markers_are_tolerated() {
    let archive = Archive::from_vec(wad(&[
        ("X", Some(b"x")),
        ("Q_END", None),
        ("Y", Some(b"y")),
    ]))
    .unwrap();

    let mut v = Vec::new();
    assert_eq!(archive.read_dir("/", &mut v), 2);
    assert_eq!(v, ["X", "Y"]);
}

#[test]
fn read_at_semantics() {
    let archive = Archive::from_vec(wad(&[("hello", Some(b"ABCDE"))])).unwrap();

    let mut buf = [0u8; 5];
    assert_eq!(archive.read_at("/hello", &mut buf, 0), 5);
    assert_eq!(&buf, b"ABCDE");

    // Short buffer, then a read in the middle.
    let mut buf = [0u8; 2];
    assert_eq!(archive.read_at("/hello", &mut buf, 0), 2);
    assert_eq!(&buf, b"AB");
    assert_eq!(archive.read_at("/hello", &mut buf, 3), 2);
    assert_eq!(&buf, b"DE");

    // A buffer larger than the remaining tail.
    let mut buf = [0u8; 16];
    assert_eq!(archive.read_at("/hello", &mut buf, 4), 1);
    assert_eq!(buf[0], b'E');

    // At or past the end: 0. Empty buffer or bad path: -1.
    assert_eq!(archive.read_at("/hello", &mut buf, 5), 0);
    assert_eq!(archive.read_at("/hello", &mut buf, 500), 0);
    assert_eq!(archive.read_at("/hello", &mut [], 0), -1);
    assert_eq!(archive.read_at("/missing", &mut buf, 0), -1);
    assert_eq!(archive.read_at("/", &mut buf, 0), -1);
}

#[test]
fn empty_lump_reads_zero_bytes() {
    let archive = Archive::from_vec(wad(&[("EMPTY", Some(b""))])).unwrap();

    assert!(archive.is_content("/EMPTY"));
    assert_eq!(archive.size("/EMPTY"), 0);

    let mut buf = [0u8; 4];
    assert_eq!(archive.read_at("/EMPTY", &mut buf, 0), 0);
}

#[test]
fn path_normalization() {
    let archive = Archive::from_vec(wad(&[
        ("F1_START", None),
        ("hello", Some(b"ABCDE")),
        ("F1_END", None),
    ]))
    .unwrap();

    assert!(archive.is_directory("/F1"));
    assert!(archive.is_directory("/F1/"));
    assert!(archive.is_directory("//F1"));
    assert!(archive.is_directory("/F1///"));
    assert!(!archive.is_directory("F1"));
    assert!(!archive.is_directory(""));

    assert!(archive.is_content("/F1/hello/"));
    assert_eq!(archive.size("/F1//hello"), 5);
    assert_eq!(archive.size(""), -1);
    assert_eq!(archive.size("/"), -1);

    assert!(archive.is_directory("/"));
    assert!(!archive.is_content("/"));
}

#[test]
fn eight_byte_names_survive() {
    let archive = Archive::from_vec(wad(&[("ABCDEFGH", Some(b"full"))])).unwrap();

    assert_eq!(archive.descriptors()[0].name(), "ABCDEFGH");
    assert!(archive.is_content("/ABCDEFGH"));
    assert_eq!(archive.size("/ABCDEFGH"), 4);
}

#[test]
fn descriptor_mirror_matches_image() {
    let archive = map_fixture();

    let img = archive.as_bytes();
    let header = archive.header();
    assert_eq!(&img[4..8], &header.count.to_le_bytes());
    assert_eq!(&img[8..12], &header.offset.to_le_bytes());

    let table = &img[header.offset as usize..];
    for (i, desc) in archive.descriptors().iter().enumerate() {
        let mut raw = Vec::new();
        desc.write(&mut raw).unwrap();
        assert_eq!(&table[i * 16..(i + 1) * 16], &raw[..], "descriptor {i}");
    }
}

#[test]
fn load_rejects_short_input() {
    assert!(matches!(
        Archive::from_vec(Vec::new()),
        Err(ArchiveError::Truncated)
    ));
    assert!(matches!(
        Archive::from_vec(b"PWAD".to_vec()),
        Err(ArchiveError::Truncated)
    ));
}

#[test]
fn load_rejects_truncated_descriptor_table() {
    // Header promises two descriptors right at offset 12, but the
    // input ends there.
    let mut buf = Vec::new();
    buf.extend_from_slice(b"PWAD");
    buf.extend_from_slice(&2u32.to_le_bytes());
    buf.extend_from_slice(&12u32.to_le_bytes());

    assert!(matches!(
        Archive::from_vec(buf),
        Err(ArchiveError::Io(_))
    ));
}

#[test]
fn load_rejects_out_of_range_table_offset() {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"PWAD");
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&9999u32.to_le_bytes());

    assert!(matches!(
        Archive::from_vec(buf),
        Err(ArchiveError::Io(_))
    ));
}

#[test]
fn open_missing_file() {
    assert!(matches!(
        Archive::open_heap("tests/data/no-such-archive.wad"),
        Err(ArchiveError::Io(_))
    ));
}

#[test]
fn open_heap_and_mmap_agree() -> Result<(), ArchiveError> {
    let bytes = wad(&[
        ("F1_START", None),
        ("hello", Some(b"ABCDE")),
        ("F1_END", None),
    ]);

    let tmp = tempfile::NamedTempFile::new()?;
    std::fs::write(tmp.path(), &bytes)?;

    let heap = Archive::open_heap(tmp.path())?;
    let mapped = Archive::open_mmap(tmp.path())?;

    assert_eq!(heap.as_bytes(), mapped.as_bytes());
    assert_eq!(heap.size("/F1/hello"), 5);
    assert_eq!(mapped.size("/F1/hello"), 5);
    assert_eq!(mapped.contents("/F1/hello"), Some(&b"ABCDE"[..]));

    Ok(())
}

#[test]
fn marker_classification() {
    use wadfs_archive::types::{is_map_marker, Marker};

    assert_eq!(Marker::classify("E1M1"), Marker::Map);
    assert_eq!(Marker::classify("E1M1A"), Marker::Lump);
    assert_eq!(Marker::classify("F1_START"), Marker::NamespaceStart("F1"));
    assert_eq!(Marker::classify("F1_END"), Marker::NamespaceEnd);
    assert_eq!(Marker::classify("_START"), Marker::NamespaceStart(""));
    assert_eq!(Marker::classify("DEMO1"), Marker::Lump);

    assert!(is_map_marker("E9M0"));
    assert!(!is_map_marker("E1M"));
    assert!(!is_map_marker("EXMY"));
    assert!(!is_map_marker("e1m1"));
}

#[test]
fn glob_matching() {
    let archive = Archive::from_vec(wad(&[
        ("F1_START", None),
        ("hello", Some(b"ABCDE")),
        ("world", Some(b"12")),
        ("F1_END", None),
        ("top", Some(b"t")),
    ]))
    .unwrap();

    let found: Vec<_> = archive
        .iter_glob("/F1/*")
        .unwrap()
        .map(|(path, desc)| (path, desc.length))
        .collect();
    assert_eq!(
        found,
        [("/F1/hello".to_owned(), 5), ("/F1/world".to_owned(), 2)]
    );

    // Depth-first descriptor order over the whole archive.
    let all: Vec<_> = archive.iter_glob("/**").unwrap().map(|(p, _)| p).collect();
    assert_eq!(all, ["/F1/hello", "/F1/world", "/top"]);

    assert_eq!(archive.iter_glob("/*").unwrap().count(), 1);
    assert!(archive.iter_glob("a[").is_err());
}
