use core::fmt;
use enumset::EnumSet;
use flash_swf::codec::{from_bytes, to_bytes};
use flash_swf::errors::{Error, ErrorKind};
use flash_swf::read::Reader;
use flash_swf::tag::{Frames, TagHeader};
use flash_swf::types::shape::{Shape, ShapeRecord, ShapeStyles, StyleChange};
use flash_swf::types::{
    Bounds, ButtonAction, ButtonEvent, CharacterId, Color, DefineButton2, DefineFont, DefineShape, FileAttribute,
    FileAttributes, FillStyle, FontVersion, FrameLabel, Glyph, KeyCode, LineStyle, Movie, MovieHeader, ShapeVersion,
    Tag,
};
use flash_swf::write::Writer;
use flash_swf::{Context, Flag};
#[cfg(test)]
use pretty_assertions::assert_eq;

/// Wrapper around Vec<u8> that makes `{:#?}` the same as `{:?}`
/// Used in `assert*!` macros in combination with `pretty_assertions` crate to make
/// test failures to show nice diffs.
#[derive(PartialEq, Eq)]
#[doc(hidden)]
pub struct PrettyArray<'a>(pub &'a [u8]);

/// Make diff to display string as single-line string
impl fmt::Debug for PrettyArray<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&format!("{:?}", self.0))
    }
}

fn movie(version: u8, tags: Vec<Tag>) -> Movie {
    Movie {
        header: MovieHeader {
            version,
            frame_size: Bounds::new(0, 11000, 0, 8000).unwrap(),
            frame_rate: 30 << 8,
            frame_count: 1,
        },
        tags,
    }
}

fn id(id: u32) -> CharacterId {
    CharacterId::new(id).unwrap()
}

fn square(fill: u32, line: Option<u32>) -> Shape {
    Shape {
        records: vec![
            ShapeRecord::StyleChange(Box::new(StyleChange {
                move_to: Some((20, 20)),
                fill_style_1: Some(fill),
                line_style: line,
                ..Default::default()
            })),
            ShapeRecord::StraightEdge { delta_x: 400, delta_y: 0 },
            ShapeRecord::StraightEdge { delta_x: 0, delta_y: 400 },
            ShapeRecord::CurvedEdge {
                control_delta_x: -200,
                control_delta_y: 100,
                anchor_delta_x: -200,
                anchor_delta_y: -100,
            },
            ShapeRecord::StraightEdge { delta_x: 0, delta_y: -400 },
        ],
    }
}

fn shape_tag(version: ShapeVersion, color: Color) -> Tag {
    Tag::DefineShape(Box::new(DefineShape {
        version,
        id: id(1),
        bounds: Bounds::new(0, 440, 0, 440).unwrap(),
        styles: ShapeStyles {
            fill_styles: vec![FillStyle::Solid(color)],
            line_styles: vec![LineStyle::Plain { width: 20, color }],
        },
        shape: square(1, Some(1)),
    }))
}

fn font_tag(version: FontVersion, codes: &[u16]) -> Tag {
    Tag::DefineFont(Box::new(DefineFont {
        version,
        id: id(2),
        flags: EnumSet::empty(),
        language: 1,
        name: "Sans".into(),
        glyphs: codes.iter().map(|&code| Glyph { code, shape: square(1, None) }).collect(),
        layout: None,
    }))
}

fn button_tag() -> Tag {
    Tag::DefineButton2(Box::new(DefineButton2 {
        id: id(3),
        track_as_menu: false,
        characters: vec![0x0f, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00],
        actions: vec![
            ButtonAction {
                events: ButtonEvent::OverDownToOverUp.into(),
                key: KeyCode::NONE,
                actions: vec![0x07, 0x00],
            },
            ButtonAction {
                events: EnumSet::empty(),
                key: KeyCode::new(13).unwrap(),
                actions: vec![0x06, 0x00],
            },
        ],
    }))
}

fn showcase() -> Movie {
    movie(
        10,
        vec![
            Tag::FileAttributes(FileAttributes(FileAttribute::UseNetwork | FileAttribute::HasMetadata)),
            Tag::SetBackgroundColor(Color::rgb(0x33, 0x66, 0x99)),
            shape_tag(ShapeVersion::Three, Color::rgba(0xff, 0x00, 0x00, 0x80)),
            font_tag(FontVersion::Two, &[u16::from(b'A'), u16::from(b'B')]),
            button_tag(),
            Tag::FrameLabel(FrameLabel {
                name: "start".into(),
                anchor: false,
            }),
            Tag::DoAction(vec![0x07, 0x00]),
            Tag::ShowFrame,
            Tag::End,
        ],
    )
}

fn old_shapes() -> Movie {
    movie(
        5,
        vec![
            shape_tag(ShapeVersion::One, Color::rgb(0, 0, 0xff)),
            shape_tag(ShapeVersion::Two, Color::BLACK),
            Tag::FrameLabel(FrameLabel {
                name: "d\u{e9}but".into(),
                anchor: false,
            }),
            Tag::ShowFrame,
            Tag::End,
        ],
    )
}

fn wide_font() -> Movie {
    movie(10, vec![font_tag(FontVersion::Three, &[0x3042, 0x3044]), Tag::End])
}

macro_rules! auto_test {
    ($([$name: ident, $movie: expr]),*) => {
        $(
        #[test]
        pub fn $name() {
            let movie = $movie;
            let bytes = Writer::default().write(&movie).expect("Unable to write movie");

            let parse_res = Reader::default().parse(&bytes);
            if let Ok(parsed) = parse_res {
                assert_eq!(parsed, movie);

                let again = flash_swf::write::write_to_bytes(&parsed).expect("Unable to write movie");
                assert_eq!(PrettyArray(&again), PrettyArray(&bytes), "library output != input");
            } else {
                println!("parse failed: {:?}", parse_res);
                assert_eq!(false, true)
            }
        }
        )*
    }
}

macro_rules! should_fail {
    ($([$name: ident, $data: expr, $error: expr]),*) => {
        $(
        #[test]
        pub fn $name() {
            let data: &[u8] = $data;
            let parse_res = Reader::default().parse(data);
            assert_eq!(parse_res.map_err(|e| e.kind()), Err($error));
        }
        )*
    }
}

auto_test! {
    [showcase_round_trip, showcase()],
    [old_shapes_round_trip, old_shapes()],
    [wide_font_round_trip, wide_font()],
    [empty_movie_round_trip, movie(10, vec![Tag::End])]
}

should_fail! {
    [truncated_signature, b"FW", ErrorKind::BufferExhausted],
    [unknown_signature, b"GIF89a\0\0\0\0\0\0", ErrorKind::UnsupportedVariant],
    [compressed, b"CWS\x0a\x15\0\0\0", ErrorKind::UnsupportedVariant],
    [short_file_length, b"FWS\x0a\x04\0\0\0\0\0\0\0\0\0\0", ErrorKind::StructuralMismatch]
}

#[test]
fn short_header_up_to_62_bytes() {
    let mut context = Context::new(10);
    let bytes = to_bytes(&Tag::DoAction(vec![0; 62]), &mut context).unwrap();
    assert_eq!(bytes.len(), 2 + 62);
    assert_eq!(PrettyArray(&bytes[..2]), PrettyArray(&[0x03, 0x3e]));

    let bytes = to_bytes(&Tag::DoAction(vec![0; 63]), &mut context).unwrap();
    assert_eq!(bytes.len(), 6 + 63);
    assert_eq!(PrettyArray(&bytes[..6]), PrettyArray(&[0x03, 0x3f, 0x00, 0x00, 0x00, 0x3f]));
}

#[test]
fn bitmap_tags_always_use_the_long_header() {
    let tag = Tag::Unknown {
        code: 20,
        data: vec![1, 2],
        long: false,
    };
    let bytes = to_bytes(&tag, &mut Context::default()).unwrap();
    assert_eq!(PrettyArray(&bytes), PrettyArray(&[0x05, 0x3f, 0x00, 0x00, 0x00, 0x02, 0x01, 0x02]));

    let tags = Reader::default().parse_tags(&bytes, 10).unwrap();
    assert_eq!(tags, vec![tag]);
}

#[test]
fn long_unknown_tags_read_back_unchanged() {
    let tags = vec![
        Tag::Unknown {
            code: 63,
            data: vec![1; 100],
            long: false,
        },
        Tag::Unknown {
            code: 20,
            data: vec![1, 2, 3],
            long: false,
        },
        Tag::End,
    ];
    let bytes = Writer::default().write_tags(&tags, 10).unwrap();
    assert_eq!(PrettyArray(&bytes[..6]), PrettyArray(&[0x0f, 0xff, 0x00, 0x00, 0x00, 0x64]));
    assert_eq!(Reader::default().parse_tags(&bytes, 10).unwrap(), tags);
}

#[test]
fn frames_skip_over_every_body() {
    let bytes = Writer::default().write(&showcase()).unwrap();
    let header_len = 8 + 9 + 4;
    let mut frames = Frames::new(flash_swf::bits::BitReader::new(&bytes[header_len..]));
    let codes: Vec<u16> = frames.by_ref().map(|frame| frame.unwrap().header.code).collect();
    assert_eq!(codes, vec![69, 9, 32, 48, 34, 43, 12, 1, 0]);
    assert_eq!(frames.position(), (bytes.len() - header_len) * 8);
}

#[test]
fn tag_headers_read_back() {
    let header = TagHeader::new(9, 3).unwrap();
    let bytes = to_bytes(&header, &mut Context::default()).unwrap();
    assert_eq!(from_bytes::<TagHeader>(&bytes, &mut Context::default()).unwrap(), header);
    assert_eq!(
        TagHeader::new(0x400, 0).unwrap_err(),
        Error::RangeViolation {
            field: "tag code",
            value: 0x400,
            min: 0,
            max: 0x3ff
        }
    );
}

#[test]
fn scopes_restore_the_context() {
    let mut context = Context::new(8);
    {
        let mut outer = context.push(Flag::Transparent, true);
        {
            let inner = outer.push(Flag::WideCodes, true);
            assert!(inner.get(Flag::Transparent));
            assert!(inner.get(Flag::WideCodes));
            assert_eq!(inner.depth(), 2);
        }
        assert!(outer.get(Flag::Transparent));
        assert!(!outer.get(Flag::WideCodes));
    }
    assert!(context.flags().is_empty());
    assert_eq!(context.depth(), 0);
}

#[test]
fn failed_writes_leave_the_context_alone() {
    let mut context = Context::new(10);
    let broken = movie(
        10,
        vec![Tag::DefineShape(Box::new(DefineShape {
            version: ShapeVersion::Three,
            id: id(1),
            bounds: Bounds::default(),
            styles: ShapeStyles::default(),
            // No fill style 1 to refer to
            shape: square(1, None),
        }))],
    );
    let error = to_bytes(&broken, &mut context).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::RangeViolation);
    assert!(context.flags().is_empty());
    assert_eq!(context.tag(), None);
    assert_eq!(context.depth(), 0);
}

#[test]
fn lenient_reader_keeps_malformed_tags() {
    let mut bytes = Writer::default()
        .write(&movie(10, vec![Tag::FrameLabel(FrameLabel::default()), Tag::ShowFrame, Tag::End]))
        .unwrap();
    // Drop the terminator of the label, keeping its length
    let label = 8 + 9 + 4 + 2;
    assert_eq!(bytes[label], 0);
    bytes[label] = b'x';

    let strict = Reader::default().parse(&bytes).unwrap_err();
    assert_eq!(strict.kind(), ErrorKind::BufferExhausted);

    let parsed = Reader::lenient().parse(&bytes).unwrap();
    assert_eq!(
        parsed.tags,
        vec![
            Tag::Unknown {
                code: 43,
                data: vec![b'x'],
                long: false
            },
            Tag::ShowFrame,
            Tag::End
        ]
    );
}

#[cfg(feature = "serde")]
#[test]
fn serde_json_round_trip() {
    let movie = showcase();
    let json = serde_json::to_string(&movie).unwrap();
    let back: Movie = serde_json::from_str(&json).unwrap();
    assert_eq!(back, movie);
}
