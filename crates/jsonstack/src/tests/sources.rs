use std::io::{self, Cursor, Read};

use crate::{
    DeserializerOptions, ErrorKind, Value, from_reader, from_reader_with_options, from_str,
};

#[test]
fn reader_and_text_sources_agree() {
    let text = r#"{"k": [1, 2.5, "x", true, null]}"#;
    assert_eq!(
        from_reader(Cursor::new(text)).unwrap(),
        from_str(text).unwrap()
    );
}

#[test]
fn reader_decodes_multibyte_documents() {
    let text = "\"héllo \u{1F600}\"";
    assert_eq!(
        from_reader(Cursor::new(text.as_bytes().to_vec())).unwrap(),
        Value::String("héllo \u{1F600}".into())
    );
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("pipe broke"))
    }
}

#[test]
fn read_failures_propagate_untouched() {
    let err = from_reader(FailingReader).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Io(e) if e.to_string() == "pipe broke"));
    assert!(err.to_string().contains("i/o error"));
}

#[test]
fn mid_stream_failures_abort_at_the_read_position() {
    let reader = Cursor::new(&b"[1, "[..]).chain(FailingReader);
    let err = from_reader(reader).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Io(_)));
    assert_eq!(err.offset, 4);
}

#[test]
fn invalid_utf8_surfaces_as_io_error() {
    let err = from_reader(Cursor::new(vec![b'[', 0xFF])).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Io(e) if e.kind() == io::ErrorKind::InvalidData));
}

#[test]
fn options_apply_to_reader_sources() {
    let options = DeserializerOptions { max_depth: 2 };
    let err = from_reader_with_options(Cursor::new("[[["), options).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::MaxDepthExceeded(2)));
}
