
pub mod document_tests {
    use ebml_tree::error::{DocumentError, HeaderError};
    use ebml_tree::specs::{EBML_HEADER, EBML_VERSION, EBML_READ_VERSION, EBML_MAX_ID_WIDTH, EBML_MAX_SIZE_WIDTH};
    use ebml_tree::{Document, DocumentConfig};
    use std::io::{Cursor, Write};

    use super::test_data::*;

    #[test]
    pub fn empty_stream_is_not_valid() {
        let mut document = open(Vec::new());
        let root = document.get_document_root();

        assert!(document.valid(root));
        assert!(!document.is_valid());
        assert!(!document.file_valid());
        assert!(matches!(document.validate(), Err(HeaderError::MagicMismatch { found }) if found.is_empty()));
        assert_eq!(0, document.element(root).unwrap().size());
        assert!(document.get_children(root).unwrap().is_empty());
    }

    #[test]
    pub fn minimal_header_is_valid() {
        let mut document = open(valid_header());
        assert!(document.is_valid());

        let header = document.validate().expect("Header should be valid");
        assert_eq!(1, header.version);
        assert_eq!(1, header.read_version);
        assert_eq!(4, header.max_id_width);
        assert_eq!(8, header.max_size_width);
        assert_eq!(Some(String::from("webm")), header.doc_type);
        assert_eq!(Some(4), header.doc_type_version);
        assert_eq!(Some(2), header.doc_type_read_version);
    }

    #[test]
    pub fn newer_read_version_is_not_valid() {
        let mut document = open(header_with(1, 2, 4, 8));
        assert!(!document.is_valid());
        assert!(matches!(document.validate(), Err(HeaderError::UnsupportedVersion { id, version: 2 }) if id == EBML_READ_VERSION));
    }

    #[test]
    pub fn newer_version_is_not_valid() {
        let mut document = open(header_with(2, 1, 4, 8));
        assert!(!document.is_valid());
        assert!(matches!(document.validate(), Err(HeaderError::UnsupportedVersion { id, version: 2 }) if id == EBML_VERSION));
    }

    #[test]
    pub fn oversized_widths_are_not_valid() {
        let mut document = open(header_with(1, 1, 9, 8));
        assert!(matches!(document.validate(), Err(HeaderError::WidthTooLarge { id, width: 9 }) if id == EBML_MAX_ID_WIDTH));

        let mut document = open(header_with(1, 1, 4, 9));
        assert!(matches!(document.validate(), Err(HeaderError::WidthTooLarge { id, width: 9 }) if id == EBML_MAX_SIZE_WIDTH));
    }

    #[test]
    pub fn missing_field_is_not_valid() {
        let bytes = master(EBML_HEADER, &[
            element(EBML_VERSION, &[1]),
            element(EBML_READ_VERSION, &[1]),
            element(EBML_MAX_SIZE_WIDTH, &[8]),
        ]);
        let mut document = open(bytes);
        assert!(!document.is_valid());
        assert!(matches!(document.validate(), Err(HeaderError::MissingField { id }) if id == EBML_MAX_ID_WIDTH));
    }

    #[test]
    pub fn wrong_magic_is_not_valid() {
        let mut document = open(master(SEGMENT, &[element(TITLE, b"abc")]));
        assert!(!document.is_valid());
        assert!(matches!(document.validate(), Err(HeaderError::MagicMismatch { found }) if found == vec![0x18, 0x53, 0x80, 0x67]));
    }

    #[test]
    pub fn validity_follows_the_latest_check() {
        let mut document = open(Vec::new());
        assert!(!document.is_valid());

        let root = document.get_document_root();
        let header = document.add_element(root, EBML_HEADER).unwrap();
        document.add_unsigned(header, EBML_VERSION, 1).unwrap();
        document.add_unsigned(header, EBML_READ_VERSION, 1).unwrap();
        document.add_unsigned(header, EBML_MAX_ID_WIDTH, 4).unwrap();
        document.add_unsigned(header, EBML_MAX_SIZE_WIDTH, 8).unwrap();
        assert!(!document.is_valid());

        assert!(document.file_valid());
        assert!(document.is_valid());
        assert!(open(document.into_inner().into_inner()).is_valid());
    }

    #[test]
    pub fn read_scalar_payloads() {
        let mut document = open(with_segment(&[
            element(TITLE, b"Title\0\0"),
            element(DURATION, &1.5f64.to_be_bytes()),
            element(DURATION, &1.5f32.to_be_bytes()),
            element(DURATION, &[0x3f, 0xff, 0xc0, 0, 0, 0, 0, 0, 0, 0]),
            element(DURATION, &[0x3f, 0xc0, 0, 0, 0]),
            element(TAG_STRING, &[0xff, 0xfe]),
            element(TAG_STRING, &[0x01, 0x00]),
            element(TAG_STRING, &[]),
            element(TAG_STRING, &[0, 0, 0, 0, 0, 0, 0, 1, 0xff]),
        ]));
        let segment = segment(&mut document);

        let title = document.get_child(segment, TITLE).unwrap().unwrap();
        assert_eq!("Title", document.get_as_string(title).unwrap());
        assert_eq!(b"Title\0\0".to_vec(), document.get_as_binary(title).unwrap());

        let floats = document.get_children_by_id(segment, DURATION).unwrap();
        let floats: Vec<f64> = floats.into_iter().map(|handle| document.get_as_float(handle).unwrap()).collect();
        assert_eq!(vec![1.5, 1.5, 1.5, 0.0], floats);

        let integers = document.get_children_by_id(segment, TAG_STRING).unwrap();
        assert_eq!(-2, document.get_as_int(integers[0]).unwrap());
        assert_eq!(0xfffe, document.get_as_unsigned(integers[0]).unwrap());
        assert_eq!(256, document.get_as_unsigned(integers[1]).unwrap());
        assert_eq!(0, document.get_as_int(integers[2]).unwrap());
        assert_eq!(0, document.get_as_unsigned(integers[2]).unwrap());
        assert_eq!(1, document.get_as_unsigned(integers[3]).unwrap());
    }

    #[test]
    pub fn invalid_utf8_is_reported() {
        let mut document = open(with_segment(&[element(TITLE, &[0xc3, 0x28])]));
        let segment = segment(&mut document);
        let title = document.get_child(segment, TITLE).unwrap().unwrap();
        assert!(matches!(document.get_as_string(title), Err(DocumentError::Utf8ParseError { .. })));
    }

    #[test]
    pub fn root_payload_cannot_be_set() {
        let mut document = open(valid_header());
        let root = document.get_document_root();
        assert!(matches!(document.set_as_binary(root, &[1, 2, 3]), Err(DocumentError::RootElement)));
    }

    #[test]
    pub fn narrow_id_width_hides_wide_ids() {
        let config = DocumentConfig::default().with_max_id_width(2);
        let mut document = Document::with_config(Cursor::new(sample_document()), config);
        let root = document.get_document_root();

        assert_eq!(2, document.config().max_id_width());
        assert!(document.get_children(root).unwrap().is_empty());
        assert!(!document.is_valid());
    }

    #[test]
    pub fn small_buffers_move_data_correctly() {
        let config = DocumentConfig::default().with_buffer_len(3);
        let mut document = Document::with_config(Cursor::new(sample_document()), config);
        let segment = segment(&mut document);
        let info = document.get_child(segment, INFO).unwrap().unwrap();
        let title = document.get_child(info, TITLE).unwrap().unwrap();
        document.set_as_string(title, "A noticeably longer title").unwrap();

        let mut document = reopen(document);
        let segment = super::test_data::segment(&mut document);
        assert_contained(&mut document, segment);
        let tags = document.get_child(segment, TAGS).unwrap().unwrap();
        let tag = document.get_child(tags, TAG).unwrap().unwrap();
        let simple_tag = document.get_child(tag, SIMPLE_TAG).unwrap().unwrap();
        let value = document.get_child(simple_tag, TAG_STRING).unwrap().unwrap();
        assert_eq!("Someone", document.get_as_string(value).unwrap());
    }

    #[test]
    pub fn borrowed_stream_can_be_edited() {
        let mut cursor = Cursor::new(sample_document());
        {
            let mut document = Document::open(&mut cursor);
            let segment = segment(&mut document);
            document.add_string(segment, TITLE, "Added").unwrap();
        }

        let mut document = open(cursor.into_inner());
        let segment = segment(&mut document);
        let title = document.get_child(segment, TITLE).unwrap().unwrap();
        assert_eq!("Added", document.get_as_string(title).unwrap());
    }

    #[test]
    pub fn edit_file_on_disk() {
        let mut file = tempfile::tempfile().expect("Test should be able to create a temp file");
        file.write_all(&sample_document()).unwrap();

        let mut document = Document::open(file);
        assert!(document.is_valid());
        let segment = segment(&mut document);
        let info = document.get_child(segment, INFO).unwrap().unwrap();
        let title = document.get_child(info, TITLE).unwrap().unwrap();
        document.set_as_string(title, "A much longer title").unwrap();
        let tags = document.get_child(segment, TAGS).unwrap().unwrap();
        document.remove_child(segment, tags, false).unwrap();

        let file = document.into_inner();
        assert_eq!(sample_document().len() as u64 + 14 - 30, file.metadata().unwrap().len());

        let mut document = Document::open(file);
        assert!(document.is_valid());
        let segment = super::test_data::segment(&mut document);
        assert_eq!(1, document.get_children(segment).unwrap().len());
        let info = document.get_child(segment, INFO).unwrap().unwrap();
        let title = document.get_child(info, TITLE).unwrap().unwrap();
        let duration = document.get_child(info, DURATION).unwrap().unwrap();
        assert_eq!("A much longer title", document.get_as_string(title).unwrap());
        assert_eq!(1.5, document.get_as_float(duration).unwrap());
    }
}
