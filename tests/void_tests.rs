
pub mod void_tests {
    use ebml_tree::error::DocumentError;
    use ebml_tree::specs::VOID;

    use super::test_data::*;

    fn ids(document: &mut ebml_tree::Document<std::io::Cursor<Vec<u8>>>, handle: ebml_tree::ElementHandle) -> Vec<u64> {
        let children = document.get_children(handle).unwrap();
        children.iter().map(|child| document.element(*child).unwrap().id()).collect()
    }

    #[test]
    pub fn void_neighbours_merge_into_one() {
        let mut document = open(with_segment(&[
            element(VOID, &[0; 3]),
            element(TITLE, b"abc"),
            element(VOID, &[0; 2]),
        ]));
        let segment = segment(&mut document);
        let children = document.get_children(segment).unwrap();
        let (a, b, c) = (children[0], children[1], children[2]);
        let start = document.element(a).unwrap().position();
        let end = document.element(c).unwrap().end();

        assert!(document.remove_child(segment, b, true).unwrap());

        assert_eq!(vec![b], document.get_children(segment).unwrap());
        let void = document.element(b).unwrap();
        assert!(void.is_void());
        assert_eq!(start, void.position());
        assert_eq!(end, void.end());
        assert_eq!(15, void.footprint());

        assert!(document.element(a).is_none());
        assert!(!document.valid(c));
        assert!(matches!(document.get_as_binary(a), Err(DocumentError::StaleHandle)));
        assert!(matches!(document.get_children(c), Err(DocumentError::StaleHandle)));

        let bytes = document.into_inner().into_inner();
        assert_eq!([0xec, 0x8d], bytes[start as usize..start as usize + 2]);

        let mut document = open(bytes);
        let segment = super::test_data::segment(&mut document);
        assert_eq!(vec![VOID], ids(&mut document, segment));
        let void = document.get_child(segment, VOID).unwrap().unwrap();
        assert_eq!(13, document.element(void).unwrap().size());
    }

    #[test]
    pub fn removed_element_becomes_void_in_place() {
        let mut document = open(sample_document());
        let length = sample_document().len();
        let segment = segment(&mut document);
        let info = document.get_child(segment, INFO).unwrap().unwrap();
        let title = document.get_child(info, TITLE).unwrap().unwrap();
        let info_size = document.element(info).unwrap().size();
        let footprint = document.element(title).unwrap().footprint();

        assert!(document.remove_child(info, title, true).unwrap());
        assert_eq!(VOID, document.element(title).unwrap().id());
        assert_eq!(footprint, document.element(title).unwrap().footprint());
        assert_eq!(info_size, document.element(info).unwrap().size());
        assert_eq!(None, document.get_child(info, TITLE).unwrap());

        let mut document = reopen(document);
        let segment = super::test_data::segment(&mut document);
        let info = document.get_child(segment, INFO).unwrap().unwrap();
        assert_eq!(vec![VOID, DURATION], ids(&mut document, info));
        let duration = document.get_child(info, DURATION).unwrap().unwrap();
        assert_eq!(1.5, document.get_as_float(duration).unwrap());
        assert_eq!(length, document.into_inner().into_inner().len());
    }

    #[test]
    pub fn remove_by_id_merges_adjacent_targets() {
        let mut document = open(with_segment(&[
            element(TITLE, b"a"),
            element(TITLE, b"b"),
            element(DURATION, &[]),
            element(TITLE, b"c"),
        ]));
        let segment = segment(&mut document);

        assert!(!document.remove_children_by_id(segment, TAGS, true).unwrap());
        assert!(document.remove_children_by_id(segment, TITLE, true).unwrap());
        assert_eq!(vec![VOID, DURATION, VOID], ids(&mut document, segment));

        let children = document.get_children(segment).unwrap();
        assert_eq!(8, document.element(children[0]).unwrap().footprint());

        let mut document = reopen(document);
        let segment = super::test_data::segment(&mut document);
        assert_eq!(vec![VOID, DURATION, VOID], ids(&mut document, segment));
    }

    #[test]
    pub fn remove_all_children_leaves_one_void() {
        let mut document = open(sample_document());
        let segment = segment(&mut document);
        let info = document.get_child(segment, INFO).unwrap().unwrap();
        let info_size = document.element(info).unwrap().size();

        assert!(document.remove_children(info, true).unwrap());

        let children = document.get_children(info).unwrap();
        assert_eq!(1, children.len());
        assert_eq!(info_size, document.element(children[0]).unwrap().footprint());

        let mut document = reopen(document);
        let segment = super::test_data::segment(&mut document);
        let info = document.get_child(segment, INFO).unwrap().unwrap();
        assert_eq!(vec![VOID], ids(&mut document, info));
    }

    #[test]
    pub fn only_direct_children_are_removed() {
        let mut document = open(sample_document());
        let segment = segment(&mut document);
        let info = document.get_child(segment, INFO).unwrap().unwrap();
        let title = document.get_child(info, TITLE).unwrap().unwrap();

        assert!(!document.remove_child(segment, title, true).unwrap());
        assert!(!document.remove_child(segment, title, false).unwrap());
        assert_eq!(TITLE, document.element(title).unwrap().id());
    }

    #[test]
    pub fn cut_out_shrinks_ancestors() {
        let mut document = open(sample_document());
        let length = sample_document().len() as u64;
        let segment = segment(&mut document);
        let info = document.get_child(segment, INFO).unwrap().unwrap();
        let tags = document.get_child(segment, TAGS).unwrap().unwrap();
        let title = document.get_child(info, TITLE).unwrap().unwrap();
        let duration = document.get_child(info, DURATION).unwrap().unwrap();
        let segment_size = document.element(segment).unwrap().size();
        let tags_position = document.element(tags).unwrap().position();

        assert!(document.remove_child(info, title, false).unwrap());
        assert!(document.element(title).is_none());
        assert_eq!(11, document.element(info).unwrap().size());
        assert_eq!(segment_size - 8, document.element(segment).unwrap().size());
        assert_eq!(tags_position - 8, document.element(tags).unwrap().position());
        assert_eq!(1.5, document.get_as_float(duration).unwrap());

        let bytes = document.into_inner().into_inner();
        assert_eq!(length - 8, bytes.len() as u64);

        let mut document = open(bytes);
        assert!(document.is_valid());
        let segment = super::test_data::segment(&mut document);
        assert_contained(&mut document, segment);
        let info = document.get_child(segment, INFO).unwrap().unwrap();
        assert_eq!(vec![DURATION], ids(&mut document, info));
    }

    #[test]
    pub fn cut_out_deep_element() {
        let mut document = open(sample_document());
        let segment = segment(&mut document);
        let tags = document.get_child(segment, TAGS).unwrap().unwrap();
        let tag = document.get_child(tags, TAG).unwrap().unwrap();
        let simple_tag = document.get_child(tag, SIMPLE_TAG).unwrap().unwrap();
        let sizes: Vec<u64> = [segment, tags, tag, simple_tag].iter().map(|handle| document.element(*handle).unwrap().size()).collect();

        assert!(document.remove_children_by_id(simple_tag, TAG_NAME, false).unwrap());
        let shrunk: Vec<u64> = [segment, tags, tag, simple_tag].iter().map(|handle| document.element(*handle).unwrap().size()).collect();
        assert_eq!(sizes.iter().map(|size| size - 9).collect::<Vec<u64>>(), shrunk);

        let mut document = reopen(document);
        let segment = super::test_data::segment(&mut document);
        assert_contained(&mut document, segment);
        let tags = document.get_child(segment, TAGS).unwrap().unwrap();
        let tag = document.get_child(tags, TAG).unwrap().unwrap();
        let simple_tag = document.get_child(tag, SIMPLE_TAG).unwrap().unwrap();
        assert_eq!(vec![TAG_STRING], ids(&mut document, simple_tag));
    }

    #[test]
    pub fn cut_out_everything() {
        let mut document = open(sample_document());
        let segment = segment(&mut document);

        assert!(document.remove_children(segment, false).unwrap());
        assert_eq!(0, document.element(segment).unwrap().size());
        assert!(document.get_children(segment).unwrap().is_empty());

        let bytes = document.into_inner().into_inner();
        assert_eq!(valid_header().len() + 5, bytes.len());

        let mut document = open(bytes);
        assert!(document.is_valid());
        let segment = super::test_data::segment(&mut document);
        assert!(document.get_children(segment).unwrap().is_empty());
    }
}
