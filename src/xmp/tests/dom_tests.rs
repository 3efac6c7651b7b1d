//! Tests for the XML tree

use crate::errors::MetadataError;
use crate::xmp::constants::ns;
use crate::xmp::dom::{Element, XmlAttribute, XmlDocument, XmlName, XmlNode};
use crate::xmp::tests::test_utils::packet;

#[test]
fn test_parse_packet() {
    let xml = packet("", "xmp:Rating=\"5\"", "<dc:format>image/jpeg</dc:format>");
    let document = XmlDocument::parse(xml.as_bytes()).unwrap();

    assert!(document.root.name.matches(ns::X, "xmpmeta"));
    assert_eq!(document.prolog.len(), 1);
    assert_eq!(document.epilog.len(), 1);

    let rdf = document.root.child(ns::RDF, "RDF").unwrap();
    let description = rdf.child(ns::RDF, "Description").unwrap();
    assert_eq!(description.attribute("http://ns.adobe.com/xap/1.0/", "Rating").unwrap().value, "5");
    assert_eq!(description.child("http://purl.org/dc/elements/1.1/", "format").unwrap().text_value(), "image/jpeg");
}

#[test]
fn test_serialize_round_trip() {
    let xml = packet("", "xmp:Label=\"a &amp; b\"", "<dc:title><rdf:Alt><rdf:li xml:lang=\"x-default\">Q&lt;1&gt;</rdf:li></rdf:Alt></dc:title>");
    let document = XmlDocument::parse(xml.as_bytes()).unwrap();

    let bytes = document.to_bytes().unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.starts_with("<?xpacket begin="));
    assert!(text.ends_with("<?xpacket end=\"w\"?>"));

    let reparsed = XmlDocument::parse(&bytes).unwrap();
    assert_eq!(reparsed, document);
}

#[test]
fn test_utf8_bom_is_skipped() {
    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(packet("", "", "").as_bytes());
    assert!(XmlDocument::parse(&bytes).is_ok());
}

#[test]
fn test_malformed_documents() {
    let cases: [&[u8]; 5] = [
        b"",
        b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"><rdf:RDF>",
        b"<a><b></a>",
        b"<a/><b/>",
        b"<undeclared:root/>",
    ];

    for case in cases {
        let result = XmlDocument::parse(case);
        assert!(matches!(result, Err(MetadataError::MalformedXml(_))), "{:?}", String::from_utf8_lossy(case));
    }
}

#[test]
fn test_moved_node_gets_declaration() {
    let mut document = XmlDocument::parse(b"<root/>").unwrap();

    let mut child = Element::new(XmlName::new(Some("http://example.com/ns"), Some("ex"), "item"));
    child.attributes.push(XmlAttribute {
        name: XmlName::new(Some("http://example.com/other"), Some("o"), "flag"),
        value: "1".to_string(),
    });
    document.root.children.push(XmlNode::Element(child));

    let bytes = document.to_bytes().unwrap();
    let reparsed = XmlDocument::parse(&bytes).unwrap();
    let item = reparsed.root.child("http://example.com/ns", "item").unwrap();
    assert_eq!(item.attribute("http://example.com/other", "flag").unwrap().value, "1");
}

#[test]
fn test_whitespace_value_of_leaf_is_kept() {
    let xml = packet("", "", "<dc:format> </dc:format>\n  <dc:source/>");
    let document = XmlDocument::parse(xml.as_bytes()).unwrap();

    let rdf = document.root.child(ns::RDF, "RDF").unwrap();
    let description = rdf.child(ns::RDF, "Description").unwrap();
    assert!(!rdf.children.iter().any(|node| matches!(node, XmlNode::Text(_))));
    assert!(!description.children.iter().any(|node| matches!(node, XmlNode::Text(_))));
    assert_eq!(description.child("http://purl.org/dc/elements/1.1/", "format").unwrap().text_value(), " ");

    let text = String::from_utf8(document.to_bytes().unwrap()).unwrap();
    assert!(text.contains("<dc:format> </dc:format>"));
}
