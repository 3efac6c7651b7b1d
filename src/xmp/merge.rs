//! Merging of an extended XMP packet into its standard packet

use log::{debug, warn};

use crate::errors::{MetadataError, MetadataResult};
use crate::xmp::constants::{names, ns};
use crate::xmp::dom::{self, Element, XmlDocument, XmlNode};

/// Finds the rdf:RDF element, either the root or a child of x:xmpmeta
fn rdf_element(document: &XmlDocument) -> Option<&Element> {
    let root = &document.root;
    if root.name.matches(ns::RDF, names::RDF) {
        return Some(root);
    }
    if root.name.matches(ns::X, names::XMPMETA) {
        return root.child(ns::RDF, names::RDF);
    }
    None
}

fn rdf_element_mut(document: &mut XmlDocument) -> Option<&mut Element> {
    let root = &mut document.root;
    if root.name.matches(ns::RDF, names::RDF) {
        return Some(root);
    }
    if root.name.matches(ns::X, names::XMPMETA) {
        return root.child_mut(ns::RDF, names::RDF);
    }
    None
}

fn is_description(element: &Element) -> bool {
    element.name.matches(ns::RDF, names::DESCRIPTION)
}

/// rdf:about, also accepted without a prefix
fn about(element: &Element) -> Option<&str> {
    element
        .attributes
        .iter()
        .find(|a| a.name.local == names::ABOUT && (a.name.namespace.is_none() || a.name.namespace.as_deref() == Some(ns::RDF)))
        .map(|a| a.value.as_str())
}

/// GUID of the extended packet referenced by a standard packet
///
/// Looks at every top-level rdf:Description for an xmpNote:HasExtendedXMP
/// attribute or element.
pub fn try_get_extended_xmp_guid(document: &XmlDocument) -> Option<String> {
    let rdf = rdf_element(document)?;

    rdf.child_elements().filter(|e| is_description(e)).find_map(|description| {
        if let Some(attribute) = description.attribute(ns::XMP_NOTE, names::HAS_EXTENDED_XMP) {
            return Some(attribute.value.trim().to_string());
        }
        description
            .child(ns::XMP_NOTE, names::HAS_EXTENDED_XMP)
            .map(|element| element.text_value().trim().to_string())
    })
    .filter(|guid| !guid.is_empty())
}

/// Merges the extended document into the standard one
///
/// The extended rdf:Description elements are appended to the standard
/// rdf:RDF. Every Description after the first that describes the same
/// resource is folded into the first one without overwriting values that
/// differ. Finally the HasExtendedXMP marker is removed.
///
/// Moved nodes keep their resolved namespaces; the serializer declares
/// whatever prefixes they bring along.
pub fn merge(standard: &XmlDocument, extended: &XmlDocument) -> MetadataResult<XmlDocument> {
    let mut merged = standard.clone();

    let extended_rdf = rdf_element(extended)
        .ok_or_else(|| MetadataError::MalformedXml("extended packet has no rdf:RDF element".to_string()))?;

    let rdf = rdf_element_mut(&mut merged)
        .ok_or_else(|| MetadataError::MalformedXml("standard packet has no rdf:RDF element".to_string()))?;

    for description in extended_rdf.child_elements().filter(|e| is_description(e)) {
        rdf.children.push(XmlNode::Element(description.clone()));
    }

    coalesce_descriptions(rdf);

    for description in rdf.child_elements_mut().filter(|e| is_description(e)) {
        description.remove_attribute(ns::XMP_NOTE, names::HAS_EXTENDED_XMP);
        description.remove_children(ns::XMP_NOTE, names::HAS_EXTENDED_XMP);
    }

    Ok(merged)
}

fn can_merge(first: &Element, other: &Element) -> bool {
    match (about(first), about(other)) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Folds mergeable Descriptions into the first one and removes them
fn coalesce_descriptions(rdf: &mut Element) {
    let positions: Vec<usize> = rdf
        .children
        .iter()
        .enumerate()
        .filter(|(_, node)| matches!(node, XmlNode::Element(e) if is_description(e)))
        .map(|(i, _)| i)
        .collect();

    let Some((&first_index, rest)) = positions.split_first() else {
        return;
    };

    let mut merged_away = Vec::new();
    for &index in rest {
        let XmlNode::Element(other) = &rdf.children[index] else {
            continue;
        };
        let XmlNode::Element(first) = &rdf.children[first_index] else {
            continue;
        };
        if !can_merge(first, other) {
            debug!("Keeping rdf:Description about=\"{}\" separate", about(other).unwrap_or(""));
            continue;
        }

        let other = other.clone();
        if let XmlNode::Element(first) = &mut rdf.children[first_index] {
            merge_into(first, other);
        }
        merged_away.push(index);
    }

    for index in merged_away.into_iter().rev() {
        rdf.children.remove(index);
    }
}

/// Adds attributes and children of `source` that `target` lacks
fn merge_into(target: &mut Element, source: Element) {
    for attribute in source.attributes {
        match target.attribute_named(&attribute.name) {
            None => target.attributes.push(attribute),
            Some(existing) if existing.value == attribute.value => {}
            Some(existing) => warn!("Not merging {}: keeping \"{}\" over \"{}\"",
                                    attribute.name.local, existing.value, attribute.value),
        }
    }

    for node in source.children {
        let XmlNode::Element(child) = node else {
            continue;
        };
        match target.child_named(&child.name) {
            None => target.children.push(XmlNode::Element(child)),
            Some(existing) if existing.text_value().to_lowercase() == child.text_value().to_lowercase() => {}
            Some(_) => warn!("Not merging element {}: values differ", child.name.local),
        }
    }

    dom::drop_indentation(target);
}
