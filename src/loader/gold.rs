//! XML gold corpus.
//!
//! ```xml
//! <Corpus>
//!   <Document document_text="Die Firma Muster AG meldet">
//!     <ORG char_start="4" char_end="19" entity_type="org_company"
//!          head_char_start="4" head_char_end="9" head_text="Firma">
//!       <PER char_start="10" char_end="16" entity_type="per_name"/>
//!     </ORG>
//!   </Document>
//! </Corpus>
//! ```
//!
//! Only `Document` elements directly below the root are documents. Every
//! element below a document becomes a [`GoldNode`](crate::gold::GoldNode)
//! with all of its attributes; text content and comments are ignored.

use std::collections::BTreeMap;
use std::path::Path;

use crate::gold::{DocId, GoldTree, NodeId, DOCUMENT_TAG, DOCUMENT_TEXT};
use crate::{Error, Result};

/// Parse a gold corpus from XML text.
pub fn parse_gold_xml(content: &str) -> Result<GoldTree> {
    let xml = roxmltree::Document::parse(content)
        .map_err(|e| Error::parse(format!("invalid gold XML: {}", e)))?;

    let mut tree = GoldTree::new();
    for element in xml.root_element().children().filter(|n| n.is_element()) {
        if element.tag_name().name() != DOCUMENT_TAG {
            log::debug!("skipping <{}> below the corpus root", element.tag_name().name());
            continue;
        }
        let mut attributes = attributes_of(element);
        let text = match attributes.remove(DOCUMENT_TEXT) {
            Some(text) => text,
            None => {
                log::warn!(
                    "document {} has no {} attribute",
                    tree.document_count(),
                    DOCUMENT_TEXT
                );
                String::new()
            }
        };
        let doc = tree.add_document(text, attributes);
        add_children(&mut tree, doc, None, element)?;
    }
    log::info!(
        "loaded {} gold nodes in {} documents",
        tree.len(),
        tree.document_count()
    );
    Ok(tree)
}

/// Load a gold corpus from an XML file.
pub fn load_gold_xml<P: AsRef<Path>>(path: P) -> Result<GoldTree> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(Error::Io)?;
    parse_gold_xml(&content)
}

fn add_children(
    tree: &mut GoldTree,
    doc: DocId,
    parent: Option<NodeId>,
    element: roxmltree::Node<'_, '_>,
) -> Result<()> {
    for child in element.children().filter(|n| n.is_element()) {
        let id = tree.add_node(doc, parent, child.tag_name().name(), attributes_of(child))?;
        add_children(tree, doc, Some(id), child)?;
    }
    Ok(())
}

fn attributes_of(element: roxmltree::Node<'_, '_>) -> BTreeMap<String, String> {
    element
        .attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CORPUS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Corpus>
  <Document document_text="Die Firma Muster AG meldet" id="d1">
    <ORG char_start="4" char_end="19" entity_type="org_company"
         head_char_start="4" head_char_end="9" head_text="Firma">
      <!-- nested person -->
      <PER char_start="10" char_end="16" entity_type="per_name">
        <NP char_start="10" char_end="16"/>
      </PER>
    </ORG>
  </Document>
  <Meta/>
  <Document document_text="Bern">
    <GPE char_start="0" char_end="4" entity_type="gpe"/>
  </Document>
</Corpus>
"#;

    #[test]
    fn test_parse_corpus() {
        let tree = parse_gold_xml(CORPUS).unwrap();
        assert_eq!(tree.document_count(), 2);
        assert_eq!(tree.len(), 4);

        let first = &tree.documents()[0];
        assert_eq!(first.text, "Die Firma Muster AG meldet");
        assert_eq!(first.attributes.get("id").map(String::as_str), Some("d1"));
        assert!(!first.attributes.contains_key("document_text"));
        assert_eq!(first.nodes().len(), 3);

        let nodes = tree.nodes();
        assert_eq!(nodes[0].tag, "ORG");
        assert_eq!(nodes[0].depth, 0);
        assert_eq!(nodes[0].span, Some((4, 19)));
        assert_eq!(nodes[0].head_span, Some((4, 9)));
        assert_eq!(nodes[0].head_text(), Some("Firma"));
        assert_eq!(nodes[1].depth, 1);
        assert_eq!(nodes[2].depth, 2);
        assert_eq!(tree.parent_tag(nodes[2].id), "PER");
        assert_eq!(tree.span_text(nodes[1].id).as_deref(), Some("Muster"));
        assert_eq!(nodes[3].document.index(), 1);
        assert_eq!(nodes[3].depth, 0);
    }

    #[test]
    fn test_non_integer_offset_fails() {
        let xml = r#"<C><Document document_text="x"><PER char_start="a" char_end="1"/></Document></C>"#;
        assert!(matches!(parse_gold_xml(xml), Err(Error::Parse(_))));
    }

    #[test]
    fn test_malformed_xml_fails() {
        assert!(matches!(parse_gold_xml("<C><Document>"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CORPUS.as_bytes()).unwrap();
        file.flush().unwrap();
        let tree = load_gold_xml(file.path()).unwrap();
        assert_eq!(tree.document_count(), 2);
    }
}
