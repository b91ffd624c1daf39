//! GraphML format support.
//!
//! ```xml
//! <graphml xmlns="http://graphml.graphdrawing.org/xmlns">
//!   <key id="d0" for="node" attr.name="factor_n" attr.type="string"/>
//!   <key id="d1" for="node" attr.name="factor_type" attr.type="string"/>
//!   <key id="d2" for="edge" attr.name="rel_type" attr.type="string"/>
//!   <graph id="G" edgedefault="directed">
//!     <node id="Site"><data key="d0">3</data><data key="d1">factor</data></node>
//!     <edge id="e0" source="Site" target="Patient"><data key="d2">nests</data></edge>
//!   </graph>
//! </graphml>
//! ```
//!
//! Design metadata (study, confound groups, notes) is not carried.

use super::{DesignFormat, FormatCapability, InterchangeError};
use crate::model::Design;

pub const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";
#[cfg(feature = "interchange")]
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

#[cfg(feature = "interchange")]
const KEY_FACTOR_N: &str = "factor_n";
#[cfg(feature = "interchange")]
const KEY_FACTOR_TYPE: &str = "factor_type";
#[cfg(feature = "interchange")]
const KEY_REL_TYPE: &str = "rel_type";

/// GraphML format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphMl;

impl DesignFormat for GraphMl {
    fn name(&self) -> &'static str {
        "GraphML"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["graphml"]
    }

    fn mime_type(&self) -> &'static str {
        "application/graphml+xml"
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability {
            read: true,
            write: true,
            lossless: false,
        }
    }

    fn read(&self, input: &[u8]) -> Result<Design, InterchangeError> {
        #[cfg(feature = "interchange")]
        {
            reader::GraphMlReader::default().read(input)
        }
        #[cfg(not(feature = "interchange"))]
        {
            let _ = input;
            Err(InterchangeError::feature_required("GraphML reading"))
        }
    }

    fn write(&self, design: &Design) -> Result<Vec<u8>, InterchangeError> {
        #[cfg(feature = "interchange")]
        {
            writer::write(design)
        }
        #[cfg(not(feature = "interchange"))]
        {
            let _ = design;
            Err(InterchangeError::feature_required("GraphML writing"))
        }
    }
}

// ============================================================================
// GRAPHML READER (requires interchange feature)
// ============================================================================

#[cfg(feature = "interchange")]
mod reader {
    use super::*;
    use crate::model::{FactorKind, FactorSize, RelationKind};
    use quick_xml::Reader;
    use quick_xml::events::{BytesStart, Event};
    use rustc_hash::FxHashMap;

    #[derive(Default)]
    struct NodeRecord {
        id: String,
        n: Option<String>,
        kind: Option<String>,
    }

    #[derive(Default)]
    struct EdgeRecord {
        source: String,
        target: String,
        kind: Option<String>,
    }

    #[derive(Clone, Copy)]
    enum Scope {
        Graph,
        Node(usize),
        Edge(usize),
    }

    /// Collects nodes and edges, then builds the design in one pass.
    pub struct GraphMlReader {
        /// Key id (`d0`) to attribute name (`factor_n`).
        keys: FxHashMap<String, String>,
        nodes: Vec<NodeRecord>,
        edges: Vec<EdgeRecord>,
        scope: Scope,
        data_key: Option<String>,
    }

    impl Default for GraphMlReader {
        fn default() -> Self {
            Self {
                keys: FxHashMap::default(),
                nodes: Vec::new(),
                edges: Vec::new(),
                scope: Scope::Graph,
                data_key: None,
            }
        }
    }

    fn attributes(e: &BytesStart<'_>) -> Result<FxHashMap<String, String>, InterchangeError> {
        let mut attrs = FxHashMap::default();
        for attr_result in e.attributes() {
            let attr =
                attr_result.map_err(|e| InterchangeError::xml(format!("Attribute error: {e}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| InterchangeError::xml(format!("Attribute key error: {e}")))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| InterchangeError::xml(format!("Attribute value error: {e}")))?
                .to_string();
            attrs.insert(key, value);
        }
        Ok(attrs)
    }

    fn take(
        attrs: &mut FxHashMap<String, String>,
        name: &'static str,
    ) -> Result<String, InterchangeError> {
        attrs
            .remove(name)
            .ok_or_else(|| InterchangeError::missing_attribute(name))
    }

    impl GraphMlReader {
        pub fn read(mut self, input: &[u8]) -> Result<Design, InterchangeError> {
            let mut reader = Reader::from_reader(input);
            reader.config_mut().trim_text(true);

            let mut buf = Vec::new();
            loop {
                match reader.read_event_into(&mut buf) {
                    Ok(Event::Start(ref e)) => self.handle_start(e, false)?,
                    Ok(Event::Empty(ref e)) => self.handle_start(e, true)?,
                    Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                        b"node" | b"edge" => self.scope = Scope::Graph,
                        b"data" => self.data_key = None,
                        _ => {}
                    },
                    Ok(Event::Text(ref t)) => {
                        let text = t
                            .unescape()
                            .map_err(|e| InterchangeError::xml(format!("Text error: {e}")))?;
                        self.handle_text(text.trim());
                    }
                    Ok(Event::Eof) => break,
                    Err(e) => {
                        return Err(InterchangeError::xml(format!(
                            "XML parse error at position {}: {e}",
                            reader.error_position()
                        )));
                    }
                    _ => {}
                }
                buf.clear();
            }

            self.build()
        }

        fn handle_start(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<(), InterchangeError> {
            match e.local_name().as_ref() {
                b"key" => {
                    let mut attrs = attributes(e)?;
                    let id = take(&mut attrs, "id")?;
                    let name = take(&mut attrs, "attr.name")?;
                    self.keys.insert(id, name);
                }
                b"node" => {
                    let mut attrs = attributes(e)?;
                    self.nodes.push(NodeRecord {
                        id: take(&mut attrs, "id")?,
                        ..NodeRecord::default()
                    });
                    if !empty {
                        self.scope = Scope::Node(self.nodes.len() - 1);
                    }
                }
                b"edge" => {
                    let mut attrs = attributes(e)?;
                    self.edges.push(EdgeRecord {
                        source: take(&mut attrs, "source")?,
                        target: take(&mut attrs, "target")?,
                        kind: None,
                    });
                    if !empty {
                        self.scope = Scope::Edge(self.edges.len() - 1);
                    }
                }
                b"data" if !empty => {
                    let mut attrs = attributes(e)?;
                    self.data_key = Some(take(&mut attrs, "key")?);
                }
                _ => {}
            }
            Ok(())
        }

        fn handle_text(&mut self, text: &str) {
            let Some(key) = &self.data_key else {
                return;
            };
            let name = self.keys.get(key).map_or(key.as_str(), String::as_str);
            match (self.scope, name) {
                (Scope::Node(i), KEY_FACTOR_N) => self.nodes[i].n = Some(text.to_string()),
                (Scope::Node(i), KEY_FACTOR_TYPE) => self.nodes[i].kind = Some(text.to_string()),
                (Scope::Edge(i), KEY_REL_TYPE) => self.edges[i].kind = Some(text.to_string()),
                _ => {}
            }
        }

        fn build(self) -> Result<Design, InterchangeError> {
            let mut design = Design::new();
            for node in &self.nodes {
                let n = node.n.as_deref().ok_or_else(|| {
                    InterchangeError::missing_element(format!("{KEY_FACTOR_N} of node '{}'", node.id))
                })?;
                // Older exports separate branches with commas.
                let size: FactorSize = n
                    .replace(',', "|")
                    .parse()
                    .map_err(|e| InterchangeError::xml(format!("node '{}': {e}", node.id)))?;
                let kind: FactorKind = match &node.kind {
                    Some(kind) => kind.parse().map_err(InterchangeError::xml)?,
                    None => FactorKind::Factor,
                };
                design.add_factor(&node.id, size, kind)?;
            }
            for edge in &self.edges {
                let kind: RelationKind = edge
                    .kind
                    .as_deref()
                    .ok_or_else(|| {
                        InterchangeError::missing_element(format!(
                            "{KEY_REL_TYPE} of edge '{}' -> '{}'",
                            edge.source, edge.target
                        ))
                    })?
                    .parse()
                    .map_err(InterchangeError::xml)?;
                design.add_relationship(&edge.source, &edge.target, kind)?;
            }
            Ok(design)
        }
    }
}

// ============================================================================
// GRAPHML WRITER (requires interchange feature)
// ============================================================================

#[cfg(feature = "interchange")]
mod writer {
    use super::*;
    use quick_xml::Writer;
    use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
    use std::io::Cursor;

    fn xml_err(e: impl std::fmt::Display) -> InterchangeError {
        InterchangeError::xml(format!("Write error: {e}"))
    }

    fn write_key<W: std::io::Write>(
        writer: &mut Writer<W>,
        id: &str,
        target: &str,
        name: &str,
    ) -> Result<(), InterchangeError> {
        let mut key = BytesStart::new("key");
        key.push_attribute(("id", id));
        key.push_attribute(("for", target));
        key.push_attribute(("attr.name", name));
        key.push_attribute(("attr.type", "string"));
        writer.write_event(Event::Empty(key)).map_err(xml_err)?;
        Ok(())
    }

    fn write_data<W: std::io::Write>(
        writer: &mut Writer<W>,
        key: &str,
        value: &str,
    ) -> Result<(), InterchangeError> {
        let mut data = BytesStart::new("data");
        data.push_attribute(("key", key));
        writer.write_event(Event::Start(data)).map_err(xml_err)?;
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("data")))
            .map_err(xml_err)?;
        Ok(())
    }

    pub fn write(design: &Design) -> Result<Vec<u8>, InterchangeError> {
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;

        let schema_location = format!("{GRAPHML_NS} {GRAPHML_NS}/1.0/graphml.xsd");
        let mut root = BytesStart::new("graphml");
        root.push_attribute(("xmlns", GRAPHML_NS));
        root.push_attribute(("xmlns:xsi", XSI_NS));
        root.push_attribute(("xsi:schemaLocation", schema_location.as_str()));
        writer.write_event(Event::Start(root)).map_err(xml_err)?;

        write_key(&mut writer, "d0", "node", KEY_FACTOR_N)?;
        write_key(&mut writer, "d1", "node", KEY_FACTOR_TYPE)?;
        write_key(&mut writer, "d2", "edge", KEY_REL_TYPE)?;

        let mut graph = BytesStart::new("graph");
        graph.push_attribute(("id", "G"));
        graph.push_attribute(("edgedefault", "directed"));
        writer.write_event(Event::Start(graph)).map_err(xml_err)?;

        for (_, factor) in design.factors() {
            let mut node = BytesStart::new("node");
            node.push_attribute(("id", factor.name.as_str()));
            writer.write_event(Event::Start(node)).map_err(xml_err)?;
            write_data(&mut writer, "d0", &factor.size.to_string())?;
            write_data(&mut writer, "d1", factor.kind.as_str())?;
            writer
                .write_event(Event::End(BytesEnd::new("node")))
                .map_err(xml_err)?;
        }

        for (i, rel) in design.live_relationships().enumerate() {
            let id = format!("e{i}");
            let mut edge = BytesStart::new("edge");
            edge.push_attribute(("id", id.as_str()));
            edge.push_attribute(("source", design.name_of(rel.from)));
            edge.push_attribute(("target", design.name_of(rel.to)));
            writer.write_event(Event::Start(edge)).map_err(xml_err)?;
            write_data(&mut writer, "d2", rel.kind.as_str())?;
            writer
                .write_event(Event::End(BytesEnd::new("edge")))
                .map_err(xml_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("graph")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("graphml")))
            .map_err(xml_err)?;

        let mut output = buffer.into_inner();
        output.push(b'\n');
        Ok(output)
    }
}

#[cfg(all(test, feature = "interchange"))]
mod tests {
    use super::*;
    use crate::model::{FactorKind, FactorSize};

    fn hospital() -> Design {
        Design::from_grammar("Lane(2) == Hospital[4|6] > Patient(15) × Treatment(2)").unwrap()
    }

    #[test]
    fn test_graphml_structure() {
        let bytes = GraphMl.write(&hospital()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains(&format!("xmlns=\"{GRAPHML_NS}\"")));
        assert!(text.contains(
            "<key id=\"d0\" for=\"node\" attr.name=\"factor_n\" attr.type=\"string\"/>"
        ));
        assert!(text.contains("<graph id=\"G\" edgedefault=\"directed\">"));
        assert!(text.contains("<node id=\"Hospital\">"));
        assert!(text.contains("<data key=\"d0\">[4|6]</data>"));
        assert!(text.contains("<data key=\"d1\">batch</data>"));
        assert!(text.contains("<edge id=\"e0\" source=\"Hospital\" target=\"Patient\">"));
    }

    #[test]
    fn test_graphml_round_trip() {
        let design = hospital();
        let rebuilt = GraphMl.read(&GraphMl.write(&design).unwrap()).unwrap();
        assert_eq!(rebuilt, design);
        assert_eq!(rebuilt.factor("Lane").unwrap().kind, FactorKind::Batch);
        assert_eq!(rebuilt.count_observations(), design.count_observations());
    }

    #[test]
    fn test_graphml_reads_comma_branches() {
        let input = br#"<?xml version="1.0"?>
<graphml xmlns="http://graphml.graphdrawing.org/xmlns">
  <key id="d0" for="node" attr.name="factor_n" attr.type="string"/>
  <graph id="G" edgedefault="directed">
    <node id="Clinic"><data key="d0">[45,38]</data></node>
  </graph>
</graphml>"#;
        let design = GraphMl.read(input).unwrap();
        assert_eq!(
            design.factor("Clinic").unwrap().size,
            FactorSize::Unbalanced(vec![45, 38])
        );
    }

    #[test]
    fn test_graphml_missing_size() {
        let input = br#"<graphml><graph><node id="Site"/></graph></graphml>"#;
        assert!(matches!(
            GraphMl.read(input),
            Err(InterchangeError::Missing { kind: "element", .. })
        ));
    }

    #[test]
    fn test_graphml_missing_edge_attribute() {
        let input = br#"<graphml><graph><edge source="A"/></graph></graphml>"#;
        assert!(matches!(
            GraphMl.read(input),
            Err(InterchangeError::Missing { kind: "attribute", .. })
        ));
    }
}
