use serde_json::json;
use xmlbench::{QueryOutcome, Session, encode_literal, evaluate_in_document};
use xmlbench::{NamespaceMap, XPathValue, XmlDocument};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const CATALOG: &str = r#"<catalog>
  <book id="bk101"><title>XML Basics</title><price>30</price></book>
  <book id="bk102"><title>Advanced XPath</title><price>40</price></book>
</catalog>"#;

#[test]
fn transform_round_trip_counts_matched_nodes() {
    init();
    let mut session = Session::new();
    session.set_xml(CATALOG);
    session.set_xslt(
        r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
          <xsl:template match="/">
            <xsl:for-each select="/catalog/book">
              <xsl:value-of select="title"/><xsl:text>\n</xsl:text>
            </xsl:for-each>
          </xsl:template>
        </xsl:stylesheet>"#,
    );

    let result = session.run_transform().unwrap();
    assert_eq!(result.stats.for_each_total, 1);
    assert_eq!(result.stats.for_each_matched_nodes, 2);

    let first = result.output.find("XML Basics").unwrap();
    let second = result.output.find("Advanced XPath").unwrap();
    assert!(first < second);
}

#[test]
fn suggestions_are_capped_and_unique() {
    init();
    let mut session = Session::new();
    session.set_xml(CATALOG);

    let offset = CATALOG.find("Advanced").unwrap();
    let suggestions = session.suggest(offset).unwrap();

    assert!(!suggestions.is_empty());
    assert!(suggestions.len() <= 5);
    for (i, a) in suggestions.iter().enumerate() {
        for b in &suggestions[i + 1..] {
            assert_ne!(a.xpath, b.xpath);
        }
        assert!(!a.label.is_empty());
        assert!(!a.score.is_empty());
    }
    assert_eq!(suggestions[0].xpath, "/catalog[1]/book[1]/title[1]");
}

#[test]
fn encoded_literals_evaluate_back_to_their_text() {
    init();
    let doc = XmlDocument::parse("<r/>").unwrap();
    let ns = NamespaceMap::new();
    for text in [
        "plain",
        "has 'apostrophes'",
        "has \"quotes\"",
        "A \"quote\" and 'apostrophe'",
        "",
    ] {
        let encoded = encode_literal(text);
        let value = evaluate_in_document(&encoded, &doc, &ns).unwrap();
        match value {
            XPathValue::String(s) => assert_eq!(s, text, "round trip of {text:?}"),
            other => panic!("expected a string for {text:?}, got {other:?}"),
        }
    }
    assert!(encode_literal("A \"quote\" and 'apostrophe'").starts_with("concat("));
}

#[test]
fn formatter_is_idempotent() {
    init();
    let mut session = Session::new();
    session.set_xml(CATALOG);
    let once = session.format_xml().unwrap();

    session.set_xml(once.clone());
    let twice = session.format_xml().unwrap();
    assert_eq!(once, twice);
}

#[test]
fn schema_validation_end_to_end() {
    init();
    let schema = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
      <xs:element name="catalog">
        <xs:complexType>
          <xs:sequence>
            <xs:element name="book"/>
            <xs:element name="note" minOccurs="0"/>
          </xs:sequence>
        </xs:complexType>
      </xs:element>
    </xs:schema>"#;

    let mut session = Session::new();
    let rules = session.load_xsd(schema).unwrap();
    assert!(rules.supported);
    assert_eq!(rules.root_names, vec!["catalog"]);

    session.set_xml(CATALOG);
    let outcome = session.validate_against_xsd().unwrap();
    assert!(outcome.ok);

    // note is optional, book is not.
    session.set_xml("<catalog><item/></catalog>");
    let outcome = session.validate_against_xsd().unwrap();
    assert!(!outcome.ok);
    assert!(outcome.summary.contains("issues"));
    assert_eq!(
        outcome.details,
        vec!["Missing required direct child <book> under <catalog>."]
    );
}

#[test]
fn default_namespace_miss_sets_the_hint() {
    init();
    let mut session = Session::new();
    session.set_xml(r#"<catalog xmlns="urn:c"><book/></catalog>"#);

    let outcome = session.run_query("/catalog/book", "").unwrap();
    assert_eq!(
        outcome,
        QueryOutcome::Empty {
            default_namespace_hint: true
        }
    );

    // Binding a prefix through the namespace block resolves the miss.
    let outcome = session.run_query("/c:catalog/c:book", "c=urn:c").unwrap();
    assert!(matches!(outcome, QueryOutcome::Nodes(ref nodes) if nodes.len() == 1));
}

#[test]
fn boundary_types_serialize_to_stable_json() {
    init();
    let mut session = Session::new();
    session.set_xml("<a><b></a>");

    let report = session.check_well_formed();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["ok"], json!(false));
    assert!(value["issues"][0]["line"].is_u64());
    assert!(value["issues"][0]["column"].is_u64());

    session.set_xml(CATALOG);
    let suggestions = session.suggest(CATALOG.find("XML Basics").unwrap()).unwrap();
    let value = serde_json::to_value(&suggestions).unwrap();
    assert_eq!(value[0]["label"], json!("Absolute"));
    assert_eq!(value[0]["score"], json!("Fragile"));
    assert!(value[0]["xpath"].is_string());

    session.load_xsd("<not-a-schema/>").unwrap();
    let value = serde_json::to_value(session.rules().unwrap()).unwrap();
    assert_eq!(value["supported"], json!(false));
    assert_eq!(value["reason"], json!("Document root is not an XSD schema."));
}

#[test]
fn query_results_render_per_node_kind() {
    init();
    let mut session = Session::new();
    session.set_xml(CATALOG);

    let outcome = session.run_query("//book/@id", "").unwrap();
    assert_eq!(
        outcome,
        QueryOutcome::Nodes(vec![
            "@id=\"bk101\"".to_string(),
            "@id=\"bk102\"".to_string()
        ])
    );

    let outcome = session.run_query("sum(//price)", "").unwrap();
    assert_eq!(outcome, QueryOutcome::Scalar("70".to_string()));
}
