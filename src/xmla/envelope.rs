use crate::mdx::MdxStatement;
use quick_xml::escape::escape;

pub const SOAP_ACTION: &str = "urn:schemas-microsoft-com:xml-analysis:Execute";

/// SOAP 1.1 `Execute` request for one statement against one catalog.
pub fn execute_envelope(statement: &MdxStatement, catalog: &str) -> String {
    format!(
        r#"<Envelope xmlns="http://schemas.xmlsoap.org/soap/envelope/">
  <Body>
    <Execute xmlns="urn:schemas-microsoft-com:xml-analysis">
      <Command><Statement>{}</Statement></Command>
      <Properties><PropertyList><Catalog>{}</Catalog></PropertyList></Properties>
    </Execute>
  </Body>
</Envelope>"#,
        escape(statement.as_str()),
        escape(catalog)
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wraps_statement_and_catalog() {
        let statement = MdxStatement::from_trusted("SELECT {[Measures].[Sales Amount]} ON COLUMNS FROM [SalesCube]");
        let body = execute_envelope(&statement, "AdventureWorks");

        assert!(body.starts_with(r#"<Envelope xmlns="http://schemas.xmlsoap.org/soap/envelope/">"#));
        assert!(body.contains(r#"<Execute xmlns="urn:schemas-microsoft-com:xml-analysis">"#));
        assert!(body.contains(
            "<Command><Statement>SELECT {[Measures].[Sales Amount]} ON COLUMNS FROM [SalesCube]</Statement></Command>"
        ));
        assert!(body.contains("<Catalog>AdventureWorks</Catalog>"));
    }

    #[test]
    fn member_keys_are_escaped() {
        let statement = MdxStatement::from_trusted(
            "SELECT {[Measures].[Order Quantity]} ON COLUMNS FROM [ProductionCube] WHERE ([Location].[Location].&[Seattle])",
        );
        let body = execute_envelope(&statement, "AdventureWorks");

        assert!(body.contains("[Location].[Location].&amp;[Seattle]"));
        assert!(!body.contains(".&["));
    }
}
