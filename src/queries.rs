use crate::mdx::MdxStatement;
use serde::Serialize;

/// A fixed MDX statement served by name. These are compiled into the binary
/// and never combined with caller input.
#[derive(Debug, Serialize)]
pub struct NamedQuery {
    pub name: &'static str,
    pub cube: &'static str,
    #[serde(skip)]
    mdx: &'static str,
}

impl NamedQuery {
    pub fn statement(&self) -> MdxStatement {
        MdxStatement::from_trusted(self.mdx)
    }
}

const NAMED_QUERIES: &[NamedQuery] = &[
    NamedQuery {
        name: "salesfact",
        cube: "SalesCube",
        mdx: r#"
SELECT
    {[Measures].[Sales Amount],
     [Measures].[Order Quantity],
     [Measures].[Total Due]}
ON COLUMNS,
    {([Date].[All Date],
      [Product].[All Product])}
ON ROWS
FROM [SalesCube]"#,
    },
    NamedQuery {
        name: "purchasefact",
        cube: "PurchaseCube",
        mdx: r#"
SELECT
    {[Measures].[Order Quantity],
     [Measures].[Total Due],
     [Measures].[Line Total]}
ON COLUMNS,
    {([Date].[All Date],
      [Vendor].[All Vendor],
      [Product].[All Product])}
ON ROWS
FROM [PurchaseCube]"#,
    },
    NamedQuery {
        name: "productionfact",
        cube: "ProductionCube",
        mdx: r#"
SELECT
    {[Measures].[Order Quantity],
     [Measures].[Actual Cost],
     [Measures].[Production Days]}
ON COLUMNS,
    {([start date].[All Date],
      [Product].[All Product])}
ON ROWS
FROM [ProductionCube]"#,
    },
    NamedQuery {
        name: "salestopcustomer",
        cube: "SalesCube",
        mdx: r#"
SELECT
    {[Measures].[Sales Amount]} ON COLUMNS,
    TopCount(
        [Customer].[All Customer],
        10,
        [Measures].[Sales Amount]
    ) ON ROWS
FROM [SalesCube]"#,
    },
    NamedQuery {
        name: "productionefficiency",
        cube: "ProductionCube",
        mdx: r#"
WITH
  MEMBER [Measures].[Cost Efficiency] AS
    ([Measures].[Actual Cost] / [Measures].[Planned Cost]),
    FORMAT_STRING = "0.00%"
SELECT
    {[Measures].[Actual Cost],
     [Measures].[Planned Cost],
     [Measures].[Cost Efficiency]} ON COLUMNS,
    [Product].[Category].Members ON ROWS
FROM [ProductionCube]"#,
    },
    NamedQuery {
        name: "productionscraprate",
        cube: "ProductionCube",
        mdx: r#"
WITH
  MEMBER [Measures].[Scrap Rate] AS
    ([Measures].[Scrapped Quantity] / [Measures].[Order Quantity]),
    FORMAT_STRING = "0.00%"
SELECT
    {[Measures].[Scrap Rate], [Measures].[Scrapped Quantity], [Measures].[Order Quantity]} ON COLUMNS,
    [Location].[Location].Members ON ROWS
FROM [ProductionCube]"#,
    },
];

/// Queries shown together on the summary dashboard.
pub const SUMMARY_QUERIES: &[&str] = &["salesfact", "purchasefact", "productionfact"];

pub fn all() -> &'static [NamedQuery] {
    NAMED_QUERIES
}

pub fn lookup(name: &str) -> Option<&'static NamedQuery> {
    NAMED_QUERIES.iter().find(|q| q.name == name)
}
