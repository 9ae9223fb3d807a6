use super::{CatalogStore, CatalogStoreError, Cube, Measure};
use std::collections::BTreeMap;

/// In-memory catalog for the AdventureWorks warehouse.
#[derive(Clone)]
pub struct LocalCatalogStore {
    cubes: BTreeMap<String, Cube>,
}

impl LocalCatalogStore {
    pub fn new(cubes: Vec<Cube>) -> Self {
        LocalCatalogStore {
            cubes: cubes.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }

    pub fn mock() -> Self {
        let sales = Cube {
            name: "SalesCube".to_string(),
            label: "Sales".to_string(),
            default_measure: "[Measures].[Sales Amount]".to_string(),
            measures: vec![
                Measure::new("[Measures].[Sales Amount]", Some("SUM(LineTotal)")),
                Measure::new("[Measures].[Order Quantity]", Some("SUM(OrderQty)")),
                Measure::new("[Measures].[Total Due]", Some("SUM(TotalDue)")),
                Measure::new("[Measures].[Tax Amount]", Some("SUM(TaxAmt)")),
                Measure::new("[Measures].[Freight]", Some("SUM(Freight)")),
            ],
            dimensions: vec![
                "[Date].[Year]".to_string(),
                "[Date].[Quarter]".to_string(),
                "[Date].[Month]".to_string(),
                "[Product].[Category]".to_string(),
                "[Customer].[Customer]".to_string(),
                "[Territory].[Territory]".to_string(),
            ],
        };

        let purchase = Cube {
            name: "PurchaseCube".to_string(),
            label: "Purchasing".to_string(),
            default_measure: "[Measures].[Total Due]".to_string(),
            measures: vec![
                Measure::new("[Measures].[Order Quantity]", Some("SUM(OrderQty)")),
                Measure::new("[Measures].[Total Due]", Some("SUM(TotalDue)")),
                Measure::new("[Measures].[Line Total]", Some("SUM(LineTotal)")),
            ],
            dimensions: vec![
                "[Date].[Year]".to_string(),
                "[Date].[Quarter]".to_string(),
                "[Date].[Month]".to_string(),
                "[Vendor].[Vendor]".to_string(),
                "[Product].[Category]".to_string(),
            ],
        };

        let production = Cube {
            name: "ProductionCube".to_string(),
            label: "Production".to_string(),
            default_measure: "[Measures].[Order Quantity]".to_string(),
            measures: vec![
                Measure::new("[Measures].[Order Quantity]", Some("SUM(OrderQty)")),
                Measure::new("[Measures].[Actual Cost]", Some("SUM(ActualCost)")),
                Measure::new("[Measures].[Planned Cost]", Some("SUM(PlannedCost)")),
                Measure::new("[Measures].[Scrapped Quantity]", Some("SUM(ScrappedQty)")),
                Measure::new("[Measures].[Production Days]", None),
            ],
            dimensions: vec![
                "[Date].[Year]".to_string(),
                "[Date].[Quarter]".to_string(),
                "[Date].[Month]".to_string(),
                "[Location].[Location]".to_string(),
                "[Product].[Category]".to_string(),
            ],
        };

        Self::new(vec![sales, purchase, production])
    }
}

impl CatalogStore for LocalCatalogStore {
    fn get_cube(&self, name: &str) -> Result<Cube, CatalogStoreError> {
        self.cubes
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogStoreError::CubeNotFound(name.to_string()))
    }

    fn get_all_cubes(&self) -> Result<BTreeMap<String, Cube>, CatalogStoreError> {
        Ok(self.cubes.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[fixture]
    fn store() -> LocalCatalogStore {
        LocalCatalogStore::mock()
    }

    #[rstest]
    #[case::sales("SalesCube", "[Measures].[Sales Amount]")]
    #[case::purchase("PurchaseCube", "[Measures].[Total Due]")]
    #[case::production("ProductionCube", "[Measures].[Order Quantity]")]
    fn default_measure_is_allowed(
        store: LocalCatalogStore,
        #[case] cube: &str,
        #[case] default_measure: &str,
    ) {
        let cube = store.get_cube(cube).unwrap();
        assert_eq!(cube.default_measure, default_measure);
        assert!(cube.measure(default_measure).is_some());
    }

    #[rstest]
    fn unknown_cube_is_reported(store: LocalCatalogStore) {
        let err = store.get_cube("HrCube").unwrap_err();
        assert!(matches!(err, CatalogStoreError::CubeNotFound(name) if name == "HrCube"));
    }

    #[rstest]
    fn dimension_lookup_is_exact(store: LocalCatalogStore) {
        let cube = store.get_cube("ProductionCube").unwrap();
        assert!(cube.allows_dimension("[Location].[Location]"));
        assert!(!cube.allows_dimension("[location].[location]"));
        assert!(!cube.allows_dimension("[Vendor].[Vendor]"));
    }
}
