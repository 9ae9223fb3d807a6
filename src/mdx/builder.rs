use super::clauses::{format_filter_clause, is_time_filter, validate_member};
use super::{DimensionFilter, MdxStatement, TimeLevel, ValidationError};
use crate::catalog::Cube;
use log::debug;

/// Builds MDX `SELECT` statements against one cube.
///
/// Every measure and dimension token is checked against the cube's allow-list
/// and every member value against [`validate_member`] before it is
/// interpolated, so nothing caller-supplied reaches the statement unchecked.
pub struct MdxBuilder {
    pub(super) cube: Cube,
}

impl MdxBuilder {
    pub fn new(cube: Cube) -> Self {
        MdxBuilder { cube }
    }

    pub fn build(
        &self,
        measures: &[String],
        time_level: TimeLevel,
        filters: &DimensionFilter,
    ) -> Result<MdxStatement, ValidationError> {
        let measures = self.resolve_measures(measures)?;
        let where_clauses = self.filter_clauses(time_level, filters)?;

        let mut mdx = format!(
            "SELECT {{{}}} ON COLUMNS,\nNON EMPTY {}.Members ON ROWS\nFROM [{}]",
            measures.join(", "),
            time_level.token(),
            self.cube.name
        );

        if !where_clauses.is_empty() {
            mdx.push_str(&format!("\nWHERE ({})", where_clauses.join(",")));
        }

        debug!("Built MDX statement: {}", mdx);
        Ok(MdxStatement(mdx))
    }

    /// Falls back to the cube's default measure when none are requested.
    /// Duplicates are dropped, keeping the first occurrence.
    pub(super) fn resolve_measures(&self, measures: &[String]) -> Result<Vec<String>, ValidationError> {
        if measures.is_empty() {
            return Ok(vec![self.cube.default_measure.clone()]);
        }

        let mut resolved: Vec<String> = Vec::with_capacity(measures.len());
        for token in measures {
            let measure = self
                .cube
                .measure(token.trim())
                .ok_or_else(|| ValidationError::UnknownMeasure {
                    cube: self.cube.name.clone(),
                    token: token.clone(),
                })?;
            if !resolved.contains(&measure.name) {
                resolved.push(measure.name.clone());
            }
        }
        Ok(resolved)
    }

    fn filter_clauses(
        &self,
        time_level: TimeLevel,
        filters: &DimensionFilter,
    ) -> Result<Vec<String>, ValidationError> {
        let mut clauses = Vec::new();

        for (dimension, members) in filters {
            if is_time_filter(time_level, dimension) {
                debug!(
                    "Skipping filter on {} while rows are sliced by {}",
                    dimension,
                    time_level.token()
                );
                continue;
            }
            if members.is_empty() {
                continue;
            }
            if !self.cube.allows_dimension(dimension) {
                return Err(ValidationError::UnknownDimension {
                    cube: self.cube.name.clone(),
                    token: dimension.clone(),
                });
            }
            for member in members {
                validate_member(dimension, member)?;
            }
            clauses.push(format_filter_clause(dimension, members));
        }

        Ok(clauses)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::local_store::LocalCatalogStore;
    use crate::catalog::CatalogStore;
    use rstest::*;

    fn builder_for(cube: &str) -> MdxBuilder {
        let store = LocalCatalogStore::mock();
        MdxBuilder::new(store.get_cube(cube).unwrap())
    }

    #[fixture]
    fn sales_builder() -> MdxBuilder {
        builder_for("SalesCube")
    }

    #[fixture]
    fn production_builder() -> MdxBuilder {
        builder_for("ProductionCube")
    }

    fn squash(mdx: &str) -> String {
        mdx.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn filters(entries: Vec<(&str, Vec<&str>)>) -> DimensionFilter {
        entries
            .into_iter()
            .map(|(dim, members)| {
                (
                    dim.to_string(),
                    members.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect()
    }

    #[rstest]
    fn builds_plain_time_series(sales_builder: MdxBuilder) {
        let mdx = sales_builder
            .build(
                &["[Measures].[Sales Amount]".to_string()],
                TimeLevel::parse("[Date].[Year]").unwrap(),
                &DimensionFilter::new(),
            )
            .unwrap();
        assert_eq!(
            squash(mdx.as_str()),
            "SELECT {[Measures].[Sales Amount]} ON COLUMNS, NON EMPTY [Date].[Year].Members ON ROWS FROM [SalesCube]"
        );
    }

    #[rstest]
    #[case::no_filters(
        vec![],
        TimeLevel::Year,
        "SELECT {[Measures].[Order Quantity]} ON COLUMNS, NON EMPTY [Date].[Year].Members ON ROWS FROM [ProductionCube]"
    )]
    #[case::single_member(
        vec![("[Location].[Location]", vec!["Seattle"])],
        TimeLevel::Year,
        "SELECT {[Measures].[Order Quantity]} ON COLUMNS, NON EMPTY [Date].[Year].Members ON ROWS FROM [ProductionCube] WHERE ([Location].[Location].&[Seattle])"
    )]
    #[case::member_set(
        vec![("[Location].[Location]", vec!["Seattle", "Tacoma"])],
        TimeLevel::Quarter,
        "SELECT {[Measures].[Order Quantity]} ON COLUMNS, NON EMPTY [Date].[Quarter].Members ON ROWS FROM [ProductionCube] WHERE ({[Location].[Location].&[Seattle],[Location].[Location].&[Tacoma]})"
    )]
    #[case::two_dimensions(
        vec![("[Product].[Category]", vec!["Bikes"]), ("[Location].[Location]", vec!["Seattle"])],
        TimeLevel::Month,
        "SELECT {[Measures].[Order Quantity]} ON COLUMNS, NON EMPTY [Date].[Month].Members ON ROWS FROM [ProductionCube] WHERE ([Location].[Location].&[Seattle],[Product].[Category].&[Bikes])"
    )]
    #[case::time_filter_skipped(
        vec![("[Date].[Year]", vec!["2014"])],
        TimeLevel::Year,
        "SELECT {[Measures].[Order Quantity]} ON COLUMNS, NON EMPTY [Date].[Year].Members ON ROWS FROM [ProductionCube]"
    )]
    #[case::time_filter_skipped_others_kept(
        vec![("[Date].[Month]", vec!["January"]), ("[Location].[Location]", vec!["Seattle"])],
        TimeLevel::Year,
        "SELECT {[Measures].[Order Quantity]} ON COLUMNS, NON EMPTY [Date].[Year].Members ON ROWS FROM [ProductionCube] WHERE ([Location].[Location].&[Seattle])"
    )]
    #[case::empty_member_list_ignored(
        vec![("[Location].[Location]", vec![])],
        TimeLevel::Year,
        "SELECT {[Measures].[Order Quantity]} ON COLUMNS, NON EMPTY [Date].[Year].Members ON ROWS FROM [ProductionCube]"
    )]
    fn builds_default_measure_statements(
        production_builder: MdxBuilder,
        #[case] entries: Vec<(&str, Vec<&str>)>,
        #[case] time_level: TimeLevel,
        #[case] expected: &str,
    ) {
        let mdx = production_builder
            .build(&[], time_level, &filters(entries))
            .unwrap();
        assert_eq!(squash(mdx.as_str()), expected);
    }

    #[rstest]
    fn keeps_measure_order_and_drops_duplicates(sales_builder: MdxBuilder) {
        let measures = vec![
            "[Measures].[Total Due]".to_string(),
            "[Measures].[Sales Amount]".to_string(),
            "[Measures].[Total Due]".to_string(),
        ];
        let mdx = sales_builder
            .build(&measures, TimeLevel::Year, &DimensionFilter::new())
            .unwrap();
        assert!(mdx
            .as_str()
            .starts_with("SELECT {[Measures].[Total Due], [Measures].[Sales Amount]} ON COLUMNS"));
    }

    #[rstest]
    #[case::not_in_cube("[Measures].[Scrapped Quantity]")]
    #[case::injection("[Measures].[Sales Amount]} ON COLUMNS FROM [HrCube] --")]
    #[case::bare_name("Sales Amount")]
    fn rejects_measures_outside_allow_list(sales_builder: MdxBuilder, #[case] token: &str) {
        let err = sales_builder
            .build(&[token.to_string()], TimeLevel::Year, &DimensionFilter::new())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownMeasure {
                cube: "SalesCube".to_string(),
                token: token.to_string(),
            }
        );
    }

    #[rstest]
    fn rejects_dimensions_outside_allow_list(sales_builder: MdxBuilder) {
        let err = sales_builder
            .build(
                &[],
                TimeLevel::Year,
                &filters(vec![("[Vendor].[Vendor]", vec!["Acme"])]),
            )
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownDimension { token, .. } if token == "[Vendor].[Vendor]"));
    }

    #[rstest]
    fn rejects_unsafe_member_values(production_builder: MdxBuilder) {
        let err = production_builder
            .build(
                &[],
                TimeLevel::Year,
                &filters(vec![("[Location].[Location]", vec!["Seattle", "x]) ON ROWS FROM [HrCube"])]),
            )
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMember { .. }));
    }
}
