use super::{MdxBuilder, ValidationError};

impl MdxBuilder {
    /// Translates measure tokens into a SQL select list over the flat fact
    /// table, e.g. `SUM(LineTotal) AS sales_amount`.
    ///
    /// Fails listing every measure that has no SQL equivalent rather than
    /// substituting one.
    pub fn flat_aggregate_projection(&self, measures: &[String]) -> Result<String, ValidationError> {
        let resolved = self.resolve_measures(measures)?;

        let mut projection = Vec::with_capacity(resolved.len());
        let mut missing = Vec::new();
        for token in &resolved {
            match self.cube.measure(token).and_then(|m| m.sql.as_deref()) {
                Some(sql) => projection.push(format!("{} AS {}", sql, sql_alias(token))),
                None => missing.push(token.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(ValidationError::NoSqlEquivalent(missing));
        }
        Ok(projection.join(", "))
    }
}

/// `[Measures].[Sales Amount]` -> `sales_amount`
fn sql_alias(token: &str) -> String {
    let name = token
        .rsplit('.')
        .next()
        .unwrap_or(token)
        .trim_matches(|c| c == '[' || c == ']');

    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
