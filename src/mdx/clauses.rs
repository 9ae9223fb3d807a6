use super::{TimeLevel, ValidationError};

const MAX_MEMBER_LEN: usize = 128;

/// Member values are caller data, so only a conservative character set may
/// reach the `&[...]` key syntax. Brackets, braces and parentheses never pass.
pub fn validate_member(dimension: &str, value: &str) -> Result<(), ValidationError> {
    let valid = !value.trim().is_empty()
        && value.chars().count() <= MAX_MEMBER_LEN
        && value.chars().all(|c| {
            c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.' | ',' | '&' | '\'' | '/' | ':')
        });

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidMember {
            dimension: dimension.to_string(),
            value: value.to_string(),
        })
    }
}

/// `D.&[v1]` for one member, `{D.&[v1],D.&[v2]}` for several.
pub fn format_filter_clause(dimension: &str, members: &[String]) -> String {
    let formatted: Vec<String> = members
        .iter()
        .map(|member| format!("{}.&[{}]", dimension, member))
        .collect();

    if formatted.len() > 1 {
        format!("{{{}}}", formatted.join(","))
    } else {
        formatted.concat()
    }
}

/// Filtering the dimension that is already sliced on ROWS would empty the result.
pub(super) fn is_time_filter(time_level: TimeLevel, dimension: &str) -> bool {
    time_level.token().contains(TimeLevel::DIMENSION) && dimension.contains(TimeLevel::DIMENSION)
}
