//! Placeholder extraction and parameter binding.
//!
//! Placeholders have the form `<delim><name> <type>[,<option>,...]<delim>`
//! where the interior never contains the first character of the delimiter.
//! Each placeholder is replaced either by the driver's positional parameter
//! or, for interpolated parameters, by a splice expression of the generated
//! code.

use std::ops::Range;

use crate::{
    error::{QueryError, Result},
    types::{Field, Type},
};

/// Delimiter used when none is configured.
pub const DEFAULT_DELIMITER: &str = "%%";

const OPTION_INTERPOLATE: &str = "interpolate";
const OPTION_JOIN: &str = "join";

// splice of a host-language expression into the generated raw string literal
const SPLICE_OPEN: &str = "` + ";
const SPLICE_CLOSE: &str = " + `";

/// Rewritten query text together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundQuery {
    pub sql: String,
    pub params: Vec<Field>,
}

struct Seen {
    field: Field,
    position: Option<usize>,
}

/// Rewrites every placeholder in `query`.
///
/// `interpolate` is the global switch allowing the `interpolate` option;
/// `splice` selects whether interpolated parameters are emitted as splice
/// expressions (executable variant) or bound like any other parameter.
/// Positions passed to `nth` start at 0 and follow first appearance; a
/// repeated name reuses the first declaration and its position.
pub fn parse_query_fields<F>(
    query: &str,
    delimiter: &str,
    interpolate: bool,
    splice: bool,
    nth: F,
) -> Result<BoundQuery>
where
    F: Fn(usize) -> String,
{
    let placeholders = Placeholders::new(query, delimiter)?;

    let mut sql = String::with_capacity(query.len());
    let mut seen: Vec<Seen> = Vec::new();
    let mut next_position = 0;
    let mut last = 0;

    for span in placeholders {
        let interior = &query[span.start + delimiter.len()..span.end - delimiter.len()];
        let parsed = parse_placeholder(interior, interpolate)?;

        sql.push_str(&query[last..span.start]);

        let index = match seen.iter().position(|s| s.field.name == parsed.name) {
            Some(index) => index,
            None => {
                seen.push(Seen {
                    field: parsed,
                    position: None,
                });
                seen.len() - 1
            }
        };

        let entry = &mut seen[index];
        if splice && entry.field.interpolate {
            sql.push_str(SPLICE_OPEN);
            sql.push_str(&splice_expr(&entry.field));
            sql.push_str(SPLICE_CLOSE);
        } else {
            let position = *entry.position.get_or_insert_with(|| {
                let position = next_position;
                next_position += 1;
                position
            });
            sql.push_str(&nth(position));
        }

        last = span.end;
    }
    sql.push_str(&query[last..]);

    Ok(BoundQuery {
        sql,
        params: seen.into_iter().map(|s| s.field).collect(),
    })
}

fn parse_placeholder(interior: &str, interpolate: bool) -> Result<Field> {
    let (name, type_and_options) = interior.split_once(' ').ok_or_else(|| {
        QueryError::Syntax(format!("malformed query parameter {interior:?}"))
    })?;

    let mut parts = type_and_options.split(',');
    let mut field = Field {
        name: name.to_string(),
        ty: Type::named(parts.next().unwrap_or_default()),
        ..Field::default()
    };

    for option in parts {
        match option {
            OPTION_INTERPOLATE => {
                if !interpolate {
                    return Err(QueryError::Syntax(
                        "query interpolate is not enabled".to_string(),
                    ));
                }
                field.interpolate = true;
            }
            OPTION_JOIN => field.join = true,
            _ => {
                return Err(QueryError::Syntax(format!(
                    "unknown option encountered on query parameter {interior:?}"
                )))
            }
        }
    }

    Ok(field)
}

fn splice_expr(field: &Field) -> String {
    if field.join {
        format!(r#"strings.Join({}, "\n")"#, field.name)
    } else {
        // string values are spliced verbatim, quoting is left to the caller
        field.name.clone()
    }
}

/// Left to right, non-overlapping placeholder spans.
struct Placeholders<'a> {
    text: &'a str,
    delimiter: &'a str,
    first: char,
    pos: usize,
}

impl<'a> Placeholders<'a> {
    fn new(text: &'a str, delimiter: &'a str) -> Result<Self> {
        let first = delimiter.chars().next().ok_or_else(|| {
            QueryError::Configuration("query parameter delimiter must not be empty".to_string())
        })?;
        Ok(Self {
            text,
            delimiter,
            first,
            pos: 0,
        })
    }
}

impl Iterator for Placeholders<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            let start = self.pos + self.text[self.pos..].find(self.delimiter)?;
            let body = start + self.delimiter.len();
            let end = self.text[body..]
                .find(self.first)
                .map_or(self.text.len(), |i| body + i);

            if end > body && self.text[end..].starts_with(self.delimiter) {
                self.pos = end + self.delimiter.len();
                return Some(start..self.pos);
            }

            // no placeholder opens here; retry from the following character
            self.pos = start + self.text[start..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollar(i: usize) -> String {
        format!("${}", i + 1)
    }

    fn null(_: usize) -> String {
        "NULL".to_string()
    }

    #[test]
    fn repeated_name_reuses_position() {
        let bound = parse_query_fields(
            "SELECT * FROM t WHERE id = %%id int%% AND id2 = %%id int%%",
            DEFAULT_DELIMITER,
            false,
            true,
            dollar,
        )
        .unwrap();
        assert_eq!(bound.sql, "SELECT * FROM t WHERE id = $1 AND id2 = $1");
        assert_eq!(bound.params, vec![Field::new("id", "int")]);
    }

    #[test]
    fn repeated_name_keeps_first_type() {
        let bound = parse_query_fields(
            "%%a int%% %%b text%% %%a bigint%% %%c bool%%",
            DEFAULT_DELIMITER,
            false,
            true,
            dollar,
        )
        .unwrap();
        assert_eq!(bound.sql, "$1 $2 $1 $3");
        let names: Vec<_> = bound.params.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(bound.params[0].ty.type_name, "int");
    }

    #[test]
    fn interpolated_join_is_spliced() {
        let bound = parse_query_fields(
            "SELECT * FROM t WHERE id IN (%%ids []int,interpolate,join%%)",
            DEFAULT_DELIMITER,
            true,
            true,
            dollar,
        )
        .unwrap();
        assert_eq!(
            bound.sql,
            "SELECT * FROM t WHERE id IN (` + strings.Join(ids, \"\\n\") + `)"
        );
        assert_eq!(
            bound.params,
            vec![Field {
                name: "ids".into(),
                ty: Type::named("[]int"),
                interpolate: true,
                join: true,
            }]
        );
    }

    #[test]
    fn interpolated_fields_do_not_consume_positions() {
        let bound = parse_query_fields(
            "SELECT * FROM %%table string,interpolate%% WHERE id = %%id int%%",
            DEFAULT_DELIMITER,
            true,
            true,
            dollar,
        )
        .unwrap();
        assert_eq!(bound.sql, "SELECT * FROM ` + table + ` WHERE id = $1");
        assert_eq!(bound.params.len(), 2);
    }

    #[test]
    fn introspection_binds_interpolated_fields() {
        let bound = parse_query_fields(
            "SELECT * FROM t WHERE a = %%a int,interpolate%% AND b = %%b int%%",
            DEFAULT_DELIMITER,
            true,
            false,
            null,
        )
        .unwrap();
        assert_eq!(bound.sql, "SELECT * FROM t WHERE a = NULL AND b = NULL");
    }

    #[test]
    fn interpolate_requires_global_switch() {
        let err = parse_query_fields("%%x int,interpolate%%", "%%", false, true, dollar)
            .unwrap_err();
        assert!(matches!(err, QueryError::Syntax(_)));
        assert_eq!(err.to_string(), "query interpolate is not enabled");
    }

    #[test]
    fn unknown_option_names_interior() {
        let err = parse_query_fields("WHERE x = %%x int,bogus%%", "%%", true, true, dollar)
            .unwrap_err();
        assert!(matches!(err, QueryError::Syntax(_)));
        assert!(err.to_string().contains("\"x int,bogus\""));
    }

    #[test]
    fn later_occurrence_options_are_validated() {
        let err = parse_query_fields("%%x int%% %%x int,nope%%", "%%", false, true, dollar)
            .unwrap_err();
        assert!(err.to_string().contains("\"x int,nope\""));
    }

    #[test]
    fn missing_type_is_syntax_error() {
        let err = parse_query_fields("%%x%%", "%%", false, true, dollar).unwrap_err();
        assert!(matches!(err, QueryError::Syntax(_)));
    }

    #[test]
    fn empty_delimiter_is_configuration_error() {
        let err = parse_query_fields("SELECT 1", "", false, true, dollar).unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn text_without_placeholders_is_untouched() {
        let query = "SELECT a,\n\t b  FROM t -- 100%\nWHERE c = '%'";
        let bound = parse_query_fields(query, "%%", false, true, dollar).unwrap();
        assert_eq!(bound.sql, query);
        assert!(bound.params.is_empty());

        let again = parse_query_fields(&bound.sql, "%%", false, true, dollar).unwrap();
        assert_eq!(again.sql, bound.sql);
    }

    #[test]
    fn rewritten_output_is_stable() {
        let bound =
            parse_query_fields("SELECT %%a int%%, %%b text%%", "%%", false, true, dollar).unwrap();
        let again = parse_query_fields(&bound.sql, "%%", false, true, dollar).unwrap();
        assert_eq!(again.sql, bound.sql);
        assert!(again.params.is_empty());
    }

    #[test]
    fn stray_delimiter_characters_are_skipped() {
        let bound =
            parse_query_fields("SELECT '%' || %%%id int%%", "%%", false, true, dollar).unwrap();
        assert_eq!(bound.sql, "SELECT '%' || %$1");
        assert_eq!(bound.params, vec![Field::new("id", "int")]);
    }

    #[test]
    fn custom_delimiter() {
        let bound = parse_query_fields(
            "SELECT *\nFROM t\nWHERE a = ##a text## AND b = ##b int##",
            "##",
            false,
            true,
            |_| "?".to_string(),
        )
        .unwrap();
        assert_eq!(bound.sql, "SELECT *\nFROM t\nWHERE a = ? AND b = ?");
        assert_eq!(bound.params.len(), 2);
    }
}
