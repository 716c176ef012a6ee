//! Mapping of native column types onto canonical [`Type`]s.

use anyhow::{bail, Result};

use crate::{driver::Driver, types::Type};

/// Maps a native database type name to its canonical type.
pub trait TypeMapper {
    fn canonical_type(&self, native: &str, driver: Driver) -> Result<Type>;
}

/// Default mapper: normalises the native name and lifts precision, scale,
/// array and unsigned qualifiers into the [`Type`] attributes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeTypeMapper;

impl TypeMapper for NativeTypeMapper {
    fn canonical_type(&self, native: &str, _driver: Driver) -> Result<Type> {
        parse_type(native)
    }
}

pub fn parse_type(native: &str) -> Result<Type> {
    let mut typ = native.trim().to_ascii_lowercase();
    if typ.is_empty() {
        bail!("empty native type");
    }

    let mut unsigned = false;
    if let Some(stripped) = typ.strip_suffix(" unsigned") {
        typ = stripped.trim_end().to_string();
        unsigned = true;
    }

    let mut is_array = false;
    if let Some(stripped) = typ.strip_suffix("[]") {
        typ = stripped.trim_end().to_string();
        is_array = true;
    }

    let (typ, prec, scale) = split_precision(&typ);

    Ok(Type {
        type_name: typ,
        prec,
        scale,
        nullable: false,
        is_array,
        unsigned,
    })
}

/// Extracts `(p[,s])` from a type name such as `numeric(10,2)` or
/// `timestamp(6) with time zone`. Non numeric arguments (e.g. mysql enums)
/// are left in place.
fn split_precision(typ: &str) -> (String, usize, usize) {
    let (Some(open), Some(close)) = (typ.find('('), typ.rfind(')')) else {
        return (typ.to_string(), 0, 0);
    };
    if close < open {
        return (typ.to_string(), 0, 0);
    }

    let args = &typ[open + 1..close];
    let mut parts = args.split(',').map(str::trim);
    let prec = parts.next().and_then(|p| p.parse::<usize>().ok());
    let scale = match parts.next() {
        Some(s) => s.parse::<usize>().ok(),
        None => Some(0),
    };
    match (prec, scale, parts.next()) {
        (Some(prec), Some(scale), None) => {
            let head = typ[..open].trim_end();
            let tail = typ[close + 1..].trim_start();
            let name = if tail.is_empty() {
                head.to_string()
            } else {
                format!("{head} {tail}")
            };
            (name, prec, scale)
        }
        _ => (typ.to_string(), 0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_type_is_lowercased() {
        let ty = parse_type(" INTEGER ").unwrap();
        assert_eq!(ty.type_name, "integer");
        assert_eq!((ty.prec, ty.scale), (0, 0));
        assert!(!ty.nullable);
    }

    #[test]
    fn precision_and_scale() {
        let ty = parse_type("numeric(10,2)").unwrap();
        assert_eq!(ty.type_name, "numeric");
        assert_eq!((ty.prec, ty.scale), (10, 2));

        let ty = parse_type("timestamp(6) with time zone").unwrap();
        assert_eq!(ty.type_name, "timestamp with time zone");
        assert_eq!(ty.prec, 6);
    }

    #[test]
    fn array_and_unsigned_qualifiers() {
        let ty = parse_type("character varying(255)[]").unwrap();
        assert_eq!(ty.type_name, "character varying");
        assert_eq!(ty.prec, 255);
        assert!(ty.is_array);

        let ty = parse_type("int(11) unsigned").unwrap();
        assert_eq!(ty.type_name, "int");
        assert!(ty.unsigned);
    }

    #[test]
    fn enum_arguments_are_kept() {
        let ty = parse_type("enum('a','b')").unwrap();
        assert_eq!(ty.type_name, "enum('a','b')");
        assert_eq!(ty.prec, 0);
    }

    #[test]
    fn empty_type_is_rejected() {
        assert!(parse_type("  ").is_err());
        assert!(NativeTypeMapper
            .canonical_type("", Driver::Sqlite3)
            .is_err());
    }
}
