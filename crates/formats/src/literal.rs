// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/formats/src/literal.rs
//
// Python-literal cells of the EMOTIC annotation CSVs, e.g.
// `[86, 58, 564, 628]` or `['Disconnection', 'Doubt/Confusion']`.

use num_traits::ToPrimitive;
use py_literal::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiteralError {
    #[error("invalid Python literal {text:?}: {message}")]
    Syntax { text: String, message: String },
    #[error("number {0} is not a finite float")]
    NotFinite(String),
    #[error("expected {expected}, found {found}")]
    WrongType {
        expected: &'static str,
        found: String,
    },
    #[error("expected {expected} elements, found {found}")]
    WrongLength { expected: usize, found: usize },
}

/// Parse a complete Python literal, surrounding whitespace ignored.
fn parse_literal(text: &str) -> Result<Value, LiteralError> {
    text.trim()
        .parse::<Value>()
        .map_err(|e| LiteralError::Syntax {
            text: text.to_string(),
            message: e.to_string(),
        })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "str",
        Value::Bytes(_) => "bytes",
        Value::Integer(_) => "int",
        Value::Float(_) => "float",
        Value::Complex(_) => "complex",
        Value::Tuple(_) => "tuple",
        Value::List(_) => "list",
        Value::Dict(_) => "dict",
        Value::Set(_) => "set",
        Value::Boolean(_) => "bool",
        Value::None => "None",
    }
}

/// Elements of a list or tuple.
fn items<'a>(value: &'a Value, expected: &'static str) -> Result<&'a [Value], LiteralError> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(items),
        other => Err(LiteralError::WrongType {
            expected,
            found: kind(other).to_string(),
        }),
    }
}

fn as_f64(value: &Value) -> Result<f64, LiteralError> {
    let number = match value {
        Value::Integer(v) => v.to_f64(),
        Value::Float(v) => Some(*v),
        other => {
            return Err(LiteralError::WrongType {
                expected: "number",
                found: kind(other).to_string(),
            })
        }
    };
    number
        .filter(|v| v.is_finite())
        .ok_or_else(|| LiteralError::NotFinite(value.to_string()))
}

/// Parse a list/tuple whose elements are all numbers.
pub fn parse_number_list(text: &str) -> Result<Vec<f64>, LiteralError> {
    let value = parse_literal(text)?;
    items(&value, "list of numbers")?.iter().map(as_f64).collect()
}

/// Parse a list/tuple whose elements are all strings.
pub fn parse_string_list(text: &str) -> Result<Vec<String>, LiteralError> {
    let value = parse_literal(text)?;
    items(&value, "list of strings")?
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(LiteralError::WrongType {
                expected: "string",
                found: kind(other).to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bbox_list() {
        let bbox = parse_number_list("[86, 58, 564, 628]").unwrap();
        assert_eq!(bbox, vec![86.0, 58.0, 564.0, 628.0]);
    }

    #[test]
    fn parses_tuple_and_floats() {
        let values = parse_number_list("(5.5, 3, 1e1,)").unwrap();
        assert_eq!(values, vec![5.5, 3.0, 10.0]);
        assert_eq!(parse_number_list(" [0.5] ").unwrap(), vec![0.5]);
    }

    #[test]
    fn parses_category_names_with_either_quote() {
        let names = parse_string_list(r#"['Disconnection', "Doubt/Confusion"]"#).unwrap();
        assert_eq!(names, vec!["Disconnection", "Doubt/Confusion"]);
        assert!(parse_string_list("[]").unwrap().is_empty());
    }

    #[test]
    fn parenthesized_scalar_is_not_a_tuple() {
        assert!(parse_number_list("(5)").is_err());
        assert_eq!(parse_number_list("(5,)").unwrap(), vec![5.0]);
    }

    #[test]
    fn negative_and_huge_numbers() {
        assert_eq!(parse_number_list("[-1e300, -2, 0]").unwrap(), vec![-1e300, -2.0, 0.0]);
        assert!(matches!(
            parse_number_list("[1e999]"),
            Err(LiteralError::NotFinite(_))
        ));
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["[1, 2", "[1 2]", "[1, 2] x", "[1.2.3]", ""] {
            assert!(
                matches!(parse_literal(text), Err(LiteralError::Syntax { .. })),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn rejects_mixed_element_types() {
        assert!(matches!(
            parse_number_list("[1, 'a']"),
            Err(LiteralError::WrongType { expected: "number", .. })
        ));
        assert!(matches!(
            parse_number_list("[1, None]"),
            Err(LiteralError::WrongType { expected: "number", .. })
        ));
        assert!(matches!(
            parse_string_list("'Anger'"),
            Err(LiteralError::WrongType { .. })
        ));
    }
}
