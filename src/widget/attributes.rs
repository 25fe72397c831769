//! Attribute binding: raw attribute strings -> typed widget state
//!
//! Every widget declares a static [`WidgetSchema`]: the ordered list of
//! attributes it observes, each with a semantic kind and a default. The
//! [`AttributeBinder`] owns the typed value of every observed attribute and
//! guarantees they are always populated:
//!
//! - Attribute removed (`None`) -> schema default
//! - Value that fails to parse -> schema default (logged at debug)
//! - Attribute not in the schema -> ignored
//!
//! # Conversion rules
//!
//! | Kind      | Accepted                                   | Otherwise        |
//! |-----------|--------------------------------------------|------------------|
//! | `Text`    | any string, verbatim                       | -                |
//! | `Number`  | finite float, clamped to the optional range | default          |
//! | `Integer` | integral number `>= min`, clamped to `max` | default          |
//! | `Boolean` | `""`, `"true"` (any case), the attr's name | `false`          |
//! | `Choice`  | one of the allowed values (any case)       | default          |

use crate::error::WidgetError;
use std::borrow::Cow;
use std::fmt;

/// Semantic type of an attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeKind {
    Text,
    Number { min: Option<f64>, max: Option<f64> },
    /// A count. Values below `min` (`max-items="0"`, `"-1"`) read as unset and
    /// take the default; values above `max` clamp. Unlike `Number`, where
    /// either bound is a sensible stand-in, a count under its floor has no
    /// nearby meaning.
    Integer { min: i64, max: i64 },
    Boolean,
    Choice(&'static [&'static str]),
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(Cow<'static, str>),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    /// Canonical spelling from the schema's allowed list
    Choice(&'static str),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&'static str> {
        match self {
            Self::Choice(s) => Some(*s),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Choice(s) => f.write_str(s),
        }
    }
}

/// One observed attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub default: AttributeValue,
}

impl AttributeSpec {
    pub const fn text(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            kind: AttributeKind::Text,
            default: AttributeValue::Text(Cow::Borrowed(default)),
        }
    }

    pub const fn number(name: &'static str, default: f64, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            name,
            kind: AttributeKind::Number { min, max },
            default: AttributeValue::Number(default),
        }
    }

    pub const fn integer(name: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            name,
            kind: AttributeKind::Integer { min, max },
            default: AttributeValue::Integer(default),
        }
    }

    pub const fn boolean(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: AttributeKind::Boolean,
            default: AttributeValue::Boolean(default),
        }
    }

    pub const fn choice(
        name: &'static str,
        allowed: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            name,
            kind: AttributeKind::Choice(allowed),
            default: AttributeValue::Choice(default),
        }
    }

    /// Resolve a raw attribute value, falling back to the default
    pub fn resolve(&self, raw: Option<&str>) -> AttributeValue {
        let Some(raw) = raw else {
            return self.default.clone();
        };
        match self.parse(raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("{}; using default {}", e, self.default);
                self.default.clone()
            }
        }
    }

    /// Strict conversion of a present attribute value
    pub fn parse(&self, raw: &str) -> Result<AttributeValue, WidgetError> {
        match self.kind {
            AttributeKind::Text => Ok(AttributeValue::Text(Cow::Owned(raw.to_string()))),

            AttributeKind::Number { min, max } => {
                let n: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| self.error(raw, "not a number"))?;
                if !n.is_finite() {
                    return Err(self.error(raw, "not a finite number"));
                }
                let n = min.map_or(n, |m| n.max(m));
                let n = max.map_or(n, |m| n.min(m));
                Ok(AttributeValue::Number(n))
            }

            AttributeKind::Integer { min, max } => {
                let trimmed = raw.trim();
                let n = match trimmed.parse::<i64>() {
                    Ok(n) => n,
                    Err(_) => {
                        let f: f64 = trimmed
                            .parse()
                            .map_err(|_| self.error(raw, "not an integer"))?;
                        if !f.is_finite() || f.fract() != 0.0 {
                            return Err(self.error(raw, "not an integer"));
                        }
                        f as i64
                    }
                };
                if n < min {
                    return Err(self.error(raw, &format!("below minimum {}", min)));
                }
                Ok(AttributeValue::Integer(n.min(max)))
            }

            AttributeKind::Boolean => {
                let on = raw.is_empty() || raw.eq_ignore_ascii_case("true") || raw == self.name;
                Ok(AttributeValue::Boolean(on))
            }

            AttributeKind::Choice(allowed) => allowed
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(raw.trim()))
                .copied()
                .map(AttributeValue::Choice)
                .ok_or_else(|| self.error(raw, &format!("expected one of {:?}", allowed))),
        }
    }

    fn error(&self, raw: &str, reason: &str) -> WidgetError {
        WidgetError::AttributeParse {
            name: self.name.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// The observed-attribute surface of one widget type
#[derive(Debug)]
pub struct WidgetSchema {
    pub tag: &'static str,
    pub attributes: &'static [AttributeSpec],
}

impl WidgetSchema {
    pub fn spec(&self, name: &str) -> Option<&'static AttributeSpec> {
        self.attributes.iter().find(|spec| spec.name == name)
    }

    /// Attribute names in declaration order
    pub fn observed_attributes(&self) -> impl Iterator<Item = &'static str> {
        self.attributes.iter().map(|spec| spec.name)
    }
}

/// Typed values for every attribute of one widget instance
#[derive(Debug, Clone)]
pub struct AttributeBinder {
    schema: &'static WidgetSchema,
    /// Parallel to `schema.attributes`
    values: Vec<AttributeValue>,
}

impl AttributeBinder {
    /// Start with every attribute at its default
    pub fn new(schema: &'static WidgetSchema) -> Self {
        Self {
            schema,
            values: schema.attributes.iter().map(|s| s.default.clone()).collect(),
        }
    }

    pub fn schema(&self) -> &'static WidgetSchema {
        self.schema
    }

    /// Apply an attribute mutation.
    ///
    /// Returns the stored typed value, or `None` when the attribute is not
    /// observed by this widget.
    pub fn apply(&mut self, name: &str, raw: Option<&str>) -> Option<&AttributeValue> {
        let Some(index) = self.schema.attributes.iter().position(|s| s.name == name) else {
            tracing::trace!("<{}> ignoring unobserved attribute '{}'", self.schema.tag, name);
            return None;
        };
        self.values[index] = self.schema.attributes[index].resolve(raw);
        Some(&self.values[index])
    }

    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        let index = self.schema.attributes.iter().position(|s| s.name == name)?;
        self.values.get(index)
    }

    /// `(spec, value)` pairs in schema order
    pub fn values(&self) -> impl Iterator<Item = (&'static AttributeSpec, &AttributeValue)> {
        self.schema.attributes.iter().zip(self.values.iter())
    }
}
