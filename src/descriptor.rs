//! Config descriptor extraction.
//!
//! Walks a [`Schema`]'s field list depth-first, pre-order, and produces one
//! [`ConfigDescriptor`] per leaf. Nested sections contribute their lowercase
//! name plus `.` to the dotted path of their leaves and produce no descriptor
//! of their own.
//!
//! Default annotations are parsed here, by kind:
//!
//! | Kind | Annotation | Unparseable annotation |
//! |------|------------|------------------------|
//! | string | verbatim | n/a |
//! | int | `i64` | `0` |
//! | float32 | `f32` | `0.0` |
//! | uint, float64 | `u64` / `f64` | none |
//! | bool | `true`/`false`/`t`/`f`/`1`/`0`, any case | `false` |
//!
//! Integer defaults must also fit the leaf's Rust type, so `300` on an `i8`
//! leaf is unparseable. Unparseable numeric defaults are not an error; they fall back to the zero
//! value and a warning is logged. Extraction itself never fails: kinds that
//! cannot become flags are rejected later, at flag registration.

use toml::Value;
use tracing::warn;

use crate::schema::{Field, IntRange, Kind, Schema, Shape};
use crate::value;

/// A leaf's default value, typed by its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float32(f32),
    /// Annotation on a kind without a dedicated parser, kept as written.
    Untyped(String),
    /// No annotation on a kind without a known zero value.
    Absent,
}

impl DefaultValue {
    fn parse(name: &str, kind: Kind, range: Option<IntRange>, annotation: Option<&str>) -> Self {
        let Some(raw) = annotation else {
            return Self::zero(kind);
        };
        match kind {
            Kind::String => Self::String(raw.to_string()),
            Kind::Bool => Self::Bool(value::parse_bool(raw).unwrap_or(false)),
            Kind::Int => Self::Int(value::parse_int(kind, range, raw).unwrap_or_else(|e| {
                warn!(key = name, default = raw, error = %e, "Unparseable default, using 0");
                0
            })),
            Kind::Float32 => Self::Float32(value::parse_f32(raw).unwrap_or_else(|e| {
                warn!(key = name, default = raw, error = %e, "Unparseable default, using 0");
                0.0
            })),
            Kind::Uint | Kind::Float64 => match value::parse_raw(kind, range, raw) {
                Ok(_) => Self::Untyped(raw.trim().to_string()),
                Err(e) => {
                    warn!(key = name, default = raw, error = %e, "Unparseable default, ignoring it");
                    Self::Absent
                }
            },
            Kind::List => Self::Untyped(raw.to_string()),
        }
    }

    fn zero(kind: Kind) -> Self {
        match kind {
            Kind::String => Self::String(String::new()),
            Kind::Bool => Self::Bool(false),
            Kind::Int => Self::Int(0),
            Kind::Float32 => Self::Float32(0.0),
            Kind::Uint | Kind::Float64 | Kind::List => Self::Absent,
        }
    }

    /// The value seeded into the defaults layer, if any.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::String(s) => Some(Value::String(s.clone())),
            Self::Bool(b) => Some(Value::Boolean(*b)),
            Self::Int(i) => Some(Value::Integer(*i)),
            Self::Float32(f) => Some(Value::Float(f64::from(*f))),
            Self::Untyped(raw) => Some(value::heuristic(raw)),
            Self::Absent => None,
        }
    }
}

/// One leaf of the config struct, with everything needed to bind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDescriptor {
    pub name: String,
    pub kind: Kind,
    /// Bounds of an integer leaf's Rust type, if it declared one.
    pub range: Option<IntRange>,
    pub description: String,
    pub default: DefaultValue,
    pub has_default: bool,
    pub hidden: bool,
    pub required: bool,
}

impl ConfigDescriptor {
    /// Flag name: the dotted path with dots turned into hyphens.
    pub fn flag_name(&self) -> String {
        self.name.replace('.', "-").to_lowercase()
    }

    /// Env var name: `[PREFIX_]PATH`, uppercased, dots turned into underscores.
    pub fn env_var(&self, prefix: Option<&str>) -> String {
        let path = match prefix {
            Some(p) if !p.is_empty() => format!("{p}_{}", self.name),
            _ => self.name.clone(),
        };
        path.replace('.', "_").to_uppercase()
    }
}

/// Extract the descriptors of a schema type.
pub fn extract<C: Schema>() -> Vec<ConfigDescriptor> {
    extract_fields(&C::fields())
}

/// Extract the descriptors of a field list, e.g. one nested section.
pub fn extract_fields(fields: &[Field]) -> Vec<ConfigDescriptor> {
    let mut out = Vec::new();
    collect(fields, "", &mut out);
    out
}

fn collect(fields: &[Field], prefix: &str, out: &mut Vec<ConfigDescriptor>) {
    for field in fields {
        let name = format!("{prefix}{}", field.name.to_lowercase());
        match &field.shape {
            Shape::Nested(children) => collect(children, &format!("{name}."), out),
            Shape::Leaf(kind) => out.push(ConfigDescriptor {
                default: DefaultValue::parse(&name, *kind, field.range, field.default.as_deref()),
                has_default: field.default.is_some(),
                kind: *kind,
                range: field.range,
                description: field.desc.clone(),
                hidden: field.hidden,
                required: field.required,
                name,
            }),
        }
    }
}
