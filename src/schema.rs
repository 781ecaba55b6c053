//! Schema declaration: the single description of a config struct's shape.
//!
//! A config struct implements [`Schema`] by listing its fields in declaration
//! order. Leaves carry their kind (derived from the Rust type via
//! [`LeafType`]) plus the annotations that drive flags, env vars and defaults:
//!
//! ```ignore
//! impl Schema for ServerConfig {
//!     fn fields() -> Vec<Field> {
//!         vec![
//!             Field::leaf::<String>("host").desc("Bind address").default("localhost"),
//!             Field::leaf::<i64>("port").desc("Listen port").default("8080"),
//!             Field::nested::<TlsConfig>("tls"),
//!         ]
//!     }
//! }
//! ```
//!
//! Field names are lowercased during extraction, so they must match the serde
//! names of the struct's fields once lowercased.

use std::fmt;

use serde::de::DeserializeOwned;

/// A config struct whose fields can be bound to flags, env vars and files.
pub trait Schema: DeserializeOwned {
    /// The struct's fields, in declaration order.
    fn fields() -> Vec<Field>;
}

/// The value kind of a leaf field.
///
/// Only `String`, `Bool`, `Int` and `Float32` can be registered as flags.
/// The other kinds may still be declared (and used as hidden leaves fed from
/// env or file), but flag registration rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Bool,
    Int,
    Float32,
    Uint,
    Float64,
    List,
}

impl Kind {
    /// Whether a flag can be registered for this kind.
    pub fn is_supported(self) -> bool {
        matches!(self, Kind::String | Kind::Bool | Kind::Int | Kind::Float32)
    }

    pub(crate) fn value_name(self) -> &'static str {
        match self {
            Kind::String => "STRING",
            Kind::Bool => "BOOL",
            Kind::Int | Kind::Uint => "INT",
            Kind::Float32 | Kind::Float64 => "FLOAT",
            Kind::List => "LIST",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::String => "string",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float32 => "float32",
            Kind::Uint => "uint",
            Kind::Float64 => "float64",
            Kind::List => "list",
        };
        f.write_str(name)
    }
}

/// Inclusive bounds of an integer leaf type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub min: i128,
    pub max: i128,
}

impl IntRange {
    /// The full `i64` range, used for int leaves declared without a Rust type.
    pub const I64: IntRange = IntRange {
        min: i64::MIN as i128,
        max: i64::MAX as i128,
    };

    /// Non-negative values that fit a TOML integer.
    pub const U63: IntRange = IntRange {
        min: 0,
        max: i64::MAX as i128,
    };

    pub(crate) fn check(self, n: i128) -> Result<(), String> {
        if n > self.max {
            Err("number too large to fit in target type".to_string())
        } else if n < self.min {
            Err("number too small to fit in target type".to_string())
        } else {
            Ok(())
        }
    }
}

/// Maps a Rust field type to its [`Kind`].
pub trait LeafType {
    const KIND: Kind;
    /// Bounds of integer types. `None` for everything else.
    const RANGE: Option<IntRange> = None;
}

macro_rules! leaf_kind {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(impl LeafType for $ty {
            const KIND: Kind = $kind;
        })+
    };
}

macro_rules! int_leaf_kind {
    ($kind:expr => $($ty:ty),+ $(,)?) => {
        $(impl LeafType for $ty {
            const KIND: Kind = $kind;
            const RANGE: Option<IntRange> = Some(IntRange {
                min: <$ty>::MIN as i128,
                max: <$ty>::MAX as i128,
            });
        })+
    };
}

leaf_kind!(Kind::String => String);
leaf_kind!(Kind::Bool => bool);
int_leaf_kind!(Kind::Int => i8, i16, i32, i64, isize);
leaf_kind!(Kind::Float32 => f32);
int_leaf_kind!(Kind::Uint => u8, u16, u32, u64, usize);
leaf_kind!(Kind::Float64 => f64);

impl<T> LeafType for Vec<T> {
    const KIND: Kind = Kind::List;
}

/// Whether a field is a leaf or a nested section.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Leaf(Kind),
    Nested(Vec<Field>),
}

/// One declared field of a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) shape: Shape,
    pub(crate) range: Option<IntRange>,
    pub(crate) desc: String,
    pub(crate) default: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) required: bool,
}

impl Field {
    /// A leaf field whose kind follows from `T`.
    pub fn leaf<T: LeafType>(name: &str) -> Self {
        let mut field = Self::with_kind(name, T::KIND);
        field.range = T::RANGE;
        field
    }

    /// A leaf field with an explicit kind. Int and uint leaves declared this
    /// way accept anything that fits a TOML integer.
    pub fn with_kind(name: &str, kind: Kind) -> Self {
        Self::new(name, Shape::Leaf(kind))
    }

    /// A nested section whose fields come from `S`.
    pub fn nested<S: Schema>(name: &str) -> Self {
        Self::section(name, S::fields())
    }

    /// A nested section with an inline field list.
    pub fn section(name: &str, fields: Vec<Field>) -> Self {
        Self::new(name, Shape::Nested(fields))
    }

    fn new(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            shape,
            range: None,
            desc: String::new(),
            default: None,
            hidden: false,
            required: false,
        }
    }

    /// Help text for the flag, and the comment in generated templates.
    pub fn desc(mut self, desc: &str) -> Self {
        self.desc = desc.to_string();
        self
    }

    /// Default value, written as a string and parsed by kind at extraction.
    pub fn default(mut self, value: &str) -> Self {
        self.default = Some(value.to_string());
        self
    }

    /// Don't register a flag; env and file still apply.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// The flag must be passed on the command line.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}
