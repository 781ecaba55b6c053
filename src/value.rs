//! Kind-directed conversion of raw values into `toml::Value`.
//!
//! Every layer ends up as a `toml::Table`, so flags, env vars, defaults and
//! file entries are all normalised here before merging. Float32 values are
//! parsed at `f32` precision and widened, so they narrow back losslessly when
//! the merged table is deserialized into an `f32` field.

use toml::Value;

use crate::schema::{IntRange, Kind};

/// Parse a boolean the way command-line tools usually accept them.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

const OUT_OF_RANGE: &str = "value out of range";

/// Parse a raw string (flag or env value) into a value of `kind`.
///
/// Integers are checked against `range`, or the widest range TOML can hold
/// for the kind when the leaf carries none.
pub(crate) fn parse_raw(kind: Kind, range: Option<IntRange>, raw: &str) -> Result<Value, String> {
    match kind {
        Kind::String => Ok(Value::String(raw.to_string())),
        Kind::Bool => parse_bool(raw)
            .map(Value::Boolean)
            .ok_or_else(|| format!("invalid boolean: {raw:?}")),
        Kind::Int | Kind::Uint => parse_int(kind, range, raw).map(Value::Integer),
        Kind::Float32 => parse_f32(raw).map(|f| Value::Float(f64::from(f))),
        Kind::Float64 => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| e.to_string()),
        Kind::List => Ok(heuristic(raw)),
    }
}

/// Parse an integer and check it against the leaf's range.
pub(crate) fn parse_int(kind: Kind, range: Option<IntRange>, raw: &str) -> Result<i64, String> {
    let n = raw.trim().parse::<i128>().map_err(|e| e.to_string())?;
    fit_int(kind, range, n)
}

fn fit_int(kind: Kind, range: Option<IntRange>, n: i128) -> Result<i64, String> {
    let range = range.unwrap_or(match kind {
        Kind::Uint => IntRange::U63,
        _ => IntRange::I64,
    });
    range.check(n)?;
    i64::try_from(n).map_err(|_| "number too large to fit in target type".to_string())
}

/// Parse an `f32`. Finite input that overflows `f32` is an error rather than
/// infinity; spelled-out infinities are accepted.
pub(crate) fn parse_f32(raw: &str) -> Result<f32, String> {
    let raw = raw.trim();
    let f = raw.parse::<f32>().map_err(|e| e.to_string())?;
    if f.is_infinite() && !is_infinity(raw) {
        return Err(OUT_OF_RANGE.to_string());
    }
    Ok(f)
}

fn is_infinity(s: &str) -> bool {
    let unsigned = s.trim_start_matches(['+', '-']).to_ascii_lowercase();
    unsigned == "inf" || unsigned == "infinity"
}

/// Coerce a value read from a config file into `kind`.
///
/// Scalars are converted loosely (a quoted `"3"` satisfies an int leaf, a
/// number satisfies a string leaf). Numbers are range-checked the same way
/// as flag values. Arrays and tables only pass through for list leaves.
pub(crate) fn coerce(kind: Kind, range: Option<IntRange>, value: Value) -> Result<Value, String> {
    match (kind, value) {
        (Kind::String, Value::String(s)) => Ok(Value::String(s)),
        (Kind::String, Value::Integer(i)) => Ok(Value::String(i.to_string())),
        (Kind::String, Value::Float(f)) => Ok(Value::String(f.to_string())),
        (Kind::String, Value::Boolean(b)) => Ok(Value::String(b.to_string())),
        (Kind::Bool, Value::Boolean(b)) => Ok(Value::Boolean(b)),
        (Kind::Int | Kind::Uint, Value::Integer(i)) => {
            fit_int(kind, range, i128::from(i)).map(Value::Integer)
        }
        (Kind::Float32, Value::Float(f)) => narrow(f).map(Value::Float),
        #[allow(clippy::cast_precision_loss)]
        (Kind::Float32, Value::Integer(i)) => narrow(i as f64).map(Value::Float),
        (Kind::Float64, Value::Float(f)) => Ok(Value::Float(f)),
        #[allow(clippy::cast_precision_loss)]
        (Kind::Float64, Value::Integer(i)) => Ok(Value::Float(i as f64)),
        (
            kind @ (Kind::Bool | Kind::Int | Kind::Uint | Kind::Float32 | Kind::Float64),
            Value::String(s),
        ) => parse_raw(kind, range, &s),
        (Kind::List, value) => Ok(value),
        (kind, other) => Err(format!("expected {kind}, found {}", other.type_str())),
    }
}

/// Best-effort typing for list items and untyped defaults.
/// Tries: bool → integer → float → string. Only strings with a digit are
/// read as floats, so `inf` and `nan` stay strings.
pub(crate) fn heuristic(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if s.bytes().any(|b| b.is_ascii_digit())
        && let Ok(f) = s.parse::<f64>()
    {
        return Value::Float(f);
    }
    Value::String(s.to_string())
}

/// Render a resolved value for listings and help text.
///
/// Floats that are exact `f32` values print in their short `f32` form.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => {
            let narrowed = *f as f32;
            if f64::from(narrowed) == *f {
                narrowed.to_string()
            } else {
                f.to_string()
            }
        }
        Value::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Round to `f32` precision, rejecting finite values `f32` can't hold.
#[allow(clippy::cast_possible_truncation)]
fn narrow(f: f64) -> Result<f64, String> {
    let narrowed = f as f32;
    if f.is_finite() && narrowed.is_infinite() {
        return Err(OUT_OF_RANGE.to_string());
    }
    Ok(f64::from(narrowed))
}
