//! Value model for generated Nix expressions
//!
//! A closed set of value kinds the writer knows how to render. Values are plain
//! data; nothing above the writer mutates their shape.

use crate::document::Asset;
use crate::nix::quote::quote_string;
use indexmap::IndexMap;

/// Ordered attribute set. Keys may be dotted attribute paths.
pub type AttrSet = IndexMap<String, Value>;

/// A renderable Nix value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Null,
    Int(i64),
    Float(f64),
    /// Raw Nix expression emitted verbatim (`pkgs.vim`, `./hardware.nix`).
    Literal(String),
    /// String; rendered single-line or as an indented block depending on content.
    String(String),
    /// Text that is always rendered as an indented block, one entry per line.
    Lines(Vec<String>),
    Attrs(AttrSet),
    List(Vec<Value>),
    /// Elements rendered back to back without separators.
    Composition(Vec<Value>),
    /// Reference to a file copied next to the generated file.
    Asset(Asset),
}

impl Value {
    /// Raw expression.
    pub fn literal(text: impl Into<String>) -> Self {
        Value::Literal(text.into())
    }

    /// Empty attribute set.
    pub fn attrs() -> Self {
        Value::Attrs(AttrSet::new())
    }

    /// Build an attribute set from key/value pairs, keeping their order.
    pub fn attrs_from<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Attrs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Attribute set view, if this is one.
    pub fn as_attrs(&self) -> Option<&AttrSet> {
        match self {
            Value::Attrs(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Look up `key` if this is an attribute set.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_attrs().and_then(|attrs| attrs.get(key))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Literal(s) => Some(s),
            _ => None,
        }
    }

    /// Visit every asset referenced anywhere inside this value.
    pub fn visit_assets<'a>(&'a self, f: &mut dyn FnMut(&'a Asset)) {
        match self {
            Value::Asset(asset) => f(asset),
            Value::Attrs(attrs) => {
                for v in attrs.values() {
                    v.visit_assets(f);
                }
            }
            Value::List(items) | Value::Composition(items) => {
                for v in items {
                    v.visit_assets(f);
                }
            }
            Value::Bool(_)
            | Value::Null
            | Value::Int(_)
            | Value::Float(_)
            | Value::Literal(_)
            | Value::String(_)
            | Value::Lines(_) => {}
        }
    }

    /// Wrap every attribute key containing a dot in quotes so it is treated as a
    /// single attribute name instead of a path. Recurses into sets and lists.
    ///
    /// Used for free-form settings such as INI sections, where `wifi.powersave`
    /// is one key.
    pub fn quote_dotted_keys(self) -> Value {
        match self {
            Value::Attrs(attrs) => Value::Attrs(
                attrs
                    .into_iter()
                    .map(|(k, v)| {
                        let key = if k.contains('.') && !is_quoted(&k) {
                            quote_string(&k)
                        } else {
                            k
                        };
                        (key, v.quote_dotted_keys())
                    })
                    .collect(),
            ),
            Value::List(items) => {
                Value::List(items.into_iter().map(Value::quote_dotted_keys).collect())
            }
            other => other,
        }
    }
}

fn is_quoted(key: &str) -> bool {
    key.len() >= 2 && key.starts_with('"') && key.ends_with('"')
}

/// `with <scope>; <value>`
pub fn nix_with(scope: &str, value: impl Into<Value>) -> Value {
    Value::Composition(vec![
        Value::Literal(format!("with {}; ", scope)),
        value.into(),
    ])
}

/// `with pkgs; [ a b ... ]`
pub fn with_pkgs<I, S>(packages: I) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    nix_with(
        "pkgs",
        Value::List(
            packages
                .into_iter()
                .map(|p| Value::Literal(p.into()))
                .collect(),
        ),
    )
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Asset> for Value {
    fn from(v: Asset) -> Self {
        Value::Asset(v)
    }
}

impl From<AttrSet> for Value {
    fn from(v: AttrSet) -> Self {
        Value::Attrs(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
