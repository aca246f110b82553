//! Runtime value representation
//!
//! Values on the operand stack are a tagged enum. Scalars are stored inline;
//! strings, symbols and hashes share their payload through `Arc`, so cloning
//! a value never copies heap data.
//!
//! # Equality
//!
//! Equality is structural and follows `eql?` rather than `==`: `1` and `1.0`
//! are different values, floats compare by bit pattern (so `NaN` equals
//! itself and the relation stays reflexive), and classes compare by identity.
//! This is the relation hash literals use for their keys.

use crate::vm::inspect;
use crate::vm::object::ClassRef;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Entries of a hash value, in insertion order
pub type HashEntries = IndexMap<Value, Value, FxBuildHasher>;

/// A VM value
#[derive(Clone)]
pub enum Value {
    /// `nil`
    Nil,
    /// `true` / `false`
    Bool(bool),
    /// Fixed-width integer
    Integer(i64),
    /// Double-precision float
    Float(f64),
    /// Interned-style symbol (`:name`)
    Symbol(Arc<str>),
    /// Frozen string literal
    String(Arc<str>),
    /// Reference to a class or module owned by the object model
    Class(ClassRef),
    /// Insertion-ordered mapping
    Hash(Arc<HashEntries>),
}

impl Value {
    /// Create a nil value
    #[inline]
    pub const fn nil() -> Self {
        Value::Nil
    }

    /// Create a boolean value
    #[inline]
    pub const fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    /// Create an integer value
    #[inline]
    pub const fn integer(i: i64) -> Self {
        Value::Integer(i)
    }

    /// Create a float value
    #[inline]
    pub const fn float(f: f64) -> Self {
        Value::Float(f)
    }

    /// Create a symbol value
    pub fn symbol(name: impl Into<Arc<str>>) -> Self {
        Value::Symbol(name.into())
    }

    /// Create a string value
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Create a class reference value
    pub fn class(class: ClassRef) -> Self {
        Value::Class(class)
    }

    /// Build a hash from key/value pairs.
    ///
    /// A repeated key keeps the position of its first occurrence and the
    /// value of its last one.
    pub fn hash_from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut entries = HashEntries::default();
        for (key, value) in pairs {
            entries.insert(key, value);
        }
        Value::Hash(Arc::new(entries))
    }

    /// Check if this value is nil
    #[inline]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Ruby truthiness: everything except `nil` and `false`
    #[inline]
    pub const fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Extract boolean value
    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract integer value
    #[inline]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract float value
    #[inline]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Extract a class reference
    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Value::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Extract hash entries
    pub fn as_hash(&self) -> Option<&HashEntries> {
        match self {
            Value::Hash(entries) => Some(entries),
            _ => None,
        }
    }

    /// Name of the value's class, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "NilClass",
            Value::Bool(true) => "TrueClass",
            Value::Bool(false) => "FalseClass",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Symbol(_) => "Symbol",
            Value::String(_) => "String",
            Value::Class(class) if class.is_module() => "Module",
            Value::Class(_) => "Class",
            Value::Hash(_) => "Hash",
        }
    }

    /// Render the value the way `Kernel#inspect` does
    pub fn inspect(&self) -> String {
        let mut out = String::new();
        self.write_inspect(&mut out);
        out
    }

    fn write_inspect(&self, out: &mut String) {
        match self {
            Value::Nil => out.push_str("nil"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(i) => out.push_str(&i.to_string()),
            Value::Float(f) => out.push_str(&inspect::float(*f)),
            Value::Symbol(name) => out.push_str(&inspect::symbol(name)),
            Value::String(s) => out.push_str(&inspect::string(s)),
            Value::Class(class) => out.push_str(class.name()),
            Value::Hash(entries) => {
                out.push('{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    key.write_inspect(out);
                    out.push_str("=>");
                    value.write_inspect(out);
                }
                out.push('}');
            }
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Class(a), Value::Class(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Symbol(name) => name.hash(state),
            Value::String(s) => s.hash(state),
            Value::Class(class) => class.hash(state),
            // Equal hashes may differ in insertion order, so only the
            // length participates.
            Value::Hash(entries) => entries.len().hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<ClassRef> for Value {
    fn from(class: ClassRef) -> Self {
        Value::Class(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::nil().is_truthy());
        assert!(!Value::bool(false).is_truthy());
        assert!(Value::bool(true).is_truthy());
        assert!(Value::integer(0).is_truthy());
        assert!(Value::string("").is_truthy());
    }

    #[test]
    fn test_integer_and_float_are_distinct() {
        assert_ne!(Value::integer(1), Value::float(1.0));
        assert_eq!(Value::float(f64::NAN), Value::float(f64::NAN));
        assert_ne!(Value::float(0.0), Value::float(-0.0));
    }

    #[test]
    fn test_inspect_scalars() {
        assert_eq!(Value::nil().inspect(), "nil");
        assert_eq!(Value::bool(true).inspect(), "true");
        assert_eq!(Value::integer(-42).inspect(), "-42");
        assert_eq!(Value::float(1.5).inspect(), "1.5");
        assert_eq!(Value::symbol("foo").inspect(), ":foo");
        assert_eq!(Value::string("hi").inspect(), "\"hi\"");
    }

    #[test]
    fn test_hash_from_pairs_last_write_wins() {
        let hash = Value::hash_from_pairs([
            (Value::symbol("a"), Value::integer(1)),
            (Value::symbol("b"), Value::integer(2)),
            (Value::symbol("a"), Value::integer(3)),
        ]);
        let entries = hash.as_hash().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.get(&Value::symbol("a")), Some(&Value::integer(3)));
        assert_eq!(hash.inspect(), "{:a=>3, :b=>2}");
    }

    #[test]
    fn test_hash_equality_ignores_order() {
        let a = Value::hash_from_pairs([
            (Value::integer(1), Value::nil()),
            (Value::integer(2), Value::nil()),
        ]);
        let b = Value::hash_from_pairs([
            (Value::integer(2), Value::nil()),
            (Value::integer(1), Value::nil()),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_hash_inspect() {
        assert_eq!(Value::hash_from_pairs(Vec::new()).inspect(), "{}");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::nil().type_name(), "NilClass");
        assert_eq!(Value::bool(false).type_name(), "FalseClass");
        assert_eq!(Value::integer(3).type_name(), "Integer");
        assert_eq!(Value::hash_from_pairs(Vec::new()).type_name(), "Hash");
    }
}
