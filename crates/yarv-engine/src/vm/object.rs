//! Object model adapter
//!
//! Instructions never implement class semantics themselves. Everything they
//! need from the object system (constant lookup, hash construction, and the
//! constant serial used to validate inline caches) goes through the
//! [`ObjectModel`] trait.
//!
//! [`HostObjectModel`] is the implementation shipped with the engine: a
//! class registry with per-class constant tables, bootstrapped with the core
//! classes so top-level lookups like `Integer` or `Object` resolve.

use crate::vm::value::Value;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors reported by the object model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectModelError {
    /// No constant with this (qualified) name is reachable from the scope
    #[error("uninitialized constant {0}")]
    ConstantNotFound(String),

    /// The scope operand is neither a class nor a module
    #[error("{0} is not a class/module")]
    NotAClassOrModule(String),
}

/// Capability interface the instructions call into
pub trait ObjectModel: Send + Sync {
    /// Resolve `name` in `scope`.
    ///
    /// A `nil` scope means top level. A class scope searches the class, its
    /// ancestors, and finally the top level.
    fn resolve_constant(&self, scope: &Value, name: &str) -> Result<Value, ObjectModelError>;

    /// Build a hash from ordered pairs; a repeated key keeps its last value
    fn build_hash(&self, pairs: Vec<(Value, Value)>) -> Value {
        Value::hash_from_pairs(pairs)
    }

    /// Counter bumped on every constant definition
    fn constant_serial(&self) -> u64 {
        0
    }
}

/// Unique identifier of a class or module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    /// Get the raw ID value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Whether a [`ClassRef`] names a class or a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Instantiable class with an optional superclass
    Class,
    /// Module (no superclass)
    Module,
}

struct ClassInfo {
    id: ClassId,
    name: Arc<str>,
    kind: ClassKind,
    superclass: Option<ClassRef>,
}

/// Shared handle to a class or module
///
/// Two handles are equal when they refer to the same class.
#[derive(Clone)]
pub struct ClassRef(Arc<ClassInfo>);

impl ClassRef {
    /// Class identifier
    pub fn id(&self) -> ClassId {
        self.0.id
    }

    /// Fully qualified name (`Outer::Inner`)
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Class or module
    pub fn kind(&self) -> ClassKind {
        self.0.kind
    }

    /// Check if this is a module
    pub fn is_module(&self) -> bool {
        self.0.kind == ClassKind::Module
    }

    /// Direct superclass, if any
    pub fn superclass(&self) -> Option<&ClassRef> {
        self.0.superclass.as_ref()
    }

    /// Iterate over this class and its superclass chain
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }
}

impl PartialEq for ClassRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ClassRef {}

impl Hash for ClassRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRef")
            .field("id", &self.0.id.0)
            .field("name", &self.0.name)
            .field("kind", &self.0.kind)
            .finish()
    }
}

/// Iterator over a class and its superclasses
pub struct Ancestors<'a> {
    next: Option<&'a ClassRef>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ClassRef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.superclass();
        Some(current)
    }
}

#[derive(Default)]
struct ClassRegistry {
    classes: Vec<ClassRef>,
    constants: FxHashMap<ClassId, FxHashMap<Arc<str>, Value>>,
}

impl ClassRegistry {
    fn allocate(
        &mut self,
        name: Arc<str>,
        kind: ClassKind,
        superclass: Option<ClassRef>,
    ) -> ClassRef {
        let id = ClassId(self.classes.len() as u32);
        let class = ClassRef(Arc::new(ClassInfo {
            id,
            name,
            kind,
            superclass,
        }));
        self.classes.push(class.clone());
        class
    }

    fn constant(&self, owner: ClassId, name: &str) -> Option<&Value> {
        self.constants.get(&owner).and_then(|table| table.get(name))
    }

    fn set_constant(&mut self, owner: ClassId, name: Arc<str>, value: Value) {
        self.constants.entry(owner).or_default().insert(name, value);
    }
}

/// Concrete object model with a class registry and constant tables
pub struct HostObjectModel {
    registry: RwLock<ClassRegistry>,
    serial: AtomicU64,
    object_class: ClassRef,
}

impl HostObjectModel {
    /// Create an object model with the core class hierarchy defined
    pub fn new() -> Self {
        let mut registry = ClassRegistry::default();

        let basic_object = registry.allocate("BasicObject".into(), ClassKind::Class, None);
        let object = registry.allocate(
            "Object".into(),
            ClassKind::Class,
            Some(basic_object.clone()),
        );
        let object_id = object.id();
        registry.set_constant(object_id, "BasicObject".into(), Value::Class(basic_object));
        registry.set_constant(object_id, "Object".into(), Value::Class(object.clone()));

        let module = Self::bootstrap_class(&mut registry, &object, "Module", &object);
        Self::bootstrap_class(&mut registry, &object, "Class", &module);
        Self::bootstrap_module(&mut registry, &object, "Kernel");
        Self::bootstrap_module(&mut registry, &object, "Comparable");
        let numeric = Self::bootstrap_class(&mut registry, &object, "Numeric", &object);
        Self::bootstrap_class(&mut registry, &object, "Integer", &numeric);
        Self::bootstrap_class(&mut registry, &object, "Float", &numeric);
        for name in ["String", "Symbol", "Hash", "NilClass", "TrueClass", "FalseClass"] {
            Self::bootstrap_class(&mut registry, &object, name, &object);
        }

        Self {
            registry: RwLock::new(registry),
            serial: AtomicU64::new(0),
            object_class: object,
        }
    }

    fn bootstrap_class(
        registry: &mut ClassRegistry,
        object: &ClassRef,
        name: &str,
        superclass: &ClassRef,
    ) -> ClassRef {
        let class = registry.allocate(name.into(), ClassKind::Class, Some(superclass.clone()));
        registry.set_constant(object.id(), name.into(), Value::Class(class.clone()));
        class
    }

    fn bootstrap_module(registry: &mut ClassRegistry, object: &ClassRef, name: &str) -> ClassRef {
        let module = registry.allocate(name.into(), ClassKind::Module, None);
        registry.set_constant(object.id(), name.into(), Value::Class(module.clone()));
        module
    }

    /// The `Object` class (owner of top-level constants)
    pub fn object_class(&self) -> &ClassRef {
        &self.object_class
    }

    /// Define a class and bind it as a constant.
    ///
    /// `namespace` defaults to `Object`, `superclass` defaults to `Object`.
    pub fn define_class(
        &self,
        name: &str,
        superclass: Option<&ClassRef>,
        namespace: Option<&ClassRef>,
    ) -> ClassRef {
        let superclass = superclass.unwrap_or(&self.object_class).clone();
        self.define(name, ClassKind::Class, Some(superclass), namespace)
    }

    /// Define a module and bind it as a constant under `namespace` (or `Object`)
    pub fn define_module(&self, name: &str, namespace: Option<&ClassRef>) -> ClassRef {
        self.define(name, ClassKind::Module, None, namespace)
    }

    fn define(
        &self,
        name: &str,
        kind: ClassKind,
        superclass: Option<ClassRef>,
        namespace: Option<&ClassRef>,
    ) -> ClassRef {
        let owner = namespace.unwrap_or(&self.object_class);
        let qualified: Arc<str> = if owner == &self.object_class {
            name.into()
        } else {
            format!("{}::{}", owner.name(), name).into()
        };

        let class = {
            let mut registry = self.registry.write();
            let class = registry.allocate(qualified, kind, superclass);
            registry.set_constant(owner.id(), name.into(), Value::Class(class.clone()));
            class
        };
        let serial = self.bump_serial();
        debug!(class = class.name(), ?kind, serial, "class defined");
        class
    }

    /// Bind `name` to `value` in `owner`'s constant table
    pub fn define_constant(&self, owner: &ClassRef, name: &str, value: Value) {
        self.registry
            .write()
            .set_constant(owner.id(), name.into(), value);
        let serial = self.bump_serial();
        debug!(owner = owner.name(), name, serial, "constant defined");
    }

    /// Bind a top-level constant
    pub fn define_global_constant(&self, name: &str, value: Value) {
        let object = self.object_class.clone();
        self.define_constant(&object, name, value);
    }

    /// Look up a constant defined directly on `owner`, ignoring ancestors
    pub fn own_constant(&self, owner: &ClassRef, name: &str) -> Option<Value> {
        self.registry.read().constant(owner.id(), name).cloned()
    }

    /// Number of registered classes and modules
    pub fn class_count(&self) -> usize {
        self.registry.read().classes.len()
    }

    fn bump_serial(&self) -> u64 {
        self.serial.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl Default for HostObjectModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostObjectModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObjectModel")
            .field("classes", &self.class_count())
            .field("serial", &self.constant_serial())
            .finish()
    }
}

impl ObjectModel for HostObjectModel {
    fn resolve_constant(&self, scope: &Value, name: &str) -> Result<Value, ObjectModelError> {
        let registry = self.registry.read();
        let object_id = self.object_class.id();

        match scope {
            Value::Nil => registry
                .constant(object_id, name)
                .cloned()
                .ok_or_else(|| ObjectModelError::ConstantNotFound(name.to_string())),
            Value::Class(class) => {
                if let Some(value) = class
                    .ancestors()
                    .find_map(|ancestor| registry.constant(ancestor.id(), name))
                {
                    return Ok(value.clone());
                }
                // Modules have no superclass chain but still see top level.
                if let Some(value) = registry.constant(object_id, name) {
                    return Ok(value.clone());
                }
                let qualified = if class == &self.object_class {
                    name.to_string()
                } else {
                    format!("{}::{}", class.name(), name)
                };
                Err(ObjectModelError::ConstantNotFound(qualified))
            }
            other => Err(ObjectModelError::NotAClassOrModule(other.inspect())),
        }
    }

    fn constant_serial(&self) -> u64 {
        self.serial.load(Ordering::Acquire)
    }
}
