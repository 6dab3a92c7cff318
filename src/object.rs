//! The object/type representation (`spec.md` §3 "TekoObject"/"TekoType").
//!
//! Every user-visible entity — primitives, containers, functions, types,
//! the module itself — is one [`TekoObject`] living in the shared
//! [`crate::heap::Heap`]. A type is simply an object whose [`Payload`] is
//! [`Payload::Type`]; `spec.md` §9 Design Notes calls for tagged-variant
//! headers patched after construction rather than a separate `Type`/`Object`
//! split, which is what lets `type(type) == type` exist at all.

use crate::function::FunctionInfo;
use crate::heap::HeapId;
use crate::namespace::{Field, NamespaceId};
use crate::signature::StructTypeInfo;
use crate::util::OrderedMap;

#[derive(Debug, Clone)]
pub enum Payload {
    Int(i64),
    Real(f64),
    Bool(bool),
    Str(String),
    /// Cons-like list; `spec.md` §4.D "List (braces `{}`, cons-cell
    /// representation with `_head`, `_tail`)" — represented here as a flat
    /// `Vec` for simplicity, with `_head`/`_tail` synthesized on demand.
    List(Vec<HeapId>),
    Array(Vec<HeapId>),
    Set(Vec<HeapId>),
    Void,
    Type(TypeInfo),
    StructType(StructTypeInfo),
    StructInstance(Vec<HeapId>),
    Function(FunctionInfo),
    Module,
}

/// The fields-map and parent link that make an object a *type*, per
/// `spec.md` §3 invariant 3 (`fields(T)` merges own fields with
/// `fields(parent(T))`).
#[derive(Debug, Clone, Default)]
pub struct TypeInfo {
    /// `None` only for `obj` itself (the apex of the type DAG); every other
    /// type's `_parent` defaults to `obj` per `spec.md` §4.E step 2.
    pub parent: Option<HeapId>,
    pub own_fields: OrderedMap<String, Field>,
    /// The type's own `_tostr` implementation, if it declares one.
    /// `_tostr` is deliberately not modeled as an entry in `own_fields`: per
    /// `spec.md` §3 invariant 4 it is "lazily synthesized on first access
    /// when absent" rather than required to be pre-declared, so the
    /// evaluator (`crate::eval::tostr`) walks the type chain for this slot
    /// directly and falls back to a generic formatter if every ancestor
    /// leaves it `None`.
    pub tostr: Option<crate::function::NativeFn>,
}

#[derive(Debug, Clone)]
pub struct TekoObject {
    /// `None` only during the two-phase bootstrap window before
    /// `TypeType`/`ObjType`/`VoidType`'s `tekotype` placeholder is patched
    /// (`spec.md` §4.E step 1, §9 "Reflexive bootstrap").
    pub type_id: Option<HeapId>,
    pub namespace: Option<NamespaceId>,
    pub display_name: String,
    pub payload: Payload,
}

impl TekoObject {
    pub fn new(type_id: HeapId, namespace: NamespaceId, display_name: impl Into<String>, payload: Payload) -> Self {
        Self { type_id: Some(type_id), namespace: Some(namespace), display_name: display_name.into(), payload }
    }

    /// An object with no type yet, used only during the bootstrap window.
    pub fn placeholder(display_name: impl Into<String>, payload: Payload) -> Self {
        Self { type_id: None, namespace: None, display_name: display_name.into(), payload }
    }

    #[cfg(test)]
    pub fn void_placeholder() -> Self {
        Self::placeholder("void", Payload::Void)
    }

    pub fn as_type(&self) -> Option<&TypeInfo> {
        match &self.payload {
            Payload::Type(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_type_mut(&mut self) -> Option<&mut TypeInfo> {
        match &mut self.payload {
            Payload::Type(info) => Some(info),
            _ => None,
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(self.payload, Payload::Type(_))
    }
}
