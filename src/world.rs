//! The runtime model (component D, `spec.md` §4.D): subtype relation,
//! structural field merge, and attribute resolution over the shared object
//! heap and namespace arena. This is the one piece every other module
//! (bootstrap, evaluator) holds a `&mut World` into.

use crate::exception::{RunResult, TekoException};
use crate::heap::{Heap, HeapId};
use crate::io::PrintWriter;
use crate::namespace::{Field, Namespace, NamespaceId, Namespaces, Variable};
use crate::object::{Payload, TekoObject, TypeInfo};
use crate::tag::Visibility;
use crate::util::OrderedMap;

/// The handful of built-in types and singletons every evaluation needs to
/// reach without a namespace lookup. Populated once during bootstrap
/// (`spec.md` §4.E).
pub struct WellKnown {
    pub type_type: HeapId,
    pub obj_type: HeapId,
    pub void_type: HeapId,
    pub bool_type: HeapId,
    pub int_type: HeapId,
    pub real_type: HeapId,
    pub str_type: HeapId,
    pub iterable_type: HeapId,
    pub list_type: HeapId,
    pub array_type: HeapId,
    pub set_type: HeapId,
    /// A catch-all placeholder used as `Field::type_id` for native
    /// operators and other bootstrap-installed methods. A fully precise
    /// per-signature `FunctionType` per native op is not worth the
    /// bootstrap machinery it would cost; see `DESIGN.md`.
    pub function_type: HeapId,
    /// The `struct` meta-type bound to the stdlib name `struct`
    /// (`spec.md` §6). Every `NewStructNode` literal allocates its own
    /// `Payload::StructType` object typed as `type_type` rather than as this
    /// marker — see `DESIGN.md` for why `struct` the name denotes the
    /// concept, not every struct type's own `type_id`.
    pub struct_type: HeapId,
    /// The type of the root module namespace object, bound to the stdlib
    /// name `module` (`spec.md` §6). Not otherwise load-bearing: this CORE
    /// never constructs a second module object.
    pub module_type: HeapId,
    pub void_value: HeapId,
}

pub struct World {
    pub objects: Heap<TekoObject>,
    pub namespaces: Namespaces,
    pub root: NamespaceId,
    pub wk: WellKnown,
    /// Sink for the `print` builtin (`spec.md` §4.E step 8). Defaults to
    /// [`crate::io::StdPrint`]; swap it via [`World::set_output`] to capture
    /// output instead of writing to the real stdout.
    pub output: Box<dyn PrintWriter>,
}

impl World {
    pub fn set_output(&mut self, output: Box<dyn PrintWriter>) {
        self.output = output;
    }
}

impl World {
    pub fn type_of(&self, id: HeapId) -> HeapId {
        self.objects.get(id).type_id.expect("object fully constructed past bootstrap")
    }

    /// `Payload::StructType` objects are types (every `NewStructNode`
    /// allocates one typed as `type`) but carry no `TypeInfo`/`_parent` of
    /// their own; they sit directly under `obj` in the DAG.
    pub fn parent_of(&self, type_id: HeapId) -> Option<HeapId> {
        match &self.objects.get(type_id).payload {
            Payload::Type(info) => info.parent,
            Payload::StructType(_) => Some(self.wk.obj_type),
            _ => None,
        }
    }

    pub fn display_name(&self, id: HeapId) -> &str {
        &self.objects.get(id).display_name
    }

    /// `isSubtype(S,T)` per `spec.md` §4.D: true iff `T == obj`, `S == T`, or
    /// `isSubtype(parent(S), T)`.
    ///
    /// Two additional cases fall out of container/struct types never being
    /// interned (`spec.md` §4.F: two `int{}` literals yield distinct-but-
    /// equivalent type objects, and so do two identical `(int x) ...`
    /// struct-literal types): same-base containers with the same `_etype`,
    /// and struct types whose element lists compare structurally equal
    /// (`StructTypeInfo`'s own `PartialEq`), are treated as mutual subtypes
    /// without walking a shared ancestor.
    pub fn is_subtype(&self, s: HeapId, t: HeapId) -> bool {
        if t == self.wk.obj_type || s == t {
            return true;
        }
        if let (Some(se), Some(te)) = (self.etype_of(s), self.etype_of(t)) {
            if self.parent_of(s) == self.parent_of(t) && se == te {
                return true;
            }
        }
        if let (Payload::StructType(a), Payload::StructType(b)) = (&self.objects.get(s).payload, &self.objects.get(t).payload) {
            if a == b {
                return true;
            }
        }
        match self.parent_of(s) {
            Some(parent) if parent != s => self.is_subtype(parent, t),
            _ => false,
        }
    }

    pub fn is_instance(&self, value: HeapId, t: HeapId) -> bool {
        self.is_subtype(self.type_of(value), t)
    }

    /// `fields(T)`: own fields merged with the parent's, erroring (rather
    /// than panicking) on a name collision across the merge — `spec.md` §3
    /// invariant 3 calls this an assertion, but a malformed user `class`
    /// should not be able to crash the process. See `DESIGN.md`.
    pub fn fields(&self, type_id: HeapId) -> RunResult<OrderedMap<String, Field>> {
        // `spec.md` §4.D "Struct types": a `NewStruct`'s fields are exactly
        // its ordered elements, positionally backing `Payload::StructInstance`
        // rather than a declared `own_fields` map — there is no parent to
        // merge with (every struct type sits directly under `obj`).
        if let Payload::StructType(struct_info) = &self.objects.get(type_id).payload {
            let mut merged = OrderedMap::default();
            for elem in &struct_info.elems {
                merged.insert(elem.label.clone(), Field { type_id: elem.type_id, visibility: Visibility::Public, mutable: true });
            }
            return Ok(merged);
        }
        let info = self
            .objects
            .get(type_id)
            .as_type()
            .ok_or_else(|| TekoException::static_error(0, format!("'{}' is not a type", self.display_name(type_id))))?;
        let mut merged = match info.parent {
            Some(parent) if parent != type_id => self.fields(parent)?,
            _ => OrderedMap::default(),
        };
        for (label, field) in &info.own_fields {
            if merged.contains_key(label) {
                return Err(TekoException::static_error(
                    0,
                    format!("field '{label}' declared on both '{}' and one of its ancestors", self.display_name(type_id)),
                ));
            }
            merged.insert(label.clone(), field.clone());
        }
        Ok(merged)
    }

    /// Resolves an attribute's *value* for `AttrExpression`/operator
    /// dispatch. `spec.md` §4.F requires `label` to be in
    /// `fields(type(receiver))` first; the value itself lives either on the
    /// receiver's own namespace (struct/instance fields) or, for
    /// natively-shared members like operators and `_tostr`, on the owning
    /// type's own namespace (so every instance doesn't need its own copy).
    pub fn resolve_attr(&self, line: u32, receiver: HeapId, label: &str) -> RunResult<HeapId> {
        let type_id = self.type_of(receiver);
        if !self.fields(type_id)?.contains_key(label) {
            return Err(TekoException::static_error(
                line,
                format!("'{label}' is not a field of type '{}'", self.display_name(type_id)),
            ));
        }
        if let Payload::StructInstance(values) = &self.objects.get(receiver).payload {
            if let Payload::StructType(struct_info) = &self.objects.get(type_id).payload {
                if let Some(idx) = struct_info.elems.iter().position(|e| e.label == label) {
                    return Ok(values[idx]);
                }
            }
        }
        if let Some(ns_id) = self.objects.get(receiver).namespace {
            if let Some(var) = self.namespaces.get(ns_id).locals.get(label) {
                if let Some(value) = var.value() {
                    return Ok(value);
                }
            }
        }
        let mut cursor = Some(type_id);
        while let Some(t) = cursor {
            if let Some(ns_id) = self.objects.get(t).namespace {
                if let Some(var) = self.namespaces.get(ns_id).locals.get(label) {
                    if let Some(value) = var.value() {
                        return Ok(value);
                    }
                }
            }
            cursor = self.parent_of(t);
        }
        Err(TekoException::runtime(line, format!("'{label}' is declared but uninitialized")))
    }

    /// Installs a member on a type: both its declared [`Field`] (so
    /// `fields(T)` and `resolve_attr`'s validity check see it) and its
    /// shared value, bound into the type's own namespace. Used for both
    /// data fields with a default instance value and native
    /// operators/`_tostr` (`spec.md` §4.E steps 2, 5, 7).
    pub fn install_member(&mut self, type_id: HeapId, label: &str, field: Field, value: HeapId) {
        let ns_id = self.objects.get(type_id).namespace.expect("types own a namespace after bootstrap");
        self.objects.get_mut(type_id).as_type_mut().expect("install_member target is a type").own_fields.insert(label.to_owned(), field.clone());
        self.namespaces.get_mut(ns_id).locals.insert(label.to_owned(), Variable::Bound { field, value: Some(value) });
    }

    /// Allocates a fresh type object with an empty namespace and fields map,
    /// `_parent` defaulted per `spec.md` §4.E step 2 (every non-`obj` type's
    /// parent defaults to `obj` unless overridden).
    pub fn alloc_type(&mut self, meta_type: HeapId, name: &str, parent: Option<HeapId>) -> HeapId {
        let id = self.objects.alloc(TekoObject::placeholder(name, Payload::Type(TypeInfo { parent, own_fields: OrderedMap::default(), tostr: None })));
        let ns = self.namespaces.alloc(Namespace::new(id));
        let obj = self.objects.get_mut(id);
        obj.type_id = Some(meta_type);
        obj.namespace = Some(ns);
        id
    }

    pub fn alloc_int(&mut self, v: i64) -> HeapId {
        self.objects.alloc(TekoObject::new(self.wk.int_type, self.root, v.to_string(), Payload::Int(v)))
    }

    pub fn alloc_real(&mut self, v: f64) -> HeapId {
        self.objects.alloc(TekoObject::new(self.wk.real_type, self.root, v.to_string(), Payload::Real(v)))
    }

    pub fn alloc_bool(&mut self, v: bool) -> HeapId {
        self.objects.alloc(TekoObject::new(self.wk.bool_type, self.root, v.to_string(), Payload::Bool(v)))
    }

    pub fn alloc_str(&mut self, v: String) -> HeapId {
        self.objects.alloc(TekoObject::new(self.wk.str_type, self.root, v.clone(), Payload::Str(v)))
    }

    pub fn alloc_list(&mut self, elems: Vec<HeapId>) -> HeapId {
        self.objects.alloc(TekoObject::new(self.wk.list_type, self.root, "list", Payload::List(elems)))
    }

    pub fn alloc_array(&mut self, elems: Vec<HeapId>) -> HeapId {
        self.objects.alloc(TekoObject::new(self.wk.array_type, self.root, "array", Payload::Array(elems)))
    }

    pub fn alloc_set(&mut self, elems: Vec<HeapId>) -> HeapId {
        self.objects.alloc(TekoObject::new(self.wk.set_type, self.root, "set", Payload::Set(elems)))
    }

    pub fn void_value(&self) -> HeapId {
        self.wk.void_value
    }

    /// Creates a fresh anonymous subtype of `base_type` carrying an `_etype`
    /// marker — the container parameterization `spec.md` §4.D calls for
    /// ("All expose an element-type `_etype` on their type") and §4.F's
    /// `{}`/`[]`/`<>` Conversion construct. Not memoized: `int{}` evaluated
    /// twice yields two distinct (structurally equivalent) type objects,
    /// matching the source's own behavior rather than inventing interning
    /// the spec never asks for.
    pub fn parameterize_container(&mut self, base_type: HeapId, etype: HeapId) -> HeapId {
        let name = self.display_name(base_type).to_owned();
        let specialized = self.alloc_type(self.wk.type_type, &name, Some(base_type));
        let ns_id = self.objects.get(specialized).namespace.expect("alloc_type always installs a namespace");
        let field = Field { type_id: self.wk.type_type, visibility: Visibility::Public, mutable: false };
        self.namespaces.get_mut(ns_id).locals.insert("_etype".to_owned(), Variable::Bound { field, value: Some(etype) });
        specialized
    }

    /// Reads the `_etype` marker installed by [`World::parameterize_container`],
    /// directly off the type object's own namespace (not through
    /// `fields()`/`resolve_attr`: `_etype` describes the *type itself*, not
    /// a field every instance of it must carry).
    pub fn etype_of(&self, type_id: HeapId) -> Option<HeapId> {
        let ns_id = self.objects.get(type_id).namespace?;
        self.namespaces.get(ns_id).locals.get("_etype").and_then(|v| v.value())
    }
}
