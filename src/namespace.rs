//! Namespaces and variables (`spec.md` §3 "Runtime entities", §4.D, §9
//! Design Notes "Namespace chains with multiple outers" and "Variable with
//! optional Field").
//!
//! A namespace is an ordered label→[`Variable`] map plus a list of *outer*
//! namespaces consulted left-to-right on an unqualified lookup — not a
//! single parent scope, per `spec.md`'s own callout that the source models
//! `outers` as a list. Namespaces live in their own arena (distinct from
//! [`crate::heap::Heap<TekoObject>`]) since a namespace is not itself a
//! user-visible value; a `TekoObject` merely embeds the `NamespaceId` of its
//! own namespace.

use crate::exception::{RunResult, TekoException};
use crate::heap::HeapId;
use crate::tag::Visibility;
use crate::util::OrderedMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NamespaceId(u32);

/// A declared slot of a type: its declared type, visibility, and mutability.
/// `spec.md` §3 "Field".
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub type_id: HeapId,
    pub visibility: Visibility,
    pub mutable: bool,
}

/// `spec.md` §9 Design Notes: two tagged variants, `Bound{field, value?}` and
/// `Ephemeral{value}`. Only `Bound` is a valid assignment target — it is
/// what `var_recursive`/`declare` produce; `Ephemeral` is what a freshly
/// constructed literal or intermediate expression result carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    Bound { field: Field, value: Option<HeapId> },
    Ephemeral { value: HeapId },
}

impl Variable {
    pub fn value(&self) -> Option<HeapId> {
        match self {
            Variable::Bound { value, .. } => *value,
            Variable::Ephemeral { value } => Some(*value),
        }
    }

    pub fn type_id(&self) -> Option<HeapId> {
        match self {
            Variable::Bound { field, .. } => Some(field.type_id),
            Variable::Ephemeral { .. } => None,
        }
    }

    /// Reads the value, treating a `Bound` variable with no value yet as a
    /// runtime error per `spec.md` §9: "Implementations should treat
    /// read-before-write as a runtime error."
    pub fn require_value(&self, line: u32) -> RunResult<HeapId> {
        self.value().ok_or_else(|| TekoException::runtime(line, "read of an uninitialized variable"))
    }
}

pub struct Namespace {
    pub owner: HeapId,
    pub locals: OrderedMap<String, Variable>,
    pub outers: Vec<NamespaceId>,
}

impl Namespace {
    pub fn new(owner: HeapId) -> Self {
        Self { owner, locals: OrderedMap::default(), outers: Vec::new() }
    }
}

pub struct Namespaces {
    arena: Vec<Namespace>,
}

impl Namespaces {
    pub fn new() -> Self {
        Self { arena: Vec::new() }
    }

    pub fn alloc(&mut self, ns: Namespace) -> NamespaceId {
        let id = NamespaceId(self.arena.len() as u32);
        self.arena.push(ns);
        id
    }

    pub fn get(&self, id: NamespaceId) -> &Namespace {
        &self.arena[id.0 as usize]
    }

    pub fn get_mut(&mut self, id: NamespaceId) -> &mut Namespace {
        &mut self.arena[id.0 as usize]
    }

    /// `is_free_attr`: label unbound in this namespace's own locals.
    pub fn is_free_local(&self, id: NamespaceId, label: &str) -> bool {
        !self.get(id).locals.contains_key(label)
    }

    /// `is_free_recursive`: label unbound here and in every outer.
    pub fn is_free_recursive(&self, id: NamespaceId, label: &str) -> bool {
        if !self.is_free_local(id, label) {
            return false;
        }
        self.get(id).outers.iter().all(|outer| self.is_free_recursive(*outer, label))
    }

    /// Finds which namespace in the chain (this one, or an outer) actually
    /// owns `label`'s binding, for assignment targeting: `set`/`declare`
    /// only ever mutate the namespace that declared the name, never a
    /// shadow copy.
    pub fn find_owner(&self, id: NamespaceId, label: &str) -> Option<NamespaceId> {
        if self.get(id).locals.contains_key(label) {
            return Some(id);
        }
        for outer in &self.get(id).outers {
            if let Some(owner) = self.find_owner(*outer, label) {
                return Some(owner);
            }
        }
        None
    }

    /// Walks outers left-to-right (depth-first) and returns the first match.
    /// `spec.md` §4.D "var_recursive".
    pub fn lookup(&self, id: NamespaceId, label: &str) -> Option<&Variable> {
        if let Some(var) = self.get(id).locals.get(label) {
            return Some(var);
        }
        for outer in &self.get(id).outers {
            if let Some(var) = self.lookup(*outer, label) {
                return Some(var);
            }
        }
        None
    }

    /// `declare(label, field, value?)`: the label must be free not only
    /// locally but in the whole outer chain (`spec.md` §3 invariant 6: "Names
    /// declared in a namespace cannot shadow names reachable in an outer
    /// namespace").
    pub fn declare(&mut self, id: NamespaceId, line: u32, label: &str, field: Field, value: Option<HeapId>) -> RunResult<()> {
        if !self.is_free_recursive(id, label) {
            return Err(TekoException::static_error(line, format!("'{label}' shadows a name already visible in an outer scope")));
        }
        self.get_mut(id).locals.insert(label.to_owned(), Variable::Bound { field, value });
        Ok(())
    }

    /// Sets an existing bound variable's value, enforcing `spec.md` §3
    /// invariant 5: a non-mutable field may transition unset→set exactly
    /// once; a mutable field may be reset freely after that.
    pub fn set(&mut self, id: NamespaceId, line: u32, label: &str, value: HeapId) -> RunResult<()> {
        let ns = self.get_mut(id);
        match ns.locals.get_mut(label) {
            Some(Variable::Bound { field, value: slot }) => {
                if slot.is_some() && !field.mutable {
                    return Err(TekoException::static_error(line, format!("'{label}' is not mutable and has already been set")));
                }
                *slot = Some(value);
                Ok(())
            }
            Some(Variable::Ephemeral { .. }) => {
                Err(TekoException::static_error(line, format!("'{label}' is not an assignment target")))
            }
            None => Err(TekoException::static_error(line, format!("undeclared name '{label}'"))),
        }
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Heap;
    use crate::object::TekoObject;

    fn dummy_owner(heap: &mut Heap<TekoObject>) -> HeapId {
        heap.alloc(TekoObject::void_placeholder())
    }

    #[test]
    fn declare_then_lookup_through_outer_chain() {
        let mut heap = Heap::new();
        let mut namespaces = Namespaces::new();
        let owner = dummy_owner(&mut heap);
        let outer = namespaces.alloc(Namespace::new(owner));
        let inner_owner = dummy_owner(&mut heap);
        let mut inner = Namespace::new(inner_owner);
        inner.outers.push(outer);
        let inner_id = namespaces.alloc(inner);

        let dummy_type = dummy_owner(&mut heap);
        let field = Field { type_id: dummy_type, visibility: Visibility::Public, mutable: true };
        let v = heap.alloc(TekoObject::void_placeholder());
        namespaces.declare(outer, 1, "x", field, Some(v)).unwrap();

        assert!(namespaces.lookup(inner_id, "x").is_some());
        assert!(namespaces.lookup(inner_id, "nope").is_none());
    }

    #[test]
    fn declare_rejects_shadowing_outer_name() {
        let mut heap = Heap::new();
        let mut namespaces = Namespaces::new();
        let owner = dummy_owner(&mut heap);
        let outer = namespaces.alloc(Namespace::new(owner));
        let inner_owner = dummy_owner(&mut heap);
        let mut inner = Namespace::new(inner_owner);
        inner.outers.push(outer);
        let inner_id = namespaces.alloc(inner);

        let dummy_type = dummy_owner(&mut heap);
        let field = Field { type_id: dummy_type, visibility: Visibility::Public, mutable: true };
        namespaces.declare(outer, 1, "x", field.clone(), None).unwrap();
        assert!(namespaces.declare(inner_id, 1, "x", field, None).is_err());
    }

    #[test]
    fn non_mutable_field_rejects_second_set() {
        let mut heap = Heap::new();
        let mut namespaces = Namespaces::new();
        let owner = dummy_owner(&mut heap);
        let ns = namespaces.alloc(Namespace::new(owner));
        let dummy_type = dummy_owner(&mut heap);
        let field = Field { type_id: dummy_type, visibility: Visibility::Public, mutable: false };
        namespaces.declare(ns, 1, "x", field, None).unwrap();
        let v1 = heap.alloc(TekoObject::void_placeholder());
        let v2 = heap.alloc(TekoObject::void_placeholder());
        namespaces.set(ns, 1, "x", v1).unwrap();
        assert!(namespaces.set(ns, 1, "x", v2).is_err());
    }
}
