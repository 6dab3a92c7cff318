//! Bootstrapped library (component E, `spec.md` §4.E): constructs the
//! reflexive root types and wires the standard library into the root
//! namespace.
//!
//! The tricky part is step 1 — `type(type) == type` — which the source
//! works around with placeholder-then-patch construction. `spec.md` §9
//! Design Notes recommends the systems-language analogue: allocate the
//! three root objects with no type yet, then patch `type_id` once all three
//! exist. [`World::alloc_type`]/[`TekoObject::placeholder`] exist
//! specifically to make that patch-up legal without `Option::unwrap`
//! sprinkled through the rest of the crate.

use crate::ast::{Expr, Literal};
use crate::exception::{RunResult, TekoException};
use crate::function::{FunctionBody, FunctionInfo, NativeFn};
use crate::heap::{Heap, HeapId};
use crate::io::StdPrint;
use crate::namespace::{Field, Namespace, Namespaces};
use crate::object::{Payload, TekoObject, TypeInfo};
use crate::ops;
use crate::signature::{StructElemSpec, StructTypeInfo};
use crate::tag::Visibility;
use crate::world::{WellKnown, World};

/// Builds a fully bootstrapped [`World`]: root types, primitives, native
/// operators, and the standard library functions from `spec.md` §4.E step 8.
pub fn bootstrap() -> World {
    let mut objects: Heap<TekoObject> = Heap::new();
    let mut namespaces = Namespaces::new();

    // Step 1: three root objects with tekotype left unset.
    let type_type = alloc_placeholder_type(&mut objects, &mut namespaces, "type");
    let obj_type = alloc_placeholder_type(&mut objects, &mut namespaces, "obj");
    let void_type = alloc_placeholder_type(&mut objects, &mut namespaces, "void");
    for t in [type_type, obj_type, void_type] {
        objects.get_mut(t).type_id = Some(type_type);
    }
    // Step 2: _parent defaults to obj; obj is its own parent (the DAG apex).
    objects.get_mut(obj_type).as_type_mut().unwrap().parent = Some(obj_type);
    objects.get_mut(type_type).as_type_mut().unwrap().parent = Some(obj_type);
    objects.get_mut(void_type).as_type_mut().unwrap().parent = Some(obj_type);

    let root = namespaces.alloc(Namespace::new(obj_type));
    let void_value = objects.alloc(TekoObject::new(void_type, root, "void", Payload::Void));

    let wk = WellKnown {
        type_type,
        obj_type,
        void_type,
        bool_type: obj_type,
        int_type: obj_type,
        real_type: obj_type,
        str_type: obj_type,
        iterable_type: obj_type,
        list_type: obj_type,
        array_type: obj_type,
        set_type: obj_type,
        function_type: obj_type,
        struct_type: obj_type,
        module_type: obj_type,
        void_value,
    };
    let mut world = World { objects, namespaces, root, wk, output: Box::new(StdPrint) };

    // Step 3/4: struct and function-type markers. Neither is deeply
    // structural here — `_args`/`_rtype` introspection on them is not
    // exercised anywhere in this implementation — but both exist as real
    // type objects so `typeof` on a function or a struct type has
    // something legitimate to return. See `DESIGN.md`.
    world.wk.struct_type = world.alloc_type(world.wk.type_type, "struct", Some(world.wk.type_type));
    let function_type_type = world.alloc_type(world.wk.type_type, "functiontype", Some(world.wk.obj_type));
    world.wk.function_type = function_type_type;
    world.wk.module_type = world.alloc_type(world.wk.type_type, "module", Some(world.wk.obj_type));

    // Step 6: primitive types.
    world.wk.bool_type = world.alloc_type(world.wk.type_type, "bool", Some(world.wk.obj_type));
    world.wk.str_type = world.alloc_type(world.wk.type_type, "str", Some(world.wk.obj_type));
    world.wk.int_type = world.alloc_type(world.wk.type_type, "int", Some(world.wk.obj_type));
    world.wk.real_type = world.alloc_type(world.wk.type_type, "real", Some(world.wk.obj_type));
    world.wk.iterable_type = world.alloc_type(world.wk.type_type, "iterable", Some(world.wk.obj_type));
    world.wk.list_type = world.alloc_type(world.wk.type_type, "list", Some(world.wk.iterable_type));
    world.wk.array_type = world.alloc_type(world.wk.type_type, "array", Some(world.wk.iterable_type));
    world.wk.set_type = world.alloc_type(world.wk.type_type, "set", Some(world.wk.iterable_type));

    let obj_type = world.wk.obj_type;
    let bool_type = world.wk.bool_type;
    let int_type = world.wk.int_type;
    let real_type = world.wk.real_type;
    let str_type = world.wk.str_type;
    let list_type = world.wk.list_type;
    let array_type = world.wk.array_type;
    let set_type = world.wk.set_type;
    install_tostr(&mut world, obj_type, generic_tostr);
    install_tostr(&mut world, bool_type, bool_tostr);
    install_tostr(&mut world, int_type, int_tostr);
    install_tostr(&mut world, real_type, real_tostr);
    install_tostr(&mut world, str_type, str_tostr);
    install_tostr(&mut world, list_type, sequence_tostr);
    install_tostr(&mut world, array_type, sequence_tostr);
    install_tostr(&mut world, set_type, sequence_tostr);

    // Step 7: native operators per type, `spec.md` §4.E step 7.
    let bool_t = world.wk.bool_type;
    install_method(&mut world, bool_t, "_and", bool_t, &[("other", bool_t)], bool_t, ops::bool_and);
    install_method(&mut world, bool_t, "_or", bool_t, &[("other", bool_t)], bool_t, ops::bool_or);

    let str_t = world.wk.str_type;
    install_method(&mut world, str_t, "_add", str_t, &[("other", str_t)], str_t, ops::str_add);
    install_method(&mut world, str_t, "_eq", str_t, &[("other", str_t)], bool_t, ops::str_eq);

    let int_t = world.wk.int_type;
    install_method(&mut world, int_t, "_add", int_t, &[("other", int_t)], int_t, ops::int_add);
    install_method(&mut world, int_t, "_sub", int_t, &[("other", int_t)], int_t, ops::int_sub);
    install_method(&mut world, int_t, "_mul", int_t, &[("other", int_t)], int_t, ops::int_mul);
    install_method(&mut world, int_t, "_div", int_t, &[("other", int_t)], int_t, ops::int_div);
    install_method(&mut world, int_t, "_exp", int_t, &[("other", int_t)], int_t, ops::int_exp);
    install_method(&mut world, int_t, "_mod", int_t, &[("other", int_t)], int_t, ops::int_mod);
    install_method(&mut world, int_t, "_compare", int_t, &[("other", int_t)], int_t, ops::int_compare);
    let real_type_for_toreal = world.wk.real_type;
    install_method(&mut world, int_t, "_toreal", int_t, &[], real_type_for_toreal, ops::int_toreal);

    let real_t = world.wk.real_type;
    install_method(&mut world, real_t, "_add", real_t, &[("other", real_t)], real_t, ops::real_add);
    install_method(&mut world, real_t, "_sub", real_t, &[("other", real_t)], real_t, ops::real_sub);
    install_method(&mut world, real_t, "_mul", real_t, &[("other", real_t)], real_t, ops::real_mul);
    install_method(&mut world, real_t, "_div", real_t, &[("other", real_t)], real_t, ops::real_div);
    install_method(&mut world, real_t, "_exp", real_t, &[("other", real_t)], real_t, ops::real_exp);
    install_method(&mut world, real_t, "_compare", real_t, &[("other", real_t)], int_t, ops::real_compare);
    install_method(&mut world, real_t, "_toreal", real_t, &[], real_t, ops::real_toreal);

    // Step 8: top-level standard library functions.
    install_stdlib(&mut world);

    world
}

fn alloc_placeholder_type(objects: &mut Heap<TekoObject>, namespaces: &mut Namespaces, name: &str) -> HeapId {
    let id = objects.alloc(TekoObject::placeholder(name, Payload::Type(TypeInfo::default())));
    let ns = namespaces.alloc(Namespace::new(id));
    objects.get_mut(id).namespace = Some(ns);
    id
}

fn install_tostr(world: &mut World, type_id: HeapId, f: NativeFn) {
    world.objects.get_mut(type_id).as_type_mut().expect("install_tostr target is a type").tostr = Some(f);
}

/// Installs a native bound method: a `Function` whose first declared
/// parameter is `self` (the dispatch receiver), as a [`Field`] on
/// `owner_type` plus the shared value in its own namespace — see
/// [`World::install_member`].
fn install_method(world: &mut World, owner_type: HeapId, label: &str, self_type: HeapId, extra_params: &[(&str, HeapId)], return_type: HeapId, native: NativeFn) {
    let mut elems = vec![StructElemSpec { label: "self".to_owned(), type_id: self_type, default: None }];
    for (name, ptype) in extra_params {
        elems.push(StructElemSpec { label: (*name).to_owned(), type_id: *ptype, default: None });
    }
    let func = world.objects.alloc(TekoObject::new(
        world.wk.function_type,
        world.root,
        label,
        Payload::Function(FunctionInfo { params: StructTypeInfo { elems }, return_type, body: FunctionBody::Native(native) }),
    ));
    let field = Field { type_id: world.wk.function_type, visibility: Visibility::Public, mutable: false };
    world.install_member(owner_type, label, field, func);
}

fn declare_stdlib_fn(world: &mut World, label: &str, params: Vec<StructElemSpec>, return_type: HeapId, native: NativeFn) {
    let func = world.objects.alloc(TekoObject::new(
        world.wk.function_type,
        world.root,
        label,
        Payload::Function(FunctionInfo { params: StructTypeInfo { elems: params }, return_type, body: FunctionBody::Native(native) }),
    ));
    let field = Field { type_id: world.wk.function_type, visibility: Visibility::Public, mutable: false };
    world
        .namespaces
        .declare(world.root, 0, label, field, Some(func))
        .expect("stdlib names are installed once, before any user declaration can collide");
}

/// Binds a fixed, never-reassignable name to a type value in the root
/// namespace. `spec.md` §6: "Standard library names: type obj void module
/// struct bool str int real iterable print typeof assert input" — everything
/// but the five `print typeof assert input` function names (and `list`,
/// `array`, `set`, which `spec.md` §6 deliberately omits: they are reached
/// only through the `{}`/`[]`/`<>` parameterization syntax, never by bare
/// name) goes through this helper.
fn declare_type_name(world: &mut World, label: &str, type_id: HeapId) {
    let field = Field { type_id: world.wk.type_type, visibility: Visibility::Public, mutable: false };
    world
        .namespaces
        .declare(world.root, 0, label, field, Some(type_id))
        .expect("stdlib names are installed once, before any user declaration can collide");
}

fn install_stdlib(world: &mut World) {
    let obj_t = world.wk.obj_type;
    let void_t = world.wk.void_type;
    let type_t = world.wk.type_type;
    let bool_t = world.wk.bool_type;
    let str_t = world.wk.str_type;

    declare_type_name(world, "type", world.wk.type_type);
    declare_type_name(world, "obj", obj_t);
    declare_type_name(world, "void", void_t);
    declare_type_name(world, "module", world.wk.module_type);
    declare_type_name(world, "struct", world.wk.struct_type);
    declare_type_name(world, "bool", bool_t);
    declare_type_name(world, "str", str_t);
    declare_type_name(world, "int", world.wk.int_type);
    declare_type_name(world, "real", world.wk.real_type);
    declare_type_name(world, "iterable", world.wk.iterable_type);

    // `spec.md` §9 "the print default argument is literally `"\n"`": a bare
    // `print();` therefore emits a newline.
    let print_params = vec![StructElemSpec {
        label: "obj".to_owned(),
        type_id: obj_t,
        default: Some(Expr::Simple(Literal::Str("\n".to_owned()), 0)),
    }];
    declare_stdlib_fn(world, "print", print_params, void_t, native_print);

    declare_stdlib_fn(world, "typeof", vec![StructElemSpec { label: "obj".to_owned(), type_id: obj_t, default: None }], type_t, native_typeof);

    declare_stdlib_fn(world, "assert", vec![StructElemSpec { label: "cond".to_owned(), type_id: bool_t, default: None }], void_t, native_assert);

    declare_stdlib_fn(world, "input", vec![], str_t, native_input);
}

fn native_print(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let rendered = crate::eval::tostr(world, args[0], line)?;
    world.output.write_str(&rendered);
    Ok(world.void_value())
}

fn native_typeof(world: &mut World, args: &[HeapId], _line: u32) -> RunResult<HeapId> {
    Ok(world.type_of(args[0]))
}

fn native_assert(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    match world.objects.get(args[0]).payload {
        Payload::Bool(true) => Ok(world.void_value()),
        Payload::Bool(false) => Err(TekoException::runtime(line, "assertion failed")),
        _ => Err(TekoException::runtime(line, "assert expects a bool")),
    }
}

fn native_input(world: &mut World, _args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let mut buf = String::new();
    std::io::stdin().read_line(&mut buf).map_err(|e| TekoException::runtime(line, format!("input: {e}")))?;
    while buf.ends_with('\n') || buf.ends_with('\r') {
        buf.pop();
    }
    Ok(world.alloc_str(buf))
}

fn generic_tostr(world: &mut World, args: &[HeapId], _line: u32) -> RunResult<HeapId> {
    let name = world.display_name(args[0]).to_owned();
    Ok(world.alloc_str(name))
}

fn bool_tostr(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    match world.objects.get(args[0]).payload {
        Payload::Bool(v) => Ok(world.alloc_str(v.to_string())),
        _ => Err(TekoException::runtime(line, "expected a bool")),
    }
}

fn int_tostr(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    match world.objects.get(args[0]).payload {
        Payload::Int(v) => Ok(world.alloc_str(v.to_string())),
        _ => Err(TekoException::runtime(line, "expected an int")),
    }
}

fn real_tostr(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    match world.objects.get(args[0]).payload {
        Payload::Real(v) => {
            let s = if v.fract() == 0.0 { format!("{v:.1}") } else { v.to_string() };
            Ok(world.alloc_str(s))
        }
        _ => Err(TekoException::runtime(line, "expected a real")),
    }
}

fn str_tostr(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    match &world.objects.get(args[0]).payload {
        Payload::Str(v) => Ok(world.alloc_str(v.clone())),
        _ => Err(TekoException::runtime(line, "expected a str")),
    }
}

fn sequence_tostr(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let (open, close, elems) = match &world.objects.get(args[0]).payload {
        Payload::List(elems) => ('{', '}', elems.clone()),
        Payload::Array(elems) => ('[', ']', elems.clone()),
        Payload::Set(elems) => ('<', '>', elems.clone()),
        _ => return Err(TekoException::runtime(line, "expected a container")),
    };
    let mut rendered = String::new();
    rendered.push(open);
    for (i, elem) in elems.iter().enumerate() {
        if i > 0 {
            rendered.push_str(", ");
        }
        rendered.push_str(&crate::eval::tostr(world, *elem, line)?);
    }
    rendered.push(close);
    Ok(world.alloc_str(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflexive_root_is_reflexive() {
        let world = bootstrap();
        assert_eq!(world.type_of(world.wk.type_type), world.wk.type_type);
        assert!(world.is_subtype(world.wk.int_type, world.wk.obj_type));
        assert!(world.is_subtype(world.wk.list_type, world.wk.iterable_type));
    }

    #[test]
    fn stdlib_names_are_reachable_from_root() {
        let world = bootstrap();
        for name in ["print", "typeof", "assert", "input"] {
            assert!(world.namespaces.lookup(world.root, name).is_some(), "missing {name}");
        }
    }
}
