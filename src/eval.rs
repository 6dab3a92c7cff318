//! The evaluator (component F, `spec.md` §4.F): walks the AST against a
//! bootstrapped [`World`], executing statements for effect and reducing
//! expressions to heap values.
//!
//! Operator and conversion dispatch never matches on a primitive's payload
//! directly; it resolves a named attribute (`_add`, `_compare`, `_tostr`, ...)
//! on the receiver's type and invokes it like any other call, the same
//! uniform path a user-declared type's overload would go through. This is
//! what lets `ops.rs`'s native functions and a user's own method declarations
//! share one call path (`call_function`).

use crate::ast::{Declaration, Expr, Literal, Stmt, StructElem};
use crate::exception::{RunResult, TekoException};
use crate::function::{FunctionBody, FunctionInfo};
use crate::heap::HeapId;
use crate::namespace::{Field, Namespace, NamespaceId};
use crate::object::{Payload, TekoObject};
use crate::signature::{self, BoundArg, StructElemSpec, StructTypeInfo};
use crate::tag::{BinOp, Brace, CompOp, ConvOp, Visibility};
use crate::world::World;

/// Runs a parsed module's statements in the root namespace.
pub fn exec_program(world: &mut World, stmts: &[Stmt]) -> RunResult<()> {
    for stmt in stmts {
        exec_stmt(world, world.root, stmt)?;
    }
    Ok(())
}

fn exec_stmt(world: &mut World, ns: NamespaceId, stmt: &Stmt) -> RunResult<()> {
    match stmt {
        Stmt::Declaration(decls, _) => {
            for decl in decls {
                exec_declaration(world, ns, decl)?;
            }
            Ok(())
        }
        Stmt::Assignment(target, rhs, line) => exec_assignment(world, ns, target, rhs, *line),
        Stmt::Expression(expr, _) => {
            eval_expr(world, ns, expr)?;
            Ok(())
        }
        Stmt::If { cond, block, else_, line } => exec_if(world, ns, cond, block, else_, *line),
        Stmt::While { cond, block, line } => exec_while(world, ns, cond, block, *line),
        Stmt::For { type_expr, label, iterable, block, line } => exec_for(world, ns, type_expr, label, iterable, block, *line),
        Stmt::ClassDeclaration { line, .. } => Err(TekoException::static_error(*line, "class declarations are not implemented")),
    }
}

/// Runs `stmts` as a nested lexical scope, one fresh `outer` link from `ns`.
/// Used for every brace-delimited body that is executed purely for effect
/// (`if`/`while`/`for` bodies); [`exec_stmts_with_implicit_return`] is the
/// variant used where the block's own value matters.
fn exec_block(world: &mut World, ns: NamespaceId, stmts: &[Stmt]) -> RunResult<()> {
    let block_ns = child_namespace(world, ns);
    for stmt in stmts {
        exec_stmt(world, block_ns, stmt)?;
    }
    Ok(())
}

fn child_namespace(world: &mut World, outer: NamespaceId) -> NamespaceId {
    let owner = world.namespaces.get(outer).owner;
    let child = world.namespaces.alloc(Namespace::new(owner));
    world.namespaces.get_mut(child).outers.push(outer);
    child
}

/// Runs `stmts` and returns a value: a trailing bare `Stmt::Expression` is the
/// block's result (`spec.md` has no explicit return node; see `DESIGN.md` for
/// why the last expression statement was chosen as the implicit-return rule).
/// Everything else — including a trailing `if`/`while` — runs for effect only
/// and the block evaluates to `void`.
fn exec_stmts_with_implicit_return(world: &mut World, ns: NamespaceId, stmts: &[Stmt]) -> RunResult<HeapId> {
    let mut result = world.void_value();
    for (i, stmt) in stmts.iter().enumerate() {
        if i + 1 == stmts.len() {
            if let Stmt::Expression(expr, _) = stmt {
                result = eval_expr(world, ns, expr)?;
                continue;
            }
        }
        exec_stmt(world, ns, stmt)?;
    }
    Ok(result)
}

fn exec_if(world: &mut World, ns: NamespaceId, cond: &Expr, block: &[Stmt], else_: &Option<Box<Stmt>>, line: u32) -> RunResult<()> {
    let cond_val = eval_expr(world, ns, cond)?;
    if require_bool(world, cond_val, line)? {
        exec_block(world, ns, block)
    } else if let Some(else_stmt) = else_ {
        exec_stmt(world, ns, else_stmt)
    } else {
        Ok(())
    }
}

fn exec_while(world: &mut World, ns: NamespaceId, cond: &Expr, block: &[Stmt], line: u32) -> RunResult<()> {
    loop {
        let cond_value = eval_expr(world, ns, cond)?;
        if !require_bool(world, cond_value, line)? {
            return Ok(());
        }
        exec_block(world, ns, block)?;
    }
}

/// `spec.md` §4.D: lists, arrays, and sets are the iterable containers; a
/// `for` loop rebinds its label to each element in turn in a fresh per-
/// iteration namespace.
fn exec_for(world: &mut World, ns: NamespaceId, type_expr: &Expr, label: &str, iterable_expr: &Expr, block: &[Stmt], line: u32) -> RunResult<()> {
    let elem_type = resolve_type_expr(world, ns, type_expr)?;
    let iterable = eval_expr(world, ns, iterable_expr)?;
    let elems = match &world.objects.get(iterable).payload {
        Payload::List(v) | Payload::Array(v) | Payload::Set(v) => v.clone(),
        _ => return Err(TekoException::runtime(line, "a for-loop source must be a list, array, or set")),
    };
    for elem in elems {
        if !world.is_instance(elem, elem_type) {
            return Err(TekoException::static_error(
                line,
                format!("for-loop element of type '{}' does not match declared element type '{}'", world.display_name(world.type_of(elem)), world.display_name(elem_type)),
            ));
        }
        let iter_ns = child_namespace(world, ns);
        let field = Field { type_id: elem_type, visibility: Visibility::Public, mutable: true };
        world.namespaces.declare(iter_ns, line, label, field, Some(elem))?;
        for stmt in block {
            exec_stmt(world, iter_ns, stmt)?;
        }
    }
    Ok(())
}

fn require_bool(world: &World, value: HeapId, line: u32) -> RunResult<bool> {
    match world.objects.get(value).payload {
        Payload::Bool(b) => Ok(b),
        _ => Err(TekoException::runtime(line, "expected a bool")),
    }
}

fn exec_declaration(world: &mut World, ns: NamespaceId, decl: &Declaration) -> RunResult<()> {
    if decl.struct_params.is_some() {
        return declare_function(world, ns, decl);
    }

    let declared_type = decl.type_expr.as_ref().map(|te| resolve_type_expr(world, ns, te)).transpose()?;

    // `let x;` with neither a declared type nor an initializer has no way to
    // know `x`'s type; a later assignment can't retroactively fix that.
    if declared_type.is_none() && decl.initializer.is_none() {
        return Err(TekoException::static_error(decl.line, format!("'{}' needs either a declared type or an initializer", decl.label)));
    }
    // `spec.md` §4.F "Declaration: ... Forbid void."
    if declared_type == Some(world.wk.void_type) {
        return Err(TekoException::static_error(decl.line, format!("'{}' cannot be declared with type 'void'", decl.label)));
    }

    let value = match &decl.initializer {
        None => None,
        // `spec.md` §9: an empty sequence literal carries no element values
        // to infer a type from, so it is only legal with a declared type to
        // borrow one from.
        Some(Expr::Sequence(brace, elems, sline)) if elems.is_empty() => {
            let declared_type = declared_type
                .ok_or_else(|| TekoException::static_error(*sline, "an empty sequence literal needs a declared element type"))?;
            Some(alloc_empty_container(world, *brace, declared_type, *sline)?)
        }
        Some(init) => Some(eval_expr(world, ns, init)?),
    };

    if let (Some(v), Some(dt)) = (value, declared_type) {
        if !world.is_instance(v, dt) {
            return Err(TekoException::static_error(
                decl.line,
                format!(
                    "cannot initialize '{}' of type '{}' with a value of type '{}'",
                    decl.label,
                    world.display_name(dt),
                    world.display_name(world.type_of(v))
                ),
            ));
        }
    }

    let field_type = declared_type.unwrap_or(world.wk.obj_type);
    let field = Field { type_id: field_type, visibility: Visibility::Public, mutable: true };
    world.namespaces.declare(ns, decl.line, &decl.label, field, value)
}

fn alloc_empty_container(world: &mut World, brace: Brace, declared_type: HeapId, line: u32) -> RunResult<HeapId> {
    let base = match brace {
        Brace::Curly => world.wk.list_type,
        Brace::Square => world.wk.array_type,
        Brace::Angle => world.wk.set_type,
        Brace::Paren => return Err(TekoException::static_error(line, "'()' is not a sequence literal")),
    };
    if !world.is_subtype(declared_type, base) {
        return Err(TekoException::static_error(line, "empty sequence literal's bracket kind does not match the declared type"));
    }
    let id = match brace {
        Brace::Curly => world.alloc_list(Vec::new()),
        Brace::Square => world.alloc_array(Vec::new()),
        Brace::Angle => world.alloc_set(Vec::new()),
        Brace::Paren => unreachable!("checked above"),
    };
    // Carries the precise (possibly parameterized) declared type rather than
    // the unparameterized base `list`/`array`/`set`.
    world.objects.get_mut(id).type_id = Some(declared_type);
    Ok(id)
}

/// A declaration with a parenthesized parameter list after the label
/// (`int add(int a, int b) = { a + b; };`) declares a function, not a plain
/// variable. `spec.md` §4.F "Function invocation".
fn declare_function(world: &mut World, ns: NamespaceId, decl: &Declaration) -> RunResult<()> {
    let params_ast = decl.struct_params.as_ref().expect("caller checked struct_params.is_some()");
    let return_type = match &decl.type_expr {
        Some(te) => resolve_type_expr(world, ns, te)?,
        None => world.wk.obj_type,
    };
    let elems = resolve_struct_elems(world, ns, params_ast)?;
    let body = match &decl.initializer {
        Some(Expr::CodeBlock(stmts, _)) => stmts.clone(),
        Some(other) => return Err(TekoException::static_error(other.line(), "a function's body must be a code block")),
        None => return Err(TekoException::static_error(decl.line, "a function declaration requires a '{ ... }' body")),
    };
    let func_info = FunctionInfo { params: StructTypeInfo { elems }, return_type, body: FunctionBody::User(body, ns) };
    let func_id = world.objects.alloc(TekoObject::new(world.wk.function_type, world.root, decl.label.clone(), Payload::Function(func_info)));
    let field = Field { type_id: world.wk.function_type, visibility: Visibility::Public, mutable: false };
    world.namespaces.declare(ns, decl.line, &decl.label, field, Some(func_id))
}

fn resolve_struct_elems(world: &mut World, ns: NamespaceId, elems: &[StructElem]) -> RunResult<Vec<StructElemSpec>> {
    let mut specs = Vec::with_capacity(elems.len());
    for (i, elem) in elems.iter().enumerate() {
        if elems[..i].iter().any(|e| e.label == elem.label) {
            return Err(TekoException::static_error(elem.line, format!("duplicate element label '{}'", elem.label)));
        }
        let type_id = resolve_type_expr(world, ns, &elem.type_expr)?;
        specs.push(StructElemSpec { label: elem.label.clone(), type_id, default: elem.default.clone() });
    }
    Ok(specs)
}

fn exec_assignment(world: &mut World, ns: NamespaceId, target: &Expr, rhs: &Expr, line: u32) -> RunResult<()> {
    let value = eval_expr(world, ns, rhs)?;
    match target {
        Expr::Simple(Literal::Label(name), _) => {
            let owner = world
                .namespaces
                .find_owner(ns, name)
                .ok_or_else(|| TekoException::static_error(line, format!("undeclared name '{name}'")))?;
            if let Some(declared_type) = world.namespaces.get(owner).locals.get(name).and_then(|v| v.type_id()) {
                if !world.is_instance(value, declared_type) {
                    return Err(TekoException::static_error(
                        line,
                        format!(
                            "cannot assign a value of type '{}' to '{name}' (declared '{}')",
                            world.display_name(world.type_of(value)),
                            world.display_name(declared_type)
                        ),
                    ));
                }
            }
            world.namespaces.set(owner, line, name, value)
        }
        Expr::Attr(receiver_expr, label, _) => {
            let receiver = eval_expr(world, ns, receiver_expr)?;
            exec_attr_assignment(world, receiver, label, value, line)
        }
        _ => Err(TekoException::static_error(line, "the left-hand side of an assignment must be a name or an attribute")),
    }
}

fn exec_attr_assignment(world: &mut World, receiver: HeapId, label: &str, value: HeapId, line: u32) -> RunResult<()> {
    let type_id = world.type_of(receiver);
    let field = world
        .fields(type_id)?
        .get(label)
        .cloned()
        .ok_or_else(|| TekoException::static_error(line, format!("'{label}' is not a field of type '{}'", world.display_name(type_id))))?;
    if !world.is_instance(value, field.type_id) {
        return Err(TekoException::static_error(
            line,
            format!(
                "cannot assign a value of type '{}' to field '{label}' (declared '{}')",
                world.display_name(world.type_of(value)),
                world.display_name(field.type_id)
            ),
        ));
    }
    let struct_idx = match &world.objects.get(type_id).payload {
        Payload::StructType(struct_info) => struct_info.elems.iter().position(|e| e.label == label),
        _ => None,
    };
    if let Some(idx) = struct_idx {
        if let Payload::StructInstance(values) = &mut world.objects.get_mut(receiver).payload {
            values[idx] = value;
            return Ok(());
        }
    }
    let ns_id = world.objects.get(type_id).namespace.ok_or_else(|| TekoException::runtime(line, "type has no namespace"))?;
    world.namespaces.set(ns_id, line, label, value)
}

/// Evaluates `expr` in type position: the same reduction as a value
/// expression, but the result must itself denote a type. `spec.md` §4.C:
/// type expressions are ordinary `Expr` nodes reinterpreted by context, not a
/// separate grammar production.
fn resolve_type_expr(world: &mut World, ns: NamespaceId, expr: &Expr) -> RunResult<HeapId> {
    let value = eval_expr(world, ns, expr)?;
    let is_type = matches!(world.objects.get(value).payload, Payload::Type(_) | Payload::StructType(_));
    if !is_type {
        return Err(TekoException::static_error(expr.line(), format!("'{}' does not denote a type", world.display_name(value))));
    }
    Ok(value)
}

pub fn eval_expr(world: &mut World, ns: NamespaceId, expr: &Expr) -> RunResult<HeapId> {
    match expr {
        Expr::Simple(lit, line) => eval_literal(world, ns, lit, *line),
        Expr::Sequence(brace, elems, line) => sequence_eval(world, ns, *brace, elems, *line),
        Expr::Call(callee, args, line) => call_eval(world, ns, callee, args, *line),
        Expr::Attr(receiver, label, line) => {
            let receiver_id = eval_expr(world, ns, receiver)?;
            world.resolve_attr(*line, receiver_id, label)
        }
        Expr::BinOp(op, lhs, rhs, line) => binop_eval(world, ns, *op, lhs, rhs, *line),
        Expr::Not(operand, line) => {
            let value = eval_expr(world, ns, operand)?;
            Ok(world.alloc_bool(!require_bool(world, value, *line)?))
        }
        Expr::Comparison(op, lhs, rhs, line) => comparison_eval(world, ns, *op, lhs, rhs, *line),
        Expr::Conversion(operand, conv, line) => conversion_eval(world, ns, operand, *conv, *line),
        Expr::CodeBlock(stmts, _) => {
            let block_ns = child_namespace(world, ns);
            exec_stmts_with_implicit_return(world, block_ns, stmts)
        }
        Expr::NewStruct(elems, _) => new_struct_eval(world, ns, elems),
    }
}

fn eval_literal(world: &mut World, ns: NamespaceId, lit: &Literal, line: u32) -> RunResult<HeapId> {
    match lit {
        Literal::Label(name) => {
            let var =
                world.namespaces.lookup(ns, name).ok_or_else(|| TekoException::static_error(line, format!("undeclared name '{name}'")))?;
            var.require_value(line)
        }
        Literal::Int(v) => Ok(world.alloc_int(*v)),
        Literal::Real(v) => Ok(world.alloc_real(*v)),
        Literal::Bool(v) => Ok(world.alloc_bool(*v)),
        Literal::Str(s) => Ok(world.alloc_str(s.clone())),
    }
}

/// Binary operators dispatch by named attribute (`spec.md` §4.F "Operator
/// dispatch maps"): `a + b` resolves `_add` on `a`'s type and invokes it as
/// `_add(a, b)`, exactly like a user-declared overload would be invoked.
fn binop_eval(world: &mut World, ns: NamespaceId, op: BinOp, lhs_expr: &Expr, rhs_expr: &Expr, line: u32) -> RunResult<HeapId> {
    let lhs = eval_expr(world, ns, lhs_expr)?;
    let rhs = eval_expr(world, ns, rhs_expr)?;
    let method = world.resolve_attr(line, lhs, op.dispatch_name())?;
    call_function(world, method, vec![BoundArg::Positional(lhs), BoundArg::Positional(rhs)], line)
}

/// `spec.md` §4.F COMP table: a type's own `_compare` is tried first for
/// every comparator, including `==`/`!=`; only when a type has no `_compare`
/// does `==`/`!=` fall back to `_eq`. `<:` is parsed but not evaluated
/// (`spec.md` §1 "Out of scope").
fn comparison_eval(world: &mut World, ns: NamespaceId, op: CompOp, lhs_expr: &Expr, rhs_expr: &Expr, line: u32) -> RunResult<HeapId> {
    if op == CompOp::SubtypeOf {
        return Err(TekoException::static_error(line, "the '<:' subtype comparator is not implemented"));
    }
    let lhs = eval_expr(world, ns, lhs_expr)?;
    let rhs = eval_expr(world, ns, rhs_expr)?;

    if let Ok(method) = world.resolve_attr(line, lhs, "_compare") {
        let result = call_function(world, method, vec![BoundArg::Positional(lhs), BoundArg::Positional(rhs)], line)?;
        let ordering = match world.objects.get(result).payload {
            Payload::Int(v) => v as i8,
            _ => return Err(TekoException::runtime(line, "'_compare' must return an int")),
        };
        return Ok(world.alloc_bool(op.satisfied_by().contains(&ordering)));
    }

    if matches!(op, CompOp::Eq | CompOp::Ne) {
        let method = world.resolve_attr(line, lhs, "_eq")?;
        let result = call_function(world, method, vec![BoundArg::Positional(lhs), BoundArg::Positional(rhs)], line)?;
        let equal = match world.objects.get(result).payload {
            Payload::Bool(b) => b,
            _ => return Err(TekoException::runtime(line, "'_eq' must return a bool")),
        };
        return Ok(world.alloc_bool(if op == CompOp::Eq { equal } else { !equal }));
    }

    Err(TekoException::static_error(line, format!("'{}' has neither '_compare' nor '_eq'", world.display_name(world.type_of(lhs)))))
}

/// `ToStr`/`ToReal` dispatch to a named conversion method on the operand's
/// own value (`_tostr`, `_toreal`); `Curly`/`Square`/`Angle` instead treat the
/// operand as a type expression and parameterize the matching container —
/// `int{}` is "the list type of int", not a conversion of a value named `int`.
fn conversion_eval(world: &mut World, ns: NamespaceId, operand: &Expr, conv: ConvOp, line: u32) -> RunResult<HeapId> {
    match conv {
        ConvOp::ToStr => {
            let value = eval_expr(world, ns, operand)?;
            let rendered = tostr(world, value, line)?;
            Ok(world.alloc_str(rendered))
        }
        ConvOp::ToReal => {
            let value = eval_expr(world, ns, operand)?;
            let method = world.resolve_attr(line, value, "_toreal")?;
            call_function(world, method, vec![BoundArg::Positional(value)], line)
        }
        ConvOp::Curly | ConvOp::Square | ConvOp::Angle => {
            let base = match conv {
                ConvOp::Curly => world.wk.list_type,
                ConvOp::Square => world.wk.array_type,
                ConvOp::Angle => world.wk.set_type,
                _ => unreachable!(),
            };
            let etype = resolve_type_expr(world, ns, operand)?;
            Ok(world.parameterize_container(base, etype))
        }
    }
}

fn sequence_eval(world: &mut World, ns: NamespaceId, brace: Brace, elems: &[Expr], line: u32) -> RunResult<HeapId> {
    if brace == Brace::Paren {
        return Err(TekoException::static_error(line, "'()' is not a sequence literal"));
    }
    let values = elems.iter().map(|e| eval_expr(world, ns, e)).collect::<RunResult<Vec<_>>>()?;
    if values.is_empty() {
        return Err(TekoException::static_error(
            line,
            "an empty sequence literal needs a declared element type; write it as a typed declaration's initializer",
        ));
    }

    let mut elem_type = world.type_of(values[0]);
    for &v in &values[1..] {
        let t = world.type_of(v);
        elem_type = if world.is_subtype(t, elem_type) {
            elem_type
        } else if world.is_subtype(elem_type, t) {
            t
        } else {
            return Err(TekoException::static_error(line, "sequence elements do not share a common type"));
        };
    }

    let base = match brace {
        Brace::Curly => world.wk.list_type,
        Brace::Square => world.wk.array_type,
        Brace::Angle => world.wk.set_type,
        Brace::Paren => unreachable!("checked above"),
    };
    let container_type = world.parameterize_container(base, elem_type);
    let id = match brace {
        Brace::Curly => world.alloc_list(values),
        Brace::Square => world.alloc_array(values),
        Brace::Angle => world.alloc_set(values),
        Brace::Paren => unreachable!("checked above"),
    };
    world.objects.get_mut(id).type_id = Some(container_type);
    Ok(id)
}

/// A parenthesized element list evaluates to a first-class struct *type*
/// (`spec.md` §4.D "Struct types"): `(int x, int y = 0)` as an expression
/// yields the type; calling that type constructs a `StructInstance`.
fn new_struct_eval(world: &mut World, ns: NamespaceId, elems: &[StructElem]) -> RunResult<HeapId> {
    let specs = resolve_struct_elems(world, ns, elems)?;
    let name = struct_type_display_name(world, &specs);
    Ok(world.objects.alloc(TekoObject::new(world.wk.type_type, world.root, name, Payload::StructType(StructTypeInfo { elems: specs }))))
}

fn struct_type_display_name(world: &World, specs: &[StructElemSpec]) -> String {
    let mut name = String::from("(");
    for (i, spec) in specs.iter().enumerate() {
        if i > 0 {
            name.push_str(", ");
        }
        name.push_str(world.display_name(spec.type_id));
        name.push(' ');
        name.push_str(&spec.label);
    }
    name.push(')');
    name
}

fn call_eval(world: &mut World, ns: NamespaceId, callee: &Expr, args: &[crate::ast::ArgNode], line: u32) -> RunResult<HeapId> {
    let callee_id = eval_expr(world, ns, callee)?;
    let bound_args = args
        .iter()
        .map(|arg| {
            let value = eval_expr(world, ns, &arg.expr)?;
            Ok(match &arg.keyword {
                Some(name) => BoundArg::Keyword(name.clone(), value),
                None => BoundArg::Positional(value),
            })
        })
        .collect::<RunResult<Vec<_>>>()?;

    match &world.objects.get(callee_id).payload {
        Payload::Function(_) => call_function(world, callee_id, bound_args, line),
        Payload::StructType(_) => construct_struct_instance(world, callee_id, bound_args, line),
        _ => Err(TekoException::static_error(line, format!("'{}' is not callable", world.display_name(callee_id)))),
    }
}

fn construct_struct_instance(world: &mut World, type_id: HeapId, args: Vec<BoundArg>, line: u32) -> RunResult<HeapId> {
    let elems = match &world.objects.get(type_id).payload {
        Payload::StructType(info) => info.elems.clone(),
        _ => unreachable!("caller matched Payload::StructType"),
    };
    let values = signature::bind_arguments(&elems, &args, line, |default_expr| eval_expr(world, world.root, default_expr))?;
    let name = world.display_name(type_id).to_owned();
    Ok(world.objects.alloc(TekoObject::new(type_id, world.root, name, Payload::StructInstance(values.into_vec()))))
}

/// Invokes a native or user-defined function against already-evaluated
/// arguments. `spec.md` §4.F: a user function call creates a fresh namespace
/// whose outer is the function's own definition-context namespace (lexical
/// scoping across calls and closures), binds its parameters into it, then
/// runs its body with [`exec_stmts_with_implicit_return`].
pub fn call_function(world: &mut World, func_id: HeapId, args: Vec<BoundArg>, line: u32) -> RunResult<HeapId> {
    let info = match &world.objects.get(func_id).payload {
        Payload::Function(info) => info.clone(),
        _ => return Err(TekoException::runtime(line, format!("'{}' is not callable", world.display_name(func_id)))),
    };
    let params = info.params.elems;
    let bound_values = signature::bind_arguments(&params, &args, line, |default_expr| eval_expr(world, world.root, default_expr))?;

    match info.body {
        FunctionBody::Native(native) => native(world, &bound_values, line),
        FunctionBody::User(stmts, def_ns) => {
            let call_ns = world.namespaces.alloc(Namespace::new(func_id));
            world.namespaces.get_mut(call_ns).outers.push(def_ns);
            for (param, value) in params.iter().zip(bound_values.iter()) {
                let field = Field { type_id: param.type_id, visibility: Visibility::Public, mutable: true };
                world.namespaces.declare(call_ns, line, &param.label, field, Some(*value))?;
            }
            exec_stmts_with_implicit_return(world, call_ns, &stmts)
        }
    }
}

/// Renders a value as a string for `print`/`$` (`spec.md` §4.F, §9 invariant
/// 4). Struct instances always use the positional record format
/// (`TypeName(field1, field2, ...)`) since `StructType` carries no `_tostr`
/// slot of its own; every other value walks its type chain looking for a
/// declared `_tostr`, which `obj`'s bootstrap-installed generic one always
/// terminates.
pub fn tostr(world: &mut World, value: HeapId, line: u32) -> RunResult<String> {
    let type_id = world.type_of(value);
    if let Payload::StructInstance(values) = world.objects.get(value).payload.clone() {
        return struct_tostr(world, type_id, &values, line);
    }
    let mut cursor = Some(type_id);
    while let Some(t) = cursor {
        let native = match &world.objects.get(t).payload {
            Payload::Type(info) => info.tostr,
            _ => None,
        };
        if let Some(native) = native {
            let result = native(world, &[value], line)?;
            return match &world.objects.get(result).payload {
                Payload::Str(s) => Ok(s.clone()),
                _ => Err(TekoException::runtime(line, "'_tostr' must return a str")),
            };
        }
        cursor = world.parent_of(t);
    }
    Ok(world.display_name(value).to_owned())
}

fn struct_tostr(world: &mut World, type_id: HeapId, values: &[HeapId], line: u32) -> RunResult<String> {
    let mut rendered = world.display_name(type_id).to_owned();
    rendered.push('(');
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            rendered.push_str(", ");
        }
        rendered.push_str(&tostr(world, *v, line)?);
    }
    rendered.push(')');
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_program;
    use crate::tag::tag_source;

    fn run(src: &str) -> RunResult<World> {
        let mut world = crate::bootstrap::bootstrap();
        let stmts = parse_program(&tag_source(src).unwrap())?;
        exec_program(&mut world, &stmts)?;
        Ok(world)
    }

    fn int_value(world: &World, name: &str) -> i64 {
        let var = world.namespaces.lookup(world.root, name).unwrap();
        match &world.objects.get(var.value().unwrap()).payload {
            Payload::Int(v) => *v,
            other => panic!("expected int, got {other:?}"),
        }
    }

    fn bool_value(world: &World, name: &str) -> bool {
        let var = world.namespaces.lookup(world.root, name).unwrap();
        match &world.objects.get(var.value().unwrap()).payload {
            Payload::Bool(v) => *v,
            other => panic!("expected bool, got {other:?}"),
        }
    }

    #[test]
    fn arithmetic_precedence_and_dispatch() {
        let world = run("int a = 3 + 4 * 2;").unwrap();
        assert_eq!(int_value(&world, "a"), 11);
    }

    #[test]
    fn comparison_dispatches_through_compare() {
        let world = run("bool a = 3 < 5; bool b = 3 > 5;").unwrap();
        assert!(bool_value(&world, "a"));
        assert!(!bool_value(&world, "b"));
    }

    #[test]
    fn equality_dispatches_through_eq_when_present() {
        let world = run(r#"bool a = "x" == "x"; bool b = "x" == "y";"#).unwrap();
        assert!(bool_value(&world, "a"));
        assert!(!bool_value(&world, "b"));
    }

    #[test]
    fn while_loop_accumulates() {
        let world = run(
            "int total = 0;
             int i = 0;
             while (i < 5) {
                 total = total + i;
                 i = i + 1;
             }",
        )
        .unwrap();
        assert_eq!(int_value(&world, "total"), 10);
    }

    #[test]
    fn if_else_chooses_branch() {
        let world = run(
            "int a = 0;
             if (1 < 2) { a = 1; } else { a = 2; }",
        )
        .unwrap();
        assert_eq!(int_value(&world, "a"), 1);
    }

    #[test]
    fn for_loop_sums_a_list() {
        let world = run(
            "int total = 0;
             for (int x in {1, 2, 3}) {
                 total = total + x;
             }",
        )
        .unwrap();
        assert_eq!(int_value(&world, "total"), 6);
    }

    #[test]
    fn function_call_returns_last_expression_statement() {
        let world = run(
            "int square(int n) = { n * n; };
             int a = square(6);",
        )
        .unwrap();
        assert_eq!(int_value(&world, "a"), 36);
    }

    #[test]
    fn struct_construction_and_field_access() {
        let world = run(
            "let p = (int x, int y)(x = 1, y = 2);
             int a = p.x + p.y;",
        )
        .unwrap();
        assert_eq!(int_value(&world, "a"), 3);
    }

    #[test]
    fn structurally_equal_struct_types_are_assignment_compatible() {
        let world = run(
            "(int x, int y) p = (int x, int y)(x = 1, y = 2);
             int a = p.x + p.y;",
        )
        .unwrap();
        assert_eq!(int_value(&world, "a"), 3);
    }

    #[test]
    fn empty_sequence_literal_requires_declared_type() {
        assert!(run("int{} a = {};").is_ok());
        assert!(run("let a = {};").is_err());
    }

    #[test]
    fn container_parameterization_tracks_element_type() {
        let world = run("int{} a = {1, 2, 3};").unwrap();
        let var = world.namespaces.lookup(world.root, "a").unwrap();
        let list_id = var.value().unwrap();
        let list_type = world.type_of(list_id);
        assert!(world.is_subtype(list_type, world.wk.list_type));
        assert_eq!(world.etype_of(list_type), Some(world.wk.int_type));
    }

    #[test]
    fn tostr_renders_struct_as_record() {
        let mut world = run("(int x, int y) p = (int x, int y)(x = 1, y = 2);").unwrap();
        let var = world.namespaces.lookup(world.root, "p").unwrap();
        let p = var.value().unwrap();
        let rendered = tostr(&mut world, p, 1).unwrap();
        assert_eq!(rendered, "(int x, int y)(1, 2)");
    }
}
