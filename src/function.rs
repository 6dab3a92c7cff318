//! Function objects (`spec.md` §4.D "Function types", §4.F "Function
//! invocation"). A `Function` is a `TekoObject` whose payload is a
//! [`FunctionInfo`] holding the parameter struct (`_args`), the declared
//! return type (`_rtype`), and either a user body or a native implementation
//! installed during bootstrap.

use crate::ast::Stmt;
use crate::exception::RunResult;
use crate::heap::HeapId;
use crate::namespace::NamespaceId;
use crate::signature::StructTypeInfo;
use crate::world::World;

/// A built-in operator or stdlib routine, wired in during bootstrap
/// (`spec.md` §4.E step 7-8). Takes the already-bound, already-evaluated
/// argument values in declaration order.
pub type NativeFn = fn(&mut World, &[HeapId], u32) -> RunResult<HeapId>;

#[derive(Clone)]
pub enum FunctionBody {
    /// `spec.md` §4.F: "create a fresh namespace whose outer is the
    /// function's definition-context namespace" — that definition-context
    /// namespace is the `NamespaceId` captured here.
    User(Vec<Stmt>, NamespaceId),
    Native(NativeFn),
}

impl std::fmt::Debug for FunctionBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FunctionBody::User(stmts, ns) => f.debug_tuple("User").field(&stmts.len()).field(ns).finish(),
            FunctionBody::Native(_) => f.write_str("Native(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub params: StructTypeInfo,
    pub return_type: HeapId,
    pub body: FunctionBody,
}
