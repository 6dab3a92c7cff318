//! Struct types and argument binding (`spec.md` §3 "NewStructNode",
//! "StructElem"; §4.D "Struct types"; §4.F "Function invocation").
//!
//! A `NewStruct` is first-class: it is the type a function's parameter list
//! denotes, and constructing one directly (`(int x, int y = 0)`) yields a
//! struct *type*, invoking that type yields a `StructInstance`. Both paths
//! go through [`bind_arguments`].

use smallvec::{smallvec, SmallVec};

use crate::ast::Expr;
use crate::exception::{RunResult, TekoException};
use crate::heap::HeapId;

/// Most Teko calls pass a handful of arguments; inlining those onto the
/// stack avoids a heap allocation for the common case, the same tradeoff the
/// grounding repo makes for its own small, fixed-shape value lists.
pub type BoundValues = SmallVec<[HeapId; 4]>;

#[derive(Debug, Clone)]
pub struct StructElemSpec {
    pub label: String,
    pub type_id: HeapId,
    pub default: Option<Expr>,
}

/// `spec.md` §4.D: "two structs are equal iff their element lists are
/// pairwise equal (by type and default value)" — deliberately not by label;
/// see `DESIGN.md` for this reading of an otherwise-ambiguous sentence.
#[derive(Debug, Clone, Default)]
pub struct StructTypeInfo {
    pub elems: Vec<StructElemSpec>,
}

impl PartialEq for StructTypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.elems.len() == other.elems.len()
            && self.elems.iter().zip(&other.elems).all(|(a, b)| a.type_id == b.type_id && a.default == b.default)
    }
}

/// A positional or keyword call argument already evaluated to a heap value.
pub enum BoundArg {
    Positional(HeapId),
    Keyword(String, HeapId),
}

/// Binds evaluated call arguments against a struct's element list, in
/// declaration order, per `spec.md` §4.D "Construction accepts ordered
/// positional args followed by keyword args; keyword collisions and missing
/// non-defaulted elements are errors." `eval_default` evaluates a
/// `StructElem`'s default expression in the caller's context — threaded in
/// rather than imported, so this module stays independent of the evaluator.
pub fn bind_arguments(
    params: &[StructElemSpec],
    args: &[BoundArg],
    line: u32,
    mut eval_default: impl FnMut(&Expr) -> RunResult<HeapId>,
) -> RunResult<BoundValues> {
    let mut bound: SmallVec<[Option<HeapId>; 4]> = smallvec![None; params.len()];
    let mut next_positional = 0usize;
    let mut seen_keyword = false;

    for arg in args {
        match arg {
            BoundArg::Positional(value) => {
                if seen_keyword {
                    return Err(TekoException::static_error(line, "positional argument follows keyword argument"));
                }
                if next_positional >= params.len() {
                    return Err(TekoException::static_error(line, "too many positional arguments"));
                }
                bound[next_positional] = Some(*value);
                next_positional += 1;
            }
            BoundArg::Keyword(label, value) => {
                seen_keyword = true;
                let idx = params
                    .iter()
                    .position(|p| &p.label == label)
                    .ok_or_else(|| TekoException::static_error(line, format!("no such parameter '{label}'")))?;
                if bound[idx].is_some() {
                    return Err(TekoException::static_error(line, format!("duplicate argument for '{label}'")));
                }
                bound[idx] = Some(*value);
            }
        }
    }

    let mut result = BoundValues::with_capacity(params.len());
    for (param, slot) in params.iter().zip(bound.into_iter()) {
        let value = match slot {
            Some(value) => value,
            None => match &param.default {
                Some(default_expr) => eval_default(default_expr)?,
                None => {
                    return Err(TekoException::static_error(line, format!("missing argument for '{}'", param.label)))
                }
            },
        };
        result.push(value);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(label: &str, type_id: HeapId, default: Option<Expr>) -> StructElemSpec {
        StructElemSpec { label: label.to_owned(), type_id, default }
    }

    fn dummy_ids(n: usize) -> (crate::heap::Heap<()>, Vec<HeapId>) {
        let mut heap: crate::heap::Heap<()> = crate::heap::Heap::new();
        let ids = (0..n).map(|_| heap.alloc(())).collect();
        (heap, ids)
    }

    #[test]
    fn binds_positional_then_keyword() {
        let (_heap, ids) = dummy_ids(3);
        let (t, v1, v2) = (ids[0], ids[1], ids[2]);
        let params = vec![spec("a", t, None), spec("b", t, None)];
        let args = vec![BoundArg::Positional(v1), BoundArg::Keyword("b".into(), v2)];
        let bound = bind_arguments(&params, &args, 1, |_| unreachable!()).unwrap();
        assert_eq!(&bound[..], &[v1, v2]);
    }

    #[test]
    fn positional_after_keyword_errors() {
        let (_heap, ids) = dummy_ids(3);
        let (t, v1, v2) = (ids[0], ids[1], ids[2]);
        let params = vec![spec("a", t, None), spec("b", t, None)];
        let args = vec![BoundArg::Keyword("a".into(), v1), BoundArg::Positional(v2)];
        assert!(bind_arguments(&params, &args, 1, |_| unreachable!()).is_err());
    }

    #[test]
    fn missing_non_defaulted_argument_errors() {
        let (_heap, ids) = dummy_ids(1);
        let params = vec![spec("a", ids[0], None)];
        let bound = bind_arguments(&params, &[], 1, |_| unreachable!());
        assert!(bound.is_err());
    }

    #[test]
    fn duplicate_keyword_errors() {
        let (_heap, ids) = dummy_ids(2);
        let params = vec![spec("a", ids[0], None)];
        let v = ids[1];
        let args = vec![BoundArg::Keyword("a".into(), v), BoundArg::Keyword("a".into(), v)];
        assert!(bind_arguments(&params, &args, 1, |_| unreachable!()).is_err());
    }
}
