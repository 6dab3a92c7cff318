//! Native operator implementations installed on the primitive types during
//! bootstrap (`spec.md` §4.E step 7, §4.F "Operator dispatch maps").
//!
//! Every function here follows one calling convention: `args[0]` is the
//! receiver ("self", the dispatch target) and any remaining entries are the
//! call's real arguments, in declaration order. This is what lets a single
//! [`crate::function::NativeFn`] pointer implement a bound method without
//! capturing any per-instance state — the receiver travels through the
//! argument slice like any other parameter.

use crate::exception::{RunResult, TekoException};
use crate::heap::HeapId;
use crate::object::Payload;
use crate::world::World;

fn as_int(world: &World, id: HeapId, line: u32) -> RunResult<i64> {
    match world.objects.get(id).payload {
        Payload::Int(v) => Ok(v),
        _ => Err(TekoException::runtime(line, "expected an int")),
    }
}

fn as_real(world: &World, id: HeapId, line: u32) -> RunResult<f64> {
    match world.objects.get(id).payload {
        Payload::Real(v) => Ok(v),
        _ => Err(TekoException::runtime(line, "expected a real")),
    }
}

fn as_str<'w>(world: &'w World, id: HeapId, line: u32) -> RunResult<&'w str> {
    match &world.objects.get(id).payload {
        Payload::Str(v) => Ok(v.as_str()),
        _ => Err(TekoException::runtime(line, "expected a str")),
    }
}

fn as_bool(world: &World, id: HeapId, line: u32) -> RunResult<bool> {
    match world.objects.get(id).payload {
        Payload::Bool(v) => Ok(v),
        _ => Err(TekoException::runtime(line, "expected a bool")),
    }
}

macro_rules! int_binop {
    ($name:ident, $op:tt) => {
        pub fn $name(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
            let lhs = as_int(world, args[0], line)?;
            let rhs = as_int(world, args[1], line)?;
            Ok(world.alloc_int(lhs $op rhs))
        }
    };
}

macro_rules! real_binop {
    ($name:ident, $op:tt) => {
        pub fn $name(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
            let lhs = as_real(world, args[0], line)?;
            let rhs = as_real(world, args[1], line)?;
            Ok(world.alloc_real(lhs $op rhs))
        }
    };
}

int_binop!(int_add, +);
int_binop!(int_sub, -);
int_binop!(int_mul, *);

/// `spec.md` §4.E: "div is floor" — Rust's `/` truncates toward zero, so we
/// apply `div_euclid`-style floor correction for mixed-sign operands.
pub fn int_div(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_int(world, args[0], line)?;
    let rhs = as_int(world, args[1], line)?;
    if rhs == 0 {
        return Err(TekoException::runtime(line, "division by zero"));
    }
    Ok(world.alloc_int(lhs.div_euclid(rhs)))
}

pub fn int_mod(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_int(world, args[0], line)?;
    let rhs = as_int(world, args[1], line)?;
    if rhs == 0 {
        return Err(TekoException::runtime(line, "modulo by zero"));
    }
    Ok(world.alloc_int(lhs.rem_euclid(rhs)))
}

pub fn int_exp(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_int(world, args[0], line)?;
    let rhs = as_int(world, args[1], line)?;
    if rhs < 0 {
        return Err(TekoException::runtime(line, "negative exponent on int _exp"));
    }
    Ok(world.alloc_int(lhs.pow(rhs as u32)))
}

pub fn int_compare(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_int(world, args[0], line)?;
    let rhs = as_int(world, args[1], line)?;
    Ok(world.alloc_int(match lhs.cmp(&rhs) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}

real_binop!(real_add, +);
real_binop!(real_sub, -);
real_binop!(real_mul, *);

pub fn real_div(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_real(world, args[0], line)?;
    let rhs = as_real(world, args[1], line)?;
    if rhs == 0.0 {
        return Err(TekoException::runtime(line, "division by zero"));
    }
    Ok(world.alloc_real(lhs / rhs))
}

pub fn real_exp(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_real(world, args[0], line)?;
    let rhs = as_real(world, args[1], line)?;
    Ok(world.alloc_real(lhs.powf(rhs)))
}

pub fn real_compare(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_real(world, args[0], line)?;
    let rhs = as_real(world, args[1], line)?;
    let ordering = lhs.partial_cmp(&rhs).ok_or_else(|| TekoException::runtime(line, "NaN is not comparable"))?;
    Ok(world.alloc_int(match ordering {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}

pub fn str_add(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_str(world, args[0], line)?.to_owned();
    let rhs = as_str(world, args[1], line)?;
    Ok(world.alloc_str(lhs + rhs))
}

pub fn str_eq(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_str(world, args[0], line)?.to_owned();
    let rhs = as_str(world, args[1], line)?.to_owned();
    Ok(world.alloc_bool(lhs == rhs))
}

/// `spec.md` §4.F's bare postfix `.` conversion dispatches to `_toreal`; an
/// int is already exact, so this is a lossless widening.
pub fn int_toreal(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let v = as_int(world, args[0], line)?;
    Ok(world.alloc_real(v as f64))
}

pub fn real_toreal(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let v = as_real(world, args[0], line)?;
    Ok(world.alloc_real(v))
}

pub fn bool_and(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_bool(world, args[0], line)?;
    let rhs = as_bool(world, args[1], line)?;
    Ok(world.alloc_bool(lhs && rhs))
}

pub fn bool_or(world: &mut World, args: &[HeapId], line: u32) -> RunResult<HeapId> {
    let lhs = as_bool(world, args[0], line)?;
    let rhs = as_bool(world, args[1], line)?;
    Ok(world.alloc_bool(lhs || rhs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_div_and_mod_floor_toward_negative_infinity() {
        let mut world = crate::bootstrap::bootstrap();
        let a = world.alloc_int(-7);
        let b = world.alloc_int(2);
        let q = int_div(&mut world, &[a, b], 1).unwrap();
        let r = int_mod(&mut world, &[a, b], 1).unwrap();
        assert_eq!(as_int(&world, q, 1).unwrap(), -4);
        assert_eq!(as_int(&world, r, 1).unwrap(), 1);
    }
}
