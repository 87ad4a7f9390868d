//! Generic values and the interpreter-backed execution engine.
//!
//! The engine borrows its module: disposal never frees the module, so the
//! module's owner is responsible for keeping it alive across runs.

use std::collections::HashMap;

use derive_more::{Display, TryFrom};
use thiserror::Error;

use crate::apint::ApInt;
use crate::module::Module;
use crate::value::{Inst, Value, ValueKind, value_name};

/// Opaque scratch value moved in and out of engine runs.
#[derive(Clone, Debug, Default)]
pub struct GenericValue {
    pub int_val: Option<ApInt>,
    pub double_val: f64,
    pub aggregate: Vec<GenericValue>,
}

#[derive(TryFrom, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[try_from(repr)]
#[repr(u8)]
pub enum EngineKind {
    Either = 0,
    Jit = 1,
    Interpreter = 2,
}

#[derive(TryFrom, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[try_from(repr)]
#[repr(u8)]
pub enum OptLevel {
    None = 0,
    Less = 1,
    Default = 2,
    Aggressive = 3,
}

#[derive(Clone, Copy, Debug)]
pub struct EngineOptions {
    pub kind: EngineKind,
    pub opt_level: OptLevel,
    pub verify: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            kind: EngineKind::Either,
            opt_level: OptLevel::Default,
            verify: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("engine kind {0} is not available")]
    UnsupportedKind(EngineKind),
    #[error("module verification failed: {0}")]
    Verify(String),
    #[error("function @{0} has no body")]
    NoBody(String),
    #[error("argument count mismatch: expected {expected}, got {got}")]
    ArgCount { expected: usize, got: usize },
    #[error("interpreter cannot evaluate: {0}")]
    Unsupported(String),
}

pub struct Engine {
    module: *mut Module,
    opt_level: OptLevel,
}

/// Builds an engine over `module`. Fails when only the unavailable jit
/// backend is acceptable, or when verification is requested and finds a
/// block without a terminator.
pub unsafe fn engine_create_for_module(
    module: *mut Module,
    opts: EngineOptions,
) -> Result<*mut Engine, EngineError> {
    if opts.kind == EngineKind::Jit {
        return Err(EngineError::UnsupportedKind(EngineKind::Jit));
    }
    if opts.verify {
        unsafe { verify_module(module)? };
    }
    Ok(Box::into_raw(Box::new(Engine {
        module,
        opt_level: opts.opt_level,
    })))
}

/// Frees the engine. The module stays alive.
pub unsafe fn engine_dispose(e: *mut Engine) {
    unsafe { drop(Box::from_raw(e)) }
}

pub unsafe fn engine_module(e: *mut Engine) -> *mut Module {
    unsafe { (*e).module }
}

pub unsafe fn engine_opt_level(e: *mut Engine) -> OptLevel {
    unsafe { (*e).opt_level }
}

unsafe fn verify_module(module: *mut Module) -> Result<(), EngineError> {
    unsafe {
        for &f in &(*module).functions {
            let ValueKind::Function(data) = &(*f).kind else {
                continue;
            };
            for &b in &data.blocks {
                let ValueKind::Block(block) = &(*b).kind else {
                    continue;
                };
                let terminated = block
                    .insts
                    .last()
                    .is_some_and(|&i| matches!((*i).kind, ValueKind::Inst(Inst::Ret(_))));
                if !terminated {
                    return Err(EngineError::Verify(format!(
                        "block in @{} lacks a terminator",
                        value_name(f)
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Runs `f` in the interpreter over the entry block.
pub unsafe fn engine_run_function(
    e: *mut Engine,
    f: *mut Value,
    args: &[GenericValue],
) -> Result<GenericValue, EngineError> {
    unsafe {
        debug_assert!(
            (*(*e).module).functions.contains(&f),
            "function is not owned by the engine's module"
        );
        let data = match &(*f).kind {
            ValueKind::Function(data) => data,
            _ => panic!("running a non-function"),
        };
        if data.args.len() != args.len() {
            return Err(EngineError::ArgCount {
                expected: data.args.len(),
                got: args.len(),
            });
        }
        let Some(&entry) = data.blocks.first() else {
            return Err(EngineError::NoBody(value_name(f)));
        };
        let ValueKind::Block(block) = &(*entry).kind else {
            return Err(EngineError::Unsupported("entry is not a block".into()));
        };

        let mut env: HashMap<usize, ApInt> = HashMap::new();
        for &inst in &block.insts {
            match &(*inst).kind {
                ValueKind::Inst(Inst::Add { lhs, rhs }) => {
                    let l = resolve_int(*lhs, args, &env)?;
                    let r = resolve_int(*rhs, args, &env)?;
                    env.insert(inst as usize, l.wrapping_add(&r));
                }
                ValueKind::Inst(Inst::Ret(None)) => return Ok(GenericValue::default()),
                ValueKind::Inst(Inst::Ret(Some(v))) => {
                    let out = resolve_int(*v, args, &env)?;
                    return Ok(GenericValue {
                        int_val: Some(out),
                        ..GenericValue::default()
                    });
                }
                _ => {
                    return Err(EngineError::Unsupported(format!(
                        "instruction `{}`",
                        (*inst).render()
                    )));
                }
            }
        }
        Err(EngineError::Unsupported("block fell off the end".into()))
    }
}

unsafe fn resolve_int(
    v: *mut Value,
    args: &[GenericValue],
    env: &HashMap<usize, ApInt>,
) -> Result<ApInt, EngineError> {
    unsafe {
        match &(*v).kind {
            ValueKind::ConstInt(ap) => Ok(ap.clone()),
            ValueKind::Argument { index } => args[*index as usize]
                .int_val
                .clone()
                .ok_or_else(|| EngineError::Unsupported("non-integer argument".into())),
            ValueKind::Inst(_) => env
                .get(&(v as usize))
                .cloned()
                .ok_or_else(|| EngineError::Unsupported("use before definition".into())),
            _ => Err(EngineError::Unsupported(format!(
                "operand `{}`",
                (*v).render_operand()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{const_int, context_create, context_dispose, type_function, type_int};
    use crate::module::{module_append_function, module_create, module_dispose};
    use crate::value::{
        Linkage, add_create, block_append_instruction, block_create, function_append_block,
        function_arg, function_create, ret_create,
    };

    unsafe fn add2_module() -> (*mut crate::context::Context, *mut Module, *mut Value) {
        unsafe {
            let ctx = context_create();
            let i64t = type_int(ctx, 64);
            let fty = type_function(i64t, &[i64t, i64t], false);
            let f = function_create(fty, "add2", Linkage::External, 0);
            let bb = block_create(ctx, "entry");
            let sum = add_create(function_arg(f, 0), function_arg(f, 1), "sum");
            let ret = ret_create(ctx, Some(sum));
            block_append_instruction(bb, sum);
            block_append_instruction(bb, ret);
            function_append_block(f, bb);
            let m = module_create("demo", ctx);
            module_append_function(m, f);
            (ctx, m, f)
        }
    }

    fn int_arg(bits: u32, v: u64) -> GenericValue {
        GenericValue {
            int_val: Some(ApInt::new(bits, v, false)),
            ..GenericValue::default()
        }
    }

    #[test]
    fn interpreter_adds_arguments() {
        unsafe {
            let (ctx, m, f) = add2_module();
            let e = engine_create_for_module(m, EngineOptions::default()).unwrap();
            assert_eq!(engine_opt_level(e), OptLevel::Default);
            assert_eq!(engine_module(e), m);
            let out = engine_run_function(e, f, &[int_arg(64, 40), int_arg(64, 2)]).unwrap();
            assert_eq!(out.int_val.unwrap().zext_u64(), 42);
            engine_dispose(e);
            module_dispose(m);
            context_dispose(ctx);
        }
    }

    #[test]
    fn constants_feed_returns() {
        unsafe {
            let ctx = context_create();
            let i32t = type_int(ctx, 32);
            let fty = type_function(i32t, &[], false);
            let f = function_create(fty, "konst", Linkage::External, 0);
            let bb = block_create(ctx, "entry");
            let ret = ret_create(ctx, Some(const_int(i32t, ApInt::new(32, 9, false))));
            block_append_instruction(bb, ret);
            function_append_block(f, bb);
            let m = module_create("demo", ctx);
            module_append_function(m, f);
            let e = engine_create_for_module(m, EngineOptions::default()).unwrap();
            let out = engine_run_function(e, f, &[]).unwrap();
            assert_eq!(out.int_val.unwrap().zext_u64(), 9);
            engine_dispose(e);
            module_dispose(m);
            context_dispose(ctx);
        }
    }

    #[test]
    fn jit_only_request_is_rejected() {
        unsafe {
            let ctx = context_create();
            let m = module_create("demo", ctx);
            let opts = EngineOptions {
                kind: EngineKind::Jit,
                ..EngineOptions::default()
            };
            let err = engine_create_for_module(m, opts).unwrap_err();
            assert!(matches!(err, EngineError::UnsupportedKind(EngineKind::Jit)));
            module_dispose(m);
            context_dispose(ctx);
        }
    }

    #[test]
    fn verify_rejects_unterminated_blocks() {
        unsafe {
            let ctx = context_create();
            let i64t = type_int(ctx, 64);
            let fty = type_function(i64t, &[i64t], false);
            let f = function_create(fty, "open", Linkage::External, 0);
            let bb = block_create(ctx, "entry");
            function_append_block(f, bb);
            let m = module_create("demo", ctx);
            module_append_function(m, f);
            let err = engine_create_for_module(m, EngineOptions::default()).unwrap_err();
            assert!(matches!(err, EngineError::Verify(_)));
            module_dispose(m);
            context_dispose(ctx);
        }
    }

    #[test]
    fn declarations_cannot_run() {
        unsafe {
            let ctx = context_create();
            let i64t = type_int(ctx, 64);
            let fty = type_function(i64t, &[], false);
            let f = function_create(fty, "ext", Linkage::External, 0);
            let m = module_create("demo", ctx);
            module_append_function(m, f);
            let e = engine_create_for_module(m, EngineOptions::default()).unwrap();
            let err = engine_run_function(e, f, &[]).unwrap_err();
            assert!(matches!(err, EngineError::NoBody(_)));
            engine_dispose(e);
            module_dispose(m);
            context_dispose(ctx);
        }
    }
}
