//! Contexts and the types they intern.
//!
//! A context owns every type and constant created within it; disposing the
//! context frees them all. Types are interned, so requesting the same shape
//! twice yields the same pointer. All entry points take raw pointers and are
//! unsafe: callers guarantee the context outlives every pointer derived from
//! it, which is exactly the contract the bridge's anchors enforce.

use std::collections::HashMap;

use crate::apint::ApInt;
use crate::value::{Value, ValueKind};

pub struct Context {
    /// Every type allocated in this context, freed on drop.
    types: Vec<*mut Type>,
    int_types: HashMap<u32, *mut Type>,
    ptr_types: HashMap<u32, *mut Type>,
    simple_types: HashMap<TypeId, *mut Type>,
    fn_types: Vec<*mut Type>,
    /// Interned constants, freed on drop.
    constants: Vec<*mut Value>,
}

impl Drop for Context {
    fn drop(&mut self) {
        unsafe {
            for &c in &self.constants {
                drop(Box::from_raw(c));
            }
            for &t in &self.types {
                drop(Box::from_raw(t));
            }
        }
    }
}

/// Discriminant of a type, as surfaced to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum TypeId {
    Void = 0,
    Half = 1,
    Float = 2,
    Double = 3,
    Integer = 4,
    Pointer = 5,
    Function = 6,
}

pub struct Type {
    pub(crate) kind: TypeKind,
    pub(crate) ctx: *mut Context,
}

pub(crate) enum TypeKind {
    Void,
    Half,
    Float,
    Double,
    Int(u32),
    Ptr(u32),
    Fn {
        ret: *mut Type,
        params: Vec<*mut Type>,
        vararg: bool,
    },
}

impl Type {
    pub(crate) fn id(&self) -> TypeId {
        match self.kind {
            TypeKind::Void => TypeId::Void,
            TypeKind::Half => TypeId::Half,
            TypeKind::Float => TypeId::Float,
            TypeKind::Double => TypeId::Double,
            TypeKind::Int(_) => TypeId::Integer,
            TypeKind::Ptr(_) => TypeId::Pointer,
            TypeKind::Fn { .. } => TypeId::Function,
        }
    }

    pub(crate) fn render(&self) -> String {
        match &self.kind {
            TypeKind::Void => "void".into(),
            TypeKind::Half => "half".into(),
            TypeKind::Float => "float".into(),
            TypeKind::Double => "double".into(),
            TypeKind::Int(w) => format!("i{w}"),
            TypeKind::Ptr(0) => "ptr".into(),
            TypeKind::Ptr(space) => format!("ptr addrspace({space})"),
            TypeKind::Fn { ret, params, vararg } => unsafe {
                let mut s = format!("{} (", (**ret).render());
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        s.push_str(", ");
                    }
                    s.push_str(&(**p).render());
                }
                if *vararg {
                    if !params.is_empty() {
                        s.push_str(", ");
                    }
                    s.push_str("...");
                }
                s.push(')');
                s
            },
        }
    }
}

/// Allocates a fresh, empty context.
pub unsafe fn context_create() -> *mut Context {
    Box::into_raw(Box::new(Context {
        types: Vec::new(),
        int_types: HashMap::new(),
        ptr_types: HashMap::new(),
        simple_types: HashMap::new(),
        fn_types: Vec::new(),
        constants: Vec::new(),
    }))
}

/// Frees the context and everything it owns. Every type, constant, and
/// detached value pointer derived from it is dead after this call.
pub unsafe fn context_dispose(ctx: *mut Context) {
    unsafe { drop(Box::from_raw(ctx)) }
}

impl Context {
    fn intern(&mut self, ctx: *mut Context, kind: TypeKind) -> *mut Type {
        let p = Box::into_raw(Box::new(Type { kind, ctx }));
        self.types.push(p);
        p
    }

    fn simple(&mut self, ctx: *mut Context, id: TypeId, kind: TypeKind) -> *mut Type {
        if let Some(&p) = self.simple_types.get(&id) {
            return p;
        }
        let p = self.intern(ctx, kind);
        self.simple_types.insert(id, p);
        p
    }
}

pub unsafe fn type_void(ctx: *mut Context) -> *mut Type {
    unsafe { (*ctx).simple(ctx, TypeId::Void, TypeKind::Void) }
}

pub unsafe fn type_half(ctx: *mut Context) -> *mut Type {
    unsafe { (*ctx).simple(ctx, TypeId::Half, TypeKind::Half) }
}

pub unsafe fn type_float(ctx: *mut Context) -> *mut Type {
    unsafe { (*ctx).simple(ctx, TypeId::Float, TypeKind::Float) }
}

pub unsafe fn type_double(ctx: *mut Context) -> *mut Type {
    unsafe { (*ctx).simple(ctx, TypeId::Double, TypeKind::Double) }
}

pub unsafe fn type_int(ctx: *mut Context, width: u32) -> *mut Type {
    assert!(width > 0, "zero-width integer type");
    unsafe {
        if let Some(&p) = (*ctx).int_types.get(&width) {
            return p;
        }
        let p = (*ctx).intern(ctx, TypeKind::Int(width));
        (*ctx).int_types.insert(width, p);
        p
    }
}

pub unsafe fn type_pointer(ctx: *mut Context, addr_space: u32) -> *mut Type {
    unsafe {
        if let Some(&p) = (*ctx).ptr_types.get(&addr_space) {
            return p;
        }
        let p = (*ctx).intern(ctx, TypeKind::Ptr(addr_space));
        (*ctx).ptr_types.insert(addr_space, p);
        p
    }
}

pub unsafe fn type_function(ret: *mut Type, params: &[*mut Type], vararg: bool) -> *mut Type {
    unsafe {
        let ctx = (*ret).ctx;
        for &p in (*ctx).fn_types.iter() {
            if let TypeKind::Fn { ret: r, params: ps, vararg: v } = &(*p).kind {
                if *r == ret && ps == params && *v == vararg {
                    return p;
                }
            }
        }
        let p = (*ctx).intern(
            ctx,
            TypeKind::Fn {
                ret,
                params: params.to_vec(),
                vararg,
            },
        );
        (*ctx).fn_types.push(p);
        p
    }
}

pub unsafe fn type_context(ty: *mut Type) -> *mut Context {
    unsafe { (*ty).ctx }
}

pub unsafe fn type_id(ty: *mut Type) -> TypeId {
    unsafe { (*ty).id() }
}

/// Bit width of an integer type.
pub unsafe fn type_int_width(ty: *mut Type) -> u32 {
    unsafe {
        match (*ty).kind {
            TypeKind::Int(w) => w,
            _ => panic!("not an integer type"),
        }
    }
}

pub unsafe fn type_function_return(ty: *mut Type) -> *mut Type {
    unsafe {
        match &(*ty).kind {
            TypeKind::Fn { ret, .. } => *ret,
            _ => panic!("not a function type"),
        }
    }
}

pub unsafe fn type_function_params(ty: *mut Type) -> Vec<*mut Type> {
    unsafe {
        match &(*ty).kind {
            TypeKind::Fn { params, .. } => params.clone(),
            _ => panic!("not a function type"),
        }
    }
}

pub unsafe fn type_function_is_vararg(ty: *mut Type) -> bool {
    unsafe {
        match &(*ty).kind {
            TypeKind::Fn { vararg, .. } => *vararg,
            _ => panic!("not a function type"),
        }
    }
}

// ---- context-owned constants ---------------------------------------------

pub(crate) unsafe fn intern_constant(ctx: *mut Context, value: Value) -> *mut Value {
    unsafe {
        let p = Box::into_raw(Box::new(value));
        (*ctx).constants.push(p);
        p
    }
}

/// The interned integer constant of `ty`'s width with the given value.
pub unsafe fn const_int(ty: *mut Type, val: ApInt) -> *mut Value {
    unsafe {
        let ctx = (*ty).ctx;
        assert_eq!(val.bit_width(), type_int_width(ty), "constant width mismatch");
        for &c in (*ctx).constants.iter() {
            if let ValueKind::ConstInt(existing) = &(*c).kind {
                if (*c).ty == ty && *existing == val {
                    return c;
                }
            }
        }
        intern_constant(ctx, Value::new(ty, ValueKind::ConstInt(val)))
    }
}

/// The null (all-zeros) constant of a type.
pub unsafe fn const_null(ty: *mut Type) -> *mut Value {
    unsafe {
        match (*ty).kind {
            TypeKind::Int(w) => const_int(ty, ApInt::zero(w)),
            _ => find_or_intern_marker(ty, false),
        }
    }
}

/// The all-ones constant of a type.
pub unsafe fn const_all_ones(ty: *mut Type) -> *mut Value {
    unsafe {
        match (*ty).kind {
            TypeKind::Int(w) => const_int(ty, ApInt::all_ones(w)),
            _ => find_or_intern_marker(ty, true),
        }
    }
}

unsafe fn find_or_intern_marker(ty: *mut Type, ones: bool) -> *mut Value {
    unsafe {
        let want = if ones {
            ValueKind::ConstAllOnes
        } else {
            ValueKind::ConstNull
        };
        let ctx = (*ty).ctx;
        for &c in (*ctx).constants.iter() {
            if (*c).ty == ty && std::mem::discriminant(&(*c).kind) == std::mem::discriminant(&want)
            {
                return c;
            }
        }
        intern_constant(ctx, Value::new(ty, want))
    }
}

/// The `ApInt` held by an integer constant.
pub unsafe fn const_int_value(val: *mut Value) -> ApInt {
    unsafe {
        match &(*val).kind {
            ValueKind::ConstInt(ap) => ap.clone(),
            ValueKind::ConstNull => ApInt::zero(type_int_width((*val).ty)),
            ValueKind::ConstAllOnes => ApInt::all_ones(type_int_width((*val).ty)),
            _ => panic!("not an integer constant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_are_interned_per_context() {
        unsafe {
            let ctx = context_create();
            assert_eq!(type_int(ctx, 32), type_int(ctx, 32));
            assert_ne!(type_int(ctx, 32), type_int(ctx, 64));
            assert_eq!(type_void(ctx), type_void(ctx));
            let f1 = type_function(type_int(ctx, 8), &[type_double(ctx)], false);
            let f2 = type_function(type_int(ctx, 8), &[type_double(ctx)], false);
            assert_eq!(f1, f2);
            assert_ne!(f1, type_function(type_int(ctx, 8), &[type_double(ctx)], true));
            context_dispose(ctx);
        }
    }

    #[test]
    fn distinct_contexts_do_not_share_types() {
        unsafe {
            let a = context_create();
            let b = context_create();
            assert_ne!(type_int(a, 32), type_int(b, 32));
            context_dispose(a);
            context_dispose(b);
        }
    }

    #[test]
    fn integer_constants_are_interned() {
        unsafe {
            let ctx = context_create();
            let i32t = type_int(ctx, 32);
            let a = const_int(i32t, ApInt::new(32, 7, false));
            let b = const_int(i32t, ApInt::new(32, 7, false));
            assert_eq!(a, b);
            assert_eq!(const_int_value(a).zext_u64(), 7);
            // null of an integer type folds to the zero constant
            assert_eq!(const_null(i32t), const_int(i32t, ApInt::zero(32)));
            assert_eq!(const_int_value(const_all_ones(i32t)), ApInt::all_ones(32));
            context_dispose(ctx);
        }
    }
}
