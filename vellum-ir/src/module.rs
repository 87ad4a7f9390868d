//! Modules: named containers that own functions and global variables.

use crate::context::Context;
use crate::value::{Value, value_is_function, value_is_global_variable, value_name};

pub struct Module {
    pub(crate) id: String,
    pub(crate) ctx: *mut Context,
    /// Owned; freed on drop, recursively tearing down blocks and
    /// instructions.
    pub(crate) functions: Vec<*mut Value>,
    pub(crate) globals: Vec<*mut Value>,
}

impl Drop for Module {
    fn drop(&mut self) {
        unsafe {
            for &f in &self.functions {
                drop(Box::from_raw(f));
            }
            for &g in &self.globals {
                drop(Box::from_raw(g));
            }
        }
    }
}

pub unsafe fn module_create(name: &str, ctx: *mut Context) -> *mut Module {
    Box::into_raw(Box::new(Module {
        id: name.to_string(),
        ctx,
        functions: Vec::new(),
        globals: Vec::new(),
    }))
}

/// Frees the module and everything it owns. The context is untouched.
pub unsafe fn module_dispose(m: *mut Module) {
    unsafe { drop(Box::from_raw(m)) }
}

pub unsafe fn module_context(m: *mut Module) -> *mut Context {
    unsafe { (*m).ctx }
}

pub unsafe fn module_identifier(m: *mut Module) -> String {
    unsafe { (*m).id.clone() }
}

pub unsafe fn module_set_identifier(m: *mut Module, name: &str) {
    unsafe {
        (*m).id = name.to_string();
    }
}

/// Appends a function, transferring ownership of it to the module.
pub unsafe fn module_append_function(m: *mut Module, f: *mut Value) {
    unsafe {
        assert!(value_is_function(f), "appending a non-function");
        (*m).functions.push(f);
    }
}

/// Appends a global variable, transferring ownership of it to the module.
pub unsafe fn module_append_global(m: *mut Module, g: *mut Value) {
    unsafe {
        assert!(value_is_global_variable(g), "appending a non-global");
        (*m).globals.push(g);
    }
}

pub unsafe fn module_get_function(m: *mut Module, name: &str) -> Option<*mut Value> {
    unsafe {
        (*m).functions
            .iter()
            .copied()
            .find(|&f| value_name(f) == name)
    }
}

pub unsafe fn module_print(m: *mut Module) -> String {
    unsafe {
        let mut out = format!("; ModuleID = '{}'\n", (*m).id);
        for &g in &(*m).globals {
            out.push('\n');
            out.push_str(&(*g).render());
        }
        for &f in &(*m).functions {
            out.push('\n');
            out.push_str(&(*f).render());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{context_create, context_dispose, type_function, type_int};
    use crate::value::{Linkage, function_create};

    #[test]
    fn identifier_round_trip() {
        unsafe {
            let ctx = context_create();
            let m = module_create("demo", ctx);
            assert_eq!(module_identifier(m), "demo");
            module_set_identifier(m, "renamed");
            assert_eq!(module_identifier(m), "renamed");
            assert_eq!(module_context(m), ctx);
            module_dispose(m);
            context_dispose(ctx);
        }
    }

    #[test]
    fn lookup_finds_appended_functions() {
        unsafe {
            let ctx = context_create();
            let m = module_create("demo", ctx);
            let i32t = type_int(ctx, 32);
            let fty = type_function(i32t, &[], false);
            let f = function_create(fty, "f", Linkage::External, 0);
            module_append_function(m, f);
            assert_eq!(module_get_function(m, "f"), Some(f));
            assert_eq!(module_get_function(m, "g"), None);
            module_dispose(m);
            context_dispose(ctx);
        }
    }

    #[test]
    fn print_lists_declarations() {
        unsafe {
            let ctx = context_create();
            let m = module_create("demo", ctx);
            let i32t = type_int(ctx, 32);
            let fty = type_function(i32t, &[i32t], false);
            module_append_function(m, function_create(fty, "inc", Linkage::External, 0));
            let text = module_print(m);
            assert!(text.contains("; ModuleID = 'demo'"), "{text}");
            assert!(text.contains("declare i32 @inc(i32 %0)"), "{text}");
            module_dispose(m);
            context_dispose(ctx);
        }
    }
}
