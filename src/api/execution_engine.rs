use tracing::debug;
use vellum_rt::ObjRef;

use crate::BridgeError;
use crate::ir;
use crate::ir::{EngineOptions, GenericValue};
use crate::refs;

pub use crate::ir::{EngineKind, OptLevel};

/// Builds an execution engine over the module. The engine handle is
/// exclusive and never owns the module: keep the module handle alive for as
/// long as the engine runs.
pub fn engine_create_for_module(m: &ObjRef, opts: EngineOptions) -> Result<ObjRef, BridgeError> {
    unsafe {
        let ptr = ir::engine_create_for_module(refs::to_module(m), opts)?;
        debug!(kind = %opts.kind, "created execution engine");
        Ok(refs::engine_ref(ptr))
    }
}

/// Runs a function handle with a host array of generic value handles,
/// returning a fresh generic value handle.
pub fn engine_run_function(
    f: &ObjRef,
    args: &ObjRef,
    engine: &ObjRef,
) -> Result<ObjRef, BridgeError> {
    unsafe {
        let raw_args: Vec<GenericValue> = args
            .array_items()
            .iter()
            .map(|h| (*refs::to_generic_value(h)).clone())
            .collect();
        let f = refs::to_function(f);
        debug!(function = %ir::value_name(f), "running function");
        let ret = ir::engine_run_function(refs::to_engine(engine), f, &raw_args)?;
        Ok(refs::generic_value_ref(Box::into_raw(Box::new(ret))))
    }
}
