//! A small IR object library with manual memory management.
//!
//! This is the foreign side of the vellum boundary: an object graph of
//! contexts, modules, types, and values reached through raw pointers, with
//! ownership fixed by the graph itself. Contexts own types and constants,
//! modules own functions and globals, functions own blocks and arguments,
//! and blocks own instructions. Detached values belong to whoever created
//! them until they are appended somewhere.
//!
//! Every entry point is `unsafe`: pointer validity and single-threaded use
//! of any one context are the caller's obligations. The companion bridge
//! crate discharges them with collector-tracked handles.

mod apint;
mod buffer;
mod context;
mod engine;
mod module;
mod value;

pub use apint::{APINT_WORD_BITS, ApInt};
pub use buffer::{
    MemoryBuffer, buffer_data, buffer_dispose, buffer_from_bytes, buffer_from_file, buffer_size,
};
pub use context::{
    Context, Type, TypeId, const_all_ones, const_int, const_int_value, const_null, context_create,
    context_dispose, type_context, type_double, type_float, type_function, type_function_is_vararg,
    type_function_params, type_function_return, type_half, type_id, type_int, type_int_width,
    type_pointer, type_void,
};
pub use engine::{
    Engine, EngineError, EngineKind, EngineOptions, GenericValue, OptLevel,
    engine_create_for_module, engine_dispose, engine_module, engine_opt_level,
    engine_run_function,
};
pub use module::{
    Module, module_append_function, module_append_global, module_context, module_create,
    module_dispose, module_get_function, module_identifier, module_print, module_set_identifier,
};
pub use value::{
    AddressSignificance, DllStorageClass, Linkage, ThreadLocalMode, Value, Visibility, add_create,
    block_append_instruction, block_create, block_instructions, function_append_block,
    function_arg, function_arg_count, function_blocks, function_create, global_address_significance,
    global_address_space, global_alignment, global_dll_storage_class, global_has_section,
    global_linkage, global_section, global_set_address_significance, global_set_alignment,
    global_set_dll_storage_class, global_set_linkage, global_set_section,
    global_set_thread_local_mode, global_set_visibility, global_thread_local_mode,
    global_variable_create, global_variable_has_initializer, global_variable_initializer,
    global_variable_is_constant, global_variable_is_externally_initialized,
    global_variable_remove_initializer, global_variable_set_constant,
    global_variable_set_externally_initialized, global_variable_set_initializer,
    global_visibility, ret_create, ret_value, value_context, value_has_name, value_is_block,
    value_is_constant_int, value_is_function, value_is_global_variable, value_is_instruction,
    value_name, value_print, value_set_name, value_type,
};
