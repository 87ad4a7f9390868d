use std::error::Error;

use vellum::api;
use vellum::ir::{EngineOptions, Linkage};
use vellum::rt::{ObjRef, collect};

fn main() -> Result<(), Box<dyn Error>> {
    let ctx = api::context_new();
    let i64t = api::type_get_int(&ctx, 64);
    let fn_ty = api::type_get_function(
        &i64t,
        &ObjRef::array(vec![i64t.clone(), i64t.clone(), i64t.clone()]),
        false,
    );
    let f = api::function_new(&fn_ty, &ObjRef::string("add3"), Linkage::External, 0);

    /* r = first + second */
    let bb = api::basic_block_new(&ObjRef::string("entry"), &ctx);
    let r = api::add_new(
        &api::function_get_arg(&f, 0),
        &api::function_get_arg(&f, 1),
        &ObjRef::string("r"),
    );
    /* s = r + third */
    let s = api::add_new(&r, &api::function_get_arg(&f, 2), &ObjRef::string("s"));
    let ret = api::ret_new(Some(&s), &ctx);
    api::basic_block_append_instruction(&r, &bb);
    api::basic_block_append_instruction(&s, &bb);
    api::basic_block_append_instruction(&ret, &bb);
    api::function_append_basic_block(&bb, &f);

    let module = api::module_new(&ObjRef::string("demo"), &ctx);
    api::module_append_function(&module, &f);
    print!("{}", api::module_print(&module).as_str());

    let engine = api::engine_create_for_module(&module, EngineOptions::default())?;
    let args = ObjRef::array(vec![
        api::generic_value_of_nat(&ObjRef::small_nat(4).unwrap(), 64),
        api::generic_value_of_nat(&ObjRef::small_nat(5).unwrap(), 64),
        api::generic_value_of_nat(&ObjRef::small_nat(6).unwrap(), 64),
    ]);
    let out = api::engine_run_function(&f, &args, &engine)?;
    println!("add3(4, 5, 6) = {:?}", api::generic_value_to_nat(&out).nat_parts());

    drop((engine, args, out, module, f, bb, ctx, i64t, fn_ty, r, s, ret));
    collect();
    Ok(())
}
