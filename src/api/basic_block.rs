use vellum_rt::ObjRef;

use crate::handles::copy_anchor;
use crate::ir;
use crate::refs;

/// A detached, empty basic block anchored to the context handle.
pub fn basic_block_new(name: &ObjRef, ctx: &ObjRef) -> ObjRef {
    unsafe {
        let bb = ir::block_create(refs::to_context(ctx), name.as_str());
        refs::value_ref(ctx.clone(), bb)
    }
}

/// The block's instructions, as a host array of value handles sharing the
/// block's anchor.
pub fn basic_block_get_instructions(bb: &ObjRef) -> ObjRef {
    unsafe {
        let insts = ir::block_instructions(refs::to_block(bb));
        ObjRef::array(
            insts
                .into_iter()
                .map(|i| refs::value_ref(copy_anchor(bb), i))
                .collect(),
        )
    }
}

/// Appends the instruction, transferring its foreign ownership to the block.
pub fn basic_block_append_instruction(inst: &ObjRef, bb: &ObjRef) {
    unsafe { ir::block_append_instruction(refs::to_block(bb), refs::to_instruction(inst)) }
}
