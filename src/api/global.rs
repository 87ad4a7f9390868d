//! Property wrappers shared by every global value (functions and global
//! variables).

use vellum_rt::ObjRef;

use crate::ir;
use crate::refs;

pub use crate::ir::{AddressSignificance, DllStorageClass, ThreadLocalMode, Visibility};

pub fn global_get_linkage(g: &ObjRef) -> ir::Linkage {
    unsafe { ir::global_linkage(refs::to_value(g)) }
}

pub fn global_set_linkage(linkage: ir::Linkage, g: &ObjRef) {
    unsafe { ir::global_set_linkage(refs::to_value(g), linkage) }
}

pub fn global_get_visibility(g: &ObjRef) -> Visibility {
    unsafe { ir::global_visibility(refs::to_value(g)) }
}

pub fn global_set_visibility(visibility: Visibility, g: &ObjRef) {
    unsafe { ir::global_set_visibility(refs::to_value(g), visibility) }
}

pub fn global_get_dll_storage_class(g: &ObjRef) -> DllStorageClass {
    unsafe { ir::global_dll_storage_class(refs::to_value(g)) }
}

pub fn global_set_dll_storage_class(class: DllStorageClass, g: &ObjRef) {
    unsafe { ir::global_set_dll_storage_class(refs::to_value(g), class) }
}

pub fn global_get_thread_local_mode(g: &ObjRef) -> ThreadLocalMode {
    unsafe { ir::global_thread_local_mode(refs::to_value(g)) }
}

pub fn global_set_thread_local_mode(mode: ThreadLocalMode, g: &ObjRef) {
    unsafe { ir::global_set_thread_local_mode(refs::to_value(g), mode) }
}

pub fn global_get_address_significance(g: &ObjRef) -> AddressSignificance {
    unsafe { ir::global_address_significance(refs::to_value(g)) }
}

pub fn global_set_address_significance(sig: AddressSignificance, g: &ObjRef) {
    unsafe { ir::global_set_address_significance(refs::to_value(g), sig) }
}

pub fn global_get_address_space(g: &ObjRef) -> u32 {
    unsafe { ir::global_address_space(refs::to_value(g)) }
}

pub fn global_has_section(g: &ObjRef) -> bool {
    unsafe { ir::global_has_section(refs::to_value(g)) }
}

/// The explicit linker section, or the empty string when there is none.
pub fn global_get_section(g: &ObjRef) -> ObjRef {
    ObjRef::string(unsafe { ir::global_section(refs::to_value(g)) })
}

/// Sets the linker section; the empty string removes it.
pub fn global_set_section(section: &ObjRef, g: &ObjRef) {
    unsafe { ir::global_set_section(refs::to_value(g), section.as_str()) }
}

/// The explicit power-of-two alignment, or zero when undefined.
pub fn global_get_alignment(g: &ObjRef) -> u64 {
    unsafe { ir::global_alignment(refs::to_value(g)) }
}

/// Sets the explicit alignment; zero removes it.
pub fn global_set_alignment(alignment: u64, g: &ObjRef) {
    unsafe { ir::global_set_alignment(refs::to_value(g), alignment) }
}
