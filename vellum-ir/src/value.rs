//! Values: constants, arguments, instructions, blocks, functions, globals.
//!
//! Every value shares one header (kind, type, name) and is addressed through
//! `*mut Value`, with downcasts asserted at the accessors. Ownership follows
//! the graph: functions own their arguments and blocks, blocks own their
//! instructions, and global variables' initializers stay context-owned.
//! Instructions and blocks are created detached; whoever appends them
//! transfers ownership, and a value that is never appended is never freed.

use derive_more::{Display, TryFrom};

use crate::apint::ApInt;
use crate::context::{Context, Type, TypeKind, type_int_width, type_void};

pub struct Value {
    pub(crate) kind: ValueKind,
    pub(crate) ty: *mut Type,
    pub(crate) name: String,
}

pub(crate) enum ValueKind {
    ConstInt(ApInt),
    ConstNull,
    ConstAllOnes,
    Argument { index: u32 },
    Inst(Inst),
    Block(BlockData),
    Function(FunctionData),
    Global(GlobalData),
}

pub(crate) enum Inst {
    Ret(Option<*mut Value>),
    Add { lhs: *mut Value, rhs: *mut Value },
}

pub(crate) struct BlockData {
    pub(crate) insts: Vec<*mut Value>,
}

impl Drop for BlockData {
    fn drop(&mut self) {
        unsafe {
            for &i in &self.insts {
                drop(Box::from_raw(i));
            }
        }
    }
}

pub(crate) struct FunctionData {
    pub(crate) props: GlobalProps,
    pub(crate) args: Vec<*mut Value>,
    pub(crate) blocks: Vec<*mut Value>,
}

impl Drop for FunctionData {
    fn drop(&mut self) {
        unsafe {
            for &b in &self.blocks {
                drop(Box::from_raw(b));
            }
            for &a in &self.args {
                drop(Box::from_raw(a));
            }
        }
    }
}

pub(crate) struct GlobalData {
    pub(crate) props: GlobalProps,
    pub(crate) is_constant: bool,
    /// Context-owned constant; never freed here.
    pub(crate) initializer: Option<*mut Value>,
    pub(crate) externally_initialized: bool,
}

/// Properties common to every global value (functions and variables).
pub(crate) struct GlobalProps {
    pub(crate) linkage: Linkage,
    pub(crate) visibility: Visibility,
    pub(crate) dll_storage: DllStorageClass,
    pub(crate) tls_mode: ThreadLocalMode,
    pub(crate) addr_significance: AddressSignificance,
    pub(crate) addr_space: u32,
    pub(crate) section: String,
    pub(crate) alignment: u64,
}

impl GlobalProps {
    fn new(linkage: Linkage, tls_mode: ThreadLocalMode, addr_space: u32) -> GlobalProps {
        GlobalProps {
            linkage,
            visibility: Visibility::Default,
            dll_storage: DllStorageClass::Default,
            tls_mode,
            addr_significance: AddressSignificance::None,
            addr_space,
            section: String::new(),
            alignment: 0,
        }
    }
}

#[derive(TryFrom, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[try_from(repr)]
#[repr(u8)]
pub enum Linkage {
    External = 0,
    AvailableExternally = 1,
    LinkOnceAny = 2,
    LinkOnceOdr = 3,
    WeakAny = 4,
    WeakOdr = 5,
    Appending = 6,
    Internal = 7,
    Private = 8,
    ExternalWeak = 9,
    Common = 10,
}

#[derive(TryFrom, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[try_from(repr)]
#[repr(u8)]
pub enum Visibility {
    Default = 0,
    Hidden = 1,
    Protected = 2,
}

#[derive(TryFrom, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[try_from(repr)]
#[repr(u8)]
pub enum DllStorageClass {
    Default = 0,
    Import = 1,
    Export = 2,
}

#[derive(TryFrom, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[try_from(repr)]
#[repr(u8)]
pub enum ThreadLocalMode {
    NotThreadLocal = 0,
    GeneralDynamic = 1,
    LocalDynamic = 2,
    InitialExec = 3,
    LocalExec = 4,
}

#[derive(TryFrom, Display, Clone, Copy, Debug, PartialEq, Eq)]
#[try_from(repr)]
#[repr(u8)]
pub enum AddressSignificance {
    None = 0,
    Local = 1,
    Global = 2,
}

impl Value {
    pub(crate) fn new(ty: *mut Type, kind: ValueKind) -> Value {
        Value {
            kind,
            ty,
            name: String::new(),
        }
    }

    pub(crate) fn render_operand(&self) -> String {
        match &self.kind {
            ValueKind::ConstInt(ap) => format!("{ap}"),
            ValueKind::ConstNull => "zeroinitializer".into(),
            ValueKind::ConstAllOnes => "allones".into(),
            ValueKind::Function(_) | ValueKind::Global(_) => format!("@{}", self.name),
            _ if self.name.is_empty() => "%?".into(),
            _ => format!("%{}", self.name),
        }
    }

    pub(crate) fn render(&self) -> String {
        unsafe {
            match &self.kind {
                ValueKind::ConstInt(ap) => format!("{} {}", (*self.ty).render(), ap),
                ValueKind::ConstNull => format!("{} zeroinitializer", (*self.ty).render()),
                ValueKind::ConstAllOnes => format!("{} allones", (*self.ty).render()),
                ValueKind::Argument { .. } => {
                    format!("{} %{}", (*self.ty).render(), self.name)
                }
                ValueKind::Inst(Inst::Ret(None)) => "ret void".into(),
                ValueKind::Inst(Inst::Ret(Some(v))) => {
                    format!("ret {} {}", (*(**v).ty).render(), (**v).render_operand())
                }
                ValueKind::Inst(Inst::Add { lhs, rhs }) => format!(
                    "%{} = add {} {}, {}",
                    self.name,
                    (*(**lhs).ty).render(),
                    (**lhs).render_operand(),
                    (**rhs).render_operand()
                ),
                ValueKind::Block(data) => {
                    let label = if self.name.is_empty() {
                        "bb"
                    } else {
                        self.name.as_str()
                    };
                    let mut s = format!("{label}:");
                    for &i in &data.insts {
                        s.push_str("\n  ");
                        s.push_str(&(*i).render());
                    }
                    s
                }
                ValueKind::Function(data) => {
                    let keyword = if data.blocks.is_empty() {
                        "declare"
                    } else {
                        "define"
                    };
                    let ret = match &(*self.ty).kind {
                        TypeKind::Fn { ret, .. } => (**ret).render(),
                        _ => "?".into(),
                    };
                    let mut s = format!("{keyword} {ret} @{}(", self.name);
                    for (i, &a) in data.args.iter().enumerate() {
                        if i > 0 {
                            s.push_str(", ");
                        }
                        s.push_str(&(*(*a).ty).render());
                        s.push_str(" %");
                        s.push_str(&(*a).name);
                    }
                    s.push(')');
                    if !data.blocks.is_empty() {
                        s.push_str(" {\n");
                        for &b in &data.blocks {
                            s.push_str(&(*b).render());
                            s.push('\n');
                        }
                        s.push('}');
                    }
                    s
                }
                ValueKind::Global(data) => {
                    let kw = if data.is_constant { "constant" } else { "global" };
                    let mut s = format!("@{} = {} {}", self.name, kw, (*self.ty).render());
                    if let Some(init) = data.initializer {
                        s.push(' ');
                        s.push_str(&(*init).render_operand());
                    }
                    s
                }
            }
        }
    }
}

// ---- common value operations ---------------------------------------------

pub unsafe fn value_type(v: *mut Value) -> *mut Type {
    unsafe { (*v).ty }
}

pub unsafe fn value_context(v: *mut Value) -> *mut Context {
    unsafe { (*(*v).ty).ctx }
}

pub unsafe fn value_has_name(v: *mut Value) -> bool {
    unsafe { !(&(*v).name).is_empty() }
}

pub unsafe fn value_name(v: *mut Value) -> String {
    unsafe { (*v).name.clone() }
}

/// Sets the value's name; the empty string removes it.
pub unsafe fn value_set_name(v: *mut Value, name: &str) {
    unsafe {
        (*v).name = name.to_string();
    }
}

pub unsafe fn value_print(v: *mut Value) -> String {
    unsafe { (*v).render() }
}

pub unsafe fn value_is_function(v: *mut Value) -> bool {
    unsafe { matches!((*v).kind, ValueKind::Function(_)) }
}

pub unsafe fn value_is_block(v: *mut Value) -> bool {
    unsafe { matches!((*v).kind, ValueKind::Block(_)) }
}

pub unsafe fn value_is_instruction(v: *mut Value) -> bool {
    unsafe { matches!((*v).kind, ValueKind::Inst(_)) }
}

pub unsafe fn value_is_global_variable(v: *mut Value) -> bool {
    unsafe { matches!((*v).kind, ValueKind::Global(_)) }
}

pub unsafe fn value_is_constant_int(v: *mut Value) -> bool {
    unsafe {
        matches!(
            (*v).kind,
            ValueKind::ConstInt(_) | ValueKind::ConstNull | ValueKind::ConstAllOnes
        )
    }
}

// ---- instructions ---------------------------------------------------------

/// A detached `ret`. The caller owns it until it is appended to a block.
pub unsafe fn ret_create(ctx: *mut Context, val: Option<*mut Value>) -> *mut Value {
    unsafe {
        let void = type_void(ctx);
        Box::into_raw(Box::new(Value::new(void, ValueKind::Inst(Inst::Ret(val)))))
    }
}

/// The operand of a `ret`, when it has one.
pub unsafe fn ret_value(inst: *mut Value) -> Option<*mut Value> {
    unsafe {
        match (*inst).kind {
            ValueKind::Inst(Inst::Ret(v)) => v,
            _ => panic!("not a ret instruction"),
        }
    }
}

/// A detached integer `add` over operands of one integer type.
pub unsafe fn add_create(lhs: *mut Value, rhs: *mut Value, name: &str) -> *mut Value {
    unsafe {
        let ty = (*lhs).ty;
        assert_eq!(
            type_int_width(ty),
            type_int_width((*rhs).ty),
            "add operand width mismatch"
        );
        let mut v = Value::new(ty, ValueKind::Inst(Inst::Add { lhs, rhs }));
        v.name = name.to_string();
        Box::into_raw(Box::new(v))
    }
}

// ---- basic blocks ---------------------------------------------------------

/// A detached, empty block. The caller owns it until it is appended to a
/// function.
pub unsafe fn block_create(ctx: *mut Context, name: &str) -> *mut Value {
    unsafe {
        let void = type_void(ctx);
        let mut v = Value::new(void, ValueKind::Block(BlockData { insts: Vec::new() }));
        v.name = name.to_string();
        Box::into_raw(Box::new(v))
    }
}

pub unsafe fn block_instructions(bb: *mut Value) -> Vec<*mut Value> {
    unsafe {
        match &(*bb).kind {
            ValueKind::Block(data) => data.insts.clone(),
            _ => panic!("not a basic block"),
        }
    }
}

/// Appends `inst` to the block, transferring ownership of it.
pub unsafe fn block_append_instruction(bb: *mut Value, inst: *mut Value) {
    unsafe {
        assert!(value_is_instruction(inst), "appending a non-instruction");
        match &mut (*bb).kind {
            ValueKind::Block(data) => data.insts.push(inst),
            _ => panic!("not a basic block"),
        }
    }
}

// ---- functions ------------------------------------------------------------

/// A detached function with arguments materialized from the function type.
pub unsafe fn function_create(
    fn_ty: *mut Type,
    name: &str,
    linkage: Linkage,
    addr_space: u32,
) -> *mut Value {
    unsafe {
        let params = match &(*fn_ty).kind {
            TypeKind::Fn { params, .. } => params.clone(),
            _ => panic!("function_create on a non-function type"),
        };
        let args = params
            .iter()
            .enumerate()
            .map(|(i, &ty)| {
                let mut arg = Value::new(ty, ValueKind::Argument { index: i as u32 });
                arg.name = format!("{i}");
                Box::into_raw(Box::new(arg))
            })
            .collect();
        let data = FunctionData {
            props: GlobalProps::new(linkage, ThreadLocalMode::NotThreadLocal, addr_space),
            args,
            blocks: Vec::new(),
        };
        let mut v = Value::new(fn_ty, ValueKind::Function(data));
        v.name = name.to_string();
        Box::into_raw(Box::new(v))
    }
}

fn expect_function<'a>(v: *mut Value) -> &'a mut FunctionData {
    unsafe {
        match &mut (*v).kind {
            ValueKind::Function(data) => data,
            _ => panic!("not a function"),
        }
    }
}

pub unsafe fn function_arg_count(f: *mut Value) -> u32 {
    expect_function(f).args.len() as u32
}

pub unsafe fn function_arg(f: *mut Value, index: u32) -> *mut Value {
    expect_function(f).args[index as usize]
}

/// Appends `bb` to the function, transferring ownership of it.
pub unsafe fn function_append_block(f: *mut Value, bb: *mut Value) {
    unsafe {
        assert!(value_is_block(bb), "appending a non-block");
        expect_function(f).blocks.push(bb);
    }
}

pub unsafe fn function_blocks(f: *mut Value) -> Vec<*mut Value> {
    expect_function(f).blocks.clone()
}

// ---- global values --------------------------------------------------------

fn expect_props<'a>(v: *mut Value) -> &'a mut GlobalProps {
    unsafe {
        match &mut (*v).kind {
            ValueKind::Function(data) => &mut data.props,
            ValueKind::Global(data) => &mut data.props,
            _ => panic!("not a global value"),
        }
    }
}

pub unsafe fn global_linkage(v: *mut Value) -> Linkage {
    expect_props(v).linkage
}

pub unsafe fn global_set_linkage(v: *mut Value, linkage: Linkage) {
    expect_props(v).linkage = linkage;
}

pub unsafe fn global_visibility(v: *mut Value) -> Visibility {
    expect_props(v).visibility
}

pub unsafe fn global_set_visibility(v: *mut Value, visibility: Visibility) {
    expect_props(v).visibility = visibility;
}

pub unsafe fn global_dll_storage_class(v: *mut Value) -> DllStorageClass {
    expect_props(v).dll_storage
}

pub unsafe fn global_set_dll_storage_class(v: *mut Value, class: DllStorageClass) {
    expect_props(v).dll_storage = class;
}

pub unsafe fn global_thread_local_mode(v: *mut Value) -> ThreadLocalMode {
    expect_props(v).tls_mode
}

pub unsafe fn global_set_thread_local_mode(v: *mut Value, mode: ThreadLocalMode) {
    expect_props(v).tls_mode = mode;
}

pub unsafe fn global_address_significance(v: *mut Value) -> AddressSignificance {
    expect_props(v).addr_significance
}

pub unsafe fn global_set_address_significance(v: *mut Value, sig: AddressSignificance) {
    expect_props(v).addr_significance = sig;
}

pub unsafe fn global_address_space(v: *mut Value) -> u32 {
    expect_props(v).addr_space
}

pub unsafe fn global_has_section(v: *mut Value) -> bool {
    !expect_props(v).section.is_empty()
}

pub unsafe fn global_section(v: *mut Value) -> String {
    expect_props(v).section.clone()
}

/// Sets the linker section; the empty string removes it.
pub unsafe fn global_set_section(v: *mut Value, section: &str) {
    expect_props(v).section = section.to_string();
}

/// Explicit power-of-two alignment, zero when undefined.
pub unsafe fn global_alignment(v: *mut Value) -> u64 {
    expect_props(v).alignment
}

pub unsafe fn global_set_alignment(v: *mut Value, alignment: u64) {
    expect_props(v).alignment = alignment;
}

// ---- global variables -----------------------------------------------------

/// A detached global variable, with or without an initializer.
pub unsafe fn global_variable_create(
    ty: *mut Type,
    is_constant: bool,
    linkage: Linkage,
    name: &str,
    tls_mode: ThreadLocalMode,
    addr_space: u32,
    externally_initialized: bool,
    initializer: Option<*mut Value>,
) -> *mut Value {
    let data = GlobalData {
        props: GlobalProps::new(linkage, tls_mode, addr_space),
        is_constant,
        initializer,
        externally_initialized,
    };
    let mut v = Value::new(ty, ValueKind::Global(data));
    v.name = name.to_string();
    Box::into_raw(Box::new(v))
}

fn expect_global<'a>(v: *mut Value) -> &'a mut GlobalData {
    unsafe {
        match &mut (*v).kind {
            ValueKind::Global(data) => data,
            _ => panic!("not a global variable"),
        }
    }
}

pub unsafe fn global_variable_is_constant(v: *mut Value) -> bool {
    expect_global(v).is_constant
}

pub unsafe fn global_variable_set_constant(v: *mut Value, is_constant: bool) {
    expect_global(v).is_constant = is_constant;
}

pub unsafe fn global_variable_has_initializer(v: *mut Value) -> bool {
    expect_global(v).initializer.is_some()
}

/// The initializer. Only valid when `global_variable_has_initializer`.
pub unsafe fn global_variable_initializer(v: *mut Value) -> *mut Value {
    expect_global(v).initializer.expect("global has no initializer")
}

pub unsafe fn global_variable_set_initializer(v: *mut Value, init: *mut Value) {
    expect_global(v).initializer = Some(init);
}

pub unsafe fn global_variable_remove_initializer(v: *mut Value) {
    expect_global(v).initializer = None;
}

pub unsafe fn global_variable_is_externally_initialized(v: *mut Value) -> bool {
    expect_global(v).externally_initialized
}

pub unsafe fn global_variable_set_externally_initialized(v: *mut Value, flag: bool) {
    expect_global(v).externally_initialized = flag;
}
