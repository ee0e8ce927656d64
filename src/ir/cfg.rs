use indexmap::IndexMap;

use super::method::MethodIr;

/// Per-class dispatch layout.
///
/// Both tables are parallel to the program-wide name lists: `vtable` holds
/// mangled method symbols (or the `"0"` hole), `ftable` holds per-instance
/// slot offsets (or `0` for an absent field).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetadata {
    pub name: String,
    pub objsize: usize,
    pub vtable: Vec<String>,
    pub ftable: Vec<usize>,
}

/// The whole compiled program.
///
/// The maps iterate in source order; `main` is the last method.
#[derive(Debug, Clone)]
pub struct Cfg {
    pub field_names: Vec<String>,
    pub method_names: Vec<String>,
    pub classes: IndexMap<String, ClassMetadata>,
    pub methods: IndexMap<String, MethodIr>,
}
