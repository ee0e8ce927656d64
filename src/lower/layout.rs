//! Global class layout.
//!
//! Every class shares the indexing of the two program-wide name lists, so
//! dynamic dispatch compiles to a constant index into a per-instance table
//! plus a hole check.

use indexmap::{IndexMap, IndexSet};

use crate::ast::Program;
use crate::ir::ClassMetadata;

/// Slots 0 and 1 of every object hold the vtable and ftable pointers.
pub const FIRST_FIELD_SLOT: usize = 2;

/// The sentinel for a vtable slot the class does not fill.
pub const VTABLE_HOLE: &str = "0";

pub type Layout = (Vec<String>, Vec<String>, IndexMap<String, ClassMetadata>);

/// Collects the global field/method name lists (first-seen order over the
/// classes in source order) and builds each class's tables against them.
pub fn build_layout(program: &Program<'_>) -> Layout {
    let mut field_names: IndexSet<String> = IndexSet::new();
    let mut method_names: IndexSet<String> = IndexSet::new();

    for class in &program.classes {
        for method in &class.methods {
            method_names.insert(method.name.to_string());
        }

        for field in &class.fields {
            field_names.insert(field.to_string());
        }
    }

    let mut classes = IndexMap::new();

    for class in &program.classes {
        let mut ftable = Vec::with_capacity(field_names.len());
        let mut offset = FIRST_FIELD_SLOT;

        for field_name in &field_names {
            let defined = class
                .fields
                .iter()
                .any(|field| field.as_slice() == field_name.as_bytes());

            if defined {
                ftable.push(offset);
                offset += 1;
            } else {
                ftable.push(0);
            }
        }

        let mut vtable = Vec::with_capacity(method_names.len());

        for method_name in &method_names {
            let defined = class
                .methods
                .iter()
                .any(|method| method.name.as_slice() == method_name.as_bytes());

            if defined {
                vtable.push(format!("{}_{}", class.name, method_name));
            } else {
                vtable.push(VTABLE_HOLE.to_owned());
            }
        }

        classes.insert(
            class.name.to_string(),
            ClassMetadata {
                name: class.name.to_string(),
                objsize: offset,
                vtable,
                ftable,
            },
        );
    }

    (
        field_names.into_iter().collect(),
        method_names.into_iter().collect(),
        classes,
    )
}
