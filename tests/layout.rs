mod common;

use sufc::source::SourceBuffer;

#[test]
fn single_class_layout() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "class C [\nfields x\nmethod get(this) with locals :\nreturn &this.x\n]\nmain with :\n_ = ^(@C).get()\n",
        true,
        false,
    );

    assert_eq!(cfg.field_names, ["x"]);
    assert_eq!(cfg.method_names, ["get"]);

    let class = &cfg.classes["C"];
    assert_eq!(class.vtable, ["C_get"]);
    assert_eq!(class.ftable, [2]);
    assert_eq!(class.objsize, 3);
}

#[test]
fn vtable_holes_share_global_indexing() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "class A [\nmethod f(this):\nreturn 1\n]\nclass B [\nmethod g(this):\nreturn 2\n]\nmain with :\n_ = ^(@A).g()\n",
        true,
        false,
    );

    assert_eq!(cfg.method_names, ["f", "g"]);
    assert_eq!(cfg.classes["A"].vtable, ["A_f", "0"]);
    assert_eq!(cfg.classes["B"].vtable, ["0", "B_g"]);
    assert_eq!(cfg.classes["A"].objsize, 2);
    assert_eq!(cfg.classes["B"].objsize, 2);
}

#[test]
fn empty_class_is_all_holes() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "class D [\nfields a, b\nmethod m(this):\nreturn 0\n]\nclass Nothing [\n]\nmain with :\nprint(1)\n",
        true,
        false,
    );

    let nothing = &cfg.classes["Nothing"];
    assert_eq!(nothing.vtable.len(), cfg.method_names.len());
    assert_eq!(nothing.ftable.len(), cfg.field_names.len());
    assert!(nothing.vtable.iter().all(|entry| entry == "0"));
    assert!(nothing.ftable.iter().all(|&offset| offset == 0));
    assert_eq!(nothing.objsize, 2);
}

#[test]
fn field_offsets_follow_class_order() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "class D [\nfields a, b\n]\nclass E [\nfields b, c\n]\nmain with :\nprint(1)\n",
        true,
        false,
    );

    assert_eq!(cfg.field_names, ["a", "b", "c"]);
    assert_eq!(cfg.classes["D"].ftable, [2, 3, 0]);
    assert_eq!(cfg.classes["D"].objsize, 4);
    assert_eq!(cfg.classes["E"].ftable, [0, 2, 3]);
    assert_eq!(cfg.classes["E"].objsize, 4);
}

#[test]
fn table_lengths_match_global_lists() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "class A [\nfields x\nmethod f(this):\nreturn 1\n]\nclass B [\nfields y, z\nmethod g(this):\nreturn 2\nmethod f(this):\nreturn 3\n]\nmain with :\nprint(1)\n",
        true,
        false,
    );

    for class in cfg.classes.values() {
        assert_eq!(class.vtable.len(), cfg.method_names.len());
        assert_eq!(class.ftable.len(), cfg.field_names.len());
        assert!(class.objsize >= 2);

        let defined: Vec<_> = class
            .ftable
            .iter()
            .copied()
            .filter(|&offset| offset != 0)
            .collect();
        let mut sorted = defined.clone();
        sorted.sort_unstable();

        assert_eq!(defined, sorted, "offsets grow along the class field order");
    }
}
