mod common;

use pretty_assertions::assert_str_eq;

use sufc::ir::{Const, MethodIr, Op, Terminator, Value};
use sufc::lower::{self, LowerError, LowerErrorKind};
use sufc::source::SourceBuffer;

const DISPATCH_PROGRAM: &str = "\
class A [
method f(this):
return 1
]
class B [
method g(this):
return 2
]
main with :
_ = ^(@A).g()
";

fn all_ops(method: &MethodIr) -> impl Iterator<Item = &Op> + '_ {
    method
        .blocks()
        .flat_map(|(_, block)| block.phis.iter().chain(block.instrs.iter()))
}

fn lower_err(code: &str) -> LowerError {
    let mut source_buf = SourceBuffer::new();
    let program = common::parse(&mut source_buf, code);

    lower::lower_program(&program, true).expect_err("the test program must not lower")
}

fn method_dump(method: &MethodIr) -> String {
    let mut buf = vec![];
    sufc::ir::dump::dump_method(method, &mut buf).unwrap();

    String::from_utf8(buf).unwrap()
}

#[test]
fn no_terminator_hangs_after_lowering() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "class C [\nfields x\nmethod get(this):\nreturn &this.x\n]\nmain with c:\nc = @C\nprint(&c.x)\n",
        true,
        false,
    );

    for method in cfg.methods.values() {
        for (_, block) in method.blocks() {
            assert!(
                !block.terminator.is_hanging(),
                "{}: block {} hangs",
                method.name,
                block.label
            );
        }
    }
}

#[test]
fn conditional_targets_stay_within_the_method() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(&mut source_buf, DISPATCH_PROGRAM, true, true);

    for method in cfg.methods.values() {
        for (_, block) in method.blocks() {
            for succ in block.terminator.successors() {
                assert!(
                    method.order().contains(&succ),
                    "{}: successor outside the method",
                    method.name
                );
            }
        }
    }
}

#[test]
fn dispatch_index_scales_by_word_size() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(&mut source_buf, DISPATCH_PROGRAM, true, false);

    // `g` is global method 1, so the vtable lookup reads byte offset 8
    let main = &cfg.methods["main"];
    let get_elts: Vec<_> = all_ops(main)
        .filter_map(|op| match op {
            Op::GetElt { index, .. } => Some(index.clone()),
            _ => None,
        })
        .collect();

    assert_eq!(get_elts, [Value::Const(Const::untagged(8))]);

    let fails: Vec<_> = main
        .blocks()
        .filter(|(_, block)| {
            matches!(
                block.terminator,
                Terminator::Fail(sufc::ir::FailReason::NoSuchMethod)
            )
        })
        .collect();

    assert_eq!(fails.len(), 1);
}

#[test]
fn field_index_scales_by_word_size() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "class C [\nfields x, y\nmethod gety(this):\nreturn &this.y\n]\nmain with :\nprint(3)\n",
        true,
        false,
    );

    // `y` is global field 1
    let gety = &cfg.methods["C_gety"];
    let indices: Vec<_> = all_ops(gety)
        .filter_map(|op| match op {
            Op::GetElt { index, .. } => Some(index.clone()),
            _ => None,
        })
        .collect();

    assert_eq!(indices, [Value::Const(Const::untagged(8))]);
}

#[test]
fn if_with_both_arms_returning_elides_the_merge_block() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "main with c:\nif c: {\nreturn 1\n} else {\nreturn 2\n}\n",
        true,
        false,
    );

    let main = &cfg.methods["main"];

    assert_eq!(main.order().len(), 3);
    assert!(main
        .blocks()
        .all(|(_, block)| !matches!(block.terminator, Terminator::Jump(_))));
}

#[test]
fn while_true_keeps_the_unreachable_merge_block() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(&mut source_buf, "main with :\nwhile 1: {\nprint(2)\n}\n", true, false);

    let main = &cfg.methods["main"];
    assert_eq!(main.order().len(), 4);

    let (_, merge) = main.blocks().last().unwrap();
    assert_eq!(merge.label, "main3");
    assert_eq!(
        merge.terminator,
        Terminator::Return(Value::Const(Const::untagged(0)))
    );
}

#[test]
fn locals_preinitialize_to_tagged_zero() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(&mut source_buf, "main with a, b:\nprint(1)\n", true, false);

    let main = &cfg.methods["main"];
    let entry = main.block(main.entry());

    match &entry.instrs[..2] {
        [Op::Assign { dest: a, src: src_a }, Op::Assign { dest: b, src: src_b }] => {
            assert_eq!(a.name, "a");
            assert_eq!(b.name, "b");
            assert_eq!(*src_a, Value::Const(Const::tagged(0)));
            assert_eq!(*src_b, Value::Const(Const::tagged(0)));
        }

        other => panic!("missing local initializers: {:?}", other),
    }
}

#[test]
fn no_locals_means_no_initializers() {
    let mut source_buf = SourceBuffer::new();
    let cfg = common::compile(
        &mut source_buf,
        "class C [\nmethod f(this):\nreturn 1\n]\nmain with :\nprint(1)\n",
        true,
        false,
    );

    let f = &cfg.methods["C_f"];
    assert!(f.block(f.entry()).instrs.is_empty());
    assert_eq!(
        f.block(f.entry()).terminator,
        Terminator::Return(Value::Const(Const::tagged(1)))
    );
}

const PINHOLE_PROGRAM: &str = "\
class C [
fields x
method get(this):
return &this.x
]
main with :
_ = ^(@C).get()
";

#[test]
fn pinhole_elides_tag_traffic_on_this_only() {
    let mut pinhole_buf = SourceBuffer::new();
    let with_pinhole = common::compile(&mut pinhole_buf, PINHOLE_PROGRAM, true, false);

    let mut noopt_buf = SourceBuffer::new();
    let without_pinhole = common::compile(&mut noopt_buf, PINHOLE_PROGRAM, false, false);

    // `main` never touches `this`, so the pinhole changes nothing there
    assert_str_eq!(
        method_dump(&with_pinhole.methods["main"]),
        method_dump(&without_pinhole.methods["main"])
    );

    let get_pinhole = &with_pinhole.methods["C_get"];
    let get_noopt = &without_pinhole.methods["C_get"];

    // the tag check on `this` costs two extra blocks
    assert_eq!(get_noopt.order().len(), get_pinhole.order().len() + 2);

    let touches_this = |method: &MethodIr| {
        all_ops(method).any(|op| {
            matches!(
                op,
                Op::Bin { dest, .. } if dest.name == "this"
            )
        })
    };

    assert!(!touches_this(get_pinhole));
    assert!(touches_this(get_noopt));
}

#[test]
fn unknown_variable_is_fatal() {
    let err = lower_err("main with :\nx = 5\n");
    assert_eq!(err.kind, LowerErrorKind::UnknownVariable("x".to_owned()));
}

#[test]
fn unknown_class_is_fatal() {
    let err = lower_err("main with :\n_ = @Nope\n");
    assert_eq!(err.kind, LowerErrorKind::UnknownClass("Nope".to_owned()));
}

#[test]
fn unknown_field_is_fatal() {
    let err = lower_err("class C [\nfields x\n]\nmain with c:\nc = @C\n_ = &c.nope\n");
    assert_eq!(err.kind, LowerErrorKind::UnknownField("nope".to_owned()));
}

#[test]
fn unknown_method_is_fatal() {
    let err =
        lower_err("class C [\nmethod f(this):\nreturn 1\n]\nmain with c:\nc = @C\n_ = ^c.g()\n");
    assert_eq!(err.kind, LowerErrorKind::UnknownMethod("g".to_owned()));
}

#[test]
fn non_terminating_class_method_is_fatal() {
    let err = lower_err("class C [\nmethod f(this):\n_ = 1\n]\nmain with :\nprint(1)\n");
    assert_eq!(
        err.kind,
        LowerErrorKind::NonTerminatingMethod("f".to_owned())
    );
}
