mod common;

use pretty_assertions::assert_str_eq;

use sufc::ast::dump::{dump_ast, AstDumpFormat};
use sufc::ast::{BinOpKind, Expr, Program, Stmt};
use sufc::parse::{Cursor, Lexer, Parser, ParserError};
use sufc::source::{Source, SourceBuffer};

const FULL_PROGRAM: &str = "\
class Point [
fields x, y
method getx(this) with locals t:
t = &this.x
return t
method sum(this, other):
return (&this.x + ^other.getx())
]
class Empty [
]
main with p, q:
p = @Point
!p.x = 3
!p.y = (2 * 4)
ifonly (1 == 1): {
q = ^p.getx()
}
while (q < 10): {
q = (q + 1)
}
if (q != 10): {
print(0)
} else {
print(q)
}
print(^p.sum(p))
return 5
";

fn parse_err(code: &str) -> ParserError {
    let mut source_buf = SourceBuffer::new();
    let mut source = Source::new(&mut source_buf);
    let src_id = source.add_file("err.suf".into(), code.as_bytes().to_vec());
    let src_file = source.get(src_id).unwrap();

    let parser = Parser::new(Lexer::new(Cursor::new(src_file)));

    parser.parse().expect_err("the test program must not parse")
}

fn names(names: &[sufc::ast::Name<'_>]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn parses_classes_and_main() {
    let mut source_buf = SourceBuffer::new();
    let program = common::parse(&mut source_buf, FULL_PROGRAM);

    assert_eq!(program.classes.len(), 2);

    let point = &program.classes[0];
    assert_eq!(point.name.to_string(), "Point");
    assert_eq!(names(&point.fields), ["x", "y"]);
    assert_eq!(point.methods.len(), 2);
    assert_eq!(names(&point.methods[0].params), ["this"]);
    assert_eq!(names(&point.methods[0].locals), ["t"]);
    assert_eq!(names(&point.methods[1].params), ["this", "other"]);
    assert!(point.methods[1].locals.is_empty());

    let empty = &program.classes[1];
    assert!(empty.fields.is_empty());
    assert!(empty.methods.is_empty());

    assert_eq!(program.main.name.to_string(), "main");
    assert!(program.main.params.is_empty());
    assert_eq!(names(&program.main.locals), ["p", "q"]);
    assert_eq!(program.main.body.len(), 8);
}

#[test]
fn parses_statement_shapes() {
    let mut source_buf = SourceBuffer::new();
    let program = common::parse(&mut source_buf, FULL_PROGRAM);
    let body = &program.main.body;

    assert!(matches!(&body[0], Stmt::Assign(assign) if matches!(assign.value, Expr::New(_))));
    assert!(matches!(&body[1], Stmt::FieldAssign(_)));

    let Stmt::FieldAssign(field_assign) = &body[2] else {
        panic!("expected a field assignment");
    };

    assert!(
        matches!(&field_assign.value, Expr::BinOp(bin_op) if bin_op.op == BinOpKind::Multiply)
    );

    let Stmt::IfOnly(if_only) = &body[3] else {
        panic!("expected an ifonly statement");
    };

    assert!(
        matches!(&if_only.condition, Expr::BinOp(bin_op) if bin_op.op == BinOpKind::Equals)
    );
    assert_eq!(if_only.body.len(), 1);

    let Stmt::While(while_stmt) = &body[4] else {
        panic!("expected a while statement");
    };

    assert!(
        matches!(&while_stmt.condition, Expr::BinOp(bin_op) if bin_op.op == BinOpKind::Less)
    );

    let Stmt::If(if_stmt) = &body[5] else {
        panic!("expected an if statement");
    };

    assert!(matches!(&if_stmt.condition, Expr::BinOp(bin_op) if bin_op.op == BinOpKind::NotEquals));
    assert_eq!(if_stmt.then_branch.len(), 1);
    assert_eq!(if_stmt.else_branch.len(), 1);
}

#[test]
fn parses_parenthesized_receiver() {
    let mut source_buf = SourceBuffer::new();
    let program = common::parse(
        &mut source_buf,
        "class C [\nmethod get(this):\nreturn 1\n]\nmain with :\n_ = ^(@C).get()\n",
    );

    let Stmt::Discard(discard) = &program.main.body[0] else {
        panic!("expected a discard statement");
    };

    let Expr::MethodCall(call) = &discard.expr else {
        panic!("expected a method call");
    };

    assert!(matches!(&*call.base, Expr::New(new) if new.0.to_string() == "C"));
    assert_eq!(call.method.to_string(), "get");
    assert!(call.args.is_empty());
}

#[test]
fn rejects_missing_main() {
    assert!(matches!(
        parse_err("foo with :\nprint(1)\n"),
        ParserError::ExpectedMain(_)
    ));
}

#[test]
fn rejects_too_many_locals() {
    assert!(matches!(
        parse_err("main with a, b, c, d, e, f, g:\nprint(1)\n"),
        ParserError::TooManyLocals { count: 7, .. }
    ));
}

#[test]
fn rejects_statement_garbage() {
    assert!(matches!(
        parse_err("main with :\n+ = 3\n"),
        ParserError::UnexpectedToken { .. }
    ));
}

#[test]
fn rejects_unterminated_binop() {
    assert!(matches!(
        parse_err("main with a:\na = (1 + \n"),
        ParserError::UnexpectedToken { .. }
    ));
}

fn source_dump(program: &Program<'_>) -> String {
    let mut buf = vec![];
    dump_ast(AstDumpFormat::Source, program, &mut buf).unwrap();

    String::from_utf8(buf).unwrap()
}

/// Printing in source form and reparsing reaches a textual fixpoint.
#[test]
fn source_print_reparse_fixpoint() {
    let mut source_buf = SourceBuffer::new();
    let program = common::parse(&mut source_buf, FULL_PROGRAM);
    let printed = source_dump(&program);

    let mut reparse_buf = SourceBuffer::new();
    let reparsed = common::parse(&mut reparse_buf, &printed);
    let reprinted = source_dump(&reparsed);

    assert_str_eq!(printed, reprinted);
}

/// The tree dump is deterministic and names every main statement.
#[test]
fn tree_dump_mentions_statements() {
    let mut source_buf = SourceBuffer::new();
    let program = common::parse(&mut source_buf, FULL_PROGRAM);

    let mut buf = vec![];
    dump_ast(AstDumpFormat::Tree, &program, &mut buf).unwrap();
    let tree = String::from_utf8(buf).unwrap();

    for needle in [
        "Class: Point",
        "Method: getx",
        "FieldAssign",
        "IfOnly",
        "While",
        "Print",
        "MethodCall",
        "Return",
    ] {
        assert!(tree.contains(needle), "missing {:?} in tree dump", needle);
    }
}
