use std::path::PathBuf;

use sufc::ast::Program;
use sufc::ir::Cfg;
use sufc::lower;
use sufc::parse::{Cursor, Lexer, Parser};
use sufc::source::{Source, SourceBuffer};

pub fn parse<'buf>(source_buf: &'buf mut SourceBuffer, code: &str) -> Program<'buf> {
    let mut source = Source::new(source_buf);
    let src_id = source.add_file(PathBuf::from("test.suf"), code.as_bytes().to_vec());
    let src_file = source.get(src_id).unwrap();

    let parser = Parser::new(Lexer::new(Cursor::new(src_file)));

    parser.parse().expect("the test program parses")
}

pub fn compile(source_buf: &mut SourceBuffer, code: &str, pinhole: bool, ssa: bool) -> Cfg {
    let program = parse(source_buf, code);
    let mut cfg = lower::lower_program(&program, pinhole).expect("the test program lowers");

    if ssa {
        lower::ssa::run(&mut cfg);
    }

    cfg
}

pub fn dump(cfg: &Cfg) -> String {
    let mut buf = vec![];
    sufc::ir::dump::dump_cfg(cfg, &mut buf).unwrap();

    String::from_utf8(buf).unwrap()
}
