use std::io;

use tracing::info;

use sufc::ast::dump::{dump_ast, AstDumpFormat};
use sufc::ast::Program;
use sufc::ir::dump::dump_cfg;
use sufc::ir::Cfg;
use sufc::lower;
use sufc::parse::{Cursor, Lexer, Parser};
use sufc::source::SourceId;

use super::config::Mode;
use super::{PassOutput, RunnerCtx};

pub fn load_file(ctx: &mut RunnerCtx<'_, '_>) -> PassOutput<Option<SourceId>> {
    let path = ctx.config.path.clone();

    match ctx.source.borrow_mut().load(path.clone()) {
        Ok(src_id) => ctx.stop_if_errors(Some(src_id)),

        Err(e) => {
            ctx.diagnostics
                .error()
                .with_message(format!("could not load file {}", path.display()))
                .with_source(Box::new(e))
                .emit();

            PassOutput::stop_with_output(None)
        }
    }
}

pub fn parse<'buf>(
    ctx: &mut RunnerCtx<'buf, '_>,
    src_id: Option<SourceId>,
) -> PassOutput<Option<Program<'buf>>> {
    let src_id = src_id.expect("load_file stops the pipeline on failure");

    let parser = {
        let source = ctx.source.borrow();
        let src_file = source.get(src_id).expect("the file has been loaded");
        let cursor = Cursor::new(src_file);

        Parser::new(Lexer::new(cursor))
    };

    match parser.parse() {
        Ok(program) => {
            info!(classes = program.classes.len(), "parsed");

            ctx.stop_if_errors(Some(program))
        }

        Err(e) => {
            ctx.diagnostics.fatal().with_span_and_error(e).emit();

            PassOutput::stop_with_output(None)
        }
    }
}

pub fn dump_ast_if_asked(
    ctx: &mut RunnerCtx<'_, '_>,
    program: &Program<'_>,
) -> PassOutput<()> {
    if ctx.config.output.mode() != Mode::PrintAst {
        return PassOutput::r#continue();
    }

    if let Err(e) = dump_ast(AstDumpFormat::Tree, program, io::stdout()) {
        ctx.diagnostics
            .error()
            .with_message("could not dump the ast to stdout".to_owned())
            .with_source(Box::new(e))
            .emit();
    }

    PassOutput::stop()
}

pub fn lower(ctx: &mut RunnerCtx<'_, '_>, program: &Program<'_>) -> PassOutput<Option<Cfg>> {
    match lower::lower_program(program, ctx.config.output.pinhole()) {
        Ok(cfg) => ctx.stop_if_errors(Some(cfg)),

        Err(e) => {
            ctx.diagnostics.fatal().with_span_and_error(e).emit();

            PassOutput::stop_with_output(None)
        }
    }
}

pub fn dump_ir_if_ssa_skipped(ctx: &mut RunnerCtx<'_, '_>, cfg: &Cfg) -> PassOutput<()> {
    if !matches!(ctx.config.output.mode(), Mode::NoSsa | Mode::NoOpt) {
        return PassOutput::r#continue();
    }

    dump_ir(ctx, cfg);

    PassOutput::stop()
}

pub fn ssa(ctx: &mut RunnerCtx<'_, '_>, cfg: &mut Cfg) -> PassOutput<()> {
    lower::ssa::run(cfg);

    ctx.stop_if_errors(())
}

pub fn dump_ir(ctx: &mut RunnerCtx<'_, '_>, cfg: &Cfg) -> PassOutput<()> {
    if let Err(e) = dump_cfg(cfg, io::stdout()) {
        ctx.diagnostics
            .error()
            .with_message("could not dump the ir to stdout".to_owned())
            .with_source(Box::new(e))
            .emit();
    }

    ctx.stop_if_errors(())
}
