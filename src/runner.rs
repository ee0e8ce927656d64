use std::cell::RefCell;
use std::process::ExitCode;
use std::rc::Rc;

use sufc::errors::Diagnostics;
use sufc::source::{Source, SourceBuffer};

use self::config::{parse_args_or_exit, SufcConfig};
use self::errors::print_diagnostic;

pub mod config;
mod errors;
mod passes;

pub enum CompilationControl {
    Continue,
    Stop,
}

pub struct PassOutput<O> {
    pub output: O,
    pub compilation_control: CompilationControl,
}

impl<O> PassOutput<O> {
    pub fn stop_with_output(output: O) -> Self {
        Self {
            output,
            compilation_control: CompilationControl::Stop,
        }
    }

    pub fn continue_with_output(output: O) -> Self {
        Self {
            output,
            compilation_control: CompilationControl::Continue,
        }
    }
}

impl PassOutput<()> {
    pub fn stop() -> Self {
        Self::stop_with_output(())
    }

    pub fn r#continue() -> Self {
        Self::continue_with_output(())
    }
}

pub struct RunnerCtx<'buf, 'emt> {
    pub config: SufcConfig,
    pub source: Rc<RefCell<Source<'buf>>>,
    pub diagnostics: Diagnostics<'emt>,
}

impl RunnerCtx<'_, '_> {
    pub fn stop_if_errors<O>(&self, output: O) -> PassOutput<O> {
        PassOutput {
            output,
            compilation_control: if self.diagnostics.has_errors() {
                CompilationControl::Stop
            } else {
                CompilationControl::Continue
            },
        }
    }
}

macro_rules! return_if_stopped {
    ($ctx:expr, $e:expr) => {
        match $e {
            PassOutput {
                compilation_control: CompilationControl::Stop,
                ..
            } => {
                return if $ctx.diagnostics.has_errors() {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }

            PassOutput { output, .. } => output,
        }
    };
}

fn run(mut ctx: RunnerCtx<'_, '_>) -> ExitCode {
    let src_id = return_if_stopped!(ctx, passes::load_file(&mut ctx));

    // syntax analysis
    let ast = return_if_stopped!(ctx, passes::parse(&mut ctx, src_id));

    let Some(ast) = ast else {
        return ExitCode::FAILURE;
    };

    return_if_stopped!(ctx, passes::dump_ast_if_asked(&mut ctx, &ast));

    // layout + lowering
    let cfg = return_if_stopped!(ctx, passes::lower(&mut ctx, &ast));

    let Some(mut cfg) = cfg else {
        return ExitCode::FAILURE;
    };

    return_if_stopped!(ctx, passes::dump_ir_if_ssa_skipped(&mut ctx, &cfg));

    // ssa rewrite
    return_if_stopped!(ctx, passes::ssa(&mut ctx, &mut cfg));

    return_if_stopped!(ctx, passes::dump_ir(&mut ctx, &cfg));

    ExitCode::SUCCESS
}

pub fn prepare_and_run() -> ExitCode {
    let config = parse_args_or_exit();
    let mut source_buf = SourceBuffer::new();
    let source = Rc::new(RefCell::new(Source::new(&mut source_buf)));

    let mut diagnostics = Diagnostics::new();

    diagnostics.set_emitter({
        let source = source.clone();

        Box::new(move |diagnostic| {
            print_diagnostic(&source.borrow(), diagnostic);
        })
    });

    let ctx = RunnerCtx {
        config,
        source,
        diagnostics,
    };

    run(ctx)
}
