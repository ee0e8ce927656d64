//! AST printers.
//!
//! The tree format is the human-readable dump behind `--print-ast`; the
//! source format emits program text that parses back to a structurally
//! equal AST.

use std::fmt::Arguments;
use std::io::{self, Write};

use itertools::Itertools;

use crate::util::slice_formatter;

use super::{Class, Expr, Method, Program, Stmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstDumpFormat {
    Tree,
    Source,
}

pub fn dump_ast(format: AstDumpFormat, program: &Program<'_>, out: impl Write) -> io::Result<()> {
    match format {
        AstDumpFormat::Tree => TreePrinter { out, indent: 0 }.program(program),
        AstDumpFormat::Source => SourcePrinter { out }.program(program),
    }
}

struct TreePrinter<W> {
    out: W,
    indent: usize,
}

impl<W: Write> TreePrinter<W> {
    fn line(&mut self, args: Arguments<'_>) -> io::Result<()> {
        for _ in 0..self.indent {
            write!(self.out, " ")?;
        }

        writeln!(self.out, "{}", args)
    }

    fn nested(
        &mut self,
        f: impl FnOnce(&mut Self) -> io::Result<()>,
    ) -> io::Result<()> {
        self.indent += 2;
        let result = f(self);
        self.indent -= 2;

        result
    }

    fn program(&mut self, program: &Program<'_>) -> io::Result<()> {
        self.line(format_args!("Program"))?;

        self.nested(|this| {
            this.line(format_args!("Main:"))?;
            this.nested(|this| this.method(&program.main))?;

            this.line(format_args!("Classes ({}):", program.classes.len()))?;
            this.nested(|this| {
                program.classes.iter().try_for_each(|class| this.class(class))
            })
        })
    }

    fn class(&mut self, class: &Class<'_>) -> io::Result<()> {
        self.line(format_args!("Class: {}", class.name))?;

        self.nested(|this| {
            this.line(format_args!("Fields ({}):", class.fields.len()))?;
            this.nested(|this| {
                class
                    .fields
                    .iter()
                    .try_for_each(|field| this.line(format_args!("- {}", field)))
            })?;

            this.line(format_args!("Methods ({}):", class.methods.len()))?;
            this.nested(|this| {
                class.methods.iter().try_for_each(|method| this.method(method))
            })
        })
    }

    fn method(&mut self, method: &Method<'_>) -> io::Result<()> {
        self.line(format_args!("Method: {}", method.name))?;

        self.nested(|this| {
            this.line(format_args!("Parameters ({}):", method.params.len()))?;
            this.nested(|this| {
                method
                    .params
                    .iter()
                    .try_for_each(|param| this.line(format_args!("- {}", param)))
            })?;

            this.line(format_args!("Locals ({}):", method.locals.len()))?;
            this.nested(|this| {
                method
                    .locals
                    .iter()
                    .try_for_each(|local| this.line(format_args!("- {}", local)))
            })?;

            this.line(format_args!("Body ({} statements):", method.body.len()))?;
            this.nested(|this| method.body.iter().try_for_each(|stmt| this.stmt(stmt)))
        })
    }

    fn stmts(&mut self, stmts: &[Stmt<'_>]) -> io::Result<()> {
        self.nested(|this| stmts.iter().try_for_each(|stmt| this.stmt(stmt)))
    }

    fn stmt(&mut self, stmt: &Stmt<'_>) -> io::Result<()> {
        match stmt {
            Stmt::Assign(assign) => {
                self.line(format_args!("Assign"))?;
                self.nested(|this| {
                    this.line(format_args!("Variable: {}", assign.name))?;
                    this.line(format_args!("Value:"))?;
                    this.nested(|this| this.expr(&assign.value))
                })
            }

            Stmt::Discard(discard) => {
                self.line(format_args!("Discard"))?;
                self.nested(|this| {
                    this.line(format_args!("Expression:"))?;
                    this.nested(|this| this.expr(&discard.expr))
                })
            }

            Stmt::FieldAssign(field_assign) => {
                self.line(format_args!("FieldAssign"))?;
                self.nested(|this| {
                    this.line(format_args!("Object:"))?;
                    this.nested(|this| this.expr(&field_assign.object))?;
                    this.line(format_args!("Field: {}", field_assign.field))?;
                    this.line(format_args!("Value:"))?;
                    this.nested(|this| this.expr(&field_assign.value))
                })
            }

            Stmt::If(if_stmt) => {
                self.line(format_args!("If"))?;
                self.nested(|this| {
                    this.line(format_args!("Condition:"))?;
                    this.nested(|this| this.expr(&if_stmt.condition))?;
                    this.line(format_args!("Then:"))?;
                    this.stmts(&if_stmt.then_branch)?;
                    this.line(format_args!("Else:"))?;
                    this.stmts(&if_stmt.else_branch)
                })
            }

            Stmt::IfOnly(if_only) => {
                self.line(format_args!("IfOnly"))?;
                self.nested(|this| {
                    this.line(format_args!("Condition:"))?;
                    this.nested(|this| this.expr(&if_only.condition))?;
                    this.line(format_args!("Body:"))?;
                    this.stmts(&if_only.body)
                })
            }

            Stmt::While(while_stmt) => {
                self.line(format_args!("While"))?;
                self.nested(|this| {
                    this.line(format_args!("Condition:"))?;
                    this.nested(|this| this.expr(&while_stmt.condition))?;
                    this.line(format_args!("Body:"))?;
                    this.stmts(&while_stmt.body)
                })
            }

            Stmt::Return(ret) => {
                self.line(format_args!("Return"))?;
                self.nested(|this| {
                    this.line(format_args!("Value:"))?;
                    this.nested(|this| this.expr(&ret.value))
                })
            }

            Stmt::Print(print) => {
                self.line(format_args!("Print"))?;
                self.nested(|this| {
                    this.line(format_args!("Value:"))?;
                    this.nested(|this| this.expr(&print.value))
                })
            }
        }
    }

    fn expr(&mut self, expr: &Expr<'_>) -> io::Result<()> {
        match expr {
            Expr::This(_) => self.line(format_args!("this")),
            Expr::Int(lit) => self.line(format_args!("{}", lit.0.value)),
            Expr::Var(name) => self.line(format_args!("{}", name)),
            Expr::New(new) => self.line(format_args!("New {}", new.0)),

            Expr::BinOp(bin_op) => {
                self.line(format_args!(
                    "BinOp `{}`",
                    slice_formatter(bin_op.op.symbol().as_slice())
                ))?;
                self.nested(|this| {
                    this.expr(&bin_op.lhs)?;
                    this.expr(&bin_op.rhs)
                })
            }

            Expr::FieldRead(field_read) => {
                self.line(format_args!("FieldRead"))?;
                self.nested(|this| {
                    this.line(format_args!("Base:"))?;
                    this.nested(|this| this.expr(&field_read.base))?;
                    this.line(format_args!("Field: {}", field_read.field))
                })
            }

            Expr::MethodCall(call) => {
                self.line(format_args!("MethodCall"))?;
                self.nested(|this| {
                    this.line(format_args!("Base:"))?;
                    this.nested(|this| this.expr(&call.base))?;
                    this.line(format_args!("Method: {}", call.method))?;
                    this.line(format_args!("Args ({}):", call.args.len()))?;
                    this.nested(|this| call.args.iter().try_for_each(|arg| this.expr(arg)))
                })
            }
        }
    }
}

struct SourcePrinter<W> {
    out: W,
}

impl<W: Write> SourcePrinter<W> {
    fn program(&mut self, program: &Program<'_>) -> io::Result<()> {
        for class in &program.classes {
            self.class(class)?;
        }

        let locals = program.main.locals.iter().join(", ");
        writeln!(self.out, "main with {}:", locals)?;
        self.stmts(&program.main.body)
    }

    fn class(&mut self, class: &Class<'_>) -> io::Result<()> {
        writeln!(self.out, "class {} [", class.name)?;

        if !class.fields.is_empty() {
            writeln!(self.out, "fields {}", class.fields.iter().join(", "))?;
        }

        for method in &class.methods {
            self.method(method)?;
        }

        writeln!(self.out, "]")
    }

    fn method(&mut self, method: &Method<'_>) -> io::Result<()> {
        write!(
            self.out,
            "method {}({})",
            method.name,
            method.params.iter().join(", ")
        )?;

        if !method.locals.is_empty() {
            write!(self.out, " with locals {}", method.locals.iter().join(", "))?;
        }

        writeln!(self.out, ":")?;
        self.stmts(&method.body)
    }

    fn stmts(&mut self, stmts: &[Stmt<'_>]) -> io::Result<()> {
        stmts.iter().try_for_each(|stmt| self.stmt(stmt))
    }

    fn stmt(&mut self, stmt: &Stmt<'_>) -> io::Result<()> {
        match stmt {
            Stmt::Assign(assign) => {
                writeln!(self.out, "{} = {}", assign.name, expr_to_source(&assign.value))
            }

            Stmt::Discard(discard) => {
                writeln!(self.out, "_ = {}", expr_to_source(&discard.expr))
            }

            Stmt::FieldAssign(field_assign) => writeln!(
                self.out,
                "!{}.{} = {}",
                expr_to_source(&field_assign.object),
                field_assign.field,
                expr_to_source(&field_assign.value)
            ),

            Stmt::If(if_stmt) => {
                writeln!(self.out, "if {}: {{", expr_to_source(&if_stmt.condition))?;
                self.stmts(&if_stmt.then_branch)?;
                writeln!(self.out, "}} else {{")?;
                self.stmts(&if_stmt.else_branch)?;
                writeln!(self.out, "}}")
            }

            Stmt::IfOnly(if_only) => {
                writeln!(self.out, "ifonly {}: {{", expr_to_source(&if_only.condition))?;
                self.stmts(&if_only.body)?;
                writeln!(self.out, "}}")
            }

            Stmt::While(while_stmt) => {
                writeln!(self.out, "while {}: {{", expr_to_source(&while_stmt.condition))?;
                self.stmts(&while_stmt.body)?;
                writeln!(self.out, "}}")
            }

            Stmt::Return(ret) => writeln!(self.out, "return {}", expr_to_source(&ret.value)),

            Stmt::Print(print) => {
                writeln!(self.out, "print({})", expr_to_source(&print.value))
            }
        }
    }
}

fn expr_to_source(expr: &Expr<'_>) -> String {
    match expr {
        Expr::This(_) => "this".to_owned(),
        Expr::Int(lit) => lit.0.value.to_string(),
        Expr::Var(name) => name.to_string(),
        Expr::New(new) => format!("@{}", new.0),

        Expr::BinOp(bin_op) => format!(
            "({} {} {})",
            expr_to_source(&bin_op.lhs),
            slice_formatter(bin_op.op.symbol().as_slice()),
            expr_to_source(&bin_op.rhs)
        ),

        Expr::FieldRead(field_read) => format!(
            "&{}.{}",
            expr_to_source(&field_read.base),
            field_read.field
        ),

        Expr::MethodCall(call) => format!(
            "^{}.{}({})",
            expr_to_source(&call.base),
            call.method,
            call.args.iter().map(expr_to_source).join(", ")
        ),
    }
}
