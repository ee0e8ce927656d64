use std::path::PathBuf;

use clap::{Args, CommandFactory, FromArgMatches, Parser as ClapParser};

#[derive(ClapParser, Debug, Clone)]
#[command(version, about = "Compiles Suffer source into a textual SSA IR")]
pub struct SufcConfig {
    /// The input file
    pub path: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// The pipeline stage to stop and dump the output at. At most one may be
/// given; with none, the full pipeline runs.
#[derive(Args, Debug, Clone)]
#[group(multiple = false)]
pub struct OutputArgs {
    /// Parse only and dump the AST
    #[arg(long)]
    pub print_ast: bool,

    /// Run the full pipeline and dump the IR (same as the default)
    #[arg(long)]
    pub print_cfg: bool,

    /// Lower to IR and dump it, skipping the SSA rewrite
    #[arg(long)]
    pub no_ssa: bool,

    /// Lower without the pinhole optimization and dump the IR, skipping
    /// the SSA rewrite
    #[arg(long)]
    pub no_opt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Full,
    PrintAst,
    NoSsa,
    NoOpt,
}

impl OutputArgs {
    pub fn mode(&self) -> Mode {
        if self.print_ast {
            Mode::PrintAst
        } else if self.no_ssa {
            Mode::NoSsa
        } else if self.no_opt {
            Mode::NoOpt
        } else {
            // --print-cfg is the default pipeline spelled out
            Mode::Full
        }
    }

    /// The pinhole is on unless `--no-opt` disables it.
    pub fn pinhole(&self) -> bool {
        !self.no_opt
    }
}

pub fn parse_args_or_exit() -> SufcConfig {
    fn parse_args() -> Result<SufcConfig, clap::Error> {
        let command = SufcConfig::command();
        let mut matches = command.try_get_matches()?;
        let cfg = SufcConfig::from_arg_matches_mut(&mut matches)?;

        Ok(cfg)
    }

    match parse_args() {
        Ok(cfg) => cfg,

        Err(e) => {
            e.format(&mut SufcConfig::command()).exit();
        }
    }
}
