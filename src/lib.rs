//! A small statically-typed, object-oriented, expression-based scripting
//! language: tokenizer, tagger, parser, bootstrapped runtime model, and
//! tree-walking evaluator.
//!
//! [`Runner`] is the library's one public entry point; `src/bin/teko.rs` is a
//! thin wrapper around it for the command-line tool (`spec.md` §6).

pub mod ast;
pub mod bootstrap;
pub mod eval;
pub mod exception;
pub mod function;
pub mod heap;
pub mod io;
pub mod namespace;
pub mod object;
pub mod ops;
pub mod parser;
pub mod signature;
pub mod tag;
pub mod token;
pub mod util;
pub mod world;

use exception::RunResult;
use world::World;

/// Runs a Teko program to completion against a fresh bootstrapped [`World`],
/// for embedders that want the final runtime state.
pub struct Runner {
    world: World,
}

impl Runner {
    pub fn new() -> Self {
        Self { world: bootstrap::bootstrap() }
    }

    /// Like [`Runner::new`], but routes `print` output through `output`
    /// instead of the real stdout — see [`io::CollectStringPrint`].
    pub fn with_output(output: Box<dyn io::PrintWriter>) -> Self {
        let mut world = bootstrap::bootstrap();
        world.set_output(output);
        Self { world }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Tokenizes, tags, parses, and executes `source` in this runner's
    /// namespace, so successive calls share declarations the way a REPL
    /// session would.
    pub fn run(&mut self, source: &str) -> RunResult<()> {
        let tags = tag::tag_source(source)?;
        let stmts = parser::parse_program(&tags)?;
        eval::exec_program(&mut self.world, &stmts)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot convenience wrapper: bootstrap, then run `source` to completion.
/// `spec.md` §6's CLI invokes exactly this on the file it's given.
pub fn run_source(source: &str) -> RunResult<()> {
    Runner::new().run(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_source_executes_a_full_program() {
        assert!(run_source("int a = 1 + 2; assert(a == 3);").is_ok());
    }

    #[test]
    fn run_source_surfaces_typed_exceptions() {
        let err = run_source("int a = 1; a = \"oops\";").unwrap_err();
        assert_eq!(err.kind, exception::ExcKind::Static);
    }

    #[test]
    fn runner_shares_declarations_across_calls() {
        let mut runner = Runner::new();
        runner.run("int a = 5;").unwrap();
        runner.run("assert(a == 5);").unwrap();
    }
}
