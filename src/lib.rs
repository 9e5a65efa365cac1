//! Compiler for the Nitro language.
//!
//! The pipeline is three small stages composed by value:
//! - `lexer` turns the raw source into a flat stream of located tokens.
//! - `parser` owns all syntactic knowledge and builds the statement AST.
//! - `codegen` walks the AST into a jump-resolved textual IR buffer.
//!
//! Warnings travel through a `Vec<Msg>` side channel; the first hard error
//! aborts the pipeline.

pub mod ast;
pub mod buffer;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod message;
pub mod parser;
pub mod parsercore;
pub mod token;

pub use codegen::{Artifact, CodeGen, Target};
pub use error::Error;
pub use lexer::Lexer;
pub use message::Msg;
pub use parsercore::Parser;

/// Compile a Nitro source string into the linear IR byte buffer.
pub fn compile(
    file: &str,
    source: &str,
    target: Target,
    msgs: &mut Vec<Msg>,
) -> Result<Vec<u8>, Error> {
    let tokens = Lexer::new(file, source).tokenize(msgs)?;
    let program = Parser::new(tokens).parse()?;
    let artifact = CodeGen::generate(&program, target, msgs)?;
    Ok(artifact.code)
}
