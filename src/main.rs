use clap::Parser;
use color_print::cprintln;
use nitroc::codegen::{CodeGen, Target};
use nitroc::lexer::Lexer;
use nitroc::message::{self, Msg};
use nitroc::parsercore::Parser as NitroParser;
use std::process;

#[derive(Debug, clap::Parser)]
#[clap(author, version, about)]
struct Args {
    /// Input source file
    input: String,

    /// Output file for the generated code
    output: String,

    /// Compilation target
    #[clap(short, long, default_value = "debug")]
    target: String,

    /// Enable verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let source = match std::fs::read_to_string(&args.input) {
        Ok(source) => source,
        Err(err) => {
            cprintln!("<red,bold>error</>: Cannot open file {}: {}", args.input, err);
            process::exit(1);
        }
    };

    let target: Target = match args.target.parse() {
        Ok(target) => target,
        Err(err) => {
            cprintln!("<red,bold>error</>: {}", err);
            process::exit(1);
        }
    };

    let mut msgs: Vec<Msg> = Vec::new();

    // 1. Tokenize
    let tokens = match Lexer::new(&args.input, &source).tokenize(&mut msgs) {
        Ok(tokens) => tokens,
        Err(err) => {
            msgs.push(Msg::error(err.to_string(), Some(err.loc().clone())));
            message::dump(&msgs, &source);
            process::exit(1);
        }
    };
    if args.verbose {
        println!("=== Tokens ===");
        for (idx, token) in tokens.iter().enumerate() {
            println!("{:>3}: {:?}", idx, token.kind);
        }
    }

    // 2. Parse
    let program = match NitroParser::new(tokens).parse() {
        Ok(program) => program,
        Err(err) => {
            msgs.push(Msg::error(err.to_string(), err.loc().cloned()));
            message::dump(&msgs, &source);
            process::exit(1);
        }
    };
    if args.verbose {
        println!("=== AST ===");
        println!("{:#?}", program);
    }

    // 3. Generate
    let artifact = match CodeGen::generate(&program, target, &mut msgs) {
        Ok(artifact) => artifact,
        Err(err) => {
            msgs.push(Msg::error(err.to_string(), Some(err.loc().clone())));
            message::dump(&msgs, &source);
            process::exit(1);
        }
    };

    message::dump(&msgs, &source);

    // The artifact is written even when the generator hit an internal
    // error, so the surviving output stays inspectable.
    if let Err(err) = std::fs::write(&args.output, &artifact.code) {
        cprintln!("<red,bold>error</>: Cannot write file {}: {}", args.output, err);
        process::exit(1);
    }
    if message::has_error(&msgs) {
        process::exit(1);
    }

    cprintln!(
        "<green,bold>Compiled</> {} to {} ({} bytes)",
        args.input,
        args.output,
        artifact.code.len()
    );
}
