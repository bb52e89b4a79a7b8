use std::env;
use std::error::Error;
use std::process;

use log::{debug, error};

use re2dfa::{is_odd_palindrome, Dfa, Nfa};

static USAGE: &str = "usage: re2dfa [--dot FILE] [--nfa-dot FILE] <regex> [input ...]
       re2dfa palindrome [input ...]";

struct Options {
    regex: String,
    inputs: Vec<String>,
    dot: Option<String>,
    nfa_dot: Option<String>,
}

enum Command {
    Compile(Options),
    Palindrome(Vec<String>),
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Option<Command> {
    let mut dot = None;
    let mut nfa_dot = None;
    let mut positional = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dot" => dot = Some(args.next()?),
            "--nfa-dot" => nfa_dot = Some(args.next()?),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let first = positional.next()?;
    if first == "palindrome" && dot.is_none() && nfa_dot.is_none() {
        return Some(Command::Palindrome(positional.collect()));
    }
    Some(Command::Compile(Options {
        regex: first,
        inputs: positional.collect(),
        dot,
        nfa_dot,
    }))
}

fn compile(options: Options) -> Result<(), Box<dyn Error>> {
    let nfa = Nfa::re2nfa(&options.regex)?;
    if let Some(path) = &options.nfa_dot {
        nfa.write(path)?;
        debug!("wrote nfa to {}", path);
    }

    let dfa = Dfa::nfa2dfa(&nfa);
    if let Some(path) = &options.dot {
        dfa.write(path)?;
        debug!("wrote dfa to {}", path);
    }

    for input in &options.inputs {
        println!("{:?}: {}", input, dfa.accepts(input));
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let command = match parse_args(env::args().skip(1)) {
        Some(command) => command,
        None => {
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    let result = match command {
        Command::Compile(options) => compile(options),
        Command::Palindrome(inputs) => {
            for input in &inputs {
                println!("{:?}: {}", input, is_odd_palindrome(input));
            }
            Ok(())
        }
    };

    process::exit(match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            eprintln!("re2dfa: {}", e);
            1
        }
    });
}
