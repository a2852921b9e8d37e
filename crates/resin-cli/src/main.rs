use std::fs;
use std::io::{self, Read};
use std::process;

use owo_colors::OwoColorize;
use resin_eval::Evaluator;
use resin_lexer::Lexer;
use resin_parser::Binder;
use resin_syntax::error::Error;
use resin_syntax::printer;

fn render_error(kind: &str, source: &str, err: &Error) {
    eprintln!("{}: {}", kind.red().bold(), err.msg.red());
    if let (Some(row), Some(col)) = (err.row, err.col) {
        if let Some(src_line) = source.lines().nth(row as usize) {
            eprintln!("  {}", src_line.bright_black());
            let mut marker = String::new();
            marker.push_str(&" ".repeat(col as usize));
            marker.push('^');
            eprintln!("  {}", marker.red());
        } else {
            eprintln!("  at {}:{}", row, col);
        }
    }
}

fn fail(msg: String) -> ! {
    eprintln!("{}: {}", "error".red().bold(), msg.red());
    process::exit(-1);
}

fn main() {
    let mut args = std::env::args().skip(1);
    let path = args.next();
    if args.next().is_some() {
        fail("expected at most one program file".to_string());
    }

    let src = match &path {
        Some(p) => match fs::read_to_string(p) {
            Ok(s) => s,
            Err(e) => fail(format!("failure reading input file {}: {}", p, e)),
        },
        None => {
            let mut buf = String::new();
            match io::stdin().read_to_string(&mut buf) {
                Ok(_) => buf,
                Err(e) => fail(format!("failure reading input: {}", e)),
            }
        }
    };

    // an empty program is not an error; there is just nothing to do
    if src.is_empty() {
        return;
    }

    let tokens = match Lexer::new(&src).tokenize() {
        Ok(t) => t,
        Err(e) => {
            render_error("lex error", &src, &e);
            println!("failure");
            process::exit(-1);
        }
    };

    let mut tree = match Binder::new(tokens).parse_program() {
        Ok(t) => t,
        Err(e) => {
            render_error("parse error", &src, &e);
            println!("failure");
            process::exit(-1);
        }
    };

    print!("{}", printer::render(&tree));
    println!("success");

    let result = {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut evaluator = Evaluator::new(stdin.lock(), stdout.lock());
        evaluator.run(&mut tree)
    };

    match result {
        Ok(value) => {
            println!("{}", value);
            print!("{}", printer::render(&tree));
        }
        Err(e) => {
            render_error("runtime error", &src, &e);
            process::exit(-1);
        }
    }
}
