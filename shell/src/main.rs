use anyhow::Result;
use rustyline::DefaultEditor;
use std::io::IsTerminal;
use tsh::{Config, Environment, Interpreter, PlainLines};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config: Config = argh::from_env();
    log::debug!("starting with {config:?}");

    let code = match run(config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("tsh: {err:#}");
            1
        }
    };
    std::process::exit(code);
}

fn run(config: Config) -> Result<i32> {
    let mut shell = Interpreter::new(Environment::new(), config);
    let mut stdout = std::io::stdout();
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        let mut editor = DefaultEditor::new()?;
        shell.repl(&mut editor, &mut stdout)
    } else {
        shell.repl(&mut PlainLines::new(stdin.lock()), &mut stdout)
    }
}
