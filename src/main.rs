use clap::Parser;
use cli::Cli;

mod cli;
mod driver;

pub fn interface() -> driver::Result {
    let Cli { input } = Cli::parse();
    let mut session = driver::Session::new();

    match input {
        Some(path) => session.run_file(&path),
        None => session.repl(),
    }
}

fn main() {
    match interface() {
        Ok(()) => (),
        Err(error) => {
            println!("{error}");
        }
    }
}
