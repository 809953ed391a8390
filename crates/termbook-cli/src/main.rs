use std::process;

fn main() {
    match termbook_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("termbook error: {err:#}");
            process::exit(1);
        }
    }
}
