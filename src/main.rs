fn main() {
    if let Err(err) = form_compiler::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
