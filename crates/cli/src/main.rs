fn main() {
    if let Err(e) = jarweave_cli::run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
