fn main() {
    if let Err(e) = moforge::run_cli() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
