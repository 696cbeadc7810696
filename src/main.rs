fn main() {
    if let Err(err) = fisherman::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
