fn main() {
    if let Err(err) = parquet_retype::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
