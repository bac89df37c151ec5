fn main() {
    if let Err(err) = pie_outlabels::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
