fn main() {
    if let Err(err) = moodlog_lib::run() {
        eprintln!("moodlog: {err:?}");
        std::process::exit(1);
    }
}
