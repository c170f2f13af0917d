fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let code = friendlink::cli::run_from_env();
    std::process::exit(code);
}
