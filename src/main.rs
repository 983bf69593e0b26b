fn main() {
    #[cfg(feature = "cli")]
    glslpack::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("glslpack: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
