mod app;
mod entrypoints;

fn main() -> std::process::ExitCode {
    entrypoints::run::native_main()
}
