use volley::context::Environment;
use volley::status::ExitStatus;

/// Entry point: installs the Ctrl+C handler and calls core::run()
fn main() -> ExitStatus {
    // In-flight requests are abandoned on interrupt
    ctrlc::set_handler(|| {
        eprintln!("\nInterrupted");
        std::process::exit(ExitStatus::Interrupted as i32);
    })
    .ok();

    let args: Vec<String> = std::env::args().collect();
    volley::core::run(args, Environment::init())
}
