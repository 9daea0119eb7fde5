use colored::Colorize;
use handler_testgen::cli::{CommandLineInterface, Outcome};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let command_line_interface = CommandLineInterface::load();
    match command_line_interface.run() {
        Ok(Outcome::Generated(summary)) => {
            eprintln!(
                "{} {} test cases across {} functions → {}",
                "✅ generated".green().bold(),
                summary.cases,
                summary.functions,
                summary.output.display(),
            );
        }
        Ok(Outcome::Printed) => {}
        Err(error) => {
            eprintln!("{} {error:#}", "❌ error:".red().bold());
            std::process::exit(1);
        }
    }
}
