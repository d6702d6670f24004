use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use flexi_logger::with_thread;
use ksend::config::{Args, ProducerConfig};
use ksend::{producer, template};
use log::{error, info};

fn main() -> ExitCode {
    flexi_logger::Logger::try_with_str("info")
        .unwrap()
        .format(with_thread)
        .start()
        .unwrap();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help lands here too: usage prints, exit stays non-zero
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    if args.generate {
        return match template::generate() {
            Ok(path) => {
                info!("generated client config template {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("generate client config template error {:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match ProducerConfig::resolve(args) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(field) = config.missing_field() {
        println!("{} is required", field);
        let _ = Args::command().print_help();
        return ExitCode::FAILURE;
    }

    if let Err(e) = producer::run(&config) {
        error!("execution error {:#}", e);
        return ExitCode::FAILURE;
    }
    info!("execution success");
    ExitCode::SUCCESS
}
