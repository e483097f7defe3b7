use std::error::Error;
use std::io::{self, BufRead, Write};

use clap::{crate_name, crate_version, Arg, Command};

const PROMPT: &str =
    "Enter in this format: src: origFile dest: destinationFile mode: mode {arguments}, press e to exit:";

fn main() {
    pretty_env_logger::init();

    let matches = Command::new(crate_name!())
        .version(crate_version!())
        .about("Filters WARC containers and CDX indexes, builds indexes, and re-materializes records")
        .arg(
            Arg::new("command")
                .multiple_values(true)
                .help("Inline command, e.g.: src: a.warc.gz dest: out.warc mode: warc url: example.com"),
        )
        .get_matches();

    match matches.values_of("command") {
        Some(values) => {
            let line = values.collect::<Vec<_>>().join(" ");
            if let Err(e) = run_command(&line) {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        }
        None => prompt_loop(),
    }
}

/// Parse and execute one command line.
fn run_command(line: &str) -> Result<(), Box<dyn Error>> {
    let request = warcsift::command::parse(line)?;
    let summary = warcsift::run(&request)?;
    println!(
        "Finished writing {} records to {}",
        summary.records_written,
        request.dest.display()
    );
    Ok(())
}

/// Read commands from standard input until the user exits.
///
/// A failed command is reported and the loop continues, so one bad
/// invocation never ends the session.
fn prompt_loop() {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        println!("{}", PROMPT);
        if io::stdout().flush().is_err() {
            return;
        }

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        match line.trim() {
            "e" | "E" => return,
            "" => continue,
            command => {
                if let Err(e) = run_command(command) {
                    eprintln!("ERROR: {}", e);
                }
            }
        }
    }
}
