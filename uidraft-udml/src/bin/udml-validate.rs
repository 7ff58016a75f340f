use std::env;
use std::fs;
use std::process;

use uidraft_udml::{validate, UdmlError};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: udml-validate <file.udml>...");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  udml-validate ui.udml");
        eprintln!("  udml-validate *.udml");
        process::exit(1);
    }

    let mut exit_code = 0;

    for file_path in &args[1..] {
        match validate_file(file_path) {
            Ok(()) => {
                println!("✓ {} is valid", file_path);
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file_path);
                eprintln!("  {}", e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn validate_file(path: &str) -> Result<(), UdmlError> {
    let content = fs::read_to_string(path)
        .map_err(|e| UdmlError::XmlError(format!("Failed to read file: {}", e)))?;
    validate(&content)
}
