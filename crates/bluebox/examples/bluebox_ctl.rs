//! Configure a Bluebox and move data through it.
//!
//! # Usage
//!
//! ```sh
//! # Tune to 437.425 MHz and start receiving
//! cargo run --example bluebox_ctl -- --freq 437425000 --rx
//!
//! # Transmit a PN9 test pattern
//! cargo run --example bluebox_ctl -- --freq 433920000 --testmode pn9 --tx
//!
//! # Send a payload, then print whatever comes back
//! cargo run --example bluebox_ctl -- --send "hello" --receive
//!
//! # Reboot into the bootloader
//! cargo run --example bluebox_ctl -- --bootloader
//! ```

use bluebox::{Bluebox, Config, TestMode, DEFAULT_RECEIVE_LENGTH};
use std::env;
use std::process;
use std::time::Duration;

#[derive(Debug, Default)]
struct Args {
    freq_hz: Option<u32>,
    test_mode: Option<TestMode>,
    tx: bool,
    rx: bool,
    send: Option<String>,
    receive: bool,
    bootloader: bool,
    help: bool,
}

fn parse_test_mode(name: &str) -> Option<TestMode> {
    match name {
        "carrier" => Some(TestMode::Carrier),
        "high" => Some(TestMode::High),
        "low" => Some(TestMode::Low),
        "1010" => Some(TestMode::Pattern1010),
        "pn9" => Some(TestMode::Pn9),
        "syncword" => Some(TestMode::SyncWord),
        _ => None,
    }
}

fn next_value<'a>(argv: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    argv.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing value for {}", flag))
}

/// Parse command-line arguments (without the program name).
fn parse_args(argv: &[String]) -> Result<Args, String> {
    let mut args = Args::default();
    let mut i = 0;

    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => args.help = true,
            flag @ ("-f" | "--freq") => {
                let value = next_value(argv, &mut i, flag)?;
                let hz = value
                    .parse()
                    .map_err(|_| format!("Invalid frequency: {:?}", value))?;
                args.freq_hz = Some(hz);
            }
            flag @ ("-t" | "--testmode") => {
                let value = next_value(argv, &mut i, flag)?;
                let mode =
                    parse_test_mode(value).ok_or_else(|| format!("Invalid test mode: {:?}", value))?;
                args.test_mode = Some(mode);
            }
            "--tx" => args.tx = true,
            "--rx" => args.rx = true,
            flag @ ("-s" | "--send") => {
                args.send = Some(next_value(argv, &mut i, flag)?.to_string());
            }
            "-r" | "--receive" => args.receive = true,
            "--bootloader" => args.bootloader = true,
            other => return Err(format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    Ok(args)
}

fn print_help() {
    println!("Usage: bluebox_ctl [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -f, --freq <HZ>         Set carrier frequency");
    println!("  -t, --testmode <MODE>   carrier|high|low|1010|pn9|syncword");
    println!("      --tx                Enter TX mode");
    println!("      --rx                Enter RX mode");
    println!("  -s, --send <TEXT>       Write TEXT to the data endpoint");
    println!("  -r, --receive           Read one packet from the data endpoint");
    println!("      --bootloader        Reboot into the bootloader");
    println!("  -h, --help              Show this help");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let argv: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run with --help for usage.");
            process::exit(2);
        }
    };
    if args.help {
        print_help();
        return;
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default().with_bulk_timeout(Some(Duration::from_secs(5)));
    println!("Waiting for Bluebox...");
    let mut radio = Bluebox::open_with(&config)?;
    println!("Opened {} {}", radio.product(), radio.serial());

    if args.bootloader {
        radio.enter_bootloader();
        println!("Bootloader requested");
        return Ok(());
    }

    if let Some(freq) = args.freq_hz {
        radio.set_frequency(freq)?;
        println!("Frequency: {} Hz", freq);
    }

    if let Some(mode) = args.test_mode {
        radio.enter_test_mode(mode)?;
        println!("Test mode: {:?}", mode);
    }

    if args.tx {
        radio.enter_tx_mode()?;
        println!("TX mode");
    } else if args.rx {
        radio.enter_rx_mode()?;
        println!("RX mode");
    }

    if let Some(text) = &args.send {
        let n = radio.send_data(text.as_bytes())?;
        println!("Sent {} bytes", n);
    }

    if args.receive {
        let data = radio.receive_data(DEFAULT_RECEIVE_LENGTH)?;
        println!("Received {} bytes: {}", data.len(), String::from_utf8_lossy(&data));
    }

    println!("RSSI: {} dBm", radio.read_rssi()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_valid_arguments() {
        let args = parse_args(&argv(&["--freq", "433920000", "-t", "pn9", "--tx"])).unwrap();
        assert_eq!(args.freq_hz, Some(433_920_000));
        assert_eq!(args.test_mode, Some(TestMode::Pn9));
        assert!(args.tx);
    }

    #[test]
    fn test_invalid_frequency_is_rejected() {
        let err = parse_args(&argv(&["--freq", "433.92M"])).unwrap_err();
        assert!(err.contains("Invalid frequency"), "got: {}", err);
    }

    #[test]
    fn test_unknown_test_mode_is_rejected() {
        let err = parse_args(&argv(&["--testmode", "sine"])).unwrap_err();
        assert!(err.contains("Invalid test mode"), "got: {}", err);
    }

    #[test]
    fn test_missing_value_is_rejected() {
        let err = parse_args(&argv(&["--freq"])).unwrap_err();
        assert_eq!(err, "Missing value for --freq");
    }
}
