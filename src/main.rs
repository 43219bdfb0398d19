//! Command-line decoder for mAadhaar Secure QR payloads

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

use aadhaar_qr::{classify, decode_full, PayloadKind};

#[derive(Parser)]
#[command(name = "aadhaar-qr")]
#[command(about = "Decode mAadhaar Secure QR payloads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a Secure QR payload and print the identity record
    Decode {
        #[command(flatten)]
        source: Source,

        /// Also print every raw field, the photo and the signature
        #[arg(long)]
        full: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Report which kind of QR text the payload is
    Classify {
        #[command(flatten)]
        source: Source,
    },
}

/// Where the scanned QR text comes from; stdin when neither is given
#[derive(Args)]
struct Source {
    /// Scanned QR text
    #[arg(conflicts_with = "input")]
    payload: Option<String>,

    /// File holding the scanned QR text
    #[arg(short, long)]
    input: Option<PathBuf>,
}

impl Source {
    fn read(self) -> Result<String> {
        let text = match (self.payload, self.input) {
            (Some(payload), _) => payload,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
                text
            }
        };
        Ok(text.trim().to_string())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match cli.command {
        Commands::Decode { source, full, json } => cmd_decode(source.read()?, full, json),
        Commands::Classify { source } => cmd_classify(source.read()?),
    }
}

fn cmd_classify(payload: String) -> Result<()> {
    let kind = classify(&payload);
    log::debug!("Classified {} chars as {}", payload.len(), kind);
    println!("{}", kind);
    Ok(())
}

fn cmd_decode(payload: String, full: bool, json: bool) -> Result<()> {
    match classify(&payload) {
        PayloadKind::MAadhaar => {}
        PayloadKind::PhysicalCard => anyhow::bail!(
            "This is the XML QR of a physical card or eAadhaar; scan the Secure QR from the mAadhaar app"
        ),
        PayloadKind::Unrecognized => anyhow::bail!("Not an mAadhaar Secure QR payload"),
    }

    log::info!("Decoding Secure QR payload of {} digits", payload.len());
    let data = decode_full(&payload).context("Failed to decode Secure QR")?;
    let record = data.identity_record();
    log::debug!("Found {} delimiters, photo {} bytes", data.delimiter_count, data.photo.len());

    if json {
        let out = if full {
            serde_json::to_string_pretty(&data)?
        } else {
            serde_json::to_string_pretty(&record)?
        };
        println!("{}", out);
        return Ok(());
    }

    println!("Aadhaar Data:");
    println!("Name: {}", record.name);
    println!("Gender: {}", record.gender);
    println!("Date of Birth: {}", record.date_of_birth);
    println!("Aadhaar Last 4 Digits: {}", record.aadhaar_last_4_digits);
    println!("Address: {}", record.address);
    println!("Pincode: {}", record.pincode.as_deref().unwrap_or("N/A"));
    println!("State: {}", record.state.as_deref().unwrap_or("N/A"));
    if let Some(age) = record.age() {
        println!("Age: {} years", age);
    }

    if full {
        let address = &data.address;
        println!();
        println!("Version: {}", data.version);
        println!("Reference ID: {}", data.reference_id);
        println!("Email/Mobile Indicator: {}", data.email_mobile_indicator);
        println!("Mobile Last Digits: {}", data.mobile_last_digits);
        println!("\nAddress:");
        println!("  Care of: {}", address.care_of);
        println!("  House: {}", address.house);
        println!("  Street: {}", address.street);
        println!("  Landmark: {}", address.landmark);
        println!("  Locality: {}", address.location);
        println!("  VTC: {}", address.vtc);
        println!("  Post Office: {}", address.post_office);
        println!("  Sub-district: {}", address.sub_district);
        println!("  District: {}", address.district);
        println!("  State: {}", address.state);
        println!("  Pincode: {}", address.pincode);

        println!("\nPhoto (Base64):\n{}", data.photo_base64());
        println!("\nSignature (Hex):\n{}", data.signature_hex());
    }

    Ok(())
}
