use clap::{Parser, Subcommand};
use regbank::backup::{open_backup, save_backup, REGIST_FILE};
use regbank::{patch_banks, read_map, rearrange_banks, write_map, UsageError};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "regbank", version,
          about = "Rearrange and patch PSR-9000 registration bank backups")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a backup and print its registration map
    Split {
        /// Existing user data backup directory
        input: PathBuf,
        /// Map file to create (default: standard output)
        #[arg(short, long)]
        map: Option<PathBuf>,
    },
    /// Read a backup and an edited map, then create a rearranged backup
    Create {
        /// Existing user data backup directory
        input: PathBuf,
        /// New backup directory (must not exist yet)
        output: PathBuf,
        /// Edited map file (default: standard input)
        #[arg(short, long)]
        map: Option<PathBuf>,
    },
    /// Overwrite a byte range in every non-empty registration
    Patch {
        /// Existing user data backup directory
        input: PathBuf,
        /// Backup directory to write
        output: PathBuf,
        /// Byte offset inside each registration record (minimum 32)
        #[arg(short, long)]
        seek: u64,
        /// Replacement bytes as a hex string (e.g. 310f)
        #[arg(short, long)]
        bytes: String,
    },
    /// Show the banks and registrations inside a backup
    Info {
        input: PathBuf,
        /// Emit machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    match Cli::parse().command {

        // ── Split ────────────────────────────────────────────────────────────
        Commands::Split { input, map } => {
            check_input_dir(&input)?;
            if let Some(path) = &map {
                if path.exists() {
                    return Err(usage("Map file already exists"));
                }
            }

            let banks = open_backup(&input)?;
            match map {
                Some(path) => {
                    let mut writer = BufWriter::new(File::create(&path)?);
                    write_map(&banks, &mut writer)?;
                    writer.flush()?;
                }
                None => write_map(&banks, &mut io::stdout().lock())?,
            }
        }

        // ── Create ───────────────────────────────────────────────────────────
        Commands::Create { input, output, map } => {
            check_input_dir(&input)?;
            if input == output {
                return Err(usage("Input must be different from output"));
            }
            if output.exists() {
                return Err(usage("Output directory already exists"));
            }
            if let Some(path) = &map {
                if !path.exists() {
                    return Err(usage("Map file does not exist"));
                }
            }

            let banks = open_backup(&input)?;
            let plan = match map {
                Some(path) => read_map(BufReader::new(File::open(&path)?))?,
                None => read_map(io::stdin().lock())?,
            };
            let rearranged = rearrange_banks(&banks, &plan)?;
            save_backup(&output, &rearranged)?;
            println!("Created: {}", output.display());
        }

        // ── Patch ────────────────────────────────────────────────────────────
        Commands::Patch { input, output, seek, bytes } => {
            check_input_dir(&input)?;
            if seek < 32 {
                return Err(usage(
                    "Seek position must be at least 32 bytes to skip the registration header",
                ));
            }
            let replacement = hex::decode(bytes.trim())
                .map_err(|e| UsageError(format!("Bad hex byte string: {e}")))?;
            if input == output {
                eprintln!("WARNING: Input directory is the same as output directory");
            }

            let mut banks = open_backup(&input)?;
            patch_banks(&mut banks, seek, &replacement);
            save_backup(&output, &banks)?;
            println!("Patched: {}", output.display());
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input, json } => {
            check_input_dir(&input)?;
            let banks = open_backup(&input)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&banks)?);
            } else {
                println!("{:<5} {:<18} {:>10} {:>8}  Registrations",
                         "Bank", "Name", "Position", "Size");
                for bank in &banks {
                    let names: Vec<&str> = bank.registrations.iter()
                        .filter(|r| !r.empty)
                        .map(|r| r.name.as_str())
                        .collect();
                    println!("{:<5} {:<18} {:>10} {:>8}  {}",
                             bank.number + 1, bank.name, bank.position, bank.size,
                             names.join(", "));
                }
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn usage(msg: &str) -> Box<dyn std::error::Error> {
    Box::new(UsageError(msg.to_owned()))
}

fn check_input_dir(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(usage("Input directory does not exist"));
    }
    if !input.is_dir() {
        return Err(usage("Input path is not a directory"));
    }
    if !input.join(REGIST_FILE).exists() {
        return Err(usage("No registrations found inside input directory"));
    }
    Ok(())
}
