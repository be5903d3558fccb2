//! Directory-level surface — the primary embedding API.
//!
//! A "backup" is a user data directory containing `Regist.reg` (and, when
//! written by the hardware, a `USERFILE.INI` manifest).
//!
//! ```no_run
//! use regbank::backup::{open_backup, save_backup};
//!
//! let banks = open_backup("OLD_BACKUP".as_ref())?;
//! save_backup("NEW_BACKUP".as_ref(), &banks)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use log::debug;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::container::{read_banks, write_banks};
use crate::error::FormatError;
use crate::layout::long_name;
use crate::manifest::{write_userfile_ini, MANIFEST_FILE};
use crate::model::Bank;

/// File name of the binary container inside a backup directory.
pub const REGIST_FILE: &str = "Regist.reg";

/// Decode the container inside a backup directory.
pub fn open_backup(dir: &Path) -> Result<Vec<Bank>, FormatError> {
    let path = dir.join(REGIST_FILE);
    debug!("reading {}", path.display());
    let mut reader = BufReader::new(File::open(path)?);
    read_banks(&mut reader)
}

/// Write a bank list into a backup directory.
///
/// The directory is created when absent, and only in that case is a
/// `USERFILE.INI` manifest synthesized alongside the container — an already
/// existing directory is assumed to carry its own.
pub fn save_backup(dir: &Path, banks: &[Bank]) -> io::Result<()> {
    let fresh = !dir.exists();
    if fresh {
        fs::create_dir(dir)?;
    }

    let container_path = dir.join(REGIST_FILE);
    let mut writer = BufWriter::new(File::create(&container_path)?);
    write_banks(banks, &mut writer)?;
    writer.flush()?;
    debug!("wrote {}", container_path.display());

    if fresh {
        let container_size = fs::metadata(&container_path)?.len();
        let bank_files: Vec<String> = banks
            .iter()
            .map(|bank| long_name(&bank.name, bank.number))
            .collect();
        let mut manifest = BufWriter::new(File::create(dir.join(MANIFEST_FILE))?);
        write_userfile_ini(&mut manifest, container_size, &bank_files)?;
        manifest.flush()?;
    }
    Ok(())
}
