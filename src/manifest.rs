//! `USERFILE.INI` manifest writer.
//!
//! A freshly created backup directory carries a plain-text manifest
//! enumerating the container size and the per-bank file names.  Every line
//! is CRLF-terminated.  The `[TOTAL USER DATA SIZE]` value is the container
//! byte count with a literal `KB` suffix — a quirk of the source format,
//! reproduced as observed.

use std::io::{self, Write};

pub const MANIFEST_FILE: &str = "USERFILE.INI";

pub fn write_userfile_ini<W: Write>(
    writer: &mut W,
    container_size: u64,
    bank_files: &[String],
) -> io::Result<()> {
    let mut line = |text: &str| -> io::Result<()> { write!(writer, "{text}\r\n") };

    line("[TITLE]")?;
    line("9000Pro USERFILE.INI")?;
    line("YAMAHA Corporation")?;
    line("[DISK NO]")?;
    line("DISK000")?;
    line("[INSTRUMENT]")?;
    line("9000Pro")?;
    line("[VERSION]")?;
    line("Ver2.06")?;
    line("[TOTAL USER DATA SIZE]")?;
    line(&format!("{container_size}KB"))?;
    line("[REGISTRATION]")?;
    line(&format!("TOTAL FILE NUM:{}", bank_files.len()))?;
    for (index, file) in bank_files.iter().enumerate() {
        line(&format!("{} = {}", index + 1, file))?;
    }
    line("[DATAEND]")?;
    Ok(())
}
