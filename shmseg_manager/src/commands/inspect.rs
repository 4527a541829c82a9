//! `shmseg inspect`

use anyhow::{Context, Result};
use colored::*;
use shmseg_core::memory::platform::shm_object_path;
use shmseg_core::{AccessMode, ReadOnly, ReadWrite, SharedMemory};
use std::fmt::Write as _;

const BYTES_PER_LINE: usize = 16;

/// Run the inspect command
pub fn run_inspect(name: &str, read_only: bool, bytes: usize) -> Result<()> {
    if read_only {
        let shm = SharedMemory::<ReadOnly>::connect_as(name)
            .with_context(|| format!("Failed to attach to '{}'", name))?;
        print_segment(&shm, bytes);
    } else {
        let shm = SharedMemory::<ReadWrite>::connect_as(name)
            .with_context(|| format!("Failed to attach to '{}'", name))?;
        print_segment(&shm, bytes);
    }
    Ok(())
}

/// Print a summary of the segment followed by a hex dump of up to `bytes` bytes
pub fn print_segment<M: AccessMode>(shm: &SharedMemory<M>, bytes: usize) {
    println!("{}", "Shared memory segment".cyan().bold());
    println!("  {:<10} {}", "name:", shm.name().yellow());
    println!("  {:<10} {} bytes", "size:", shm.size());
    println!(
        "  {:<10} {}",
        "access:",
        if shm.read_only() { "read-only" } else { "read-write" }
    );
    println!(
        "  {:<10} {}",
        "owner:",
        if shm.is_created() { "yes (unlinks on exit)" } else { "no" }
    );
    if let Some(path) = shm_object_path(shm.name()) {
        println!("  {:<10} {}", "path:", path.display());
    }

    if !shm.is_mapped() {
        println!();
        println!("{}", "(empty segment, nothing mapped)".dimmed());
        return;
    }

    let data = shm.as_bytes();
    let shown = bytes.min(data.len());
    println!();
    print!("{}", hex_dump(&data[..shown]));
    if shown < data.len() {
        println!("{}", format!("... {} more bytes", data.len() - shown).dimmed());
    }
}

/// Classic offset / hex / ASCII dump, 16 bytes per line
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let _ = write!(out, "{:08x}  ", line * BYTES_PER_LINE);
        for i in 0..BYTES_PER_LINE {
            match chunk.get(i) {
                Some(byte) => {
                    let _ = write!(out, "{:02x} ", byte);
                }
                None => out.push_str("   "),
            }
        }
        out.push(' ');
        for byte in chunk {
            out.push(if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            });
        }
        out.push('\n');
    }
    out
}
