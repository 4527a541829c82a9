//! `shmseg read` / `shmseg write`
//!
//! Element access through the bounds-checked path, with the element width chosen on
//! the command line.

use anyhow::{bail, Context, Result};
use colored::*;
use shmseg_core::{AccessMode, SharedMemory};

/// Element widths in bytes accepted by `--width`
pub const WIDTHS: [usize; 4] = [1, 2, 4, 8];

/// Read element `index` of width `width` as an unsigned integer
pub fn read_element<M: AccessMode>(
    shm: &SharedMemory<M>,
    index: usize,
    width: usize,
) -> Result<u64> {
    let value = match width {
        1 => u64::from(*shm.at::<u8>(index)?),
        2 => u64::from(*shm.at::<u16>(index)?),
        4 => u64::from(*shm.at::<u32>(index)?),
        8 => *shm.at::<u64>(index)?,
        _ => bail!("unsupported element width {} (expected one of {:?})", width, WIDTHS),
    };
    Ok(value)
}

/// Store `value` into element `index` of width `width`
pub fn write_element(
    shm: &mut SharedMemory,
    index: usize,
    width: usize,
    value: u64,
) -> Result<()> {
    let too_wide = || format!("value {:#x} does not fit in {} byte(s)", value, width);
    match width {
        1 => *shm.at_mut::<u8>(index)? = u8::try_from(value).with_context(too_wide)?,
        2 => *shm.at_mut::<u16>(index)? = u16::try_from(value).with_context(too_wide)?,
        4 => *shm.at_mut::<u32>(index)? = u32::try_from(value).with_context(too_wide)?,
        8 => *shm.at_mut::<u64>(index)? = value,
        _ => bail!("unsupported element width {} (expected one of {:?})", width, WIDTHS),
    }
    Ok(())
}

/// Run the read command
pub fn run_read(name: &str, index: usize, width: usize) -> Result<()> {
    let shm = SharedMemory::connect_read_only(name)
        .with_context(|| format!("Failed to attach to '{}'", name))?;

    let value = read_element(&shm, index, width)?;
    tracing::debug!(name, index, width, value, "read element");

    println!(
        "{}[{}] = {} ({})",
        name.yellow(),
        index,
        format!("{:#0w$x}", value, w = width * 2 + 2).bold(),
        value
    );
    Ok(())
}

/// Run the write command
pub fn run_write(name: &str, index: usize, width: usize, value: u64) -> Result<()> {
    let mut shm = SharedMemory::connect(name)
        .with_context(|| format!("Failed to attach to '{}'", name))?;

    write_element(&mut shm, index, width, value)?;
    tracing::debug!(name, index, width, value, "wrote element");

    println!(
        "{} {}[{}] = {:#x}",
        "✓".green(),
        name.yellow(),
        index,
        value
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(tag: &str) -> SharedMemory {
        let name = format!("/shmseg_cli_{}_{}", tag, uuid::Uuid::new_v4().simple());
        SharedMemory::create_with_size(&name, 64).unwrap()
    }

    #[test]
    fn test_write_then_read_each_width() {
        let mut shm = scratch("widths");
        for (slot, width) in WIDTHS.iter().enumerate() {
            write_element(&mut shm, slot, *width, 0x42).unwrap();
            assert_eq!(read_element(&shm, slot, *width).unwrap(), 0x42);
        }
    }

    #[test]
    fn test_value_too_wide_is_rejected() {
        let mut shm = scratch("narrow");
        assert!(write_element(&mut shm, 0, 1, 0x100).is_err());
        assert_eq!(read_element(&shm, 0, 1).unwrap(), 0);
    }

    #[test]
    fn test_unsupported_width_and_out_of_range() {
        let mut shm = scratch("bad_width");
        assert!(read_element(&shm, 0, 3).is_err());
        assert!(write_element(&mut shm, 0, 16, 1).is_err());
        assert!(read_element(&shm, 8, 8).is_err());
    }
}
