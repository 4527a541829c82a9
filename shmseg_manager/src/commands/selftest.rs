//! `shmseg selftest`
//!
//! Create, attach, share a value, hit the bounds check and verify the name goes away
//! with its owner.

use anyhow::{bail, ensure, Context, Result};
use colored::*;
use shmseg_core::memory::platform::shm_object_exists;
use shmseg_core::{CreateOptions, SharedMemory};

const RW_TEST_VALUE: i32 = 0x42;
const RW_TEST_INDEX: usize = 5;

/// Smallest segment that holds the test element
pub const MIN_SIZE: usize = (RW_TEST_INDEX + 1) * std::mem::size_of::<i32>();

/// Run the self test against a fresh, uniquely named segment of `size` bytes
pub fn run_selftest(size: usize) -> Result<()> {
    if size < MIN_SIZE {
        bail!("self test needs at least {} bytes, got {}", MIN_SIZE, size);
    }

    let name = format!("/shmseg_selftest_{}", uuid::Uuid::new_v4().simple());
    println!("{} {}", "Running self test on".cyan().bold(), name.yellow());

    {
        let owner = SharedMemory::create(&name, CreateOptions::new().with_size(size))
            .context("create segment")?;
        step("created segment exclusively");

        if shm_object_exists(&name) == Some(false) {
            bail!("segment does not exist after create");
        }

        match SharedMemory::create(&name, CreateOptions::new().with_size(size)) {
            Ok(_) => bail!("exclusive create succeeded over a live segment"),
            Err(e) if e.is_system() => step("second exclusive create rejected"),
            Err(e) => return Err(e).context("second exclusive create"),
        }

        let mut peer = SharedMemory::connect(&name).context("attach read-write")?;
        ensure!(peer.size() == size, "attached size {} != {}", peer.size(), size);
        step("attached with matching size");

        *peer.at_mut::<i32>(RW_TEST_INDEX)? = RW_TEST_VALUE;
        ensure!(
            *owner.at::<i32>(RW_TEST_INDEX)? == RW_TEST_VALUE,
            "value written through the peer is not visible to the owner"
        );
        step("value shared between handles");

        ensure!(
            peer.at::<i32>(size).map_err(|e| e.is_out_of_range()).err() == Some(true),
            "out-of-range access was not rejected"
        );

        let reader = SharedMemory::connect_read_only(&name).context("attach read-only")?;
        ensure!(reader.size() == size, "read-only size {} != {}", reader.size(), size);
        ensure!(
            *reader.at::<i32>(RW_TEST_INDEX)? == RW_TEST_VALUE,
            "read-only handle does not see the shared value"
        );
        ensure!(
            reader.at::<i32>(size).map_err(|e| e.is_out_of_range()).err() == Some(true),
            "out-of-range access was not rejected on the read-only handle"
        );
        step("bounds check holds for read-write and read-only handles");
    }

    ensure!(
        SharedMemory::connect(&name).is_err(),
        "segment still attachable after its owner was dropped"
    );
    if shm_object_exists(&name) == Some(true) {
        bail!("segment was not removed");
    }
    step("segment removed with its owner");

    println!("{}", "Self test passed".green().bold());
    Ok(())
}

fn step(message: &str) {
    tracing::debug!("selftest: {}", message);
    println!("  {} {}", "✓".green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selftest_passes() {
        run_selftest(256).unwrap();
    }

    #[test]
    fn test_selftest_rejects_tiny_segment() {
        assert!(run_selftest(MIN_SIZE - 1).is_err());
    }
}
