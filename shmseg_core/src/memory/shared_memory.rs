// Named POSIX shared memory segment (shm_open + mmap) with owner-aware cleanup
use super::access::{AccessMode, ReadOnly, ReadWrite};
use super::options::CreateOptions;
use crate::error::{ShmError, ShmResult};
use bytemuck::Pod;
use std::ffi::CString;
use std::fmt;
use std::io;
use std::marker::PhantomData;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::ptr::{self, NonNull};
use std::slice;

/// Handle to a named shared memory object mapped into this process.
///
/// A handle is built either by [`connect_as`](Self::connect_as), which attaches to
/// an existing object, or by [`create_as`](Self::create_as), which creates (or
/// resizes) it and makes this handle the owner. `SharedMemory<ReadWrite>` and
/// `SharedMemory<ReadOnly>` add the shorthands `connect`/`create` and
/// `connect_read_only`/`create_read_only`.
///
/// Dropping the handle unmaps the region and closes the descriptor; an owning handle
/// also unlinks the name.
///
/// A zero-length object is never mapped: [`size`](Self::size) is 0, the base address
/// is null and every checked access is out of range.
///
/// ```no_run
/// use shmseg_core::{CreateOptions, SharedMemory};
///
/// let mut owner = SharedMemory::create("/counter", CreateOptions::new().with_size(256))?;
/// *owner.at_mut::<u32>(5)? = 0x42;
///
/// let reader = SharedMemory::connect_read_only("/counter")?;
/// assert_eq!(*reader.at::<u32>(5)?, 0x42);
/// # Ok::<(), shmseg_core::ShmError>(())
/// ```
pub struct SharedMemory<M: AccessMode = ReadWrite> {
    name: String,
    fd: Option<OwnedFd>,
    size: usize,
    addr: Option<NonNull<u8>>,
    created: bool,
    _mode: PhantomData<M>,
}

// The mapping is owned by the handle; shared access goes through `&self` and
// mutable access through `&mut self`.
unsafe impl<M: AccessMode> Send for SharedMemory<M> {}
unsafe impl<M: AccessMode> Sync for SharedMemory<M> {}

impl<M: AccessMode> SharedMemory<M> {
    /// Attach to an existing shared memory object with access mode `M` and map its
    /// current size.
    pub fn connect_as(name: &str) -> ShmResult<Self> {
        check_name(name)?;

        let mut shm = Self::acquire(name, open_flags::<M>(), 0)?;
        let size = shm.query_size()?;
        shm.map(size)?;

        log::debug!("connected to shared memory '{}' ({} bytes)", name, size);
        Ok(shm)
    }

    /// Create a shared memory object with access mode `M`, or resize an existing one
    /// when `options.exclusive` is false, and map it.
    ///
    /// The returned handle owns the name and unlinks it on drop, whether or not the
    /// object existed before.
    pub fn create_as(name: &str, options: CreateOptions) -> ShmResult<Self> {
        check_name(name)?;

        let mut flags = libc::O_CREAT | open_flags::<M>();
        if options.exclusive {
            flags |= libc::O_EXCL;
        }

        let mut shm = Self::acquire(name, flags, options.permission_bits())?;
        let size = if options.size > 0 {
            shm.resize(options.size)?;
            options.size
        } else {
            shm.query_size()?
        };
        shm.map(size)?;

        // Only a fully constructed handle owns the name. Until here a failure drops
        // `shm` as a plain attachment, which closes the descriptor and nothing else.
        shm.created = true;

        log::info!(
            "created shared memory '{}' ({} bytes, exclusive={}, mode={:o})",
            name,
            size,
            options.exclusive,
            options.permission_bits()
        );
        Ok(shm)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size of the mapping in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether this handle was built by [`create_as`](Self::create_as) and unlinks the name on drop.
    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn read_only(&self) -> bool {
        M::READ_ONLY
    }

    pub fn is_mapped(&self) -> bool {
        self.addr.is_some()
    }

    /// Base address of the mapping, null when the segment is empty.
    ///
    /// The caller is responsible for choosing a `T` that matches the data.
    pub fn as_ptr<T>(&self) -> *const T {
        self.addr
            .map_or(ptr::null(), |addr| addr.as_ptr().cast_const().cast())
    }

    /// The whole mapping as bytes (empty when unmapped).
    pub fn as_bytes(&self) -> &[u8] {
        match self.addr {
            Some(addr) => unsafe { slice::from_raw_parts(addr.as_ptr(), self.size) },
            None => &[],
        }
    }

    /// Element `index` of the mapping viewed as an array of `T`, without a bounds check.
    ///
    /// # Safety
    ///
    /// `(index + 1) * size_of::<T>()` must not exceed [`size`](Self::size) and the
    /// segment must be mapped.
    pub unsafe fn get_unchecked<T: Pod>(&self, index: usize) -> &T {
        &*self.as_ptr::<T>().add(index)
    }

    /// Element `index` of the mapping viewed as an array of `T`.
    ///
    /// Fails with [`ShmError::OutOfRange`] unless `(index + 1) * size_of::<T>() <= size()`.
    pub fn at<T: Pod>(&self, index: usize) -> ShmResult<&T> {
        self.range_check::<T>(index)?;
        Ok(unsafe { self.get_unchecked(index) })
    }

    fn range_check<T>(&self, index: usize) -> ShmResult<()> {
        let element_size = mem::size_of::<T>();
        let end = index
            .checked_add(1)
            .and_then(|count| count.checked_mul(element_size));

        match end {
            // A zero-sized element still needs a real base address to borrow from.
            Some(end) if (element_size > 0 || self.addr.is_some()) && end <= self.size => Ok(()),
            _ => Err(ShmError::OutOfRange {
                index,
                element_size,
                size: self.size,
            }),
        }
    }

    fn acquire(name: &str, flags: libc::c_int, mode: u32) -> ShmResult<Self> {
        let c_name = c_name(name)?;

        log::debug!("shm_open(name={}, flags={:#x}, mode={:o})", name, flags, mode);
        // Apple declares shm_open variadic, so the mode goes through integer promotion.
        #[cfg(target_vendor = "apple")]
        let mode = mode as libc::c_uint;
        #[cfg(not(target_vendor = "apple"))]
        let mode = mode as libc::mode_t;
        let fd = unsafe { libc::shm_open(c_name.as_ptr(), flags, mode) };
        if fd < 0 {
            return Err(ShmError::system("shm_open", name, io::Error::last_os_error()));
        }

        Ok(Self {
            name: name.to_string(),
            fd: Some(unsafe { OwnedFd::from_raw_fd(fd) }),
            size: 0,
            addr: None,
            created: false,
            _mode: PhantomData,
        })
    }

    fn raw_fd(&self, op: &'static str) -> ShmResult<RawFd> {
        self.fd
            .as_ref()
            .map(AsRawFd::as_raw_fd)
            .ok_or_else(|| {
                ShmError::system(op, &self.name, io::Error::from_raw_os_error(libc::EBADF))
            })
    }

    fn query_size(&self) -> ShmResult<usize> {
        let fd = self.raw_fd("fstat")?;

        log::debug!("fstat(fd={})", fd);
        let mut stat = mem::MaybeUninit::<libc::stat>::uninit();
        if unsafe { libc::fstat(fd, stat.as_mut_ptr()) } != 0 {
            return Err(ShmError::system("fstat", &self.name, io::Error::last_os_error()));
        }
        let stat = unsafe { stat.assume_init() };

        usize::try_from(stat.st_size).map_err(|_| {
            ShmError::system(
                "fstat",
                &self.name,
                io::Error::new(io::ErrorKind::InvalidData, "negative object size"),
            )
        })
    }

    fn resize(&self, size: usize) -> ShmResult<()> {
        let fd = self.raw_fd("ftruncate")?;
        let len = libc::off_t::try_from(size).map_err(|_| {
            ShmError::system("ftruncate", &self.name, io::Error::from_raw_os_error(libc::EFBIG))
        })?;

        log::debug!("ftruncate(fd={}, len={})", fd, size);
        if unsafe { libc::ftruncate(fd, len) } != 0 {
            return Err(ShmError::system("ftruncate", &self.name, io::Error::last_os_error()));
        }
        Ok(())
    }

    fn map(&mut self, size: usize) -> ShmResult<()> {
        if size == 0 {
            return Ok(());
        }

        let fd = self.raw_fd("mmap")?;
        let prot = if M::READ_ONLY {
            libc::PROT_READ
        } else {
            libc::PROT_READ | libc::PROT_WRITE
        };

        log::debug!(
            "mmap(addr=NULL, length={}, prot={:#x}, flags=MAP_SHARED, fd={}, offset=0)",
            size,
            prot,
            fd
        );
        let addr = unsafe { libc::mmap(ptr::null_mut(), size, prot, libc::MAP_SHARED, fd, 0) };
        if addr == libc::MAP_FAILED {
            return Err(ShmError::system("mmap", &self.name, io::Error::last_os_error()));
        }

        match NonNull::new(addr.cast::<u8>()) {
            Some(addr) => {
                self.addr = Some(addr);
                self.size = size;
                Ok(())
            }
            None => Err(ShmError::system(
                "mmap",
                &self.name,
                io::Error::new(io::ErrorKind::Other, "mapping returned a null address"),
            )),
        }
    }
}

impl SharedMemory<ReadWrite> {
    /// Attach read-write to an existing shared memory object.
    pub fn connect(name: &str) -> ShmResult<Self> {
        Self::connect_as(name)
    }

    /// Create (or, when not exclusive, resize) a read-write shared memory object.
    /// See [`create_as`](Self::create_as).
    pub fn create(name: &str, options: CreateOptions) -> ShmResult<Self> {
        Self::create_as(name, options)
    }

    /// Exclusive create with default permissions.
    pub fn create_with_size(name: &str, size: usize) -> ShmResult<Self> {
        Self::create(name, CreateOptions::new().with_size(size))
    }

    /// Mutable base address of the mapping, null when the segment is empty.
    pub fn as_mut_ptr<T>(&mut self) -> *mut T {
        self.addr
            .map_or(ptr::null_mut(), |addr| addr.as_ptr().cast())
    }

    /// The whole mapping as mutable bytes (empty when unmapped).
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self.addr {
            Some(addr) => unsafe { slice::from_raw_parts_mut(addr.as_ptr(), self.size) },
            None => &mut [],
        }
    }

    /// Mutable element `index` of the mapping viewed as an array of `T`, without a
    /// bounds check.
    ///
    /// # Safety
    ///
    /// Same contract as [`get_unchecked`](Self::get_unchecked).
    pub unsafe fn get_unchecked_mut<T: Pod>(&mut self, index: usize) -> &mut T {
        &mut *self.as_mut_ptr::<T>().add(index)
    }

    /// Mutable element `index` of the mapping viewed as an array of `T`.
    ///
    /// Same range check as [`at`](Self::at).
    pub fn at_mut<T: Pod>(&mut self, index: usize) -> ShmResult<&mut T> {
        self.range_check::<T>(index)?;
        Ok(unsafe { self.get_unchecked_mut(index) })
    }
}

impl SharedMemory<ReadOnly> {
    /// Attach read-only; the mapping is `PROT_READ`.
    pub fn connect_read_only(name: &str) -> ShmResult<Self> {
        Self::connect_as(name)
    }

    /// Create-or-resize opened with `O_RDONLY`.
    ///
    /// Resizing needs write access, so a non-zero `options.size` fails with `EINVAL`
    /// from `ftruncate` on most platforms.
    pub fn create_read_only(name: &str, options: CreateOptions) -> ShmResult<Self> {
        Self::create_as(name, options)
    }
}

impl<M: AccessMode> Drop for SharedMemory<M> {
    fn drop(&mut self) {
        // Every step runs even if an earlier one failed: unmap, close, then unlink.
        if let Some(addr) = self.addr.take() {
            log::debug!("munmap(addr={:p}, len={})", addr, self.size);
            if unsafe { libc::munmap(addr.as_ptr().cast(), self.size) } != 0 {
                log::warn!(
                    "munmap failed for shared memory '{}': {}",
                    self.name,
                    io::Error::last_os_error()
                );
            }
        }

        if let Some(fd) = self.fd.take() {
            close_descriptor(fd, &self.name);
        }

        if self.created {
            unlink(&self.name);
        }
    }
}

impl<M: AccessMode> fmt::Debug for SharedMemory<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMemory")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("addr", &self.as_ptr::<u8>())
            .field("created", &self.created)
            .field("read_only", &M::READ_ONLY)
            .finish()
    }
}

fn check_name(name: &str) -> ShmResult<()> {
    if name.is_empty() {
        return Err(ShmError::InvalidArgument("name is empty".to_string()));
    }
    Ok(())
}

fn c_name(name: &str) -> ShmResult<CString> {
    CString::new(name).map_err(|_| {
        ShmError::InvalidArgument(format!("name '{}' contains a NUL byte", name.escape_debug()))
    })
}

fn open_flags<M: AccessMode>() -> libc::c_int {
    if M::READ_ONLY {
        libc::O_RDONLY
    } else {
        libc::O_RDWR
    }
}

fn close_descriptor(fd: OwnedFd, name: &str) {
    let fd = fd.into_raw_fd();
    log::debug!("close(fd={})", fd);
    if unsafe { libc::close(fd) } != 0 {
        log::warn!(
            "close failed for shared memory '{}': {}",
            name,
            io::Error::last_os_error()
        );
    }
}

fn unlink(name: &str) {
    let c_name = match CString::new(name) {
        Ok(c_name) => c_name,
        Err(e) => {
            log::warn!("cannot unlink shared memory '{}': {}", name, e);
            return;
        }
    };

    log::debug!("shm_unlink(name={})", name);
    if unsafe { libc::shm_unlink(c_name.as_ptr()) } != 0 {
        log::warn!(
            "shm_unlink failed for shared memory '{}': {}",
            name,
            io::Error::last_os_error()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_name(tag: &str) -> String {
        format!("/shmseg_unit_{}_{}", tag, uuid::Uuid::new_v4().simple())
    }

    #[test]
    fn test_empty_name_rejected_before_open() {
        let err = SharedMemory::connect("").unwrap_err();
        assert!(err.is_invalid_argument());

        let err = SharedMemory::<ReadOnly>::create_as("", CreateOptions::new().with_size(64))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_nul_in_name_is_invalid_argument() {
        let err = SharedMemory::connect_read_only("/bad\0name").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_range_check_boundaries() {
        let shm = SharedMemory::create_with_size(&unique_name("range"), 16).unwrap();

        assert!(shm.range_check::<u32>(3).is_ok());
        assert!(shm.range_check::<u32>(4).is_err());
        assert!(shm.range_check::<u8>(15).is_ok());
        assert!(shm.range_check::<u8>(16).is_err());
        assert!(shm.range_check::<u64>(usize::MAX).is_err());
    }

    #[test]
    fn test_zero_sized_elements_need_a_mapping() {
        let mapped = SharedMemory::create_with_size(&unique_name("zst"), 16).unwrap();
        assert!(mapped.range_check::<()>(0).is_ok());
        assert!(mapped.range_check::<()>(usize::MAX - 1).is_ok());
        assert!(mapped.at::<()>(3).is_ok());

        let empty = SharedMemory::create(&unique_name("zst_empty"), CreateOptions::new()).unwrap();
        assert!(empty.at::<()>(0).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_unmapped_segment_has_null_base() {
        let shm = SharedMemory::create(&unique_name("empty"), CreateOptions::new()).unwrap();

        assert_eq!(shm.size(), 0);
        assert!(!shm.is_mapped());
        assert!(shm.as_ptr::<u8>().is_null());
        assert!(shm.as_bytes().is_empty());
        assert!(shm.at::<u8>(0).unwrap_err().is_out_of_range());
    }

    #[test]
    fn test_debug_shows_ownership() {
        let shm = SharedMemory::create_with_size(&unique_name("debug"), 8).unwrap();
        let debug = format!("{:?}", shm);
        assert!(debug.contains("created: true"));
        assert!(debug.contains("read_only: false"));
    }
}
