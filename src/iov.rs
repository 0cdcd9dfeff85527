//! Local memory descriptors and the scatter/gather batch converter.
//!
//! A PUT/GET request describes local memory as an ordered list of [`IoVec`]
//! segments of arbitrary count and length. The kernel copy primitives accept
//! only a bounded number of fixed-layout scatter/gather entries per request,
//! so the list is sliced into batches by [`fill_sg`], driven by a resumable
//! [`IovIter`] cursor that splits segments at batch boundaries and continues
//! exactly where the previous batch stopped.

/// Maximum scatter/gather entries submitted in a single kernel copy request.
pub const MAX_IOV: usize = 16;

/// One local memory region: a process-local base pointer and a byte length.
///
/// Owned by the caller for the duration of an operation; the endpoints never
/// retain one past call return.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IoVec {
    pub base: *mut u8,
    pub len: usize,
}

impl IoVec {
    /// Builds a descriptor from raw parts.
    ///
    /// # Safety
    /// `base` must stay valid for reads (PUT) or writes (GET) of `len` bytes
    /// for the whole operation the descriptor is passed to.
    pub unsafe fn new(base: *mut u8, len: usize) -> Self {
        Self { base, len }
    }

    /// Descriptor over a borrowed source buffer (PUT direction).
    pub fn from_slice(buf: &[u8]) -> Self {
        Self {
            base: buf.as_ptr() as *mut u8,
            len: buf.len(),
        }
    }

    /// Descriptor over a borrowed destination buffer (GET direction).
    pub fn from_mut_slice(buf: &mut [u8]) -> Self {
        Self {
            base: buf.as_mut_ptr(),
            len: buf.len(),
        }
    }
}

/// Total logical length of a memory description.
pub fn total_length(iov: &[IoVec]) -> usize {
    iov.iter().map(|v| v.len).sum()
}

/// Resumable cursor over a memory description.
///
/// Invariant: `buffer_offset` is strictly inside the current segment, or the
/// iterator is exhausted (`iov_index` equals the segment count). Created
/// fresh per top-level operation and discarded at its end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IovIter {
    pub iov_index: usize,
    pub buffer_offset: usize,
}

impl IovIter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A fixed-layout scatter/gather element accepted by one of the kernel copy
/// primitives.
pub trait SgEntry: Copy {
    fn new(base: *mut u8, len: usize) -> Self;
}

impl SgEntry for libc::iovec {
    fn new(base: *mut u8, len: usize) -> Self {
        libc::iovec {
            iov_base: base as *mut libc::c_void,
            iov_len: len,
        }
    }
}

/// Emits the next descriptor batch.
///
/// Fills `dst` with at most `dst.len()` entries covering at most `max_length`
/// bytes of `iov`, starting at the cursor position. A segment cut by the byte
/// cap is split: the emitted entry gets an offset-adjusted base and truncated
/// length, and the cursor remembers the consumed offset for the next call.
/// Zero-length segments are consumed without emitting an entry.
///
/// Returns `(entries_emitted, bytes_covered)`; `(0, 0)` only once the cursor
/// is exhausted.
pub fn fill_sg<E: SgEntry>(
    dst: &mut [E],
    iov: &[IoVec],
    max_length: usize,
    iter: &mut IovIter,
) -> (usize, usize) {
    let mut count = 0;
    let mut total = 0;

    while iter.iov_index < iov.len() && count < dst.len() && total < max_length {
        let seg = &iov[iter.iov_index];
        let remaining = seg.len - iter.buffer_offset;
        if remaining == 0 {
            iter.iov_index += 1;
            iter.buffer_offset = 0;
            continue;
        }

        let take = remaining.min(max_length - total);
        dst[count] = E::new(unsafe { seg.base.add(iter.buffer_offset) }, take);
        count += 1;
        total += take;

        if take == remaining {
            iter.iov_index += 1;
            iter.buffer_offset = 0;
        } else {
            iter.buffer_offset += take;
        }
    }

    (count, total)
}

/// Consumes `consumed` bytes from an emitted iovec batch after a partial
/// kernel transfer. Fully-consumed entries are zeroed and skipped by the
/// index; a partially-consumed entry gets its base advanced and length
/// reduced.
pub(crate) fn iovec_advance(iov: &mut [libc::iovec], cur_idx: &mut usize, mut consumed: usize) {
    while consumed > 0 && *cur_idx < iov.len() {
        let entry = &mut iov[*cur_idx];
        if consumed < entry.iov_len {
            entry.iov_base = unsafe { (entry.iov_base as *mut u8).add(consumed) } as *mut libc::c_void;
            entry.iov_len -= consumed;
            return;
        }
        consumed -= entry.iov_len;
        entry.iov_len = 0;
        *cur_idx += 1;
    }
    debug_assert_eq!(consumed, 0, "advanced past the end of the iovec batch");
}

// IoVec mirrors struct iovec field-for-field.
const _: () = assert!(std::mem::size_of::<IoVec>() == std::mem::size_of::<libc::iovec>());
