use std::sync::{Mutex, MutexGuard};

use bitvec::prelude::*;
use log::debug;

use super::subnet::Subnet;
use crate::core::error::{NetError, Result};

/// Upper bound on the offsets a single pool hands out.
pub const MAX_POOL_OFFSETS: u32 = 0xFFFF - 2;

/// Thread-safe allocator of host offsets within a subnet.
///
/// Offsets run from 1 to `capacity`; offset 0 is the network address and the
/// all-ones host is never part of the range. Bit `i` of the bitmap tracks
/// offset `i + 1`.
#[derive(Debug)]
pub struct AddressPool {
    subnet: String,
    bitmap: Mutex<BitVec<u8>>,
}

impl AddressPool {
    pub fn new(subnet: &Subnet) -> Self {
        let capacity = subnet.host_capacity().min(u64::from(MAX_POOL_OFFSETS));

        let mut bitmap = BitVec::new();
        bitmap.resize(capacity as usize, false);

        Self {
            subnet: subnet.to_string(),
            bitmap: Mutex::new(bitmap),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.locked().len() as u32
    }

    /// Takes the smallest free offset.
    pub fn allocate(&self) -> Result<u32> {
        let mut bitmap = self.locked();

        match bitmap.first_zero() {
            Some(pos) => {
                bitmap.set(pos, true);
                Ok(pos as u32 + 1)
            }
            None => Err(NetError::AllocationExhausted {
                subnet: self.subnet.clone(),
            }),
        }
    }

    /// Returns `offset` to the free set. Offsets outside the pool, or not
    /// currently allocated, are ignored.
    pub fn release(&self, offset: u32) {
        let mut bitmap = self.locked();

        let Some(pos) = Self::offset_to_index(&bitmap, offset) else {
            debug!(
                "[IPAM]: Ignoring release of out-of-range offset {offset} in {}",
                self.subnet
            );
            return;
        };

        if !bitmap[pos] {
            debug!(
                "[IPAM]: Ignoring release of free offset {offset} in {}",
                self.subnet
            );
            return;
        }
        bitmap.set(pos, false);
    }

    pub fn is_allocated(&self, offset: u32) -> bool {
        let bitmap = self.locked();
        Self::offset_to_index(&bitmap, offset).is_some_and(|pos| bitmap[pos])
    }

    pub fn in_use(&self) -> usize {
        self.locked().count_ones()
    }

    fn offset_to_index(bitmap: &BitVec<u8>, offset: u32) -> Option<usize> {
        let pos = offset.checked_sub(1)? as usize;
        (pos < bitmap.len()).then_some(pos)
    }

    fn locked(&self) -> MutexGuard<'_, BitVec<u8>> {
        // The bitmap is updated with single calls, a poisoned guard still holds
        // a consistent value.
        self.bitmap.lock().unwrap_or_else(|e| e.into_inner())
    }
}
