//! Arena: three bump-allocated float buffers (one forward, two alternating
//! backward) and the tagged fat-pointer handle scheme over them.
//!
//! The forward arena grows monotonically across one step and resets at the
//! next step's start. The two backward arenas ping-pong between adjacent
//! layers: one is read from (the upstream gradient delivered by the layer
//! above) while the other is written to, and they swap after each layer's
//! backward pass so the arena just finished writing becomes the one the
//! next (lower) layer reads from.

use thiserror::Error;

/// Which physical buffer a [`TensorPointer`] indexes into. The two backward
/// tags are fixed identities for the two physical buffers; which one is
/// "current" for writing alternates at runtime, not the tag-to-buffer
/// mapping itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Forward,
    BackwardA,
    BackwardB,
}

impl Region {
    fn tag(self) -> u64 {
        match self {
            Region::Forward => 1,
            Region::BackwardA => 2,
            Region::BackwardB => 3,
        }
    }

    fn from_tag(tag: u64) -> Option<Self> {
        match tag {
            1 => Some(Region::Forward),
            2 => Some(Region::BackwardA),
            3 => Some(Region::BackwardB),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("dereferenced a null tensor handle")]
    Null,
    #[error("tensor handle carries an unrecognized region tag {0}")]
    UnknownTag(u64),
    #[error("arena overflow: region {region:?} offset {offset} + length {length} exceeds capacity {capacity}")]
    Overflow {
        region: Region,
        offset: u32,
        length: u32,
        capacity: usize,
    },
}

pub type HandleResult<T> = Result<T, HandleError>;

const LENGTH_BITS: u32 = 30;
const OFFSET_BITS: u32 = 32;
const MAX_LENGTH: u64 = (1 << LENGTH_BITS) - 1;
const MAX_OFFSET: u64 = (1 << OFFSET_BITS) - 1;

/// Opaque 64-bit handle: {region_tag:2}{length:30}{offset:32}. The integer
/// zero is the null handle (tag 0 is not a valid region).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TensorPointer(u64);

impl TensorPointer {
    pub const NULL: TensorPointer = TensorPointer(0);

    fn new(region: Region, offset: u32, length: u32) -> Self {
        debug_assert!((length as u64) <= MAX_LENGTH);
        debug_assert!((offset as u64) <= MAX_OFFSET);
        let bits = (region.tag() << 62) | ((length as u64) << 32) | (offset as u64);
        TensorPointer(bits)
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    pub fn region(&self) -> HandleResult<Region> {
        if self.is_null() {
            return Err(HandleError::Null);
        }
        let tag = self.0 >> 62;
        Region::from_tag(tag).ok_or(HandleError::UnknownTag(tag))
    }

    pub fn offset(&self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }

    pub fn length(&self) -> u32 {
        ((self.0 >> 32) & MAX_LENGTH) as u32
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for TensorPointer {
    fn default() -> Self {
        TensorPointer::NULL
    }
}

/// Three float arenas plus the bump indices and the backward write-slot
/// selector. `backward[0]`/`backward[1]` are the two physical buffers that
/// the `BackwardA`/`BackwardB` tags map to, respectively.
pub struct Arena {
    forward: Vec<f32>,
    backward: [Vec<f32>; 2],
    forward_index: usize,
    backward_index: [usize; 2],
    write_slot: usize,
}

impl Arena {
    pub fn new(forward_capacity: usize, backward_capacity: usize) -> Self {
        Arena {
            forward: vec![0.0; forward_capacity],
            backward: [vec![0.0; backward_capacity], vec![0.0; backward_capacity]],
            forward_index: 0,
            backward_index: [0, 0],
            write_slot: 0,
        }
    }

    pub fn forward_capacity(&self) -> usize {
        self.forward.len()
    }

    pub fn backward_capacity(&self) -> usize {
        self.backward[0].len()
    }

    /// Reset the forward bump index. Called at the start of every step.
    pub fn reset_forward(&mut self) {
        self.forward_index = 0;
    }

    /// Reset both backward bump indices and the write-slot selector. Called
    /// at the start of every step, before the backward pass begins.
    pub fn reset_backward(&mut self) {
        self.backward_index = [0, 0];
        self.write_slot = 0;
    }

    fn slot_region(slot: usize) -> Region {
        if slot == 0 {
            Region::BackwardA
        } else {
            Region::BackwardB
        }
    }

    /// Bump-allocate a forward slot of `length` floats and write `data`
    /// into it. `data.len()` must equal `length`.
    pub fn allocate_forward(&mut self, data: &[f32]) -> HandleResult<TensorPointer> {
        let length = data.len();
        let offset = self.forward_index;
        if offset + length > self.forward.len() {
            return Err(HandleError::Overflow {
                region: Region::Forward,
                offset: offset as u32,
                length: length as u32,
                capacity: self.forward.len(),
            });
        }
        self.forward[offset..offset + length].copy_from_slice(data);
        self.forward_index += length;
        Ok(TensorPointer::new(Region::Forward, offset as u32, length as u32))
    }

    /// Bump-allocate a backward slot (in the current write slot) and write
    /// `data` into it.
    pub fn allocate_backward(&mut self, data: &[f32]) -> HandleResult<TensorPointer> {
        let length = data.len();
        let slot = self.write_slot;
        let offset = self.backward_index[slot];
        if offset + length > self.backward[slot].len() {
            return Err(HandleError::Overflow {
                region: Self::slot_region(slot),
                offset: offset as u32,
                length: length as u32,
                capacity: self.backward[slot].len(),
            });
        }
        self.backward[slot][offset..offset + length].copy_from_slice(data);
        self.backward_index[slot] += length;
        Ok(TensorPointer::new(Self::slot_region(slot), offset as u32, length as u32))
    }

    /// Decode a handle to its backing slice.
    pub fn get(&self, ptr: TensorPointer) -> HandleResult<&[f32]> {
        let region = ptr.region()?;
        let offset = ptr.offset() as usize;
        let length = ptr.length() as usize;
        let buf = match region {
            Region::Forward => &self.forward,
            Region::BackwardA => &self.backward[0],
            Region::BackwardB => &self.backward[1],
        };
        if offset + length > buf.len() {
            return Err(HandleError::Overflow {
                region,
                offset: offset as u32,
                length: length as u32,
                capacity: buf.len(),
            });
        }
        Ok(&buf[offset..offset + length])
    }

    /// After a layer's backward pass completes: the slot just written
    /// becomes readable for the next (lower) layer, and the other slot -
    /// fully consumed as this layer's upstream input - is freed for reuse.
    pub fn swap_backward(&mut self) {
        let finished = self.write_slot;
        let other = 1 - finished;
        self.backward_index[other] = 0;
        self.write_slot = other;
    }
}
