//! The fill engine: lane/slice/pass orchestration, the per-block fill
//! loop, prehashing, and finalization.
//!
//! Grounded on `fill_memory_blocks`/`fill_segment`/`finalize` in the
//! RustCrypto `argon2` crate's `instance.rs`, and on the fork-join
//! `crossbeam::thread::scope` dispatch the teacher crate (`argon2rs`) uses in
//! `lib.rs`'s `hash_impl`.

use std::cell::UnsafeCell;

use crate::block::{Block, BYTES};
use crate::blake2b::Blake2b;
use crate::compress::compress;
use crate::hprime::h_prime;
use crate::index::{index_alpha, ref_lane, AddressGen};
use crate::params::{Params, SYNC_POINTS};
use crate::variant::Variant;
use crate::version::Version;

/// Working memory shared across lane workers.
///
/// Writes within one `(pass, slice)` barrier period are partitioned by
/// lane; no two workers ever write the same slot. Cross-lane reads only
/// ever target slots finalized by an earlier barrier. `get_mut` is
/// `unsafe` to make that caller obligation explicit, matching the
/// teacher's own `Matrix::mut_ref`/`get3` escape hatch for the same
/// pattern.
pub struct Memory {
    blocks: UnsafeCell<Vec<Block>>,
    lane_length: u32,
    wipe: bool,
}

unsafe impl Sync for Memory {}

impl Memory {
    pub fn new(lanes: u32, lane_length: u32) -> Self {
        Memory {
            blocks: UnsafeCell::new(vec![Block::zero(); (lanes as usize) * (lane_length as usize)]),
            lane_length,
            wipe: true,
        }
    }

    pub fn from_vec(blocks: Vec<Block>, lane_length: u32) -> Self {
        Memory {
            blocks: UnsafeCell::new(blocks),
            lane_length,
            wipe: true,
        }
    }

    /// Controls whether the working memory is zeroized on drop. Enabled by
    /// default; only meaningful when built with the `zeroize` feature.
    pub fn set_wipe_on_drop(&mut self, wipe: bool) {
        self.wipe = wipe;
    }

    #[inline(always)]
    fn offset(&self, lane: u32, index: u32) -> usize {
        lane as usize * self.lane_length as usize + index as usize
    }

    pub fn get(&self, lane: u32, index: u32) -> Block {
        let at = self.offset(lane, index);
        unsafe { (*self.blocks.get())[at] }
    }

    /// # Safety
    /// Caller must ensure no other thread is concurrently reading or
    /// writing `(lane, index)`.
    #[allow(clippy::mut_from_ref)]
    unsafe fn get_mut(&self, lane: u32, index: u32) -> &mut Block {
        let at = self.offset(lane, index);
        &mut (*self.blocks.get())[at]
    }

    pub fn into_vec(mut self) -> Vec<Block> {
        std::mem::take(self.blocks.get_mut())
    }

    pub fn as_slice(&self) -> &[Block] {
        unsafe { &*self.blocks.get() }
    }
}

#[cfg(feature = "zeroize")]
impl Drop for Memory {
    fn drop(&mut self) {
        if self.wipe {
            use zeroize::Zeroize;
            unsafe {
                for block in (*self.blocks.get()).iter_mut() {
                    block.zeroize();
                }
            }
        }
    }
}

/// Absorbs every parameter and input buffer into the 64-byte prehash seed
/// `H0`, per RFC 9106 section 3.2 step 1-2. Each field is prefixed with its
/// little-endian 32-bit length.
#[allow(clippy::too_many_arguments)]
pub fn initial_hash(
    variant: Variant,
    version: Version,
    params: &Params,
    pwd: &[u8],
    salt: &[u8],
    secret: &[u8],
) -> [u8; 64] {
    let mut h = Blake2b::new(64);
    let mut field = |h: &mut Blake2b, v: u32| h.update(&v.to_le_bytes());

    field(&mut h, params.p_cost());
    field(&mut h, params.output_len() as u32);
    field(&mut h, params.m_cost());
    field(&mut h, params.t_cost());
    field(&mut h, version.as_u32());
    field(&mut h, variant.as_u32());

    field(&mut h, pwd.len() as u32);
    h.update(pwd);
    field(&mut h, salt.len() as u32);
    h.update(salt);
    field(&mut h, secret.len() as u32);
    h.update(secret);
    field(&mut h, params.ad().len() as u32);
    h.update(params.ad());

    let digest = h.finalize();
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    out
}

pub struct Instance {
    pub memory: Memory,
    variant: Variant,
    version: Version,
    passes: u32,
    lanes: u32,
    lane_length: u32,
    segment_length: u32,
    memory_blocks: u32,
    threads: u32,
}

impl Instance {
    pub fn new(
        variant: Variant,
        version: Version,
        params: &Params,
        threads: u32,
        memory: Memory,
    ) -> Self {
        Instance {
            memory,
            variant,
            version,
            passes: params.t_cost(),
            lanes: params.p_cost(),
            lane_length: params.lane_length(),
            segment_length: params.segment_length(),
            memory_blocks: params.memory_blocks(),
            threads,
        }
    }

    /// Fills the first two blocks of every lane from `h0`.
    pub fn fill_first_blocks(&mut self, h0: &[u8; 64]) {
        for lane in 0..self.lanes {
            for slot in 0..2u32 {
                let mut seed = Vec::with_capacity(72);
                seed.extend_from_slice(h0);
                seed.extend_from_slice(&slot.to_le_bytes());
                seed.extend_from_slice(&lane.to_le_bytes());
                let bytes = h_prime(BYTES, &seed);
                unsafe {
                    *self.memory.get_mut(lane, slot) = Block::from_bytes(&bytes);
                }
            }
        }
    }

    /// Runs every pass and slice, synchronizing lane workers at each of
    /// the `4 * passes` slice boundaries.
    pub fn fill_memory_blocks(&mut self) {
        for pass in 0..self.passes {
            for slice in 0..SYNC_POINTS {
                self.fill_slice(pass, slice);
            }
        }
    }

    fn fill_slice(&mut self, pass: u32, slice: u32) {
        let lanes = self.lanes;
        let variant = self.variant;
        let version = self.version;
        let lane_length = self.lane_length;
        let segment_length = self.segment_length;
        let memory_blocks = self.memory_blocks;
        let passes = self.passes;

        #[cfg(feature = "threaded")]
        {
            if self.threads > 1 && lanes > 1 {
                let memory = &self.memory;
                let worker_count = self.threads.min(lanes);
                crossbeam::thread::scope(|scope| {
                    for worker in 0..worker_count {
                        scope.spawn(move |_| {
                            let mut lane = worker;
                            while lane < lanes {
                                fill_segment(
                                    memory,
                                    variant,
                                    version,
                                    pass,
                                    slice,
                                    lane,
                                    lanes,
                                    lane_length,
                                    segment_length,
                                    passes,
                                    memory_blocks,
                                );
                                lane += worker_count;
                            }
                        });
                    }
                })
                .expect("lane worker panicked");
                return;
            }
        }

        for lane in 0..lanes {
            fill_segment(
                &self.memory,
                variant,
                version,
                pass,
                slice,
                lane,
                lanes,
                lane_length,
                segment_length,
                passes,
                memory_blocks,
            );
        }
    }

    /// XORs the last block of every lane and expands the result to
    /// `outlen` bytes via `H'`.
    pub fn finalize(&self, outlen: usize) -> Vec<u8> {
        let mut acc = self.memory.get(0, self.lane_length - 1);
        for lane in 1..self.lanes {
            acc.xor_with(&self.memory.get(lane, self.lane_length - 1));
        }
        h_prime(outlen, &acc.to_bytes())
    }
}

#[allow(clippy::too_many_arguments)]
fn fill_segment(
    memory: &Memory,
    variant: Variant,
    version: Version,
    pass: u32,
    slice: u32,
    lane: u32,
    lanes: u32,
    lane_length: u32,
    segment_length: u32,
    passes: u32,
    memory_blocks: u32,
) {
    let data_independent = variant.data_independent_addressing(pass, slice);
    let mut addr_gen = if data_independent {
        Some(AddressGen::new(pass, lane, slice, memory_blocks, passes, variant.as_u32()))
    } else {
        None
    };

    let start_index = if pass == 0 && slice == 0 { 2 } else { 0 };

    for i in start_index..segment_length {
        let cur = slice * segment_length + i;
        let prev_offset = if cur == 0 { lane_length - 1 } else { cur - 1 };
        let prev_block = memory.get(lane, prev_offset);

        let (j1, j2) = if data_independent {
            addr_gen.as_mut().unwrap().next()
        } else {
            (prev_block[0] as u32, (prev_block[0] >> 32) as u32)
        };

        let rl = ref_lane(pass, slice, lane, j2, lanes);
        let same_lane = rl == lane;
        let ref_index = index_alpha(pass, slice, i, j1, lane_length, segment_length, same_lane);
        let ref_block = memory.get(rl, ref_index);

        let xor_into = version.xor_existing(pass);
        unsafe {
            let out = memory.get_mut(lane, cur);
            compress(&prev_block, &ref_block, out, xor_into);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamsBuilder;

    fn small_instance(variant: Variant, version: Version) -> Instance {
        let params = ParamsBuilder::new()
            .m_cost(8 * 4)
            .t_cost(2)
            .p_cost(4)
            .output_len(32)
            .build()
            .unwrap();
        let h0 = initial_hash(variant, version, &params, b"password", b"somesalt", b"");
        let memory = Memory::new(params.p_cost(), params.lane_length());
        let mut instance = Instance::new(variant, version, &params, params.p_cost(), memory);
        instance.fill_first_blocks(&h0);
        instance.fill_memory_blocks();
        instance
    }

    #[test]
    fn finalize_is_deterministic() {
        let a = small_instance(Variant::Argon2id, Version::V0x13);
        let b = small_instance(Variant::Argon2id, Version::V0x13);
        assert_eq!(a.finalize(32), b.finalize(32));
    }

    #[test]
    fn variants_disagree() {
        let d = small_instance(Variant::Argon2d, Version::V0x13);
        let i = small_instance(Variant::Argon2i, Version::V0x13);
        assert_ne!(d.finalize(32), i.finalize(32));
    }

    #[test]
    fn versions_disagree_when_passes_exceed_one() {
        let v10 = small_instance(Variant::Argon2id, Version::V0x10);
        let v13 = small_instance(Variant::Argon2id, Version::V0x13);
        assert_ne!(v10.finalize(32), v13.finalize(32));
    }

    #[test]
    fn thread_count_does_not_affect_output() {
        let params = ParamsBuilder::new()
            .m_cost(8 * 4)
            .t_cost(2)
            .p_cost(4)
            .output_len(32)
            .build()
            .unwrap();
        let h0 = initial_hash(Variant::Argon2id, Version::V0x13, &params, b"password", b"somesalt", b"");

        let mut sequential = Instance::new(
            Variant::Argon2id,
            Version::V0x13,
            &params,
            1,
            Memory::new(params.p_cost(), params.lane_length()),
        );
        sequential.fill_first_blocks(&h0);
        sequential.fill_memory_blocks();

        let mut parallel = Instance::new(
            Variant::Argon2id,
            Version::V0x13,
            &params,
            4,
            Memory::new(params.p_cost(), params.lane_length()),
        );
        parallel.fill_first_blocks(&h0);
        parallel.fill_memory_blocks();

        assert_eq!(sequential.finalize(32), parallel.finalize(32));
    }

    #[test]
    fn fewer_workers_than_lanes_round_robins_without_changing_output() {
        let params = ParamsBuilder::new()
            .m_cost(8 * 4)
            .t_cost(2)
            .p_cost(4)
            .output_len(32)
            .build()
            .unwrap();
        let h0 = initial_hash(Variant::Argon2id, Version::V0x13, &params, b"password", b"somesalt", b"");

        let mut sequential = Instance::new(
            Variant::Argon2id,
            Version::V0x13,
            &params,
            1,
            Memory::new(params.p_cost(), params.lane_length()),
        );
        sequential.fill_first_blocks(&h0);
        sequential.fill_memory_blocks();

        // Fewer workers than lanes: each worker must pick up more than one
        // lane, round-robin, rather than the engine spawning one thread per
        // lane regardless of the requested worker count.
        let mut two_workers = Instance::new(
            Variant::Argon2id,
            Version::V0x13,
            &params,
            2,
            Memory::new(params.p_cost(), params.lane_length()),
        );
        two_workers.fill_first_blocks(&h0);
        two_workers.fill_memory_blocks();

        assert_eq!(sequential.finalize(32), two_workers.finalize(32));
    }
}
