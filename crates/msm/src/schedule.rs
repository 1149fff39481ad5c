//! Dispatch planning for the Pippenger pass pipeline.
//!
//! Everything the GPU will execute is decided here, up front and purely:
//! batch sizes, the per-(batch, window, bucket) dispatch sequence, tree
//! reduction rounds, and which scratch buffer each reduction round reads.
//! The encoder then walks the plan verbatim, so the scheduling logic is
//! unit-testable without a device.

use crate::config::MsmConfig;

/// Threads per workgroup; fixed across all kernels. Changing it requires
/// the same change in the shader `@workgroup_size` attributes.
pub const WORKGROUP_SIZE: u32 = 64;

/// Bytes of one Jacobian point in GPU storage (3 × 8 × u32).
pub const JACOBIAN_SIZE: u64 = 96;

/// Bytes of one affine point in GPU storage (2 × 8 × u32).
pub const AFFINE_SIZE: u64 = 64;

/// Bytes of one scalar in GPU storage (8 × u32).
pub const SCALAR_SIZE: u64 = 32;

/// Final reduction round: thread 0 writes the pass target instead of the
/// scratch destination.
pub const FLAG_FINAL: u32 = 1;
/// Pass E only: read this round's input from the batch accumulator buffer.
pub const FLAG_SRC_BATCH: u32 = 2;

/// Per-dispatch uniform block; one instance per dispatch lives in the
/// params buffer at the device's uniform-offset alignment.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PassParams {
    /// Live element count for the pass (points, partials, or buckets).
    pub count: u32,
    /// Window index (pass Bi1 only).
    pub window: u32,
    /// Bucket value (Bi1/Bi2) or batch index (pass D final round).
    pub slot: u32,
    pub flags: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassKind {
    AConvert,
    B1Bucket,
    B2Reduce,
    CAggregate,
    DReduce,
    EReduce,
}

#[derive(Clone, Copy, Debug)]
pub struct DispatchStep {
    pub pass: PassKind,
    pub params: PassParams,
    /// 2-D workgroup grid; counts above the per-dimension device limit
    /// spill into `y`.
    pub groups: (u32, u32),
    /// Which of the two scratch bind groups to bind: 0 reads scratch A and
    /// writes scratch B, 1 the reverse. Producers (Bi1, C, E round 0)
    /// write through the destination slot of selector 1, i.e. scratch A.
    pub group_sel: usize,
    /// Batch whose input windows (scalars, points) this dispatch binds.
    pub batch: usize,
}

#[derive(Clone, Debug)]
pub enum Step {
    /// Zero the bucket buffer; runs before each window's bucket passes.
    ClearBuckets,
    Dispatch(DispatchStep),
}

/// Device-derived planning inputs, decoupled from wgpu types so the
/// planner is testable with synthetic limits.
#[derive(Clone, Copy, Debug)]
pub struct PlanLimits {
    pub max_storage_binding: u64,
    pub max_workgroups_per_dim: u32,
    pub max_chunk_override: Option<usize>,
}

impl PlanLimits {
    pub fn from_device(limits: &wgpu::Limits, config: &MsmConfig) -> Self {
        PlanLimits {
            max_storage_binding: limits.max_storage_buffer_binding_size as u64,
            max_workgroups_per_dim: limits.max_compute_workgroups_per_dimension,
            max_chunk_override: config.max_chunk_override,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Schedule {
    pub n: usize,
    pub window_bits: u32,
    pub num_buckets: u32,
    pub num_windows: u32,
    /// Points per batch; a multiple of 8 so per-batch dynamic offsets stay
    /// aligned to the 256-byte storage-offset requirement.
    pub chunk: usize,
    pub num_batches: usize,
    /// Capacity, in points, of each reduction scratch buffer.
    pub scratch_cap: usize,
    pub steps: Vec<Step>,
}

impl Schedule {
    pub fn dispatch_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Dispatch(_)))
            .count()
    }
}

fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

fn split_groups(workgroups: u32, max_per_dim: u32) -> (u32, u32) {
    let workgroups = workgroups.max(1);
    if workgroups <= max_per_dim {
        (workgroups, 1)
    } else {
        (max_per_dim, ceil_div(workgroups as usize, max_per_dim as usize) as u32)
    }
}

/// Workgroup grid covering `count` elements, one thread each.
fn groups_for(count: u32, max_per_dim: u32) -> (u32, u32) {
    split_groups(ceil_div(count as usize, WORKGROUP_SIZE as usize) as u32, max_per_dim)
}

/// Append the tree-reduction rounds that fold `m0` partials into the pass
/// target. Rounds alternate scratch direction; the final round runs in a
/// single workgroup and carries `FLAG_FINAL` plus any extra flags.
fn push_reduce_rounds(
    steps: &mut Vec<Step>,
    pass: PassKind,
    m0: u32,
    slot: u32,
    batch: usize,
    max_per_dim: u32,
) {
    let mut m = m0;
    let mut sel = 0usize;
    while m > WORKGROUP_SIZE {
        steps.push(Step::Dispatch(DispatchStep {
            pass,
            params: PassParams {
                count: m,
                window: 0,
                slot,
                flags: 0,
            },
            groups: groups_for(m, max_per_dim),
            group_sel: sel,
            batch,
        }));
        m = ceil_div(m as usize, WORKGROUP_SIZE as usize) as u32;
        sel ^= 1;
    }
    steps.push(Step::Dispatch(DispatchStep {
        pass,
        params: PassParams {
            count: m,
            window: 0,
            slot,
            flags: FLAG_FINAL,
        },
        groups: (1, 1),
        group_sel: sel,
        batch,
    }));
}

/// Build the full dispatch plan for one MSM call.
///
/// Structure per batch: pass A lifts the batch to projective form, then for
/// each window (highest first) the bucket buffer is cleared, every bucket
/// value gets a Bi1 + Bi2 sequence accumulating into its bucket, pass C
/// scales buckets by their value, and pass D folds the window sum into the
/// batch accumulator Horner-style. Pass E tree-reduces the batch
/// accumulators and normalizes to affine. Bucket value 0 is never
/// dispatched: window value 0 contributes nothing, so its bucket stays the
/// identity and its weighted term vanishes.
pub fn plan(n: usize, window_bits: u32, limits: &PlanLimits) -> Schedule {
    let wg = WORKGROUP_SIZE as usize;
    let num_buckets = 1u32 << window_bits;
    let num_windows = (256 + window_bits - 1) / window_bits;
    let max_per_dim = limits.max_workgroups_per_dim;

    // The projective buffer is the widest per-point allocation, so it sets
    // the batch ceiling.
    let mut chunk = (limits.max_storage_binding / JACOBIAN_SIZE) as usize;
    if let Some(cap) = limits.max_chunk_override {
        chunk = chunk.min(cap.max(8));
    }
    chunk -= chunk % 8;
    chunk = chunk.max(8).min(ceil_div(n, 8) * 8);

    let num_batches = ceil_div(n, chunk);
    let scratch_cap = ceil_div(chunk, wg)
        .max(ceil_div(num_buckets as usize, wg))
        .max(num_batches);

    let mut steps = Vec::new();

    for b in 0..num_batches {
        let count = if b + 1 == num_batches {
            (n - b * chunk) as u32
        } else {
            chunk as u32
        };

        steps.push(Step::Dispatch(DispatchStep {
            pass: PassKind::AConvert,
            params: PassParams {
                count,
                window: 0,
                slot: 0,
                flags: 0,
            },
            groups: groups_for(count, max_per_dim),
            group_sel: 0,
            batch: b,
        }));

        for win in (0..num_windows).rev() {
            steps.push(Step::ClearBuckets);

            for value in 1..num_buckets {
                steps.push(Step::Dispatch(DispatchStep {
                    pass: PassKind::B1Bucket,
                    params: PassParams {
                        count,
                        window: win,
                        slot: value,
                        flags: 0,
                    },
                    groups: groups_for(count, max_per_dim),
                    group_sel: 1,
                    batch: b,
                }));
                let partials = ceil_div(count as usize, wg) as u32;
                push_reduce_rounds(&mut steps, PassKind::B2Reduce, partials, value, b, max_per_dim);
            }

            steps.push(Step::Dispatch(DispatchStep {
                pass: PassKind::CAggregate,
                params: PassParams {
                    count: num_buckets,
                    window: 0,
                    slot: 0,
                    flags: 0,
                },
                groups: groups_for(num_buckets, max_per_dim),
                group_sel: 1,
                batch: b,
            }));
            let partials = ceil_div(num_buckets as usize, wg) as u32;
            push_reduce_rounds(&mut steps, PassKind::DReduce, partials, b as u32, b, max_per_dim);
        }
    }

    // Pass E: fold the batch accumulators and convert to affine. The first
    // round reads the batch buffer; later rounds (only for more than 64
    // batches) read the scratch ping-pong like any other reduction.
    let mut m = num_batches as u32;
    let mut sel = 1usize;
    let mut src_flag = FLAG_SRC_BATCH;
    while m > WORKGROUP_SIZE {
        steps.push(Step::Dispatch(DispatchStep {
            pass: PassKind::EReduce,
            params: PassParams {
                count: m,
                window: 0,
                slot: 0,
                flags: src_flag,
            },
            groups: groups_for(m, max_per_dim),
            group_sel: sel,
            batch: 0,
        }));
        m = ceil_div(m as usize, wg) as u32;
        sel = if src_flag != 0 { 0 } else { sel ^ 1 };
        src_flag = 0;
    }
    steps.push(Step::Dispatch(DispatchStep {
        pass: PassKind::EReduce,
        params: PassParams {
            count: m,
            window: 0,
            slot: 0,
            flags: FLAG_FINAL | src_flag,
        },
        groups: (1, 1),
        group_sel: sel,
        batch: 0,
    }));

    Schedule {
        n,
        window_bits,
        num_buckets,
        num_windows,
        chunk,
        num_batches,
        scratch_cap,
        steps,
    }
}

/// CPU mirror of the shader's window extraction: `w` bits of `limbs`
/// starting at bit `win · w`, spanning at most two adjacent limbs.
pub fn window_value(limbs: &[u32; 8], win: u32, window_bits: u32) -> u32 {
    let bit = win * window_bits;
    let limb = (bit / 32) as usize;
    let shift = bit % 32;
    let mut v = limbs[limb] >> shift;
    if shift + window_bits > 32 && limb + 1 < 8 {
        v |= limbs[limb + 1] << (32 - shift);
    }
    v & (((1u64 << window_bits) - 1) as u32)
}
