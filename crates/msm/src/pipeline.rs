//! Buffer lifecycle, bind groups, and command encoding for one MSM call.
//!
//! All device resources are created at call entry, sized from the plan,
//! and dropped at exit; nothing survives the call. Every pass for every
//! batch is encoded into a single command buffer and submitted once, with
//! bucket clears as encoder-level commands between compute-pass segments.

use std::num::NonZeroU64;

use arith::Limbs256;
use curve::{AffinePoint, Scalar};

use crate::device::GpuContext;
use crate::error::MsmError;
use crate::schedule::{
    DispatchStep, PassKind, Schedule, Step, AFFINE_SIZE, JACOBIAN_SIZE, SCALAR_SIZE,
};
use crate::shaders;

/// Per-dispatch uniform block size; the stride in the params buffer is
/// this rounded up to the device's uniform-offset alignment.
const PARAMS_SIZE: u64 = 16;

struct PassPipelines {
    a_convert: wgpu::ComputePipeline,
    b1_bucket: wgpu::ComputePipeline,
    b2_reduce: wgpu::ComputePipeline,
    c_aggregate: wgpu::ComputePipeline,
    d_reduce: wgpu::ComputePipeline,
    e_reduce: wgpu::ComputePipeline,
}

impl PassPipelines {
    fn get(&self, pass: PassKind) -> &wgpu::ComputePipeline {
        match pass {
            PassKind::AConvert => &self.a_convert,
            PassKind::B1Bucket => &self.b1_bucket,
            PassKind::B2Reduce => &self.b2_reduce,
            PassKind::CAggregate => &self.c_aggregate,
            PassKind::DReduce => &self.d_reduce,
            PassKind::EReduce => &self.e_reduce,
        }
    }
}

struct CallBuffers {
    params: wgpu::Buffer,
    scalars: wgpu::Buffer,
    points: wgpu::Buffer,
    proj: wgpu::Buffer,
    scratch_a: wgpu::Buffer,
    scratch_b: wgpu::Buffer,
    buckets: wgpu::Buffer,
    batch_acc: wgpu::Buffer,
    out: wgpu::Buffer,
    staging_x: wgpu::Buffer,
    staging_y: wgpu::Buffer,
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: NonZeroU64::new(PARAMS_SIZE),
        },
        count: None,
    }
}

fn storage_entry(binding: u32, read_only: bool, has_dynamic_offset: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Byte strides of the dynamically-offset bindings.
struct InputWindows {
    params_stride: u64,
    scalar_window: u64,
    point_window: u64,
}

fn encode_dispatch<'a>(
    cpass: &mut wgpu::ComputePass<'a>,
    pipelines: &'a PassPipelines,
    bind_groups: &'a [wgpu::BindGroup; 2],
    windows: &InputWindows,
    d: &DispatchStep,
    dispatch_idx: u64,
) {
    cpass.set_pipeline(pipelines.get(d.pass));
    let param_off = dispatch_idx * windows.params_stride;
    let scalar_off = d.batch as u64 * windows.scalar_window;
    let point_off = d.batch as u64 * windows.point_window;
    cpass.set_bind_group(
        0,
        &bind_groups[d.group_sel],
        &[param_off as u32, scalar_off as u32, point_off as u32],
    );
    cpass.dispatch_workgroups(d.groups.0, d.groups.1, 1);
}

fn plain_buffer(
    device: &wgpu::Device,
    label: &str,
    size: u64,
    usage: wgpu::BufferUsages,
) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage,
        mapped_at_creation: false,
    })
}

/// Run the planned pipeline and read back the affine result.
pub(crate) async fn execute(
    ctx: &GpuContext,
    plan: &Schedule,
    scalars: &[Scalar],
    points: &[AffinePoint],
) -> Result<AffinePoint, MsmError> {
    let device = &ctx.device;

    let shader_src = shaders::compose(plan.window_bits);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("pallas-msm"),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("msm_bgl"),
        entries: &[
            uniform_entry(0),
            // Per-batch input windows bind through dynamic offsets.
            storage_entry(1, true, true),  // scalars
            storage_entry(2, true, true),  // points
            storage_entry(3, false, false), // projective points
            storage_entry(4, true, false),  // reduction source
            storage_entry(5, false, false), // reduction destination
            storage_entry(6, false, false), // buckets
            storage_entry(7, false, false), // batch accumulators
            storage_entry(8, false, false), // output point
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("msm_pl"),
        bind_group_layouts: &[&bind_layout],
        push_constant_ranges: &[],
    });

    let make_pipeline = |pass: PassKind| {
        device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(shaders::entry_point(pass)),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: shaders::entry_point(pass),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        })
    };
    let pipelines = PassPipelines {
        a_convert: make_pipeline(PassKind::AConvert),
        b1_bucket: make_pipeline(PassKind::B1Bucket),
        b2_reduce: make_pipeline(PassKind::B2Reduce),
        c_aggregate: make_pipeline(PassKind::CAggregate),
        d_reduce: make_pipeline(PassKind::DReduce),
        e_reduce: make_pipeline(PassKind::EReduce),
    };

    let params_stride =
        (ctx.limits.min_uniform_buffer_offset_alignment as u64).max(PARAMS_SIZE);
    let dispatch_count = plan.dispatch_count() as u64;
    let padded_input = (plan.num_batches * plan.chunk) as u64;
    let scalar_window = plan.chunk as u64 * SCALAR_SIZE;
    let point_window = plan.chunk as u64 * AFFINE_SIZE;

    // Everything the call owns, allocated under an out-of-memory error
    // scope so exhaustion surfaces as a typed error instead of an
    // uncaptured device error.
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let bufs = CallBuffers {
        params: plain_buffer(
            device,
            "msm_params",
            dispatch_count * params_stride,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        ),
        scalars: plain_buffer(
            device,
            "msm_scalars",
            padded_input * SCALAR_SIZE,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        ),
        points: plain_buffer(
            device,
            "msm_points",
            padded_input * AFFINE_SIZE,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        ),
        proj: plain_buffer(
            device,
            "msm_proj",
            plan.chunk as u64 * JACOBIAN_SIZE,
            wgpu::BufferUsages::STORAGE,
        ),
        scratch_a: plain_buffer(
            device,
            "msm_scratch_a",
            plan.scratch_cap as u64 * JACOBIAN_SIZE,
            wgpu::BufferUsages::STORAGE,
        ),
        scratch_b: plain_buffer(
            device,
            "msm_scratch_b",
            plan.scratch_cap as u64 * JACOBIAN_SIZE,
            wgpu::BufferUsages::STORAGE,
        ),
        buckets: plain_buffer(
            device,
            "msm_buckets",
            plan.num_buckets as u64 * JACOBIAN_SIZE,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        ),
        batch_acc: plain_buffer(
            device,
            "msm_batch_acc",
            plan.num_batches as u64 * JACOBIAN_SIZE,
            wgpu::BufferUsages::STORAGE,
        ),
        out: plain_buffer(
            device,
            "msm_out",
            2 * SCALAR_SIZE,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        ),
        staging_x: plain_buffer(
            device,
            "msm_staging_x",
            SCALAR_SIZE,
            wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        ),
        staging_y: plain_buffer(
            device,
            "msm_staging_y",
            SCALAR_SIZE,
            wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        ),
    };
    if let Some(err) = device.pop_error_scope().await {
        return Err(MsmError::DeviceResourceExhausted(err.to_string()));
    }

    // Upload inputs once; per-batch windows are selected with dynamic
    // offsets at encode time. Buffer tails beyond n stay zero-initialized.
    ctx.queue
        .write_buffer(&bufs.scalars, 0, bytemuck::cast_slice(scalars));
    ctx.queue
        .write_buffer(&bufs.points, 0, bytemuck::cast_slice(points));

    let mut params_bytes = vec![0u8; (dispatch_count * params_stride) as usize];
    let mut cursor = 0usize;
    for step in &plan.steps {
        if let Step::Dispatch(d) = step {
            let at = cursor * params_stride as usize;
            params_bytes[at..at + PARAMS_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(&d.params));
            cursor += 1;
        }
    }
    ctx.queue.write_buffer(&bufs.params, 0, &params_bytes);

    // Two bind groups over one layout; they differ only in which scratch
    // buffer is the reduction source.
    let make_bind_group = |label: &str, src: &wgpu::Buffer, dst: &wgpu::Buffer| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &bind_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &bufs.params,
                        offset: 0,
                        size: NonZeroU64::new(PARAMS_SIZE),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &bufs.scalars,
                        offset: 0,
                        size: NonZeroU64::new(scalar_window),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &bufs.points,
                        offset: 0,
                        size: NonZeroU64::new(point_window),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: bufs.proj.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: src.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: dst.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: bufs.buckets.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: bufs.batch_acc.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 8,
                    resource: bufs.out.as_entire_binding(),
                },
            ],
        })
    };
    let bind_groups = [
        make_bind_group("msm_bg_ab", &bufs.scratch_a, &bufs.scratch_b),
        make_bind_group("msm_bg_ba", &bufs.scratch_b, &bufs.scratch_a),
    ];

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("msm_encoder"),
    });

    // Compute-pass segments split at bucket clears; clears are
    // encoder-level commands and order with the dispatches around them.
    let windows = InputWindows {
        params_stride,
        scalar_window,
        point_window,
    };
    let mut dispatch_idx = 0u64;
    let mut steps = plan.steps.iter().peekable();
    while let Some(step) = steps.next() {
        match step {
            Step::ClearBuckets => {
                encoder.clear_buffer(&bufs.buckets, 0, None);
            }
            Step::Dispatch(first) => {
                let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("msm_pass"),
                    timestamp_writes: None,
                });
                encode_dispatch(&mut cpass, &pipelines, &bind_groups, &windows, first, dispatch_idx);
                dispatch_idx += 1;
                while let Some(Step::Dispatch(_)) = steps.peek() {
                    if let Some(Step::Dispatch(d)) = steps.next() {
                        encode_dispatch(&mut cpass, &pipelines, &bind_groups, &windows, d, dispatch_idx);
                        dispatch_idx += 1;
                    }
                }
            }
        }
    }

    encoder.copy_buffer_to_buffer(&bufs.out, 0, &bufs.staging_x, 0, SCALAR_SIZE);
    encoder.copy_buffer_to_buffer(&bufs.out, SCALAR_SIZE, &bufs.staging_y, 0, SCALAR_SIZE);
    ctx.queue.submit([encoder.finish()]);

    // Await both staging maps; a dropped completion channel means the
    // device went away under us.
    let x_slice = bufs.staging_x.slice(..);
    let (send_x, recv_x) = futures::channel::oneshot::channel();
    x_slice.map_async(wgpu::MapMode::Read, move |r| {
        let _ = send_x.send(r);
    });
    let y_slice = bufs.staging_y.slice(..);
    let (send_y, recv_y) = futures::channel::oneshot::channel();
    y_slice.map_async(wgpu::MapMode::Read, move |r| {
        let _ = send_y.send(r);
    });

    device.poll(wgpu::Maintain::Wait);
    recv_x.await.map_err(|_| MsmError::DeviceLost)??;
    recv_y.await.map_err(|_| MsmError::DeviceLost)??;

    let result = {
        let x_view = x_slice.get_mapped_range();
        let y_view = y_slice.get_mapped_range();
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&x_view);
        y.copy_from_slice(&y_view);
        AffinePoint {
            x: Limbs256::from_le_bytes(&x),
            y: Limbs256::from_le_bytes(&y),
        }
    };
    bufs.staging_x.unmap();
    bufs.staging_y.unmap();

    Ok(result)
}
