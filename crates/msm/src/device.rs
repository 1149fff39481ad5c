//! WebGPU device acquisition.
//!
//! No singletons: callers hold a `GpuContext` and pass it to `msm`
//! explicitly, so tests and multi-device hosts stay in control of which
//! queue the work lands on.

use crate::error::MsmError;

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub limits: wgpu::Limits,
    pub adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Acquire a high-performance adapter and a device with the adapter's
    /// full limits (large storage bindings drive the batch size).
    pub async fn new() -> Result<Self, MsmError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(MsmError::AdapterUnavailable)?;

        let adapter_info = adapter.get_info();
        log::info!(
            "gpu adapter: {} ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("pallas-msm"),
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    ..Default::default()
                },
                None,
            )
            .await?;

        let limits = device.limits();
        log::debug!(
            "device limits: storage binding {} bytes, {} workgroups/dim",
            limits.max_storage_buffer_binding_size,
            limits.max_compute_workgroups_per_dimension
        );

        Ok(GpuContext {
            device,
            queue,
            limits,
            adapter_info,
        })
    }

    /// Blocking wrapper for tests and synchronous hosts.
    pub fn new_blocking() -> Result<Self, MsmError> {
        pollster::block_on(Self::new())
    }
}
