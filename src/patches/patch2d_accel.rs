/// ==============================================================================================
/// ==================================== 2D Patch (Accelerator) ===================================
/// ==============================================================================================
///
/// Offloaded mirror of [`super::patch2d::Patch2d`]. Grounded on
/// `WavePropagation2d_kernel.h`'s OpenCL `cl_context`/`cl_program`/
/// `cl_kernel`/`cl_mem` members, reimplemented against the `ocl` crate's
/// `ProQue`/`Buffer`/`Kernel` builders. The kernel source lives in
/// `src/patches/kernels/wave2d.cl` and mirrors `src/solvers/riemann/fwave.rs`.

use ocl::{Buffer, Device, DeviceType, Kernel, Platform, ProQue};

use crate::constants::{TIdx, TReal};
use crate::error::{Result, SolverError};
use crate::patches::boundary::{Boundary, BoundaryBox};

const KERNEL_SRC: &str = include_str!("kernels/wave2d.cl");

fn boundary_code(b: Boundary) -> i32 {
    match b {
        Boundary::Open => 0,
        Boundary::Closed => 1,
    }
}

/// Selects a GPU device, falling back to a CPU device; failure to find
/// any device, build the program, or allocate buffers is fatal at
/// construction (spec.md §4.4/§7 `DeviceUnavailable`).
fn select_device() -> Result<(Platform, Device)> {
    let platform = Platform::default();

    let gpu = Device::list(platform, Some(DeviceType::GPU))
        .map_err(|e| SolverError::DeviceUnavailable(format!("platform query failed: {e}")))?;
    if let Some(device) = gpu.into_iter().next() {
        return Ok((platform, device));
    }

    let cpu = Device::list(platform, Some(DeviceType::CPU))
        .map_err(|e| SolverError::DeviceUnavailable(format!("platform query failed: {e}")))?;
    cpu.into_iter()
        .next()
        .map(|device| (platform, device))
        .ok_or_else(|| SolverError::DeviceUnavailable("no GPU or CPU OpenCL device found".into()))
}

/// RAII owner of the device context, program, kernels, and buffers. Every
/// fallible construction step returns early so a failed build never
/// leaves a half-constructed patch reachable; `ocl`'s own `Drop` impls
/// release the context/queue/buffers when this struct (and the `ProQue`
/// it owns) goes out of scope.
pub struct Patch2dAccel {
    nx: TIdx,
    ny: TIdx,
    boundary: BoundaryBox,
    solver_is_fwave: bool,

    pro_que: ProQue,
    h: Buffer<f32>,
    hu: Buffer<f32>,
    hv: Buffer<f32>,
    b: Buffer<f32>,
    h_t: Buffer<f32>,
    hu_t: Buffer<f32>,
    hv_t: Buffer<f32>,

    k_apply_ghost_lr: Kernel,
    k_apply_ghost_tb: Kernel,
    k_copy: Kernel,
    k_x_edge: Kernel,
    k_y_edge: Kernel,

    // Host-side staging buffers reused across set_data/get_data calls.
    host_h: Vec<TReal>,
    host_hu: Vec<TReal>,
    host_hv: Vec<TReal>,
    host_b: Vec<TReal>,
}

impl Patch2dAccel {
    pub fn new(nx: TIdx, ny: TIdx, boundary: BoundaryBox, solver_is_fwave: bool) -> Result<Self> {
        let (platform, device) = select_device()?;
        let len = (nx + 2) * (ny + 2);

        let pro_que = ProQue::builder()
            .platform(platform)
            .device(device)
            .src(KERNEL_SRC)
            .dims(len)
            .build()
            .map_err(|e| SolverError::DeviceUnavailable(format!("program build failed: {e}")))?;

        let make_buffer = |fill: f32| -> Result<Buffer<f32>> {
            pro_que
                .buffer_builder::<f32>()
                .len(len)
                .fill_val(fill)
                .build()
                .map_err(|e| SolverError::DeviceUnavailable(format!("buffer alloc failed: {e}")))
        };

        let h = make_buffer(0.0)?;
        let hu = make_buffer(0.0)?;
        let hv = make_buffer(0.0)?;
        let b = make_buffer(0.0)?;
        let h_t = make_buffer(0.0)?;
        let hu_t = make_buffer(0.0)?;
        let hv_t = make_buffer(0.0)?;

        let nx_u32 = nx as u32;
        let ny_u32 = ny as u32;

        let k_apply_ghost_lr = pro_que
            .kernel_builder("apply_ghost_lr")
            .global_work_size(ny)
            .arg(&h)
            .arg(&hu)
            .arg(&hv)
            .arg(&b)
            .arg(nx_u32)
            .arg(ny_u32)
            .arg(boundary_code(boundary.left))
            .arg(boundary_code(boundary.right))
            .build()
            .map_err(|e| SolverError::DeviceUnavailable(format!("kernel build failed: {e}")))?;

        let k_apply_ghost_tb = pro_que
            .kernel_builder("apply_ghost_tb")
            .global_work_size(nx + 2)
            .arg(&h)
            .arg(&hu)
            .arg(&hv)
            .arg(&b)
            .arg(nx_u32)
            .arg(ny_u32)
            .arg(boundary_code(boundary.bottom))
            .arg(boundary_code(boundary.top))
            .build()
            .map_err(|e| SolverError::DeviceUnavailable(format!("kernel build failed: {e}")))?;

        let k_copy = pro_que
            .kernel_builder("copy_field")
            .global_work_size(len)
            .arg(&h)
            .arg(&h_t)
            .build()
            .map_err(|e| SolverError::DeviceUnavailable(format!("kernel build failed: {e}")))?;

        let k_x_edge = pro_que
            .kernel_builder("x_edge_update")
            .global_work_size((nx + 1) * (ny + 1))
            .arg(&h)
            .arg(&hu)
            .arg(&h_t)
            .arg(&hu_t)
            .arg(&b)
            .arg(nx_u32)
            .arg(ny_u32)
            .arg(0.0f32)
            .build()
            .map_err(|e| SolverError::DeviceUnavailable(format!("kernel build failed: {e}")))?;

        let k_y_edge = pro_que
            .kernel_builder("y_edge_update")
            .global_work_size((nx + 1) * (ny + 1))
            .arg(&h)
            .arg(&hv)
            .arg(&h_t)
            .arg(&hv_t)
            .arg(&b)
            .arg(nx_u32)
            .arg(ny_u32)
            .arg(0.0f32)
            .build()
            .map_err(|e| SolverError::DeviceUnavailable(format!("kernel build failed: {e}")))?;

        if !solver_is_fwave {
            return Err(SolverError::InvalidSolver(
                "the accelerator patch only implements the f-wave kernel".into(),
            ));
        }

        Ok(Self {
            nx,
            ny,
            boundary,
            solver_is_fwave,
            pro_que,
            h,
            hu,
            hv,
            b,
            h_t,
            hu_t,
            hv_t,
            k_apply_ghost_lr,
            k_apply_ghost_tb,
            k_copy,
            k_x_edge,
            k_y_edge,
            host_h: vec![0.0; len],
            host_hu: vec![0.0; len],
            host_hv: vec![0.0; len],
            host_b: vec![0.0; len],
        })
    }

    #[inline]
    pub fn nx(&self) -> TIdx {
        self.nx
    }

    #[inline]
    pub fn ny(&self) -> TIdx {
        self.ny
    }

    /// Populate a cell's initial state in host-side staging. Call
    /// `set_data` once after all cells are filled.
    pub fn stage_cell(&mut self, ix: TIdx, iy: TIdx, h: TReal, hu: TReal, hv: TReal, b: TReal) {
        let stride = self.nx + 2;
        let coord = (ix + 1) + (iy + 1) * stride;
        self.host_h[coord] = h;
        self.host_hu[coord] = hu;
        self.host_hv[coord] = hv;
        self.host_b[coord] = b;
    }

    /// Upload the staged host arrays to the device. Must be called once
    /// after initial fill, before the first `time_step`.
    pub fn set_data(&mut self) -> Result<()> {
        self.h
            .write(&self.host_h)
            .enq()
            .map_err(|e| SolverError::DeviceUnavailable(format!("upload failed: {e}")))?;
        self.hu
            .write(&self.host_hu)
            .enq()
            .map_err(|e| SolverError::DeviceUnavailable(format!("upload failed: {e}")))?;
        self.hv
            .write(&self.host_hv)
            .enq()
            .map_err(|e| SolverError::DeviceUnavailable(format!("upload failed: {e}")))?;
        self.b
            .write(&self.host_b)
            .enq()
            .map_err(|e| SolverError::DeviceUnavailable(format!("upload failed: {e}")))?;
        self.pro_que
            .queue()
            .finish()
            .map_err(|e| SolverError::DeviceUnavailable(format!("queue drain failed: {e}")))
    }

    /// Download the device state into host-side staging. Must be called
    /// before every snapshot or checkpoint.
    pub fn get_data(&mut self) -> Result<()> {
        self.h
            .read(&mut self.host_h)
            .enq()
            .map_err(|e| SolverError::DeviceUnavailable(format!("download failed: {e}")))?;
        self.hu
            .read(&mut self.host_hu)
            .enq()
            .map_err(|e| SolverError::DeviceUnavailable(format!("download failed: {e}")))?;
        self.hv
            .read(&mut self.host_hv)
            .enq()
            .map_err(|e| SolverError::DeviceUnavailable(format!("download failed: {e}")))?;
        self.pro_que
            .queue()
            .finish()
            .map_err(|e| SolverError::DeviceUnavailable(format!("queue drain failed: {e}")))
    }

    pub fn height(&self) -> &[TReal] {
        &self.host_h
    }

    pub fn momentum_x(&self) -> &[TReal] {
        &self.host_hu
    }

    pub fn momentum_y(&self) -> &[TReal] {
        &self.host_hv
    }

    pub fn bathymetry(&self) -> &[TReal] {
        &self.host_b
    }

    pub fn h_max(&self) -> TReal {
        self.host_h.iter().copied().fold(TReal::MIN, TReal::max)
    }

    fn enqueue_and_drain(&self, kernel: &Kernel) -> Result<()> {
        unsafe {
            kernel
                .enq()
                .map_err(|e| SolverError::DeviceUnavailable(format!("kernel launch failed: {e}")))?;
        }
        self.pro_que
            .queue()
            .finish()
            .map_err(|e| SolverError::DeviceUnavailable(format!("queue drain failed: {e}")))
    }

    pub fn time_step(&mut self, scaling: TReal) -> Result<()> {
        // x-sweep
        self.enqueue_and_drain(&self.k_apply_ghost_lr)?;
        self.enqueue_and_drain(&self.k_apply_ghost_tb)?;
        self.k_copy.set_arg(1, &self.h_t).ok();
        self.enqueue_and_drain(&self.k_copy)?;
        self.copy_momentum_x()?;
        self.k_x_edge.set_arg(7, scaling).ok();
        self.enqueue_and_drain(&self.k_x_edge)?;

        // y-sweep
        self.enqueue_and_drain(&self.k_apply_ghost_lr)?;
        self.enqueue_and_drain(&self.k_apply_ghost_tb)?;
        self.k_copy.set_arg(1, &self.h_t).ok();
        self.enqueue_and_drain(&self.k_copy)?;
        self.copy_momentum_y()?;
        self.k_y_edge.set_arg(7, scaling).ok();
        self.enqueue_and_drain(&self.k_y_edge)?;

        Ok(())
    }

    fn copy_momentum_x(&self) -> Result<()> {
        let k = self
            .pro_que
            .kernel_builder("copy_field")
            .global_work_size((self.nx + 2) * (self.ny + 2))
            .arg(&self.hu)
            .arg(&self.hu_t)
            .build()
            .map_err(|e| SolverError::DeviceUnavailable(format!("kernel build failed: {e}")))?;
        self.enqueue_and_drain(&k)
    }

    fn copy_momentum_y(&self) -> Result<()> {
        let k = self
            .pro_que
            .kernel_builder("copy_field")
            .global_work_size((self.nx + 2) * (self.ny + 2))
            .arg(&self.hv)
            .arg(&self.hv_t)
            .build()
            .map_err(|e| SolverError::DeviceUnavailable(format!("kernel build failed: {e}")))?;
        self.enqueue_and_drain(&k)
    }
}
