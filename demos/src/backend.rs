//! Compile-time backend selection.
//!
//! `cuda` wins over `wgpu`; without either feature the CPU `ndarray` backend
//! is used. GPU backends take a device ordinal, the CPU backend ignores it.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(feature = "cuda")] {
        use burn::backend::cuda::{Cuda, CudaDevice};

        pub type SelectedBackend = Cuda;
        pub type SelectedDevice = CudaDevice;

        /// Human-readable backend name for logs.
        pub const BACKEND_NAME: &str = "CUDA (NVIDIA GPU)";

        /// The CUDA device with the given ordinal.
        pub fn select_device(ordinal: usize) -> SelectedDevice {
            CudaDevice::new(ordinal)
        }
    } else if #[cfg(feature = "wgpu")] {
        use burn::backend::wgpu::{Wgpu, WgpuDevice};

        pub type SelectedBackend = Wgpu;
        pub type SelectedDevice = WgpuDevice;

        /// Human-readable backend name for logs.
        pub const BACKEND_NAME: &str = "WGPU (GPU)";

        /// The default adapter for ordinal 0, otherwise that discrete GPU.
        pub fn select_device(ordinal: usize) -> SelectedDevice {
            match ordinal {
                0 => WgpuDevice::DefaultDevice,
                n => WgpuDevice::DiscreteGpu(n),
            }
        }
    } else {
        use burn::backend::ndarray::{NdArray, NdArrayDevice};

        pub type SelectedBackend = NdArray;
        pub type SelectedDevice = NdArrayDevice;

        /// Human-readable backend name for logs.
        pub const BACKEND_NAME: &str = "NdArray (CPU)";

        /// The CPU device; there is only one.
        pub fn select_device(ordinal: usize) -> SelectedDevice {
            if ordinal != 0 {
                tracing::warn!(ordinal, "ndarray has a single CPU device, ignoring ordinal");
            }
            NdArrayDevice::Cpu
        }
    }
}
