use crate::constants::BIN_COUNT;
use crate::spectrum::SpectrumFrame;

/// Uniform block consumed by the fragment program.
///
/// WGSL uniform arrays need a 16-byte element stride, so the 64 bands travel
/// as 16 `vec4<f32>`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShaderUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub bass: f32,
    pub mids: f32,
    pub highs: f32,
    pub _pad: [f32; 2],
    pub bins: [[f32; 4]; BIN_COUNT / 4],
}

impl ShaderUniforms {
    pub fn new(resolution: [f32; 2], time: f32, frame: &SpectrumFrame) -> Self {
        let mut bins = [[0.0f32; 4]; BIN_COUNT / 4];
        for (packed, chunk) in bins.iter_mut().zip(frame.bins.chunks_exact(4)) {
            packed.copy_from_slice(chunk);
        }
        Self {
            resolution,
            time,
            bass: frame.bass,
            mids: frame.mids,
            highs: frame.highs,
            _pad: [0.0; 2],
            bins,
        }
    }

    /// Band `i` as the shader sees it.
    #[inline]
    pub fn bin(&self, i: usize) -> f32 {
        self.bins[i / 4][i % 4]
    }
}
