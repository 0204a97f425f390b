//! Structure-of-arrays particle storage, sized once.

use glam::Vec3;

/// Fixed-size particle buffers shared with the renderer.
///
/// `base_color` holds the undimmed colors written by the color actor;
/// `color` is what the renderer uploads (`base_color × occlusion`).
/// Writers of `base_color` must go through [`ParticleField::set_base_colors`]
/// so the version token advances.
#[derive(Clone, Debug)]
pub struct ParticleField {
    count: usize,
    pub position: Vec<f32>,
    pub velocity: Vec<f32>,
    pub target: Vec<f32>,
    pub color: Vec<[f32; 3]>,
    pub occlusion: Vec<f32>,
    base_color: Vec<[f32; 3]>,
    color_version: u64,
    color_dirty: bool,
}

impl ParticleField {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            position: vec![0.0; count * 3],
            velocity: vec![0.0; count * 3],
            target: vec![0.0; count * 3],
            color: vec![[1.0; 3]; count],
            occlusion: vec![1.0; count],
            base_color: vec![[1.0; 3]; count],
            color_version: 0,
            color_dirty: true,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn position_at(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.position[i * 3..i * 3 + 3])
    }

    pub fn velocity_at(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.velocity[i * 3..i * 3 + 3])
    }

    pub fn target_at(&self, i: usize) -> Vec3 {
        Vec3::from_slice(&self.target[i * 3..i * 3 + 3])
    }

    pub fn set_velocity(&mut self, i: usize, v: Vec3) {
        v.write_to_slice(&mut self.velocity[i * 3..i * 3 + 3]);
    }

    pub fn set_position(&mut self, i: usize, p: Vec3) {
        p.write_to_slice(&mut self.position[i * 3..i * 3 + 3]);
    }

    /// Place every particle on its target at rest.
    pub fn snap_to_targets(&mut self) {
        self.position.copy_from_slice(&self.target);
        self.velocity.fill(0.0);
    }

    pub fn base_color(&self) -> &[[f32; 3]] {
        &self.base_color
    }

    /// Wholesale base-color rewrite. Advances the version token.
    ///
    /// Displayed colors are left alone; the occlusion pass notices the new
    /// version and rebuilds them from the new bases.
    pub fn set_base_colors(&mut self, mut color_for: impl FnMut(usize) -> [f32; 3]) {
        for (i, c) in self.base_color.iter_mut().enumerate() {
            *c = color_for(i);
        }
        self.color_version += 1;
    }

    pub fn color_version(&self) -> u64 {
        self.color_version
    }

    pub fn mark_color_dirty(&mut self) {
        self.color_dirty = true;
    }

    /// Whether displayed colors changed since the last call; clears the flag.
    pub fn take_color_dirty(&mut self) -> bool {
        std::mem::take(&mut self.color_dirty)
    }

    pub fn is_color_dirty(&self) -> bool {
        self.color_dirty
    }

    /// Split borrow for the occlusion pass.
    pub(crate) fn occlusion_parts(&mut self) -> OcclusionParts<'_> {
        OcclusionParts {
            position: &self.position,
            base_color: &self.base_color,
            color: &mut self.color,
            occlusion: &mut self.occlusion,
        }
    }
}

pub(crate) struct OcclusionParts<'a> {
    pub position: &'a [f32],
    pub base_color: &'a [[f32; 3]],
    pub color: &'a mut [[f32; 3]],
    pub occlusion: &'a mut [f32],
}
