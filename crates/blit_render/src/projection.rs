use glam::Mat4;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ProjectionUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Maps target pixels (origin top-left, y down) to clip space.
pub struct ScreenProjection {
    pub viewport: (u32, u32),
}

impl ScreenProjection {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            viewport: (viewport_width, viewport_height),
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let w = self.viewport.0.max(1) as f32;
        let h = self.viewport.1.max(1) as f32;
        Mat4::orthographic_rh(0.0, w, h, 0.0, -1.0, 1.0)
    }

    pub fn build_uniform(&self) -> ProjectionUniform {
        ProjectionUniform {
            view_proj: self.matrix().to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn top_left_pixel_maps_to_clip_top_left() {
        let projection = ScreenProjection::new(640, 480);
        let clip = projection.matrix().project_point3(Vec3::new(0.0, 0.0, 0.0));
        assert!((clip.x + 1.0).abs() < 1e-6);
        assert!((clip.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bottom_right_pixel_maps_to_clip_bottom_right() {
        let projection = ScreenProjection::new(640, 480);
        let clip = projection
            .matrix()
            .project_point3(Vec3::new(640.0, 480.0, 0.0));
        assert!((clip.x - 1.0).abs() < 1e-6);
        assert!((clip.y + 1.0).abs() < 1e-6);
    }
}
