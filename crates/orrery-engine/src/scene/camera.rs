/// Point of view a scene renders from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: [f32; 3],
    pub target:   [f32; 3],
    /// Vertical field of view, radians.
    pub fov_y:    f32,
    pub near:     f32,
    pub far:      f32,
}

impl Camera {
    pub fn looking_at(position: [f32; 3], target: [f32; 3]) -> Self {
        Self { position, target, ..Self::default() }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: [0.0, 5.0, -10.0],
            target:   [0.0, 0.0, 0.0],
            fov_y:    0.8,
            near:     0.1,
            far:      1000.0,
        }
    }
}
