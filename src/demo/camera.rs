use glam::{Mat4, Vec3};

use gol_overlay::config::{CAMERA_DISTANCE, CAMERA_FOV_Y_DEGREES, CAMERA_HEIGHT, CAMERA_ORBIT_SPEED};

const TARGET: Vec3 = Vec3::new(0.0, 0.75, 0.0);

/// Camera circling the scene origin
pub struct OrbitCamera {
    /// Starting angle in radians
    pub phase: f32,
    pub distance: f32,
    pub height: f32,
}

impl OrbitCamera {
    pub fn new(phase: f32) -> Self {
        Self {
            phase,
            distance: CAMERA_DISTANCE,
            height: CAMERA_HEIGHT,
        }
    }

    pub fn position(&self, time: f32) -> Vec3 {
        let angle = self.phase + time * CAMERA_ORBIT_SPEED;
        Vec3::new(angle.cos() * self.distance, self.height, angle.sin() * self.distance)
    }

    /// (view-projection, eye position) for a viewport of the given aspect
    pub fn view_proj(&self, time: f32, aspect: f32) -> (Mat4, Vec3) {
        let eye = self.position(time);
        let view = Mat4::look_at_rh(eye, TARGET, Vec3::Y);
        let proj = Mat4::perspective_rh(CAMERA_FOV_Y_DEGREES.to_radians(), aspect, 0.1, 100.0);
        (proj * view, eye)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_projects_to_center() {
        let camera = OrbitCamera::new(0.3);
        let (view_proj, _) = camera.view_proj(2.0, 16.0 / 9.0);
        let clip = view_proj * TARGET.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
