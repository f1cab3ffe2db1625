use nalgebra_glm as glm;

const NEAR_PLANE: f32 = 0.01;
const FAR_PLANE: f32 = 1000.0;

/// Orbit camera around a target point, Y up
#[derive(Debug, Clone)]
pub struct CameraState {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub target: [f32; 3],
    pub fovy: f32,
    pub default_yaw: f32,
    pub default_pitch: f32,
    pub default_distance: f32,
    pub default_target: [f32; 3],
}

impl CameraState {
    pub fn new(yaw: f32, pitch: f32, distance: f32, target: [f32; 3], fovy: f32) -> Self {
        Self {
            yaw,
            pitch,
            distance,
            target,
            fovy,
            default_yaw: yaw,
            default_pitch: pitch,
            default_distance: distance,
            default_target: target,
        }
    }

    /// Orbit parameters that place the eye at `position` looking at `target`
    pub fn from_look_at(position: [f32; 3], target: [f32; 3], fovy: f32) -> Self {
        let offset = glm::make_vec3(&position) - glm::make_vec3(&target);
        let distance = offset.norm().max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.z.atan2(offset.x);
        Self::new(yaw, pitch, distance, target, fovy)
    }

    pub fn reset(&mut self) {
        self.yaw = self.default_yaw;
        self.pitch = self.default_pitch;
        self.distance = self.default_distance;
        self.target = self.default_target;
    }

    pub fn eye(&self) -> glm::Vec3 {
        let dir = glm::vec3(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        );
        glm::make_vec3(&self.target) + dir * self.distance
    }

    pub fn view(&self) -> glm::Mat4 {
        glm::look_at(&self.eye(), &glm::make_vec3(&self.target), &glm::vec3(0.0, 1.0, 0.0))
    }

    /// Projection uses the 0..1 depth range wgpu expects
    pub fn view_proj(&self, aspect: f32) -> glm::Mat4 {
        let proj = glm::perspective_rh_zo(aspect, self.fovy.to_radians(), NEAR_PLANE, FAR_PLANE);
        proj * self.view()
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::from_look_at([5.0, 5.0, 5.0], [0.0, 2.0, 0.0], 45.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_eye_matches_scene_camera() {
        let camera = CameraState::default();
        assert!((camera.eye() - glm::vec3(5.0, 5.0, 5.0)).norm() < 1e-4);
        assert_eq!(camera.fovy, 45.0);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = CameraState::default();
        let clip = camera.view_proj(16.0 / 9.0) * glm::vec4(0.0, 2.0, 0.0, 1.0);
        let ndc = clip.xyz() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn reset_restores_initial_orbit() {
        let mut camera = CameraState::default();
        camera.yaw += 1.0;
        camera.distance = 2.0;
        camera.target = [1.0, 0.0, 1.0];
        camera.reset();
        assert!((camera.eye() - glm::vec3(5.0, 5.0, 5.0)).norm() < 1e-4);
    }
}
