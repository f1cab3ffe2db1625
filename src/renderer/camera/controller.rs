use super::CameraState;
use winit::keyboard::KeyCode;

const ROTATE_SPEED: f32 = 0.005;
const ZOOM_STEP: f32 = 0.1;
const MOVE_SPEED: f32 = 3.0;
const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 50.0;
const PITCH_LIMIT: f32 = 1.5;

/// Third-person camera input: mouse orbits, wheel zooms, WASD moves the target
pub struct CameraController {
    state: CameraState,
    forward_pressed: bool,
    back_pressed: bool,
    left_pressed: bool,
    right_pressed: bool,
}

impl CameraController {
    pub fn new(state: CameraState) -> Self {
        Self {
            state,
            forward_pressed: false,
            back_pressed: false,
            left_pressed: false,
            right_pressed: false,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Raw mouse motion from the grabbed cursor
    pub fn on_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        self.state.yaw += delta_x as f32 * ROTATE_SPEED;
        self.state.pitch += delta_y as f32 * ROTATE_SPEED;
        self.state.pitch = self.state.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn on_scroll(&mut self, delta: f32) {
        let zoom_factor = 1.0 - delta * ZOOM_STEP;
        self.state.distance = (self.state.distance * zoom_factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Returns true if the key is a camera key
    pub fn on_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        match key {
            KeyCode::KeyW => self.forward_pressed = pressed,
            KeyCode::KeyS => self.back_pressed = pressed,
            KeyCode::KeyA => self.left_pressed = pressed,
            KeyCode::KeyD => self.right_pressed = pressed,
            KeyCode::KeyR if pressed => self.reset(),
            KeyCode::KeyR => {}
            _ => return false,
        }
        true
    }

    /// Move the target on the ground plane relative to the view direction
    pub fn update(&mut self, dt: f32) {
        let forward_amount = (self.forward_pressed as i32 - self.back_pressed as i32) as f32;
        let right_amount = (self.right_pressed as i32 - self.left_pressed as i32) as f32;
        if forward_amount == 0.0 && right_amount == 0.0 {
            return;
        }

        // Eye sits at +yaw from the target, so forward points back along it
        let forward = [-self.state.yaw.cos(), -self.state.yaw.sin()];
        let right = [-forward[1], forward[0]];
        let step = MOVE_SPEED * dt;

        self.state.target[0] += (forward[0] * forward_amount + right[0] * right_amount) * step;
        self.state.target[2] += (forward[1] * forward_amount + right[1] * right_amount) * step;
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.forward_pressed = false;
        self.back_pressed = false;
        self.left_pressed = false;
        self.right_pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_and_zoom_are_clamped() {
        let mut controller = CameraController::new(CameraState::default());
        controller.on_mouse_motion(0.0, 10_000.0);
        assert_eq!(controller.state().pitch, PITCH_LIMIT);
        for _ in 0..100 {
            controller.on_scroll(1.0);
        }
        assert_eq!(controller.state().distance, MIN_DISTANCE);
        for _ in 0..100 {
            controller.on_scroll(-5.0);
        }
        assert_eq!(controller.state().distance, MAX_DISTANCE);
    }

    #[test]
    fn forward_moves_target_away_from_eye() {
        let mut controller = CameraController::new(CameraState::default());
        let eye = controller.state().eye();
        let before = controller.state().target;
        assert!(controller.on_key(KeyCode::KeyW, true));
        controller.update(1.0);
        let after = controller.state().target;

        let dist = |t: [f32; 3]| ((t[0] - eye.x).powi(2) + (t[2] - eye.z).powi(2)).sqrt();
        assert!(dist(after) > dist(before));
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn r_restores_initial_view() {
        let mut controller = CameraController::new(CameraState::default());
        controller.on_mouse_motion(120.0, -40.0);
        controller.on_key(KeyCode::KeyD, true);
        controller.update(0.5);
        assert!(controller.on_key(KeyCode::KeyR, true));
        assert_eq!(controller.state().target, [0.0, 2.0, 0.0]);
        controller.update(0.5);
        assert_eq!(controller.state().target, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn non_camera_keys_are_ignored() {
        let mut controller = CameraController::new(CameraState::default());
        assert!(!controller.on_key(KeyCode::KeyT, true));
        controller.update(1.0);
        assert_eq!(controller.state().target, [0.0, 2.0, 0.0]);
    }
}
