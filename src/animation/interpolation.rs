// Interpolation utilities

use super::types::Transform;
use nalgebra_glm as glm;

/// Linear interpolation for vectors
pub fn lerp_vec3(v1: &glm::Vec3, v2: &glm::Vec3, t: f32) -> glm::Vec3 {
    glm::lerp(v1, v2, t)
}

/// Linear interpolation for scalars
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Shortest-path SLERP. Falls back to normalized lerp for nearly parallel
/// quaternions, so opposite-sign inputs never fail.
pub fn quat_slerp(q1: &glm::Quat, q2: &glm::Quat, t: f32) -> glm::Quat {
    let mut to = *q2;
    let mut cos_theta = glm::quat_dot(q1, q2);
    if cos_theta < 0.0 {
        to = -to;
        cos_theta = -cos_theta;
    }

    if cos_theta > 0.9995 {
        let coords = q1.coords.lerp(&to.coords, t);
        return glm::quat_normalize(&glm::Quat::from(coords));
    }

    let theta = cos_theta.acos();
    let sin_theta = theta.sin();
    let w1 = ((1.0 - t) * theta).sin() / sin_theta;
    let w2 = (t * theta).sin() / sin_theta;
    glm::Quat::from(q1.coords * w1 + to.coords * w2)
}

/// Elementwise blend of two bone transforms
pub fn blend_transform(a: &Transform, b: &Transform, t: f32) -> Transform {
    Transform {
        translation: lerp_vec3(&a.translation, &b.translation, t),
        rotation: quat_slerp(&a.rotation, &b.rotation, t),
        scale: lerp_vec3(&a.scale, &b.scale, t),
    }
}

/// Oscillating blend parameter `(sin(t) + 1) / 2`, clamped to [0, 1]
pub fn blend_factor(time_seconds: f64) -> f32 {
    (((time_seconds.sin() + 1.0) / 2.0) as f32).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_quat(a: &glm::Quat, b: &glm::Quat) -> bool {
        // q and -q are the same rotation
        glm::quat_dot(a, b).abs() > 1.0 - 1e-5
    }

    #[test]
    fn blend_factor_stays_in_unit_interval() {
        let mut t = -50.0;
        while t < 50.0 {
            let f = blend_factor(t);
            assert!((0.0..=1.0).contains(&f), "t={t} f={f}");
            t += 0.173;
        }
        assert!((blend_factor(0.0) - 0.5).abs() < 1e-6);
        assert!((blend_factor(std::f64::consts::FRAC_PI_2) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn slerp_endpoints_and_midpoint() {
        let a = glm::quat_identity();
        let b = glm::quat_angle_axis(std::f32::consts::FRAC_PI_2, &glm::vec3(0.0, 1.0, 0.0));
        assert!(approx_quat(&quat_slerp(&a, &b, 0.0), &a));
        assert!(approx_quat(&quat_slerp(&a, &b, 1.0), &b));
        let mid = quat_slerp(&a, &b, 0.5);
        let expected = glm::quat_angle_axis(std::f32::consts::FRAC_PI_4, &glm::vec3(0.0, 1.0, 0.0));
        assert!(approx_quat(&mid, &expected));
    }

    #[test]
    fn slerp_handles_opposite_sign_quaternions() {
        let a = glm::quat_identity();
        let b = -glm::quat_identity();
        let r = quat_slerp(&a, &b, 0.5);
        assert!(approx_quat(&r, &a));
    }

    #[test]
    fn lerp_f32_endpoints() {
        assert_eq!(lerp_f32(2.0, 4.0, 0.0), 2.0);
        assert_eq!(lerp_f32(2.0, 4.0, 1.0), 4.0);
        assert_eq!(lerp_f32(2.0, 4.0, 0.5), 3.0);
    }
}
