use crate::core::math::transform::TransformFactory;
use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};
use std::f32::consts::{FRAC_PI_2, PI};

/// Keeps the ONB away from the poles, where `world_up x forward` vanishes.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// One frame of camera input, decoupled from the windowing library.
///
/// Axes are in `-1.0..=1.0`. Positive `forward` is the W key, positive
/// `strafe` is D, positive `vertical` is E, positive `fov` widens the view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    pub forward: f32,
    pub strafe: f32,
    pub vertical: f32,
    pub fov: f32,
    /// Pointer position in window pixels, if known.
    pub pointer: Option<Point2<f32>>,
    /// Look button (right mouse button).
    pub look: bool,
    /// Drag button (left mouse button).
    pub drag: bool,
}

impl CameraInput {
    fn any_button(&self) -> bool {
        self.look || self.drag
    }
}

/// Free-fly perspective camera.
///
/// Orientation is a base forward vector rotated by pitch (about X) and then
/// yaw (about Y). The ONB and projection are cached and rebuilt whenever an
/// input to them changes.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Point3<f32>,
    forward: Vector3<f32>,
    yaw: f32,
    pitch: f32,

    fov_angle: f32,
    tan_half_fov: f32,
    near: f32,
    far: f32,

    width: f32,
    height: f32,
    aspect_ratio: f32,
    left_handed: bool,

    pub move_speed: f32,
    pub fov_speed: f32,
    pub sensitivity: f32,

    last_pointer: Option<Point2<f32>>,

    onb: Matrix4<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl Camera {
    /// Camera at the origin looking along +Z with a 90 degree FOV.
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_params(
            width,
            height,
            Point3::origin(),
            Vector3::z(),
            FRAC_PI_2,
            0.1,
            100.0,
        )
    }

    pub fn with_params(
        width: f32,
        height: f32,
        position: Point3<f32>,
        forward: Vector3<f32>,
        fov_angle: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            forward: forward.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::z),
            yaw: 0.0,
            pitch: 0.0,
            fov_angle,
            tan_half_fov: (fov_angle / 2.0).tan(),
            near,
            far,
            width,
            height,
            aspect_ratio: width / height,
            left_handed: true,
            move_speed: 10.0,
            fov_speed: 3.0,
            sensitivity: 0.01,
            last_pointer: None,
            onb: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
        };
        camera.update_projection();
        camera.update_onb();
        camera
    }

    // --- Accessors ---

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn onb(&self) -> &Matrix4<f32> {
        &self.onb
    }

    pub fn view(&self) -> &Matrix4<f32> {
        &self.view
    }

    pub fn projection(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn screen_width(&self) -> f32 {
        self.width
    }

    pub fn screen_height(&self) -> f32 {
        self.height
    }

    pub fn fov_angle(&self) -> f32 {
        self.fov_angle
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn is_left_handed(&self) -> bool {
        self.left_handed
    }

    /// Base forward rotated by pitch about X, then by yaw about Y.
    pub fn local_forward(&self) -> Vector3<f32> {
        let rotation = TransformFactory::rotation_y(self.yaw) * TransformFactory::rotation_x(self.pitch);
        rotation.transform_vector(&self.forward)
    }

    /// True when a clip-space w lies outside `[near, far]`.
    pub fn frustum_cull(&self, w: f32) -> bool {
        w < self.near || w > self.far
    }

    // --- Mutation ---

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
        self.update_onb();
    }

    pub fn set_screen(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.aspect_ratio = width / height;
        self.update_projection();
    }

    pub fn set_handedness(&mut self, left_handed: bool) {
        self.left_handed = left_handed;
        self.update_projection();
        self.update_onb();
    }

    /// Changes the FOV by `delta` radians. Ignored if the result would leave
    /// the open interval `(0, PI)`.
    pub fn change_fov(&mut self, delta: f32) -> bool {
        let fov = self.fov_angle + delta;
        if fov <= 0.0 || fov >= PI {
            return false;
        }
        self.fov_angle = fov;
        self.update_projection();
        true
    }

    /// Applies one frame of keyboard and pointer input.
    pub fn update(&mut self, input: &CameraInput, elapsed: f32) {
        let step = self.move_speed * elapsed;
        let forward = self.local_forward();
        let world_up = Vector3::y();

        // The camera looks down -forward in right-handed space.
        self.position -= forward * (input.forward * step);
        self.position -= forward.cross(&world_up) * (input.strafe * step);
        self.position += world_up * (input.vertical * step);

        if input.fov != 0.0 {
            self.change_fov(input.fov * self.fov_speed * elapsed);
        }

        self.apply_pointer(input, step);
        self.update_onb();
    }

    fn apply_pointer(&mut self, input: &CameraInput, step: f32) {
        if !input.any_button() {
            self.last_pointer = None;
            return;
        }
        let Some(pointer) = input.pointer else {
            return;
        };

        if let Some(last) = self.last_pointer {
            let dx = pointer.x - last.x;
            let dy = pointer.y - last.y;
            // Dragging upwards (negative dy) counts as positive motion.
            let vertical_sign = if dy == 0.0 { 0.0 } else { -dy.signum() };

            if input.look && input.drag {
                let vertical = self.local_forward().cross(&Vector3::x());
                self.position += vertical * (vertical_sign * step);
            } else {
                self.yaw += dx * self.sensitivity;
                if input.drag {
                    self.position += self.local_forward() * (vertical_sign * step);
                } else {
                    self.pitch = (self.pitch + dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
                }
            }
        }

        self.last_pointer = Some(pointer);
    }

    fn update_projection(&mut self) {
        self.tan_half_fov = (self.fov_angle / 2.0).tan();
        self.projection = TransformFactory::projection(
            self.aspect_ratio,
            self.tan_half_fov,
            self.near,
            self.far,
            self.left_handed,
        );
    }

    fn update_onb(&mut self) {
        let mut position = self.position.coords;
        let mut forward = self.local_forward();
        if self.left_handed {
            position.z = -position.z;
            forward.x = -forward.x;
            forward.y = -forward.y;
        }

        let world_up = Vector3::y();
        let right = world_up.cross(&forward).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::x);
        let up = forward.cross(&right).try_normalize(f32::EPSILON).unwrap_or(world_up);

        self.onb = Matrix4::from_columns(&[
            right.push(0.0),
            up.push(0.0),
            forward.push(0.0),
            Vector4::new(position.x, position.y, position.z, 1.0),
        ]);
        self.view = self.onb.try_inverse().unwrap_or_else(Matrix4::identity);
    }
}
