use glam::{Affine3A, EulerRot, Mat3, Quat, Vec3};

/// TRS values the local matrix was last built from.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Snapshot {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
}

/// Local position, rotation and scale of a node plus its cached matrices.
///
/// Animation writes the public fields directly every frame. The local matrix
/// is rebuilt lazily during the hierarchy pass, and only when the values
/// differ from the snapshot it was built from; most party props never move
/// after composition, so this keeps the pass cheap.
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    /// `None` forces the next rebuild.
    built_from: Option<Snapshot>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
            built_from: None,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// Rebuilds the local matrix if the TRS values moved. Returns whether it
    /// did, so the caller knows the subtree's world matrices are stale.
    pub fn update_local_matrix(&mut self) -> bool {
        let current = self.snapshot();
        if self.built_from == Some(current) {
            return false;
        }
        self.local_matrix =
            Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        self.built_from = Some(current);
        true
    }

    /// Sets the rotation from XYZ Euler angles in radians.
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    pub fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// Turns the transform so that its -Z axis faces `target`, both given in
    /// the parent's space. A target straight along `up` is ignored.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        let right = forward.cross(up);
        if right.length_squared() < 1e-4 {
            return;
        }
        let right = right.normalize();
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward));
    }

    /// Forces the next hierarchy pass to rebuild this transform.
    pub fn mark_dirty(&mut self) {
        self.built_from = None;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
