use glam::Vec3;

/// Blinn-Phong surface description written into the G-buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub albedo: Vec3,
    pub specular: Vec3,
    /// Specular exponent, stored in 8 bits: clamped to `[1, 255]`.
    pub shininess: f32,
    pub emissive: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vec3::splat(0.8),
            specular: Vec3::splat(0.5),
            shininess: 32.0,
            emissive: Vec3::ZERO,
        }
    }
}

impl Material {
    pub const MAX_SHININESS: f32 = 255.0;

    #[must_use]
    pub fn new(albedo: Vec3) -> Self {
        Self {
            albedo,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_specular(mut self, specular: Vec3, shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }

    #[must_use]
    pub fn with_emissive(mut self, emissive: Vec3) -> Self {
        self.emissive = emissive;
        self
    }

    /// Shininess normalised into the specular target's alpha channel.
    #[must_use]
    pub fn packed_shininess(&self) -> f32 {
        self.shininess.clamp(1.0, Self::MAX_SHININESS) / Self::MAX_SHININESS
    }
}
