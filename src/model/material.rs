//! Materials and the texture references they hold

/// How to handle transparency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl AlphaMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "OPAQUE" => Some(Self::Opaque),
            "MASK" => Some(Self::Mask),
            "BLEND" => Some(Self::Blend),
            _ => None,
        }
    }
}

/// UV transform from `KHR_texture_transform`
///
/// Values are kept exactly as written in the document; rotation is in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureTransform {
    pub uv_offset: [f32; 2],
    pub rotation: f32,
    pub uv_scale: [f32; 2],
    /// Overrides the texture info's `tex_coord` when present
    pub tex_coord: Option<usize>,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            uv_offset: [0.0, 0.0],
            rotation: 0.0,
            uv_scale: [1.0, 1.0],
            tex_coord: None,
        }
    }
}

/// Reference from a material slot to a texture
///
/// `scale` carries `normalTexture.scale` and `occlusionTexture.strength`;
/// it stays 1.0 for every other slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    pub texture_index: usize,
    pub tex_coord: usize,
    pub scale: f32,
    pub transform: Option<Box<TextureTransform>>,
}

impl TextureInfo {
    pub fn new(texture_index: usize) -> Self {
        Self {
            texture_index,
            tex_coord: 0,
            scale: 1.0,
            transform: None,
        }
    }
}

/// Metallic-roughness parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PbrData {
    /// Base color factor (RGBA)
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureInfo>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    /// Metallic-roughness texture (B: metallic, G: roughness)
    pub metallic_roughness_texture: Option<TextureInfo>,
}

impl Default for PbrData {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
        }
    }
}

/// `KHR_materials_specular`
///
/// Every member is present exactly when the document declares it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialSpecular {
    pub specular_factor: Option<f32>,
    pub specular_texture: Option<TextureInfo>,
    pub specular_color_factor: Option<[f32; 3]>,
    pub specular_color_texture: Option<TextureInfo>,
}

/// `KHR_materials_clearcoat`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialClearcoat {
    pub clearcoat_factor: f32,
    pub clearcoat_texture: Option<TextureInfo>,
    pub clearcoat_roughness_factor: f32,
    pub clearcoat_roughness_texture: Option<TextureInfo>,
    pub clearcoat_normal_texture: Option<TextureInfo>,
}

/// `KHR_materials_transmission`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialTransmission {
    pub transmission_factor: f32,
    pub transmission_texture: Option<TextureInfo>,
}

/// Material properties for PBR rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Optional name of the material
    pub name: Option<String>,
    /// Absent when the document has no `pbrMetallicRoughness` object
    pub pbr_data: Option<PbrData>,

    pub normal_texture: Option<TextureInfo>,
    pub occlusion_texture: Option<TextureInfo>,
    pub emissive_texture: Option<TextureInfo>,
    /// Emissive factor (RGB)
    pub emissive_factor: [f32; 3],

    pub alpha_mode: AlphaMode,
    /// Alpha cutoff for masked blending
    pub alpha_cutoff: f32,
    pub double_sided: bool,

    // Extension-attached members
    /// `KHR_materials_unlit`
    pub unlit: bool,
    /// `KHR_materials_emissive_strength`
    pub emissive_strength: Option<f32>,
    /// `KHR_materials_ior`
    pub ior: Option<f32>,
    pub specular: Option<Box<MaterialSpecular>>,
    pub clearcoat: Option<Box<MaterialClearcoat>>,
    pub transmission: Option<Box<MaterialTransmission>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            pbr_data: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: [0.0, 0.0, 0.0],
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            unlit: false,
            emissive_strength: None,
            ior: None,
            specular: None,
            clearcoat: None,
            transmission: None,
        }
    }
}

impl Material {
    /// Core texture slots paired with their JSON names
    pub fn core_textures(&self) -> impl Iterator<Item = (&'static str, &TextureInfo)> {
        let pbr = self.pbr_data.as_ref();
        [
            (
                "baseColorTexture",
                pbr.and_then(|p| p.base_color_texture.as_ref()),
            ),
            (
                "metallicRoughnessTexture",
                pbr.and_then(|p| p.metallic_roughness_texture.as_ref()),
            ),
            ("normalTexture", self.normal_texture.as_ref()),
            ("occlusionTexture", self.occlusion_texture.as_ref()),
            ("emissiveTexture", self.emissive_texture.as_ref()),
        ]
        .into_iter()
        .filter_map(|(slot, info)| info.map(|info| (slot, info)))
    }
}
