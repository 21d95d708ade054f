//! Material attributes from MATL dictionaries, and the parameter set a
//! renderer-side material instance needs.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::palette::Rgba;

/// Surface kind from the `_type` key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    #[default]
    Diffuse,
    Metal,
    Glass,
    Emit,
}

impl MaterialType {
    /// Parse a `_type` value. Anything unrecognised (`_blend`, `_media`, ...)
    /// is treated as diffuse.
    pub fn from_vox_name(name: &str) -> Self {
        match name {
            "_metal" => MaterialType::Metal,
            "_glass" => MaterialType::Glass,
            "_emit" => MaterialType::Emit,
            _ => MaterialType::Diffuse,
        }
    }

    pub fn vox_name(self) -> &'static str {
        match self {
            MaterialType::Diffuse => "_diffuse",
            MaterialType::Metal => "_metal",
            MaterialType::Glass => "_glass",
            MaterialType::Emit => "_emit",
        }
    }
}

/// Material attributes of one palette slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxMaterial {
    pub kind: MaterialType,
    pub weight: f32,
    pub roughness: f32,
    pub metallic: f32,
    pub specular: f32,
    /// Refractive index (not the `ior - 1` stored in files)
    pub ior: f32,
    pub attenuation: f32,
    pub emissive: f32,
    pub emission_power: f32,
    pub ldr: f32,
    pub transparency: f32,
    pub plastic: bool,
}

impl Default for VoxMaterial {
    fn default() -> Self {
        Self {
            kind: MaterialType::Diffuse,
            weight: 1.0,
            roughness: 0.1,
            metallic: 0.0,
            specular: 1.0,
            ior: 1.3,
            attenuation: 1.0,
            emissive: 0.0,
            emission_power: 0.0,
            ldr: 0.0,
            transparency: 0.0,
            plastic: false,
        }
    }
}

impl VoxMaterial {
    /// Build a material from dictionary entries in file order.
    pub fn from_dict<K, V>(entries: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut material = Self::default();
        for (key, value) in entries {
            material.apply(key.as_ref(), value.as_ref());
        }
        material
    }

    /// Apply one dictionary entry. Unknown keys are ignored; so are numbers
    /// that fail to parse, leaving the previous value.
    pub fn apply(&mut self, key: &str, value: &str) {
        let slot = match key {
            "_type" => {
                self.kind = MaterialType::from_vox_name(value);
                return;
            }
            "_plastic" => {
                self.plastic = !matches!(value.trim(), "" | "0" | "false");
                return;
            }
            "_weight" => &mut self.weight,
            "_rough" => &mut self.roughness,
            "_metal" => &mut self.metallic,
            "_spec" | "_sp" => &mut self.specular,
            "_ior" | "_ri" => &mut self.ior,
            "_att" => &mut self.attenuation,
            "_emit" => &mut self.emissive,
            "_flux" => &mut self.emission_power,
            "_ldr" => &mut self.ldr,
            "_trans" | "_alpha" => &mut self.transparency,
            _ => return,
        };

        match value.trim().parse::<f32>() {
            // Files store the refractive index minus one under `_ior`
            Ok(v) if key == "_ior" => *slot = v + 1.0,
            Ok(v) => *slot = v,
            Err(_) => warn!("Ignoring material key {}: {:?} is not a number", key, value),
        }
    }

    pub fn opacity(&self) -> f32 {
        1.0 - self.transparency
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Dictionary entries that reproduce this material through
    /// [`VoxMaterial::from_dict`].
    pub fn to_dict(&self) -> Vec<(String, String)> {
        let mut dict = vec![("_type".to_string(), self.kind.vox_name().to_string())];
        let scalars = [
            ("_weight", self.weight),
            ("_rough", self.roughness),
            ("_metal", self.metallic),
            ("_spec", self.specular),
            ("_ior", self.ior - 1.0),
            ("_att", self.attenuation),
            ("_emit", self.emissive),
            ("_flux", self.emission_power),
            ("_ldr", self.ldr),
            ("_trans", self.transparency),
        ];
        dict.extend(scalars.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        if self.plastic {
            dict.push(("_plastic".to_string(), "1".to_string()));
        }
        dict
    }
}

/// How a material instance blends with what is behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Opaque,
    Translucent,
}

/// Emissive parameters, present only for `Emit` materials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionParams {
    pub emission: f32,
    pub power: f32,
    /// Linear emission colour; `None` when the palette texture supplies it
    pub color: Option<[f32; 4]>,
}

/// Parameters for one material instance derived from a palette colour and
/// its material record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    /// Linear base colour; `None` when the palette texture is sampled
    pub base_color: Option<[f32; 4]>,
    pub roughness: f32,
    pub metallic: Option<f32>,
    pub opacity: Option<f32>,
    pub blend: BlendMode,
    pub emission: Option<EmissionParams>,
}

impl MaterialParams {
    pub fn from_material(color: Rgba, material: &VoxMaterial, textured: bool) -> Self {
        let linear = (!textured).then(|| color.to_linear());

        let mut params = Self {
            base_color: linear,
            roughness: material.roughness,
            metallic: None,
            opacity: None,
            blend: BlendMode::Opaque,
            emission: None,
        };

        match material.kind {
            MaterialType::Diffuse => {}
            MaterialType::Metal => params.metallic = Some(material.metallic),
            MaterialType::Glass => {
                params.opacity = Some(material.opacity());
                params.blend = BlendMode::Translucent;
            }
            MaterialType::Emit => {
                params.emission = Some(EmissionParams {
                    emission: material.emissive,
                    power: material.emission_power,
                    color: linear,
                })
            }
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let m = VoxMaterial::default();
        assert_eq!(m.kind, MaterialType::Diffuse);
        assert_eq!(m.roughness, 0.1);
        assert_eq!(m.ior, 1.3);
        assert_eq!(m.opacity(), 1.0);
        assert!(m.is_default());
    }

    #[test]
    fn test_glass_transparency() {
        let m = VoxMaterial::from_dict(&[("_type", "_glass"), ("_trans", "0.3")]);
        assert_eq!(m.kind, MaterialType::Glass);
        assert_eq!(m.transparency, 0.3);
        assert!((m.opacity() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_ior_offset_and_raw_ri() {
        let m = VoxMaterial::from_dict(&[("_ior", "0.5")]);
        assert_eq!(m.ior, 1.5);

        let m = VoxMaterial::from_dict(&[("_ri", "1.8")]);
        assert_eq!(m.ior, 1.8);

        // Later alias wins
        let m = VoxMaterial::from_dict(&[("_ri", "1.8"), ("_ior", "0.2")]);
        assert!((m.ior - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_aliases_later_wins() {
        let m = VoxMaterial::from_dict(&[("_spec", "0.2"), ("_sp", "0.6")]);
        assert_eq!(m.specular, 0.6);

        let m = VoxMaterial::from_dict(&[("_alpha", "0.9"), ("_trans", "0.4")]);
        assert_eq!(m.transparency, 0.4);
    }

    #[test]
    fn test_unknown_type_and_keys() {
        let m = VoxMaterial::from_dict(&[("_type", "_media"), ("_d", "0.1"), ("_g", "3")]);
        assert!(m.is_default());
    }

    #[test]
    fn test_unparseable_number_keeps_previous() {
        let m = VoxMaterial::from_dict(&[("_rough", "0.4"), ("_rough", "rough")]);
        assert_eq!(m.roughness, 0.4);
    }

    #[test]
    fn test_plastic() {
        assert!(VoxMaterial::from_dict(&[("_plastic", "1")]).plastic);
        assert!(!VoxMaterial::from_dict(&[("_plastic", "0")]).plastic);
        assert!(!VoxMaterial::from_dict(&[("_plastic", "")]).plastic);
    }

    #[test]
    fn test_to_dict_reproduces_material() {
        let m = VoxMaterial {
            kind: MaterialType::Emit,
            emissive: 0.8,
            emission_power: 3.0,
            ior: 1.45,
            plastic: true,
            ..Default::default()
        };
        assert_eq!(VoxMaterial::from_dict(&m.to_dict()).kind, MaterialType::Emit);
        let back = VoxMaterial::from_dict(&m.to_dict());
        assert_eq!(back.emissive, m.emissive);
        assert_eq!(back.emission_power, m.emission_power);
        assert!((back.ior - m.ior).abs() < 1e-6);
        assert!(back.plastic);
    }

    #[test]
    fn test_params_per_type() {
        let red = Rgba::opaque(255, 0, 0);

        let diffuse = MaterialParams::from_material(red, &VoxMaterial::default(), false);
        assert_eq!(diffuse.base_color, Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(diffuse.blend, BlendMode::Opaque);
        assert!(diffuse.metallic.is_none() && diffuse.emission.is_none());

        let glass = VoxMaterial::from_dict(&[("_type", "_glass"), ("_trans", "0.25")]);
        let params = MaterialParams::from_material(red, &glass, true);
        assert_eq!(params.base_color, None);
        assert_eq!(params.blend, BlendMode::Translucent);
        assert_eq!(params.opacity, Some(0.75));

        let metal = VoxMaterial::from_dict(&[("_type", "_metal"), ("_metal", "0.9")]);
        assert_eq!(
            MaterialParams::from_material(red, &metal, false).metallic,
            Some(0.9)
        );

        let emit = VoxMaterial::from_dict(&[("_type", "_emit"), ("_emit", "0.5"), ("_flux", "2")]);
        let emission = MaterialParams::from_material(red, &emit, false)
            .emission
            .unwrap();
        assert_eq!(emission.emission, 0.5);
        assert_eq!(emission.power, 2.0);
        assert_eq!(emission.color, Some([1.0, 0.0, 0.0, 1.0]));
    }
}
