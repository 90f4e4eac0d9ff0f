use serde::{Deserialize, Serialize};

/// How a geometry is drawn. Geometries with equal [`StyleKey`]s share a
/// bucket and are drawn together.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke_color: [f32; 4],
    pub fill_color: [f32; 4],
    pub fill: bool,
    pub stroke_width: f32,
    #[serde(default)]
    pub texture: Option<u32>,
}

impl Style {
    pub const fn stroke(color: [f32; 4], width: f32) -> Self {
        Self {
            stroke_color: color,
            fill_color: [0.0, 0.0, 0.0, 0.0],
            fill: false,
            stroke_width: width,
            texture: None,
        }
    }

    pub const fn filled(mut self, color: [f32; 4]) -> Self {
        self.fill_color = color;
        self.fill = true;
        self
    }

    pub const fn with_texture(mut self, texture: u32) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn key(&self) -> StyleKey {
        StyleKey {
            stroke_color: self.stroke_color.map(f32::to_bits),
            fill_color: self.fill_color.map(f32::to_bits),
            fill: self.fill,
            stroke_width: self.stroke_width.to_bits(),
            texture: self.texture,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::stroke([1.0, 1.0, 1.0, 1.0], 1.0)
    }
}

/// Hashable fingerprint of a [`Style`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyleKey {
    stroke_color: [u32; 4],
    fill_color: [u32; 4],
    fill: bool,
    stroke_width: u32,
    texture: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::Style;

    #[test]
    fn keys_follow_visual_fields() {
        let red = Style::stroke([1.0, 0.0, 0.0, 1.0], 2.0);
        assert_eq!(red.key(), Style::stroke([1.0, 0.0, 0.0, 1.0], 2.0).key());
        assert_ne!(red.key(), Style::stroke([1.0, 0.0, 0.0, 1.0], 3.0).key());
        assert_ne!(red.key(), red.filled([0.0, 0.0, 1.0, 0.5]).key());
        assert_ne!(red.key(), red.with_texture(7).key());
    }
}
