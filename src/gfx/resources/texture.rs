//! CPU-side RGBA textures and the procedural grass pattern

use rand::Rng;

use super::AssetId;

/// RGBA8 pixel data plus its tiling
#[derive(Clone)]
pub struct Texture {
    pub id: AssetId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// UV repeat count, applied with repeat wrapping
    pub repeat: f32,
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("repeat", &self.repeat)
            .finish()
    }
}

impl Texture {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Grass pattern parameters
pub struct GrassPattern {
    pub size: u32,
    pub base: u32,
    pub spot: u32,
    pub spots: usize,
}

impl Default for GrassPattern {
    fn default() -> Self {
        Self {
            size: 100,
            base: 0x4A904A,
            spot: 0x6AB46A,
            spots: 20,
        }
    }
}

impl GrassPattern {
    /// Paints the base color and `spots` lighter discs of radius 1..4
    pub fn paint(&self, rng: &mut impl Rng) -> Vec<u8> {
        let size = self.size as usize;
        let mut pixels = Vec::with_capacity(size * size * 4);
        let base = rgba_bytes(self.base);
        for _ in 0..size * size {
            pixels.extend_from_slice(&base);
        }

        let spot = rgba_bytes(self.spot);
        let extent = self.size as f32;
        for _ in 0..self.spots {
            let cx = rng.random::<f32>() * extent;
            let cy = rng.random::<f32>() * extent;
            let radius = rng.random::<f32>() * 3.0 + 1.0;

            let x0 = (cx - radius).floor().max(0.0) as usize;
            let x1 = ((cx + radius).ceil() as usize).min(size);
            let y0 = (cy - radius).floor().max(0.0) as usize;
            let y1 = ((cy + radius).ceil() as usize).min(size);
            for y in y0..y1 {
                for x in x0..x1 {
                    let dx = x as f32 + 0.5 - cx;
                    let dy = y as f32 + 0.5 - cy;
                    if dx * dx + dy * dy <= radius * radius {
                        let i = (y * size + x) * 4;
                        pixels[i..i + 4].copy_from_slice(&spot);
                    }
                }
            }
        }

        pixels
    }
}

fn rgba_bytes(hex: u32) -> [u8; 4] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 0xFF]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_grass_has_base_and_spots() {
        let pattern = GrassPattern::default();
        let pixels = pattern.paint(&mut StdRng::seed_from_u64(7));
        assert_eq!(pixels.len(), 100 * 100 * 4);

        let spots = pixels
            .chunks_exact(4)
            .filter(|p| *p == [0x6A, 0xB4, 0x6A, 0xFF])
            .count();
        let base = pixels
            .chunks_exact(4)
            .filter(|p| *p == [0x4A, 0x90, 0x4A, 0xFF])
            .count();
        assert!(spots > 0);
        assert_eq!(spots + base, 100 * 100);
    }

    #[test]
    fn test_same_seed_same_pattern() {
        let pattern = GrassPattern::default();
        let a = pattern.paint(&mut StdRng::seed_from_u64(1));
        let b = pattern.paint(&mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }
}
