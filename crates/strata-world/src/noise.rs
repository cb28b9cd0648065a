use fastnoise_lite::{FastNoiseLite, NoiseType};
use serde::Deserialize;

/// Coordinate offset per unit of seed. The product is wrapped so large
/// seeds stay within f32 precision once converted for sampling.
const SEED_OFFSET: i64 = 5000;
const SEED_OFFSET_WRAP: i64 = 8192;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseParams {
    pub seed: i32,
    pub scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    /// Terrace threshold; `None` disables banding.
    pub banding: Option<f32>,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 24,
            scale: 44.32,
            octaves: 4,
            persistence: 0.3,
            lacunarity: 2.0,
            banding: None,
        }
    }
}

/// Row-major `width * height` grid of samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f32>,
}

impl Heightfield {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    pub fn min_max(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

/// Fractal Perlin sampler for one parameter set.
pub struct NoiseGenerator {
    noise: FastNoiseLite,
    params: NoiseParams,
    offset: f64,
}

impl NoiseGenerator {
    pub fn new(params: NoiseParams) -> Self {
        let mut noise = FastNoiseLite::with_seed(params.seed);
        noise.set_noise_type(Some(NoiseType::Perlin));
        noise.set_frequency(Some(1.0));
        let offset = (i64::from(params.seed) * SEED_OFFSET).rem_euclid(SEED_OFFSET_WRAP) as f64;
        Self {
            noise,
            params,
            offset,
        }
    }

    #[inline]
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    /// Samples a `width * height` field whose cell (0,0) sits at `origin`.
    pub fn sample(&self, width: usize, height: usize, origin: (f64, f64)) -> Heightfield {
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(self.sample_at(origin.0 + x as f64, origin.1 + y as f64));
            }
        }
        Heightfield {
            width,
            height,
            values,
        }
    }

    /// One fractal sample. Roughly `[0, sum of amplitudes]`, or `[0, 1]`
    /// with banding on.
    pub fn sample_at(&self, x: f64, y: f64) -> f32 {
        let p = &self.params;
        let scale = if p.scale <= 0.0 { 1e-4 } else { f64::from(p.scale) };
        let mut amplitude = 1.0f32;
        let mut frequency = 1.0f64;
        let mut total = 0.0f32;
        for _ in 0..p.octaves {
            let sx = x / scale * frequency + self.offset;
            let sy = y / scale * frequency + self.offset;
            let v = self.noise.get_noise_2d(sx as f32, sy as f32) * 0.5 + 0.5;
            total += v * amplitude;
            amplitude *= p.persistence;
            frequency *= f64::from(p.lacunarity);
        }
        match p.banding {
            Some(t) => smoothstep(remap(total - t, -t, 1.0 - t, 0.0, 1.0).clamp(0.0, 1.0)),
            None => total,
        }
    }
}

/// Global extent of a reference sample, shared by every chunk so that
/// per-chunk normalization never produces seams.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseRange {
    pub min: f32,
    pub max: f32,
}

impl Default for NoiseRange {
    fn default() -> Self {
        Self {
            min: f32::MAX,
            max: f32::MIN,
        }
    }
}

impl NoiseRange {
    pub fn observe(&mut self, field: &Heightfield) {
        let (lo, hi) = field.min_max();
        self.min = self.min.min(lo);
        self.max = self.max.max(hi);
    }

    /// Maps `v` into `[0, 1]` with the observed maximum at 0 and the
    /// minimum at 1, so noise peaks become the lowest terrain. Values
    /// outside the observed range clamp.
    pub fn normalize(&self, v: f32) -> f32 {
        if self.max <= self.min {
            return 0.0;
        }
        remap(v, self.max, self.min, 0.0, 1.0).clamp(0.0, 1.0)
    }
}

#[inline]
pub fn remap(v: f32, from_lo: f32, from_hi: f32, to_lo: f32, to_hi: f32) -> f32 {
    (v - from_lo) / (from_hi - from_lo) * (to_hi - to_lo) + to_lo
}

#[inline]
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}
