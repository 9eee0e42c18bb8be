//! # Coherent Noise
//!
//! Seeded, deterministic noise sampling for terrain generation.
//!
//! Three base kinds share one permutation table:
//!
//! - **Simplex**: fewest directional artifacts
//! - **Perlin**: classic gradient noise on a square lattice
//! - **Value**: smoothed lattice values, blockier hills
//!
//! and are combined across octaves by a [`FractalKind`].
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed` and [`NoiseSettings`], a sampler produces
//! **exactly** the same value for the same coordinate on any platform, any
//! time. There is no global state: every sampler owns its table.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., cavern noise).
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        // FNV-1a style mixing
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(1234)
    }
}

/// Base noise function sampled at each octave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// 2D simplex noise.
    Simplex,
    /// 2D gradient (Perlin) noise.
    #[default]
    Perlin,
    /// 2D value noise.
    Value,
}

/// How octaves are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractalKind {
    /// A single octave at the base frequency.
    None,
    /// Fractional Brownian motion: octaves summed with decaying amplitude.
    #[default]
    Fbm,
    /// Ridged multifractal, remapped to [-1, 1].
    Ridged,
}

/// Parameters of a coherent noise sampler.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Base noise function.
    pub kind: NoiseKind,
    /// Coordinate scale applied before sampling.
    pub frequency: f64,
    /// Octave combination.
    pub fractal: FractalKind,
    /// Number of octaves (ignored by `FractalKind::None`).
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Amplitude multiplier per octave.
    pub gain: f64,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Perlin,
            frequency: 0.03,
            fractal: FractalKind::Fbm,
            octaves: 3,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

impl NoiseSettings {
    /// Returns these settings with a different frequency.
    #[must_use]
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    /// Returns these settings with a different base kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: NoiseKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns these settings with a different fractal combination.
    #[must_use]
    pub const fn with_fractal(mut self, fractal: FractalKind) -> Self {
        self.fractal = fractal;
        self
    }

    /// Checks that the sampler parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] under `name` for a
    /// non-positive frequency or lacunarity, zero octaves, or a negative gain.
    pub fn validate(&self, name: &'static str) -> ConfigResult<()> {
        let reason = if !(self.frequency.is_finite() && self.frequency > 0.0) {
            format!("frequency {} must be positive", self.frequency)
        } else if self.octaves == 0 {
            "octaves must be at least 1".to_owned()
        } else if !(self.lacunarity.is_finite() && self.lacunarity > 0.0) {
            format!("lacunarity {} must be positive", self.lacunarity)
        } else if !(self.gain.is_finite() && self.gain >= 0.0) {
            format!("gain {} must be non-negative", self.gain)
        } else {
            return Ok(());
        };
        Err(ConfigError::InvalidSetting { name, reason })
    }
}

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
#[derive(Clone)]
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
    /// Gradient table (12 gradients for 2D).
    grad: [[i8; 2]; 12],
}

impl PermutationTable {
    /// Creates a new permutation table from a seed.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; 512];

        // Identity permutation
        for (i, slot) in perm.iter_mut().take(256).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle driven by xorshift64
        let mut rng_state = seed.value();
        for i in (1..256).rev() {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;

            let j = (rng_state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        // Double the table to avoid index wrapping
        for i in 0..256 {
            perm[256 + i] = perm[i];
        }

        let grad = [
            [1, 0], [1, 1], [0, 1], [-1, 1],
            [-1, 0], [-1, -1], [0, -1], [1, -1],
            [1, 0], [0, 1], [-1, 0], [0, -1],
        ];

        Self { perm, grad }
    }

    #[inline]
    fn get(&self, index: usize) -> u8 {
        self.perm[index & 511]
    }

    #[inline]
    fn gradient(&self, hash: u8) -> [i8; 2] {
        self.grad[(hash % 12) as usize]
    }

    /// Hashes a lattice point.
    #[inline]
    fn hash(&self, ii: usize, jj: usize) -> u8 {
        self.get(ii + self.get(jj) as usize)
    }
}

/// Seeded multi-octave coherent noise sampler.
///
/// Produces smooth, continuous values in the range [-1, 1].
///
/// # Example
///
/// ```rust
/// use emberdeep_procedural::noise::{CoherentNoise, NoiseSettings, WorldSeed};
///
/// let noise = CoherentNoise::new(WorldSeed::new(42), NoiseSettings::default());
/// let value = noise.sample(100.0, 0.0);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Clone)]
pub struct CoherentNoise {
    perm_table: PermutationTable,
    settings: NoiseSettings,
}

impl std::fmt::Debug for CoherentNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoherentNoise")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CoherentNoise {
    /// Skewing factor for 2D simplex grid.
    const F2: f64 = 0.366_025_403_784_439; // (sqrt(3) - 1) / 2
    /// Unskewing factor for 2D simplex grid.
    const G2: f64 = 0.211_324_865_405_187; // (3 - sqrt(3)) / 6

    /// Creates a sampler from a seed and settings.
    #[must_use]
    pub fn new(seed: WorldSeed, settings: NoiseSettings) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
            settings,
        }
    }

    /// Returns the sampler settings.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    /// Samples fractal noise at world coordinates.
    ///
    /// The frequency is applied here, so callers pass raw cell coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let sx = x * self.settings.frequency;
        let sy = y * self.settings.frequency;

        let value = match self.settings.fractal {
            FractalKind::None => self.base(sx, sy),
            FractalKind::Fbm => self.fbm(sx, sy),
            FractalKind::Ridged => self.ridged(sx, sy) * 2.0 - 1.0,
        };

        value.clamp(-1.0, 1.0)
    }

    /// Samples the configured base kind with no fractal layering.
    #[must_use]
    pub fn base(&self, x: f64, y: f64) -> f64 {
        match self.settings.kind {
            NoiseKind::Simplex => self.simplex(x, y),
            NoiseKind::Perlin => self.perlin(x, y),
            NoiseKind::Value => self.value(x, y),
        }
    }

    /// Octaves summed with decaying amplitude, normalized to [-1, 1].
    fn fbm(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..self.settings.octaves.max(1) {
            total += self.base(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.settings.gain;
            frequency *= self.settings.lacunarity;
        }

        total / max_amplitude
    }

    /// Sharp ridges from `1 - |noise|`, in [0, 1].
    fn ridged(&self, x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..self.settings.octaves.max(1) {
            let ridge = 1.0 - self.base(x * frequency, y * frequency).abs();
            total += ridge * ridge * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.settings.gain;
            frequency *= self.settings.lacunarity;
        }

        total / max_amplitude
    }

    /// 2D simplex noise.
    fn simplex(&self, x: f64, y: f64) -> f64 {
        // Skew input coordinates to simplex grid
        let skew = (x + y) * Self::F2;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);

        // Unskew to get first corner in simplex
        let (corner_x, corner_y) = (i as f64, j as f64);
        let unskew = (corner_x + corner_y) * Self::G2;
        let x0 = x - (corner_x - unskew);
        let y0 = y - (corner_y - unskew);

        // Upper or lower triangle
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + Self::G2;
        let y1 = y0 - j1 as f64 + Self::G2;
        let x2 = x0 - 1.0 + 2.0 * Self::G2;
        let y2 = y0 - 1.0 + 2.0 * Self::G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;

        let gi0 = self.perm_table.hash(ii, jj);
        let gi1 = self.perm_table.hash(ii + i1, jj + j1);
        let gi2 = self.perm_table.hash(ii + 1, jj + 1);

        let n0 = self.contribution(x0, y0, gi0);
        let n1 = self.contribution(x1, y1, gi1);
        let n2 = self.contribution(x2, y2, gi2);

        // 70.0 normalizes the output to [-1, 1]
        70.0 * (n0 + n1 + n2)
    }

    /// Contribution from one corner of the simplex.
    #[inline]
    fn contribution(&self, x: f64, y: f64, gradient_index: u8) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            0.0
        } else {
            let t2 = t * t;
            t2 * t2 * self.dot(gradient_index, x, y)
        }
    }

    /// 2D gradient noise on the square lattice.
    fn perlin(&self, x: f64, y: f64) -> f64 {
        let i = fast_floor(x);
        let j = fast_floor(y);
        let xf = x - i as f64;
        let yf = y - j as f64;
        let u = fade(xf);
        let v = fade(yf);

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;

        let n00 = self.dot(self.perm_table.hash(ii, jj), xf, yf);
        let n10 = self.dot(self.perm_table.hash(ii + 1, jj), xf - 1.0, yf);
        let n01 = self.dot(self.perm_table.hash(ii, jj + 1), xf, yf - 1.0);
        let n11 = self.dot(self.perm_table.hash(ii + 1, jj + 1), xf - 1.0, yf - 1.0);

        lerp(lerp(n00, n10, u), lerp(n01, n11, u), v)
    }

    /// Smoothed lattice values.
    fn value(&self, x: f64, y: f64) -> f64 {
        let i = fast_floor(x);
        let j = fast_floor(y);
        let u = fade(x - i as f64);
        let v = fade(y - j as f64);

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;

        let lattice = |a: usize, b: usize| f64::from(self.perm_table.hash(a, b)) / 127.5 - 1.0;

        lerp(
            lerp(lattice(ii, jj), lattice(ii + 1, jj), u),
            lerp(lattice(ii, jj + 1), lattice(ii + 1, jj + 1), u),
            v,
        )
    }

    #[inline]
    fn dot(&self, hash: u8, x: f64, y: f64) -> f64 {
        let grad = self.perm_table.gradient(hash);
        x * f64::from(grad[0]) + y * f64::from(grad[1])
    }
}

/// Fast floor function.
///
/// Faster than `f64::floor()` for our use case. Wide enough for lattice
/// coordinates of any chunk a walk can reach.
#[inline]
fn fast_floor(x: f64) -> i64 {
    let xi = x as i64;
    if x < xi as f64 { xi - 1 } else { xi }
}

/// Quintic smoothstep `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kinds() -> [NoiseKind; 3] {
        [NoiseKind::Simplex, NoiseKind::Perlin, NoiseKind::Value]
    }

    #[test]
    fn test_determinism() {
        for kind in all_kinds() {
            let settings = NoiseSettings::default().with_kind(kind);
            let noise1 = CoherentNoise::new(WorldSeed::new(12345), settings);
            let noise2 = CoherentNoise::new(WorldSeed::new(12345), settings);

            for i in 0..100 {
                let x = f64::from(i) * 1.7;
                let y = f64::from(i) * 0.3;
                assert_eq!(
                    noise1.sample(x, y).to_bits(),
                    noise2.sample(x, y).to_bits(),
                    "{kind:?} noise should be deterministic"
                );
            }
        }
    }

    #[test]
    fn test_different_seeds_different_results() {
        let settings = NoiseSettings::default().with_frequency(0.1);
        let noise1 = CoherentNoise::new(WorldSeed::new(1), settings);
        let noise2 = CoherentNoise::new(WorldSeed::new(2), settings);

        let differs = (0..64).any(|i| {
            let x = f64::from(i) * 3.3;
            noise1.sample(x, 7.0) != noise2.sample(x, 7.0)
        });

        assert!(differs, "Different seeds should produce different results");
    }

    #[test]
    fn test_range() {
        for kind in all_kinds() {
            for fractal in [FractalKind::None, FractalKind::Fbm, FractalKind::Ridged] {
                let settings = NoiseSettings::default()
                    .with_kind(kind)
                    .with_fractal(fractal)
                    .with_frequency(0.07);
                let noise = CoherentNoise::new(WorldSeed::new(42), settings);

                for i in 0..5000 {
                    let x = f64::from(i) * 0.9 - 2000.0;
                    let y = f64::from(i % 97) * 1.3;
                    let value = noise.sample(x, y);
                    assert!(
                        (-1.0..=1.0).contains(&value),
                        "{kind:?}/{fractal:?} value {value} out of range at ({x}, {y})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_continuity() {
        for kind in all_kinds() {
            let settings = NoiseSettings::default().with_kind(kind).with_frequency(1.0);
            let noise = CoherentNoise::new(WorldSeed::new(42), settings);

            let v1 = noise.sample(100.3, 100.6);
            let v2 = noise.sample(100.301, 100.6);
            let v3 = noise.sample(100.3, 100.601);

            assert!((v1 - v2).abs() < 0.05, "{kind:?} should be continuous in x");
            assert!((v1 - v3).abs() < 0.05, "{kind:?} should be continuous in y");
        }
    }

    #[test]
    fn test_lattice_points_are_zero_for_gradient_noise() {
        let settings = NoiseSettings::default()
            .with_fractal(FractalKind::None)
            .with_frequency(1.0);
        let noise = CoherentNoise::new(WorldSeed::new(7), settings);

        for x in -10..10 {
            assert_eq!(noise.sample(f64::from(x), 3.0), 0.0);
        }
    }

    #[test]
    fn test_negative_coordinates_sample_cleanly() {
        let noise = CoherentNoise::new(WorldSeed::new(99), NoiseSettings::default());
        for x in -300..0 {
            let value = noise.sample(f64::from(x), 0.0);
            assert!(value.is_finite());
        }
    }

    #[test]
    fn test_far_coordinates_keep_their_shape() {
        for kind in all_kinds() {
            let noise = CoherentNoise::new(WorldSeed::new(99), NoiseSettings::default().with_kind(kind));
            let values: Vec<f64> = (0..64).map(|k| noise.sample(1e11 + f64::from(k), 0.0)).collect();

            assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)), "{kind:?} out of range");
            assert!(
                values.iter().any(|v| (v - values[0]).abs() > 1e-6),
                "{kind:?} flat at x = 1e11: {values:?}"
            );
        }

        // Simplex lattice sums past the 32-bit range.
        let simplex = CoherentNoise::new(
            WorldSeed::new(99),
            NoiseSettings::default().with_kind(NoiseKind::Simplex).with_frequency(1.0),
        );
        assert!(simplex.sample(3e12, 3e12).is_finite());
        assert!(simplex.sample(-3e12, 1e12).is_finite());
    }

    #[test]
    fn test_seed_derivation() {
        let base = WorldSeed::new(42);
        let derived1 = base.derive(1);
        let derived2 = base.derive(2);
        let derived1_again = base.derive(1);

        assert_ne!(derived1, derived2, "Different purposes should give different seeds");
        assert_eq!(derived1, derived1_again, "Same purpose should give same seed");
        assert_ne!(derived1, base, "Derived seed should differ from base");
    }

    #[test]
    fn test_settings_from_toml() {
        let settings: NoiseSettings = toml::from_str(
            r#"
            kind = "simplex"
            fractal = "ridged"
            octaves = 5
            "#,
        )
        .unwrap();

        assert_eq!(settings.kind, NoiseKind::Simplex);
        assert_eq!(settings.fractal, FractalKind::Ridged);
        assert_eq!(settings.octaves, 5);
        assert_eq!(settings.frequency, 0.03);
    }

    #[test]
    fn test_settings_validation() {
        assert!(NoiseSettings::default().validate("noise").is_ok());

        let zero_octaves = NoiseSettings { octaves: 0, ..Default::default() };
        assert!(matches!(
            zero_octaves.validate("noise"),
            Err(ConfigError::InvalidSetting { name: "noise", .. })
        ));
        assert!(NoiseSettings::default().with_frequency(0.0).validate("noise").is_err());
        assert!(NoiseSettings { gain: -0.1, ..Default::default() }.validate("noise").is_err());
    }
}
