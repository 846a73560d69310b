use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Reflections of a cubic phase: (2θ, sigma, height).
const REFLECTIONS: &[(f64, f64, f64)] = &[
    (28.44, 0.08, 1000.0),
    (47.30, 0.10, 620.0),
    (56.12, 0.11, 380.0),
    (69.13, 0.13, 95.0),
    (76.38, 0.14, 140.0),
];

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_scan.asr".to_string());
    let mut rng = SimpleRng::new(42);

    // 2θ from 10° to 90°, step 0.02°
    let n = 4001;
    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# synthetic XRD scan, Cu Kα")?;
    writeln!(out, "# 2theta  intensity")?;
    for i in 0..n {
        let two_theta = 10.0 + i as f64 * 0.02;
        // Sloped, slightly curved background
        let background = 60.0 - 0.35 * two_theta + 0.002 * two_theta * two_theta;
        let signal: f64 = REFLECTIONS
            .iter()
            .map(|&(mu, sigma, amp)| gaussian(two_theta, mu, sigma, amp))
            .sum();
        let counts = (background + signal + rng.gauss(0.0, 3.0)).max(0.0);
        writeln!(out, "{two_theta:.2} {counts:.1}")?;
    }
    out.flush().context("flushing scan file")?;

    log::info!("wrote {n} points to {output_path}");
    println!("Wrote {n} points to {output_path}");
    Ok(())
}
