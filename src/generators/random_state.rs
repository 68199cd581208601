//! Seeded random stream compatible with numpy's legacy `RandomState`.
//!
//! Fixture files are compared against values produced by the numpy legacy
//! sampler, so the sampling algorithms here follow it draw for draw: MT19937
//! seeded with `init_genrand`, 53-bit doubles from two words, the polar
//! Box–Muller method with one cached deviate, inversion for small binomials
//! and Marsaglia–Tsang for gamma.

use rand_mt::Mt;

/// A random stream bound to one explicit seed
pub struct RandomState {
    mt: Mt,
    cached_gauss: Option<f64>,
}

impl RandomState {
    pub fn new(seed: u32) -> Self {
        Self {
            mt: Mt::new(seed),
            cached_gauss: None,
        }
    }

    /// Uniform double in `[0, 1)` with 53 bits of precision
    pub fn next_double(&mut self) -> f64 {
        let a = (self.mt.next_u32() >> 5) as f64;
        let b = (self.mt.next_u32() >> 6) as f64;
        (a * 67_108_864.0 + b) / 9_007_199_254_740_992.0
    }

    /// Standard normal deviate; every other call returns the cached partner
    pub fn gauss(&mut self) -> f64 {
        if let Some(value) = self.cached_gauss.take() {
            return value;
        }
        let (x1, x2, r2) = loop {
            let x1 = 2.0 * self.next_double() - 1.0;
            let x2 = 2.0 * self.next_double() - 1.0;
            let r2 = x1 * x1 + x2 * x2;
            if r2 < 1.0 && r2 != 0.0 {
                break (x1, x2, r2);
            }
        };
        let f = (-2.0 * r2.ln() / r2).sqrt();
        self.cached_gauss = Some(f * x1);
        f * x2
    }

    pub fn normal(&mut self, loc: f64, scale: f64) -> f64 {
        loc + scale * self.gauss()
    }

    pub fn standard_exponential(&mut self) -> f64 {
        -(1.0 - self.next_double()).ln()
    }

    pub fn standard_gamma(&mut self, shape: f64) -> f64 {
        if shape == 1.0 {
            return self.standard_exponential();
        }
        if shape == 0.0 {
            return 0.0;
        }
        if shape < 1.0 {
            loop {
                let u = self.next_double();
                let v = self.standard_exponential();
                if u <= 1.0 - shape {
                    let x = u.powf(1.0 / shape);
                    if x <= v {
                        return x;
                    }
                } else {
                    let y = -((1.0 - u) / shape).ln();
                    let x = (1.0 - shape + shape * y).powf(1.0 / shape);
                    if x <= v + y {
                        return x;
                    }
                }
            }
        }

        let b = shape - 1.0 / 3.0;
        let c = 1.0 / (9.0 * b).sqrt();
        loop {
            let (x, mut v) = loop {
                let x = self.gauss();
                let v = 1.0 + c * x;
                if v > 0.0 {
                    break (x, v);
                }
            };
            v = v * v * v;
            let u = self.next_double();
            if u < 1.0 - 0.0331 * (x * x) * (x * x) {
                return b * v;
            }
            if u.ln() < 0.5 * x * x + b * (1.0 - v + v.ln()) {
                return b * v;
            }
        }
    }

    pub fn chisquare(&mut self, df: f64) -> f64 {
        2.0 * self.standard_gamma(df / 2.0)
    }

    /// Binomial draw by inversion.
    ///
    /// Only the small-mean regime (`n * min(p, 1-p) <= 30`) is sampled this
    /// way; it covers every binomial the kernels request.
    pub fn binomial(&mut self, n: u32, p: f64) -> u32 {
        if p > 0.5 {
            return n - self.binomial_inversion(n, 1.0 - p);
        }
        self.binomial_inversion(n, p)
    }

    fn binomial_inversion(&mut self, n: u32, p: f64) -> u32 {
        let nf = n as f64;
        let q = 1.0 - p;
        let qn = (nf * q.ln()).exp();
        let np = nf * p;
        let bound = nf.min(np + 10.0 * (np * q + 1.0).sqrt());

        let mut x: u32 = 0;
        let mut px = qn;
        let mut u = self.next_double();
        while u > px {
            x += 1;
            if x as f64 > bound {
                x = 0;
                px = qn;
                u = self.next_double();
            } else {
                u -= px;
                px = ((nf - x as f64 + 1.0) * p * px) / (x as f64 * q);
            }
        }
        x
    }
}
