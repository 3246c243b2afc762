//! Periodized multilevel discrete wavelet transform.
//!
//! Analysis circularly convolves the signal with an orthogonal Daubechies
//! filter pair and downsamples by two; synthesis applies the exact transpose.
//! For even input lengths the filter bank is an orthogonal matrix, so
//! reconstruction is exact. Odd lengths are extended by repeating the last
//! sample before filtering, which makes the final reconstruction one sample
//! longer than the input; callers truncate or pad as needed.

use std::fmt;
use std::str::FromStr;

/// Supported orthogonal wavelet families.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wavelet {
    Haar,
    Db2,
    Db4,
    Db8,
}

// Daubechies lowpass decomposition taps.
const HAAR_LO: [f64; 2] = [0.7071067811865476, 0.7071067811865476];

const DB2_LO: [f64; 4] = [
    0.4829629131445341,
    0.8365163037378079,
    0.2241438680420134,
    -0.1294095225512604,
];

const DB4_LO: [f64; 8] = [
    0.2303778133088965,
    0.7148465705529156,
    0.6308807679298589,
    -0.0279837694168599,
    -0.1870348117190930,
    0.0308413818355607,
    0.0328830116668852,
    -0.0105974017850690,
];

const DB8_LO: [f64; 16] = [
    0.0544158422431049,
    0.3128715909143031,
    0.6756307362972904,
    0.5853546836541907,
    -0.0158291052563816,
    -0.2840155429615702,
    0.0004724845739124,
    0.1287474266204837,
    -0.0173693010018083,
    -0.0440882539307952,
    0.0139810279173995,
    0.0087460940474061,
    -0.0048703529934518,
    -0.0003917403733770,
    0.0006754494064506,
    -0.0001174767841248,
];

impl Wavelet {
    pub fn name(&self) -> &'static str {
        match self {
            Wavelet::Haar => "haar",
            Wavelet::Db2 => "db2",
            Wavelet::Db4 => "db4",
            Wavelet::Db8 => "db8",
        }
    }

    /// Lowpass decomposition filter.
    fn lowpass(&self) -> &'static [f64] {
        match self {
            Wavelet::Haar => &HAAR_LO,
            Wavelet::Db2 => &DB2_LO,
            Wavelet::Db4 => &DB4_LO,
            Wavelet::Db8 => &DB8_LO,
        }
    }

    /// Highpass decomposition filter, derived from the lowpass taps by the
    /// quadrature mirror construction (reverse and alternate signs).
    fn highpass(&self) -> Vec<f64> {
        self.lowpass()
            .iter()
            .enumerate()
            .map(|(i, &x)| if i % 2 == 0 { -x } else { x })
            .rev()
            .collect()
    }

    pub fn filter_len(&self) -> usize {
        self.lowpass().len()
    }

    /// Deepest decomposition level at which coefficients still span the
    /// filter support: `floor(log2(len / (filter_len - 1)))`.
    pub fn max_level(&self, len: usize) -> usize {
        let denom = self.filter_len() - 1;
        if len < denom {
            return 0;
        }
        let ratio = len as f64 / denom as f64;
        if ratio < 2.0 {
            0
        } else {
            ratio.log2().floor() as usize
        }
    }

    /// Decompose `signal` into `level` levels of detail coefficients plus a
    /// coarsest approximation. Stops early (with fewer levels) once the
    /// running approximation can no longer be halved.
    ///
    /// Coefficient lengths depend only on the input length and the requested
    /// level, never on sample values: each analysis step maps a length `n`
    /// band to `ceil(n / 2)`.
    pub fn decompose(&self, signal: &[f64], level: usize) -> WaveletDecomposition {
        let mut approx = signal.to_vec();
        let mut details = Vec::with_capacity(level);
        for _ in 0..level {
            if approx.len() < 2 {
                break;
            }
            let (a, d) = self.analyze(&approx);
            details.push(d);
            approx = a;
        }
        WaveletDecomposition { approx, details }
    }

    /// Invert [`Wavelet::decompose`]. For an even original length the result
    /// matches the input exactly; an odd original length comes back one
    /// sample long.
    pub fn reconstruct(&self, decomp: &WaveletDecomposition) -> Vec<f64> {
        let mut approx = decomp.approx.clone();
        for detail in decomp.details.iter().rev() {
            // An odd-length band was extended before analysis; drop the
            // surplus sample so the bands line up again.
            if approx.len() == detail.len() + 1 {
                approx.pop();
            }
            approx = self.synthesize(&approx, detail);
        }
        approx
    }

    /// One analysis step: periodic convolution with both filters, then
    /// downsampling by two. Odd inputs are extended by their last sample.
    fn analyze(&self, signal: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let padded;
        let x = if signal.len() % 2 == 1 {
            let mut v = signal.to_vec();
            v.push(signal[signal.len() - 1]);
            padded = v;
            &padded[..]
        } else {
            signal
        };

        let lo = self.lowpass();
        let hi = self.highpass();
        let n = x.len();
        let half = n / 2;
        let mut approx = Vec::with_capacity(half);
        let mut detail = Vec::with_capacity(half);
        for k in 0..half {
            let mut a = 0.0;
            let mut d = 0.0;
            for j in 0..lo.len() {
                let idx = (2 * k + j) % n;
                a += lo[j] * x[idx];
                d += hi[j] * x[idx];
            }
            approx.push(a);
            detail.push(d);
        }
        (approx, detail)
    }

    /// One synthesis step: the transpose of [`Wavelet::analyze`]. Scatters
    /// each coefficient back through the filters with periodic wrapping.
    fn synthesize(&self, approx: &[f64], detail: &[f64]) -> Vec<f64> {
        assert_eq!(
            approx.len(),
            detail.len(),
            "approximation and detail bands must have equal length"
        );
        let lo = self.lowpass();
        let hi = self.highpass();
        let n = approx.len() * 2;
        let mut out = vec![0.0; n];
        for k in 0..approx.len() {
            for j in 0..lo.len() {
                let idx = (2 * k + j) % n;
                out[idx] += approx[k] * lo[j] + detail[k] * hi[j];
            }
        }
        out
    }
}

impl fmt::Display for Wavelet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Wavelet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "haar" | "db1" => Ok(Wavelet::Haar),
            "db2" => Ok(Wavelet::Db2),
            "db4" => Ok(Wavelet::Db4),
            "db8" => Ok(Wavelet::Db8),
            other => Err(format!("unknown wavelet: {}", other)),
        }
    }
}

/// Result of a multilevel decomposition.
///
/// `details[0]` is the finest level (level 1); `details.last()` pairs with
/// `approx` at the coarsest scale.
#[derive(Clone, Debug)]
pub struct WaveletDecomposition {
    pub approx: Vec<f64>,
    pub details: Vec<Vec<f64>>,
}

impl WaveletDecomposition {
    /// Number of decomposition levels actually applied.
    pub fn levels(&self) -> usize {
        self.details.len()
    }
}
