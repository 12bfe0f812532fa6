/// Two-pole/two-zero IIR section coefficients
///
/// `a0` is normalized to 1 and not stored: `feedback` holds `[a1, a2]`,
/// `feedforward` holds `[b0, b1, b2]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    pub feedback: [f64; 2],
    pub feedforward: [f64; 3],
}

impl BiquadCoefficients {
    pub const fn new(feedback: [f64; 2], feedforward: [f64; 3]) -> Self {
        Self {
            feedback,
            feedforward,
        }
    }

    /// Coefficients that pass the input through unchanged
    pub const fn identity() -> Self {
        Self::new([0.0, 0.0], [1.0, 0.0, 0.0])
    }
}

/// Direct-form I biquad filter
///
/// Computes `y = b0·x + b1·x[n-1] + b2·x[n-2] - a1·y[n-1] - a2·y[n-2]`.
/// No allocation happens after construction.
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    coefficients: BiquadCoefficients,
    // Input history: x[n-1], x[n-2]
    x: [f64; 2],
    // Output history: y[n-1], y[n-2]
    y: [f64; 2],
}

impl BiquadFilter {
    pub fn new(coefficients: BiquadCoefficients) -> Self {
        Self {
            coefficients,
            x: [0.0; 2],
            y: [0.0; 2],
        }
    }

    /// Filter one sample
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let [b0, b1, b2] = self.coefficients.feedforward;
        let [a1, a2] = self.coefficients.feedback;

        let output = b0 * input + b1 * self.x[0] + b2 * self.x[1] - a1 * self.y[0] - a2 * self.y[1];

        self.x[1] = self.x[0];
        self.x[0] = input;
        self.y[1] = self.y[0];
        self.y[0] = output;

        output
    }

    /// Replace the coefficients, keeping the delay state
    pub fn set_coefficients(&mut self, coefficients: BiquadCoefficients) {
        self.coefficients = coefficients;
    }

    pub fn coefficients(&self) -> BiquadCoefficients {
        self.coefficients
    }

    /// Zero the input and output history
    pub fn reset(&mut self) {
        self.x = [0.0; 2];
        self.y = [0.0; 2];
    }
}
