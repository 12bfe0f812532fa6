/// Direct-form FIR filter over a circular delay line
///
/// One instance runs one phase of a polyphase interpolator: the true-peak
/// stage feeds the same sample to every phase and each phase yields one
/// oversampled output.
#[derive(Debug, Clone)]
pub struct PolyphaseFirFilter {
    coefficients: Vec<f64>,
    delay_line: Vec<f64>,
    // Slot the next input is written to
    index: usize,
}

impl PolyphaseFirFilter {
    /// Create a filter whose delay line matches the coefficient count
    pub fn new(coefficients: &[f64]) -> Self {
        Self {
            coefficients: coefficients.to_vec(),
            delay_line: vec![0.0; coefficients.len()],
            index: 0,
        }
    }

    /// Insert one sample and return `Σ c[i]·x[n-i]`
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let len = self.delay_line.len();
        if len == 0 {
            return 0.0;
        }

        self.delay_line[self.index] = input;
        let newest = self.index;
        self.index = (self.index + 1) % len;

        // Newest sample pairs with c[0]; walk backwards through the line.
        let (recent, older) = self.delay_line.split_at(newest + 1);
        let mut output = 0.0;
        let mut taps = self.coefficients.iter();
        for (&coefficient, &sample) in taps.by_ref().zip(recent.iter().rev()) {
            output += coefficient * sample;
        }
        for (&coefficient, &sample) in taps.zip(older.iter().rev()) {
            output += coefficient * sample;
        }

        output
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Zero the delay line
    pub fn reset(&mut self) {
        self.delay_line.fill(0.0);
        self.index = 0;
    }
}
