use super::Filter;

/// Exponential Moving Average – a weighted moving average whose weight decreases exponentially.
///
/// This is a tunable IIR filter.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f32,
    initial: Option<f32>,
    last: Option<f32>,
}

impl Ema {
    /// Creates a new Exponential Moving Average calculator.
    ///
    /// The `alpha` parameter must be between 0.0 and 1.0 and defines how quickly the weight of
    /// older values should decay. Values close to 1.0 very strongly favor recent values over older
    /// values, while values closer to 0.0 favor more recent values less strongly.
    ///
    /// The first value pushed into the filter is passed through unchanged.
    pub fn new(alpha: f32) -> Self {
        assert!((0.0..=1.0).contains(&alpha));
        Self {
            alpha,
            initial: None,
            last: None,
        }
    }

    /// Creates an Exponential Moving Average that starts out at `initial` instead of at the first
    /// pushed value.
    ///
    /// [`Filter::reset`] returns the filter to `initial`.
    pub fn starting_at(alpha: f32, initial: f32) -> Self {
        Self {
            initial: Some(initial),
            last: Some(initial),
            ..Self::new(alpha)
        }
    }
}

impl Filter<f32> for Ema {
    fn push(&mut self, value: f32) -> f32 {
        match self.last {
            Some(last) => {
                let avg = last + (value - last) * self.alpha;
                self.last = Some(avg);
                avg
            }
            None => {
                self.last = Some(value);
                value
            }
        }
    }

    fn reset(&mut self) {
        self.last = self.initial;
    }
}
