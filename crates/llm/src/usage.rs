//! Token accounting and cost estimation.

/// USD per million input tokens.
pub const INPUT_COST_PER_MILLION: f64 = 3.0;
/// USD per million output tokens.
pub const OUTPUT_COST_PER_MILLION: f64 = 15.0;

/// Token counts reported by the provider for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        u64::from(self.input_tokens) + u64::from(self.output_tokens)
    }

    pub fn estimated_cost(&self) -> f64 {
        estimate_cost(self.input_tokens, self.output_tokens)
    }
}

/// Estimated USD cost of a call.
pub fn estimate_cost(input_tokens: u32, output_tokens: u32) -> f64 {
    f64::from(input_tokens) / 1_000_000.0 * INPUT_COST_PER_MILLION
        + f64::from(output_tokens) / 1_000_000.0 * OUTPUT_COST_PER_MILLION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_uses_per_million_rates() {
        assert!((estimate_cost(1_000_000, 0) - 3.0).abs() < 1e-9);
        assert!((estimate_cost(0, 1_000_000) - 15.0).abs() < 1e-9);
        assert!((estimate_cost(1000, 500) - 0.0105).abs() < 1e-9);
        assert_eq!(estimate_cost(0, 0), 0.0);
    }

    #[test]
    fn total_is_sum_without_overflow() {
        let usage = TokenUsage {
            input_tokens: u32::MAX,
            output_tokens: 1,
        };
        assert_eq!(usage.total_tokens(), u64::from(u32::MAX) + 1);
    }
}
