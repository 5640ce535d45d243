//! Token budget.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Maximum serialized size a payload may occupy, minus a safety buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBudget {
    pub max_tokens: usize,
    #[serde(default)]
    pub buffer: usize,
}

impl TokenBudget {
    /// Create a budget; `max_tokens` must be positive and exceed `buffer`.
    pub fn new(max_tokens: usize, buffer: usize) -> Result<Self> {
        let budget = Self { max_tokens, buffer };
        budget.validate()?;
        Ok(budget)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(Error::config("max_tokens must be positive"));
        }
        if self.buffer >= self.max_tokens {
            return Err(Error::config(format!(
                "buffer ({}) must be smaller than max_tokens ({})",
                self.buffer, self.max_tokens
            )));
        }
        Ok(())
    }

    /// `max_tokens - buffer`.
    pub fn effective(&self) -> usize {
        self.max_tokens.saturating_sub(self.buffer)
    }

    pub fn fits(&self, tokens: usize) -> bool {
        tokens <= self.effective()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_budget_subtracts_buffer() {
        let b = TokenBudget::new(1000, 100).unwrap();
        assert_eq!(b.effective(), 900);
        assert!(b.fits(900));
        assert!(!b.fits(901));
    }

    #[test]
    fn buffer_must_be_below_max() {
        assert!(TokenBudget::new(100, 100).unwrap_err().is_config());
        assert!(TokenBudget::new(0, 0).is_err());
    }
}
