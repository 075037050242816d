use crate::foundation::error::{Error, Result};

/// How capital enters the simulated portfolio.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvestmentPolicy {
    /// No simulation; the raw price curve is displayed as-is.
    PriceOnly,
    /// One investment at the start of the observed period. The whole curve is
    /// rebased to this starting capital (`value[k] = price[k] / price[0] *
    /// amount`) — a rescaling, not a holdings simulation.
    LumpSum {
        /// Capital invested at the first frame, in currency units.
        amount: f64,
    },
    /// A fixed contribution at the start of each calendar month, with each
    /// contribution's effect spread evenly over a short frame window to avoid
    /// a step discontinuity.
    Recurring {
        /// Contribution per calendar month, in currency units.
        amount_per_period: f64,
        /// Number of consecutive frames one contribution is spread across.
        smoothing_frames: usize,
    },
}

impl Default for InvestmentPolicy {
    fn default() -> Self {
        Self::PriceOnly
    }
}

impl InvestmentPolicy {
    /// Check policy parameters before any frame is rendered.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::PriceOnly => Ok(()),
            Self::LumpSum { amount } => {
                if !amount.is_finite() || amount <= 0.0 {
                    return Err(Error::invalid_policy(format!(
                        "lump-sum amount must be positive, got {amount}"
                    )));
                }
                Ok(())
            }
            Self::Recurring {
                amount_per_period,
                smoothing_frames,
            } => {
                if !amount_per_period.is_finite() || amount_per_period <= 0.0 {
                    return Err(Error::invalid_policy(format!(
                        "recurring amount must be positive, got {amount_per_period}"
                    )));
                }
                if smoothing_frames < 1 {
                    return Err(Error::invalid_policy(
                        "smoothing window must be at least 1 frame",
                    ));
                }
                Ok(())
            }
        }
    }
}
