//! Economic effect score
//!
//! A linear score over the labour force ratio, annual income and visitor count:
//! `score = labor_ratio * A + income * B + visitors * C`

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Weights applied to each indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicWeights {
    /// Labour force ratio weight (A)
    pub labor_ratio: f64,
    /// Annual income weight (B)
    pub income: f64,
    /// Annual visitors weight (C)
    pub visitors: f64,
}

impl Default for EconomicWeights {
    fn default() -> Self {
        Self {
            labor_ratio: 0.382,
            income: 0.271,
            visitors: 0.271,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicIndicators {
    /// Share of working-age population, in percent [0, 100]
    pub labor_ratio_pct: f64,
    /// Annual income, millions
    pub annual_income: f64,
    /// Annual visitors, thousands
    pub annual_visitors: f64,
}

impl Default for EconomicIndicators {
    fn default() -> Self {
        Self {
            labor_ratio_pct: 60.0,
            annual_income: 200.0,
            annual_visitors: 50.0,
        }
    }
}

impl EconomicIndicators {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.labor_ratio_pct) {
            return Err(Error::Configuration {
                parameter: "labor_ratio_pct",
                value: self.labor_ratio_pct,
                reason: "outside [0, 100]".to_string(),
            });
        }
        for (parameter, value) in [
            ("annual_income", self.annual_income),
            ("annual_visitors", self.annual_visitors),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(Error::Configuration {
                    parameter,
                    value,
                    reason: "must be a non-negative number".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Weighted economic effect score
pub fn economic_score(indicators: &EconomicIndicators, weights: &EconomicWeights) -> Result<f64> {
    indicators.validate()?;
    Ok(indicators.labor_ratio_pct * weights.labor_ratio
        + indicators.annual_income * weights.income
        + indicators.annual_visitors * weights.visitors)
}
