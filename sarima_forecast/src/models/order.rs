//! Model orders and the search grid over them

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Non-seasonal order (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ArimaOrder {
    /// Create a new non-seasonal order
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

impl FromStr for ArimaOrder {
    type Err = ForecastError;

    /// Parse `"p,d,q"`
    fn from_str(s: &str) -> Result<Self> {
        match parse_orders(s)?.as_slice() {
            &[p, d, q] => Ok(Self::new(p, d, q)),
            other => Err(ForecastError::InvalidParameter(format!(
                "Expected three comma-separated orders, got {}",
                other.len()
            ))),
        }
    }
}

/// Seasonal order (P, D, Q) with period s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeasonalOrder {
    /// Seasonal AR order (P)
    pub p: usize,
    /// Seasonal differencing order (D)
    pub d: usize,
    /// Seasonal MA order (Q)
    pub q: usize,
    /// Seasonal period (s)
    pub period: usize,
}

impl SeasonalOrder {
    /// Create a new seasonal order; the period must be positive
    pub fn new(p: usize, d: usize, q: usize, period: usize) -> Result<Self> {
        if period == 0 {
            return Err(ForecastError::InvalidParameter(
                "Seasonal period must be greater than zero".to_string(),
            ));
        }

        Ok(Self { p, d, q, period })
    }
}

impl fmt::Display for SeasonalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.p, self.d, self.q, self.period)
    }
}

impl FromStr for SeasonalOrder {
    type Err = ForecastError;

    /// Parse `"P,D,Q,s"`
    fn from_str(s: &str) -> Result<Self> {
        match parse_orders(s)?.as_slice() {
            &[p, d, q, period] => Self::new(p, d, q, period),
            other => Err(ForecastError::InvalidParameter(format!(
                "Expected four comma-separated seasonal orders, got {}",
                other.len()
            ))),
        }
    }
}

fn parse_orders(s: &str) -> Result<Vec<usize>> {
    s.trim_matches(|c| c == '(' || c == ')')
        .split(',')
        .map(|part| {
            part.trim().parse::<usize>().map_err(|e| {
                ForecastError::InvalidParameter(format!("Invalid order '{}': {}", part.trim(), e))
            })
        })
        .collect()
}

/// One point of the search grid: (p,d,q)x(P,D,Q,s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderCandidate {
    /// Non-seasonal order
    pub order: ArimaOrder,
    /// Seasonal order
    pub seasonal: SeasonalOrder,
}

impl OrderCandidate {
    /// Create a new candidate
    pub fn new(order: ArimaOrder, seasonal: SeasonalOrder) -> Self {
        Self { order, seasonal }
    }

    /// Number of estimated coefficients (excluding the innovation variance)
    pub fn num_coefficients(&self) -> usize {
        self.order.p + self.order.q + self.seasonal.p + self.seasonal.q
    }

    /// Number of parameters counted by the information criteria
    pub fn num_params(&self) -> usize {
        self.num_coefficients() + 1
    }

    /// Observations consumed before the first residual can be formed
    pub fn conditioning_lags(&self) -> usize {
        self.order.d + self.order.p + self.seasonal.period * (self.seasonal.d + self.seasonal.p)
    }
}

impl fmt::Display for OrderCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SARIMA{}x{}", self.order, self.seasonal)
    }
}

/// Exhaustive grid of candidate orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchGrid {
    non_seasonal: Vec<usize>,
    seasonal: Vec<usize>,
    period: usize,
}

impl SearchGrid {
    /// Create a grid from explicit value sets for (p,d,q) and (P,D,Q)
    pub fn new(non_seasonal: Vec<usize>, seasonal: Vec<usize>, period: usize) -> Result<Self> {
        if non_seasonal.is_empty() || seasonal.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Order ranges must not be empty".to_string(),
            ));
        }
        if period == 0 {
            return Err(ForecastError::InvalidParameter(
                "Seasonal period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            non_seasonal,
            seasonal,
            period,
        })
    }

    /// Grid with every order running from zero to the given maximum
    pub fn up_to(max_order: usize, max_seasonal_order: usize, period: usize) -> Result<Self> {
        Self::new(
            (0..=max_order).collect(),
            (0..=max_seasonal_order).collect(),
            period,
        )
    }

    /// Seasonal period shared by every candidate
    pub fn period(&self) -> usize {
        self.period
    }

    /// Number of candidates in the grid
    pub fn len(&self) -> usize {
        self.non_seasonal.len().pow(3) * self.seasonal.len().pow(3)
    }

    /// A validated grid always holds at least one candidate
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All candidates, (p,d,q) outermost and lexicographic, then (P,D,Q)
    pub fn candidates(&self) -> Vec<OrderCandidate> {
        let mut candidates = Vec::with_capacity(self.len());
        for &p in &self.non_seasonal {
            for &d in &self.non_seasonal {
                for &q in &self.non_seasonal {
                    for &sp in &self.seasonal {
                        for &sd in &self.seasonal {
                            for &sq in &self.seasonal {
                                candidates.push(OrderCandidate::new(
                                    ArimaOrder::new(p, d, q),
                                    SeasonalOrder {
                                        p: sp,
                                        d: sd,
                                        q: sq,
                                        period: self.period,
                                    },
                                ));
                            }
                        }
                    }
                }
            }
        }
        candidates
    }
}

impl Default for SearchGrid {
    fn default() -> Self {
        Self {
            non_seasonal: vec![0, 1, 2],
            seasonal: vec![0, 1, 2],
            period: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_enumeration_order() {
        let grid = SearchGrid::up_to(1, 1, 12).unwrap();
        let candidates = grid.candidates();

        assert_eq!(candidates.len(), 64);
        assert_eq!(grid.len(), 64);
        assert_eq!(candidates[0].to_string(), "SARIMA(0,0,0)x(0,0,0,12)");
        assert_eq!(candidates[1].to_string(), "SARIMA(0,0,0)x(0,0,1,12)");
        assert_eq!(candidates[8].to_string(), "SARIMA(0,0,1)x(0,0,0,12)");
        assert_eq!(candidates[63].to_string(), "SARIMA(1,1,1)x(1,1,1,12)");
    }

    #[test]
    fn test_default_grid_size() {
        assert_eq!(SearchGrid::default().len(), 729);
    }

    #[test]
    fn test_parse_orders() {
        assert_eq!("2,1,2".parse::<ArimaOrder>().unwrap(), ArimaOrder::new(2, 1, 2));
        assert_eq!(
            "(0, 2, 2, 12)".parse::<SeasonalOrder>().unwrap(),
            SeasonalOrder::new(0, 2, 2, 12).unwrap()
        );
        assert!("1,2".parse::<ArimaOrder>().is_err());
        assert!("0,1,1,0".parse::<SeasonalOrder>().is_err());
        assert!("a,1,1".parse::<ArimaOrder>().is_err());
    }

    #[test]
    fn test_conditioning_lags() {
        let candidate = OrderCandidate::new(
            ArimaOrder::new(2, 1, 2),
            SeasonalOrder::new(1, 1, 1, 12).unwrap(),
        );
        assert_eq!(candidate.conditioning_lags(), 1 + 2 + 12 * 2);
        assert_eq!(candidate.num_params(), 7);
    }

    #[test]
    fn test_invalid_grid() {
        assert!(SearchGrid::new(vec![], vec![0], 12).is_err());
        assert!(SearchGrid::up_to(1, 1, 0).is_err());
    }
}
