//! Turns a raw analysis payload into the fully-resolved metrics every chart
//! and card reads from.
//!
//! Fallback rules are applied here and nowhere else:
//!
//! 1. risk level: payload value, else `High` on a deficit and `Low` otherwise
//! 2. other income: `max(income - donations, 0)`
//! 3. donation percent: one decimal place, `0` when there is no income
//! 4. expense split: burn rate (or half the expense) as operational, 30% as
//!    programs, the residual as administrative. The residual is not clamped
//!    and goes negative when the burn rate exceeds the total expense.
//! 5. health: `Healthy` from 70, `Moderate` from 40, `AtRisk` below

use serde::{Deserialize, Serialize};

use crate::format::round1;

pub const OPERATIONAL_SHARE: f64 = 0.5;
pub const PROGRAMS_SHARE: f64 = 0.3;
pub const HEALTHY_SCORE: f64 = 70.0;
pub const MODERATE_SCORE: f64 = 40.0;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Anomaly {
    #[serde(default)]
    pub row: u32,
    #[serde(default)]
    pub expense: f64,
    #[serde(default)]
    pub issue: String,
}

/// Analysis object as returned by `/upload-file`. Every field is optional on
/// the wire.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisPayload {
    pub total_income: Option<f64>,
    pub total_expense: Option<f64>,
    pub total_donations: Option<f64>,
    pub surplus_or_deficit: Option<f64>,
    pub stability_score: Option<f64>,
    pub monthly_burn_rate: Option<f64>,
    pub risk_level: Option<String>,
    pub donation_dependency_percent: Option<f64>,
    pub expense_volatility: Option<f64>,
    pub anomalies: Option<Vec<Anomaly>>,
    pub summary: Option<Vec<String>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Moderate,
    AtRisk,
}

impl HealthStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= HEALTHY_SCORE {
            HealthStatus::Healthy
        } else if score >= MODERATE_SCORE {
            HealthStatus::Moderate
        } else {
            HealthStatus::AtRisk
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Moderate => "Moderate",
            HealthStatus::AtRisk => "At Risk",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "#48bb78",
            HealthStatus::Moderate => "#f6ad55",
            HealthStatus::AtRisk => "#f56565",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpenseSplit {
    pub operational: f64,
    pub programs: f64,
    pub administrative: f64,
}

impl ExpenseSplit {
    pub fn estimate(total_expense: f64, burn_rate: Option<f64>) -> Self {
        let operational = burn_rate.unwrap_or(total_expense * OPERATIONAL_SHARE);
        let programs = total_expense * PROGRAMS_SHARE;
        ExpenseSplit {
            operational,
            programs,
            administrative: total_expense - operational - programs,
        }
    }

    pub fn total(&self) -> f64 {
        self.operational + self.programs + self.administrative
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DerivedMetrics {
    pub total_income: f64,
    pub total_expense: f64,
    pub total_donations: f64,
    pub surplus_or_deficit: f64,
    pub stability_score: f64,
    pub monthly_burn_rate: Option<f64>,
    pub risk_level: String,
    pub other_income: f64,
    pub donation_percent: f64,
    pub donation_dependency_percent: f64,
    pub expense_volatility: f64,
    pub expense_split: ExpenseSplit,
    pub health: HealthStatus,
    pub anomalies: Vec<Anomaly>,
    pub summary: Vec<String>,
}

pub fn normalize(payload: &AnalysisPayload) -> DerivedMetrics {
    let total_income = payload.total_income.unwrap_or(0.0);
    let total_expense = payload.total_expense.unwrap_or(0.0);
    let total_donations = payload.total_donations.unwrap_or(0.0);
    let surplus_or_deficit = payload
        .surplus_or_deficit
        .unwrap_or(total_income - total_expense);
    let stability_score = payload.stability_score.unwrap_or(0.0);

    let risk_level = match &payload.risk_level {
        Some(level) => level.clone(),
        None if surplus_or_deficit < 0.0 => "High".to_string(),
        None => "Low".to_string(),
    };

    let other_income = (total_income - total_donations).max(0.0);

    let donation_percent = if total_income > 0.0 {
        round1(total_donations / total_income * 100.0)
    } else {
        0.0
    };

    DerivedMetrics {
        total_income,
        total_expense,
        total_donations,
        surplus_or_deficit,
        stability_score,
        monthly_burn_rate: payload.monthly_burn_rate,
        risk_level,
        other_income,
        donation_percent,
        donation_dependency_percent: payload
            .donation_dependency_percent
            .unwrap_or(donation_percent),
        expense_volatility: payload.expense_volatility.unwrap_or(0.0),
        expense_split: ExpenseSplit::estimate(total_expense, payload.monthly_burn_rate),
        health: HealthStatus::from_score(stability_score),
        anomalies: payload.anomalies.clone().unwrap_or_default(),
        summary: payload.summary.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(income: f64, expense: f64, donations: f64) -> AnalysisPayload {
        AnalysisPayload {
            total_income: Some(income),
            total_expense: Some(expense),
            total_donations: Some(donations),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_is_repeatable() {
        let mut p = payload(10000.0, 8000.0, 2000.0);
        p.stability_score = Some(55.0);
        p.monthly_burn_rate = Some(1333.33);
        p.summary = Some(vec!["ok".into()]);
        let first = normalize(&p);
        let second = normalize(&p);
        assert_eq!(first, second);
        assert_eq!(
            first.expense_split.administrative.to_bits(),
            second.expense_split.administrative.to_bits()
        );
    }

    #[test]
    fn expense_split_always_sums_to_total() {
        for expense in [0.0, 1.0, 8000.0, 123456.78] {
            for burn in [None, Some(0.0), Some(500.0), Some(expense * 2.0 + 10.0)] {
                let split = ExpenseSplit::estimate(expense, burn);
                assert!((split.total() - expense).abs() < 1e-6, "{expense} {burn:?}");
            }
        }
    }

    #[test]
    fn burn_rate_above_expense_leaves_negative_residual() {
        let split = ExpenseSplit::estimate(1000.0, Some(2000.0));
        assert_eq!(split.operational, 2000.0);
        assert_eq!(split.programs, 300.0);
        assert_eq!(split.administrative, -1300.0);
    }

    #[test]
    fn estimated_split_without_burn_rate() {
        let split = ExpenseSplit::estimate(8000.0, None);
        assert_eq!(split.operational, 4000.0);
        assert_eq!(split.programs, 2400.0);
        assert!((split.administrative - 1600.0).abs() < 1e-9);
    }

    #[test]
    fn health_boundaries() {
        assert_eq!(HealthStatus::from_score(70.0), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_score(69.999), HealthStatus::Moderate);
        assert_eq!(HealthStatus::from_score(40.0), HealthStatus::Moderate);
        assert_eq!(HealthStatus::from_score(39.999), HealthStatus::AtRisk);
        assert_eq!(normalize(&AnalysisPayload::default()).health, HealthStatus::AtRisk);
    }

    #[test]
    fn donation_percent_handles_zero_income() {
        assert_eq!(normalize(&payload(0.0, 10.0, 500.0)).donation_percent, 0.0);
        assert_eq!(normalize(&payload(1000.0, 10.0, 250.0)).donation_percent, 25.0);
        assert_eq!(normalize(&payload(3.0, 0.0, 1.0)).donation_percent, 33.3);
    }

    #[test]
    fn risk_level_falls_back_on_surplus_sign() {
        let mut p = payload(100.0, 200.0, 0.0);
        p.surplus_or_deficit = Some(-100.0);
        assert_eq!(normalize(&p).risk_level, "High");

        p.surplus_or_deficit = Some(0.0);
        assert_eq!(normalize(&p).risk_level, "Low");

        p.risk_level = Some("Medium".into());
        assert_eq!(normalize(&p).risk_level, "Medium");
    }

    #[test]
    fn missing_surplus_is_income_minus_expense() {
        let m = normalize(&payload(100.0, 250.0, 0.0));
        assert_eq!(m.surplus_or_deficit, -150.0);
        assert_eq!(m.risk_level, "High");
    }

    #[test]
    fn other_income_is_never_negative() {
        assert_eq!(normalize(&payload(100.0, 0.0, 400.0)).other_income, 0.0);
        assert_eq!(normalize(&payload(1000.0, 0.0, 400.0)).other_income, 600.0);
    }

    #[test]
    fn empty_payload_deserializes_and_normalizes() {
        let p: AnalysisPayload = serde_json::from_str("{}").unwrap();
        let m = normalize(&p);
        assert_eq!(m.total_income, 0.0);
        assert!(m.summary.is_empty());
        assert!(m.anomalies.is_empty());
        assert_eq!(m.monthly_burn_rate, None);
    }

    #[test]
    fn reads_backend_analysis_shape() {
        let raw = r#"{
            "total_income": 12000.0,
            "total_expense": 9000.0,
            "total_donations": 9000.0,
            "surplus_or_deficit": 3000.0,
            "monthly_burn_rate": 750.0,
            "donation_dependency_percent": 75.0,
            "expense_volatility": 120.5,
            "stability_score": 75,
            "anomalies": [{"row": 4, "expense": 4000.0, "issue": "Unusually high expense detected"}],
            "summary": ["NGO is operating at a surplus of ₹3000.0."]
        }"#;
        let m = normalize(&serde_json::from_str::<AnalysisPayload>(raw).unwrap());
        assert_eq!(m.stability_score, 75.0);
        assert_eq!(m.health, HealthStatus::Healthy);
        assert_eq!(m.donation_dependency_percent, 75.0);
        assert_eq!(m.expense_split.operational, 750.0);
        assert_eq!(m.anomalies.len(), 1);
        assert_eq!(m.anomalies[0].row, 4);
    }
}
