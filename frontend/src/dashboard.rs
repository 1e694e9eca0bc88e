//! Builds cards, chart specs and the summary list from one analysis payload.

use crate::analysis::{normalize, AnalysisPayload, Anomaly, DerivedMetrics, HealthStatus};
use crate::charts::{
    ChartBackend, ChartKind, ChartRegistry, ChartSlot, ChartSpec, Dataset, LegendPosition,
    TooltipFormat,
};
use crate::format::{format_currency, format_percent, format_score};

#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub title: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderResult {
    pub pass: u64,
    pub cards: Vec<Card>,
    pub summary_lines: Vec<String>,
    pub health: HealthStatus,
    pub anomalies: Vec<Anomaly>,
}

pub fn cards(m: &DerivedMetrics) -> Vec<Card> {
    vec![
        Card {
            title: "Total Income",
            value: format_currency(m.total_income),
        },
        Card {
            title: "Total Expense",
            value: format_currency(m.total_expense),
        },
        Card {
            title: "Total Donations",
            value: format_currency(m.total_donations),
        },
        Card {
            title: if m.surplus_or_deficit < 0.0 { "Deficit" } else { "Surplus" },
            value: format_currency(m.surplus_or_deficit),
        },
        Card {
            title: "Risk Level",
            value: m.risk_level.clone(),
        },
        Card {
            title: "Stability Score",
            value: format_score(m.stability_score),
        },
        Card {
            title: "Monthly Burn Rate",
            value: m
                .monthly_burn_rate
                .map(format_currency)
                .unwrap_or_else(|| "n/a".to_string()),
        },
    ]
}

fn dataset(data: Vec<f64>, colors: &[&str]) -> Dataset {
    Dataset {
        label: None,
        data,
        background_color: colors.iter().map(|c| c.to_string()).collect(),
        border_radius: None,
        border_width: None,
    }
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

pub fn overview_chart(m: &DerivedMetrics) -> ChartSpec {
    let surplus_color = if m.surplus_or_deficit < 0.0 { "#f56565" } else { "#48bb78" };
    let mut data = dataset(
        vec![m.total_income, m.total_expense, m.surplus_or_deficit],
        &["#3fb8ff", "#f8696b", surplus_color],
    );
    data.label = Some("Amount (₹)".to_string());
    data.border_radius = Some(8);
    ChartSpec {
        kind: ChartKind::Bar,
        labels: labels(&["Income", "Expense", "Surplus"]),
        datasets: vec![data],
        title: None,
        legend: LegendPosition::Hidden,
        horizontal: false,
        begin_at_zero: true,
        axis_max: None,
        tooltip: TooltipFormat::Currency,
    }
}

pub fn donation_chart(m: &DerivedMetrics) -> ChartSpec {
    let mut data = dataset(vec![m.total_donations, m.other_income], &["#4fd1c5", "#7e8df1"]);
    data.border_width = Some(0);
    ChartSpec {
        kind: ChartKind::Doughnut,
        labels: vec![
            format!("Donations ({})", format_percent(m.donation_percent)),
            "Other Income".to_string(),
        ],
        datasets: vec![data],
        title: Some(format!("{} of income from donations", format_percent(m.donation_percent))),
        legend: LegendPosition::Bottom,
        horizontal: false,
        begin_at_zero: false,
        axis_max: None,
        tooltip: TooltipFormat::Currency,
    }
}

pub fn expense_chart(m: &DerivedMetrics) -> ChartSpec {
    let split = m.expense_split;
    let mut data = dataset(
        vec![split.operational, split.programs, split.administrative],
        &["#f6ad55", "#9f7aea", "#a0aec0"],
    );
    data.border_width = Some(0);
    let basis = if m.monthly_burn_rate.is_some() { "burn rate" } else { "estimate" };
    ChartSpec {
        kind: ChartKind::Pie,
        labels: labels(&["Operational", "Programs", "Administrative"]),
        datasets: vec![data],
        title: Some(format!("Expense categories ({})", basis)),
        legend: LegendPosition::Bottom,
        horizontal: false,
        begin_at_zero: false,
        axis_max: None,
        tooltip: TooltipFormat::Currency,
    }
}

pub fn health_gauge(m: &DerivedMetrics) -> ChartSpec {
    let mut data = dataset(vec![m.stability_score], &[m.health.color()]);
    data.border_radius = Some(8);
    ChartSpec {
        kind: ChartKind::Bar,
        labels: labels(&["Stability"]),
        datasets: vec![data],
        title: Some(format!("Health: {}", m.health.label())),
        legend: LegendPosition::Hidden,
        horizontal: true,
        begin_at_zero: true,
        axis_max: Some(100.0),
        tooltip: TooltipFormat::Score,
    }
}

pub fn chart_specs(m: &DerivedMetrics) -> Vec<(ChartSlot, ChartSpec)> {
    vec![
        (ChartSlot::Overview, overview_chart(m)),
        (ChartSlot::Donations, donation_chart(m)),
        (ChartSlot::ExpenseCategories, expense_chart(m)),
        (ChartSlot::HealthGauge, health_gauge(m)),
    ]
}

pub struct Dashboard<B: ChartBackend> {
    charts: ChartRegistry<B>,
    summary: Vec<String>,
    passes: u64,
}

impl<B: ChartBackend> Dashboard<B> {
    pub fn new(backend: B) -> Self {
        Self {
            charts: ChartRegistry::new(backend),
            summary: Vec::new(),
            passes: 0,
        }
    }

    pub fn render(&mut self, payload: &AnalysisPayload) -> RenderResult {
        let metrics = normalize(payload);
        self.passes += 1;

        for (slot, spec) in chart_specs(&metrics) {
            self.charts.draw(slot, &spec);
        }
        self.summary = metrics.summary.clone();

        log::info!(
            "render pass {}: {} charts live, health {}",
            self.passes,
            self.charts.live_count(),
            metrics.health.label()
        );

        RenderResult {
            pass: self.passes,
            cards: cards(&metrics),
            summary_lines: self.summary.clone(),
            health: metrics.health,
            anomalies: metrics.anomalies,
        }
    }

    /// Drops every chart and the summary list.
    pub fn reset(&mut self) {
        self.charts.clear_all();
        self.summary.clear();
    }

    pub fn summary(&self) -> &[String] {
        &self.summary
    }

    pub fn charts(&self) -> &ChartRegistry<B> {
        &self.charts
    }
}
