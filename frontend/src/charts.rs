//! Chart descriptions and the per-slot registry of live chart instances.

use std::collections::HashMap;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    Overview,
    Donations,
    ExpenseCategories,
    HealthGauge,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 4] = [
        ChartSlot::Overview,
        ChartSlot::Donations,
        ChartSlot::ExpenseCategories,
        ChartSlot::HealthGauge,
    ];

    /// Id of the canvas element the slot renders into.
    pub fn canvas_id(&self) -> &'static str {
        match self {
            ChartSlot::Overview => "incomeExpenseChart",
            ChartSlot::Donations => "donationPieChart",
            ChartSlot::ExpenseCategories => "expenseCategoryChart",
            ChartSlot::HealthGauge => "healthGaugeChart",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Doughnut,
}

/// How tooltip values are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TooltipFormat {
    Currency,
    Score,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendPosition {
    Hidden,
    Bottom,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub title: Option<String>,
    pub legend: LegendPosition,
    pub horizontal: bool,
    pub begin_at_zero: bool,
    pub axis_max: Option<f64>,
    pub tooltip: TooltipFormat,
}

impl ChartSpec {
    /// Chart.js configuration object for this spec. The tooltip formatter is
    /// not serializable and is attached by the backend.
    pub fn to_config(&self) -> serde_json::Value {
        let legend = match self.legend {
            LegendPosition::Hidden => serde_json::json!({ "display": false }),
            LegendPosition::Bottom => serde_json::json!({ "position": "bottom" }),
        };
        let mut options = serde_json::json!({
            "responsive": true,
            "plugins": {
                "legend": legend,
                "tooltip": { "callbacks": {} },
            },
        });
        if let Some(title) = &self.title {
            options["plugins"]["title"] = serde_json::json!({ "display": true, "text": title });
        }
        if self.kind == ChartKind::Bar {
            let value_axis = if self.horizontal { "x" } else { "y" };
            let mut axis = serde_json::json!({ "beginAtZero": self.begin_at_zero });
            if let Some(max) = self.axis_max {
                axis["max"] = serde_json::json!(max);
            }
            let mut scales = serde_json::Map::new();
            scales.insert(value_axis.to_string(), axis);
            options["scales"] = serde_json::Value::Object(scales);
            if self.horizontal {
                options["indexAxis"] = serde_json::json!("y");
            }
        }
        serde_json::json!({
            "type": self.kind,
            "data": {
                "labels": self.labels,
                "datasets": self.datasets,
            },
            "options": options,
        })
    }
}

/// The external charting capability.
pub trait ChartBackend {
    type Handle;

    /// Creates a chart in the slot's target, or `None` when the target is
    /// missing from the page.
    fn render(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Option<Self::Handle>;

    fn destroy(&mut self, handle: Self::Handle);
}

/// Owns at most one live chart per slot.
pub struct ChartRegistry<B: ChartBackend> {
    backend: B,
    live: HashMap<ChartSlot, B::Handle>,
}

impl<B: ChartBackend> ChartRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            live: HashMap::new(),
        }
    }

    /// Replaces whatever the slot holds with a chart for `spec`. The old
    /// instance is destroyed before the new one is created.
    pub fn draw(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Option<&B::Handle> {
        self.clear(slot);
        match self.backend.render(slot, spec) {
            Some(handle) => {
                self.live.insert(slot, handle);
                self.live.get(&slot)
            }
            None => {
                log::debug!("chart target #{} missing, skipped", slot.canvas_id());
                None
            }
        }
    }

    pub fn clear(&mut self, slot: ChartSlot) {
        if let Some(old) = self.live.remove(&slot) {
            self.backend.destroy(old);
        }
    }

    pub fn clear_all(&mut self) {
        for slot in ChartSlot::ALL {
            self.clear(slot);
        }
    }

    pub fn handle(&self, slot: ChartSlot) -> Option<&B::Handle> {
        self.live.get(&slot)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: ChartBackend> Drop for ChartRegistry<B> {
    fn drop(&mut self) {
        self.clear_all();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Event {
        Render(ChartSlot, u32),
        Destroy(ChartSlot, u32),
    }

    #[derive(Debug, PartialEq)]
    pub struct FakeHandle {
        pub id: u32,
        pub slot: ChartSlot,
        pub spec: ChartSpec,
    }

    /// Records every call and tracks which handles are still alive.
    #[derive(Default)]
    pub struct RecordingBackend {
        pub next_id: u32,
        pub missing: Vec<ChartSlot>,
        pub events: Vec<Event>,
        pub alive: Vec<(ChartSlot, u32)>,
    }

    impl RecordingBackend {
        pub fn alive_in(&self, slot: ChartSlot) -> usize {
            self.alive.iter().filter(|(s, _)| *s == slot).count()
        }
    }

    impl ChartBackend for RecordingBackend {
        type Handle = FakeHandle;

        fn render(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Option<FakeHandle> {
            if self.missing.contains(&slot) {
                return None;
            }
            assert_eq!(self.alive_in(slot), 0, "two live charts in {:?}", slot);
            self.next_id += 1;
            self.events.push(Event::Render(slot, self.next_id));
            self.alive.push((slot, self.next_id));
            Some(FakeHandle {
                id: self.next_id,
                slot,
                spec: spec.clone(),
            })
        }

        fn destroy(&mut self, handle: FakeHandle) {
            self.events.push(Event::Destroy(handle.slot, handle.id));
            self.alive.retain(|(_, id)| *id != handle.id);
        }
    }

    pub fn bar(values: &[f64]) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Bar,
            labels: values.iter().map(|v| v.to_string()).collect(),
            datasets: vec![Dataset {
                label: None,
                data: values.to_vec(),
                background_color: vec!["#000".into()],
                border_radius: None,
                border_width: None,
            }],
            title: None,
            legend: LegendPosition::Hidden,
            horizontal: false,
            begin_at_zero: true,
            axis_max: None,
            tooltip: TooltipFormat::Score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn redraw_leaves_one_live_chart_for_latest_spec() {
        let mut registry = ChartRegistry::new(RecordingBackend::default());
        let a = bar(&[1.0]);
        let b = bar(&[2.0]);
        registry.draw(ChartSlot::Overview, &a);
        registry.draw(ChartSlot::Overview, &b);

        assert_eq!(registry.live_count(), 1);
        assert_eq!(registry.backend().alive_in(ChartSlot::Overview), 1);
        assert_eq!(registry.handle(ChartSlot::Overview).unwrap().spec, b);
    }

    #[test]
    fn old_chart_is_destroyed_before_new_one_is_created() {
        let mut registry = ChartRegistry::new(RecordingBackend::default());
        registry.draw(ChartSlot::Donations, &bar(&[1.0]));
        registry.draw(ChartSlot::Donations, &bar(&[2.0]));
        assert_eq!(
            registry.backend().events,
            vec![
                Event::Render(ChartSlot::Donations, 1),
                Event::Destroy(ChartSlot::Donations, 1),
                Event::Render(ChartSlot::Donations, 2),
            ]
        );
    }

    #[test]
    fn missing_target_is_a_no_op() {
        let backend = RecordingBackend {
            missing: vec![ChartSlot::HealthGauge],
            ..Default::default()
        };
        let mut registry = ChartRegistry::new(backend);
        assert!(registry.draw(ChartSlot::HealthGauge, &bar(&[1.0])).is_none());
        assert!(registry.draw(ChartSlot::Overview, &bar(&[1.0])).is_some());
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn slots_are_independent_and_clear_releases() {
        let mut registry = ChartRegistry::new(RecordingBackend::default());
        for slot in ChartSlot::ALL {
            registry.draw(slot, &bar(&[1.0]));
        }
        assert_eq!(registry.live_count(), 4);
        registry.clear(ChartSlot::Overview);
        assert_eq!(registry.live_count(), 3);
        assert_eq!(registry.backend().alive.len(), 3);
        registry.clear_all();
        assert!(registry.backend().alive.is_empty());
    }

    #[test]
    fn config_matches_chartjs_layout() {
        let mut spec = bar(&[5.0]);
        spec.horizontal = true;
        spec.axis_max = Some(100.0);
        let config = spec.to_config();
        assert_eq!(config["type"], "bar");
        assert_eq!(config["options"]["indexAxis"], "y");
        assert_eq!(config["options"]["scales"]["x"]["max"], 100.0);
        assert_eq!(config["options"]["plugins"]["legend"]["display"], false);
        assert_eq!(config["data"]["datasets"][0]["backgroundColor"][0], "#000");
        assert!(config["data"]["datasets"][0].get("label").is_none());
    }
}
