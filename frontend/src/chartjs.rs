//! Chart.js binding. `index.html` loads the library as a global.

use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use crate::charts::{ChartBackend, ChartSlot, ChartSpec, TooltipFormat};
use crate::format::{format_currency, format_score};

#[wasm_bindgen]
extern "C" {
    type Chart;

    #[wasm_bindgen(constructor, catch)]
    fn new(canvas: &HtmlCanvasElement, config: &JsValue) -> Result<Chart, JsValue>;

    #[wasm_bindgen(method)]
    fn destroy(this: &Chart);
}

pub struct ChartJsHandle {
    chart: Chart,
    _tooltip: Closure<dyn Fn(JsValue) -> String>,
}

#[derive(Default)]
pub struct ChartJsBackend;

impl ChartBackend for ChartJsBackend {
    type Handle = ChartJsHandle;

    fn render(&mut self, slot: ChartSlot, spec: &ChartSpec) -> Option<ChartJsHandle> {
        let canvas = web_sys::window()?
            .document()?
            .get_element_by_id(slot.canvas_id())?
            .dyn_into::<HtmlCanvasElement>()
            .ok()?;

        let config = match js_sys::JSON::parse(&spec.to_config().to_string()) {
            Ok(config) => config,
            Err(err) => {
                log::error!("chart config for #{} rejected: {:?}", slot.canvas_id(), err);
                return None;
            }
        };

        let format = spec.tooltip;
        let tooltip = Closure::<dyn Fn(JsValue) -> String>::new(move |ctx: JsValue| {
            tooltip_label(&ctx, format)
        });
        let callbacks = ["options", "plugins", "tooltip", "callbacks"]
            .iter()
            .try_fold(config.clone(), |obj, key| {
                Reflect::get(&obj, &JsValue::from_str(key))
            })
            .ok()?;
        Reflect::set(&callbacks, &JsValue::from_str("label"), tooltip.as_ref()).ok()?;

        match Chart::new(&canvas, &config) {
            Ok(chart) => Some(ChartJsHandle {
                chart,
                _tooltip: tooltip,
            }),
            Err(err) => {
                log::error!("Chart.js failed on #{}: {:?}", slot.canvas_id(), err);
                None
            }
        }
    }

    fn destroy(&mut self, handle: ChartJsHandle) {
        handle.chart.destroy();
    }
}

fn tooltip_label(ctx: &JsValue, format: TooltipFormat) -> String {
    let label = Reflect::get(ctx, &JsValue::from_str("label"))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default();
    let raw = Reflect::get(ctx, &JsValue::from_str("raw"))
        .ok()
        .and_then(|v| v.as_f64());
    let value = match format {
        TooltipFormat::Currency => format_currency(raw),
        TooltipFormat::Score => format_score(raw.unwrap_or(0.0)),
    };
    format!("{}: {}", label, value)
}
