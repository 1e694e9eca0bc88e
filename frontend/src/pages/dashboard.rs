use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::api::{check_upload_name, AnalysisApi, HttpClient, RawInput};
use crate::chartjs::ChartJsBackend;
use crate::charts::ChartSlot;
use crate::config::AppConfig;
use crate::dashboard::{Card, Dashboard, RenderResult};
use crate::format::format_currency;
use crate::inflight::{Action, RequestTracker};
use crate::pages::bind_input;

const CARD_TITLES: [&str; 7] = [
    "Total Income",
    "Total Expense",
    "Total Donations",
    "Surplus",
    "Risk Level",
    "Stability Score",
    "Monthly Burn Rate",
];

#[function_component(DashboardPage)]
pub fn dashboard_page() -> Html {
    let config = use_context::<AppConfig>().unwrap_or_default();
    let client = HttpClient::new(config.api_base);

    let dashboard = use_mut_ref(|| Dashboard::new(ChartJsBackend));
    let requests = use_mut_ref(RequestTracker::new);

    let income = use_state(|| "".to_string());
    let expense = use_state(|| "".to_string());
    let donations = use_state(|| "".to_string());
    let prediction_status = use_state(String::new);
    let predicting = use_state(|| false);

    let file_input = use_node_ref();
    let upload_status = use_state(String::new);
    let uploading = use_state(|| false);
    let rendered = use_state(|| None::<RenderResult>);

    let on_predict = {
        let income = income.clone();
        let expense = expense.clone();
        let donations = donations.clone();
        let prediction_status = prediction_status.clone();
        let predicting = predicting.clone();
        let requests = requests.clone();
        let client = client.clone();
        Callback::from(move |_| {
            let input = match RawInput::parse(&income, &expense, &donations) {
                Ok(input) => input,
                Err(err) => {
                    prediction_status.set(err.to_string());
                    return;
                }
            };
            let Some(ticket) = requests.borrow_mut().begin(Action::Predict) else {
                return;
            };

            prediction_status.set(Action::Predict.pending_label().to_string());
            predicting.set(true);

            let client = client.clone();
            let requests = requests.clone();
            let prediction_status = prediction_status.clone();
            let predicting = predicting.clone();
            spawn_local(async move {
                let result = client.predict(&input).await;
                if !requests.borrow_mut().finish(ticket) {
                    log::debug!("dropping superseded prediction");
                    return;
                }
                match result {
                    Ok(prediction) => prediction_status.set(prediction.status_line()),
                    Err(err) => prediction_status.set(err.to_string()),
                }
                predicting.set(false);
            });
        })
    };

    let on_upload = {
        let file_input = file_input.clone();
        let upload_status = upload_status.clone();
        let uploading = uploading.clone();
        let rendered = rendered.clone();
        let dashboard = dashboard.clone();
        let requests = requests.clone();
        let client = client.clone();
        Callback::from(move |_| {
            let file = file_input
                .cast::<HtmlInputElement>()
                .and_then(|input| input.files())
                .and_then(|files| files.get(0));
            let name = file.as_ref().map(|f| f.name());
            if let Err(err) = check_upload_name(name.as_deref()) {
                upload_status.set(err.to_string());
                return;
            }
            let Some(file) = file else {
                return;
            };
            let Some(ticket) = requests.borrow_mut().begin(Action::Upload) else {
                return;
            };

            upload_status.set(Action::Upload.pending_label().to_string());
            uploading.set(true);

            let client = client.clone();
            let requests = requests.clone();
            let dashboard = dashboard.clone();
            let upload_status = upload_status.clone();
            let uploading = uploading.clone();
            let rendered = rendered.clone();
            spawn_local(async move {
                let result = client.upload(&file).await;
                if !requests.borrow_mut().finish(ticket) {
                    log::debug!("dropping superseded upload response");
                    return;
                }
                match result {
                    Ok(payload) => {
                        let result = dashboard.borrow_mut().render(&payload);
                        rendered.set(Some(result));
                        upload_status.set("Analysis complete.".to_string());
                    }
                    Err(err) => upload_status.set(err.to_string()),
                }
                uploading.set(false);
            });
        })
    };

    let cards: Vec<Card> = match &*rendered {
        Some(result) => result.cards.clone(),
        None => CARD_TITLES
            .iter()
            .map(|title| Card {
                title: *title,
                value: "—".to_string(),
            })
            .collect(),
    };

    html! {
        <div class="dashboard">
            <section class="panel">
                <h2 class="panel__title">{"Predict funding needs"}</h2>
                <div class="panel__row">
                    <label class="field">
                        <span>{"Income"}</span>
                        <input type="number" value={(*income).clone()} oninput={bind_input(&income)} />
                    </label>
                    <label class="field">
                        <span>{"Expense"}</span>
                        <input type="number" value={(*expense).clone()} oninput={bind_input(&expense)} />
                    </label>
                    <label class="field">
                        <span>{"Donations"}</span>
                        <input type="number" value={(*donations).clone()} oninput={bind_input(&donations)} />
                    </label>
                </div>
                <button class="btn btn--primary" onclick={on_predict} disabled={*predicting}>{"Predict"}</button>
                <p class="status">{ (*prediction_status).clone() }</p>
            </section>

            <section class="panel">
                <h2 class="panel__title">{"Upload financial records"}</h2>
                <input type="file" accept=".csv,.xlsx,.xls" ref={file_input} />
                <button class="btn btn--primary" onclick={on_upload} disabled={*uploading}>{"Analyse"}</button>
                <p class="status">{ (*upload_status).clone() }</p>
            </section>

            <section class="cards">
                { for cards.iter().map(|card| html! {
                    <div class="card">
                        <p class="card__title">{ card.title }</p>
                        <h3 class="card__value">{ card.value.clone() }</h3>
                    </div>
                }) }
            </section>

            <section class="charts">
                { for ChartSlot::ALL.iter().map(|slot| html! {
                    <div class="chart">
                        <canvas id={slot.canvas_id()}></canvas>
                    </div>
                }) }
            </section>

            if let Some(result) = &*rendered {
                <section class="panel">
                    <h2 class="panel__title">
                        {"Summary "}
                        <span class="badge" style={format!("background: {}", result.health.color())}>
                            { result.health.label() }
                        </span>
                    </h2>
                    <ul class="summary">
                        { for result.summary_lines.iter().map(|line| html! { <li>{ line.clone() }</li> }) }
                    </ul>
                    if !result.anomalies.is_empty() {
                        <h3 class="panel__subtitle">{"Expense anomalies"}</h3>
                        <ul class="anomalies">
                            { for result.anomalies.iter().map(|a| html! {
                                <li>{ format!("Row {}: {} ({})", a.row, format_currency(a.expense), a.issue) }</li>
                            }) }
                        </ul>
                    }
                </section>
            }
        </div>
    }
}
