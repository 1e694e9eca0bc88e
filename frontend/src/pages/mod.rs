pub mod auth;
pub mod dashboard;

use web_sys::HtmlInputElement;
use yew::prelude::*;

/// `oninput` handler that mirrors an input's value into `state`.
pub(crate) fn bind_input(state: &UseStateHandle<String>) -> Callback<InputEvent> {
    let state = state.clone();
    Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        state.set(input.value());
    })
}
