use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::api::{HttpClient, Identity};
use crate::app::SessionHandle;
use crate::error::AuthError;
use crate::inflight::Action;
use crate::pages::bind_input;
use crate::session;

#[derive(Properties, PartialEq)]
pub struct AuthScreenProps {
    pub session: SessionHandle,
    pub client: HttpClient,
    pub on_authenticated: Callback<Identity>,
}

#[function_component(AuthScreen)]
pub fn auth_screen(props: &AuthScreenProps) -> Html {
    let is_login = use_state(|| true);
    let email = use_state(|| "".to_string());
    let password = use_state(|| "".to_string());
    let confirm_password = use_state(|| "".to_string());
    let error = use_state(|| None::<String>);
    let notice = use_state(|| None::<String>);
    let loading = use_state(|| false);

    let on_submit = {
        let is_login = is_login.clone();
        let email = email.clone();
        let password = password.clone();
        let confirm_password = confirm_password.clone();
        let error = error.clone();
        let notice = notice.clone();
        let loading = loading.clone();
        let handle = props.session.clone();
        let client = props.client.clone();
        let on_authenticated = props.on_authenticated.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *loading {
                return;
            }

            let email_val = (*email).clone();
            let password_val = (*password).clone();
            let confirm_val = (*confirm_password).clone();
            let login_mode = *is_login;

            loading.set(true);
            error.set(None);
            notice.set(None);

            let handle = handle.clone();
            let client = client.clone();
            let on_authenticated = on_authenticated.clone();
            let is_login = is_login.clone();
            let password = password.clone();
            let confirm_password = confirm_password.clone();
            let error = error.clone();
            let notice = notice.clone();
            let loading = loading.clone();
            spawn_local(async move {
                if login_mode {
                    match session::login(&handle.0, &client, &email_val, &password_val).await {
                        Ok(identity) => on_authenticated.emit(identity),
                        Err(AuthError::Stale) => {}
                        Err(err) => error.set(Some(err.to_string())),
                    }
                } else {
                    let result = session::register(
                        &handle.0,
                        &client,
                        &email_val,
                        &password_val,
                        &confirm_val,
                    )
                    .await;
                    match result {
                        Ok(()) => {
                            password.set("".to_string());
                            confirm_password.set("".to_string());
                            is_login.set(true);
                            notice.set(Some("Account created. Please log in.".to_string()));
                        }
                        Err(AuthError::Stale) => {}
                        Err(err) => error.set(Some(err.to_string())),
                    }
                }
                loading.set(false);
            });
        })
    };

    let toggle_mode = {
        let is_login = is_login.clone();
        let error = error.clone();
        let notice = notice.clone();
        Callback::from(move |_| {
            is_login.set(!*is_login);
            error.set(None);
            notice.set(None);
        })
    };

    let pending_label = if *is_login {
        Action::Login.pending_label()
    } else {
        Action::Register.pending_label()
    };

    html! {
        <div class="auth-container">
            <div class="auth-card">
                <h1 class="auth-card__title">{ if *is_login { "Welcome back" } else { "Create account" } }</h1>
                <p class="auth-card__subtitle">
                    { if *is_login { "Sign in to analyse your finances." } else { "Register your organization." } }
                </p>

                <form class="auth-form" onsubmit={on_submit}>
                    <label class="field">
                        <span>{"Email"}</span>
                        <input type="email" value={(*email).clone()} oninput={bind_input(&email)} />
                    </label>
                    <label class="field">
                        <span>{"Password"}</span>
                        <input type="password" value={(*password).clone()} oninput={bind_input(&password)} />
                    </label>

                    if !*is_login {
                        <label class="field">
                            <span>{"Confirm Password"}</span>
                            <input
                                type="password"
                                value={(*confirm_password).clone()}
                                oninput={bind_input(&confirm_password)}
                            />
                        </label>
                    }

                    if let Some(msg) = &*error {
                        <div class="status status--error">{ msg.clone() }</div>
                    }
                    if let Some(msg) = &*notice {
                        <div class="status status--ok">{ msg.clone() }</div>
                    }

                    <button type="submit" class="btn btn--primary" disabled={*loading}>
                        { if *loading { pending_label } else if *is_login { "Login" } else { "Register" } }
                    </button>
                </form>

                <div class="auth-card__switch">
                    { if *is_login { "No account?" } else { "Already registered?" } }
                    <button class="btn btn--link" onclick={toggle_mode}>
                        { if *is_login { "Register" } else { "Login" } }
                    </button>
                </div>
            </div>
        </div>
    }
}
