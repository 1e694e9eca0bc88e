use std::cell::RefCell;
use std::rc::Rc;

use yew::prelude::*;

use crate::api::{HttpClient, Identity};
use crate::config::AppConfig;
use crate::pages::auth::AuthScreen;
use crate::pages::dashboard::DashboardPage;
use crate::session::{BrowserStore, SessionMachine, SessionStatus};

/// Shared handle to the one session machine. Equality is identity.
#[derive(Clone)]
pub struct SessionHandle(pub Rc<RefCell<SessionMachine<BrowserStore>>>);

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Properties, PartialEq)]
struct LayoutProps {
    children: Children,
    email: Option<String>,
    on_logout: Callback<()>,
}

#[function_component(Layout)]
fn layout(props: &LayoutProps) -> Html {
    let on_logout = {
        let on_logout = props.on_logout.clone();
        Callback::from(move |_| on_logout.emit(()))
    };

    html! {
        <div class="app-shell">
            <header class="app-header">
                <span class="app-brand">{"FinEase"}</span>
                <div class="app-header__user">
                    if let Some(email) = &props.email {
                        <span class="app-header__email">{ email.clone() }</span>
                    }
                    <button class="btn btn--ghost" onclick={on_logout}>{"Log Out"}</button>
                </div>
            </header>
            <main class="app-main">
                { for props.children.iter() }
            </main>
        </div>
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_state(AppConfig::from_env);
    let session = {
        let scope = config.session_scope;
        use_mut_ref(move || SessionMachine::new(BrowserStore::new(scope), scope))
    };
    let status = {
        let session = session.clone();
        use_state(move || session.borrow_mut().restore_on_load())
    };
    let email = {
        let session = session.clone();
        use_state(move || session.borrow().identity().map(|id| id.email.clone()))
    };

    let client = HttpClient::new(config.api_base.clone());
    let handle = SessionHandle(session.clone());

    let on_authenticated = {
        let status = status.clone();
        let email = email.clone();
        Callback::from(move |identity: Identity| {
            email.set(Some(identity.email));
            status.set(SessionStatus::Authenticated);
        })
    };

    let on_logout = {
        let session = session.clone();
        let status = status.clone();
        let email = email.clone();
        Callback::from(move |_| {
            session.borrow_mut().logout();
            email.set(None);
            status.set(SessionStatus::Unauthenticated);
        })
    };

    if *status == SessionStatus::Unauthenticated {
        return html! {
            <AuthScreen session={handle} client={client} on_authenticated={on_authenticated} />
        };
    }

    html! {
        <ContextProvider<AppConfig> context={(*config).clone()}>
            <Layout email={(*email).clone()} on_logout={on_logout}>
                <DashboardPage />
            </Layout>
        </ContextProvider<AppConfig>>
    }
}
