use finease::app::App;
use finease::config::AppConfig;

fn main() {
    if let Some(level) = AppConfig::from_env().console_level() {
        wasm_logger::init(wasm_logger::Config::new(level));
    }
    yew::Renderer::<App>::new().render();
}
