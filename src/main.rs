use eframe::CreationContext;
use log::info;

use vgu::app::GraffitiApp;
use vgu::utils::config::AppConfig;
use vgu::vk::VkApi;

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let api = match VkApi::new(config.access_token) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // The identity lookup doubles as the token check; a bad token stops the
    // program before any window opens.
    let user = match api.fetch_identity() {
        Ok(user) => user,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    info!(
        "authenticated as {} {} (id {})",
        user.first_name, user.last_name, user.id
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([340.0, 480.0])
            .with_min_inner_size([300.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "VK Graffiti Uploader",
        options,
        Box::new(move |cc: &CreationContext| Box::new(GraffitiApp::new(cc, api, user))),
    )
}
