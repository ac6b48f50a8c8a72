use yew::prelude::*;
use log::{info, warn};

mod config;
mod upload;
mod animation {
    pub mod stat;
    pub mod count_up;
    pub mod visibility;
}
mod components {
    pub mod count_up;
    pub mod image_upload;
    pub mod stats_section;
}

use components::{
    image_upload::ImageUpload,
    stats_section::{Reveal, StatsSection},
};
use upload::UploadError;


#[function_component]
fn App() -> Html {
    let on_photo = Callback::from(|result: Result<String, UploadError>| {
        match result {
            Ok(data_url) => info!("Property photo selected ({} chars)", data_url.len()),
            Err(err) => warn!("Property photo rejected: {}", err),
        }
    });

    html! {
        <main class="agency-site">
            <StatsSection />
            <Reveal class="photo-upload">
                <h2>{"Send us a photo of your property"}</h2>
                <ImageUpload on_change={on_photo} />
            </Reveal>
        </main>
    }
}


fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
