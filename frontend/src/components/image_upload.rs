use log::warn;
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, HtmlInputElement};
use yew::prelude::*;

use crate::upload::{read_image, UploadError, UploadLimits};

#[derive(Properties, PartialEq)]
pub struct ImageUploadProps {
    /// Receives the data URL of the chosen image, or why it was refused.
    pub on_change: Callback<Result<String, UploadError>>,
    #[prop_or_default]
    pub limits: UploadLimits,
}

/// File input that also accepts an image dropped onto it.
#[function_component(ImageUpload)]
pub fn image_upload(props: &ImageUploadProps) -> Html {
    let preview = use_state(|| None::<String>);
    let error = use_state(|| None::<UploadError>);
    let dragging = use_state(|| false);

    let handle_file = {
        let preview = preview.clone();
        let error = error.clone();
        let on_change = props.on_change.clone();
        let limits = props.limits.clone();
        Callback::from(move |file: File| {
            let preview = preview.clone();
            let error = error.clone();
            let on_change = on_change.clone();
            let limits = limits.clone();
            spawn_local(async move {
                let result = read_image(&file, &limits).await;
                match &result {
                    Ok(data_url) => {
                        preview.set(Some(data_url.clone()));
                        error.set(None);
                    }
                    Err(err) => {
                        warn!("Image rejected: {}", err);
                        error.set(Some(err.clone()));
                    }
                }
                on_change.emit(result);
            });
        })
    };

    let onchange = {
        let handle_file = handle_file.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                handle_file.emit(file);
            }
        })
    };

    let ondragover = {
        let dragging = dragging.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            dragging.set(true);
        })
    };

    let ondragleave = {
        let dragging = dragging.clone();
        Callback::from(move |_: DragEvent| dragging.set(false))
    };

    let ondrop = {
        let dragging = dragging.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            dragging.set(false);
            let file = e
                .data_transfer()
                .and_then(|transfer| transfer.files())
                .and_then(|files| files.get(0));
            if let Some(file) = file {
                handle_file.emit(file);
            }
        })
    };

    html! {
        <div
            class={classes!("image-upload", (*dragging).then(|| "dragging"))}
            {ondragover}
            {ondragleave}
            {ondrop}
        >
            <input type="file" accept={props.limits.accepted.join(",")} {onchange} />
            {
                if let Some(src) = (*preview).clone() {
                    html! { <img class="image-upload-preview" {src} alt="Selected image preview" /> }
                } else {
                    html! {}
                }
            }
            {
                if let Some(err) = (*error).as_ref() {
                    html! { <p class="image-upload-error">{err.to_string()}</p> }
                } else {
                    html! {}
                }
            }
        </div>
    }
}
