//! アップロードエリアコンポーネント

use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use teavision_common::ImageItem;
use web_sys::{DragEvent, FileList, HtmlInputElement};

#[component]
pub fn UploadArea<F>(
    /// 複数選択
    multiple: bool,
    on_images_added: F,
) -> impl IntoView
where
    F: Fn(Vec<ImageItem>) + 'static + Clone + Send + Sync,
{
    let (is_dragover, set_is_dragover) = signal(false);
    let input_ref = NodeRef::<Input>::new();

    let on_drop = {
        let on_images_added = on_images_added.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            set_is_dragover.set(false);
            if let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) {
                read_files(files, multiple, on_images_added.clone());
            }
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(true);
    };

    let on_change = move |ev: leptos::ev::Event| {
        let input = event_target::<HtmlInputElement>(&ev);
        if let Some(files) = input.files() {
            read_files(files, multiple, on_images_added.clone());
        }
        // 同じファイルを選び直せるように
        input.set_value("");
    };

    view! {
        <div
            class=move || if is_dragover.get() { "upload-area dragover" } else { "upload-area" }
            on:drop=on_drop
            on:dragover=on_dragover
            on:dragleave=move |_: DragEvent| set_is_dragover.set(false)
            on:click=move |_| {
                if let Some(input) = input_ref.get() {
                    input.click();
                }
            }
        >
            <input
                node_ref=input_ref
                type="file"
                accept="image/*"
                multiple=multiple
                style="display: none"
                on:change=on_change
            />
            <div class="upload-icon">"📷"</div>
            <p>"Drag & drop or click to select tea images"</p>
            <p class="text-muted">"Supported: JPEG, PNG, WebP"</p>
        </div>
    }
}

fn read_files<F>(files: FileList, multiple: bool, on_images_added: F)
where
    F: Fn(Vec<ImageItem>) + 'static,
{
    let limit = if multiple { files.length() } else { files.length().min(1) };
    let files: Vec<web_sys::File> = (0..limit).filter_map(|i| files.get(i)).collect();

    spawn_local(async move {
        let mut items = Vec::with_capacity(files.len());
        for file in files {
            let file_name = file.name();
            let mime = match file.type_() {
                t if t.is_empty() => "image/jpeg".to_string(),
                t => t,
            };
            let preview = web_sys::Url::create_object_url_with_blob(&file).ok();
            let file = gloo::file::File::from(file);
            match gloo::file::futures::read_as_bytes(&file).await {
                Ok(bytes) => {
                    let mut item = ImageItem::new(file_name, bytes, mime);
                    item.preview = preview;
                    items.push(item);
                }
                Err(e) => gloo::console::warn!(format!("failed to read {}: {}", file_name, e)),
            }
        }
        on_images_added(items);
    });
}
