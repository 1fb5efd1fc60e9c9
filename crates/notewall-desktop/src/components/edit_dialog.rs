//! Edit dialog component
//!
//! The dialog is open while `buffer` holds a draft. Saving patches only the
//! title and content of the draft's target note.

use dioxus::prelude::*;

use notewall_core::board::{save_outcome, EditBuffer, SaveOutcome};

use crate::state::AppState;

/// Modal form for editing one note at a time
#[component]
pub fn EditDialog(buffer: Signal<Option<EditBuffer>>, save_error: Signal<Option<String>>) -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();
    let mut buffer = buffer;
    let mut save_error = save_error;

    let Some(draft) = buffer() else {
        return rsx! {};
    };

    let on_save = move |_: MouseEvent| {
        let Some(draft) = buffer() else {
            return;
        };
        let service = (state.notes_service)();
        spawn(async move {
            let target = draft.target_id.clone();
            let result = service.save(draft).await;

            let outcome = save_outcome(buffer.read().as_ref(), &target, result);
            match outcome {
                SaveOutcome::Close => {
                    save_error.set(None);
                    buffer.set(None);
                }
                SaveOutcome::ShowError(message) => save_error.set(Some(message)),
                SaveOutcome::Stale => {}
            }
        });
    };

    let on_cancel = move |_: MouseEvent| {
        buffer.set(None);
        save_error.set(None);
    };

    let on_keydown = move |evt: Event<KeyboardData>| {
        if evt.key() == Key::Escape {
            buffer.set(None);
            save_error.set(None);
        }
    };

    let error_text = save_error().unwrap_or_default();
    let has_error = !error_text.is_empty();

    let field_style = format!(
        "width: 100%; box-sizing: border-box; padding: 10px 12px; \
         border: 1px solid {}; border-radius: 6px; font-size: 14px; \
         background: {}; color: {}; outline: none;",
        colors.border, colors.bg_primary, colors.text_primary
    );

    rsx! {
        div {
            class: "edit-dialog-backdrop",
            style: "
                position: fixed;
                inset: 0;
                display: flex;
                align-items: center;
                justify-content: center;
                background: {colors.overlay};
                z-index: 100;
            ",
            onclick: on_cancel,
            onkeydown: on_keydown,

            div {
                class: "edit-dialog",
                style: "
                    width: 100%;
                    max-width: 448px;
                    padding: 24px;
                    border-radius: 8px;
                    background: {colors.bg_secondary};
                    box-shadow: 0 20px 40px rgba(0, 0, 0, 0.4);
                ",
                onclick: move |evt: MouseEvent| evt.stop_propagation(),

                h3 {
                    style: "
                        margin: 0 0 16px 0;
                        padding-bottom: 8px;
                        font-size: 22px;
                        font-weight: 700;
                        color: {colors.accent};
                        border-bottom: 1px solid {colors.border};
                    ",
                    "Edit Note"
                }

                div {
                    style: "display: flex; flex-direction: column; gap: 16px;",

                    input {
                        r#type: "text",
                        placeholder: "Note Title",
                        value: "{draft.title}",
                        autofocus: true,
                        style: "{field_style}",
                        oninput: move |evt: Event<FormData>| {
                            if let Some(open) = buffer.write().as_mut() {
                                open.title = evt.value();
                            }
                        },
                    }

                    textarea {
                        required: true,
                        rows: "6",
                        placeholder: "Update your note content...",
                        value: "{draft.content}",
                        style: "{field_style} resize: none;",
                        oninput: move |evt: Event<FormData>| {
                            if let Some(open) = buffer.write().as_mut() {
                                open.content = evt.value();
                            }
                        },
                    }
                }

                if has_error {
                    p {
                        style: "margin: 12px 0 0 0; font-size: 12px; color: {colors.error};",
                        "Could not save: {error_text}"
                    }
                }

                div {
                    style: "display: flex; justify-content: flex-end; gap: 12px; margin-top: 24px;",

                    button {
                        r#type: "button",
                        style: "
                            padding: 8px 16px;
                            border: none;
                            border-radius: 6px;
                            background: transparent;
                            color: {colors.text_secondary};
                            cursor: pointer;
                        ",
                        onclick: on_cancel,
                        "Cancel"
                    }
                    button {
                        r#type: "button",
                        style: "
                            padding: 8px 24px;
                            border: none;
                            border-radius: 6px;
                            background: {colors.accent};
                            color: {colors.accent_text};
                            font-weight: 600;
                            cursor: pointer;
                        ",
                        onclick: on_save,
                        "Update"
                    }
                }
            }
        }
    }
}
