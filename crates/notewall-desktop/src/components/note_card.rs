//! Note card component

use dioxus::prelude::*;

use notewall_core::board::{card_height, EditBuffer, CARD_CLASS};
use notewall_core::{Note, NoteId};

use crate::state::AppState;

const EDIT_ICON_PATH: &str = "M11 5H6a2 2 0 00-2 2v11a2 2 0 002 2h11a2 2 0 002-2v-5m-1.414-9.414a2 2 0 112.828 2.828L11.828 15H9v-2.828l8.586-8.586z";
const DELETE_ICON_PATH: &str = "M19 7l-.867 12.142A2 2 0 0116.138 21H7.862a2 2 0 01-1.995-1.858L5 7m5 4v6m4-6v6m1-10V4a1 1 0 00-1-1h-4a1 1 0 00-1 1v3M4 7h16";

/// A single fixed-height card with edit and delete actions
#[component]
pub fn NoteCard(
    note: Note,
    onedit: EventHandler<EditBuffer>,
    ondelete: EventHandler<NoteId>,
) -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    let height = card_height(note.note_content.as_deref());
    let title = note.display_title().unwrap_or_default().to_string();
    let has_title = !title.is_empty();
    let content = note.display_content().to_string();
    let buffer = EditBuffer::from_note(&note);
    let id = note.id.clone();
    let action_css = action_style(colors.text_secondary);

    rsx! {
        div {
            class: CARD_CLASS,
            style: "
                height: {height}px;
                display: flex;
                flex-direction: column;
                overflow: hidden;
                background: {colors.card_bg};
                border: 1px solid {colors.border};
                border-radius: 8px;
                box-shadow: 0 2px 6px rgba(0, 0, 0, 0.25);
            ",

            div {
                style: "padding: 16px 16px 8px 16px; flex: 1; overflow: hidden;",

                if has_title {
                    h2 {
                        style: "
                            margin: 0 0 8px 0;
                            font-size: 16px;
                            font-weight: 600;
                            color: {colors.text_primary};
                            display: -webkit-box;
                            -webkit-line-clamp: 2;
                            -webkit-box-orient: vertical;
                            overflow: hidden;
                        ",
                        "{title}"
                    }
                }

                p {
                    style: "
                        margin: 0;
                        font-size: 13px;
                        color: {colors.text_secondary};
                        white-space: pre-wrap;
                        overflow: hidden;
                        max-height: calc(100% - 40px);
                    ",
                    "{content}"
                }
            }

            div {
                style: "
                    padding: 8px;
                    display: flex;
                    justify-content: flex-end;
                    gap: 4px;
                    background: {colors.card_footer};
                    border-top: 1px solid {colors.border_light};
                ",

                button {
                    class: "note-card-action",
                    title: "Edit note",
                    style: "{action_css}",
                    onclick: move |_| onedit.call(buffer.clone()),
                    CardIcon { path: EDIT_ICON_PATH }
                }
                button {
                    class: "note-card-action",
                    title: "Delete note",
                    style: "{action_css}",
                    onclick: move |_| ondelete.call(id.clone()),
                    CardIcon { path: DELETE_ICON_PATH }
                }
            }
        }
    }
}

fn action_style(color: &str) -> String {
    format!(
        "padding: 8px; border: none; border-radius: 9999px; background: transparent; \
         color: {color}; cursor: pointer; display: flex;"
    )
}

#[component]
fn CardIcon(path: &'static str) -> Element {
    rsx! {
        svg {
            "xmlns": "http://www.w3.org/2000/svg",
            "width": "16",
            "height": "16",
            "fill": "none",
            "viewBox": "0 0 24 24",
            "stroke": "currentColor",
            path {
                "stroke-linecap": "round",
                "stroke-linejoin": "round",
                "stroke-width": "2",
                "d": "{path}",
            }
        }
    }
}
