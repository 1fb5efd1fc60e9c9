//! Note board component
//!
//! Owns one live feed for its lifetime and renders whichever presentation
//! state the feed is in. The card list is never edited locally; edits and
//! deletes show up when the store pushes the next snapshot.

use std::rc::Rc;

use dioxus::prelude::*;

use notewall_core::board::{masonry_css, EditBuffer, BOARD_CLASS, CARD_CLASS};
use notewall_core::query::NoteFilters;
use notewall_core::{BoardView, FeedState, NoteId};

use super::{EditDialog, NoteCard};
use crate::state::AppState;
use crate::theme::ColorPalette;

/// Live board of the signed-in user's notes, narrowed by `filters`
#[component]
pub fn NoteBoard(filters: NoteFilters) -> Element {
    let state = use_context::<AppState>();
    let colors = (state.theme)().palette();

    let mut feed_state = use_signal(FeedState::default);
    let mut editing = use_signal(|| None::<EditBuffer>);
    let mut save_error = use_signal(|| None::<String>);

    // Dropped with the component, which releases the subscription off-thread
    let feed = use_hook(|| Rc::new((state.notes_service)().new_feed().spawn()));

    // Mirror the feed's watch channel into a signal
    let watched = Rc::clone(&feed);
    use_future(move || {
        let mut receiver = watched.watch();
        async move {
            feed_state.set(receiver.borrow_and_update().clone());
            while receiver.changed().await.is_ok() {
                let next = receiver.borrow_and_update().clone();
                feed_state.set(next);
            }
        }
    });

    // (Re)subscribe whenever the caller hands us a different filter set
    let active = Rc::clone(&feed);
    use_effect(use_reactive((&filters,), move |(filters,)| {
        active.set_filters(filters);
    }));

    let board_css = format!("{}{}", masonry_css(), card_css(colors));
    let current = feed_state.read().clone();

    let body = match current.view() {
        BoardView::Loading => centered_message("Loading notes...", colors.text_muted),
        BoardView::Error(message) => {
            centered_message(&format!("Error: {message}"), colors.error)
        }
        BoardView::Empty => centered_message("No notes found", colors.text_muted),
        BoardView::Populated(notes) => rsx! {
            div {
                class: BOARD_CLASS,
                style: "padding: 32px;",
                for note in notes.iter().cloned() {
                    {
                        let key = note.id.to_string();
                        rsx! {
                            NoteCard {
                                key: "{key}",
                                note,
                                onedit: move |buffer: EditBuffer| {
                                    save_error.set(None);
                                    editing.set(Some(buffer));
                                },
                                ondelete: move |id: NoteId| {
                                    let service = (state.notes_service)();
                                    spawn(async move {
                                        service.delete(id).await;
                                    });
                                },
                            }
                        }
                    }
                }
            }
        },
    };

    rsx! {
        style { "{board_css}" }
        EditDialog { buffer: editing, save_error }
        {body}
    }
}

fn centered_message(message: &str, color: &str) -> Element {
    rsx! {
        div {
            style: "
                flex: 1;
                display: flex;
                align-items: center;
                justify-content: center;
                min-height: 60vh;
            ",
            p {
                style: "margin: 0; color: {color};",
                "{message}"
            }
        }
    }
}

/// Hover rules that inline styles cannot express
fn card_css(colors: &ColorPalette) -> String {
    format!(
        ".{CARD_CLASS} {{ transition: box-shadow 0.2s; }}\n\
         .{CARD_CLASS}:hover {{ box-shadow: 0 8px 20px rgba(0, 0, 0, 0.35); }}\n\
         .note-card-action:hover {{ background: {}; }}\n",
        colors.card_hover
    )
}
