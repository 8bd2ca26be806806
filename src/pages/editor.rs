// SPDX-License-Identifier: MPL-2.0

//! New book editor.

use crate::api::{Book, NewBook};
use crate::app::Message;
use crate::fl;
use crate::widgets::multiselect::{
    LazyMultiselect, MultiselectError, MultiselectEvent, MultiselectMessage, MultiselectState,
    SelectOption,
};
use cosmic::iced::{Alignment, Length};
use cosmic::prelude::*;
use cosmic::widget;
use std::time::Duration;

/// Id of the author picker anchor.
pub fn authors_anchor() -> widget::Id {
    widget::Id::new("editor-authors")
}

/// Id of the language picker anchor.
pub fn language_anchor() -> widget::Id {
    widget::Id::new("editor-language")
}

#[derive(Debug, Clone)]
pub enum EditorMsg {
    TitleChanged(String),
    SubtitleChanged(String),
    Authors(MultiselectMessage),
    Language(MultiselectMessage),
    AuthorCreated(Result<SelectOption, String>),
    Save,
    Saved(Result<Book, String>),
    Reset,
}

#[derive(Debug)]
pub struct EditorState {
    pub title: String,
    pub subtitle: String,
    pub authors: MultiselectState,
    pub language: MultiselectState,
    pub saving: bool,
}

impl EditorState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            authors: MultiselectState::new("author")
                .display_key("fullName")
                .placeholder(fl!("search-authors"))
                .remote()
                .creatable(true)
                .debounce(debounce),
            language: MultiselectState::new("language")
                .placeholder(fl!("pick-language"))
                .selection_limit(1)
                .debounce(debounce),
            saving: false,
        }
    }

    pub fn set_debounce(&mut self, delay: Duration) {
        self.authors.set_debounce(delay);
        self.language.set_debounce(delay);
    }

    /// Marks a save as in flight; the pickers are disabled meanwhile.
    pub fn set_saving(&mut self, saving: bool) {
        self.saving = saving;
        self.authors.set_disabled(saving);
        self.language.set_disabled(saving);
    }

    /// A book can be saved once it has a title and nothing is in flight.
    pub fn can_save(&self) -> bool {
        !self.saving && !self.title.trim().is_empty()
    }

    pub fn draft(&self) -> NewBook {
        NewBook {
            title: self.title.trim().to_string(),
            subtitle: self.subtitle.trim().to_string(),
            author: self.authors.selected().to_vec(),
            language: self.language.selected().to_vec(),
        }
    }

    /// Adds a freshly created author to the selection.
    pub fn add_author(
        &mut self,
        author: SelectOption,
    ) -> Result<Vec<MultiselectEvent>, MultiselectError> {
        self.authors.update(MultiselectMessage::Select(author))
    }

    /// Clears every input. The pickers emit their empty value once.
    pub fn reset(&mut self) -> Result<(), MultiselectError> {
        self.title.clear();
        self.subtitle.clear();
        self.set_saving(false);
        for picker in [&mut self.authors, &mut self.language] {
            picker.update(MultiselectMessage::SetReset(true))?;
            picker.update(MultiselectMessage::SetReset(false))?;
        }
        Ok(())
    }
}

/// View for the New Book page
pub fn view(state: &EditorState, space_s: u16, space_m: u16) -> Element<'_, Message> {
    let header = widget::text::title1(fl!("new-book"));

    let form = cosmic::widget::settings::section()
        .title(fl!("book-details"))
        .add(
            cosmic::widget::settings::item::builder(fl!("column-title")).control(
                widget::text_input(fl!("title-placeholder"), &state.title)
                    .on_input(|text| Message::Editor(EditorMsg::TitleChanged(text)))
                    .width(Length::Fixed(300.0)),
            ),
        )
        .add(
            cosmic::widget::settings::item::builder(fl!("column-subtitle")).control(
                widget::text_input("", &state.subtitle)
                    .on_input(|text| Message::Editor(EditorMsg::SubtitleChanged(text)))
                    .width(Length::Fixed(300.0)),
            ),
        )
        .add(
            cosmic::widget::settings::item::builder(fl!("column-author"))
                .description(fl!("author-description"))
                .control(
                    LazyMultiselect::new(&state.authors, |msg| {
                        Message::Editor(EditorMsg::Authors(msg))
                    })
                    .id(authors_anchor())
                    .width(Length::Fixed(300.0)),
                ),
        )
        .add(
            cosmic::widget::settings::item::builder(fl!("column-language")).control(
                LazyMultiselect::new(&state.language, |msg| {
                    Message::Editor(EditorMsg::Language(msg))
                })
                .id(language_anchor())
                .width(Length::Fixed(300.0)),
            ),
        );

    let mut save = widget::button::suggested(if state.saving {
        fl!("saving")
    } else {
        fl!("save")
    });
    if state.can_save() {
        save = save.on_press(Message::Editor(EditorMsg::Save));
    }

    let buttons = widget::row::with_capacity(2)
        .push(save)
        .push(widget::button::standard(fl!("reset")).on_press(Message::Editor(EditorMsg::Reset)))
        .spacing(space_s)
        .align_y(Alignment::Center);

    widget::scrollable(
        widget::column::with_capacity(3)
            .push(header)
            .push(form)
            .push(buttons)
            .spacing(space_m)
            .width(Length::Fill),
    )
    .height(Length::Fill)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn author(name: &str) -> SelectOption {
        SelectOption::record([("fullName", json!(name))])
    }

    #[test]
    fn test_created_author_joins_selection() {
        let mut state = EditorState::new(Duration::from_millis(300));
        state.add_author(author("Janko Kráľ")).unwrap();
        state.add_author(author("Janko Kráľ")).unwrap();
        assert_eq!(state.authors.selected(), &[author("Janko Kráľ")]);
    }

    #[test]
    fn test_draft_and_can_save() {
        let mut state = EditorState::new(Duration::from_millis(300));
        assert!(!state.can_save());
        state.title = "  Marína ".to_string();
        assert!(state.can_save());

        state
            .language
            .update(MultiselectMessage::Select("SK".into()))
            .unwrap();
        // Limit of one: the second pick is ignored.
        state
            .language
            .update(MultiselectMessage::Select("CZ".into()))
            .unwrap();

        let draft = state.draft();
        assert_eq!(draft.title, "Marína");
        assert_eq!(draft.language, vec![SelectOption::from("SK")]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = EditorState::new(Duration::from_millis(300));
        state.title = "Marína".to_string();
        state.add_author(author("Andrej Sládkovič")).unwrap();
        state.reset().unwrap();
        assert!(state.title.is_empty());
        assert!(state.authors.selected().is_empty());
    }

    #[test]
    fn test_pickers_locked_while_saving() {
        let mut state = EditorState::new(Duration::from_millis(300));
        state.set_saving(true);
        assert!(state.authors.is_disabled());
        let events = state
            .language
            .update(MultiselectMessage::Select("SK".into()))
            .unwrap();
        assert!(events.is_empty());
        state.set_saving(false);
        assert!(!state.language.is_disabled());
    }
}
