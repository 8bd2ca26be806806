// SPDX-License-Identifier: MPL-2.0

//! Multiselect widget builder and rendering.

use super::message::MultiselectMessage;
use super::state::{LoadingStatus, MultiselectState, Placement};
use crate::fl;
use cosmic::iced::widget::scrollable::Viewport;
use cosmic::iced::{Alignment, Length, Point};
use cosmic::prelude::*;
use cosmic::widget::{self, icon};
use std::rc::Rc;

/// Builder for the multiselect view.
///
/// ```ignore
/// LazyMultiselect::new(&self.authors, Message::Authors)
///     .width(Length::Fixed(260.0))
///     .into()
/// ```
pub struct LazyMultiselect<'a, Message>
where
    Message: Clone + 'static,
{
    state: &'a MultiselectState,
    on_message: Rc<dyn Fn(MultiselectMessage) -> Message + 'a>,
    id: Option<widget::Id>,
    width: Length,
    spacing: u16,
}

impl<'a, Message> LazyMultiselect<'a, Message>
where
    Message: Clone + 'static,
{
    pub fn new(
        state: &'a MultiselectState,
        on_message: impl Fn(MultiselectMessage) -> Message + 'a,
    ) -> Self {
        Self {
            state,
            on_message: Rc::new(on_message),
            id: None,
            width: Length::Fixed(240.0),
            spacing: 4,
        }
    }

    /// Sets the id of the anchor container, used to measure its bounds.
    pub fn id(mut self, id: widget::Id) -> Self {
        self.id = Some(id);
        self
    }

    pub fn width(mut self, width: Length) -> Self {
        self.width = width;
        self
    }

    pub fn spacing(mut self, spacing: u16) -> Self {
        self.spacing = spacing;
        self
    }

    fn message(&self, message: MultiselectMessage) -> Message {
        (self.on_message)(message)
    }

    /// Text for an option. A record without the display key is a caller bug.
    fn label(&self, option: &super::SelectOption) -> String {
        match self.state.display_text(option) {
            Ok(text) => text,
            Err(err) => {
                log::error!("{err}");
                String::from("?")
            }
        }
    }

    fn render_chips(&self) -> Option<Element<'a, Message>> {
        if self.state.selected().is_empty() {
            return None;
        }

        let chips = self
            .state
            .selected()
            .iter()
            .enumerate()
            .map(|(index, option)| -> Element<'a, Message> {
                let mut remove = widget::button::icon(icon::from_name("window-close-symbolic"));
                if !self.state.is_disabled() {
                    remove = remove.on_press(self.message(MultiselectMessage::Remove(index)));
                }

                widget::container(
                    widget::row::with_capacity(2)
                        .push(widget::text::caption(self.label(option)))
                        .push(remove)
                        .spacing(2)
                        .align_y(Alignment::Center),
                )
                .padding([0, 0, 0, 8])
                .class(cosmic::style::Container::Primary)
                .into()
            });

        Some(
            widget::row::with_children(chips)
                .spacing(self.spacing)
                .into(),
        )
    }

    fn render_input(&self) -> Element<'a, Message> {
        let mut input = widget::text_input(
            self.state.placeholder_text().to_string(),
            self.state.query().to_string(),
        )
        .width(Length::Fill);
        if !self.state.is_disabled() {
            let on_message = Rc::clone(&self.on_message);
            input = input
                .on_input(move |text| on_message(MultiselectMessage::QueryChanged(text)))
                .on_focus(self.message(MultiselectMessage::Open));
        }

        let indicator = if self.state.is_open() {
            "go-up-symbolic"
        } else {
            "go-down-symbolic"
        };
        let mut toggle = widget::button::icon(icon::from_name(indicator));
        if !self.state.is_disabled() {
            toggle = toggle.on_press(self.message(if self.state.is_open() {
                MultiselectMessage::Dismiss
            } else {
                MultiselectMessage::Open
            }));
        }

        widget::row::with_capacity(2)
            .push(input)
            .push(toggle)
            .spacing(self.spacing)
            .align_y(Alignment::Center)
            .into()
    }

    fn render_panel(&self, loading: LoadingStatus) -> Element<'a, Message> {
        let visible = self.state.visible_options();
        let mut column = widget::column::with_capacity(visible.len() + 2).spacing(2);

        for option in visible {
            let row = widget::container(widget::text::body(self.label(option)))
                .padding([6, 10])
                .width(Length::Fill);
            column = column.push(
                widget::mouse_area(row)
                    .on_press(self.message(MultiselectMessage::Select(option.clone()))),
            );
        }

        if self.state.offers_create() {
            column = column.push(
                widget::button::text(fl!("create-new", query = self.state.query()))
                    .on_press(self.message(MultiselectMessage::CreateNew)),
            );
        }

        match loading {
            LoadingStatus::Loading => {
                column = column.push(
                    widget::container(widget::text::caption(fl!("loading")))
                        .padding(8)
                        .width(Length::Fill),
                );
            }
            LoadingStatus::NoMore
                if self.state.visible_options().is_empty() && !self.state.offers_create() =>
            {
                column = column.push(
                    widget::container(widget::text::caption(fl!("no-options")))
                        .padding(8)
                        .width(Length::Fill),
                );
            }
            _ => {}
        }

        let on_message = Rc::clone(&self.on_message);
        let scrolled = move |viewport: Viewport| {
            on_message(MultiselectMessage::Scrolled(viewport.relative_offset().y))
        };

        widget::container(
            widget::scrollable(column)
                .on_scroll(scrolled)
                .height(Length::Fixed(self.state.height_of_panel())),
        )
        .padding(4)
        .width(self.width)
        .class(cosmic::style::Container::Card)
        .into()
    }

    /// Builds the widget and returns it as an Element.
    pub fn build(self) -> Element<'a, Message> {
        let mut column = widget::column::with_capacity(2).spacing(self.spacing);
        if let Some(chips) = self.render_chips() {
            column = column.push(chips);
        }
        column = column.push(self.render_input());

        let mut anchor = widget::container(column).width(self.width);
        if let Some(ref id) = self.id {
            anchor = anchor.id(id.clone());
        }

        let (Some(loading), Some(placement)) =
            (self.state.loading_status(), self.state.placement())
        else {
            return anchor.into();
        };

        let position = match placement {
            Placement::Below => widget::popover::Position::Bottom,
            Placement::Above => widget::popover::Position::Point(Point::new(
                0.0,
                -self.state.height_of_panel(),
            )),
        };

        let panel = self.render_panel(loading);
        widget::popover(anchor)
            .popup(panel)
            .position(position)
            .on_close(self.message(MultiselectMessage::Dismiss))
            .into()
    }
}

impl<'a, Message> From<LazyMultiselect<'a, Message>> for Element<'a, Message>
where
    Message: Clone + 'static,
{
    fn from(multiselect: LazyMultiselect<'a, Message>) -> Self {
        multiselect.build()
    }
}
