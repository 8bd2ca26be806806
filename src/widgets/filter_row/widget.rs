// SPDX-License-Identifier: MPL-2.0

//! Filter row view builder.

use super::field::{FieldKind, FilterField, NumericOperator, Ternary};
use super::message::FilterRowMessage;
use super::state::FilterRowState;
use crate::fl;
use crate::widgets::multiselect::LazyMultiselect;
use cosmic::iced::{Alignment, Length};
use cosmic::prelude::*;
use cosmic::widget;
use std::rc::Rc;

/// Id of the container anchoring a field's multiselect, used for measuring.
pub fn anchor_id(field: &str) -> widget::Id {
    widget::Id::new(format!("filter-{field}"))
}

/// Builder for the filter row.
pub struct FilterRow<'a, Message>
where
    Message: Clone + 'static,
{
    state: &'a FilterRowState,
    on_message: Rc<dyn Fn(FilterRowMessage) -> Message + 'a>,
    per_row: usize,
    spacing: u16,
}

impl<'a, Message> FilterRow<'a, Message>
where
    Message: Clone + 'static,
{
    pub fn new(
        state: &'a FilterRowState,
        on_message: impl Fn(FilterRowMessage) -> Message + 'a,
    ) -> Self {
        Self {
            state,
            on_message: Rc::new(on_message),
            per_row: 4,
            spacing: 12,
        }
    }

    /// Number of filter cells per row.
    pub fn per_row(mut self, per_row: usize) -> Self {
        self.per_row = per_row.max(1);
        self
    }

    pub fn spacing(mut self, spacing: u16) -> Self {
        self.spacing = spacing;
        self
    }

    fn message(&self, message: FilterRowMessage) -> Message {
        (self.on_message)(message)
    }

    fn render_multiselect(&self, field: &FilterField) -> Element<'a, Message> {
        let Some(state) = self.state.multiselect(&field.key) else {
            return widget::text::caption(fl!("no-options")).into();
        };
        let on_message = Rc::clone(&self.on_message);
        let key = field.key.clone();
        LazyMultiselect::new(state, move |message| {
            on_message(FilterRowMessage::Multiselect {
                field: key.clone(),
                message,
            })
        })
        .id(anchor_id(&field.key))
        .width(Length::Fill)
        .into()
    }

    fn render_text(&self, field: &FilterField) -> Element<'a, Message> {
        let on_message = Rc::clone(&self.on_message);
        let key = field.key.clone();
        widget::text_input(fl!("filter-placeholder"), self.state.text(&field.key).to_string())
            .on_input(move |value| {
                on_message(FilterRowMessage::TextChanged {
                    field: key.clone(),
                    value,
                })
            })
            .width(Length::Fill)
            .into()
    }

    fn render_numeric(&self, field: &FilterField) -> Element<'a, Message> {
        let current = self.state.operator(&field.key);
        let mut row = widget::row::with_capacity(NumericOperator::ALL.len() + 1)
            .spacing(2)
            .align_y(Alignment::Center);

        for operator in NumericOperator::ALL {
            let class = if operator == current {
                cosmic::theme::Button::Suggested
            } else {
                cosmic::theme::Button::Standard
            };
            row = row.push(
                widget::button::text(operator.symbol().to_string())
                    .class(class)
                    .on_press(self.message(FilterRowMessage::OperatorChanged {
                        field: field.key.clone(),
                        operator,
                    })),
            );
        }

        let on_message = Rc::clone(&self.on_message);
        let key = field.key.clone();
        row.push(
            widget::text_input("", self.state.number(&field.key).to_string())
                .on_input(move |value| {
                    // Digits and a decimal separator only.
                    let value: String = value
                        .chars()
                        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
                        .collect();
                    on_message(FilterRowMessage::NumberChanged {
                        field: key.clone(),
                        value,
                    })
                })
                .width(Length::Fill),
        )
        .into()
    }

    fn render_boolean(&self, field: &FilterField) -> Element<'a, Message> {
        let current = self.state.ternary(&field.key);
        let buttons = Ternary::ALL.into_iter().map(|value| -> Element<'a, Message> {
            let label = match value {
                Ternary::Unset => fl!("ternary-any"),
                Ternary::Yes => fl!("ternary-yes"),
                Ternary::No => fl!("ternary-no"),
            };
            let class = if value == current {
                cosmic::theme::Button::Suggested
            } else {
                cosmic::theme::Button::Standard
            };
            widget::button::text(label)
                .class(class)
                .on_press(self.message(FilterRowMessage::TernaryChanged {
                    field: field.key.clone(),
                    value,
                }))
                .into()
        });
        widget::row::with_children(buttons).spacing(2).into()
    }

    fn render_cell(&self, field: &FilterField) -> Element<'a, Message> {
        let control = match field.kind {
            FieldKind::MultiSelect => self.render_multiselect(field),
            FieldKind::Text => self.render_text(field),
            FieldKind::Numeric => self.render_numeric(field),
            FieldKind::Boolean => self.render_boolean(field),
        };
        widget::column::with_capacity(2)
            .push(widget::text::caption(field.label.clone()))
            .push(control)
            .spacing(4)
            .width(Length::FillPortion(1))
            .into()
    }

    /// Builds the widget and returns it as an Element.
    pub fn build(self) -> Element<'a, Message> {
        if !self.state.is_shown() {
            return widget::Space::with_height(Length::Shrink).into();
        }

        if self.state.is_loading() {
            return widget::container(widget::text::body(fl!("loading-filters")))
                .padding(12)
                .width(Length::Fill)
                .class(cosmic::style::Container::Card)
                .into();
        }

        let mut column = widget::column::with_capacity(self.state.fields().len() / self.per_row + 2)
            .spacing(self.spacing);

        for chunk in self.state.fields().chunks(self.per_row) {
            let mut row = widget::row::with_capacity(self.per_row).spacing(self.spacing);
            for field in chunk {
                row = row.push(self.render_cell(field));
            }
            // Pad the last row so cells keep their width.
            for _ in chunk.len()..self.per_row {
                row = row.push(widget::Space::with_width(Length::FillPortion(1)));
            }
            column = column.push(row);
        }

        column = column.push(
            widget::row::with_capacity(2)
                .push(widget::Space::with_width(Length::Fill))
                .push(
                    widget::button::standard(fl!("clear-filters"))
                        .on_press(self.message(FilterRowMessage::Clear)),
                ),
        );

        widget::container(column)
            .padding(12)
            .width(Length::Fill)
            .class(cosmic::style::Container::Card)
            .into()
    }
}

impl<'a, Message> From<FilterRow<'a, Message>> for Element<'a, Message>
where
    Message: Clone + 'static,
{
    fn from(filter_row: FilterRow<'a, Message>) -> Self {
        filter_row.build()
    }
}
