// SPDX-License-Identifier: MPL-2.0

//! Shared widgets for the Kniznica application pages.

use super::books::{COLUMNS, cell_text, column_label};
use crate::api::Book;
use crate::app::{ConnectionStatus, Message, Notification, NotificationLevel};
use crate::fl;
use cosmic::iced::{Alignment, Length};
use cosmic::prelude::*;
use cosmic::widget::{self, icon};

/// Connection status badge widget
pub fn connection_status_badge(status: &ConnectionStatus) -> Element<'static, Message> {
    match status {
        ConnectionStatus::Disconnected => {
            widget::button::custom(widget::text::body(fl!("disconnected")))
                .class(cosmic::theme::Button::Standard)
                .into()
        }
        ConnectionStatus::Connecting => {
            widget::button::custom(widget::text::body(fl!("connecting")))
                .class(cosmic::theme::Button::Standard)
                .into()
        }
        ConnectionStatus::Connected => widget::button::custom(
            widget::row::with_capacity(2)
                .push(icon::from_name("object-select-symbolic").size(16))
                .push(widget::text::body(fl!("connected")))
                .spacing(4)
                .align_y(Alignment::Center),
        )
        .class(cosmic::theme::Button::Suggested)
        .into(),
        ConnectionStatus::Error(_) => widget::button::custom(widget::text::body(fl!("error")))
            .class(cosmic::theme::Button::Destructive)
            .into(),
    }
}

/// Notification toast widget
pub fn notification_toast(notification: &Notification) -> Element<'_, Message> {
    let id = notification.id;

    let level_icon = match notification.level {
        NotificationLevel::Success => icon::from_name("object-select-symbolic").size(20),
        NotificationLevel::Error => icon::from_name("dialog-error-symbolic").size(20),
    };

    let content = widget::row::with_capacity(4)
        .push(level_icon)
        .push(
            widget::column::with_capacity(2)
                .push(widget::text::body(&notification.title))
                .push_maybe(if notification.message.is_empty() {
                    None
                } else {
                    Some(widget::text::caption(&notification.message))
                })
                .spacing(2)
                .width(Length::Fill),
        )
        .push(
            widget::button::icon(icon::from_name("edit-copy-symbolic"))
                .on_press(Message::CopyNotification(id))
                .class(cosmic::theme::Button::Standard),
        )
        .push(
            widget::button::icon(icon::from_name("window-close-symbolic"))
                .on_press(Message::DismissNotification(id))
                .class(cosmic::theme::Button::Standard),
        )
        .spacing(8)
        .align_y(Alignment::Center);

    widget::container(content)
        .padding(12)
        .width(Length::Fixed(400.0))
        .class(cosmic::style::Container::Card)
        .into()
}

/// Book details view for the context drawer
pub fn book_details_view(book: Option<&Book>) -> Element<'_, Message> {
    let space_s = cosmic::theme::spacing().space_s;

    let Some(book) = book else {
        return widget::text::body(fl!("no-book-selected")).into();
    };

    let mut fields = widget::column::with_capacity(COLUMNS.len()).spacing(4);
    for key in COLUMNS {
        let value = cell_text(book, key);
        if value.is_empty() {
            continue;
        }
        fields = fields.push(
            widget::row::with_capacity(2)
                .push(widget::text::body(format!("{}:", column_label(key))).width(Length::Fixed(140.0)))
                .push(widget::text::caption(value))
                .spacing(8),
        );
    }

    let mut content = widget::column::with_capacity(3).spacing(space_s);
    if let Some(ref id) = book.id {
        content = content.push(
            widget::container(widget::text::caption(id.clone()))
                .padding([2, 8])
                .class(cosmic::style::Container::Primary),
        );
    }
    content = content.push(
        widget::container(fields)
            .padding(space_s)
            .width(Length::Fill)
            .class(cosmic::style::Container::Card),
    );

    widget::scrollable(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
