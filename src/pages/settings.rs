// SPDX-License-Identifier: MPL-2.0

//! Settings page view for the Kniznica application.

use crate::app::{ConnectionStatus, Message, SettingsStatus};
use crate::config::Config;
use crate::fl;
use cosmic::iced::{Alignment, Length};
use cosmic::prelude::*;
use cosmic::widget;

/// Settings inputs before they are saved.
#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub server_url: String,
    pub auth_token: String,
    pub page_size: String,
    pub debounce_ms: String,
}

impl SettingsForm {
    pub fn from_config(config: &Config) -> Self {
        Self {
            server_url: config.server_url.clone(),
            auth_token: config.auth_token.clone(),
            page_size: config.page_size.to_string(),
            debounce_ms: config.search_debounce_ms.to_string(),
        }
    }

    /// Copies the inputs into `config`. Numbers that do not parse keep the
    /// previous value; the page size is at least 1.
    pub fn apply(&self, config: &mut Config) {
        config.server_url = self.server_url.trim().to_string();
        config.auth_token = self.auth_token.clone();
        if let Ok(size) = self.page_size.trim().parse::<usize>() {
            config.page_size = size.max(1);
        }
        if let Ok(ms) = self.debounce_ms.trim().parse::<u64>() {
            config.search_debounce_ms = ms;
        }
    }
}

#[derive(Debug, Clone)]
pub enum SettingsMsg {
    ServerUrlChanged(String),
    AuthTokenChanged(String),
    PageSizeChanged(String),
    DebounceChanged(String),
    Save,
    TestConnection,
    ConnectionResult(Result<(), String>),
}

/// View for the Settings page
pub fn view<'a>(
    form: &'a SettingsForm,
    settings_status: &'a SettingsStatus,
    connection_status: &'a ConnectionStatus,
    space_s: u16,
    space_m: u16,
) -> Element<'a, Message> {
    let header = widget::text::title1(fl!("settings"));

    let server_section = cosmic::widget::settings::section()
        .title(fl!("server-config"))
        .add(
            cosmic::widget::settings::item::builder(fl!("server-url"))
                .description(fl!("server-url-description"))
                .control(
                    widget::text_input(fl!("server-url-placeholder"), &form.server_url)
                        .on_input(|url| Message::Settings(SettingsMsg::ServerUrlChanged(url)))
                        .width(Length::Fixed(300.0)),
                ),
        )
        .add(
            cosmic::widget::settings::item::builder(fl!("auth-token"))
                .description(fl!("auth-token-description"))
                .control(
                    widget::secure_input(
                        fl!("auth-token-placeholder"),
                        &form.auth_token,
                        None,
                        true,
                    )
                    .on_input(|token| Message::Settings(SettingsMsg::AuthTokenChanged(token)))
                    .width(Length::Fixed(300.0)),
                ),
        );

    let behaviour_section = cosmic::widget::settings::section()
        .title(fl!("behaviour"))
        .add(
            cosmic::widget::settings::item::builder(fl!("page-size"))
                .description(fl!("page-size-description"))
                .control(
                    widget::text_input("25", &form.page_size)
                        .on_input(|size| Message::Settings(SettingsMsg::PageSizeChanged(size)))
                        .width(Length::Fixed(120.0)),
                ),
        )
        .add(
            cosmic::widget::settings::item::builder(fl!("search-delay"))
                .description(fl!("search-delay-description"))
                .control(
                    widget::text_input("300", &form.debounce_ms)
                        .on_input(|ms| Message::Settings(SettingsMsg::DebounceChanged(ms)))
                        .width(Length::Fixed(120.0)),
                ),
        );

    let connection_status_text = match connection_status {
        ConnectionStatus::Disconnected => fl!("status-disconnected"),
        ConnectionStatus::Connecting => fl!("status-connecting"),
        ConnectionStatus::Connected => fl!("status-connected"),
        ConnectionStatus::Error(e) => format!("{}: {}", fl!("status-error"), e),
    };

    let mut buttons = widget::row::with_capacity(4)
        .push(widget::button::standard(fl!("save")).on_press(Message::Settings(SettingsMsg::Save)))
        .push(
            widget::button::suggested(fl!("test-connection"))
                .on_press(Message::Settings(SettingsMsg::TestConnection)),
        )
        .push(widget::text::body(connection_status_text))
        .spacing(space_s)
        .align_y(Alignment::Center);

    let status = match settings_status {
        SettingsStatus::Idle => None,
        SettingsStatus::Saved => Some((fl!("settings-saved"), cosmic::theme::Button::Suggested)),
        SettingsStatus::Error(e) => Some((e.clone(), cosmic::theme::Button::Destructive)),
    };
    if let Some((text, class)) = status {
        buttons = buttons.push(widget::button::custom(widget::text::caption(text)).class(class));
    }

    widget::scrollable(
        widget::column::with_capacity(4)
            .push(header)
            .push(server_section)
            .push(behaviour_section)
            .push(buttons)
            .spacing(space_m)
            .width(Length::Fill),
    )
    .height(Length::Fill)
    .into()
}
