// SPDX-License-Identifier: MPL-2.0

use crate::api::Book;
use crate::config::Config;
use crate::fl;
use crate::helpers;
use crate::pages;
use crate::pages::books::{BooksMsg, BooksState};
use crate::pages::editor::{self, EditorMsg, EditorState};
use crate::pages::settings::{SettingsForm, SettingsMsg};
use crate::widgets::filter_row::{self, FilterRowEvent, FilterRowMessage};
use crate::widgets::multiselect::{MultiselectEvent, MultiselectMessage, SearchRequest};
use cosmic::app::context_drawer;
use cosmic::cosmic_config::{self, CosmicConfigEntry};
use cosmic::iced::widget::container::visible_bounds;
use cosmic::iced::{Event, Length, Subscription, event, keyboard, mouse, window};
use cosmic::prelude::*;
use cosmic::widget::{self, about::About, icon, menu, nav_bar};
use std::collections::HashMap;

const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");
const APP_ICON: &[u8] = include_bytes!("../resources/icons/hicolor/scalable/apps/icon.svg");

/// Id of the container holding the active page; its bounds are the
/// viewport dropdowns are placed in.
fn page_id() -> widget::Id {
    widget::Id::new("page-content")
}

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    context_page: ContextPage,
    /// The about page for this app.
    about: About,
    /// Contains items assigned to the nav bar panel.
    nav: nav_bar::Model,
    /// Key bindings for the application's menu bar.
    key_binds: HashMap<menu::KeyBind, MenuAction>,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Cosmic config context for saving
    config_context: Option<cosmic_config::Config>,

    // === App-specific state ===
    /// Connection status, updated by every request to the server
    pub connection_status: ConnectionStatus,
    /// Settings inputs before saving
    pub settings_form: SettingsForm,
    /// Settings save status
    pub settings_status: SettingsStatus,
    /// Books page state
    pub books: BooksState,
    /// New book editor state
    pub editor: EditorState,
    /// Book shown in the context drawer
    pub selected_book: Option<Book>,
    /// Active notifications to display
    pub notifications: Vec<Notification>,
    /// Counter for generating unique notification IDs
    pub notification_id_counter: u32,
}

#[derive(Debug, Clone, Default)]
pub enum SettingsStatus {
    #[default]
    Idle,
    Saved,
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

/// Notification level/type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A notification message to display to the user
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u32,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

/// Global input that matters only while a dropdown is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownInput {
    Escape,
    Backspace,
    /// The window was resized or something scrolled.
    ViewportChanged,
}

/// Which multiselect owns the open dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DropdownTarget {
    Filter(String),
    Authors,
    Language,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // Navigation & UI
    LaunchUrl(String),
    ToggleContextPage(ContextPage),
    UpdateConfig(Config),
    CloseBookDetails,

    // Pages
    Books(BooksMsg),
    Editor(EditorMsg),
    Settings(SettingsMsg),

    // Open dropdown
    Dropdown(DropdownInput),

    // Notifications
    AddNotification(NotificationLevel, String, String),
    DismissNotification(u32),
    CopyNotification(u32),
}

/// Create a COSMIC application from the app model
impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = ();

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "sk.kniznica.Kniznica";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        _flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let mut nav = nav_bar::Model::default();

        nav.insert()
            .text(fl!("books"))
            .data::<Page>(Page::Books)
            .icon(icon::from_name("accessories-dictionary-symbolic"))
            .activate();

        nav.insert()
            .text(fl!("new-book"))
            .data::<Page>(Page::NewBook)
            .icon(icon::from_name("list-add-symbolic"));

        nav.insert()
            .text(fl!("settings"))
            .data::<Page>(Page::Settings)
            .icon(icon::from_name("preferences-system-symbolic"));

        // Create the about widget
        let about = About::default()
            .name(fl!("app-title"))
            .icon(widget::icon::from_svg_bytes(APP_ICON))
            .version(env!("CARGO_PKG_VERSION"))
            .links([(fl!("repository"), REPOSITORY)])
            .license(env!("CARGO_PKG_LICENSE"));

        // Load configuration
        let config_context = cosmic_config::Config::new(Self::APP_ID, Config::VERSION).ok();
        let config = config_context
            .as_ref()
            .map(|context| match Config::get_entry(context) {
                Ok(config) => config,
                Err((errors, config)) => {
                    for err in errors {
                        log::warn!("config entry: {err}");
                    }
                    config
                }
            })
            .unwrap_or_default();

        let mut books = BooksState::new(config.search_debounce());
        books.filters.set_column_visibility(config.column_visibility());

        let mut app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            nav,
            key_binds: HashMap::new(),
            settings_form: SettingsForm::from_config(&config),
            editor: EditorState::new(config.search_debounce()),
            books,
            config,
            config_context,
            connection_status: ConnectionStatus::Disconnected,
            settings_status: SettingsStatus::Idle,
            selected_book: None,
            notifications: Vec::new(),
            notification_id_counter: 0,
        };

        let command = Task::batch([
            app.update_title(),
            app.load_filter_values(),
            app.load_books(),
        ]);

        (app, command)
    }

    /// Elements to pack at the start of the header bar.
    fn header_start(&self) -> Vec<Element<'_, Self::Message>> {
        let menu_bar = menu::bar(vec![menu::Tree::with_children(
            menu::root(fl!("view")).apply(Element::from),
            menu::items(
                &self.key_binds,
                vec![menu::Item::Button(fl!("about"), None, MenuAction::About)],
            ),
        )]);

        vec![menu_bar.into()]
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        vec![pages::widgets::connection_status_badge(
            &self.connection_status,
        )]
    }

    /// Enables the COSMIC application to create a nav bar with this model.
    fn nav_model(&self) -> Option<&nav_bar::Model> {
        Some(&self.nav)
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match &self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
            ContextPage::BookDetails => {
                let content = pages::widgets::book_details_view(self.selected_book.as_ref());
                context_drawer::context_drawer(content, Message::CloseBookDetails)
                    .title(fl!("book-details"))
            }
        })
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        let space_s = cosmic::theme::spacing().space_s;
        let space_m = cosmic::theme::spacing().space_m;

        let page_content: Element<_> = match self.nav.active_data::<Page>().unwrap_or(&Page::Books)
        {
            Page::Books => pages::books::view(&self.books, &self.config, space_s, space_m),
            Page::NewBook => pages::editor::view(&self.editor, space_s, space_m),
            Page::Settings => pages::settings::view(
                &self.settings_form,
                &self.settings_status,
                &self.connection_status,
                space_s,
                space_m,
            ),
        };

        let mut content_column = widget::column::with_capacity(2).spacing(space_s);

        if !self.notifications.is_empty() {
            let notifications_row = widget::row::with_children(
                self.notifications
                    .iter()
                    .map(pages::widgets::notification_toast),
            )
            .spacing(space_s);
            content_column = content_column.push(notifications_row);
        }

        content_column = content_column.push(page_content);

        widget::container(content_column)
            .id(page_id())
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(space_m)
            .into()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        let mut subscriptions = vec![
            // Watch for application configuration changes.
            self.core()
                .watch_config::<Config>(Self::APP_ID)
                .map(|update| Message::UpdateConfig(update.config)),
        ];

        // Keyboard, resize and scroll listeners live only while a dropdown is open.
        if self.open_dropdown().is_some() {
            subscriptions.push(event::listen_with(dropdown_input));
        }

        Subscription::batch(subscriptions)
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        match message {
            Message::ToggleContextPage(context_page) => {
                if self.context_page == context_page {
                    self.core.window.show_context = !self.core.window.show_context;
                } else {
                    self.context_page = context_page;
                    self.core.window.show_context = true;
                }
            }

            Message::UpdateConfig(config) => {
                let reload = config.server_url != self.config.server_url
                    || config.auth_token != self.config.auth_token
                    || config.page_size != self.config.page_size;
                self.config = config;
                self.settings_form = SettingsForm::from_config(&self.config);
                self.books.filters.set_debounce(self.config.search_debounce());
                self.editor.set_debounce(self.config.search_debounce());

                let mut tasks = Vec::new();
                if let Some(event) = self
                    .books
                    .filters
                    .set_column_visibility(self.config.column_visibility())
                {
                    tasks.push(self.handle_filter_events(vec![event]));
                } else if reload {
                    self.books.page = 1;
                    tasks.push(self.load_books());
                }
                if reload {
                    tasks.push(self.load_filter_values());
                }
                return Task::batch(tasks);
            }

            Message::LaunchUrl(url) => match open::that_detached(&url) {
                Ok(()) => {}
                Err(err) => {
                    log::error!("failed to open {url:?}: {err}");
                }
            },

            Message::CloseBookDetails => {
                self.selected_book = None;
                self.core.window.show_context = false;
            }

            Message::Books(msg) => return self.handle_books_message(msg),
            Message::Editor(msg) => return self.handle_editor_message(msg),
            Message::Settings(msg) => return self.handle_settings_message(msg),

            Message::Dropdown(input) => {
                let Some(target) = self.open_dropdown() else {
                    return Task::none();
                };
                let message = match input {
                    DropdownInput::Escape => MultiselectMessage::Escape,
                    DropdownInput::Backspace => MultiselectMessage::Backspace,
                    DropdownInput::ViewportChanged => {
                        return match target {
                            DropdownTarget::Filter(field) => {
                                measure(filter_row::anchor_id(&field), filter_wrap(field))
                            }
                            DropdownTarget::Authors => {
                                measure(editor::authors_anchor(), authors_wrap)
                            }
                            DropdownTarget::Language => {
                                measure(editor::language_anchor(), language_wrap)
                            }
                        };
                    }
                };
                let routed = match target {
                    DropdownTarget::Filter(field) => filter_wrap(field)(message),
                    DropdownTarget::Authors => authors_wrap(message),
                    DropdownTarget::Language => language_wrap(message),
                };
                return self.update(routed);
            }

            // Notifications
            Message::AddNotification(level, title, message) => {
                self.notification_id_counter += 1;
                self.notifications.push(Notification {
                    id: self.notification_id_counter,
                    level,
                    title,
                    message,
                });
            }

            Message::DismissNotification(id) => {
                self.notifications.retain(|n| n.id != id);
            }

            Message::CopyNotification(id) => {
                if let Some(notification) = self.notifications.iter().find(|n| n.id == id) {
                    let text = format!("{}: {}", notification.title, notification.message);
                    return cosmic::task::future(async move {
                        match arboard::Clipboard::new() {
                            Ok(mut clipboard) => {
                                if let Err(err) = clipboard.set_text(&text) {
                                    log::error!("failed to copy notification: {err}");
                                }
                            }
                            Err(err) => log::error!("clipboard unavailable: {err}"),
                        }
                        cosmic::Action::App(Message::AddNotification(
                            NotificationLevel::Success,
                            fl!("notification-copied"),
                            String::new(),
                        ))
                    });
                }
            }
        }
        Task::none()
    }

    /// Called when a nav item is selected.
    fn on_nav_select(&mut self, id: nav_bar::Id) -> Task<cosmic::Action<Self::Message>> {
        self.nav.activate(id);
        self.update_title()
    }
}

impl AppModel {
    /// Updates the header and window titles.
    pub fn update_title(&mut self) -> Task<cosmic::Action<Message>> {
        let mut window_title = fl!("app-title");

        if let Some(page) = self.nav.text(self.nav.active()) {
            window_title.push_str(" - ");
            window_title.push_str(page);
        }

        if let Some(id) = self.core.main_window_id() {
            self.set_window_title(window_title, id)
        } else {
            Task::none()
        }
    }

    /// Returns the multiselect whose dropdown is open, if any.
    fn open_dropdown(&self) -> Option<DropdownTarget> {
        if self.editor.authors.is_open() {
            Some(DropdownTarget::Authors)
        } else if self.editor.language.is_open() {
            Some(DropdownTarget::Language)
        } else {
            self.books
                .filters
                .open_multiselect()
                .map(|field| DropdownTarget::Filter(field.to_string()))
        }
    }

    fn save_config(&mut self) -> Result<(), String> {
        let Some(ref context) = self.config_context else {
            return Err(String::from("Configuration is not available"));
        };
        self.config
            .write_entry(context)
            .map_err(|e| format!("Failed to save: {e}"))
    }

    fn notify_error(&mut self, title: String, message: String) -> Task<cosmic::Action<Message>> {
        self.update(Message::AddNotification(
            NotificationLevel::Error,
            title,
            message,
        ))
    }

    /// Fetches the filter value pools and shows the loading indicator.
    fn load_filter_values(&mut self) -> Task<cosmic::Action<Message>> {
        self.books.filters.begin_loading();
        let url = self.config.server_url.clone();
        let token = self.config.auth_token.clone();

        cosmic::task::future(async move {
            let result = helpers::fetch_filter_values(&url, &token).await;
            cosmic::Action::App(Message::Books(BooksMsg::FilterValuesLoaded(result)))
        })
    }

    /// Fetches the current page of books with the current filters.
    fn load_books(&mut self) -> Task<cosmic::Action<Message>> {
        let seq = self.books.begin_request();
        let url = self.config.server_url.clone();
        let token = self.config.auth_token.clone();
        let page = self.books.page;
        let page_size = self.config.page_size;
        let filters = self.books.filters.filters().clone();

        cosmic::task::future(async move {
            let result = helpers::fetch_books(&url, &token, page, page_size, &filters).await;
            cosmic::Action::App(Message::Books(BooksMsg::Loaded { seq, result }))
        })
    }

    /// Handles books page messages.
    fn handle_books_message(&mut self, msg: BooksMsg) -> Task<cosmic::Action<Message>> {
        match msg {
            BooksMsg::Refresh => {
                return Task::batch([self.load_filter_values(), self.load_books()]);
            }

            BooksMsg::ToggleFilters => {
                let show = !self.books.filters.is_shown();
                self.books.filters.set_show(show);
            }

            BooksMsg::ToggleColumn(column) => {
                self.config.toggle_column(&column);
                if let Err(e) = self.save_config() {
                    log::error!("{e}");
                }
                if let Some(event) = self
                    .books
                    .filters
                    .set_column_visibility(self.config.column_visibility())
                {
                    return self.handle_filter_events(vec![event]);
                }
            }

            BooksMsg::Filters(msg) => match self.books.filters.update(msg) {
                Ok(events) => return self.handle_filter_events(events),
                Err(e) => {
                    log::error!("{e}");
                    return self.notify_error(fl!("error"), e.to_string());
                }
            },

            BooksMsg::FilterValuesLoaded(result) => {
                let mut tasks = Vec::new();
                match &result {
                    Ok(values) => {
                        let languages = values.get("language").cloned().unwrap_or_default();
                        if let Err(e) = self
                            .editor
                            .language
                            .update(MultiselectMessage::SetOptions(languages))
                        {
                            log::error!("{e}");
                        }
                    }
                    Err(e) => {
                        tasks.push(self.notify_error(fl!("filter-values-failed"), e.clone()));
                    }
                }
                match self.books.filters.values_loaded(result) {
                    Ok(Some(event)) => tasks.push(self.handle_filter_events(vec![event])),
                    Ok(None) => {}
                    Err(e) => {
                        tasks.push(self.notify_error(fl!("filter-values-failed"), e.to_string()));
                        // A field without a picker may have lost its entry.
                        let filters = self.books.filters.filters().clone();
                        tasks.push(
                            self.handle_filter_events(vec![FilterRowEvent::FiltersChanged(filters)]),
                        );
                    }
                }
                return Task::batch(tasks);
            }

            BooksMsg::Loaded { seq, result } => {
                let connection = match &result {
                    Ok(_) => ConnectionStatus::Connected,
                    Err(e) => ConnectionStatus::Error(e.clone()),
                };
                if self.books.apply(seq, result) {
                    if let ConnectionStatus::Error(ref e) = connection {
                        log::error!("failed to load books: {e}");
                    }
                    self.connection_status = connection;
                }
            }

            BooksMsg::NextPage => {
                if self.books.next_page(self.config.page_size) {
                    return self.load_books();
                }
            }

            BooksMsg::PrevPage => {
                if self.books.prev_page() {
                    return self.load_books();
                }
            }

            BooksMsg::ShowDetails(index) => {
                self.selected_book = self.books.books.get(index).cloned();
                self.context_page = ContextPage::BookDetails;
                self.core.window.show_context = true;
            }
        }

        Task::none()
    }

    /// Turns filter row events into tasks. Any filter change reloads from page 1.
    fn handle_filter_events(&mut self, events: Vec<FilterRowEvent>) -> Task<cosmic::Action<Message>> {
        let mut tasks = Vec::new();
        let mut reload = false;

        for event in events {
            match event {
                FilterRowEvent::FiltersChanged(_) => reload = true,
                FilterRowEvent::Multiselect { field, event } => {
                    let anchor = filter_row::anchor_id(&field);
                    tasks.push(self.host_multiselect(event, anchor, filter_wrap(field)));
                }
            }
        }

        if reload {
            self.books.page = 1;
            tasks.push(self.load_books());
        }
        Task::batch(tasks)
    }

    /// Performs the effects a multiselect asks for: timers, measuring and
    /// error reporting. Searching and creating belong to the owner.
    fn host_multiselect<F>(
        &mut self,
        event: MultiselectEvent,
        anchor: widget::Id,
        wrap: F,
    ) -> Task<cosmic::Action<Message>>
    where
        F: Fn(MultiselectMessage) -> Message + Send + 'static,
    {
        match event {
            MultiselectEvent::Changed { .. } => Task::none(),
            MultiselectEvent::Debounce(timer) => cosmic::task::future(async move {
                let ticket = timer.wait().await;
                cosmic::Action::App(wrap(MultiselectMessage::DebounceElapsed(ticket)))
            }),
            MultiselectEvent::Measure => measure(anchor, wrap),
            MultiselectEvent::SearchFailed { name, error } => {
                log::error!("{name}: search failed: {error}");
                self.notify_error(fl!("search-failed"), error)
            }
            other => {
                log::debug!("no handler for {other:?}");
                Task::none()
            }
        }
    }

    fn search_authors(&self, request: SearchRequest) -> Task<cosmic::Action<Message>> {
        let url = self.config.server_url.clone();
        let token = self.config.auth_token.clone();

        cosmic::task::future(async move {
            let result = helpers::search_authors(&url, &token, &request.query, request.page).await;
            cosmic::Action::App(authors_wrap(MultiselectMessage::Results {
                seq: request.seq,
                page: request.page,
                result,
            }))
        })
    }

    /// Handles editor messages.
    fn handle_editor_message(&mut self, msg: EditorMsg) -> Task<cosmic::Action<Message>> {
        match msg {
            EditorMsg::TitleChanged(title) => {
                self.editor.title = title;
            }

            EditorMsg::SubtitleChanged(subtitle) => {
                self.editor.subtitle = subtitle;
            }

            EditorMsg::Authors(msg) => {
                let events = match self.editor.authors.update(msg) {
                    Ok(events) => events,
                    Err(e) => return self.notify_error(fl!("error"), e.to_string()),
                };
                let mut tasks = Vec::with_capacity(events.len());
                for event in events {
                    let task = match event {
                        MultiselectEvent::Search(request) => self.search_authors(request),
                        MultiselectEvent::CreateRequested { query, .. } => {
                            let url = self.config.server_url.clone();
                            let token = self.config.auth_token.clone();
                            cosmic::task::future(async move {
                                let result = helpers::create_author(&url, &token, &query).await;
                                cosmic::Action::App(Message::Editor(EditorMsg::AuthorCreated(
                                    result,
                                )))
                            })
                        }
                        event => self.host_multiselect(event, editor::authors_anchor(), authors_wrap),
                    };
                    tasks.push(task);
                }
                return Task::batch(tasks);
            }

            EditorMsg::Language(msg) => {
                let events = match self.editor.language.update(msg) {
                    Ok(events) => events,
                    Err(e) => return self.notify_error(fl!("error"), e.to_string()),
                };
                let tasks: Vec<_> = events
                    .into_iter()
                    .map(|event| {
                        self.host_multiselect(event, editor::language_anchor(), language_wrap)
                    })
                    .collect();
                return Task::batch(tasks);
            }

            EditorMsg::AuthorCreated(result) => match result {
                Ok(author) => {
                    if let Err(e) = self.editor.add_author(author) {
                        return self.notify_error(fl!("error"), e.to_string());
                    }
                    return self.update(Message::AddNotification(
                        NotificationLevel::Success,
                        fl!("author-created"),
                        String::new(),
                    ));
                }
                Err(e) => return self.notify_error(fl!("author-create-failed"), e),
            },

            EditorMsg::Save => {
                if !self.editor.can_save() {
                    return Task::none();
                }
                self.editor.set_saving(true);
                let book = self.editor.draft();
                let url = self.config.server_url.clone();
                let token = self.config.auth_token.clone();

                return cosmic::task::future(async move {
                    let result = helpers::save_book(&url, &token, &book).await;
                    cosmic::Action::App(Message::Editor(EditorMsg::Saved(result)))
                });
            }

            EditorMsg::Saved(result) => match result {
                Ok(_) => {
                    if let Err(e) = self.editor.reset() {
                        log::error!("{e}");
                    }
                    let notify = self.update(Message::AddNotification(
                        NotificationLevel::Success,
                        fl!("book-saved"),
                        String::new(),
                    ));
                    return Task::batch([notify, self.load_filter_values(), self.load_books()]);
                }
                Err(e) => {
                    self.editor.set_saving(false);
                    log::error!("failed to save book: {e}");
                    return self.notify_error(fl!("book-save-failed"), e);
                }
            },

            EditorMsg::Reset => {
                if let Err(e) = self.editor.reset() {
                    log::error!("{e}");
                }
            }
        }

        Task::none()
    }

    /// Handles settings page messages.
    fn handle_settings_message(&mut self, msg: SettingsMsg) -> Task<cosmic::Action<Message>> {
        match msg {
            SettingsMsg::ServerUrlChanged(url) => {
                self.settings_form.server_url = url;
            }

            SettingsMsg::AuthTokenChanged(token) => {
                self.settings_form.auth_token = token;
            }

            SettingsMsg::PageSizeChanged(size) => {
                self.settings_form.page_size = size;
            }

            SettingsMsg::DebounceChanged(ms) => {
                self.settings_form.debounce_ms = ms;
            }

            SettingsMsg::Save => {
                let mut config = self.config.clone();
                self.settings_form.apply(&mut config);
                // Route through UpdateConfig so the pages pick up the change
                // even when the config watcher is unavailable.
                let apply = self.update(Message::UpdateConfig(config));

                match self.save_config() {
                    Ok(()) => {
                        self.settings_status = SettingsStatus::Saved;
                        let notify = self.update(Message::AddNotification(
                            NotificationLevel::Success,
                            fl!("settings-saved"),
                            String::new(),
                        ));
                        return Task::batch([apply, notify]);
                    }
                    Err(e) => {
                        log::error!("{e}");
                        self.settings_status = SettingsStatus::Error(e.clone());
                        let notify = self.notify_error(fl!("error"), e);
                        return Task::batch([apply, notify]);
                    }
                }
            }

            SettingsMsg::TestConnection => {
                self.connection_status = ConnectionStatus::Connecting;
                let url = self.settings_form.server_url.clone();
                let token = self.settings_form.auth_token.clone();

                return cosmic::task::future(async move {
                    let result = helpers::test_connection(&url, &token).await;
                    cosmic::Action::App(Message::Settings(SettingsMsg::ConnectionResult(result)))
                });
            }

            SettingsMsg::ConnectionResult(result) => {
                self.connection_status = match result {
                    Ok(()) => ConnectionStatus::Connected,
                    Err(e) => ConnectionStatus::Error(e),
                };
            }
        }

        Task::none()
    }
}

fn filter_wrap(field: String) -> impl Fn(MultiselectMessage) -> Message + Send + 'static {
    move |message| {
        Message::Books(BooksMsg::Filters(FilterRowMessage::Multiselect {
            field: field.clone(),
            message,
        }))
    }
}

fn authors_wrap(message: MultiselectMessage) -> Message {
    Message::Editor(EditorMsg::Authors(message))
}

fn language_wrap(message: MultiselectMessage) -> Message {
    Message::Editor(EditorMsg::Language(message))
}

/// Measures a dropdown anchor and the page viewport, then reports both.
fn measure<F>(anchor: widget::Id, wrap: F) -> Task<cosmic::Action<Message>>
where
    F: Fn(MultiselectMessage) -> Message + Send + 'static,
{
    visible_bounds(anchor)
        .then(|anchor| visible_bounds(page_id()).map(move |viewport| anchor.zip(viewport)))
        .and_then(move |(anchor, viewport)| {
            Task::done(cosmic::Action::App(wrap(MultiselectMessage::Measured {
                anchor,
                viewport,
            })))
        })
}

/// Maps global input to dropdown messages.
fn dropdown_input(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed {
            key: keyboard::Key::Named(keyboard::key::Named::Escape),
            ..
        }) => Some(Message::Dropdown(DropdownInput::Escape)),
        Event::Keyboard(keyboard::Event::KeyPressed {
            key: keyboard::Key::Named(keyboard::key::Named::Backspace),
            ..
        }) => Some(Message::Dropdown(DropdownInput::Backspace)),
        Event::Window(window::Event::Resized(_))
        | Event::Mouse(mouse::Event::WheelScrolled { .. }) => {
            Some(Message::Dropdown(DropdownInput::ViewportChanged))
        }
        _ => None,
    }
}

/// The page to display in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Books,
    NewBook,
    Settings,
}

/// The context page to display in the context drawer.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
    BookDetails,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MenuAction {
    About,
}

impl menu::action::MenuAction for MenuAction {
    type Message = Message;

    fn message(&self) -> Self::Message {
        match self {
            MenuAction::About => Message::ToggleContextPage(ContextPage::About),
        }
    }
}
