use std::cmp::min;
use std::mem;

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Athlete, Event, Resource};

use super::forms::{AthleteForm, ConfirmDelete, EventForm, FormStatus, FormView};
use super::helpers::{capitalize, card_lines, centered_rect, header_line, surface_error};
use super::screens::{ListView, LoadResult, Route};
use super::tasks::{Listed, Outcome, TaskQueue, Ticket};

/// Rows reserved for the navigation header.
const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height of one record card: border, title and two detail lines.
const CARD_HEIGHT: u16 = 5;

/// The view mounted under the navigation header.
enum Screen {
    Root,
    Athletes(ListView<Athlete>),
    Events(ListView<Event>),
}

impl Screen {
    fn route(&self) -> Route {
        match self {
            Screen::Root => Route::Root,
            Screen::Athletes(_) => Route::Athletes,
            Screen::Events(_) => Route::Events,
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            Screen::Root => "record",
            Screen::Athletes(_) => Athlete::NOUN,
            Screen::Events(_) => Event::NOUN,
        }
    }
}

/// Modal currently open on top of the list. Each modal carries the ticket its
/// requests report back with, and edit/delete modals own the record they
/// target, so only that record can be affected.
enum Mode {
    Normal,
    AthleteForm {
        ticket: Ticket,
        form: AthleteForm,
    },
    EventForm {
        ticket: Ticket,
        form: EventForm,
    },
    ConfirmAthleteDelete {
        ticket: Ticket,
        confirm: ConfirmDelete<Athlete>,
    },
    ConfirmEventDelete {
        ticket: Ticket,
        confirm: ConfirmDelete<Event>,
    },
}

/// Card actions that open a modal or touch the collection.
#[derive(Copy, Clone)]
enum ListAction {
    Add,
    Edit,
    Delete,
    Reload,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    client: ApiClient,
    tasks: TaskQueue,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
    next_ticket: Ticket,
}

impl App {
    /// Build the app and mount `route`. Requests run on `runtime`.
    pub fn new(client: ApiClient, runtime: Handle, route: Route) -> Self {
        let mut app = Self {
            client,
            tasks: TaskQueue::new(runtime),
            screen: Screen::Root,
            mode: Mode::Normal,
            status: None,
            next_ticket: 0,
        };
        app.navigate(route);
        app
    }

    pub fn route(&self) -> Route {
        self.screen.route()
    }

    /// Mount the view behind `route`. List views load their collection on
    /// every mount.
    pub fn navigate(&mut self, route: Route) {
        if self.screen.route() == route {
            return;
        }
        self.clear_status();
        self.screen = match route {
            Route::Root => Screen::Root,
            Route::Athletes => Screen::Athletes(ListView::new()),
            Route::Events => Screen::Events(ListView::new()),
        };
        debug!(route = %route, "navigated");
        self.reload();
    }

    /// Handle one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AthleteForm { ticket, form } => self.handle_athlete_form(code, ticket, form),
            Mode::EventForm { ticket, form } => self.handle_event_form(code, ticket, form),
            Mode::ConfirmAthleteDelete { ticket, mut confirm } => {
                if self.handle_confirm_delete(code, ticket, &mut confirm) {
                    Mode::ConfirmAthleteDelete { ticket, confirm }
                } else {
                    Mode::Normal
                }
            }
            Mode::ConfirmEventDelete { ticket, mut confirm } => {
                if self.handle_confirm_delete(code, ticket, &mut confirm) {
                    Mode::ConfirmEventDelete { ticket, confirm }
                } else {
                    Mode::Normal
                }
            }
        };

        exit
    }

    /// Handle a key pressed with Ctrl held. Returns `true` on Ctrl+C. Other
    /// unbound combinations are ignored rather than typed as plain keys.
    pub(crate) fn handle_ctrl_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('n') | KeyCode::Char('N') => self.handle_ctrl_n(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.handle_ctrl_d(),
            KeyCode::Char('c') | KeyCode::Char('C') => return true,
            _ => debug!(?code, "ignoring unbound ctrl combination"),
        }
        false
    }

    /// Ctrl+N: append a vessel in the athlete form.
    fn handle_ctrl_n(&mut self) {
        if let Mode::AthleteForm { form, .. } = &mut self.mode {
            form.add_vessel();
        }
    }

    /// Ctrl+D: remove the focused vessel in the athlete form.
    fn handle_ctrl_d(&mut self) {
        let removed = match &mut self.mode {
            Mode::AthleteForm { form, .. } => form
                .active_vessel()
                .map(|index| form.remove_vessel(index)),
            _ => return,
        };
        match removed {
            Some(true) => self.clear_status(),
            Some(false) => {
                self.set_status("The first vessel cannot be removed.", StatusKind::Error)
            }
            None => self.set_status("Move to a vessel to remove it.", StatusKind::Error),
        }
    }

    /// Apply every request outcome that finished since the last tick.
    pub(crate) fn process_outcomes(&mut self) {
        while let Some(outcome) = self.tasks.try_next() {
            self.apply_outcome(outcome);
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
                Mode::Normal
            }
            KeyCode::Char('1') => {
                self.navigate(Route::Athletes);
                Mode::Normal
            }
            KeyCode::Char('2') => {
                self.navigate(Route::Events);
                Mode::Normal
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.navigate(self.route().next());
                Mode::Normal
            }
            KeyCode::Up | KeyCode::Left => {
                self.move_selection(-1);
                Mode::Normal
            }
            KeyCode::Down | KeyCode::Right => {
                self.move_selection(1);
                Mode::Normal
            }
            KeyCode::PageUp => {
                self.move_selection(-5);
                Mode::Normal
            }
            KeyCode::PageDown => {
                self.move_selection(5);
                Mode::Normal
            }
            KeyCode::Home => {
                self.select_edge(false);
                Mode::Normal
            }
            KeyCode::End => {
                self.select_edge(true);
                Mode::Normal
            }
            KeyCode::Char('+') | KeyCode::Char('a') => self.open_modal(ListAction::Add),
            KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Enter => {
                self.open_modal(ListAction::Edit)
            }
            KeyCode::Char('-') | KeyCode::Delete => self.open_modal(ListAction::Delete),
            KeyCode::Char('r') | KeyCode::Char('R') => self.open_modal(ListAction::Reload),
            _ => Mode::Normal,
        }
    }

    fn open_modal(&mut self, action: ListAction) -> Mode {
        if matches!(self.screen, Screen::Root) {
            return Mode::Normal;
        }
        if let ListAction::Reload = action {
            self.reload();
            self.set_status("Reloading...", StatusKind::Info);
            return Mode::Normal;
        }

        let ticket = self.issue_ticket();
        let mode = match (&self.screen, action) {
            (Screen::Athletes(_), ListAction::Add) => Some(Mode::AthleteForm {
                ticket,
                form: AthleteForm::default(),
            }),
            (Screen::Athletes(list), ListAction::Edit) => {
                list.current().map(|athlete| Mode::AthleteForm {
                    ticket,
                    form: AthleteForm::from_athlete(athlete),
                })
            }
            (Screen::Athletes(list), ListAction::Delete) => {
                list.current().cloned().map(|athlete| Mode::ConfirmAthleteDelete {
                    ticket,
                    confirm: ConfirmDelete::new(athlete),
                })
            }
            (Screen::Events(_), ListAction::Add) => Some(Mode::EventForm {
                ticket,
                form: EventForm::default(),
            }),
            (Screen::Events(list), ListAction::Edit) => list.current().map(|event| Mode::EventForm {
                ticket,
                form: EventForm::from_event(event),
            }),
            (Screen::Events(list), ListAction::Delete) => {
                list.current().cloned().map(|event| Mode::ConfirmEventDelete {
                    ticket,
                    confirm: ConfirmDelete::new(event),
                })
            }
            _ => None,
        };

        match mode {
            Some(mode) => {
                self.clear_status();
                mode
            }
            None => {
                let noun = self.screen.noun();
                self.set_status(format!("No {noun} selected."), StatusKind::Error);
                Mode::Normal
            }
        }
    }

    fn handle_athlete_form(
        &mut self,
        code: KeyCode,
        ticket: Ticket,
        mut form: AthleteForm,
    ) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(cancel_message(form.is_edit(), Athlete::NOUN), StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                if !form.status.submitting {
                    match form.validate() {
                        Some(payload) => {
                            form.status = FormStatus {
                                submitting: true,
                                error: None,
                            };
                            self.clear_status();
                            self.spawn_save::<Athlete>(ticket, form.target.clone(), payload);
                        }
                        None => self.set_status(
                            "Please fix the highlighted fields.",
                            StatusKind::Error,
                        ),
                    }
                }
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Mode::AthleteForm { ticket, form }
    }

    fn handle_event_form(&mut self, code: KeyCode, ticket: Ticket, mut form: EventForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(cancel_message(form.is_edit(), Event::NOUN), StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                if !form.status.submitting {
                    match form.validate() {
                        Some(payload) => {
                            form.status = FormStatus {
                                submitting: true,
                                error: None,
                            };
                            self.clear_status();
                            self.spawn_save::<Event>(ticket, form.target.clone(), payload);
                        }
                        None => self.set_status(
                            "Please fix the highlighted fields.",
                            StatusKind::Error,
                        ),
                    }
                }
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Mode::EventForm { ticket, form }
    }

    /// Returns whether the dialog stays open.
    fn handle_confirm_delete<R: Resource>(
        &mut self,
        code: KeyCode,
        ticket: Ticket,
        confirm: &mut ConfirmDelete<R>,
    ) -> bool {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                false
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                if !confirm.deleting {
                    confirm.deleting = true;
                    self.clear_status();
                    self.spawn_delete::<R>(ticket, confirm.record.id().to_string());
                }
                true
            }
            _ => true,
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Re-fetch the whole collection behind the current view.
    fn reload(&mut self) {
        let generation = self.issue_ticket();
        match &mut self.screen {
            Screen::Root => {}
            Screen::Athletes(list) => {
                list.begin_load(generation);
                self.spawn_load::<Athlete>(generation);
            }
            Screen::Events(list) => {
                list.begin_load(generation);
                self.spawn_load::<Event>(generation);
            }
        }
    }

    fn spawn_load<R: Listed>(&mut self, generation: Ticket) {
        let client = self.client.clone();
        self.tasks.spawn(async move {
            let result = client.list::<R>().await;
            R::loaded(generation, result)
        });
    }

    fn spawn_save<R: Resource>(
        &mut self,
        ticket: Ticket,
        target: Option<String>,
        payload: R::Payload,
    ) {
        info!(ticket, noun = R::NOUN, id = ?target, "saving record");
        let client = self.client.clone();
        self.tasks.spawn(async move {
            let result = match target {
                Some(id) => client.update::<R>(&id, &payload).await,
                None => client.create::<R>(&payload).await,
            };
            Outcome::Saved { ticket, result }
        });
    }

    fn spawn_delete<R: Resource>(&mut self, ticket: Ticket, id: String) {
        info!(ticket, noun = R::NOUN, %id, "deleting record");
        let client = self.client.clone();
        self.tasks.spawn(async move {
            let result = client.delete::<R>(&id).await;
            Outcome::Deleted { ticket, result }
        });
    }

    fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::AthletesLoaded { generation, result } => {
                let result = result.map_err(|err| load_error::<Athlete>(&err));
                let applied = match &mut self.screen {
                    Screen::Athletes(list) => list.finish_load(generation, result),
                    _ => LoadResult::Stale,
                };
                self.after_load(Athlete::NOUN, applied);
            }
            Outcome::EventsLoaded { generation, result } => {
                let result = result.map_err(|err| load_error::<Event>(&err));
                let applied = match &mut self.screen {
                    Screen::Events(list) => list.finish_load(generation, result),
                    _ => LoadResult::Stale,
                };
                self.after_load(Event::NOUN, applied);
            }
            Outcome::Saved { ticket, result } => self.finish_save(ticket, result),
            Outcome::Deleted { ticket, result } => self.finish_delete(ticket, result),
        }
    }

    fn after_load(&mut self, noun: &str, applied: LoadResult) {
        match applied {
            LoadResult::Stale => debug!(noun, "dropping superseded list response"),
            LoadResult::Loaded(count) => debug!(noun, count, "collection loaded"),
            LoadResult::Failed(message) => {
                self.set_status(format!("Failed to load {noun}s: {message}"), StatusKind::Error)
            }
        }
    }

    fn finish_save(&mut self, ticket: Ticket, result: Result<(), ApiError>) {
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::AthleteForm { ticket: open, mut form } if open == ticket => {
                let editing = form.is_edit();
                if self.settle_save(Athlete::NOUN, editing, &mut form.status, result) {
                    Mode::Normal
                } else {
                    Mode::AthleteForm { ticket, form }
                }
            }
            Mode::EventForm { ticket: open, mut form } if open == ticket => {
                let editing = form.is_edit();
                if self.settle_save(Event::NOUN, editing, &mut form.status, result) {
                    Mode::Normal
                } else {
                    Mode::EventForm { ticket, form }
                }
            }
            other => {
                self.settle_detached(ticket, "save", result);
                other
            }
        };
    }

    /// Returns whether the form should close.
    fn settle_save(
        &mut self,
        noun: &str,
        editing: bool,
        status: &mut FormStatus,
        result: Result<(), ApiError>,
    ) -> bool {
        status.submitting = false;
        match result {
            Ok(()) => {
                let verb = if editing { "updated" } else { "created" };
                info!(noun, verb, "record saved");
                self.reload();
                self.set_status(format!("{} {verb}.", capitalize(noun)), StatusKind::Info);
                true
            }
            Err(err) => {
                error!(noun, error = %err, "failed to save record");
                let message = surface_error(&err);
                status.error = Some(message.clone());
                self.set_status(format!("Failed to save {noun}: {message}"), StatusKind::Error);
                false
            }
        }
    }

    fn finish_delete(&mut self, ticket: Ticket, result: Result<(), ApiError>) {
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::ConfirmAthleteDelete { ticket: open, mut confirm } if open == ticket => {
                if self.settle_delete(&mut confirm, result) {
                    Mode::Normal
                } else {
                    Mode::ConfirmAthleteDelete { ticket, confirm }
                }
            }
            Mode::ConfirmEventDelete { ticket: open, mut confirm } if open == ticket => {
                if self.settle_delete(&mut confirm, result) {
                    Mode::Normal
                } else {
                    Mode::ConfirmEventDelete { ticket, confirm }
                }
            }
            other => {
                self.settle_detached(ticket, "delete", result);
                other
            }
        };
    }

    /// Result for a modal that was closed mid-request. The open modal is left
    /// alone, but a change the server accepted still refreshes the list.
    fn settle_detached(&mut self, ticket: Ticket, action: &str, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                info!(ticket, action, "closed modal's request succeeded, reloading");
                self.reload();
            }
            Err(err) => warn!(ticket, action, error = %err, "dropping failure for a closed modal"),
        }
    }

    /// Returns whether the dialog should close.
    fn settle_delete<R: Resource>(
        &mut self,
        confirm: &mut ConfirmDelete<R>,
        result: Result<(), ApiError>,
    ) -> bool {
        confirm.deleting = false;
        let name = confirm.record.display_name().to_string();
        match result {
            Ok(()) => {
                info!(noun = R::NOUN, id = confirm.record.id(), "record deleted");
                self.reload();
                self.set_status(format!("Deleted {} {name}.", R::NOUN), StatusKind::Info);
                true
            }
            Err(err) => {
                error!(
                    noun = R::NOUN,
                    id = confirm.record.id(),
                    error = %err,
                    "failed to delete record"
                );
                let message = surface_error(&err);
                self.set_status(
                    format!("Failed to delete {name}: {message}"),
                    StatusKind::Error,
                );
                false
            }
        }
    }

    fn move_selection(&mut self, offset: isize) {
        match &mut self.screen {
            Screen::Root => {}
            Screen::Athletes(list) => list.move_selection(offset),
            Screen::Events(list) => list.move_selection(offset),
        }
    }

    fn select_edge(&mut self, last: bool) {
        match (&mut self.screen, last) {
            (Screen::Root, _) => {}
            (Screen::Athletes(list), false) => list.select_first(),
            (Screen::Athletes(list), true) => list.select_last(),
            (Screen::Events(list), false) => list.select_first(),
            (Screen::Events(list), true) => list.select_last(),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        let header = Paragraph::new(header_line(self.route()))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        match &self.screen {
            Screen::Root => self.draw_root(frame, chunks[1]),
            Screen::Athletes(list) => self.draw_list(frame, chunks[1], "Athletes", list),
            Screen::Events(list) => self.draw_list(frame, chunks[1], "Events", list),
        }

        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Normal => {}
            Mode::AthleteForm { form, .. } => {
                let title = if form.is_edit() {
                    "Edit Athlete"
                } else {
                    "Add New Athlete"
                };
                self.draw_form(frame, area, title, form.view(), (70, 80));
            }
            Mode::EventForm { form, .. } => {
                let title = if form.is_edit() {
                    "Edit Event"
                } else {
                    "Add New Event"
                };
                self.draw_form(frame, area, title, form.view(), (60, 50));
            }
            Mode::ConfirmAthleteDelete { confirm, .. } => {
                self.draw_confirm(frame, area, "Delete Athlete", confirm)
            }
            Mode::ConfirmEventDelete { confirm, .. } => {
                self.draw_confirm(frame, area, "Delete Event", confirm)
            }
        }
    }

    fn draw_root(&self, frame: &mut Frame, area: Rect) {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from("Press 1 for athletes or 2 for events."),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::NONE));
        frame.render_widget(message, area);
    }

    fn draw_list<R: Resource>(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        list: &ListView<R>,
    ) {
        let mut heading = format!("{title} ({})", list.records.len());
        if list.loading {
            heading.push_str(" • loading...");
        }
        let block = Block::default().title(heading).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if list.records.is_empty() {
            let (text, style) = if let Some(error) = &list.error {
                (
                    format!("Could not load {}s: {error}", R::NOUN),
                    Style::default().fg(Color::Red),
                )
            } else if list.loading {
                ("Loading...".to_string(), Style::default().fg(Color::Gray))
            } else {
                (
                    format!("No {}s yet. Press '+' to add one.", R::NOUN),
                    Style::default(),
                )
            };
            let message = Paragraph::new(Span::styled(text, style))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(message, inner);
            return;
        }

        self.render_cards(frame, inner, &list.records, list.selected);
    }

    fn render_cards<R: Resource>(
        &self,
        frame: &mut Frame,
        area: Rect,
        records: &[R],
        selected: usize,
    ) {
        if records.is_empty() || area.height == 0 {
            return;
        }

        let card_height = CARD_HEIGHT as usize;
        let capacity = ((area.height as usize) / card_height).max(1);
        let len = records.len();
        let mut start = if selected >= capacity {
            selected + 1 - capacity
        } else {
            0
        };
        if start + capacity > len {
            start = len.saturating_sub(capacity);
        }
        let end = min(start + capacity, len);
        let visible_len = end.saturating_sub(start);
        if visible_len == 0 {
            return;
        }

        let constraints: Vec<Constraint> = (0..visible_len)
            .map(|_| Constraint::Length(CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (idx, chunk) in rows.iter().enumerate() {
            let index = start + idx;
            if chunk.height == 0 || index >= len {
                continue;
            }

            let is_selected = index == selected;
            let mut block = Block::default().borders(Borders::ALL);
            if is_selected {
                block = block.style(Style::default().fg(Color::Yellow));
            }
            let card = Paragraph::new(card_lines(&records[index], is_selected))
                .block(block)
                .wrap(Wrap { trim: true })
                .alignment(Alignment::Left);
            frame.render_widget(card, *chunk);
        }
    }

    fn draw_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        view: FormView,
        (percent_x, percent_y): (u16, u16),
    ) {
        let popup_area = centered_rect(percent_x, percent_y, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        // Keep the focused line visible when the vessel list outgrows the popup.
        let scroll = view
            .cursor
            .map(|(_, row)| row.saturating_sub(inner.height.saturating_sub(1)))
            .unwrap_or(0);
        let cursor = view.cursor;
        frame.render_widget(Paragraph::new(view.lines).scroll((scroll, 0)), inner);

        if let Some((column, row)) = cursor {
            let x = inner.x + column.min(inner.width.saturating_sub(1));
            let y = inner.y + row.saturating_sub(scroll);
            frame.set_cursor_position((x, y));
        }
    }

    fn draw_confirm<R: Resource>(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        confirm: &ConfirmDelete<R>,
    ) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let action_line = if confirm.deleting {
            Line::from(Span::styled(
                "Deleting...",
                Style::default().fg(Color::Yellow),
            ))
        } else {
            Line::from(Span::styled(
                "Press Y to delete or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            ))
        };

        let lines = vec![Line::from(confirm.prompt()), Line::from(""), action_line];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&'static str, &'static str)] = match (&self.mode, &self.screen) {
            (Mode::AthleteForm { .. }, _) => &[
                ("[Tab]", " Next   "),
                ("[Enter]", " Save   "),
                ("[Ctrl+N]", " Add Vessel   "),
                ("[Ctrl+D]", " Remove Vessel   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::EventForm { .. }, _) => &[
                ("[Tab]", " Next   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::ConfirmAthleteDelete { .. } | Mode::ConfirmEventDelete { .. }, _) => {
                &[("[y]", " Delete   "), ("[n]", " Cancel")]
            }
            (Mode::Normal, Screen::Root) => &[
                ("[1]", " Athletes   "),
                ("[2]", " Events   "),
                ("[q]", " Quit"),
            ],
            (Mode::Normal, _) => &[
                ("[↑↓]", " Select   "),
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[-]", " Delete   "),
                ("[r]", " Reload   "),
                ("[Tab]", " Switch View   "),
                ("[q]", " Quit"),
            ],
        };

        Line::from(
            keys.iter()
                .flat_map(|(key, label)| [Span::styled(*key, key_style), Span::raw(*label)])
                .collect::<Vec<_>>(),
        )
    }

    /// Drain outcomes until no request is left in flight.
    #[cfg(test)]
    fn settle(&mut self) {
        while let Some(outcome) = self.tasks.next_blocking() {
            self.apply_outcome(outcome);
        }
    }
}

fn cancel_message(editing: bool, noun: &str) -> String {
    if editing {
        "Edit cancelled.".to_string()
    } else {
        format!("Add {noun} cancelled.")
    }
}

fn load_error<R: Resource>(err: &ApiError) -> String {
    error!(noun = R::NOUN, error = %err, "failed to load collection");
    surface_error(err)
}
