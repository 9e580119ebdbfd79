use chrono::NaiveDate;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use tracing::debug;

use crate::models::{
    format_form_date, Athlete, AthletePayload, Event, EventPayload, Resource, VesselPayload,
    ISO_DATE_FORMAT,
};

/// Minimum length of a formatted CPF (`000.000.000-00`).
pub(crate) const MIN_CPF_LEN: usize = 14;

const REQUIRED: &str = "Required";

/// A single text input plus the validation message attached to it.
#[derive(Debug, Default, Clone)]
pub(crate) struct TextField {
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl TextField {
    fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            error: None,
        }
    }

    /// Append a printable character; editing clears the field's error.
    fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value.push(ch);
        self.error = None;
        true
    }

    fn backspace(&mut self) {
        self.value.pop();
        self.error = None;
    }

    fn trimmed(&self) -> &str {
        self.value.trim()
    }

    /// Return the trimmed value, or flag the field when it is blank.
    fn require(&mut self) -> Option<String> {
        let value = self.trimmed();
        if value.is_empty() {
            self.error = Some(REQUIRED.to_string());
            None
        } else {
            let value = value.to_string();
            self.error = None;
            Some(value)
        }
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }
}

/// Submission state shared by both forms.
#[derive(Debug, Default, Clone)]
pub(crate) struct FormStatus {
    /// Set while the save request is in flight.
    pub(crate) submitting: bool,
    /// Last failure reported by the server or the network.
    pub(crate) error: Option<String>,
}

/// Rendered form body plus the cursor position relative to the body origin.
pub(crate) struct FormView {
    pub(crate) lines: Vec<Line<'static>>,
    pub(crate) cursor: Option<(u16, u16)>,
}

impl FormView {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            cursor: None,
        }
    }

    /// Push `label: value` plus an error line when the field has one.
    fn push_field(&mut self, label: &str, field: &TextField, placeholder: &str, active: bool) {
        let style = if active {
            Style::default().fg(Color::Yellow)
        } else if field.value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let display = if field.value.is_empty() && !active {
            placeholder.to_string()
        } else {
            field.value.clone()
        };
        let prefix = format!("{label}: ");

        if active {
            let column = prefix.chars().count() + field.len();
            self.cursor = Some((column as u16, self.lines.len() as u16));
        }
        self.lines.push(Line::from(vec![
            Span::raw(prefix),
            Span::styled(display, style),
        ]));

        if let Some(error) = &field.error {
            let indent = label.len() - label.trim_start().len();
            self.lines.push(Line::from(Span::styled(
                format!("{}  {error}", " ".repeat(indent)),
                Style::default().fg(Color::Red),
            )));
        }
    }

    fn push_footer(&mut self, status: &FormStatus, hint: &str) {
        self.lines.push(Line::from(""));
        if status.submitting {
            self.lines.push(Line::from(Span::styled(
                "Saving...",
                Style::default().fg(Color::Yellow),
            )));
        } else if let Some(error) = &status.error {
            self.lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        self.lines.push(Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::Gray),
        )));
    }
}

/// One entry of the athlete's vessel list. `key` is synthetic and stable for
/// the lifetime of the form; `id` is the server identity, if any.
#[derive(Debug, Clone)]
pub(crate) struct VesselEntry {
    pub(crate) key: u64,
    pub(crate) id: Option<String>,
    pub(crate) name: TextField,
    pub(crate) code: TextField,
}

/// Focusable inputs of the athlete form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum AthleteField {
    Name,
    Cpf,
    VesselName(usize),
    VesselCode(usize),
}

/// Athlete create/edit form including its dynamic vessel list.
#[derive(Debug, Clone)]
pub(crate) struct AthleteForm {
    /// Id of the athlete being edited; `None` creates a new one.
    pub(crate) target: Option<String>,
    pub(crate) name: TextField,
    pub(crate) cpf: TextField,
    pub(crate) vessels: Vec<VesselEntry>,
    pub(crate) vessels_error: Option<String>,
    pub(crate) active: AthleteField,
    pub(crate) status: FormStatus,
    next_key: u64,
}

impl Default for AthleteForm {
    fn default() -> Self {
        let mut form = Self {
            target: None,
            name: TextField::default(),
            cpf: TextField::default(),
            vessels: Vec::new(),
            vessels_error: None,
            active: AthleteField::Name,
            status: FormStatus::default(),
            next_key: 0,
        };
        form.add_vessel();
        form.active = AthleteField::Name;
        form
    }
}

impl AthleteForm {
    /// Seed the form from an existing athlete, keeping every vessel id so the
    /// update does not mint new identities for unchanged vessels.
    pub(crate) fn from_athlete(athlete: &Athlete) -> Self {
        let mut form = Self {
            target: Some(athlete.id.clone()),
            name: TextField::with_value(athlete.name.clone()),
            cpf: TextField::with_value(athlete.cpf.clone()),
            vessels: Vec::with_capacity(athlete.vessels.len().max(1)),
            vessels_error: None,
            active: AthleteField::Name,
            status: FormStatus::default(),
            next_key: 0,
        };
        for vessel in &athlete.vessels {
            let key = form.issue_key();
            form.vessels.push(VesselEntry {
                key,
                id: vessel.id.clone(),
                name: TextField::with_value(vessel.name.clone()),
                code: TextField::with_value(vessel.code.clone()),
            });
        }
        if form.vessels.is_empty() {
            form.add_vessel();
            form.active = AthleteField::Name;
        }
        form
    }

    pub(crate) fn is_edit(&self) -> bool {
        self.target.is_some()
    }

    fn issue_key(&mut self) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    /// Append a blank vessel at the end and focus its name.
    pub(crate) fn add_vessel(&mut self) {
        let key = self.issue_key();
        self.vessels.push(VesselEntry {
            key,
            id: None,
            name: TextField::default(),
            code: TextField::default(),
        });
        self.vessels_error = None;
        self.active = AthleteField::VesselName(self.vessels.len() - 1);
    }

    /// The first vessel is permanent so the form can always hold one.
    pub(crate) fn can_remove(&self, index: usize) -> bool {
        index > 0 && index < self.vessels.len()
    }

    /// Drop the vessel at `index`, keeping the order of the others.
    pub(crate) fn remove_vessel(&mut self, index: usize) -> bool {
        if !self.can_remove(index) {
            return false;
        }
        let removed = self.vessels.remove(index);
        debug!(key = removed.key, index, "vessel removed from form");
        self.active = match self.active {
            AthleteField::VesselName(i) | AthleteField::VesselCode(i) if i == index => {
                AthleteField::VesselName(index - 1)
            }
            AthleteField::VesselName(i) if i > index => AthleteField::VesselName(i - 1),
            AthleteField::VesselCode(i) if i > index => AthleteField::VesselCode(i - 1),
            other => other,
        };
        true
    }

    /// Index of the vessel holding focus, if any.
    pub(crate) fn active_vessel(&self) -> Option<usize> {
        match self.active {
            AthleteField::VesselName(i) | AthleteField::VesselCode(i) => Some(i),
            _ => None,
        }
    }

    fn focus_order(&self) -> Vec<AthleteField> {
        let mut order = vec![AthleteField::Name, AthleteField::Cpf];
        for index in 0..self.vessels.len() {
            order.push(AthleteField::VesselName(index));
            order.push(AthleteField::VesselCode(index));
        }
        order
    }

    fn step_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        let position = order
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        let next = if forward {
            (position + 1) % order.len()
        } else {
            (position + order.len() - 1) % order.len()
        };
        self.active = order[next];
    }

    pub(crate) fn next_field(&mut self) {
        self.step_focus(true);
    }

    pub(crate) fn previous_field(&mut self) {
        self.step_focus(false);
    }

    fn active_field_mut(&mut self) -> Option<&mut TextField> {
        match self.active {
            AthleteField::Name => Some(&mut self.name),
            AthleteField::Cpf => Some(&mut self.cpf),
            AthleteField::VesselName(i) => self.vessels.get_mut(i).map(|v| &mut v.name),
            AthleteField::VesselCode(i) => self.vessels.get_mut(i).map(|v| &mut v.code),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        self.active_field_mut()
            .map(|field| field.push_char(ch))
            .unwrap_or(false)
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(field) = self.active_field_mut() {
            field.backspace();
        }
    }

    /// Run every rule, annotating offending fields. Returns the request body
    /// only when the whole form is valid.
    pub(crate) fn validate(&mut self) -> Option<AthletePayload> {
        let name = self.name.require();

        let cpf_len = self.cpf.trimmed().chars().count();
        let cpf = if cpf_len == 0 {
            self.cpf.error = Some(REQUIRED.to_string());
            None
        } else if cpf_len < MIN_CPF_LEN {
            self.cpf.error = Some(format!("CPF must have at least {MIN_CPF_LEN} characters"));
            None
        } else {
            self.cpf.error = None;
            Some(self.cpf.trimmed().to_string())
        };

        self.vessels_error = if self.vessels.is_empty() {
            Some("At least one vessel is required".to_string())
        } else {
            None
        };

        let mut vessels = Vec::with_capacity(self.vessels.len());
        let mut vessels_valid = self.vessels_error.is_none();
        for entry in &mut self.vessels {
            let name = entry.name.require();
            let code = entry.code.require();
            match (name, code) {
                (Some(name), Some(code)) => vessels.push(VesselPayload {
                    id: entry.id.clone(),
                    name,
                    code,
                }),
                _ => vessels_valid = false,
            }
        }

        match (name, cpf, vessels_valid) {
            (Some(name), Some(cpf), true) => Some(AthletePayload { name, cpf, vessels }),
            _ => None,
        }
    }

    pub(crate) fn view(&self) -> FormView {
        let mut view = FormView::new();
        view.push_field("Name", &self.name, "<required>", self.active == AthleteField::Name);
        view.push_field(
            "CPF",
            &self.cpf,
            "<000.000.000-00>",
            self.active == AthleteField::Cpf,
        );

        for (index, entry) in self.vessels.iter().enumerate() {
            view.lines.push(Line::from(""));
            let mut header = vec![Span::styled(
                format!("Vessel {}", index + 1),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )];
            if self.can_remove(index) {
                header.push(Span::styled(
                    "  [Ctrl+D] Remove",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            view.lines.push(Line::from(header));
            view.push_field(
                "  Name",
                &entry.name,
                "<required>",
                self.active == AthleteField::VesselName(index),
            );
            view.push_field(
                "  Code",
                &entry.code,
                "<required>",
                self.active == AthleteField::VesselCode(index),
            );
        }

        if let Some(error) = &self.vessels_error {
            view.lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        view.push_footer(
            &self.status,
            "Enter to save • Tab to switch • Ctrl+N add vessel • Esc to cancel",
        );
        view
    }
}

/// Focusable inputs of the event form, in tab order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum EventField {
    Name,
    EventDate,
    RegistrationStart,
    RegistrationEnd,
}

impl EventField {
    fn next(self) -> Self {
        match self {
            EventField::Name => EventField::EventDate,
            EventField::EventDate => EventField::RegistrationStart,
            EventField::RegistrationStart => EventField::RegistrationEnd,
            EventField::RegistrationEnd => EventField::Name,
        }
    }

    fn previous(self) -> Self {
        match self {
            EventField::Name => EventField::RegistrationEnd,
            EventField::EventDate => EventField::Name,
            EventField::RegistrationStart => EventField::EventDate,
            EventField::RegistrationEnd => EventField::RegistrationStart,
        }
    }
}

/// Event create/edit form. Dates are typed as `YYYY-MM-DD`.
#[derive(Debug, Clone)]
pub(crate) struct EventForm {
    pub(crate) target: Option<String>,
    pub(crate) name: TextField,
    pub(crate) event_date: TextField,
    pub(crate) registration_start: TextField,
    pub(crate) registration_end: TextField,
    pub(crate) active: EventField,
    pub(crate) status: FormStatus,
}

impl Default for EventForm {
    fn default() -> Self {
        Self {
            target: None,
            name: TextField::default(),
            event_date: TextField::default(),
            registration_start: TextField::default(),
            registration_end: TextField::default(),
            active: EventField::Name,
            status: FormStatus::default(),
        }
    }
}

impl EventForm {
    pub(crate) fn from_event(event: &Event) -> Self {
        Self {
            target: Some(event.id().to_string()),
            name: TextField::with_value(event.name.clone()),
            event_date: TextField::with_value(format_form_date(&event.event_date)),
            registration_start: TextField::with_value(format_form_date(&event.registration_start)),
            registration_end: TextField::with_value(format_form_date(&event.registration_end)),
            active: EventField::Name,
            status: FormStatus::default(),
        }
    }

    pub(crate) fn is_edit(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    fn active_field_mut(&mut self) -> &mut TextField {
        match self.active {
            EventField::Name => &mut self.name,
            EventField::EventDate => &mut self.event_date,
            EventField::RegistrationStart => &mut self.registration_start,
            EventField::RegistrationEnd => &mut self.registration_end,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        self.active_field_mut().push_char(ch)
    }

    pub(crate) fn backspace(&mut self) {
        self.active_field_mut().backspace();
    }

    /// Every field is required and dates must be calendar dates. The
    /// registration window is not checked against the event date.
    pub(crate) fn validate(&mut self) -> Option<EventPayload> {
        let name = self.name.require();
        let event_date = require_date(&mut self.event_date);
        let registration_start = require_date(&mut self.registration_start);
        let registration_end = require_date(&mut self.registration_end);

        Some(EventPayload {
            name: name?,
            event_date: event_date?,
            registration_start: registration_start?,
            registration_end: registration_end?,
        })
    }

    pub(crate) fn view(&self) -> FormView {
        let mut view = FormView::new();
        view.push_field("Event Name", &self.name, "<required>", self.active == EventField::Name);
        view.push_field(
            "Event Date",
            &self.event_date,
            "<YYYY-MM-DD>",
            self.active == EventField::EventDate,
        );
        view.push_field(
            "Registration Start",
            &self.registration_start,
            "<YYYY-MM-DD>",
            self.active == EventField::RegistrationStart,
        );
        view.push_field(
            "Registration End",
            &self.registration_end,
            "<YYYY-MM-DD>",
            self.active == EventField::RegistrationEnd,
        );
        view.push_footer(&self.status, "Enter to save • Tab to switch • Esc to cancel");
        view
    }
}

fn require_date(field: &mut TextField) -> Option<String> {
    let value = field.require()?;
    if NaiveDate::parse_from_str(&value, ISO_DATE_FORMAT).is_ok() {
        Some(value)
    } else {
        field.error = Some("Use YYYY-MM-DD".to_string());
        None
    }
}

/// Yes/no prompt guarding the deletion of one record.
#[derive(Debug, Clone)]
pub(crate) struct ConfirmDelete<R: Resource> {
    pub(crate) record: R,
    /// Set while the delete request is in flight.
    pub(crate) deleting: bool,
}

impl<R: Resource> ConfirmDelete<R> {
    pub(crate) fn new(record: R) -> Self {
        Self {
            record,
            deleting: false,
        }
    }

    pub(crate) fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete the {} {}?",
            R::NOUN,
            self.record.display_name()
        )
    }
}
