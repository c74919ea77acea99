use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::containers::{DraftStage, NewBillFields, NewBillForm};
use crate::models::SelectedFile;
use crate::router::Route;
use crate::ui::components::date_input::DateInputState;

pub const TITLE: &str = "Envoyer une note de frais";

// Represents a field in the new bill form
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum NewBillField {
    ExpenseType,
    Name,
    Date,
    Amount,
    Vat,
    Pct,
    Commentary,
    File,
}

impl NewBillField {
    const ORDER: [NewBillField; 8] = [
        NewBillField::ExpenseType,
        NewBillField::Name,
        NewBillField::Date,
        NewBillField::Amount,
        NewBillField::Vat,
        NewBillField::Pct,
        NewBillField::Commentary,
        NewBillField::File,
    ];

    fn label(&self) -> &'static str {
        match self {
            NewBillField::ExpenseType => "Type de dépense",
            NewBillField::Name => "Nom de la dépense",
            NewBillField::Date => "Date",
            NewBillField::Amount => "Montant TTC",
            NewBillField::Vat => "TVA",
            NewBillField::Pct => "%",
            NewBillField::Commentary => "Commentaire",
            NewBillField::File => "Justificatif",
        }
    }

    fn offset(&self, step: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let idx = Self::ORDER.iter().position(|f| f == self).unwrap_or(0) as isize;
        Self::ORDER[(idx + step).rem_euclid(len) as usize]
    }
}

pub enum NewBillAction {
    Cancel,
    PickFile(PathBuf),
    Submit,
}

pub struct NewBillState {
    form: NewBillForm,
    fields: NewBillFields,
    date_state: DateInputState,
    file_path: String,
    current_field: NewBillField,
    editing: bool,
    file_error: Option<String>,
}

impl NewBillState {
    pub fn new(form: NewBillForm) -> Self {
        let today = Local::now().date_naive();

        Self {
            form,
            fields: NewBillFields {
                pct: "20".to_string(),
                ..Default::default()
            },
            date_state: DateInputState::new(today),
            file_path: String::new(),
            current_field: NewBillField::ExpenseType,
            editing: false,
            file_error: None,
        }
    }

    /// Error shown under the form, local file problems first.
    pub fn error_message(&self) -> Option<String> {
        self.file_error.clone().or_else(|| self.form.error_message())
    }

    pub fn next_field(&mut self) {
        self.current_field = self.current_field.offset(1);
    }

    pub fn previous_field(&mut self) {
        self.current_field = self.current_field.offset(-1);
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.current_field == NewBillField::Date {
            self.date_state.toggle_editing();
        }
    }

    fn text_field_mut(&mut self) -> Option<&mut String> {
        match self.current_field {
            NewBillField::Name => Some(&mut self.fields.name),
            NewBillField::Amount => Some(&mut self.fields.amount),
            NewBillField::Vat => Some(&mut self.fields.vat),
            NewBillField::Pct => Some(&mut self.fields.pct),
            NewBillField::Commentary => Some(&mut self.fields.commentary),
            NewBillField::File => Some(&mut self.file_path),
            NewBillField::ExpenseType | NewBillField::Date => None,
        }
    }

    fn edit_current_field(&mut self, key: KeyCode) {
        if self.current_field == NewBillField::Date {
            self.date_state.handle_input(key);
            return;
        }

        let numeric = matches!(self.current_field, NewBillField::Amount | NewBillField::Vat | NewBillField::Pct);
        if let Some(value) = self.text_field_mut() {
            match key {
                KeyCode::Char(c) if !numeric || c.is_ascii_digit() || c == '.' || c == ',' => value.push(c),
                KeyCode::Backspace => {
                    value.pop();
                }
                _ => {}
            }
        }
    }

    /// Read the receipt from disk and hand it to the form.
    pub async fn pick_file(&mut self, path: PathBuf) {
        match SelectedFile::from_path(&path).await {
            Ok(file) => {
                self.file_error = None;
                self.form.handle_file_selected(file).await;
                if self.form.stage() == DraftStage::Empty {
                    self.file_path.clear();
                }
            }
            Err(err) => {
                tracing::warn!("Could not read {}: {}", path.display(), err);
                self.file_error = Some(format!("Fichier illisible : {}", path.display()));
            }
        }
    }

    pub async fn submit(&mut self) -> Option<Route> {
        self.fields.date = self.date_state.value();
        self.form.handle_submit(&self.fields).await
    }
}

pub fn render_new_bill<B: Backend>(frame: &mut Frame<B>, state: &mut NewBillState) {
    let clear_block = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(clear_block, frame.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(NewBillField::ORDER.len() as u16 * 3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.size());

    let title = Paragraph::new(TITLE)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_form(frame, state, chunks[1]);

    let (message, color) = match state.error_message() {
        Some(error) => (error, Color::Red),
        None => match state.form.stage() {
            DraftStage::Uploaded => ("Justificatif envoyé".to_string(), Color::Green),
            _ => (String::new(), Color::White),
        },
    };
    let status = Paragraph::new(message)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[2]);

    let help_text = match (state.editing, state.current_field) {
        (false, NewBillField::ExpenseType) => "Left/Right - Type | Up/Down - Champs | S - Envoyer | Esc - Annuler",
        (false, _) => "Enter - Modifier | Up/Down - Champs | S - Envoyer | Esc - Annuler",
        (true, NewBillField::Date) => "Chiffres - Saisir | Left/Right - Jour/Mois/Année | Enter - Valider",
        (true, NewBillField::File) => "Chemin du fichier (jpg, jpeg, png) | Enter - Envoyer le justificatif",
        (true, _) => "Enter - Valider | Esc - Terminer",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(frame: &mut Frame<B>, state: &NewBillState, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); NewBillField::ORDER.len()])
        .split(area);

    for (field, row) in NewBillField::ORDER.iter().zip(rows.iter()) {
        let selected = *field == state.current_field;
        let editing = selected && state.editing;

        let value = match field {
            NewBillField::ExpenseType => format!("< {} >", state.fields.expense_type.label()),
            NewBillField::Date => state.date_state.get_display_string(),
            NewBillField::Name => state.fields.name.clone(),
            NewBillField::Amount => state.fields.amount.clone(),
            NewBillField::Vat => state.fields.vat.clone(),
            NewBillField::Pct => state.fields.pct.clone(),
            NewBillField::Commentary => state.fields.commentary.clone(),
            NewBillField::File => match state.form.file_name() {
                Some(name) if !editing => name.to_string(),
                _ => state.file_path.clone(),
            },
        };
        let cursor = if editing && *field != NewBillField::Date { "|" } else { "" };

        let label_style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let paragraph = Paragraph::new(Spans::from(vec![
            Span::styled(format!("{}: ", field.label()), label_style),
            Span::raw(format!("{}{}", value, cursor)),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, *row);
    }
}

pub fn handle_key(state: &mut NewBillState, key: KeyCode) -> Option<NewBillAction> {
    if state.editing {
        match key {
            KeyCode::Enter if state.current_field == NewBillField::File => {
                state.toggle_editing();
                let path = state.file_path.trim();
                if !path.is_empty() {
                    return Some(NewBillAction::PickFile(PathBuf::from(path)));
                }
            }
            KeyCode::Enter | KeyCode::Esc => state.toggle_editing(),
            _ => state.edit_current_field(key),
        }
        return None;
    }

    match key {
        KeyCode::Esc => return Some(NewBillAction::Cancel),
        KeyCode::Char('s') => return Some(NewBillAction::Submit),
        KeyCode::Down | KeyCode::Tab => state.next_field(),
        KeyCode::Up | KeyCode::BackTab => state.previous_field(),
        KeyCode::Right if state.current_field == NewBillField::ExpenseType => {
            state.fields.expense_type = state.fields.expense_type.next();
        }
        KeyCode::Left if state.current_field == NewBillField::ExpenseType => {
            state.fields.expense_type = state.fields.expense_type.previous();
        }
        KeyCode::Enter if state.current_field != NewBillField::ExpenseType => state.toggle_editing(),
        _ => {}
    }
    None
}

pub fn handle_input(state: &mut NewBillState) -> Result<Option<NewBillAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}
