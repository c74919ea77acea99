use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::containers::{BillsList, FormattedBill};
use crate::format::format_amount;
use crate::router::Route;
use crate::ui::components::popup::render_popup;

pub const TITLE: &str = "Mes notes de frais";

// Represents the state of the bills table screen
pub struct BillsState {
    bills: Vec<FormattedBill>,
    error: Option<String>,
    table_state: TableState,
    show_receipt: bool,
}

pub enum BillsAction {
    Quit,
    Refresh,
    Navigate(Route),
}

impl BillsState {
    pub fn new(bills: Vec<FormattedBill>) -> Self {
        let mut table_state = TableState::default();
        if !bills.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            bills,
            error: None,
            table_state,
            show_receipt: false,
        }
    }

    /// The list could not be loaded: show the message and no rows.
    pub fn with_error(message: String) -> Self {
        Self {
            bills: Vec::new(),
            error: Some(message),
            table_state: TableState::default(),
            show_receipt: false,
        }
    }

    pub fn next(&mut self) {
        if self.bills.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) if i + 1 < self.bills.len() => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.bills.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(0) | None => self.bills.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_bill(&self) -> Option<&FormattedBill> {
        self.table_state.selected().and_then(|i| self.bills.get(i))
    }

    pub fn toggle_receipt(&mut self) {
        self.show_receipt = self.selected_bill().is_some() && !self.show_receipt;
    }
}

/// Fetch the bills of the session; a store failure becomes the screen's error message.
pub async fn load_bills_state(list: &BillsList) -> BillsState {
    match list.fetch_formatted_bills().await {
        Ok(bills) => BillsState::new(bills),
        Err(err) => {
            tracing::error!("Could not load bills: {}", err);
            BillsState::with_error(err.to_string())
        }
    }
}

pub fn render_bills<B: Backend>(frame: &mut Frame<B>, state: &mut BillsState) {
    let clear_block = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(clear_block, frame.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(frame.size());

    if let Some(error) = &state.error {
        let error_page = Paragraph::new(vec![
            Spans::from(""),
            Spans::from(error.as_str()),
        ])
        .block(Block::default().title(TITLE).borders(Borders::ALL))
        .style(Style::default().fg(Color::Red));
        frame.render_widget(error_page, chunks[0]);
    } else {
        let header_cells = ["Type", "Nom", "Date", "Montant", "Statut", "Justificatif"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows = state.bills.iter().map(|formatted| {
            let bill = &formatted.bill;
            Row::new(vec![
                Cell::from(bill.expense_type.clone().unwrap_or_default()),
                Cell::from(bill.name.clone()),
                Cell::from(formatted.date.clone()),
                Cell::from(format_amount(bill.amount)),
                Cell::from(formatted.status.clone()),
                Cell::from(if bill.file_url.is_some() { "<V> Voir" } else { "-" }),
            ])
        });

        let table = Table::new(rows)
            .header(header)
            .block(Block::default().title(TITLE).borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .widths(&[
                Constraint::Percentage(20),
                Constraint::Percentage(25),
                Constraint::Percentage(12),
                Constraint::Percentage(13),
                Constraint::Percentage(15),
                Constraint::Percentage(15),
            ]);

        frame.render_stateful_widget(table, chunks[0], &mut state.table_state);
    }

    let buttons = Paragraph::new("<N> Nouvelle note de frais | <V> Justificatif | <R> Actualiser | <Q> Quitter")
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[1]);

    if state.show_receipt {
        if let Some(formatted) = state.selected_bill() {
            let bill = &formatted.bill;
            let lines = vec![
                Spans::from(""),
                Spans::from(format!("Fichier : {}", bill.file_name.as_deref().unwrap_or("-"))),
                Spans::from(format!("URL : {}", bill.file_url.as_deref().unwrap_or("-"))),
                Spans::from(""),
                Spans::from("<V> ou <Esc> pour fermer"),
            ];
            render_popup(frame, "Justificatif", lines, Color::White);
        }
    }
}

pub fn handle_key(state: &mut BillsState, key: KeyCode) -> Option<BillsAction> {
    if state.show_receipt {
        if matches!(key, KeyCode::Esc | KeyCode::Char('v') | KeyCode::Enter) {
            state.show_receipt = false;
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(BillsAction::Quit),
        KeyCode::Char('n') => Some(BillsAction::Navigate(Route::NewBill)),
        KeyCode::Char('r') => Some(BillsAction::Refresh),
        KeyCode::Char('v') | KeyCode::Enter => {
            state.toggle_receipt();
            None
        }
        KeyCode::Down => {
            state.next();
            None
        }
        KeyCode::Up => {
            state.previous();
            None
        }
        _ => None,
    }
}

pub fn handle_input(state: &mut BillsState) -> Result<Option<BillsAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::error::StoreError;
    use crate::models::Session;
    use crate::store::mock::{bill, MockStore};

    #[tokio::test]
    async fn store_error_shows_message_without_rows() {
        for err in [StoreError::not_found(), StoreError::internal()] {
            let expected = err.to_string();
            let store = Arc::new(MockStore::default().fail_list(err));
            let list = BillsList::new(store, Session::employee("a@a"));

            let state = load_bills_state(&list).await;

            assert!(state.error.as_deref().unwrap().contains(&expected));
            assert!(state.bills.is_empty());
        }
    }

    #[tokio::test]
    async fn loaded_bills_select_the_first_row() {
        let store = Arc::new(MockStore::with_bills(vec![
            bill("1", "older", "2001-01-01", "pending"),
            bill("2", "newer", "2002-02-02", "accepted"),
        ]));
        let list = BillsList::new(store, Session::employee("a@a"));

        let state = load_bills_state(&list).await;

        assert!(state.error.is_none());
        assert_eq!(state.selected_bill().unwrap().bill.name, "newer");
    }

    #[test]
    fn new_bill_key_navigates_to_the_form() {
        let mut state = BillsState::new(Vec::new());
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('n')),
            Some(BillsAction::Navigate(Route::NewBill))
        ));
    }

    #[test]
    fn receipt_preview_needs_a_selected_bill() {
        let mut state = BillsState::new(Vec::new());
        handle_key(&mut state, KeyCode::Char('v'));
        assert!(!state.show_receipt);

        let mut state = BillsState::new(vec![FormattedBill::from_bill(bill(
            "1", "taxi", "2001-01-01", "pending",
        ))]);
        handle_key(&mut state, KeyCode::Char('v'));
        assert!(state.show_receipt);

        // Keys only close the preview while it is open
        assert!(handle_key(&mut state, KeyCode::Char('q')).is_none());
        handle_key(&mut state, KeyCode::Esc);
        assert!(!state.show_receipt);
    }

    #[test]
    fn selection_wraps_around() {
        let mut state = BillsState::new(vec![
            FormattedBill::from_bill(bill("1", "a", "2002-01-01", "pending")),
            FormattedBill::from_bill(bill("2", "b", "2001-01-01", "pending")),
        ]);
        state.previous();
        assert_eq!(state.selected_bill().unwrap().bill.name, "b");
        state.next();
        assert_eq!(state.selected_bill().unwrap().bill.name, "a");
    }
}
