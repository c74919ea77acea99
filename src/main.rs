mod config;
mod containers;
mod error;
mod format;
mod logging;
mod models;
mod router;
mod store;
mod ui;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tracing::info;
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::containers::{BillsList, NewBillFields, NewBillForm};
use crate::format::format_amount;
use crate::models::{BillRecord, ExpenseType, SelectedFile, Session, UserType};
use crate::router::Route;
use crate::store::{PgStore, Store};
use crate::ui::{
    bills::{BillsAction, BillsState, handle_input as handle_bills_input, load_bills_state, render_bills},
    new_bill::{NewBillAction, NewBillState, handle_input as handle_new_bill_input, render_new_bill},
};

#[derive(Parser)]
#[command(name = "billed", about = "Employee expense reports")]
struct Cli {
    /// Act as this employee instead of BILLED_USER_EMAIL
    #[arg(long, global = true)]
    email: Option<String>,

    /// View the terminal UI opens on
    #[arg(long, default_value = "#employee/bills", value_parser = parse_route)]
    route: Route,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the bills of the current employee
    List,
    /// Upload a receipt and submit a new bill
    Submit {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long = "type", default_value = "Transports")]
        expense_type: String,
        #[arg(long, default_value = "")]
        vat: String,
        #[arg(long, default_value = "20")]
        pct: String,
        #[arg(long, default_value = "")]
        commentary: String,
    },
    /// Create bills from a JSON array of records
    Seed { fixtures: PathBuf },
}

fn parse_route(path: &str) -> Result<Route, String> {
    Route::from_path(path).ok_or_else(|| format!("unknown route: {}", path))
}

// Represents the current screen in the app
enum AppScreen {
    Bills,
    NewBill,
}

// Main application state
struct AppState {
    store: Arc<dyn Store>,
    bills_list: BillsList,
    screen: AppScreen,
    bills_state: Option<BillsState>,
    new_bill_state: Option<NewBillState>,
}

impl AppState {
    fn new(store: Arc<dyn Store>, session: Session) -> Self {
        Self {
            bills_list: BillsList::new(store.clone(), session),
            store,
            screen: AppScreen::Bills,
            bills_state: None,
            new_bill_state: None,
        }
    }

    fn session(&self) -> &Session {
        self.bills_list.session()
    }

    async fn navigate(&mut self, route: Route) {
        info!("Navigating to {}", route);
        match route {
            Route::Bills => {
                self.bills_state = Some(load_bills_state(&self.bills_list).await);
                self.new_bill_state = None;
                self.screen = AppScreen::Bills;
            }
            Route::NewBill => {
                let form = NewBillForm::new(self.store.clone(), self.session().clone());
                self.new_bill_state = Some(NewBillState::new(form));
                self.screen = AppScreen::NewBill;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = config::init(cli.email)?;
    logging::init(&config.log_file)?;

    if config.session.user_type == UserType::Administrator {
        bail!("The administrator dashboard is not available in this client");
    }

    let store: Arc<dyn Store> = Arc::new(PgStore::connect(&config).await?);
    let session = config.session.clone();

    match cli.command {
        Some(Command::List) => print_bills(store, session).await,
        Some(Command::Submit {
            file,
            name,
            amount,
            date,
            expense_type,
            vat,
            pct,
            commentary,
        }) => {
            let fields = NewBillFields {
                expense_type: expense_type.parse::<ExpenseType>().map_err(anyhow::Error::msg)?,
                name,
                amount,
                date,
                vat,
                pct,
                commentary,
            };
            submit_bill(store, session, file, fields).await
        }
        Some(Command::Seed { fixtures }) => seed_bills(store.as_ref(), &fixtures).await,
        None => run_terminal(store, session, cli.route).await,
    }
}

async fn print_bills(store: Arc<dyn Store>, session: Session) -> Result<()> {
    let list = BillsList::new(store, session);
    let bills = list.fetch_formatted_bills().await?;

    if bills.is_empty() {
        println!("Aucune note de frais");
    }
    for formatted in bills {
        let bill = &formatted.bill;
        println!(
            "{:<12} {:<22} {:<24} {:>12} {}",
            formatted.date,
            bill.expense_type.as_deref().unwrap_or("-"),
            bill.name,
            format_amount(bill.amount),
            formatted.status
        );
    }

    Ok(())
}

async fn submit_bill(store: Arc<dyn Store>, session: Session, file: PathBuf, fields: NewBillFields) -> Result<()> {
    let receipt = SelectedFile::from_path(&file)
        .await
        .with_context(|| format!("Could not read {}", file.display()))?;

    let mut form = NewBillForm::new(store, session);
    form.handle_file_selected(receipt).await;
    if let Some(error) = form.error_message() {
        bail!(error);
    }
    if let Some(file_ref) = form.file_ref() {
        println!("Justificatif : {}", file_ref.file_url);
    }

    match form.handle_submit(&fields).await {
        Some(_) => {
            println!("Note de frais envoyée");
            Ok(())
        }
        None => bail!(form.error_message().unwrap_or_else(|| "Note de frais non envoyée".to_string())),
    }
}

async fn seed_bills(store: &dyn Store, fixtures: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(fixtures).await?;
    let records: Vec<BillRecord> = serde_json::from_str(&content)?;

    for record in &records {
        let bill = store.create_bill(record).await?;
        info!("Seeded bill {} for {}", bill.id, bill.email);
    }
    println!("{} notes de frais créées", records.len());

    Ok(())
}

async fn run_terminal(store: Arc<dyn Store>, session: Session, start: Route) -> Result<()> {
    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(store, session);
    app_state.navigate(start).await;

    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!("Terminal session ended with an error: {}", err);
    }
    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| match app_state.screen {
            AppScreen::Bills => {
                if let Some(state) = &mut app_state.bills_state {
                    render_bills(f, state);
                }
            }
            AppScreen::NewBill => {
                if let Some(state) = &mut app_state.new_bill_state {
                    render_new_bill(f, state);
                }
            }
        })?;

        let should_quit = match app_state.screen {
            AppScreen::Bills => handle_bills_screen(app_state).await?,
            AppScreen::NewBill => handle_new_bill_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_bills_screen(app_state: &mut AppState) -> Result<bool> {
    let action = match &mut app_state.bills_state {
        Some(state) => handle_bills_input(state)?,
        None => None,
    };

    match action {
        Some(BillsAction::Quit) => return Ok(true),
        Some(BillsAction::Refresh) => app_state.navigate(Route::Bills).await,
        Some(BillsAction::Navigate(route)) => app_state.navigate(route).await,
        None => {}
    }

    Ok(false)
}

async fn handle_new_bill_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.new_bill_state else {
        return Ok(false);
    };

    let route = match handle_new_bill_input(state)? {
        Some(NewBillAction::Cancel) => Some(Route::Bills),
        Some(NewBillAction::PickFile(path)) => {
            state.pick_file(path).await;
            None
        }
        Some(NewBillAction::Submit) => state.submit().await,
        None => None,
    };

    if let Some(route) = route {
        app_state.navigate(route).await;
    }

    Ok(false)
}
