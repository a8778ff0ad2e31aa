// src/cli/state.rs
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::widgets::TableState;
use rust_decimal::Decimal;

use crate::cli::api::Client;
use crate::cli::input::LineEdit;
use crate::database::models::{Debt, DebtPatch, DebtStatus};
use crate::debts::strategy::{allocate, Allocation, DebtSnapshot};
use crate::debts::validation::{self, ValidationErrors};
use crate::debts::view::{DebtTable, SortColumn};
use crate::debts::CreateDebt;
use crate::error::DebtError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Debts,
    Strategy,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Description,
    Amount,
    Installments,
    Quota,
    Status,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Amount => "Amount",
            Self::Installments => "Installments",
            Self::Quota => "Quota",
            Self::Status => "Status",
        }
    }

    /// Name used by validation issues.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Installments => "installments",
            Self::Quota => "installment_amount",
            Self::Status => "status",
        }
    }
}

const CREATE_FIELDS: [FormField; 5] = [
    FormField::Description,
    FormField::Amount,
    FormField::Installments,
    FormField::Quota,
    FormField::Status,
];
const EDIT_FIELDS: [FormField; 4] = [
    FormField::Description,
    FormField::Amount,
    FormField::Installments,
    FormField::Status,
];

/// Create/edit dialog. `editing` holds the id of the debt being edited.
#[derive(Default, Clone, Debug)]
pub struct DebtForm {
    pub editing: Option<String>,
    pub description: LineEdit,
    pub amount: LineEdit,
    pub installments: LineEdit,
    pub quota: LineEdit,
    pub status: DebtStatus,
    pub focus_index: usize,
    pub errors: ValidationErrors,
}

impl DebtForm {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(debt: &Debt) -> Self {
        Self {
            editing: Some(debt.id.clone()),
            description: LineEdit::with_value(debt.description.clone()),
            amount: LineEdit::with_value(debt.amount.to_string()),
            installments: LineEdit::with_value(debt.installments.to_string()),
            status: debt.status,
            ..Default::default()
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        if self.editing.is_some() {
            &EDIT_FIELDS
        } else {
            &CREATE_FIELDS
        }
    }

    pub fn focused(&self) -> FormField {
        let fields = self.fields();
        fields[self.focus_index % fields.len()]
    }

    pub fn edit_field(&mut self, field: FormField) -> Option<&mut LineEdit> {
        match field {
            FormField::Description => Some(&mut self.description),
            FormField::Amount => Some(&mut self.amount),
            FormField::Installments => Some(&mut self.installments),
            FormField::Quota => Some(&mut self.quota),
            FormField::Status => None,
        }
    }

    pub fn text(&self, field: FormField) -> String {
        match field {
            FormField::Description => self.description.as_str().to_string(),
            FormField::Amount => self.amount.as_str().to_string(),
            FormField::Installments => self.installments.as_str().to_string(),
            FormField::Quota => self.quota.as_str().to_string(),
            FormField::Status => self.status.as_str().to_string(),
        }
    }

    fn next(&mut self) {
        self.focus_index = (self.focus_index + 1) % self.fields().len();
    }

    fn prev(&mut self) {
        let n = self.fields().len();
        self.focus_index = (self.focus_index + n - 1) % n;
    }

    fn cycle_status(&mut self, delta: i32) {
        let all = DebtStatus::ALL;
        let pos = all.iter().position(|&s| s == self.status).unwrap_or(0) as i32;
        let next = (pos + delta).rem_euclid(all.len() as i32) as usize;
        self.status = all[next];
    }

    /// Parses the create form. Number fields that do not parse become issues.
    pub fn to_create(&self) -> Result<CreateDebt, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let amount = collect(&mut errors, validation::parse_decimal("amount", self.amount.as_str()));
        let installments = if self.installments.is_blank() {
            None
        } else {
            collect(
                &mut errors,
                validation::parse_installments("installments", self.installments.as_str()),
            )
        };
        let quota = if self.quota.is_blank() {
            None
        } else {
            collect(
                &mut errors,
                validation::parse_decimal("installment_amount", self.quota.as_str()),
            )
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CreateDebt {
            id: None,
            description: self.description.as_str().to_string(),
            amount: amount.unwrap_or_default(),
            installments,
            installment_amount: quota,
            status: Some(self.status),
        })
    }

    /// Parses the edit form into a patch holding every field.
    pub fn to_patch(&self) -> Result<DebtPatch, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let amount = collect(&mut errors, validation::parse_decimal("amount", self.amount.as_str()));
        let installments = collect(
            &mut errors,
            validation::parse_installments("installments", self.installments.as_str()),
        );
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(DebtPatch {
            description: Some(self.description.as_str().to_string()),
            amount,
            installments,
            status: Some(self.status),
        })
    }
}

fn collect<T>(errors: &mut ValidationErrors, parsed: Result<T, ValidationErrors>) -> Option<T> {
    match parsed {
        Ok(v) => Some(v),
        Err(e) => {
            errors.issues.extend(e.issues);
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    PartialPay { id: String, outstanding: Decimal },
    Budget,
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: LineEdit,
    pub error: Option<String>,
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self.kind {
            PromptKind::PartialPay { .. } => "Enter the amount to pay",
            PromptKind::Budget => "Enter the budget to distribute",
        }
    }
}

#[derive(Default)]
pub struct DebtsPage {
    pub table: DebtTable,
    pub sel: TableState,
    pub searching: bool,
    pub search: LineEdit,
}

#[derive(Default)]
pub struct StrategyPage {
    pub budget: Option<Decimal>,
    pub allocations: Vec<Allocation>,
}

pub struct App {
    pub api: Client,
    pub tab: Tab,
    pub status: String,
    pub quit: bool,
    pub debts: DebtsPage,
    pub strategy: StrategyPage,
    pub form: Option<DebtForm>,
    pub prompt: Option<Prompt>,
}

impl App {
    pub fn new(api: Client) -> Self {
        Self {
            api,
            tab: Tab::Debts,
            status: "Press ? for help | q to quit".into(),
            quit: false,
            debts: DebtsPage::default(),
            strategy: StrategyPage::default(),
            form: None,
            prompt: None,
        }
    }

    /// Re-fetches every debt. Called after each write so the view never
    /// shows stale rows; any strategy preview is dropped with them.
    pub async fn refresh_debts(&mut self) -> anyhow::Result<()> {
        let data = self.api.list_debts().await?;
        self.debts.table.replace(data);
        self.strategy = StrategyPage::default();
        self.clamp_selection();
        Ok(())
    }

    pub fn current_debt(&self) -> Option<&Debt> {
        let idx = self.debts.sel.selected()?;
        self.debts.table.get(idx)
    }

    fn current_debt_id(&self) -> Option<String> {
        self.current_debt().map(|d| d.id.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.debts.table.rows().len();
        match (len, self.debts.sel.selected()) {
            (0, _) => self.debts.sel.select(None),
            (n, Some(i)) if i >= n => self.debts.sel.select(Some(n - 1)),
            (_, None) => self.debts.sel.select(Some(0)),
            _ => {}
        }
    }

    fn move_debt(&mut self, delta: isize) {
        let n = self.debts.table.rows().len();
        if n == 0 { self.debts.sel.select(None); return; }
        let cur = self.debts.sel.selected().unwrap_or(0) as isize;
        let next = (cur + delta).rem_euclid(n as isize) as usize;
        self.debts.sel.select(Some(next));
    }

    fn cycle_status_filter(&mut self) {
        let next = match self.debts.table.status_filter() {
            None => Some(DebtStatus::Pending),
            Some(DebtStatus::Pending) => Some(DebtStatus::Paid),
            Some(DebtStatus::Paid) => Some(DebtStatus::Overdue),
            Some(DebtStatus::Overdue) => None,
        };
        self.debts.table.filter_status(next);
        self.clamp_selection();
    }

    pub async fn handle_key(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        if k.kind != KeyEventKind::Press { return Ok(()); }
        if self.form.is_some() {
            return self.handle_form_input(k).await;
        }
        if self.prompt.is_some() {
            return self.handle_prompt_input(k).await;
        }
        if self.debts.searching {
            self.handle_search_input(k);
            return Ok(());
        }

        if k.code == KeyCode::Char('q') {
            self.quit = true;
            return Ok(());
        }

        match self.tab {
            Tab::Debts => match k.code {
                KeyCode::Up => self.move_debt(-1),
                KeyCode::Down => self.move_debt(1),
                KeyCode::Char('1') => self.sort(SortColumn::Description),
                KeyCode::Char('2') => self.sort(SortColumn::Amount),
                KeyCode::Char('3') => self.sort(SortColumn::Status),
                KeyCode::Char('4') => self.sort(SortColumn::InstallmentAmount),
                KeyCode::Char('5') => self.sort(SortColumn::Installments),
                KeyCode::Char('/') => self.debts.searching = true,
                KeyCode::Char('f') => self.cycle_status_filter(),
                KeyCode::Char('n') => self.form = Some(DebtForm::create()),
                KeyCode::Char('e') => {
                    if let Some(debt) = self.current_debt() {
                        self.form = Some(DebtForm::edit(debt));
                    }
                }
                KeyCode::Char('p') => self.pay_selected().await?,
                KeyCode::Char('o') => self.open_partial_pay(),
                KeyCode::Char('x') | KeyCode::Delete => self.delete_selected().await?,
                KeyCode::Char('b') => {
                    self.prompt = Some(Prompt {
                        kind: PromptKind::Budget,
                        input: LineEdit::default(),
                        error: None,
                    });
                }
                KeyCode::Char('c') => {
                    self.debts.table.clear_strategy();
                    self.strategy = StrategyPage::default();
                }
                KeyCode::Char('r') => {
                    if let Err(e) = self.refresh_debts().await {
                        self.status = format!("Refresh failed: {e}");
                    }
                }
                KeyCode::Tab => self.tab = Tab::Strategy,
                KeyCode::Char('?') => self.tab = Tab::Help,
                _ => {}
            },
            Tab::Strategy => match k.code {
                KeyCode::Tab => self.tab = Tab::Help,
                KeyCode::Esc | KeyCode::Char('b') => self.tab = Tab::Debts,
                KeyCode::Char('?') => self.tab = Tab::Help,
                _ => {}
            },
            Tab::Help => match k.code {
                KeyCode::Tab | KeyCode::Esc | KeyCode::Char('b') => self.tab = Tab::Debts,
                _ => {}
            },
        }
        Ok(())
    }

    fn sort(&mut self, column: SortColumn) {
        self.debts.table.sort_by(column);
    }

    fn handle_search_input(&mut self, k: KeyEvent) {
        match k.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.debts.searching = false;
                return;
            }
            KeyCode::Char(c) => self.debts.search.push(c),
            KeyCode::Backspace => self.debts.search.backspace(),
            KeyCode::Delete => self.debts.search.delete(),
            KeyCode::Left => self.debts.search.left(),
            KeyCode::Right => self.debts.search.right(),
            _ => return,
        }
        let text = self.debts.search.as_str().to_string();
        self.debts.table.search(&text);
        self.clamp_selection();
    }

    async fn pay_selected(&mut self) -> anyhow::Result<()> {
        let Some(debt) = self.current_debt() else { return Ok(()) };
        if debt.status == DebtStatus::Paid {
            return Ok(());
        }
        let id = debt.id.clone();
        match self.api.pay_debt(&id).await {
            Ok(_) => {
                self.refresh_debts().await?;
                self.status = "Marked as paid.".into();
            }
            Err(e) => self.status = format!("Pay failed: {e}"),
        }
        Ok(())
    }

    fn open_partial_pay(&mut self) {
        let Some(debt) = self.current_debt() else { return };
        if debt.status == DebtStatus::Paid {
            return;
        }
        self.prompt = Some(Prompt {
            kind: PromptKind::PartialPay {
                id: debt.id.clone(),
                outstanding: debt.amount,
            },
            input: LineEdit::default(),
            error: None,
        });
    }

    async fn delete_selected(&mut self) -> anyhow::Result<()> {
        let Some(id) = self.current_debt_id() else { return Ok(()) };
        match self.api.delete_debt(&id).await {
            Ok(()) => {
                self.refresh_debts().await?;
                self.status = "Deleted.".into();
            }
            Err(e) => self.status = format!("Delete failed: {e}"),
        }
        Ok(())
    }

    async fn handle_form_input(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        let Some(form) = self.form.as_mut() else { return Ok(()) };
        let field = form.focused();
        match k.code {
            KeyCode::Esc => self.form = None,
            KeyCode::Enter => self.submit_form().await?,
            KeyCode::Tab | KeyCode::Down => form.next(),
            KeyCode::BackTab | KeyCode::Up => form.prev(),
            KeyCode::Left if field == FormField::Status => form.cycle_status(-1),
            KeyCode::Right if field == FormField::Status => form.cycle_status(1),
            KeyCode::Left => { if let Some(edit) = form.edit_field(field) { edit.left() } }
            KeyCode::Right => { if let Some(edit) = form.edit_field(field) { edit.right() } }
            KeyCode::Backspace => { if let Some(edit) = form.edit_field(field) { edit.backspace() } }
            KeyCode::Delete => { if let Some(edit) = form.edit_field(field) { edit.delete() } }
            KeyCode::Char(c) => {
                let accepted = match field {
                    FormField::Description => true,
                    FormField::Amount | FormField::Quota => c.is_ascii_digit() || c == '.',
                    FormField::Installments => c.is_ascii_digit(),
                    FormField::Status => false,
                };
                if accepted {
                    if let Some(edit) = form.edit_field(field) {
                        edit.push(c);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub async fn submit_form(&mut self) -> anyhow::Result<()> {
        let Some(form) = self.form.as_ref() else { return Ok(()) };

        let result = match form.editing.clone() {
            Some(id) => match form.to_patch() {
                Ok(patch) => self.api.update_debt(&id, patch).await.map(|_| "Updated."),
                Err(errors) => Err(DebtError::Validation(errors)),
            },
            None => match form.to_create() {
                Ok(req) => self.api.create_debt(req).await.map(|_| "Created."),
                Err(errors) => Err(DebtError::Validation(errors)),
            },
        };

        match result {
            Ok(message) => {
                self.form = None;
                self.refresh_debts().await?;
                self.status = message.into();
            }
            Err(DebtError::Validation(errors)) => {
                if let Some(form) = self.form.as_mut() {
                    form.errors = errors;
                }
            }
            Err(e) => self.status = format!("Save failed: {e}"),
        }
        Ok(())
    }

    async fn handle_prompt_input(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        let Some(prompt) = self.prompt.as_mut() else { return Ok(()) };
        match k.code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Enter => self.submit_prompt().await?,
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => prompt.input.push(c),
            KeyCode::Backspace => prompt.input.backspace(),
            KeyCode::Delete => prompt.input.delete(),
            KeyCode::Left => prompt.input.left(),
            KeyCode::Right => prompt.input.right(),
            _ => {}
        }
        Ok(())
    }

    pub async fn submit_prompt(&mut self) -> anyhow::Result<()> {
        let Some(prompt) = self.prompt.clone() else { return Ok(()) };

        match prompt.kind {
            PromptKind::PartialPay { id, outstanding } => {
                let checked = validation::parse_decimal("amount", prompt.input.as_str())
                    .and_then(|amount| {
                        validation::validate_partial_payment(amount, outstanding).map(|_| amount)
                    });
                let amount = match checked {
                    Ok(amount) => amount,
                    Err(errors) => {
                        self.prompt_error(&errors);
                        return Ok(());
                    }
                };
                match self.api.partial_pay(&id, amount).await {
                    Ok(_) => {
                        self.prompt = None;
                        self.refresh_debts().await?;
                        self.status = "Partial payment saved.".into();
                    }
                    Err(DebtError::Validation(errors)) => self.prompt_error(&errors),
                    Err(e) => {
                        self.prompt = None;
                        self.status = format!("Payment failed: {e}");
                    }
                }
            }
            PromptKind::Budget => {
                let checked = validation::parse_decimal("budget", prompt.input.as_str())
                    .and_then(|budget| validation::validate_budget(budget).map(|_| budget));
                match checked {
                    Ok(budget) => {
                        self.prompt = None;
                        self.preview_strategy(budget);
                    }
                    Err(errors) => self.prompt_error(&errors),
                }
            }
        }
        Ok(())
    }

    fn prompt_error(&mut self, errors: &ValidationErrors) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.error = errors.issues.first().map(|i| i.message.clone());
        }
    }

    /// Runs the allocator over the visible, unpaid rows and shows the outcome
    /// in place. Nothing is saved; the next refresh discards it.
    pub fn preview_strategy(&mut self, budget: Decimal) {
        self.debts.table.clear_strategy();
        let snapshots: Vec<DebtSnapshot> = self
            .debts
            .table
            .rows()
            .iter()
            .filter(|d| d.status != DebtStatus::Paid)
            .map(DebtSnapshot::from)
            .collect();
        let allocations = allocate(&snapshots, budget);
        self.debts.table.apply_strategy(&allocations);
        self.status = format!("Strategy preview: {} debt(s) affected. c clears it.", allocations.len());
        self.strategy = StrategyPage {
            budget: Some(budget),
            allocations,
        };
    }
}
