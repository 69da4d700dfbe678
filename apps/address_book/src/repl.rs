//! Line commands and their effect on the address book controller.

use std::fmt::Write as _;

use clap::{Parser, Subcommand};
use client_core::{
    orchestration::{FIRST_NAME_FIELD, HOUSE_NUMBER_FIELD, LAST_NAME_FIELD, POST_CODE_FIELD},
    AddressBookController, AddressLookup, SearchOutcome,
};
use shared::domain::{Address, AddressId};

#[derive(Parser, Debug, PartialEq, Eq)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true
)]
pub struct ReplLine {
    #[command(subcommand)]
    pub command: ReplCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ReplCommand {
    /// Set one form field: postCode, houseNumber, firstName or lastName.
    Set { field: String, value: Vec<String> },
    /// Search addresses; arguments fill the address form first.
    Find {
        post_code: Option<String>,
        house_number: Option<String>,
    },
    /// Select a search result by 1-based position or by id.
    Select { target: String },
    /// Fill the person form.
    Person { first_name: String, last_name: String },
    /// Save the selected address with the person form.
    Save,
    /// Show the saved address book.
    List,
    /// Show the current search results.
    Results,
    /// Remove a saved address by id.
    Remove { id: String },
    /// Clear forms, results, selection and error.
    Clear,
    Help,
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Splits on whitespace, keeping double-quoted runs together.
pub fn split_line(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in line.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, clap::Error> {
    let words = split_line(line);
    if words.is_empty() {
        return Ok(None);
    }
    ReplLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

pub async fn execute<L: AddressLookup>(
    controller: &mut AddressBookController<L>,
    command: ReplCommand,
    out: &mut String,
) -> Flow {
    match command {
        ReplCommand::Set { field, value } => {
            let value = value.join(" ");
            let result = if [POST_CODE_FIELD, HOUSE_NUMBER_FIELD].contains(&field.as_str()) {
                controller.on_address_field_change(&field, value)
            } else {
                controller.on_person_field_change(&field, value)
            };
            if let Err(err) = result {
                let _ = writeln!(out, "{err}");
            }
        }
        ReplCommand::Find {
            post_code,
            house_number,
        } => {
            let fields = [
                (POST_CODE_FIELD, post_code),
                (HOUSE_NUMBER_FIELD, house_number),
            ];
            for (field, value) in fields {
                if let Some(value) = value {
                    let _ = controller.on_address_field_change(field, value);
                }
            }
            if let Ok(SearchOutcome::Found(_)) = controller.submit_address_search().await {
                render_results(controller.search_results(), controller.selected(), out);
            }
        }
        ReplCommand::Select { target } => {
            match resolve_selection(controller.search_results(), &target) {
                Some(id) => {
                    controller.select_address(id);
                    render_results(controller.search_results(), controller.selected(), out);
                }
                None => {
                    let _ = writeln!(out, "no search result matches `{target}`");
                }
            }
        }
        ReplCommand::Person {
            first_name,
            last_name,
        } => {
            let _ = controller.on_person_field_change(FIRST_NAME_FIELD, first_name);
            let _ = controller.on_person_field_change(LAST_NAME_FIELD, last_name);
        }
        ReplCommand::Save => {
            if let Ok(id) = controller.submit_person().await {
                let _ = writeln!(out, "saved {id}");
            }
        }
        ReplCommand::List => render_book(controller.addresses(), out),
        ReplCommand::Results => {
            render_results(controller.search_results(), controller.selected(), out)
        }
        ReplCommand::Remove { id } => {
            if controller.remove_address(&AddressId::from(id.as_str())).await {
                let _ = writeln!(out, "removed {id}");
            }
        }
        ReplCommand::Clear => controller.clear_all(),
        ReplCommand::Help => out.push_str(HELP),
        ReplCommand::Quit => return Flow::Quit,
    }

    if let Some(error) = controller.error() {
        let _ = writeln!(out, "error: {error}");
    }
    if let Some(warning) = controller.persistence_warning() {
        let _ = writeln!(out, "warning: {warning}");
    }
    Flow::Continue
}

fn resolve_selection(results: &[Address], target: &str) -> Option<AddressId> {
    if let Ok(position) = target.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| results.get(index))
            .map(|address| address.id.clone());
    }
    results
        .iter()
        .find(|address| address.id.as_str() == target)
        .map(|address| address.id.clone())
}

pub fn render_results(results: &[Address], selected: Option<&AddressId>, out: &mut String) {
    if results.is_empty() {
        out.push_str("no search results\n");
        return;
    }
    for (index, address) in results.iter().enumerate() {
        let marker = if Some(&address.id) == selected { "(x)" } else { "( )" };
        let _ = writeln!(out, "{marker} {}. {}", index + 1, address.summary());
    }
}

pub fn render_book(addresses: &[Address], out: &mut String) {
    if addresses.is_empty() {
        out.push_str("address book is empty\n");
        return;
    }
    for address in addresses {
        let _ = writeln!(
            out,
            "{} {} {}: {}",
            address.id,
            address.first_name,
            address.last_name,
            address.summary()
        );
    }
}

pub const HELP: &str = "\
commands:
  set <field> <value>          postCode | houseNumber | firstName | lastName
  find [postcode] [number]     search addresses
  select <n|id>                pick a search result
  person <first> <last>        fill the person form
  save                         add the selected address with the person
  list | results               show the address book or the search results
  remove <id>                  delete a saved address
  clear                        reset forms, results and error
  quit
";

#[cfg(test)]
#[path = "tests/repl_tests.rs"]
mod tests;
