use std::sync::{Arc, Mutex};

use super::*;
use crate::error::{
    DUPLICATE_ENTRY_MESSAGE, FETCH_ADDRESSES_FAILED_MESSAGE, MANDATORY_NAME_FIELDS_MESSAGE,
    NO_ADDRESS_SELECTED_MESSAGE, SELECTED_ADDRESS_NOT_FOUND_MESSAGE,
};
use crate::persistence::ADDRESSES_KEY;
use async_trait::async_trait;
use serde_json::Value;
use storage::{KeyValueStore, MemoryStore};

#[derive(Clone, Default)]
struct FakeLookup {
    responses: Arc<Mutex<Vec<Result<Vec<RawAddress>, ()>>>>,
    queries: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeLookup {
    fn returning(addresses: Vec<RawAddress>) -> Self {
        let lookup = Self::default();
        lookup.push(Ok(addresses));
        lookup
    }

    fn failing() -> Self {
        let lookup = Self::default();
        lookup.push(Err(()));
        lookup
    }

    fn push(&self, response: Result<Vec<RawAddress>, ()>) {
        self.responses.lock().expect("responses").push(response);
    }
}

#[async_trait]
impl AddressLookup for FakeLookup {
    async fn find_addresses(
        &self,
        post_code: &str,
        house_number: &str,
    ) -> Result<Vec<RawAddress>, LookupError> {
        self.queries
            .lock()
            .expect("queries")
            .push((post_code.to_string(), house_number.to_string()));
        let mut responses = self.responses.lock().expect("responses");
        let next = if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses.first().cloned().unwrap_or(Ok(Vec::new()))
        };
        next.map_err(|()| LookupError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR))
    }
}

struct FailingWrites;

#[async_trait]
impl KeyValueStore for FailingWrites {
    async fn get_item(&self, _key: &str) -> anyhow::Result<Option<Value>> {
        Ok(None)
    }

    async fn set_item(&self, _key: &str, _value: Value) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("disk full"))
    }
}

fn raw(street: &str) -> RawAddress {
    RawAddress {
        street: street.into(),
        city: "Amsterdam".into(),
        postcode: "1012AB".into(),
        house_number: None,
        lat: None,
        long: None,
    }
}

fn two_addresses() -> Vec<RawAddress> {
    vec![raw("Damrak"), raw("Rokin")]
}

async fn loaded_controller(
    lookup: FakeLookup,
) -> (AddressBookController<FakeLookup>, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    let mut controller = AddressBookController::new(lookup, AddressBookSync::new(backend.clone()));
    controller.load_saved_addresses().await.expect("load");
    (controller, backend)
}

fn fill_search(controller: &mut AddressBookController<FakeLookup>) {
    controller
        .on_address_field_change(POST_CODE_FIELD, "1012AB")
        .expect("postCode");
    controller
        .on_address_field_change(HOUSE_NUMBER_FIELD, "12")
        .expect("houseNumber");
}

fn fill_person(controller: &mut AddressBookController<FakeLookup>, first: &str, last: &str) {
    controller
        .on_person_field_change(FIRST_NAME_FIELD, first)
        .expect("firstName");
    controller
        .on_person_field_change(LAST_NAME_FIELD, last)
        .expect("lastName");
}

async fn search_and_select_second(controller: &mut AddressBookController<FakeLookup>) -> Address {
    fill_search(controller);
    let outcome = controller.submit_address_search().await.expect("search");
    assert_eq!(outcome, SearchOutcome::Found(2));
    let second = controller.search_results()[1].clone();
    controller.select_address(second.id.clone());
    second
}

#[tokio::test]
async fn search_assigns_ids_and_keeps_queried_house_number() {
    let lookup = FakeLookup::returning(two_addresses());
    let (mut controller, _) = loaded_controller(lookup.clone()).await;
    fill_search(&mut controller);

    controller.submit_address_search().await.expect("search");

    let results = controller.search_results();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|a| !a.id.as_str().is_empty()));
    assert_ne!(results[0].id, results[1].id);
    assert!(results.iter().all(|a| a.house_number == "12"));
    assert_eq!(
        lookup.queries.lock().expect("queries").clone(),
        vec![("1012AB".to_string(), "12".to_string())]
    );
    assert!(!controller.is_searching());
}

#[tokio::test]
async fn failed_search_clears_results_and_reports_fetch_error() {
    let lookup = FakeLookup::returning(two_addresses());
    let (mut controller, _) = loaded_controller(lookup.clone()).await;
    search_and_select_second(&mut controller).await;

    lookup.responses.lock().expect("responses").clear();
    lookup.push(Err(()));
    let outcome = controller.submit_address_search().await.expect("search");

    assert_eq!(outcome, SearchOutcome::Failed);
    assert!(controller.search_results().is_empty());
    assert!(controller.selected().is_none());
    assert_eq!(controller.error(), Some(FETCH_ADDRESSES_FAILED_MESSAGE));
}

#[tokio::test]
async fn search_with_blank_fields_is_rejected_before_lookup() {
    let lookup = FakeLookup::returning(two_addresses());
    let (mut controller, _) = loaded_controller(lookup.clone()).await;
    controller
        .on_address_field_change(POST_CODE_FIELD, "1012AB")
        .expect("postCode");

    let err = controller
        .submit_address_search()
        .await
        .expect_err("house number missing");

    assert_eq!(err.missing, vec![HOUSE_NUMBER_FIELD.to_string()]);
    assert!(controller.error().is_some());
    assert!(lookup.queries.lock().expect("queries").is_empty());
}

#[tokio::test]
async fn stale_search_response_is_dropped() {
    let (mut controller, _) = loaded_controller(FakeLookup::default()).await;
    fill_search(&mut controller);

    let first = controller.begin_address_search().expect("first");
    let second = controller.begin_address_search().expect("second");
    assert!(second.generation() > first.generation());
    assert!(controller.is_searching());

    let newest = controller.complete_address_search(second, Ok(vec![raw("Rokin")]));
    let stale = controller.complete_address_search(first, Ok(two_addresses()));

    assert_eq!(newest, SearchOutcome::Found(1));
    assert_eq!(stale, SearchOutcome::Superseded);
    assert_eq!(controller.search_results().len(), 1);
    assert_eq!(controller.search_results()[0].street, "Rokin");
    assert!(!controller.is_searching());
}

#[tokio::test]
async fn blank_names_yield_mandatory_error_without_touching_store() {
    let (mut controller, backend) =
        loaded_controller(FakeLookup::returning(two_addresses())).await;
    search_and_select_second(&mut controller).await;

    for (first, last) in [("", "Doe"), ("Jane", ""), ("  ", "  ")] {
        fill_person(&mut controller, first, last);
        let err = controller.submit_person().await.expect_err("blank name");
        assert!(matches!(err, CommitError::MissingNames { .. }));
        assert_eq!(controller.error(), Some(MANDATORY_NAME_FIELDS_MESSAGE));
        assert!(controller.addresses().is_empty());
    }
    assert!(controller.selected().is_some());
    assert_eq!(controller.search_results().len(), 2);
    assert!(backend.get_item(ADDRESSES_KEY).await.expect("get").is_none());
}

#[tokio::test]
async fn missing_selection_yields_no_address_selected_error() {
    let (mut controller, _) = loaded_controller(FakeLookup::returning(two_addresses())).await;
    fill_person(&mut controller, "Jane", "Doe");

    let err = controller.submit_person().await.expect_err("no selection");
    assert_eq!(err, CommitError::NoSelection);
    assert_eq!(controller.error(), Some(NO_ADDRESS_SELECTED_MESSAGE));

    fill_search(&mut controller);
    controller.submit_address_search().await.expect("search");
    let err = controller.submit_person().await.expect_err("still no selection");
    assert_eq!(err, CommitError::NoSelection);
    assert!(controller.addresses().is_empty());
}

#[tokio::test]
async fn selection_outside_current_results_is_not_found() {
    let (mut controller, _) = loaded_controller(FakeLookup::returning(two_addresses())).await;
    fill_search(&mut controller);
    controller.submit_address_search().await.expect("search");
    controller.select_address(AddressId::from("stale-id"));
    fill_person(&mut controller, "Jane", "Doe");

    let err = controller.submit_person().await.expect_err("not found");

    assert_eq!(err, CommitError::SelectionNotFound(AddressId::from("stale-id")));
    assert_eq!(controller.error(), Some(SELECTED_ADDRESS_NOT_FOUND_MESSAGE));
    assert!(controller.addresses().is_empty());
}

#[tokio::test]
async fn selecting_b_and_committing_jane_doe_stores_exactly_b_with_person() {
    let (mut controller, backend) =
        loaded_controller(FakeLookup::returning(two_addresses())).await;
    let selected = search_and_select_second(&mut controller).await;
    fill_person(&mut controller, "Jane", "Doe");

    let id = controller.submit_person().await.expect("commit");

    assert_eq!(id, selected.id);
    assert_eq!(controller.addresses(), &[selected.with_person("Jane", "Doe")]);
    assert_eq!(controller.error(), None);

    let persisted = backend
        .get_item(ADDRESSES_KEY)
        .await
        .expect("get")
        .expect("written");
    assert_eq!(persisted.as_array().map(Vec::len), Some(1));
    assert_eq!(persisted[0]["firstName"], "Jane");
    assert_eq!(persisted[0]["street"], "Rokin");
}

#[tokio::test]
async fn repeating_the_same_names_is_rejected_as_duplicate() {
    let (mut controller, _) = loaded_controller(FakeLookup::returning(two_addresses())).await;
    search_and_select_second(&mut controller).await;
    fill_person(&mut controller, "Jane", "Doe");
    controller.submit_person().await.expect("first commit");

    let err = controller.submit_person().await.expect_err("same address");
    assert!(matches!(err, CommitError::Store(_)));
    assert_eq!(controller.addresses().len(), 1);
    assert_eq!(controller.error(), Some(DUPLICATE_ENTRY_MESSAGE));

    controller.submit_address_search().await.expect("new search");
    let first = controller.search_results()[0].id.clone();
    controller.select_address(first);
    fill_person(&mut controller, " jane ", "DOE");

    let err = controller.submit_person().await.expect_err("different address");
    assert!(matches!(
        err,
        CommitError::Store(crate::error::StoreError::DuplicatePerson { .. })
    ));
    assert_eq!(controller.addresses().len(), 1);
    assert_eq!(controller.error(), Some(DUPLICATE_ENTRY_MESSAGE));
}

#[tokio::test]
async fn clear_all_resets_forms_results_selection_and_error_but_keeps_book() {
    let (mut controller, _) = loaded_controller(FakeLookup::returning(two_addresses())).await;
    search_and_select_second(&mut controller).await;
    fill_person(&mut controller, "Jane", "Doe");
    controller.submit_person().await.expect("commit");
    controller.submit_person().await.expect_err("duplicate");
    assert!(controller.error().is_some());

    controller.clear_all();

    assert!(controller
        .address_fields()
        .fields()
        .all(|(_, value)| value.is_empty()));
    assert!(controller
        .person_fields()
        .fields()
        .all(|(_, value)| value.is_empty()));
    assert!(controller.selected().is_none());
    assert!(controller.search_results().is_empty());
    assert_eq!(controller.error(), None);
    assert_eq!(controller.addresses().len(), 1);
}

#[tokio::test]
async fn clear_all_makes_a_search_in_flight_stale() {
    let (mut controller, _) = loaded_controller(FakeLookup::default()).await;
    fill_search(&mut controller);
    let ticket = controller.begin_address_search().expect("ticket");
    assert!(controller.is_searching());

    controller.clear_all();
    assert!(!controller.is_searching());

    let outcome = controller.complete_address_search(ticket, Ok(two_addresses()));

    assert_eq!(outcome, SearchOutcome::Superseded);
    assert!(controller.search_results().is_empty());
    assert!(controller.selected().is_none());
    assert!(!controller.is_searching());
}

#[tokio::test]
async fn clear_all_on_fresh_controller_is_harmless() {
    let (mut controller, _) = loaded_controller(FakeLookup::default()).await;
    controller.clear_all();
    assert_eq!(controller.error(), None);
    assert!(controller.search_results().is_empty());
}

#[tokio::test]
async fn remove_address_persists_and_unknown_id_is_noop() {
    let (mut controller, backend) =
        loaded_controller(FakeLookup::returning(two_addresses())).await;
    let selected = search_and_select_second(&mut controller).await;
    fill_person(&mut controller, "Jane", "Doe");
    controller.submit_person().await.expect("commit");

    controller.submit_person().await.expect_err("duplicate");
    assert!(!controller.remove_address(&AddressId::from("nope")).await);
    assert_eq!(controller.addresses().len(), 1);
    assert_eq!(controller.error(), Some(DUPLICATE_ENTRY_MESSAGE));

    assert!(controller.remove_address(&selected.id).await);
    assert!(controller.addresses().is_empty());
    assert_eq!(controller.error(), None);
    assert_eq!(
        backend.get_item(ADDRESSES_KEY).await.expect("get"),
        Some(Value::Array(Vec::new()))
    );
}

#[tokio::test]
async fn nothing_is_written_before_saved_addresses_are_loaded() {
    let backend = Arc::new(MemoryStore::with_item(
        ADDRESSES_KEY,
        serde_json::json!([{
            "id": "saved", "postCode": "9999", "houseNumber": "1",
            "firstName": "Ann", "lastName": "Lee"
        }]),
    ));
    let mut controller = AddressBookController::new(
        FakeLookup::returning(two_addresses()),
        AddressBookSync::new(backend.clone()),
    );
    let selected = search_and_select_second(&mut controller).await;
    fill_person(&mut controller, "Jane", "Doe");
    let id = controller.submit_person().await.expect("commit in memory");

    let persisted = backend.get_item(ADDRESSES_KEY).await.expect("get").expect("seeded");
    assert_eq!(persisted[0]["id"], "saved");
    assert_eq!(persisted.as_array().map(Vec::len), Some(1));

    let count = controller.load_saved_addresses().await.expect("load");
    assert_eq!(count, 2);
    let ids: Vec<_> = controller.addresses().iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, vec![AddressId::from("saved"), id]);
    assert_eq!(controller.addresses()[1], selected.with_person("Jane", "Doe"));

    let persisted = backend.get_item(ADDRESSES_KEY).await.expect("get").expect("written");
    assert_eq!(persisted.as_array().map(Vec::len), Some(2));
    assert_eq!(persisted[1]["firstName"], "Jane");
}

#[tokio::test]
async fn early_commit_colliding_with_saved_person_is_dropped_on_load() {
    let backend = Arc::new(MemoryStore::with_item(
        ADDRESSES_KEY,
        serde_json::json!([{
            "id": "saved", "postCode": "9999", "houseNumber": "1",
            "firstName": "Jane", "lastName": "Doe"
        }]),
    ));
    let mut controller = AddressBookController::new(
        FakeLookup::returning(two_addresses()),
        AddressBookSync::new(backend.clone()),
    );
    search_and_select_second(&mut controller).await;
    fill_person(&mut controller, "jane", "doe");
    controller.submit_person().await.expect("commit in memory");

    let count = controller.load_saved_addresses().await.expect("load");

    assert_eq!(count, 1);
    assert_eq!(controller.addresses()[0].id.as_str(), "saved");
    assert_eq!(controller.error(), Some(DUPLICATE_ENTRY_MESSAGE));
    let persisted = backend.get_item(ADDRESSES_KEY).await.expect("get").expect("seeded");
    assert_eq!(persisted.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn write_failure_surfaces_as_warning_and_keeps_data_in_memory() {
    let mut controller = AddressBookController::new(
        FakeLookup::returning(two_addresses()),
        AddressBookSync::new(Arc::new(FailingWrites)),
    );
    controller.load_saved_addresses().await.expect("load");
    search_and_select_second(&mut controller).await;
    fill_person(&mut controller, "Jane", "Doe");

    controller.submit_person().await.expect("commit");

    assert_eq!(controller.addresses().len(), 1);
    assert_eq!(controller.error(), None);
    let warning = controller.persistence_warning().expect("warning");
    assert!(warning.contains("could not be saved"));
}

#[tokio::test]
async fn failed_search_via_failing_lookup() {
    let (mut controller, _) = loaded_controller(FakeLookup::failing()).await;
    fill_search(&mut controller);
    let outcome = controller.submit_address_search().await.expect("search");
    assert_eq!(outcome, SearchOutcome::Failed);
    assert_eq!(controller.error(), Some(FETCH_ADDRESSES_FAILED_MESSAGE));
}
