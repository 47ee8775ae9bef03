//! Tests for the sheet API client against a local HTTP server.

use std::time::Duration;

use booking_engine::booking::{commit_booking, plan_day, BookingRequest, DayPlan};
use booking_engine::store::{BookingStore, Collection};
use booking_engine::{EngineConfig, EngineError, SheetyStore};
use chrono::NaiveDate;
use httpmock::prelude::*;
use serde_json::json;

const MONDAY: &str = "2026-03-16";

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn client(server: &MockServer) -> SheetyStore {
    SheetyStore::new(server.url("/abc/agenda"), Duration::from_secs(5)).unwrap()
}

/// Serve every tab the planner reads. `bookings` is the body of the booking tab.
fn serve_sheet(server: &MockServer, bookings: serde_json::Value) {
    server.mock(|when, then| {
        when.method(GET).path("/abc/agenda/agendabeta");
        then.status(200).json_body(bookings);
    });
    server.mock(|when, then| {
        when.method(GET).path("/abc/agenda/horabeta");
        then.status(200).json_body(json!({"horabeta": [
            {"id": 2, "diasemana": "segunda", "hora": "09:00", "ativo": true},
            {"id": 3, "diasemana": "segunda", "hora": "10:00", "ativo": "TRUE"}
        ]}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/abc/agenda/servicobeta");
        then.status(200).json_body(json!({"servicobeta": [
            {"id": 2, "servico": "Corte", "duracao": 60, "valor": "50,00"}
        ]}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/abc/agenda/profissional");
        then.status(200).json_body(json!({"profissional": [
            {"id": 2, "profissional": "Ana", "de": "", "ate": ""}
        ]}));
    });
}

#[test]
fn reads_decode_each_tab() {
    let server = MockServer::start();
    serve_sheet(
        &server,
        json!({"agendabeta": [
            {"id": 2, "nome": "Bia", "telefone": 11987654321_i64, "profissional": "Ana",
             "data": "2026-03-16T00:00:00.000Z", "hora": "10:00", "servico": "Corte", "valor": 50},
            {"id": 3, "nome": "Sem data", "profissional": "Ana", "hora": "09:00"}
        ]}),
    );
    let store = client(&server);

    let bookings = store.list_bookings().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].phone, "11987654321");
    assert_eq!(bookings[0].date, date(MONDAY));
    assert_eq!(store.list_services().unwrap()[0].price, 50.0);

    let plan = plan_day(&store, date(MONDAY), "Ana", Some("Corte"), &EngineConfig::default());
    assert_eq!(plan, DayPlan::Open(vec!["09:00".parse().unwrap()]));
}

#[test]
fn missing_collection_key_is_an_error() {
    let server = MockServer::start();
    serve_sheet(&server, json!({"errors": [{"detail": "Quota exceeded"}]}));
    let store = client(&server);

    assert!(matches!(store.list_bookings(), Err(EngineError::Store(_))));

    // Never read as an empty day.
    let plan = plan_day(&store, date(MONDAY), "Ana", None, &EngineConfig::default());
    assert_eq!(plan, DayPlan::StoreUnavailable);
}

#[test]
fn null_collection_is_an_error() {
    let server = MockServer::start();
    serve_sheet(&server, json!({"agendabeta": null}));
    assert!(matches!(client(&server).list_bookings(), Err(EngineError::Store(_))));
}

#[test]
fn server_error_is_a_store_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/abc/agenda/agendabeta");
        then.status(500).body("boom");
    });
    assert!(matches!(client(&server).list_bookings(), Err(EngineError::Store(_))));
}

#[test]
fn slow_server_times_out() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/abc/agenda/agendabeta");
        then.status(200)
            .json_body(json!({"agendabeta": []}))
            .delay(Duration::from_secs(3));
    });
    let store = SheetyStore::new(server.url("/abc/agenda"), Duration::from_millis(200)).unwrap();
    assert!(matches!(store.list_bookings(), Err(EngineError::Store(_))));
}

#[test]
fn booking_is_posted_in_its_envelope() {
    let server = MockServer::start();
    serve_sheet(&server, json!({"agendabeta": []}));
    let created = server.mock(|when, then| {
        when.method(POST)
            .path("/abc/agenda/agendabeta")
            .json_body(json!({"agendabeta": {
                "nome": "Duda Lima",
                "telefone": "11911112222",
                "email": "duda@example.com",
                "servico": "Corte",
                "profissional": "Ana",
                "data": "2026-03-16",
                "hora": "09:00",
                "valor": 50.0
            }}));
        then.status(200).json_body(json!({"agendabeta": {
            "id": 7,
            "nome": "Duda Lima",
            "telefone": "11911112222",
            "email": "duda@example.com",
            "servico": "Corte",
            "profissional": "Ana",
            "data": "2026-03-16",
            "hora": "09:00",
            "valor": 50
        }}));
    });

    let request = BookingRequest {
        client_name: "Duda Lima".to_string(),
        phone: "(11) 91111-2222".to_string(),
        email: "duda@example.com".to_string(),
        service: "Corte".to_string(),
        professional: "Ana".to_string(),
        date: date(MONDAY),
        time: "09:00".parse().unwrap(),
    };
    let booking = commit_booking(
        &client(&server),
        &request,
        date("2026-03-13"),
        &EngineConfig::default(),
    )
    .unwrap();

    created.assert();
    assert_eq!(booking.id, Some(7));
}

#[test]
fn update_puts_to_the_row() {
    let server = MockServer::start();
    let put = server.mock(|when, then| {
        when.method(PUT)
            .path("/abc/agenda/horabeta/3")
            .json_body(json!({"horabeta": {"diasemana": "segunda", "hora": "10:00", "ativo": false}}));
        then.status(200).json_body(json!({"horabeta": {
            "id": 3, "diasemana": "segunda", "hora": "10:00", "ativo": false
        }}));
    });

    let stored = client(&server)
        .update_row(
            Collection::Schedule,
            3,
            json!({"diasemana": "segunda", "hora": "10:00", "ativo": false}),
        )
        .unwrap();
    put.assert();
    assert_eq!(stored["id"], 3);
}

#[test]
fn unknown_rows_are_not_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(DELETE).path("/abc/agenda/agendabeta/99");
        then.status(404).json_body(json!({"errors": [{"detail": "Not found"}]}));
    });
    server.mock(|when, then| {
        when.method(PUT).path("/abc/agenda/servicobeta/99");
        then.status(404);
    });
    let store = client(&server);

    assert!(matches!(
        store.delete_booking(99),
        Err(EngineError::NotFound {
            collection: "agendabeta",
            id: 99
        })
    ));
    assert!(matches!(
        store.update_row(Collection::Services, 99, json!({"servico": "Corte"})),
        Err(EngineError::NotFound {
            collection: "servicobeta",
            id: 99
        })
    ));
}

#[test]
fn delete_hits_the_row_url() {
    let server = MockServer::start();
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/abc/agenda/profissional/4");
        then.status(204);
    });
    client(&server).delete_row(Collection::Professionals, 4).unwrap();
    delete.assert();
}

#[test]
fn write_response_without_row_is_malformed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/abc/agenda/servicobeta");
        then.status(200).json_body(json!({"ok": true}));
    });
    assert!(matches!(
        client(&server).insert_row(Collection::Services, json!({"servico": "Barba"})),
        Err(EngineError::MalformedRecord(_))
    ));
}
