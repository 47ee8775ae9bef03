//! Tests for phone/email validation and display formatting.

use booking_engine::contact::{
    confirmation_message, format_duration, format_phone, format_price, is_valid_email,
    is_valid_phone, normalize_phone, whatsapp_url,
};
use booking_engine::model::Booking;

#[test]
fn phones_normalize_to_digits() {
    assert_eq!(normalize_phone("(11) 98765-4321"), "11987654321");
    assert_eq!(normalize_phone("+55 11 3456 7890"), "551134567890");
    assert_eq!(normalize_phone(""), "");
}

#[test]
fn phones_need_ten_or_eleven_digits() {
    assert!(is_valid_phone("(11) 3456-7890"));
    assert!(is_valid_phone("11987654321"));
    assert!(!is_valid_phone("987654321"));
    assert!(!is_valid_phone("551198765432"));
}

#[test]
fn phones_format_by_length() {
    assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
    assert_eq!(format_phone("1134567890"), "(11) 3456-7890");
    assert_eq!(format_phone("12345"), "12345");
}

#[test]
fn email_needs_user_domain_and_dot() {
    assert!(is_valid_email("ana@example.com"));
    assert!(is_valid_email("  ana@salao.com.br "));
    assert!(!is_valid_email("ana@example"));
    assert!(!is_valid_email("ana example@x.com"));
    assert!(!is_valid_email("@example.com"));
}

#[test]
fn prices_use_brazilian_currency_format() {
    assert_eq!(format_price(0.0), "R$ 0,00");
    assert_eq!(format_price(50.0), "R$ 50,00");
    assert_eq!(format_price(1234.5), "R$ 1.234,50");
    assert_eq!(format_price(1_000_000.0), "R$ 1.000.000,00");
}

#[test]
fn durations_read_naturally() {
    assert_eq!(format_duration(45), "45 min");
    assert_eq!(format_duration(60), "1h");
    assert_eq!(format_duration(90), "1h 30min");
    assert_eq!(format_duration(120), "2h");
}

#[test]
fn confirmation_and_whatsapp_link() {
    let booking = Booking {
        id: Some(2),
        client_name: "Bia".to_string(),
        phone: "11987654321".to_string(),
        email: "bia@example.com".to_string(),
        service: "Corte".to_string(),
        professional: "Ana".to_string(),
        date: "2026-03-16".parse().unwrap(),
        time: "09:00".parse().unwrap(),
        price: 50.0,
    };
    let message = confirmation_message(&booking);
    assert!(message.contains("(11) 98765-4321"));
    assert!(message.contains("16/03/2026"));
    assert!(message.contains("09:00"));
    assert!(message.contains("R$ 50,00"));

    let url = whatsapp_url("77999757808", "Olá, tudo bem?");
    assert!(url.starts_with("https://wa.me/5577999757808?text="));
    assert!(url.ends_with("Ol%C3%A1%2C+tudo+bem%3F"));

    assert_eq!(
        whatsapp_url("5577999757808", "x"),
        whatsapp_url("77999757808", "x")
    );
}
