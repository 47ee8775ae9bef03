//! Phone, email and display formatting for clients and confirmations.

use std::sync::LazyLock;

use regex::Regex;
use url::form_urlencoded;

use crate::model::Booking;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Strip everything but ASCII digits.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Brazilian numbers: two-digit area code plus 8 or 9 digits.
pub fn is_valid_phone(raw: &str) -> bool {
    matches!(normalize_phone(raw).len(), 10 | 11)
}

/// `(11) 98765-4321` for mobiles, `(11) 3456-7890` for landlines. Anything
/// else is returned as given.
pub fn format_phone(raw: &str) -> String {
    let digits = normalize_phone(raw);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => raw.to_string(),
    }
}

pub fn is_valid_email(raw: &str) -> bool {
    EMAIL.is_match(raw.trim())
}

/// `R$ 1.234,50`.
pub fn format_price(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{:02}", cents % 100)
}

/// `45 min`, `1h`, `1h 30min`.
pub fn format_duration(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}min"),
    }
}

/// Plain-text booking summary sent to the client after confirmation.
pub fn confirmation_message(booking: &Booking) -> String {
    format!(
        "*Confirmação de Agendamento*\n\n\
         *Cliente:* {}\n\
         *Telefone:* {}\n\
         *Email:* {}\n\n\
         *Serviço:* {}\n\
         *Profissional:* {}\n\
         *Valor:* {}\n\n\
         *Data:* {}\n\
         *Horário:* {}\n\n\
         Agendamento confirmado com sucesso!",
        booking.client_name,
        format_phone(&booking.phone),
        booking.email,
        booking.service,
        booking.professional,
        format_price(booking.price),
        booking.date.format("%d/%m/%Y"),
        booking.time,
    )
}

/// Click-to-chat link for a Brazilian number, given with or without the `55`
/// country code.
pub fn whatsapp_url(number: &str, message: &str) -> String {
    let digits = normalize_phone(number);
    let local = match digits.strip_prefix("55") {
        Some(rest) if digits.len() > 11 => rest,
        _ => digits.as_str(),
    };
    let text: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("https://wa.me/55{local}?text={text}")
}
