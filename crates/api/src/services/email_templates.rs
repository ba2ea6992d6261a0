//! Transactional email templates.
//!
//! Plain functional layouts; every template renders a subject, a text body
//! and an HTML body from its typed variables. User-supplied values are
//! HTML-escaped.

use chrono::Utc;
use domain::models::email::{
    BookingConfirmation, ContactNotification, OrderConfirmation, WelcomeEmail,
};
use domain::models::{EmailMessage, EmailTemplate};

const BRAND: &str = "Moi Sushi & Poké Bowl";

/// A rendered template, not yet addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl RenderedEmail {
    pub fn into_message(self, to: &str) -> EmailMessage {
        EmailMessage::new(to, self.subject)
            .with_text(self.text)
            .with_html(self.html)
    }
}

pub fn render(template: &EmailTemplate) -> RenderedEmail {
    match template {
        EmailTemplate::Welcome(vars) => welcome(vars),
        EmailTemplate::BookingConfirmation(vars) => booking_confirmation(vars),
        EmailTemplate::ContactNotification(vars) => contact_notification(vars),
        EmailTemplate::OrderConfirmation(vars) => order_confirmation(vars),
        EmailTemplate::Test => test_message(),
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
</head>
<body style="font-family: Arial, Helvetica, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: #1f1f1f; padding: 24px; border-radius: 8px 8px 0 0;">
        <h1 style="color: #ffffff; margin: 0; font-size: 22px;">{brand}</h1>
    </div>
    <div style="background: #f9f9f9; padding: 24px; border-radius: 0 0 8px 8px;">
{body}
    </div>
</body>
</html>"#,
        title = escape(title),
        brand = escape(BRAND),
        body = body
    )
}

fn row(label: &str, value: &str) -> String {
    format!(
        "        <tr><td style=\"padding: 4px 12px 4px 0;\"><strong>{}</strong></td><td>{}</td></tr>\n",
        escape(label),
        escape(value)
    )
}

fn welcome(vars: &WelcomeEmail) -> RenderedEmail {
    let subject = format!("Tervetuloa {}!", BRAND);
    let text = format!(
        "Hei {name},\n\nKiitos rekisteröitymisestä! Olemme iloisia, että löysit meidät.\n\nTervetuloa herkuttelemaan,\n{brand}",
        name = vars.customer_name.trim(),
        brand = BRAND
    );
    let body = format!(
        "        <h2 style=\"margin-top: 0;\">Tervetuloa!</h2>\n        <p>Hei {},</p>\n        <p>Kiitos rekisteröitymisestä! Olemme iloisia, että löysit meidät.</p>",
        escape(vars.customer_name.trim())
    );
    RenderedEmail {
        html: layout(&subject, &body),
        subject,
        text,
    }
}

fn booking_confirmation(vars: &BookingConfirmation) -> RenderedEmail {
    let subject = format!("Pöytävarauksesi on vahvistettu - {}", BRAND);

    let mut details = vec![
        ("Päivämäärä", vars.booking_date.clone()),
        ("Kellonaika", vars.booking_time.clone()),
        ("Henkilömäärä", vars.guests.to_string()),
    ];
    if let Some(location) = vars.location.as_deref().filter(|l| !l.trim().is_empty()) {
        details.push(("Ravintola", location.to_string()));
    }
    if let Some(phone) = vars.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        details.push(("Puhelin", phone.to_string()));
    }
    if let Some(requests) = vars.special_requests.as_deref().filter(|r| !r.trim().is_empty()) {
        details.push(("Lisätoiveet", requests.to_string()));
    }

    let text_details: String = details
        .iter()
        .map(|(label, value)| format!("{}: {}\n", label, value))
        .collect();
    let text = format!(
        "Hei {name},\n\nKiitos varauksestasi! Tässä varauksesi tiedot:\n\n{details}\nNähdään pian!\n{brand}",
        name = vars.customer_name.trim(),
        details = text_details,
        brand = BRAND
    );

    let rows: String = details.iter().map(|(l, v)| row(l, v)).collect();
    let body = format!(
        "        <h2 style=\"margin-top: 0;\">Varaus vahvistettu</h2>\n        <p>Hei {},</p>\n        <p>Kiitos varauksestasi! Tässä varauksesi tiedot:</p>\n        <table>\n{}        </table>\n        <p>Nähdään pian!</p>",
        escape(vars.customer_name.trim()),
        rows
    );

    RenderedEmail {
        html: layout(&subject, &body),
        subject,
        text,
    }
}

fn contact_notification(vars: &ContactNotification) -> RenderedEmail {
    let topic = vars
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Yhteydenotto");
    let subject = format!("Uusi yhteydenotto: {}", topic);

    let mut details = vec![("Nimi", vars.name.trim().to_string()), ("Sähköposti", vars.email.trim().to_string())];
    if let Some(phone) = vars.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        details.push(("Puhelin", phone.to_string()));
    }
    details.push(("Aihe", topic.to_string()));

    let text_details: String = details
        .iter()
        .map(|(label, value)| format!("{}: {}\n", label, value))
        .collect();
    let text = format!(
        "Uusi yhteydenotto verkkosivujen lomakkeelta.\n\n{}\nViesti:\n{}",
        text_details,
        vars.message.trim()
    );

    let rows: String = details.iter().map(|(l, v)| row(l, v)).collect();
    let body = format!(
        "        <h2 style=\"margin-top: 0;\">Uusi yhteydenotto</h2>\n        <table>\n{}        </table>\n        <p style=\"white-space: pre-wrap;\">{}</p>",
        rows,
        escape(vars.message.trim())
    );

    RenderedEmail {
        html: layout(&subject, &body),
        subject,
        text,
    }
}

fn euros(amount: f64) -> String {
    format!("{:.2} €", amount).replace('.', ",")
}

fn order_confirmation(vars: &OrderConfirmation) -> RenderedEmail {
    let subject = format!("Tilausvahvistus #{} - {}", vars.order_number.trim(), BRAND);

    let text_items: String = vars
        .items
        .iter()
        .map(|item| {
            format!(
                "{} x {}  {}\n",
                item.quantity,
                item.name,
                euros(item.price * f64::from(item.quantity))
            )
        })
        .collect();

    let mut extra = Vec::new();
    if let Some(method) = vars.delivery_method.as_deref() {
        let label = match method {
            "delivery" => "Kotiinkuljetus",
            "pickup" => "Nouto",
            other => other,
        };
        extra.push(("Toimitustapa", label.to_string()));
    }
    if let Some(address) = vars.delivery_address.as_deref().filter(|a| !a.trim().is_empty()) {
        extra.push(("Toimitusosoite", address.to_string()));
    }
    if let Some(notes) = vars.special_instructions.as_deref().filter(|n| !n.trim().is_empty()) {
        extra.push(("Lisätiedot", notes.to_string()));
    }
    let text_extra: String = extra
        .iter()
        .map(|(label, value)| format!("{}: {}\n", label, value))
        .collect();

    let text = format!(
        "Hei {name},\n\nKiitos tilauksestasi! Tilausnumero: {number}\n\n{items}\nYhteensä: {total}\n\n{extra}\n{brand}",
        name = vars.customer_name.trim(),
        number = vars.order_number.trim(),
        items = text_items,
        total = euros(vars.total_amount),
        extra = text_extra,
        brand = BRAND
    );

    let item_rows: String = vars
        .items
        .iter()
        .map(|item| {
            row(
                &format!("{} x {}", item.quantity, item.name),
                &euros(item.price * f64::from(item.quantity)),
            )
        })
        .collect();
    let extra_rows: String = extra.iter().map(|(l, v)| row(l, v)).collect();
    let body = format!(
        "        <h2 style=\"margin-top: 0;\">Kiitos tilauksestasi!</h2>\n        <p>Hei {name},</p>\n        <p>Tilausnumero: <strong>{number}</strong></p>\n        <table>\n{items}{total}        </table>\n        <table>\n{extra}        </table>",
        name = escape(vars.customer_name.trim()),
        number = escape(vars.order_number.trim()),
        items = item_rows,
        total = row("Yhteensä", &euros(vars.total_amount)),
        extra = extra_rows
    );

    RenderedEmail {
        html: layout(&subject, &body),
        subject,
        text,
    }
}

fn test_message() -> RenderedEmail {
    let subject = format!("Testiviesti - {}", BRAND);
    let sent_at = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let text = format!(
        "Tämä on testiviesti. Sähköpostin lähetys toimii.\n\nLähetetty: {}",
        sent_at
    );
    let body = format!(
        "        <h2 style=\"margin-top: 0;\">Testiviesti</h2>\n        <p>Tämä on testiviesti. Sähköpostin lähetys toimii.</p>\n        <p>Lähetetty: {}</p>",
        sent_at
    );
    RenderedEmail {
        html: layout(&subject, &body),
        subject,
        text,
    }
}
