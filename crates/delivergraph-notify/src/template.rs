use minijinja::{AutoEscape, Environment, context};
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

const SUBJECT_NAME: &str = "quote_subject.txt";
const BODY_NAME: &str = "quote_body.html";

const SUBJECT_TEMPLATE: &str = "Delivery Quote #{{ ticket_id }}";

const BODY_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; color: #333;">
  <h1>DeliverGraph</h1>
  <p>Your delivery quote is ready.</p>
  <p><strong>Ticket ID:</strong> {{ ticket_id }}</p>
  <p style="font-size: 28px; font-weight: bold;">&#8377;{{ total_price }}</p>
  <h3>Price Breakdown</h3>
  <table>
    <tr><td>Base Price:</td><td>&#8377;{{ base_price }}</td></tr>
    <tr><td>Urgency Multiplier:</td><td>{{ urgency_multiplier }}x</td></tr>
    <tr><td>Weight Surcharge:</td><td>&#8377;{{ weight_surcharge }}</td></tr>
    <tr><td>Location Adjustment:</td><td>&#8377;{{ location_adjustment }}</td></tr>
  </table>
  {% if details_url %}<p><a href="{{ details_url }}">View Details</a></p>{% endif %}
  <p>Thank you for using DeliverGraph!</p>
</body>
</html>
"#;

/// Figures shown in a quote message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteMessage {
  pub ticket_id: String,
  pub total_price: f64,
  pub base_price: f64,
  pub urgency_multiplier: f64,
  pub weight_surcharge: f64,
  pub location_adjustment: f64,
  /// Link to the delivery's detail page, omitted from the body when `None`.
  pub details_url: Option<String>,
}

/// Render the subject and HTML body for a quote.
///
/// Money amounts are shown with two decimals, the multiplier as given.
/// Values in the body are HTML-escaped; the subject is plain text.
pub fn render_quote(quote: &QuoteMessage) -> Result<(String, String), NotifyError> {
  let mut env = Environment::new();
  env.set_auto_escape_callback(|name| {
    if name.ends_with(".html") {
      AutoEscape::Html
    } else {
      AutoEscape::None
    }
  });
  env.add_template(SUBJECT_NAME, SUBJECT_TEMPLATE)?;
  env.add_template(BODY_NAME, BODY_TEMPLATE)?;

  let ctx = context! {
    ticket_id => &quote.ticket_id,
    total_price => format!("{:.2}", quote.total_price),
    base_price => format!("{:.2}", quote.base_price),
    urgency_multiplier => quote.urgency_multiplier.to_string(),
    weight_surcharge => format!("{:.2}", quote.weight_surcharge),
    location_adjustment => format!("{:.2}", quote.location_adjustment),
    details_url => &quote.details_url,
  };

  let subject = env.get_template(SUBJECT_NAME)?.render(ctx.clone())?;
  let body = env.get_template(BODY_NAME)?.render(ctx)?;
  Ok((subject, body))
}
