//! Order message templates.
//!
//! A template is plain text (Telegram HTML) containing `{token}` placeholders:
//!
//! | Token | Value |
//! |-------|-------|
//! | `{order_id}` | order id |
//! | `{nickname}` | customer nickname |
//! | `{order_items}` | one `• name × quantity = total unit` line per item |
//! | `{total_price}` | order total |
//! | `{order_time}` | order display time |
//! | `{currency}` | configured currency unit |
//!
//! Every occurrence of a token is replaced in a single left-to-right pass, so
//! values inserted for one token are never re-scanned for other tokens.
//! Unknown tokens are copied through unchanged.
//!
//! # Markup
//!
//! The rendered text is parsed as HTML by the Bot API. Customer-controlled
//! strings (id, nickname, item names, time) are escaped under
//! [`MarkupPolicy::Escape`], the default. [`MarkupPolicy::Verbatim`] inserts
//! them unchanged, which lets a nickname such as `<b>x</b>` inject markup.
//!
//! # Example
//!
//! ```ignore
//! let renderer = TemplateRenderer::new(RenderOptions::default());
//! let text = renderer.render("Order #{order_id} from {nickname}", &order);
//! ```

use std::borrow::Cow;

use crate::config::TelegramConfig;
use crate::order::{Order, OrderItem};

/// How customer-controlled strings are inserted into the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkupPolicy {
    /// Escape `&`, `<` and `>` (default)
    #[default]
    Escape,
    /// Insert values unchanged
    Verbatim,
}

/// Rendering options
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Unit appended to every item total
    pub currency_unit: String,
    pub markup: MarkupPolicy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            currency_unit: "coins".to_string(),
            markup: MarkupPolicy::Escape,
        }
    }
}

impl From<&TelegramConfig> for RenderOptions {
    fn from(config: &TelegramConfig) -> Self {
        Self {
            currency_unit: config.currency_unit.clone(),
            markup: if config.escape_markup {
                MarkupPolicy::Escape
            } else {
                MarkupPolicy::Verbatim
            },
        }
    }
}

/// Renders order templates. Rendering is pure.
#[derive(Debug, Clone, Default)]
pub struct TemplateRenderer {
    options: RenderOptions,
}

impl TemplateRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Substitute every known token in `template` with values from `order`.
    pub fn render(&self, template: &str, order: &Order) -> String {
        let mut rendered = String::with_capacity(template.len() + 64);
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            rendered.push_str(&rest[..start]);
            let after_brace = &rest[start + 1..];

            let substituted = after_brace.find('}').and_then(|end| {
                self.token_value(&after_brace[..end], order)
                    .map(|value| (end, value))
            });

            match substituted {
                Some((end, value)) => {
                    rendered.push_str(&value);
                    rest = &after_brace[end + 1..];
                }
                None => {
                    // Not a token: keep the brace and continue right after it
                    rendered.push('{');
                    rest = after_brace;
                }
            }
        }

        rendered.push_str(rest);
        rendered
    }

    /// Item lines for `{order_items}`, in item order
    pub fn format_items(&self, items: &[OrderItem]) -> String {
        items
            .iter()
            .map(|item| {
                format!(
                    "• {} × {} = {} {}",
                    self.user_text(&item.name),
                    item.quantity,
                    format_number(item.total),
                    self.options.currency_unit
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn token_value(&self, token: &str, order: &Order) -> Option<String> {
        let value = match token {
            "order_id" => self.user_text(&order.id).into_owned(),
            "nickname" => self.user_text(&order.nickname).into_owned(),
            "order_items" => self.format_items(&order.items),
            "total_price" => format_number(order.total_price),
            "order_time" => self.user_text(&order.time).into_owned(),
            "currency" => self.options.currency_unit.clone(),
            _ => return None,
        };
        Some(value)
    }

    fn user_text<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self.options.markup {
            MarkupPolicy::Escape => escape_html(value),
            MarkupPolicy::Verbatim => Cow::Borrowed(value),
        }
    }
}

/// Escape the characters the Bot API's HTML parse mode treats as markup
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Shortest decimal form: `20` for 20.0, `100.5` for 100.5
fn format_number(value: f64) -> String {
    value.to_string()
}
