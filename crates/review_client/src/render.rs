//! Pros/cons report rendering.

use maud::{html, Markup};
use review_shared::protocol::ProsCons;

pub const NO_PROS: &str = "No pros found";
pub const NO_CONS: &str = "No cons found";

/// Two-column HTML fragment. Items are escaped.
pub fn pros_cons_markup(report: &ProsCons) -> Markup {
    html! {
        div.ai-pc-block {
            (column("Pros", &report.pros, NO_PROS))
            (column("Cons", &report.cons, NO_CONS))
        }
    }
}

fn column(title: &str, items: &[String], placeholder: &str) -> Markup {
    html! {
        div {
            div.ai-pc-title { (title) }
            @if items.is_empty() {
                div { (placeholder) }
            } @else {
                ul.ai-pc-list {
                    @for item in items {
                        li { (item) }
                    }
                }
            }
        }
    }
}

/// Terminal rendering of the same report.
pub fn pros_cons_text(report: &ProsCons) -> String {
    let mut out = String::new();
    text_column(&mut out, "Pros", &report.pros, NO_PROS);
    out.push('\n');
    text_column(&mut out, "Cons", &report.cons, NO_CONS);
    out
}

fn text_column(out: &mut String, title: &str, items: &[String], placeholder: &str) {
    out.push_str(title);
    out.push('\n');
    if items.is_empty() {
        out.push_str("  ");
        out.push_str(placeholder);
        out.push('\n');
        return;
    }
    for item in items {
        out.push_str("  - ");
        out.push_str(item);
        out.push('\n');
    }
}
