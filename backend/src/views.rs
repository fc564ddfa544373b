//! HTML pages. Plain string building, no template engine.

use std::fmt::Write;

use crate::models::PortfolioView;
use crate::session::{Flash, FlashKind};

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn flash_html(flash: Option<&Flash>) -> String {
    match flash {
        Some(f) => {
            let class = match f.kind {
                FlashKind::Error => "error",
                FlashKind::Message => "message",
            };
            format!("<p class=\"{}\">{}</p>\n", class, escape(&f.text))
        }
        None => String::new(),
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape(title),
        body = body,
    )
}

pub fn register_page(flash: Option<&Flash>) -> String {
    let body = format!(
        r#"{flash}<form method="POST" action="/register">
<label>Username:</label><br><input type="text" name="username"><br>
<label>Password:</label><br><input type="password" name="password"><br>
<label>Confirm password:</label><br><input type="password" name="confirm_password"><br><br>
<input type="submit" value="Register">
</form>
<p><a href="/login">Log in</a></p>
"#,
        flash = flash_html(flash),
    );
    layout("Register", &body)
}

pub fn login_page(flash: Option<&Flash>) -> String {
    let body = format!(
        r#"{flash}<form method="POST" action="/login">
<label>Username:</label><br><input type="text" name="username"><br>
<label>Password:</label><br><input type="password" name="password"><br><br>
<input type="submit" value="Log in">
</form>
<p><a href="/register">Register</a></p>
"#,
        flash = flash_html(flash),
    );
    layout("Login", &body)
}

pub fn portfolio_page(username: &str, view: &PortfolioView, flash: Option<&Flash>) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<p>Logged in as {} | <a href=\"/logout\">Log out</a></p>", escape(username));
    body.push_str(&flash_html(flash));

    if !view.errors.is_empty() {
        body.push_str("<ul class=\"quote-errors\">\n");
        for e in &view.errors {
            let _ = writeln!(body, "<li>{}</li>", escape(e));
        }
        body.push_str("</ul>\n");
    }

    if view.rows.is_empty() {
        body.push_str("<p>No positions yet.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Symbol</th><th>Name</th><th>Purchase price</th><th>Quantity</th>\
             <th>Current price</th><th>Value</th><th>Gain/Loss</th><th></th></tr>\n",
        );
        for row in &view.rows {
            let p = &row.position;
            let value = row.market_value().map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".into());
            let gain = row.gain_loss().map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".into());
            let _ = writeln!(
                body,
                "<tr class=\"position\" data-symbol=\"{symbol}\"><td>{symbol}</td><td>{name}</td><td>{price:.2}</td><td>{qty}</td>\
                 <td>{current:.2}</td><td>{value}</td><td>{gain}</td>\
                 <td><form method=\"POST\" action=\"/deletePosition\"><input type=\"hidden\" name=\"id\" value=\"{id}\">\
                 <input type=\"submit\" value=\"Delete\"></form></td></tr>",
                symbol = escape(&p.symbol),
                name = escape(&p.name),
                price = p.purchase_price,
                qty = p.quantity,
                current = row.current_price,
                value = value,
                gain = gain,
                id = p.id,
            );
        }
        let _ = writeln!(
            body,
            "</table>\n<p>Total cost: {:.2} | Total value: {:.2}</p>",
            view.total_cost(),
            view.total_value()
        );
    }

    body.push_str(
        r#"<h2>Add position</h2>
<form method="POST" action="/addPosition">
<label>Symbol:</label> <input type="text" name="symbol">
<label>Name:</label> <input type="text" name="name">
<label>Purchase price:</label> <input type="text" name="purchase_price">
<label>Quantity:</label> <input type="text" name="quantity">
<input type="submit" value="Add">
</form>
"#,
    );

    layout("Portfolio", &body)
}
