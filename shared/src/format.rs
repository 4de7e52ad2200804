use std::fmt::Write;

/// Currency display for an amount. Non-positive amounts render blank.
pub fn format_amount(amount: f64) -> String {
    let mut out = String::new();
    write_amount(&mut out, amount);
    out
}

/// Buffer-reusing variant of [`format_amount`], for per-frame counter updates.
pub fn write_amount(buf: &mut String, amount: f64) {
    buf.clear();
    if !amount.is_finite() || amount <= 0.0 {
        return;
    }

    // Work in cents so 0.1 + 0.2 style noise never leaks into the label.
    let cents = (amount * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    buf.push('$');
    push_grouped(buf, whole);
    if frac != 0 {
        if frac % 10 == 0 {
            let _ = write!(buf, ".{}", frac / 10);
        } else {
            let _ = write!(buf, ".{frac:02}");
        }
    }
}

fn push_grouped(buf: &mut String, value: u64) {
    let digits = value.to_string();
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            buf.push(',');
        }
        buf.push(ch);
    }
}

/// Pluralized sale count. Zero renders blank.
pub fn format_sales(sales: u64) -> String {
    match sales {
        0 => String::new(),
        1 => "1 sale".to_string(),
        n => format!("{n} Sales"),
    }
}

/// Team code to display name. Unknown codes pass through unchanged.
pub fn team_display_name(code: &str) -> String {
    let code = code.trim();
    let name = match code.to_ascii_lowercase().as_str() {
        "" => "",
        "n3c" => "N3C Financial",
        "afg" => "Ascent Financial",
        "blackoak" => "BlackOak Financial",
        "wkr" => "WKR Financial",
        "dialed" => "Dialed Financial",
        "adaptive" => "Adaptive Financial",
        _ => code,
    };
    name.to_string()
}
