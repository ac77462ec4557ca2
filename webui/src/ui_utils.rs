use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

// Format a decimal amount string for display: "3120.5" -> "3.120,50 €".
// Falls back to the raw string when it is not a plain decimal.
pub fn fmt_money(value: &str) -> String {
    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };
    if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return format!("{} €", value);
    }
    let negative = int_part.starts_with('-');
    let digits: Vec<char> = int_part.trim_start_matches('-').chars().collect();
    let mut grouped = String::new();
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*ch);
    }
    let mut cents: String = frac_part.chars().take(2).collect();
    while cents.len() < 2 {
        cents.push('0');
    }
    format!("{}{},{} €", if negative { "-" } else { "" }, grouped, cents)
}

// Short status label for badges; unknown values pass through unchanged.
pub fn status_label(status: &str) -> &str {
    match status {
        "active" => "aktiv",
        "offboarding" => "im Austritt",
        "exited" => "ausgetreten",
        "draft" => "Entwurf",
        "available" => "verfügbar",
        "paid" => "ausgezahlt",
        "disputed" => "beanstandet",
        "refund_scheduled" => "Erstattung geplant",
        other => other,
    }
}

// Show a transient toast in the #toasts container
pub fn show_toast(message: &str) {
    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            if let Some(container) = doc.get_element_by_id("toasts") {
                if let Ok(toast) = doc.create_element("div") {
                    toast.set_class_name("toast fade-in");
                    toast.set_text_content(Some(message));
                    if container.append_child(&toast).is_err() {
                        return;
                    }

                    let container_clone = container.clone();
                    let toast_clone = toast.clone();
                    let cb = Closure::wrap(Box::new(move || {
                        let _ = container_clone.remove_child(&toast_clone);
                    }) as Box<dyn FnMut()>);
                    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
                        cb.as_ref().unchecked_ref(),
                        1600,
                    );
                    cb.forget();
                }
            }
        }
    }
}
