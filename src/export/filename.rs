use lazy_static::lazy_static;
use regex::Regex;
use time::Date;

lazy_static! {
    // Everything outside letters, digits, accented Latin letters and
    // whitespace is dropped; whitespace runs then become underscores.
    static ref DISALLOWED: Regex = Regex::new(r"[^a-zA-Z0-9áéíóúñÁÉÍÓÚÑ\s]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

pub fn sanitize_name(name: &str) -> String {
    let stripped = DISALLOWED.replace_all(name, "");
    WHITESPACE.replace_all(&stripped, "_").into_owned()
}

fn iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// `<sanitized plan name>_<YYYY-MM-DD>.<ext>`; spreadsheet, image and
/// the share flow's attachment all use this shape.
pub fn dated_filename(plan_name: &str, date: Date, ext: &str) -> String {
    format!("{}_{}.{}", sanitize_name(plan_name), iso_date(date), ext)
}

/// Document export filename: `Plan_<name>[_<First>_<Last>]_<date>.pdf`.
/// Customer names only get their whitespace collapsed; accents and
/// punctuation pass through.
pub fn document_filename(plan_name: &str, customer_name: Option<(&str, &str)>, date: Date) -> String {
    let customer_part = match customer_name {
        Some((first, last)) => {
            WHITESPACE.replace_all(&format!("_{first}_{last}"), "_").into_owned()
        }
        None => String::new(),
    };
    format!(
        "Plan_{}{}_{}.pdf",
        sanitize_name(plan_name),
        customer_part,
        iso_date(date)
    )
}
