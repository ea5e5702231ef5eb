use std::collections::HashMap;

use tera::Tera;

use crate::error::AppError;

/// Templates are compiled into the binary so the service has no runtime file dependencies
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("home.html", include_str!("../templates/home.html")),
    ("test_db.html", include_str!("../templates/test_db.html")),
];

/// Background colors that need light text
const DARK_COLORS: &[&str] = &[
    "black", "blue", "brown", "darkblue", "darkgreen", "green", "indigo", "maroon", "navy",
    "purple", "red", "teal",
];

/// Initialize the Tera template engine
pub fn init_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;

    tera.register_filter("contrast", contrast_filter);

    Ok(tera)
}

/// Pick a readable text color ("white" or "black") for a background color name
fn contrast_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let color = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("contrast filter expects a string"))?;

    let text = if DARK_COLORS.contains(&color.to_ascii_lowercase().as_str()) {
        "white"
    } else {
        "black"
    };
    Ok(tera::Value::String(text.to_string()))
}
