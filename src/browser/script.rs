//! JavaScript snippets evaluated in the catalog page.
//!
//! Every snippet is an expression that evaluates to a boolean so callers can
//! tell "did nothing" apart from "did it".

/// Quote a Rust string as a JavaScript string literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Set a `<select>` value and fire `change` so the page's own handlers run.
pub fn select_option(selector: &str, value: &str) -> String {
    let selector = js_string(selector);
    let value = js_string(value);

    format!(
        r#"
        (() => {{
            const el = document.querySelector({selector});
            if (!el) return false;
            el.value = {value};
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return el.value === {value};
        }})()
        "#
    )
}

/// Detach every element matching `selector`.
///
/// Run before submitting a search so the following wait can only be
/// satisfied by freshly rendered results.
pub fn remove_matching(selector: &str) -> String {
    let selector = js_string(selector);

    format!(
        r#"
        (() => {{
            document.querySelectorAll({selector}).forEach(el => el.remove());
            return true;
        }})()
        "#
    )
}

/// Click the first `row_selector` element whose `field_selector` child has
/// exactly the trimmed text `text`.
pub fn click_where_text(row_selector: &str, field_selector: &str, text: &str) -> String {
    let row_selector = js_string(row_selector);
    let field_selector = js_string(field_selector);
    let text = js_string(text);

    format!(
        r#"
        (() => {{
            for (const row of document.querySelectorAll({row_selector})) {{
                const field = row.querySelector({field_selector});
                if (!field) continue;
                const value = field.innerText.replace(/\s+/g, ' ').trim();
                if (value === {text} || value.endsWith(' ' + {text})) {{
                    const target = row.querySelector('a') || row;
                    target.click();
                    return true;
                }}
            }}
            return false;
        }})()
        "#
    )
}
