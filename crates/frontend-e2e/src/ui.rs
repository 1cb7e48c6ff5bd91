//! DOM interaction sub-routines
//!
//! Elements are addressed through stable attributes only: placeholder
//! text, label text, ARIA role, test id, or an input's `value`. Every
//! lookup is a bounded wait through [`crate::wait::poll_until`]; a lookup
//! that never resolves to exactly one visible match is a `Timeout`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use tracing::debug;

use crate::error::{HarnessError, Result};
use crate::wait::{poll_until, DEFAULT_POLL_INTERVAL};

/// Escape a string for embedding in a single-quoted JS literal.
fn js_quote(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
}

/// CSS selector for an input addressed by placeholder text.
///
/// Loose mode matches a substring, which is ambiguous for "Password" vs
/// "Repeat Password"; exact mode requires the full placeholder.
fn field_selector(placeholder: &str, exact: bool) -> String {
    if exact {
        format!(r#"input[placeholder="{placeholder}"]"#)
    } else {
        format!(r#"input[placeholder*="{placeholder}"]"#)
    }
}

fn visible_count_js(selector: &str) -> String {
    format!(
        r#"Array.from(document.querySelectorAll('{}')).filter(el => el.offsetParent !== null).length"#,
        js_quote(selector)
    )
}

fn click_by_text_js(selector: &str, name: &str) -> String {
    format!(
        r#"(() => {{
            const matches = Array.from(document.querySelectorAll('{}'))
                .filter(el => el.offsetParent !== null && el.textContent.trim() === '{}');
            if (matches.length === 0) return false;
            matches[0].click();
            return true;
        }})()"#,
        js_quote(selector),
        js_quote(name)
    )
}

fn text_visible_js(text: &str) -> String {
    // innerText reflects rendered text, so hidden nodes don't count
    format!(
        r#"document.body.innerText.includes('{}')"#,
        js_quote(text)
    )
}

/// Tag the single visible match for `selector` with a transient
/// `data-e2e-target` attribute. Returns false while the match count is
/// anything other than one, so a hidden duplicate never gets picked by
/// document order.
fn tag_visible_match_js(selector: &str, token: &str) -> String {
    format!(
        r#"(() => {{
            const matches = Array.from(document.querySelectorAll('{}'))
                .filter(el => el.offsetParent !== null);
            if (matches.length !== 1) return false;
            matches[0].setAttribute('data-e2e-target', '{}');
            return true;
        }})()"#,
        js_quote(selector),
        js_quote(token)
    )
}

fn tab_selected_js(name: &str) -> String {
    format!(
        r#"(() => {{
            const tab = Array.from(document.querySelectorAll('[role="tab"]'))
                .find(t => t.textContent.trim() === '{}');
            return tab ? tab.getAttribute('aria-selected') === 'true' : false;
        }})()"#,
        js_quote(name)
    )
}

fn panel_has_text_js(tab: &str, text: &str) -> String {
    format!(
        r#"(() => {{
            const tab = Array.from(document.querySelectorAll('[role="tab"]'))
                .find(t => t.textContent.trim() === '{}');
            if (!tab) return false;
            const id = tab.getAttribute('aria-controls');
            const panel = id ? document.getElementById(id) : null;
            if (!panel) return false;
            return panel.innerText.split('\n').map(s => s.trim()).includes('{}');
        }})()"#,
        js_quote(tab),
        js_quote(text)
    )
}

fn tag_labeled_control_js(label: &str, token: &str) -> String {
    format!(
        r#"(() => {{
            const label = Array.from(document.querySelectorAll('label'))
                .find(l => l.offsetParent !== null && l.textContent.trim() === '{}');
            if (!label) return false;
            const control = label.htmlFor
                ? document.getElementById(label.htmlFor)
                : label.querySelector('input, textarea, select');
            if (!control) return false;
            control.setAttribute('data-e2e-target', '{}');
            return true;
        }})()"#,
        js_quote(label),
        js_quote(token)
    )
}

fn body_class_js(class: &str) -> String {
    format!(
        r#"document.body.classList.contains('{}')"#,
        js_quote(class)
    )
}

/// Probe for the theme radio group. The radio inputs themselves are
/// visually hidden by the component library, so visibility is judged on
/// the wrapping label.
fn theme_options_js() -> String {
    r#"(() => {
        const light = document.querySelector('input[type="radio"][value="light"]');
        const dark = document.querySelector('input[type="radio"][value="dark"]');
        if (!light || !dark) return false;
        const wrapper = light.closest('label') || light.parentElement;
        return wrapper !== null && wrapper.offsetParent !== null;
    })()"#
        .to_string()
}

fn select_theme_js(value: &str) -> String {
    format!(
        r#"(() => {{
            const radio = document.querySelector('input[type="radio"][value="{}"]');
            if (!radio) return false;
            (radio.closest('label') || radio).click();
            return true;
        }})()"#,
        js_quote(value)
    )
}

/// Clear an input the way a framework-controlled form expects: native
/// value setter plus a bubbling `input` event.
fn clear_input_js(selector: &str) -> String {
    format!(
        r#"(() => {{
            const el = document.querySelector('{}');
            if (!el) return false;
            const setter = Object.getOwnPropertyDescriptor(
                window.HTMLInputElement.prototype, 'value').set;
            setter.call(el, '');
            el.dispatchEvent(new Event('input', {{ bubbles: true }}));
            return true;
        }})()"#,
        js_quote(selector)
    )
}

/// Poll a boolean JS probe until it turns true.
async fn eval_truthy(page: &Page, js: &str, what: &str, timeout: Duration) -> Result<()> {
    poll_until(what, timeout, DEFAULT_POLL_INTERVAL, move || async move {
        // a half-rendered result reads as not-yet, not as an error
        let found = page
            .evaluate(js)
            .await?
            .into_value::<bool>()
            .unwrap_or(false);
        Ok(found.then_some(()))
    })
    .await
}

/// Evaluate a boolean JS probe once. A result that doesn't decode as a
/// boolean is a defect in the probe, not a transient state.
async fn eval_bool(page: &Page, js: &str) -> Result<bool> {
    Ok(page.evaluate(js).await?.into_value::<bool>()?)
}

fn next_target_token() -> String {
    static TOKEN: AtomicU64 = AtomicU64::new(0);
    format!("fill-{}", TOKEN.fetch_add(1, Ordering::Relaxed))
}

/// Click, clear, and type into the control carrying the transient tag,
/// then strip the tag again.
async fn fill_tagged_control(page: &Page, token: &str, value: &str) -> Result<()> {
    let selector = format!(r#"[data-e2e-target="{token}"]"#);
    let element = page.find_element(selector.as_str()).await?;
    element.click().await?;
    page.evaluate(clear_input_js(&selector)).await?;
    if !value.is_empty() {
        element.type_str(value).await?;
    }
    page.evaluate(format!(
        r#"document.querySelector('{selector}')?.removeAttribute('data-e2e-target')"#
    ))
    .await?;
    Ok(())
}

/// Wait for exactly one visible input matching `placeholder`, then set its
/// value. `exact` selects full-placeholder matching when a loose match
/// would be ambiguous. The visible match is tagged before it is resolved
/// to an element handle, so a hidden sibling matching the same selector
/// can't shadow it.
pub async fn fill_form_field(
    page: &Page,
    placeholder: &str,
    value: &str,
    exact: bool,
    timeout: Duration,
) -> Result<()> {
    let selector = field_selector(placeholder, exact);
    let token = next_target_token();
    let tag_js = tag_visible_match_js(&selector, &token);
    let what = format!("unique visible \"{placeholder}\" field");

    eval_truthy(page, &tag_js, &what, timeout).await?;
    fill_tagged_control(page, &token, value).await?;
    debug!(placeholder, "field filled");
    Ok(())
}

/// Fill a control addressed by its `<label>` text.
///
/// The control is tagged with a transient `data-e2e-target` attribute so a
/// CDP element handle (needed for real key events) can be resolved from a
/// CSS selector.
pub async fn fill_labeled_field(
    page: &Page,
    label: &str,
    value: &str,
    timeout: Duration,
) -> Result<()> {
    let token = next_target_token();
    let tag_js = tag_labeled_control_js(label, &token);
    let what = format!("control labeled \"{label}\"");

    eval_truthy(page, &tag_js, &what, timeout).await?;
    fill_tagged_control(page, &token, value).await?;
    debug!(label, "labeled field filled");
    Ok(())
}

pub async fn click_button(page: &Page, name: &str, timeout: Duration) -> Result<()> {
    let js = click_by_text_js(r#"button, [role="button"]"#, name);
    eval_truthy(page, &js, &format!("\"{name}\" button"), timeout).await
}

pub async fn click_tab(page: &Page, name: &str, timeout: Duration) -> Result<()> {
    let js = click_by_text_js(r#"[role="tab"]"#, name);
    eval_truthy(page, &js, &format!("\"{name}\" tab"), timeout).await
}

pub async fn click_menu_item(page: &Page, name: &str, timeout: Duration) -> Result<()> {
    let js = click_by_text_js(r#"[role="menuitem"]"#, name);
    eval_truthy(page, &js, &format!("\"{name}\" menu item"), timeout).await
}

/// Click a trigger addressed by test id; the element may render as a bare
/// icon with no accessible label.
pub async fn click_test_id(page: &Page, id: &str, timeout: Duration) -> Result<()> {
    let selector = format!(r#"[data-testid="{id}"]"#);
    let count_js = visible_count_js(&selector);
    let count_js = count_js.as_str();
    let what = format!("element with test id \"{id}\"");

    poll_until(&what, timeout, DEFAULT_POLL_INTERVAL, move || async move {
        let count = page
            .evaluate(count_js)
            .await?
            .into_value::<u64>()
            .unwrap_or(0);
        Ok((count >= 1).then_some(()))
    })
    .await?;

    page.find_element(selector.as_str()).await?.click().await?;
    Ok(())
}

/// Wait for `text` to be visible anywhere on the page.
pub async fn wait_for_text(page: &Page, text: &str, timeout: Duration) -> Result<()> {
    let js = text_visible_js(text);
    eval_truthy(page, &js, &format!("text \"{text}\""), timeout).await
}

/// Whether `text` is currently visible (single probe, no wait).
pub async fn text_is_visible(page: &Page, text: &str) -> Result<bool> {
    let js = text_visible_js(text);
    eval_bool(page, &js).await
}

/// Wait for the URL to settle on `path`.
pub async fn wait_for_path(page: &Page, path: &str, timeout: Duration) -> Result<()> {
    let js = format!(
        r#"window.location.pathname === '{}'"#,
        js_quote(path)
    );
    eval_truthy(page, &js, &format!("navigation to \"{path}\""), timeout).await
}

/// Wait for a tab to report `aria-selected="true"`.
pub async fn wait_for_tab_selected(page: &Page, name: &str, timeout: Duration) -> Result<()> {
    let js = tab_selected_js(name);
    eval_truthy(page, &js, &format!("\"{name}\" tab selected"), timeout).await
}

/// Wait for `text` to appear as a whole line inside the panel controlled
/// by `tab` (via `aria-controls`).
pub async fn wait_for_text_in_panel(
    page: &Page,
    tab: &str,
    text: &str,
    timeout: Duration,
) -> Result<()> {
    let js = panel_has_text_js(tab, text);
    eval_truthy(
        page,
        &js,
        &format!("\"{text}\" in \"{tab}\" panel"),
        timeout,
    )
    .await
}

/// Whether the document body carries a class (the light/dark theme marker).
pub async fn body_has_class(page: &Page, class: &str) -> Result<bool> {
    eval_bool(page, &body_class_js(class)).await
}

/// Single-probe assertion that the body does NOT carry a class. Used for
/// the inverse theme marker after a switch, where a wait would mask a
/// marker that never cleared.
pub async fn assert_body_class_absent(page: &Page, class: &str) -> Result<()> {
    if body_has_class(page, class).await? {
        Err(HarnessError::AssertionFailed(format!(
            "body still carries class \"{class}\""
        )))
    } else {
        Ok(())
    }
}

/// Wait for the body to carry the theme marker class.
pub async fn wait_for_body_class(page: &Page, class: &str, timeout: Duration) -> Result<()> {
    let js = body_class_js(class);
    eval_truthy(page, &js, &format!("body class \"{class}\""), timeout).await
}

/// Wait for the theme radio group (the "light" and "dark" options) to be
/// rendered and visible.
pub async fn wait_for_theme_options(page: &Page, timeout: Duration) -> Result<()> {
    let js = theme_options_js();
    eval_truthy(page, &js, "theme option radio group", timeout).await
}

/// Select a theme option by its radio `value` ("light" or "dark").
pub async fn select_theme_option(page: &Page, value: &str, timeout: Duration) -> Result<()> {
    let js = select_theme_js(value);
    eval_truthy(page, &js, &format!("\"{value}\" theme option"), timeout).await
}

/// Capture a full-page PNG for postmortem debugging.
pub async fn capture_screenshot(page: &Page, dir: &Path, stem: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "{stem}-{}.png",
        chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f")
    ));
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build(),
        &path,
    )
    .await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn js_quote_escapes_quotes_and_backslashes() {
        assert_eq!(js_quote("it's"), "it\\'s");
        assert_eq!(js_quote(r"a\b"), r"a\\b");
        assert_eq!(js_quote("a\nb"), "a\\nb");
    }

    #[test]
    fn exact_selector_disambiguates_password_fields() {
        // The loose form matches both "Password" and "Repeat Password"
        assert_eq!(
            field_selector("Password", false),
            r#"input[placeholder*="Password"]"#
        );
        assert_eq!(
            field_selector("Password", true),
            r#"input[placeholder="Password"]"#
        );
    }

    #[test]
    fn click_js_requires_visibility_and_exact_text() {
        let js = click_by_text_js(r#"[role="tab"]"#, "My profile");
        assert!(js.contains("offsetParent !== null"));
        assert!(js.contains("=== 'My profile'"));
    }

    #[test]
    fn theme_js_addresses_radio_by_value() {
        let js = select_theme_js("dark");
        assert!(js.contains(r#"input[type="radio"][value="dark"]"#));
    }

    #[test]
    fn tagging_js_skips_hidden_duplicates() {
        // A hidden input matching the same placeholder must not be tagged
        let js = tag_visible_match_js(r#"input[placeholder="Email"]"#, "fill-0");
        assert!(js.contains("offsetParent !== null"));
        assert!(js.contains("matches.length !== 1"));
        assert!(js.contains("data-e2e-target"));
    }

    #[test]
    fn body_class_js_quotes_the_class() {
        assert_eq!(
            body_class_js("chakra-ui-dark"),
            r#"document.body.classList.contains('chakra-ui-dark')"#
        );
    }

    #[test]
    fn theme_option_js_checks_both_radios() {
        let js = theme_options_js();
        assert!(js.contains(r#"[value="light"]"#));
        assert!(js.contains(r#"[value="dark"]"#));
        assert!(js.contains("offsetParent !== null"));
    }
}
