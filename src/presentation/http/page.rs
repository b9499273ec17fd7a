use axum::http::StatusCode;
use axum::response::Html;
use htmlescape::encode_minimal as escape_html;

/// Fields rendered into the interstitial redirect page.
///
/// The page carries a `js-bouncer-settings` JSON blob consumed by the
/// client-side redirect script; the markup itself is only a fallback for
/// users without JavaScript.
pub struct RedirectPage<'a> {
    pub settings_json: &'a str,
    pub title: &'a str,
    pub pretty_url: &'a str,
    /// Quote/text pair, present only when the annotation is public.
    pub metadata: Option<(&'a str, &'a str)>,
    pub fallback_url: &'a str,
}

pub fn redirect_page(page: &RedirectPage<'_>) -> Html<String> {
    let title = escape_html(page.title);
    let pretty = escape_html(page.pretty_url);
    let fallback = escape_html(page.fallback_url);
    // The URLs in the blob come from the annotation record, and serde_json
    // leaves '<' alone; escape it so no URI can close the script element.
    // The escaped form is still a plain '<' to JSON.parse.
    let settings = page.settings_json.replace('<', "\\u003c");

    let metadata = match page.metadata {
        Some((quote, text)) => format!(
            "<meta property=\"og:title\" content=\"{}\" />\n<meta property=\"og:description\" content=\"{}\" />\n",
            escape_html(quote),
            escape_html(text),
        ),
        None => String::new(),
    };

    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n\
         <title>{title}</title>\n{metadata}\
         <script class=\"js-bouncer-settings\" type=\"application/json\">{settings}</script>\n\
         </head>\n<body>\n\
         <p>Taking you to your annotation on <em>{pretty}</em>…</p>\n\
         <script>\n\
         var settings = JSON.parse(document.querySelector('script.js-bouncer-settings').textContent);\n\
         location.replace(settings.viaUrl || settings.extensionUrl);\n\
         </script>\n\
         <noscript><a href=\"{fallback}\">{fallback}</a></noscript>\n\
         </body>\n</html>\n",
    ))
}

pub fn error_page(status: StatusCode, message: &str) -> (StatusCode, Html<String>) {
    let message = escape_html(message);
    (
        status,
        Html(format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n\
             <title>Annotation unavailable</title>\n</head>\n<body>\n\
             <p>{message}</p>\n</body>\n</html>\n"
        )),
    )
}
