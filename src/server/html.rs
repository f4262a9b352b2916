//! Minimal HTML pages for the marking workflow.
//!
//! Every user-supplied string goes through `html_escape` before it reaches
//! the page, whether it lands in text or in an attribute.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::markup::{IGNORED_WORDS_VALUE, KNOWN_WORDS_VALUE};

pub const INDEX_PATH: &str = "/";
pub const SAVE_WORDS_PATH: &str = "/save-words";
pub const UPLOAD_PATH: &str = "/upload-spaced-repetition";

/// Radio value the candidates page preselects. Anything that is not known or
/// ignored counts as unknown.
pub const UNKNOWN_RADIO_VALUE: &str = "unknown";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
         <body>\n<h1>{}</h1>\n{body}</body>\n</html>\n",
        encode_text(title),
        encode_text(title),
    )
}

fn back_link() -> String {
    format!("<p><a href=\"{INDEX_PATH}\">Back</a></p>\n")
}

/// Home page: set sizes and the text form.
pub fn index_page(known: usize, ignored: usize) -> String {
    let body = format!(
        "<p>Known words: {known}</p>\n<p>Ignored words: {ignored}</p>\n\
         <form method=\"post\" action=\"{INDEX_PATH}\">\n\
         <textarea name=\"text\" rows=\"20\" cols=\"80\"></textarea>\n\
         <button type=\"submit\">Find new words</button>\n</form>\n"
    );
    page("lexicard", &body)
}

/// One radio group per candidate, posted to the save-words handler.
pub fn candidates_page(words: &[String]) -> String {
    let mut body = String::new();
    if words.is_empty() {
        body.push_str("<p>No new words.</p>\n");
    } else {
        body.push_str(&format!(
            "<form method=\"post\" action=\"{SAVE_WORDS_PATH}\">\n<table>\n"
        ));
        for word in words {
            let name = encode_double_quoted_attribute(word);
            body.push_str(&format!(
                "<tr><td>{}</td>\
                 <td><label><input type=\"radio\" name=\"{name}\" value=\"{KNOWN_WORDS_VALUE}\">known</label></td>\
                 <td><label><input type=\"radio\" name=\"{name}\" value=\"{IGNORED_WORDS_VALUE}\">ignore</label></td>\
                 <td><label><input type=\"radio\" name=\"{name}\" value=\"{UNKNOWN_RADIO_VALUE}\" checked>learn</label></td></tr>\n",
                encode_text(word),
            ));
        }
        body.push_str("</table>\n<button type=\"submit\">Save</button>\n</form>\n");
    }
    body.push_str(&back_link());
    page("New words", &body)
}

/// The unknown words, with a form that sends them to the enrichment pipeline.
pub fn unknown_page(words: &[String]) -> String {
    let mut body = String::from("<ul>\n");
    for word in words {
        body.push_str(&format!("<li>{}</li>\n", encode_text(word)));
    }
    body.push_str("</ul>\n");
    body.push_str(&format!(
        "<form method=\"post\" action=\"{UPLOAD_PATH}\">\n\
         <input type=\"hidden\" name=\"unknown_words\" value=\"{}\">\n\
         <button type=\"submit\">Make cards</button>\n</form>\n",
        encode_double_quoted_attribute(&words.join(" ")),
    ));
    body.push_str(&back_link());
    page("Words to learn", &body)
}

/// Shown after a successful upload.
pub fn result_page(uploaded: usize) -> String {
    let body = format!("<p>Uploaded {uploaded} cards.</p>\n{}", back_link());
    page("Done", &body)
}
