//! HTML fragments written into page elements.
//!
//! Controls carry `data-action` plus `data-*` arguments naming the editor a
//! click should run; the host wires them up.

use maud::{html, Markup, PreEscaped};

use crate::ids::{DocId, PersonId};

const LOADING_IMAGE: &str = "/html/images/swirl.gif";

/// Decode the entities the server's escaper produces.
pub fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

pub fn loading_indicator() -> String {
    let markup = html! {
        table width="100%" height="100%" {
            tr height="100%" {
                td width="100%" valign="center" align="center" {
                    img width="24" height="24" src=(LOADING_IMAGE);
                }
            }
        }
    };
    markup.into_string()
}

/// Panel content once the search returns. `results` is server HTML and is
/// inserted as-is.
pub fn picture_panel(results: &str) -> String {
    let markup = html! {
        table width="100%" {
            tr {
                td align="right" {
                    input type="button" value="Hide picture search" data-action="hide_picture_search_panel";
                }
            }
            tr {
                td { (PreEscaped(results)) }
            }
        }
    };
    markup.into_string()
}

pub fn email_list(person: &PersonId, addresses: &[String]) -> String {
    let markup = html! {
        ul {
            @for address in addresses {
                li {
                    tt { (address) }
                    " "
                    input type="button" value="Add this email address"
                        data-action="add_email_address"
                        data-person=(person.as_str())
                        data-address=(address);
                }
            }
        }
    };
    markup.into_string()
}

pub fn no_email_addresses() -> String {
    html! { small { "(no email addresses found)" } }.into_string()
}

/// Toggle button offering to show (search) the addresses in `doc`.
pub fn email_show_button(doc: &DocId, person: &PersonId) -> String {
    email_button("Look for email address", "show", doc, person).into_string()
}

/// Toggle button offering to hide the listed addresses.
pub fn email_hide_button(doc: &DocId, person: &PersonId) -> String {
    email_button("Hide email addresses", "hide", doc, person).into_string()
}

fn email_button(label: &str, mode: &str, doc: &DocId, person: &PersonId) -> Markup {
    html! {
        input type="button" value=(label)
            data-action="email_addresses"
            data-doc=(doc.as_str())
            data-person=(person.as_str())
            data-mode=(mode);
    }
}

pub fn saving() -> String {
    "Saving...".to_string()
}

pub fn saved() -> String {
    "Saved.".to_string()
}

pub fn primary_upload_failed(photo_url: &str) -> String {
    let markup = html! {
        font color="orange" { "Couldn't add picture " (photo_url) " to repository;" }
        " trying thumbnail instead..."
    };
    markup.into_string()
}

pub fn upload_failed(body: &str) -> String {
    html! {
        font color="red" { "Couldn't add picture to repository: " (body) }
    }
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entities() {
        assert_eq!(
            decode_entities("&lt;a&gt; Tom &amp; &#39;Jerry&#39; &quot;x&quot;"),
            r#"<a> Tom & 'Jerry' "x""#
        );
        // Escaped ampersand followed by entity text decodes once
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_email_list_escapes_and_names_person() {
        let html = email_list(
            &PersonId::new("p1"),
            &["bob@example.com".to_string(), "a<b@example.com".to_string()],
        );
        assert!(html.starts_with("<ul>"));
        assert!(html.ends_with("</ul>"));
        assert_eq!(html.matches("<li>").count(), 2);
        assert!(html.contains(r#"data-address="bob@example.com""#));
        assert!(html.contains("<tt>a&lt;b@example.com</tt>"));
        assert!(!html.contains("a<b"));
        assert!(html.contains(r#"data-person="p1""#));
    }

    #[test]
    fn test_email_list_escapes_attribute_quotes() {
        let html = email_list(&PersonId::new("p\"1"), &["x@example.com".to_string()]);
        assert!(html.contains(r#"data-person="p&quot;1""#));
    }

    #[test]
    fn test_email_buttons() {
        let doc = DocId::new("d1");
        let person = PersonId::new("p1");
        assert!(email_show_button(&doc, &person).contains(r#"data-mode="show""#));
        assert!(email_hide_button(&doc, &person).contains("Hide email addresses"));
    }

    #[test]
    fn test_picture_panel_keeps_server_html() {
        let html = picture_panel("<table><tr><td>result</td></tr></table>");
        assert!(html.contains("Hide picture search"));
        assert!(html.contains("<td>result</td>"));
    }

    #[test]
    fn test_no_email_addresses() {
        assert_eq!(no_email_addresses(), "<small>(no email addresses found)</small>");
    }

    #[test]
    fn test_upload_failed_escapes_body() {
        assert_eq!(
            upload_failed("<bad>"),
            r#"<font color="red">Couldn't add picture to repository: &lt;bad&gt;</font>"#
        );
    }

    #[test]
    fn test_primary_upload_failed_names_url() {
        let html = primary_upload_failed("http://images.example/a.jpg?x=1&y=2");
        assert!(html.contains("http://images.example/a.jpg?x=1&amp;y=2"));
        assert!(html.ends_with(" trying thumbnail instead..."));
    }
}
