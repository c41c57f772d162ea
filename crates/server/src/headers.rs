//! Alert headers telling the client what a request did to an entity.
//!
//! `X-{app}-alert` carries a message key such as `amachouApp.disease.created`
//! and `X-{app}-params` the subject (an id, or the entity name for errors).

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

fn insert(headers: &mut HeaderMap, name: String, value: &str) {
    match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(value)) {
        (Ok(n), Ok(v)) => {
            headers.insert(n, v);
        }
        _ => warn!(header = %name, "skipping header that is not valid HTTP"),
    }
}

pub fn alert(app_name: &str, message: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, format!("X-{app_name}-alert"), message);
    insert(&mut headers, format!("X-{app_name}-params"), param);
    headers
}

pub fn entity_creation_alert(app_name: &str, entity_name: &str, param: &str) -> HeaderMap {
    alert(app_name, &format!("{app_name}.{entity_name}.created"), param)
}

pub fn entity_update_alert(app_name: &str, entity_name: &str, param: &str) -> HeaderMap {
    alert(app_name, &format!("{app_name}.{entity_name}.updated"), param)
}

pub fn entity_deletion_alert(app_name: &str, entity_name: &str, param: &str) -> HeaderMap {
    alert(app_name, &format!("{app_name}.{entity_name}.deleted"), param)
}

pub fn failure_alert(app_name: &str, entity_name: &str, error_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, format!("X-{app_name}-error"), &format!("error.{error_key}"));
    insert(&mut headers, format!("X-{app_name}-params"), entity_name);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_alert_names_entity_and_id() {
        let h = entity_creation_alert("amachouApp", "disease", "12");
        assert_eq!(h["x-amachouapp-alert"], "amachouApp.disease.created");
        assert_eq!(h["x-amachouapp-params"], "12");
    }

    #[test]
    fn update_and_deletion_use_their_own_keys() {
        assert_eq!(entity_update_alert("app", "disease", "1")["x-app-alert"], "app.disease.updated");
        assert_eq!(entity_deletion_alert("app", "disease", "1")["x-app-alert"], "app.disease.deleted");
    }

    #[test]
    fn invalid_header_name_is_skipped() {
        let h = alert("bad app", "m", "p");
        assert!(h.is_empty());
    }
}
