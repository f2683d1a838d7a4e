use serde::{Deserialize, Serialize};

/// Path of the till's scan endpoint
pub const SCAN_ENDPOINT: &str = "/api/pos/scan";
/// Name of the input that carries the scanned code
pub const CODE_FIELD: &str = "code";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub name: String,

    #[serde(default)]
    pub value: String,
}

impl FormInput {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A form on the till page, described by the attributes the listener cares about
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, rename = "hx-post", skip_serializing_if = "Option::is_none")]
    pub hx_post: Option<String>,

    #[serde(default)]
    pub inputs: Vec<FormInput>,
}

impl Form {
    /// The form the till renders for scanning: htmx-posted, with a code field
    /// and a default quantity of one
    pub fn scan_form() -> Self {
        Self {
            action: None,
            hx_post: Some(SCAN_ENDPOINT.to_string()),
            inputs: vec![FormInput::new(CODE_FIELD, ""), FormInput::new("qty", "1")],
        }
    }

    pub fn targets(&self, endpoint: &str) -> bool {
        self.action.as_deref() == Some(endpoint) || self.hx_post.as_deref() == Some(endpoint)
    }

    pub fn input_mut(&mut self, name: &str) -> Option<&mut FormInput> {
        self.inputs.iter_mut().find(|input| input.name == name)
    }

    pub fn input_value(&self, name: &str) -> Option<&str> {
        self.inputs
            .iter()
            .find(|input| input.name == name)
            .map(|input| input.value.as_str())
    }

    /// Name/value pairs in document order, as a browser serializes the form
    pub fn fields(&self) -> Vec<(String, String)> {
        self.inputs
            .iter()
            .filter(|input| !input.name.is_empty())
            .map(|input| (input.name.clone(), input.value.clone()))
            .collect()
    }

    /// Where a plain form submission goes
    pub fn native_target(&self) -> Option<&str> {
        self.action.as_deref().or(self.hx_post.as_deref())
    }

    /// Where the AJAX helper posts the form
    pub fn ajax_target(&self) -> Option<&str> {
        self.hx_post.as_deref().or(self.action.as_deref())
    }
}

/// Joins a form target onto the till's base URL. Absolute targets pass through.
pub fn resolve_target(base_url: &str, target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        return target.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if target.starts_with('/') {
        format!("{base}{target}")
    } else {
        format!("{base}/{target}")
    }
}

/// The forms currently on the till page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub forms: Vec<Form>,
}

impl Page {
    pub fn new(forms: Vec<Form>) -> Self {
        Self { forms }
    }

    /// First form posting to the scan endpoint, if the page has one
    pub fn scan_form_mut(&mut self) -> Option<&mut Form> {
        self.forms.iter_mut().find(|form| form.targets(SCAN_ENDPOINT))
    }

    pub fn scan_form(&self) -> Option<&Form> {
        self.forms.iter().find(|form| form.targets(SCAN_ENDPOINT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_action(action: &str) -> Form {
        Form {
            action: Some(action.to_string()),
            hx_post: None,
            inputs: vec![FormInput::new(CODE_FIELD, "")],
        }
    }

    #[test]
    fn test_scan_form_matches_action_or_hx_post() {
        let page = Page::new(vec![form_with_action("/api/pos/tender"), Form::scan_form()]);
        assert_eq!(page.scan_form(), Some(&Form::scan_form()));

        let mut page = Page::new(vec![form_with_action(SCAN_ENDPOINT)]);
        assert!(page.scan_form_mut().is_some());
    }

    #[test]
    fn test_no_scan_form() {
        let mut page = Page::new(vec![form_with_action("/api/settings/save")]);
        assert!(page.scan_form_mut().is_none());
        assert!(Page::default().scan_form().is_none());
    }

    #[test]
    fn test_first_matching_form_wins() {
        let mut first = form_with_action(SCAN_ENDPOINT);
        first.inputs.push(FormInput::new("marker", "first"));
        let mut page = Page::new(vec![first, Form::scan_form()]);

        let form = page.scan_form_mut().unwrap();
        assert_eq!(form.input_value("marker"), Some("first"));
    }

    #[test]
    fn test_input_lookup_by_name() {
        let mut form = Form::scan_form();
        form.input_mut(CODE_FIELD).unwrap().value = "5012345678900".to_string();

        assert_eq!(form.input_value(CODE_FIELD), Some("5012345678900"));
        assert!(form.input_mut("sku").is_none());
        assert_eq!(
            form.fields(),
            vec![
                ("code".to_string(), "5012345678900".to_string()),
                ("qty".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_target_preference() {
        let form = Form {
            action: Some("/native".to_string()),
            hx_post: Some("/ajax".to_string()),
            inputs: Vec::new(),
        };
        assert_eq!(form.native_target(), Some("/native"));
        assert_eq!(form.ajax_target(), Some("/ajax"));

        let htmx_only = Form::scan_form();
        assert_eq!(htmx_only.native_target(), Some(SCAN_ENDPOINT));
        assert_eq!(Form::default().ajax_target(), None);
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("http://localhost:8080/", SCAN_ENDPOINT),
            "http://localhost:8080/api/pos/scan"
        );
        assert_eq!(
            resolve_target("http://till.local", "api/pos/scan"),
            "http://till.local/api/pos/scan"
        );
        assert_eq!(
            resolve_target("http://localhost:8080", "https://other/scan"),
            "https://other/scan"
        );
    }

    #[test]
    fn test_form_deserializes_hx_post_attribute() {
        let form: Form = serde_json::from_str(
            r#"{"hx-post": "/api/pos/scan", "inputs": [{"name": "code"}]}"#,
        )
        .unwrap();

        assert!(form.targets(SCAN_ENDPOINT));
        assert_eq!(form.input_value(CODE_FIELD), Some(""));
    }
}
