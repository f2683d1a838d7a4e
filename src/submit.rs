use log::{error, info};
use reqwest::StatusCode;
use tokio::runtime::Handle;

use crate::page::{Form, resolve_target};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("form has neither action nor hx-post")]
    NoTarget,

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },
}

/// Trait for sending a filled-in form to the till (mockable for testing)
pub trait SubmitStrategy {
    fn name(&self) -> &'static str;
    fn submit(&self, form: &Form) -> Result<(), SubmitError>;
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Plain form submission: a synchronous urlencoded POST to the form's action
pub struct NativeFormSubmit {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl NativeFormSubmit {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl SubmitStrategy for NativeFormSubmit {
    fn name(&self) -> &'static str {
        "native"
    }

    fn submit(&self, form: &Form) -> Result<(), SubmitError> {
        let target = form.native_target().ok_or(SubmitError::NoTarget)?;
        let url = resolve_target(&self.base_url, target);

        let response = self
            .client
            .post(&url)
            .form(&form.fields())
            .send()
            .map_err(|source| SubmitError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Status { url, status });
        }

        info!("Submitted scan form to {url} ({status})");
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// htmx-style submission: the POST runs on the async runtime and the
/// listener carries on immediately
pub struct AjaxSubmit {
    base_url: String,
    client: reqwest::Client,
    runtime: Handle,
}

impl AjaxSubmit {
    pub fn new(base_url: impl Into<String>, runtime: Handle) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            runtime,
        }
    }
}

impl SubmitStrategy for AjaxSubmit {
    fn name(&self) -> &'static str {
        "ajax"
    }

    fn submit(&self, form: &Form) -> Result<(), SubmitError> {
        let target = form.ajax_target().ok_or(SubmitError::NoTarget)?;
        let url = resolve_target(&self.base_url, target);
        let request = self
            .client
            .post(&url)
            .header("HX-Request", "true")
            .form(&form.fields());

        self.runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    info!(
                        "Submitted scan form to {url} ({status}, {} byte fragment)",
                        body.len()
                    );
                }
                Ok(response) => {
                    let err = SubmitError::Status {
                        url,
                        status: response.status(),
                    };
                    error!("AJAX scan submission failed: {err}");
                }
                Err(source) => {
                    let err = SubmitError::Request { url, source };
                    error!("AJAX scan submission failed: {err}");
                }
            }
        });
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Picks how a scan form is submitted.
///
/// The AJAX helper is optional: when the page has it, it takes the form;
/// otherwise the form is submitted natively. The probe runs on every submit.
pub struct Submitter {
    ajax: Option<Box<dyn SubmitStrategy>>,
    native: Box<dyn SubmitStrategy>,
}

impl Submitter {
    pub fn new(ajax: Option<Box<dyn SubmitStrategy>>, native: Box<dyn SubmitStrategy>) -> Self {
        Self { ajax, native }
    }

    pub fn native_only(native: Box<dyn SubmitStrategy>) -> Self {
        Self::new(None, native)
    }

    pub fn select(&self) -> &dyn SubmitStrategy {
        match &self.ajax {
            Some(ajax) => ajax.as_ref(),
            None => self.native.as_ref(),
        }
    }

    pub fn has_ajax(&self) -> bool {
        self.ajax.is_some()
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub struct MockSubmitStrategy {
    pub name: &'static str,
    pub submitted: std::cell::RefCell<Vec<Form>>,
    pub should_fail: bool,
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockSubmitStrategy {
    fn default() -> Self {
        Self::new("mock")
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl MockSubmitStrategy {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            submitted: std::cell::RefCell::new(Vec::new()),
            should_fail: false,
        }
    }

    pub fn new_with_failure(name: &'static str) -> Self {
        Self {
            should_fail: true,
            ..Self::new(name)
        }
    }

    pub fn get_submitted_forms(&self) -> Vec<Form> {
        self.submitted.borrow().clone()
    }

    /// The `code` value of every submitted form, in order
    pub fn get_submitted_codes(&self) -> Vec<String> {
        self.submitted
            .borrow()
            .iter()
            .filter_map(|form| form.input_value(crate::page::CODE_FIELD))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl SubmitStrategy for MockSubmitStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn submit(&self, form: &Form) -> Result<(), SubmitError> {
        self.submitted.borrow_mut().push(form.clone());
        if self.should_fail {
            Err(SubmitError::NoTarget)
        } else {
            Ok(())
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
