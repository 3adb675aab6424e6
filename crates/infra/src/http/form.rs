//! Multipart form bodies
//!
//! `reqwest::multipart::Form` is consumed on send and cannot be cloned, so
//! forms are kept as plain data and turned into a fresh `Form` for every
//! attempt. A replay after a token refresh therefore sends the same parts.

use reqwest::multipart::{Form, Part};

use crate::errors::InfraError;

/// One named part of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text(String),
    File { bytes: Vec<u8>, file_name: Option<String>, mime: Option<String> },
}

/// Binary form data, sent as `multipart/form-data`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<(String, FormPart)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormPart::Text(value.into())));
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        file_name: Option<&str>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push((
            name.into(),
            FormPart::File {
                bytes: bytes.into(),
                file_name: file_name.map(str::to_string),
                mime: mime.map(str::to_string),
            },
        ));
        self
    }

    pub fn parts(&self) -> &[(String, FormPart)] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Build a fresh multipart form for one send.
    ///
    /// # Errors
    /// Returns `BookstoreError::InvalidInput` if a part's MIME type does not
    /// parse.
    pub fn to_multipart(&self) -> Result<Form, InfraError> {
        let mut form = Form::new();
        for (name, part) in &self.parts {
            form = match part {
                FormPart::Text(value) => form.text(name.clone(), value.clone()),
                FormPart::File { bytes, file_name, mime } => {
                    let mut file = Part::bytes(bytes.clone());
                    if let Some(file_name) = file_name {
                        file = file.file_name(file_name.clone());
                    }
                    if let Some(mime) = mime {
                        file = file.mime_str(mime)?;
                    }
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}
