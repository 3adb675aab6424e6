//! Routing of API errors to user-facing feedback
//!
//! Validation failures that name a field go to that field; everything else
//! becomes a single toast. A login redirect already moved the user, so it
//! produces nothing.

use super::errors::ApiError;

/// Where feedback ends up, e.g. a form and a toast area
pub trait FeedbackSink {
    fn set_field_error(&mut self, field: &str, message: &str);
    fn toast(&mut self, message: &str);
}

/// What [`route_error`] emitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    pub fields: Vec<(String, String)>,
    pub toasts: Vec<String>,
}

impl Feedback {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.toasts.is_empty()
    }
}

/// Any `Feedback` is itself a sink that just records.
impl FeedbackSink for Feedback {
    fn set_field_error(&mut self, field: &str, message: &str) {
        self.fields.push((field.to_string(), message.to_string()));
    }

    fn toast(&mut self, message: &str) {
        self.toasts.push(message.to_string());
    }
}

pub fn route_error(error: &ApiError, sink: &mut impl FeedbackSink) -> Feedback {
    let mut feedback = Feedback::default();

    match error {
        ApiError::LoginRedirect { .. } => {}
        ApiError::Entity { details, .. } if details.iter().any(|d| d.field.is_some()) => {
            let mut unrouted = false;
            for detail in details {
                match &detail.field {
                    Some(field) => {
                        sink.set_field_error(field, &detail.message);
                        feedback.set_field_error(field, &detail.message);
                    }
                    None => unrouted = true,
                }
            }
            if unrouted {
                let message = error.user_message();
                sink.toast(&message);
                feedback.toast(&message);
            }
        }
        _ => {
            let message = error.user_message();
            sink.toast(&message);
            feedback.toast(&message);
        }
    }

    feedback
}
